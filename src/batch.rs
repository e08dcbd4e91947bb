//! The generation loop: sample, prompt, edit, save, repeat.

use crate::error::{Result, SceneGenError};
use crate::image::{
    EditRequest, EditedImage, GenerationConfig, ImageEditor, ImageEditorExt, RetryPolicy,
};
use crate::output::OutputWriter;
use crate::prompt::build_prompt;
use crate::scenario::{sample_scene, SampledScene, Scenario};
use rand::Rng;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Base image every request edits.
    pub input_image: PathBuf,
    /// Number of images to request.
    pub num_images: u32,
    /// Pause between consecutive iterations.
    pub request_delay: Duration,
    /// Use this scenario for every image instead of sampling one.
    pub scenario: Option<Scenario>,
    /// Sampling parameters sent with every request.
    pub generation: GenerationConfig,
    /// Backoff for rate-limited requests.
    pub retry: RetryPolicy,
}

impl BatchConfig {
    /// Creates a config with the default count, delay and retry policy.
    pub fn new(input_image: impl Into<PathBuf>) -> Self {
        Self {
            input_image: input_image.into(),
            num_images: 200,
            request_delay: Duration::from_secs(2),
            scenario: None,
            generation: GenerationConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Outcome counts for a finished batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    /// Images requested.
    pub requested: u32,
    /// Files now in the destination folder.
    pub saved: Vec<PathBuf>,
    /// Iterations that produced no image.
    pub failed: u32,
    /// Images written but left in the staging directory.
    pub unmoved: Vec<PathBuf>,
}

impl BatchSummary {
    /// Number of images that reached the destination folder.
    pub fn succeeded(&self) -> usize {
        self.saved.len()
    }
}

/// Drives an [`ImageEditor`] over `num_images` sampled scenes.
pub struct BatchRunner<E, R> {
    editor: E,
    writer: OutputWriter,
    config: BatchConfig,
    rng: R,
}

impl<E: ImageEditor, R: Rng + Send> BatchRunner<E, R> {
    /// Creates a runner. The RNG drives scenario, count and suffix draws.
    pub fn new(editor: E, writer: OutputWriter, config: BatchConfig, rng: R) -> Self {
        Self {
            editor,
            writer,
            config,
            rng,
        }
    }

    /// Runs every iteration. Per-image failures are logged and counted,
    /// never returned.
    pub async fn run(&mut self) -> BatchSummary {
        let total = self.config.num_images;
        let mut summary = BatchSummary {
            requested: total,
            ..Default::default()
        };

        tracing::info!(
            total,
            input = %self.config.input_image.display(),
            dest = %self.writer.dest_dir().display(),
            "starting batch"
        );

        for index in 1..=total {
            let scene = sample_scene(&mut self.rng, self.config.scenario);
            let suffix = self.rng.gen_range(1000..=9999);
            let name = self.writer.file_name(scene.scenario, index, suffix);

            tracing::info!(
                index,
                total,
                scenario = %scene.scenario,
                objects = %scene.counts,
                file = %name,
                "generating image"
            );

            match self.generate(&scene).await {
                Ok(image) => match self.writer.write(&name, &image.data) {
                    Ok(path) => {
                        tracing::info!(index, path = %path.display(), bytes = image.size(), "saved image");
                        summary.saved.push(path);
                    }
                    Err(SceneGenError::FileMove { from, to, source }) => {
                        tracing::warn!(
                            index,
                            from = %from.display(),
                            to = %to.display(),
                            "failed to move image: {source}"
                        );
                        summary.unmoved.push(from);
                    }
                    Err(e) => {
                        tracing::error!(index, "failed to write image: {e}");
                        summary.failed += 1;
                    }
                },
                Err(e) => {
                    log_failure(index, &e);
                    summary.failed += 1;
                }
            }

            if index < total && !self.config.request_delay.is_zero() {
                tokio::time::sleep(self.config.request_delay).await;
            }
        }

        tracing::info!(
            requested = summary.requested,
            saved = summary.succeeded(),
            failed = summary.failed,
            unmoved = summary.unmoved.len(),
            "finished batch"
        );
        summary
    }

    async fn generate(&self, scene: &SampledScene) -> Result<EditedImage> {
        let prompt = build_prompt(&scene.counts);
        let request = EditRequest::from_path(
            &self.config.input_image,
            prompt,
            self.config.generation.clone(),
        )?;
        let image = self
            .editor
            .edit_with_retries(&request, &self.config.retry)
            .await?;
        if let Some(text) = image.text.as_deref() {
            tracing::debug!(text, "model commentary");
        }
        Ok(image)
    }
}

fn log_failure(index: u32, error: &SceneGenError) {
    match error {
        SceneGenError::NoImageInResponse { reason, body } => {
            tracing::error!(index, reason = ?reason, response = %body, "no image data in response");
        }
        SceneGenError::RetriesExhausted { attempts } => {
            tracing::error!(
                index,
                attempts,
                "no successful response after {attempts} attempts, check your quota"
            );
        }
        other => tracing::error!(index, "image generation failed: {other}"),
    }
}
