#![warn(missing_docs)]
//! scenegen - synthetic street-scene augmentation for detection datasets.
//!
//! Each generated image starts from the same base photo. A scenario is
//! sampled, object counts are drawn for it, and the counts are rendered into
//! an editing prompt that asks Gemini to add pedestrians, bicycles, trucks,
//! buses, motorcycles and cars to the scene. Rate-limited requests are retried
//! with exponential backoff and results land in a destination folder.
//!
//! # Quick Start
//!
//! ```no_run
//! use rand::SeedableRng;
//! use scenegen::{BatchConfig, BatchRunner, GeminiClient, OutputWriter};
//!
//! #[tokio::main]
//! async fn main() -> scenegen::Result<()> {
//!     let client = GeminiClient::builder().build()?;
//!     let writer = OutputWriter::new("output/images");
//!     writer.prepare()?;
//!
//!     let mut config = BatchConfig::new("background_images/CAM1.png");
//!     config.num_images = 10;
//!
//!     let rng = rand::rngs::StdRng::from_entropy();
//!     let summary = BatchRunner::new(client, writer, config, rng).run().await;
//!     println!("saved {} of {}", summary.succeeded(), summary.requested);
//!     Ok(())
//! }
//! ```
//!
//! # Single edit
//!
//! ```no_run
//! use scenegen::image::{EditRequest, GenerationConfig, ImageEditorExt, RetryPolicy};
//! use scenegen::{build_prompt, GeminiClient, Scenario};
//!
//! #[tokio::main]
//! async fn main() -> scenegen::Result<()> {
//!     let client = GeminiClient::builder().build()?;
//!     let counts = Scenario::BicycleHeavy.sample_counts(&mut rand::thread_rng());
//!     let request = EditRequest::from_path(
//!         "street.png",
//!         build_prompt(&counts),
//!         GenerationConfig::default(),
//!     )?;
//!     let image = client
//!         .edit_with_retries(&request, &RetryPolicy::default())
//!         .await?;
//!     std::fs::write("edited.png", &image.data)?;
//!     Ok(())
//! }
//! ```

mod error;

pub mod batch;
pub mod image;
pub mod output;
pub mod prompt;
pub mod scenario;

#[cfg(test)]
mod test_support;

// Re-export error types at crate root
pub use error::{Result, SceneGenError};

pub use batch::{BatchConfig, BatchRunner, BatchSummary};
pub use image::{
    EditRequest, EditedImage, GeminiClient, GeminiClientBuilder, GeminiModel, GenerationConfig,
    ImageEditor, ImageEditorExt, ImageFormat, RetryPolicy,
};
pub use output::OutputWriter;
pub use prompt::build_prompt;
pub use scenario::{sample_scene, ObjectCounts, SampledScene, Scenario};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::batch::{BatchConfig, BatchRunner, BatchSummary};
    pub use crate::error::{Result, SceneGenError};
    pub use crate::image::{EditRequest, EditedImage, GeminiClient, ImageEditor, ImageEditorExt};
    pub use crate::output::OutputWriter;
    pub use crate::scenario::Scenario;
}
