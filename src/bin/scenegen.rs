//! CLI for scenegen - batch street-scene augmentation.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scenegen::image::{GeminiClient, GeminiModel, GenerationConfig, ImageEditor, RetryPolicy};
use scenegen::{BatchConfig, BatchRunner, OutputWriter, Scenario, SceneGenError};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scenegen")]
#[command(about = "Generate images with pedestrians, bicycles and vehicles using the Gemini API")]
#[command(version)]
struct Cli {
    /// Path to the input image
    #[arg(
        short = 'i',
        long = "input_image",
        alias = "input-image",
        default_value = "background_images/CAM1.png"
    )]
    input_image: PathBuf,

    /// Destination folder for generated images
    #[arg(
        short = 'd',
        long = "dest_folder",
        alias = "dest-folder",
        default_value = "output/CAM1_ped_bic_new_prompt/images"
    )]
    dest_folder: PathBuf,

    /// Number of images to generate
    #[arg(
        short = 'n',
        long = "num_images",
        alias = "num-images",
        default_value_t = 200
    )]
    num_images: u32,

    /// Use one scenario for every image instead of sampling
    #[arg(long, value_enum)]
    scenario: Option<ScenarioArg>,

    /// Seed for reproducible scenario and count sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Gemini model
    #[arg(short, long, value_enum, default_value = "flash-image-preview")]
    model: ModelArg,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.1)]
    temperature: f32,

    /// Seconds to wait between requests
    #[arg(long, default_value_t = 2)]
    delay: u64,

    /// Attempts per image when rate limited
    #[arg(long, default_value_t = 5)]
    max_attempts: u32,

    /// Seconds before the first retry (doubles after each retry)
    #[arg(long, default_value_t = 10)]
    initial_backoff: u64,

    /// File name prefix for generated images
    #[arg(long, default_value = scenegen::output::DEFAULT_PREFIX)]
    prefix: String,

    /// Directory images are written to before being moved
    #[arg(long, default_value = ".")]
    staging_dir: PathBuf,

    /// API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Skip the API key check before the batch starts
    #[arg(long)]
    no_preflight: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScenarioArg {
    #[value(name = "bicycle_heavy")]
    BicycleHeavy,
    #[value(name = "pedestrian_heavy")]
    PedestrianHeavy,
    #[value(name = "truck_bus_heavy")]
    TruckBusHeavy,
    #[value(name = "motorcycle_heavy")]
    MotorcycleHeavy,
    #[value(name = "mixed_balanced")]
    MixedBalanced,
}

impl From<ScenarioArg> for Scenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::BicycleHeavy => Scenario::BicycleHeavy,
            ScenarioArg::PedestrianHeavy => Scenario::PedestrianHeavy,
            ScenarioArg::TruckBusHeavy => Scenario::TruckBusHeavy,
            ScenarioArg::MotorcycleHeavy => Scenario::MotorcycleHeavy,
            ScenarioArg::MixedBalanced => Scenario::MixedBalanced,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    FlashImagePreview,
    FlashImage,
    ProImagePreview,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::FlashImagePreview => GeminiModel::FlashImagePreview,
            ModelArg::FlashImage => GeminiModel::FlashImage,
            ModelArg::ProImagePreview => GeminiModel::ProImagePreview,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scenegen=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut builder = GeminiClient::builder().model(cli.model.into());
    if let Some(key) = cli.api_key.clone() {
        builder = builder.api_key(key);
    }
    let client = builder.build()?;

    if !cli.no_preflight {
        match client.health_check().await {
            Ok(()) => tracing::info!(model = client.model().as_str(), "API key accepted"),
            Err(SceneGenError::RateLimited) => tracing::warn!(
                model = client.model().as_str(),
                "preflight rate limited, continuing; requests will back off"
            ),
            Err(e) => {
                return Err(e).context("API preflight failed (use --no-preflight to skip)");
            }
        }
    }

    let writer = OutputWriter::new(&cli.dest_folder)
        .with_staging_dir(&cli.staging_dir)
        .with_prefix(&cli.prefix);
    writer.prepare().with_context(|| {
        format!(
            "cannot create destination folder {}",
            cli.dest_folder.display()
        )
    })?;

    let config = BatchConfig {
        num_images: cli.num_images,
        request_delay: Duration::from_secs(cli.delay),
        scenario: cli.scenario.map(Into::into),
        generation: GenerationConfig::default().with_temperature(cli.temperature),
        retry: RetryPolicy::new(cli.max_attempts, Duration::from_secs(cli.initial_backoff)),
        ..BatchConfig::new(&cli.input_image)
    };

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let summary = BatchRunner::new(client, writer, config, rng).run().await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Finished generating images: {} saved, {} failed, {} not moved (of {})",
            summary.succeeded(),
            summary.failed,
            summary.unmoved.len(),
            summary.requested
        );
    }

    Ok(())
}
