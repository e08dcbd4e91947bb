//! Image editing module.

mod provider;
pub mod providers;
mod types;

pub use provider::{ImageEditor, ImageEditorExt, RetryPolicy};
pub use providers::{GeminiClient, GeminiClientBuilder, GeminiModel};
pub use types::{EditRequest, EditedImage, GenerationConfig, ImageFormat, Modality};
