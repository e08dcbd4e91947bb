//! Image editing backends.

mod gemini;

pub use gemini::{GeminiClient, GeminiClientBuilder, GeminiModel, API_KEY_ENV, DEFAULT_BASE_URL};
