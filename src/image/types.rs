//! Core types for image editing requests and results.

use crate::error::{Result, SceneGenError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image formats recognised for the input image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    Png,
    /// JPEG format (lossy).
    #[default]
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }

    /// Picks the format for an input file: content first, then extension.
    pub fn detect(path: &Path, data: &[u8]) -> Self {
        Self::from_magic_bytes(data)
            .or_else(|| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .and_then(Self::from_extension)
            })
            .unwrap_or_default()
    }
}

/// Output kinds the model is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    /// Free text alongside the image.
    Text,
    /// The edited image.
    Image,
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature. Low values keep edits close to the prompt.
    pub temperature: f32,
    /// Requested response modalities.
    pub response_modalities: Vec<Modality>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            response_modalities: vec![Modality::Text, Modality::Image],
        }
    }
}

impl GenerationConfig {
    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// A request to edit one image.
#[derive(Debug, Clone)]
pub struct EditRequest {
    /// Instruction describing the edit.
    pub prompt: String,
    /// Raw bytes of the image to edit.
    pub image: Vec<u8>,
    /// Declared format of `image`.
    pub format: ImageFormat,
    /// Sampling parameters.
    pub config: GenerationConfig,
}

impl EditRequest {
    /// Creates a request from in-memory image bytes.
    pub fn new(prompt: impl Into<String>, image: Vec<u8>, format: ImageFormat) -> Self {
        Self {
            prompt: prompt.into(),
            image,
            format,
            config: GenerationConfig::default(),
        }
    }

    /// Reads the image at `path` and builds a request around it.
    ///
    /// Fails with [`SceneGenError::MissingInputFile`] if the file does not
    /// exist.
    pub fn from_path(
        path: impl AsRef<Path>,
        prompt: impl Into<String>,
        config: GenerationConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SceneGenError::MissingInputFile(path.to_path_buf()));
        }
        let image = std::fs::read(path)?;
        let format = ImageFormat::detect(path, &image);
        Ok(Self {
            prompt: prompt.into(),
            image,
            format,
            config,
        })
    }

    /// Encodes the image as standard base64.
    pub fn image_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.image)
    }
}

/// An edited image returned by the API.
#[derive(Debug, Clone)]
#[must_use = "edited image should be saved or processed"]
pub struct EditedImage {
    /// Decoded image bytes.
    pub data: Vec<u8>,
    /// MIME type declared by the API, if any.
    pub mime_type: Option<String>,
    /// Text parts returned alongside the image.
    pub text: Option<String>,
    /// Model that produced the image.
    pub model: Option<String>,
    /// Request duration in milliseconds.
    pub duration_ms: Option<u64>,
}

impl EditedImage {
    /// Wraps decoded bytes with no extra metadata.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            data,
            mime_type: None,
            text: None,
            model: None,
            duration_ms: None,
        }
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}
