//! Gemini (Google) image editing client.

use crate::error::{Result, SceneGenError};
use crate::image::provider::ImageEditor;
use crate::image::types::{EditRequest, EditedImage, GenerationConfig, Modality};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Default API root for the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 2.5 Flash Image, preview endpoint.
    #[default]
    FlashImagePreview,
    /// Gemini 2.5 Flash Image, stable endpoint.
    FlashImage,
    /// Gemini 3 Pro Image, preview endpoint.
    ProImagePreview,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlashImagePreview => "gemini-2.5-flash-image-preview",
            Self::FlashImage => "gemini-2.5-flash-image",
            Self::ProImagePreview => "gemini-3-pro-image-preview",
        }
    }
}

/// Builder for [`GeminiClient`].
#[derive(Debug, Clone, Default)]
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    model: GeminiModel,
    base_url: Option<String>,
    http_client: Option<reqwest::Client>,
}

impl GeminiClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API root (no trailing slash needed).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Uses a preconfigured HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the client, resolving the API key.
    pub fn build(self) -> Result<GeminiClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|key| !key.trim().is_empty()))
            .ok_or_else(|| {
                SceneGenError::Auth(format!("{API_KEY_ENV} not set and no API key provided"))
            })?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(GeminiClient {
            client: self.http_client.unwrap_or_default(),
            api_key,
            model: self.model,
            base_url,
        })
    }
}

/// Gemini image editing client.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: GeminiModel,
    base_url: String,
}

impl GeminiClient {
    /// Creates a new `GeminiClientBuilder`.
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::new()
    }

    /// Returns the configured model.
    pub fn model(&self) -> GeminiModel {
        self.model
    }

    fn model_url(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model.as_str())
    }

    async fn edit_impl(&self, request: &EditRequest) -> Result<EditedImage> {
        let start = Instant::now();
        let url = format!("{}:generateContent", self.model_url());
        let body = GeminiRequest::from_edit_request(request);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Self::parse_error(status.as_u16(), text));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&text)?;
        let mut image = gemini_response.into_image(text)?;
        image.model = Some(self.model.as_str().to_string());
        image.duration_ms = Some(start.elapsed().as_millis() as u64);
        Ok(image)
    }

    fn parse_error(status: u16, body: String) -> SceneGenError {
        if status == 429 {
            return SceneGenError::RateLimited;
        }
        SceneGenError::Http { status, body }
    }
}

#[async_trait]
impl ImageEditor for GeminiClient {
    async fn edit(&self, request: &EditRequest) -> Result<EditedImage> {
        self.edit_impl(request).await
    }

    fn name(&self) -> &str {
        self.model.as_str()
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(self.model_url())
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            400 | 401 | 403 => Err(SceneGenError::Auth("API key rejected".into())),
            429 => Err(SceneGenError::RateLimited),
            s if !(200..300).contains(&s) => Err(SceneGenError::Http {
                status: s,
                body: response.text().await.unwrap_or_default(),
            }),
            _ => Ok(()),
        }
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - can be text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<Modality>,
    temperature: f32,
}

impl From<&GenerationConfig> for GeminiConfig {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            response_modalities: config.response_modalities.clone(),
            temperature: config.temperature,
        }
    }
}

impl GeminiRequest {
    fn from_edit_request(req: &EditRequest) -> Self {
        let parts = vec![
            GeminiRequestPart::Text {
                text: req.prompt.clone(),
            },
            GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: req.format.mime_type().to_string(),
                    data: req.image_base64(),
                },
            },
        ];

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig::from(&req.config),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    data: String,
}

impl GeminiResponse {
    /// Extracts the first non-empty inline image across all candidates.
    ///
    /// `raw` is the response body, attached to the error when no image is
    /// present.
    fn into_image(self, raw: String) -> Result<EditedImage> {
        let reason = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
            .or_else(|| {
                self.candidates
                    .first()
                    .and_then(|c| c.finish_reason.clone())
            });

        let parts = self
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|content| content.parts);

        let mut texts = Vec::new();
        let mut inline = None;
        for part in parts {
            if let Some(text) = part.text {
                texts.push(text);
            }
            if inline.is_none() {
                inline = part.inline_data.filter(|d| !d.data.trim().is_empty());
            }
        }

        let Some(inline) = inline else {
            return Err(SceneGenError::NoImageInResponse { reason, body: raw });
        };

        let data = base64::engine::general_purpose::STANDARD
            .decode(inline.data.trim())
            .map_err(|e| SceneGenError::Decode(e.to_string()))?;

        Ok(EditedImage {
            data,
            mime_type: inline.mime_type,
            text: (!texts.is_empty()).then(|| texts.join("\n")),
            model: None,
            duration_ms: None,
        })
    }
}
