//! Error types for scene generation.

use std::path::PathBuf;

/// Errors that can occur while generating and saving a scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneGenError {
    /// The base image to edit does not exist.
    #[error("input image not found: {}", .0.display())]
    MissingInputFile(PathBuf),

    /// API key missing or rejected at startup.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The API answered 429.
    #[error("rate limited (HTTP 429)")]
    RateLimited,

    /// Every attempt was rate limited.
    #[error("still rate limited after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// API returned a non-success status other than 429.
    #[error("HTTP error: {status} - {body}")]
    Http { status: u16, body: String },

    /// Network or HTTP transport error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to decode base64 image data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// The response parsed fine but carried no inline image.
    #[error("no image data in API response{}", .reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default())]
    NoImageInResponse {
        reason: Option<String>,
        /// Full response body, kept for diagnosis.
        body: String,
    },

    /// The generated file was written but could not be moved into place.
    #[error("failed to move {} to {}: {source}", .from.display(), .to.display())]
    FileMove {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    /// I/O error (reading the input, writing output).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SceneGenError {
    /// Returns true if the request should be retried with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// Result type alias for scene generation operations.
pub type Result<T> = std::result::Result<T, SceneGenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(SceneGenError::RateLimited.is_retryable());

        assert!(!SceneGenError::Http {
            status: 403,
            body: "forbidden".into()
        }
        .is_retryable());
        assert!(!SceneGenError::RetriesExhausted { attempts: 5 }.is_retryable());
        assert!(!SceneGenError::Decode("bad base64".into()).is_retryable());
        assert!(!SceneGenError::MissingInputFile("a.png".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = SceneGenError::Http {
            status: 403,
            body: "Forbidden".into(),
        };
        assert_eq!(err.to_string(), "HTTP error: 403 - Forbidden");

        let err = SceneGenError::MissingInputFile("scenes/a.png".into());
        assert_eq!(err.to_string(), "input image not found: scenes/a.png");

        let err = SceneGenError::NoImageInResponse {
            reason: Some("IMAGE_SAFETY".into()),
            body: "{}".into(),
        };
        assert_eq!(err.to_string(), "no image data in API response (IMAGE_SAFETY)");

        let err = SceneGenError::NoImageInResponse {
            reason: None,
            body: "{}".into(),
        };
        assert_eq!(err.to_string(), "no image data in API response");
    }
}
