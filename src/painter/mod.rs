pub mod mock;
pub mod openai;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Serialize;

use crate::consts::{DEFAULT_MODEL, DEFAULT_QUALITY, DEFAULT_SIZE, IMAGES_PER_REQUEST};

/// Parameters for one generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
    pub quality: String,
    pub n: u32,
}

/// Everything about a request except the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageParams {
    pub model: String,
    pub size: String,
    pub quality: String,
}

impl Default for ImageParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            size: DEFAULT_SIZE.to_string(),
            quality: DEFAULT_QUALITY.to_string(),
        }
    }
}

impl ImageParams {
    /// A single-image request for `prompt`.
    pub fn request(&self, prompt: &str) -> ImageRequest {
        ImageRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            size: self.size.clone(),
            quality: self.quality.clone(),
            n: IMAGES_PER_REQUEST,
        }
    }
}

/// Where a generated image can be picked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLocator {
    /// Fetch with a plain GET.
    Url(String),
    /// Base64 payload returned inline by the service.
    Inline(String),
}

/// Bytes of an [`ImageLocator::Inline`] payload.
pub fn decode_inline(b64: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(b64.trim())
        .context("inline image is not valid base64")
}

/// The image service. Could be OpenAI, a proxy, or a test script.
#[async_trait]
pub trait Painter: Send + Sync {
    /// Ask the service for one image.
    async fn generate(&self, api_key: &str, request: &ImageRequest) -> Result<ImageLocator>;

    /// Download the image behind a locator.
    async fn fetch(&self, locator: &ImageLocator) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    #[test]
    fn default_params_build_fixed_request() {
        let req = ImageParams::default().request("cat");
        assert_eq!(
            req,
            ImageRequest {
                model: "dall-e-2".to_string(),
                prompt: "cat".to_string(),
                size: "512x512".to_string(),
                quality: "standard".to_string(),
                n: 1,
            }
        );
    }

    #[test]
    fn request_serializes_api_field_names() {
        let json = serde_json::to_value(ImageParams::default().request("cat hat")).unwrap();
        assert_eq!(json["prompt"], "cat hat");
        assert_eq!(json["size"], "512x512");
        assert_eq!(json["n"], 1);
    }

    #[test]
    fn inline_payload_decodes() {
        let b64 = STANDARD.encode(b"GIF89a");
        assert_eq!(decode_inline(&b64).unwrap(), b"GIF89a");
    }

    #[test]
    fn inline_payload_tolerates_trailing_newline() {
        let b64 = format!("{}\n", STANDARD.encode(b"GIF89a"));
        assert_eq!(decode_inline(&b64).unwrap(), b"GIF89a");
    }

    #[test]
    fn inline_payload_rejects_garbage() {
        assert!(decode_inline("not base64!!").is_err());
    }
}
