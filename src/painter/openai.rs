use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use async_trait::async_trait;
use serde::Deserialize;

use crate::consts::DEFAULT_API_BASE;

use super::{ImageLocator, ImageRequest, Painter, decode_inline};

/// Calls the OpenAI Images API and downloads the results over HTTP.
pub struct OpenAiPainter {
    client: reqwest::Client,
    api_base: String,
}

impl OpenAiPainter {
    /// `timeout` applies to each request; `None` waits indefinitely.
    pub fn new(api_base: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build HTTP client")?;
        let api_base = api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Self { client, api_base })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn generations_url(&self) -> String {
        format!("{}/images/generations", self.api_base)
    }

    fn parse_response(body: &str) -> Result<ImageLocator> {
        let resp: ApiResponse = serde_json::from_str(body)
            .with_context(|| format!("failed to parse image API response: {body}"))?;

        let Some(image) = resp.data.into_iter().next() else {
            bail!("image API returned no images");
        };

        match (image.url, image.b64_json) {
            (Some(url), _) if !url.is_empty() => Ok(ImageLocator::Url(url)),
            (_, Some(b64)) if !b64.is_empty() => Ok(ImageLocator::Inline(b64)),
            _ => bail!("image API response has neither url nor b64_json"),
        }
    }
}

#[async_trait]
impl Painter for OpenAiPainter {
    async fn generate(&self, api_key: &str, request: &ImageRequest) -> Result<ImageLocator> {
        tracing::debug!(
            model = %request.model,
            size = %request.size,
            prompt_len = request.prompt.len(),
            "requesting image generation"
        );

        let resp = self
            .client
            .post(self.generations_url())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .context("image generation request failed")?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            bail!("OpenAI API error ({}): {}", status, text);
        }

        Self::parse_response(&text)
    }

    async fn fetch(&self, locator: &ImageLocator) -> Result<Vec<u8>> {
        let url = match locator {
            ImageLocator::Url(url) => url,
            ImageLocator::Inline(b64) => return decode_inline(b64),
        };

        tracing::debug!(%url, "fetching generated image");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("image download failed")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("image download failed ({})", status);
        }

        let bytes = resp.bytes().await.context("image download interrupted")?;
        Ok(bytes.to_vec())
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    data: Vec<ApiImage>,
}

#[derive(Deserialize)]
struct ApiImage {
    url: Option<String>,
    b64_json: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_url_response() {
        let body = r#"{"created": 1700000000, "data": [{"url": "https://img.example/1.png"}]}"#;
        assert_eq!(
            OpenAiPainter::parse_response(body).unwrap(),
            ImageLocator::Url("https://img.example/1.png".to_string())
        );
    }

    #[test]
    fn parses_inline_response() {
        let body = r#"{"data": [{"b64_json": "R0lGODlh"}]}"#;
        assert_eq!(
            OpenAiPainter::parse_response(body).unwrap(),
            ImageLocator::Inline("R0lGODlh".to_string())
        );
    }

    #[test]
    fn takes_first_image_only() {
        let body = r#"{"data": [{"url": "https://a"}, {"url": "https://b"}]}"#;
        assert_eq!(
            OpenAiPainter::parse_response(body).unwrap(),
            ImageLocator::Url("https://a".to_string())
        );
    }

    #[test]
    fn empty_data_is_error() {
        let err = OpenAiPainter::parse_response(r#"{"data": []}"#).unwrap_err();
        assert!(err.to_string().contains("no images"));
    }

    #[test]
    fn entry_without_locator_is_error() {
        let err = OpenAiPainter::parse_response(r#"{"data": [{"revised_prompt": "x"}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("neither url nor b64_json"));
    }

    #[test]
    fn malformed_json_is_error() {
        assert!(OpenAiPainter::parse_response("<html>").is_err());
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let painter = OpenAiPainter::new(Some("http://localhost:9000/v1/".to_string()), None)
            .unwrap();
        assert_eq!(painter.api_base(), "http://localhost:9000/v1");
        assert_eq!(
            painter.generations_url(),
            "http://localhost:9000/v1/images/generations"
        );
    }

    #[test]
    fn default_api_base() {
        let painter = OpenAiPainter::new(None, Some(Duration::from_secs(5))).unwrap();
        assert_eq!(painter.api_base(), "https://api.openai.com/v1");
    }
}
