use anyhow::Context as _;
use async_trait::async_trait;
use std::sync::Arc;

use super::{Engine, Submission};
use crate::auth::CredentialSource;
use crate::error::SubmitError;
use crate::history::HistoryStore;
use crate::image::{self, DecodedImage};
use crate::painter::{ImageParams, Painter};

#[derive(Default)]
pub struct CollageConfig {
    pub params: ImageParams,
    /// Paint the combined prompt only after the new-text image is done.
    pub sequential: bool,
}

/// Accumulates prompts and paints the newest one next to all of them.
pub struct CollageEngine {
    painter: Arc<dyn Painter>,
    credentials: Box<dyn CredentialSource>,
    history: Arc<HistoryStore>,
    config: CollageConfig,
}

impl CollageEngine {
    pub fn new(
        painter: Arc<dyn Painter>,
        credentials: Box<dyn CredentialSource>,
        history: Arc<HistoryStore>,
        config: CollageConfig,
    ) -> Self {
        Self {
            painter,
            credentials,
            history,
            config,
        }
    }

    pub fn config(&self) -> &CollageConfig {
        &self.config
    }

    /// Generate, fetch, and decode a single image.
    async fn paint(&self, api_key: &str, prompt: &str) -> Result<DecodedImage, SubmitError> {
        let request = self.config.params.request(prompt);
        let locator = self
            .painter
            .generate(api_key, &request)
            .await
            .map_err(SubmitError::Upstream)?;
        let bytes = self
            .painter
            .fetch(&locator)
            .await
            .context("failed to fetch generated image")
            .map_err(SubmitError::Upstream)?;
        Ok(image::decode(bytes)?)
    }
}

#[async_trait]
impl Engine for CollageEngine {
    async fn submit(&self, session: &str, text: &str) -> Result<Submission, SubmitError> {
        // Recorded before anything can fail; never rolled back.
        let snapshot = self.history.append(session, text).await;
        tracing::info!(session, ordinal = snapshot.ordinal, "prompt recorded");

        let api_key = self.credentials.resolve()?;

        let (prompt_image, combined_image) = if self.config.sequential {
            let prompt_image = self.paint(&api_key, text).await?;
            let combined_image = self.paint(&api_key, &snapshot.combined).await?;
            (prompt_image, combined_image)
        } else {
            futures::try_join!(
                self.paint(&api_key, text),
                self.paint(&api_key, &snapshot.combined),
            )?
        };

        tracing::info!(
            session,
            ordinal = snapshot.ordinal,
            prompt_format = %prompt_image.format,
            combined_format = %combined_image.format,
            "images ready"
        );

        Ok(Submission {
            ordinal: snapshot.ordinal,
            caption: snapshot.caption(),
            combined: snapshot.combined,
            prompt_image,
            combined_image,
        })
    }

    async fn history(&self, session: &str) -> Vec<String> {
        self.history.prompts(session).await
    }
}
