//! Failure modes of a submission.

use thiserror::Error;

use crate::image::DecodeError;

/// Why a submission failed. None of these roll back the history append.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Missing or unusable configuration, reported before any network I/O.
    #[error("configuration error: {0}")]
    Config(String),

    /// The generation service or the image host failed or returned garbage.
    #[error("upstream error: {0:#}")]
    Upstream(anyhow::Error),

    /// The fetched payload is not an image we can display.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl SubmitError {
    pub fn upstream(err: impl Into<anyhow::Error>) -> Self {
        Self::Upstream(err.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
