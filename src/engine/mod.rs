pub mod collage;

use async_trait::async_trait;

use crate::error::SubmitError;
use crate::image::DecodedImage;

/// What one submission produces for the GUI.
#[derive(Debug, Clone)]
pub struct Submission {
    /// 1-indexed position of the prompt in its history.
    pub ordinal: usize,
    /// Space-joined history including this prompt.
    pub combined: String,
    /// `prompt_N: <combined>`.
    pub caption: String,
    /// Image for the new text alone.
    pub prompt_image: DecodedImage,
    /// Image for the whole history.
    pub combined_image: DecodedImage,
}

/// The outermost boundary. The server and the CLI only know this trait.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Record `text` in the session's history and paint both images.
    async fn submit(&self, session: &str, text: &str) -> Result<Submission, SubmitError>;

    /// Prompts recorded for a session, oldest first.
    async fn history(&self, session: &str) -> Vec<String>;
}
