//! Project-wide constants.

use std::path::PathBuf;

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Image model used for every generation request.
pub const DEFAULT_MODEL: &str = "dall-e-2";

/// Fixed output size for generated images.
pub const DEFAULT_SIZE: &str = "512x512";

/// Quality tier sent with every generation request.
pub const DEFAULT_QUALITY: &str = "standard";

/// Images requested per generation call.
pub const IMAGES_PER_REQUEST: u32 = 1;

/// Base URL of the OpenAI REST API.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Environment variable holding the OpenAI API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding [`DEFAULT_API_BASE`].
pub const API_BASE_ENV: &str = "OPENAI_BASE_URL";

/// Default port for the web GUI.
pub const DEFAULT_PORT: u16 = 7860;

/// Separator used when joining the prompt history.
pub const PROMPT_SEPARATOR: &str = " ";

/// Session key used when the client does not send one.
pub const DEFAULT_SESSION: &str = "default";

/// Preferred `.env` location: `~/.imagist/.env`.
/// `None` when the home directory cannot be determined.
pub fn home_env_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".imagist").join(".env"))
}

/// Ordinal tag for the n-th prompt (1-indexed), e.g. `prompt_3`.
pub fn prompt_label(ordinal: usize) -> String {
    format!("prompt_{ordinal}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consts_are_non_empty() {
        assert!(!AUTHOR.is_empty());
        assert!(!HOMEPAGE.is_empty());
        assert!(!REPO.is_empty());
        assert!(!DEFAULT_MODEL.is_empty());
    }

    #[test]
    fn consts_from_cargo_toml() {
        assert!(AUTHOR.contains("Assaf Sapir"));
        assert!(HOMEPAGE.contains("sapir.io"));
        assert!(REPO.contains("github.com/assapir/imagist"));
    }

    #[test]
    fn generation_parameters() {
        assert_eq!(DEFAULT_MODEL, "dall-e-2");
        assert_eq!(DEFAULT_SIZE, "512x512");
        assert_eq!(DEFAULT_QUALITY, "standard");
        assert_eq!(IMAGES_PER_REQUEST, 1);
    }

    #[test]
    fn prompt_label_is_one_indexed_tag() {
        assert_eq!(prompt_label(1), "prompt_1");
        assert_eq!(prompt_label(42), "prompt_42");
    }

    #[test]
    fn home_env_path_ends_with_dotenv() {
        if let Some(path) = home_env_path() {
            assert!(path.ends_with(".imagist/.env"));
        }
    }
}
