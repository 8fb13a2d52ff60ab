//! Turning fetched bytes into something the GUI can display.
//!
//! The payload is fully decoded to prove it is an image, but the browser
//! gets the original bytes as a `data:` URL, never a re-encoding.

use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("image payload is empty")]
    Empty,
    #[error("unrecognized image format (leading bytes {0:02x?})")]
    Unrecognized(Vec<u8>),
    #[error("{0} images cannot be displayed")]
    Unsupported(String),
    #[error("corrupt {format} image: {reason}")]
    Corrupt { format: ImageFormat, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
}

impl ImageFormat {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::WebP => "webp",
        }
    }

    fn codec(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Gif => image::ImageFormat::Gif,
            Self::WebP => image::ImageFormat::WebP,
        }
    }
}

impl TryFrom<image::ImageFormat> for ImageFormat {
    type Error = DecodeError;

    fn try_from(format: image::ImageFormat) -> Result<Self, Self::Error> {
        match format {
            image::ImageFormat::Png => Ok(Self::Png),
            image::ImageFormat::Jpeg => Ok(Self::Jpeg),
            image::ImageFormat::Gif => Ok(Self::Gif),
            image::ImageFormat::WebP => Ok(Self::WebP),
            other => Err(DecodeError::Unsupported(format!("{other:?}"))),
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Gif => "GIF",
            Self::WebP => "WebP",
        };
        f.write_str(name)
    }
}

/// A payload that decoded cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// Render as a `data:` URL suitable for an `<img src>`.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime(),
            STANDARD.encode(&self.bytes)
        )
    }
}

/// Detect the format and decode every pixel.
pub fn decode(bytes: Vec<u8>) -> Result<DecodedImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let format: ImageFormat = image::guess_format(&bytes)
        .map_err(|_| DecodeError::Unrecognized(bytes.iter().take(8).copied().collect()))?
        .try_into()?;

    let decoded = image::load_from_memory_with_format(&bytes, format.codec()).map_err(|e| {
        DecodeError::Corrupt {
            format,
            reason: e.to_string(),
        }
    })?;

    Ok(DecodedImage {
        format,
        width: decoded.width(),
        height: decoded.height(),
        bytes,
    })
}
