use crate::error::{IdeationError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An image held as a base64 payload plus its MIME type.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageArtifact {
    pub base64: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

impl ImageArtifact {
    pub fn new(base64: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            base64: base64.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self::new(STANDARD.encode(bytes), mime_type)
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.base64.as_bytes())
            .map_err(IdeationError::from)
    }

    /// File extension matching the MIME type, `png` when unknown.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/heic" => "heic",
            "image/heif" => "heif",
            _ => "png",
        }
    }

    /// Decoded size in bytes, computed from the base64 length.
    pub fn approx_size(&self) -> usize {
        let padding = self.base64.bytes().rev().take_while(|b| *b == b'=').count();
        ((self.base64.len() / 4) * 3).saturating_sub(padding.min(2))
    }
}

impl fmt::Debug for ImageArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageArtifact")
            .field("mime_type", &self.mime_type)
            .field("base64_len", &self.base64.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9 (Landscape)",
            AspectRatio::Portrait => "9:16 (Portrait)",
        }
    }

    pub fn all() -> [AspectRatio; 2] {
        [AspectRatio::Landscape, AspectRatio::Portrait]
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = IdeationError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(ratio) = AspectRatio::all().into_iter().find(|r| r.as_str() == s) {
            return Ok(ratio);
        }
        match s.to_ascii_lowercase().as_str() {
            "landscape" => Ok(AspectRatio::Landscape),
            "portrait" => Ok(AspectRatio::Portrait),
            _ => Err(IdeationError::validation(format!(
                "Unsupported aspect ratio '{}'. Use 16:9 or 9:16.",
                s
            ))),
        }
    }
}
