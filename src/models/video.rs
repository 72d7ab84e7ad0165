use crate::models::image::{AspectRatio, ImageArtifact};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct VideoRequest {
    pub prompt: String,
    pub image: ImageArtifact,
    pub aspect_ratio: AspectRatio,
}

/// A playable video produced by the generation service. The bytes are fetched
/// separately with the same credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoReference {
    pub uri: String,
    pub mime_type: String,
}

impl VideoReference {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: "video/mp4".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoEvent {
    Progress(String),
    Completed(VideoReference),
}
