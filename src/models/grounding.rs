use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCitation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A citation ready to display: always has a link, label falls back to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSource {
    pub label: String,
    pub uri: String,
}

impl SourceCitation {
    pub fn new(uri: Option<&str>, title: Option<&str>) -> Self {
        Self {
            uri: uri.map(String::from),
            title: title.map(String::from),
        }
    }

    pub fn render(&self) -> Option<RenderedSource> {
        let uri = self.uri.as_deref().filter(|u| !u.trim().is_empty())?;
        let label = self
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(uri);

        Some(RenderedSource {
            label: label.to_string(),
            uri: uri.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundedAnswer {
    pub text: String,
    pub sources: Vec<SourceCitation>,
}

impl GroundedAnswer {
    /// Sources in their original order, skipping those without a link.
    pub fn rendered_sources(&self) -> Vec<RenderedSource> {
        self.sources.iter().filter_map(SourceCitation::render).collect()
    }
}
