use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the ideation workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stage {
    Generate,
    Edit,
    Video,
}

/// Where a stage sits relative to the current one, for the stage indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Done,
    Active,
    Pending,
}

impl Stage {
    pub fn all() -> [Stage; 3] {
        [Stage::Generate, Stage::Edit, Stage::Video]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Stage::Generate => "1. Create Concept",
            Stage::Edit => "2. Refine Image",
            Stage::Video => "3. Synthesize Video",
        }
    }

    /// Forward moves one step at a time, plus the single VIDEO -> EDIT step back.
    /// Reset to GENERATE is handled separately.
    pub fn can_transition_to(&self, next: Stage) -> bool {
        matches!(
            (self, next),
            (Stage::Generate, Stage::Edit) | (Stage::Edit, Stage::Video) | (Stage::Video, Stage::Edit)
        )
    }

    pub fn status_relative_to(&self, current: Stage) -> StageStatus {
        if *self == current {
            StageStatus::Active
        } else if *self < current {
            StageStatus::Done
        } else {
            StageStatus::Pending
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Generate => "GENERATE",
            Stage::Edit => "EDIT",
            Stage::Video => "VIDEO",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingState {
    pub active: bool,
    pub message: String,
}

impl LoadingState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn busy(message: impl Into<String>) -> Self {
        Self {
            active: true,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        assert!(Stage::Generate.can_transition_to(Stage::Edit));
        assert!(Stage::Edit.can_transition_to(Stage::Video));
        assert!(Stage::Video.can_transition_to(Stage::Edit));

        assert!(!Stage::Generate.can_transition_to(Stage::Video));
        assert!(!Stage::Edit.can_transition_to(Stage::Generate));
        assert!(!Stage::Video.can_transition_to(Stage::Generate));
        assert!(!Stage::Edit.can_transition_to(Stage::Edit));
    }

    #[test]
    fn test_stage_indicator_status() {
        assert_eq!(Stage::Generate.status_relative_to(Stage::Video), StageStatus::Done);
        assert_eq!(Stage::Edit.status_relative_to(Stage::Video), StageStatus::Done);
        assert_eq!(Stage::Video.status_relative_to(Stage::Video), StageStatus::Active);
        assert_eq!(Stage::Video.status_relative_to(Stage::Edit), StageStatus::Pending);
    }

    #[test]
    fn test_stage_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Stage::Edit).unwrap(), "\"EDIT\"");
        assert_eq!(Stage::Video.to_string(), "VIDEO");
    }
}
