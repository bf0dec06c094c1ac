use serde::{Deserialize, Serialize};

/// Discriminant of a [`LessonBlock`], handy for renderers that dispatch on kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Narrative,
    Watch,
    TryIt,
    Quiz,
    Diagram,
    Example,
    Interactive,
    KeyPoints,
    BestPractices,
}

impl BlockKind {
    /// Whether the presentation layer shows this kind behind a disclosure toggle.
    #[must_use]
    pub fn is_disclosable(self) -> bool {
        matches!(self, Self::TryIt | Self::Interactive)
    }
}

/// One classified segment of a lesson body.
///
/// Blocks carry content identity only. Disclosure toggles and quiz drafts
/// live in [`crate::interaction::BlockInteractions`], keyed by block position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LessonBlock {
    Narrative { markdown: String },
    Watch { url: String },
    TryIt { body: String },
    Quiz { question: String },
    Diagram { body: String },
    Example { body: String },
    Interactive { body: String },
    KeyPoints { points: Vec<String> },
    BestPractices { points: Vec<String> },
}

/// URL used for a `Watch` block whose segment carries no parenthesized link.
pub const WATCH_PLACEHOLDER_URL: &str = "#";

impl LessonBlock {
    #[must_use]
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Narrative { .. } => BlockKind::Narrative,
            Self::Watch { .. } => BlockKind::Watch,
            Self::TryIt { .. } => BlockKind::TryIt,
            Self::Quiz { .. } => BlockKind::Quiz,
            Self::Diagram { .. } => BlockKind::Diagram,
            Self::Example { .. } => BlockKind::Example,
            Self::Interactive { .. } => BlockKind::Interactive,
            Self::KeyPoints { .. } => BlockKind::KeyPoints,
            Self::BestPractices { .. } => BlockKind::BestPractices,
        }
    }

    /// Free-form text for the body-carrying kinds.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Narrative { markdown } => Some(markdown),
            Self::TryIt { body }
            | Self::Diagram { body }
            | Self::Example { body }
            | Self::Interactive { body } => Some(body),
            Self::Quiz { question } => Some(question),
            Self::Watch { .. } | Self::KeyPoints { .. } | Self::BestPractices { .. } => None,
        }
    }

    #[must_use]
    pub fn points(&self) -> Option<&[String]> {
        match self {
            Self::KeyPoints { points } | Self::BestPractices { points } => Some(points),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_kind_tag() {
        let block = LessonBlock::Watch {
            url: "https://example.com/v".into(),
        };
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, r#"{"kind":"watch","url":"https://example.com/v"}"#);
    }

    #[test]
    fn only_try_it_and_interactive_are_disclosable() {
        assert!(BlockKind::TryIt.is_disclosable());
        assert!(BlockKind::Interactive.is_disclosable());
        assert!(!BlockKind::Quiz.is_disclosable());
        assert!(!BlockKind::Narrative.is_disclosable());
    }
}
