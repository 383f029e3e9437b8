//! Clues revealed during an investigation

use super::Id;
use serde::{Deserialize, Serialize};

/// Categories of clue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClueCategory {
    /// Something found at a scene or seized
    PhysicalEvidence,
    /// A statement from a witness or suspect
    Testimony,
    /// Notes, letters, footage logs, mail
    Document,
}

impl std::fmt::Display for ClueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClueCategory::PhysicalEvidence => write!(f, "Physical Evidence"),
            ClueCategory::Testimony => write!(f, "Testimony"),
            ClueCategory::Document => write!(f, "Document"),
        }
    }
}

/// A clue the detective has uncovered.
///
/// Equality compares every field, not just the id: the cumulative clue set of
/// a snapshot suppresses duplicates by full value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub id: Id,
    pub title: String,
    pub detail: String,
    pub category: ClueCategory,
}

impl Clue {
    pub fn new(title: &str, detail: &str, category: ClueCategory) -> Self {
        Self {
            id: Id::new(),
            title: title.to_string(),
            detail: detail.to_string(),
            category,
        }
    }

    /// Get a brief description of the clue
    pub fn brief(&self) -> String {
        format!("{} [{}]", self.title, self.category)
    }
}
