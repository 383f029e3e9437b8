//! The turn log of a case conversation

use super::{Clue, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Speaker {
    Detective,
    Engine,
}

/// A single line in the case log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseTurn {
    pub id: Id,
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub new_clues: Vec<Clue>,  // Clues revealed by this turn
}

impl CaseTurn {
    /// A question asked by the player, kept verbatim
    pub fn detective(text: &str) -> Self {
        Self {
            id: Id::new(),
            speaker: Speaker::Detective,
            text: text.to_string(),
            timestamp: Utc::now(),
            new_clues: Vec::new(),
        }
    }

    /// A scripted response
    pub fn engine(text: &str, new_clues: Vec<Clue>) -> Self {
        Self {
            id: Id::new(),
            speaker: Speaker::Engine,
            text: text.to_string(),
            timestamp: Utc::now(),
            new_clues,
        }
    }

    pub fn is_engine(&self) -> bool {
        self.speaker == Speaker::Engine
    }
}
