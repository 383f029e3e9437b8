//! Data structures for case sessions
//!
//! Defines case types, clues, suspects, turns, snapshots and hints.

pub mod clue;
pub mod hint;
pub mod snapshot;
pub mod suspect;
pub mod turn;

pub use clue::*;
pub use hint::*;
pub use snapshot::*;
pub use suspect::*;
pub use turn::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kinds of case a player can open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaseType {
    Homicide,
    MissingPerson,
    Heist,
}

impl CaseType {
    pub const ALL: [CaseType; 3] = [CaseType::Homicide, CaseType::MissingPerson, CaseType::Heist];

    /// Energy debited when a case of this type is opened
    pub fn energy_cost(&self) -> u32 {
        match self {
            CaseType::Homicide => 2,
            CaseType::MissingPerson => 1,
            CaseType::Heist => 3,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CaseType::Homicide => "Homicide",
            CaseType::MissingPerson => "Missing Person",
            CaseType::Heist => "High-Profile Heist",
        }
    }

    pub fn tagline(&self) -> &'static str {
        match self {
            CaseType::Homicide => "A murder behind a hotel room door.",
            CaseType::MissingPerson => "A young reporter vanishes mid-story.",
            CaseType::Heist => "Jewels lifted from the city's safest vault.",
        }
    }

    /// Parse the short command-line name of a case type
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.to_ascii_lowercase().as_str() {
            "homicide" => Some(CaseType::Homicide),
            "missing" | "missingperson" | "missing-person" => Some(CaseType::MissingPerson),
            "heist" => Some(CaseType::Heist),
            _ => None,
        }
    }
}

impl std::fmt::Display for CaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A unique identifier wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Id(pub Uuid);

impl Id {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
