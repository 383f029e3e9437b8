//! Suspects and how far they trust the detective

use super::Id;
use serde::{Deserialize, Serialize};

/// How a suspect currently regards the investigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrustLevel {
    Unknown,
    Skeptical,
    Cooperative,
    Hostile,
}

impl TrustLevel {
    /// Skeptical and hostile suspects are the ones worth pressing
    pub fn is_guarded(&self) -> bool {
        matches!(self, TrustLevel::Skeptical | TrustLevel::Hostile)
    }
}

impl std::fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrustLevel::Unknown => write!(f, "Unknown"),
            TrustLevel::Skeptical => write!(f, "Skeptical"),
            TrustLevel::Cooperative => write!(f, "Cooperative"),
            TrustLevel::Hostile => write!(f, "Hostile"),
        }
    }
}

/// A person of interest in the case.
///
/// The suspect list of a snapshot is only ever replaced wholesale by a script
/// beat; individual profiles are not edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspectProfile {
    pub id: Id,
    pub name: String,
    pub occupation: String,
    pub motive: String,
    pub alibi: String,
    pub trust: TrustLevel,
}

impl SuspectProfile {
    pub fn new(name: &str, occupation: &str, motive: &str, alibi: &str, trust: TrustLevel) -> Self {
        Self {
            id: Id::new(),
            name: name.to_string(),
            occupation: occupation.to_string(),
            motive: motive.to_string(),
            alibi: alibi.to_string(),
            trust,
        }
    }

    /// A copy of this profile with a different trust level and alibi
    pub fn revised(&self, trust: TrustLevel, alibi: &str) -> Self {
        Self {
            trust,
            alibi: alibi.to_string(),
            ..self.clone()
        }
    }
}
