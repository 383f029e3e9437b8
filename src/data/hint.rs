//! Hints unlocked during a case

use super::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a hint was paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HintUnlockMethod {
    DailyAllowance,
    HintCredit,
    Energy,
    Rewarded,
    Subscription,
}

impl HintUnlockMethod {
    pub fn label(&self) -> &'static str {
        match self {
            HintUnlockMethod::DailyAllowance => "Free daily hint",
            HintUnlockMethod::HintCredit => "Hint credit",
            HintUnlockMethod::Energy => "Paid with energy",
            HintUnlockMethod::Rewarded => "Rewarded view",
            HintUnlockMethod::Subscription => "Detective Plus",
        }
    }
}

/// A hint shown to the player. Hints for a session are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseHint {
    pub id: Id,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub method: HintUnlockMethod,
}

impl CaseHint {
    pub fn new(text: String, method: HintUnlockMethod, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Id::new(),
            text,
            created_at,
            method,
        }
    }
}
