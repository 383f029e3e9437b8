//! Hints for stuck players
//!
//! Hint text is derived from the current snapshot by a fixed, stage-indexed
//! rule: each further hint in a session looks at a different part of the case.

use crate::data::{CaseHint, CaseSnapshot, HintUnlockMethod};
use crate::economy::ResourceEconomy;
use chrono::{DateTime, Utc};
use tracing::debug;

/// How a non-subscriber wants to pay for a hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintPayment {
    Credit,
    Energy,
    Rewarded,  // Reward already verified by the caller
}

impl HintPayment {
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.to_ascii_lowercase().as_str() {
            "credit" => Some(HintPayment::Credit),
            "energy" => Some(HintPayment::Energy),
            "rewarded" | "ad" => Some(HintPayment::Rewarded),
            _ => None,
        }
    }
}

/// Text of the next hint, given the hints already unlocked this session
pub fn make_hint(snapshot: &CaseSnapshot, existing: &[CaseHint]) -> String {
    let stage = existing.len();

    if stage == 0 {
        if let Some(latest) = snapshot.clues().last() {
            return format!("Focus on the newly found {}. What it says: {}", latest.title, latest.detail);
        }
    }

    if stage == 1 {
        if let Some(suspect) = snapshot.suspects().iter().find(|s| s.trust.is_guarded()) {
            return format!(
                "Press {} on the contradiction in their statement. Alibi: {}",
                suspect.name, suspect.alibi
            );
        }
    }

    if stage == 2 {
        if let Some(turn) = snapshot.last_engine_turn() {
            return format!("Reread the last report: {} One detail there moves you forward.", turn.text);
        }
    }

    if stage == 3 {
        if let Some(first) = snapshot.clues().first() {
            return format!("Go back to the first piece of evidence: {}. It ties the plot together.", first.title);
        }
    }

    "Put the conflicting accounts side by side. Two statements cannot both be true; \
     which one leads to the culprit?"
        .to_string()
}

/// Pay for and produce the next hint.
///
/// Closed cases get no new hints. Subscribers always get one without paying.
/// Returns `None` when the chosen payment cannot be covered; nothing is
/// debited in that case.
pub fn unlock_hint(
    economy: &mut ResourceEconomy,
    snapshot: &CaseSnapshot,
    existing: &[CaseHint],
    payment: HintPayment,
    hint_energy_cost: u32,
    now: DateTime<Utc>,
) -> Option<CaseHint> {
    if snapshot.is_closed() {
        debug!(session = %snapshot.id(), "Hint refused, case closed");
        return None;
    }

    let method = if economy.has_subscription() && economy.consume_hint_credit(now) {
        HintUnlockMethod::Subscription
    } else {
        match payment {
            HintPayment::Credit if economy.consume_hint_credit(now) => HintUnlockMethod::HintCredit,
            HintPayment::Energy if economy.consume_energy(hint_energy_cost, now) => HintUnlockMethod::Energy,
            HintPayment::Rewarded => HintUnlockMethod::Rewarded,
            _ => {
                debug!(session = %snapshot.id(), ?payment, "Hint payment declined");
                return None;
            }
        }
    };

    Some(CaseHint::new(make_hint(snapshot, existing), method, now))
}
