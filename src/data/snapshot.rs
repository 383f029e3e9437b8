//! Case snapshots and status progression
//!
//! A snapshot is the complete state of one case session at a point in time.
//! Snapshots are never edited once handed out: every engine call derives a new
//! value from the previous snapshot plus a [`SnapshotDelta`].

use super::{CaseTurn, CaseType, Clue, Id, SuspectProfile};
use serde::{Deserialize, Serialize};

/// Where a case stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CaseStatus {
    Briefing,
    Investigation,
    Solved,
    Failed { reason: String },
}

impl CaseStatus {
    /// Solved and failed cases never change status again
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseStatus::Solved | CaseStatus::Failed { .. })
    }

    fn stage(&self) -> u8 {
        match self {
            CaseStatus::Briefing => 0,
            CaseStatus::Investigation => 1,
            CaseStatus::Solved | CaseStatus::Failed { .. } => 2,
        }
    }

    /// Apply a requested transition, keeping briefing -> investigation ->
    /// solved/failed order. Backward moves and moves out of a terminal
    /// status leave the current status in place.
    pub fn advanced_to(&self, next: CaseStatus) -> CaseStatus {
        if self.is_terminal() || next.stage() < self.stage() {
            self.clone()
        } else {
            next
        }
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseStatus::Briefing => write!(f, "Briefing"),
            CaseStatus::Investigation => write!(f, "Investigation"),
            CaseStatus::Solved => write!(f, "Solved"),
            CaseStatus::Failed { reason } if reason.is_empty() => write!(f, "Failed"),
            CaseStatus::Failed { reason } => write!(f, "Failed: {}", reason),
        }
    }
}

/// Changes applied on top of a snapshot to produce the next one
#[derive(Debug, Clone)]
pub struct SnapshotDelta {
    pub turn: CaseTurn,
    pub status: Option<CaseStatus>,
    pub suspects: Option<Vec<SuspectProfile>>,  // Wholesale replacement
    pub new_clues: Vec<Clue>,
}

impl SnapshotDelta {
    /// A delta that only appends a turn
    pub fn turn(turn: CaseTurn) -> Self {
        Self {
            turn,
            status: None,
            suspects: None,
            new_clues: Vec::new(),
        }
    }
}

/// The state of one case session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSnapshot {
    id: Id,
    case_type: CaseType,
    title: String,
    synopsis: String,
    status: CaseStatus,
    turns: Vec<CaseTurn>,
    clues: Vec<Clue>,
    suspects: Vec<SuspectProfile>,
}

impl CaseSnapshot {
    /// The first snapshot of a session: one opening turn whose clues seed
    /// the cumulative clue set.
    pub fn open(
        id: Id,
        case_type: CaseType,
        title: &str,
        synopsis: &str,
        status: CaseStatus,
        opening_turn: CaseTurn,
        suspects: Vec<SuspectProfile>,
    ) -> Self {
        let mut clues: Vec<Clue> = Vec::new();
        for clue in &opening_turn.new_clues {
            if !clues.contains(clue) {
                clues.push(clue.clone());
            }
        }

        Self {
            id,
            case_type,
            title: title.to_string(),
            synopsis: synopsis.to_string(),
            status,
            turns: vec![opening_turn],
            clues,
            suspects,
        }
    }

    /// Derive the next snapshot. Turns are appended, clues already present by
    /// value are skipped, suspects are replaced wholesale when given, and the
    /// status only moves forward.
    pub fn appending(&self, delta: SnapshotDelta) -> CaseSnapshot {
        let mut next = self.clone();
        next.turns.push(delta.turn);

        for clue in delta.new_clues {
            if !next.clues.contains(&clue) {
                next.clues.push(clue);
            }
        }

        if let Some(status) = delta.status {
            next.status = self.status.advanced_to(status);
        }

        if let Some(suspects) = delta.suspects {
            next.suspects = suspects;
        }

        next
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn case_type(&self) -> CaseType {
        self.case_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn synopsis(&self) -> &str {
        &self.synopsis
    }

    pub fn status(&self) -> &CaseStatus {
        &self.status
    }

    pub fn turns(&self) -> &[CaseTurn] {
        &self.turns
    }

    pub fn clues(&self) -> &[Clue] {
        &self.clues
    }

    pub fn suspects(&self) -> &[SuspectProfile] {
        &self.suspects
    }

    pub fn is_closed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Number of turns the engine has produced so far
    pub fn engine_turn_count(&self) -> usize {
        self.turns.iter().filter(|t| t.is_engine()).count()
    }

    pub fn last_engine_turn(&self) -> Option<&CaseTurn> {
        self.turns.iter().rev().find(|t| t.is_engine())
    }
}
