//! Records persisted between runs

use crate::data::{CaseHint, CaseSnapshot, CaseStatus, CaseType, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An unfinished case saved so it can be resumed later
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSessionPayload {
    pub snapshot: CaseSnapshot,
    pub hints: Vec<CaseHint>,
    pub input_text: String,  // Whatever the player had typed but not sent
}

/// One closed case in the history log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseLog {
    pub id: Id,
    pub case_id: Id,
    #[serde(rename = "type")]
    pub case_type: CaseType,
    pub title: String,
    pub status: String,
    pub date: DateTime<Utc>,
    pub turns: usize,
}

/// Closed cases, newest first, at most one entry per case id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseHistory {
    logs: Vec<CaseLog>,
}

impl CaseHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logs(&self) -> &[CaseLog] {
        &self.logs
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    pub fn contains_case(&self, case_id: Id) -> bool {
        self.logs.iter().any(|log| log.case_id == case_id)
    }

    /// Log a closed case. Returns false for open cases and for cases
    /// already in the log.
    pub fn add_from(&mut self, snapshot: &CaseSnapshot, now: DateTime<Utc>) -> bool {
        let status = match snapshot.status() {
            CaseStatus::Solved | CaseStatus::Failed { .. } => snapshot.status().to_string(),
            _ => return false,
        };
        if self.contains_case(snapshot.id()) {
            return false;
        }

        self.logs.insert(
            0,
            CaseLog {
                id: Id::new(),
                case_id: snapshot.id(),
                case_type: snapshot.case_type(),
                title: snapshot.title().to_string(),
                status,
                date: now,
                turns: snapshot.turns().len(),
            },
        );
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<CaseLog> {
        if index < self.logs.len() {
            Some(self.logs.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.logs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CaseTurn, SnapshotDelta};

    fn snapshot(status: CaseStatus) -> CaseSnapshot {
        CaseSnapshot::open(
            Id::new(),
            CaseType::Heist,
            "Shadow Vault",
            "Three layers of security, broken.",
            CaseStatus::Investigation,
            CaseTurn::engine("No forced entry.", vec![]),
            vec![],
        )
        .appending(SnapshotDelta {
            status: Some(status),
            ..SnapshotDelta::turn(CaseTurn::engine("Wrap up.", vec![]))
        })
    }

    #[test]
    fn only_closed_cases_are_logged() {
        let mut history = CaseHistory::new();
        assert!(!history.add_from(&snapshot(CaseStatus::Investigation), Utc::now()));
        assert!(history.is_empty());

        assert!(history.add_from(&snapshot(CaseStatus::Solved), Utc::now()));
        assert_eq!(history.logs()[0].status, "Solved");
        assert_eq!(history.logs()[0].turns, 2);
    }

    #[test]
    fn a_case_is_logged_once() {
        let mut history = CaseHistory::new();
        let solved = snapshot(CaseStatus::Solved);
        assert!(history.add_from(&solved, Utc::now()));
        assert!(!history.add_from(&solved, Utc::now()));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn newest_entries_come_first() {
        let mut history = CaseHistory::new();
        let first = snapshot(CaseStatus::Solved);
        let second = snapshot(CaseStatus::Failed { reason: "Trail went cold".to_string() });
        history.add_from(&first, Utc::now());
        history.add_from(&second, Utc::now());

        assert_eq!(history.logs()[0].case_id, second.id());
        assert_eq!(history.logs()[0].status, "Failed: Trail went cold");

        let removed = history.remove(0).unwrap();
        assert_eq!(removed.case_id, second.id());
        assert!(history.remove(5).is_none());
        history.clear();
        assert!(history.is_empty());
    }
}
