//! A live case session
//!
//! Holds the current snapshot, the hints unlocked so far, and any unsent
//! input. A session restored from disk can only be built through
//! [`CaseSession::resume`], which finishes the replay before handing the
//! session out, so no question can reach the engine ahead of it.

use super::hints::{self, HintPayment};
use super::resume::{ResumeCoordinator, ResyncReport};
use super::{DetectiveEngine, EngineError};
use crate::data::{CaseHint, CaseSnapshot, CaseType};
use crate::economy::ResourceEconomy;
use crate::storage::ActiveSessionPayload;
use crate::CaseError;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub struct CaseSession {
    engine: Arc<dyn DetectiveEngine>,
    snapshot: CaseSnapshot,
    hints: Vec<CaseHint>,
    input_text: String,
}

impl CaseSession {
    /// Open a brand new case
    pub async fn start(engine: Arc<dyn DetectiveEngine>, case_type: CaseType) -> Result<Self, EngineError> {
        let snapshot = engine.start_case(case_type).await?;
        Ok(Self {
            engine,
            snapshot,
            hints: Vec::new(),
            input_text: String::new(),
        })
    }

    /// Restore a saved session, replaying its engine turns first
    pub async fn resume(
        engine: Arc<dyn DetectiveEngine>,
        payload: ActiveSessionPayload,
        coordinator: &ResumeCoordinator,
    ) -> Result<(Self, ResyncReport), CaseError> {
        let report = coordinator.resync(engine.as_ref(), &payload.snapshot).await?;
        let session = Self {
            engine,
            snapshot: payload.snapshot,
            hints: payload.hints,
            input_text: payload.input_text,
        };
        Ok((session, report))
    }

    pub fn snapshot(&self) -> &CaseSnapshot {
        &self.snapshot
    }

    pub fn hints(&self) -> &[CaseHint] {
        &self.hints
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.input_text = text.into();
    }

    pub fn is_closed(&self) -> bool {
        self.snapshot.is_closed()
    }

    /// Send a question to the engine.
    ///
    /// Surrounding whitespace is trimmed; blank questions, and any question
    /// once the case is closed, are ignored and return `Ok(false)`. On
    /// success the snapshot is replaced and the input buffer cleared. On
    /// error nothing changes.
    pub async fn ask(&mut self, question: &str) -> Result<bool, EngineError> {
        let question = question.trim();
        if question.is_empty() || self.is_closed() {
            return Ok(false);
        }

        let next = self.engine.answer(question, &self.snapshot).await?;
        debug!(session = %next.id(), turns = next.turns().len(), "Answer received");
        self.snapshot = next;
        self.input_text.clear();
        Ok(true)
    }

    /// Pay for the next hint and keep it with the session
    pub fn unlock_hint(
        &mut self,
        economy: &mut ResourceEconomy,
        payment: HintPayment,
        hint_energy_cost: u32,
        now: DateTime<Utc>,
    ) -> Option<&CaseHint> {
        let hint = hints::unlock_hint(economy, &self.snapshot, &self.hints, payment, hint_energy_cost, now)?;
        self.hints.push(hint);
        self.hints.last()
    }

    /// What gets written to disk while the case is open
    pub fn payload(&self) -> ActiveSessionPayload {
        ActiveSessionPayload {
            snapshot: self.snapshot.clone(),
            hints: self.hints.clone(),
            input_text: self.input_text.clone(),
        }
    }
}

impl fmt::Debug for CaseSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseSession")
            .field("snapshot", &self.snapshot.id())
            .field("turns", &self.snapshot.turns().len())
            .field("hints", &self.hints.len())
            .finish()
    }
}
