//! Resume replay
//!
//! Snapshots do not carry the engine's beat cursor. After a restart the
//! engine has no cursor for a saved session, so before the player may ask
//! anything the coordinator replays one throwaway question per engine turn
//! already in the snapshot. The replayed snapshots are discarded; only the
//! cursor movement matters. Any cursor the engine already holds for the
//! session is released first, so replay always starts from the top.

use super::DetectiveEngine;
use crate::data::{CaseSnapshot, Id};
use crate::CaseError;
use tracing::{info, warn};

/// Question text used for replayed turns
pub const REPLAY_QUESTION: &str = "(resumed)";

/// Outcome of a replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResyncReport {
    pub session: Id,
    pub expected: usize,  // Engine turns found in the snapshot
    pub replayed: usize,  // Replay calls that succeeded
    pub failures: usize,
    pub aligned: bool,
}

/// Realigns engine cursors with saved snapshots
#[derive(Debug, Clone, Copy, Default)]
pub struct ResumeCoordinator {
    strict: bool,
}

impl ResumeCoordinator {
    /// Best effort: failed replay calls are logged and skipped
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// Fail with [`CaseError::SessionNotAligned`] when any replay call fails
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Replay the snapshot's engine turns against `engine`.
    ///
    /// Closed cases are not replayed.
    pub async fn resync(&self, engine: &dyn DetectiveEngine, snapshot: &CaseSnapshot) -> Result<ResyncReport, CaseError> {
        let session = snapshot.id();

        if snapshot.is_closed() {
            return Ok(ResyncReport {
                session,
                expected: 0,
                replayed: 0,
                failures: 0,
                aligned: true,
            });
        }

        engine.release(session).await;

        let expected = snapshot.engine_turn_count();
        let mut rolling = snapshot.clone();
        let mut replayed = 0;
        let mut failures = 0;

        for step in 0..expected {
            match engine.answer(REPLAY_QUESTION, &rolling).await {
                Ok(next) => {
                    rolling = next;
                    replayed += 1;
                }
                Err(e) => {
                    warn!(%session, step, error = %e, "Replay call failed, skipping");
                    failures += 1;
                }
            }
        }

        let aligned = replayed == expected;
        if !aligned {
            warn!(%session, expected, replayed, "Resumed session is out of step with its script");
            if self.strict {
                return Err(CaseError::SessionNotAligned {
                    session,
                    expected,
                    replayed,
                });
            }
        } else {
            info!(%session, replayed, "Session realigned");
        }

        Ok(ResyncReport {
            session,
            expected,
            replayed,
            failures,
            aligned,
        })
    }
}
