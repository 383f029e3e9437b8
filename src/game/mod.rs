//! Case progression: engines, scripts, sessions and hints

pub mod desk;
pub mod engine;
pub mod hints;
pub mod resume;
pub mod script;
pub mod session;

pub use desk::Desk;
pub use engine::ScriptedEngine;
pub use hints::{make_hint, unlock_hint, HintPayment};
pub use resume::{ResumeCoordinator, ResyncReport};
pub use script::{Script, ScriptBeat, ScriptCatalog};
pub use session::CaseSession;

use crate::data::{CaseSnapshot, CaseType, Id};
use async_trait::async_trait;

/// The only way an engine call can fail
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("No script registered for case type: {0}")]
    ScriptNotFound(CaseType),
}

/// Produces case snapshots from player questions.
///
/// Implementations own whatever progress they track per session; callers only
/// ever see snapshots. A snapshot returned by `answer` always has the
/// question appended as a detective turn followed by exactly one engine turn.
#[async_trait]
pub trait DetectiveEngine: Send + Sync {
    /// Open a new session of the given type
    async fn start_case(&self, case_type: CaseType) -> Result<CaseSnapshot, EngineError>;

    /// Respond to a question asked in `snapshot`'s session
    async fn answer(&self, question: &str, snapshot: &CaseSnapshot) -> Result<CaseSnapshot, EngineError>;

    /// Forget any progress tracked for `session`. The next `answer` for it
    /// starts from the beginning of its script.
    async fn release(&self, session: Id);
}
