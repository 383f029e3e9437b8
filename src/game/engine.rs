//! The scripted detective engine
//!
//! Walks each session through its case script one beat per question. The
//! beat cursor of every session lives here, not in the snapshot, which is why
//! a resumed session has to be replayed before it can continue.

use super::script::ScriptCatalog;
use super::{DetectiveEngine, EngineError};
use crate::data::{CaseSnapshot, CaseStatus, CaseTurn, CaseType, Id, SnapshotDelta};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Engine reply once every beat of a script has been consumed
pub const CASE_CLOSED_RESPONSE: &str = "This case is already closed. Try opening a new one.";

/// Engine backed by a [`ScriptCatalog`]
#[derive(Debug)]
pub struct ScriptedEngine {
    catalog: ScriptCatalog,
    latency: Duration,
    cursors: Mutex<HashMap<Id, usize>>,  // Next beat index per session
}

impl ScriptedEngine {
    pub fn new(catalog: ScriptCatalog) -> Self {
        Self {
            catalog,
            latency: Duration::ZERO,
            cursors: Mutex::new(HashMap::new()),
        }
    }

    /// Wait this long before every response
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Index of the next beat the session will receive
    pub async fn cursor(&self, session: Id) -> usize {
        self.cursors.lock().await.get(&session).copied().unwrap_or(0)
    }

    /// Whether a cursor is held for the session
    pub async fn is_tracking(&self, session: Id) -> bool {
        self.cursors.lock().await.contains_key(&session)
    }

    async fn think(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new(ScriptCatalog::standard())
    }
}

#[async_trait]
impl DetectiveEngine for ScriptedEngine {
    async fn start_case(&self, case_type: CaseType) -> Result<CaseSnapshot, EngineError> {
        let script = self
            .catalog
            .get(case_type)
            .ok_or(EngineError::ScriptNotFound(case_type))?;

        self.think().await;

        let session = Id::new();
        let first = script.beats.first();
        let opening_turn = match first {
            Some(beat) => CaseTurn::engine(&beat.response, beat.new_clues.clone()),
            None => CaseTurn::engine("", Vec::new()),
        };
        let status = first
            .and_then(|beat| beat.status.clone())
            .unwrap_or(CaseStatus::Briefing);

        self.cursors.lock().await.insert(session, 1);

        info!(%session, ?case_type, "Case opened");

        Ok(CaseSnapshot::open(
            session,
            case_type,
            &script.title,
            &script.synopsis,
            status,
            opening_turn,
            script.suspects.clone(),
        ))
    }

    async fn answer(&self, question: &str, snapshot: &CaseSnapshot) -> Result<CaseSnapshot, EngineError> {
        let case_type = snapshot.case_type();
        let script = self
            .catalog
            .get(case_type)
            .ok_or(EngineError::ScriptNotFound(case_type))?;

        self.think().await;

        let asked = snapshot.appending(SnapshotDelta::turn(CaseTurn::detective(question)));
        let session = snapshot.id();

        // Cursor read, response and advance happen under one lock with no
        // await in between, so a cancelled call never moves the cursor.
        let mut cursors = self.cursors.lock().await;
        let cursor = cursors.entry(session).or_insert(0);

        let Some(beat) = script.beats.get(*cursor) else {
            debug!(%session, cursor = *cursor, "Script exhausted, case already closed");
            return Ok(asked.appending(SnapshotDelta::turn(CaseTurn::engine(CASE_CLOSED_RESPONSE, Vec::new()))));
        };

        debug!(%session, beat = *cursor, "Beat consumed");
        *cursor += 1;

        Ok(asked.appending(SnapshotDelta {
            turn: CaseTurn::engine(&beat.response, beat.new_clues.clone()),
            status: beat.status.clone(),
            suspects: beat.suspects.clone(),
            new_clues: beat.new_clues.clone(),
        }))
    }

    async fn release(&self, session: Id) {
        if self.cursors.lock().await.remove(&session).is_some() {
            debug!(%session, "Cursor released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Speaker, TrustLevel};
    use crate::game::script::{casebook, Script, ScriptBeat};

    fn engine() -> ScriptedEngine {
        ScriptedEngine::default()
    }

    #[tokio::test]
    async fn homicide_opens_on_the_first_beat() {
        let engine = engine();
        let script = casebook::homicide();
        let snapshot = engine.start_case(CaseType::Homicide).await.unwrap();

        assert_eq!(snapshot.turns().len(), 1);
        assert_eq!(snapshot.turns()[0].speaker, Speaker::Engine);
        assert_eq!(snapshot.turns()[0].text, script.beats[0].response);
        assert_eq!(snapshot.status(), &CaseStatus::Investigation);
        assert_eq!(snapshot.clues().len(), 1);
        assert_eq!(snapshot.clues()[0].title, "Handwritten Note");
        assert_eq!(snapshot.suspects().len(), 2);
        assert_eq!(engine.cursor(snapshot.id()).await, 1);
    }

    #[tokio::test]
    async fn answer_appends_question_and_next_beat() {
        let engine = engine();
        let opened = engine.start_case(CaseType::Homicide).await.unwrap();
        let next = engine.answer("Who was in room 12?", &opened).await.unwrap();

        assert_eq!(next.turns().len(), 3);
        assert_eq!(next.turns()[1].speaker, Speaker::Detective);
        assert_eq!(next.turns()[1].text, "Who was in room 12?");
        assert_eq!(next.turns()[2].text, casebook::homicide().beats[1].response);
        assert_eq!(next.clues().len(), 2);
        assert_eq!(opened.turns().len(), 1, "input snapshot must not change");
    }

    #[tokio::test]
    async fn question_text_is_kept_verbatim() {
        let engine = engine();
        let opened = engine.start_case(CaseType::Heist).await.unwrap();
        let next = engine.answer("  who opened it?  ", &opened).await.unwrap();
        assert_eq!(next.turns()[1].text, "  who opened it?  ");
    }

    #[tokio::test]
    async fn turn_counts_before_and_after_the_script_runs_out() {
        let engine = engine();
        let beats = casebook::missing_person().beats.len();
        let mut snapshot = engine.start_case(CaseType::MissingPerson).await.unwrap();

        for n in 1..beats {
            snapshot = engine.answer("next?", &snapshot).await.unwrap();
            assert_eq!(snapshot.turns().len(), 1 + 2 * n);
        }
        assert_eq!(snapshot.status(), &CaseStatus::Solved);

        let closed_at = snapshot.turns().len();
        for extra in 1..=3 {
            snapshot = engine.answer("anything else?", &snapshot).await.unwrap();
            assert_eq!(snapshot.turns().len(), closed_at + 2 * extra);
            let last = snapshot.turns().last().unwrap();
            assert_eq!(last.text, CASE_CLOSED_RESPONSE);
            assert!(last.new_clues.is_empty());
            assert_eq!(snapshot.status(), &CaseStatus::Solved);
        }
        assert_eq!(engine.cursor(snapshot.id()).await, beats);
    }

    #[tokio::test]
    async fn clue_set_grows_without_duplicates() {
        let engine = engine();
        let mut snapshot = engine.start_case(CaseType::Homicide).await.unwrap();
        let mut previous = snapshot.clues().len();

        for _ in 0..8 {
            snapshot = engine.answer("go on", &snapshot).await.unwrap();
            let clues = snapshot.clues();
            assert!(clues.len() >= previous);
            for (i, a) in clues.iter().enumerate() {
                assert!(clues[i + 1..].iter().all(|b| a != b));
            }
            previous = clues.len();
        }
        assert_eq!(previous, 4);
    }

    #[tokio::test]
    async fn repeated_beat_clues_are_not_duplicated() {
        let note = crate::data::Clue::new("Note", "Same note twice", crate::data::ClueCategory::Document);
        let mut catalog = ScriptCatalog::empty();
        catalog.register(
            CaseType::Homicide,
            Script {
                title: "Echo".to_string(),
                synopsis: "The same clue twice.".to_string(),
                suspects: vec![],
                beats: vec![
                    ScriptBeat::new("First.").revealing(note.clone()),
                    ScriptBeat::new("Again.").revealing(note.clone()),
                ],
            },
        );
        let engine = ScriptedEngine::new(catalog);
        let opened = engine.start_case(CaseType::Homicide).await.unwrap();
        assert_eq!(opened.status(), &CaseStatus::Briefing);

        let next = engine.answer("again?", &opened).await.unwrap();
        assert_eq!(next.clues(), &[note.clone()]);
        assert_eq!(next.turns().last().unwrap().new_clues, vec![note]);
    }

    #[tokio::test]
    async fn beat_replaces_the_suspect_roster() {
        let engine = engine();
        let mut snapshot = engine.start_case(CaseType::Homicide).await.unwrap();
        snapshot = engine.answer("q1", &snapshot).await.unwrap();
        snapshot = engine.answer("q2", &snapshot).await.unwrap();

        let ali = snapshot.suspects().iter().find(|s| s.name == "Ali Demir").unwrap();
        assert_eq!(ali.trust, TrustLevel::Hostile);

        snapshot = engine.answer("q3", &snapshot).await.unwrap();
        let ali = snapshot.suspects().iter().find(|s| s.name == "Ali Demir").unwrap();
        assert_eq!(ali.trust, TrustLevel::Skeptical);
    }

    #[tokio::test]
    async fn sessions_keep_separate_cursors() {
        let engine = engine();
        let a = engine.start_case(CaseType::Heist).await.unwrap();
        let b = engine.start_case(CaseType::Heist).await.unwrap();

        let a = engine.answer("a1", &a).await.unwrap();
        let a = engine.answer("a2", &a).await.unwrap();
        let b = engine.answer("b1", &b).await.unwrap();

        assert_eq!(engine.cursor(a.id()).await, 3);
        assert_eq!(engine.cursor(b.id()).await, 2);
        assert_eq!(b.turns().last().unwrap().text, casebook::heist().beats[1].response);
    }

    #[tokio::test]
    async fn unregistered_case_type_is_a_typed_error() {
        let engine = ScriptedEngine::new(ScriptCatalog::empty());
        let err = engine.start_case(CaseType::Heist).await.unwrap_err();
        assert_eq!(err, EngineError::ScriptNotFound(CaseType::Heist));

        let snapshot = ScriptedEngine::default().start_case(CaseType::Heist).await.unwrap();
        let err = engine.answer("hello?", &snapshot).await.unwrap_err();
        assert_eq!(err, EngineError::ScriptNotFound(CaseType::Heist));
    }

    #[tokio::test]
    async fn released_session_starts_over() {
        let engine = engine();
        let opened = engine.start_case(CaseType::Homicide).await.unwrap();
        let asked = engine.answer("q1", &opened).await.unwrap();
        assert!(engine.is_tracking(opened.id()).await);

        engine.release(opened.id()).await;
        assert!(!engine.is_tracking(opened.id()).await);

        let again = engine.answer("q2", &asked).await.unwrap();
        assert_eq!(again.turns().last().unwrap().text, casebook::homicide().beats[0].response);
    }

    #[tokio::test]
    async fn cancelled_answer_leaves_the_cursor_alone() {
        let engine = ScriptedEngine::default().with_latency(Duration::from_millis(200));
        let opened = engine.start_case(CaseType::Homicide).await.unwrap();

        let cancelled = tokio::time::timeout(Duration::from_millis(10), engine.answer("quick", &opened)).await;
        assert!(cancelled.is_err());
        assert_eq!(engine.cursor(opened.id()).await, 1);

        let next = engine.answer("slow", &opened).await.unwrap();
        assert_eq!(next.turns()[2].text, casebook::homicide().beats[1].response);
    }
}
