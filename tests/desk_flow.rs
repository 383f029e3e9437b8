//! End-to-end desk scenarios across restarts

use chrono::{DateTime, Duration, TimeZone, Utc};
use detective_desk::game::script::casebook;
use detective_desk::game::{DetectiveEngine, HintPayment};
use detective_desk::storage::{FileStore, SharedStore};
use detective_desk::{CaseError, CaseStatus, CaseType, Desk, DeskConfig, HintUnlockMethod, ScriptedEngine};
use std::path::Path;
use std::sync::Arc;

fn morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()
}

async fn open_desk(path: &Path, config: DeskConfig, now: DateTime<Utc>) -> Desk {
    let store: SharedStore = Arc::new(FileStore::open(path).await.unwrap());
    let engine: Arc<dyn DetectiveEngine> = Arc::new(ScriptedEngine::default());
    Desk::open(config, store, engine, now).await.unwrap()
}

#[tokio::test]
async fn resumed_case_continues_where_it_left_off() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("desk.json");
    let now = morning();

    let saved_id = {
        let desk = open_desk(&path, DeskConfig::default(), now).await;
        let mut session = desk.start_case(CaseType::Homicide, now).await.unwrap().unwrap();
        desk.ask(&mut session, "Who wrote the note?", now).await.unwrap();
        desk.ask(&mut session, "Where was Ali?", now).await.unwrap();
        session.set_input_text("Who came in after");
        desk.save_session(&session).await.unwrap();
        assert_eq!(session.snapshot().engine_turn_count(), 3);
        session.snapshot().id()
    };

    // New process: fresh engine, same file
    let desk = open_desk(&path, DeskConfig::default(), now).await;
    let (mut session, report) = desk.resume(now).await.unwrap().unwrap();
    assert!(report.aligned);
    assert_eq!(report.replayed, 3);
    assert_eq!(session.snapshot().id(), saved_id);
    assert_eq!(session.input_text(), "Who came in after");
    assert_eq!(session.snapshot().turns().len(), 5);

    desk.ask(&mut session, "Who came in after Ali?", now).await.unwrap();
    let last = session.snapshot().turns().last().unwrap();
    assert_eq!(last.text, casebook::homicide().beats[3].response);
    assert_eq!(session.snapshot().clues().len(), 4);

    desk.ask(&mut session, "Who is the silhouette?", now).await.unwrap();
    assert_eq!(session.snapshot().status(), &CaseStatus::Solved);

    let history = desk.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history.logs()[0].case_id, saved_id);
    assert!(desk.resume(now).await.unwrap().is_none());
}

#[tokio::test]
async fn balances_survive_a_restart_and_refill_the_next_day() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("desk.json");
    let now = morning();

    {
        let desk = open_desk(&path, DeskConfig::default(), now).await;
        let mut session = desk.start_case(CaseType::Homicide, now).await.unwrap().unwrap();
        let hint = desk.unlock_hint(&mut session, HintPayment::Energy, now).await.unwrap().unwrap();
        assert_eq!(hint.method, HintUnlockMethod::Energy);
        assert_eq!(desk.economy().await.energy(), 0);
    }

    let later = open_desk(&path, DeskConfig::default(), now + Duration::hours(3)).await;
    assert_eq!(later.economy().await.energy(), 0);
    assert!(later.start_case(CaseType::MissingPerson, now).await.unwrap().is_none());

    let tomorrow = now + Duration::days(1);
    let next_day = open_desk(&path, DeskConfig::default(), tomorrow).await;
    let economy = next_day.economy().await;
    assert_eq!(economy.energy(), 3);
    assert_eq!(economy.hint_credits(), 1);
    assert_eq!(economy.last_refill(), tomorrow);
}

#[tokio::test]
async fn strict_resume_rejects_a_session_it_cannot_replay() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("desk.json");
    let now = morning();

    {
        let desk = open_desk(&path, DeskConfig::default(), now).await;
        let mut session = desk.start_case(CaseType::Heist, now).await.unwrap().unwrap();
        desk.ask(&mut session, "Who knew the code?", now).await.unwrap();
    }

    let mut config = DeskConfig::default();
    config.engine.strict_resume = true;
    let store: SharedStore = Arc::new(FileStore::open(&path).await.unwrap());
    let engine: Arc<dyn DetectiveEngine> =
        Arc::new(ScriptedEngine::new(detective_desk::ScriptCatalog::empty()));
    let desk = Desk::open(config, store, engine, now).await.unwrap();

    let err = desk.resume(now).await.unwrap_err();
    match err.downcast_ref::<CaseError>() {
        Some(CaseError::SessionNotAligned { expected, replayed, .. }) => {
            assert_eq!(*expected, 2);
            assert_eq!(*replayed, 0);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn config_file_drives_the_economy() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("desk.toml");
    tokio::fs::write(&config_path, "[economy]\ndaily_energy_allowance = 5\nhint_energy_cost = 2\n")
        .await
        .unwrap();
    let config = DeskConfig::load(&config_path).unwrap();

    let now = morning();
    let desk = open_desk(&dir.path().join("desk.json"), config, now).await;
    let mut session = desk.start_case(CaseType::Heist, now).await.unwrap().unwrap();
    assert_eq!(desk.economy().await.energy(), 2);

    desk.unlock_hint(&mut session, HintPayment::Energy, now).await.unwrap().unwrap();
    assert_eq!(desk.economy().await.energy(), 0);
}

#[tokio::test]
async fn half_written_store_file_does_not_block_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("desk.json");
    tokio::fs::write(&path, "{\"economy.state\": \"{\\\"ene").await.unwrap();

    let now = morning();
    let desk = open_desk(&path, DeskConfig::default(), now).await;
    assert_eq!(desk.economy().await.energy(), 3);
    assert!(desk.resume(now).await.unwrap().is_none());

    let reopened = open_desk(&path, DeskConfig::default(), now).await;
    assert_eq!(reopened.economy().await.last_refill(), now);
}
