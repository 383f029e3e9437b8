//! The desk: one player's cases, balances and history
//!
//! Ties the engine, the economy and the blob store together the way a front
//! end would. Every mutation of the economy, the active session or the
//! history is written back to the store before the call returns.

use super::hints::HintPayment;
use super::resume::{ResumeCoordinator, ResyncReport};
use super::session::CaseSession;
use super::DetectiveEngine;
use crate::config::DeskConfig;
use crate::data::{CaseHint, CaseType};
use crate::economy::{EconomyRecord, ResourceEconomy};
use crate::storage::{self, keys, ActiveSessionPayload, CaseHistory, SharedStore, StorageError};
use crate::{CaseError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub struct Desk {
    config: DeskConfig,
    store: SharedStore,
    engine: Arc<dyn DetectiveEngine>,
    coordinator: ResumeCoordinator,
    economy: Mutex<ResourceEconomy>,
    history: Mutex<CaseHistory>,
}

impl Desk {
    /// Load the economy and history from `store`, creating fresh ones when
    /// absent or unreadable.
    pub async fn open(
        config: DeskConfig,
        store: SharedStore,
        engine: Arc<dyn DetectiveEngine>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        config.validate()?;
        let calendar = Arc::new(config.day_calendar()?);

        let record: Option<EconomyRecord> = load_or_discard(store.as_ref(), keys::ECONOMY).await?;
        let economy = ResourceEconomy::new(&config.economy, calendar, record, now);

        let history: CaseHistory = load_or_discard(store.as_ref(), keys::CASE_HISTORY)
            .await?
            .unwrap_or_default();

        let coordinator = if config.engine.strict_resume {
            ResumeCoordinator::strict()
        } else {
            ResumeCoordinator::new()
        };

        info!(
            store = store.name(),
            energy = economy.energy(),
            hints = economy.hint_credits(),
            closed_cases = history.len(),
            "Desk opened"
        );

        let desk = Self {
            config,
            store,
            engine,
            coordinator,
            economy: Mutex::new(economy),
            history: Mutex::new(history),
        };

        // A refill applied while loading has to survive the next restart
        {
            let economy = desk.economy.lock().await;
            desk.persist_economy(&economy).await?;
        }

        Ok(desk)
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    /// Copy of the current balances
    pub async fn economy(&self) -> ResourceEconomy {
        self.economy.lock().await.clone()
    }

    pub async fn history(&self) -> CaseHistory {
        self.history.lock().await.clone()
    }

    /// Pay for and open a new case. `None` when there is not enough energy.
    ///
    /// The energy is only taken once the engine has opened the case, so a
    /// failed or cancelled open costs nothing.
    pub async fn start_case(&self, case_type: CaseType, now: DateTime<Utc>) -> Result<Option<CaseSession>> {
        let mut economy = self.economy.lock().await;
        let mut charged = economy.clone();

        if !charged.consume_energy_for(case_type, now) {
            *economy = charged;
            self.persist_economy(&economy).await?;
            return Ok(None);
        }

        let session = CaseSession::start(self.engine.clone(), case_type)
            .await
            .map_err(CaseError::from)?;

        *economy = charged;
        self.persist_economy(&economy).await?;
        drop(economy);

        self.save_session(&session).await?;
        Ok(Some(session))
    }

    /// Forward a question and persist the outcome.
    ///
    /// Closed cases move from the active slot into the history.
    pub async fn ask(&self, session: &mut CaseSession, question: &str, now: DateTime<Utc>) -> Result<bool> {
        let asked = session.ask(question).await.map_err(CaseError::from)?;
        if !asked {
            return Ok(false);
        }

        if session.is_closed() {
            self.close(session, now).await?;
        } else {
            self.save_session(session).await?;
        }
        Ok(true)
    }

    pub async fn unlock_hint(
        &self,
        session: &mut CaseSession,
        payment: HintPayment,
        now: DateTime<Utc>,
    ) -> Result<Option<CaseHint>> {
        let mut economy = self.economy.lock().await;
        let hint = session
            .unlock_hint(&mut economy, payment, self.config.economy.hint_energy_cost, now)
            .cloned();
        self.persist_economy(&economy).await?;
        drop(economy);

        if hint.is_some() {
            self.save_session(session).await?;
        }
        Ok(hint)
    }

    pub async fn claim_daily_bonus(&self, now: DateTime<Utc>) -> Result<bool> {
        let mut economy = self.economy.lock().await;
        let claimed = economy.claim_daily_bonus(now);
        self.persist_economy(&economy).await?;
        Ok(claimed)
    }

    pub async fn refill_now(&self, now: DateTime<Utc>) -> Result<()> {
        let mut economy = self.economy.lock().await;
        economy.refill_now(now);
        self.persist_economy(&economy).await
    }

    pub async fn set_subscription(&self, active: bool) -> Result<()> {
        let mut economy = self.economy.lock().await;
        economy.set_subscription(active);
        info!(active, "Subscription changed");
        self.persist_economy(&economy).await
    }

    pub async fn add_energy(&self, amount: u32, allow_overflow: bool, now: DateTime<Utc>) -> Result<()> {
        let mut economy = self.economy.lock().await;
        economy.add_energy(amount, allow_overflow, now);
        self.persist_economy(&economy).await
    }

    /// Drop the active case without logging it
    pub async fn abandon(&self, session: CaseSession) -> Result<()> {
        let id = session.snapshot().id();
        info!(session = %id, "Case abandoned");
        self.engine.release(id).await;
        self.store
            .delete(keys::ACTIVE_SESSION)
            .await
            .map_err(CaseError::from)?;
        Ok(())
    }

    /// Persist the session as the active one, e.g. after the input changes
    pub async fn save_session(&self, session: &CaseSession) -> Result<()> {
        storage::set_json(self.store.as_ref(), keys::ACTIVE_SESSION, &session.payload())
            .await
            .map_err(CaseError::from)?;
        Ok(())
    }

    /// Restore the saved case, if any, after realigning the engine with it
    pub async fn resume(&self, now: DateTime<Utc>) -> Result<Option<(CaseSession, ResyncReport)>> {
        let payload: Option<ActiveSessionPayload> =
            load_or_discard(self.store.as_ref(), keys::ACTIVE_SESSION).await?;
        let Some(payload) = payload else {
            return Ok(None);
        };

        let (session, report) = CaseSession::resume(self.engine.clone(), payload, &self.coordinator).await?;

        // Closed before the history write landed
        if session.is_closed() {
            self.close(&session, now).await?;
            return Ok(None);
        }

        info!(
            session = %report.session,
            replayed = report.replayed,
            aligned = report.aligned,
            "Case resumed"
        );
        Ok(Some((session, report)))
    }

    pub async fn remove_history_entry(&self, index: usize) -> Result<bool> {
        let mut history = self.history.lock().await;
        let removed = history.remove(index).is_some();
        if removed {
            self.persist_history(&history).await?;
        }
        Ok(removed)
    }

    pub async fn clear_history(&self) -> Result<()> {
        let mut history = self.history.lock().await;
        history.clear();
        self.persist_history(&history).await
    }

    async fn close(&self, session: &CaseSession, now: DateTime<Utc>) -> Result<()> {
        let snapshot = session.snapshot();
        let mut history = self.history.lock().await;
        if history.add_from(snapshot, now) {
            info!(session = %snapshot.id(), status = %snapshot.status(), "Case closed");
            self.persist_history(&history).await?;
        }
        drop(history);

        self.engine.release(snapshot.id()).await;
        self.store
            .delete(keys::ACTIVE_SESSION)
            .await
            .map_err(CaseError::from)?;
        Ok(())
    }

    async fn persist_economy(&self, economy: &ResourceEconomy) -> Result<()> {
        storage::set_json(self.store.as_ref(), keys::ECONOMY, &economy.record())
            .await
            .map_err(CaseError::from)?;
        Ok(())
    }

    async fn persist_history(&self, history: &CaseHistory) -> Result<()> {
        storage::set_json(self.store.as_ref(), keys::CASE_HISTORY, history)
            .await
            .map_err(CaseError::from)?;
        Ok(())
    }
}

/// Read a record, treating undecodable data as absent
async fn load_or_discard<T: DeserializeOwned>(store: &dyn storage::BlobStore, key: &str) -> Result<Option<T>> {
    match storage::get_json(store, key).await {
        Ok(value) => Ok(value),
        Err(StorageError::Serialization(e)) => {
            warn!(key, error = %e, "Discarding unreadable record");
            store.delete(key).await.map_err(CaseError::from)?;
            Ok(None)
        }
        Err(e) => Err(CaseError::from(e).into()),
    }
}
