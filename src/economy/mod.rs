//! Energy and hint-credit economy
//!
//! Opening a case costs energy and unlocking a hint costs a hint credit (or
//! energy). Both balances are topped up to their daily allowance the first
//! time any operation runs on a new calendar day. Time only advances through
//! the `now` passed to each call, so the economy is a pure function of its
//! state and the instants it is shown.

pub mod calendar;

pub use calendar::{DayCalendar, FixedOffsetCalendar};

use crate::data::CaseType;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Tunable limits for the economy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomySettings {
    pub max_energy: u32,
    pub daily_energy_allowance: u32,  // Clamped to max_energy
    pub daily_hint_allowance: u32,
    pub hint_energy_cost: u32,        // Energy price of one hint
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self {
            max_energy: 10,
            daily_energy_allowance: 3,
            daily_hint_allowance: 1,
            hint_energy_cost: 1,
        }
    }
}

/// The durable part of the economy, persisted across restarts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomyRecord {
    pub energy: u32,
    pub max_energy: u32,
    pub hint_credits: u32,
    pub has_subscription: bool,
    pub last_refill: DateTime<Utc>,
    pub last_daily_bonus: Option<DateTime<Utc>>,
}

/// Balances and refill bookkeeping for one installation
#[derive(Debug, Clone)]
pub struct ResourceEconomy {
    energy: u32,
    max_energy: u32,
    hint_credits: u32,
    has_subscription: bool,
    daily_energy_allowance: u32,
    daily_hint_allowance: u32,
    last_refill: DateTime<Utc>,
    last_daily_bonus: Option<DateTime<Utc>>,
    calendar: Arc<dyn DayCalendar>,
}

impl ResourceEconomy {
    /// Restore the economy from a persisted record, or start a fresh one.
    ///
    /// A record last refilled on an earlier calendar day gets exactly one
    /// catch-up refill, however many days have passed.
    pub fn new(
        settings: &EconomySettings,
        calendar: Arc<dyn DayCalendar>,
        persisted: Option<EconomyRecord>,
        now: DateTime<Utc>,
    ) -> Self {
        let max_energy = persisted
            .as_ref()
            .map_or(settings.max_energy, |r| r.max_energy)
            .max(1);
        let daily_energy_allowance = settings.daily_energy_allowance.min(max_energy);
        let daily_hint_allowance = settings.daily_hint_allowance;

        match persisted {
            Some(record) => {
                let mut economy = Self {
                    energy: record.energy,
                    max_energy,
                    hint_credits: record.hint_credits,
                    has_subscription: record.has_subscription,
                    daily_energy_allowance,
                    daily_hint_allowance,
                    last_refill: record.last_refill,
                    last_daily_bonus: record.last_daily_bonus,
                    calendar,
                };
                economy.refill_if_needed(now);
                economy
            }
            None => {
                info!(energy = daily_energy_allowance, hints = daily_hint_allowance, "Fresh economy initialised");
                Self {
                    energy: daily_energy_allowance,
                    max_energy,
                    hint_credits: daily_hint_allowance,
                    has_subscription: false,
                    daily_energy_allowance,
                    daily_hint_allowance,
                    last_refill: now,
                    last_daily_bonus: None,
                    calendar,
                }
            }
        }
    }

    /// Snapshot of the durable fields
    pub fn record(&self) -> EconomyRecord {
        EconomyRecord {
            energy: self.energy,
            max_energy: self.max_energy,
            hint_credits: self.hint_credits,
            has_subscription: self.has_subscription,
            last_refill: self.last_refill,
            last_daily_bonus: self.last_daily_bonus,
        }
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn max_energy(&self) -> u32 {
        self.max_energy
    }

    pub fn hint_credits(&self) -> u32 {
        self.hint_credits
    }

    pub fn has_subscription(&self) -> bool {
        self.has_subscription
    }

    pub fn daily_energy_allowance(&self) -> u32 {
        self.daily_energy_allowance
    }

    pub fn daily_hint_allowance(&self) -> u32 {
        self.daily_hint_allowance
    }

    pub fn last_refill(&self) -> DateTime<Utc> {
        self.last_refill
    }

    /// Debit the opening cost of a case. Fails without mutation when short.
    pub fn consume_energy_for(&mut self, case_type: CaseType, now: DateTime<Utc>) -> bool {
        self.refill_if_needed(now);
        let cost = case_type.energy_cost();
        if self.energy < cost {
            debug!(?case_type, cost, energy = self.energy, "Not enough energy to open case");
            return false;
        }
        self.energy -= cost;
        true
    }

    /// Debit an arbitrary positive amount of energy
    pub fn consume_energy(&mut self, points: u32, now: DateTime<Utc>) -> bool {
        self.refill_if_needed(now);
        if points == 0 || self.energy < points {
            return false;
        }
        self.energy -= points;
        true
    }

    /// Grant energy. Without overflow the balance is capped at `max_energy`;
    /// with overflow the cap grows to match the new balance.
    pub fn add_energy(&mut self, amount: u32, allow_overflow: bool, now: DateTime<Utc>) {
        self.refill_if_needed(now);
        let total = self.energy.saturating_add(amount);
        if allow_overflow {
            self.energy = total;
            if self.energy > self.max_energy {
                self.max_energy = self.energy;
            }
        } else {
            self.energy = total.min(self.max_energy);
        }
    }

    /// Spend one hint credit. Subscribers always succeed and spend nothing.
    pub fn consume_hint_credit(&mut self, now: DateTime<Utc>) -> bool {
        self.refill_if_needed(now);
        if self.has_subscription {
            return true;
        }
        if self.hint_credits == 0 {
            return false;
        }
        self.hint_credits -= 1;
        true
    }

    pub fn add_hint_credits(&mut self, amount: u32, now: DateTime<Utc>) {
        self.refill_if_needed(now);
        self.hint_credits = self.hint_credits.saturating_add(amount);
    }

    pub fn is_daily_bonus_available(&self, now: DateTime<Utc>) -> bool {
        match self.last_daily_bonus {
            Some(last) => !self.calendar.same_day(now, last),
            None => true,
        }
    }

    /// Claim +1 energy (capped) and +1 hint credit, once per calendar day
    pub fn claim_daily_bonus(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_daily_bonus_available(now) {
            return false;
        }
        self.add_energy(1, false, now);
        self.add_hint_credits(1, now);
        self.last_daily_bonus = Some(now);
        info!(energy = self.energy, hints = self.hint_credits, "Daily bonus claimed");
        true
    }

    /// Start of the next calendar day, when the next automatic refill applies
    pub fn next_refill_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.calendar.next_day_start(now)
    }

    pub fn time_until_next_refill(&self, now: DateTime<Utc>) -> Duration {
        (self.next_refill_at(now) - now).max(Duration::zero())
    }

    pub fn time_until_daily_bonus(&self, now: DateTime<Utc>) -> Duration {
        if self.is_daily_bonus_available(now) {
            Duration::zero()
        } else {
            self.time_until_next_refill(now)
        }
    }

    /// Top both balances up immediately, regardless of the calendar
    pub fn refill_now(&mut self, now: DateTime<Utc>) {
        self.energy = self.energy.max(self.max_energy);
        self.hint_credits = self.hint_credits.max(self.daily_hint_allowance);
        self.last_refill = now;
        info!(energy = self.energy, hints = self.hint_credits, "Manual refill");
    }

    /// Toggle the subscription. Balances are left alone.
    pub fn set_subscription(&mut self, active: bool) {
        self.has_subscription = active;
    }

    pub fn increase_max_energy(&mut self, amount: u32) {
        if amount == 0 {
            return;
        }
        self.max_energy = self.max_energy.saturating_add(amount);
    }

    /// Back to a first-day state: allowances restored, subscription dropped
    pub fn reset_progress(&mut self, now: DateTime<Utc>) {
        self.energy = self.daily_energy_allowance;
        self.hint_credits = self.daily_hint_allowance;
        self.has_subscription = false;
        self.last_refill = now;
    }

    fn refill_if_needed(&mut self, now: DateTime<Utc>) -> bool {
        if self.calendar.same_day(now, self.last_refill) {
            return false;
        }
        self.energy = self.energy.max(self.daily_energy_allowance);
        self.hint_credits = self.hint_credits.max(self.daily_hint_allowance);
        self.last_refill = now;
        info!(energy = self.energy, hints = self.hint_credits, "Daily refill applied");
        true
    }
}
