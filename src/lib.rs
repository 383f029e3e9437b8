//! Detective Desk: scripted case sessions for a noir investigation game
//!
//! A player opens a case, asks free-text questions, and receives scripted
//! investigative responses that reveal clues, shift suspect trust, and
//! eventually close the case as solved or failed. Opening cases and unlocking
//! hints is gated by a small resource economy refilled once per calendar day.
//!
//! # Architecture
//!
//! - `data` - Value types: cases, clues, suspects, turns, snapshots, hints
//! - `game` - Engine trait, script catalog, sessions, hints, resume replay
//! - `economy` - Energy and hint-credit balances with daily refill
//! - `storage` - Blob store backends and persisted records
//! - `config` - TOML configuration

pub mod config;
pub mod data;
pub mod economy;
pub mod game;
pub mod storage;

pub use config::DeskConfig;
pub use data::*;
pub use economy::{DayCalendar, EconomyRecord, EconomySettings, FixedOffsetCalendar, ResourceEconomy};
pub use game::{CaseSession, Desk, DetectiveEngine, EngineError, ScriptCatalog, ScriptedEngine};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for desk orchestration
pub type Result<T> = anyhow::Result<T>;

/// Custom error types
#[derive(thiserror::Error, Debug)]
pub enum CaseError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Session {session} not aligned: expected {expected} replayed beats, got {replayed}")]
    SessionNotAligned {
        session: Id,
        expected: usize,
        replayed: usize,
    },

    #[error("Storage failure: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
