//! Desk configuration
//!
//! Loaded from an optional TOML file. Every section may be omitted.
//!
//! # Example
//!
//! ```toml
//! [economy]
//! max_energy = 12
//! daily_energy_allowance = 3
//! daily_hint_allowance = 2
//! hint_energy_cost = 1
//!
//! [engine]
//! latency_ms = 400
//! strict_resume = false
//!
//! [calendar]
//! utc_offset_minutes = 180
//!
//! [storage]
//! path = "detective-desk.json"
//! ```

use crate::economy::{EconomySettings, FixedOffsetCalendar};
use crate::CaseError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub economy: EconomySettings,
    pub engine: EngineSettings,
    pub calendar: CalendarSettings,
    pub storage: StorageSettings,
}

/// `[engine]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Simulated think time before each scripted response
    pub latency_ms: u64,
    /// Fail a resume whose replay does not line up with the saved turns
    pub strict_resume: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            latency_ms: 400,
            strict_resume: false,
        }
    }
}

impl EngineSettings {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

/// `[calendar]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Offset east of UTC used to decide where one day ends
    pub utc_offset_minutes: i32,
}

/// `[storage]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("detective-desk.json"),
        }
    }
}

impl DeskConfig {
    /// Read the file at `path`, falling back to defaults when it is missing
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CaseError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(CaseError::InvalidConfig(format!("{}: {}", path.display(), e))),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, CaseError> {
        let config: DeskConfig =
            toml::from_str(contents).map_err(|e| CaseError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CaseError> {
        if self.economy.max_energy == 0 {
            return Err(CaseError::InvalidConfig("economy.max_energy must be at least 1".to_string()));
        }
        self.day_calendar()?;
        Ok(())
    }

    pub fn day_calendar(&self) -> Result<FixedOffsetCalendar, CaseError> {
        FixedOffsetCalendar::from_offset_minutes(self.calendar.utc_offset_minutes).ok_or_else(|| {
            CaseError::InvalidConfig(format!(
                "calendar.utc_offset_minutes out of range: {}",
                self.calendar.utc_offset_minutes
            ))
        })
    }
}
