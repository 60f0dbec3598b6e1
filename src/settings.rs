//! Front-end settings and preferences
//!
//! Persisted as JSON in the same store as the saves, under their own key.

use std::str::FromStr;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::container::CONSOLE_ID;
use crate::persistence::{PersistentStore, StoreError};

/// Save and session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Console ID written into every encoded container
    pub console_id: String,

    // === Auto-save ===
    /// Save SRAM/RTC when the emulator is paused
    pub auto_save_on_pause: bool,
    /// Save SRAM/RTC of the running game before another one starts
    pub auto_save_on_switch: bool,

    // === Host loop ===
    /// Interval for the emulator loop (ms)
    pub run_interval_ms: u32,

    // === Diagnostics ===
    /// `log` level name ("error" .. "trace")
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            console_id: CONSOLE_ID.to_string(),

            auto_save_on_pause: true,
            auto_save_on_switch: true,

            run_interval_ms: 8,

            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Store key
    pub const STORAGE_KEY: &'static str = "gameboy_io_settings";

    /// Parsed log level, `Info` if the stored name is unknown
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    /// Load settings from the store, falling back to defaults
    pub fn load<S: PersistentStore + ?Sized>(store: &S) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(settings) => {
                    log::info!("Loaded settings from storage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Could not read settings: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to the store
    pub fn save<S: PersistentStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        let value = serde_json::to_value(self).map_err(|source| StoreError::Corrupt {
            key: Self::STORAGE_KEY.to_string(),
            source,
        })?;
        store.put(Self::STORAGE_KEY, value)?;
        log::info!("Settings saved");
        Ok(())
    }
}
