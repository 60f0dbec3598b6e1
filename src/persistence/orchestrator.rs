//! Save orchestration
//!
//! Decides what to persist and restore for a game:
//! - SRAM as base64 text, retiring the legacy raw entry on write
//! - RTC verbatim
//! - Full snapshots wrapped in a one-blob container
//!
//! Each operation is independent; `auto_save` runs SRAM and RTC and keeps
//! going when one of them fails.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use thiserror::Error;

use super::keys::{next_freeze_key, rtc_key, sram_b64_key, sram_key};
use super::store::{PersistentStore, StoreError, bytes_to_value, value_to_bytes};
use crate::container::{self, CONSOLE_ID, ContainerError};
use crate::platform::{Engine, EngineError};

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("stored value under {key} is not a byte buffer")]
    NotBytes { key: String },

    #[error("stored value under {key} is not valid base64: {source}")]
    Base64 {
        key: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("save state {key} is damaged: {reason}")]
    CorruptSnapshot { key: String, reason: &'static str },
}

/// Why a persist call wrote nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoBatteryBackup,
    EmptySram,
    NoRtc,
}

/// Result of a persist call that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Written { key: String },
    Skipped(SkipReason),
}

/// Individual results of an auto-save
#[derive(Debug)]
pub struct AutoSaveReport {
    pub sram: Result<SaveOutcome, SaveError>,
    pub rtc: Result<SaveOutcome, SaveError>,
}

impl AutoSaveReport {
    pub fn is_ok(&self) -> bool {
        self.sram.is_ok() && self.rtc.is_ok()
    }
}

/// Save orchestrator over an injected store
pub struct SaveManager<S> {
    store: S,
    console_id: String,
}

impl<S: PersistentStore> SaveManager<S> {
    pub fn new(store: S) -> Self {
        Self::with_console_id(store, CONSOLE_ID)
    }

    /// Use a different console ID for snapshot containers
    pub fn with_console_id(store: S, console_id: impl Into<String>) -> Self {
        Self {
            store,
            console_id: console_id.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn console_id(&self) -> &str {
        &self.console_id
    }

    /// Persist battery-backed SRAM as base64
    pub fn persist_sram<E: Engine + ?Sized>(&mut self, engine: &E) -> Result<SaveOutcome, SaveError> {
        if !engine.has_battery_backup() {
            log::info!("Cannot save a game that does not have battery backed SRAM specified.");
            return Ok(SaveOutcome::Skipped(SkipReason::NoBatteryBackup));
        }

        let sram = engine.read_sram()?;
        if sram.is_empty() {
            log::info!("SRAM could not be saved because it was empty.");
            return Ok(SaveOutcome::Skipped(SkipReason::EmptySram));
        }

        let game = engine.name();
        log::info!("Saving the SRAM...");
        let legacy = sram_key(&game);
        if self.store.contains(&legacy)? {
            log::info!("Deleting the old SRAM save due to outdated format.");
            self.store.delete(&legacy)?;
        }

        let key = sram_b64_key(&game);
        self.store.put(&key, Value::String(BASE64.encode(&sram)))?;
        Ok(SaveOutcome::Written { key })
    }

    /// Persist real-time clock state verbatim
    pub fn persist_rtc<E: Engine + ?Sized>(&mut self, engine: &E) -> Result<SaveOutcome, SaveError> {
        if !engine.has_rtc() {
            return Ok(SaveOutcome::Skipped(SkipReason::NoRtc));
        }

        log::info!("Saving the RTC...");
        let rtc = engine.read_rtc()?;
        let key = rtc_key(&engine.name());
        self.store.put(&key, bytes_to_value(&rtc))?;
        Ok(SaveOutcome::Written { key })
    }

    /// Persist the engine's full state under an explicit key
    pub fn persist_snapshot<E: Engine + ?Sized>(
        &mut self,
        engine: &E,
        key: &str,
    ) -> Result<SaveOutcome, SaveError> {
        let snapshot = engine.read_snapshot()?;
        let encoded = container::encode_with_console(&self.console_id, &[(key, snapshot)])?;
        self.store.put(key, Value::String(BASE64.encode(&encoded)))?;
        log::info!("Saved the current state as: {}", key);
        Ok(SaveOutcome::Written {
            key: key.to_string(),
        })
    }

    /// Persist a snapshot into the next free freeze slot
    pub fn save_freeze<E: Engine + ?Sized>(&mut self, engine: &E) -> Result<String, SaveError> {
        let key = next_freeze_key(&self.store, &engine.name())?;
        self.persist_snapshot(engine, &key)?;
        Ok(key)
    }

    /// Save SRAM then RTC; a failure in one is logged and does not stop the other
    pub fn auto_save<E: Engine + ?Sized>(&mut self, engine: &E) -> AutoSaveReport {
        log::info!("Automatically saving the SRAM.");
        let sram = self.persist_sram(engine);
        if let Err(e) = &sram {
            log::error!("Could not save the SRAM of {}: {}", engine.name(), e);
        }
        let rtc = self.persist_rtc(engine);
        if let Err(e) = &rtc {
            log::error!("Could not save the RTC of {}: {}", engine.name(), e);
        }
        AutoSaveReport { sram, rtc }
    }

    /// Saved SRAM for a game; empty if there is none
    pub fn restore_sram(&self, game: &str) -> Result<Vec<u8>, SaveError> {
        let key = sram_b64_key(game);
        if let Some(value) = self.store.get(&key)? {
            log::info!("Found a previous SRAM state (Will attempt to load).");
            let text = value.as_str().ok_or(SaveError::NotBytes { key: key.clone() })?;
            return BASE64
                .decode(text)
                .map_err(|source| SaveError::Base64 { key, source });
        }

        let key = sram_key(game);
        if let Some(value) = self.store.get(&key)? {
            log::info!("Found a previous SRAM state (Will attempt to load).");
            return value_to_bytes(&value).ok_or(SaveError::NotBytes { key });
        }

        log::info!("Could not find any previous SRAM copy for the current ROM.");
        Ok(Vec::new())
    }

    /// Saved RTC state for a game; empty if there is none
    pub fn restore_rtc(&self, game: &str) -> Result<Vec<u8>, SaveError> {
        let key = rtc_key(game);
        match self.store.get(&key)? {
            Some(value) => {
                log::info!("Found a previous RTC state (Will attempt to load).");
                Ok(stored_bytes(&key, &value)?)
            }
            None => {
                log::info!("Could not find any previous RTC copy for the current ROM.");
                Ok(Vec::new())
            }
        }
    }

    /// Raw snapshot bytes stored under `key`
    ///
    /// `Ok(None)` means nothing was saved there; damaged data is an error.
    pub fn restore_snapshot(&self, key: &str) -> Result<Option<Vec<u8>>, SaveError> {
        let Some(value) = self.store.get(key)? else {
            log::info!("No save state stored under {}", key);
            return Ok(None);
        };

        let Value::String(text) = &value else {
            // Older saves kept the engine's state array as-is
            return Ok(Some(stored_bytes(key, &value)?));
        };

        let raw = BASE64.decode(text).map_err(|source| SaveError::Base64 {
            key: key.to_string(),
            source,
        })?;
        let decoded = container::decode(&raw);
        if !decoded.is_recognized() {
            return Ok(Some(raw));
        }

        if let Some(blob) = decoded.blob(key) {
            return Ok(Some(blob.content.clone()));
        }
        let truncated = decoded.truncated;
        let reason = if truncated {
            "state blob is incomplete"
        } else {
            "container holds no state"
        };
        // Imported containers may carry the state under another ID
        match decoded.blobs.into_iter().next() {
            Some(blob) if !truncated => Ok(Some(blob.content)),
            _ => Err(SaveError::CorruptSnapshot {
                key: key.to_string(),
                reason,
            }),
        }
    }

    /// Remove a saved state (slot becomes free again)
    pub fn delete_snapshot(&mut self, key: &str) -> Result<(), SaveError> {
        self.store.delete(key)?;
        log::info!("Deleted save state {}", key);
        Ok(())
    }
}

/// Bytes of a stored RTC or state value
///
/// Byte arrays come back as-is. Anything else is an engine value the browser
/// glue wrote directly (timestamps, nested arrays) and comes back as its JSON
/// text, the form the JS engine binding reads.
fn stored_bytes(key: &str, value: &Value) -> Result<Vec<u8>, StoreError> {
    if let Some(bytes) = value_to_bytes(value) {
        return Ok(bytes);
    }
    serde_json::to_vec(value).map_err(|source| StoreError::Corrupt {
        key: key.to_string(),
        source,
    })
}
