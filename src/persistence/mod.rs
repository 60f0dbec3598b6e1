//! Save/load persistence over an external key-value store
//!
//! Features:
//! - Deterministic key naming per game and freeze slot
//! - SRAM/RTC/snapshot orchestration with legacy SRAM migration
//! - Save file import/export through the blob container

pub mod keys;
pub mod orchestrator;
pub mod store;
pub mod transfer;

pub use keys::{freeze_key, next_freeze_key, rtc_key, sram_b64_key, sram_key};
pub use orchestrator::{AutoSaveReport, SaveError, SaveManager, SaveOutcome, SkipReason};
pub use store::{MemoryStore, PersistentStore, StoreError};
pub use transfer::{ImportError, ImportReport, export_all, export_game, import_all};
