//! Emulator session
//!
//! Owns the running engine and applies the save rules around its lifecycle:
//! the previous game is auto-saved before another one starts, pausing
//! auto-saves, and freeze states can be written and reopened.

use thiserror::Error;

use crate::persistence::{AutoSaveReport, PersistentStore, SaveError, SaveManager};
use crate::platform::{Engine, EngineError};
use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("GameBoy core cannot be saved while it has not been initialized.")]
    NotInitialized,

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// A running (or paused) emulator plus its save manager
pub struct Session<E, S> {
    engine: Option<E>,
    playing: bool,
    saves: SaveManager<S>,
    settings: Settings,
}

impl<E: Engine, S: PersistentStore> Session<E, S> {
    pub fn new(store: S, settings: Settings) -> Self {
        let saves = SaveManager::with_console_id(store, settings.console_id.clone());
        Self {
            engine: None,
            playing: false,
            saves,
            settings,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.engine.is_some() && self.playing
    }

    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    pub fn saves(&self) -> &SaveManager<S> {
        &self.saves
    }

    pub fn saves_mut(&mut self) -> &mut SaveManager<S> {
        &mut self.saves
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Start a new game, saving the one that was running
    pub fn start(&mut self, mut engine: E) {
        self.clear_last_emulation();
        if self.settings.auto_save_on_switch {
            self.auto_save();
        }

        let game = engine.name();
        // A broken save must not keep the game from booting
        match self.saves.restore_sram(&game) {
            Ok(sram) => engine.load_sram(&sram),
            Err(e) => log::error!("Could not open the SRAM of the saved emulation state: {}", e),
        }
        match self.saves.restore_rtc(&game) {
            Ok(rtc) => engine.load_rtc(&rtc),
            Err(e) => log::error!("Could not open the RTC data of the saved emulation state: {}", e),
        }

        engine.start();
        self.engine = Some(engine);
        self.run();
    }

    /// Resume the iterator
    pub fn run(&mut self) {
        match self.engine {
            None => log::warn!("GameBoy core cannot run while it has not been initialized."),
            Some(_) if self.playing => log::warn!("The GameBoy core is already running."),
            Some(_) => {
                log::info!("Starting the iterator.");
                self.playing = true;
            }
        }
    }

    /// One tick of the host loop; returns whether the engine ran
    pub fn run_frame(&mut self) -> bool {
        match self.engine.as_mut() {
            Some(engine) if self.playing => {
                engine.run();
                true
            }
            _ => false,
        }
    }

    /// Pause, saving SRAM/RTC first
    pub fn pause(&mut self) {
        if !self.is_initialized() {
            log::warn!("GameBoy core cannot be paused while it has not been initialized.");
            return;
        }
        if !self.playing {
            log::warn!("GameBoy core has already been paused.");
            return;
        }
        if self.settings.auto_save_on_pause {
            self.auto_save();
        }
        self.clear_last_emulation();
    }

    /// Save SRAM and RTC of the current game, if any
    pub fn auto_save(&mut self) -> Option<AutoSaveReport> {
        let engine = self.engine.as_ref()?;
        Some(self.saves.auto_save(engine))
    }

    /// Write a full snapshot into the next free freeze slot
    pub fn save_freeze(&mut self) -> Result<String, SessionError> {
        let engine = self.engine.as_ref().ok_or(SessionError::NotInitialized)?;
        Ok(self.saves.save_freeze(engine)?)
    }

    /// Replace the current emulation with a saved state
    ///
    /// `Ok(false)` when nothing is stored under `key`.
    pub fn open_state(&mut self, key: &str, mut engine: E) -> Result<bool, SessionError> {
        let Some(snapshot) = self.saves.restore_snapshot(key)? else {
            log::error!("Could not find the save state \"{}\".", key);
            return Ok(false);
        };

        self.clear_last_emulation();
        log::info!("Attempting to run a saved emulation state.");
        engine.restore_snapshot(&snapshot)?;
        self.engine = Some(engine);
        self.run();
        Ok(true)
    }

    /// Stop the running emulation without dropping it
    fn clear_last_emulation(&mut self) {
        if self.is_playing() {
            self.playing = false;
            log::info!("The previous emulation has been cleared.");
        } else {
            log::debug!("No previous emulation was found to be cleared.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::platform::fake::FakeEngine;
    use serde_json::json;

    fn session() -> Session<FakeEngine, MemoryStore> {
        Session::new(MemoryStore::new(), Settings::default())
    }

    #[test]
    fn test_start_restores_saves() {
        let mut store = MemoryStore::new();
        store.put("B64_SRAM_tetris", json!("AQID")).unwrap();
        store.put("RTC_tetris", json!([9])).unwrap();
        let mut session = Session::new(store, Settings::default());

        session.start(FakeEngine::new("tetris").with_sram(&[]));

        let engine = session.engine().unwrap();
        assert!(engine.started);
        assert_eq!(engine.loaded_sram.as_deref(), Some([1u8, 2, 3].as_slice()));
        assert_eq!(engine.loaded_rtc.as_deref(), Some([9u8].as_slice()));
        assert!(session.is_playing());
    }

    #[test]
    fn test_start_saves_previous_game() {
        let mut session = session();
        session.start(FakeEngine::new("tetris").with_sram(&[7, 7]));
        session.start(FakeEngine::new("zelda"));

        assert_eq!(session.saves().restore_sram("tetris").unwrap(), vec![7, 7]);
        assert_eq!(session.engine().unwrap().name, "zelda");
    }

    #[test]
    fn test_start_without_auto_save() {
        let settings = Settings {
            auto_save_on_switch: false,
            ..Default::default()
        };
        let mut session = Session::new(MemoryStore::new(), settings);
        session.start(FakeEngine::new("tetris").with_sram(&[7, 7]));
        session.start(FakeEngine::new("zelda"));

        assert!(session.saves().store().is_empty());
        assert_eq!(session.engine().unwrap().name, "zelda");
        assert!(session.is_playing());
    }

    #[test]
    fn test_run_frame_only_while_playing() {
        let mut session = session();
        assert!(!session.run_frame());

        session.start(FakeEngine::new("tetris"));
        assert!(session.run_frame());
        assert!(session.run_frame());

        session.pause();
        assert!(!session.run_frame());
        assert_eq!(session.engine().unwrap().iterations, 2);

        session.run();
        assert!(session.run_frame());
    }

    #[test]
    fn test_pause_auto_saves() {
        let mut session = session();
        session.start(FakeEngine::new("POKEMON GOLD").with_sram(&[1]).with_rtc(&[2]));
        session.pause();

        assert!(!session.is_playing());
        assert!(session.saves().store().contains("B64_SRAM_POKEMON GOLD").unwrap());
        assert!(session.saves().store().contains("RTC_POKEMON GOLD").unwrap());
    }

    #[test]
    fn test_pause_without_auto_save() {
        let settings = Settings {
            auto_save_on_pause: false,
            ..Default::default()
        };
        let mut session = Session::new(MemoryStore::new(), settings);
        session.start(FakeEngine::new("tetris").with_sram(&[1]));
        session.pause();

        assert!(session.saves().store().is_empty());
    }

    #[test]
    fn test_save_freeze_requires_engine() {
        let mut session = session();
        assert!(matches!(session.save_freeze(), Err(SessionError::NotInitialized)));

        session.start(FakeEngine::new("tetris").with_snapshot(b"s"));
        assert_eq!(session.save_freeze().unwrap(), "FREEZE_tetris_0");
        assert_eq!(session.save_freeze().unwrap(), "FREEZE_tetris_1");
    }

    #[test]
    fn test_open_state() {
        let mut session = session();
        session.start(FakeEngine::new("tetris").with_snapshot(b"frozen"));
        let key = session.save_freeze().unwrap();

        assert!(!session.open_state("FREEZE_tetris_9", FakeEngine::new("")).unwrap());
        assert_eq!(session.engine().unwrap().name, "tetris");

        assert!(session.open_state(&key, FakeEngine::new("tetris")).unwrap());
        let engine = session.engine().unwrap();
        assert_eq!(engine.restored.as_deref(), Some(b"frozen".as_slice()));
        assert!(session.is_playing());
    }

    #[test]
    fn test_console_id_from_settings() {
        let settings = Settings {
            console_id: "GameBoyColor".into(),
            ..Default::default()
        };
        let session: Session<FakeEngine, _> = Session::new(MemoryStore::new(), settings);
        assert_eq!(session.saves().console_id(), "GameBoyColor");
    }
}
