//! Platform abstraction layer
//!
//! Handles the seams between the save core and its host:
//! - `Engine`: the emulator core, queried for SRAM/RTC/state buffers
//! - LocalStorage-backed `PersistentStore` and JS engine binding (wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod web;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("emulator engine error: {0}")]
pub struct EngineError(pub String);

/// Emulator core as seen by the save logic
///
/// Capabilities are explicit queries rather than flags on the core object.
pub trait Engine {
    /// Internal ROM name, used to key every persisted entry
    fn name(&self) -> String;

    /// Cartridge has battery-backed SRAM
    fn has_battery_backup(&self) -> bool;

    /// Cartridge has a real-time clock
    fn has_rtc(&self) -> bool;

    fn read_sram(&self) -> Result<Vec<u8>, EngineError>;

    fn read_rtc(&self) -> Result<Vec<u8>, EngineError>;

    /// Full machine state
    fn read_snapshot(&self) -> Result<Vec<u8>, EngineError>;

    /// Hand previously saved SRAM to the core before it starts
    fn load_sram(&mut self, sram: &[u8]);

    fn load_rtc(&mut self, rtc: &[u8]);

    fn restore_snapshot(&mut self, snapshot: &[u8]) -> Result<(), EngineError>;

    fn start(&mut self);

    /// Run one iteration of the emulator loop
    fn run(&mut self);
}

#[cfg(test)]
pub(crate) mod fake {
    use super::{Engine, EngineError};

    /// Scriptable engine for orchestrator and session tests
    #[derive(Debug, Clone, Default)]
    pub struct FakeEngine {
        pub name: String,
        pub battery: bool,
        pub rtc_capable: bool,
        pub sram: Vec<u8>,
        pub rtc: Vec<u8>,
        pub snapshot: Vec<u8>,
        pub fail_reads: bool,
        pub loaded_sram: Option<Vec<u8>>,
        pub loaded_rtc: Option<Vec<u8>>,
        pub restored: Option<Vec<u8>>,
        pub started: bool,
        pub iterations: u32,
    }

    impl FakeEngine {
        pub fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                ..Default::default()
            }
        }

        pub fn with_sram(mut self, sram: &[u8]) -> Self {
            self.battery = true;
            self.sram = sram.to_vec();
            self
        }

        pub fn with_rtc(mut self, rtc: &[u8]) -> Self {
            self.rtc_capable = true;
            self.rtc = rtc.to_vec();
            self
        }

        pub fn with_snapshot(mut self, snapshot: &[u8]) -> Self {
            self.snapshot = snapshot.to_vec();
            self
        }

        fn check(&self) -> Result<(), EngineError> {
            if self.fail_reads {
                return Err(EngineError("read failed".into()));
            }
            Ok(())
        }
    }

    impl Engine for FakeEngine {
        fn name(&self) -> String {
            self.name.clone()
        }

        fn has_battery_backup(&self) -> bool {
            self.battery
        }

        fn has_rtc(&self) -> bool {
            self.rtc_capable
        }

        fn read_sram(&self) -> Result<Vec<u8>, EngineError> {
            self.check()?;
            Ok(self.sram.clone())
        }

        fn read_rtc(&self) -> Result<Vec<u8>, EngineError> {
            self.check()?;
            Ok(self.rtc.clone())
        }

        fn read_snapshot(&self) -> Result<Vec<u8>, EngineError> {
            self.check()?;
            Ok(self.snapshot.clone())
        }

        fn load_sram(&mut self, sram: &[u8]) {
            self.loaded_sram = Some(sram.to_vec());
        }

        fn load_rtc(&mut self, rtc: &[u8]) {
            self.loaded_rtc = Some(rtc.to_vec());
        }

        fn restore_snapshot(&mut self, snapshot: &[u8]) -> Result<(), EngineError> {
            self.restored = Some(snapshot.to_vec());
            Ok(())
        }

        fn start(&mut self) {
            self.started = true;
        }

        fn run(&mut self) {
            self.iterations += 1;
        }
    }
}
