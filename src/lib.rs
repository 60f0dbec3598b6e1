//! GameBoy IO - save persistence for a browser Game Boy emulator
//!
//! Core modules:
//! - `container`: `EMULATOR_DATA` blob container codec
//! - `persistence`: Store abstraction, key naming, save orchestration, import/export
//! - `session`: Emulator lifecycle with auto-save and freeze states
//! - `platform`: Engine abstraction and browser bindings
//! - `settings`: Persisted front-end settings

pub mod container;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;

pub use container::{Blob, Container, ContainerError};
pub use persistence::{MemoryStore, PersistentStore, SaveError, SaveManager};
pub use platform::{Engine, EngineError};
pub use session::{Session, SessionError};
pub use settings::Settings;
