//! Browser platform: LocalStorage store, GameBoyCore binding, JS exports

use js_sys::{Array, JSON, Reflect, Uint8Array};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::Storage;

use super::{Engine, EngineError};
use crate::persistence::{PersistentStore, StoreError, export_game, import_all};
use crate::session::Session;
use crate::settings::Settings;

fn unavailable(e: JsValue) -> StoreError {
    StoreError::Unavailable(format!("{:?}", e))
}

fn engine_error(e: JsValue) -> EngineError {
    EngineError(format!("{:?}", e))
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// `window.localStorage`, values stored as JSON text
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self, StoreError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StoreError::Unavailable("window.localStorage is not available".into()))?;
        Ok(Self { storage })
    }
}

impl PersistentStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let Some(text) = self.storage.get_item(key).map_err(unavailable)? else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            })
    }

    fn put(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let text = serde_json::to_string(&value).map_err(|source| StoreError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        self.storage.set_item(key, &text).map_err(unavailable)
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.storage.remove_item(key).map_err(unavailable)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let len = self.storage.length().map_err(unavailable)?;
        let mut keys = Vec::with_capacity(len as usize);
        for index in 0..len {
            if let Some(key) = self.storage.key(index).map_err(unavailable)? {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

#[wasm_bindgen]
extern "C" {
    /// Emulator core object from the JS GameBoy engine
    pub type GameBoyCore;

    #[wasm_bindgen(method, getter)]
    fn name(this: &GameBoyCore) -> String;

    #[wasm_bindgen(method, getter, js_name = cBATT)]
    fn c_batt(this: &GameBoyCore) -> bool;

    #[wasm_bindgen(method, getter, js_name = cTIMER)]
    fn c_timer(this: &GameBoyCore) -> bool;

    #[wasm_bindgen(method, catch, js_name = saveSRAMState)]
    fn save_sram_state(this: &GameBoyCore) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = saveRTCState)]
    fn save_rtc_state(this: &GameBoyCore) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = saveState)]
    fn save_state(this: &GameBoyCore) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = returnFromState)]
    fn return_from_state(this: &GameBoyCore, state: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method)]
    fn start(this: &GameBoyCore);

    #[wasm_bindgen(method)]
    fn run(this: &GameBoyCore);
}

/// `Engine` over a JS `GameBoyCore`
///
/// SRAM is a plain byte array. RTC and machine state hold values wider than a
/// byte (timestamps, nested arrays), so they travel as JSON text.
pub struct JsEngine {
    core: GameBoyCore,
    pending_sram: Vec<u8>,
    pending_rtc: Vec<u8>,
}

impl JsEngine {
    pub fn new(core: GameBoyCore) -> Self {
        Self {
            core,
            pending_sram: Vec::new(),
            pending_rtc: Vec::new(),
        }
    }

    fn json_bytes(value: Result<JsValue, JsValue>) -> Result<Vec<u8>, EngineError> {
        let value = value.map_err(engine_error)?;
        let text: String = JSON::stringify(&value).map_err(engine_error)?.into();
        Ok(text.into_bytes())
    }

    /// Install a one-shot open hook (`openMBC` / `openRTC`) the core calls on start
    fn install_hook(&self, hook: &str, data: JsValue) {
        let callback = Closure::once_into_js(move |_name: JsValue| -> JsValue { data });
        if let Err(e) = Reflect::set(&self.core, &JsValue::from_str(hook), &callback) {
            log::error!("Could not install {}: {:?}", hook, e);
        }
    }
}

impl Engine for JsEngine {
    fn name(&self) -> String {
        self.core.name()
    }

    fn has_battery_backup(&self) -> bool {
        self.core.c_batt()
    }

    fn has_rtc(&self) -> bool {
        self.core.c_timer()
    }

    fn read_sram(&self) -> Result<Vec<u8>, EngineError> {
        let sram = self.core.save_sram_state().map_err(engine_error)?;
        Ok(Uint8Array::new(&sram).to_vec())
    }

    fn read_rtc(&self) -> Result<Vec<u8>, EngineError> {
        Self::json_bytes(self.core.save_rtc_state())
    }

    fn read_snapshot(&self) -> Result<Vec<u8>, EngineError> {
        Self::json_bytes(self.core.save_state())
    }

    fn load_sram(&mut self, sram: &[u8]) {
        self.pending_sram = sram.to_vec();
    }

    fn load_rtc(&mut self, rtc: &[u8]) {
        self.pending_rtc = rtc.to_vec();
    }

    fn restore_snapshot(&mut self, snapshot: &[u8]) -> Result<(), EngineError> {
        let text = std::str::from_utf8(snapshot).map_err(|e| EngineError(e.to_string()))?;
        let state = JSON::parse(text).map_err(engine_error)?;
        self.core.return_from_state(&state).map_err(engine_error)
    }

    fn start(&mut self) {
        let sram = std::mem::take(&mut self.pending_sram);
        self.install_hook("openMBC", Uint8Array::from(sram.as_slice()).into());

        // The core expects its RTC array back; bytes that are not JSON text
        // go back as a plain number array
        let rtc = std::mem::take(&mut self.pending_rtc);
        let rtc = std::str::from_utf8(&rtc)
            .ok()
            .filter(|text| !text.is_empty())
            .and_then(|text| JSON::parse(text).ok())
            .unwrap_or_else(|| Array::from(&Uint8Array::from(rtc.as_slice())).into());
        self.install_hook("openRTC", rtc);

        self.core.start();
    }

    fn run(&mut self) {
        self.core.run();
    }
}

/// Set up panic reporting and console logging at the stored level
pub fn init() {
    console_error_panic_hook::set_once();
    let level = LocalStorage::open()
        .map(|store| Settings::load(&store).level_filter())
        .unwrap_or(log::LevelFilter::Info);
    if let Some(level) = level.to_level() {
        if let Err(e) = console_log::init_with_level(level) {
            web_sys::console::warn_1(&format!("Logger already initialized: {}", e).into());
        }
    }
}

/// Session handle exported to the page script
#[wasm_bindgen]
pub struct WebSession {
    inner: Session<JsEngine, LocalStorage>,
}

#[wasm_bindgen]
impl WebSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebSession, JsValue> {
        let store = LocalStorage::open().map_err(to_js)?;
        let settings = Settings::load(&store);
        Ok(Self {
            inner: Session::new(store, settings),
        })
    }

    /// Host loop period for `setInterval`
    #[wasm_bindgen(js_name = runIntervalMs)]
    pub fn run_interval_ms(&self) -> u32 {
        self.inner.settings().run_interval_ms
    }

    pub fn start(&mut self, core: GameBoyCore) {
        self.inner.start(JsEngine::new(core));
    }

    #[wasm_bindgen(js_name = runFrame)]
    pub fn run_frame(&mut self) -> bool {
        self.inner.run_frame()
    }

    pub fn pause(&mut self) {
        self.inner.pause();
    }

    pub fn resume(&mut self) {
        self.inner.run();
    }

    #[wasm_bindgen(js_name = autoSave)]
    pub fn auto_save(&mut self) {
        self.inner.auto_save();
    }

    /// Returns the freeze slot key written
    #[wasm_bindgen(js_name = saveFreeze)]
    pub fn save_freeze(&mut self) -> Result<String, JsValue> {
        self.inner.save_freeze().map_err(to_js)
    }

    #[wasm_bindgen(js_name = openState)]
    pub fn open_state(&mut self, key: &str, core: GameBoyCore) -> Result<bool, JsValue> {
        self.inner.open_state(key, JsEngine::new(core)).map_err(to_js)
    }

    /// Save file bytes for every entry of a game
    #[wasm_bindgen(js_name = exportSaves)]
    pub fn export_saves(&self, game: &str) -> Result<Vec<u8>, JsValue> {
        export_game(self.inner.saves(), game).map_err(to_js)
    }

    /// Returns the number of entries written
    #[wasm_bindgen(js_name = importSaves)]
    pub fn import_saves(&mut self, data: &[u8]) -> Result<u32, JsValue> {
        let report = import_all(self.inner.saves_mut().store_mut(), data).map_err(to_js)?;
        Ok(report.imported.len() as u32)
    }
}
