//! GameBoy IO entry point
//!
//! On the web this only initializes logging; the page script drives
//! `WebSession`. Natively it inspects exported save files.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    gameboy_io::platform::web::init();
    log::info!("GameBoy IO ready");
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("usage: gameboy-io <save-file>...");
        std::process::exit(2);
    }

    let mut failed = false;
    for path in &paths {
        match std::fs::read(path) {
            Ok(data) => inspect(path, &data),
            Err(e) => {
                log::error!("Could not read {}: {}", path, e);
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Log the layout of one save file
#[cfg(not(target_arch = "wasm32"))]
fn inspect(path: &str, data: &[u8]) {
    let container = gameboy_io::container::decode(data);
    let Some(console_id) = &container.console_id else {
        log::warn!("{}: not an EMULATOR_DATA container ({} bytes)", path, data.len());
        return;
    };

    log::info!(
        "{}: console {}, {} blob(s){}",
        path,
        console_id,
        container.blobs.len(),
        if container.truncated { ", truncated" } else { "" }
    );
    for blob in &container.blobs {
        log::info!("  {} ({} bytes)", blob.id, blob.content.len());
    }
}
