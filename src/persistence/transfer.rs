//! Save file import/export
//!
//! A save file is a multi-blob container. SRAM travels as raw bytes under its
//! legacy `SRAM_` ID; every other entry travels as the JSON text of its stored
//! value.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use thiserror::Error;

use super::keys::{SRAM_B64_PREFIX, SRAM_PREFIX, freeze_keys, rtc_key, sram_key};
use super::orchestrator::{SaveError, SaveManager};
use super::store::{PersistentStore, StoreError};
use crate::container::{self, ContainerError};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Could not decode the imported file.")]
    NotAContainer,
}

/// What an import did with each blob
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Store keys written
    pub imported: Vec<String>,
    /// Blob IDs whose content could not be interpreted
    pub skipped: Vec<String>,
    /// Store keys the store refused to write
    pub failed: Vec<String>,
}

/// Bundle selected entries into one portable container
pub fn export_all<K, C>(pairs: &[(K, C)]) -> Result<Vec<u8>, ContainerError>
where
    K: AsRef<str>,
    C: AsRef<[u8]>,
{
    container::encode_multi(pairs)
}

/// Bundle every saved entry for a game: SRAM, RTC and freeze slots
pub fn export_game<S: PersistentStore>(
    saves: &SaveManager<S>,
    game: &str,
) -> Result<Vec<u8>, SaveError> {
    let mut pairs: Vec<(String, Vec<u8>)> = Vec::new();

    let sram = saves.restore_sram(game)?;
    if !sram.is_empty() {
        pairs.push((sram_key(game), sram));
    }

    let store = saves.store();
    let mut keys = vec![rtc_key(game)];
    keys.extend(freeze_keys(store, game)?);
    for key in keys {
        if let Some(value) = store.get(&key)? {
            let text = serde_json::to_vec(&value).map_err(|source| StoreError::Corrupt {
                key: key.clone(),
                source,
            })?;
            pairs.push((key, text));
        }
    }

    log::info!("Exporting {} entries for {}", pairs.len(), game);
    Ok(container::encode_with_console(saves.console_id(), pairs.as_slice())?)
}

/// Write every blob of a save file into the store
///
/// Blobs that cannot be interpreted or written are logged and listed in the
/// report, and the rest still go in. A file that is not a container at all
/// fails the whole import.
pub fn import_all<S: PersistentStore + ?Sized>(
    store: &mut S,
    data: &[u8],
) -> Result<ImportReport, ImportError> {
    let decoded = container::decode(data);
    if !decoded.is_recognized() || decoded.is_empty() {
        log::error!("{}", ImportError::NotAContainer);
        return Err(ImportError::NotAContainer);
    }

    let mut report = ImportReport::default();
    for blob in decoded.into_blobs() {
        log::info!("Importing blob \"{}\"", blob.id);

        if blob.content.is_empty() {
            if blob.id.is_empty() {
                log::error!("Blob chunk information missing completely.");
            } else {
                log::error!(
                    "Save file imported had blob \"{}\" with no blob data interpretable.",
                    blob.id
                );
            }
            report.skipped.push(blob.id);
            continue;
        }

        let (key, value): (String, Value) = if blob.id.starts_with(SRAM_PREFIX) {
            let key = format!("{}{}", SRAM_B64_PREFIX, &blob.id[SRAM_PREFIX.len()..]);
            (key, BASE64.encode(&blob.content).into())
        } else {
            match serde_json::from_slice(&blob.content) {
                Ok(value) => (blob.id, value),
                Err(e) => {
                    log::error!(
                        "Save file imported had blob \"{}\" with no blob data interpretable ({}).",
                        blob.id,
                        e
                    );
                    report.skipped.push(blob.id);
                    continue;
                }
            }
        };

        match store.put(&key, value) {
            Ok(()) => report.imported.push(key),
            Err(e) => {
                log::error!("Could not store imported entry {}: {}", key, e);
                report.failed.push(key);
            }
        }
    }

    Ok(report)
}
