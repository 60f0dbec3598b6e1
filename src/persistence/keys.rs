//! Persistent store key naming
//!
//! Every entry is keyed by a category prefix and the game's internal name.

use super::store::{PersistentStore, StoreError};

/// Legacy raw-format SRAM
pub const SRAM_PREFIX: &str = "SRAM_";
/// Base64 SRAM, the current format
pub const SRAM_B64_PREFIX: &str = "B64_SRAM_";
pub const RTC_PREFIX: &str = "RTC_";
pub const FREEZE_PREFIX: &str = "FREEZE_";

pub fn sram_key(game: &str) -> String {
    format!("{SRAM_PREFIX}{game}")
}

pub fn sram_b64_key(game: &str) -> String {
    format!("{SRAM_B64_PREFIX}{game}")
}

pub fn rtc_key(game: &str) -> String {
    format!("{RTC_PREFIX}{game}")
}

pub fn freeze_key(game: &str, slot: u32) -> String {
    format!("{FREEZE_PREFIX}{game}_{slot}")
}

/// First freeze slot key not already present in the store
///
/// Linear scan from slot 0; slot counts stay small.
pub fn next_freeze_key<S: PersistentStore + ?Sized>(
    store: &S,
    game: &str,
) -> Result<String, StoreError> {
    let mut slot = 0;
    loop {
        let key = freeze_key(game, slot);
        if !store.contains(&key)? {
            return Ok(key);
        }
        slot += 1;
    }
}

/// Keys of every occupied freeze slot for a game, by slot number
///
/// Deleted slots leave gaps, so this lists the store rather than probing
/// from slot 0.
pub fn freeze_keys<S: PersistentStore + ?Sized>(
    store: &S,
    game: &str,
) -> Result<Vec<String>, StoreError> {
    let prefix = format!("{FREEZE_PREFIX}{game}_");
    let mut slots: Vec<(u32, String)> = store
        .keys()?
        .into_iter()
        .filter_map(|key| {
            let slot = key.strip_prefix(&prefix)?.parse::<u32>().ok()?;
            // Only canonical numbering, so "FREEZE_a_01" is not slot 1
            (freeze_key(game, slot) == key).then_some((slot, key))
        })
        .collect();
    slots.sort_unstable_by_key(|(slot, _)| *slot);
    Ok(slots.into_iter().map(|(_, key)| key).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_key_derivation() {
        assert_eq!(sram_key("tetris"), "SRAM_tetris");
        assert_eq!(sram_b64_key("tetris"), "B64_SRAM_tetris");
        assert_eq!(rtc_key("POKEMON GOLD"), "RTC_POKEMON GOLD");
        assert_eq!(freeze_key("tetris", 3), "FREEZE_tetris_3");
    }

    #[test]
    fn test_next_freeze_key_empty_store() {
        let store = MemoryStore::new();
        assert_eq!(next_freeze_key(&store, "tetris").unwrap(), "FREEZE_tetris_0");
    }

    #[test]
    fn test_next_freeze_key_skips_existing() {
        let mut store = MemoryStore::new();
        store.put("FREEZE_tetris_0", json!("a")).unwrap();
        store.put("FREEZE_tetris_1", json!("b")).unwrap();
        // Other games do not affect numbering
        store.put("FREEZE_zelda_2", json!("c")).unwrap();

        assert_eq!(next_freeze_key(&store, "tetris").unwrap(), "FREEZE_tetris_2");
        assert_eq!(next_freeze_key(&store, "zelda").unwrap(), "FREEZE_zelda_0");
    }

    #[test]
    fn test_next_freeze_key_fills_gap() {
        let mut store = MemoryStore::new();
        store.put("FREEZE_tetris_0", json!("a")).unwrap();
        store.put("FREEZE_tetris_2", json!("c")).unwrap();

        assert_eq!(next_freeze_key(&store, "tetris").unwrap(), "FREEZE_tetris_1");
    }

    #[test]
    fn test_freeze_keys_across_gaps() {
        let mut store = MemoryStore::new();
        assert!(freeze_keys(&store, "tetris").unwrap().is_empty());

        store.put("FREEZE_tetris_1", json!("b")).unwrap();
        store.put("FREEZE_tetris_10", json!("k")).unwrap();
        store.put("FREEZE_tetris_3", json!("d")).unwrap();
        assert_eq!(
            freeze_keys(&store, "tetris").unwrap(),
            ["FREEZE_tetris_1", "FREEZE_tetris_3", "FREEZE_tetris_10"]
        );
    }

    #[test]
    fn test_freeze_keys_ignores_other_games() {
        let mut store = MemoryStore::new();
        store.put("FREEZE_a_0", json!("x")).unwrap();
        // Same prefix, different game name
        store.put("FREEZE_a_b_0", json!("y")).unwrap();
        store.put("FREEZE_a_notaslot", json!("z")).unwrap();
        store.put("RTC_a", json!([1])).unwrap();

        assert_eq!(freeze_keys(&store, "a").unwrap(), ["FREEZE_a_0"]);
        assert_eq!(freeze_keys(&store, "a_b").unwrap(), ["FREEZE_a_b_0"]);
    }
}
