// SPDX-License-Identifier: MIT

//!
//! The label pin store
//!

use chronolane_core::PinKey;
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

/// The key the pin map is persisted under
pub const PIN_STORAGE_KEY: &str = "pinnedLabels";

/// Errors that can arise when reading or writing persisted pins
#[derive(Error, Debug)]
pub enum StorageError {
    /// The storage backend can't be reached (e.g. storage disabled in the
    /// browser)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage write failed: {0}")]
    Write(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A key-value store the pins are persisted to
pub trait PinStorage {
    /// Read the value stored under `key` (`None` if nothing is stored)
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Keeps everything in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryPinStorage(HashMap<String, String>);

impl MemoryPinStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PinStorage for MemoryPinStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.0.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.0.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The single source of truth for which labels are pinned.  Every change is
/// written straight through to the storage backend.
///
/// A key is pinned if its persisted entry says so or, lacking an entry, if
/// the view state seeded it.  Only entries that differ from that fallback are
/// persisted, so toggling a key twice leaves storage as it was.
#[derive(Debug)]
pub struct PinStore<P: PinStorage> {
    storage: P,
    pins: BTreeMap<PinKey, bool>,
    seeded: BTreeSet<PinKey>,
}

impl<P: PinStorage> PinStore<P> {
    /// Load the persisted pins.  Unreadable or malformed content is logged
    /// and replaced with an empty map.
    pub fn load(storage: P) -> Self {
        let pins = match storage.read(PIN_STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<BTreeMap<PinKey, bool>>(&json) {
                Ok(pins) => pins,
                Err(error) => {
                    warn!("Could not parse {PIN_STORAGE_KEY}, starting empty: {error}");
                    BTreeMap::new()
                }
            },
            Ok(None) => BTreeMap::new(),
            Err(error) => {
                warn!("Could not read {PIN_STORAGE_KEY}, starting empty: {error}");
                BTreeMap::new()
            }
        };
        info!("Loaded {} pin entries", pins.len());
        Self {
            storage,
            pins,
            seeded: BTreeSet::new(),
        }
    }

    /// Pin every key that has no entry yet.  Existing entries (pinned or
    /// explicitly unpinned) win.  Nothing is written to storage.
    pub fn seed<'a, I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = &'a PinKey>,
    {
        for key in keys {
            if !self.pins.contains_key(key) {
                debug!("Seeding pin for {key}");
                self.seeded.insert(key.clone());
            }
        }
    }

    pub fn is_pinned(&self, key: &PinKey) -> bool {
        self.pins
            .get(key)
            .copied()
            .unwrap_or_else(|| self.seeded.contains(key))
    }

    /// Set the pinned state and persist.  An entry is only kept while it
    /// overrides the seeded state; a `false` is written only to unpin a seed.
    /// A failed write is logged and not retried; the in-memory state is kept
    /// either way.
    pub fn set_pinned(&mut self, key: &PinKey, pinned: bool) {
        if pinned == self.seeded.contains(key) {
            self.pins.remove(key);
        } else {
            self.pins.insert(key.clone(), pinned);
        }
        if let Err(error) = self.persist() {
            warn!("Could not persist pin state for {key}: {error}");
        }
    }

    /// Flip the pinned state, persist, and return the new state
    pub fn toggle(&mut self, key: &PinKey) -> bool {
        let pinned = !self.is_pinned(key);
        self.set_pinned(key, pinned);
        debug!("{key} is now {}", if pinned { "pinned" } else { "unpinned" });
        pinned
    }

    /// The pin map as persisted (JSON object, keys sorted)
    pub fn serialized(&self) -> String {
        serde_json::to_string(&self.pins).unwrap_or_else(|_| String::from("{}"))
    }

    /// The keys currently pinned, in key order
    pub fn pinned_keys(&self) -> impl Iterator<Item = &PinKey> {
        let persisted = self
            .pins
            .iter()
            .filter(|(_, pinned)| **pinned)
            .map(|(key, _)| key);
        let seeded = self
            .seeded
            .iter()
            .filter(|key| !self.pins.contains_key(*key));
        let mut keys: Vec<&PinKey> = persisted.chain(seeded).collect();
        keys.sort();
        keys.into_iter()
    }

    pub fn storage(&self) -> &P {
        &self.storage
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        let json = self.serialized();
        self.storage.write(PIN_STORAGE_KEY, &json)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Fails every write
    struct ReadOnlyStorage;

    impl PinStorage for ReadOnlyStorage {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(Some(String::from(r#"{"a::x": true}"#)))
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Write(String::from("read only")))
        }
    }

    fn storage_with(json: &str) -> MemoryPinStorage {
        let mut storage = MemoryPinStorage::new();
        storage.write(PIN_STORAGE_KEY, json).unwrap();
        storage
    }

    #[test]
    fn load_existing() {
        let store = PinStore::load(storage_with(r#"{"a::x": true, "a::y": false}"#));
        assert!(store.is_pinned(&PinKey::from("a::x")));
        assert!(!store.is_pinned(&PinKey::from("a::y")));
        assert!(!store.is_pinned(&PinKey::from("a::z")));
        let pinned: Vec<_> = store.pinned_keys().collect();
        assert_eq!(pinned, vec![&PinKey::from("a::x")]);
    }

    #[test]
    fn malformed_recovers_to_empty() {
        let store = PinStore::load(storage_with("{not json"));
        assert_eq!(store.serialized(), "{}");
        let store = PinStore::load(storage_with(r#"["a::x"]"#));
        assert_eq!(store.serialized(), "{}");
    }

    #[test]
    fn write_through() {
        let mut store = PinStore::load(MemoryPinStorage::new());
        store.set_pinned(&PinKey::from("a::x"), true);
        let persisted = store.storage().read(PIN_STORAGE_KEY).unwrap();
        assert_eq!(persisted.as_deref(), Some(r#"{"a::x":true}"#));
    }

    #[test]
    fn toggle_twice_is_idempotent() {
        let mut store = PinStore::load(storage_with(r#"{"a::x":false,"b::y":true}"#));
        let before = store.serialized();
        let key = PinKey::from("b::y");

        assert!(!store.toggle(&key));
        assert!(store.toggle(&key));
        assert!(store.is_pinned(&key));

        let persisted = store.storage().read(PIN_STORAGE_KEY).unwrap();
        assert_eq!(persisted, Some(before));
    }

    #[test]
    fn toggle_unknown_key_pins_it() {
        let mut store = PinStore::load(MemoryPinStorage::new());
        let key = PinKey::from("a::x");
        assert!(store.toggle(&key));
        assert!(!store.toggle(&key));
        assert!(!store.is_pinned(&key));
    }

    #[test]
    fn toggling_a_fresh_key_twice_restores_storage() {
        let mut store = PinStore::load(storage_with(r#"{"b::y":true}"#));
        let before = store.storage().read(PIN_STORAGE_KEY).unwrap();
        let key = PinKey::from("a::x");

        assert!(store.toggle(&key));
        let persisted = store.storage().read(PIN_STORAGE_KEY).unwrap();
        assert_eq!(persisted.as_deref(), Some(r#"{"a::x":true,"b::y":true}"#));

        assert!(!store.toggle(&key));
        let persisted = store.storage().read(PIN_STORAGE_KEY).unwrap();
        assert_eq!(persisted, before);
        assert_eq!(store.serialized(), r#"{"b::y":true}"#);
    }

    #[test]
    fn unpinning_a_seed_is_remembered() {
        let mut store = PinStore::load(MemoryPinStorage::new());
        let key = PinKey::from("a::x");
        store.seed([&key]);
        assert!(store.is_pinned(&key));
        assert_eq!(store.serialized(), "{}");

        assert!(!store.toggle(&key));
        let persisted = store.storage().read(PIN_STORAGE_KEY).unwrap();
        assert_eq!(persisted.as_deref(), Some(r#"{"a::x":false}"#));

        assert!(store.toggle(&key));
        let persisted = store.storage().read(PIN_STORAGE_KEY).unwrap();
        assert_eq!(persisted.as_deref(), Some("{}"));
        assert_eq!(store.pinned_keys().collect::<Vec<_>>(), vec![&key]);
    }

    #[test]
    fn failed_write_keeps_memory_state() {
        let mut store = PinStore::load(ReadOnlyStorage);
        let key = PinKey::from("a::x");
        assert!(!store.toggle(&key));
        assert!(!store.is_pinned(&key));
    }

    #[test]
    fn seed_respects_existing_entries() {
        let mut store = PinStore::load(storage_with(r#"{"a::x": false}"#));
        let seeds = [PinKey::from("a::x"), PinKey::from("a::y")];
        store.seed(&seeds);
        assert!(!store.is_pinned(&seeds[0]));
        assert!(store.is_pinned(&seeds[1]));
        assert_eq!(store.pinned_keys().collect::<Vec<_>>(), vec![&seeds[1]]);

        // Seeds aren't written
        let persisted = store.storage().read(PIN_STORAGE_KEY).unwrap();
        assert_eq!(persisted.as_deref(), Some(r#"{"a::x": false}"#));
    }
}
