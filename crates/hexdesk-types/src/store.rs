//! Best-effort key/value persistence for engine state.
//!
//! Each engine serializes its aggregate state as one JSON blob under a fixed
//! key. Keys embed a shape suffix (`.v2`) so that a changed layout is never
//! loaded from an old blob.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{HexError, Result};

/// Storage for opaque JSON blobs.
pub trait StateStore {
    /// Fetch the blob stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Replace the blob stored under `key`.
    fn save(&mut self, key: &str, blob: &str) -> Result<()>;

    /// Forget `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Ephemeral store used by tests and sessions without a storage directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<()> {
        self.blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.blobs.remove(key);
        Ok(())
    }
}

/// Store that keeps one `<key>.json` file per key inside a directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if necessary) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(HexError::Storage(format!("invalid key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StateStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<()> {
        let path = self.path_for(key)?;
        // Write-then-rename so a crash never leaves a truncated blob behind.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, blob)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Load and decode `key`, treating every failure as "nothing stored".
pub fn load_or_default<T: DeserializeOwned>(store: &dyn StateStore, key: &str) -> Option<T> {
    let blob = match store.load(key) {
        Ok(Some(blob)) => blob,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("failed to load {key}: {e}");
            return None;
        },
    };
    match serde_json::from_str(&blob) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("discarding unreadable state under {key}: {e}");
            None
        },
    }
}

/// Encode and store `value` under `key`, logging instead of failing.
pub fn save_best_effort<T: Serialize>(store: &mut dyn StateStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(HexError::from)
        .and_then(|blob| store.save(key, &blob));
    if let Err(e) = result {
        log::warn!("failed to persist {key}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load("k").unwrap(), None);
        store.save("k", "{}").unwrap();
        assert_eq!(store.load("k").unwrap().as_deref(), Some("{}"));
        store.remove("k").unwrap();
        assert_eq!(store.load("k").unwrap(), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = FileStore::open(dir.path()).unwrap();
            store.save("hexdesk.progress.v2", "{\"xp\":10}").unwrap();
        }
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            store.load("hexdesk.progress.v2").unwrap().as_deref(),
            Some("{\"xp\":10}")
        );
        assert!(dir.path().join("hexdesk.progress.v2.json").exists());
    }

    #[test]
    fn file_store_rejects_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        assert!(store.save("../escape", "x").is_err());
        assert!(store.save("a/b", "x").is_err());
        assert!(store.load("").is_err());
    }

    #[test]
    fn file_store_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.remove("never-written").unwrap();
    }

    #[test]
    fn corrupt_blob_loads_as_none() {
        let mut store = MemoryStore::new();
        store.save("state", "not json").unwrap();
        let loaded: Option<Vec<u32>> = load_or_default(&store, "state");
        assert!(loaded.is_none());
    }

    #[test]
    fn save_then_load_typed() {
        let mut store = MemoryStore::new();
        save_best_effort(&mut store, "nums", &vec![1u32, 2, 3]);
        let loaded: Option<Vec<u32>> = load_or_default(&store, "nums");
        assert_eq!(loaded, Some(vec![1, 2, 3]));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn file_store_roundtrips_valid_keys(
                key in "[a-z0-9][a-z0-9._-]{0,24}",
                blob in any::<String>(),
            ) {
                let dir = tempfile::tempdir().unwrap();
                let mut store = FileStore::open(dir.path()).unwrap();
                store.save(&key, &blob).unwrap();
                prop_assert_eq!(store.load(&key).unwrap(), Some(blob));
                store.remove(&key).unwrap();
                prop_assert_eq!(store.load(&key).unwrap(), None);
            }

            #[test]
            fn keys_with_separators_are_rejected(
                head in "[a-z]{0,6}",
                sep in proptest::sample::select(vec!['/', '\\', ' ', ':']),
                tail in "[a-z]{0,6}",
            ) {
                let dir = tempfile::tempdir().unwrap();
                let mut store = FileStore::open(dir.path()).unwrap();
                let key = format!("{head}{sep}{tail}");
                prop_assert!(store.save(&key, "x").is_err());
                prop_assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
            }
        }
    }
}
