//! Session stores for tester runs: in memory, or one JSON file per key.
use geocoin_game::{KeyValueStore, MemoryStore};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{op} {path} failed: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Keys become `<dir>/<key>.json`, with anything outside `[A-Za-z0-9._-]`
/// replaced by `_`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            op: "create",
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    type Error = StoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                op: "read",
                path,
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).map_err(|source| StoreError::Io {
            op: "write",
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| StoreError::Io {
            op: "rename",
            path,
            source,
        })
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                op: "remove",
                path,
                source,
            }),
        }
    }
}

/// The store a scenario run writes to.
#[derive(Debug, Clone)]
pub enum TesterStore {
    Memory(MemoryStore),
    File(FileStore),
}

impl KeyValueStore for TesterStore {
    type Error = StoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        match self {
            Self::Memory(store) => Ok(store.raw(key)),
            Self::File(store) => store.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        match self {
            Self::Memory(store) => {
                store.insert_raw(key, value);
                Ok(())
            }
            Self::File(store) => store.set(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        match self {
            Self::Memory(store) => {
                let _ = store.remove(key);
                Ok(())
            }
            Self::File(store) => store.remove(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "geocoin-store-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn file_store_round_trip_and_remove() {
        let store = FileStore::new(scratch_dir("rt")).unwrap();
        assert_eq!(store.get("geocoin.session").unwrap(), None);
        store.set("geocoin.session", "{\"a\":1}").unwrap();
        assert_eq!(
            store.get("geocoin.session").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        store.set("geocoin.session", "{}").unwrap();
        assert_eq!(store.get("geocoin.session").unwrap().as_deref(), Some("{}"));
        store.remove("geocoin.session").unwrap();
        store.remove("geocoin.session").unwrap();
        assert_eq!(store.get("geocoin.session").unwrap(), None);
        let _ = fs::remove_dir_all(store.dir());
    }

    #[test]
    fn keys_are_sanitized_into_file_names() {
        let store = FileStore::new(scratch_dir("names")).unwrap();
        let path = store.path_for("../evil key");
        assert_eq!(path.file_name().unwrap(), ".._evil_key.json");
        assert_eq!(path.parent().unwrap(), store.dir());
        let _ = fs::remove_dir_all(store.dir());
    }

    #[test]
    fn memory_variant_shares_its_map() {
        let shared = MemoryStore::default();
        let store = TesterStore::Memory(shared.clone());
        store.set("k", "v").unwrap();
        assert_eq!(shared.raw("k").as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert!(shared.is_empty());
    }
}
