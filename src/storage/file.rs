use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use super::KeyValueStore;
use crate::error::{OracleError, OracleResult};

/// One JSON file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> OracleResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        debug!("File store at {}", dir.display());
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> OracleResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(OracleError::Storage(format!("invalid key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> OracleResult<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)?) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write through a temp file and rename, so a crash mid-write never
    /// leaves a truncated value behind.
    fn set(&self, key: &str, value: &str) -> OracleResult<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("history").unwrap(), None);
    }

    #[test]
    fn set_then_get_round_trips_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();
        store.set("favorites", r#"{"tide":true}"#).unwrap();
        store.set("favorites", r#"{"tide":false}"#).unwrap();
        assert_eq!(
            store.get("favorites").unwrap().as_deref(),
            Some(r#"{"tide":false}"#)
        );
        assert!(!dir.path().join("nested/favorites.json.tmp").exists());
    }

    #[test]
    fn path_traversal_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("").is_err());
    }
}
