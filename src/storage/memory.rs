use std::collections::HashMap;
use std::sync::Mutex;

use super::KeyValueStore;
use crate::error::{OracleError, OracleResult};

/// Process-local store, used when no data directory is usable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> OracleResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| OracleError::Storage("memory store poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> OracleResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| OracleError::Storage("memory store poisoned".into()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
