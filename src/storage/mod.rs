pub mod file;
pub mod memory;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

use crate::error::OracleResult;

pub use file::FileStore;
pub use memory::MemoryStore;

pub const KEY_FAVORITES: &str = "favorites";
pub const KEY_LAST_CARD: &str = "lastCard";
pub const KEY_HISTORY: &str = "history";
pub const KEY_JOURNAL: &str = "journalEntries";

/// String values keyed by name.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> OracleResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> OracleResult<()>;
}

enum Writer {
    /// Write on the calling thread (no runtime, or after shutdown)
    Inline,
    /// Writes queue to one background task and land in order
    Queued {
        tx: mpsc::UnboundedSender<(String, String)>,
        task: JoinHandle<()>,
    },
}

/// Failure-tolerant front for a [`KeyValueStore`].
///
/// Reads that fail come back as "no data". Writes are fire-and-forget: inside
/// a tokio runtime they are handed to a single writer task, so callers never
/// wait on disk and writes to one key cannot overtake each other.
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
    writer: Writer,
}

impl Persistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let writer = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let (tx, rx) = mpsc::unbounded_channel();
                let task = handle.spawn(write_loop(store.clone(), rx));
                Writer::Queued { tx, task }
            }
            Err(_) => Writer::Inline,
        };
        Self { store, writer }
    }

    /// Persistence that always writes on the calling thread
    #[cfg(test)]
    pub fn inline(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            writer: Writer::Inline,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Reading \"{key}\" failed, treating as empty: {e}");
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: String) {
        match &self.writer {
            Writer::Queued { tx, .. } => {
                if tx.send((key.to_string(), value)).is_err() {
                    warn!("Writer task is gone; dropped write to \"{key}\"");
                }
            }
            Writer::Inline => write_now(self.store.as_ref(), key, &value),
        }
    }

    /// Wait for queued writes to land. Later writes go inline.
    pub async fn flush(&mut self) {
        let Writer::Queued { tx, task } = std::mem::replace(&mut self.writer, Writer::Inline)
        else {
            return;
        };
        drop(tx);
        if let Err(e) = task.await {
            warn!("Writer task ended abnormally: {e}");
        }
    }
}

async fn write_loop(store: Arc<dyn KeyValueStore>, mut rx: mpsc::UnboundedReceiver<(String, String)>) {
    while let Some((key, value)) = rx.recv().await {
        let store = store.clone();
        let label = key.clone();
        match tokio::task::spawn_blocking(move || write_now(store.as_ref(), &key, &value)).await {
            Ok(()) => {}
            Err(e) => warn!("Write to \"{label}\" panicked: {e}"),
        }
    }
}

fn write_now(store: &dyn KeyValueStore, key: &str, value: &str) {
    match store.set(key, value) {
        Ok(()) => trace!("Wrote \"{key}\" ({} bytes)", value.len()),
        Err(e) => warn!("Writing \"{key}\" failed, continuing without it: {e}"),
    }
}
