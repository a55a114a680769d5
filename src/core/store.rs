//! Durable local state for the refinement workflow.
//!
//! Mirrors the in-memory document and step cursor to a synchronous key-value
//! store under two fixed keys. Persistence here is best-effort: the workflow
//! must keep running when storage is degraded, so every failure is logged and
//! swallowed rather than propagated.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use super::idea::IdeaData;

/// Storage key for the serialized idea document.
pub const DATA_KEY: &str = "idea_refinement_data";
/// Storage key for the string-encoded step cursor.
pub const STEP_KEY: &str = "idea_refinement_step";

/// Errors from the underlying key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A synchronous string key-value store.
///
/// The engine only needs `get`/`set`/`remove` on two fixed keys; anything
/// from a file per key to an embedded database satisfies this.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// File-backed store: one file per key under a session directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the given directory, creating it if needed.
    pub fn new(dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::write(self.key_path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// What `load` recovered from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredState {
    /// The persisted document, or the default document when the entry is
    /// missing or corrupt.
    pub document: IdeaData,
    /// The persisted cursor index, `None` when missing, corrupt, or out of
    /// range. Cursor resolution then falls through to the next source.
    pub step: Option<usize>,
}

/// The persistent store adapter for one workflow session.
///
/// Wraps any [`StateStore`] with the soft-fail save/load/clear contract:
/// these methods never return an error, only a success boolean, and `load`
/// always yields usable state.
#[derive(Clone)]
pub struct IdeaStore {
    inner: Arc<dyn StateStore>,
    total_steps: usize,
}

impl IdeaStore {
    pub fn new(inner: Arc<dyn StateStore>, total_steps: usize) -> Self {
        Self { inner, total_steps }
    }

    /// Persist the document and cursor. Returns `false` on any failure.
    ///
    /// The document is written before the cursor, so a reader never sees a
    /// cursor value newer than its document write attempt.
    pub fn save(&self, document: &IdeaData, step: usize) -> bool {
        self.save_document(document) && self.save_step(step)
    }

    /// Persist only the document key.
    pub fn save_document(&self, document: &IdeaData) -> bool {
        let json = match serde_json::to_string(document) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize idea document");
                return false;
            }
        };
        match self.inner.set(DATA_KEY, &json) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, key = DATA_KEY, "local save failed");
                false
            }
        }
    }

    /// Persist only the cursor key.
    pub fn save_step(&self, step: usize) -> bool {
        match self.inner.set(STEP_KEY, &step.to_string()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, key = STEP_KEY, "local save failed");
                false
            }
        }
    }

    /// Read back both keys, degrading to defaults on any failure.
    pub fn load(&self) -> StoredState {
        let document = match self.inner.get(DATA_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!(error = %e, "stored idea document is corrupt, using default");
                    IdeaData::default()
                }
            },
            Ok(None) => IdeaData::default(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored idea document");
                IdeaData::default()
            }
        };

        let step = match self.inner.get(STEP_KEY) {
            Ok(Some(raw)) => raw.trim().parse::<usize>().ok().filter(|s| *s < self.total_steps),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored step cursor");
                None
            }
        };

        StoredState { document, step }
    }

    /// Remove both keys. Returns `false` on any failure.
    pub fn clear(&self) -> bool {
        let mut ok = true;
        for key in [DATA_KEY, STEP_KEY] {
            if let Err(e) = self.inner.remove(key) {
                tracing::warn!(error = %e, key, "failed to clear local state");
                ok = false;
            }
        }
        ok
    }
}

impl std::fmt::Debug for IdeaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdeaStore").field("total_steps", &self.total_steps).finish()
    }
}
