//! File-backed idea backend.
//!
//! Stand-in for a real remote service: keeps all records in one JSON file so
//! CLI invocations see each other's writes. Error text follows the same
//! classification rules as any other backend.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{BackendError, BackendErrorKind, IdeaBackend, RecordIdentity};

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecordFile {
    records: HashMap<String, StoredRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    fields: Map<String, Value>,
}

/// Idea backend persisting records to a single JSON file.
pub struct FileBackend {
    path: PathBuf,
    // File writes are whole-file rewrites; serialize them.
    lock: Mutex<()>,
}

impl FileBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path, lock: Mutex::new(()) }
    }

    fn read(&self) -> Result<RecordFile, BackendError> {
        if !self.path.exists() {
            return Ok(RecordFile::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| BackendError::new(BackendErrorKind::Other, e.to_string()))?;
        serde_json::from_str(&content)
            .map_err(|e| BackendError::new(BackendErrorKind::Other, e.to_string()))
    }

    fn write(&self, file: &RecordFile) -> Result<(), BackendError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| BackendError::new(BackendErrorKind::Other, e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(file)
            .map_err(|e| BackendError::new(BackendErrorKind::Other, e.to_string()))?;
        std::fs::write(&self.path, content)
            .map_err(|e| BackendError::new(BackendErrorKind::Other, e.to_string()))
    }

    fn title_of(payload: &Map<String, Value>) -> Option<&str> {
        payload.get("title").and_then(Value::as_str)
    }
}

#[async_trait]
impl IdeaBackend for FileBackend {
    async fn insert(&self, payload: &Map<String, Value>) -> Result<RecordIdentity, BackendError> {
        let _guard = self.lock.lock();
        let mut file = self.read()?;

        if let Some(title) = Self::title_of(payload) {
            let duplicate = file.records.values().any(|r| r.title() == Some(title));
            if duplicate {
                return Err(BackendError::new(
                    BackendErrorKind::DuplicateTitle,
                    format!("an idea titled '{title}' already exists"),
                ));
            }
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        file.records.insert(
            id.clone(),
            StoredRecord { version: 1, created_at: now, updated_at: now, fields: payload.clone() },
        );
        self.write(&file)?;
        Ok(RecordIdentity { id, version: Some(1) })
    }

    async fn update(
        &self,
        id: &str,
        payload: &Map<String, Value>,
    ) -> Result<RecordIdentity, BackendError> {
        let _guard = self.lock.lock();
        let mut file = self.read()?;
        let Some(record) = file.records.get_mut(id) else {
            return Err(BackendError::new(
                BackendErrorKind::Other,
                format!("no record with id {id}"),
            ));
        };
        record.version += 1;
        record.updated_at = Utc::now();
        record.fields = payload.clone();
        let version = record.version;
        self.write(&file)?;
        Ok(RecordIdentity { id: id.to_string(), version: Some(version) })
    }

    async fn fetch(&self, id: &str) -> Result<Option<Value>, BackendError> {
        let _guard = self.lock.lock();
        let file = self.read()?;
        Ok(file.records.get(id).map(|r| Value::Object(r.fields.clone())))
    }
}

impl StoredRecord {
    fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(Value::as_str)
    }
}
