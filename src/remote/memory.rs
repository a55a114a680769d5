//! In-memory backend fake.
//!
//! Used by tests and offline runs. Can emulate a schema-lagging backend via
//! a known-column set, and can be scripted to fail with specific errors.

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{BackendError, BackendErrorKind, IdeaBackend, RecordIdentity};

/// In-memory idea backend.
#[derive(Default)]
pub struct MemoryBackend {
    records: Mutex<HashMap<String, Map<String, Value>>>,
    versions: Mutex<HashMap<String, i64>>,
    /// When set, payload keys outside this set are rejected like a missing
    /// database column.
    known_columns: Option<HashSet<String>>,
    /// Scripted failures consumed one per write attempt, before any other
    /// behavior.
    scripted: Mutex<VecDeque<BackendError>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the accepted payload keys, emulating an older schema.
    pub fn with_known_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Queue failures returned by the next write attempts, in order.
    pub fn failing_with(self, errors: Vec<BackendError>) -> Self {
        *self.scripted.lock() = errors.into();
        self
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    fn check(&self, payload: &Map<String, Value>) -> Result<(), BackendError> {
        if let Some(err) = self.scripted.lock().pop_front() {
            return Err(err);
        }
        if let Some(known) = &self.known_columns {
            if let Some(unknown) = payload.keys().find(|k| !known.contains(*k)) {
                return Err(BackendError::new(
                    BackendErrorKind::UnknownColumn { column: Some(unknown.clone()) },
                    format!("Could not find the '{unknown}' column of 'ideas'"),
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl IdeaBackend for MemoryBackend {
    async fn insert(&self, payload: &Map<String, Value>) -> Result<RecordIdentity, BackendError> {
        self.check(payload)?;
        let id = Uuid::new_v4().to_string();
        self.records.lock().insert(id.clone(), payload.clone());
        self.versions.lock().insert(id.clone(), 1);
        Ok(RecordIdentity { id, version: Some(1) })
    }

    async fn update(
        &self,
        id: &str,
        payload: &Map<String, Value>,
    ) -> Result<RecordIdentity, BackendError> {
        self.check(payload)?;
        let mut records = self.records.lock();
        if !records.contains_key(id) {
            return Err(BackendError::new(
                BackendErrorKind::Other,
                format!("no record with id {id}"),
            ));
        }
        records.insert(id.to_string(), payload.clone());
        let mut versions = self.versions.lock();
        let version = versions.entry(id.to_string()).and_modify(|v| *v += 1).or_insert(1);
        Ok(RecordIdentity { id: id.to_string(), version: Some(*version) })
    }

    async fn fetch(&self, id: &str) -> Result<Option<Value>, BackendError> {
        Ok(self.records.lock().get(id).cloned().map(Value::Object))
    }
}
