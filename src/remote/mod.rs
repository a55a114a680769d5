//! Remote persistence boundary.
//!
//! The backend schema and the client document evolve independently, so saves
//! run through a compatibility ladder with decreasing field-completeness:
//! full document, then the document minus the column the backend rejected,
//! then only the base fields every schema version has. The ladder is a shim,
//! not a transaction; every write is a full-record overwrite.
//!
//! Backends report structured error kinds. For backends that only surface
//! error text, [`classify_message`] maps message substrings to a kind once,
//! at the boundary; everything downstream switches on the kind.

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::core::IdeaData;

/// Classified remote persistence failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Unique constraint hit, in practice the idea title.
    DuplicateTitle,
    /// Relationship constraint failed (e.g. unknown owning user).
    ForeignKey,
    /// The caller is not allowed to write this record.
    PermissionDenied,
    /// The backend schema lacks a column the payload carries.
    UnknownColumn {
        /// The offending column, when the backend names it.
        column: Option<String>,
    },
    /// Anything else.
    Other,
}

/// Error returned by an [`IdeaBackend`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    /// Build an error from raw backend text, classifying it by substring.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self { kind: classify_message(&message), message }
    }
}

/// Map raw backend error text to a structured kind.
pub fn classify_message(message: &str) -> BackendErrorKind {
    let lower = message.to_lowercase();
    if lower.contains("duplicate key") || lower.contains("already exists") {
        return BackendErrorKind::DuplicateTitle;
    }
    if lower.contains("foreign key") {
        return BackendErrorKind::ForeignKey;
    }
    if lower.contains("permission denied") || lower.contains("row-level security") {
        return BackendErrorKind::PermissionDenied;
    }
    if lower.contains("unknown column")
        || (lower.contains("column") && lower.contains("does not exist"))
        || (lower.contains("could not find") && lower.contains("column"))
    {
        return BackendErrorKind::UnknownColumn { column: quoted_token(message) };
    }
    BackendErrorKind::Other
}

/// First single-quoted token in a message, used to pull a column name out of
/// backend error text.
fn quoted_token(message: &str) -> Option<String> {
    let start = message.find('\'')?;
    let rest = &message[start + 1..];
    let end = rest.find('\'')?;
    let token = &rest[..end];
    (!token.is_empty()).then(|| token.to_string())
}

/// Identity issued by the backend on a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordIdentity {
    pub id: String,
    /// Monotonic version, when the backend issues one.
    pub version: Option<i64>,
}

/// Asynchronous record persistence for idea documents.
#[async_trait]
pub trait IdeaBackend: Send + Sync {
    /// Insert a new record, returning its identity.
    async fn insert(&self, payload: &Map<String, Value>) -> Result<RecordIdentity, BackendError>;

    /// Overwrite an existing record by id.
    async fn update(
        &self,
        id: &str,
        payload: &Map<String, Value>,
    ) -> Result<RecordIdentity, BackendError>;

    /// Fetch a record by id, `None` when absent.
    async fn fetch(&self, id: &str) -> Result<Option<Value>, BackendError>;
}

/// A successful ladder run.
#[derive(Debug, Clone)]
pub struct LadderOutcome {
    pub identity: RecordIdentity,
    /// Attempts made, 1-3.
    pub attempts: u32,
    /// Whether the record was saved with reduced detail.
    pub degraded: bool,
}

/// A ladder run that exhausted all rungs.
#[derive(Debug, Clone, thiserror::Error)]
#[error("remote save failed after {attempts} attempt(s): {message}")]
pub struct SaveFailure {
    pub kind: BackendErrorKind,
    pub message: String,
    pub attempts: u32,
}

async fn persist(
    backend: &dyn IdeaBackend,
    id: Option<&str>,
    payload: &Map<String, Value>,
) -> Result<RecordIdentity, BackendError> {
    match id {
        Some(id) => backend.update(id, payload).await,
        None => backend.insert(payload).await,
    }
}

/// Persist a document with the three-rung compatibility ladder.
///
/// Uses insert or update-by-id depending on whether the document already has
/// a remote identity. The caller's document is never mutated here; merging
/// the returned identity is the session's job.
pub async fn save_with_ladder(
    backend: &dyn IdeaBackend,
    document: &IdeaData,
) -> Result<LadderOutcome, SaveFailure> {
    let id = document.id.as_deref();
    let full = document.to_payload();

    let first_error = match persist(backend, id, &full).await {
        Ok(identity) => return Ok(LadderOutcome { identity, attempts: 1, degraded: false }),
        Err(e) => e,
    };

    // Only a missing-column failure justifies retrying with fewer fields;
    // anything else would fail identically.
    let BackendErrorKind::UnknownColumn { column } = &first_error.kind else {
        return Err(SaveFailure {
            kind: first_error.kind,
            message: first_error.message,
            attempts: 1,
        });
    };

    let mut attempts = 1;
    if let Some(column) = column {
        tracing::warn!(column, "backend rejected a column, retrying without it");
        let mut stripped = full.clone();
        stripped.remove(column);
        attempts += 1;
        match persist(backend, id, &stripped).await {
            Ok(identity) => return Ok(LadderOutcome { identity, attempts, degraded: true }),
            Err(e) => {
                tracing::warn!(error = %e, "stripped-column save failed, falling back to base fields");
            }
        }
    }

    attempts += 1;
    let base = document.base_payload();
    match persist(backend, id, &base).await {
        Ok(identity) => Ok(LadderOutcome { identity, attempts, degraded: true }),
        Err(e) => Err(SaveFailure { kind: e.kind, message: e.message, attempts }),
    }
}

/// User-facing message for a classified failure.
///
/// After repeated failures the raw technical detail is appended to aid
/// support diagnosis.
pub fn user_message(kind: &BackendErrorKind, failures: u32, technical: &str) -> String {
    let base = match kind {
        BackendErrorKind::DuplicateTitle => {
            "An idea with this title already exists. Please choose a different title."
        }
        BackendErrorKind::ForeignKey => {
            "Your idea could not be linked to your account. Please sign in again and retry."
        }
        BackendErrorKind::PermissionDenied => {
            "You don't have permission to save this idea. Please sign in and try again."
        }
        BackendErrorKind::UnknownColumn { .. } => {
            "The server is missing support for part of this idea. Please try again later."
        }
        BackendErrorKind::Other => {
            "Something went wrong while saving your idea. Your work is kept locally."
        }
    };
    if failures >= 3 {
        format!("{base} (technical detail: {technical})")
    } else {
        base.to_string()
    }
}
