//! The workflow session: single source of truth for the refinement wizard.
//!
//! Owns the idea document, the step cursor, and the transient UI flags, and
//! keeps the local store and the location mirror eventually consistent with
//! in-memory state. Step components never hold independent copies; all reads
//! and writes go through this container.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::ai::GeneratorManager;
use crate::remote::{self, IdeaBackend};

use super::idea::{IdeaData, IdeaStatus};
use super::route;
use super::steps::{RefinementStep, TOTAL_STEPS};
use super::store::IdeaStore;

/// The current user/session reference, injected rather than read from a
/// process-wide singleton so tests can supply fakes.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub user_id: Option<String>,
    /// Free-form context string forwarded to feature-flag lookups.
    pub context: Option<String>,
}

impl SessionContext {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self { user_id: Some(user_id.into()), context: None }
    }
}

/// Workflow state container for one refinement session.
pub struct WorkflowSession {
    ctx: SessionContext,
    store: IdeaStore,
    document: IdeaData,
    cursor: RefinementStep,
    /// Mirror of the location query parameter, always `step=N` for the
    /// current cursor.
    location: String,

    is_loading: bool,
    error: Option<String>,
    success: Option<String>,

    /// Consecutive failed remote save attempts, used to escalate the
    /// user-facing message with technical detail.
    remote_failures: u32,
}

impl WorkflowSession {
    /// Create a session, resolving initial state from the store and the
    /// optional location query string.
    ///
    /// Cursor priority: query parameter, then stored cursor, then
    /// `default_step`, then 0. The document always comes from the store
    /// (or its default).
    pub fn new(
        ctx: SessionContext,
        store: IdeaStore,
        query: Option<&str>,
        default_step: Option<usize>,
    ) -> Self {
        let stored = store.load();
        let index = route::resolve_initial_step(query, stored.step, default_step);
        let cursor = RefinementStep::from_index(index).unwrap_or(RefinementStep::BasicInfo);
        tracing::debug!(step = %cursor, "workflow session started");
        Self {
            ctx,
            store,
            document: stored.document,
            cursor,
            location: route::format_step_query(index),
            is_loading: false,
            error: None,
            success: None,
            remote_failures: 0,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    // --- Document ---

    pub fn document(&self) -> &IdeaData {
        &self.document
    }

    /// Apply a pure in-memory transform to the document, then sync to the
    /// local store. The cursor is not affected.
    pub fn mutate_document(&mut self, updater: impl FnOnce(&mut IdeaData)) {
        updater(&mut self.document);
        self.save_to_local_storage();
    }

    // --- Cursor & navigation ---

    pub fn cursor(&self) -> RefinementStep {
        self.cursor
    }

    pub fn cursor_index(&self) -> usize {
        self.cursor.index()
    }

    /// Mirror of the `step` location query parameter.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Move the cursor to an arbitrary step index.
    ///
    /// Out-of-range values are rejected with a log and no state change.
    /// On acceptance the document is persisted before the cursor, then the
    /// location mirror is updated, so a reader of the location never sees a
    /// cursor whose document was not at least attempted to be persisted.
    pub fn set_cursor(&mut self, step: usize) -> bool {
        let Some(next) = RefinementStep::from_index(step) else {
            tracing::warn!(step, total = TOTAL_STEPS, "rejected out-of-range step cursor");
            return false;
        };
        self.store.save_document(&self.document);
        self.cursor = next;
        self.store.save_step(step);
        self.location = route::format_step_query(step);
        tracing::debug!(step = %next, "cursor moved");
        true
    }

    /// Advance one step, if the current step's precondition passes.
    ///
    /// No-op at the terminal step. A forced call with an unsatisfied
    /// precondition leaves the cursor unchanged and sets the inline error.
    pub fn advance(&mut self) -> bool {
        let Some(next) = self.cursor.next() else {
            return false;
        };
        if !self.cursor.can_advance(&self.document) {
            self.set_error(self.cursor.blocked_message());
            return false;
        }
        self.save_to_local_storage();
        self.set_cursor(next.index())
    }

    /// Go back one step. No-op at the first step.
    pub fn retreat(&mut self) -> bool {
        let Some(prev) = self.cursor.prev() else {
            return false;
        };
        self.save_to_local_storage();
        self.set_cursor(prev.index())
    }

    /// Component-local "continue": a more permissive precondition plus
    /// field reconciliation before delegating to the cursor setter.
    pub fn try_continue(&mut self) -> Result<(), String> {
        if !self.cursor.can_continue(&self.document) {
            let msg = self.cursor.blocked_message().to_string();
            self.set_error(msg.clone());
            return Err(msg);
        }
        if self.cursor.is_last() {
            return Ok(());
        }
        self.mutate_document(IdeaData::fill_placeholders);
        self.save_to_local_storage();
        let next = self.cursor.next().map(RefinementStep::index).unwrap_or(0);
        self.set_cursor(next);
        Ok(())
    }

    // --- Local durability ---

    /// Explicit synchronous flush of document + cursor to the local store.
    ///
    /// Used as a safety net before risky operations; failures are already
    /// logged by the store and only reported as a boolean.
    pub fn save_to_local_storage(&self) -> bool {
        self.store.save(&self.document, self.cursor.index())
    }

    /// Wipe local durability state. In-memory state and any remote record
    /// are unaffected.
    pub fn clear_local_storage(&self) -> bool {
        self.store.clear()
    }

    // --- Transient flags ---

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Set the inline error banner; clears any success banner.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.success = None;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    /// Set the success banner; clears any error banner.
    pub fn set_success(&mut self, message: impl Into<String>) {
        self.success = Some(message.into());
        self.error = None;
    }

    pub fn clear_success(&mut self) {
        self.success = None;
    }

    // --- Generation ---

    /// Generate AI feedback for the current document.
    ///
    /// Never fails: generator errors fall back to deterministic local
    /// content and soften the success message instead.
    pub async fn generate_feedback(&mut self, generator: &GeneratorManager) {
        self.is_loading = true;
        let generated = generator.feedback(&self.ctx, &self.document).await;
        let used_fallback = generated.used_fallback;
        self.mutate_document(|doc| doc.ai_feedback = Some(generated.value));
        self.is_loading = false;
        self.set_success(softened("Feedback generated", used_fallback));
    }

    /// Generate concept variations, replacing the current list.
    pub async fn generate_variations(&mut self, generator: &GeneratorManager) {
        self.is_loading = true;
        let generated = generator.variations(&self.ctx, &self.document).await;
        let used_fallback = generated.used_fallback;
        self.mutate_document(|doc| doc.set_variations(generated.value));
        self.is_loading = false;
        self.set_success(softened("Variations generated", used_fallback));
    }

    /// Generate business-model suggestions.
    pub async fn generate_suggestions(&mut self, generator: &GeneratorManager) {
        self.is_loading = true;
        let generated = generator.suggestions(&self.ctx, &self.document).await;
        let used_fallback = generated.used_fallback;
        self.mutate_document(|doc| doc.business_suggestions = Some(generated.value));
        self.is_loading = false;
        self.set_success(softened("Suggestions generated", used_fallback));
    }

    // --- Remote persistence ---

    /// Persist the document remotely via the retry ladder.
    ///
    /// The document is flushed locally first, so a remote failure never
    /// loses data. On success the returned identity is merged into the
    /// document; on failure the classified user message lands in the error
    /// banner and the document keeps its in-memory and local state.
    pub async fn save_remote(&mut self, backend: &dyn IdeaBackend) -> bool {
        self.save_to_local_storage();
        self.is_loading = true;
        let result = remote::save_with_ladder(backend, &self.document).await;
        self.is_loading = false;
        match result {
            Ok(outcome) => {
                self.remote_failures = 0;
                self.mutate_document(|doc| {
                    doc.id = Some(outcome.identity.id);
                    doc.version = outcome.identity.version;
                    doc.status = IdeaStatus::Saved;
                });
                self.set_success(softened("Idea saved", outcome.degraded));
                true
            }
            Err(failure) => {
                self.remote_failures += 1;
                let message =
                    remote::user_message(&failure.kind, self.remote_failures, &failure.message);
                self.set_error(message);
                false
            }
        }
    }
}

fn softened(base: &str, used_fallback: bool) -> String {
    if used_fallback {
        format!("{base} using fallback data")
    } else {
        base.to_string()
    }
}

/// Spawn the background autosave ticker.
///
/// Independent of and in addition to the per-mutation and per-navigation
/// syncs; writes are idempotent full-document overwrites, so last writer
/// wins without coalescing.
pub fn spawn_autosave(
    session: Arc<Mutex<WorkflowSession>>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            // Skip the tick when an operation currently holds the session;
            // its own save-on-mutate covers that window.
            let Some(session) = session.try_lock() else {
                continue;
            };
            let saved = session.save_to_local_storage();
            tracing::debug!(saved, "autosave tick");
        }
    })
}
