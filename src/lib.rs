//! # Ideaflow
//!
//! Resumable idea-refinement workflow engine.
//!
//! Ideaflow walks a business idea through a five-step refinement wizard
//! (basic info, concept variations, business model, detailed refinement,
//! component variations) with durable local state, so a session can be
//! resumed across process restarts or deep-linked to a specific step.
//!
//! ## Features
//!
//! - **Resumable sessions**: document and step cursor mirrored to local
//!   storage on every mutation and navigation
//! - **Step machine**: bounds-checked, precondition-guarded `+1`/`-1`
//!   transitions over a closed step enum
//! - **Variation merge**: deterministic synthesis of one concept from 2-5
//!   selected variations
//! - **AI generation with fallback**: feedback, variations, and suggestions
//!   from a remote generator, degrading to deterministic local content
//! - **Compatibility-ladder saves**: remote persistence retries with
//!   decreasing field-completeness against schema-lagging backends
//!
//! ## Quick Start
//!
//! ```bash
//! # Install
//! cargo install ideaflow
//!
//! # Start refining
//! idf set title "Pony Tutus"
//! idf set description "Tutus for ponies"
//! idf advance
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::redundant_clone)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::use_self)]

pub mod ai;
pub mod core;
pub mod remote;

pub use ai::{GenerateError, Generated, GeneratorManager, IdeaGenerator, MockGenerator};
#[cfg(feature = "ai")]
pub use ai::HttpGenerator;
pub use core::{
    merge_variations, spawn_autosave, AiFeedback, BusinessSuggestions, Config, FeatureFlags,
    FileStore, IdeaData, IdeaStore, IdeaStatus, MergeError, MergedVariation, RefinementStep,
    SelectedSuggestions, SessionContext, StateStore, StaticFlags, StoreError, Variation,
    VariationDraft, WorkflowSession, TOTAL_STEPS,
};
pub use remote::{
    classify_message, save_with_ladder, user_message, BackendError, BackendErrorKind,
    FileBackend, IdeaBackend, LadderOutcome, MemoryBackend, RecordIdentity, SaveFailure,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "ideaflow";

/// Short alias
pub const APP_ALIAS: &str = "idf";
