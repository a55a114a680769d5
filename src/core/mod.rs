//! Core types and functionality for Ideaflow.
//!
//! This module contains the fundamental pieces of the refinement engine:
//! the idea document, the durable store, the step machine, the workflow
//! session, and the variation merge algorithm.

mod config;
mod draft;
mod flags;
mod idea;
mod merge;
mod route;
mod session;
mod steps;
mod store;

#[cfg(feature = "ai")]
pub use config::AiConfig;
pub use config::{AutosaveConfig, Config, GeneralConfig};
pub use draft::VariationDraft;
pub use flags::{FeatureFlags, StaticFlags, ENHANCED_GENERATION};
pub use idea::{
    AiFeedback, BusinessSuggestions, IdeaData, IdeaStatus, MergedVariation, SelectedSuggestions,
    Variation, BASE_TEXT_FIELDS, MAX_VARIATIONS,
};
pub use merge::{merge_variations, MergeError};
pub use route::{format_step_query, parse_step_query, resolve_initial_step, STEP_PARAM};
pub use session::{spawn_autosave, SessionContext, WorkflowSession};
pub use steps::{RefinementStep, TOTAL_STEPS};
pub use store::{FileStore, IdeaStore, StateStore, StoreError, StoredState, DATA_KEY, STEP_KEY};
