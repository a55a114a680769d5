//! The refinement step machine.
//!
//! Steps are a closed enum rather than free-form string keys so illegal
//! states are unrepresentable and the transition table is exhaustiveness-
//! checked by the compiler. Transitions are strictly `+1`/`-1`; there is no
//! skipping and no terminal state beyond the last step.

use serde::{Deserialize, Serialize};

use super::idea::IdeaData;

/// Number of steps in the refinement workflow.
pub const TOTAL_STEPS: usize = 5;

/// One step of the idea-refinement wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementStep {
    BasicInfo,
    ConceptVariations,
    BusinessModel,
    DetailedRefinement,
    ComponentVariations,
}

impl std::fmt::Display for RefinementStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefinementStep::BasicInfo => write!(f, "Basic Info"),
            RefinementStep::ConceptVariations => write!(f, "Concept Variations"),
            RefinementStep::BusinessModel => write!(f, "Business Model"),
            RefinementStep::DetailedRefinement => write!(f, "Detailed Refinement"),
            RefinementStep::ComponentVariations => write!(f, "Component Variations"),
        }
    }
}

impl RefinementStep {
    /// All steps in workflow order.
    pub const ALL: [RefinementStep; TOTAL_STEPS] = [
        RefinementStep::BasicInfo,
        RefinementStep::ConceptVariations,
        RefinementStep::BusinessModel,
        RefinementStep::DetailedRefinement,
        RefinementStep::ComponentVariations,
    ];

    /// Zero-based position of this step.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    /// Step at the given index, `None` when out of bounds.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The next step, `None` at the last step.
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// The previous step, `None` at the first step.
    pub fn prev(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn is_first(self) -> bool {
        self == RefinementStep::BasicInfo
    }

    pub fn is_last(self) -> bool {
        self == RefinementStep::ComponentVariations
    }

    /// Generic precondition for advancing past this step.
    ///
    /// Steps without a declared precondition default to passable.
    pub fn can_advance(self, document: &IdeaData) -> bool {
        match self {
            RefinementStep::BasicInfo => document.has_basic_info(),
            RefinementStep::ConceptVariations => document.has_chosen_concept(),
            RefinementStep::BusinessModel
            | RefinementStep::DetailedRefinement
            | RefinementStep::ComponentVariations => true,
        }
    }

    /// The more permissive, component-local "continue" precondition.
    ///
    /// A step component may accept less than the generic rule requires and
    /// reconcile the gap itself (see [`IdeaData::fill_placeholders`]).
    pub fn can_continue(self, document: &IdeaData) -> bool {
        match self {
            RefinementStep::BasicInfo => !document.title.trim().is_empty(),
            other => other.can_advance(document),
        }
    }

    /// The message shown when advancing is blocked at this step.
    pub fn blocked_message(self) -> &'static str {
        match self {
            RefinementStep::BasicInfo => {
                "Please provide a title and description before continuing"
            }
            RefinementStep::ConceptVariations => {
                "Please select or merge a concept variation before continuing"
            }
            _ => "This step is not complete yet",
        }
    }
}
