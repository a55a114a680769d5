//! Two-phase editing of a variation card.
//!
//! Edits accumulate in a local draft and reach the shared document only on
//! an explicit commit, so "nothing is written until commit" is enforced by
//! ownership rather than convention.

use super::idea::{IdeaData, Variation};

/// A local edit buffer for one variation.
#[derive(Debug, Clone)]
pub struct VariationDraft {
    target_id: String,
    pub title: String,
    pub description: String,
    pub differentiator: String,
    pub target_market: String,
    pub revenue_model: String,
}

impl VariationDraft {
    /// Begin editing a copy of the given variation.
    pub fn begin(variation: &Variation) -> Self {
        Self {
            target_id: variation.id.clone(),
            title: variation.title.clone(),
            description: variation.description.clone(),
            differentiator: variation.differentiator.clone(),
            target_market: variation.target_market.clone(),
            revenue_model: variation.revenue_model.clone(),
        }
    }

    /// Id of the variation this draft targets.
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Write the draft back into the document, consuming the draft.
    ///
    /// Returns `false` when the target variation no longer exists (e.g. the
    /// list was regenerated since the draft began); the document is then
    /// untouched. When the target is the selected variation, the selection
    /// mirror is refreshed too.
    pub fn commit(self, document: &mut IdeaData) -> bool {
        let Some(entry) =
            document.concept_variations.iter_mut().find(|v| v.id == self.target_id)
        else {
            return false;
        };
        entry.title = self.title;
        entry.description = self.description;
        entry.differentiator = self.differentiator;
        entry.target_market = self.target_market;
        entry.revenue_model = self.revenue_model;

        if entry.is_selected {
            document.selected_variation =
                document.concept_variations.iter().find(|v| v.id == self.target_id).cloned();
        }
        true
    }
}
