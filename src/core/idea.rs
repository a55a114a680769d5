//! The idea document and its derived sub-documents.
//!
//! `IdeaData` is the single record a refinement session works on. Fields are
//! never deleted, only reset to an empty-equivalent value, so the document can
//! always be serialized with a stable shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Lifecycle status of an idea record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaStatus {
    /// Still being refined locally.
    #[default]
    Draft,
    /// Refinement finished, not yet persisted remotely.
    Refined,
    /// Persisted to the remote backend at least once.
    Saved,
}

impl std::fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdeaStatus::Draft => write!(f, "draft"),
            IdeaStatus::Refined => write!(f, "refined"),
            IdeaStatus::Saved => write!(f, "saved"),
        }
    }
}

/// A concept variation of the idea.
///
/// Field names follow the stored wire shape (camelCase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    /// Unique id within `concept_variations`.
    pub id: String,
    pub title: String,
    pub description: String,
    pub differentiator: String,
    pub target_market: String,
    pub revenue_model: String,
    /// At most one variation in the list is selected at a time.
    #[serde(default)]
    pub is_selected: bool,
}

impl Variation {
    /// Create a new unselected variation with a fresh id.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        differentiator: impl Into<String>,
        target_market: impl Into<String>,
        revenue_model: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            differentiator: differentiator.into(),
            target_market: target_market.into(),
            revenue_model: revenue_model.into(),
            is_selected: false,
        }
    }
}

/// A variation synthesized from several selected ones.
///
/// Same shape as [`Variation`] minus identity and selection state; it is
/// implicitly "the selected concept" while present on the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedVariation {
    pub title: String,
    pub description: String,
    pub differentiator: String,
    pub target_market: String,
    pub revenue_model: String,
}

/// AI-generated SWOT-style feedback.
///
/// All seven keys are always present once feedback exists; a sequence may be
/// empty but never absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AiFeedback {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
    pub suggestions: Vec<String>,
    pub market_insights: Vec<String>,
    pub validation_tips: Vec<String>,
}

/// Categorized candidate suggestions for the business model step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BusinessSuggestions {
    pub target_audience: Vec<String>,
    pub sales_channels: Vec<String>,
    pub pricing_model: Vec<String>,
    pub customer_type: Vec<String>,
    pub integration_needs: Vec<String>,
}

/// The user's chosen subset per suggestion category.
///
/// Membership matters, order does not.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectedSuggestions {
    pub target_audience: Vec<String>,
    pub sales_channels: Vec<String>,
    pub pricing_model: Vec<String>,
    pub customer_type: Vec<String>,
    pub integration_needs: Vec<String>,
}

/// The in-progress idea document owned by a workflow session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdeaData {
    /// Remote identity, absent until the first successful remote save.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Monotonic version issued by the backend, if it issues one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,

    pub title: String,
    pub description: String,
    pub status: IdeaStatus,

    pub problem_statement: String,
    pub solution_concept: String,
    pub target_audience: String,
    pub unique_value: String,
    pub business_model: String,
    pub marketing_strategy: String,
    pub revenue_model: String,
    pub go_to_market: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_feedback: Option<AiFeedback>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_suggestions: Option<BusinessSuggestions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_suggestions: Option<SelectedSuggestions>,
    pub concept_variations: Vec<Variation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_variation: Option<Variation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_variation: Option<MergedVariation>,
}

/// Maximum number of concept variations kept on a document.
pub const MAX_VARIATIONS: usize = 5;

/// The free-text fields every backend schema version is expected to have.
pub const BASE_TEXT_FIELDS: [&str; 8] = [
    "problem_statement",
    "solution_concept",
    "target_audience",
    "unique_value",
    "business_model",
    "marketing_strategy",
    "revenue_model",
    "go_to_market",
];

impl IdeaData {
    /// Whether both required-eventually fields are filled in.
    pub fn has_basic_info(&self) -> bool {
        !self.title.trim().is_empty() && !self.description.trim().is_empty()
    }

    /// Whether a concept has been chosen, either by selection or by merge.
    pub fn has_chosen_concept(&self) -> bool {
        self.selected_variation.is_some() || self.merged_variation.is_some()
    }

    /// Replace the variation list, truncating to [`MAX_VARIATIONS`] and
    /// clearing any previous selection state.
    pub fn set_variations(&mut self, mut variations: Vec<Variation>) {
        variations.truncate(MAX_VARIATIONS);
        for v in &mut variations {
            v.is_selected = false;
        }
        self.concept_variations = variations;
        self.selected_variation = None;
        self.merged_variation = None;
    }

    /// Select the variation with the given id.
    ///
    /// Deselects every other entry and clears `merged_variation` so the
    /// selected/merged exclusivity holds. Returns `false` when the id is
    /// unknown, leaving the document untouched.
    pub fn select_variation(&mut self, id: &str) -> bool {
        if !self.concept_variations.iter().any(|v| v.id == id) {
            return false;
        }
        for v in &mut self.concept_variations {
            v.is_selected = v.id == id;
        }
        self.selected_variation =
            self.concept_variations.iter().find(|v| v.is_selected).cloned();
        self.merged_variation = None;
        true
    }

    /// Install a merged variation as the chosen concept.
    ///
    /// Clears `selected_variation` and deselects every list entry.
    pub fn set_merged_variation(&mut self, merged: MergedVariation) {
        for v in &mut self.concept_variations {
            v.is_selected = false;
        }
        self.selected_variation = None;
        self.merged_variation = Some(merged);
    }

    /// Clear any chosen concept (selection or merge).
    pub fn clear_chosen_concept(&mut self) {
        for v in &mut self.concept_variations {
            v.is_selected = false;
        }
        self.selected_variation = None;
        self.merged_variation = None;
    }

    /// Fill empty required fields with placeholder text.
    ///
    /// Used by the permissive per-step "continue" path, which accepts a
    /// title-only document and reconciles the rest before advancing.
    pub fn fill_placeholders(&mut self) {
        if self.description.trim().is_empty() {
            self.description = format!("{} (to be refined)", self.title);
        }
    }

    /// Full JSON payload for remote persistence, every present field included.
    pub fn to_payload(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut map)) => {
                // Identity travels separately (insert vs update-by-id).
                map.remove("id");
                map
            }
            _ => Map::new(),
        }
    }

    /// Payload reduced to the base fields every schema version has.
    pub fn base_payload(&self) -> Map<String, Value> {
        let full = self.to_payload();
        let mut base = Map::new();
        for key in ["title", "description", "status"] {
            if let Some(v) = full.get(key) {
                base.insert(key.to_string(), v.clone());
            }
        }
        for key in BASE_TEXT_FIELDS {
            if let Some(v) = full.get(key) {
                base.insert(key.to_string(), v.clone());
            }
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variation(title: &str) -> Variation {
        Variation::new(title, "desc", "diff", "market", "revenue")
    }

    #[test]
    fn test_default_document_is_empty() {
        let doc = IdeaData::default();
        assert!(doc.id.is_none());
        assert!(doc.title.is_empty());
        assert_eq!(doc.status, IdeaStatus::Draft);
        assert!(!doc.has_basic_info());
        assert!(!doc.has_chosen_concept());
    }

    #[test]
    fn test_select_variation_is_exclusive() {
        let mut doc = IdeaData::default();
        doc.set_variations(vec![variation("A"), variation("B"), variation("C")]);
        let id_b = doc.concept_variations[1].id.clone();

        assert!(doc.select_variation(&id_b));
        let selected: Vec<_> =
            doc.concept_variations.iter().filter(|v| v.is_selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, id_b);
        assert_eq!(doc.selected_variation.as_ref().unwrap().id, id_b);

        // Selecting another moves the single selection
        let id_a = doc.concept_variations[0].id.clone();
        assert!(doc.select_variation(&id_a));
        assert_eq!(
            doc.concept_variations.iter().filter(|v| v.is_selected).count(),
            1
        );
        assert_eq!(doc.selected_variation.as_ref().unwrap().id, id_a);
    }

    #[test]
    fn test_select_unknown_id_is_noop() {
        let mut doc = IdeaData::default();
        doc.set_variations(vec![variation("A")]);
        let before = doc.clone();
        assert!(!doc.select_variation("nope"));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_merged_and_selected_are_mutually_exclusive() {
        let mut doc = IdeaData::default();
        doc.set_variations(vec![variation("A"), variation("B")]);
        let id = doc.concept_variations[0].id.clone();
        doc.select_variation(&id);
        assert!(doc.selected_variation.is_some());

        doc.set_merged_variation(MergedVariation {
            title: "Merged: A + B".into(),
            description: "d".into(),
            differentiator: "x".into(),
            target_market: "y".into(),
            revenue_model: "z".into(),
        });
        assert!(doc.selected_variation.is_none());
        assert!(doc.merged_variation.is_some());
        assert!(doc.concept_variations.iter().all(|v| !v.is_selected));

        doc.select_variation(&id);
        assert!(doc.merged_variation.is_none());
        assert!(doc.selected_variation.is_some());
    }

    #[test]
    fn test_set_variations_truncates_to_max() {
        let mut doc = IdeaData::default();
        doc.set_variations((0..8).map(|i| variation(&format!("v{i}"))).collect());
        assert_eq!(doc.concept_variations.len(), MAX_VARIATIONS);
    }

    #[test]
    fn test_fill_placeholders() {
        let mut doc = IdeaData { title: "Pony Tutus".into(), ..Default::default() };
        doc.fill_placeholders();
        assert_eq!(doc.description, "Pony Tutus (to be refined)");

        // Existing description is left alone
        doc.description = "Tutus for ponies".into();
        doc.fill_placeholders();
        assert_eq!(doc.description, "Tutus for ponies");
    }

    #[test]
    fn test_payloads() {
        let mut doc = IdeaData {
            title: "T".into(),
            description: "D".into(),
            problem_statement: "P".into(),
            ..Default::default()
        };
        doc.ai_feedback = Some(AiFeedback::default());

        let full = doc.to_payload();
        assert!(full.contains_key("ai_feedback"));
        assert!(!full.contains_key("id"));

        let base = doc.base_payload();
        assert!(!base.contains_key("ai_feedback"));
        assert_eq!(base.get("title").unwrap(), "T");
        assert_eq!(base.get("problem_statement").unwrap(), "P");
        assert!(base.contains_key("status"));
    }

    #[test]
    fn test_document_round_trips_through_json() {
        let mut doc = IdeaData {
            title: "T".into(),
            description: "D".into(),
            ..Default::default()
        };
        doc.set_variations(vec![variation("A"), variation("B")]);
        let id = doc.concept_variations[1].id.clone();
        doc.select_variation(&id);

        let json = serde_json::to_string(&doc).unwrap();
        let back: IdeaData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_variation_wire_shape_is_camel_case() {
        let v = variation("A");
        let json = serde_json::to_value(&v).unwrap();
        assert!(json.get("targetMarket").is_some());
        assert!(json.get("revenueModel").is_some());
        assert!(json.get("isSelected").is_some());
    }
}
