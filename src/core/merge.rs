//! Deterministic merge of concept variations.
//!
//! Synthesizes one [`MergedVariation`] from 2-5 selected variations with
//! pure string transformations. No randomness, no timestamps, no I/O: the
//! same ordered input always produces byte-identical output.

use super::idea::{MergedVariation, Variation, MAX_VARIATIONS};

/// Arity violations when merging.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("Please select at least two variations to merge")]
    TooFew,

    #[error("You can select a maximum of 5 variations to merge")]
    TooMany,
}

/// Leading determiners dropped when folding descriptions into one sentence.
const DETERMINERS: [&str; 5] = ["a", "an", "the", "this", "that"];

/// Merge 2-5 variations into a single synthesized one.
pub fn merge_variations(inputs: &[Variation]) -> Result<MergedVariation, MergeError> {
    if inputs.len() < 2 {
        return Err(MergeError::TooFew);
    }
    if inputs.len() > MAX_VARIATIONS {
        return Err(MergeError::TooMany);
    }

    let title = format!(
        "Merged: {}",
        inputs.iter().map(|v| first_token(&v.title)).collect::<Vec<_>>().join(" + ")
    );

    let description = inputs
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let body = strip_determiner(&v.description.to_lowercase());
            if i == 0 {
                format!("incorporates {body}")
            } else {
                format!("with {body}")
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let differentiator = format!(
        "Unique combination of {}",
        inputs
            .iter()
            .map(|v| normalize_clause(&v.differentiator))
            .collect::<Vec<_>>()
            .join(" and ")
    );

    let target_market = inputs
        .iter()
        .map(|v| normalize_clause(&v.target_market))
        .collect::<Vec<_>>()
        .join(", serving both ");

    let revenue_model = format!(
        "Multi-faceted approach using {}",
        inputs
            .iter()
            .map(|v| normalize_clause(&v.revenue_model))
            .collect::<Vec<_>>()
            .join(" combined with ")
    );

    Ok(MergedVariation { title, description, differentiator, target_market, revenue_model })
}

/// First whitespace-delimited token, or the whole string when single-token.
fn first_token(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or(s)
}

/// Lowercase and strip a trailing period.
fn normalize_clause(s: &str) -> String {
    s.to_lowercase().trim_end_matches('.').to_string()
}

/// Strip one leading determiner token, if present.
fn strip_determiner(s: &str) -> String {
    let trimmed = s.trim_start();
    for det in DETERMINERS {
        if let Some(rest) = trimmed.strip_prefix(det) {
            if let Some(rest) = rest.strip_prefix(' ') {
                return rest.to_string();
            }
        }
    }
    trimmed.to_string()
}
