//! Location representation for the workflow.
//!
//! The active route carries a `step` query parameter mirroring the cursor,
//! which makes a specific step deep-linkable. On startup the query parameter
//! wins over locally persisted state, but only when it passes the same
//! bounds check; anything else falls through the priority chain.

use super::steps::TOTAL_STEPS;

/// Query parameter key carrying the step cursor.
pub const STEP_PARAM: &str = "step";

/// Format the cursor as a query string fragment, e.g. `step=2`.
pub fn format_step_query(step: usize) -> String {
    format!("{STEP_PARAM}={step}")
}

/// Extract a valid step index from a query string.
///
/// Accepts `step=N` among `&`-separated pairs, with or without a leading
/// `?`. Non-numeric or out-of-range values are ignored.
pub fn parse_step_query(query: &str) -> Option<usize> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == STEP_PARAM)
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .filter(|step| *step < TOTAL_STEPS)
}

/// Resolve the initial cursor from its sources, in priority order:
/// query parameter, then stored cursor, then caller default, then `0`.
///
/// Every source is bounds-filtered the same way; a source that fails the
/// check falls through rather than clamping.
pub fn resolve_initial_step(
    query: Option<&str>,
    stored: Option<usize>,
    default: Option<usize>,
) -> usize {
    query
        .and_then(parse_step_query)
        .or(stored.filter(|s| *s < TOTAL_STEPS))
        .or(default.filter(|s| *s < TOTAL_STEPS))
        .unwrap_or(0)
}
