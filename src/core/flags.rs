//! Feature-flag lookups.
//!
//! Gates whether generation calls hit the real collaborator or fall back to
//! deterministic local content. The provider is injected so product can wire
//! real flag storage without touching the engine.

use std::collections::HashMap;

/// Flag gating AI-backed idea generation.
pub const ENHANCED_GENERATION: &str = "enhanced-idea-generation";

/// Boolean flag lookup keyed by flag name, optional user id, and optional
/// context string.
pub trait FeatureFlags: Send + Sync {
    fn is_enabled(&self, flag: &str, user_id: Option<&str>, context: Option<&str>) -> bool;
}

/// Static in-process flag provider.
///
/// Default behavior: [`ENHANCED_GENERATION`] is on for everyone except the
/// legacy onboarding context; unknown flags are off. Explicit overrides win
/// over the defaults.
#[derive(Debug, Default)]
pub struct StaticFlags {
    overrides: HashMap<String, bool>,
}

impl StaticFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a flag on or off regardless of the defaults.
    pub fn with_override(mut self, flag: impl Into<String>, enabled: bool) -> Self {
        self.overrides.insert(flag.into(), enabled);
        self
    }
}

impl FeatureFlags for StaticFlags {
    fn is_enabled(&self, flag: &str, _user_id: Option<&str>, context: Option<&str>) -> bool {
        if let Some(forced) = self.overrides.get(flag) {
            return *forced;
        }
        match flag {
            ENHANCED_GENERATION => context != Some("legacy-onboarding"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhanced_generation_defaults_on() {
        let flags = StaticFlags::new();
        assert!(flags.is_enabled(ENHANCED_GENERATION, None, None));
        assert!(flags.is_enabled(ENHANCED_GENERATION, Some("user-1"), Some("wizard")));
    }

    #[test]
    fn test_legacy_onboarding_context_disables() {
        let flags = StaticFlags::new();
        assert!(!flags.is_enabled(ENHANCED_GENERATION, None, Some("legacy-onboarding")));
    }

    #[test]
    fn test_unknown_flags_default_off() {
        let flags = StaticFlags::new();
        assert!(!flags.is_enabled("mystery-flag", None, None));
    }

    #[test]
    fn test_overrides_win() {
        let flags = StaticFlags::new()
            .with_override(ENHANCED_GENERATION, false)
            .with_override("mystery-flag", true);
        assert!(!flags.is_enabled(ENHANCED_GENERATION, None, None));
        assert!(flags.is_enabled("mystery-flag", None, None));
    }
}
