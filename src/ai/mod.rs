//! AI-assisted idea generation.
//!
//! Provides feedback, concept variations, and business-model suggestions for
//! an in-progress idea. A real generator is optional: every call can fall
//! back to deterministic local content, so the workflow never stalls on a
//! generation failure. The enhanced-generation feature flag decides whether
//! the real collaborator is consulted at all.

#[cfg(feature = "ai")]
mod http;

#[cfg(feature = "ai")]
pub use http::HttpGenerator;

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{
    AiFeedback, BusinessSuggestions, FeatureFlags, IdeaData, SessionContext, Variation,
    ENHANCED_GENERATION,
};

/// Generation error types.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Generator not available: {0}")]
    Unavailable(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("No response from generator")]
    NoResponse,
}

/// Trait for idea generators.
#[async_trait]
pub trait IdeaGenerator: Send + Sync {
    /// Generate SWOT-style feedback for the idea.
    async fn feedback(&self, idea: &IdeaData) -> Result<AiFeedback, GenerateError>;

    /// Generate up to five concept variations.
    async fn variations(&self, idea: &IdeaData) -> Result<Vec<Variation>, GenerateError>;

    /// Generate categorized business-model suggestions.
    async fn suggestions(&self, idea: &IdeaData) -> Result<BusinessSuggestions, GenerateError>;

    /// Free-text refinement of a prompt against the idea.
    async fn refine(&self, idea: &IdeaData, prompt: &str) -> Result<String, GenerateError>;

    /// Get the generator name.
    fn name(&self) -> &str;
}

/// A generation result noting whether fallback content was used.
#[derive(Debug, Clone)]
pub struct Generated<T> {
    pub value: T,
    pub used_fallback: bool,
}

/// Deterministic local generator.
///
/// Produces plausible content from the idea's own fields, with no
/// randomness or I/O. Doubles as the fallback for every real generator.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator;

impl MockGenerator {
    pub fn new() -> Self {
        Self
    }

    fn subject(idea: &IdeaData) -> String {
        let title = idea.title.trim();
        if title.is_empty() {
            "your idea".to_string()
        } else {
            title.to_string()
        }
    }
}

#[async_trait]
impl IdeaGenerator for MockGenerator {
    async fn feedback(&self, idea: &IdeaData) -> Result<AiFeedback, GenerateError> {
        let subject = Self::subject(idea);
        Ok(AiFeedback {
            strengths: vec![
                format!("{subject} addresses a clearly stated problem"),
                "The concept is simple enough to explain in one sentence".to_string(),
            ],
            weaknesses: vec![
                "The target audience is still broad".to_string(),
                "Revenue assumptions are untested".to_string(),
            ],
            opportunities: vec![
                format!("Early adopters of {subject} can seed word-of-mouth growth"),
                "Adjacent niches may be reachable with minor changes".to_string(),
            ],
            threats: vec![
                "Established competitors can copy surface features quickly".to_string(),
            ],
            suggestions: vec![
                "Interview five potential customers before building".to_string(),
                "Narrow the first release to a single audience segment".to_string(),
            ],
            market_insights: vec![
                "Niche-first entries outperform broad launches for new brands".to_string(),
            ],
            validation_tips: vec![
                "Run a landing-page test to measure real interest".to_string(),
            ],
        })
    }

    async fn variations(&self, idea: &IdeaData) -> Result<Vec<Variation>, GenerateError> {
        let subject = Self::subject(idea);
        Ok(vec![
            Variation::new(
                format!("{subject} Premium"),
                format!("A high-touch edition of {subject} for customers who pay for quality."),
                "Premium materials and concierge onboarding.",
                "Affluent early adopters.",
                "Annual subscriptions.",
            ),
            Variation::new(
                format!("{subject} Community"),
                format!("A community-driven take on {subject} that grows through its users."),
                "Network effects from user contributions.",
                "Hobbyists and enthusiasts.",
                "Freemium with paid upgrades.",
            ),
            Variation::new(
                format!("{subject} Enterprise"),
                format!("The business-focused version of {subject} sold to teams."),
                "Compliance and admin controls.",
                "Small and mid-sized businesses.",
                "Per-seat licensing.",
            ),
        ])
    }

    async fn suggestions(&self, idea: &IdeaData) -> Result<BusinessSuggestions, GenerateError> {
        let _ = idea;
        Ok(BusinessSuggestions {
            target_audience: vec![
                "Early adopters".to_string(),
                "Small business owners".to_string(),
                "Hobbyists".to_string(),
            ],
            sales_channels: vec![
                "Direct online sales".to_string(),
                "Marketplaces".to_string(),
                "Partnerships".to_string(),
            ],
            pricing_model: vec![
                "Subscription".to_string(),
                "One-time purchase".to_string(),
                "Freemium".to_string(),
            ],
            customer_type: vec!["B2C".to_string(), "B2B".to_string()],
            integration_needs: vec![
                "Payment processing".to_string(),
                "Email marketing".to_string(),
            ],
        })
    }

    async fn refine(&self, idea: &IdeaData, prompt: &str) -> Result<String, GenerateError> {
        let subject = Self::subject(idea);
        Ok(format!(
            "Considering {subject}: {prompt}. Focus on the narrowest audience that \
             feels the problem most acutely, and validate with real conversations \
             before expanding."
        ))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Generator manager with fallback support.
///
/// Consults the enhanced-generation flag, tries the primary generator when
/// allowed, and falls back to [`MockGenerator`] on any failure. Calls never
/// fail; the result only notes whether fallback content was used.
pub struct GeneratorManager {
    primary: Option<Box<dyn IdeaGenerator>>,
    fallback: MockGenerator,
    flags: Arc<dyn FeatureFlags>,
}

impl GeneratorManager {
    pub fn new(primary: Option<Box<dyn IdeaGenerator>>, flags: Arc<dyn FeatureFlags>) -> Self {
        Self { primary, fallback: MockGenerator::new(), flags }
    }

    /// A manager with no real generator; everything comes from the mock.
    pub fn mock_only(flags: Arc<dyn FeatureFlags>) -> Self {
        Self::new(None, flags)
    }

    /// The active primary generator name, if one is configured.
    pub fn active_generator(&self) -> Option<&str> {
        self.primary.as_deref().map(|g| g.name())
    }

    fn primary_if_allowed(&self, ctx: &SessionContext) -> Option<&dyn IdeaGenerator> {
        let primary = self.primary.as_deref()?;
        self.flags
            .is_enabled(ENHANCED_GENERATION, ctx.user_id.as_deref(), ctx.context.as_deref())
            .then_some(primary)
    }

    pub async fn feedback(&self, ctx: &SessionContext, idea: &IdeaData) -> Generated<AiFeedback> {
        if let Some(primary) = self.primary_if_allowed(ctx) {
            match primary.feedback(idea).await {
                Ok(value) => return Generated { value, used_fallback: false },
                Err(e) => {
                    tracing::warn!(generator = primary.name(), error = %e, "feedback generation failed, using fallback");
                }
            }
        }
        let value = self.fallback.feedback(idea).await.unwrap_or_default();
        Generated { value, used_fallback: self.primary.is_some() }
    }

    pub async fn variations(
        &self,
        ctx: &SessionContext,
        idea: &IdeaData,
    ) -> Generated<Vec<Variation>> {
        if let Some(primary) = self.primary_if_allowed(ctx) {
            match primary.variations(idea).await {
                Ok(value) => return Generated { value, used_fallback: false },
                Err(e) => {
                    tracing::warn!(generator = primary.name(), error = %e, "variation generation failed, using fallback");
                }
            }
        }
        let value = self.fallback.variations(idea).await.unwrap_or_default();
        Generated { value, used_fallback: self.primary.is_some() }
    }

    pub async fn suggestions(
        &self,
        ctx: &SessionContext,
        idea: &IdeaData,
    ) -> Generated<BusinessSuggestions> {
        if let Some(primary) = self.primary_if_allowed(ctx) {
            match primary.suggestions(idea).await {
                Ok(value) => return Generated { value, used_fallback: false },
                Err(e) => {
                    tracing::warn!(generator = primary.name(), error = %e, "suggestion generation failed, using fallback");
                }
            }
        }
        let value = self.fallback.suggestions(idea).await.unwrap_or_default();
        Generated { value, used_fallback: self.primary.is_some() }
    }

    pub async fn refine(
        &self,
        ctx: &SessionContext,
        idea: &IdeaData,
        prompt: &str,
    ) -> Generated<String> {
        if let Some(primary) = self.primary_if_allowed(ctx) {
            match primary.refine(idea, prompt).await {
                Ok(value) => return Generated { value, used_fallback: false },
                Err(e) => {
                    tracing::warn!(generator = primary.name(), error = %e, "refinement failed, using fallback");
                }
            }
        }
        let value = self.fallback.refine(idea, prompt).await.unwrap_or_default();
        Generated { value, used_fallback: self.primary.is_some() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StaticFlags;

    struct FailingGenerator;

    #[async_trait]
    impl IdeaGenerator for FailingGenerator {
        async fn feedback(&self, _idea: &IdeaData) -> Result<AiFeedback, GenerateError> {
            Err(GenerateError::NoResponse)
        }
        async fn variations(&self, _idea: &IdeaData) -> Result<Vec<Variation>, GenerateError> {
            Err(GenerateError::NoResponse)
        }
        async fn suggestions(
            &self,
            _idea: &IdeaData,
        ) -> Result<BusinessSuggestions, GenerateError> {
            Err(GenerateError::NoResponse)
        }
        async fn refine(&self, _idea: &IdeaData, _prompt: &str) -> Result<String, GenerateError> {
            Err(GenerateError::NoResponse)
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    fn idea() -> IdeaData {
        IdeaData { title: "Pony Tutus".into(), ..Default::default() }
    }

    #[tokio::test]
    async fn test_mock_feedback_has_all_seven_keys_populated() {
        let feedback = MockGenerator::new().feedback(&idea()).await.unwrap();
        assert!(!feedback.strengths.is_empty());
        assert!(!feedback.weaknesses.is_empty());
        assert!(!feedback.opportunities.is_empty());
        assert!(!feedback.threats.is_empty());
        assert!(!feedback.suggestions.is_empty());
        assert!(!feedback.market_insights.is_empty());
        assert!(!feedback.validation_tips.is_empty());
    }

    #[tokio::test]
    async fn test_mock_variations_respect_cap() {
        let variations = MockGenerator::new().variations(&idea()).await.unwrap();
        assert!(variations.len() <= crate::core::MAX_VARIATIONS);
        assert!(variations.iter().all(|v| !v.is_selected));
        assert!(variations[0].title.contains("Pony Tutus"));
    }

    #[tokio::test]
    async fn test_manager_falls_back_on_failure() {
        let manager = GeneratorManager::new(
            Some(Box::new(FailingGenerator)),
            Arc::new(StaticFlags::new()),
        );
        let ctx = SessionContext::default();

        let generated = manager.feedback(&ctx, &idea()).await;
        assert!(generated.used_fallback);
        assert!(!generated.value.strengths.is_empty());
    }

    #[tokio::test]
    async fn test_flag_disabled_skips_primary() {
        struct PanickyGenerator;

        #[async_trait]
        impl IdeaGenerator for PanickyGenerator {
            async fn feedback(&self, _idea: &IdeaData) -> Result<AiFeedback, GenerateError> {
                panic!("primary must not be consulted when the flag is off");
            }
            async fn variations(
                &self,
                _idea: &IdeaData,
            ) -> Result<Vec<Variation>, GenerateError> {
                panic!("primary must not be consulted when the flag is off");
            }
            async fn suggestions(
                &self,
                _idea: &IdeaData,
            ) -> Result<BusinessSuggestions, GenerateError> {
                panic!("primary must not be consulted when the flag is off");
            }
            async fn refine(
                &self,
                _idea: &IdeaData,
                _prompt: &str,
            ) -> Result<String, GenerateError> {
                panic!("primary must not be consulted when the flag is off");
            }
            fn name(&self) -> &str {
                "panicky"
            }
        }

        let flags = StaticFlags::new().with_override(ENHANCED_GENERATION, false);
        let manager = GeneratorManager::new(Some(Box::new(PanickyGenerator)), Arc::new(flags));
        let generated = manager.feedback(&SessionContext::default(), &idea()).await;
        assert!(generated.used_fallback);
    }

    #[tokio::test]
    async fn test_mock_only_manager_is_not_flagged_as_fallback() {
        let manager = GeneratorManager::mock_only(Arc::new(StaticFlags::new()));
        let generated = manager.variations(&SessionContext::default(), &idea()).await;
        assert!(!generated.used_fallback);
        assert!(!generated.value.is_empty());
    }

    #[tokio::test]
    async fn test_mock_refine_is_deterministic() {
        let mock = MockGenerator::new();
        let a = mock.refine(&idea(), "how to price").await.unwrap();
        let b = mock.refine(&idea(), "how to price").await.unwrap();
        assert_eq!(a, b);
    }
}
