//! HTTP idea-generation service client.
//!
//! Implements the IdeaGenerator trait against a JSON-over-HTTP generation
//! service. The endpoint shape is a plain request/response pair per
//! operation; failures surface as [`GenerateError`] and are handled by the
//! manager's fallback.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::{AiFeedback, BusinessSuggestions, IdeaData, Variation};

use super::{GenerateError, IdeaGenerator};

/// HTTP generator client.
pub struct HttpGenerator {
    client: Client,
    base_url: String,
}

impl HttpGenerator {
    /// Create a client for the given service base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: Client::new(), base_url: base_url.into() }
    }

    /// Create with a per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, GenerateError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerateError::Unavailable(e.to_string()))?;
        Ok(Self { client, base_url: base_url.into() })
    }

    async fn request<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &GenerateRequest<'_>,
    ) -> Result<T, GenerateError> {
        let response = self
            .client
            .post(format!("{}/{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| GenerateError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GenerateError::Api(format!("{status}: {text}")));
        }

        response.json().await.map_err(|_| GenerateError::NoResponse)
    }
}

/// Request body shared by all generation endpoints.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    idea: &'a IdeaData,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct RefineResponse {
    response: String,
}

#[async_trait]
impl IdeaGenerator for HttpGenerator {
    async fn feedback(&self, idea: &IdeaData) -> Result<AiFeedback, GenerateError> {
        self.request("generate/feedback", &GenerateRequest { idea, prompt: None }).await
    }

    async fn variations(&self, idea: &IdeaData) -> Result<Vec<Variation>, GenerateError> {
        let mut variations: Vec<Variation> =
            self.request("generate/variations", &GenerateRequest { idea, prompt: None }).await?;
        variations.truncate(crate::core::MAX_VARIATIONS);
        for v in &mut variations {
            v.is_selected = false;
        }
        Ok(variations)
    }

    async fn suggestions(&self, idea: &IdeaData) -> Result<BusinessSuggestions, GenerateError> {
        self.request("generate/suggestions", &GenerateRequest { idea, prompt: None }).await
    }

    async fn refine(&self, idea: &IdeaData, prompt: &str) -> Result<String, GenerateError> {
        let response: RefineResponse =
            self.request("generate/refine", &GenerateRequest { idea, prompt: Some(prompt) }).await?;
        Ok(response.response)
    }

    fn name(&self) -> &str {
        "http"
    }
}
