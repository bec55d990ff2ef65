//! Client for the hosted generation API.
//!
//! Thin wrapper over two endpoints: `models/{model}:generateContent`
//! and `models`. Requests are forwarded once, with no retry or backoff;
//! an upstream failure surfaces directly to the relay caller. The API
//! key travels as a query parameter and is never logged.

use crate::config::RelayConfig;
use anyhow::{anyhow, bail, Result};
use serde_json::Value;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// The generation method a model must support to be listed.
const GENERATE_CONTENT: &str = "generateContent";

/// Client for the hosted generation API.
pub struct GenAiClient {
    client: reqwest::Client,
    api_base: String,
    model: String,
}

impl GenAiClient {
    /// Creates a new client from relay configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Sends one generation request and returns the produced text.
    ///
    /// # Errors
    ///
    /// Returns an error on a network failure, a non-success upstream
    /// status, or a response without a text candidate.
    pub async fn generate(&self, api_key: &str, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:{}?key={}",
            self.api_base, self.model, GENERATE_CONTENT, api_key
        );

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Generation API error {}: {}", status, body_text);
        }

        let json: Value = response.json().await?;
        parse_generate_response(&json)
    }

    /// Lists the hosted models that support content generation.
    ///
    /// # Errors
    ///
    /// Returns an error on a network failure, a non-success upstream
    /// status, or a response without a models array.
    pub async fn list_models(&self, api_key: &str) -> Result<Vec<Value>> {
        let url = format!("{}/models?key={}", self.api_base, api_key);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Generation API error {}: {}", status, body_text);
        }

        let json: Value = response.json().await?;
        usable_models(&json)
    }
}

/// Extracts the first candidate's text from a generation response.
fn parse_generate_response(json: &Value) -> Result<String> {
    json.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Invalid generation response: no text candidate"))
}

/// Filters the model listing down to models that can generate content.
///
/// Model entries are passed through verbatim; only the filter predicate
/// inspects them.
fn usable_models(json: &Value) -> Result<Vec<Value>> {
    let models = json
        .get("models")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("Invalid model listing: missing models array"))?;

    Ok(models
        .iter()
        .filter(|model| {
            model
                .get("supportedGenerationMethods")
                .and_then(Value::as_array)
                .is_some_and(|methods| methods.iter().any(|m| m == GENERATE_CONTENT))
        })
        .cloned()
        .collect())
}
