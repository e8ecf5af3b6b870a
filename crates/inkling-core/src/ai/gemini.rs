//! Gemini REST implementation of [`GenerationClient`].
//!
//! - Endpoint: `POST {base_url}/models/{model}:generateContent`
//! - Auth: `x-goog-api-key` header
//! - Structured calls set `responseMimeType: application/json` plus a
//!   `responseSchema`, then parse the first candidate's text as JSON.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, info};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use super::{tag_batch, until_cancelled, GeneratedVersion, GenerationClient};
use crate::{
    config::{Config, Prompts},
    error::{InklingError, Result},
    models::{ContentVersion, VersionStyle},
};

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Gemini-backed generation client.
///
/// The underlying `reqwest::Client` is internally reference counted, so the
/// client is cheap to clone and share between tasks.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    prompts: Prompts,
}

impl GeminiClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `InklingError::Configuration` when no API key is configured.
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| InklingError::Configuration {
                message: format!(
                    "Gemini API key is not configured. Set gemini.apiKey in the config file or {}",
                    crate::config::API_KEY_ENV
                ),
            })?
            .to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.ai.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key,
            model: config.ai.model.clone(),
            base_url: config.ai.base_url.trim_end_matches('/').to_string(),
            prompts: config.ai.prompts.clone(),
        })
    }

    /// Model name used for requests.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_content(&self, body: &Value) -> Result<Option<String>> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!("POST {url}");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(InklingError::generation(format!(
                "Gemini API returned {status}: {}",
                api_error_message(&raw)
            )));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        Ok(response_text(parsed))
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate_batch(
        &self,
        raw_note: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ContentVersion>> {
        let prompt = format!("{}{raw_note}", self.prompts.refine);
        let schema = json!({ "type": "ARRAY", "items": version_schema() });
        let body = request_body(vec![json!({ "text": prompt })], Some(schema));

        let Some(text) = until_cancelled(cancel, self.generate_content(&body)).await? else {
            return Ok(Vec::new());
        };
        let generated: Vec<GeneratedVersion> = parse_model_json(&text)?;
        let versions = tag_batch(generated);
        info!("AI_REFINE count={}", versions.len());
        Ok(versions)
    }

    async fn generate_one(
        &self,
        context_note: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ContentVersion>> {
        let prompt = format!("{}{context_note}", self.prompts.single);
        let body = request_body(vec![json!({ "text": prompt })], Some(version_schema()));

        let Some(text) = until_cancelled(cancel, self.generate_content(&body)).await? else {
            return Ok(None);
        };
        let generated: GeneratedVersion = parse_model_json(&text)?;
        let version = generated.into_single_version();
        info!("AI_SINGLE type={}", version.style.as_str());
        Ok(Some(version))
    }

    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let parts = vec![
            json!({ "inlineData": { "mimeType": mime_type, "data": STANDARD.encode(audio) } }),
            json!({ "text": self.prompts.transcribe }),
        ];
        let body = request_body(parts, None);

        let text = until_cancelled(cancel, self.generate_content(&body))
            .await?
            .unwrap_or_default();
        info!("AI_TRANSCRIBE text_length={}", text.chars().count());
        Ok(text)
    }
}

fn request_body(parts: Vec<Value>, schema: Option<Value>) -> Value {
    let mut body = json!({ "contents": [{ "role": "user", "parts": parts }] });
    if let Some(schema) = schema {
        body["generationConfig"] = json!({
            "responseMimeType": "application/json",
            "responseSchema": schema,
        });
    }
    body
}

fn version_schema() -> Value {
    let styles: Vec<&str> = VersionStyle::GENERATED.iter().map(|s| s.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "content": { "type": "STRING" },
            "tags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "description": { "type": "STRING" },
            "type": { "type": "STRING", "enum": styles },
        },
        "required": ["title", "content", "tags", "description", "type"],
    })
}

/// Concatenated text of the first candidate, `None` when it is empty.
fn response_text(response: GenerateContentResponse) -> Option<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    (!text.trim().is_empty()).then_some(text)
}

fn parse_model_json<T: for<'de> Deserialize<'de>>(text: &str) -> Result<T> {
    serde_json::from_str(text)
        .map_err(|e| InklingError::generation(format!("Model returned malformed JSON: {e}")))
}

fn api_error_message(raw: &str) -> String {
    serde_json::from_str::<ApiErrorResponse>(raw)
        .ok()
        .and_then(|r| r.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_api_key() {
        let err = GeminiClient::new(&Config::default()).unwrap_err();
        assert!(matches!(err, InklingError::Configuration { .. }));
    }

    #[test]
    fn test_new_uses_configured_model() {
        let mut config = Config::default().with_api_key_override(Some("k".to_string()));
        config.ai.model = "gemini-test".to_string();
        config.ai.base_url = "http://localhost:9999/v1beta/".to_string();

        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(client.model(), "gemini-test");
        assert_eq!(client.base_url, "http://localhost:9999/v1beta");
    }

    #[test]
    fn test_request_body_with_schema() {
        let body = request_body(vec![json!({ "text": "hi" })], Some(version_schema()));

        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"]["properties"]["type"]["enum"],
            json!(["detailed", "story", "analysis", "minimalist"])
        );
    }

    #[test]
    fn test_request_body_without_schema() {
        let body = request_body(vec![json!({ "text": "hi" })], None);
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_response_text_joins_first_candidate_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "[{\"a\":" }, { "text": "1}]" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(response_text(response).as_deref(), Some("[{\"a\":1}]"));
    }

    #[test]
    fn test_response_text_empty_is_none() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert!(response_text(response).is_none());

        let response: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [{ "content": { "parts": [] } }] }))
                .unwrap();
        assert!(response_text(response).is_none());
    }

    #[test]
    fn test_malformed_model_json_is_generation_error() {
        let err = parse_model_json::<Vec<GeneratedVersion>>("not json").unwrap_err();
        assert!(matches!(err, InklingError::Generation { .. }));
    }

    #[test]
    fn test_api_error_message() {
        let raw = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(raw), "API key not valid");
        assert_eq!(api_error_message(" upstream down \n"), "upstream down");
    }
}
