#![doc = "Gemini integration: the concrete LlmClient behind the CLI, speaking the generateContent API."]
//
//! # Gemini Client
//!
//! Wires the [`LlmClient`] contract from `form-agent-core` to Google's hosted
//! Gemini models over HTTP.
//!
//! - Construct [`GeminiClient`] with [`GeminiClient::new_from_env`] (reads
//!   `GEMINI_API_KEY`, loading `.env` if present) or [`GeminiClient::new`].
//! - Construction is the only fallible step. Afterwards every transport,
//!   status or decoding failure comes back as an [`Outcome::Failed`].
//! - One request per prompt; no retries, no streaming.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use form_agent_core::contract::LlmClient;
use form_agent_core::Outcome;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Endpoint and model settings; the key is never part of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Why a single generateContent round trip failed.
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response contained no candidate text")]
    MissingText,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
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
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Pull `candidates[0].content.parts[0].text` out of a response body.
fn completion_text(body: &str) -> Result<String, GeminiError> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or(GeminiError::MissingText)
}

pub struct GeminiClient {
    http: Client,
    url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, api_key: impl Into<String>) -> anyhow::Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            tracing::error!("[GEMINI] Empty API key supplied");
            anyhow::bail!("{API_KEY_ENV} is empty");
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;
        let url = format!(
            "{}/models/{}:generateContent",
            config.endpoint.trim_end_matches('/'),
            config.model
        );
        tracing::info!(
            model = %config.model,
            timeout_secs = config.timeout_secs,
            "[GEMINI] Initialized client"
        );
        Ok(Self {
            http,
            url,
            api_key,
            model: config.model.clone(),
        })
    }

    pub fn new_from_env(config: &GeminiConfig) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // loads environment variables from .env if present
        match env::var(API_KEY_ENV) {
            Ok(api_key) => Self::new(config, api_key),
            Err(e) => {
                tracing::error!(error = ?e, "[GEMINI] {API_KEY_ENV} missing in environment");
                Err(anyhow::anyhow!(
                    "{API_KEY_ENV} not found in environment variables. \
                     Please set it in your system or .env file."
                ))
            }
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };
        let resp = self
            .http
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(GeminiError::Status { status, body: text });
        }
        completion_text(&text)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Outcome {
        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "[GEMINI] Sending prompt");
        match self.generate(prompt).await {
            Ok(text) => {
                tracing::info!(model = %self.model, chars = text.len(), "[GEMINI] Completion received");
                Outcome::Text(text)
            }
            Err(e) => {
                tracing::error!(model = %self.model, error = %e, "[GEMINI][ERROR] Completion failed");
                Outcome::failed(format!("Error calling Gemini API: {e}"))
            }
        }
    }
}
