//! Language model trait and implementations.
//!
//! - `OllamaModel` calls a local Ollama server's non-streaming
//!   `/api/generate` endpoint. This is the production backend.
//! - `OfflineModel` needs no network and produces deterministic filler,
//!   for `--offline` runs and tests.
//!
//! Both return the prompt followed by the continuation, so callers always
//! run the output through the response extractor.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use nik_core::config::ModelConfig;

use crate::error::ChatError;

/// Sampling parameters for one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::from(&ModelConfig::default())
    }
}

impl From<&ModelConfig> for GenerationParams {
    fn from(config: &ModelConfig) -> Self {
        Self {
            max_new_tokens: config.max_new_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            repetition_penalty: config.repetition_penalty,
        }
    }
}

/// Text generator. Output echoes the prompt and then continues it.
pub trait LanguageModel {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, ChatError>;
}

// ---------------------------------------------------------------------------
// OllamaModel
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
    temperature: f32,
    top_p: f32,
    repeat_penalty: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Client for an Ollama server.
pub struct OllamaModel {
    agent: ureq::Agent,
    url: String,
    model: String,
}

impl std::fmt::Debug for OllamaModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaModel")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish()
    }
}

impl OllamaModel {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build(),
            url: format!("{}/api/generate", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
        }
    }
}

impl LanguageModel for OllamaModel {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, ChatError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: params.max_new_tokens,
                temperature: params.temperature,
                top_p: params.top_p,
                repeat_penalty: params.repetition_penalty,
            },
        };

        let body: GenerateResponse = self
            .agent
            .post(&self.url)
            .send_json(&request)
            .map_err(|e| ChatError::Model(e.to_string()))?
            .into_json()
            .map_err(|e| ChatError::Model(format!("bad response body: {}", e)))?;

        debug!("Model returned {} chars", body.response.len());
        Ok(format!("{prompt} {}", body.response))
    }
}

// ---------------------------------------------------------------------------
// OfflineModel
// ---------------------------------------------------------------------------

const FILLER: &[&str] = &[
    "I'm running offline right now, but I'm still here. What's on your mind?",
    "No brain server at the moment, bro. Try /search or tell me more.",
    "Offline mode. I can still do jokes, facts and a good vent session.",
];

/// Deterministic stand-in used when no model server is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineModel;

impl LanguageModel for OfflineModel {
    fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String, ChatError> {
        let line = FILLER[prompt.len() % FILLER.len()];
        Ok(format!("{prompt} {line}"))
    }
}
