//! Gemini client
//!
//! Client for Google's Generative Language API (`generateContent`), used to
//! write the farmer-facing advice.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http_client;
use crate::config::AdvisoryConfig;
use crate::error::{AppError, AppResult};

/// Client for the Gemini text generation API
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason", default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &AdvisoryConfig) -> AppResult<Self> {
        Ok(Self {
            client: http_client(config.timeout(), None)?,
            base_url: config.api_endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Generate text for a single-turn prompt
    pub async fn generate_text(&self, prompt: &str) -> AppResult<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::AdvisoryUnavailable(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body: String = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string())
                .chars()
                .take(500)
                .collect();
            return Err(AppError::AdvisoryUnavailable(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::AdvisoryUnavailable(format!("Failed to read response: {}", e)))?;
        parse_generated_text(&body)
    }
}

/// Concatenate the text parts of the first candidate
pub fn parse_generated_text(body: &str) -> AppResult<String> {
    let data: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| AppError::AdvisoryUnavailable(format!("Failed to parse response: {}", e)))?;

    let candidate = data
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AppError::AdvisoryUnavailable("response has no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    let text = text.trim();

    if text.is_empty() {
        return Err(AppError::AdvisoryUnavailable(format!(
            "empty response (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text.to_string())
}
