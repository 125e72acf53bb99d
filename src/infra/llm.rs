use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::diff::ChangeSummary;
use crate::error::{AppError, AppResult};
use crate::services::ExplanationService;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self::with_base_url(GEMINI_BASE_URL.to_string(), api_key, model)
    }

    pub fn with_base_url(base_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl ExplanationService for GeminiClient {
    async fn explain(&self, changes: &[ChangeSummary]) -> AppResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Configuration("Gemini API key not configured".to_string()))?;

        let request_body = GeminiRequest::new(explanation_prompt(changes)?);
        debug!(model = %self.model, files = changes.len(), "requesting explanation");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|err| AppError::ExplanationService(format!("failed to call Gemini: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::ExplanationService(format!(
                "Gemini responded with {status}: {body}"
            )));
        }

        let payload: GeminiResponse = response.json().await.map_err(|err| {
            AppError::ExplanationService(format!("failed to parse Gemini response: {err}"))
        })?;

        payload.into_text().ok_or_else(|| {
            AppError::ExplanationService("Gemini returned no candidates".to_string())
        })
    }
}

pub fn explanation_prompt(changes: &[ChangeSummary]) -> AppResult<String> {
    let diff = serde_json::to_string_pretty(changes)
        .map_err(|err| AppError::ExplanationService(format!("failed to encode changes: {err}")))?;

    Ok(format!(
        r#"You review pull requests. Explain the code changes below for a reviewer.

Respond with JSON only, shaped exactly like:
{{"title": "<short description of the change>",
  "sections": {{
    "summary": ["<one point per notable change>"],
    "details": ["<implementation notes>"],
    "risks": ["<things a reviewer should double-check>"]
  }}}}

"summary" must contain at least one point. Omit other sections when they would be empty.

Each entry lists the added and removed lines of one file:
{diff}"#
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

impl GeminiRequest {
    fn new(prompt: String) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json",
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

impl GeminiResponse {
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().find_map(|c| c.content)?;
        let text = content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect::<String>();
        (!text.trim().is_empty()).then_some(text)
    }
}
