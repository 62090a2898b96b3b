//! Translator backed by the Gemini `generateContent` REST endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{TranslationContext, TranslationError, Translator};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini API client.
pub struct GeminiTranslator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
    timeout: Duration,
}

impl GeminiTranslator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl GenerateRequest {
    fn from_context(context: &TranslationContext) -> Self {
        Self {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: context.system_instruction(),
                }],
            },
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: context.prompt(),
                }],
            }],
        }
    }
}

impl GenerateResponse {
    /// Text of the first candidate, parts joined
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .find_map(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
    }
}

#[async_trait]
impl Translator for GeminiTranslator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn translate(&self, context: &TranslationContext) -> Result<String, TranslationError> {
        if self.api_key.trim().is_empty() {
            return Err(TranslationError::NotConfigured);
        }

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .timeout(self.timeout)
            .json(&GenerateRequest::from_context(context))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranslationError::Timeout(self.timeout)
                } else {
                    TranslationError::Http(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status != 200 {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(TranslationError::Api { status, message });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::Json(e.to_string()))?;

        body.into_text().ok_or(TranslationError::EmptyResponse)
    }
}
