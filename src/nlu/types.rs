use serde::{Deserialize, Serialize};

use super::NluError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub system_instruction: Content,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Content {
    pub fn text(text: impl Into<String>, role: Option<&str>) -> Self {
        Self {
            parts: vec![Part { text: text.into() }],
            role: role.map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<ResponseCandidate>>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseCandidate {
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: Option<u16>,
    pub message: Option<String>,
}

impl From<&ApiError> for NluError {
    fn from(err: &ApiError) -> Self {
        let message = err.message.clone().unwrap_or_else(|| "no message".to_string());
        match err.code {
            Some(429) => NluError::RateLimited,
            Some(403) => NluError::QuotaExhausted(message),
            Some(code) => NluError::Api { code, message },
            None => NluError::Api { code: 0, message },
        }
    }
}

/// Structured language-identification reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LanguageVerdict {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default, alias = "is_supported")]
    pub supported: bool,
}
