use std::env;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::reply::{extract_text, parse_constraints, parse_verdict};
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, LanguageVerdict,
};
use super::{ConstraintExtractor, LanguageOracle, NluError};
use crate::model::ConstraintSet;
use crate::retry::Backoff;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
const BACKOFF: Backoff = Backoff {
    attempts: 3,
    initial_ms: 1000,
};

const LANGUAGE_INSTRUCTION: &str = "You are a language identification expert. \
Identify the language of the user's text. Only five languages are supported: \
vietnamese, english, chinese, korean, japanese. If the text is in any other \
language, use \"unsupported\". Reply with JSON only, in the form \
{\"language\": \"<name>\", \"confidence\": <0..1>, \"supported\": <true|false>}.";

const CONSTRAINT_INSTRUCTION: &str = "You extract search criteria for places to visit \
in Ho Chi Minh City from a traveller's question. Reply with JSON only, using these \
optional fields: \"place_type\" (e.g. museum, coffee shop, park, pagoda, church, \
market, restaurant), \"region\" (district or area, e.g. \"Quận 1\", \"Thủ Đức\"), \
\"keywords\" (array of short features such as quiet, photography, outdoor, free) and \
\"price_tier\" (one of low, medium, high). Omit fields the question does not mention. \
Keep values in the language of the question.";

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn from_env(http: Client) -> Result<Self, NluError> {
        let api_key = env::var("GEMINI_API_KEY").map_err(|_| NluError::ApiKeyNotSet)?;
        if api_key.trim().is_empty() {
            return Err(NluError::ApiKeyNotSet);
        }
        let model = env::var("GEMINI_MODEL")
            .ok()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Ok(Self {
            http,
            api_key: ApiKey(api_key.trim().to_string()),
            model,
            base_url: API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Overrides the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey("test-key".to_string()),
            model: DEFAULT_MODEL.to_string(),
            base_url: base_url.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    async fn generate(
        &self,
        instruction: &str,
        text: &str,
    ) -> Result<GenerateContentResponse, NluError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        let request = GenerateContentRequest {
            contents: vec![Content::text(text, Some("user"))],
            system_instruction: Content::text(instruction, None),
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: "application/json",
            },
        };

        debug_assert!(
            url.starts_with("https://") || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key.0)
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Gemini API rate limited");
            return Err(NluError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if let Ok(body) = serde_json::from_str::<GenerateContentResponse>(&text)
                && let Some(err) = &body.error
            {
                let classified = NluError::from(err);
                warn!(error = %classified, "Gemini API error");
                return Err(classified);
            }
            let snippet = &text[..text.floor_char_boundary(200)];
            warn!(status = %status, "Gemini API error (no structured body)");
            return Err(NluError::Api {
                code: status.as_u16(),
                message: format!("HTTP {status}: {snippet}"),
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.classify_transport(e))?;
        let body: GenerateContentResponse = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(error = %e, "Gemini API returned an unreadable body");
            NluError::Api {
                code: status.as_u16(),
                message: format!("unreadable response body: {e}"),
            }
        })?;
        debug!(model = %self.model, "gemini generation complete");

        if let Some(err) = &body.error {
            let classified = NluError::from(err);
            warn!(error = %classified, "Gemini API error in 200 response");
            return Err(classified);
        }

        Ok(body)
    }

    async fn generate_text(&self, instruction: &str, text: &str) -> Result<String, NluError> {
        let response = BACKOFF
            .retry(NluError::is_transient, move || self.generate(instruction, text))
            .await?;
        extract_text(&response).ok_or_else(|| NluError::MalformedReply("empty reply".to_string()))
    }

    fn classify_transport(&self, e: reqwest::Error) -> NluError {
        if e.is_timeout() {
            NluError::Timeout(self.timeout)
        } else {
            NluError::Network(e)
        }
    }
}

impl LanguageOracle for GeminiClient {
    async fn identify_language(&self, text: &str) -> Result<LanguageVerdict, NluError> {
        let reply = self.generate_text(LANGUAGE_INSTRUCTION, text).await?;
        parse_verdict(&reply)
    }
}

impl ConstraintExtractor for GeminiClient {
    async fn extract_constraints(&self, question: &str) -> Result<ConstraintSet, NluError> {
        let reply = self.generate_text(CONSTRAINT_INSTRUCTION, question).await?;
        parse_constraints(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlu::types::ApiError;

    #[test]
    fn only_rate_limits_and_server_errors_retry() {
        assert!(NluError::RateLimited.is_transient());
        assert!(NluError::Api { code: 503, message: String::new() }.is_transient());
        assert!(!NluError::Api { code: 400, message: String::new() }.is_transient());
        assert!(!NluError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(!NluError::MalformedReply(String::new()).is_transient());
    }

    #[test]
    fn embedded_error_codes_map_to_variants() {
        let error = |code| ApiError { code, message: Some("x".into()) };
        assert!(matches!(NluError::from(&error(Some(429))), NluError::RateLimited));
        assert!(matches!(NluError::from(&error(Some(403))), NluError::QuotaExhausted(_)));
        assert!(matches!(NluError::from(&error(None)), NluError::Api { code: 0, .. }));
    }
}
