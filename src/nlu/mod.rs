//! Language-model collaborator: language identification and constraint extraction.

pub mod client;
mod reply;
pub mod types;

pub use client::GeminiClient;
pub use types::LanguageVerdict;

use crate::model::ConstraintSet;

#[derive(Debug, thiserror::Error)]
pub enum NluError {
    #[error("GEMINI_API_KEY not set. Get one at https://aistudio.google.com/apikey")]
    ApiKeyNotSet,

    #[error("API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("API quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("unparseable model reply: {0}")]
    MalformedReply(String),
}

impl NluError {
    /// Rate limits and server-side failures are worth another attempt.
    /// Timeouts are not: callers already bound the whole exchange.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Api { code: 500..=599, .. }
        )
    }
}

/// Identifies the language of free text.
/// Implemented by `GeminiClient`; mock implementations used in tests.
pub trait LanguageOracle {
    async fn identify_language(&self, text: &str) -> Result<LanguageVerdict, NluError>;
}

/// Infers structured search constraints from a travel question.
pub trait ConstraintExtractor {
    async fn extract_constraints(&self, question: &str) -> Result<ConstraintSet, NluError>;
}
