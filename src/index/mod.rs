//! Semantic place index: the k-nearest query surface the search pipeline consumes.

pub mod client;
mod types;

pub use client::RemoteIndex;

use std::time::Duration;

use crate::model::Candidate;

/// Errors from the index collaborator. All of them mean the index could not
/// answer, never that it legitimately found nothing.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("invalid index URL: {0}")]
    InvalidUrl(String),

    #[error("invalid collection name: '{0}' (use letters, digits, '-' or '_')")]
    InvalidCollection(String),

    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    #[error("index request timed out after {0:?}")]
    Timeout(Duration),

    /// The index answered, but the body did not match the expected shape.
    #[error("unreadable index response: {0}")]
    Decode(String),

    #[error("index error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl IndexError {
    /// Whether retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            IndexError::Timeout(_)
                | IndexError::Network(_)
                | IndexError::Api {
                    code: 429 | 500..=599,
                    ..
                }
        )
    }
}

/// Nearest-neighbour lookup by query text.
/// Implemented by `RemoteIndex`; mock implementations used in tests.
pub trait VectorIndex {
    /// Number of indexed documents.
    async fn count(&self) -> Result<usize, IndexError>;

    /// Up to `top_k` candidates, nearest first.
    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<Candidate>, IndexError>;
}
