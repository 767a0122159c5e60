use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{CountResponse, ErrorBody, QueryRequest, QueryResponse};
use super::{IndexError, VectorIndex};
use crate::config::IndexSettings;
use crate::model::Candidate;
use crate::retry::Backoff;

const BACKOFF: Backoff = Backoff {
    attempts: 2,
    initial_ms: 250,
};

/// HTTP client for a retrieval service that embeds query text server-side.
///
/// Endpoints, relative to `base_url`:
/// - `GET  /collections/{collection}/count` → `{"count": n}`
/// - `POST /collections/{collection}/query` with `{"query_text", "top_k"}` →
///   `{"results": [{"id", "attributes"|"metadata", "distance"}]}`
///
/// The collection name is restricted to `[A-Za-z0-9_-]` so it is safe to
/// interpolate into the path.
#[derive(Clone, Debug)]
pub struct RemoteIndex {
    http: Client,
    base_url: String,
    collection: String,
    timeout: Duration,
}

impl RemoteIndex {
    pub fn new(http: Client, settings: &IndexSettings) -> Result<Self, IndexError> {
        let parsed = url::Url::parse(&settings.base_url)
            .map_err(|e| IndexError::InvalidUrl(format!("{}: {e}", settings.base_url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(IndexError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                settings.base_url
            )));
        }
        validate_collection(&settings.collection)?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            collection: settings.collection.clone(),
            timeout: settings.timeout(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/collections/{}/{endpoint}", self.base_url, self.collection)
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, IndexError> {
        let response = request
            .header("User-Agent", crate::USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => {
                let body = response.bytes().await.map_err(|e| self.classify_transport(e))?;
                serde_json::from_slice(&body).map_err(|e| {
                    warn!(error = %e, "index returned an unreadable body");
                    IndexError::Decode(e.to_string())
                })
            }
            404 => Err(IndexError::CollectionNotFound(self.collection.clone())),
            code => {
                let text = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorBody>(&text)
                    .ok()
                    .and_then(|b| b.error)
                    .unwrap_or_else(|| {
                        format!("HTTP {status}: {}", &text[..text.floor_char_boundary(200)])
                    });
                warn!(status = code, %message, "index request failed");
                Err(IndexError::Api { code, message })
            }
        }
    }

    fn classify_transport(&self, e: reqwest::Error) -> IndexError {
        if e.is_timeout() {
            IndexError::Timeout(self.timeout)
        } else {
            IndexError::Network(e)
        }
    }
}

impl VectorIndex for RemoteIndex {
    async fn count(&self) -> Result<usize, IndexError> {
        let url = self.url("count");
        let url = url.as_str();
        let body: CountResponse = BACKOFF
            .retry(IndexError::is_transient, move || self.send(self.http.get(url)))
            .await?;
        Ok(body.count)
    }

    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<Candidate>, IndexError> {
        let url = self.url("query");
        let request = QueryRequest {
            query_text: text,
            top_k,
        };
        let (url, request) = (url.as_str(), &request);
        let body: QueryResponse = BACKOFF
            .retry(IndexError::is_transient, move || {
                self.send(self.http.post(url).json(request))
            })
            .await?;
        debug!(hits = body.results.len(), top_k, "index query complete");
        Ok(body.results.into_iter().map(Candidate::from).collect())
    }
}

fn validate_collection(name: &str) -> Result<(), IndexError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(IndexError::InvalidCollection(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base_url: &str, collection: &str) -> IndexSettings {
        IndexSettings {
            base_url: base_url.to_string(),
            collection: collection.to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = RemoteIndex::new(Client::new(), &settings("ftp://index", "places")).unwrap_err();
        assert!(matches!(err, IndexError::InvalidUrl(_)));
        let err = RemoteIndex::new(Client::new(), &settings("not a url", "places")).unwrap_err();
        assert!(matches!(err, IndexError::InvalidUrl(_)));
    }

    #[test]
    fn rejects_path_like_collection() {
        let err = RemoteIndex::new(Client::new(), &settings("http://index", "../admin")).unwrap_err();
        assert!(matches!(err, IndexError::InvalidCollection(_)));
        let err = RemoteIndex::new(Client::new(), &settings("http://index", "")).unwrap_err();
        assert!(matches!(err, IndexError::InvalidCollection(_)));
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let index = RemoteIndex::new(Client::new(), &settings("http://index:8000/", "diadiem_collection")).unwrap();
        assert_eq!(index.url("count"), "http://index:8000/collections/diadiem_collection/count");
    }

    #[test]
    fn transient_errors() {
        assert!(IndexError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(IndexError::Api { code: 503, message: String::new() }.is_transient());
        assert!(!IndexError::Api { code: 400, message: String::new() }.is_transient());
        assert!(!IndexError::CollectionNotFound("places".into()).is_transient());
        assert!(!IndexError::Decode("expected value".into()).is_transient());
    }
}
