//! Search orchestration: index lookup, scoring, constraint filtering, and result assembly.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::RankingConfig;
use crate::index::{IndexError, VectorIndex};
use crate::lang::{Language, classify_content};
use crate::model::{ConstraintSet, Field, RankedResultSet, ScoredCandidate};
use crate::rank::{assemble, filter, query_words, score};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The index holds no documents yet. Retrying will not help until it is populated.
    #[error("the place index is empty; no data has been loaded yet")]
    NoData,

    /// The index could not answer. The caller may retry with backoff.
    #[error("{0}")]
    Transport(#[from] IndexError),
}

/// Runs one question through the retrieval-ranking pipeline.
pub struct Searcher<I> {
    index: I,
    config: RankingConfig,
    timeout: Duration,
}

impl<I: VectorIndex> Searcher<I> {
    pub fn new(index: I, config: RankingConfig) -> Self {
        Self {
            index,
            config,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound applied to each index call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[cfg(test)]
    pub(crate) fn index(&self) -> &I {
        &self.index
    }

    pub async fn search(
        &self,
        question: &str,
        constraints: &ConstraintSet,
        query_language: Language,
        limit: usize,
    ) -> Result<RankedResultSet, SearchError> {
        let indexed = self.bounded(self.index.count()).await?;
        if indexed == 0 {
            return Err(SearchError::NoData);
        }

        let top_k = limit
            .saturating_mul(self.config.overfetch_factor)
            .min(indexed);
        if top_k == 0 {
            return Ok(RankedResultSet::default());
        }

        let raw = self.bounded(self.index.query(question, top_k)).await?;
        let fetched = raw.len();

        let words = query_words(question);
        let scored: Vec<ScoredCandidate> = raw
            .into_iter()
            .map(|c| {
                let s = score(c.distance, &words, &c, &self.config.weights);
                ScoredCandidate::new(c, s)
            })
            .collect();

        let mut kept = filter(scored, constraints, &self.config);
        for entry in &mut kept {
            let text = entry
                .candidate
                .get(Field::Description)
                .unwrap_or_else(|| entry.candidate.name());
            entry.language = classify_content(&text);
        }
        let filtered = kept.len();

        let results = assemble(kept, query_language, limit, &self.config);
        debug!(top_k, fetched, filtered, "search pipeline stages");
        info!(
            language = %query_language,
            constraints = constraints.criteria_count(),
            results = results.len(),
            "search complete"
        );
        Ok(results)
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, IndexError>>,
    ) -> Result<T, IndexError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or(Err(IndexError::Timeout(self.timeout)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::model::{Candidate, candidate};

    /// Index double that counts queries and serves a fixed document list.
    pub(crate) struct MockIndex {
        pub(crate) count: Result<usize, u16>,
        pub(crate) docs: Vec<Candidate>,
        pub(crate) queries: AtomicUsize,
        pub(crate) last_top_k: Mutex<Option<usize>>,
        pub(crate) delay: Option<Duration>,
    }

    impl MockIndex {
        pub(crate) fn with_docs(docs: Vec<Candidate>) -> Self {
            Self {
                count: Ok(docs.len()),
                docs,
                queries: AtomicUsize::new(0),
                last_top_k: Mutex::new(None),
                delay: None,
            }
        }

        pub(crate) fn empty() -> Self {
            Self::with_docs(Vec::new())
        }
    }

    impl VectorIndex for MockIndex {
        async fn count(&self) -> Result<usize, IndexError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.count.map_err(|code| IndexError::Api {
                code,
                message: "index unavailable".into(),
            })
        }

        async fn query(&self, _text: &str, top_k: usize) -> Result<Vec<Candidate>, IndexError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            *self.last_top_k.lock().unwrap() = Some(top_k);
            Ok(self.docs.iter().take(top_k).cloned().collect())
        }
    }

    fn vi_place(id: &str, distance: f32, description: &str) -> Candidate {
        candidate(id, distance, &[("ten_dia_diem", id), ("mo_ta", description)])
    }

    #[tokio::test]
    async fn empty_index_fails_fast_without_querying() {
        let searcher = Searcher::new(MockIndex::empty(), RankingConfig::default());
        let err = searcher
            .search("bảo tàng", &ConstraintSet::default(), Language::Vietnamese, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::NoData));
        assert_eq!(searcher.index.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn index_failure_is_transport_error() {
        let index = MockIndex {
            count: Err(503),
            ..MockIndex::empty()
        };
        let searcher = Searcher::new(index, RankingConfig::default());
        let err = searcher
            .search("museum", &ConstraintSet::default(), Language::English, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Transport(IndexError::Api { code: 503, .. })));
    }

    #[tokio::test]
    async fn slow_index_times_out() {
        let index = MockIndex {
            delay: Some(Duration::from_secs(5)),
            ..MockIndex::with_docs(vec![vi_place("a", 0.1, "Bảo tàng")])
        };
        let searcher = Searcher::new(index, RankingConfig::default())
            .with_timeout(Duration::from_millis(20));
        let err = searcher
            .search("museum", &ConstraintSet::default(), Language::English, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Transport(IndexError::Timeout(_))));
    }

    #[tokio::test]
    async fn overfetch_is_capped_by_index_size() {
        let docs = (0..4).map(|i| vi_place(&format!("p{i}"), 0.2, "Công viên xanh mát")).collect();
        let searcher = Searcher::new(MockIndex::with_docs(docs), RankingConfig::default());
        searcher
            .search("công viên", &ConstraintSet::default(), Language::Vietnamese, 3)
            .await
            .unwrap();
        assert_eq!(*searcher.index.last_top_k.lock().unwrap(), Some(4));

        let docs = (0..20).map(|i| vi_place(&format!("p{i}"), 0.2, "Công viên xanh mát")).collect();
        let searcher = Searcher::new(MockIndex::with_docs(docs), RankingConfig::default());
        searcher
            .search("công viên", &ConstraintSet::default(), Language::Vietnamese, 3)
            .await
            .unwrap();
        assert_eq!(*searcher.index.last_top_k.lock().unwrap(), Some(9));
    }

    #[tokio::test]
    async fn zero_limit_returns_nothing_without_querying() {
        let searcher = Searcher::new(
            MockIndex::with_docs(vec![vi_place("a", 0.1, "Bảo tàng")]),
            RankingConfig::default(),
        );
        let out = searcher
            .search("bảo tàng", &ConstraintSet::default(), Language::Vietnamese, 0)
            .await
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(searcher.index.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn pipeline_classifies_filters_and_ranks() {
        let docs = vec![
            vi_place("vi-museum", 0.4, "Bảo tàng lịch sử với nhiều hiện vật quý"),
            candidate(
                "en-museum",
                0.1,
                &[
                    ("name", "War Remnants Museum"),
                    ("description", "A museum of the war, located in District 3"),
                    ("place_type", "museum"),
                ],
            ),
            candidate(
                "park",
                0.05,
                &[("name", "Tao Dan Park"), ("place_type", "park")],
            ),
        ];
        let constraints = ConstraintSet {
            place_type: Some("museum".into()),
            ..Default::default()
        };
        let searcher = Searcher::new(MockIndex::with_docs(docs), RankingConfig::default());
        let out = searcher
            .search("museum", &constraints, Language::English, 5)
            .await
            .unwrap();

        let ids: Vec<&str> = out.iter().map(ScoredCandidate::id).collect();
        assert_eq!(ids, vec!["en-museum"]);
        let top = out.iter().next().unwrap();
        assert_eq!(top.language, Some(Language::English));
        assert!(top.score <= 1.0);
    }

    #[tokio::test]
    async fn content_language_falls_back_to_name() {
        let docs = vec![candidate("k", 0.1, &[("name", "경복궁 박물관")])];
        let searcher = Searcher::new(MockIndex::with_docs(docs), RankingConfig::default());
        let out = searcher
            .search("박물관", &ConstraintSet::default(), Language::Korean, 5)
            .await
            .unwrap();
        assert_eq!(out.iter().next().and_then(|c| c.language), Some(Language::Korean));
    }

    #[tokio::test]
    async fn same_language_quota_applies_end_to_end() {
        let mut docs: Vec<Candidate> = (0..5)
            .map(|i| vi_place(&format!("vi{i}"), 0.5, "Quán cà phê yên tĩnh ở Quận 1"))
            .collect();
        docs.extend((0..3).map(|i| {
            candidate(
                &format!("en{i}"),
                0.05,
                &[("description", "A quiet cafe in the heart of the city")],
            )
        }));
        let searcher = Searcher::new(MockIndex::with_docs(docs), RankingConfig::default());
        let out = searcher
            .search("quán cà phê yên tĩnh ở Quận 1", &ConstraintSet::default(), Language::Vietnamese, 8)
            .await
            .unwrap();
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|c| c.language == Some(Language::Vietnamese)));
    }
}
