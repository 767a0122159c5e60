//! End-to-end handling of one travel question.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::index::VectorIndex;
use crate::lang::{self, Detection, Language, UNSUPPORTED_MESSAGE};
use crate::model::{ConstraintSet, RankedResultSet};
use crate::nlu::{ConstraintExtractor, LanguageOracle};
use crate::search::{SearchError, Searcher};

const DEFAULT_NLU_TIMEOUT: Duration = Duration::from_secs(8);
const SUGGESTION_MIN_SCORE: f32 = 0.6;
const MAX_SUGGESTIONS: usize = 3;

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reply {
    /// The question is in a language outside the supported set.
    Unsupported { message: String },
    Answered(Answer),
}

/// Everything a response composer needs to phrase the answer.
#[derive(Debug, Serialize)]
pub struct Answer {
    pub language: Language,
    pub language_name: &'static str,
    pub detection: Detection,
    pub constraints: ConstraintSet,
    pub results: RankedResultSet,
    pub suggested_activities: Vec<String>,
    pub follow_up_questions: Vec<&'static str>,
}

pub struct Assistant<I, N> {
    searcher: Searcher<I>,
    nlu: Option<N>,
    nlu_timeout: Duration,
}

impl<I, N> Assistant<I, N>
where
    I: VectorIndex,
    N: LanguageOracle + ConstraintExtractor,
{
    /// Without `nlu`, detection relies on local heuristics and constraints
    /// are only what the caller supplies.
    pub fn new(searcher: Searcher<I>, nlu: Option<N>) -> Self {
        Self {
            searcher,
            nlu,
            nlu_timeout: DEFAULT_NLU_TIMEOUT,
        }
    }

    pub fn with_nlu_timeout(mut self, timeout: Duration) -> Self {
        self.nlu_timeout = timeout;
        self
    }

    /// Answers `question` with up to `limit` places.
    ///
    /// `constraints` overrides extraction when given. Unsupported languages
    /// short-circuit before any index call.
    pub async fn answer(
        &self,
        question: &str,
        constraints: Option<ConstraintSet>,
        limit: usize,
    ) -> Result<Reply, SearchError> {
        let detection = lang::detect(question, self.nlu.as_ref(), self.nlu_timeout).await;
        let Some(language) = detection.language else {
            info!(confidence = detection.confidence, "question language not supported");
            return Ok(Reply::Unsupported {
                message: UNSUPPORTED_MESSAGE.to_string(),
            });
        };
        info!(
            %language,
            confidence = detection.confidence,
            method = %detection.method.label(),
            "question language detected"
        );

        let constraints = match constraints {
            Some(given) => given.cleaned(),
            None => self.extract_constraints(question).await,
        };

        let results = self
            .searcher
            .search(question, &constraints, language, limit)
            .await?;

        Ok(Reply::Answered(Answer {
            language,
            language_name: language.display_name(),
            detection,
            suggested_activities: suggested_activities(&results),
            follow_up_questions: language.profile().follow_up_questions.to_vec(),
            constraints,
            results,
        }))
    }

    /// Extraction failures degrade to no constraints.
    async fn extract_constraints(&self, question: &str) -> ConstraintSet {
        let Some(nlu) = &self.nlu else {
            return ConstraintSet::default();
        };
        match tokio::time::timeout(self.nlu_timeout, nlu.extract_constraints(question)).await {
            Ok(Ok(constraints)) => constraints,
            Ok(Err(e)) => {
                warn!(error = %e, "constraint extraction failed, searching unfiltered");
                ConstraintSet::default()
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.nlu_timeout.as_millis() as u64,
                    "constraint extraction timed out, searching unfiltered"
                );
                ConstraintSet::default()
            }
        }
    }
}

/// Names of the strongest results, best first.
fn suggested_activities(results: &RankedResultSet) -> Vec<String> {
    results
        .iter()
        .filter(|c| c.score > SUGGESTION_MIN_SCORE)
        .take(MAX_SUGGESTIONS)
        .map(|c| c.candidate.name())
        .collect()
}
