use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::config::RankingConfig;
use crate::lang::Language;
use crate::model::{RankedResultSet, ScoredCandidate};

/// Builds the final result list for a question asked in `query_language`.
///
/// Noise below the similarity floor is dropped. When at least
/// `same_language_quota` results share the question's language only those are
/// returned; otherwise other-language results top the list up to `limit`.
pub fn assemble(
    scored: Vec<ScoredCandidate>,
    query_language: Language,
    limit: usize,
    config: &RankingConfig,
) -> RankedResultSet {
    let mut pool = dedupe(scored);
    pool.retain(|c| c.score >= config.min_similarity);
    pool.sort_by(|a, b| rank_order(a, b, query_language));

    let (mut same, other): (Vec<_>, Vec<_>) = pool
        .into_iter()
        .partition(|c| c.language == Some(query_language));

    let same_count = same.len();
    let mut selected = if same_count >= config.same_language_quota {
        same.truncate(limit);
        same
    } else {
        let room = limit.saturating_sub(same_count);
        same.truncate(limit);
        same.extend(other.into_iter().take(room));
        same
    };
    selected.sort_by(|a, b| rank_order(a, b, query_language));

    debug!(
        same_language = same_count,
        returned = selected.len(),
        language = %query_language,
        "results assembled"
    );
    RankedResultSet::from_ranked(selected)
}

/// Descending score, then same-language first, then id for a stable order.
fn rank_order(a: &ScoredCandidate, b: &ScoredCandidate, language: Language) -> Ordering {
    let native = |c: &ScoredCandidate| c.language == Some(language);
    b.score
        .total_cmp(&a.score)
        .then_with(|| native(b).cmp(&native(a)))
        .then_with(|| a.id().cmp(b.id()))
}

/// Keeps the best-scored entry per id, in first-seen order.
fn dedupe(scored: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    let mut position: HashMap<String, usize> = HashMap::with_capacity(scored.len());
    let mut unique: Vec<ScoredCandidate> = Vec::with_capacity(scored.len());
    for entry in scored {
        match position.get(entry.id()) {
            Some(&i) => {
                if entry.score > unique[i].score {
                    unique[i] = entry;
                }
            }
            None => {
                position.insert(entry.id().to_string(), unique.len());
                unique.push(entry);
            }
        }
    }
    unique
}
