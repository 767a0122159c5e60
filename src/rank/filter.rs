use tracing::debug;

use crate::config::RankingConfig;
use crate::model::{Candidate, ConstraintSet, Field, ScoredCandidate};

const PLACE_TYPE_FIELDS: &[Field] = &[Field::PlaceType, Field::Category];
const REGION_FIELDS: &[Field] = &[Field::Region, Field::Address];
const KEYWORD_FIELDS: &[Field] = &[Field::Keywords, Field::Tags, Field::Description, Field::Name];
const PRICE_FIELDS: &[Field] = &[Field::Price];

/// Keeps candidates that satisfy enough of `constraints` and boosts them by
/// how well they match. Order is preserved; no constraints means no change.
pub fn filter(
    scored: Vec<ScoredCandidate>,
    constraints: &ConstraintSet,
    config: &RankingConfig,
) -> Vec<ScoredCandidate> {
    if constraints.is_empty() {
        return scored;
    }

    let before = scored.len();
    let kept: Vec<ScoredCandidate> = scored
        .into_iter()
        .filter_map(|mut entry| {
            let ratio = match_ratio(&entry.candidate, constraints, config);
            if ratio < config.acceptance_ratio {
                return None;
            }
            entry.score = (entry.score + ratio * config.filter_boost).min(1.0);
            Some(entry)
        })
        .collect();

    debug!(before, after = kept.len(), "constraint filter applied");
    kept
}

/// Share of constraint credit earned by `candidate`, in [0, 1].
pub fn match_ratio(candidate: &Candidate, constraints: &ConstraintSet, config: &RankingConfig) -> f32 {
    let partial = config.partial_match_credit;
    let mut criteria = 0usize;
    let mut credit = 0.0f32;

    if let Some(place_type) = &constraints.place_type {
        criteria += 1;
        credit += best_match(place_type, candidate, PLACE_TYPE_FIELDS, partial);
    }

    if let Some(region) = &constraints.region {
        criteria += 1;
        credit += if config.is_generic_region(region) {
            config.generic_region_credit
        } else {
            best_match(region, candidate, REGION_FIELDS, partial)
        };
    }

    if !constraints.keywords.is_empty() {
        criteria += 1;
        credit += constraints
            .keywords
            .iter()
            .map(|k| best_match(k, candidate, KEYWORD_FIELDS, partial))
            .fold(0.0, f32::max);
    }

    if let Some(price) = &constraints.price_tier {
        criteria += 1;
        credit += best_match(price, candidate, PRICE_FIELDS, partial);
    }

    if criteria == 0 {
        return 1.0;
    }
    credit / criteria as f32
}

fn best_match(wanted: &str, candidate: &Candidate, fields: &[Field], partial: f32) -> f32 {
    let wanted = wanted.trim().to_lowercase();
    fields
        .iter()
        .map(|&field| field_match(&wanted, &candidate.normalized(field), partial))
        .fold(0.0, f32::max)
}

/// 1.0 for containment either way, `partial` for a shared word, else 0.
fn field_match(wanted: &str, value: &str, partial: f32) -> f32 {
    if wanted.is_empty() || value.is_empty() {
        return 0.0;
    }
    if value.contains(wanted) || wanted.contains(value) {
        return 1.0;
    }
    let shares_token = tokens(wanted).any(|w| tokens(value).any(|v| v == w));
    if shares_token { partial } else { 0.0 }
}

fn tokens(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty())
}
