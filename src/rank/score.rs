use crate::config::FieldWeights;
use crate::model::{Candidate, Field};

/// Lowercased, punctuation-trimmed, de-duplicated words of a question.
pub fn query_words(question: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for raw in question.to_lowercase().split_whitespace() {
        let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
        if !word.is_empty() && !words.iter().any(|w| w == word) {
            words.push(word.to_string());
        }
    }
    words
}

/// Maps a vector distance onto [0.3, 1.0].
///
/// The logistic sigmoid is rescaled to reach 1 at distance 0, then raised to
/// 1.5 so close matches spread further apart than distant ones.
pub fn base_similarity(distance: f32) -> f32 {
    let d = if distance.is_nan() {
        f64::INFINITY
    } else {
        f64::from(distance.max(0.0))
    };
    let sigmoid = 2.0 / (1.0 + d.exp());
    (0.3 + 0.7 * sigmoid.powf(1.5)) as f32
}

/// Similarity of a candidate to the question, within [0, 1].
///
/// Adds each field's weight when any query word occurs in that field.
pub fn score(distance: f32, query_words: &[String], candidate: &Candidate, weights: &FieldWeights) -> f32 {
    let mut score = base_similarity(distance);
    if query_words.is_empty() {
        return score;
    }

    let boosted = [
        (Field::Keywords, weights.keywords),
        (Field::PlaceType, weights.place_type),
        (Field::Region, weights.region),
        (Field::Address, weights.address),
    ];
    for (field, weight) in boosted {
        let value = candidate.normalized(field);
        if !value.is_empty() && query_words.iter().any(|w| value.contains(w.as_str())) {
            score += weight;
        }
    }

    score.min(1.0)
}
