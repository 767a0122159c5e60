use serde::de::DeserializeOwned;
use tracing::warn;

use super::NluError;
use super::types::{GenerateContentResponse, LanguageVerdict};
use crate::model::ConstraintSet;

/// First non-empty text part of the first candidate.
pub fn extract_text(response: &GenerateContentResponse) -> Option<String> {
    let text = response
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|c| c.content.as_ref())
        .and_then(|content| content.parts.first())
        .map(|part| part.text.trim().to_string())
        .filter(|text| !text.is_empty());

    if text.is_none() {
        warn!("Gemini returned empty reply (safety filter or empty response)");
    }
    text
}

pub fn parse_verdict(text: &str) -> Result<LanguageVerdict, NluError> {
    parse_json(text)
}

pub fn parse_constraints(text: &str) -> Result<ConstraintSet, NluError> {
    parse_json::<ConstraintSet>(text).map(ConstraintSet::cleaned)
}

fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, NluError> {
    serde_json::from_str(strip_code_fence(text)).map_err(|e| {
        let snippet = &text[..text.floor_char_boundary(120)];
        NluError::MalformedReply(format!("{e}: {snippet}"))
    })
}

/// Models sometimes wrap JSON in a Markdown fence even when asked not to.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlu::types::{Content, ResponseCandidate};

    fn make_response(text: &str) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: Some(vec![ResponseCandidate {
                content: Some(Content::text(text, Some("model"))),
            }]),
            error: None,
        }
    }

    #[test]
    fn extracts_reply_text() {
        let response = make_response("  {\"language\": \"korean\"}  ");
        assert_eq!(
            extract_text(&response).as_deref(),
            Some("{\"language\": \"korean\"}")
        );
    }

    #[test]
    fn missing_candidates_yield_none() {
        let response = GenerateContentResponse {
            candidates: None,
            error: None,
        };
        assert!(extract_text(&response).is_none());
        assert!(extract_text(&make_response("   ")).is_none());
    }

    #[test]
    fn parses_verdict_with_alias() {
        let verdict =
            parse_verdict(r#"{"language": "Japanese", "confidence": 0.93, "is_supported": true}"#)
                .unwrap();
        assert_eq!(verdict.language, "Japanese");
        assert!(verdict.supported);
        assert!((verdict.confidence - 0.93).abs() < f32::EPSILON);
    }

    #[test]
    fn parses_fenced_json() {
        let verdict =
            parse_verdict("```json\n{\"language\": \"english\", \"confidence\": 0.9}\n```").unwrap();
        assert_eq!(verdict.language, "english");
        assert!(!verdict.supported);
    }

    #[test]
    fn prose_reply_is_malformed() {
        let err = parse_verdict("The text is Vietnamese.").unwrap_err();
        assert!(matches!(err, NluError::MalformedReply(_)));
    }

    #[test]
    fn parses_constraints_and_drops_blanks() {
        let set = parse_constraints(
            r#"{"place_type": "Bảo tàng", "region": "", "keywords": ["cổ kính"], "price_tier": null}"#,
        )
        .unwrap();
        assert_eq!(set.place_type.as_deref(), Some("Bảo tàng"));
        assert_eq!(set.region, None);
        assert_eq!(set.keywords, vec!["cổ kính"]);
        assert_eq!(set.criteria_count(), 2);
    }
}
