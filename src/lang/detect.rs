use std::time::Duration;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use super::{Language, is_han, is_kana};
use crate::nlu::{LanguageOracle, LanguageVerdict, NluError};

/// Minimum votes before the keyword heuristic is trusted.
const HEURISTIC_MIN_VOTES: usize = 2;
const HEURISTIC_CONFIDENCE: f32 = 0.8;
const FALLBACK_CONFIDENCE: f32 = 0.5;

/// Script checks used when the language oracle is unavailable, most distinctive first.
const FALLBACK_ORDER: [Language; 4] = [
    Language::Korean,
    Language::Japanese,
    Language::Chinese,
    Language::Vietnamese,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMethod {
    Heuristic,
    External,
    ScriptFallback(Language),
    DefaultFallback,
}

impl DetectionMethod {
    pub fn label(self) -> String {
        match self {
            DetectionMethod::Heuristic => "heuristic".to_string(),
            DetectionMethod::External => "external".to_string(),
            DetectionMethod::ScriptFallback(lang) => format!("{}_chars_fallback", lang.name()),
            DetectionMethod::DefaultFallback => "default_fallback".to_string(),
        }
    }
}

impl Serialize for DetectionMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

/// Detected language of a question. `language` is `None` when the question is
/// in a language outside the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    #[serde(serialize_with = "language_or_unsupported")]
    pub language: Option<Language>,
    pub confidence: f32,
    pub method: DetectionMethod,
}

impl Detection {
    pub fn is_supported(&self) -> bool {
        self.language.is_some()
    }

    fn default_fallback() -> Self {
        Self {
            language: Some(Language::DEFAULT),
            confidence: FALLBACK_CONFIDENCE,
            method: DetectionMethod::DefaultFallback,
        }
    }
}

fn language_or_unsupported<S: Serializer>(
    language: &Option<Language>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(language.map_or("unsupported", Language::name))
}

/// Detects the language of `text`.
///
/// Tries the keyword heuristic first and only consults `oracle` when it is
/// inconclusive. Oracle failures never surface: a malformed reply yields an
/// unsupported verdict with zero confidence, while transport errors and
/// timeouts fall back to script detection.
pub async fn detect<O: LanguageOracle>(
    text: &str,
    oracle: Option<&O>,
    timeout: Duration,
) -> Detection {
    if text.trim().is_empty() {
        return Detection::default_fallback();
    }

    if let Some(language) = heuristic(text) {
        debug!(%language, "language detected by heuristic");
        return Detection {
            language: Some(language),
            confidence: HEURISTIC_CONFIDENCE,
            method: DetectionMethod::Heuristic,
        };
    }

    let Some(oracle) = oracle else {
        debug!("heuristic inconclusive and no language oracle configured");
        return script_fallback(text);
    };

    match tokio::time::timeout(timeout, oracle.identify_language(text)).await {
        Ok(Ok(verdict)) => from_verdict(&verdict),
        Ok(Err(NluError::MalformedReply(reason))) => {
            warn!(%reason, "language oracle reply unusable, treating as unsupported");
            Detection {
                language: None,
                confidence: 0.0,
                method: DetectionMethod::External,
            }
        }
        Ok(Err(e)) => {
            warn!(error = %e, "language oracle failed, using script fallback");
            script_fallback(text)
        }
        Err(_) => {
            warn!(
                timeout_ms = timeout.as_millis() as u64,
                "language oracle timed out, using script fallback"
            );
            script_fallback(text)
        }
    }
}

fn from_verdict(verdict: &LanguageVerdict) -> Detection {
    let language = Language::from_name(&verdict.language);
    if language.is_some() != verdict.supported {
        debug!(
            language = %verdict.language,
            supported = verdict.supported,
            "oracle support flag disagrees with language name"
        );
    }
    Detection {
        language,
        confidence: if verdict.confidence.is_finite() {
            verdict.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        },
        method: DetectionMethod::External,
    }
}

/// Returns the language with at least two votes and strictly more than any other.
fn heuristic(text: &str) -> Option<Language> {
    let votes = tally(text);
    let (best, &top) = votes.iter().enumerate().max_by_key(|(_, v)| **v)?;
    let unique = votes.iter().filter(|&&v| v == top).count() == 1;

    (top >= HEURISTIC_MIN_VOTES && unique).then(|| Language::ALL[best])
}

fn tally(text: &str) -> [usize; 5] {
    let lower = text.to_lowercase();
    let mut votes = [0usize; 5];

    for word in lower.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        for lang in Language::ALL {
            if lang.profile().keywords.contains(&word) {
                votes[lang.index()] += 1;
            }
        }
    }

    for c in lower.chars() {
        for lang in Language::ALL {
            if lang.profile().script.is_some_and(|is_script| is_script(c)) {
                votes[lang.index()] += 1;
            }
        }
    }

    // Kanji is shared with Chinese; it only counts as Japanese alongside kana.
    if lower.chars().any(is_kana) {
        votes[Language::Japanese.index()] += lower.chars().filter(|&c| is_han(c)).count();
    }

    votes
}

fn script_fallback(text: &str) -> Detection {
    let lower = text.to_lowercase();
    FALLBACK_ORDER
        .into_iter()
        .find(|lang| {
            lang.profile()
                .script
                .is_some_and(|is_script| lower.chars().any(is_script))
        })
        .map_or_else(Detection::default_fallback, |lang| Detection {
            language: Some(lang),
            confidence: FALLBACK_CONFIDENCE,
            method: DetectionMethod::ScriptFallback(lang),
        })
}
