//! Supported languages: one profile table drives detection, content classification,
//! and localized strings.

pub mod content;
pub mod detect;

use serde::{Deserialize, Serialize};

pub use content::classify_content;
pub use detect::{Detection, DetectionMethod, detect};

/// Languages a question can be answered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Vietnamese,
    English,
    Chinese,
    Korean,
    Japanese,
}

/// How a language's content can be recognized in a place description.
#[derive(Clone, Copy)]
pub enum ContentMarkers {
    /// Any character accepted by the predicate.
    Script(fn(char) -> bool),
    /// Any of these whole lowercase words.
    Words(&'static [&'static str]),
}

pub struct LanguageProfile {
    pub code: &'static str,
    pub name: &'static str,
    pub display_name: &'static str,
    /// Lowercase words that vote for this language during detection.
    pub keywords: &'static [&'static str],
    /// Characters that vote for this language, one vote per character.
    pub script: Option<fn(char) -> bool>,
    pub content_markers: ContentMarkers,
    pub follow_up_questions: [&'static str; 4],
}

/// Reply used when the question's language is outside the supported set.
pub const UNSUPPORTED_MESSAGE: &str = "Sorry, this language is not supported. Please use Vietnamese, English, Chinese, Korean, or Japanese.";

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Vietnamese,
        Language::English,
        Language::Chinese,
        Language::Korean,
        Language::Japanese,
    ];

    /// The language of the place catalogue; used when nothing else is conclusive.
    pub const DEFAULT: Language = Language::Vietnamese;

    pub fn profile(self) -> &'static LanguageProfile {
        &PROFILES[self.index()]
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Language::Vietnamese => 0,
            Language::English => 1,
            Language::Chinese => 2,
            Language::Korean => 3,
            Language::Japanese => 4,
        }
    }

    pub fn code(self) -> &'static str {
        self.profile().code
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }

    pub fn display_name(self) -> &'static str {
        self.profile().display_name
    }

    /// Accepts full names (`"korean"`) and ISO 639-1 codes (`"ko"`), case-insensitive.
    pub fn from_name(s: &str) -> Option<Language> {
        let s = s.trim();
        Language::ALL.into_iter().find(|lang| {
            let p = lang.profile();
            s.eq_ignore_ascii_case(p.name) || s.eq_ignore_ascii_case(p.code)
        })
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) fn is_vietnamese_char(c: char) -> bool {
    matches!(
        c,
        'à' | 'á' | 'ạ' | 'ả' | 'ã' | 'â' | 'ầ' | 'ấ' | 'ậ' | 'ẩ' | 'ẫ' | 'ă' | 'ằ' | 'ắ'
            | 'ặ' | 'ẳ' | 'ẵ' | 'è' | 'é' | 'ẹ' | 'ẻ' | 'ẽ' | 'ê' | 'ề' | 'ế' | 'ệ' | 'ể'
            | 'ễ' | 'ì' | 'í' | 'ị' | 'ỉ' | 'ĩ' | 'ò' | 'ó' | 'ọ' | 'ỏ' | 'õ' | 'ô' | 'ồ'
            | 'ố' | 'ộ' | 'ổ' | 'ỗ' | 'ơ' | 'ờ' | 'ớ' | 'ợ' | 'ở' | 'ỡ' | 'ù' | 'ú' | 'ụ'
            | 'ủ' | 'ũ' | 'ư' | 'ừ' | 'ứ' | 'ự' | 'ử' | 'ữ' | 'ỳ' | 'ý' | 'ỵ' | 'ỷ' | 'ỹ'
            | 'đ'
    )
}

pub(crate) fn is_han(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}')
}

pub(crate) fn is_kana(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}')
}

pub(crate) fn is_hangul(c: char) -> bool {
    matches!(c,
        '\u{AC00}'..='\u{D7AF}' |
        '\u{1100}'..='\u{11FF}' |
        '\u{3130}'..='\u{318F}' |
        '\u{A960}'..='\u{A97F}' |
        '\u{D7B0}'..='\u{D7FF}'
    )
}

static PROFILES: [LanguageProfile; 5] = [
    LanguageProfile {
        code: "vi",
        name: "vietnamese",
        display_name: "Tiếng Việt",
        keywords: &[
            "tôi", "bạn", "của", "và", "là", "có", "không", "được", "cho", "với", "này", "đó",
            "đây", "nào", "sao", "bao", "giờ", "đâu", "ai", "gì", "nhiều", "ở", "quán", "chơi",
            "tìm", "muốn", "gần", "đẹp", "ngon", "quận",
        ],
        script: Some(is_vietnamese_char),
        content_markers: ContentMarkers::Script(is_vietnamese_char),
        follow_up_questions: [
            "Bạn có muốn biết thêm về địa điểm nào cụ thể không?",
            "Bạn có quan tâm đến ẩm thực địa phương không?",
            "Bạn muốn tìm hiểu về lịch sử và văn hóa TP.HCM không?",
            "Bạn có cần gợi ý về phương tiện di chuyển không?",
        ],
    },
    LanguageProfile {
        code: "en",
        name: "english",
        display_name: "English",
        keywords: &[
            "i", "you", "he", "she", "it", "they", "the", "is", "are", "was", "were", "have",
            "has", "and", "or", "but", "this", "that", "what", "why", "how", "many", "who",
            "where", "when", "good", "best", "near", "find", "want", "visit", "place", "places",
        ],
        script: None,
        content_markers: ContentMarkers::Words(&[
            "the", "and", "is", "are", "of", "with", "for", "this", "that", "from", "located",
            "was",
        ]),
        follow_up_questions: [
            "Would you like to know more about any specific place?",
            "Are you interested in local cuisine?",
            "Do you want to learn about Ho Chi Minh City's history and culture?",
            "Do you need suggestions for transportation?",
        ],
    },
    LanguageProfile {
        code: "zh",
        name: "chinese",
        display_name: "中文",
        keywords: &[],
        script: Some(is_han),
        content_markers: ContentMarkers::Script(is_han),
        follow_up_questions: [
            "您想了解某个特定地方的更多信息吗？",
            "您对当地美食感兴趣吗？",
            "您想了解胡志明市的历史和文化吗？",
            "您需要交通建议吗？",
        ],
    },
    LanguageProfile {
        code: "ko",
        name: "korean",
        display_name: "한국어",
        keywords: &[],
        script: Some(is_hangul),
        content_markers: ContentMarkers::Script(is_hangul),
        follow_up_questions: [
            "특정 장소에 대해 더 알고 싶으신가요?",
            "현지 요리에 관심이 있으신가요?",
            "호치민시의 역사와 문화에 대해 알고 싶으신가요?",
            "교통편에 대한 제안이 필요하신가요?",
        ],
    },
    LanguageProfile {
        code: "ja",
        name: "japanese",
        display_name: "日本語",
        keywords: &[],
        script: Some(is_kana),
        content_markers: ContentMarkers::Script(is_kana),
        follow_up_questions: [
            "特定の場所についてもっと詳しく知りたいですか？",
            "地元の料理に興味がありますか？",
            "ホーチミン市の歴史と文化について知りたいですか？",
            "交通手段についての提案が必要ですか？",
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_table_is_indexed_by_variant() {
        for lang in Language::ALL {
            assert_eq!(Language::from_name(lang.name()), Some(lang));
            assert_eq!(Language::from_name(lang.code()), Some(lang));
        }
    }

    #[test]
    fn from_name_is_case_insensitive() {
        assert_eq!(Language::from_name(" Korean "), Some(Language::Korean));
        assert_eq!(Language::from_name("JA"), Some(Language::Japanese));
        assert_eq!(Language::from_name("french"), None);
        assert_eq!(Language::from_name("unsupported"), None);
    }

    #[test]
    fn serializes_lowercase_name() {
        let json = serde_json::to_string(&Language::Vietnamese).unwrap();
        assert_eq!(json, "\"vietnamese\"");
    }

    #[test]
    fn script_predicates() {
        assert!(is_hangul('한'));
        assert!(is_kana('の'));
        assert!(is_kana('カ'));
        assert!(is_han('館'));
        assert!(is_vietnamese_char('ư'));
        assert!(!is_vietnamese_char('e'));
    }
}
