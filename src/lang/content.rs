use super::{ContentMarkers, Language};

/// Checked in this order; the first language with any marker wins.
const PRIORITY: [Language; 5] = [
    Language::Japanese,
    Language::Korean,
    Language::Chinese,
    Language::Vietnamese,
    Language::English,
];

/// Classifies a place description into the language it is written in.
///
/// Japanese is checked before Chinese so kanji-bearing Japanese text is not
/// mistaken for Chinese. Vietnamese diacritics outrank English function words,
/// since Vietnamese descriptions routinely carry English venue names.
/// Returns `None` when no marker of any language is present.
pub fn classify_content(text: &str) -> Option<Language> {
    if text.trim().is_empty() {
        return None;
    }
    let lower = text.to_lowercase();

    PRIORITY
        .into_iter()
        .find(|lang| has_marker(lang.profile().content_markers, &lower))
}

fn has_marker(markers: ContentMarkers, lower: &str) -> bool {
    match markers {
        ContentMarkers::Script(is_marker) => lower.chars().any(is_marker),
        ContentMarkers::Words(words) => lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|w| words.contains(&w)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn japanese_with_kanji_is_not_chinese() {
        assert_eq!(
            classify_content("戦争証跡博物館はホーチミン市の人気スポットです"),
            Some(Language::Japanese)
        );
    }

    #[test]
    fn korean_detected_from_hangul() {
        assert_eq!(
            classify_content("벤탄 시장은 호치민의 대표 시장입니다"),
            Some(Language::Korean)
        );
    }

    #[test]
    fn chinese_detected_from_han() {
        assert_eq!(classify_content("这是胡志明市最古老的寺庙"), Some(Language::Chinese));
    }

    #[test]
    fn english_detected_from_function_words() {
        assert_eq!(
            classify_content("A museum located in District 3 with wartime exhibits"),
            Some(Language::English)
        );
    }

    #[test]
    fn vietnamese_detected_from_diacritics() {
        assert_eq!(
            classify_content("Quán cà phê yên tĩnh ở trung tâm"),
            Some(Language::Vietnamese)
        );
    }

    #[test]
    fn vietnamese_text_naming_an_english_venue_is_vietnamese() {
        assert_eq!(
            classify_content("Quán cà phê The Workshop nằm ở trung tâm Quận 1, không gian yên tĩnh"),
            Some(Language::Vietnamese)
        );
    }

    #[test]
    fn unmarked_text_is_unknown() {
        assert_eq!(classify_content("Landmark 81"), None);
        assert_eq!(classify_content(""), None);
        assert_eq!(classify_content("   "), None);
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "Nhà thờ Đức Bà được xây dựng từ năm 1863";
        assert_eq!(classify_content(text), classify_content(text));
    }
}
