//! Language code utilities.

/// ISO 639-2 codes (bibliographic form) and their display names.
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("eng", "English"),
    ("spa", "Spanish"),
    ("ger", "German"),
    ("fre", "French"),
    ("ita", "Italian"),
    ("por", "Portuguese"),
    ("rus", "Russian"),
    ("jpn", "Japanese"),
    ("kor", "Korean"),
    ("chi", "Chinese"),
    ("ara", "Arabic"),
    ("hin", "Hindi"),
    ("tur", "Turkish"),
    ("dut", "Dutch"),
    ("tha", "Thai"),
    ("vie", "Vietnamese"),
    ("pol", "Polish"),
    ("swe", "Swedish"),
    ("dan", "Danish"),
    ("nor", "Norwegian"),
    ("fin", "Finnish"),
    ("gre", "Greek"),
    ("heb", "Hebrew"),
    ("cze", "Czech"),
    ("hun", "Hungarian"),
    ("rum", "Romanian"),
    ("bul", "Bulgarian"),
    ("ukr", "Ukrainian"),
    ("mar", "Marathi"),
    ("per", "Persian"),
    ("urd", "Urdu"),
    ("ind", "Indonesian"),
    ("may", "Malay"),
    ("kan", "Kannada"),
    ("tam", "Tamil"),
    ("tel", "Telugu"),
    ("guj", "Gujarati"),
    ("mal", "Malayalam"),
    ("pan", "Punjabi"),
    ("ben", "Bengali"),
    ("srp", "Serbian"),
    ("slo", "Slovak"),
    ("slv", "Slovenian"),
    ("hrv", "Croatian"),
    ("cat", "Catalan"),
    ("lit", "Lithuanian"),
    ("lav", "Latvian"),
    ("est", "Estonian"),
    ("glg", "Galician"),
    ("nep", "Nepali"),
    ("fil", "Filipino"),
    ("ice", "Icelandic"),
];

/// Terminology codes, legacy codes and ISO 639-1 codes mapped to the table above.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("deu", "ger"),
    ("fra", "fre"),
    ("zho", "chi"),
    ("nld", "dut"),
    ("ell", "gre"),
    ("ces", "cze"),
    ("ron", "rum"),
    ("rou", "rum"),
    ("fas", "per"),
    ("msa", "may"),
    ("slk", "slo"),
    ("isl", "ice"),
    ("nob", "nor"),
    ("nno", "nor"),
    ("en", "eng"),
    ("es", "spa"),
    ("de", "ger"),
    ("fr", "fre"),
    ("it", "ita"),
    ("pt", "por"),
    ("ru", "rus"),
    ("ja", "jpn"),
    ("ko", "kor"),
    ("zh", "chi"),
    ("ar", "ara"),
    ("hi", "hin"),
    ("tr", "tur"),
    ("nl", "dut"),
    ("th", "tha"),
    ("vi", "vie"),
    ("pl", "pol"),
    ("sv", "swe"),
    ("da", "dan"),
    ("no", "nor"),
    ("nb", "nor"),
    ("fi", "fin"),
    ("el", "gre"),
    ("he", "heb"),
    ("cs", "cze"),
    ("hu", "hun"),
    ("ro", "rum"),
    ("bg", "bul"),
    ("uk", "ukr"),
    ("fa", "per"),
    ("id", "ind"),
    ("ms", "may"),
    ("sk", "slo"),
    ("sl", "slv"),
    ("hr", "hrv"),
    ("sr", "srp"),
];

/// Code for undetermined language.
pub const UNDETERMINED: &str = "und";

/// Normalize a language code so equivalent spellings compare equal.
///
/// Lowercases, strips region subtags (`en-US` -> `en`) and maps aliases to the
/// bibliographic ISO 639-2 code. Empty input becomes `und`.
pub fn canonical_language(code: &str) -> String {
    let code = code.trim().to_lowercase();
    let primary = code.split(['-', '_']).next().unwrap_or_default();

    if primary.is_empty() {
        return UNDETERMINED.to_string();
    }

    LANGUAGE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == primary)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| primary.to_string())
}

/// Display name for a language code (`eng` -> `English`).
///
/// Unknown codes are returned uppercased; `und` becomes `Unknown`.
pub fn language_name(code: &str) -> String {
    let canonical = canonical_language(code);
    if canonical == UNDETERMINED {
        return "Unknown".to_string();
    }

    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| *c == canonical)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| canonical.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_language() {
        assert_eq!(canonical_language("eng"), "eng");
        assert_eq!(canonical_language("ENG"), "eng");
        assert_eq!(canonical_language("deu"), "ger");
        assert_eq!(canonical_language("en-US"), "eng");
        assert_eq!(canonical_language("pt_BR"), "por");
        assert_eq!(canonical_language(""), "und");
        assert_eq!(canonical_language("xyz"), "xyz");
    }

    #[test]
    fn test_language_name() {
        assert_eq!(language_name("eng"), "English");
        assert_eq!(language_name("fra"), "French");
        assert_eq!(language_name("und"), "Unknown");
        assert_eq!(language_name("xyz"), "XYZ");
    }
}
