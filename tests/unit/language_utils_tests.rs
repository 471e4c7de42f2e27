/*!
 * Tests for ISO language code utilities
 */

use code_translator::language_utils::{
    LanguageCodeType, get_language_name, language_codes_match, normalize_to_part2t, validate_language_code,
};

#[test]
fn test_validate_language_code_shouldClassifyCodes() {
    assert!(matches!(validate_language_code("zh").unwrap(), LanguageCodeType::Part1));
    assert!(matches!(validate_language_code("zho").unwrap(), LanguageCodeType::Part2T));
    assert!(matches!(validate_language_code("chi").unwrap(), LanguageCodeType::Part2B));
    assert!(matches!(validate_language_code("Japanese").unwrap(), LanguageCodeType::Name));
    assert!(validate_language_code("qq").is_err());
}

#[test]
fn test_normalize_to_part2t_shouldMapAllForms() {
    assert_eq!(normalize_to_part2t("ko").unwrap(), "kor");
    assert_eq!(normalize_to_part2t("FRE").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("german").unwrap(), "deu");
}

#[test]
fn test_language_codes_match_shouldCompareAcrossForms() {
    assert!(language_codes_match("zh", "chi"));
    assert!(language_codes_match("ja", "Japanese"));
    assert!(!language_codes_match("zh", "ja"));
    assert!(!language_codes_match("zh", "invalid"));
}

#[test]
fn test_get_language_name_withUnknownCode_shouldFail() {
    assert!(get_language_name("zz").is_err());
}
