/*!
 * Script detection for translation candidates.
 *
 * A span becomes a translation candidate only when it contains at least one
 * character from the configured scripts. The default set covers Chinese,
 * Japanese and Korean text.
 */

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

const HAN: &[RangeInclusive<char>] = &['\u{4E00}'..='\u{9FFF}', '\u{3400}'..='\u{4DBF}'];
const KANA: &[RangeInclusive<char>] = &['\u{3040}'..='\u{30FF}'];
const HANGUL: &[RangeInclusive<char>] = &['\u{AC00}'..='\u{D7AF}'];
const CYRILLIC: &[RangeInclusive<char>] = &['\u{0400}'..='\u{04FF}'];
const GREEK: &[RangeInclusive<char>] = &['\u{0370}'..='\u{03FF}'];
const ARABIC: &[RangeInclusive<char>] = &['\u{0600}'..='\u{06FF}'];
const HEBREW: &[RangeInclusive<char>] = &['\u{0590}'..='\u{05FF}'];
const THAI: &[RangeInclusive<char>] = &['\u{0E00}'..='\u{0E7F}'];
const DEVANAGARI: &[RangeInclusive<char>] = &['\u{0900}'..='\u{097F}'];

/// A writing system recognised as foreign text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    /// CJK unified ideographs
    Han,
    /// Japanese Hiragana and Katakana
    Kana,
    /// Korean Hangul syllables
    Hangul,
    Cyrillic,
    Greek,
    Arabic,
    Hebrew,
    Thai,
    Devanagari,
}

impl Script {
    /// Unicode ranges covered by this script
    pub fn ranges(&self) -> &'static [RangeInclusive<char>] {
        match self {
            Self::Han => HAN,
            Self::Kana => KANA,
            Self::Hangul => HANGUL,
            Self::Cyrillic => CYRILLIC,
            Self::Greek => GREEK,
            Self::Arabic => ARABIC,
            Self::Hebrew => HEBREW,
            Self::Thai => THAI,
            Self::Devanagari => DEVANAGARI,
        }
    }

    /// Scripts enabled when nothing is configured
    pub fn defaults() -> Vec<Script> {
        vec![Self::Han, Self::Kana, Self::Hangul]
    }
}

/// Decides whether a text fragment contains foreign-script characters
#[derive(Debug, Clone)]
pub struct ScriptPredicate {
    ranges: Vec<RangeInclusive<char>>,
}

impl ScriptPredicate {
    /// Build a predicate from a set of scripts
    pub fn new(scripts: &[Script]) -> Self {
        let ranges = scripts
            .iter()
            .flat_map(|script| script.ranges().iter().cloned())
            .collect();
        Self { ranges }
    }

    /// True iff any character of `text` falls in one of the configured ranges.
    /// Empty and whitespace-only text is never foreign.
    pub fn is_foreign_script(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        text.chars()
            .any(|c| self.ranges.iter().any(|range| range.contains(&c)))
    }
}

impl Default for ScriptPredicate {
    fn default() -> Self {
        Self::new(&Script::defaults())
    }
}
