//! Word shape classification.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Prefix and suffix lengths for affix features.
///
/// Lengths `begin + 1 ..= end` are emitted, clamped to the word length, so the
/// default produces prefixes of 1 to 3 and suffixes of 1 to 4 characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffixRange {
    pub pref_begin: usize,
    pub pref_end: usize,
    pub suf_begin: usize,
    pub suf_end: usize,
}

impl Default for AffixRange {
    fn default() -> Self {
        Self {
            pref_begin: 0,
            pref_end: 3,
            suf_begin: 0,
            suf_end: 4,
        }
    }
}

impl AffixRange {
    pub fn prefixes<'a>(&self, word: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let chars: Vec<usize> = char_boundaries(word);
        let n = chars.len() - 1;
        (self.pref_begin..self.pref_end).map(move |li| &word[..chars[(li + 1).min(n)]])
    }

    pub fn suffixes<'a>(&self, word: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let chars: Vec<usize> = char_boundaries(word);
        let n = chars.len() - 1;
        (self.suf_begin..self.suf_end).map(move |li| &word[chars[n.saturating_sub(li + 1)]..])
    }
}

/// Byte offsets of every char boundary, including the end of the string.
fn char_boundaries(word: &str) -> Vec<usize> {
    word.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(word.len()))
        .collect()
}

/// Compiled word shape patterns, built once per context generator.
#[derive(Debug, Clone)]
pub struct WordShape {
    has_cap: Regex,
    has_digit: Regex,
    all_lower: Regex,
    all_caps: Regex,
    initial_cap: Regex,
    all_digits: Regex,
    has_letter: Regex,
}

impl WordShape {
    /// # Errors
    ///
    /// Returns `KotobaError::RegexError` if a pattern fails to compile
    /// (should never happen with the static patterns defined here).
    pub fn new() -> Result<Self> {
        Ok(Self {
            has_cap: Regex::new(r"\p{Lu}")?,
            has_digit: Regex::new(r"\p{Nd}")?,
            all_lower: Regex::new(r"^\p{Ll}+$")?,
            all_caps: Regex::new(r"^\p{Lu}+$")?,
            initial_cap: Regex::new(r"^\p{Lu}")?,
            all_digits: Regex::new(r"^\p{Nd}+$")?,
            has_letter: Regex::new(r"\p{L}")?,
        })
    }

    pub fn has_hyphen(&self, word: &str) -> bool {
        word.contains('-')
    }

    pub fn has_cap(&self, word: &str) -> bool {
        self.has_cap.is_match(word)
    }

    pub fn has_digit(&self, word: &str) -> bool {
        self.has_digit.is_match(word)
    }

    /// Coarse token class used by the class-based generators.
    pub fn token_class(&self, word: &str) -> &'static str {
        if self.all_lower.is_match(word) {
            "lc"
        } else if self.all_digits.is_match(word) {
            match word.chars().count() {
                2 => "2d",
                4 => "4d",
                _ => "num",
            }
        } else if self.has_digit(word) {
            if self.has_letter.is_match(word) {
                "an"
            } else if word.contains('-') {
                "dd"
            } else if word.contains('/') {
                "ds"
            } else if word.contains(',') {
                "dc"
            } else if word.contains('.') {
                "dp"
            } else {
                "num"
            }
        } else if self.all_caps.is_match(word) {
            if word.chars().count() == 1 { "sc" } else { "ac" }
        } else if self.initial_cap.is_match(word) {
            "ic"
        } else {
            "other"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_classes() {
        let shape = WordShape::new().unwrap();
        let cases = [
            ("dog", "lc"),
            ("42", "2d"),
            ("1999", "4d"),
            ("123", "num"),
            ("A4", "an"),
            ("12-31", "dd"),
            ("1/2", "ds"),
            ("1,000", "dc"),
            ("3.14", "dp"),
            ("I", "sc"),
            ("NASA", "ac"),
            ("London", "ic"),
            ("...", "other"),
        ];
        for (word, class) in cases {
            assert_eq!(shape.token_class(word), class, "{word}");
        }
    }

    #[test]
    fn character_flags() {
        let shape = WordShape::new().unwrap();
        assert!(shape.has_cap("iPhone"));
        assert!(!shape.has_cap("phone"));
        assert!(shape.has_digit("b2b"));
        assert!(shape.has_hyphen("well-known"));
    }

    #[test]
    fn affixes_are_clamped() {
        let range = AffixRange::default();
        let prefixes: Vec<_> = range.prefixes("ab").collect();
        assert_eq!(prefixes, vec!["a", "ab", "ab"]);
        let suffixes: Vec<_> = range.suffixes("walks").collect();
        assert_eq!(suffixes, vec!["s", "ks", "lks", "alks"]);
    }

    #[test]
    fn affixes_respect_char_boundaries() {
        let range = AffixRange::default();
        let suffixes: Vec<_> = range.suffixes("café").collect();
        assert_eq!(suffixes[0], "é");
        let prefixes: Vec<_> = range.prefixes("ñu").collect();
        assert_eq!(prefixes[0], "ñ");
    }
}
