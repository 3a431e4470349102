//! # Head Rules
//!
//! Deterministic head-child selection for constituents. A rule table maps a
//! parent label to an ordered list of entries, each a scan direction and a
//! priority list of child labels:
//!
//! 1. the first entry with a label matching any child wins;
//! 2. within it, the labels are tried in priority order and, for the first
//!    label present, the children are scanned in the entry's direction;
//! 3. without a matching entry, the first child in the table's default
//!    direction is the head.
//!
//! Two rule formats exist, one per supported grammar: Penn Treebank for
//! English and Ancora for Spanish.

mod ancora;
mod penn;

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{KotobaError, Result};

const EN_HEAD_RULES: &str = include_str!("../../resources/en-head-rules.txt");
const ES_HEAD_RULES: &str = include_str!("../../resources/es-head-rules.txt");

/// Languages with a head rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// English, Penn Treebank grammar.
    En,
    /// Spanish, Ancora grammar.
    Es,
}

impl FromStr for Language {
    type Err = KotobaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "es" => Ok(Self::Es),
            _ => Err(KotobaError::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::En => write!(f, "en"),
            Self::Es => write!(f, "es"),
        }
    }
}

/// Direction in which children are scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

/// A child label in a priority list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelPattern {
    /// Matches the label exactly.
    Exact(String),
    /// Matches any label starting with the prefix (written `prefix*`).
    Prefix(String),
}

impl LabelPattern {
    /// Parse a rule label; a trailing `*` makes it a prefix pattern.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_suffix('*') {
            Some(prefix) => Self::Prefix(prefix.to_string()),
            None => Self::Exact(raw.to_string()),
        }
    }

    pub fn matches(&self, label: &str) -> bool {
        match self {
            Self::Exact(exact) => exact == label,
            Self::Prefix(prefix) => label.starts_with(prefix.as_str()),
        }
    }
}

/// One entry of a parent's rule list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadRuleEntry {
    pub direction: Direction,
    pub labels: Vec<LabelPattern>,
}

impl HeadRuleEntry {
    /// Find the head among `children` according to this entry alone.
    pub fn find<S: AsRef<str>>(&self, children: &[S]) -> Option<usize> {
        self.labels.iter().find_map(|pattern| {
            let is_match = |child: &S| pattern.matches(child.as_ref());
            match self.direction {
                Direction::LeftToRight => children.iter().position(is_match),
                Direction::RightToLeft => children.iter().rposition(is_match),
            }
        })
    }
}

/// A language's head rule table. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadRules {
    language: Language,
    rules: HashMap<String, Vec<HeadRuleEntry>>,
    default_direction: Direction,
    punctuation: Vec<LabelPattern>,
}

impl HeadRules {
    /// Load the rule table shipped with the crate for `language`.
    pub fn builtin(language: Language) -> Result<Self> {
        match language {
            Language::En => Self::parse(language, EN_HEAD_RULES),
            Language::Es => Self::parse(language, ES_HEAD_RULES),
        }
    }

    /// Load a rule table for a language code such as `"en"`.
    ///
    /// # Errors
    ///
    /// `KotobaError::UnsupportedLanguage` when no rule format exists for the code.
    pub fn builtin_for(code: &str) -> Result<Self> {
        Self::builtin(code.parse()?)
    }

    /// Read a rule file in the format of the given language.
    ///
    /// # Errors
    ///
    /// Returns `KotobaError::HeadRules` for an empty file or a malformed line,
    /// and `KotobaError::Io` if reading fails.
    pub fn from_reader<R: Read>(language: Language, mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse(language, &text)
    }

    /// Parse rule file contents in the format of the given language.
    pub fn parse(language: Language, text: &str) -> Result<Self> {
        let entries = match language {
            Language::En => penn::parse(text)?,
            Language::Es => ancora::parse(text)?,
        };
        if entries.is_empty() {
            return Err(KotobaError::HeadRules {
                line: 0,
                reason: format!("no head rules found for {language}"),
            });
        }

        let mut rules: HashMap<String, Vec<HeadRuleEntry>> = HashMap::new();
        for (parent, entry) in entries {
            rules.entry(parent).or_default().push(entry);
        }
        tracing::debug!(%language, parents = rules.len(), "loaded head rules");

        let (default_direction, punctuation) = match language {
            Language::En => (Direction::LeftToRight, penn::punctuation()),
            Language::Es => (Direction::LeftToRight, ancora::punctuation()),
        };

        Ok(Self {
            language,
            rules,
            default_direction,
            punctuation,
        })
    }

    /// Override the direction used when no entry matches.
    pub fn with_default_direction(mut self, direction: Direction) -> Self {
        self.default_direction = direction;
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// The entries configured for a parent label.
    pub fn entries(&self, parent: &str) -> &[HeadRuleEntry] {
        self.rules.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Index of the head child of a `parent` constituent with the given children labels.
    ///
    /// Returns 0 for an empty child list.
    pub fn head_index<S: AsRef<str>>(&self, parent: &str, children: &[S]) -> usize {
        if children.is_empty() {
            return 0;
        }
        self.entries(parent)
            .iter()
            .find_map(|entry| entry.find(children))
            .unwrap_or(match self.default_direction {
                Direction::LeftToRight => 0,
                Direction::RightToLeft => children.len() - 1,
            })
    }

    /// Check if a POS tag is punctuation in this grammar.
    pub fn is_punctuation(&self, tag: &str) -> bool {
        self.punctuation.iter().any(|p| p.matches(tag))
    }
}

fn rule_error(line: usize, reason: impl Into<String>) -> KotobaError {
    KotobaError::HeadRules {
        line,
        reason: reason.into(),
    }
}
