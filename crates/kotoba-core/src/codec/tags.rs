//! # Span Tags
//!
//! The tag alphabet used to label tokens for span extraction. `B-X`, `I-X`
//! and `O` form the BIO scheme; BILOU adds `L-X` (last token of a multi-token
//! span) and `U-X` (single-token span).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KotobaError;

/// Tagging scheme selected for a labeling task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagScheme {
    Bio,
    Bilou,
}

impl FromStr for TagScheme {
    type Err = KotobaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BIO" => Ok(Self::Bio),
            "BILOU" => Ok(Self::Bilou),
            _ => Err(KotobaError::UnsupportedCodec(s.to_string())),
        }
    }
}

impl fmt::Display for TagScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bio => write!(f, "BIO"),
            Self::Bilou => write!(f, "BILOU"),
        }
    }
}

/// A single span tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// First token of a span.
    Begin(String),
    /// Token inside a span.
    Inside(String),
    /// Last token of a multi-token span (BILOU only).
    Last(String),
    /// Single-token span (BILOU only).
    Unit(String),
    /// Token outside any span.
    Outside,
}

impl Tag {
    /// Parse a tag string such as `B-NP` or `O`.
    ///
    /// Only the first `-` separates the prefix, so `B-NP-SBJ` has type `NP-SBJ`.
    pub fn parse(s: &str) -> Option<Self> {
        if s == "O" {
            return Some(Self::Outside);
        }
        let (prefix, kind) = s.split_once('-')?;
        if kind.is_empty() {
            return None;
        }
        let kind = kind.to_string();
        match prefix {
            "B" => Some(Self::Begin(kind)),
            "I" => Some(Self::Inside(kind)),
            "L" => Some(Self::Last(kind)),
            "U" => Some(Self::Unit(kind)),
            _ => None,
        }
    }

    /// Get the span type carried by this tag.
    pub fn span_type(&self) -> Option<&str> {
        match self {
            Self::Begin(t) | Self::Inside(t) | Self::Last(t) | Self::Unit(t) => Some(t),
            Self::Outside => None,
        }
    }

    /// Check if this tag leaves a span open for the next token.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Begin(_) | Self::Inside(_))
    }

    /// Check if the tag belongs to the given scheme's alphabet.
    pub fn allowed_in(&self, scheme: TagScheme) -> bool {
        match scheme {
            TagScheme::Bio => !matches!(self, Self::Last(_) | Self::Unit(_)),
            TagScheme::Bilou => true,
        }
    }

    /// Check if `next` may follow `prev` (`None` at sequence start) under `scheme`.
    pub fn is_valid_transition(scheme: TagScheme, prev: Option<&Tag>, next: &Tag) -> bool {
        if !next.allowed_in(scheme) {
            return false;
        }
        let continues = |kind: &str| matches!(prev, Some(p) if p.is_open() && p.span_type() == Some(kind));
        match scheme {
            TagScheme::Bio => match next {
                Self::Inside(kind) => continues(kind),
                _ => true,
            },
            TagScheme::Bilou => match next {
                Self::Inside(kind) | Self::Last(kind) => continues(kind),
                _ => !prev.is_some_and(Tag::is_open),
            },
        }
    }

    /// Check if a sequence may end with this tag under `scheme`.
    pub fn is_valid_ending(scheme: TagScheme, last: &Tag) -> bool {
        match scheme {
            TagScheme::Bio => true,
            TagScheme::Bilou => !last.is_open(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Begin(t) => write!(f, "B-{t}"),
            Self::Inside(t) => write!(f, "I-{t}"),
            Self::Last(t) => write!(f, "L-{t}"),
            Self::Unit(t) => write!(f, "U-{t}"),
            Self::Outside => write!(f, "O"),
        }
    }
}
