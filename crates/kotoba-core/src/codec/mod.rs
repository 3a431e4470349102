//! # Sequence Codec
//!
//! Converts between typed spans and flat per-token tags in the BIO or BILOU
//! scheme, and validates tag sequences for the sequence labeler.

pub mod tags;

pub use tags::{Tag, TagScheme};

use serde::{Deserialize, Serialize};

use crate::error::{KotobaError, Result};
use crate::types::Span;

/// What decoding does with a malformed tag sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecodePolicy {
    /// Reject the sequence with [`KotobaError::InvalidTagSequence`].
    #[default]
    Strict,
    /// Repair it: a dangling `I-X` starts a new span as if it were `B-X`, a
    /// dangling `L-X` becomes a single-token span, and a BILOU chain that is
    /// never closed ends where it breaks.
    Repair,
}

/// An immutable span codec for one labeling task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceCodec {
    scheme: TagScheme,
    policy: DecodePolicy,
}

impl SequenceCodec {
    /// Create a strict codec for the given scheme.
    pub fn new(scheme: TagScheme) -> Self {
        Self {
            scheme,
            policy: DecodePolicy::Strict,
        }
    }

    /// Create a codec from its configuration name (`"BIO"` or `"BILOU"`).
    ///
    /// # Errors
    ///
    /// Returns `KotobaError::UnsupportedCodec` for any other name.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    /// Set the decode policy.
    pub fn with_policy(mut self, policy: DecodePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn scheme(&self) -> TagScheme {
        self.scheme
    }

    pub fn policy(&self) -> DecodePolicy {
        self.policy
    }

    /// Encode non-overlapping spans into `len` tags.
    ///
    /// # Errors
    ///
    /// Returns `KotobaError::InvalidSpan` for empty, out-of-range or
    /// overlapping spans.
    pub fn encode(&self, spans: &[Span], len: usize) -> Result<Vec<String>> {
        let mut sorted: Vec<&Span> = spans.iter().collect();
        sorted.sort();

        let invalid = |span: &Span, reason: &str| KotobaError::InvalidSpan {
            start: span.start(),
            end: span.end(),
            len,
            reason: reason.to_string(),
        };

        let mut tags = vec![Tag::Outside.to_string(); len];
        let mut covered_until = 0;
        for span in sorted {
            if span.is_empty() {
                return Err(invalid(span, "empty span"));
            }
            if span.end() > len {
                return Err(invalid(span, "span exceeds sequence"));
            }
            if span.start() < covered_until {
                return Err(invalid(span, "span overlaps a previous span"));
            }
            covered_until = span.end();

            let kind = span.label().to_string();
            let last = span.end() - 1;
            for (i, slot) in tags.iter_mut().enumerate().take(span.end()).skip(span.start()) {
                let tag = match self.scheme {
                    TagScheme::Bio if i == span.start() => Tag::Begin(kind.clone()),
                    TagScheme::Bio => Tag::Inside(kind.clone()),
                    TagScheme::Bilou if span.len() == 1 => Tag::Unit(kind.clone()),
                    TagScheme::Bilou if i == span.start() => Tag::Begin(kind.clone()),
                    TagScheme::Bilou if i == last => Tag::Last(kind.clone()),
                    TagScheme::Bilou => Tag::Inside(kind.clone()),
                };
                *slot = tag.to_string();
            }
        }

        Ok(tags)
    }

    /// Decode tags into spans, applying the configured [`DecodePolicy`].
    ///
    /// # Errors
    ///
    /// Returns `KotobaError::InvalidTag` for tags outside the scheme's
    /// alphabet, and `KotobaError::InvalidTagSequence` for malformed
    /// sequences under the strict policy.
    pub fn decode<S: AsRef<str>>(&self, tags: &[S]) -> Result<Vec<Span>> {
        let mut spans = Vec::new();
        // (start, type) of the span still accepting tokens
        let mut open: Option<(usize, String)> = None;
        let bilou = self.scheme == TagScheme::Bilou;

        for (position, raw) in tags.iter().enumerate() {
            let raw = raw.as_ref();
            let tag = Tag::parse(raw)
                .filter(|t| t.allowed_in(self.scheme))
                .ok_or_else(|| KotobaError::InvalidTag {
                    tag: raw.to_string(),
                    position,
                })?;

            let continues = matches!(
                (&open, tag.span_type()),
                (Some((_, open_kind)), Some(kind)) if open_kind == kind
            );

            match tag {
                Tag::Inside(_) if continues => {}
                Tag::Last(kind) if continues => {
                    if let Some((start, _)) = open.take() {
                        spans.push(Span::new(start, position + 1, kind));
                    }
                }
                Tag::Inside(kind) => {
                    self.dangling(position, raw, &kind)?;
                    self.close(&mut open, &mut spans, position, bilou)?;
                    open = Some((position, kind));
                }
                Tag::Last(kind) => {
                    self.dangling(position, raw, &kind)?;
                    self.close(&mut open, &mut spans, position, bilou)?;
                    spans.push(Span::new(position, position + 1, kind));
                }
                Tag::Begin(kind) => {
                    self.close(&mut open, &mut spans, position, bilou)?;
                    open = Some((position, kind));
                }
                Tag::Unit(kind) => {
                    self.close(&mut open, &mut spans, position, bilou)?;
                    spans.push(Span::new(position, position + 1, kind));
                }
                Tag::Outside => {
                    self.close(&mut open, &mut spans, position, bilou)?;
                }
            }
        }

        self.close(&mut open, &mut spans, tags.len(), bilou)?;
        Ok(spans)
    }

    /// Check whether `next` may follow the outcomes assigned so far.
    pub fn is_valid_outcome<S: AsRef<str>>(&self, previous: &[S], next: &str) -> bool {
        let Some(next) = Tag::parse(next) else {
            return false;
        };
        let prev = match previous.last() {
            Some(p) => match Tag::parse(p.as_ref()) {
                Some(tag) => Some(tag),
                None => return false,
            },
            None => None,
        };
        Tag::is_valid_transition(self.scheme, prev.as_ref(), &next)
    }

    /// Check whether a complete sequence may end with `last`.
    pub fn is_valid_ending(&self, last: &str) -> bool {
        Tag::parse(last).is_some_and(|tag| Tag::is_valid_ending(self.scheme, &tag))
    }

    /// Check a whole sequence for well-formedness under this scheme.
    pub fn is_valid_sequence<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        (0..tags.len()).all(|i| self.is_valid_outcome(&tags[..i], tags[i].as_ref()))
            && tags.last().is_none_or(|last| self.is_valid_ending(last.as_ref()))
    }

    fn dangling(&self, position: usize, tag: &str, kind: &str) -> Result<()> {
        match self.policy {
            DecodePolicy::Strict => Err(KotobaError::InvalidTagSequence {
                position,
                reason: format!("{tag} does not continue a {kind} span"),
            }),
            DecodePolicy::Repair => {
                tracing::debug!(position, tag, "repairing dangling tag");
                Ok(())
            }
        }
    }

    // Closes the open span at `position`. BILOU spans must be closed by L-X,
    // so a span still open here is unterminated.
    fn close(
        &self,
        open: &mut Option<(usize, String)>,
        spans: &mut Vec<Span>,
        position: usize,
        bilou: bool,
    ) -> Result<()> {
        if let Some((start, kind)) = open.take() {
            if bilou && self.policy == DecodePolicy::Strict {
                return Err(KotobaError::InvalidTagSequence {
                    position,
                    reason: format!("{kind} span opened at {start} is never closed"),
                });
            }
            spans.push(Span::new(start, position, kind));
        }
        Ok(())
    }
}
