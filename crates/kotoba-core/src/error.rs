use thiserror::Error;

/// Errors that can occur during kotoba core operations.
#[derive(Debug, Error)]
pub enum KotobaError {
    /// The input sentence is empty.
    #[error("input sentence is empty")]
    EmptyInput,

    /// No head rule table exists for the requested language code.
    #[error("head rules not supported for language {0:?}")]
    UnsupportedLanguage(String),

    /// The configured sequence codec name is unknown.
    #[error("unsupported sequence codec {0:?} (expected BIO or BILOU)")]
    UnsupportedCodec(String),

    /// A head rule file could not be loaded.
    #[error("invalid head rules at line {line}: {reason}")]
    HeadRules {
        /// 1-based line number in the rule file (0 for whole-file problems).
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A feature generator needs a per-sentence annotation that was not supplied.
    #[error("feature generator {generator} requires {annotation} annotations")]
    MissingAnnotation {
        generator: &'static str,
        annotation: &'static str,
    },

    /// A tag string does not belong to the codec's alphabet.
    #[error("invalid tag {tag:?} at position {position}")]
    InvalidTag { tag: String, position: usize },

    /// A tag sequence is not well formed under the strict decode policy.
    #[error("invalid tag sequence at position {position}: {reason}")]
    InvalidTagSequence { position: usize, reason: String },

    /// A span cannot be encoded (empty, out of range, or overlapping).
    #[error("invalid span [{start}, {end}) for sequence of length {len}: {reason}")]
    InvalidSpan {
        start: usize,
        end: usize,
        len: usize,
        reason: String,
    },

    /// A bracketed tree could not be read.
    #[error("malformed tree: {0}")]
    MalformedTree(String),

    /// A gold tree cannot be reproduced by the transition system.
    #[error("oracle cannot replay gold tree: {0}")]
    OracleMismatch(String),

    /// A transition was applied to a state that cannot take it.
    #[error("action {action} cannot be applied: {reason}")]
    InvalidAction { action: String, reason: String },

    /// Beam search ran past its iteration cap.
    #[error("transition search exceeded {iterations} iterations")]
    IterationCapExceeded { iterations: usize },

    /// Beam search ended without any terminated derivation.
    #[error("no complete derivation found for sentence of {tokens} tokens")]
    NoDerivation { tokens: usize },

    /// A classifier returned a distribution that does not match its outcomes.
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Reading a resource or model failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A model artifact could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    RegexError(#[from] regex::Error),
}

impl KotobaError {
    /// Returns `true` for errors that only affect a single sentence.
    ///
    /// Training and evaluation skip the sentence and continue on these.
    #[must_use]
    pub fn is_per_sentence(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput
                | Self::InvalidTag { .. }
                | Self::InvalidTagSequence { .. }
                | Self::InvalidSpan { .. }
                | Self::MalformedTree(_)
                | Self::OracleMismatch(_)
                | Self::InvalidAction { .. }
                | Self::IterationCapExceeded { .. }
                | Self::NoDerivation { .. }
        )
    }
}

/// Result type alias for kotoba operations.
pub type Result<T> = std::result::Result<T, KotobaError>;
