use serde::{Deserialize, Serialize};

/// A token of a sentence with positional information.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// The token text content
    pub text: String,
    /// Start byte offset in the original string
    pub start: usize,
    /// End byte offset in the original string (exclusive)
    pub end: usize,
    /// Word index in the sentence
    pub index: usize,
}

impl Token {
    /// Creates a token at the given word index.
    #[must_use]
    pub fn new(text: impl Into<String>, start: usize, end: usize, index: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            index,
        }
    }
}

/// Collects the texts of a token slice, the form the labelers and parser consume.
#[must_use]
pub fn texts(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(|t| t.text.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texts_keep_order() {
        let tokens = vec![Token::new("the", 0, 3, 0), Token::new("dog", 4, 7, 1)];
        assert_eq!(texts(&tokens), vec!["the".to_string(), "dog".to_string()]);
    }
}
