//! # Whitespace Tokenizer
//!
//! Splits pre-tokenized sentences (one sentence per line, tokens separated by
//! whitespace, as in Penn Treebank style corpora) into [`Token`]s.

use std::ops::Range;

use crate::types::{Span, Token};

/// Tokenizer for whitespace-separated sentences.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer;

impl Tokenizer {
    /// Create a new tokenizer instance.
    pub fn new() -> Self {
        Self
    }

    /// Tokenize a sentence into a sequence of tokens.
    ///
    /// # Examples
    /// ```
    /// use kotoba_core::tokenizer::Tokenizer;
    ///
    /// let tokens = Tokenizer::new().tokenize("The dog barks .");
    /// assert_eq!(tokens.len(), 4);
    /// assert_eq!(tokens[1].text, "dog");
    /// ```
    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut current_start = None;

        for (idx, c) in input.char_indices() {
            if c.is_whitespace() {
                if let Some(start) = current_start.take() {
                    let index = tokens.len();
                    tokens.push(Token::new(&input[start..idx], start, idx, index));
                }
            } else if current_start.is_none() {
                current_start = Some(idx);
            }
        }

        if let Some(start) = current_start {
            let index = tokens.len();
            tokens.push(Token::new(&input[start..], start, input.len(), index));
        }

        tokens
    }

    /// Byte range of the input covered by a span over `tokens`.
    pub fn text_range(&self, tokens: &[Token], span: &Span) -> Option<Range<usize>> {
        if span.is_empty() || span.end() > tokens.len() {
            return None;
        }
        Some(tokens[span.start()].start..tokens[span.end() - 1].end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_basic() {
        let tokenizer = Tokenizer::new();
        let tokens = tokenizer.tokenize("Pierre Vinken , 61 years old");

        assert_eq!(tokens.len(), 6);
        assert_eq!(tokens[0].text, "Pierre");
        assert_eq!(tokens[0].start, 0);
        assert_eq!(tokens[0].end, 6);
        assert_eq!(tokens[2].text, ",");
        assert_eq!(tokens[5].index, 5);
    }

    #[test]
    fn test_tokenize_keeps_case_and_punctuation() {
        let tokens = Tokenizer::new().tokenize("U.S. stocks fell .");
        assert_eq!(tokens[0].text, "U.S.");
        assert_eq!(tokens[3].text, ".");
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        let tokens = Tokenizer::new().tokenize("  a \t b\n");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].text, "b");
        assert_eq!(tokens[1].start, 6);
    }

    #[test]
    fn test_tokenize_non_ascii_offsets() {
        let tokens = Tokenizer::new().tokenize("el niño llegó");
        assert_eq!(tokens[1].text, "niño");
        assert_eq!(tokens[2].start, "el niño ".len());
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(Tokenizer::new().tokenize("").is_empty());
        assert!(Tokenizer::new().tokenize("   ").is_empty());
    }

    #[test]
    fn test_text_range() {
        let tokenizer = Tokenizer::new();
        let input = "the old  dog";
        let tokens = tokenizer.tokenize(input);

        let range = tokenizer.text_range(&tokens, &Span::new(1, 3, "NP")).unwrap();
        assert_eq!(&input[range], "old  dog");
        assert_eq!(tokenizer.text_range(&tokens, &Span::new(2, 2, "NP")), None);
        assert_eq!(tokenizer.text_range(&tokens, &Span::new(0, 4, "NP")), None);
    }
}
