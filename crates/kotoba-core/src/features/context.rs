use std::collections::HashMap;

/// Per-sentence input to a context generator.
///
/// Annotations computed once per sentence (POS tags for the chunker) travel
/// with the tokens instead of being cached inside the generator.
#[derive(Debug, Clone, Copy)]
pub struct SentenceContext<'a> {
    pub tokens: &'a [String],
    pub pos_tags: Option<&'a [String]>,
    pub document: Option<&'a DocumentContext>,
}

impl<'a> SentenceContext<'a> {
    pub fn new(tokens: &'a [String]) -> Self {
        Self {
            tokens,
            pos_tags: None,
            document: None,
        }
    }

    pub fn with_pos_tags(mut self, tags: &'a [String]) -> Self {
        self.pos_tags = Some(tags);
        self
    }

    pub fn with_document(mut self, document: &'a DocumentContext) -> Self {
        self.document = Some(document);
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Word at a relative position, with `bos`/`eos` sentinels past either end.
    pub fn word(&self, index: usize, offset: isize) -> &'a str {
        window(self.tokens, index, offset)
    }
}

/// Item of `seq` at `index + offset`, or a boundary sentinel.
pub(crate) fn window<S: AsRef<str>>(seq: &[S], index: usize, offset: isize) -> &str {
    match index.checked_add_signed(offset) {
        None => "bos",
        Some(i) => seq.get(i).map_or("eos", AsRef::as_ref),
    }
}

/// Previous outcome at `index + offset` (offset < 0), or `bos`.
pub(crate) fn previous<S: AsRef<str>>(outcomes: &[S], index: usize, offset: isize) -> &str {
    index
        .checked_add_signed(offset)
        .and_then(|i| outcomes.get(i))
        .map_or("bos", AsRef::as_ref)
}

/// Adaptive state carried across the sentences of one document.
///
/// Remembers the last outcome assigned to each word. Owned by the caller and
/// must be cleared between independent documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentContext {
    previous: HashMap<String, String>,
}

impl DocumentContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcomes of a labeled sentence.
    pub fn update_adaptive_data<S, O>(&mut self, tokens: &[S], outcomes: &[O])
    where
        S: AsRef<str>,
        O: AsRef<str>,
    {
        for (token, outcome) in tokens.iter().zip(outcomes) {
            self.previous
                .insert(token.as_ref().to_string(), outcome.as_ref().to_string());
        }
    }

    pub fn clear_adaptive_data(&mut self) {
        self.previous.clear();
    }

    pub fn previous_outcome(&self, word: &str) -> Option<&str> {
        self.previous.get(word).map(String::as_str)
    }
}
