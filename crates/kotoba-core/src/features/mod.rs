//! # Context Features
//!
//! Turns a token window into the feature strings a classifier consumes.
//!
//! A [`ContextGenerator`] runs a fixed list of [`FeatureKind`] generators in
//! order. Generators are deterministic: the same sentence, index and previous
//! outcomes always yield the same features. Per-sentence annotations and
//! per-document adaptive data are passed in through [`SentenceContext`].
//!
//! ```
//! use kotoba_core::features::{ContextGenerator, FeatureConfig, SentenceContext};
//!
//! let generator = ContextGenerator::new(FeatureConfig::pos_tagger()).unwrap();
//! let tokens: Vec<String> = ["The", "dog", "barks"].iter().map(|s| s.to_string()).collect();
//! let features = generator.context(&SentenceContext::new(&tokens), 1, &["DT".to_string()]).unwrap();
//!
//! assert!(features.contains(&"w0=dog".to_string()));
//! assert!(features.contains(&"p_1=DT".to_string()));
//! ```

mod context;
mod shape;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use context::{DocumentContext, SentenceContext};
pub(crate) use context::{previous, window};
pub use shape::{AffixRange, WordShape};

use crate::error::{KotobaError, Result};
use crate::resources::{ClusterLexicon, DictionaryTagger};

/// A feature generator. The set is closed; [`ContextGenerator`] dispatches on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Word window, previous outcomes and affix/shape features for POS tagging.
    PosBaseline(AffixRange),
    /// Word and POS tag windows with outcome conjunctions for chunking.
    /// Needs POS tags in the sentence context.
    ChunkBaseline,
    /// Word and token-class trigrams on both sides of the current token.
    TrigramClass,
    /// Token class of the current word.
    TokenClass,
    /// Cluster ids of the current word and its neighbours.
    Cluster {
        name: String,
        lexicon: Arc<ClusterLexicon>,
    },
    /// Dictionary tag of the current word.
    Dictionary(Arc<DictionaryTagger>),
    /// Outcome last assigned to the current word earlier in the document.
    PreviousMap,
}

/// Ordered list of generators for one labeling task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub kinds: Vec<FeatureKind>,
}

impl FeatureConfig {
    pub fn new(kinds: Vec<FeatureKind>) -> Self {
        Self { kinds }
    }

    /// Default POS tagger features.
    pub fn pos_tagger() -> Self {
        Self::new(vec![
            FeatureKind::PosBaseline(AffixRange::default()),
            FeatureKind::TokenClass,
        ])
    }

    /// Default chunker features.
    pub fn chunker() -> Self {
        Self::new(vec![FeatureKind::ChunkBaseline, FeatureKind::TrigramClass])
    }

    /// Add a cluster lexicon generator.
    pub fn with_cluster(mut self, name: impl Into<String>, lexicon: Arc<ClusterLexicon>) -> Self {
        self.kinds.push(FeatureKind::Cluster {
            name: name.into(),
            lexicon,
        });
        self
    }

    /// Add a dictionary generator.
    pub fn with_dictionary(mut self, dictionary: Arc<DictionaryTagger>) -> Self {
        self.kinds.push(FeatureKind::Dictionary(dictionary));
        self
    }

    pub fn with_previous_map(mut self) -> Self {
        self.kinds.push(FeatureKind::PreviousMap);
        self
    }

    /// Returns `true` if some generator needs POS tag annotations.
    pub fn needs_pos_tags(&self) -> bool {
        self.kinds
            .iter()
            .any(|k| matches!(k, FeatureKind::ChunkBaseline))
    }
}

/// Feature extractor for sequence labeling.
#[derive(Debug, Clone)]
pub struct ContextGenerator {
    config: FeatureConfig,
    shape: WordShape,
}

impl ContextGenerator {
    /// # Errors
    ///
    /// Returns `KotobaError::RegexError` if the word shape patterns fail to compile.
    pub fn new(config: FeatureConfig) -> Result<Self> {
        Ok(Self {
            config,
            shape: WordShape::new()?,
        })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn shape(&self) -> &WordShape {
        &self.shape
    }

    /// Features for the token at `index`, given the outcomes of earlier tokens.
    ///
    /// # Errors
    ///
    /// `KotobaError::MissingAnnotation` if a generator needs an annotation the
    /// sentence context does not carry.
    pub fn context<S: AsRef<str>>(
        &self,
        sentence: &SentenceContext<'_>,
        index: usize,
        previous_outcomes: &[S],
    ) -> Result<Vec<String>> {
        let mut features = Vec::with_capacity(48);
        for kind in &self.config.kinds {
            self.generate(kind, &mut features, sentence, index, previous_outcomes)?;
        }
        Ok(features)
    }

    fn generate<S: AsRef<str>>(
        &self,
        kind: &FeatureKind,
        features: &mut Vec<String>,
        sentence: &SentenceContext<'_>,
        index: usize,
        prev: &[S],
    ) -> Result<()> {
        match kind {
            FeatureKind::PosBaseline(affixes) => {
                self.pos_baseline(features, sentence, index, prev, affixes)
            }
            FeatureKind::ChunkBaseline => {
                let tags = sentence.pos_tags.ok_or(KotobaError::MissingAnnotation {
                    generator: "ChunkBaseline",
                    annotation: "POS tag",
                })?;
                chunk_baseline(features, sentence, tags, index, prev);
            }
            FeatureKind::TrigramClass => self.trigram_class(features, sentence, index),
            FeatureKind::TokenClass => {
                let w0 = sentence.word(index, 0);
                let class = self.shape.token_class(w0);
                features.push(format!("wc={class}"));
                features.push(format!("w,c={},{class}", w0.to_lowercase()));
            }
            FeatureKind::Cluster { name, lexicon } => {
                for offset in -1..=1 {
                    if let Some(id) = lexicon.lookup(sentence.word(index, offset)) {
                        features.push(format!("{name}[{offset}]={id}"));
                    }
                }
            }
            FeatureKind::Dictionary(dictionary) => {
                if let Some(tag) = dictionary.lookup(sentence.word(index, 0)) {
                    features.push(format!("dict={tag}"));
                }
            }
            FeatureKind::PreviousMap => {
                let outcome = sentence
                    .document
                    .and_then(|doc| doc.previous_outcome(sentence.word(index, 0)));
                if let Some(outcome) = outcome {
                    features.push(format!("pd={outcome}"));
                }
            }
        }
        Ok(())
    }

    fn pos_baseline<S: AsRef<str>>(
        &self,
        features: &mut Vec<String>,
        sentence: &SentenceContext<'_>,
        index: usize,
        prev: &[S],
        affixes: &AffixRange,
    ) {
        let w_1 = sentence.word(index, -1);
        let w0 = sentence.word(index, 0);
        let w1 = sentence.word(index, 1);
        let p_1 = previous(prev, index, -1);
        let p_2 = previous(prev, index, -2);

        features.push(format!("w_1={w_1}"));
        features.push(format!("w0={w0}"));
        features.push(format!("w1={w1}"));
        features.push(format!("w_1,w0={w_1},{w0}"));
        features.push(format!("w0,w1={w0},{w1}"));
        features.push(format!("p_1={p_1}"));
        features.push(format!("p_2={p_2}"));
        features.push(format!("p_2,p_1={p_2},{p_1}"));
        features.push(format!("p_1,w0={p_1},{w0}"));

        for suffix in affixes.suffixes(w0) {
            features.push(format!("suf={suffix}"));
        }
        for prefix in affixes.prefixes(w0) {
            features.push(format!("pre={prefix}"));
        }
        if self.shape.has_hyphen(w0) {
            features.push("h".to_string());
        }
        if self.shape.has_cap(w0) {
            features.push("c".to_string());
        }
        if self.shape.has_digit(w0) {
            features.push("d".to_string());
        }
    }

    fn trigram_class(
        &self,
        features: &mut Vec<String>,
        sentence: &SentenceContext<'_>,
        index: usize,
    ) {
        let tokens = sentence.tokens;
        let wc = self.shape.token_class(&tokens[index]);
        if index > 1 {
            let (ppw, pw, w) = (&tokens[index - 2], &tokens[index - 1], &tokens[index]);
            features.push(format!("ppw,pw,w={ppw},{pw},{w}"));
            features.push(format!(
                "ppwc,pwc,wc={},{},{wc}",
                self.shape.token_class(ppw),
                self.shape.token_class(pw)
            ));
        }
        if index + 2 < tokens.len() {
            let (w, nw, nnw) = (&tokens[index], &tokens[index + 1], &tokens[index + 2]);
            features.push(format!("w,nw,nnw={w},{nw},{nnw}"));
            features.push(format!(
                "wc,nwc,nnwc={wc},{},{}",
                self.shape.token_class(nw),
                self.shape.token_class(nnw)
            ));
        }
    }
}

fn chunk_baseline<S: AsRef<str>>(
    features: &mut Vec<String>,
    sentence: &SentenceContext<'_>,
    tags: &[String],
    index: usize,
    prev: &[S],
) {
    let w = |offset| sentence.word(index, offset);
    let t = |offset| window(tags, index, offset);
    let (w_2, w_1, w0, w1, w2) = (w(-2), w(-1), w(0), w(1), w(2));
    let (t_2, t_1, t0, t1, t2) = (t(-2), t(-1), t(0), t(1), t(2));
    let p_1 = previous(prev, index, -1);
    let p_2 = previous(prev, index, -2);

    features.extend([
        format!("w_2={w_2}"),
        format!("w_1={w_1}"),
        format!("w0={w0}"),
        format!("w1={w1}"),
        format!("w2={w2}"),
        format!("w_1,w0={w_1},{w0}"),
        format!("w0,w1={w0},{w1}"),
        format!("t_2={t_2}"),
        format!("t_1={t_1}"),
        format!("t0={t0}"),
        format!("t1={t1}"),
        format!("t2={t2}"),
        format!("t_2,t_1={t_2},{t_1}"),
        format!("t_1,t0={t_1},{t0}"),
        format!("t0,t1={t0},{t1}"),
        format!("t1,t2={t1},{t2}"),
        format!("t_2,t_1,t0={t_2},{t_1},{t0}"),
        format!("t_1,t0,t1={t_1},{t0},{t1}"),
        format!("t0,t1,t2={t0},{t1},{t2}"),
        format!("p_2={p_2}"),
        format!("p_1={p_1}"),
        format!("p_2,p_1={p_2},{p_1}"),
        format!("p_1,t_2={p_1},{t_2}"),
        format!("p_1,t_1={p_1},{t_1}"),
        format!("p_1,t0={p_1},{t0}"),
        format!("p_1,t1={p_1},{t1}"),
        format!("p_1,t_1,t0={p_1},{t_1},{t0}"),
        format!("p_1,t0,t1={p_1},{t0},{t1}"),
        format!("p_1,t1,t2={p_1},{t1},{t2}"),
        format!("p_1,t_2,t_1,t0={p_1},{t_2},{t_1},{t0}"),
        format!("p_1,t_1,t0,t1={p_1},{t_1},{t0},{t1}"),
        format!("p_1,w_2={p_1},{w_2}"),
        format!("p_1,w_1={p_1},{w_1}"),
        format!("p_1,w1={p_1},{w1}"),
        format!("p_1,w2={p_1},{w2}"),
        format!("p_1,w0,w1={p_1},{w0},{w1}"),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    fn has(features: &[String], feature: &str) -> bool {
        features.iter().any(|f| f == feature)
    }

    #[test]
    fn pos_baseline_window_and_shape() {
        let generator = ContextGenerator::new(FeatureConfig::pos_tagger()).unwrap();
        let tokens = words("Well-known 2 dogs");
        let sentence = SentenceContext::new(&tokens);

        let first = generator.context::<String>(&sentence, 0, &[]).unwrap();
        assert!(has(&first, "w_1=bos"));
        assert!(has(&first, "p_1=bos"));
        assert!(has(&first, "p_2,p_1=bos,bos"));
        assert!(has(&first, "h"));
        assert!(has(&first, "c"));
        assert!(has(&first, "pre=We"));
        assert!(has(&first, "wc=ic"));

        let prev = words("JJ CD");
        let last = generator.context(&sentence, 2, &prev).unwrap();
        assert!(has(&last, "w1=eos"));
        assert!(has(&last, "p_2,p_1=JJ,CD"));
        assert!(has(&last, "p_1,w0=CD,dogs"));
        assert!(has(&last, "suf=s"));
        assert!(has(&last, "suf=ogs"));
        assert!(!has(&last, "d"));
    }

    #[test]
    fn extraction_is_deterministic() {
        let generator = ContextGenerator::new(FeatureConfig::pos_tagger()).unwrap();
        let tokens = words("the cat sat on the mat");
        let sentence = SentenceContext::new(&tokens);
        let prev = words("DT NN VBD");
        let a = generator.context(&sentence, 3, &prev).unwrap();
        let b = generator.context(&sentence, 3, &prev).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn chunk_baseline_needs_pos_tags() {
        let generator = ContextGenerator::new(FeatureConfig::chunker()).unwrap();
        let tokens = words("the dog barks");
        let err = generator
            .context::<String>(&SentenceContext::new(&tokens), 0, &[])
            .unwrap_err();
        assert!(matches!(err, KotobaError::MissingAnnotation { .. }));

        let tags = words("DT NN VBZ");
        let sentence = SentenceContext::new(&tokens).with_pos_tags(&tags);
        let prev = words("B-NP");
        let features = generator.context(&sentence, 1, &prev).unwrap();
        assert!(has(&features, "t_1,t0,t1=DT,NN,VBZ"));
        assert!(has(&features, "t2=eos"));
        assert!(has(&features, "p_1,t0=B-NP,NN"));
        assert!(has(&features, "w_2=bos"));
    }

    #[test]
    fn trigram_class_needs_room() {
        let generator =
            ContextGenerator::new(FeatureConfig::new(vec![FeatureKind::TrigramClass])).unwrap();
        let tokens = words("In 1999 Apple grew");
        let sentence = SentenceContext::new(&tokens);

        let features = generator.context::<String>(&sentence, 2, &[]).unwrap();
        assert_eq!(
            features,
            vec![
                "ppw,pw,w=In,1999,Apple".to_string(),
                "ppwc,pwc,wc=ic,4d,ic".to_string(),
            ]
        );
        let features = generator.context::<String>(&sentence, 0, &[]).unwrap();
        assert_eq!(features[0], "w,nw,nnw=In,1999,Apple");
    }

    #[test]
    fn cluster_and_dictionary_lookups() {
        let (lexicon, _) =
            ClusterLexicon::from_reader("dog\t0110\nbarks\t1010\n".as_bytes()).unwrap();
        let (dict, _) = DictionaryTagger::from_reader("the\tthe\tDT\n".as_bytes()).unwrap();
        let config = FeatureConfig::new(vec![])
            .with_cluster("brown", Arc::new(lexicon))
            .with_dictionary(Arc::new(dict));
        let generator = ContextGenerator::new(config).unwrap();
        let tokens = words("The dog barks");
        let sentence = SentenceContext::new(&tokens);

        let features = generator.context::<String>(&sentence, 0, &[]).unwrap();
        assert_eq!(features, vec!["brown[1]=0110".to_string(), "dict=DT".to_string()]);
    }

    #[test]
    fn previous_map_does_not_leak_after_clear() {
        let generator =
            ContextGenerator::new(FeatureConfig::new(vec![]).with_previous_map()).unwrap();
        let mut document = DocumentContext::new();
        document.update_adaptive_data(&words("John Smith"), &words("B-PER L-PER"));

        let tokens = words("Smith said");
        let features = generator
            .context::<String>(&SentenceContext::new(&tokens).with_document(&document), 0, &[])
            .unwrap();
        assert_eq!(features, vec!["pd=L-PER".to_string()]);

        document.clear_adaptive_data();
        let features = generator
            .context::<String>(&SentenceContext::new(&tokens).with_document(&document), 0, &[])
            .unwrap();
        assert!(features.is_empty());
    }

    #[test]
    fn config_round_trips_through_serde() {
        let config = FeatureConfig::chunker().with_previous_map();
        let json = serde_json::to_string(&config).unwrap();
        let back: FeatureConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        assert!(back.needs_pos_tags());
    }
}
