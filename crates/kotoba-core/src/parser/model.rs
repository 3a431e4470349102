use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::config::BeamConfig;
use crate::codec::SequenceCodec;
use crate::error::Result;
use crate::features::FeatureConfig;
use crate::headrules::{HeadRules, Language};
use crate::resources::DictionaryTagger;

/// Everything needed to decode: settings, resources and the three classifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserModel<C> {
    pub language: Language,
    pub codec: SequenceCodec,
    pub beam: BeamConfig,
    pub head_rules: HeadRules,
    pub tagger_features: FeatureConfig,
    pub chunker_features: FeatureConfig,
    pub dictionary: Option<Arc<DictionaryTagger>>,
    /// POS tag classifier.
    pub tagger: C,
    /// Chunk tag classifier.
    pub chunker: C,
    /// SHIFT / BUILD / COMPLETE classifier.
    pub builder: C,
}

impl<C: Serialize> ParserModel<C> {
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Write the model as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        tracing::info!(path = %path.as_ref().display(), "saved parser model");
        Ok(())
    }
}

impl<C: DeserializeOwned> ParserModel<C> {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let model = Self::from_reader(BufReader::new(File::open(path.as_ref())?))?;
        tracing::info!(path = %path.as_ref().display(), "loaded parser model");
        Ok(model)
    }
}
