//! Train a parser model from a treebank, optionally score it on a held-out
//! set, and save it as JSON.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use kotoba_core::codec::SequenceCodec;
use kotoba_core::features::FeatureConfig;
use kotoba_core::headrules::{HeadRules, Language};
use kotoba_core::parser::{BeamConfig, ParserModel, ShiftReduceParser};
use kotoba_core::resources::{ClusterLexicon, DictionaryTagger};
use kotoba_trainer::{
    ParserTrainer, PerceptronConfig, PerceptronModel, PerceptronTrainer, TrainingConfig, evaluate,
    load_treebank,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "train")]
#[command(about = "Train a shift-reduce constituency parser")]
#[command(version)]
struct Cli {
    /// Training treebank, bracketed trees
    #[arg(short, long, env = "KOTOBA_TRAIN_SET")]
    train: PathBuf,

    /// Held-out treebank to evaluate on
    #[arg(short = 'T', long, env = "KOTOBA_TEST_SET")]
    test: Option<PathBuf>,

    /// Where to write the model
    #[arg(short, long, default_value = "kotoba-model.json")]
    output: PathBuf,

    /// Language of the treebank (en, es)
    #[arg(short, long, env = "KOTOBA_LANG", default_value = "en")]
    lang: Language,

    /// Chunk tag scheme (BIO, BILOU)
    #[arg(long, default_value = "BIO")]
    codec: String,

    /// Head rule file replacing the built-in table
    #[arg(long)]
    head_rules: Option<PathBuf>,

    /// Word cluster file added to the tagger and chunker features
    #[arg(long)]
    clusters: Option<PathBuf>,

    /// Tag dictionary overriding the tagger
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// Parser model whose POS tagger is reused instead of training a new one
    #[arg(long)]
    tagger_model: Option<PathBuf>,

    /// Parser beam size
    #[arg(short, long, default_value_t = 20)]
    beam: usize,

    /// Perceptron iterations
    #[arg(short, long, default_value_t = 100)]
    iterations: usize,

    /// Minimum feature count
    #[arg(long, default_value_t = 1)]
    cutoff: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut tagger_features = FeatureConfig::pos_tagger();
    let mut chunker_features = FeatureConfig::chunker();
    if let Some(path) = &cli.clusters {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let (lexicon, report) = ClusterLexicon::from_reader(BufReader::new(file))?;
        info!(loaded = report.loaded, skipped = report.skipped.len(), "loaded clusters");
        let lexicon = Arc::new(lexicon);
        tagger_features = tagger_features.with_cluster("cluster", Arc::clone(&lexicon));
        chunker_features = chunker_features.with_cluster("cluster", lexicon);
    }

    let tagger = match &cli.tagger_model {
        Some(path) => {
            let model: ParserModel<PerceptronModel> = ParserModel::load(path)
                .with_context(|| format!("reading {}", path.display()))?;
            info!(path = %path.display(), "reusing POS tagger");
            tagger_features = model.tagger_features;
            Some(model.tagger)
        }
        None => None,
    };

    let mut config = TrainingConfig::new()
        .with_language(cli.lang)
        .with_codec(SequenceCodec::from_name(&cli.codec)?)
        .with_beam(BeamConfig::new().with_beam_size(cli.beam))
        .with_features(tagger_features, chunker_features)
        .with_perceptron(
            PerceptronConfig::new()
                .with_iterations(cli.iterations)
                .with_cutoff(cli.cutoff),
        );
    if let Some(path) = &cli.dictionary {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let (dictionary, report) = DictionaryTagger::from_reader(BufReader::new(file))?;
        info!(loaded = report.loaded, skipped = report.skipped.len(), "loaded dictionary");
        config = config.with_dictionary(Arc::new(dictionary));
    }

    let perceptron = PerceptronTrainer::new(config.perceptron);
    let mut trainer = ParserTrainer::new(config, perceptron)?;
    if let Some(path) = &cli.head_rules {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        trainer = trainer.with_head_rules(HeadRules::from_reader(cli.lang, file)?);
    }

    let train_set = load_treebank(&cli.train, trainer.head_rules())
        .with_context(|| format!("reading {}", cli.train.display()))?;
    let model = match tagger {
        Some(tagger) => trainer.train_with_tagger(&train_set.parses, tagger)?,
        None => trainer.train(&train_set.parses)?,
    };
    model
        .save(&cli.output)
        .with_context(|| format!("writing {}", cli.output.display()))?;

    if let Some(path) = &cli.test {
        let test_set = load_treebank(path, trainer.head_rules())
            .with_context(|| format!("reading {}", path.display()))?;
        let parser = ShiftReduceParser::new(model)?;
        let evaluation = evaluate(&parser, &test_set.parses);
        println!("{evaluation}");
    }

    Ok(())
}
