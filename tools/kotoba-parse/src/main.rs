//! Reads one whitespace-tokenized sentence per line from stdin and writes one
//! JSON object per line to stdout.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use kotoba_core::parser::{ParserModel, ShiftReduceParser};
use kotoba_core::tokenizer::Tokenizer;
use kotoba_core::tree::Parse;
use kotoba_core::types::token;
use kotoba_trainer::PerceptronModel;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "kotoba-parse")]
#[command(about = "Parse sentences from stdin with a trained model")]
#[command(version)]
struct Cli {
    /// Model written by `train`
    #[arg(short, long, env = "KOTOBA_MODEL")]
    model: PathBuf,

    /// Parses to print per sentence
    #[arg(short = 'n', long, default_value_t = 1)]
    nbest: usize,

    /// Also print POS tags and chunk spans
    #[arg(long)]
    annotations: bool,
}

#[derive(Debug, Serialize)]
struct ParseOutput {
    input: String,
    parses: Vec<ScoredTree>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chunks: Option<Vec<Chunk>>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct Chunk {
    label: String,
    text: String,
    start: usize,
    end: usize,
}

#[derive(Debug, Serialize)]
struct ScoredTree {
    tree: String,
    score: f64,
}

impl From<&Parse> for ScoredTree {
    fn from(parse: &Parse) -> Self {
        Self {
            tree: parse.to_string(),
            score: parse.score(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let model: ParserModel<PerceptronModel> = ParserModel::load(&cli.model)
        .with_context(|| format!("loading model {}", cli.model.display()))?;
    let parser = ShiftReduceParser::new(model)?;
    let tokenizer = Tokenizer::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let spans = tokenizer.tokenize(input);
        let tokens = token::texts(&spans);

        let mut output = ParseOutput {
            input: input.to_string(),
            parses: Vec::new(),
            tags: None,
            chunks: None,
            error: None,
        };
        match parser.parse_n(&tokens, cli.nbest) {
            Ok(parses) => output.parses = parses.iter().map(ScoredTree::from).collect(),
            Err(e) => output.error = Some(e.to_string()),
        }
        if cli.annotations {
            if let Ok(tags) = parser.tag(&tokens) {
                output.chunks = parser.chunk(&tokens, &tags).ok().map(|chunks| {
                    chunks
                        .iter()
                        .filter_map(|chunk| {
                            let range = tokenizer.text_range(&spans, chunk)?;
                            Some(Chunk {
                                label: chunk.label().to_string(),
                                text: input[range.clone()].to_string(),
                                start: range.start,
                                end: range.end,
                            })
                        })
                        .collect()
                });
                output.tags = Some(tags);
            }
        }

        serde_json::to_writer(&mut stdout, &output)?;
        writeln!(stdout)?;
    }

    Ok(())
}
