//! Penn-style bracketed tree reader.

use crate::error::{KotobaError, Result};

/// A tree as written, before heads are assigned.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawTree {
    Word { tag: String, word: String },
    Phrase { label: String, children: Vec<RawTree> },
}

#[derive(Debug, Clone, PartialEq)]
enum Lexeme<'a> {
    Open,
    Close,
    Atom(&'a str),
}

fn lex(text: &str) -> Vec<Lexeme<'_>> {
    let mut out = Vec::new();
    let mut atom_start = None;
    for (i, ch) in text.char_indices() {
        if ch == '(' || ch == ')' || ch.is_whitespace() {
            if let Some(start) = atom_start.take() {
                out.push(Lexeme::Atom(&text[start..i]));
            }
            match ch {
                '(' => out.push(Lexeme::Open),
                ')' => out.push(Lexeme::Close),
                _ => {}
            }
        } else if atom_start.is_none() {
            atom_start = Some(i);
        }
    }
    if let Some(start) = atom_start {
        out.push(Lexeme::Atom(&text[start..]));
    }
    out
}

/// Read one bracketed tree. An unlabeled outer bracket gets an empty label.
pub(crate) fn read(text: &str) -> Result<RawTree> {
    let lexemes = lex(text);
    let mut pos = 0;
    let tree = read_node(&lexemes, &mut pos)?;
    if pos != lexemes.len() {
        return Err(KotobaError::MalformedTree(
            "trailing input after tree".to_string(),
        ));
    }
    tree.ok_or_else(|| KotobaError::MalformedTree("tree has no words".to_string()))
}

/// Returns `None` for a constituent that is empty once traces are removed.
fn read_node(lexemes: &[Lexeme<'_>], pos: &mut usize) -> Result<Option<RawTree>> {
    if lexemes.get(*pos) != Some(&Lexeme::Open) {
        return Err(malformed(*pos, "expected '('"));
    }
    *pos += 1;

    let label = match lexemes.get(*pos) {
        Some(Lexeme::Atom(label)) => {
            *pos += 1;
            normalize_label(label)
        }
        _ => String::new(),
    };

    if let Some(Lexeme::Atom(word)) = lexemes.get(*pos) {
        let word = (*word).to_string();
        *pos += 1;
        expect_close(lexemes, pos)?;
        if label.is_empty() {
            return Err(malformed(*pos, "word without a tag"));
        }
        if label == "-NONE-" {
            return Ok(None);
        }
        return Ok(Some(RawTree::Word { tag: label, word }));
    }

    let mut children = Vec::new();
    while lexemes.get(*pos) == Some(&Lexeme::Open) {
        if let Some(child) = read_node(lexemes, pos)? {
            children.push(child);
        }
    }
    expect_close(lexemes, pos)?;

    if children.is_empty() {
        return Ok(None);
    }
    Ok(Some(RawTree::Phrase { label, children }))
}

fn expect_close(lexemes: &[Lexeme<'_>], pos: &mut usize) -> Result<()> {
    if lexemes.get(*pos) != Some(&Lexeme::Close) {
        return Err(malformed(*pos, "expected ')'"));
    }
    *pos += 1;
    Ok(())
}

fn malformed(pos: usize, reason: &str) -> KotobaError {
    KotobaError::MalformedTree(format!("{reason} at item {pos}"))
}

/// Strip function tags and indices: `NP-SBJ-1` becomes `NP`, `NP=2` becomes
/// `NP`. Labels starting with `-` (`-NONE-`, `-LRB-`) are kept whole.
fn normalize_label(label: &str) -> String {
    if label.starts_with('-') {
        return label.to_string();
    }
    label
        .split(['-', '='])
        .next()
        .filter(|base| !base.is_empty())
        .unwrap_or(label)
        .to_string()
}
