// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Tree-sitter Parsing Integration
//!
//! This module owns the per-process Jasmin parser.
//!
//! ## Overview
//!
//! - One `tree_sitter::Parser` is created at pool construction and reused
//!   for every parse; calls serialize on a mutex because the parser is not
//!   reentrant.
//! - Syntax errors in the input never fail a parse: they surface as
//!   ERROR/MISSING nodes in the produced tree. [`ParseError`] covers only
//!   grammar-loader failures and the parser refusing to produce a tree.

use std::sync::Mutex;
use std::time::Instant;
use tracing::debug;

use crate::cst::Cst;

/// Parse error details
///
/// Content-level syntax errors are not represented here; they become
/// ERROR nodes in the tree.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    /// The Jasmin grammar was not compiled into this build
    #[error("Jasmin grammar unavailable in this build")]
    GrammarUnavailable,

    /// The grammar could not be loaded into the parser
    #[error("Failed to load Jasmin grammar: {message}")]
    Language { message: String },

    /// The parser returned no tree (catastrophic failure)
    #[error("Parser produced no tree")]
    ParseFailed,
}

/// The per-process Jasmin parser
///
/// Owns exactly one parser instance configured with the Jasmin grammar.
/// Parse calls are serialized internally; the produced [`Cst`] values are
/// independent of the pool and may be read concurrently.
pub struct ParserPool {
    parser: Mutex<tree_sitter::Parser>,
}

impl ParserPool {
    /// Create a parser pool for the Jasmin grammar
    ///
    /// # Returns
    ///
    /// - `Ok(ParserPool)` - Parser ready for use
    /// - `Err(ParseError::GrammarUnavailable)` - Grammar not compiled into
    ///   this build
    /// - `Err(ParseError::Language)` - Grammar rejected by the tree-sitter
    ///   runtime (ABI mismatch)
    pub fn new() -> Result<Self, ParseError> {
        let language = jasmin_grammar::language().ok_or(ParseError::GrammarUnavailable)?;

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(language)
            .map_err(|e| ParseError::Language {
                message: e.to_string(),
            })?;

        Ok(Self {
            parser: Mutex::new(parser),
        })
    }

    /// Parse Jasmin source text
    ///
    /// # Arguments
    ///
    /// - `text`: The source text to parse
    /// - `old`: Previous tree of the same document, enabling incremental
    ///   reparse. The result is equivalent to a full reparse.
    ///
    /// # Returns
    ///
    /// A [`Cst`] owning the tree together with a copy of `text`. Inputs
    /// with syntax errors still succeed; the errors appear as ERROR nodes.
    pub fn parse(&self, text: &str, old: Option<&Cst>) -> Result<Cst, ParseError> {
        let start = Instant::now();

        // Documents are synchronized with full-text replacement, so the old
        // tree is invalidated over its whole span before reuse.
        let edited = old.map(|cst| {
            let mut tree = cst.tree().clone();
            tree.edit(&full_replacement_edit(cst.source(), text));
            tree
        });

        let mut parser = self.parser.lock().unwrap_or_else(|e| e.into_inner());
        let tree = parser
            .parse(text, edited.as_ref())
            .ok_or(ParseError::ParseFailed)?;
        drop(parser);

        debug!(
            "Parsed {} bytes of Jasmin in {:?}",
            text.len(),
            start.elapsed()
        );

        Ok(Cst::new(tree, text))
    }
}

/// Build an InputEdit covering a whole-document replacement
fn full_replacement_edit(old_text: &str, new_text: &str) -> tree_sitter::InputEdit {
    tree_sitter::InputEdit {
        start_byte: 0,
        old_end_byte: old_text.len(),
        new_end_byte: new_text.len(),
        start_position: tree_sitter::Point { row: 0, column: 0 },
        old_end_position: end_point(old_text),
        new_end_position: end_point(new_text),
    }
}

/// Point just past the last byte of `text`
fn end_point(text: &str) -> tree_sitter::Point {
    let row = text.bytes().filter(|b| *b == b'\n').count();
    let column = match text.rfind('\n') {
        Some(idx) => text.len() - idx - 1,
        None => text.len(),
    };
    tree_sitter::Point { row, column }
}

impl std::fmt::Debug for ParserPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserPool").finish_non_exhaustive()
    }
}
