// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Jasmin Grammar
//!
//! This crate provides the tree-sitter grammar for the Jasmin language.
//!
//! ## Build Process
//!
//! The build script (`build.rs`) produces the parser from the vendored
//! grammar definition:
//!
//! 1. Runs `tree-sitter generate -o gen` on `src/grammar/grammar.js`
//!    (skipped when the cached `gen/parser.c` is up to date)
//! 2. Compiles `parser.c` with `cc` into the crate
//!
//! When neither a cached parser nor the `tree-sitter` CLI is available the
//! crate still builds; [`language()`] then returns `None` and callers are
//! expected to degrade (the language server starts but answers queries
//! with empty results, and grammar-dependent tests skip).
//!
//! ## Usage
//!
//! ```rust,ignore
//! if let Some(lang) = jasmin_grammar::language() {
//!     let mut parser = tree_sitter::Parser::new();
//!     parser.set_language(lang).unwrap();
//!     let tree = parser.parse("param int N = 4;", None);
//! }
//! ```

use std::sync::OnceLock;

#[cfg(jasmin_grammar_compiled)]
unsafe extern "C" {
    fn tree_sitter_jasmin() -> *const ();
}

/// Get the tree-sitter Language for Jasmin
///
/// # Returns
///
/// - `Some(Language)` - Compiled tree-sitter language object
/// - `None` - The grammar was not compiled into this build
pub fn language() -> Option<&'static tree_sitter::Language> {
    static JASMIN_LANG: OnceLock<Option<tree_sitter::Language>> = OnceLock::new();

    JASMIN_LANG
        .get_or_init(|| {
            #[cfg(jasmin_grammar_compiled)]
            unsafe {
                // Safety: tree_sitter_jasmin() returns a pointer to the language
                // object compiled by tree-sitter from src/grammar/grammar.js
                Some(std::mem::transmute::<*const (), tree_sitter::Language>(
                    tree_sitter_jasmin(),
                ))
            }
            #[cfg(not(jasmin_grammar_compiled))]
            None
        })
        .as_ref()
}
