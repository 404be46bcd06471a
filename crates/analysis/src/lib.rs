// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Jasmin LSP - Analysis
//!
//! This crate provides the project-wide semantic analyses behind the Jasmin
//! language server.
//!
//! ## Overview
//!
//! All analyses are pure functions over [`Cst`](jasmin_lsp_syntax::Cst)
//! values; nothing here talks to an LSP client or holds server state.
//!
//! - [`symbols`]: extract typed symbols (functions, params, constants,
//!   globals, variables, type aliases) with ranges, details, and attached
//!   doc comments.
//! - [`requires`]: resolve `require` / `from NS require` directives to file
//!   URIs, including the sibling-namespace search.
//! - [`graph`]: compute the transitive require closure of a root file,
//!   loading unopened files from disk into a request-scoped [`graph::SourceMap`].
//! - [`eval`]: fixpoint evaluation of `param int` constant expressions
//!   across the whole file set.
//! - [`keywords`]: hover documentation for the Jasmin keyword set.

pub mod eval;
pub mod graph;
pub mod keywords;
pub mod requires;
pub mod symbols;

// Re-exports for convenience
pub use eval::ConstEvaluator;
pub use graph::{DependencyGraph, SourceMap};
pub use keywords::{is_keyword, keyword_documentation};
pub use requires::RequireResolver;
pub use symbols::{JasminSymbol, SymbolExtractor, SymbolKind};
