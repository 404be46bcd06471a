// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Jasmin LSP - Syntax
//!
//! This crate provides parsing and concrete syntax tree handling for the
//! Jasmin language server.
//!
//! ## Overview
//!
//! Two types make up the crate's surface:
//!
//! - [`ParserPool`]: the single per-process tree-sitter parser configured
//!   for Jasmin. Parse calls serialize on an internal mutex (the parser is
//!   not reentrant); produced trees can be read concurrently.
//! - [`Cst`]: a parsed tree bound to the exact source text it indexes.
//!   Nodes are borrows whose lifetime is tied to the `Cst`, so no node can
//!   outlive the tree and source it points into. Trees that must cross
//!   request boundaries are shared as `Arc<Cst>`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use jasmin_lsp_syntax::ParserPool;
//!
//! let pool = ParserPool::new()?;
//! let cst = pool.parse("param int N = 4;", None)?;
//! assert_eq!(cst.root().kind(), "source_file");
//! ```

pub mod cst;
pub mod parser;

// Re-exports for convenience
pub use cst::{Cst, NodeExt};
pub use parser::{ParseError, ParserPool};
