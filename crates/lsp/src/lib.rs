// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Jasmin LSP - Language Server
//!
//! This crate provides the LSP server implementation for the Jasmin
//! language.
//!
//! ## Overview
//!
//! The server provides:
//! - Project-wide navigation over the `require` graph of a master file
//! - Hover with keyword docs, signatures, and evaluated `param` constants
//! - Syntax diagnostics that survive buffer closure for dependency files
//! - Document/workspace symbols, references, and rename
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Client (VS Code, etc.)          │
//! └──────────────┬──────────────────────────┘
//!                │ LSP over stdio
//!                ↓
//! ┌─────────────────────────────────────────┐
//! │         LSP Backend (tower-lsp)         │
//! ├─────────────────────────────────────────┤
//! │  • did_open / did_change / did_close   │
//! │  • hover / definition / references      │
//! │  • symbols / rename / diagnostics       │
//! └──────┬───────────────┬──────────────────┘
//!        ↓               ↓
//! ┌────────────┐  ┌───────────────────────┐
//! │  Document  │  │   jasmin-lsp-analysis │
//! │   Store    │  │  (graph, symbols,     │
//! └────────────┘  │   requires, eval)     │
//!                 └───────────────────────┘
//! ```
//!
//! ## Custom protocol
//!
//! - Notification `jasmin/setMasterFile` with `{ "uri": "file://…" }`
//!   designates the compilation entry point whose dependency closure
//!   defines the project scope.
//! - Configuration section `jasmin-lsp` with `jasmin-root` (path of the
//!   master file) and `arch` (reserved).
//!
//! ## Error Handling
//!
//! The server uses graceful degradation throughout: unknown documents,
//! unparseable content, unreadable dependencies, and unevaluable
//! constants all produce empty results rather than protocol errors.

pub mod backend;
pub mod config;
pub mod cst_utils;
pub mod definition;
pub mod diagnostic;
pub mod document;
pub mod hover;
pub mod logging;
pub mod references;
pub mod symbols;

// Re-exports for convenience
pub use backend::{CloseAction, LspBackend, ServerState, SetMasterFileParams, close_action};
pub use config::{CONFIG_SECTION, ServerConfig};
pub use definition::DefinitionFinder;
pub use diagnostic::{DiagnosticCollector, publish_diagnostics_for_document};
pub use document::{Document, DocumentError, DocumentMetadata, DocumentStore};
pub use hover::HoverEngine;
pub use symbols::SymbolRenderer;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server name
pub const SERVER_NAME: &str = "jasmin-lsp";
