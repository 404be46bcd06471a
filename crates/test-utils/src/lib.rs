// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Jasmin LSP - Test Utilities
//!
//! Shared fixtures and helpers for the jasmin-lsp test suites.

pub mod fixtures;
pub mod project;

pub use fixtures::JazzFixtures;
pub use project::ProjectBuilder;
