// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Symbol Rendering
//!
//! This module converts extracted symbols into LSP responses.
//!
//! ## Overview
//!
//! - Document symbols are hierarchical: functions contain their parameters
//!   and locals (by range containment); params, globals, and type aliases
//!   stay at the top level.
//! - Workspace symbols are a flat list filtered by case-insensitive
//!   substring match; an empty query yields everything.

use tower_lsp::lsp_types::{self, DocumentSymbol, Location, SymbolInformation};

use jasmin_lsp_analysis::symbols::{JasminSymbol, SymbolKind};

use crate::cst_utils::ts_range_to_lsp;

/// Symbol renderer - LSP views over extracted symbols
pub struct SymbolRenderer;

impl SymbolRenderer {
    /// Map an internal symbol kind to the LSP kind
    pub fn lsp_kind(kind: SymbolKind) -> lsp_types::SymbolKind {
        match kind {
            SymbolKind::Function => lsp_types::SymbolKind::FUNCTION,
            SymbolKind::Variable => lsp_types::SymbolKind::VARIABLE,
            SymbolKind::Parameter => lsp_types::SymbolKind::VARIABLE,
            SymbolKind::Constant => lsp_types::SymbolKind::CONSTANT,
            SymbolKind::Type => lsp_types::SymbolKind::STRUCT,
            SymbolKind::Global => lsp_types::SymbolKind::VARIABLE,
        }
    }

    /// Hierarchical outline of one document
    ///
    /// Functions become parents of the parameters and locals their
    /// definition range contains; everything else stays top level.
    pub fn render_document(symbols: Vec<JasminSymbol>) -> Vec<DocumentSymbol> {
        let (functions, others): (Vec<_>, Vec<_>) = symbols
            .into_iter()
            .partition(|s| s.kind == SymbolKind::Function);

        let mut claimed = vec![false; others.len()];
        let mut result = Vec::new();

        for function in &functions {
            let mut children = Vec::new();
            for (index, other) in others.iter().enumerate() {
                let nested = matches!(other.kind, SymbolKind::Parameter | SymbolKind::Variable)
                    && function.definition_range.start_byte <= other.range.start_byte
                    && other.range.end_byte <= function.definition_range.end_byte;
                if nested {
                    claimed[index] = true;
                    children.push(Self::document_symbol(other, Vec::new()));
                }
            }
            result.push(Self::document_symbol(function, children));
        }

        for (index, other) in others.iter().enumerate() {
            if !claimed[index] {
                result.push(Self::document_symbol(other, Vec::new()));
            }
        }

        // Back to document order
        result.sort_by_key(|s| (s.range.start.line, s.range.start.character));
        result
    }

    #[allow(deprecated)]
    fn document_symbol(symbol: &JasminSymbol, children: Vec<DocumentSymbol>) -> DocumentSymbol {
        DocumentSymbol {
            name: symbol.name.clone(),
            detail: symbol.detail.clone(),
            kind: Self::lsp_kind(symbol.kind),
            tags: None,
            deprecated: None,
            range: ts_range_to_lsp(symbol.definition_range),
            selection_range: ts_range_to_lsp(symbol.range),
            children: (!children.is_empty()).then_some(children),
        }
    }

    /// Flat workspace symbol list, filtered by query
    ///
    /// The filter is a case-insensitive substring match over symbol names;
    /// an empty query matches everything.
    #[allow(deprecated)]
    pub fn render_workspace(
        symbols: impl IntoIterator<Item = JasminSymbol>,
        query: &str,
    ) -> Vec<SymbolInformation> {
        let query = query.to_lowercase();

        symbols
            .into_iter()
            .filter(|s| query.is_empty() || s.name.to_lowercase().contains(&query))
            .map(|s| SymbolInformation {
                name: s.name.clone(),
                kind: Self::lsp_kind(s.kind),
                tags: None,
                deprecated: None,
                location: Location {
                    uri: s.uri.clone(),
                    range: ts_range_to_lsp(s.definition_range),
                },
                container_name: None,
            })
            .collect()
    }
}
