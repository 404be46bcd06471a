// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Go-to-Definition for Jasmin
//!
//! This module resolves the symbol under the cursor to its declaration.
//!
//! ## Resolution order
//!
//! 1. A cursor inside the filename string of a `require` directive jumps
//!    to the top of the required file, resolved with the same search rules
//!    the dependency graph uses.
//! 2. Otherwise the identifier is looked up by scope priority in the
//!    current file: a parameter of the containing function wins over a
//!    local variable of the containing function, which wins over any
//!    symbol anywhere in the file.
//! 3. Failing that, the remaining files of the relevant set are searched
//!    in traversal order and the first name match wins.
//!
//! A miss is a null result, never an error.

use tower_lsp::lsp_types::{Location, Position, Range, Url};
use tree_sitter::Node;

use jasmin_lsp_analysis::graph::SourceMap;
use jasmin_lsp_analysis::requires::RequireResolver;
use jasmin_lsp_analysis::symbols::{JasminSymbol, SymbolExtractor, SymbolKind};
use jasmin_lsp_syntax::{Cst, NodeExt};

use crate::cst_utils::{position_to_point, ts_range_to_lsp};

/// Definition finder - resolves the symbol under the cursor
pub struct DefinitionFinder;

impl DefinitionFinder {
    /// Find the definition for the symbol at a position
    ///
    /// # Arguments
    ///
    /// - `uri`: Document the cursor is in
    /// - `position`: Cursor position
    /// - `cst`: Parse of the cursor document
    /// - `sources`: Relevant file set for the query
    ///
    /// # Returns
    ///
    /// The definition location, or `None` when the cursor is not on a
    /// resolvable symbol.
    pub fn find(
        uri: &Url,
        position: Position,
        cst: &Cst,
        sources: &SourceMap,
    ) -> Option<Location> {
        let node = cst.node_at(position_to_point(position))?;

        if let Some(location) = Self::require_target(uri, cst, &node) {
            return Some(location);
        }

        if node.kind() != "identifier" {
            return None;
        }
        let name = cst.text_of(&node);

        let containing_function = node
            .find_ancestor(|n| n.kind() == "function_definition")
            .map(|f| f.range());

        let local_symbols = SymbolExtractor::extract(uri, cst);
        if let Some(symbol) = Self::select_in_file(&local_symbols, name, containing_function) {
            return Some(Self::to_location(symbol));
        }

        // Cross-file fallback: first name match in traversal order
        for (other_uri, other_cst) in sources.iter() {
            if other_uri == uri {
                continue;
            }
            let symbols = SymbolExtractor::extract(other_uri, other_cst);
            if let Some(symbol) = symbols.iter().find(|s| s.name == name) {
                return Some(Self::to_location(symbol));
            }
        }

        None
    }

    /// Jump target for a cursor inside a require filename string
    fn require_target(uri: &Url, cst: &Cst, node: &Node) -> Option<Location> {
        if node.kind() != "string_literal" {
            return None;
        }
        let require = node.parent().filter(|p| p.kind() == "require_statement")?;

        let namespace = require
            .child_by_field_name("namespace")
            .map(|n| cst.text_of(&n).to_string());
        let filename = cst.text_of(node).trim_matches('"').to_string();

        let base_dir = uri.to_file_path().ok()?.parent()?.to_path_buf();
        let target = RequireResolver::resolve_target(&base_dir, namespace.as_deref(), &filename)?;

        Some(Location {
            uri: target,
            range: Range::new(Position::new(0, 0), Position::new(0, 0)),
        })
    }

    /// Scope-priority selection within the cursor's file
    ///
    /// Parameter in the containing function, then variable in the
    /// containing function, then any symbol of that name in the file.
    fn select_in_file<'a>(
        symbols: &'a [JasminSymbol],
        name: &str,
        containing_function: Option<tree_sitter::Range>,
    ) -> Option<&'a JasminSymbol> {
        if let Some(function_range) = containing_function {
            for kind in [SymbolKind::Parameter, SymbolKind::Variable] {
                if let Some(symbol) = symbols.iter().find(|s| {
                    s.kind == kind && s.name == name && within(function_range, s.range)
                }) {
                    return Some(symbol);
                }
            }
        }

        symbols.iter().find(|s| s.name == name)
    }

    fn to_location(symbol: &JasminSymbol) -> Location {
        Location {
            uri: symbol.uri.clone(),
            range: ts_range_to_lsp(symbol.definition_range),
        }
    }
}

/// Whether `inner` lies inside `container`
fn within(container: tree_sitter::Range, inner: tree_sitter::Range) -> bool {
    container.start_byte <= inner.start_byte && inner.end_byte <= container.end_byte
}
