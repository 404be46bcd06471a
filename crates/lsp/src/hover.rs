// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Hover Information Provider
//!
//! This module builds hover content for the symbol or keyword under the
//! cursor.
//!
//! ## Overview
//!
//! Keywords answer from the static keyword table and never fall through
//! to the symbol search. For identifiers the engine builds the relevant
//! file set once, extracts symbols from every file, runs the constant
//! evaluator over the whole set, and formats the first name match:
//!
//! - a fenced code block with the symbol signature
//! - for constants with a computed value, a **Value** section showing the
//!   declared expression and the computed value (just the value when the
//!   expression already is the literal)
//! - for documented symbols, a horizontal rule followed by the doc text

use tower_lsp::lsp_types::{Position, Url};

use jasmin_lsp_analysis::eval::ConstEvaluator;
use jasmin_lsp_analysis::graph::SourceMap;
use jasmin_lsp_analysis::keywords::keyword_documentation;
use jasmin_lsp_analysis::symbols::{JasminSymbol, SymbolExtractor, SymbolKind};
use jasmin_lsp_syntax::Cst;

use crate::cst_utils::word_at;

/// Hover engine for Jasmin documents
pub struct HoverEngine;

impl HoverEngine {
    /// Build hover markdown for a position
    ///
    /// # Returns
    ///
    /// Markdown content, or `None` when there is nothing to show (which
    /// the dispatcher turns into a null result, not an error).
    pub fn hover_text(
        uri: &Url,
        position: Position,
        cst: &Cst,
        sources: &SourceMap,
    ) -> Option<String> {
        let word = word_at(cst.source(), position)?;

        // Keywords never reach the symbol search
        if let Some(content) = Self::keyword_hover(&word) {
            return Some(content);
        }

        let values = ConstEvaluator::evaluate(sources);

        // The cursor's own file is searched first, then the rest of the
        // set in traversal order
        if let Some(symbol) = Self::find_in(uri, cst, &word) {
            return Some(Self::format(&Self::with_value(symbol, &values)));
        }
        for (other_uri, other_cst) in sources.iter() {
            if other_uri == uri {
                continue;
            }
            if let Some(symbol) = Self::find_in(other_uri, other_cst, &word) {
                return Some(Self::format(&Self::with_value(symbol, &values)));
            }
        }

        None
    }

    /// Hover content for a Jasmin keyword
    pub fn keyword_hover(word: &str) -> Option<String> {
        keyword_documentation(word).map(|doc| format!("```jasmin\n{}\n```\n\n{}", word, doc))
    }

    fn find_in(uri: &Url, cst: &Cst, name: &str) -> Option<JasminSymbol> {
        SymbolExtractor::extract(uri, cst)
            .into_iter()
            .find(|s| s.name == name)
    }

    fn with_value(
        mut symbol: JasminSymbol,
        values: &std::collections::HashMap<String, i64>,
    ) -> JasminSymbol {
        if symbol.kind == SymbolKind::Constant {
            symbol.computed_value = values.get(&symbol.name).copied();
        }
        symbol
    }

    /// Format one symbol as hover markdown
    fn format(symbol: &JasminSymbol) -> String {
        let signature = match (symbol.kind, symbol.detail.as_deref()) {
            (SymbolKind::Function, Some(detail)) => detail.to_string(),
            (SymbolKind::Type, _) => format!("type {}", symbol.name),
            (_, Some(detail)) => format!("{}: {}", symbol.name, detail),
            (_, None) => symbol.name.clone(),
        };

        let mut content = format!("```jasmin\n{}\n```", signature);

        if symbol.kind == SymbolKind::Constant {
            if let Some(value) = symbol.computed_value {
                let value_text = value.to_string();
                let line = match symbol.value_expr.as_deref() {
                    Some(expr) if expr != value_text => format!("`{}` = `{}`", expr, value_text),
                    _ => format!("`{}`", value_text),
                };
                content.push_str(&format!("\n\n**Value**\n\n{}", line));
            }
        }

        if let Some(doc) = &symbol.documentation {
            content.push_str(&format!("\n\n---\n\n{}", doc));
        }

        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jasmin_lsp_analysis::symbols::SymbolKind;
    use tree_sitter::{Point, Range};

    fn symbol(kind: SymbolKind, name: &str, detail: Option<&str>) -> JasminSymbol {
        let zero = Range {
            start_byte: 0,
            end_byte: 0,
            start_point: Point { row: 0, column: 0 },
            end_point: Point { row: 0, column: 0 },
        };
        JasminSymbol {
            name: name.to_string(),
            kind,
            range: zero,
            definition_range: zero,
            uri: Url::parse("file:///test/main.jazz").unwrap(),
            detail: detail.map(str::to_string),
            documentation: None,
            value_expr: None,
            computed_value: None,
        }
    }

    #[test]
    fn test_format_variable_signature() {
        let sym = symbol(SymbolKind::Variable, "j", Some("reg u32"));
        assert_eq!(HoverEngine::format(&sym), "```jasmin\nj: reg u32\n```");
    }

    #[test]
    fn test_format_function_uses_signature_detail() {
        let sym = symbol(
            SymbolKind::Function,
            "add",
            Some("fn add(reg u64 x, reg u64 y) -> reg u64"),
        );
        assert_eq!(
            HoverEngine::format(&sym),
            "```jasmin\nfn add(reg u64 x, reg u64 y) -> reg u64\n```"
        );
    }

    #[test]
    fn test_format_constant_with_derived_value() {
        let mut sym = symbol(SymbolKind::Constant, "NEXT", Some("int = BASE + 1"));
        sym.value_expr = Some("BASE + 1".to_string());
        sym.computed_value = Some(43);

        let content = HoverEngine::format(&sym);
        assert!(content.contains("NEXT: int = BASE + 1"));
        assert!(content.contains("**Value**"));
        assert!(content.contains("`BASE + 1` = `43`"));
    }

    #[test]
    fn test_format_constant_literal_value_not_duplicated() {
        let mut sym = symbol(SymbolKind::Constant, "BASE", Some("int = 42"));
        sym.value_expr = Some("42".to_string());
        sym.computed_value = Some(42);

        let content = HoverEngine::format(&sym);
        assert!(content.contains("**Value**\n\n`42`"));
        assert!(!content.contains("= `42`"));
    }

    #[test]
    fn test_format_documentation_after_rule() {
        let mut sym = symbol(SymbolKind::Constant, "N", Some("int = 1"));
        sym.documentation = Some("Counter width.".to_string());

        let content = HoverEngine::format(&sym);
        assert!(content.contains("\n\n---\n\nCounter width."));
    }
}
