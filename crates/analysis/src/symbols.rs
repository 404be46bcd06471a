// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Symbol Extraction
//!
//! This module walks a Jasmin CST and produces the typed symbols the
//! server answers queries from.
//!
//! ## Overview
//!
//! Recognized declarations and the symbols they yield:
//!
//! | CST construct | Kind | Detail |
//! |---|---|---|
//! | `function_definition` | Function | reconstructed signature |
//! | `param_declaration` | Constant | `TYPE = EXPR` |
//! | `global_declaration` | Global | type text |
//! | `type_definition` | Type | `type` |
//! | `variable_declaration` | Variable (one per name) | shared storage + type text |
//! | `parameter_declaration` | Parameter (one per name) | shared storage + type text |
//!
//! A declaration that introduces several names produces one symbol per
//! name; the shared detail is the source slice from the declaration start
//! to the first name, so it never contains sibling names. Doc comments
//! attach per the rules in [`extract_doc_comment`]; parameters never carry
//! documentation. ERROR nodes are skipped without descending, and a
//! malformed declaration only loses its own symbols, never the rest of the
//! file's.

use jasmin_lsp_syntax::{Cst, NodeExt};
use lsp_types::Url;
use tracing::debug;
use tree_sitter::{Node, Range};

/// Symbol kind
///
/// Closed set; dispatch is by exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Function definition
    Function,
    /// Local variable declared in a function body
    Variable,
    /// Function parameter
    Parameter,
    /// `param` compile-time constant
    Constant,
    /// Type alias
    Type,
    /// Top-level typed declaration
    Global,
}

/// A symbol extracted from a Jasmin document
#[derive(Debug, Clone)]
pub struct JasminSymbol {
    /// Symbol name
    pub name: String,

    /// Symbol kind
    pub kind: SymbolKind,

    /// Span of the identifier itself
    pub range: Range,

    /// Span used as navigation target (the whole declaration)
    pub definition_range: Range,

    /// Document the symbol was extracted from
    pub uri: Url,

    /// Type text or signature
    pub detail: Option<String>,

    /// Attached doc comment, if any
    pub documentation: Option<String>,

    /// Declared expression text (constants only)
    pub value_expr: Option<String>,

    /// Evaluated value (constants only, populated by the const evaluator)
    pub computed_value: Option<i64>,
}

/// Symbol extractor - builds symbols from a parsed document
pub struct SymbolExtractor;

impl SymbolExtractor {
    /// Extract all symbols from a document
    ///
    /// # Arguments
    ///
    /// - `uri`: Document URI recorded on each symbol
    /// - `cst`: Parsed document
    ///
    /// # Returns
    ///
    /// Symbols in document order. Extraction never fails as a whole: a
    /// declaration the walker cannot make sense of is logged and skipped.
    pub fn extract(uri: &Url, cst: &Cst) -> Vec<JasminSymbol> {
        let mut symbols = Vec::new();

        for node in cst.root().iter_named_children() {
            match node.kind() {
                "function_definition" => Self::extract_function(uri, cst, &node, &mut symbols),
                "param_declaration" => Self::extract_constant(uri, cst, &node, &mut symbols),
                "global_declaration" => Self::extract_global(uri, cst, &node, &mut symbols),
                "type_definition" => Self::extract_type(uri, cst, &node, &mut symbols),
                // Never descend into unparseable regions
                "ERROR" => {}
                _ => {}
            }
        }

        symbols
    }

    fn extract_function(uri: &Url, cst: &Cst, node: &Node, symbols: &mut Vec<JasminSymbol>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            debug!("function definition without a name field, skipping");
            return;
        };

        symbols.push(JasminSymbol {
            name: cst.text_of(&name_node).to_string(),
            kind: SymbolKind::Function,
            range: name_node.range(),
            definition_range: node.range(),
            uri: uri.clone(),
            detail: Self::function_signature(cst, node),
            documentation: extract_doc_comment(node, cst),
            value_expr: None,
            computed_value: None,
        });

        if let Some(parameters) = node.child_by_field_name("parameters") {
            for decl in parameters.iter_named_children() {
                if decl.kind() == "parameter_declaration" {
                    Self::extract_declared_names(
                        uri,
                        cst,
                        &decl,
                        SymbolKind::Parameter,
                        symbols,
                    );
                }
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            Self::collect_locals(uri, cst, &body, symbols);
        }
    }

    /// Recursively collect `variable_declaration`s from a function body
    fn collect_locals(uri: &Url, cst: &Cst, node: &Node, symbols: &mut Vec<JasminSymbol>) {
        for child in node.iter_named_children() {
            match child.kind() {
                "variable_declaration" => {
                    Self::extract_declared_names(uri, cst, &child, SymbolKind::Variable, symbols);
                }
                "ERROR" => {}
                _ => Self::collect_locals(uri, cst, &child, symbols),
            }
        }
    }

    /// Emit one symbol per declared name, sharing the declaration's type text
    ///
    /// The detail is the source slice from the declaration start to the
    /// first name, so sibling names never leak into it. Documentation is
    /// attached to the first name only, and never to parameters.
    fn extract_declared_names(
        uri: &Url,
        cst: &Cst,
        decl: &Node,
        kind: SymbolKind,
        symbols: &mut Vec<JasminSymbol>,
    ) {
        let mut cursor = decl.walk();
        let names: Vec<Node> = decl.children_by_field_name("name", &mut cursor).collect();
        let Some(first) = names.first() else {
            debug!("declaration without name fields, skipping");
            return;
        };

        let prefix_start = decl.start_byte();
        let prefix_end = first.start_byte();
        let detail = cst.source()[prefix_start..prefix_end]
            .trim_end()
            .trim_end_matches(',')
            .trim_end()
            .to_string();
        let detail = (!detail.is_empty()).then_some(detail);

        let documentation = match kind {
            // Parameters never own comments
            SymbolKind::Parameter => None,
            _ => extract_doc_comment(decl, cst),
        };

        for (index, name_node) in names.iter().enumerate() {
            symbols.push(JasminSymbol {
                name: cst.text_of(name_node).to_string(),
                kind,
                range: name_node.range(),
                definition_range: decl.range(),
                uri: uri.clone(),
                detail: detail.clone(),
                // Attached to the first variable only, to avoid duplication
                documentation: if index == 0 {
                    documentation.clone()
                } else {
                    None
                },
                value_expr: None,
                computed_value: None,
            });
        }
    }

    fn extract_constant(uri: &Url, cst: &Cst, node: &Node, symbols: &mut Vec<JasminSymbol>) {
        let (Some(name_node), Some(type_node), Some(value_node)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("type"),
            node.child_by_field_name("value"),
        ) else {
            debug!("param declaration missing fields, skipping");
            return;
        };

        let type_text = cst.text_of(&type_node);
        let value_text = collapse_whitespace(cst.text_of(&value_node));

        symbols.push(JasminSymbol {
            name: cst.text_of(&name_node).to_string(),
            kind: SymbolKind::Constant,
            range: name_node.range(),
            definition_range: node.range(),
            uri: uri.clone(),
            detail: Some(format!("{} = {}", type_text, value_text)),
            documentation: extract_doc_comment(node, cst),
            value_expr: Some(value_text),
            computed_value: None,
        });
    }

    fn extract_global(uri: &Url, cst: &Cst, node: &Node, symbols: &mut Vec<JasminSymbol>) {
        let (Some(name_node), Some(type_node)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("type"),
        ) else {
            debug!("global declaration missing fields, skipping");
            return;
        };

        symbols.push(JasminSymbol {
            name: cst.text_of(&name_node).to_string(),
            kind: SymbolKind::Global,
            range: name_node.range(),
            definition_range: node.range(),
            uri: uri.clone(),
            detail: Some(cst.text_of(&type_node).to_string()),
            documentation: extract_doc_comment(node, cst),
            value_expr: None,
            computed_value: None,
        });
    }

    fn extract_type(uri: &Url, cst: &Cst, node: &Node, symbols: &mut Vec<JasminSymbol>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            debug!("type definition without a name field, skipping");
            return;
        };

        symbols.push(JasminSymbol {
            name: cst.text_of(&name_node).to_string(),
            kind: SymbolKind::Type,
            range: name_node.range(),
            definition_range: node.range(),
            uri: uri.clone(),
            detail: Some("type".to_string()),
            documentation: extract_doc_comment(node, cst),
            value_expr: None,
            computed_value: None,
        });
    }

    /// Reconstruct `fn NAME(PARAMS) -> RET` from the source text
    ///
    /// Takes the slice from the `fn` keyword to the body brace and
    /// collapses whitespace runs, so multi-line signatures come out on one
    /// line.
    fn function_signature(cst: &Cst, node: &Node) -> Option<String> {
        let fn_token = node.find_child(|c| c.kind() == "fn")?;
        let body = node.child_by_field_name("body")?;
        let slice = cst.source().get(fn_token.start_byte()..body.start_byte())?;
        Some(collapse_whitespace(slice))
    }
}

/// Collapse whitespace runs into single spaces
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the doc comment attached to a declaration
///
/// Walks backward over the declaration's siblings:
///
/// - consecutive `// …` lines form one block; at most one blank line may
///   separate the block from the declaration
/// - a single `/* … */` block comment is accepted under the same
///   one-blank-line rule; `/*`, `*/` and per-line leading `*` decoration
///   are stripped
/// - more than one blank line breaks the attachment entirely
pub fn extract_doc_comment(node: &Node, cst: &Cst) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut expected_row = node.start_position().row;
    let mut current = node.prev_sibling();

    while let Some(sibling) = current {
        let end_row = sibling.end_position().row;
        let gap = expected_row.saturating_sub(end_row);

        match sibling.kind() {
            "line_comment" => {
                // The first comment may sit one blank line away; within the
                // block the lines must be consecutive.
                let limit = if parts.is_empty() { 2 } else { 1 };
                if gap > limit {
                    break;
                }
                parts.push(strip_line_comment(cst.text_of(&sibling)));
                expected_row = sibling.start_position().row;
                current = sibling.prev_sibling();
            }
            "block_comment" => {
                if !parts.is_empty() || gap > 2 {
                    break;
                }
                parts.push(strip_block_comment(cst.text_of(&sibling)));
                break;
            }
            _ => break,
        }
    }

    if parts.is_empty() {
        return None;
    }

    parts.reverse();
    let text = parts.join("\n").trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn strip_line_comment(text: &str) -> String {
    text.strip_prefix("//").unwrap_or(text).trim().to_string()
}

fn strip_block_comment(text: &str) -> String {
    let inner = text.strip_prefix("/*").unwrap_or(text);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);

    inner
        .lines()
        .map(|line| {
            let line = line.trim_start();
            line.strip_prefix('*')
                .map(str::trim_start)
                .unwrap_or(line)
                .trim_end()
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
