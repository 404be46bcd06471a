// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Constant Evaluation
//!
//! This module evaluates `param int NAME = EXPR;` declarations across a
//! project.
//!
//! ## Overview
//!
//! Params may reference each other across files, so evaluation runs as a
//! fixpoint over the whole [`SourceMap`]: each pass evaluates every param
//! whose dependencies are already resolved, until a pass makes no progress
//! or the pass cap is hit (cycles and references to unknown names simply
//! stay unevaluated). Arithmetic is wrapping `i64`; division and modulo by
//! zero leave the param unevaluated rather than erroring.

use std::collections::HashMap;

use tracing::debug;
use tree_sitter::Node;

use jasmin_lsp_syntax::NodeExt;

use crate::graph::SourceMap;
use crate::symbols::{JasminSymbol, SymbolKind};

/// Passes after which an unresolved param is considered cyclic
const MAX_PASSES: usize = 10;

/// Constant evaluator - fixpoint evaluation of `param` expressions
pub struct ConstEvaluator;

impl ConstEvaluator {
    /// Evaluate all params in the given file set
    ///
    /// # Returns
    ///
    /// Name → value for every param that could be resolved. Params with
    /// cyclic, unknown, or non-integer dependencies are absent.
    pub fn evaluate(sources: &SourceMap) -> HashMap<String, i64> {
        // (name, value expression, source) for every param declaration
        let mut params: Vec<(String, Node, &str)> = Vec::new();

        for (_uri, cst) in sources.iter() {
            for node in cst.root().iter_named_children() {
                if node.kind() != "param_declaration" {
                    continue;
                }
                let (Some(name), Some(value)) = (
                    node.child_by_field_name("name"),
                    node.child_by_field_name("value"),
                ) else {
                    continue;
                };
                params.push((cst.text_of(&name).to_string(), value, cst.source()));
            }
        }

        let mut values: HashMap<String, i64> = HashMap::new();

        for pass in 0..MAX_PASSES {
            let mut progress = false;

            for (name, value_node, source) in &params {
                if values.contains_key(name) {
                    continue;
                }
                if let Some(value) = eval_expression(value_node, source, &values) {
                    values.insert(name.clone(), value);
                    progress = true;
                }
            }

            if !progress {
                debug!(
                    "constant evaluation settled after {} passes ({} of {} resolved)",
                    pass + 1,
                    values.len(),
                    params.len()
                );
                break;
            }
        }

        values
    }

    /// Attach evaluated values to Constant symbols
    ///
    /// Sets `computed_value` and rewrites the detail from `TYPE = EXPR` to
    /// `TYPE = EXPR = VALUE`, unless the expression already is the value
    /// textually (a plain literal), in which case nothing is appended.
    pub fn annotate(symbols: &mut [JasminSymbol], values: &HashMap<String, i64>) {
        for symbol in symbols {
            if symbol.kind != SymbolKind::Constant {
                continue;
            }
            let Some(value) = values.get(&symbol.name) else {
                continue;
            };

            symbol.computed_value = Some(*value);

            let value_text = value.to_string();
            let is_plain_literal = symbol
                .value_expr
                .as_deref()
                .is_some_and(|expr| expr == value_text);

            if !is_plain_literal {
                if let Some(detail) = &symbol.detail {
                    symbol.detail = Some(format!("{} = {}", detail, value_text));
                }
            }
        }
    }
}

/// Evaluate one expression node against the current environment
///
/// Returns `None` when the expression references an unresolved name,
/// divides by zero, or contains a construct outside the supported constant
/// grammar.
pub fn eval_expression(node: &Node, source: &str, env: &HashMap<String, i64>) -> Option<i64> {
    match node.kind() {
        "integer_literal" => parse_integer(&source[node.byte_range()]),
        "identifier" => env.get(&source[node.byte_range()]).copied(),
        "parenthesized_expression" => {
            let inner = node.iter_named_children().next()?;
            eval_expression(&inner, source, env)
        }
        "unary_expression" => {
            let operator = node.child_by_field_name("operator")?;
            let operand = node.child_by_field_name("operand")?;
            let value = eval_expression(&operand, source, env)?;
            match &source[operator.byte_range()] {
                "-" => Some(value.wrapping_neg()),
                "+" => Some(value),
                "~" => Some(!value),
                "!" => Some(i64::from(value == 0)),
                _ => None,
            }
        }
        "binary_expression" => {
            let operator = node.child_by_field_name("operator")?;
            let left = eval_expression(&node.child_by_field_name("left")?, source, env)?;
            let right = eval_expression(&node.child_by_field_name("right")?, source, env)?;
            apply_binary(&source[operator.byte_range()], left, right)
        }
        _ => None,
    }
}

fn apply_binary(operator: &str, left: i64, right: i64) -> Option<i64> {
    match operator {
        "+" => Some(left.wrapping_add(right)),
        "-" => Some(left.wrapping_sub(right)),
        "*" => Some(left.wrapping_mul(right)),
        // Division and modulo by zero yield "unevaluated", not an error
        "/" => (right != 0).then(|| left.wrapping_div(right)),
        "%" => (right != 0).then(|| left.wrapping_rem(right)),
        "&" => Some(left & right),
        "|" => Some(left | right),
        "^" => Some(left ^ right),
        // Shift amounts are masked to 0..=63
        "<<" => Some(left.wrapping_shl(right as u32)),
        ">>" => Some(left.wrapping_shr(right as u32)),
        _ => None,
    }
}

/// Parse a Jasmin integer literal: decimal, `0x…` hex, or `0b…` binary,
/// with optional `_` digit separators
fn parse_integer(text: &str) -> Option<i64> {
    let text = text.replace('_', "");

    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        // Full-range hex wraps into i64
        return u64::from_str_radix(hex, 16).ok().map(|v| v as i64);
    }
    if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        return u64::from_str_radix(bin, 2).ok().map(|v| v as i64);
    }

    text.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_radixes() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("0x2A"), Some(42));
        assert_eq!(parse_integer("0b101010"), Some(42));
        assert_eq!(parse_integer("1_000_000"), Some(1_000_000));
        assert_eq!(parse_integer("0xFFFFFFFFFFFFFFFF"), Some(-1));
        assert_eq!(parse_integer("nope"), None);
    }

    #[test]
    fn test_apply_binary_operators() {
        assert_eq!(apply_binary("+", 2, 3), Some(5));
        assert_eq!(apply_binary("-", 2, 3), Some(-1));
        assert_eq!(apply_binary("*", 6, 7), Some(42));
        assert_eq!(apply_binary("/", 7, 2), Some(3));
        assert_eq!(apply_binary("%", 7, 2), Some(1));
        assert_eq!(apply_binary("<<", 1, 4), Some(16));
        assert_eq!(apply_binary(">>", 16, 4), Some(1));
        assert_eq!(apply_binary("&", 0b1100, 0b1010), Some(0b1000));
        assert_eq!(apply_binary("|", 0b1100, 0b1010), Some(0b1110));
        assert_eq!(apply_binary("^", 0b1100, 0b1010), Some(0b0110));
    }

    #[test]
    fn test_apply_binary_division_by_zero() {
        assert_eq!(apply_binary("/", 1, 0), None);
        assert_eq!(apply_binary("%", 1, 0), None);
    }

    #[test]
    fn test_apply_binary_overflow_wraps() {
        assert_eq!(apply_binary("+", i64::MAX, 1), Some(i64::MIN));
        assert_eq!(apply_binary("*", i64::MAX, 2), Some(-2));
    }
}
