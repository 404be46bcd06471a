// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # CST utility functions
//!
//! Conversions between LSP positions and tree-sitter points, shared across
//! the request handlers.
//!
//! Positions map 1:1 onto tree-sitter points: `Position.character` is
//! treated as a 0-based UTF-8 byte column, which is what tree-sitter
//! points carry natively.

use tower_lsp::lsp_types::{Position, Range};
use tree_sitter::{Node, Point};

/// Convert an LSP position to a tree-sitter point
pub fn position_to_point(position: Position) -> Point {
    Point {
        row: position.line as usize,
        column: position.character as usize,
    }
}

/// Convert a tree-sitter point to an LSP position
pub fn point_to_position(point: Point) -> Position {
    Position {
        line: point.row as u32,
        character: point.column as u32,
    }
}

/// Convert a tree-sitter range to an LSP range
pub fn ts_range_to_lsp(range: tree_sitter::Range) -> Range {
    Range {
        start: point_to_position(range.start_point),
        end: point_to_position(range.end_point),
    }
}

/// Convert a tree-sitter node to an LSP Range
pub fn node_to_range(node: &Node) -> Range {
    Range {
        start: point_to_position(node.start_position()),
        end: point_to_position(node.end_position()),
    }
}

/// Convert an LSP position to a byte offset into the source
///
/// # Returns
///
/// `None` if the line does not exist. The offset is clamped to the end of
/// the source for positions past the last column.
pub fn position_to_byte_offset(source: &str, position: Position) -> Option<usize> {
    let mut offset = 0usize;
    let mut line = 0u32;

    if position.line > 0 {
        let mut found = false;
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line += 1;
                if line == position.line {
                    offset = idx + 1;
                    found = true;
                    break;
                }
            }
        }
        if !found {
            return None;
        }
    }

    Some((offset + position.character as usize).min(source.len()))
}

/// Extract the word under a position
///
/// Expands over identifier bytes (alphanumeric, `_`, and any multi-byte
/// UTF-8 sequence) in both directions. A cursor sitting just past the last
/// character of a word still finds it.
pub fn word_at(source: &str, position: Position) -> Option<String> {
    let bytes = source.as_bytes();
    let mut offset = position_to_byte_offset(source, position)?;

    let is_word_byte = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80;

    // Cursor at the end of a word
    if (offset >= bytes.len() || !is_word_byte(bytes[offset]))
        && offset > 0
        && is_word_byte(bytes[offset - 1])
    {
        offset -= 1;
    }

    if offset >= bytes.len() || !is_word_byte(bytes[offset]) {
        return None;
    }

    let mut start = offset;
    while start > 0 && is_word_byte(bytes[start - 1]) {
        start -= 1;
    }
    let mut end = offset + 1;
    while end < bytes.len() && is_word_byte(bytes[end]) {
        end += 1;
    }

    // Words starting with a digit are literals, not identifiers or keywords
    if bytes[start].is_ascii_digit() {
        return None;
    }

    source.get(start..end).map(str::to_string)
}
