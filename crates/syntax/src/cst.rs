// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Concrete Syntax Trees
//!
//! This module binds a parsed tree-sitter tree to the source text it
//! indexes.
//!
//! ## Overview
//!
//! Tree-sitter nodes carry byte offsets into the text that was parsed, so
//! a node is only meaningful next to that exact text. [`Cst`] owns both
//! halves; [`tree_sitter::Node`] values handed out by it borrow the `Cst`
//! and cannot outlive it. Components that hold trees across awaits or
//! request boundaries share them as `Arc<Cst>`; the superseded tree of an
//! edited document is freed once the last in-flight reader drops its clone.

use std::sync::Arc;
use tree_sitter::{Node, Point, TreeCursor};

/// A parsed Jasmin document: tree plus the source text it indexes
///
/// The tree and its source always travel together; releasing the `Cst`
/// releases the underlying parser allocation.
#[derive(Debug, Clone)]
pub struct Cst {
    tree: tree_sitter::Tree,
    source: Arc<str>,
}

impl Cst {
    /// Bind a freshly parsed tree to its source text
    pub fn new(tree: tree_sitter::Tree, source: &str) -> Self {
        Self {
            tree,
            source: Arc::from(source),
        }
    }

    /// The root node of the tree
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// The underlying tree
    pub fn tree(&self) -> &tree_sitter::Tree {
        &self.tree
    }

    /// The source text this tree indexes
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Shared handle to the source text
    pub fn source_arc(&self) -> Arc<str> {
        self.source.clone()
    }

    /// Innermost named node containing the given point
    ///
    /// # Arguments
    ///
    /// - `point`: 0-based row and 0-based UTF-8 byte column
    pub fn node_at(&self, point: Point) -> Option<Node<'_>> {
        self.root().named_descendant_for_point_range(point, point)
    }

    /// Text of a node, by byte slice into the source
    pub fn text_of(&self, node: &Node) -> &str {
        &self.source[node.byte_range()]
    }
}

/// Iterator over a node's children
///
/// This provides a cleaner interface than repeatedly calling
/// `node.children(&mut node.walk())`.
pub struct ChildIter<'a> {
    cursor: TreeCursor<'a>,
    entered: bool,
}

impl<'a> ChildIter<'a> {
    fn new(node: &Node<'a>) -> Self {
        Self {
            cursor: node.walk(),
            entered: false,
        }
    }
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.entered {
            self.entered = true;
            if self.cursor.goto_first_child() {
                Some(self.cursor.node())
            } else {
                None
            }
        } else if self.cursor.goto_next_sibling() {
            Some(self.cursor.node())
        } else {
            None
        }
    }
}

/// Extension trait for tree-sitter Node to provide more convenient traversal
pub trait NodeExt<'a> {
    /// Iterate over all children (named and anonymous)
    fn iter_children(&self) -> ChildIter<'a>;

    /// Iterate over named children only
    fn iter_named_children(&self) -> impl Iterator<Item = Node<'a>>;

    /// First child matching a predicate
    fn find_child<P>(&self, predicate: P) -> Option<Node<'a>>
    where
        P: Fn(&Node) -> bool;

    /// Nearest ancestor (excluding self) matching a predicate
    fn find_ancestor<P>(&self, predicate: P) -> Option<Node<'a>>
    where
        P: Fn(&Node) -> bool;
}

impl<'a> NodeExt<'a> for Node<'a> {
    fn iter_children(&self) -> ChildIter<'a> {
        ChildIter::new(self)
    }

    fn iter_named_children(&self) -> impl Iterator<Item = Node<'a>> {
        self.iter_children().filter(Node::is_named)
    }

    fn find_child<P>(&self, predicate: P) -> Option<Node<'a>>
    where
        P: Fn(&Node) -> bool,
    {
        self.iter_children().find(|n| predicate(n))
    }

    fn find_ancestor<P>(&self, predicate: P) -> Option<Node<'a>>
    where
        P: Fn(&Node) -> bool,
    {
        let mut current = self.parent();
        while let Some(node) = current {
            if predicate(&node) {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParserPool;

    fn parse(source: &str) -> Option<Cst> {
        match ParserPool::new() {
            Ok(pool) => pool.parse(source, None).ok(),
            Err(_) => {
                println!("Skipping test: Jasmin grammar not compiled");
                None
            }
        }
    }

    #[test]
    fn test_node_at_finds_identifier() {
        let Some(cst) = parse("param int ROUNDS = 24;") else {
            return;
        };

        // Column 12 lands inside "ROUNDS"
        let node = cst.node_at(Point { row: 0, column: 12 }).unwrap();
        assert_eq!(node.kind(), "identifier");
        assert_eq!(cst.text_of(&node), "ROUNDS");
    }

    #[test]
    fn test_node_at_end_of_file() {
        let Some(cst) = parse("param int N = 4;\n") else {
            return;
        };

        // A point past the last token still resolves to some named node
        let node = cst.node_at(Point { row: 1, column: 0 });
        assert!(node.is_some());
    }

    #[test]
    fn test_text_of_multibyte_identifier() {
        let Some(cst) = parse("param int zähler = 1;") else {
            return;
        };

        let param = cst.root().named_child(0).unwrap();
        let name = param.child_by_field_name("name").unwrap();
        assert_eq!(cst.text_of(&name), "zähler");
        // Columns are byte offsets: "param int " is 10 bytes
        assert_eq!(name.start_position().column, 10);
    }

    #[test]
    fn test_iter_children_includes_anonymous() {
        let Some(cst) = parse("param int N = 4;") else {
            return;
        };

        let param = cst.root().named_child(0).unwrap();
        let kinds: Vec<_> = param.iter_children().map(|n| n.kind().to_string()).collect();
        assert!(kinds.contains(&"param".to_string()));
        assert!(kinds.contains(&";".to_string()));
    }

    #[test]
    fn test_find_ancestor() {
        let Some(cst) = parse("fn f() { reg u64 x; x = 1; }") else {
            return;
        };

        let node = cst
            .node_at(Point { row: 0, column: 17 })
            .expect("node at x");
        let func = node.find_ancestor(|n| n.kind() == "function_definition");
        assert!(func.is_some());
    }
}
