// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # References and Rename
//!
//! This module finds every occurrence of a name across the relevant file
//! set.
//!
//! ## Overview
//!
//! Occurrences are `identifier` nodes with matching text, found by a
//! structural walk; comments and string literals are separate node kinds,
//! so text inside them can never match. The declaration site is an
//! identifier node like any other and is therefore always part of the
//! result, regardless of the request's `include_declaration` flag.
//!
//! Rename is the same scan emitting one text edit per occurrence; renaming
//! a keyword is rejected before the scan.

use std::collections::HashMap;

use tower_lsp::lsp_types::{Location, TextEdit, Url};
use tree_sitter::Node;

use jasmin_lsp_analysis::graph::SourceMap;
use jasmin_lsp_syntax::{Cst, NodeExt};

use crate::cst_utils::node_to_range;

/// Collect every occurrence of `name` across the file set
///
/// # Returns
///
/// Locations in traversal order, document order within each file.
pub fn collect_references(name: &str, sources: &SourceMap) -> Vec<Location> {
    let mut locations = Vec::new();

    for (uri, cst) in sources.iter() {
        collect_in_node(&cst.root(), cst, name, uri, &mut locations);
    }

    locations
}

fn collect_in_node(
    node: &Node,
    cst: &Cst,
    name: &str,
    uri: &Url,
    locations: &mut Vec<Location>,
) {
    for child in node.iter_named_children() {
        if child.kind() == "identifier" {
            if cst.text_of(&child) == name {
                locations.push(Location {
                    uri: uri.clone(),
                    range: node_to_range(&child),
                });
            }
        } else {
            collect_in_node(&child, cst, name, uri, locations);
        }
    }
}

/// Build the workspace edit that renames every occurrence of `name`
pub fn rename_edits(
    name: &str,
    new_name: &str,
    sources: &SourceMap,
) -> HashMap<Url, Vec<TextEdit>> {
    let mut changes: HashMap<Url, Vec<TextEdit>> = HashMap::new();

    for location in collect_references(name, sources) {
        changes.entry(location.uri).or_default().push(TextEdit {
            range: location.range,
            new_text: new_name.to_string(),
        });
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use jasmin_lsp_syntax::ParserPool;
    use std::sync::Arc;

    fn sources(files: &[(&str, &str)]) -> Option<SourceMap> {
        let pool = match ParserPool::new() {
            Ok(p) => p,
            Err(_) => {
                println!("Skipping test: Jasmin grammar not compiled");
                return None;
            }
        };

        let mut map = SourceMap::new();
        for (path, source) in files {
            let uri = Url::from_file_path(path).unwrap();
            map.insert(uri, Arc::new(pool.parse(source, None).unwrap()));
        }
        Some(map)
    }

    #[test]
    fn test_references_include_declaration_and_uses() {
        let Some(map) = sources(&[(
            "/p/main.jazz",
            "fn f() {\n  reg u64 acc;\n  acc = 1;\n  acc = acc + 1;\n}",
        )]) else {
            return;
        };

        let refs = collect_references("acc", &map);
        assert_eq!(refs.len(), 4);
    }

    #[test]
    fn test_references_skip_comments_and_strings() {
        let Some(map) = sources(&[(
            "/p/main.jazz",
            "// acc is great\nrequire \"acc\"\nfn f() {\n  reg u64 acc;\n}",
        )]) else {
            return;
        };

        let refs = collect_references("acc", &map);
        assert_eq!(refs.len(), 1, "comment and string occurrences must not count");
    }

    #[test]
    fn test_references_span_files() {
        let Some(map) = sources(&[
            ("/p/def.jinc", "param int WIDTH = 8;"),
            ("/p/use.jazz", "fn f() {\n  reg u64 x;\n  x = WIDTH;\n}"),
        ]) else {
            return;
        };

        let refs = collect_references("WIDTH", &map);
        assert_eq!(refs.len(), 2);
        assert_ne!(refs[0].uri, refs[1].uri);
    }

    #[test]
    fn test_rename_edits_group_by_file() {
        let Some(map) = sources(&[
            ("/p/def.jinc", "param int WIDTH = 8;"),
            ("/p/use.jazz", "fn f() {\n  reg u64 x;\n  x = WIDTH + WIDTH;\n}"),
        ]) else {
            return;
        };

        let edits = rename_edits("WIDTH", "SPAN", &map);
        assert_eq!(edits.len(), 2);

        let use_uri = Url::from_file_path("/p/use.jazz").unwrap();
        assert_eq!(edits[&use_uri].len(), 2);
        assert!(edits[&use_uri].iter().all(|e| e.new_text == "SPAN"));
    }

    #[test]
    fn test_no_matches_yields_empty() {
        let Some(map) = sources(&[("/p/main.jazz", "fn f() { }")]) else {
            return;
        };

        assert!(collect_references("ghost", &map).is_empty());
        assert!(rename_edits("ghost", "spirit", &map).is_empty());
    }
}
