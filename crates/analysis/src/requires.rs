// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Require Resolution
//!
//! This module resolves Jasmin `require` directives to file URIs.
//!
//! ## Overview
//!
//! Two forms exist:
//!
//! - `require "FILE"` resolves FILE against the directory of the requiring
//!   document, with lexical `.`/`..` normalization and no existence check
//!   (missing files are skipped later, during traversal).
//! - `from NS require "FILE"` searches for `NS/FILE` next to the requiring
//!   document, then in its parent and grandparent directories, trying the
//!   exact and the lowercased namespace name at each location. The first
//!   existing path wins; a miss drops the require with a log line.
//!
//! The output preserves declaration order and keeps duplicates; the
//! dependency graph deduplicates.

use std::path::{Component, Path, PathBuf};

use jasmin_lsp_syntax::{Cst, NodeExt};
use lsp_types::Url;
use tracing::debug;

/// Require resolver - maps require directives to file URIs
pub struct RequireResolver;

impl RequireResolver {
    /// Resolve every require directive in a document
    ///
    /// # Arguments
    ///
    /// - `cst`: Parsed document
    /// - `base_uri`: URI of the requiring document
    ///
    /// # Returns
    ///
    /// Required file URIs in declaration order, duplicates included.
    pub fn resolve_requires(cst: &Cst, base_uri: &Url) -> Vec<Url> {
        let Some(base_dir) = base_uri
            .to_file_path()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf))
        else {
            debug!("require base {} has no file path, skipping", base_uri);
            return Vec::new();
        };

        let mut resolved = Vec::new();

        for node in cst.root().iter_named_children() {
            if node.kind() != "require_statement" {
                continue;
            }

            let namespace = node
                .child_by_field_name("namespace")
                .map(|n| cst.text_of(&n).to_string());

            let mut cursor = node.walk();
            for path_node in node.children_by_field_name("path", &mut cursor) {
                let filename = cst.text_of(&path_node).trim_matches('"').to_string();
                match Self::resolve_target(&base_dir, namespace.as_deref(), &filename) {
                    Some(uri) => resolved.push(uri),
                    None => {
                        debug!(
                            "unresolved require {:?} (namespace {:?}) from {}",
                            filename, namespace, base_uri
                        );
                    }
                }
            }
        }

        resolved
    }

    /// Resolve a single require target against a base directory
    ///
    /// Also used by go-to-definition when the cursor sits on the filename
    /// string of a require directive.
    pub fn resolve_target(base_dir: &Path, namespace: Option<&str>, filename: &str) -> Option<Url> {
        match namespace {
            None => {
                let path = normalize_path(&base_dir.join(filename));
                Url::from_file_path(path).ok()
            }
            Some(ns) => Self::resolve_namespaced(base_dir, ns, filename),
        }
    }

    /// Sibling-namespace search: base, parent, grandparent directories,
    /// each with the exact then the lowercased namespace name.
    fn resolve_namespaced(base_dir: &Path, namespace: &str, filename: &str) -> Option<Url> {
        let lowercased = namespace.to_lowercase();

        let mut search_dirs = vec![base_dir.to_path_buf()];
        if let Some(parent) = base_dir.parent() {
            search_dirs.push(parent.to_path_buf());
            if let Some(grandparent) = parent.parent() {
                search_dirs.push(grandparent.to_path_buf());
            }
        }

        for dir in &search_dirs {
            for ns_dir in [namespace, lowercased.as_str()] {
                let candidate = normalize_path(&dir.join(ns_dir).join(filename));
                if candidate.exists() {
                    return Url::from_file_path(candidate).ok();
                }
            }
        }

        None
    }
}

/// Lexically normalize a path, resolving `.` and `..` components
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(Component::ParentDir);
                }
            }
            other => normalized.push(other),
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_parent_components() {
        assert_eq!(
            normalize_path(Path::new("/a/b/../c/./d.jinc")),
            PathBuf::from("/a/c/d.jinc")
        );
    }

    #[test]
    fn test_normalize_path_plain() {
        assert_eq!(
            normalize_path(Path::new("/proj/src/aes.jinc")),
            PathBuf::from("/proj/src/aes.jinc")
        );
    }

    #[test]
    fn test_resolve_target_plain_does_not_require_existence() {
        let uri =
            RequireResolver::resolve_target(Path::new("/proj/src"), None, "../lib/poly.jinc")
                .unwrap();
        assert_eq!(uri.path(), "/proj/lib/poly.jinc");
    }

    #[test]
    fn test_resolve_target_namespaced_missing_is_none() {
        // Nothing exists under this root, so the six-path search misses
        let result = RequireResolver::resolve_target(
            Path::new("/nonexistent-jasmin-test-root/src"),
            Some("Common"),
            "hashing.jinc",
        );
        assert!(result.is_none());
    }
}
