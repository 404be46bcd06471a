// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Dependency Graph
//!
//! This module computes the transitive require closure of a Jasmin file.
//!
//! ## Overview
//!
//! Traversal starts from a root URI and follows resolved requires
//! breadth-first. Each reached file comes either from the caller's open
//! documents or from disk (parsed on demand). Everything lands in a
//! [`SourceMap`] that owns an `Arc<Cst>` per file for as long as the
//! request that triggered the traversal runs; symbol extraction, constant
//! evaluation, and reference collection all borrow from it, so no tree is
//! released while a consumer still points into it.
//!
//! Cycles terminate through the visited set; missing files, IO errors, and
//! parse failures skip the file and continue with its siblings.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::sync::Arc;

use jasmin_lsp_syntax::{Cst, ParserPool};
use lsp_types::Url;
use tracing::debug;

use crate::requires::RequireResolver;

/// Request-scoped table of parsed files
///
/// Owns the `Arc<Cst>` of every file touched by one query and preserves
/// traversal (insertion) order, which downstream searches iterate in.
#[derive(Debug, Default)]
pub struct SourceMap {
    order: Vec<Url>,
    entries: HashMap<Url, Arc<Cst>>,
}

impl SourceMap {
    /// Create an empty source map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parsed file; the first insertion fixes its position
    pub fn insert(&mut self, uri: Url, cst: Arc<Cst>) {
        if !self.entries.contains_key(&uri) {
            self.order.push(uri.clone());
        }
        self.entries.insert(uri, cst);
    }

    /// Look up a file
    pub fn get(&self, uri: &Url) -> Option<&Arc<Cst>> {
        self.entries.get(uri)
    }

    /// Whether the map contains a file
    pub fn contains(&self, uri: &Url) -> bool {
        self.entries.contains_key(uri)
    }

    /// URIs in insertion order
    pub fn uris(&self) -> &[Url] {
        &self.order
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Url, &Arc<Cst>)> {
        self.order.iter().map(|uri| (uri, &self.entries[uri]))
    }

    /// Number of files in the map
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Dependency graph - transitive require closure over buffers and disk
pub struct DependencyGraph;

impl DependencyGraph {
    /// Transitive require closure of `root`, inclusive of `root` itself
    ///
    /// # Arguments
    ///
    /// - `root`: Entry point of the traversal
    /// - `open_docs`: Live documents; used in preference to disk content
    /// - `pool`: Parser for files loaded from disk
    ///
    /// # Returns
    ///
    /// A [`SourceMap`] holding every reachable file. A URI that cannot be
    /// read or parsed is skipped; traversal continues with its siblings.
    pub fn closure(
        root: &Url,
        open_docs: &HashMap<Url, Arc<Cst>>,
        pool: &ParserPool,
    ) -> SourceMap {
        let mut map = SourceMap::new();
        let mut visited: HashSet<Url> = HashSet::new();
        let mut pending: VecDeque<Url> = VecDeque::from([root.clone()]);

        while let Some(uri) = pending.pop_front() {
            // A uri once visited is never re-expanded, so cycles terminate
            if !visited.insert(uri.clone()) {
                continue;
            }

            let cst = match open_docs.get(&uri) {
                Some(cst) => cst.clone(),
                None => match Self::load_from_disk(&uri, pool) {
                    Some(cst) => cst,
                    None => continue,
                },
            };

            for required in RequireResolver::resolve_requires(&cst, &uri) {
                if !visited.contains(&required) {
                    pending.push_back(required);
                }
            }

            map.insert(uri, cst);
        }

        map
    }

    /// The file set relevant to a query on `query_uri`
    ///
    /// With a master file set this is the master's closure plus the query
    /// file itself (so the user-focused file is analyzed even when it is
    /// disconnected from the master tree). Without one it is the union of
    /// the closures of all open documents.
    pub fn all_relevant(
        query_uri: &Url,
        master: Option<&Url>,
        open_docs: &HashMap<Url, Arc<Cst>>,
        pool: &ParserPool,
    ) -> SourceMap {
        match master {
            Some(master) => {
                let mut map = Self::closure(master, open_docs, pool);
                if !map.contains(query_uri) {
                    if let Some(cst) = open_docs
                        .get(query_uri)
                        .cloned()
                        .or_else(|| Self::load_from_disk(query_uri, pool))
                    {
                        map.insert(query_uri.clone(), cst);
                    }
                }
                map
            }
            None => Self::workspace_set(None, open_docs, pool),
        }
    }

    /// The project-wide file set: master closure, or the union of the
    /// closures of all open documents
    pub fn workspace_set(
        master: Option<&Url>,
        open_docs: &HashMap<Url, Arc<Cst>>,
        pool: &ParserPool,
    ) -> SourceMap {
        if let Some(master) = master {
            return Self::closure(master, open_docs, pool);
        }

        // Sorted roots keep the union deterministic across calls
        let mut roots: Vec<&Url> = open_docs.keys().collect();
        roots.sort_by_key(|uri| uri.as_str());

        let mut map = SourceMap::new();
        for root in roots {
            let closure = Self::closure(root, open_docs, pool);
            for (uri, cst) in closure.iter() {
                if !map.contains(uri) {
                    map.insert(uri.clone(), cst.clone());
                }
            }
        }
        map
    }

    /// Read and parse a file from disk
    ///
    /// Content is decoded lossily so non-UTF-8 bytes degrade instead of
    /// failing the whole traversal.
    fn load_from_disk(uri: &Url, pool: &ParserPool) -> Option<Arc<Cst>> {
        let path = uri.to_file_path().ok()?;

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("failed to read {}: {}", path.display(), e);
                return None;
            }
        };

        let text = String::from_utf8_lossy(&bytes);
        match pool.parse(&text, None) {
            Ok(cst) => Some(Arc::new(cst)),
            Err(e) => {
                debug!("failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }
}
