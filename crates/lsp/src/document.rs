// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Document Management
//!
//! This module provides document management for the LSP server.
//!
//! ## Overview
//!
//! The document store tracks every document the server knows about:
//! editor-open buffers, and closed documents retained because they belong
//! to the master file's dependency closure. Text synchronization is
//! full-replacement (the server advertises full sync), so a document's
//! text is an immutable `Arc<str>` swapped atomically on change; the
//! matching [`Cst`] is swapped the same way, and a superseded tree is
//! freed once the last in-flight request drops its `Arc` clone.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_lsp::lsp_types::Url;

use jasmin_lsp_syntax::Cst;

/// Document metadata
#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    /// Document URI
    pub uri: Url,

    /// Language identifier (e.g., "jasmin")
    pub language_id: String,

    /// Document version
    /// Monotonically increased by the client on each change
    pub version: i32,
}

/// A document managed by the LSP server
#[derive(Debug, Clone)]
pub struct Document {
    /// Document metadata
    metadata: DocumentMetadata,

    /// Full document text
    text: Arc<str>,

    /// Parsed syntax tree bound to `text` (if parsing has occurred)
    cst: Option<Arc<Cst>>,

    /// Whether an editor buffer is currently open for this document.
    /// Closed documents in the master closure stay in the store with
    /// `open = false`.
    open: bool,
}

impl Document {
    /// Create a new document
    pub fn new(uri: Url, text: String, version: i32, language_id: String) -> Self {
        Self {
            metadata: DocumentMetadata {
                uri,
                language_id,
                version,
            },
            text: Arc::from(text),
            cst: None,
            open: true,
        }
    }

    /// Get the document URI
    pub fn uri(&self) -> &Url {
        &self.metadata.uri
    }

    /// Get the document language ID
    pub fn language_id(&self) -> &str {
        &self.metadata.language_id
    }

    /// Get the document version
    pub fn version(&self) -> i32 {
        self.metadata.version
    }

    /// Get the document text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the parsed tree (if available)
    pub fn cst(&self) -> Option<Arc<Cst>> {
        self.cst.clone()
    }

    /// Whether an editor buffer is open for this document
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Replace text and version atomically; the stale tree is cleared
    pub fn replace_text(&mut self, text: String, version: i32) {
        self.text = Arc::from(text);
        self.metadata.version = version;
        self.cst = None;
    }

    /// Attach the parse of the current text
    pub fn set_cst(&mut self, cst: Arc<Cst>) {
        self.cst = Some(cst);
    }
}

/// Document store for managing all known documents
///
/// Thread-safe store shared by every request handler.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: RwLock<HashMap<Url, Document>>,
}

impl DocumentStore {
    /// Create a new document store
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a document (creates or replaces)
    pub async fn open_document(&self, uri: Url, text: String, version: i32, language_id: String) {
        let mut docs = self.documents.write().await;
        docs.insert(uri.clone(), Document::new(uri, text, version, language_id));
    }

    /// Replace a document's text, full-replacement semantics
    ///
    /// # Returns
    ///
    /// `Ok(())` if the document existed, `Err(DocumentError)` otherwise
    /// (the caller then treats the change as an open).
    pub async fn replace_text(
        &self,
        uri: &Url,
        text: String,
        version: i32,
    ) -> Result<(), DocumentError> {
        let mut docs = self.documents.write().await;
        let document = docs
            .get_mut(uri)
            .ok_or_else(|| DocumentError::DocumentNotFound(uri.clone()))?;
        document.replace_text(text, version);
        // Re-opening through a change on a retained document
        document.open = true;
        Ok(())
    }

    /// Remove a document entirely
    ///
    /// # Returns
    ///
    /// true if the document existed
    pub async fn remove_document(&self, uri: &Url) -> bool {
        let mut docs = self.documents.write().await;
        docs.remove(uri).is_some()
    }

    /// Keep a document in the store but mark its buffer closed
    ///
    /// # Returns
    ///
    /// true if the document existed
    pub async fn retain_document(&self, uri: &Url) -> bool {
        let mut docs = self.documents.write().await;
        match docs.get_mut(uri) {
            Some(document) => {
                document.open = false;
                true
            }
            None => false,
        }
    }

    /// Get a document by URI
    pub async fn get_document(&self, uri: &Url) -> Option<Document> {
        let docs = self.documents.read().await;
        docs.get(uri).cloned()
    }

    /// Whether the store tracks a document
    pub async fn has_document(&self, uri: &Url) -> bool {
        let docs = self.documents.read().await;
        docs.contains_key(uri)
    }

    /// Whether an editor buffer is open for the document
    pub async fn is_open(&self, uri: &Url) -> bool {
        let docs = self.documents.read().await;
        docs.get(uri).is_some_and(Document::is_open)
    }

    /// All tracked document URIs
    pub async fn all_uris(&self) -> Vec<Url> {
        let docs = self.documents.read().await;
        docs.keys().cloned().collect()
    }

    /// URIs of documents with an open editor buffer
    pub async fn open_uris(&self) -> Vec<Url> {
        let docs = self.documents.read().await;
        docs.values()
            .filter(|d| d.is_open())
            .map(|d| d.uri().clone())
            .collect()
    }

    /// Number of tracked documents
    pub async fn document_count(&self) -> usize {
        let docs = self.documents.read().await;
        docs.len()
    }

    /// Attach a parsed tree to a document
    pub async fn set_document_cst(&self, uri: &Url, cst: Arc<Cst>) -> Result<(), DocumentError> {
        let mut docs = self.documents.write().await;
        let document = docs
            .get_mut(uri)
            .ok_or_else(|| DocumentError::DocumentNotFound(uri.clone()))?;
        document.set_cst(cst);
        Ok(())
    }

    /// Snapshot of every tracked document's tree
    ///
    /// Dependency traversal prefers these over disk content.
    pub async fn snapshots(&self) -> HashMap<Url, Arc<Cst>> {
        let docs = self.documents.read().await;
        docs.values()
            .filter_map(|d| d.cst().map(|cst| (d.uri().clone(), cst)))
            .collect()
    }
}

/// Document-related errors
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(Url),
}
