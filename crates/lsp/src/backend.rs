// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # LSP Backend Implementation
//!
//! This module provides the main LSP server backend using tower-lsp.
//!
//! ## Overview
//!
//! The backend handles:
//! - LSP protocol communication via tower-lsp
//! - Document lifecycle (open, change, close) with the master-file close
//!   policy
//! - Navigation and introspection requests (hover, definition, references,
//!   symbols, rename)
//! - Diagnostics publication for the relevant file set
//! - The `jasmin/setMasterFile` custom notification
//!
//! ## Architecture
//!
//! ```text
//! Client → LSP Backend → Document Store
//!                ↓
//!        Dependency Graph ──→ SourceMap (request-scoped trees)
//!                ↓
//!   Symbols / Requires / Const Eval
//! ```
//!
//! ## Error handling
//!
//! Handlers never surface internal failures as protocol errors: anything
//! that goes wrong inside a request is logged and becomes an empty/null
//! result, so one bad request cannot break the editor session.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, error, info, warn};

use jasmin_lsp_analysis::graph::{DependencyGraph, SourceMap};
use jasmin_lsp_analysis::keywords::is_keyword;
use jasmin_lsp_analysis::symbols::SymbolExtractor;
use jasmin_lsp_syntax::{Cst, ParserPool};

use crate::config::{CONFIG_SECTION, ServerConfig};
use crate::cst_utils::word_at;
use crate::definition::DefinitionFinder;
use crate::diagnostic::{DiagnosticCollector, publish_diagnostics_for_document};
use crate::document::DocumentStore;
use crate::hover::HoverEngine;
use crate::references::{collect_references, rename_edits};
use crate::symbols::SymbolRenderer;

/// Process-wide server state
///
/// Mutated only by the dispatcher's notification handlers.
#[derive(Debug, Default)]
pub struct ServerState {
    /// Client-designated compilation entry point; its require closure
    /// defines the project scope
    pub master_file: Option<Url>,

    /// Workspace root, for resolving relative configuration paths
    pub workspace_root: Option<PathBuf>,

    /// Capabilities announced by the client at initialize
    pub client_capabilities: Option<ClientCapabilities>,
}

/// What the close policy decided for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseAction {
    /// The document belongs to the master closure: keep it and re-emit
    /// its diagnostics
    Retain,
    /// Remove the document and clear its diagnostics
    Remove,
}

/// Decide what closing `uri` should do
///
/// Documents inside the master file's require closure (the master itself
/// included) are retained so their problems stay visible; everything else
/// is removed and its markers cleared.
pub fn close_action(
    uri: &Url,
    master: Option<&Url>,
    snapshots: &HashMap<Url, Arc<Cst>>,
    parser: Option<&ParserPool>,
) -> CloseAction {
    let (Some(master), Some(parser)) = (master, parser) else {
        return CloseAction::Remove;
    };

    let closure = DependencyGraph::closure(master, snapshots, parser);
    if closure.contains(uri) {
        CloseAction::Retain
    } else {
        CloseAction::Remove
    }
}

/// Params of the `jasmin/setMasterFile` notification
#[derive(Debug, Deserialize)]
pub struct SetMasterFileParams {
    /// Master file URI
    pub uri: Url,
}

/// LSP backend implementation
///
/// Main entry point for all LSP protocol operations.
pub struct LspBackend {
    client: Client,
    documents: Arc<DocumentStore>,
    parser: Option<Arc<ParserPool>>,
    diagnostics: DiagnosticCollector,
    state: Arc<RwLock<ServerState>>,
}

impl LspBackend {
    pub fn new(client: Client) -> Self {
        let parser = match ParserPool::new() {
            Ok(pool) => Some(Arc::new(pool)),
            Err(e) => {
                // The server still runs; every query answers empty
                error!("Jasmin parser unavailable: {}", e);
                None
            }
        };

        Self {
            client,
            documents: Arc::new(DocumentStore::new()),
            parser,
            diagnostics: DiagnosticCollector::new(),
            state: Arc::new(RwLock::new(ServerState::default())),
        }
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// Handle the `jasmin/setMasterFile` custom notification
    pub async fn set_master_file(&self, params: SetMasterFileParams) {
        info!("Master file set to {}", params.uri);
        self.state.write().await.master_file = Some(params.uri);
    }

    async fn master_file(&self) -> Option<Url> {
        self.state.read().await.master_file.clone()
    }

    /// Build the relevant file set for a query on `uri`
    async fn relevant_sources(&self, uri: &Url) -> SourceMap {
        let Some(parser) = &self.parser else {
            return SourceMap::new();
        };
        let master = self.master_file().await;
        let snapshots = self.documents.snapshots().await;
        DependencyGraph::all_relevant(uri, master.as_ref(), &snapshots, parser)
    }

    /// Build the project-wide file set (workspace/symbol)
    async fn workspace_sources(&self) -> SourceMap {
        let Some(parser) = &self.parser else {
            return SourceMap::new();
        };
        let master = self.master_file().await;
        let snapshots = self.documents.snapshots().await;
        DependencyGraph::workspace_set(master.as_ref(), &snapshots, parser)
    }

    /// Parse text, reusing the previous tree for incremental speedup
    fn parse_text(&self, text: &str, old: Option<&Cst>) -> Option<Arc<Cst>> {
        let parser = self.parser.as_ref()?;
        match parser.parse(text, old) {
            Ok(cst) => Some(Arc::new(cst)),
            Err(e) => {
                error!("Failed to parse document: {}", e);
                None
            }
        }
    }

    /// Re-parse a stored document and attach the fresh tree
    async fn reparse_document(&self, uri: &Url, old: Option<Arc<Cst>>) {
        let Some(document) = self.documents.get_document(uri).await else {
            return;
        };
        if let Some(cst) = self.parse_text(document.text(), old.as_deref()) {
            if let Err(e) = self.documents.set_document_cst(uri, cst).await {
                error!("Failed to store document tree: {}", e);
            }
        }
    }

    /// Publish one document's current diagnostics
    async fn publish_file_diagnostics(&self, uri: &Url) {
        let cst = self.documents.get_document(uri).await.and_then(|d| d.cst());
        publish_diagnostics_for_document(&self.diagnostics, &self.client, uri.clone(), cst.as_deref())
            .await;
    }

    /// Publish diagnostics after an edit in `uri`
    ///
    /// The published set is the union of the relevant file set of `uri`
    /// and all open documents, restricted to open documents, so an edit
    /// in a leaf dependency refreshes the problems shown in its open
    /// dependents.
    async fn publish_after_edit(&self, uri: &Url) {
        let sources = self.relevant_sources(uri).await;

        let mut union: Vec<Url> = sources.uris().to_vec();
        if !union.contains(uri) {
            union.push(uri.clone());
        }
        for open_uri in self.documents.open_uris().await {
            if !union.contains(&open_uri) {
                union.push(open_uri);
            }
        }

        for target in union {
            if self.documents.is_open(&target).await {
                self.publish_file_diagnostics(&target).await;
            }
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for LspBackend {
    /// Initialize the LSP server
    ///
    /// Stores the client's capabilities and workspace root, then
    /// advertises what this server answers.
    #[allow(deprecated)]
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        info!("Initializing LSP server");
        info!("Client info: {:?}", params.client_info);

        let workspace_root = params
            .root_uri
            .as_ref()
            .and_then(|uri| uri.to_file_path().ok())
            .or_else(|| {
                params
                    .workspace_folders
                    .as_ref()
                    .and_then(|folders| folders.first())
                    .and_then(|folder| folder.uri.to_file_path().ok())
            });

        {
            let mut state = self.state.write().await;
            state.client_capabilities = Some(params.capabilities);
            state.workspace_root = workspace_root;
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                // Full-document synchronization: didChange carries the
                // whole new text
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),

                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                workspace_symbol_provider: Some(OneOf::Left(true)),
                rename_provider: Some(OneOf::Left(true)),

                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: crate::SERVER_NAME.to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    /// Initialized notification
    ///
    /// Pulls the `jasmin-lsp` configuration section; a configured
    /// `jasmin-root` becomes the master file.
    async fn initialized(&self, _params: InitializedParams) {
        info!("LSP server initialized");

        let items = vec![ConfigurationItem {
            scope_uri: None,
            section: Some(CONFIG_SECTION.to_string()),
        }];

        match self.client.configuration(items).await {
            Ok(values) => {
                if let Some(config) = values.first().and_then(ServerConfig::from_settings) {
                    let workspace_root = self.state.read().await.workspace_root.clone();
                    if let Some(master) = config.master_file(workspace_root.as_deref()) {
                        info!("Master file from configuration: {}", master);
                        self.state.write().await.master_file = Some(master);
                    }
                }
            }
            Err(e) => {
                debug!("workspace/configuration unavailable: {}", e);
            }
        }
    }

    /// Shutdown the LSP server
    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down LSP server");
        Ok(())
    }

    /// Document opened notification
    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        info!(
            "Document opened: uri={}, language={}, version={}",
            doc.uri, doc.language_id, doc.version
        );

        self.documents
            .open_document(doc.uri.clone(), doc.text, doc.version, doc.language_id)
            .await;

        self.reparse_document(&doc.uri, None).await;
        self.publish_after_edit(&doc.uri).await;
    }

    /// Document changed notification
    ///
    /// The server advertises full sync, so the last change carries the
    /// complete new text; a change for an untracked document behaves as an
    /// open.
    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        let Some(change) = params.content_changes.into_iter().next_back() else {
            warn!("didChange without content changes: {}", uri);
            return;
        };
        if change.range.is_some() {
            warn!("ignoring range of incremental change; full sync is advertised");
        }

        info!("Document changed: uri={}, version={}", uri, version);

        let old = self.documents.get_document(&uri).await.and_then(|d| d.cst());

        if self
            .documents
            .replace_text(&uri, change.text.clone(), version)
            .await
            .is_err()
        {
            self.documents
                .open_document(uri.clone(), change.text, version, "jasmin".to_string())
                .await;
        }

        self.reparse_document(&uri, old).await;
        self.publish_after_edit(&uri).await;
    }

    /// Document closed notification
    ///
    /// Documents in the master file's dependency closure survive buffer
    /// closure with their diagnostics re-emitted; unrelated documents are
    /// dropped and their markers cleared.
    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        info!("Document closed: uri={}", uri);

        let master = self.master_file().await;
        let snapshots = self.documents.snapshots().await;

        match close_action(&uri, master.as_ref(), &snapshots, self.parser.as_deref()) {
            CloseAction::Retain => {
                self.documents.retain_document(&uri).await;
                // Problems in dependency-tree files stay visible
                self.publish_file_diagnostics(&uri).await;
            }
            CloseAction::Remove => {
                self.documents.remove_document(&uri).await;
                self.client
                    .publish_diagnostics(uri, Vec::new(), None)
                    .await;
            }
        }
    }

    /// Watched file change notification
    ///
    /// Open documents get their diagnostics re-emitted; unopened files
    /// are reread on demand by the next dependency traversal anyway.
    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        for event in params.changes {
            if self.documents.is_open(&event.uri).await {
                self.publish_file_diagnostics(&event.uri).await;
            }
        }
    }

    /// Configuration change notification
    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let section = params
            .settings
            .get(CONFIG_SECTION)
            .unwrap_or(&params.settings);

        if let Some(config) = ServerConfig::from_settings(section) {
            let workspace_root = self.state.read().await.workspace_root.clone();
            if let Some(master) = config.master_file(workspace_root.as_deref()) {
                info!("Master file from configuration change: {}", master);
                self.state.write().await.master_file = Some(master);
            }
        }
    }

    /// Definition request
    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        info!("Definition requested: uri={}, pos={:?}", uri, position);

        let Some(document) = self.documents.get_document(&uri).await else {
            warn!("Document not found: {}", uri);
            return Ok(None);
        };
        let Some(cst) = document.cst() else {
            return Ok(None);
        };

        let sources = self.relevant_sources(&uri).await;

        Ok(DefinitionFinder::find(&uri, position, &cst, &sources)
            .map(GotoDefinitionResponse::Scalar))
    }

    /// References request
    ///
    /// The declaration site is always included in the result, regardless
    /// of `include_declaration`.
    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        info!("References requested: uri={}, pos={:?}", uri, position);

        let Some(document) = self.documents.get_document(&uri).await else {
            return Ok(None);
        };
        let Some(cst) = document.cst() else {
            return Ok(None);
        };

        let Some(node) = cst.node_at(crate::cst_utils::position_to_point(position)) else {
            return Ok(None);
        };
        if node.kind() != "identifier" {
            return Ok(None);
        }
        let name = cst.text_of(&node).to_string();

        let sources = self.relevant_sources(&uri).await;
        Ok(Some(collect_references(&name, &sources)))
    }

    /// Hover request
    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        info!("Hover requested: uri={}, pos={:?}", uri, position);

        let Some(document) = self.documents.get_document(&uri).await else {
            warn!("Document not found for hover: {}", uri);
            return Ok(None);
        };

        let text = match document.cst() {
            Some(cst) => {
                let sources = self.relevant_sources(&uri).await;
                HoverEngine::hover_text(&uri, position, &cst, &sources)
            }
            // Without a tree only keywords can answer
            None => word_at(document.text(), position)
                .as_deref()
                .and_then(HoverEngine::keyword_hover),
        };

        Ok(text.map(|value| Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value,
            }),
            range: None,
        }))
    }

    /// Document symbols request
    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let uri = params.text_document.uri;

        info!("Document symbols requested: uri={}", uri);

        let Some(document) = self.documents.get_document(&uri).await else {
            return Ok(None);
        };
        let Some(cst) = document.cst() else {
            // Extraction failure degrades to an empty outline
            return Ok(Some(DocumentSymbolResponse::Nested(Vec::new())));
        };

        let symbols = SymbolExtractor::extract(&uri, &cst);
        Ok(Some(DocumentSymbolResponse::Nested(
            SymbolRenderer::render_document(symbols),
        )))
    }

    /// Rename request
    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let new_name = params.new_name;

        info!("Rename requested: uri={}, pos={:?}", uri, position);

        let Some(document) = self.documents.get_document(&uri).await else {
            return Ok(None);
        };

        if let Some(word) = word_at(document.text(), position) {
            if is_keyword(&word) {
                return Err(Error::invalid_params("cannot rename a Jasmin keyword"));
            }
        }

        let Some(cst) = document.cst() else {
            return Ok(None);
        };
        let Some(node) = cst.node_at(crate::cst_utils::position_to_point(position)) else {
            return Ok(None);
        };
        if node.kind() != "identifier" {
            return Ok(None);
        }
        let name = cst.text_of(&node).to_string();

        let sources = self.relevant_sources(&uri).await;
        let changes = rename_edits(&name, &new_name, &sources);

        Ok(Some(WorkspaceEdit {
            changes: Some(changes),
            document_changes: None,
            change_annotations: None,
        }))
    }

    /// Workspace symbol request
    async fn symbol(
        &self,
        params: WorkspaceSymbolParams,
    ) -> Result<Option<Vec<SymbolInformation>>> {
        info!("Workspace symbols requested: query={:?}", params.query);

        let sources = self.workspace_sources().await;

        let mut all = Vec::new();
        for (uri, cst) in sources.iter() {
            all.extend(SymbolExtractor::extract(uri, cst));
        }

        Ok(Some(SymbolRenderer::render_workspace(all, &params.query)))
    }
}
