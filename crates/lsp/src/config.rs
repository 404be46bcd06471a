// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Server Configuration
//!
//! This module parses the `jasmin-lsp` configuration section fetched via
//! `workspace/configuration`.
//!
//! ## Settings
//!
//! - `jasmin-root`: path of the project's master file, absolute or
//!   relative to the workspace root. When present its URI becomes the
//!   master file.
//! - `arch`: reserved; parsed and ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tower_lsp::lsp_types::Url;
use tracing::debug;

use jasmin_lsp_analysis::requires::normalize_path;

/// Configuration section name requested from the client
pub const CONFIG_SECTION: &str = "jasmin-lsp";

/// The `jasmin-lsp` configuration section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    /// Master file path, absolute or workspace-relative
    #[serde(rename = "jasmin-root")]
    pub jasmin_root: Option<String>,

    /// Target architecture; reserved
    #[serde(default)]
    pub arch: Option<String>,
}

impl ServerConfig {
    /// Parse the configuration section value returned by the client
    ///
    /// # Returns
    ///
    /// `None` when the value is absent or not an object of the expected
    /// shape; a missing configuration is not an error.
    pub fn from_settings(value: &Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        match serde_json::from_value(value.clone()) {
            Ok(config) => Some(config),
            Err(e) => {
                debug!("unusable jasmin-lsp configuration: {}", e);
                None
            }
        }
    }

    /// Resolve `jasmin-root` to a master file URI
    ///
    /// # Arguments
    ///
    /// - `workspace_root`: Base for relative paths
    pub fn master_file(&self, workspace_root: Option<&Path>) -> Option<Url> {
        let raw = self.jasmin_root.as_deref()?;
        let path = PathBuf::from(raw);

        let absolute = if path.is_absolute() {
            path
        } else {
            workspace_root?.join(path)
        };

        Url::from_file_path(normalize_path(&absolute)).ok()
    }
}
