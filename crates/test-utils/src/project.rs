// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! On-disk test projects
//!
//! Dependency-graph and require-resolution tests need real files on disk;
//! `ProjectBuilder` lays a project out in a tempdir and hands back URIs.

use std::fs;
use std::path::{Path, PathBuf};

use lsp_types::Url;
use tempfile::TempDir;

/// Builds a throwaway multi-file Jasmin project on disk
///
/// The backing tempdir is removed when the builder is dropped, so keep it
/// alive for the duration of the test.
pub struct ProjectBuilder {
    root: TempDir,
}

impl ProjectBuilder {
    /// Create an empty project
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("failed to create project tempdir"),
        }
    }

    /// Project root directory
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Write a file under the project root, creating parent directories
    ///
    /// # Arguments
    ///
    /// - `relative`: Path relative to the project root (e.g. `avx2/main.jazz`)
    /// - `content`: File content
    ///
    /// # Returns
    ///
    /// The absolute path of the written file
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create project subdirectory");
        }
        fs::write(&path, content).expect("failed to write project file");
        path
    }

    /// Write a file and return its `file://` URI
    pub fn write_uri(&self, relative: &str, content: &str) -> Url {
        Url::from_file_path(self.write(relative, content)).expect("project path is absolute")
    }

    /// URI of an already-written file
    pub fn uri(&self, relative: &str) -> Url {
        Url::from_file_path(self.root.path().join(relative)).expect("project path is absolute")
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}
