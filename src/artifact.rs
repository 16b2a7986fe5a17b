// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Linked scene documents.
//!
//! Nodes only carry a path; creating placeholder files and launching an external viewer is
//! delegated to an [`ArtifactStore`].

use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::model::NodeId;

/// Capability boundary to the scene documents a node links to.
pub trait ArtifactStore {
    /// Makes sure a document exists at `path`, creating a placeholder headed by `title`.
    ///
    /// Must never overwrite an existing document.
    fn ensure(&self, path: &Path, title: &str) -> io::Result<()>;

    /// Opens the document in the user's preferred external application.
    fn open(&self, path: &Path) -> io::Result<()>;
}

/// Default document location for a newly created node.
pub fn default_artifact_path(id: NodeId) -> PathBuf {
    PathBuf::from(format!("docs/node_{id}.md"))
}

/// Filesystem-backed documents; relative paths resolve against `root`.
#[derive(Debug, Clone)]
pub struct FsArtifacts {
    root: PathBuf,
}

impl FsArtifacts {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl ArtifactStore for FsArtifacts {
    fn ensure(&self, path: &Path, title: &str) -> io::Result<()> {
        let path = self.resolve(path);
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            // Lost a race with another writer; the document exists now.
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(()),
            Err(err) => return Err(err),
        };
        writeln!(file, "# {}", title.trim())?;
        tracing::debug!(path = %path.display(), "created placeholder document");
        Ok(())
    }

    fn open(&self, path: &Path) -> io::Result<()> {
        let path = self.resolve(path);
        if !path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("document {} does not exist", path.display()),
            ));
        }
        ::open::that_detached(&path)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::{default_artifact_path, ArtifactStore, FsArtifacts};
    use crate::model::NodeId;

    #[test]
    fn ensure_writes_titled_placeholder_once() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let artifacts = FsArtifacts::new(tmp.path());
        let rel = Path::new("docs/scenes/intro.md");

        artifacts.ensure(rel, "Intro").expect("ensure");
        let path = tmp.path().join(rel);
        assert_eq!(fs::read_to_string(&path).expect("read"), "# Intro\n");

        fs::write(&path, "edited by hand").expect("write");
        artifacts.ensure(rel, "Other title").expect("ensure again");
        assert_eq!(fs::read_to_string(&path).expect("read"), "edited by hand");
    }

    #[test]
    fn open_refuses_missing_document() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let artifacts = FsArtifacts::new(tmp.path());
        let err = artifacts.open(Path::new("missing.md")).expect_err("missing");
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn default_path_is_keyed_by_node_id() {
        assert_eq!(
            default_artifact_path(NodeId::new(12)),
            Path::new("docs/node_12.md")
        );
    }
}
