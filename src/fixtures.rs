// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};

use crate::artifact::ArtifactStore;

/// In-memory artifact store that remembers every placeholder request.
#[derive(Debug, Default)]
pub(crate) struct RecordingArtifacts {
    ensured: RefCell<Vec<(PathBuf, String)>>,
    opened: RefCell<Vec<PathBuf>>,
}

impl RecordingArtifacts {
    pub(crate) fn ensured(&self) -> Vec<(PathBuf, String)> {
        self.ensured.borrow().clone()
    }

    pub(crate) fn opened(&self) -> Vec<PathBuf> {
        self.opened.borrow().clone()
    }
}

impl ArtifactStore for RecordingArtifacts {
    fn ensure(&self, path: &Path, title: &str) -> io::Result<()> {
        self.ensured
            .borrow_mut()
            .push((path.to_path_buf(), title.to_owned()));
        Ok(())
    }

    fn open(&self, path: &Path) -> io::Result<()> {
        self.opened.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

/// Artifact store whose every call fails, for exercising the swallow-and-log paths.
#[derive(Debug, Default)]
pub(crate) struct FailingArtifacts;

impl ArtifactStore for FailingArtifacts {
    fn ensure(&self, _path: &Path, _title: &str) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }

    fn open(&self, _path: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }
}
