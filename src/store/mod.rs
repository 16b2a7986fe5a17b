// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for story projects on disk.
//!
//! The codec in [`project`] is pure; [`ProjectStore`] adds file access with atomic
//! replace-on-write so a crash mid-save never truncates an existing project.

pub mod project;

use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::artifact::ArtifactStore;
use crate::model::StoryGraph;

pub use project::{commit, decode, encode, load_into, ProjectData};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("project file {} does not exist", path.display())]
    NotFound { path: PathBuf },
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed project data in {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode project: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}

/// How hard a save tries to reach the disk before it reports success.
///
/// Both modes replace the project file through a sibling temp file and a rename, so readers
/// never see a half-written project.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Leaves flushing to the OS. A crash right after a save can lose that save.
    #[default]
    BestEffort,

    /// Syncs the temp file before the rename, and on Unix the parent directory after it.
    Durable,
}

/// Reads and writes project files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectStore {
    durability: WriteDurability,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn save(&self, path: &Path, graph: &StoryGraph) -> Result<(), StoreError> {
        let bytes = encode(graph)?;
        write_atomic(path, &bytes, self.durability)?;
        tracing::info!(path = %path.display(), nodes = graph.node_count(), "project saved");
        Ok(())
    }

    /// Parses the file at `path`, leaving the graph untouched unless parsing succeeds.
    pub fn read(&self, path: &Path) -> Result<ProjectData, StoreError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        project::decode_at(&bytes, Some(path))
    }

    /// Loads `path` into `graph` and returns the maximum node id seen.
    pub fn load(
        &self,
        path: &Path,
        graph: &mut StoryGraph,
        artifacts: &dyn ArtifactStore,
    ) -> Result<u64, StoreError> {
        let data = self.read(path)?;
        let max_id = commit(graph, data, artifacts);
        tracing::info!(path = %path.display(), nodes = graph.node_count(), "project loaded");
        Ok(max_id)
    }

    /// Deletes a file; a missing file is not an error.
    pub fn remove(&self, path: &Path) -> Result<bool, StoreError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Writes `contents` to a sibling temp file and renames it over `path`.
pub(crate) fn write_atomic(
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|source| StoreError::Io {
        path: parent.to_path_buf(),
        source,
    })?;

    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".storyloom.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;

    let written = file.write_all(contents).and_then(|()| {
        if durability == WriteDurability::Durable {
            file.sync_all()
        } else {
            Ok(())
        }
    });
    drop(file);
    if let Err(source) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: tmp_path,
            source,
        });
    }

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            dir.sync_all().map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}

#[cfg(not(windows))]
fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to)
}

#[cfg(windows)]
fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if to.exists() => {
            fs::remove_file(to).map_err(|_| err)?;
            fs::rename(from, to)
        }
        Err(err) => Err(err),
    }
}
