// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Periodic shadow snapshots and crash recovery.
//!
//! While a document with a path is dirty, each timer tick writes a full snapshot next to the
//! project as `<file name>.autosave`. A successful save deletes the shadow. Opening a path
//! whose shadow still exists offers to restore it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::AutosaveSettings;
use crate::model::StoryGraph;
use crate::ops::History;
use crate::store::{encode, write_atomic, ProjectStore, StoreError};

const SHADOW_SUFFIX: &str = ".autosave";

/// Shadow location for a project: the full file name with `.autosave` appended.
pub fn shadow_path(project: &Path) -> PathBuf {
    let mut name = project
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("untitled"));
    name.push(SHADOW_SUFFIX);
    project.with_file_name(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    Clean,
    NoPath,
    /// The shadow already holds the current state.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveOutcome {
    Skipped(SkipReason),
    Written { path: PathBuf, cursor: usize },
    /// The write failed; the tick is dropped and the next one retries.
    Failed { path: PathBuf, message: String },
}

/// An unconsumed shadow found while opening a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryOffer {
    pub project_path: PathBuf,
    pub shadow_path: PathBuf,
    pub project_exists: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryChoice {
    /// Load the shadow; the document stays dirty until saved under the real name.
    Restore,
    /// Load the real file and delete the shadow.
    Discard,
    /// Abort the open; file and shadow stay untouched.
    Defer,
}

#[derive(Debug, Clone)]
pub struct AutosaveController {
    settings: AutosaveSettings,
    store: ProjectStore,
    project_path: Option<PathBuf>,
    shadow_exists: bool,
    shadow_cursor: Option<usize>,
    shadow_rev: Option<u64>,
}

impl AutosaveController {
    pub fn new(settings: AutosaveSettings, store: ProjectStore) -> Self {
        Self {
            settings,
            store,
            project_path: None,
            shadow_exists: false,
            shadow_cursor: None,
            shadow_rev: None,
        }
    }

    pub fn apply_settings(&mut self, settings: AutosaveSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> AutosaveSettings {
        self.settings
    }

    pub fn interval(&self) -> Duration {
        self.settings.interval
    }

    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    pub fn shadow_exists(&self) -> bool {
        self.shadow_exists
    }

    /// History cursor at the last shadow write (or save).
    pub fn shadow_cursor(&self) -> Option<usize> {
        self.shadow_cursor
    }

    /// Starts tracking a freshly created or opened document.
    pub fn reset(&mut self, project_path: Option<PathBuf>) {
        self.project_path = project_path;
        self.shadow_exists = false;
        self.shadow_cursor = None;
        self.shadow_rev = None;
    }

    /// Starts tracking a document that was just restored from its shadow.
    pub fn adopt_shadow(&mut self, project_path: PathBuf, history: &History) {
        self.project_path = Some(project_path);
        self.shadow_exists = true;
        self.shadow_cursor = Some(history.cursor());
        self.shadow_rev = Some(history.rev());
    }

    pub fn tick(&mut self, graph: &StoryGraph, history: &History) -> AutosaveOutcome {
        if !self.settings.enabled {
            return AutosaveOutcome::Skipped(SkipReason::Disabled);
        }
        if !history.is_dirty() {
            return AutosaveOutcome::Skipped(SkipReason::Clean);
        }
        let Some(project_path) = self.project_path.as_deref() else {
            return AutosaveOutcome::Skipped(SkipReason::NoPath);
        };
        if self.shadow_exists && self.shadow_rev == Some(history.rev()) {
            return AutosaveOutcome::Skipped(SkipReason::Unchanged);
        }

        let path = shadow_path(project_path);
        let written = encode(graph)
            .and_then(|bytes| write_atomic(&path, &bytes, self.store.durability()));
        match written {
            Ok(()) => {
                self.shadow_exists = true;
                self.shadow_cursor = Some(history.cursor());
                self.shadow_rev = Some(history.rev());
                tracing::debug!(path = %path.display(), cursor = history.cursor(), "autosave written");
                AutosaveOutcome::Written {
                    path,
                    cursor: history.cursor(),
                }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "autosave failed");
                AutosaveOutcome::Failed {
                    path,
                    message: err.to_string(),
                }
            }
        }
    }

    /// Bookkeeping after a successful explicit save to `saved_path`.
    ///
    /// Deletes the shadow of the saved path, and the one this controller wrote for a previous
    /// path when the save moved the document, then marks the history clean.
    pub fn on_saved(&mut self, saved_path: &Path, history: &mut History) {
        if self.shadow_exists {
            if let Some(previous) = self.project_path.as_deref().filter(|p| *p != saved_path) {
                self.remove_shadow_file(&shadow_path(previous));
            }
        }
        self.remove_shadow_file(&shadow_path(saved_path));

        history.mark_clean();
        self.project_path = Some(saved_path.to_path_buf());
        self.shadow_exists = false;
        self.shadow_cursor = Some(history.cursor());
        self.shadow_rev = Some(history.rev());
    }

    /// Looks for an unconsumed shadow next to `project_path`.
    pub fn check_recovery(&self, project_path: &Path) -> Option<RecoveryOffer> {
        let shadow = shadow_path(project_path);
        if !shadow.is_file() {
            return None;
        }
        Some(RecoveryOffer {
            project_path: project_path.to_path_buf(),
            shadow_path: shadow,
            project_exists: project_path.is_file(),
        })
    }

    /// Deletes the shadow for `project_path`, e.g. after the user declined a restore.
    pub fn discard_shadow(&mut self, project_path: &Path) -> Result<bool, StoreError> {
        let removed = self.store.remove(&shadow_path(project_path))?;
        if self.project_path.as_deref() == Some(project_path) {
            self.shadow_exists = false;
            self.shadow_rev = None;
        }
        Ok(removed)
    }

    fn remove_shadow_file(&self, path: &Path) {
        match self.store.remove(path) {
            Ok(true) => tracing::debug!(path = %path.display(), "autosave shadow removed"),
            Ok(false) => {}
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "could not remove autosave shadow"),
        }
    }
}
