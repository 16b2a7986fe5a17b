// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! One open story project and everything a user intent touches.
//!
//! [`Editor`] owns the graph, its undo history and the autosave controller. Every edit goes
//! through a [`Command`] so it can be undone; loading and clearing reset the history.

use std::io;
use std::path::{Path, PathBuf};

use crate::artifact::{default_artifact_path, ArtifactStore, FsArtifacts};
use crate::autosave::{shadow_path, AutosaveController, AutosaveOutcome, RecoveryChoice, RecoveryOffer};
use crate::config::Settings;
use crate::model::{Color, EdgeKey, IdAllocator, Node, NodeId, Position, StoryGraph};
use crate::ops::{
    AddNode, Command, CommandContext, CommandError, ConnectNodes, Delta, DeleteItems, DragId,
    History, MoveNodes, Selection, SetColor, UpdateCondition, UpdateSummary,
};
use crate::store::{commit, ProjectData, ProjectStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("project has no file name yet; use save-as")]
    NoPath,
    #[error("cannot connect node {id} to itself")]
    SelfLoop { id: NodeId },
    #[error("node {id} does not exist")]
    UnknownNode { id: NodeId },
    #[error("edge {key} does not exist")]
    UnknownEdge { key: EdgeKey },
    #[error("position ({x}, {y}) is not finite")]
    NonFinitePosition { x: f64, y: f64 },
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("could not open document {}: {source}", path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    /// The autosave shadow was loaded; the document is dirty until saved.
    Restored,
    /// The user postponed the decision; nothing was loaded.
    Deferred,
}

pub struct Editor<A: ArtifactStore = FsArtifacts> {
    graph: StoryGraph,
    history: History,
    ids: IdAllocator,
    autosave: AutosaveController,
    settings: Settings,
    settings_path: Option<PathBuf>,
    store: ProjectStore,
    artifacts: A,
    project_path: Option<PathBuf>,
    next_drag: u64,
}

impl<A: ArtifactStore> Editor<A> {
    /// A fresh, untitled project. `settings_path` is where settings changes are persisted.
    pub fn new(artifacts: A, settings: Settings, settings_path: Option<PathBuf>) -> Self {
        let settings = settings.normalized();
        let store = ProjectStore::new();
        Self {
            graph: StoryGraph::new(),
            history: History::new(),
            ids: IdAllocator::new(),
            autosave: AutosaveController::new(settings.autosave(), store),
            settings,
            settings_path,
            store,
            artifacts,
            project_path: None,
            next_drag: 0,
        }
    }

    pub fn with_store(mut self, store: ProjectStore) -> Self {
        self.store = store;
        self.autosave = AutosaveController::new(self.settings.autosave(), store);
        self.autosave.reset(self.project_path.clone());
        self
    }

    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn autosave(&self) -> &AutosaveController {
        &self.autosave
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn artifacts(&self) -> &A {
        &self.artifacts
    }

    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    /// The id the next [`Editor::add_node`] assigns.
    pub fn next_node_id(&self) -> NodeId {
        self.ids.peek()
    }

    pub fn is_dirty(&self) -> bool {
        self.history.is_dirty()
    }

    pub fn new_project(&mut self) {
        self.graph.clear();
        self.history.clear();
        self.ids.reset();
        self.project_path = None;
        self.autosave.reset(None);
        self.settings.last_project_path = None;
        self.persist_settings();
        tracing::info!("new project");
    }

    /// Opens `path`, asking `decide` first when an autosave shadow is waiting next to it.
    ///
    /// On any error the current document stays as it was.
    pub fn open(
        &mut self,
        path: impl Into<PathBuf>,
        decide: impl FnOnce(&RecoveryOffer) -> RecoveryChoice,
    ) -> Result<OpenOutcome, EditorError> {
        let path = path.into();
        let Some(offer) = self.autosave.check_recovery(&path) else {
            let data = self.store.read(&path)?;
            self.install(data, path);
            return Ok(OpenOutcome::Opened);
        };

        match decide(&offer) {
            RecoveryChoice::Defer => {
                tracing::info!(path = %path.display(), "recovery deferred");
                Ok(OpenOutcome::Deferred)
            }
            RecoveryChoice::Restore => {
                let data = self.store.read(&offer.shadow_path)?;
                self.install(data, path.clone());
                self.history.mark_unsaved();
                self.autosave.adopt_shadow(path.clone(), &self.history);
                tracing::info!(path = %path.display(), "restored from autosave");
                Ok(OpenOutcome::Restored)
            }
            RecoveryChoice::Discard => {
                let data = self.store.read(&path)?;
                self.install(data, path.clone());
                if let Err(err) = self.autosave.discard_shadow(&path) {
                    tracing::warn!(path = %offer.shadow_path.display(), error = %err, "could not delete autosave shadow");
                }
                tracing::info!(path = %path.display(), "autosave discarded");
                Ok(OpenOutcome::Opened)
            }
        }
    }

    /// Reopens the last project recorded in the settings, if it (or its shadow) still exists.
    pub fn startup(
        &mut self,
        decide: impl FnOnce(&RecoveryOffer) -> RecoveryChoice,
    ) -> Result<Option<OpenOutcome>, EditorError> {
        let Some(path) = self.settings.last_project_path.clone() else {
            return Ok(None);
        };
        if !path.is_file() && !shadow_path(&path).is_file() {
            tracing::debug!(path = %path.display(), "last project is gone");
            return Ok(None);
        }
        self.open(path, decide).map(Some)
    }

    pub fn save(&mut self) -> Result<(), EditorError> {
        let path = self.project_path.clone().ok_or(EditorError::NoPath)?;
        self.save_to(path)
    }

    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<(), EditorError> {
        self.save_to(path.into())
    }

    /// Replaces the settings and re-arms autosave with them.
    pub fn apply_settings(&mut self, settings: Settings) {
        let mut settings = settings.normalized();
        settings.last_project_path = self.settings.last_project_path.clone();
        self.autosave.apply_settings(settings.autosave());
        self.settings = settings;
        self.persist_settings();
    }

    /// Adds a node with the next free id. A blank summary becomes `Node <id>`.
    pub fn add_node(&mut self, summary: &str, position: Position) -> Result<NodeId, EditorError> {
        check_finite(position)?;
        let id = self.ids.next();
        let summary = match summary.trim() {
            "" => format!("Node {id}"),
            text => text.to_owned(),
        };
        let node = Node::new(id, summary, default_artifact_path(id), position);
        self.apply(Command::AddNode(AddNode::new(node)))?;
        Ok(id)
    }

    pub fn connect(
        &mut self,
        from: NodeId,
        to: NodeId,
        condition: &str,
    ) -> Result<EdgeKey, EditorError> {
        if from == to {
            return Err(EditorError::SelfLoop { id: from });
        }
        let key = EdgeKey::new(from, to, condition);
        self.apply(Command::ConnectNodes(ConnectNodes::new(key.clone())))?;
        Ok(key)
    }

    /// Deletes the selection; `None` when it resolves to nothing.
    pub fn delete_selection(&mut self, selection: &Selection) -> Result<Option<Delta>, EditorError> {
        let Some(cmd) = DeleteItems::new(&self.graph, selection) else {
            return Ok(None);
        };
        self.apply(Command::DeleteItems(cmd)).map(Some)
    }

    /// Starts a drag gesture; pass the id to every [`Editor::move_nodes`] call of the gesture.
    pub fn begin_drag(&mut self) -> DragId {
        self.next_drag += 1;
        DragId::new(self.next_drag)
    }

    /// Moves nodes to new positions. Steps of one drag coalesce into a single undo entry.
    pub fn move_nodes(
        &mut self,
        drag: Option<DragId>,
        targets: impl IntoIterator<Item = (NodeId, Position)>,
    ) -> Result<Option<Delta>, EditorError> {
        let mut moves = Vec::new();
        for (id, after) in targets {
            check_finite(after)?;
            let node = self.node(id)?;
            moves.push((id, node.position(), after));
        }
        let Some(mut cmd) = MoveNodes::new(moves) else {
            return Ok(None);
        };
        if let Some(drag) = drag {
            cmd = cmd.in_drag(drag);
        }
        self.apply(Command::MoveNodes(cmd)).map(Some)
    }

    pub fn update_summary(&mut self, id: NodeId, summary: &str) -> Result<Option<Delta>, EditorError> {
        let before = self.node(id)?.summary();
        let Some(cmd) = UpdateSummary::new(id, before, summary) else {
            return Ok(None);
        };
        self.apply(Command::UpdateSummary(cmd)).map(Some)
    }

    pub fn update_condition(
        &mut self,
        key: &EdgeKey,
        condition: &str,
    ) -> Result<Option<Delta>, EditorError> {
        if self.graph.find_edge_by_key(key).is_none() {
            return Err(EditorError::UnknownEdge { key: key.clone() });
        }
        let Some(cmd) = UpdateCondition::new(key.clone(), condition) else {
            return Ok(None);
        };
        self.apply(Command::UpdateCondition(cmd)).map(Some)
    }

    pub fn set_color(&mut self, id: NodeId, color: Color) -> Result<Option<Delta>, EditorError> {
        let before = self.node(id)?.color();
        let Some(cmd) = SetColor::new(id, before, color) else {
            return Ok(None);
        };
        self.apply(Command::SetColor(cmd)).map(Some)
    }

    pub fn undo(&mut self) -> Option<Delta> {
        let mut ctx = CommandContext::new(&mut self.graph, &self.artifacts);
        self.history.undo(&mut ctx)
    }

    pub fn redo(&mut self) -> Option<Delta> {
        let mut ctx = CommandContext::new(&mut self.graph, &self.artifacts);
        self.history.redo(&mut ctx)
    }

    pub fn autosave_tick(&mut self) -> AutosaveOutcome {
        self.autosave.tick(&self.graph, &self.history)
    }

    /// Hands the node's linked document to the external opener.
    pub fn open_artifact(&self, id: NodeId) -> Result<(), EditorError> {
        let path = self.node(id)?.artifact_path();
        self.artifacts
            .open(path)
            .map_err(|source| EditorError::Artifact {
                path: path.to_path_buf(),
                source,
            })
    }

    fn node(&self, id: NodeId) -> Result<&Node, EditorError> {
        self.graph
            .find_node(id)
            .ok_or(EditorError::UnknownNode { id })
    }

    fn apply(&mut self, command: Command) -> Result<Delta, EditorError> {
        let mut ctx = CommandContext::new(&mut self.graph, &self.artifacts);
        Ok(self.history.push_and_apply(command, &mut ctx)?)
    }

    fn install(&mut self, data: ProjectData, path: PathBuf) {
        let max_id = commit(&mut self.graph, data, &self.artifacts);
        self.history.clear();
        self.ids.reset_after(max_id);
        self.autosave.reset(Some(path.clone()));
        self.settings.last_project_path = Some(path.clone());
        self.project_path = Some(path);
        self.persist_settings();
    }

    fn save_to(&mut self, path: PathBuf) -> Result<(), EditorError> {
        self.store.save(&path, &self.graph)?;
        self.autosave.on_saved(&path, &mut self.history);
        self.settings.last_project_path = Some(path.clone());
        self.project_path = Some(path);
        self.persist_settings();
        Ok(())
    }

    fn persist_settings(&self) {
        let Some(path) = self.settings_path.as_deref() else {
            return;
        };
        if let Err(err) = self.settings.save(path) {
            tracing::warn!(path = %path.display(), error = %err, "could not save settings");
        }
    }
}

fn check_finite(position: Position) -> Result<(), EditorError> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(EditorError::NonFinitePosition {
            x: position.x,
            y: position.y,
        })
    }
}
