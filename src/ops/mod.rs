// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Reversible editing commands and the linear undo history.
//!
//! Commands store plain data (ids, node snapshots, before/after values) and re-resolve every
//! id against the graph when they run. Each application produces a minimal delta the host can
//! use to refresh derived state such as edge geometry.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use crate::artifact::ArtifactStore;
use crate::model::{Color, EdgeKey, GraphError, Node, NodeId, Position, StoryGraph};

pub mod history;

pub use history::History;

/// What a command runs against.
pub struct CommandContext<'a> {
    pub graph: &'a mut StoryGraph,
    pub artifacts: &'a dyn ArtifactStore,
}

impl<'a> CommandContext<'a> {
    pub fn new(graph: &'a mut StoryGraph, artifacts: &'a dyn ArtifactStore) -> Self {
        Self { graph, artifacts }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Identifies one continuous drag gesture; moves sharing it coalesce into a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DragId(u64);

impl DragId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }
}

/// A set of selected items, as handed over by the canvas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub nodes: BTreeSet<NodeId>,
    pub edges: Vec<EdgeKey>,
}

impl Selection {
    pub fn nodes(ids: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            nodes: ids.into_iter().collect(),
            edges: Vec::new(),
        }
    }

    pub fn with_edge(mut self, key: EdgeKey) -> Self {
        self.edges.push(key);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddNode(AddNode),
    DeleteItems(DeleteItems),
    MoveNodes(MoveNodes),
    UpdateSummary(UpdateSummary),
    ConnectNodes(ConnectNodes),
    UpdateCondition(UpdateCondition),
    SetColor(SetColor),
}

impl Command {
    /// Caption for the host's Undo/Redo actions.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddNode(_) => "Add Node",
            Self::DeleteItems(_) => "Delete Items",
            Self::MoveNodes(_) => "Move Nodes",
            Self::UpdateSummary(_) => "Edit Summary",
            Self::ConnectNodes(_) => "Connect Nodes",
            Self::UpdateCondition(_) => "Edit Condition",
            Self::SetColor(_) => "Change Color",
        }
    }

    /// Applies the command. Structural errors only arise for commands that create items.
    pub fn redo(&self, ctx: &mut CommandContext<'_>) -> Result<Delta, CommandError> {
        let mut changes = ChangeLog::default();
        match self {
            Self::AddNode(cmd) => redo_add_node(cmd, ctx, &mut changes)?,
            Self::DeleteItems(cmd) => redo_delete_items(cmd, ctx, &mut changes),
            Self::MoveNodes(cmd) => apply_positions(ctx, cmd.ends(|m| m.after), &mut changes),
            Self::UpdateSummary(cmd) => apply_summary(ctx, cmd.node_id, &cmd.after, &mut changes),
            Self::ConnectNodes(cmd) => redo_connect(cmd, ctx, &mut changes)?,
            Self::UpdateCondition(cmd) => {
                apply_condition(ctx, &cmd.key, &cmd.before, &cmd.after, &mut changes)
            }
            Self::SetColor(cmd) => apply_color(ctx, cmd.node_id, cmd.after, &mut changes),
        }
        Ok(changes.finish())
    }

    /// Inverts the command. Never fails: ids that no longer resolve are skipped.
    pub fn undo(&self, ctx: &mut CommandContext<'_>) -> Delta {
        let mut changes = ChangeLog::default();
        match self {
            Self::AddNode(cmd) => remove_node_recorded(ctx, cmd.node.id(), &mut changes),
            Self::DeleteItems(cmd) => undo_delete_items(cmd, ctx, &mut changes),
            Self::MoveNodes(cmd) => apply_positions(ctx, cmd.ends(|m| m.before), &mut changes),
            Self::UpdateSummary(cmd) => apply_summary(ctx, cmd.node_id, &cmd.before, &mut changes),
            Self::ConnectNodes(cmd) => undo_connect(cmd, ctx, &mut changes),
            Self::UpdateCondition(cmd) => {
                apply_condition(ctx, &cmd.key, &cmd.after, &cmd.before, &mut changes)
            }
            Self::SetColor(cmd) => apply_color(ctx, cmd.node_id, cmd.before, &mut changes),
        }
        changes.finish()
    }

    /// Folds `next` into `self` when both are steps of the same drag gesture.
    fn try_merge(&mut self, next: &Command) -> bool {
        match (self, next) {
            (Self::MoveNodes(current), Self::MoveNodes(next)) => current.merge(next),
            _ => false,
        }
    }

    fn can_merge(&self, next: &Command) -> bool {
        match (self, next) {
            (Self::MoveNodes(current), Self::MoveNodes(next)) => current.can_merge(next),
            _ => false,
        }
    }

    /// A command that would no longer change anything (a drag that returned to its start).
    fn is_obsolete(&self) -> bool {
        match self {
            Self::MoveNodes(cmd) => !cmd.moves.values().any(NodeMove::is_move),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddNode {
    node: Node,
}

impl AddNode {
    pub fn new(node: Node) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }
}

/// Snapshot of a deletion, including the full cascade closure of incident edges.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteItems {
    nodes: Vec<Node>,
    edges: Vec<EdgeKey>,
}

impl DeleteItems {
    /// Records everything `selection` would remove from `graph`.
    ///
    /// Edges are de-duplicated by key: selected edges first, then every edge touching a
    /// selected node. Returns `None` when the selection resolves to nothing.
    pub fn new(graph: &StoryGraph, selection: &Selection) -> Option<Self> {
        let nodes = selection
            .nodes
            .iter()
            .filter_map(|id| graph.find_node(*id).cloned())
            .collect::<Vec<_>>();

        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        let mut record = |key: EdgeKey| {
            if seen.insert(key.clone()) {
                edges.push(key);
            }
        };

        for key in &selection.edges {
            if graph.find_edge_by_key(key).is_some() {
                record(key.clone());
            }
        }
        for node in &nodes {
            for edge in graph.edges_touching(node.id()) {
                record(edge.key());
            }
        }

        if nodes.is_empty() && edges.is_empty() {
            return None;
        }
        Some(Self { nodes, edges })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeKey] {
        &self.edges
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeMove {
    pub before: Position,
    pub after: Position,
}

impl NodeMove {
    /// A real displacement between two finite positions.
    pub fn is_move(&self) -> bool {
        self.before != self.after && self.before.is_finite() && self.after.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveNodes {
    moves: BTreeMap<NodeId, NodeMove>,
    drag: Option<DragId>,
}

impl MoveNodes {
    /// Builds a batch move from `(id, before, after)` triples.
    ///
    /// Entries that are not a real move (no displacement, or a non-finite coordinate on either
    /// end) are dropped; `None` when nothing is left.
    pub fn new(moves: impl IntoIterator<Item = (NodeId, Position, Position)>) -> Option<Self> {
        let moves = moves
            .into_iter()
            .map(|(id, before, after)| (id, NodeMove { before, after }))
            .filter(|(_, m)| m.is_move())
            .collect::<BTreeMap<_, _>>();
        if moves.is_empty() {
            return None;
        }
        Some(Self { moves, drag: None })
    }

    pub fn in_drag(mut self, drag: DragId) -> Self {
        self.drag = Some(drag);
        self
    }

    /// Per-node moves. After drag merges this may include nodes whose net move is zero.
    pub fn moves(&self) -> &BTreeMap<NodeId, NodeMove> {
        &self.moves
    }

    pub fn drag(&self) -> Option<DragId> {
        self.drag
    }

    fn ends(&self, pick: fn(&NodeMove) -> Position) -> impl Iterator<Item = (NodeId, Position)> + '_ {
        self.moves
            .iter()
            .filter(|(_, m)| m.is_move())
            .map(move |(id, m)| (*id, pick(m)))
    }

    /// `next` continues this gesture: same drag, same nodes, each starting where it stopped.
    fn can_merge(&self, next: &MoveNodes) -> bool {
        self.drag.is_some()
            && self.drag == next.drag
            && self.moves.len() == next.moves.len()
            && next.moves.iter().all(|(id, step)| {
                self.moves
                    .get(id)
                    .is_some_and(|current| current.after == step.before)
            })
    }

    fn merge(&mut self, next: &MoveNodes) -> bool {
        if !self.can_merge(next) {
            return false;
        }
        // Entries stay even when their net move hits zero, so the node set keeps matching.
        for (id, step) in &next.moves {
            if let Some(current) = self.moves.get_mut(id) {
                current.after = step.after;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSummary {
    node_id: NodeId,
    before: String,
    after: String,
}

impl UpdateSummary {
    pub fn new(node_id: NodeId, before: impl Into<String>, after: impl Into<String>) -> Option<Self> {
        let (before, after) = (before.into(), after.into());
        (before != after).then_some(Self { node_id, before, after })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectNodes {
    key: EdgeKey,
}

impl ConnectNodes {
    pub fn new(key: EdgeKey) -> Self {
        Self { key }
    }

    pub fn key(&self) -> &EdgeKey {
        &self.key
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCondition {
    key: EdgeKey,
    before: String,
    after: String,
}

impl UpdateCondition {
    /// `key` identifies the edge by its current condition text.
    pub fn new(key: EdgeKey, after: impl Into<String>) -> Option<Self> {
        let after = after.into();
        let before = key.condition.clone();
        (before != after).then_some(Self { key, before, after })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetColor {
    node_id: NodeId,
    before: Color,
    after: Color,
}

impl SetColor {
    pub fn new(node_id: NodeId, before: Color, after: Color) -> Option<Self> {
        (before != after).then_some(Self { node_id, before, after })
    }
}

/// A graph item as seen by the host's change notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemRef {
    Node(NodeId),
    Edge(EdgeKey),
}

/// Items touched by one command application, net of changes that cancel out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<ItemRef>,
    pub removed: Vec<ItemRef>,
    pub updated: Vec<ItemRef>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

/// Compact `+added -removed ~updated` counts, as the CLI prints them.
impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "+{} -{} ~{}",
            self.added.len(),
            self.removed.len(),
            self.updated.len()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Added,
    Removed,
    Updated,
}

/// One entry per item; a later change folds into the earlier one.
#[derive(Debug, Default)]
struct ChangeLog(BTreeMap<ItemRef, Change>);

impl ChangeLog {
    fn note(&mut self, change: Change, item: ItemRef) {
        let mut slot = match self.0.entry(item) {
            Entry::Vacant(slot) => {
                slot.insert(change);
                return;
            }
            Entry::Occupied(slot) => slot,
        };
        match (*slot.get(), change) {
            // Created and dropped within one application; the host never saw it.
            (Change::Added, Change::Removed) => {
                slot.remove();
            }
            (Change::Removed, Change::Added) => {
                slot.insert(Change::Updated);
            }
            (Change::Updated, later) => {
                slot.insert(later);
            }
            (Change::Added | Change::Removed, _) => {}
        }
    }

    fn finish(self) -> Delta {
        let mut delta = Delta::default();
        for (item, change) in self.0 {
            let bucket = match change {
                Change::Added => &mut delta.added,
                Change::Removed => &mut delta.removed,
                Change::Updated => &mut delta.updated,
            };
            bucket.push(item);
        }
        delta
    }
}

// Per-variant redo/undo bodies.
include!("ops_impl.rs");
