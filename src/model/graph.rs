// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::PathBuf;

use indexmap::map::Entry;
use indexmap::IndexMap;

use super::edge::{Edge, EdgeKey};
use super::ids::NodeId;
use super::node::{Color, Node, Position};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("node id {id} is already in use")]
    DuplicateId { id: NodeId },
    #[error("edge endpoint node {id} does not exist")]
    UnknownNode { id: NodeId },
}

/// The story document: nodes keyed by id, kept in insertion order, plus a flat edge list.
///
/// Every edge endpoint resolves to a live node. Removal of an absent node or edge is a no-op,
/// never an error, so undo/redo can re-apply removals freely.
#[derive(Debug, Clone, Default)]
pub struct StoryGraph {
    nodes: IndexMap<NodeId, Node>,
    edges: Vec<Edge>,
}

impl StoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_node(
        &mut self,
        id: NodeId,
        summary: impl Into<String>,
        artifact_path: impl Into<PathBuf>,
        position: Position,
    ) -> Result<&Node, GraphError> {
        self.insert_node(Node::new(id, summary, artifact_path, position))
    }

    /// Inserts a complete node snapshot (color included).
    pub fn insert_node(&mut self, node: Node) -> Result<&Node, GraphError> {
        let id = node.id();
        match self.nodes.entry(id) {
            Entry::Occupied(_) => Err(GraphError::DuplicateId { id }),
            Entry::Vacant(slot) => Ok(slot.insert(node)),
        }
    }

    /// Adds an edge. Identical `(from, to, condition)` triples are allowed to coexist.
    pub fn create_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        condition: impl Into<String>,
    ) -> Result<&Edge, GraphError> {
        for id in [from, to] {
            if !self.nodes.contains_key(&id) {
                return Err(GraphError::UnknownNode { id });
            }
        }
        self.edges.push(Edge::new(from, to, condition));
        Ok(&self.edges[self.edges.len() - 1])
    }

    /// Removes the node and, in the same step, every edge touching it.
    ///
    /// The remaining nodes keep their relative order.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.shift_remove(&id)?;
        self.edges.retain(|edge| !edge.touches(id));
        Some(node)
    }

    /// Removes the first edge matching the key exactly.
    pub fn remove_edge(&mut self, from: NodeId, to: NodeId, condition: &str) -> Option<Edge> {
        let index = self.edge_index(from, to, condition)?;
        Some(self.edges.remove(index))
    }

    pub fn remove_edge_by_key(&mut self, key: &EdgeKey) -> Option<Edge> {
        self.remove_edge(key.from, key.to, &key.condition)
    }

    pub fn find_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn find_edge(&self, from: NodeId, to: NodeId, condition: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.matches(from, to, condition))
    }

    pub fn find_edge_by_key(&self, key: &EdgeKey) -> Option<&Edge> {
        self.find_edge(key.from, key.to, &key.condition)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// Nodes in insertion order. A node restored by undo counts as newly inserted.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// Edges in creation order.
    pub fn edges(&self) -> impl ExactSizeIterator<Item = &Edge> + '_ {
        self.edges.iter()
    }

    pub fn edges_touching(&self, id: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(move |edge| edge.touches(id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Highest node id present, 0 for an empty graph.
    pub fn max_node_id(&self) -> u64 {
        self.nodes.keys().map(|id| id.get()).max().unwrap_or(0)
    }

    pub fn set_position(&mut self, id: NodeId, position: Position) -> bool {
        self.with_node(id, |node| node.set_position(position))
    }

    pub fn set_summary(&mut self, id: NodeId, summary: &str) -> bool {
        self.with_node(id, |node| node.set_summary(summary))
    }

    pub fn set_color(&mut self, id: NodeId, color: Color) -> bool {
        self.with_node(id, |node| node.set_color(color))
    }

    /// Relabels the first edge matching `key`. Returns `false` when nothing matched.
    pub fn set_condition(&mut self, key: &EdgeKey, condition: &str) -> bool {
        let Some(index) = self.edge_index(key.from, key.to, &key.condition) else {
            return false;
        };
        self.edges[index].set_condition(condition);
        true
    }

    fn with_node(&mut self, id: NodeId, update: impl FnOnce(&mut Node)) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                update(node);
                true
            }
            None => false,
        }
    }

    fn edge_index(&self, from: NodeId, to: NodeId, condition: &str) -> Option<usize> {
        self.edges
            .iter()
            .position(|edge| edge.matches(from, to, condition))
    }
}

/// Structural equality: same nodes, same edge multiset. Neither node nor edge order is
/// significant, since undo re-appends restored items after any survivors.
impl PartialEq for StoryGraph {
    fn eq(&self, other: &Self) -> bool {
        if self.nodes != other.nodes || self.edges.len() != other.edges.len() {
            return false;
        }
        let mut left = self.edges.iter().map(Edge::key).collect::<Vec<_>>();
        let mut right = other.edges.iter().map(Edge::key).collect::<Vec<_>>();
        left.sort();
        right.sort();
        left == right
    }
}

#[cfg(test)]
mod tests;
