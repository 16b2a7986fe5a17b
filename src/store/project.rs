// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::artifact::{default_artifact_path, ArtifactStore};
use crate::model::{Color, EdgeKey, Node, NodeId, Position, StoryGraph};

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProjectFile {
    #[serde(default)]
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    id: u64,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    doc: Option<String>,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeRecord {
    from: u64,
    to: u64,
    #[serde(default)]
    condition: String,
}

/// A fully parsed project, not yet committed to any graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectData {
    pub nodes: Vec<Node>,
    pub edges: Vec<EdgeKey>,
}

impl ProjectData {
    /// Highest node id in the file, 0 when there are no nodes.
    pub fn max_id(&self) -> u64 {
        self.nodes.iter().map(|node| node.id().get()).max().unwrap_or(0)
    }
}

/// Serializes the graph: nodes in model order, then edges.
pub fn encode(graph: &StoryGraph) -> Result<Vec<u8>, StoreError> {
    let file = ProjectFile {
        nodes: graph
            .nodes()
            .map(|node| NodeRecord {
                id: node.id().get(),
                summary: Some(node.summary().to_owned()),
                doc: Some(portable_path(node.artifact_path())),
                x: Some(node.position().x),
                y: Some(node.position().y),
                color: Some(node.color().to_string()),
            })
            .collect(),
        edges: graph
            .edges()
            .map(|edge| EdgeRecord {
                from: edge.from_node_id().get(),
                to: edge.to_node_id().get(),
                condition: edge.condition().to_owned(),
            })
            .collect(),
    };

    let mut bytes = serde_json::to_vec_pretty(&file).map_err(|source| StoreError::Encode { source })?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Parses project bytes. Missing optional fields fall back to the editor defaults.
pub fn decode(bytes: &[u8]) -> Result<ProjectData, StoreError> {
    decode_at(bytes, None)
}

pub(crate) fn decode_at(bytes: &[u8], path: Option<&Path>) -> Result<ProjectData, StoreError> {
    let file: ProjectFile = serde_json::from_slice(bytes).map_err(|source| StoreError::Parse {
        location: path.map_or_else(|| "<memory>".to_owned(), |p| p.display().to_string()),
        source,
    })?;

    let nodes = file
        .nodes
        .into_iter()
        .map(|record| {
            let id = NodeId::new(record.id);
            let artifact_path = record
                .doc
                .map(PathBuf::from)
                .unwrap_or_else(|| default_artifact_path(id));
            let summary = record.summary.unwrap_or_else(|| format!("Node {id}"));
            let position = Position::new(record.x.unwrap_or(0.0), record.y.unwrap_or(0.0));
            let color = record
                .color
                .and_then(|raw| raw.parse::<Color>().ok())
                .unwrap_or_default();
            Node::new(id, summary, artifact_path, position).with_color(color)
        })
        .collect();

    let edges = file
        .edges
        .into_iter()
        .map(|record| {
            EdgeKey::new(NodeId::new(record.from), NodeId::new(record.to), record.condition)
        })
        .collect();

    Ok(ProjectData { nodes, edges })
}

/// Replaces the graph's contents with `data`.
///
/// Each node's document is ensured before the node is inserted. Edges whose endpoints are not
/// among the loaded nodes are dropped. Returns the maximum node id seen.
pub fn commit(graph: &mut StoryGraph, data: ProjectData, artifacts: &dyn ArtifactStore) -> u64 {
    let max_id = data.max_id();
    graph.clear();

    for node in data.nodes {
        if let Err(err) = artifacts.ensure(node.artifact_path(), node.summary()) {
            tracing::warn!(
                node_id = %node.id(),
                path = %node.artifact_path().display(),
                error = %err,
                "could not create placeholder document"
            );
        }
        if let Err(err) = graph.insert_node(node) {
            tracing::warn!(error = %err, "skipping duplicate node record");
        }
    }

    for key in data.edges {
        if let Err(err) = graph.create_edge(key.from, key.to, key.condition.clone()) {
            tracing::debug!(edge = %key, error = %err, "dropping edge with missing endpoint");
        }
    }

    max_id
}

/// Parses `bytes` and, only if that succeeds, replaces the graph's contents.
pub fn load_into(
    graph: &mut StoryGraph,
    bytes: &[u8],
    artifacts: &dyn ArtifactStore,
) -> Result<u64, StoreError> {
    let data = decode(bytes)?;
    Ok(commit(graph, data, artifacts))
}

fn portable_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
