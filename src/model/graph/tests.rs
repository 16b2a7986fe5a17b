// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;

use super::{GraphError, StoryGraph};
use crate::model::{Color, EdgeKey, NodeId, Position};

fn id(value: u64) -> NodeId {
    NodeId::new(value)
}

fn graph_with_nodes(ids: &[u64]) -> StoryGraph {
    let mut graph = StoryGraph::new();
    for &raw in ids {
        graph
            .create_node(
                id(raw),
                format!("Node {raw}"),
                format!("docs/node_{raw}.md"),
                Position::new(raw as f64, 0.0),
            )
            .expect("create node");
    }
    graph
}

fn assert_integrity(graph: &StoryGraph) {
    for edge in graph.edges() {
        assert!(graph.contains_node(edge.from_node_id()), "dangling source in {edge:?}");
        assert!(graph.contains_node(edge.to_node_id()), "dangling destination in {edge:?}");
    }
    let unique = graph.nodes().map(|node| node.id()).collect::<HashSet<_>>();
    assert_eq!(unique.len(), graph.node_count());
}

#[test]
fn create_node_rejects_duplicate_id() {
    let mut graph = graph_with_nodes(&[1]);
    let err = graph
        .create_node(id(1), "again", "docs/x.md", Position::default())
        .expect_err("duplicate");
    assert_eq!(err, GraphError::DuplicateId { id: id(1) });
    assert_eq!(graph.find_node(id(1)).expect("node").summary(), "Node 1");
}

#[test]
fn create_edge_requires_both_endpoints() {
    let mut graph = graph_with_nodes(&[1]);
    assert_eq!(
        graph.create_edge(id(1), id(9), "go").expect_err("missing dest"),
        GraphError::UnknownNode { id: id(9) }
    );
    assert_eq!(
        graph.create_edge(id(8), id(1), "go").expect_err("missing source"),
        GraphError::UnknownNode { id: id(8) }
    );
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn duplicate_edge_triples_are_kept_at_creation() {
    // Deduplication happens only when a delete record is built, not here.
    let mut graph = graph_with_nodes(&[1, 2]);
    graph.create_edge(id(1), id(2), "always").expect("edge");
    graph.create_edge(id(1), id(2), "always").expect("edge");
    assert_eq!(graph.edge_count(), 2);

    graph.remove_edge(id(1), id(2), "always").expect("first match");
    assert_eq!(graph.edge_count(), 1);
    assert!(graph.find_edge(id(1), id(2), "always").is_some());
}

#[test]
fn remove_node_cascades_incident_edges() {
    let mut graph = graph_with_nodes(&[1, 2, 3]);
    graph.create_edge(id(1), id(2), "left").expect("edge");
    graph.create_edge(id(3), id(1), "left").expect("edge");
    graph.create_edge(id(2), id(3), "right").expect("edge");

    let removed = graph.remove_node(id(1)).expect("removed");
    assert_eq!(removed.id(), id(1));
    assert!(graph.find_edge(id(1), id(2), "left").is_none());
    assert!(graph.find_edge(id(3), id(1), "left").is_none());
    assert!(graph.find_edge(id(2), id(3), "right").is_some());
    assert_integrity(&graph);
}

#[test]
fn removing_absent_items_is_a_no_op() {
    let mut graph = graph_with_nodes(&[1, 2]);
    graph.create_edge(id(1), id(2), "c").expect("edge");
    let before = graph.clone();

    assert!(graph.remove_node(id(77)).is_none());
    assert!(graph.remove_edge(id(2), id(1), "c").is_none());
    assert!(graph.remove_edge(id(1), id(2), "other").is_none());
    assert_eq!(graph, before);
}

#[test]
fn mutators_report_missing_nodes() {
    let mut graph = graph_with_nodes(&[1, 2]);
    graph.create_edge(id(1), id(2), "old").expect("edge");

    assert!(graph.set_position(id(1), Position::new(5.0, 6.0)));
    assert!(graph.set_summary(id(1), "Intro"));
    assert!(graph.set_color(id(1), Color::rgb(1, 2, 3)));
    assert!(graph.set_condition(&EdgeKey::new(id(1), id(2), "old"), "new"));
    assert!(!graph.set_position(id(3), Position::default()));
    assert!(!graph.set_condition(&EdgeKey::new(id(1), id(2), "old"), "x"));

    let node = graph.find_node(id(1)).expect("node");
    assert_eq!(node.position(), Position::new(5.0, 6.0));
    assert_eq!(node.summary(), "Intro");
    assert_eq!(node.color(), Color::rgb(1, 2, 3));
    assert!(graph.find_edge(id(1), id(2), "new").is_some());
}

#[test]
fn max_node_id_tracks_highest_live_id() {
    let mut graph = StoryGraph::new();
    assert_eq!(graph.max_node_id(), 0);
    graph = graph_with_nodes(&[3, 10, 4]);
    assert_eq!(graph.max_node_id(), 10);
    graph.remove_node(id(10));
    assert_eq!(graph.max_node_id(), 4);
}

#[test]
fn nodes_enumerate_in_insertion_order() {
    let mut graph = graph_with_nodes(&[5, 2, 9]);
    let order = |graph: &StoryGraph| graph.nodes().map(|node| node.id().get()).collect::<Vec<_>>();
    assert_eq!(order(&graph), [5, 2, 9]);

    let removed = graph.remove_node(id(2)).expect("present");
    assert_eq!(order(&graph), [5, 9]);

    graph.insert_node(removed).expect("reinsert");
    assert_eq!(order(&graph), [5, 9, 2]);
    assert_eq!(graph, graph_with_nodes(&[2, 5, 9]));
}

#[test]
fn structural_equality_ignores_edge_order() {
    let mut a = graph_with_nodes(&[1, 2]);
    let mut b = graph_with_nodes(&[1, 2]);
    a.create_edge(id(1), id(2), "x").expect("edge");
    a.create_edge(id(2), id(1), "y").expect("edge");
    b.create_edge(id(2), id(1), "y").expect("edge");
    b.create_edge(id(1), id(2), "x").expect("edge");
    assert_eq!(a, b);

    b.set_summary(id(1), "changed");
    assert_ne!(a, b);
}

#[test]
fn integrity_holds_across_mixed_mutation_sequence() {
    let mut graph = StoryGraph::new();
    // Deterministic pseudo-random walk over create/delete operations.
    let mut seed = 0x2545_f491_u64;
    let mut next_id = 1u64;
    for _ in 0..400 {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        let live = graph.nodes().map(|node| node.id()).collect::<Vec<_>>();
        match seed % 4 {
            0 | 1 => {
                graph
                    .create_node(id(next_id), "n", "docs/n.md", Position::default())
                    .expect("fresh id");
                next_id += 1;
            }
            2 if live.len() >= 2 => {
                let from = live[(seed as usize / 7) % live.len()];
                let to = live[(seed as usize / 13) % live.len()];
                graph.create_edge(from, to, "c").expect("live endpoints");
            }
            _ if !live.is_empty() => {
                graph.remove_node(live[(seed as usize / 3) % live.len()]);
            }
            _ => {}
        }
        assert_integrity(&graph);
        assert!(graph.max_node_id() < next_id);
    }
}

#[test]
fn clear_drops_everything() {
    let mut graph = graph_with_nodes(&[1, 2]);
    graph.create_edge(id(1), id(2), "c").expect("edge");
    graph.clear();
    assert!(graph.is_empty());
}
