// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Mutation helpers used by `Command::redo` / `Command::undo`.
/// Keeps `ops::mod` focused on public command types and orchestration.
fn ensure_artifact(ctx: &CommandContext<'_>, node: &Node) {
    if let Err(err) = ctx.artifacts.ensure(node.artifact_path(), node.summary()) {
        tracing::warn!(
            node_id = %node.id(),
            path = %node.artifact_path().display(),
            error = %err,
            "could not create placeholder document"
        );
    }
}

fn redo_add_node(
    cmd: &AddNode,
    ctx: &mut CommandContext<'_>,
    changes: &mut ChangeLog,
) -> Result<(), CommandError> {
    if ctx.graph.contains_node(cmd.node.id()) {
        return Err(GraphError::DuplicateId { id: cmd.node.id() }.into());
    }
    ensure_artifact(ctx, &cmd.node);
    ctx.graph.insert_node(cmd.node.clone())?;
    changes.note(Change::Added, ItemRef::Node(cmd.node.id()));
    Ok(())
}

fn remove_node_recorded(ctx: &mut CommandContext<'_>, node_id: NodeId, changes: &mut ChangeLog) {
    let cascaded = ctx
        .graph
        .edges_touching(node_id)
        .map(|edge| edge.key())
        .collect::<Vec<_>>();
    if ctx.graph.remove_node(node_id).is_none() {
        tracing::debug!(%node_id, "node already gone; skipping removal");
        return;
    }
    for key in cascaded {
        changes.note(Change::Removed, ItemRef::Edge(key));
    }
    changes.note(Change::Removed, ItemRef::Node(node_id));
}

fn redo_delete_items(cmd: &DeleteItems, ctx: &mut CommandContext<'_>, changes: &mut ChangeLog) {
    // Edges go first; removing nodes first would let the cascade swallow them.
    for key in &cmd.edges {
        if ctx.graph.remove_edge_by_key(key).is_some() {
            changes.note(Change::Removed, ItemRef::Edge(key.clone()));
        } else {
            tracing::debug!(edge = %key, "edge already gone; skipping removal");
        }
    }
    for node in &cmd.nodes {
        remove_node_recorded(ctx, node.id(), changes);
    }
}

fn undo_delete_items(cmd: &DeleteItems, ctx: &mut CommandContext<'_>, changes: &mut ChangeLog) {
    // Nodes first: edges need both endpoints present.
    for node in &cmd.nodes {
        ensure_artifact(ctx, node);
        match ctx.graph.insert_node(node.clone()) {
            Ok(_) => changes.note(Change::Added, ItemRef::Node(node.id())),
            Err(err) => tracing::debug!(error = %err, "skipping node restore"),
        }
    }
    for key in &cmd.edges {
        match ctx.graph.create_edge(key.from, key.to, key.condition.clone()) {
            Ok(_) => changes.note(Change::Added, ItemRef::Edge(key.clone())),
            Err(err) => tracing::debug!(edge = %key, error = %err, "skipping edge restore"),
        }
    }
}

fn apply_positions(
    ctx: &mut CommandContext<'_>,
    positions: impl Iterator<Item = (NodeId, Position)>,
    changes: &mut ChangeLog,
) {
    for (node_id, position) in positions {
        if ctx.graph.set_position(node_id, position) {
            changes.note(Change::Updated, ItemRef::Node(node_id));
        } else {
            tracing::debug!(%node_id, "node missing; skipping move");
        }
    }
}

fn apply_summary(
    ctx: &mut CommandContext<'_>,
    node_id: NodeId,
    summary: &str,
    changes: &mut ChangeLog,
) {
    if ctx.graph.set_summary(node_id, summary) {
        changes.note(Change::Updated, ItemRef::Node(node_id));
    } else {
        tracing::debug!(%node_id, "node missing; skipping summary update");
    }
}

fn apply_color(ctx: &mut CommandContext<'_>, node_id: NodeId, color: Color, changes: &mut ChangeLog) {
    if ctx.graph.set_color(node_id, color) {
        changes.note(Change::Updated, ItemRef::Node(node_id));
    } else {
        tracing::debug!(%node_id, "node missing; skipping color change");
    }
}

fn redo_connect(
    cmd: &ConnectNodes,
    ctx: &mut CommandContext<'_>,
    changes: &mut ChangeLog,
) -> Result<(), CommandError> {
    let key = &cmd.key;
    ctx.graph.create_edge(key.from, key.to, key.condition.clone())?;
    changes.note(Change::Added, ItemRef::Edge(key.clone()));
    Ok(())
}

fn undo_connect(cmd: &ConnectNodes, ctx: &mut CommandContext<'_>, changes: &mut ChangeLog) {
    if ctx.graph.remove_edge_by_key(&cmd.key).is_some() {
        changes.note(Change::Removed, ItemRef::Edge(cmd.key.clone()));
    } else {
        tracing::debug!(edge = %cmd.key, "edge already gone; skipping removal");
    }
}

/// Relabels the edge currently carrying `from_text` to `to_text`.
fn apply_condition(
    ctx: &mut CommandContext<'_>,
    key: &EdgeKey,
    from_text: &str,
    to_text: &str,
    changes: &mut ChangeLog,
) {
    let current = EdgeKey::new(key.from, key.to, from_text);
    if ctx.graph.set_condition(&current, to_text) {
        changes.note(Change::Removed, ItemRef::Edge(current));
        changes.note(Change::Added, ItemRef::Edge(EdgeKey::new(key.from, key.to, to_text)));
    } else {
        tracing::debug!(edge = %current, "edge missing; skipping condition update");
    }
}
