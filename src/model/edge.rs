// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use super::ids::NodeId;

/// Search key for an edge: `(source, destination, condition)`.
///
/// Keys are not unique in a graph; lookups by key always resolve to the first match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub from: NodeId,
    pub to: NodeId,
    pub condition: String,
}

impl EdgeKey {
    pub fn new(from: NodeId, to: NodeId, condition: impl Into<String>) -> Self {
        Self {
            from,
            to,
            condition: condition.into(),
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{} [{}]", self.from, self.to, self.condition)
    }
}

/// A directed, labeled link between two nodes, held by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    from: NodeId,
    to: NodeId,
    condition: String,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId, condition: impl Into<String>) -> Self {
        Self {
            from,
            to,
            condition: condition.into(),
        }
    }

    pub fn from_node_id(&self) -> NodeId {
        self.from
    }

    pub fn to_node_id(&self) -> NodeId {
        self.to
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn set_condition(&mut self, condition: impl Into<String>) {
        self.condition = condition.into();
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.from, self.to, self.condition.clone())
    }

    pub fn matches(&self, from: NodeId, to: NodeId, condition: &str) -> bool {
        self.from == from && self.to == to && self.condition == condition
    }

    pub fn touches(&self, node_id: NodeId) -> bool {
        self.from == node_id || self.to == node_id
    }
}
