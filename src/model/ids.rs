// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a story node, unique within one document.
///
/// Edges and commands refer to nodes only through this id, never through a handle into the
/// graph, so a node recreated by undo is found again by the same value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Hands out node ids for one editing session.
///
/// The counter only moves forward; deleting a node (or undoing its creation) never returns
/// its id to the pool. Reseeding happens on new/open only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next call to [`IdAllocator::next`] returns.
    pub fn peek(&self) -> NodeId {
        NodeId(self.next)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }

    /// Seeds the counter past the highest id of a freshly loaded document.
    pub fn reset_after(&mut self, max_id: u64) {
        self.next = max_id.saturating_add(1);
    }

    pub fn reset(&mut self) {
        self.next = 1;
    }
}
