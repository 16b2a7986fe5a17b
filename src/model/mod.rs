// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core document model.
//!
//! A story graph holds nodes keyed by numeric id and edges that refer to nodes by id only.

pub mod edge;
pub mod graph;
pub mod ids;
pub mod node;

pub use edge::{Edge, EdgeKey};
pub use graph::{GraphError, StoryGraph};
pub use ids::{IdAllocator, NodeId};
pub use node::{Color, Node, ParseColorError, Position};
