// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Storyloom: the core of a story graph editor.
//!
//! Nodes are story beats linked to a scene document, edges are conditional transitions.
//! All edits run through an undoable command history; projects persist as flat JSON with
//! periodic autosave snapshots for crash recovery.

pub mod artifact;
pub mod autosave;
pub mod config;
pub mod editor;
pub mod model;
pub mod ops;
pub mod store;

#[cfg(test)]
pub(crate) mod fixtures;
