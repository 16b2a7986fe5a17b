// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::ids::NodeId;

/// Scene position of a node's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An opaque `#RRGGBB` display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
}

impl Color {
    /// Light sky blue, the fill every new node gets.
    pub const DEFAULT_NODE: Color = Color::rgb(0x87, 0xce, 0xfa);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn components(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::DEFAULT_NODE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError {
    input: String,
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color '{}' (expected #RRGGBB)", self.input)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError { input: s.to_owned() };
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(err());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| err())
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// A story vertex: a short summary plus the scene document it links to.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    summary: String,
    artifact_path: PathBuf,
    position: Position,
    color: Color,
}

impl Node {
    pub fn new(
        id: NodeId,
        summary: impl Into<String>,
        artifact_path: impl Into<PathBuf>,
        position: Position,
    ) -> Self {
        Self {
            id,
            summary: summary.into(),
            artifact_path: artifact_path.into(),
            position,
            color: Color::default(),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = summary.into();
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn color_round_trips_through_hex() {
        let color: Color = "#87CEFA".parse().expect("color");
        assert_eq!(color, Color::DEFAULT_NODE);
        assert_eq!(color.to_string(), "#87cefa");
    }

    #[test]
    fn color_rejects_malformed_input() {
        assert!("87cefa".parse::<Color>().is_err());
        assert!("#87cef".parse::<Color>().is_err());
        assert!("#zzzzzz".parse::<Color>().is_err());
        assert!("#ééé".parse::<Color>().is_err());
    }
}
