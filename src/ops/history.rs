// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::{Command, CommandContext, CommandError, Delta};

/// Linear undo history.
///
/// `commands[..cursor]` are applied, `commands[cursor..]` are undone and kept for redo.
/// `clean` is the cursor position of the last durable save; `None` once that position was
/// discarded by truncation, which leaves the document dirty until the next save.
/// `rev` is bumped on every change of the applied state, including drag merges that leave
/// the cursor in place.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    commands: Vec<Command>,
    cursor: usize,
    clean: Option<usize>,
    rev: u64,
}

impl Default for History {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            cursor: 0,
            clean: Some(0),
            rev: 0,
        }
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `command` and records it at the cursor, discarding any undone commands.
    ///
    /// A drag step is folded into the previous entry of the same gesture, unless that entry
    /// is the clean point. If the first application fails nothing is recorded.
    pub fn push_and_apply(
        &mut self,
        command: Command,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Delta, CommandError> {
        let merge = self.cursor > 0
            && self.clean != Some(self.cursor)
            && self.commands[self.cursor - 1].can_merge(&command);

        let delta = command.redo(ctx)?;
        self.truncate_redo_tail();
        self.bump_rev();

        if merge {
            let top = &mut self.commands[self.cursor - 1];
            top.try_merge(&command);
            if top.is_obsolete() {
                self.commands.pop();
                self.cursor -= 1;
            }
            return Ok(delta);
        }

        self.commands.push(command);
        self.cursor += 1;
        Ok(delta)
    }

    /// Steps back once. `None` when there is nothing to undo.
    pub fn undo(&mut self, ctx: &mut CommandContext<'_>) -> Option<Delta> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.bump_rev();
        Some(self.commands[self.cursor].undo(ctx))
    }

    /// Steps forward once. `None` when there is nothing to redo.
    pub fn redo(&mut self, ctx: &mut CommandContext<'_>) -> Option<Delta> {
        let command = self.commands.get(self.cursor)?;
        self.cursor += 1;
        self.rev = self.rev.saturating_add(1);
        match command.redo(ctx) {
            Ok(delta) => Some(delta),
            Err(err) => {
                tracing::warn!(command = command.label(), error = %err, "redo step skipped");
                Some(Delta::default())
            }
        }
    }

    pub fn mark_clean(&mut self) {
        self.clean = Some(self.cursor);
    }

    /// Forgets the clean point, e.g. after restoring content that was never durably saved.
    pub fn mark_unsaved(&mut self) {
        self.clean = None;
    }

    pub fn is_dirty(&self) -> bool {
        self.clean != Some(self.cursor)
    }

    /// Drops all commands. The revision keeps counting so observers see the change.
    pub fn clear(&mut self) {
        let rev = self.rev.saturating_add(1);
        *self = Self {
            rev,
            ..Self::default()
        };
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn clean_index(&self) -> Option<usize> {
        self.clean
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.commands.len()
    }

    pub fn undo_label(&self) -> Option<&'static str> {
        self.cursor
            .checked_sub(1)
            .map(|index| self.commands[index].label())
    }

    pub fn redo_label(&self) -> Option<&'static str> {
        self.commands.get(self.cursor).map(Command::label)
    }

    fn bump_rev(&mut self) {
        self.rev = self.rev.saturating_add(1);
    }

    fn truncate_redo_tail(&mut self) {
        if self.cursor == self.commands.len() {
            return;
        }
        self.commands.truncate(self.cursor);
        if self.clean.is_some_and(|clean| clean > self.cursor) {
            self.clean = None;
        }
    }
}
