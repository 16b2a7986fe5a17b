// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyloom-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyloom and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! User settings: autosave behavior and the last opened project.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::store::{write_atomic, StoreError, WriteDurability};

pub const MIN_AUTOSAVE_INTERVAL_MINUTES: u32 = 1;
pub const MAX_AUTOSAVE_INTERVAL_MINUTES: u32 = 120;

const SETTINGS_DIR: &str = "storyloom";
const SETTINGS_FILENAME: &str = "settings.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read settings {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("could not encode settings: {source}")]
    Encode {
        #[source]
        source: toml::ser::Error,
    },
    #[error(transparent)]
    Write(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub autosave_enabled: bool,
    pub autosave_interval_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_project_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autosave_enabled: true,
            autosave_interval_minutes: 2,
            last_project_path: None,
        }
    }
}

impl Settings {
    /// `$XDG_CONFIG_HOME/storyloom/settings.toml` or the platform equivalent.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILENAME))
    }

    /// Reads settings from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let settings: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(settings.normalized())
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(&self.clone().normalized())
            .map_err(|source| ConfigError::Encode { source })?;
        write_atomic(path, raw.as_bytes(), WriteDurability::BestEffort)?;
        Ok(())
    }

    /// Clamps the interval into the supported range.
    pub fn normalized(mut self) -> Self {
        self.autosave_interval_minutes = self
            .autosave_interval_minutes
            .clamp(MIN_AUTOSAVE_INTERVAL_MINUTES, MAX_AUTOSAVE_INTERVAL_MINUTES);
        self
    }

    pub fn autosave(&self) -> AutosaveSettings {
        let minutes = self
            .autosave_interval_minutes
            .clamp(MIN_AUTOSAVE_INTERVAL_MINUTES, MAX_AUTOSAVE_INTERVAL_MINUTES);
        AutosaveSettings {
            enabled: self.autosave_enabled,
            interval: Duration::from_secs(u64::from(minutes) * 60),
        }
    }
}

/// The slice of [`Settings`] the autosave controller runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveSettings {
    pub enabled: bool,
    pub interval: Duration,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Settings::default().autosave()
    }
}
