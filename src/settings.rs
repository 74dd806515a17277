// Copyright 2026 The idasenctl Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application settings.
//!
//! Handles loading and saving tunables that are not desk records.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::bluetooth::ble_constants::DESK_NAME_PREFIX;

/// Application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bluetooth settings.
    pub bluetooth: BluetoothSettings,

    /// Scheduler daemon settings.
    pub daemon: DaemonSettings,

    /// Desktop notification settings.
    pub notifications: NotificationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BluetoothSettings {
    /// Advertised name prefix that identifies a desk.
    pub name_prefix: String,

    /// Upper bound on connecting to a desk, in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for BluetoothSettings {
    fn default() -> Self {
        Self {
            name_prefix: DESK_NAME_PREFIX.to_string(),
            connect_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonSettings {
    /// Seconds between schedule evaluations.
    pub tick_interval_secs: u64,

    /// Upper bound on one scheduled move, in seconds.
    pub move_timeout_secs: u64,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            tick_interval_secs: 60,
            move_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Send a desktop notification before scheduled moves.
    pub enabled: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl BluetoothSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl DaemonSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs.max(1))
    }

    pub fn move_timeout(&self) -> Duration {
        Duration::from_secs(self.move_timeout_secs)
    }
}

impl Settings {
    /// Default settings file location.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("idasenctl")
            .join("settings.toml")
    }

    /// Load settings from the default location, creating it if missing.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load settings from `path`, creating it with defaults if missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let settings = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            let settings = Self::default();
            settings.save_to(path)?;
            settings
        };

        Ok(settings)
    }

    /// Save settings to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_creates_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("idasenctl").join("settings.toml");

        let settings = Settings::load_from(&path).unwrap();

        assert!(path.exists());
        assert_eq!(settings.bluetooth.name_prefix, "Desk");
        assert_eq!(settings.bluetooth.connect_timeout(), Duration::from_secs(30));
        assert_eq!(settings.daemon.tick_interval(), Duration::from_secs(60));
        assert_eq!(settings.daemon.move_timeout(), Duration::from_secs(120));
        assert!(settings.notifications.enabled);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[daemon]\ntick_interval_secs = 20\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();

        assert_eq!(settings.daemon.tick_interval_secs, 20);
        assert_eq!(settings.daemon.move_timeout_secs, 120);
        assert_eq!(settings.bluetooth.name_prefix, "Desk");
    }
}
