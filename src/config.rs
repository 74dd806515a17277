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

//! Desk, preset and schedule store.
//!
//! Persisted as YAML, by default at `$HOME/.idasenctl.yaml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::schedule::{parse_time, Schedule};

/// File name of the store inside the home directory.
pub const CONFIG_FILE_NAME: &str = ".idasenctl.yaml";

/// Default store location.
pub fn default_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE_NAME)
}

/// A named target height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    /// Height in meters.
    pub height: f32,
}

/// A registered desk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Desk {
    pub name: String,
    /// BLE address.
    pub address: String,
    /// Presets keyed by lowercased name.
    #[serde(default)]
    pub presets: BTreeMap<String, Preset>,
}

impl Desk {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            presets: BTreeMap::new(),
        }
    }

    /// Look up a preset, ignoring case.
    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.get(&name.to_lowercase())
    }
}

/// Everything in the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub desks: BTreeMap<String, Desk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_desk: Option<String>,
    /// Evaluated in this order.
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}

impl Config {
    /// Get a desk by name.
    pub fn desk(&self, name: &str) -> Result<&Desk, ConfigError> {
        self.desks
            .get(name)
            .ok_or_else(|| ConfigError::DeskNotFound(name.to_string()))
    }

    /// Get the default desk name, if set.
    pub fn default_desk(&self) -> Option<&str> {
        self.default_desk.as_deref().filter(|name| !name.is_empty())
    }

    /// Use `name` if given, else the default desk.
    pub fn resolve_desk_name(&self, name: Option<&str>) -> Result<String, ConfigError> {
        name.filter(|n| !n.is_empty())
            .or_else(|| self.default_desk())
            .map(str::to_string)
            .ok_or(ConfigError::NoDefaultDesk)
    }

    /// Look up a desk and one of its presets.
    pub fn preset(&self, desk: &str, preset: &str) -> Result<(&Desk, &Preset), ConfigError> {
        let desk = self.desk(desk)?;
        let found = desk.preset(preset).ok_or_else(|| ConfigError::PresetNotFound {
            desk: desk.name.clone(),
            preset: preset.to_string(),
        })?;
        Ok((desk, found))
    }

    /// Get a schedule by name.
    pub fn schedule(&self, name: &str) -> Result<&Schedule, ConfigError> {
        self.schedules
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ConfigError::ScheduleNotFound(name.to_string()))
    }
}

/// Read access to the store for long-running consumers.
pub trait ConfigSource: Send + Sync {
    /// A current copy of the store.
    fn snapshot(&self) -> Result<Config, ConfigError>;
}

impl ConfigSource for Config {
    fn snapshot(&self) -> Result<Config, ConfigError> {
        Ok(self.clone())
    }
}

/// A store file that is re-read on every snapshot, so edits made by other
/// processes are picked up.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for ConfigFile {
    fn snapshot(&self) -> Result<Config, ConfigError> {
        read_config(&self.path)
    }
}

/// Loaded store with write-through mutations.
pub struct ConfigStore {
    path: PathBuf,
    config: Config,
}

impl ConfigStore {
    /// Load the store at `path`. A missing or empty file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let config = read_config(&path)?;
        debug!(
            "Loaded {} desks and {} schedules from {:?}",
            config.desks.len(),
            config.schedules.len(),
            path
        );
        Ok(Self { path, config })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Save the store to its file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(&self.config).map_err(|source| ConfigError::Yaml {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, content).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!("Saved config to {:?}", self.path);
        Ok(())
    }

    /// Register a desk. A desk with the same name is left untouched.
    pub fn add_desk(&mut self, desk: Desk) -> Result<bool, ConfigError> {
        if self.config.desks.contains_key(&desk.name) {
            return Ok(false);
        }
        info!("Adding desk {} ({})", desk.name, desk.address);
        self.config.desks.insert(desk.name.clone(), desk);
        self.save()?;
        Ok(true)
    }

    pub fn set_default_desk(&mut self, name: &str) -> Result<(), ConfigError> {
        self.config.desk(name)?;
        self.config.default_desk = Some(name.to_string());
        self.save()
    }

    /// Add or replace a preset on a desk.
    pub fn set_preset(&mut self, desk: &str, name: &str, height: f32) -> Result<(), ConfigError> {
        let desk = self
            .config
            .desks
            .get_mut(desk)
            .ok_or_else(|| ConfigError::DeskNotFound(desk.to_string()))?;
        desk.presets.insert(
            name.to_lowercase(),
            Preset {
                name: name.to_string(),
                height,
            },
        );
        self.save()
    }

    /// Remove a preset from a desk.
    pub fn delete_preset(&mut self, desk: &str, name: &str) -> Result<(), ConfigError> {
        let desk = self
            .config
            .desks
            .get_mut(desk)
            .ok_or_else(|| ConfigError::DeskNotFound(desk.to_string()))?;
        if desk.presets.remove(&name.to_lowercase()).is_none() {
            return Err(ConfigError::PresetNotFound {
                desk: desk.name.clone(),
                preset: name.to_string(),
            });
        }
        self.save()
    }

    /// Append a schedule. Names are unique.
    pub fn add_schedule(&mut self, schedule: Schedule) -> Result<(), ConfigError> {
        parse_time(&schedule.time)?;
        if self.config.schedules.iter().any(|s| s.name == schedule.name) {
            return Err(ConfigError::DuplicateSchedule(schedule.name));
        }
        self.config.schedules.push(schedule);
        self.save()
    }

    pub fn remove_schedule(&mut self, name: &str) -> Result<(), ConfigError> {
        let index = self.schedule_index(name)?;
        self.config.schedules.remove(index);
        self.save()
    }

    /// Replace the schedule called `name`, keeping its position.
    pub fn update_schedule(&mut self, name: &str, schedule: Schedule) -> Result<(), ConfigError> {
        parse_time(&schedule.time)?;
        let index = self.schedule_index(name)?;
        if schedule.name != name && self.config.schedules.iter().any(|s| s.name == schedule.name) {
            return Err(ConfigError::DuplicateSchedule(schedule.name));
        }
        self.config.schedules[index] = schedule;
        self.save()
    }

    pub fn set_schedule_enabled(&mut self, name: &str, enabled: bool) -> Result<(), ConfigError> {
        let mut schedule = self.config.schedule(name)?.clone();
        schedule.enabled = enabled;
        self.update_schedule(name, schedule)
    }

    fn schedule_index(&self, name: &str) -> Result<usize, ConfigError> {
        self.config
            .schedules
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| ConfigError::ScheduleNotFound(name.to_string()))
    }
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}
