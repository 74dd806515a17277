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

//! Error types shared across the desk, config and daemon modules.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::bluetooth::Endpoint;

/// Failures talking to a desk over BLE.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid desk address '{0}'")]
    InvalidAddress(String),

    #[error("could not connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: bluer::Error,
    },

    #[error("connection to {address} timed out after {timeout:?}")]
    ConnectTimeout { address: String, timeout: Duration },

    /// Connected, but the desk does not expose the capability.
    #[error("endpoint {0} not found on device")]
    EndpointNotFound(Endpoint),

    #[error("short read from {endpoint}: got {len} bytes")]
    ShortRead { endpoint: Endpoint, len: usize },

    #[error("bluetooth error: {0}")]
    Bluetooth(#[from] bluer::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of desk control operations.
#[derive(Debug, Error)]
pub enum DeskError {
    #[error("height {height:.3} m is outside the range {min:.2}..={max:.2} m")]
    HeightOutOfRange { height: f32, min: f32, max: f32 },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failures of the desk/preset/schedule store.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("desk '{0}' does not exist")]
    DeskNotFound(String),

    #[error("preset '{preset}' not found for desk '{desk}'")]
    PresetNotFound { desk: String, preset: String },

    #[error("schedule '{0}' not found")]
    ScheduleNotFound(String),

    #[error("schedule '{0}' already exists")]
    DuplicateSchedule(String),

    #[error("no desk given and no default desk configured")]
    NoDefaultDesk,

    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("invalid day: {0}")]
    InvalidDay(String),

    #[error("could not access config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Failures delivering a desktop notification. Never fatal.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("could not run {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed: {stderr}")]
    Failed { program: &'static str, stderr: String },
}
