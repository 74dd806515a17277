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

//! Command-line handlers.
//!
//! Each subcommand maps to one handler that loads the store, talks to the
//! desk if needed and prints a short result.

mod desk;
mod movement;
mod preset;
mod schedule;

pub use desk::DeskCommand;
pub use preset::PresetCommand;
pub use schedule::ScheduleCommand;

use anyhow::{Context as _, Result};
use clap::Subcommand;
use std::path::PathBuf;

use crate::bluetooth::BleTransport;
use crate::config::{ConfigFile, ConfigStore, Desk};
use crate::desk::DeskController;
use crate::settings::Settings;

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage desks
    #[command(subcommand)]
    Desk(DeskCommand),

    /// Manage desk presets
    #[command(subcommand)]
    Preset(PresetCommand),

    /// Move the desk to a preset
    Set {
        /// Preset name
        preset: String,

        /// Desk name (defaults to the default desk)
        #[arg(short, long)]
        desk: Option<String>,
    },

    /// Print the current desk height
    Height {
        /// Desk name (defaults to the default desk)
        #[arg(short, long)]
        desk: Option<String>,
    },

    /// Halt a programmed move
    Stop {
        /// Desk name (defaults to the default desk)
        #[arg(short, long)]
        desk: Option<String>,
    },

    /// Manage desk movement schedules
    #[command(subcommand)]
    Schedule(ScheduleCommand),

    /// Run the scheduler in the foreground until interrupted
    Daemon,
}

/// Shared state for command handlers.
pub struct Context {
    pub config_path: PathBuf,
    pub settings: Settings,
}

impl Context {
    pub fn new(config_path: PathBuf, settings: Settings) -> Self {
        Self {
            config_path,
            settings,
        }
    }

    /// Load the desk store.
    pub fn store(&self) -> Result<ConfigStore> {
        ConfigStore::load(&self.config_path)
            .with_context(|| format!("failed to load {}", self.config_path.display()))
    }

    /// Resolve `name` (or the default desk) to a registered desk.
    pub fn desk(&self, store: &ConfigStore, name: Option<&str>) -> Result<Desk> {
        let name = store.config().resolve_desk_name(name)?;
        Ok(store.config().desk(&name)?.clone())
    }

    /// Connect to `desk` and wrap it in a controller.
    pub async fn connect(&self, desk: &Desk) -> Result<DeskController<BleTransport>> {
        println!("Connecting to {} ({})...", desk.name, desk.address);
        let transport =
            BleTransport::connect(&desk.address, self.settings.bluetooth.connect_timeout())
                .await
                .with_context(|| format!("failed to connect to desk {}", desk.name))?;
        Ok(DeskController::new(transport))
    }
}

/// Run one subcommand.
pub async fn dispatch(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Desk(cmd) => desk::run(ctx, cmd).await,
        Command::Preset(cmd) => preset::run(ctx, cmd).await,
        Command::Set { preset, desk } => movement::set(ctx, &preset, desk.as_deref()).await,
        Command::Height { desk } => movement::height(ctx, desk.as_deref()).await,
        Command::Stop { desk } => movement::stop(ctx, desk.as_deref()).await,
        Command::Schedule(cmd) => schedule::run(ctx, cmd),
        Command::Daemon => {
            crate::daemon::run(ConfigFile::new(&ctx.config_path), &ctx.settings).await
        }
    }
}
