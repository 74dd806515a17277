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

//! `preset` subcommands.

use anyhow::Result;
use clap::Subcommand;

use super::Context;
use crate::desk::validate_target;

#[derive(Subcommand, Debug)]
pub enum PresetCommand {
    /// Add or replace a preset
    Add {
        /// Preset name
        name: String,

        /// Height in meters
        #[arg(long, required_unless_present = "current", conflicts_with = "current")]
        height: Option<f32>,

        /// Use the desk's current height
        #[arg(short, long)]
        current: bool,

        /// Desk name (defaults to the default desk)
        #[arg(short, long)]
        desk: Option<String>,
    },

    /// Delete a preset
    Delete {
        /// Preset name
        name: String,

        /// Desk name (defaults to the default desk)
        #[arg(short, long)]
        desk: Option<String>,
    },

    /// List presets of a desk
    List {
        /// Desk name (defaults to the default desk)
        #[arg(short, long)]
        desk: Option<String>,
    },
}

pub async fn run(ctx: &Context, cmd: PresetCommand) -> Result<()> {
    match cmd {
        PresetCommand::Add {
            name,
            height,
            current,
            desk,
        } => {
            let mut store = ctx.store()?;
            let desk = ctx.desk(&store, desk.as_deref())?;

            let height = match height {
                Some(height) if !current => validate_target(height)?,
                _ => {
                    let controller = ctx.connect(&desk).await?;
                    let height = controller.current_height().await;
                    controller.into_inner().disconnect().await?;
                    height?
                }
            };

            store.set_preset(&desk.name, &name, height)?;
            println!("Preset '{}' on {} set to {:.3} m", name, desk.name, height);
        }
        PresetCommand::Delete { name, desk } => {
            let mut store = ctx.store()?;
            let desk = ctx.desk(&store, desk.as_deref())?;
            store.delete_preset(&desk.name, &name)?;
            println!("Preset '{}' deleted from {}", name, desk.name);
        }
        PresetCommand::List { desk } => {
            let store = ctx.store()?;
            let desk = ctx.desk(&store, desk.as_deref())?;

            if desk.presets.is_empty() {
                println!("No presets on {}", desk.name);
            }
            for preset in desk.presets.values() {
                println!("{:<16} {:.3} m", preset.name, preset.height);
            }
        }
    }

    Ok(())
}
