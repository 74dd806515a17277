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

//! `schedule` subcommands.

use anyhow::Result;
use clap::Subcommand;

use super::Context;
use crate::schedule::{format_days, parse_days, Schedule};

#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    /// Add a new schedule
    Add {
        /// Schedule name
        name: String,

        /// Time in HH:MM format
        #[arg(short, long)]
        time: String,

        /// Preset name
        #[arg(short, long)]
        preset: String,

        /// Days of the week (e.g. monday,tuesday or 1,2 or mon,tue)
        #[arg(long, value_delimiter = ',', required = true)]
        days: Vec<String>,

        /// Desk name (defaults to the default desk)
        #[arg(short, long)]
        desk: Option<String>,

        /// Store the schedule disabled
        #[arg(long)]
        disabled: bool,
    },

    /// List all schedules
    List,

    /// Remove a schedule
    Remove {
        /// Schedule name
        name: String,
    },

    /// Enable a schedule
    Enable {
        /// Schedule name
        name: String,
    },

    /// Disable a schedule
    Disable {
        /// Schedule name
        name: String,
    },
}

pub fn run(ctx: &Context, cmd: ScheduleCommand) -> Result<()> {
    let mut store = ctx.store()?;

    match cmd {
        ScheduleCommand::Add {
            name,
            time,
            preset,
            days,
            desk,
            disabled,
        } => {
            let desk_name = store.config().resolve_desk_name(desk.as_deref())?;
            let schedule = Schedule {
                name: name.clone(),
                time,
                desk_name,
                preset_name: preset,
                enabled: !disabled,
                days: parse_days(days.as_slice())?,
            };
            store.add_schedule(schedule)?;
            println!("Schedule '{}' added successfully", name);
        }
        ScheduleCommand::List => {
            let schedules = &store.config().schedules;
            if schedules.is_empty() {
                println!("No schedules configured");
            }
            for s in schedules {
                println!(
                    "{:<16} {}  {:<16} {:<12} {:<28} {}",
                    s.name,
                    s.time,
                    s.desk_name,
                    s.preset_name,
                    format_days(&s.days),
                    if s.enabled { "enabled" } else { "disabled" }
                );
            }
        }
        ScheduleCommand::Remove { name } => {
            store.remove_schedule(&name)?;
            println!("Schedule '{}' removed successfully", name);
        }
        ScheduleCommand::Enable { name } => {
            store.set_schedule_enabled(&name, true)?;
            println!("Schedule '{}' enabled", name);
        }
        ScheduleCommand::Disable { name } => {
            store.set_schedule_enabled(&name, false)?;
            println!("Schedule '{}' disabled", name);
        }
    }

    Ok(())
}
