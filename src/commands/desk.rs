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

//! `desk` subcommands.

use anyhow::{bail, Result};
use clap::Subcommand;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::Context;
use crate::bluetooth::{DeskScanner, DeviceDescriptor};
use crate::config::Desk;

#[derive(Subcommand, Debug)]
pub enum DeskCommand {
    /// Scan for a desk, register it and make it the default
    Add {
        /// Give up scanning after this many seconds
        #[arg(short, long, default_value = "30")]
        timeout: u64,

        /// Register the desk with this advertised name instead of the first found
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Set the default desk
    Default {
        /// Desk name
        name: String,
    },

    /// List registered desks
    List,
}

pub async fn run(ctx: &Context, cmd: DeskCommand) -> Result<()> {
    match cmd {
        DeskCommand::Add { timeout, name } => add(ctx, Duration::from_secs(timeout), name).await,
        DeskCommand::Default { name } => {
            ctx.store()?.set_default_desk(&name)?;
            println!("Default desk: {}", name);
            Ok(())
        }
        DeskCommand::List => list(ctx),
    }
}

async fn add(ctx: &Context, scan_timeout: Duration, wanted: Option<String>) -> Result<()> {
    let scanner = DeskScanner::new(&ctx.settings.bluetooth.name_prefix).await?;
    let cancel = CancellationToken::new();
    let mut found = scanner.scan(cancel.clone()).await?;

    println!("Scanning for desks ({}s)...", scan_timeout.as_secs());
    let selected = timeout(scan_timeout, async {
        while let Some(desk) = found.recv().await {
            println!("  found {} ({})", desk.name, desk.address);
            if wanted.as_deref().map_or(true, |name| name == desk.name) {
                return Some(desk);
            }
        }
        None
    })
    .await
    .ok()
    .flatten();
    cancel.cancel();

    let Some(DeviceDescriptor { name, address }) = selected else {
        bail!("no desk found");
    };

    let mut store = ctx.store()?;
    if !store.add_desk(Desk::new(&name, &address))? {
        info!("Desk {} already registered", name);
    }
    store.set_default_desk(&name)?;

    println!("Selected desk: {}", name);
    Ok(())
}

fn list(ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let config = store.config();

    if config.desks.is_empty() {
        println!("No desks configured. Run `idasenctl desk add` first.");
        return Ok(());
    }

    for desk in config.desks.values() {
        let marker = if config.default_desk() == Some(desk.name.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {:<20} {:<18} {} presets",
            marker,
            desk.name,
            desk.address,
            desk.presets.len()
        );
    }

    Ok(())
}
