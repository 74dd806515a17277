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

//! idasenctl command-line entry point.

use anyhow::{Context as _, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use idasenctl::commands::{self, Command, Context};
use idasenctl::config;
use idasenctl::settings::Settings;

/// Control IKEA IDÅSEN desks over Bluetooth LE
#[derive(Parser, Debug)]
#[command(name = "idasenctl")]
#[command(version)]
struct Args {
    /// Config file (default is $HOME/.idasenctl.yaml)
    #[arg(long, global = true, env = "IDASENCTL_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("idasenctl={}", level)));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    debug!("idasenctl v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load().context("failed to load settings")?;
    let config_path = args.config.unwrap_or_else(config::default_path);
    debug!("Using config {:?}", config_path);

    let ctx = Context::new(config_path, settings);
    commands::dispatch(&ctx, args.command).await
}
