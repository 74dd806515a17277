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

//! `set`, `height` and `stop`.

use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::Context;
use crate::desk::MoveOutcome;

/// Move the desk to a preset, printing progress until it arrives or the user
/// presses Ctrl-C.
pub async fn set(ctx: &Context, preset: &str, desk: Option<&str>) -> Result<()> {
    let store = ctx.store()?;
    let desk = ctx.desk(&store, desk)?;
    let (_, preset) = store.config().preset(&desk.name, preset)?;
    let target = preset.height;

    let controller = Arc::new(ctx.connect(&desk).await?);
    let start = controller.current_height().await?;
    println!("Moving {} from {:.3} m to {:.3} m", desk.name, start, target);

    let cancel = CancellationToken::new();
    let (progress_tx, mut progress_rx) = mpsc::channel::<f32>(8);

    let mover = controller.clone();
    let token = cancel.clone();
    let mut movement =
        tokio::spawn(async move { mover.move_to(target, Some(&progress_tx), &token).await });

    let result = loop {
        tokio::select! {
            Some(height) = progress_rx.recv() => {
                print!("\r  {:.3} m ", height);
                std::io::stdout().flush()?;
            }
            _ = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => {
                println!();
                println!("Stopping...");
                cancel.cancel();
            }
            joined = &mut movement => break joined?,
        }
    };
    println!();

    if let Err(e) = controller.transport().disconnect().await {
        warn!("Failed to disconnect from {}: {}", desk.name, e);
    }

    match result? {
        MoveOutcome::Reached(height) => {
            println!("Desk {} at {:.3} m ({})", desk.name, height, preset.name)
        }
        MoveOutcome::Cancelled => println!("Move cancelled"),
    }
    Ok(())
}

/// Print the current height.
pub async fn height(ctx: &Context, desk: Option<&str>) -> Result<()> {
    let store = ctx.store()?;
    let desk = ctx.desk(&store, desk)?;

    let controller = ctx.connect(&desk).await?;
    let height = controller.current_height().await;
    controller.transport().disconnect().await?;

    println!("{:.3} m", height?);
    Ok(())
}

/// Halt a programmed move.
pub async fn stop(ctx: &Context, desk: Option<&str>) -> Result<()> {
    let store = ctx.store()?;
    let desk = ctx.desk(&store, desk)?;

    let controller = ctx.connect(&desk).await?;
    let result = controller.halt().await;
    controller.transport().disconnect().await?;

    result?;
    println!("Stop sent to {}", desk.name);
    Ok(())
}
