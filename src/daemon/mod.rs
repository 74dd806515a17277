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

//! Scheduler daemon.

mod lifecycle;
mod scheduler;

pub use lifecycle::DaemonLifecycle;
pub use scheduler::{
    plan, BleDeskMover, DeskMover, Phase, Scheduler, TickReport, DEFAULT_MOVE_TIMEOUT,
    EXECUTE_WINDOW, NOTIFY_LEAD,
};

use anyhow::Result;
use chrono::Local;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::ConfigFile;
use crate::notification::{DesktopNotifier, LogNotifier, Notifier};
use crate::settings::Settings;

/// Run the scheduler until SIGINT or SIGTERM.
pub async fn run(config: ConfigFile, settings: &Settings) -> Result<()> {
    let lifecycle = DaemonLifecycle::new();
    let signals = lifecycle.listen_for_signals()?;

    let notifier: Box<dyn Notifier> = if settings.notifications.enabled {
        Box::new(DesktopNotifier::new())
    } else {
        Box::new(LogNotifier)
    };
    info!("Notifier: {}", notifier.backend_name());

    let mover = BleDeskMover::new(settings.bluetooth.connect_timeout());
    let scheduler = Arc::new(Mutex::new(Scheduler::new(
        config.clone(),
        notifier,
        mover,
        settings.daemon.move_timeout(),
    )));

    let interval = settings.daemon.tick_interval();
    info!(
        "Scheduler daemon started, reading {:?} every {:?}",
        config.path(),
        interval
    );

    lifecycle
        .run(interval, || {
            let scheduler = scheduler.clone();
            async move {
                let report = scheduler.lock().await.evaluate(Local::now()).await;
                if report != TickReport::default() {
                    info!(
                        "Tick: {} notified, {} executed, {} failed",
                        report.notified.len(),
                        report.executed.len(),
                        report.failed.len()
                    );
                }
            }
        })
        .await;

    signals.abort();
    info!("Scheduler daemon stopped");
    Ok(())
}
