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

//! Schedule evaluation.
//!
//! On every tick each enabled schedule for today is placed relative to now:
//! up to [`NOTIFY_LEAD`] before its time it triggers a heads-up notification,
//! and within [`EXECUTE_WINDOW`] after its time it moves the desk. Each
//! (schedule, occurrence, phase) fires at most once, so moving a schedule to
//! a later time the same day schedules a fresh occurrence.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, TimeZone};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::bluetooth::BleTransport;
use crate::config::{Config, ConfigSource, Desk};
use crate::desk::{validate_target, DeskController, MoveOutcome};
use crate::error::{ConfigError, DeskError};
use crate::notification::Notifier;
use crate::schedule::Schedule;

/// How long before a schedule's time the notification goes out.
pub const NOTIFY_LEAD: Duration = Duration::from_secs(10);

/// How long after a schedule's time it may still execute.
pub const EXECUTE_WINDOW: Duration = Duration::from_secs(30);

/// Upper bound on one scheduled move.
pub const DEFAULT_MOVE_TIMEOUT: Duration = Duration::from_secs(120);

/// How long a timed-out move gets to observe its cancellation before it is
/// dropped.
pub const CANCEL_GRACE: Duration = Duration::from_secs(5);

/// What a schedule should do on this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Notify,
    Execute,
}

/// Place `schedule` relative to `now`.
///
/// Notify when `0 < time - now <= NOTIFY_LEAD`, execute when
/// `-EXECUTE_WINDOW < time - now <= 0`. Returns the phase together with
/// today's occurrence it belongs to.
pub fn plan<Tz: TimeZone>(
    schedule: &Schedule,
    now: &DateTime<Tz>,
) -> Result<Option<(Phase, DateTime<Tz>)>, ConfigError> {
    if !schedule.enabled || !schedule.runs_on(now) {
        return Ok(None);
    }

    let Some(at) = schedule.occurrence_on(now)? else {
        warn!("Schedule {} time {} does not exist today", schedule.name, schedule.time);
        return Ok(None);
    };

    let diff_ms = (at.clone() - now.clone()).num_milliseconds();
    let lead_ms = NOTIFY_LEAD.as_millis() as i64;
    let window_ms = EXECUTE_WINDOW.as_millis() as i64;

    if diff_ms > 0 && diff_ms <= lead_ms {
        Ok(Some((Phase::Notify, at)))
    } else if diff_ms > -window_ms && diff_ms <= 0 {
        Ok(Some((Phase::Execute, at)))
    } else {
        Ok(None)
    }
}

/// Performs the physical move for a scheduled execution.
pub trait DeskMover: Send + Sync {
    fn move_desk(
        &self,
        desk: &Desk,
        height: f32,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<MoveOutcome, DeskError>> + Send;
}

/// Connects over BLE for each move and disconnects afterwards.
pub struct BleDeskMover {
    connect_timeout: Duration,
}

impl BleDeskMover {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl DeskMover for BleDeskMover {
    async fn move_desk(
        &self,
        desk: &Desk,
        height: f32,
        cancel: CancellationToken,
    ) -> Result<MoveOutcome, DeskError> {
        validate_target(height)?;

        let transport = BleTransport::connect(&desk.address, self.connect_timeout).await?;
        let controller = DeskController::new(transport);
        let result = controller.move_to(height, None, &cancel).await;

        if let Err(e) = controller.transport().disconnect().await {
            warn!("Failed to disconnect from {}: {}", desk.name, e);
        }

        result
    }
}

/// Names of schedules acted on during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub notified: Vec<String>,
    pub executed: Vec<String>,
    pub failed: Vec<String>,
}

/// Evaluates schedules against wall-clock time.
pub struct Scheduler<C, M> {
    config: C,
    notifier: Box<dyn Notifier>,
    mover: M,
    move_timeout: Duration,
    handled: HashSet<(String, DateTime<Local>, Phase)>,
}

impl<C: ConfigSource, M: DeskMover> Scheduler<C, M> {
    pub fn new(config: C, notifier: Box<dyn Notifier>, mover: M, move_timeout: Duration) -> Self {
        Self {
            config,
            notifier,
            mover,
            move_timeout,
            handled: HashSet::new(),
        }
    }

    /// Evaluate every schedule once, in stored order.
    ///
    /// Failures are logged and never stop evaluation of later schedules.
    pub async fn evaluate(&mut self, now: DateTime<Local>) -> TickReport {
        let mut report = TickReport::default();

        let config = match self.config.snapshot() {
            Ok(config) => config,
            Err(e) => {
                error!("Could not read schedules: {}", e);
                return report;
            }
        };

        let today = now.date_naive();
        self.handled.retain(|(_, at, _)| at.date_naive() >= today);
        debug!("Evaluating {} schedules at {}", config.schedules.len(), now);

        for schedule in &config.schedules {
            let (phase, at) = match plan(schedule, &now) {
                Ok(Some(planned)) => planned,
                Ok(None) => continue,
                Err(e) => {
                    error!("Error parsing schedule time for {}: {}", schedule.name, e);
                    continue;
                }
            };

            if !self.handled.insert((schedule.name.clone(), at, phase)) {
                debug!("Schedule {} already handled ({:?}) for {}", schedule.name, phase, at);
                continue;
            }

            match phase {
                Phase::Notify => {
                    if self.send_notification(schedule).await {
                        report.notified.push(schedule.name.clone());
                    }
                }
                Phase::Execute => match self.execute(&config, schedule).await {
                    Ok(()) => report.executed.push(schedule.name.clone()),
                    Err(e) => {
                        error!("Schedule {} failed: {:#}", schedule.name, e);
                        report.failed.push(schedule.name.clone());
                    }
                },
            }
        }

        report
    }

    async fn send_notification(&self, schedule: &Schedule) -> bool {
        let title = "Desk Movement Scheduled";
        let message = format!(
            "Your desk will move to preset '{}' in {} seconds",
            schedule.preset_name,
            NOTIFY_LEAD.as_secs()
        );

        match self.notifier.notify(title, &message).await {
            Ok(()) => {
                info!("Sent notification for schedule {}", schedule.name);
                true
            }
            Err(e) => {
                warn!("Error sending notification for schedule {}: {}", schedule.name, e);
                false
            }
        }
    }

    async fn execute(&self, config: &Config, schedule: &Schedule) -> Result<()> {
        info!("Executing schedule: {}", schedule.name);

        // Resolved on every run so preset edits apply immediately.
        let (desk, preset) = config.preset(&schedule.desk_name, &schedule.preset_name)?;

        let cancel = CancellationToken::new();
        let movement = self.mover.move_desk(desk, preset.height, cancel.clone());
        tokio::pin!(movement);

        let outcome = tokio::select! {
            result = &mut movement => result?,
            _ = sleep(self.move_timeout) => {
                warn!("Schedule {} exceeded {:?}, stopping", schedule.name, self.move_timeout);
                cancel.cancel();
                match timeout(CANCEL_GRACE, movement).await {
                    Ok(result) => {
                        result?;
                    }
                    Err(_) => warn!(
                        "Move for schedule {} ignored cancellation, dropping it",
                        schedule.name
                    ),
                }
                return Err(anyhow!(
                    "move of desk {} to preset {} timed out after {:?}",
                    desk.name,
                    preset.name,
                    self.move_timeout
                ));
            }
        };

        match outcome {
            MoveOutcome::Reached(height) => {
                info!(
                    "Successfully moved desk {} to preset {} (height: {:.3})",
                    desk.name, preset.name, height
                );
                Ok(())
            }
            MoveOutcome::Cancelled => Err(anyhow!(
                "move of desk {} to preset {} was cancelled",
                desk.name,
                preset.name
            )),
        }
    }
}
