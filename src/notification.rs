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

//! Desktop notifications via notify-send.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::process::Command as StdCommand;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::NotificationError;

const NOTIFY_SEND: &str = "notify-send";

/// Trait for notification backends.
pub trait Notifier: Send + Sync {
    /// Get the backend name.
    fn backend_name(&self) -> &'static str;

    /// Show an alert. Fire-and-forget.
    fn notify<'a>(
        &'a self,
        title: &'a str,
        message: &'a str,
    ) -> BoxFuture<'a, Result<(), NotificationError>>;
}

/// Freedesktop notifications through `notify-send`.
pub struct DesktopNotifier {
    program: &'static str,
    app_name: String,
}

impl DesktopNotifier {
    /// Create a new notifier.
    pub fn new() -> Self {
        let available = StdCommand::new("which")
            .arg(NOTIFY_SEND)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);

        if !available {
            warn!("{} not found in PATH, notifications will fail", NOTIFY_SEND);
        }

        Self::with_program(NOTIFY_SEND)
    }

    /// Use `program` in place of `notify-send`. It gets the same arguments.
    pub fn with_program(program: &'static str) -> Self {
        Self {
            program,
            app_name: "idasenctl".to_string(),
        }
    }

    async fn send(&self, title: &str, message: &str) -> Result<(), NotificationError> {
        debug!("Running: {} {:?} {:?}", self.program, title, message);

        let output = Command::new(self.program)
            .args(["--app-name", &self.app_name, title, message])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| NotificationError::Spawn {
                program: self.program,
                source,
            })?;

        if !output.status.success() {
            return Err(NotificationError::Failed {
                program: self.program,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for DesktopNotifier {
    fn backend_name(&self) -> &'static str {
        "notify-send"
    }

    fn notify<'a>(
        &'a self,
        title: &'a str,
        message: &'a str,
    ) -> BoxFuture<'a, Result<(), NotificationError>> {
        self.send(title, message).boxed()
    }
}

/// Notifier that only logs.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn backend_name(&self) -> &'static str {
        "log (no-op)"
    }

    fn notify<'a>(
        &'a self,
        title: &'a str,
        message: &'a str,
    ) -> BoxFuture<'a, Result<(), NotificationError>> {
        info!("[NOTIFY] {}: {}", title, message);
        futures::future::ready(Ok(())).boxed()
    }
}
