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

//! Process lifecycle for the daemon: tick source and shutdown.

use std::future::Future;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Owns the daemon's cancellation token.
///
/// OS termination signals are translated into a cancel of that token; the
/// tick loop is the only thing that observes it.
#[derive(Debug, Clone, Default)]
pub struct DaemonLifecycle {
    token: CancellationToken,
}

impl DaemonLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a handle to the shutdown token.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Begin shutdown. No further ticks start after this.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel the token on SIGINT or SIGTERM.
    pub fn listen_for_signals(&self) -> std::io::Result<JoinHandle<()>> {
        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;
        let token = self.token.clone();

        Ok(tokio::spawn(async move {
            tokio::select! {
                _ = interrupt.recv() => info!("Received SIGINT, shutting down..."),
                _ = terminate.recv() => info!("Received SIGTERM, shutting down..."),
                _ = token.cancelled() => return,
            }
            token.cancel();
        }))
    }

    /// Call `on_tick` every `period` until shutdown.
    ///
    /// The first tick fires one period after start. A tick is awaited to
    /// completion before the next wait. If it overran, one tick follows right
    /// away and later ticks are spaced a full period from that one, so missed
    /// ticks never pile up. Shutdown never interrupts a running tick.
    pub async fn run<F, Fut>(&self, period: Duration, mut on_tick: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = ticker.tick() => {
                    debug!("Tick");
                    on_tick().await;
                }
            }
        }

        info!("Tick loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test(start_paused = true)]
    async fn test_ticks_until_shutdown() {
        let lifecycle = DaemonLifecycle::new();
        let ticks = Arc::new(Mutex::new(0u32));

        let handle = lifecycle.clone();
        let counter = ticks.clone();
        lifecycle
            .run(Duration::from_secs(60), move || {
                let handle = handle.clone();
                let counter = counter.clone();
                async move {
                    let mut n = counter.lock().unwrap();
                    *n += 1;
                    if *n == 3 {
                        handle.shutdown();
                    }
                }
            })
            .await;

        assert_eq!(*ticks.lock().unwrap(), 3);
        assert!(lifecycle.is_shutting_down());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_before_run_never_ticks() {
        let lifecycle = DaemonLifecycle::new();
        lifecycle.shutdown();
        let ticks = Arc::new(Mutex::new(0u32));

        let counter = ticks.clone();
        lifecycle
            .run(Duration::from_secs(1), move || {
                let counter = counter.clone();
                async move {
                    *counter.lock().unwrap() += 1;
                }
            })
            .await;

        assert_eq!(*ticks.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let lifecycle = DaemonLifecycle::new();
        let start = Instant::now();
        let first = Arc::new(Mutex::new(None));

        let handle = lifecycle.clone();
        let seen = first.clone();
        lifecycle
            .run(Duration::from_secs(60), move || {
                let handle = handle.clone();
                let seen = seen.clone();
                async move {
                    *seen.lock().unwrap() = Some(Instant::now());
                    handle.shutdown();
                }
            })
            .await;

        let at = first.lock().unwrap().expect("ticked once");
        assert!(at - start >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_tick_is_not_followed_by_burst() {
        let lifecycle = DaemonLifecycle::new();
        let starts = Arc::new(Mutex::new(Vec::new()));

        let handle = lifecycle.clone();
        let log = starts.clone();
        lifecycle
            .run(Duration::from_secs(60), move || {
                let handle = handle.clone();
                let log = log.clone();
                async move {
                    let count = {
                        let mut log = log.lock().unwrap();
                        log.push(Instant::now());
                        log.len()
                    };
                    if count == 1 {
                        // Longer than two periods.
                        tokio::time::sleep(Duration::from_secs(150)).await;
                    }
                    if count == 3 {
                        handle.shutdown();
                    }
                }
            })
            .await;

        let starts = starts.lock().unwrap();
        assert_eq!(starts.len(), 3);
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(60));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_does_not_interrupt_running_tick() {
        let lifecycle = DaemonLifecycle::new();
        let finished = Arc::new(Mutex::new(false));

        let handle = lifecycle.clone();
        let done = finished.clone();
        lifecycle
            .run(Duration::from_secs(60), move || {
                let handle = handle.clone();
                let done = done.clone();
                async move {
                    handle.shutdown();
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    *done.lock().unwrap() = true;
                }
            })
            .await;

        assert!(*finished.lock().unwrap());
    }
}
