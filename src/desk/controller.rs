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

//! Closed-loop desk movement.
//!
//! The desk only understands "keep moving up/down" and "stop", so moving to a
//! height means polling the height and re-issuing direction commands until
//! the desk is within [`STOP_TOLERANCE`] of the target.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::height::{decode_height, validate_target};
use crate::bluetooth::{Endpoint, MoveCommand, Transport};
use crate::error::DeskError;

/// Distance from the target at which the move is considered done, in meters.
pub const STOP_TOLERANCE: f32 = 0.005;

/// How a move ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// Stopped within tolerance; carries the last height read.
    Reached(f32),
    /// Cancelled before reaching the target.
    Cancelled,
}

/// Drives one desk over a transport.
pub struct DeskController<T> {
    transport: T,
}

impl<T: Transport> DeskController<T> {
    /// Create a controller owning `transport`.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Get transport reference.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Give back the transport, e.g. to disconnect it.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Read the current height in meters.
    pub async fn current_height(&self) -> Result<f32, DeskError> {
        let data = self.transport.read_endpoint(Endpoint::Height).await?;
        Ok(decode_height(&data)?)
    }

    /// Move the desk to `target` meters.
    ///
    /// Each height read is offered to `progress` without waiting; updates are
    /// dropped while the channel is full. `cancel` is checked once per
    /// iteration and ends the move with [`MoveOutcome::Cancelled`].
    pub async fn move_to(
        &self,
        target: f32,
        progress: Option<&mpsc::Sender<f32>>,
        cancel: &CancellationToken,
    ) -> Result<MoveOutcome, DeskError> {
        let target = validate_target(target)?;
        let mut progress = progress;
        info!("Moving desk to {:.3} m", target);

        loop {
            if cancel.is_cancelled() {
                info!("Move to {:.3} m cancelled", target);
                return Ok(MoveOutcome::Cancelled);
            }

            let current = self.current_height().await?;

            if let Some(tx) = progress {
                match tx.try_send(current) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => debug!("Progress receiver busy, dropping update"),
                    Err(TrySendError::Closed(_)) => progress = None,
                }
            }

            if (target - current).abs() < STOP_TOLERANCE {
                self.send(MoveCommand::Stop).await?;
                info!("Desk reached {:.3} m", current);
                return Ok(MoveOutcome::Reached(current));
            }

            if target <= current {
                self.send(MoveCommand::Down).await?;
            } else {
                self.send(MoveCommand::Up).await?;
            }
        }
    }

    /// Halt a programmed reference-input move.
    pub async fn halt(&self) -> Result<(), DeskError> {
        self.send(MoveCommand::ReferenceInputStop).await
    }

    async fn send(&self, command: MoveCommand) -> Result<(), DeskError> {
        debug!("Sending {:?}", command);
        self.transport
            .write_endpoint(command.endpoint(), &command.opcode())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bluetooth::ble_constants::HEIGHT_READ_LEN;
    use crate::desk::height::meters_to_raw;
    use crate::error::TransportError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Read(f32),
        Write(Endpoint, [u8; 2]),
    }

    /// Plays back a fixed sequence of heights and records every call.
    struct ScriptedTransport {
        heights: Mutex<VecDeque<f32>>,
        calls: Mutex<Vec<Call>>,
        fail_reads_after: Option<usize>,
        fail_writes: bool,
    }

    impl ScriptedTransport {
        fn new(heights: &[f32]) -> Self {
            Self {
                heights: Mutex::new(heights.iter().copied().collect()),
                calls: Mutex::new(Vec::new()),
                fail_reads_after: None,
                fail_writes: false,
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn writes(&self) -> Vec<MoveCommand> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    Call::Write(_, opcode) => [
                        MoveCommand::Up,
                        MoveCommand::Down,
                        MoveCommand::Stop,
                        MoveCommand::ReferenceInputStop,
                    ]
                    .into_iter()
                    .find(|c| c.opcode() == opcode),
                    Call::Read(_) => None,
                })
                .collect()
        }
    }

    fn io_error(msg: &str) -> TransportError {
        TransportError::Io(std::io::Error::new(std::io::ErrorKind::Other, msg.to_string()))
    }

    impl Transport for ScriptedTransport {
        async fn read_endpoint(&self, endpoint: Endpoint) -> Result<Vec<u8>, TransportError> {
            assert_eq!(endpoint, Endpoint::Height);
            let reads = self
                .calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| matches!(c, Call::Read(_)))
                .count();
            if self.fail_reads_after == Some(reads) {
                return Err(io_error("read failed"));
            }
            let height = self
                .heights
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| io_error("height script exhausted"))?;
            self.calls.lock().unwrap().push(Call::Read(height));

            let mut frame = vec![0u8; HEIGHT_READ_LEN];
            frame[..2].copy_from_slice(&meters_to_raw(height).to_le_bytes());
            Ok(frame)
        }

        async fn write_endpoint(&self, endpoint: Endpoint, data: &[u8]) -> Result<(), TransportError> {
            let opcode = [data[0], data[1]];
            self.calls.lock().unwrap().push(Call::Write(endpoint, opcode));
            if self.fail_writes {
                return Err(io_error("write failed"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_out_of_range_target_does_no_io() {
        let controller = DeskController::new(ScriptedTransport::new(&[0.8]));
        let cancel = CancellationToken::new();

        for target in [0.5, 0.619, 1.271, 2.0] {
            let result = controller.move_to(target, None, &cancel).await;
            assert!(matches!(result, Err(DeskError::HeightOutOfRange { .. })));
        }
        assert!(controller.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_converging_up_stops_exactly_once() {
        let heights = [0.70, 0.72, 0.74, 0.76, 0.78, 0.798];
        let controller = DeskController::new(ScriptedTransport::new(&heights));

        let outcome = controller
            .move_to(0.80, None, &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(outcome, MoveOutcome::Reached(h) if (h - 0.798).abs() < 1e-3));
        let writes = controller.transport().writes();
        assert_eq!(
            writes,
            vec![
                MoveCommand::Up,
                MoveCommand::Up,
                MoveCommand::Up,
                MoveCommand::Up,
                MoveCommand::Up,
                MoveCommand::Stop,
            ]
        );
        assert_eq!(
            controller.transport().calls().last(),
            Some(&Call::Write(Endpoint::ReferenceInput, [0xFF, 0x00]))
        );
    }

    #[tokio::test]
    async fn test_converging_down() {
        let heights = [1.20, 1.10, 1.00, 1.003];
        let controller = DeskController::new(ScriptedTransport::new(&heights));

        controller
            .move_to(1.00, None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            controller.transport().writes(),
            vec![MoveCommand::Down, MoveCommand::Down, MoveCommand::Stop]
        );
    }

    #[tokio::test]
    async fn test_direction_follows_last_reading() {
        // Overshoots back and forth before settling.
        let heights = [0.70, 0.95, 1.05, 0.99, 1.02, 0.97, 1.001];
        let target = 1.00;
        let controller = DeskController::new(ScriptedTransport::new(&heights));

        controller
            .move_to(target, None, &CancellationToken::new())
            .await
            .unwrap();

        let calls = controller.transport().calls();
        let mut last_read = None;
        let mut stops = 0;
        for call in &calls {
            match call {
                Call::Read(h) => last_read = Some(*h),
                Call::Write(_, opcode) => {
                    let current = last_read.expect("write before any read");
                    if *opcode == MoveCommand::Up.opcode() {
                        assert!(target > current, "Up issued at {}", current);
                    } else if *opcode == MoveCommand::Down.opcode() {
                        assert!(target <= current, "Down issued at {}", current);
                    } else {
                        stops += 1;
                    }
                }
            }
        }
        assert_eq!(stops, 1);
        assert!(matches!(calls.last(), Some(Call::Write(Endpoint::ReferenceInput, _))));
    }

    #[tokio::test]
    async fn test_within_tolerance_stops_immediately() {
        let controller = DeskController::new(ScriptedTransport::new(&[1.004]));

        let outcome = controller
            .move_to(1.00, None, &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(outcome, MoveOutcome::Reached(_)));
        assert_eq!(controller.transport().writes(), vec![MoveCommand::Stop]);
    }

    #[tokio::test]
    async fn test_cancelled_move_returns_ok() {
        let controller = DeskController::new(ScriptedTransport::new(&[0.7, 0.8]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = controller.move_to(1.0, None, &cancel).await.unwrap();

        assert_eq!(outcome, MoveOutcome::Cancelled);
        assert!(controller.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_read_failure_aborts() {
        let mut transport = ScriptedTransport::new(&[0.7, 0.8, 0.9]);
        transport.fail_reads_after = Some(2);
        let controller = DeskController::new(transport);

        let result = controller.move_to(1.0, None, &CancellationToken::new()).await;

        assert!(matches!(result, Err(DeskError::Transport(TransportError::Io(_)))));
        assert_eq!(controller.transport().writes(), vec![MoveCommand::Up, MoveCommand::Up]);
    }

    #[tokio::test]
    async fn test_write_failure_is_not_retried() {
        let mut transport = ScriptedTransport::new(&[0.7, 0.8, 0.9]);
        transport.fail_writes = true;
        let controller = DeskController::new(transport);

        let result = controller.move_to(1.0, None, &CancellationToken::new()).await;

        assert!(result.is_err());
        assert_eq!(controller.transport().writes(), vec![MoveCommand::Up]);
    }

    #[tokio::test]
    async fn test_progress_published_and_full_sink_does_not_block() {
        let heights = [0.70, 0.75, 0.80, 0.85, 0.90];
        let controller = DeskController::new(ScriptedTransport::new(&heights));
        let (tx, mut rx) = mpsc::channel(2);

        let outcome = controller
            .move_to(0.90, Some(&tx), &CancellationToken::new())
            .await
            .unwrap();
        assert!(matches!(outcome, MoveOutcome::Reached(_)));
        drop(tx);

        let mut published = Vec::new();
        while let Some(h) = rx.recv().await {
            published.push(h);
        }
        assert_eq!(published.len(), 2);
        assert!((published[0] - 0.70).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_closed_sink_is_tolerated() {
        let controller = DeskController::new(ScriptedTransport::new(&[0.70, 0.80]));
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let outcome = controller
            .move_to(0.80, Some(&tx), &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(outcome, MoveOutcome::Reached(_)));
    }

    #[tokio::test]
    async fn test_current_height_is_a_plain_read() {
        let controller = DeskController::new(ScriptedTransport::new(&[1.1]));

        let height = controller.current_height().await.unwrap();

        assert!((height - 1.1).abs() < 1e-3);
        assert!(controller.transport().writes().is_empty());
    }

    #[tokio::test]
    async fn test_halt_writes_reference_input_stop() {
        let controller = DeskController::new(ScriptedTransport::new(&[]));

        controller.halt().await.unwrap();

        assert_eq!(
            controller.transport().calls(),
            vec![Call::Write(Endpoint::ReferenceInput, [0x01, 0x80])]
        );
    }
}
