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

//! Bluetooth communication module.
//!
//! BLE GATT client for IDÅSEN desks: endpoint constants, the transport seam,
//! the BlueZ connection, and advertisement scanning.

mod adapter;
pub mod ble_constants;
mod scanner;
mod transport;

pub use adapter::{default_adapter, BleTransport, DEFAULT_CONNECT_TIMEOUT};
pub use ble_constants::{Endpoint, MoveCommand, MAX_HEIGHT, MIN_HEIGHT};
pub use scanner::{forward_desks, Advertisement, DeskScanner, DeviceDescriptor};
pub use transport::Transport;
