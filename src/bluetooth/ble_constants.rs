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

//! BLE characteristic UUIDs and command opcodes for IDÅSEN (Linak DPG) desks.

use std::fmt;
use uuid::Uuid;

/// Height telemetry characteristic UUID.
/// Properties: Read, Notify. 16 bytes, little-endian u16 in the low 2 bytes.
pub const HEIGHT_UUID: Uuid = Uuid::from_u128(0x99fa0021_338a_1024_8a49_009c0215f78a);

/// Directional move command characteristic UUID.
/// Properties: Write, Write Without Response
pub const COMMAND_UUID: Uuid = Uuid::from_u128(0x99fa0002_338a_1024_8a49_009c0215f78a);

/// Reference input (programmed motion) characteristic UUID.
/// Properties: Write, Write Without Response
pub const REFERENCE_INPUT_UUID: Uuid = Uuid::from_u128(0x99fa0031_338a_1024_8a49_009c0215f78a);

/// Advertised local names of IDÅSEN desks start with this.
pub const DESK_NAME_PREFIX: &str = "Desk";

/// Lowest height the desk reports, in meters.
pub const MIN_HEIGHT: f32 = 0.62;

/// Highest height the desk reports, in meters.
pub const MAX_HEIGHT: f32 = 1.27;

/// Raw height units per meter.
pub const RAW_UNITS_PER_METER: f32 = 10_000.0;

/// Bytes read from the height characteristic.
pub const HEIGHT_READ_LEN: usize = 16;

/// A control capability exposed by the desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Height telemetry.
    Height,
    /// Up/down commands.
    Command,
    /// Stop and programmed-motion control.
    ReferenceInput,
}

impl Endpoint {
    pub const ALL: [Endpoint; 3] = [Endpoint::Height, Endpoint::Command, Endpoint::ReferenceInput];

    /// Characteristic UUID backing this endpoint.
    pub fn uuid(&self) -> Uuid {
        match self {
            Endpoint::Height => HEIGHT_UUID,
            Endpoint::Command => COMMAND_UUID,
            Endpoint::ReferenceInput => REFERENCE_INPUT_UUID,
        }
    }

    /// Look up the endpoint for a characteristic UUID.
    pub fn from_uuid(uuid: Uuid) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.uuid() == uuid)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Endpoint::Height => "height",
            Endpoint::Command => "command",
            Endpoint::ReferenceInput => "reference-input",
        };
        write!(f, "{} ({})", name, self.uuid())
    }
}

/// Commands written to the desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCommand {
    /// Keep moving up.
    Up,
    /// Keep moving down.
    Down,
    /// Stop a manual move.
    Stop,
    /// Halt a programmed reference-input move.
    ReferenceInputStop,
}

impl MoveCommand {
    /// The 2-byte opcode for this command.
    pub fn opcode(&self) -> [u8; 2] {
        match self {
            MoveCommand::Up => [0x47, 0x00],
            MoveCommand::Down => [0x46, 0x00],
            MoveCommand::Stop => [0xFF, 0x00],
            MoveCommand::ReferenceInputStop => [0x01, 0x80],
        }
    }

    /// Endpoint the opcode is written to.
    pub fn endpoint(&self) -> Endpoint {
        match self {
            MoveCommand::Up | MoveCommand::Down => Endpoint::Command,
            MoveCommand::Stop | MoveCommand::ReferenceInputStop => Endpoint::ReferenceInput,
        }
    }
}
