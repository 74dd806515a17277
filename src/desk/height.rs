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

//! Height encoding.
//!
//! The desk reports height as a little-endian u16 in 1/10000 m above
//! [`MIN_HEIGHT`].

use crate::bluetooth::ble_constants::{Endpoint, MAX_HEIGHT, MIN_HEIGHT, RAW_UNITS_PER_METER};
use crate::error::{DeskError, TransportError};

/// Convert a raw sensor value to meters.
pub fn raw_to_meters(raw: u16) -> f32 {
    raw as f32 / RAW_UNITS_PER_METER + MIN_HEIGHT
}

/// Convert meters to the nearest raw sensor value.
pub fn meters_to_raw(height: f32) -> u16 {
    ((height - MIN_HEIGHT) * RAW_UNITS_PER_METER)
        .round()
        .clamp(0.0, u16::MAX as f32) as u16
}

/// Decode a height telemetry read.
pub fn decode_height(data: &[u8]) -> Result<f32, TransportError> {
    match data {
        [lo, hi, ..] => Ok(raw_to_meters(u16::from_le_bytes([*lo, *hi]))),
        _ => Err(TransportError::ShortRead {
            endpoint: Endpoint::Height,
            len: data.len(),
        }),
    }
}

/// Reject targets the desk cannot reach.
pub fn validate_target(height: f32) -> Result<f32, DeskError> {
    if (MIN_HEIGHT..=MAX_HEIGHT).contains(&height) {
        Ok(height)
    } else {
        Err(DeskError::HeightOutOfRange {
            height,
            min: MIN_HEIGHT,
            max: MAX_HEIGHT,
        })
    }
}
