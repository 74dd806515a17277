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

//! Desk control: height codec and the move-to-height controller.

mod controller;
pub mod height;

pub use controller::{DeskController, MoveOutcome, STOP_TOLERANCE};
pub use height::{decode_height, meters_to_raw, raw_to_meters, validate_target};
