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

//! Control IKEA IDÅSEN standing desks over Bluetooth LE.
//!
//! Desks, presets and schedules live in a YAML store; the scheduler daemon
//! moves desks to presets at configured times.

pub mod bluetooth;
pub mod commands;
pub mod config;
pub mod daemon;
pub mod desk;
pub mod error;
pub mod notification;
pub mod schedule;
pub mod settings;
