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

//! Byte-level access to desk endpoints.

use std::future::Future;

use super::ble_constants::Endpoint;
use crate::error::TransportError;

/// Trait for a live connection to one desk.
///
/// The BlueZ implementation is [`super::BleTransport`]; tests drive the
/// controller through scripted in-memory implementations.
pub trait Transport: Send + Sync {
    /// Read the current value of an endpoint.
    fn read_endpoint(
        &self,
        endpoint: Endpoint,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;

    /// Write a value to an endpoint.
    fn write_endpoint(
        &self,
        endpoint: Endpoint,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
