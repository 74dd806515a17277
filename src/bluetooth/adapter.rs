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

//! BlueZ GATT client for a single desk.

use bluer::gatt::remote::{Characteristic, CharacteristicWriteRequest};
use bluer::gatt::WriteOp;
use bluer::{Adapter, AdapterEvent, Address, Device};
use futures::StreamExt;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use super::ble_constants::Endpoint;
use super::transport::Transport;
use crate::error::TransportError;

/// Default bound on establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Poll interval while waiting for BlueZ to resolve GATT services.
const SERVICES_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Open the default adapter, powering it on if needed.
pub async fn default_adapter() -> Result<Adapter, TransportError> {
    let session = bluer::Session::new().await?;
    debug!("BlueZ session created");

    let adapter = session.default_adapter().await?;
    info!("Using Bluetooth adapter: {}", adapter.name());

    if !adapter.is_powered().await? {
        info!("Powering on Bluetooth adapter...");
        adapter.set_powered(true).await?;
    }

    Ok(adapter)
}

/// A connected desk.
///
/// Characteristics are discovered once at connect time. The caller owns the
/// connection and should call [`BleTransport::disconnect`] when done.
pub struct BleTransport {
    device: Device,
    characteristics: HashMap<Endpoint, Characteristic>,
}

impl BleTransport {
    /// Connect to the desk at `address` (a `AA:BB:CC:DD:EE:FF` MAC).
    ///
    /// Everything up to and including GATT service resolution must finish
    /// within `connect_timeout`.
    pub async fn connect(address: &str, connect_timeout: Duration) -> Result<Self, TransportError> {
        let addr: Address = address
            .parse()
            .map_err(|_| TransportError::InvalidAddress(address.to_string()))?;

        let adapter = default_adapter().await?;
        let deadline = Instant::now() + connect_timeout;

        let established = timeout(connect_timeout, Self::establish(&adapter, addr, deadline)).await;
        let device = match established {
            Ok(Ok(Some(device))) => device,
            Ok(Err(source)) => {
                return Err(TransportError::Connect {
                    address: address.to_string(),
                    source,
                })
            }
            Ok(Ok(None)) | Err(_) => {
                return Err(TransportError::ConnectTimeout {
                    address: address.to_string(),
                    timeout: connect_timeout,
                })
            }
        };

        let characteristics = Self::discover_endpoints(&device).await?;
        info!(
            "Connected to desk {} ({} of {} endpoints found)",
            address,
            characteristics.len(),
            Endpoint::ALL.len()
        );

        Ok(Self {
            device,
            characteristics,
        })
    }

    /// Connect and wait for service resolution.
    ///
    /// `None` when services are still unresolved at `deadline`.
    async fn establish(
        adapter: &Adapter,
        addr: Address,
        deadline: Instant,
    ) -> bluer::Result<Option<Device>> {
        // BlueZ only knows devices it has seen; run discovery until this one shows up.
        if !adapter.device_addresses().await?.contains(&addr) {
            debug!("Device {} not known to BlueZ, discovering...", addr);
            let events = adapter.discover_devices().await?;
            futures::pin_mut!(events);
            while let Some(event) = events.next().await {
                if let AdapterEvent::DeviceAdded(found) = event {
                    if found == addr {
                        break;
                    }
                }
            }
        }

        let device = adapter.device(addr)?;
        if !device.is_connected().await? {
            info!("Connecting to {}...", addr);
            device.connect().await?;
        }

        let resolved =
            wait_until(|| device.is_services_resolved(), deadline, SERVICES_POLL_INTERVAL).await?;
        if !resolved {
            warn!("Services of {} not resolved in time", addr);
            return Ok(None);
        }

        Ok(Some(device))
    }

    /// Map the desk's characteristics onto known endpoints.
    async fn discover_endpoints(
        device: &Device,
    ) -> Result<HashMap<Endpoint, Characteristic>, TransportError> {
        let mut found = HashMap::new();

        for service in device.services().await? {
            for characteristic in service.characteristics().await? {
                let uuid = characteristic.uuid().await?;
                if let Some(endpoint) = Endpoint::from_uuid(uuid) {
                    debug!("Found endpoint {}", endpoint);
                    found.insert(endpoint, characteristic);
                }
            }
        }

        for endpoint in Endpoint::ALL {
            if !found.contains_key(&endpoint) {
                warn!("Desk does not expose endpoint {}", endpoint);
            }
        }

        Ok(found)
    }

    fn characteristic(&self, endpoint: Endpoint) -> Result<&Characteristic, TransportError> {
        self.characteristics
            .get(&endpoint)
            .ok_or(TransportError::EndpointNotFound(endpoint))
    }

    /// Tear down the connection.
    pub async fn disconnect(&self) -> Result<(), TransportError> {
        self.device.disconnect().await?;
        info!("Disconnected from desk {}", self.device.address());
        Ok(())
    }
}

/// Poll `check` every `interval` until it reports true or `deadline` passes.
///
/// Returns whether the condition was met.
async fn wait_until<F, Fut>(mut check: F, deadline: Instant, interval: Duration) -> bluer::Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bluer::Result<bool>>,
{
    loop {
        if check().await? {
            return Ok(true);
        }
        if Instant::now() >= deadline {
            return Ok(false);
        }
        sleep(interval).await;
    }
}

impl Transport for BleTransport {
    async fn read_endpoint(&self, endpoint: Endpoint) -> Result<Vec<u8>, TransportError> {
        let characteristic = self.characteristic(endpoint)?;
        let data = characteristic.read().await?;
        debug!("Read {} bytes from {}", data.len(), endpoint);
        Ok(data)
    }

    async fn write_endpoint(&self, endpoint: Endpoint, data: &[u8]) -> Result<(), TransportError> {
        let characteristic = self.characteristic(endpoint)?;
        let request = CharacteristicWriteRequest {
            op_type: WriteOp::Command,
            ..Default::default()
        };
        characteristic.write_ext(data, &request).await?;
        debug!("Wrote {:02x?} to {}", data, endpoint);
        Ok(())
    }
}
