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

//! Passive discovery of nearby desks.

use bluer::{Adapter, AdapterEvent};
use futures::{Stream, StreamExt};
use std::collections::HashSet;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::adapter::default_adapter;
use crate::error::TransportError;

/// A desk seen during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub name: String,
    pub address: String,
}

/// A raw advertisement: local name plus address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    pub name: String,
    pub address: String,
}

/// BLE scanner for desks.
pub struct DeskScanner {
    adapter: Adapter,
    name_prefix: String,
}

impl DeskScanner {
    /// Create a scanner on the default adapter.
    pub async fn new(name_prefix: impl Into<String>) -> Result<Self, TransportError> {
        Ok(Self {
            adapter: default_adapter().await?,
            name_prefix: name_prefix.into(),
        })
    }

    /// Start a new scan session.
    ///
    /// Returns a channel receiver yielding each desk once. The scan runs until
    /// `cancel` fires or the receiver is dropped; the channel then closes.
    pub async fn scan(
        &self,
        cancel: CancellationToken,
    ) -> Result<mpsc::Receiver<DeviceDescriptor>, TransportError> {
        info!("Scanning for desks named '{}*'...", self.name_prefix);

        let events = self.adapter.discover_devices_with_changes().await?;
        let adapter = self.adapter.clone();
        let advertisements = events.filter_map(move |event| {
            let adapter = adapter.clone();
            async move {
                match event {
                    AdapterEvent::DeviceAdded(address) => {
                        let device = adapter.device(address).ok()?;
                        let name = device.name().await.ok().flatten()?;
                        Some(Advertisement {
                            name,
                            address: address.to_string(),
                        })
                    }
                    _ => None,
                }
            }
        });

        let (tx, rx) = mpsc::channel(16);
        let prefix = self.name_prefix.clone();
        tokio::spawn(async move {
            forward_desks(Box::pin(advertisements), &prefix, cancel, tx).await;
        });

        Ok(rx)
    }
}

/// Filter an advertisement stream down to unique desks and forward them.
///
/// Only names starting with `prefix` pass. Each name is forwarded at most once
/// per call; the first address seen for it wins. Returns when `cancel` fires,
/// the stream ends, or the receiver goes away. Dropping the stream stops the
/// radio scan.
pub async fn forward_desks<S>(
    mut advertisements: S,
    prefix: &str,
    cancel: CancellationToken,
    tx: mpsc::Sender<DeviceDescriptor>,
) where
    S: Stream<Item = Advertisement> + Unpin,
{
    let mut seen: HashSet<String> = HashSet::new();

    loop {
        let advertisement = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = advertisements.next() => match next {
                Some(advertisement) => advertisement,
                None => break,
            },
        };

        if !advertisement.name.starts_with(prefix) {
            continue;
        }
        if !seen.insert(advertisement.name.clone()) {
            continue;
        }

        info!("Found desk {} ({})", advertisement.name, advertisement.address);
        let descriptor = DeviceDescriptor {
            name: advertisement.name,
            address: advertisement.address,
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            sent = tx.send(descriptor) => {
                if sent.is_err() {
                    debug!("Scan receiver dropped");
                    break;
                }
            }
        }
    }

    debug!("Scan session ended after {} desks", seen.len());
}
