// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// USB label sender.
//
// Resolves the job's USB destination to a concrete device and hands the
// payload to the platform USB transport on the blocking pool. Resolution
// order: an explicit device identifier, then the printer family table, then
// the named fallback device.

use std::sync::Arc;

use tracing::{info, warn};

use labelwerk_bridge::{UsbDeviceId, UsbTransport};
use labelwerk_core::types::{DispatchResult, FailureReason};

use crate::dispatch::Transport;
use crate::selector::{UsbFamily, classify_usb_family};

/// Brother PT-P7xx series tape printers.
pub const PT_P7_DEVICE: UsbDeviceId = UsbDeviceId::vendor_product(0x04f9, 0x2060);

/// Brother QL-800, used for any USB destination nothing else matches.
pub const FALLBACK_DEVICE: UsbDeviceId = UsbDeviceId::vendor_product(0x04f9, 0x209b);

/// How a destination was mapped to a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceResolution {
    Explicit(UsbDeviceId),
    Family(UsbDeviceId),
    Fallback(UsbDeviceId),
}

impl DeviceResolution {
    pub fn device(&self) -> &UsbDeviceId {
        match self {
            Self::Explicit(d) | Self::Family(d) | Self::Fallback(d) => d,
        }
    }

    fn into_device(self) -> UsbDeviceId {
        match self {
            Self::Explicit(d) | Self::Family(d) | Self::Fallback(d) => d,
        }
    }
}

/// Map a USB destination name to the device to print on.
pub fn resolve_usb_device(destination: &str) -> DeviceResolution {
    if let Some(device) = UsbDeviceId::parse(destination) {
        return DeviceResolution::Explicit(device);
    }
    match classify_usb_family(destination) {
        UsbFamily::Narrow => DeviceResolution::Family(PT_P7_DEVICE),
        UsbFamily::Generic => DeviceResolution::Fallback(FALLBACK_DEVICE),
    }
}

/// Sends payloads to USB printers through a [`UsbTransport`].
#[derive(Clone)]
pub struct UsbSender {
    transport: Arc<dyn UsbTransport>,
}

impl UsbSender {
    pub fn new(transport: Arc<dyn UsbTransport>) -> Self {
        Self { transport }
    }
}

impl std::fmt::Debug for UsbSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsbSender")
            .field("transport", &self.transport.name())
            .finish()
    }
}

impl Transport for UsbSender {
    async fn deliver(&self, destination: &str, payload: &[u8]) -> DispatchResult {
        let resolution = resolve_usb_device(destination);
        if let DeviceResolution::Fallback(device) = &resolution {
            warn!(destination, %device, "unrecognised USB printer, using fallback device");
        }
        let device = resolution.into_device();
        info!(
            destination,
            %device,
            transport = self.transport.name(),
            bytes = payload.len(),
            "sending label via USB"
        );

        let transport = Arc::clone(&self.transport);
        let payload = payload.to_vec();
        let target = device.to_string();
        let outcome =
            tokio::task::spawn_blocking(move || transport.send_raw(&device, &payload)).await;

        match outcome {
            Ok(Ok(())) => DispatchResult::delivered(),
            Ok(Err(e)) => DispatchResult::failed(FailureReason::TransportError, e.to_string()),
            Err(e) => DispatchResult::failed(
                FailureReason::Unspecified,
                format!("USB send to {target} aborted: {e}"),
            ),
        }
    }
}
