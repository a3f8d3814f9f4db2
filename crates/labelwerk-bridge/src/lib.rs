// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk Bridge: USB printer transport abstraction.
//
// The print engine only needs one USB operation: "send these raw bytes to
// that device, blocking until it accepts or errors". This crate defines that
// capability and picks an implementation for the host.

use std::sync::Arc;

use labelwerk_core::config::UsbConfig;
use labelwerk_core::error::Result;

pub mod device_node;
pub mod stub;
pub mod traits;

pub use device_node::{DeviceNodeTransport, PRINTER_NODE_DIR, is_printer_node};
pub use stub::StubTransport;
pub use traits::{UsbDeviceId, UsbTransport};

/// Build the USB transport described by the configuration.
///
/// USB disabled in config gives the stub, which refuses every job with
/// `PlatformUnavailable`; otherwise jobs go to kernel printer device nodes.
pub fn usb_transport(config: &UsbConfig) -> Result<Arc<dyn UsbTransport>> {
    if !config.enabled {
        tracing::info!("USB printing disabled in configuration");
        return Ok(Arc::new(StubTransport));
    }
    let transport = DeviceNodeTransport::from_config(config)?;
    tracing::info!(
        mapped_devices = transport.mapped_devices(),
        "USB printing via device nodes"
    );
    Ok(Arc::new(transport))
}
