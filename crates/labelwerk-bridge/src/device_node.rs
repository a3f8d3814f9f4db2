// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// USB printing through kernel printer device nodes.
//
// The usblp driver (and its equivalents) exposes each attached printer as a
// character device such as /dev/usb/lp0. Writing to it hands the bytes to
// the printer; the driver enforces its own write timeout. Vendor/product
// identifiers are mapped to nodes in the configuration because node numbers
// depend on plug order.
//
// An explicit path is only written to when it is a kernel printer node
// (`/dev/usb/lpN`) or one of the configured nodes. Anything else is refused
// without being opened.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use labelwerk_core::config::UsbConfig;
use labelwerk_core::error::{LabelwerkError, Result};

use crate::traits::{UsbDeviceId, UsbTransport};

/// Directory the kernel printer class driver creates nodes in.
pub const PRINTER_NODE_DIR: &str = "/dev/usb";

/// True for kernel printer nodes: `/dev/usb/lp` followed by a number.
pub fn is_printer_node(path: &Path) -> bool {
    if path.parent() != Some(Path::new(PRINTER_NODE_DIR)) {
        return false;
    }
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_prefix("lp"))
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Writes payloads to printer device nodes.
#[derive(Debug, Default)]
pub struct DeviceNodeTransport {
    nodes: HashMap<UsbDeviceId, PathBuf>,
}

impl DeviceNodeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `device_nodes` table of the USB configuration.
    pub fn from_config(config: &UsbConfig) -> Result<Self> {
        let mut transport = Self::new();
        for (key, node) in &config.device_nodes {
            let id = UsbDeviceId::parse(key).ok_or_else(|| {
                LabelwerkError::Config(format!(
                    "'{key}' is not a USB vendor:product identifier (expected 0xVVVV:0xPPPP)"
                ))
            })?;
            transport = transport.with_node(id, node.clone());
        }
        Ok(transport)
    }

    /// Map a device identifier to a device node.
    pub fn with_node(mut self, device: UsbDeviceId, node: impl Into<PathBuf>) -> Self {
        self.nodes.insert(device, node.into());
        self
    }

    pub fn mapped_devices(&self) -> usize {
        self.nodes.len()
    }

    /// Whether an explicit path may be written to.
    pub fn allows_path(&self, path: &Path) -> bool {
        is_printer_node(path) || self.nodes.values().any(|node| node == path)
    }

    fn node_for<'a>(&'a self, device: &'a UsbDeviceId) -> Result<&'a Path> {
        match device {
            UsbDeviceId::Path(path) if self.allows_path(path) => Ok(path.as_path()),
            UsbDeviceId::Path(path) => Err(LabelwerkError::Validation(format!(
                "{} is not a USB printer device node",
                path.display()
            ))),
            UsbDeviceId::VendorProduct { .. } => self
                .nodes
                .get(device)
                .map(PathBuf::as_path)
                .ok_or_else(|| {
                    LabelwerkError::Transport(format!("no USB device node configured for {device}"))
                }),
        }
    }
}

impl UsbTransport for DeviceNodeTransport {
    fn name(&self) -> &str {
        "device-node"
    }

    fn send_raw(&self, device: &UsbDeviceId, payload: &[u8]) -> Result<()> {
        let node = self.node_for(device)?;
        debug!(%device, node = %node.display(), bytes = payload.len(), "opening USB device node");

        // Never create: a missing node means the printer is unplugged.
        let mut file = OpenOptions::new().write(true).open(node).map_err(|e| {
            LabelwerkError::Transport(format!("USB device {device} at {}: {e}", node.display()))
        })?;
        file.write_all(payload)
            .and_then(|_| file.flush())
            .map_err(|e| {
                LabelwerkError::Transport(format!("USB write to {device} failed: {e}"))
            })?;

        info!(%device, bytes = payload.len(), "USB payload written");
        Ok(())
    }
}
