// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic USB transport trait and device identifiers.

use std::fmt;
use std::path::PathBuf;

use labelwerk_core::error::Result;

/// Deliver raw bytes to a USB-attached printer.
///
/// Implementations block until the device accepts the data or errors; any
/// timeout is whatever the underlying driver enforces.
pub trait UsbTransport: Send + Sync {
    /// Short name for logs ("device-node", "stub").
    fn name(&self) -> &str;

    /// Send the payload to the given device.
    fn send_raw(&self, device: &UsbDeviceId, payload: &[u8]) -> Result<()>;
}

/// How a USB printer is addressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UsbDeviceId {
    /// USB vendor/product pair, written `usb://0xVVVV:0xPPPP`.
    VendorProduct { vendor_id: u16, product_id: u16 },
    /// Absolute path of a printer device node, e.g. `/dev/usb/lp0`.
    Path(PathBuf),
}

impl UsbDeviceId {
    pub const fn vendor_product(vendor_id: u16, product_id: u16) -> Self {
        Self::VendorProduct {
            vendor_id,
            product_id,
        }
    }

    /// Parse an explicit identifier: `usb://0x04f9:0x2060`, `04f9:2060`,
    /// or an absolute device path. Returns `None` for anything else
    /// (model names, free text).
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if s.starts_with('/') {
            return Some(Self::Path(PathBuf::from(s)));
        }
        let ids = s.strip_prefix("usb://").unwrap_or(s);
        let (vendor, product) = ids.split_once(':')?;
        Some(Self::vendor_product(parse_hex_u16(vendor)?, parse_hex_u16(product)?))
    }
}

fn parse_hex_u16(s: &str) -> Option<u16> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.is_empty() || digits.len() > 4 {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}

impl fmt::Display for UsbDeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VendorProduct {
                vendor_id,
                product_id,
            } => write!(f, "usb://0x{vendor_id:04x}:0x{product_id:04x}"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}
