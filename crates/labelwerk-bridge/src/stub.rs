// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub transport for hosts where USB printing is switched off.

use labelwerk_core::error::{LabelwerkError, Result};

use crate::traits::{UsbDeviceId, UsbTransport};

/// Refuses every USB job.
pub struct StubTransport;

impl UsbTransport for StubTransport {
    fn name(&self) -> &str {
        "stub"
    }

    fn send_raw(&self, device: &UsbDeviceId, _payload: &[u8]) -> Result<()> {
        tracing::warn!(%device, "UsbTransport::send_raw called on stub transport");
        Err(LabelwerkError::PlatformUnavailable)
    }
}
