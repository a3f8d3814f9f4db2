// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transport dispatcher.
//
// Routes a rendered payload to the transport for the job's connection mode.
// Adding a transport means adding an implementation of `Transport` and a
// route here; nothing upstream changes.

use std::future::Future;

use tracing::{info, warn};

use labelwerk_core::error::Result;
use labelwerk_core::types::{ConnectionMode, DispatchResult};

use crate::render::validate_payload;

/// A way of getting payload bytes to a printer.
///
/// Delivery failures are reported in the returned [`DispatchResult`], never
/// as panics or errors, so the caller sees every attempt's outcome.
pub trait Transport: Send + Sync {
    fn deliver(
        &self,
        destination: &str,
        payload: &[u8],
    ) -> impl Future<Output = DispatchResult> + Send;
}

/// Mode-keyed router over the network and USB transports.
#[derive(Debug)]
pub struct Dispatcher<N, U> {
    network: N,
    usb: U,
}

impl<N: Transport, U: Transport> Dispatcher<N, U> {
    pub fn new(network: N, usb: U) -> Self {
        Self { network, usb }
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn usb(&self) -> &U {
        &self.usb
    }

    /// Deliver `payload` over the transport for `mode`.
    ///
    /// A payload that is not a single `^XA ... ^XZ` label is refused with a
    /// render error before any I/O happens. Exactly one delivery is attempted.
    pub async fn dispatch(
        &self,
        mode: ConnectionMode,
        destination: &str,
        payload: &[u8],
    ) -> Result<DispatchResult> {
        validate_payload(payload)?;

        let result = match mode {
            ConnectionMode::Network => self.network.deliver(destination, payload).await,
            ConnectionMode::Usb => self.usb.deliver(destination, payload).await,
        };

        if result.succeeded {
            info!(mode = %mode, destination, bytes = payload.len(), "label delivered");
        } else {
            warn!(
                mode = %mode,
                destination,
                reason = ?result.failure_reason,
                detail = result.detail.as_deref().unwrap_or(""),
                "label delivery failed"
            );
        }
        Ok(result)
    }
}
