// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw TCP label sender (JetDirect, port 9100).
//
// Open a socket, write the ZPL, close. There is no protocol beyond that: the
// printer interprets the bytes natively and gives no feedback. The whole
// exchange (connect, write, shutdown) runs under one deadline so a printer
// that stops reading cannot hold a request open.

use std::io;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info};

use labelwerk_core::types::{DispatchResult, FailureReason, NetworkDestination};

use crate::dispatch::Transport;

/// Deadline for one complete network delivery.
pub const NETWORK_TIMEOUT: Duration = Duration::from_secs(5);

const CHUNK_SIZE: usize = 8192;

/// Sends payloads to network printers over raw TCP.
#[derive(Debug, Clone)]
pub struct NetworkSender {
    timeout: Duration,
}

impl Default for NetworkSender {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkSender {
    pub fn new() -> Self {
        Self {
            timeout: NETWORK_TIMEOUT,
        }
    }

    /// Override the delivery deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn send(&self, dest: &NetworkDestination, payload: &[u8]) -> io::Result<()> {
        let mut stream = TcpStream::connect((dest.host.as_str(), dest.port)).await?;
        debug!(addr = %dest, "raw TCP connected");

        let mut sent = 0;
        for chunk in payload.chunks(CHUNK_SIZE) {
            stream.write_all(chunk).await?;
            sent += chunk.len();
            debug!(sent, total = payload.len(), "raw TCP progress");
        }

        stream.flush().await?;
        stream.shutdown().await?;
        Ok(())
    }
}

impl Transport for NetworkSender {
    async fn deliver(&self, destination: &str, payload: &[u8]) -> DispatchResult {
        let dest = match NetworkDestination::parse(destination) {
            Ok(dest) => dest,
            Err(e) => return DispatchResult::failed(FailureReason::TransportError, e.to_string()),
        };
        info!(addr = %dest, bytes = payload.len(), "sending label via raw TCP");

        match tokio::time::timeout(self.timeout, self.send(&dest, payload)).await {
            Ok(Ok(())) => DispatchResult::delivered(),
            Ok(Err(e)) => DispatchResult::failed(classify_io_error(&e), format!("{dest}: {e}")),
            Err(_) => DispatchResult::failed(
                FailureReason::Timeout,
                format!("{dest}: no completion within {}s", self.timeout.as_secs_f32()),
            ),
        }
    }
}

fn classify_io_error(err: &io::Error) -> FailureReason {
    match err.kind() {
        io::ErrorKind::ConnectionRefused => FailureReason::ConnectionRefused,
        io::ErrorKind::TimedOut => FailureReason::Timeout,
        _ => FailureReason::TransportError,
    }
}
