// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Labelwerk label print service.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LabelwerkError, Result};

/// Raw TCP port spoken by network label printers (JetDirect).
pub const DEFAULT_PRINTER_PORT: u16 = 9100;

/// Operator name stamped on labels when the request does not carry one.
pub const UNKNOWN_OPERATOR: &str = "Unknown";

/// Unique identifier for a print job, used for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Connection mode
// ---------------------------------------------------------------------------

/// How the printer is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ConnectionMode {
    /// Raw TCP socket to `host[:port]`.
    Network,
    /// USB-attached printer addressed by device/model name.
    #[serde(rename = "USB")]
    Usb,
}

impl ConnectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "Network",
            Self::Usb => "USB",
        }
    }
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionMode {
    type Err = LabelwerkError;

    /// Accepts `Network`/`IP` and `USB`, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "network" | "ip" => Ok(Self::Network),
            "usb" => Ok(Self::Usb),
            other => Err(LabelwerkError::Validation(format!(
                "unknown connection mode '{other}' (expected IP/Network or USB)"
            ))),
        }
    }
}

impl TryFrom<String> for ConnectionMode {
    type Error = LabelwerkError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Network destination
// ---------------------------------------------------------------------------

/// A parsed `host[:port]` network printer address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDestination {
    pub host: String,
    pub port: u16,
}

impl NetworkDestination {
    /// Parse `host`, `host:port`, `ip`, `[v6]` or `[v6]:port`.
    ///
    /// The port defaults to 9100 when absent.
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim();
        if s.is_empty() {
            return Err(LabelwerkError::Validation(
                "network printer address is empty".into(),
            ));
        }

        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Self::checked(addr.ip().to_string(), addr.port(), input);
        }
        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self {
                host: ip.to_string(),
                port: DEFAULT_PRINTER_PORT,
            });
        }
        if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            return inner
                .parse::<IpAddr>()
                .map(|ip| Self {
                    host: ip.to_string(),
                    port: DEFAULT_PRINTER_PORT,
                })
                .map_err(|_| invalid_address(input));
        }

        let (host, port) = match s.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| invalid_address(input))?;
                (host, port)
            }
            None => (s, DEFAULT_PRINTER_PORT),
        };

        let host_ok = !host.is_empty()
            && host
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_');
        if !host_ok {
            return Err(invalid_address(input));
        }
        Self::checked(host.to_string(), port, input)
    }

    fn checked(host: String, port: u16, input: &str) -> Result<Self> {
        if port == 0 {
            return Err(invalid_address(input));
        }
        Ok(Self { host, port })
    }
}

fn invalid_address(input: &str) -> LabelwerkError {
    LabelwerkError::Validation(format!(
        "'{input}' is not a valid printer address (expected host[:port])"
    ))
}

impl fmt::Display for NetworkDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

// ---------------------------------------------------------------------------
// Print request
// ---------------------------------------------------------------------------

/// One inbound label print request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJobRequest {
    #[serde(alias = "mode")]
    pub connection_mode: ConnectionMode,
    /// `host[:port]` in network mode, device/model name in USB mode.
    pub destination: String,
    pub serial_number: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub model_aux_part_number: Option<String>,
    #[serde(default)]
    pub type_label: Option<String>,
    #[serde(default)]
    pub operator_name: Option<String>,
    #[serde(default)]
    pub format_hint: Option<String>,
    #[serde(default = "Local::now")]
    pub requested_at: DateTime<Local>,
}

impl PrintJobRequest {
    pub fn new(
        connection_mode: ConnectionMode,
        destination: impl Into<String>,
        serial_number: impl Into<String>,
    ) -> Self {
        Self {
            connection_mode,
            destination: destination.into(),
            serial_number: serial_number.into(),
            model: None,
            model_aux_part_number: None,
            type_label: None,
            operator_name: None,
            format_hint: None,
            requested_at: Local::now(),
        }
    }

    /// The explicit format hint, ignoring empty strings.
    pub fn format_hint(&self) -> Option<&str> {
        non_blank(self.format_hint.as_deref())
    }

    pub fn operator_name(&self) -> &str {
        non_blank(self.operator_name.as_deref()).unwrap_or(UNKNOWN_OPERATOR)
    }

    /// Check the business invariants that must hold before any work is done.
    pub fn validate(&self) -> Result<()> {
        if self.serial_number.trim().is_empty() {
            return Err(LabelwerkError::Validation("no serial number provided".into()));
        }
        match self.connection_mode {
            ConnectionMode::Network => {
                NetworkDestination::parse(&self.destination)?;
            }
            ConnectionMode::Usb => {
                if self.destination.trim().is_empty() {
                    return Err(LabelwerkError::Validation(
                        "no USB printer name provided".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Advisory label-size lookup parameters. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelSizeQuery {
    pub mode: Option<ConnectionMode>,
    pub destination: Option<String>,
    pub format_hint: Option<String>,
}

// ---------------------------------------------------------------------------
// Dispatch outcome
// ---------------------------------------------------------------------------

/// Why a delivery attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    Timeout,
    ConnectionRefused,
    TransportError,
    Unspecified,
}

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    pub succeeded: bool,
    /// Present only when `succeeded` is false.
    pub failure_reason: Option<FailureReason>,
    /// Human-readable cause, present only on failure.
    pub detail: Option<String>,
}

impl DispatchResult {
    pub fn delivered() -> Self {
        Self {
            succeeded: true,
            failure_reason: None,
            detail: None,
        }
    }

    pub fn failed(reason: FailureReason, detail: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            failure_reason: Some(reason),
            detail: Some(detail.into()),
        }
    }

    /// Convert into the error taxonomy used by the rest of the pipeline.
    pub fn into_result(self) -> Result<()> {
        if self.succeeded {
            return Ok(());
        }
        let reason = self.failure_reason.unwrap_or(FailureReason::Unspecified);
        let detail = self
            .detail
            .unwrap_or_else(|| "delivery failed without detail".into());
        Err(LabelwerkError::from_failure(reason, detail))
    }
}

/// Success record returned for a delivered label.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintReceipt {
    pub job_id: JobId,
    pub format_id: String,
    pub label_size: String,
    pub payload_bytes: usize,
    /// SHA-256 of the payload bytes, hex-encoded.
    pub payload_sha256: String,
    pub destination: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_mode_accepts_legacy_spellings() {
        assert_eq!("IP".parse::<ConnectionMode>().unwrap(), ConnectionMode::Network);
        assert_eq!("network".parse::<ConnectionMode>().unwrap(), ConnectionMode::Network);
        assert_eq!(" usb ".parse::<ConnectionMode>().unwrap(), ConnectionMode::Usb);
        assert!("bluetooth".parse::<ConnectionMode>().is_err());
    }

    #[test]
    fn destination_defaults_to_port_9100() {
        let dest = NetworkDestination::parse("192.168.1.50").unwrap();
        assert_eq!(dest.port, 9100);
        assert_eq!(dest.to_string(), "192.168.1.50:9100");
    }

    #[test]
    fn destination_respects_explicit_port() {
        let dest = NetworkDestination::parse("printer-3.lab.local:9101").unwrap();
        assert_eq!(dest.host, "printer-3.lab.local");
        assert_eq!(dest.port, 9101);
    }

    #[test]
    fn destination_handles_ipv6() {
        assert_eq!(
            NetworkDestination::parse("[fe80::1]:9200").unwrap().to_string(),
            "[fe80::1]:9200"
        );
        assert_eq!(
            NetworkDestination::parse("[::1]").unwrap().to_string(),
            "[::1]:9100"
        );
        assert_eq!(NetworkDestination::parse("::1").unwrap().port, 9100);
    }

    #[test]
    fn destination_rejects_garbage() {
        for bad in ["", "   ", "host:", "host:99999", "host:0", "a b", "http://x/y", ":9100"] {
            assert!(
                NetworkDestination::parse(bad).is_err(),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn validate_requires_serial_number() {
        let req = PrintJobRequest::new(ConnectionMode::Network, "10.0.0.5", "  ");
        assert!(matches!(req.validate(), Err(LabelwerkError::Validation(_))));

        let req = PrintJobRequest::new(ConnectionMode::Network, "10.0.0.5", "SN1");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn validate_checks_destination_for_mode() {
        let req = PrintJobRequest::new(ConnectionMode::Network, "not an address", "SN1");
        assert!(req.validate().is_err());

        // USB names are opaque: anything non-empty is acceptable.
        let req = PrintJobRequest::new(ConnectionMode::Usb, "Brother QL-800 (copy 1)", "SN1");
        assert!(req.validate().is_ok());

        let req = PrintJobRequest::new(ConnectionMode::Usb, "", "SN1");
        assert!(req.validate().is_err());
    }

    #[test]
    fn blank_hint_and_operator_fall_back() {
        let mut req = PrintJobRequest::new(ConnectionMode::Usb, "QL", "SN1");
        req.format_hint = Some("  ".into());
        req.operator_name = Some(String::new());
        assert_eq!(req.format_hint(), None);
        assert_eq!(req.operator_name(), "Unknown");
    }

    #[test]
    fn request_deserializes_from_camel_case_json() {
        let req: PrintJobRequest = serde_json::from_str(
            r#"{
                "connectionMode": "IP",
                "destination": "192.168.1.50",
                "serialNumber": "SN12345",
                "modelAuxPartNumber": "APN-7",
                "formatHint": "A4-sheet",
                "requestedAt": "2026-03-14T09:30:00+00:00"
            }"#,
        )
        .unwrap();
        assert_eq!(req.connection_mode, ConnectionMode::Network);
        assert_eq!(req.model_aux_part_number.as_deref(), Some("APN-7"));
        assert_eq!(req.format_hint(), Some("A4-sheet"));
        assert!(req.model.is_none());
    }

    #[test]
    fn dispatch_result_converts_to_error() {
        assert!(DispatchResult::delivered().into_result().is_ok());

        let err = DispatchResult::failed(FailureReason::ConnectionRefused, "10.0.0.9:9100")
            .into_result()
            .unwrap_err();
        assert!(matches!(err, LabelwerkError::ConnectionRefused(_)));
    }
}
