// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LabelwerkError, Result};

/// Service settings, read once at startup from a JSON file.
///
/// Every field has a default so a partial (or absent) file is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP surface binds to.
    pub bind_address: IpAddr,
    /// Port for the HTTP surface (default 3000, what the browser tool expects).
    pub server_port: u16,
    /// Whether print jobs are accepted as soon as the service starts.
    pub accept_jobs_on_start: bool,
    /// Reject explicit format hints that name no registered format
    /// instead of falling back to the inferred format.
    pub strict_format_hint: bool,
    /// USB printing settings.
    pub usb: UsbConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            server_port: 3000,
            accept_jobs_on_start: true,
            strict_format_hint: true,
            usb: UsbConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            LabelwerkError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.usb.validate()?;
        Ok(config)
    }
}

/// USB device transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UsbConfig {
    /// When false, USB jobs fail with "not available" instead of touching devices.
    pub enabled: bool,
    /// Kernel printer device node per `0xVVVV:0xPPPP` identifier,
    /// e.g. `"0x04f9:0x2060": "/dev/usb/lp0"`.
    pub device_nodes: BTreeMap<String, PathBuf>,
}

impl Default for UsbConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            device_nodes: BTreeMap::new(),
        }
    }
}

impl UsbConfig {
    fn validate(&self) -> Result<()> {
        for (id, node) in &self.device_nodes {
            if !node.is_absolute() {
                return Err(LabelwerkError::Config(format!(
                    "device node for {id} must be an absolute path, got {}",
                    node.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_browser_tool() {
        let config = AppConfig::default();
        assert_eq!(config.server_port, 3000);
        assert!(config.accept_jobs_on_start);
        assert!(config.strict_format_hint);
        assert!(config.usb.enabled);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "server_port": 8088, "usb": {{ "device_nodes": {{ "0x04f9:0x2060": "/dev/usb/lp1" }} }} }}"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.server_port, 8088);
        assert!(config.strict_format_hint);
        assert!(config.usb.enabled);
        assert_eq!(
            config.usb.device_nodes.get("0x04f9:0x2060"),
            Some(&PathBuf::from("/dev/usb/lp1"))
        );
    }

    #[test]
    fn relative_device_node_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "usb": {{ "device_nodes": {{ "0x04f9:0x2060": "lp0" }} }} }}"#).unwrap();

        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, LabelwerkError::Config(_)));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = AppConfig::load("/nonexistent/labelwerk.json").unwrap_err();
        assert!(matches!(err, LabelwerkError::Config(_)));
    }
}
