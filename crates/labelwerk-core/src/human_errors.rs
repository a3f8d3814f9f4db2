// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operator-facing error descriptions.
//
// The people at the label bench need to know one thing first: is the request
// wrong (fix the serial / format / address in the tool) or is the printer
// unreachable (go look at the printer)? Every error maps to a short message
// and a concrete next step.

use serde::Serialize;

use crate::error::{FaultSide, LabelwerkError};

/// How the operator should treat the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    /// Printer busy or briefly unreachable; trying again is reasonable.
    Transient,
    /// Someone must change the request or the printer setup first.
    ActionRequired,
    /// Cannot succeed on this host as configured.
    Permanent,
}

/// A plain-language error with an actionable suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub severity: Severity,
    pub fault: FaultSide,
}

impl HumanError {
    fn new(err: &LabelwerkError, message: &str, suggestion: String, severity: Severity) -> Self {
        Self {
            message: message.into(),
            suggestion,
            severity,
            fault: err.fault_side(),
        }
    }
}

/// Convert a `LabelwerkError` into something the bench operator can act on.
pub fn humanize_error(err: &LabelwerkError) -> HumanError {
    match err {
        // -- Request faults --
        LabelwerkError::Validation(detail) => {
            let lower = detail.to_ascii_lowercase();
            if lower.contains("serial") {
                HumanError::new(
                    err,
                    "The label has no serial number.",
                    "Scan or type the serial number, then print again.".into(),
                    Severity::ActionRequired,
                )
            } else if lower.contains("address") {
                HumanError::new(
                    err,
                    "The printer address doesn't look right.",
                    "Check the printer address in the tool. It should look like 192.168.1.50 or 192.168.1.50:9100.".into(),
                    Severity::ActionRequired,
                )
            } else {
                HumanError::new(
                    err,
                    "The print request is incomplete.",
                    format!("Check the printer settings in the tool. ({detail})"),
                    Severity::ActionRequired,
                )
            }
        }

        LabelwerkError::UnknownFormat(format) => HumanError::new(
            err,
            "That label size isn't supported.",
            format!("Choose one of 24mm, 36mm, 62mm or A4-sheet instead of '{format}'."),
            Severity::ActionRequired,
        ),

        // -- Render faults --
        LabelwerkError::Render(detail) => HumanError::new(
            err,
            "The label couldn't be prepared.",
            format!("Check the label data and try again. If this keeps happening, please report it. ({detail})"),
            Severity::ActionRequired,
        ),

        // -- Delivery faults --
        LabelwerkError::Timeout(_) => HumanError::new(
            err,
            "The printer didn't respond in time.",
            "The printer might be busy, asleep or off the network. Check it's on and connected, then try again.".into(),
            Severity::Transient,
        ),

        LabelwerkError::ConnectionRefused(_) => HumanError::new(
            err,
            "The printer refused the connection.",
            "Make sure the address points at the label printer and that raw printing on port 9100 is enabled.".into(),
            Severity::Transient,
        ),

        LabelwerkError::Transport(detail) => {
            let lower = detail.to_ascii_lowercase();
            if lower.contains("usb") || lower.contains("device") {
                HumanError::new(
                    err,
                    "The USB printer couldn't be reached.",
                    "Check the USB cable and that the printer is switched on, then try again.".into(),
                    Severity::Transient,
                )
            } else {
                HumanError::new(
                    err,
                    "The connection to the printer failed.",
                    format!("Check the printer is on the same network, then try again. ({detail})"),
                    Severity::Transient,
                )
            }
        }

        LabelwerkError::Unspecified(detail) => HumanError::new(
            err,
            "Something unexpected went wrong while printing.",
            format!("Try again. If this keeps happening, please report it. ({detail})"),
            Severity::Transient,
        ),

        // -- Service --
        LabelwerkError::ServiceDisabled => HumanError::new(
            err,
            "Label printing is paused.",
            "Ask whoever runs the print service to start it again.".into(),
            Severity::ActionRequired,
        ),

        LabelwerkError::PlatformUnavailable => HumanError::new(
            err,
            "USB printing isn't available on this computer.",
            "Use a network printer, or enable USB printing in the service configuration.".into(),
            Severity::Permanent,
        ),

        LabelwerkError::Config(detail) => HumanError::new(
            err,
            "The print service is misconfigured.",
            format!("Fix the configuration file and restart the service. ({detail})"),
            Severity::Permanent,
        ),

        LabelwerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError::new(
                    err,
                    "The print service isn't allowed to use that device.",
                    "Give the service user write access to the printer device.".into(),
                    Severity::Permanent,
                )
            } else {
                HumanError::new(
                    err,
                    "The print service had a file problem.",
                    "Try again. If this keeps happening, please report it.".into(),
                    Severity::Transient,
                )
            }
        }

        LabelwerkError::Serialization(_) => HumanError::new(
            err,
            "The print service had an internal data problem.",
            "Try again. If this keeps happening, please report it.".into(),
            Severity::Transient,
        ),
    }
}
