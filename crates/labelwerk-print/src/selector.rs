// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Format selection.
//
// Pure function of (connection mode, destination, optional hint). Rules in
// precedence order:
//
//   1. a hint naming a registered format wins,
//   2. USB printers of the narrow tape family get the narrow format,
//   3. network printers get the default wide format,
//   4. any other USB printer gets the default wide format.
//
// A hint that names nothing registered is ignored here; whether that is an
// error is the coordinator's call.

use labelwerk_core::types::ConnectionMode;

use crate::registry::{LabelFormat, TemplateRegistry};

/// Model-name prefix of the narrow USB tape printers (Brother PT-P7xx series).
/// Matching is case-sensitive.
pub const NARROW_FAMILY_PREFIX: &str = "Brother PT-P7";

/// Printer family inferred from a USB destination name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbFamily {
    Narrow,
    Generic,
}

/// Classify a USB destination by its model-name prefix.
pub fn classify_usb_family(destination: &str) -> UsbFamily {
    if destination.trim_start().starts_with(NARROW_FAMILY_PREFIX) {
        UsbFamily::Narrow
    } else {
        UsbFamily::Generic
    }
}

/// Which rule produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRule {
    Hint,
    NarrowUsbFamily,
    NetworkDefault,
    UsbFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub format: &'static LabelFormat,
    pub rule: SelectionRule,
}

/// Pick the label format for a job. Never fails.
pub fn select_format(
    registry: &TemplateRegistry,
    mode: ConnectionMode,
    destination: &str,
    hint: Option<&str>,
) -> Selection {
    if let Some(format) = hint.and_then(|h| registry.find(h)) {
        return Selection {
            format,
            rule: SelectionRule::Hint,
        };
    }

    match mode {
        ConnectionMode::Usb if classify_usb_family(destination) == UsbFamily::Narrow => Selection {
            format: registry.narrow_usb_format(),
            rule: SelectionRule::NarrowUsbFamily,
        },
        ConnectionMode::Network => Selection {
            format: registry.default_format(),
            rule: SelectionRule::NetworkDefault,
        },
        ConnectionMode::Usb => Selection {
            format: registry.default_format(),
            rule: SelectionRule::UsbFallback,
        },
    }
}
