// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Labelwerk.

use serde::Serialize;
use thiserror::Error;

use crate::types::FailureReason;

/// Top-level error type for all Labelwerk operations.
#[derive(Debug, Error)]
pub enum LabelwerkError {
    // -- Request errors --
    #[error("invalid print request: {0}")]
    Validation(String),

    #[error("unknown label format: {0}")]
    UnknownFormat(String),

    // -- Render errors --
    #[error("label render failed: {0}")]
    Render(String),

    // -- Delivery errors --
    #[error("printer timed out: {0}")]
    Timeout(String),

    #[error("printer refused the connection: {0}")]
    ConnectionRefused(String),

    #[error("printer transport error: {0}")]
    Transport(String),

    #[error("unexpected delivery fault: {0}")]
    Unspecified(String),

    // -- Service lifecycle --
    #[error("label printing is currently stopped")]
    ServiceDisabled,

    #[error("USB printing is not available on this host")]
    PlatformUnavailable,

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Validation,
    FormatSelection,
    Render,
    Dispatch,
    Service,
}

/// Which side has to act to fix the fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaultSide {
    /// The request itself is wrong (bad serial, bad format, bad address).
    Request,
    /// The printer or the path to it is at fault.
    Delivery,
    /// The service is misconfigured or paused.
    Service,
}

impl LabelwerkError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Validation(_) => Stage::Validation,
            Self::UnknownFormat(_) => Stage::FormatSelection,
            Self::Render(_) => Stage::Render,
            Self::Timeout(_)
            | Self::ConnectionRefused(_)
            | Self::Transport(_)
            | Self::Unspecified(_)
            | Self::PlatformUnavailable => Stage::Dispatch,
            Self::ServiceDisabled | Self::Config(_) | Self::Io(_) | Self::Serialization(_) => {
                Stage::Service
            }
        }
    }

    pub fn fault_side(&self) -> FaultSide {
        match self.stage() {
            Stage::Validation | Stage::FormatSelection => FaultSide::Request,
            Stage::Render | Stage::Dispatch => FaultSide::Delivery,
            Stage::Service => FaultSide::Service,
        }
    }

    /// Build the delivery error matching a failed dispatch.
    pub fn from_failure(reason: FailureReason, detail: String) -> Self {
        match reason {
            FailureReason::Timeout => Self::Timeout(detail),
            FailureReason::ConnectionRefused => Self::ConnectionRefused(detail),
            FailureReason::TransportError => Self::Transport(detail),
            FailureReason::Unspecified => Self::Unspecified(detail),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LabelwerkError>;
