// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP error responses.
//
// Every failure leaves the service as the same JSON shape, so the browser
// tool can show `message` and `hint` without caring which stage failed.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, warn};

use labelwerk_core::error::{FaultSide, LabelwerkError, Stage};
use labelwerk_core::human_errors::{Severity, humanize_error};

/// A pipeline error on its way to the client.
#[derive(Debug)]
pub struct ApiError(pub LabelwerkError);

impl From<LabelwerkError> for ApiError {
    fn from(err: LabelwerkError) -> Self {
        Self(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
    stage: Stage,
    summary: String,
    hint: String,
    severity: Severity,
    fault: FaultSide,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match (&self.0, self.0.fault_side()) {
            (LabelwerkError::ServiceDisabled, _) => StatusCode::SERVICE_UNAVAILABLE,
            (_, FaultSide::Request) => StatusCode::BAD_REQUEST,
            (_, FaultSide::Delivery | FaultSide::Service) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self.0, stage = ?self.0.stage(), "request failed");
        } else {
            warn!(error = %self.0, stage = ?self.0.stage(), "request rejected");
        }

        let human = humanize_error(&self.0);
        let body = ErrorBody {
            status: "error",
            message: self.0.to_string(),
            stage: self.0.stage(),
            summary: human.message,
            hint: human.suggestion,
            severity: human.severity,
            fault: human.fault,
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
