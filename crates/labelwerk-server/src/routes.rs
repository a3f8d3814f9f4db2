// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Route handlers.
//
// The query-string names (`IP`, `SN`, `Model_APN`, ...) are the ones the
// browser label tool already sends; they are decoded here and never leak
// further in.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::types::{ConnectionMode, LabelSizeQuery, PrintJobRequest, PrintReceipt};

use crate::AppState;
use crate::error::ApiResult;

/// Success body: `{"status":"success", ...receipt}`.
#[derive(Debug, Serialize)]
pub struct PrintSuccess {
    status: &'static str,
    #[serde(flatten)]
    receipt: PrintReceipt,
}

impl From<PrintReceipt> for PrintSuccess {
    fn from(receipt: PrintReceipt) -> Self {
        Self {
            status: "success",
            receipt,
        }
    }
}

// ---------------------------------------------------------------------------
// Query / body decoding
// ---------------------------------------------------------------------------

/// `GET /label` parameters.
#[derive(Debug, Default, Deserialize)]
pub struct LabelParams {
    #[serde(rename = "IP")]
    pub ip: Option<String>,
    #[serde(rename = "SN")]
    pub serial_number: Option<String>,
    #[serde(rename = "MODEL")]
    pub model: Option<String>,
    #[serde(rename = "Model_APN")]
    pub model_apn: Option<String>,
    #[serde(rename = "TYPE")]
    pub type_label: Option<String>,
    #[serde(rename = "MODE")]
    pub mode: Option<String>,
    #[serde(rename = "FORMAT")]
    pub format: Option<String>,
    #[serde(rename = "USER")]
    pub user: Option<String>,
}

impl LabelParams {
    /// `MODE` defaults to IP. Missing `IP`/`SN` are left empty for
    /// request validation to reject.
    pub fn into_request(self) -> Result<PrintJobRequest> {
        let mode = match self.mode.as_deref().map(str::trim) {
            None | Some("") => ConnectionMode::Network,
            Some(mode) => mode.parse()?,
        };
        let mut request = PrintJobRequest::new(
            mode,
            self.ip.unwrap_or_default(),
            self.serial_number.unwrap_or_default(),
        );
        request.model = self.model;
        request.model_aux_part_number = self.model_apn;
        request.type_label = self.type_label;
        request.operator_name = self.user;
        request.format_hint = self.format;
        Ok(request)
    }
}

/// `POST /label/raw` body.
#[derive(Debug, Deserialize)]
pub struct RawLabelBody {
    #[serde(rename = "printerIP", default)]
    pub printer_ip: Option<String>,
    #[serde(rename = "printerModel", default)]
    pub printer_model: Option<String>,
    #[serde(rename = "labelLayout", default)]
    pub label_layout: Option<String>,
}

impl RawLabelBody {
    /// The printer IP wins over the model name.
    fn target(&self) -> Option<(ConnectionMode, &str)> {
        fn non_blank(v: &Option<String>) -> Option<&str> {
            v.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }
        non_blank(&self.printer_ip)
            .map(|ip| (ConnectionMode::Network, ip))
            .or_else(|| non_blank(&self.printer_model).map(|m| (ConnectionMode::Usb, m)))
    }
}

/// `GET /getLabelSize` parameters.
#[derive(Debug, Default, Deserialize)]
pub struct LabelSizeParams {
    #[serde(rename = "printerIP")]
    pub printer_ip: Option<String>,
    #[serde(rename = "MODE")]
    pub mode: Option<String>,
    #[serde(rename = "FORMAT")]
    pub format: Option<String>,
}

impl From<LabelSizeParams> for LabelSizeQuery {
    /// Advisory lookup: an unrecognised mode is treated as absent.
    fn from(params: LabelSizeParams) -> Self {
        Self {
            mode: params.mode.as_deref().and_then(|m| m.parse().ok()),
            destination: params.printer_ip,
            format_hint: params.format,
        }
    }
}

fn bad_query(rejection: QueryRejection) -> LabelwerkError {
    LabelwerkError::Validation(rejection.body_text())
}

fn bad_json(rejection: JsonRejection) -> LabelwerkError {
    LabelwerkError::Validation(rejection.body_text())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "running",
        "accepting": state.service.is_accepting(),
        "timestamp": Local::now().to_rfc3339(),
    }))
}

pub async fn print_label_query(
    State(state): State<AppState>,
    params: std::result::Result<Query<LabelParams>, QueryRejection>,
) -> ApiResult<Json<PrintSuccess>> {
    let Query(params) = params.map_err(bad_query)?;
    let request = params.into_request()?;
    let receipt = state.coordinator.handle(&request).await?;
    Ok(Json(receipt.into()))
}

pub async fn print_label_json(
    State(state): State<AppState>,
    body: std::result::Result<Json<PrintJobRequest>, JsonRejection>,
) -> ApiResult<Json<PrintSuccess>> {
    let Json(request) = body.map_err(bad_json)?;
    let receipt = state.coordinator.handle(&request).await?;
    Ok(Json(receipt.into()))
}

pub async fn print_raw_layout(
    State(state): State<AppState>,
    body: std::result::Result<Json<RawLabelBody>, JsonRejection>,
) -> ApiResult<Json<PrintSuccess>> {
    let Json(body) = body.map_err(bad_json)?;

    let layout = body
        .label_layout
        .as_deref()
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| LabelwerkError::Validation("No label layout provided".into()))?;
    let (mode, destination) = body
        .target()
        .ok_or_else(|| LabelwerkError::Validation("No printer specified".into()))?;

    let receipt = state
        .coordinator
        .handle_raw(mode, destination, layout)
        .await?;
    Ok(Json(receipt.into()))
}

pub async fn label_size(
    State(state): State<AppState>,
    params: std::result::Result<Query<LabelSizeParams>, QueryRejection>,
) -> Json<Value> {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    let size = state.coordinator.label_size(&params.into());
    Json(json!({ "labelSize": size }))
}

pub async fn start_service(State(state): State<AppState>) -> Json<Value> {
    state.service.start();
    info!("service started over HTTP");
    Json(json!({ "status": "success", "accepting": true }))
}

pub async fn stop_service(State(state): State<AppState>) -> Json<Value> {
    state.service.stop();
    info!("service stopped over HTTP");
    Json(json!({ "status": "success", "accepting": false }))
}
