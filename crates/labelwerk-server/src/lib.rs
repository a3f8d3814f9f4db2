// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk Server: the HTTP surface the browser label tool talks to. Routes
// decode requests, call the print coordinator, and encode the outcome as
// JSON. All label logic lives in `labelwerk-print`.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use labelwerk_core::config::AppConfig;
use labelwerk_core::error::Result;
use labelwerk_print::{PrintCoordinator, ServiceSwitch};

pub mod error;
pub mod routes;

/// Shared handler state.
pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub coordinator: PrintCoordinator,
    /// Service lifecycle switch; the coordinator holds a clone.
    pub service: Arc<ServiceSwitch>,
}

impl AppStateInner {
    pub fn from_config(config: &AppConfig) -> Result<AppState> {
        let service = Arc::new(ServiceSwitch::new(config.accept_jobs_on_start));
        let coordinator = PrintCoordinator::from_config(config, Arc::clone(&service))?;
        Ok(Arc::new(Self {
            coordinator,
            service,
        }))
    }
}

/// Build the full router with permissive CORS and request tracing.
pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::health))
        .route("/label", get(routes::print_label_query).post(routes::print_label_json))
        .route("/label/raw", post(routes::print_raw_layout))
        .route("/getLabelSize", get(routes::label_size))
        .route("/service/start", post(routes::start_service))
        .route("/service/stop", post(routes::stop_service))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
