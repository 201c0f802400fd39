// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the lead relay service.
//!
//! Submission outcomes are reported inside the JSON body (`code` 200, 401
//! or 500) with HTTP 200. Only malformed or invalid requests get a 400.

use crate::config::Config;
use crate::metrics::outcome;
use crate::models::{CustomerMessage, MessageResponse, SendParams};
use crate::service::LeadService;
use crate::validator::{LeadValidator, ValidationResult};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::{debug, error, info, warn, Level};

/// Shared application state.
pub struct AppState {
    pub service: LeadService,
    pub validator: LeadValidator,
    pub config: Config,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/api/dingtalk/send", post(send))
        .route("/api/dingtalk/send/customer", post(send_customer));

    if state.config.metrics.enabled {
        router = router.route(&state.config.metrics.path, get(metrics));
    }

    router.layer(request_log_layer()).with_state(state)
}

/// One INFO line per request: method, URI, status and latency in ms.
/// Bodies are not logged since they carry customer phone numbers.
pub fn request_log_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "lead-relay",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Forward free text to the robot. No validation, no rate limiting.
pub async fn send(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SendParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected send request");
            return (
                StatusCode::BAD_REQUEST,
                "Missing required parameter 'content'",
            )
                .into_response();
        }
    };

    debug!(len = params.content.len(), "Processing plain send");
    Json(state.service.send_raw(&params.content).await).into_response()
}

/// Validate, rate limit and forward a customer lead.
pub async fn send_customer(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CustomerMessage>, JsonRejection>,
) -> Response {
    let Json(msg) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable customer submission");
            state.service.metrics().record_submission(outcome::INVALID);
            return (StatusCode::BAD_REQUEST, "Invalid request body").into_response();
        }
    };

    let validation = state.validator.validate(&msg);
    if let ValidationResult::Invalid(_) = validation {
        let errors = validation.field_errors();
        info!(?errors, "Validation failed");
        state.service.metrics().record_submission(outcome::INVALID);
        return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
    }

    let response = MessageResponse::from(state.service.submit(&msg).await);
    debug!(code = response.code, "Customer submission handled");
    Json(response).into_response()
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.service.metrics().render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
