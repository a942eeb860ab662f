//! HTTP control surface using Axum.
//!
//! Every route maps 1:1 to a scanner or history operation; none of them
//! hold the scan guard while serving reads, so status and history stay
//! responsive during a slow price fetch.

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::core::scanner::Scanner;
use crate::error::ScanError;
use crate::metrics::Metrics;
use crate::models::SessionLevels;
use crate::services::notifier::Notifier;
use crate::signals::history::SignalHistory;

const DEFAULT_SIGNALS_LIMIT: usize = 50;

#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<Scanner>,
    pub history: Arc<SignalHistory>,
    pub notifier: Arc<dyn Notifier>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Json(json!({
        "status": "healthy",
        "uptime_seconds": uptime_seconds,
        "service": "levelwatch-scanner"
    }))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();

    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();

    state.metrics.http_requests_in_flight.dec();
    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis() as u64,
            "HTTP request error"
        );
    }

    response
}

fn error_response(err: ScanError) -> (StatusCode, Json<Value>) {
    let status = match err {
        ScanError::ScanInProgress => StatusCode::CONFLICT,
        ScanError::SourceUnavailable(_) => StatusCode::BAD_GATEWAY,
        ScanError::LevelsNotReady => StatusCode::SERVICE_UNAVAILABLE,
        // Delivery failures surface as warnings, not request failures.
        ScanError::DeliveryFailed(_) => StatusCode::OK,
    };
    (
        status,
        Json(json!({
            "success": false,
            "error": err.code(),
            "message": err.to_string()
        })),
    )
}

async fn get_status(State(state): State<AppState>) -> Json<Value> {
    let status = state.scanner.status().await;
    Json(json!(status))
}

/// Trigger one scan cycle out of band and report the outcome.
async fn trigger_scan(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.scanner.run_manual().await {
        Ok(outcome) => {
            let message = match &outcome.signal {
                Some(signal) => {
                    format!("{} signal generated at {:.2}", signal.direction, signal.price)
                }
                None => "Scan complete. No new signal.".to_string(),
            };
            Ok(Json(json!({
                "success": true,
                "message": message,
                "signal": outcome.signal,
                "delivery_failed": outcome.delivery_failed
            })))
        }
        Err(e) => Err(error_response(e)),
    }
}

#[derive(Debug, Deserialize)]
struct SignalsQuery {
    limit: Option<usize>,
}

async fn list_signals(
    State(state): State<AppState>,
    Query(params): Query<SignalsQuery>,
) -> Json<Value> {
    let signals = state
        .history
        .recent(params.limit.unwrap_or(DEFAULT_SIGNALS_LIMIT))
        .await;
    Json(json!({
        "count": signals.len(),
        "signals": signals
    }))
}

async fn refresh_levels(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.scanner.refresh_levels().await {
        Ok(levels) => Ok(Json(json!({
            "success": true,
            "message": "Reference levels refreshed",
            "levels": levels
        }))),
        Err(e) => Err(error_response(e)),
    }
}

#[derive(Debug, Deserialize)]
struct PinLevelsRequest {
    high: f64,
    low: f64,
    as_of: Option<NaiveDate>,
}

/// Manually pin previous-session levels, bypassing the price source.
async fn pin_levels(
    State(state): State<AppState>,
    Json(request): Json<PinLevelsRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let session = SessionLevels {
        high: request.high,
        low: request.low,
        as_of: request
            .as_of
            .unwrap_or_else(|| chrono::Utc::now().date_naive()),
    };

    if !session.is_ordered() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "success": false,
                "error": "INVALID_LEVELS",
                "message": format!("high {} must not be below low {}", session.high, session.low)
            })),
        ));
    }

    match state.scanner.pin_levels(session).await {
        Ok(levels) => Ok(Json(json!({
            "success": true,
            "message": "Reference levels pinned",
            "levels": levels
        }))),
        Err(e) => Err(error_response(e)),
    }
}

async fn test_notification(State(state): State<AppState>) -> Json<Value> {
    match state.notifier.send_test().await {
        Ok(()) => Json(json!({
            "success": true,
            "message": "Test alert delivered"
        })),
        Err(e) => Json(json!({
            "success": false,
            "error": e.code(),
            "message": e.to_string()
        })),
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/status", get(get_status))
        .route("/api/scan", post(trigger_scan))
        .route("/api/signals", get(list_signals))
        .route("/api/refresh-levels", post(refresh_levels))
        .route("/api/levels", post(pin_levels))
        .route("/api/test-notification", post(test_notification))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(
    port: u16,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port, "HTTP server listening on port {}", port);
    axum::serve(listener, app).await?;

    Ok(())
}
