use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;

use axum::extract::{Path, Request, State};
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use contracts::{
    ApiError, DashboardAggregates, DemoConfig, EnvelopeStatus, ErrorCode, ScenarioFlags,
    ScenarioKind, SignatureEnvelope, StoreError, SCHEMA_VERSION_V1, STORAGE_NAME,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::{ConsoleApi, PersistenceError};

const DEFAULT_SQLITE_PATH: &str = "imobgest_demo.sqlite";

/// Fixed boleto barcode returned by the payment mock.
const PAYMENT_BARCODE: &str = "00190.00009 01234.567890 12345.678904 5 67890000012345";

include!("error.rs");
include!("state.rs");
include!("routes/console.rs");
include!("routes/collaborators.rs");

pub async fn serve(
    addr: SocketAddr,
    config: DemoConfig,
    sqlite_path: Option<String>,
) -> Result<(), ServerError> {
    let mut api = ConsoleApi::from_config(config)?;
    let path = sqlite_path
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(default_sqlite_path);
    api.attach_sqlite_store(path)?;

    let state = AppState::new(api);
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    log::info!("console mock server listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(get_health))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/scenarios/{flag}/toggle", post(toggle_scenario))
        .route("/api/invoices/generate", post(generate_invoices))
        .route("/api/clicksign/envelopes", post(create_envelope))
        .route("/api/clicksign/envelopes/{id}/send", post(send_envelope))
        .route("/api/clicksign/envelopes/{id}/sign", post(sign_envelope))
        .route("/api/clicksign/envelopes/{id}/status", get(envelope_status))
        .route("/api/payments/emit", post(payments_emit))
        .route("/api/payments/webhook", post(payments_webhook))
        .route("/api/push", post(push_send))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}

fn apply_cors_headers(headers: &mut axum::http::HeaderMap) {
    headers.insert(
        HeaderName::from_static("access-control-allow-origin"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static("GET,POST,OPTIONS,PUT,PATCH,DELETE"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-max-age"),
        HeaderValue::from_static("3600"),
    );
}

fn default_sqlite_path() -> String {
    std::env::var("IMOBGEST_SQLITE_PATH")
        .ok()
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string())
}

#[cfg(test)]
mod tests;
