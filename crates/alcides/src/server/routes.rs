use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use tracing::{error, info, warn};

use super::Relay;
use crate::alerts::{self, AlertBatch};

pub async fn status(State(relay): State<Arc<Relay>>) -> Response {
    match relay.runner.ping().await {
        Ok(()) => {
            info!("Status checks OK");
            relay.metrics.status_check(true);
            (StatusCode::OK, "Status checks OK").into_response()
        }
        Err(e) => {
            error!(error = %e, "Error contacting rundeck");
            relay.metrics.status_check(false);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Alertmanager webhook receiver.
///
/// The body is decoded before the caller is authenticated, so malformed JSON
/// is a 400 even without credentials. Every request that decodes gets an
/// empty 200, whether or not authentication succeeded.
pub async fn receive_alerts(
    State(relay): State<Arc<Relay>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let batch: AlertBatch = match serde_json::from_slice::<Option<AlertBatch>>(&body) {
        Ok(batch) => batch.unwrap_or_default(),
        Err(e) => {
            error!(error = %e, "Error decoding message");
            relay.metrics.batch_invalid();
            return (StatusCode::BAD_REQUEST, "invalid request body").into_response();
        }
    };

    if let Err(e) = relay.credential.verify(&headers) {
        warn!(reason = %e, receiver = %batch.receiver, "Rejected unauthenticated alert batch");
        relay.metrics.batch_unauthorized();
        return StatusCode::OK.into_response();
    }

    relay.metrics.batch_accepted();
    info!(
        receiver = %batch.receiver,
        status = %batch.status,
        group_key = %batch.group_key,
        alerts = batch.alerts.len(),
        "Received alert batch"
    );

    let summary = alerts::dispatch(relay.runner.as_ref(), &relay.metrics, &batch).await;
    info!(
        triggered = summary.triggered,
        failed = summary.failed,
        skipped = summary.skipped,
        "Alert batch dispatched"
    );

    StatusCode::OK.into_response()
}

pub async fn unsupported_method() -> Response {
    (StatusCode::BAD_REQUEST, "unsupported HTTP method").into_response()
}

pub async fn metrics(State(relay): State<Arc<Relay>>) -> Response {
    match relay.metrics.gather() {
        Ok(body) => body.into_response(),
        Err(e) => {
            error!(error = %e, "Error encoding metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
