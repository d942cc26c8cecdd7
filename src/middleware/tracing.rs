//! Request tracing middleware

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Log each request with its outcome and timing
pub async fn request_tracing(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client_ip = client_ip(request.headers());
    let start = Instant::now();

    tracing::debug!(method = %method, path = %path, client_ip = ?client_ip, "Request started");

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis() as u64;

    match classify(status) {
        Outcome::ServerError => tracing::error!(
            method = %method, path = %path, status = status.as_u16(), duration_ms,
            "Request completed with error"
        ),
        Outcome::ClientError => tracing::warn!(
            method = %method, path = %path, status = status.as_u16(), duration_ms,
            "Request completed with client error"
        ),
        Outcome::Ok => tracing::info!(
            method = %method, path = %path, status = status.as_u16(), duration_ms,
            "Request completed"
        ),
    }

    response
}

enum Outcome {
    Ok,
    ClientError,
    ServerError,
}

fn classify(status: StatusCode) -> Outcome {
    if status.is_server_error() {
        Outcome::ServerError
    } else if status.is_client_error() {
        Outcome::ClientError
    } else {
        Outcome::Ok
    }
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        })
}
