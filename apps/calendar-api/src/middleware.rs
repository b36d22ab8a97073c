//! Request logging middleware.

use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;
use std::time::Instant;
use tracing::info;

/// Log one line per handled request: client IP, method, path, protocol
/// version, status, latency, and user agent.
///
/// The client IP honors `X-Real-IP`, then the first entry of
/// `X-Forwarded-For`, then falls back to the peer address.
pub async fn log_requests(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();
    let client_ip = client_ip(&request, addr);
    let user_agent = request
        .headers()
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let response = next.run(request).await;

    info!(
        client = %client_ip,
        method = %method,
        path = %uri,
        version = ?version,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        user_agent = %user_agent,
        "Request handled"
    );

    response
}

fn client_ip(request: &Request, peer: SocketAddr) -> String {
    let headers = request.headers();

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        return real_ip.to_string();
    }

    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            return first.trim().to_string();
        }
    }

    peer.to_string()
}
