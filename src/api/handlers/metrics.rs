//! Prometheus metrics endpoint and request counter middleware

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics_exporter_prometheus::PrometheusHandle;

/// State for the metrics endpoint
#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
}

/// Prometheus scrape endpoint (text format)
pub async fn metrics_handler(State(state): State<MetricsState>) -> Response {
    state.handle.render().into_response()
}

/// Count every request by method and response status
pub async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics::counter!("subshare_http_requests_total", "method" => method.clone(), "status" => status)
        .increment(1);
    metrics::histogram!("subshare_http_request_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());

    response
}
