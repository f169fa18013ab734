//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::MetricsConfig;
use crate::domain::action_token::AccountAction;

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap_or_else(|e| panic!("invalid uuid pattern: {}", e))
});

static NUMERIC_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap_or_else(|e| panic!("invalid id pattern: {}", e)));

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the Prometheus recorder
///
/// Returns `None` when metrics are disabled or a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("utopia_auth_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!(path = %config.path, "Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize Prometheus metrics");
            None
        }
    }
}

pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

pub fn record_action_token_issued(action: AccountAction) {
    counter!("action_tokens_issued_total", "action" => action.as_str()).increment(1);
}

pub fn record_action_token_consumed(action: AccountAction) {
    counter!("action_tokens_consumed_total", "action" => action.as_str()).increment(1);
}

pub fn record_jwt_issued() {
    counter!("jwt_issued_total").increment(1);
}

/// `reason` is a short fixed label such as `bad_credentials` or `expired`
pub fn record_authentication_failure(reason: &'static str) {
    counter!("authentication_failures_total", "reason" => reason).increment(1);
}

/// Replace ids in a path so label cardinality stays bounded
fn sanitize_path(path: &str) -> String {
    let path = UUID_SEGMENT.replace_all(path, "{id}");
    let path = NUMERIC_SEGMENT.replace_all(&path, "/{id}$1");

    path.chars().take(64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_uuid() {
        let path = "/api/v0.1/accounts/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(sanitize_path(path), "/api/v0.1/accounts/{id}");
    }

    #[test]
    fn test_sanitize_path_token_segment() {
        let path = "/api/v0.1/accounts/confirm/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(sanitize_path(path), "/api/v0.1/accounts/confirm/{id}");
    }

    #[test]
    fn test_sanitize_path_numeric_id() {
        assert_eq!(sanitize_path("/items/123/detail"), "/items/{id}/detail");
    }

    #[test]
    fn test_sanitize_path_truncates() {
        let long = format!("/{}", "a".repeat(100));
        assert_eq!(sanitize_path(&long).len(), 64);
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_action_token_issued(AccountAction::Deletion);
        record_jwt_issued();
        record_authentication_failure("bad_credentials");
    }
}
