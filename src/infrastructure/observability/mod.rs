//! Observability infrastructure - Metrics

mod metrics;

pub use metrics::{
    create_metrics_router, init_metrics, record_action_token_consumed, record_action_token_issued,
    record_authentication_failure, record_http_request, record_jwt_issued, PrometheusMetrics,
};
