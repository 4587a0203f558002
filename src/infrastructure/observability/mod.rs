//! Observability: Prometheus metrics

mod config;
mod metrics;

pub use config::{MetricsConfig, ObservabilityConfig};
pub use metrics::{
    PrometheusMetrics, create_metrics_router, init_metrics, record_http_request,
    record_llm_request, record_workflow_run, record_workflow_step,
};
