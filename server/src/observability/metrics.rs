//! Application metrics.
//!
//! Every recording goes to two sinks:
//! - a Prometheus registry rendered by `GET /metrics`, always on;
//! - OpenTelemetry instruments pushed over OTLP when export is enabled. These
//!   are registered once into `OnceLock`s and are no-ops until
//!   [`register_metrics`] has run.

use std::sync::{LazyLock, OnceLock};

use opentelemetry::metrics::{Counter, Histogram};
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig as _;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::Resource;
use prometheus::{Encoder as _, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

use crate::config::ObservabilityConfig;

/// Latency bucket bounds in milliseconds, shared by both sinks.
const LATENCY_BUCKETS_MS: [f64; 5] = [100.0, 500.0, 1000.0, 2000.0, 5000.0];

/// Scrape-side metrics and the registry that owns them.
struct ScrapeMetrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    request_latency_ms: prometheus::Histogram,
    webhook_requests_total: IntCounterVec,
}

impl ScrapeMetrics {
    fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests"),
            &["path", "status"],
        )
        .expect("metric creation failed");

        let request_latency_ms = prometheus::Histogram::with_opts(
            HistogramOpts::new("request_latency_ms", "Request latency in milliseconds")
                .buckets(LATENCY_BUCKETS_MS.to_vec()),
        )
        .expect("metric creation failed");

        let webhook_requests_total = IntCounterVec::new(
            Opts::new("webhook_requests_total", "Total webhook processing outcomes"),
            &["result"],
        )
        .expect("metric creation failed");

        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("metric registration failed");
        registry
            .register(Box::new(request_latency_ms.clone()))
            .expect("metric registration failed");
        registry
            .register(Box::new(webhook_requests_total.clone()))
            .expect("metric registration failed");

        Self {
            registry,
            http_requests_total,
            request_latency_ms,
            webhook_requests_total,
        }
    }
}

static SCRAPE: LazyLock<ScrapeMetrics> = LazyLock::new(ScrapeMetrics::new);

static HTTP_REQUESTS_TOTAL: OnceLock<Counter<u64>> = OnceLock::new();
static REQUEST_LATENCY_MS: OnceLock<Histogram<f64>> = OnceLock::new();
static WEBHOOK_REQUESTS_TOTAL: OnceLock<Counter<u64>> = OnceLock::new();
static WEBHOOK_PROCESSING_MS: OnceLock<Histogram<f64>> = OnceLock::new();

/// Build a [`Resource`] describing this service instance.
pub(super) fn build_resource(config: &ObservabilityConfig) -> Resource {
    let deployment_env =
        std::env::var("DEPLOYMENT_ENVIRONMENT").unwrap_or_else(|_| "local".to_owned());

    Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attributes([
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("deployment.environment", deployment_env),
        ])
        .build()
}

/// Initialise the global `OTel` [`SdkMeterProvider`].
///
/// Returns `None` when export is disabled; the global meter provider then stays
/// the no-op default and every recording call is free.
pub fn init(config: &ObservabilityConfig) -> Option<SdkMeterProvider> {
    if !config.enabled {
        return None;
    }

    let exporter = match opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build()
    {
        Ok(exporter) => exporter,
        Err(e) => {
            tracing::warn!(error = %e, "OTLP metric exporter unavailable, metrics disabled");
            return None;
        }
    };

    // Flush interval defaults to 60s; override with OTEL_METRIC_EXPORT_INTERVAL (ms)
    let provider = SdkMeterProvider::builder()
        .with_resource(build_resource(config))
        .with_periodic_exporter(exporter)
        .build();

    global::set_meter_provider(provider.clone());
    Some(provider)
}

/// Registers all application metrics. Call once at startup after `init()`.
pub fn register_metrics() {
    let meter = global::meter("mi-server");

    HTTP_REQUESTS_TOTAL.get_or_init(|| {
        meter
            .u64_counter("http_requests_total")
            .with_description("Total HTTP requests")
            .build()
    });

    REQUEST_LATENCY_MS.get_or_init(|| {
        meter
            .f64_histogram("request_latency_ms")
            .with_description("HTTP request latency in milliseconds")
            .with_unit("ms")
            .with_boundaries(LATENCY_BUCKETS_MS.to_vec())
            .build()
    });

    WEBHOOK_REQUESTS_TOTAL.get_or_init(|| {
        meter
            .u64_counter("webhook_requests_total")
            .with_description("Total webhook processing outcomes")
            .build()
    });

    WEBHOOK_PROCESSING_MS.get_or_init(|| {
        meter
            .f64_histogram("webhook_processing_ms")
            .with_description("Webhook pipeline time from first byte check to outcome")
            .with_unit("ms")
            .build()
    });
}

// ============================================================================
// Recording functions
// ============================================================================

/// Record a completed HTTP request.
pub fn record_http_request(path: &str, status: u16, latency_ms: f64) {
    let status_label = status.to_string();
    SCRAPE
        .http_requests_total
        .with_label_values(&[path, status_label.as_str()])
        .inc();
    SCRAPE.request_latency_ms.observe(latency_ms);

    if let Some(counter) = HTTP_REQUESTS_TOTAL.get() {
        counter.add(
            1,
            &[
                KeyValue::new("path", path.to_owned()),
                KeyValue::new("status", i64::from(status)),
            ],
        );
    }
    if let Some(histogram) = REQUEST_LATENCY_MS.get() {
        histogram.record(latency_ms, &[]);
    }
}

/// Record one webhook outcome (`created`, `duplicate`, `invalid_signature`,
/// `validation_error` or `storage_error`).
pub fn record_webhook_outcome(result: &'static str, latency_ms: f64) {
    SCRAPE
        .webhook_requests_total
        .with_label_values(&[result])
        .inc();

    if let Some(counter) = WEBHOOK_REQUESTS_TOTAL.get() {
        counter.add(1, &[KeyValue::new("result", result)]);
    }
    if let Some(histogram) = WEBHOOK_PROCESSING_MS.get() {
        histogram.record(latency_ms, &[KeyValue::new("result", result)]);
    }
}

/// Render the scrape registry in the Prometheus text exposition format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&SCRAPE.registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
