//! OpenTelemetry tracer provider and tracing-subscriber initialization.
//!
//! Logs always go to stdout as JSON. With export enabled, spans are also
//! bridged to an OTLP collector.

use opentelemetry_otlp::WithExportConfig as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::ObservabilityConfig;

/// Build the log filter: `RUST_LOG` wins over `LOG_LEVEL`.
fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{log_level},tower_http=warn,sqlx=warn,hyper=off,tonic=off,h2=off"
        ))
    })
}

/// Install the global `tracing` subscriber.
///
/// Returns the tracer provider when OTLP span export is active so the caller
/// can shut it down on exit.
pub fn init(config: &ObservabilityConfig, log_level: &str) -> Option<SdkTracerProvider> {
    let filter = env_filter(log_level);

    if !config.enabled {
        Registry::default()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
        return None;
    }

    let span_exporter = match opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build()
    {
        Ok(exporter) => exporter,
        Err(e) => {
            Registry::default()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
            tracing::warn!(error = %e, "OTLP span exporter unavailable, traces disabled");
            return None;
        }
    };

    let tracer_provider = SdkTracerProvider::builder()
        .with_resource(super::metrics::build_resource(config))
        .with_batch_exporter(span_exporter)
        .build();

    let otel_trace_layer = tracing_opentelemetry::layer().with_tracer(
        opentelemetry::trace::TracerProvider::tracer(&tracer_provider, "mi-server"),
    );

    Registry::default()
        .with(filter)
        .with(otel_trace_layer)
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    Some(tracer_provider)
}
