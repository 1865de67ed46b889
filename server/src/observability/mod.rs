//! Observability: structured logging, OpenTelemetry traces and metrics.
//!
//! # Quick start
//!
//! ```rust,no_run
//! # use mi_server::{config::Config, observability};
//! # let config = Config::default_for_test();
//! // In main(), before any logging:
//! let _otel_guard = observability::init(&config);
//! // `_otel_guard` must stay alive until the end of `main`.
//! ```

pub mod http;
pub mod metrics;
pub mod tracing;

use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;

use crate::config::Config;

/// RAII guard that flushes and shuts down the `OTel` providers when dropped.
///
/// Bind it to a variable that lives until the end of `main`; dropping it early
/// stops export while the server is still running.
#[must_use = "dropping the guard shuts down telemetry export"]
pub struct OtelGuard {
    tracer_provider: Option<SdkTracerProvider>,
    meter_provider: Option<SdkMeterProvider>,
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(e) = provider.shutdown() {
                ::tracing::warn!(error = %e, "OTel tracer provider shutdown error");
            }
        }
        if let Some(provider) = self.meter_provider.take() {
            if let Err(e) = provider.shutdown() {
                ::tracing::warn!(error = %e, "OTel meter provider shutdown error");
            }
        }
    }
}

/// Initialise logging, tracing and metrics.
///
/// Tracing is installed first so that warnings from metric initialisation
/// are captured.
pub fn init(config: &Config) -> OtelGuard {
    let tracer_provider = tracing::init(&config.observability, &config.log_level);
    let meter_provider = metrics::init(&config.observability);
    metrics::register_metrics();

    OtelGuard {
        tracer_provider,
        meter_provider,
    }
}
