//! Server Configuration
//!
//! Loads configuration from environment variables once at startup. The result is
//! immutable and shared behind an `Arc`.

use anyhow::{Context, Result};
use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8000")
    pub bind_address: String,

    /// `SQLite` connection URL (e.g., "sqlite:///data/app.db")
    pub database_url: String,

    /// HMAC-SHA256 secret for inbound webhook signatures
    webhook_secret: Option<String>,

    /// Default log filter when `RUST_LOG` is not set
    pub log_level: String,

    /// OpenTelemetry export settings
    pub observability: ObservabilityConfig,
}

/// OTLP export settings.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Push traces and metrics to an OTLP collector
    pub enabled: bool,
    /// OTLP/gRPC endpoint
    pub otlp_endpoint: String,
    /// `service.name` resource attribute
    pub service_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let enabled = match env::var("OTEL_ENABLED") {
            Ok(v) => parse_bool(&v).context("OTEL_ENABLED must be a boolean")?,
            Err(_) => false,
        };

        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8000".into()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:///data/app.db".into()),
            webhook_secret: env::var("WEBHOOK_SECRET").ok(),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            observability: ObservabilityConfig {
                enabled,
                otlp_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                    .unwrap_or_else(|_| "http://localhost:4317".into()),
                service_name: env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "mi-server".into()),
            },
        })
    }

    /// Webhook secret, if configured and non-empty.
    #[must_use]
    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook_secret.as_deref().filter(|s| !s.is_empty())
    }

    /// Check if the webhook secret is configured.
    #[must_use]
    pub fn has_webhook_secret(&self) -> bool {
        self.webhook_secret().is_some()
    }

    /// Replace the webhook secret.
    #[must_use]
    pub fn with_webhook_secret(mut self, secret: Option<&str>) -> Self {
        self.webhook_secret = secret.map(str::to_owned);
        self
    }

    /// Create a default configuration for testing.
    ///
    /// Points at a throwaway database URL; tests override `database_url` with a
    /// temporary file.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".into(),
            database_url: "sqlite::memory:".into(),
            webhook_secret: Some("testsecret".into()),
            log_level: "info".into(),
            observability: ObservabilityConfig {
                enabled: false,
                otlp_endpoint: String::new(),
                service_name: "mi-server-test".into(),
            },
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
