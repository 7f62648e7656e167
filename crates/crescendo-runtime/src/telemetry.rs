//! Tracing and telemetry initialisation for the robot process.
//!
//! Call [`init_tracing`] once at process startup to wire up the `tracing`
//! subscriber with an optional OTLP span exporter, then call [`publish`] once
//! per tick to emit the dashboard values.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | OTLP collector base URL (e.g. `http://localhost:4318`). When set the OTLP HTTP exporter is activated. |
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `CRESCENDO_LOG_FORMAT=json` | Emit newline-delimited JSON logs. |
//! | `CRESCENDO_TELEMETRY=off` | Silence the per-tick [`TELEMETRY_TARGET`] events. |
//!
//! Per-tick telemetry stays at `info` even when `RUST_LOG` is stricter
//! (e.g. `RUST_LOG=warn`), unless `RUST_LOG` names the target itself.
//!
//! # Example
//!
//! ```rust,no_run
//! // Hold the guard for the entire lifetime of the process.
//! let _guard = crescendo_runtime::telemetry::init_tracing("crescendo");
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crescendo_types::TelemetryFrame;

/// `tracing` target carrying the per-tick telemetry events.
pub const TELEMETRY_TARGET: &str = "crescendo::telemetry";

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber with an optional OTLP exporter.
///
/// When `OTEL_EXPORTER_OTLP_ENDPOINT` is set an OTLP/HTTP span exporter is
/// configured; otherwise only the console formatter is installed.
///
/// The returned [`TracerProviderGuard`] **must** be held for the lifetime of
/// the process; dropping it flushes all pending span batches.
pub fn init_tracing(service_name: &str) -> TracerProviderGuard {
    let directives = filter_directives(
        std::env::var("RUST_LOG").ok().as_deref(),
        std::env::var("CRESCENDO_TELEMETRY").as_deref() != Ok("off"),
    );
    let env_filter = EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("[crescendo] invalid log filter {directives:?}: {e}; using \"info\"");
        EnvFilter::new("info")
    });

    let fmt_layer = if std::env::var("CRESCENDO_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().compact().boxed()
    };

    let provider = build_provider(service_name);
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("crescendo")));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(otel_layer)
        .with(env_filter)
        .init();

    TracerProviderGuard(provider)
}

/// Build the `EnvFilter` directives from `RUST_LOG` (default `info`),
/// pinning [`TELEMETRY_TARGET`] to `info` (or `off`) unless the caller
/// already set it.
fn filter_directives(rust_log: Option<&str>, telemetry_enabled: bool) -> String {
    let base = rust_log
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("info");
    if base.contains(TELEMETRY_TARGET) {
        return base.to_string();
    }
    let level = if telemetry_enabled { "info" } else { "off" };
    format!("{base},{TELEMETRY_TARGET}={level}")
}

/// Publish one tick's dashboard values as a structured event on
/// [`TELEMETRY_TARGET`].
pub fn publish(frame: &TelemetryFrame) {
    info!(
        target: TELEMETRY_TARGET,
        encoder_position = frame.encoder_position,
        angle_degrees = frame.angle_degrees,
        motor_output = frame.motor_output,
        target_range_meters = frame.target_range_meters,
        "tick"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// RAII guard
// ─────────────────────────────────────────────────────────────────────────────

/// RAII guard that shuts down the OTel [`SdkTracerProvider`] on drop.
pub struct TracerProviderGuard(Option<SdkTracerProvider>);

impl Drop for TracerProviderGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.0.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("[crescendo] OpenTelemetry provider shutdown error: {e}");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Build an [`SdkTracerProvider`] when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
///
/// Returns `None` when the env-var is absent or the exporter cannot be
/// initialised.
fn build_provider(service_name: &str) -> Option<SdkTracerProvider> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| eprintln!("[crescendo] OTLP exporter init failed: {e}"))
        .ok()?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    Some(
        SdkTracerProvider::builder()
            .with_resource(resource)
            // Synchronous export: the control loop's runtime is created after
            // tracing is initialised.
            .with_simple_exporter(exporter)
            .build(),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_provider_returns_none_without_endpoint() {
        // SAFETY: single-threaded test; no other thread reads this env-var.
        unsafe { std::env::remove_var("OTEL_EXPORTER_OTLP_ENDPOINT") };
        assert!(build_provider("test-service").is_none());
    }

    #[test]
    fn telemetry_target_survives_strict_filter() {
        assert_eq!(
            filter_directives(Some("warn"), true),
            "warn,crescendo::telemetry=info"
        );
        assert_eq!(
            filter_directives(None, true),
            "info,crescendo::telemetry=info"
        );
        assert_eq!(
            filter_directives(Some("  "), false),
            "info,crescendo::telemetry=off"
        );
    }

    #[test]
    fn explicit_telemetry_directive_is_left_alone() {
        let directives = filter_directives(Some("debug,crescendo::telemetry=warn"), true);
        assert_eq!(directives, "debug,crescendo::telemetry=warn");
    }

    #[test]
    fn filter_directives_parse() {
        for directives in [
            filter_directives(Some("warn"), true),
            filter_directives(None, false),
        ] {
            assert!(EnvFilter::try_new(&directives).is_ok(), "{directives}");
        }
    }

    #[test]
    fn tracer_provider_guard_drop_with_none_is_safe() {
        let guard = TracerProviderGuard(None);
        drop(guard);
    }

    #[test]
    fn publish_without_subscriber_is_a_noop() {
        publish(&TelemetryFrame::default());
    }
}
