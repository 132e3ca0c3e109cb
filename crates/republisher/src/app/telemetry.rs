//! # Logging and Span Export
//!
//! All output goes through `tracing`. Console logging via
//! `tracing_subscriber::fmt` is always on and honours `RUST_LOG` (default
//! `info`).
//!
//! ## Feature matrix
//!
//! - `stdout`: Additionally exports spans through OpenTelemetry to stdout.
//!   Each republish worker runs inside a `republish` span carrying the UUID,
//!   so a run produces one span per identifier.
//!
//! ## Example usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --features stdout -- --uuids uuids.json ...
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "stdout")]
use opentelemetry::{InstrumentationScope, KeyValue, trace::TracerProvider};
#[cfg(feature = "stdout")]
use opentelemetry_sdk::{Resource, trace as sdktrace};
#[cfg(feature = "stdout")]
use opentelemetry_semantic_conventions as semvcns;

/// Handles that must outlive the run so buffered spans can be flushed.
pub struct TelemetryProviders {
    #[cfg(feature = "stdout")]
    pub tracer_provider: sdktrace::SdkTracerProvider,
}

impl TelemetryProviders {
    /// Flushes and shuts down exporters. Errors are printed rather than logged
    /// since the subscriber may already be unusable.
    pub fn shutdown(self) {
        #[cfg(feature = "stdout")]
        {
            if let Err(err) = self.tracer_provider.force_flush() {
                eprintln!("Error flushing traces: {err:#?}");
            }
            if let Err(err) = self.tracer_provider.shutdown() {
                eprintln!("Error shutting down tracer: {err:#?}");
            }
        }
    }
}

pub fn init_telemetry() -> anyhow::Result<TelemetryProviders> {
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true),
        );

    #[cfg(feature = "stdout")]
    let tracer_provider = init_tracer();

    #[cfg(feature = "stdout")]
    let registry = {
        let scope = InstrumentationScope::builder("republisher")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_schema_url(semvcns::SCHEMA_URL)
            .build();
        opentelemetry::global::set_tracer_provider(tracer_provider.clone());
        registry.with(
            tracing_opentelemetry::layer()
                .with_tracer(tracer_provider.tracer_with_scope(scope))
                .with_error_records_to_exceptions(true),
        )
    };

    registry.try_init()?;

    Ok(TelemetryProviders {
        #[cfg(feature = "stdout")]
        tracer_provider,
    })
}

#[cfg(feature = "stdout")]
fn resource() -> Resource {
    Resource::builder()
        .with_service_name("republisher")
        .with_schema_url(
            [KeyValue::new(
                semvcns::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            )],
            semvcns::SCHEMA_URL,
        )
        .build()
}

#[cfg(feature = "stdout")]
fn init_tracer() -> sdktrace::SdkTracerProvider {
    use opentelemetry_stdout::SpanExporter;

    let batch = sdktrace::BatchSpanProcessor::builder(SpanExporter::default())
        .with_batch_config(
            sdktrace::BatchConfigBuilder::default()
                .with_scheduled_delay(std::time::Duration::from_secs(5))
                .with_max_queue_size(2048)
                .build(),
        )
        .build();

    sdktrace::SdkTracerProvider::builder()
        .with_resource(resource())
        .with_span_processor(batch)
        .build()
}
