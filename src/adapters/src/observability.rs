use opentelemetry::KeyValue;
use opentelemetry::{global, trace::TraceError, trace::TracerProvider as _};
use opentelemetry_otlp::{new_exporter, SpanExporterBuilder, WithExportConfig};
use opentelemetry_sdk::{
    runtime,
    trace::{Config, TracerProvider},
    Resource,
};
use std::env;
use tracing::{subscriber::set_global_default, Subscriber};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn otlp_observability(
    service_name: &str,
    endpoint: String,
) -> Result<(TracerProvider, impl Subscriber + Send + Sync), TraceError> {
    let tonic_exporter = new_exporter().tonic().with_endpoint(endpoint);

    let provider: TracerProvider = TracerProvider::builder()
        .with_config(
            Config::default().with_resource(Resource::new(vec![KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                service_name.to_string(),
            )])),
        )
        .with_batch_exporter(
            SpanExporterBuilder::Tonic(tonic_exporter).build_span_exporter()?,
            runtime::Tokio,
        )
        .build();
    let tracer = provider.tracer(service_name.to_string());

    global::set_tracer_provider(provider.clone());

    let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);
    let formatting_layer = BunyanFormattingLayer::new(service_name.to_string(), std::io::stdout);

    Ok((
        provider,
        Registry::default()
            .with(env_filter())
            .with(JsonStorageLayer)
            .with(formatting_layer)
            .with(telemetry_layer),
    ))
}

pub fn log_observability(service_name: &str) -> impl Subscriber + Send + Sync {
    let formatting_layer = BunyanFormattingLayer::new(service_name.to_string(), std::io::stdout);

    Registry::default()
        .with(env_filter())
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Installs the global subscriber. Exports spans over OTLP when
/// `OTLP_ENDPOINT` is set, otherwise logs Bunyan JSON to stdout. The returned
/// provider must be kept alive for spans to be exported.
pub fn configure_instrumentation() -> Result<Option<TracerProvider>, anyhow::Error> {
    let service_name = env::var("SERVICE_NAME").unwrap_or("loyalty-ledger".to_string());

    match env::var("OTLP_ENDPOINT") {
        Ok(endpoint) => {
            let (provider, subscriber) = otlp_observability(&service_name, endpoint)?;
            set_global_default(subscriber)?;

            tracing::info!("Configured OTLP export for {}", service_name);

            Ok(Some(provider))
        }
        Err(_) => {
            set_global_default(log_observability(&service_name))?;

            tracing::info!("Configured log subscriber for {}", service_name);

            Ok(None)
        }
    }
}

pub fn shutdown_instrumentation() {
    global::shutdown_tracer_provider();
}
