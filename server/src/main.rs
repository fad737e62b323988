mod api;
mod config;
mod data;
#[cfg(feature = "mysql")]
mod db;
mod models;
#[cfg(feature = "mysql")]
mod raw_sql;
mod resources;
mod schema;
mod services;
mod storage;
mod telemetry;
mod types;

use anyhow::Context;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware;
use axum::Router;
use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::env;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use utoipa_swagger_ui::SwaggerUi;

use config::Config;
use services::Services;
use telemetry::CorrelationId;

/// Application state shared across all handlers
pub type AppState = Arc<Services>;

const DEFAULT_SERVICE_NAME: &str = "recipe-server";

/// Initialize telemetry with optional OpenTelemetry export.
/// If OTEL_EXPORTER_OTLP_ENDPOINT is set and reachable, traces and logs are
/// sent to the collector. Otherwise, only console logging is used.
fn init_telemetry() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let Some(endpoint) = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok() else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
        tracing::debug!("OTEL_EXPORTER_OTLP_ENDPOINT not set, using console logging only");
        return Ok(());
    };

    let host_port = endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://");

    // Quick TCP check to see if the collector is up (resolve hostname first)
    let is_reachable = host_port
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok())
        .unwrap_or(false);

    if !is_reachable {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
        tracing::info!(
            "OpenTelemetry endpoint {} not reachable, using console logging only",
            endpoint
        );
        return Ok(());
    }

    let service_name =
        env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string());

    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(service_name.clone())
        .build();

    let trace_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .build()
        .context("Failed to create OTLP trace exporter")?;

    let trace_provider = SdkTracerProvider::builder()
        .with_batch_exporter(trace_exporter)
        .with_resource(resource.clone())
        .build();

    let tracer = trace_provider.tracer(DEFAULT_SERVICE_NAME);
    opentelemetry::global::set_tracer_provider(trace_provider);

    let otel_trace_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    let log_exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .build()
        .context("Failed to create OTLP log exporter")?;

    let log_provider = SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter)
        .with_resource(resource)
        .build();

    let otel_log_layer = OpenTelemetryTracingBridge::new(&log_provider);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_trace_layer)
        .with(otel_log_layer)
        .init();

    tracing::info!(
        "OpenTelemetry enabled, exporting traces and logs to {} as {}",
        endpoint,
        service_name
    );
    Ok(())
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    Router::new()
        .merge(api::root::router())
        .nest("/recipes_sections", api::recipes::router())
        .nest("/ingredients", api::ingredients::router())
        .nest("/instructions", api::instructions::router())
        .merge(api::upload::router())
        .merge(swagger_ui)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());
                    let correlation_id = request
                        .extensions()
                        .get::<CorrelationId>()
                        .map(CorrelationId::as_str)
                        .unwrap_or_default();

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %matched_path,
                        correlation_id = %correlation_id,
                    )
                })
                .on_request(|_request: &Request<_>, _span: &Span| {})
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, _span: &Span| {
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                )
                .on_failure(
                    |error: tower_http::classify::ServerErrorsFailureClass,
                     latency: Duration,
                     _span: &Span| {
                        tracing::error!(
                            error = %error,
                            latency_ms = %latency.as_millis(),
                            "request failed"
                        );
                    },
                ),
        )
        // Outermost, so the id exists before the span is created.
        .layer(middleware::from_fn(telemetry::correlation_id_middleware))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        let spec = api::openapi()
            .to_pretty_json()
            .context("Failed to render OpenAPI document")?;
        println!("{}", spec);
        return Ok(());
    }

    init_telemetry()?;

    let config = Config::from_env().context("Invalid configuration")?;
    let state: AppState = Arc::new(Services::from_config(&config)?);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    let local_addr = listener.local_addr()?;

    tracing::info!("Server listening on {}", local_addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", local_addr);
    tracing::info!(
        "OpenAPI spec available at http://{}/api-docs/openapi.json",
        local_addr
    );

    axum::serve(listener, app(state))
        .await
        .context("Server error")?;
    Ok(())
}
