use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use scholaris_config::ServerConfig;

const LOG_DIR: &str = "storage/logs";

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let matched_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    let request_id = uuid::Uuid::new_v4().to_string();

    let response = next.run(req).await;
    let latency = start.elapsed();
    let status = response.status().as_u16();

    match status {
        400..=499 => warn!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status,
            latency_ms = %latency.as_millis(),
            "Client error"
        ),
        500..=599 => error!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status,
            latency_ms = %latency.as_millis(),
            "Server error"
        ),
        _ => info!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status,
            latency_ms = %latency.as_millis(),
            "Request completed"
        ),
    }

    response
}

fn default_filter() -> EnvFilter {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    EnvFilter::new(format!("scholaris={level},tower_http=warn,sqlx=warn"))
}

/// Installs the global subscriber: console output (compact or JSON), a daily
/// error log and a daily JSON log under `storage/logs`.
///
/// The returned guards flush the file writers and must be held for the life
/// of the process.
pub fn init_tracing(config: &ServerConfig) -> Vec<WorkerGuard> {
    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    let console_layer = if config.log_format == "json" {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .compact()
            .with_filter(console_filter)
            .boxed()
    };

    let mut guards = Vec::new();
    let file_layers = match std::fs::create_dir_all(LOG_DIR) {
        Ok(()) => {
            let (error_writer, error_guard) = tracing_appender::non_blocking(
                RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "scholaris.log"),
            );
            let (json_writer, json_guard) = tracing_appender::non_blocking(
                RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "scholaris.json"),
            );
            guards.push(error_guard);
            guards.push(json_guard);

            let error_layer = fmt::layer()
                .with_writer(error_writer)
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_filter(EnvFilter::new("error"));

            let json_layer = fmt::layer()
                .json()
                .with_writer(json_writer)
                .with_current_span(true)
                .with_span_list(true)
                .with_filter(EnvFilter::new("info"));

            Some(error_layer.and_then(json_layer))
        }
        Err(e) => {
            eprintln!("Failed to create {LOG_DIR}: {e}. Logging to console only.");
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layers)
        .init();

    guards
}
