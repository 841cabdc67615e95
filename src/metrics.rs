use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Falls back to `OBSERVABILITY_ENABLED` when [`init_metrics`] has not run.
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

/// Installs the Prometheus recorder and its upkeep task. Returns None when
/// observability is disabled or the recorder cannot be installed.
pub fn init_metrics(enabled: bool) -> Option<PrometheusHandle> {
    let _ = OBSERVABILITY_ENABLED.set(enabled);
    if !is_observability_enabled() {
        return None;
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0,
            ],
        )
        .and_then(|builder| builder.install_recorder());

    let handle = match handle {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Prometheus recorder");
            return None;
        }
    };

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Some(handle)
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status)
        .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);
    gauge!("http_requests_active").decrement(1.0);

    response
}

pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

// Business metrics

pub fn track_authz_decision(entity: &'static str, action: &'static str, allowed: bool) {
    if !is_observability_enabled() {
        return;
    }
    let outcome = if allowed { "allowed" } else { "denied" };
    counter!("authz_decisions_total", "entity" => entity, "action" => action, "outcome" => outcome)
        .increment(1);
}

pub fn track_template_assignment(class_created: bool, subjects_created: usize) {
    if !is_observability_enabled() {
        return;
    }
    let class = if class_created { "created" } else { "reused" };
    counter!("template_assignments_total", "class" => class).increment(1);
    counter!("template_subjects_copied_total").increment(subjects_created as u64);
}

pub fn track_attendance_upserted(rows: usize) {
    if !is_observability_enabled() {
        return;
    }
    counter!("attendance_rows_upserted_total").increment(rows as u64);
}

pub fn track_live_class_broadcast(created: usize, skipped: usize) {
    if !is_observability_enabled() {
        return;
    }
    counter!("live_class_broadcast_schools_total", "outcome" => "created").increment(created as u64);
    counter!("live_class_broadcast_schools_total", "outcome" => "skipped").increment(skipped as u64);
}

pub fn track_user_created(role: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("users_created_total", "role" => role).increment(1);
}

pub fn track_login(success: bool) {
    if !is_observability_enabled() {
        return;
    }
    let status = if success { "success" } else { "failure" };
    counter!("user_logins_total", "status" => status).increment(1);
}
