use super::state::ApiState;
use async_trait::async_trait;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::{Json, response::IntoResponse};
use ocrhub_derive::{api_handler, api_model};
use ocrhub_domain::Language;
use ocrhub_domain::constants::{HEALTH_PATH, SYSTEM_TAG};
use std::borrow::Cow;
use std::fmt::Debug;
use tracing::warn;

pub const HEALTHY: &str = "healthy";
pub const UNHEALTHY: &str = "unhealthy";

#[ocrhub_derive::ocrhub_error]
pub enum HealthError {
    #[error("Health check failed{}: {message}", format_context(.context))]
    Unhealthy { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Health check timed out after {seconds}s{}", format_context(.context))]
    Timeout { seconds: u64, context: Option<Cow<'static, str>> },
    #[error("Internal health check error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Readiness probe contributed by a feature.
///
/// `/health` reports healthy only while every registered check passes.
#[async_trait]
pub trait HealthCheck: Debug + Send + Sync {
    /// Short name reported back when the check fails.
    fn name(&self) -> &'static str;

    async fn check(&self) -> Result<(), HealthError>;
}

#[api_model]
/// Health check response
pub struct HealthResponse {
    /// `healthy` or `unhealthy`
    pub status: &'static str,
    /// Recognition languages the service is configured for
    pub languages: Vec<String>,
    /// Version
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    /// Names of the checks that failed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
}

#[api_handler(
    get,
    path = HEALTH_PATH,
    responses(
        (status = OK, description = "Service is ready", body = HealthResponse),
        (status = SERVICE_UNAVAILABLE, description = "A readiness check failed", body = HealthResponse),
    ),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let mut failed = Vec::new();
    for check in state.health_checks() {
        if let Err(err) = check.check().await {
            warn!(check = check.name(), kind = err.kind(), error = %err, "Health check failed");
            failed.push(check.name().to_owned());
        }
    }

    let (code, status) =
        if failed.is_empty() { (StatusCode::OK, HEALTHY) } else { (StatusCode::SERVICE_UNAVAILABLE, UNHEALTHY) };

    let body = HealthResponse {
        status,
        languages: Language::codes().into_iter().map(str::to_owned).collect(),
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.uptime().as_secs(),
        failed,
    };

    (
        code,
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(body),
    )
}
