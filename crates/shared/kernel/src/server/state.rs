use super::health::HealthCheck;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fxhash::FxHashMap;
use ocrhub_domain::config::ApiConfig;
use ocrhub_domain::registry::{FeatureSlice, InitializedSlice};
use std::any::TypeId;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[ocrhub_derive::ocrhub_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("State missing feature slice{}: {message}", format_context(.context))]
    MissingSlice { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl IntoResponse for ApiStateError {
    fn into_response(self) -> Response {
        tracing::error!(kind = self.kind(), error = %self, "Application state misconfigured");
        let body = serde_json::json!({ "error": self.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    started_at: Instant,
    slices: FxHashMap<TypeId, InitializedSlice>,
    checks: Vec<Arc<dyn HealthCheck>>,
}

#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn get_slice<T: FeatureSlice>(&self) -> Option<&T> {
        self.inner
            .slices
            .get(&TypeId::of::<T>())
            .and_then(|initialized| initialized.state.as_any().downcast_ref::<T>())
    }

    /// Returns a reference to the slice if it is registered.
    ///
    /// # Errors
    /// Returns an error if the slice is not registered.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, ApiStateError> {
        self.get_slice::<T>().ok_or_else(|| ApiStateError::MissingSlice {
            message: std::any::type_name::<T>().into(),
            context: None,
        })
    }

    /// Names of the registered slices (for diagnostics).
    pub fn slice_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inner.slices.values().map(InitializedSlice::name)
    }

    pub fn health_checks(&self) -> impl Iterator<Item = &Arc<dyn HealthCheck>> {
        self.inner.checks.iter()
    }

    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.inner.started_at.elapsed()
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    slices: FxHashMap<TypeId, InitializedSlice>,
    checks: Vec<Arc<dyn HealthCheck>>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.insert(slice.id, slice);
        self
    }

    /// Registers multiple slices at once.
    #[must_use]
    pub fn register_slices<I>(mut self, slices: I) -> Self
    where
        I: IntoIterator<Item = InitializedSlice>,
    {
        slices.into_iter().fold(self, Self::register_slice)
    }

    #[must_use]
    pub fn health_check(mut self, check: Arc<dyn HealthCheck>) -> Self {
        self.checks.push(check);
        self
    }

    #[must_use]
    pub fn health_checks<I>(mut self, checks: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn HealthCheck>>,
    {
        self.checks.extend(checks);
        self
    }

    /// # Errors
    /// Returns an error if no configuration was provided, or if two slices or
    /// two health checks share a name (their reports would be ambiguous).
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or_else(|| ApiStateError::Validation {
            message: "ApiConfig not provided".into(),
            context: None,
        })?;

        ensure_unique("slice", self.slices.values().map(InitializedSlice::name))?;
        ensure_unique("health check", self.checks.iter().map(|check| check.name()))?;

        Ok(ApiState {
            inner: Arc::new(ApiStateInner {
                config,
                started_at: Instant::now(),
                slices: self.slices,
                checks: self.checks,
            }),
        })
    }
}

fn ensure_unique<'a>(what: &str, names: impl Iterator<Item = &'a str>) -> Result<(), ApiStateError> {
    let mut seen = fxhash::FxHashSet::default();
    for name in names {
        if !seen.insert(name) {
            return Err(ApiStateError::Validation {
                message: format!("duplicate {what} name {name:?}").into(),
                context: None,
            });
        }
    }
    Ok(())
}
