//! Convenience re-exports for slices and apps.

pub use crate::config::{ConfigError, ConfigLoader};
pub use crate::safe_nanoid;
pub use crate::security::{FilenameError, secure_filename};
#[cfg(feature = "server")]
pub use crate::server::{ApiState, ApiStateError, HealthCheck, HealthError, system_router};
pub use ocrhub_domain::config::ApiConfig;
pub use ocrhub_domain::{DocumentFormat, Language};
