//! Facade crate for `OcrHub` features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `ocrhub` with the `server` feature.
//! - Call `ocrhub::init` to build every feature slice and its health checks.

pub use ocrhub_domain as domain;
#[cfg(feature = "server")]
use ocrhub_domain::config::ApiConfig;
pub use ocrhub_kernel as kernel;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use ocrhub_kernel::server::router::system_router;
        pub use ocrhub_recognition::router::recognition_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use ocrhub_recognition as recognition;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "server")]
        "server",
        #[cfg(feature = "server")]
        "recognition",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Slices and readiness checks produced by [`init`].
#[cfg(feature = "server")]
#[derive(Debug, Default)]
pub struct Features {
    pub slices: Vec<domain::registry::InitializedSlice>,
    pub health_checks: Vec<std::sync::Arc<dyn kernel::server::HealthCheck>>,
}

/// Initialize all enabled features for server mode.
///
/// # Errors
/// Returns an error if any feature initialization fails.
#[cfg(feature = "server")]
pub async fn init(config: &ApiConfig) -> Result<Features, Box<dyn std::error::Error + Send + Sync>> {
    let mut enabled = Features::default();

    // Recognition (OCR engine + PDF rasterizer)
    let recognition = features::recognition::init(config).await?;
    enabled.slices.push(recognition.slice);
    enabled.health_checks.push(recognition.health);

    Ok(enabled)
}
