//! Shared HTTP plumbing: application state, health checks, and the system router.

pub mod health;
pub mod router;
pub mod state;

pub use health::{HealthCheck, HealthError};
pub use router::system_router;
pub use state::{ApiState, ApiStateBuilder, ApiStateError};
