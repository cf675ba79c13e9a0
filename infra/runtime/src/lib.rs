//! # Runtime
//!
//! Tokio runtime profiles for the workspace binaries.
//!
//! OCR requests spend most of their time waiting on child processes and on
//! `tokio::fs`, both of which lean on the blocking pool, so every profile
//! sizes that pool explicitly next to the worker count.
//!
//! ## Profiles
//! * [`RuntimeConfig::server`]: the HTTP server. All cores, wide blocking pool.
//! * [`RuntimeConfig::compact`]: tools and sidecars. Half the cores, small pool.
//!
//! Worker count comes from `OCRHUB_WORKER_THREADS`, then `TOKIO_WORKER_THREADS`,
//! then the available parallelism.
//!
//! ## Example
//!
//! ```rust,ignore
//! #[ocrhub_runtime::main(server)]
//! async fn main() -> anyhow::Result<()> {
//!     tracing::info!("Serving on the server profile");
//!     Ok(())
//! }
//! ```

pub use anyhow::Result;
pub use ocrhub_derive::main;

use anyhow::Context;
use std::num::NonZero;
use std::sync::OnceLock;
use std::thread::available_parallelism;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

const WORKER_THREADS_ENV: [&str; 2] = ["OCRHUB_WORKER_THREADS", "TOKIO_WORKER_THREADS"];
const FALLBACK_WORKERS: usize = 4;
const MAX_WORKERS: usize = 1024;

const MIN_STACK: usize = 1024 * 1024;
const MAX_STACK: usize = 16 * 1024 * 1024;
const MAX_BLOCKING: usize = 512;
const THREAD_NAME: &str = "ocrhub-worker";

/// Worker threads requested by the environment or offered by the hardware.
fn detected_workers() -> usize {
    static DETECTED: OnceLock<usize> = OnceLock::new();
    *DETECTED.get_or_init(|| {
        WORKER_THREADS_ENV
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .filter_map(|value| value.trim().parse::<usize>().ok())
            .find(|&n| (1..=MAX_WORKERS).contains(&n))
            .unwrap_or_else(|| {
                available_parallelism().map(NonZero::get).unwrap_or(FALLBACK_WORKERS)
            })
    })
}

/// Configuration for the Tokio runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
    pub max_blocking_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: detected_workers(),
            stack_size: 3 * 1024 * 1024,
            thread_name: THREAD_NAME.to_owned(),
            thread_keep_alive: Duration::from_secs(60),
            max_blocking_threads: 64,
        }
    }
}

impl RuntimeConfig {
    /// Profile of the HTTP server.
    #[must_use]
    pub fn server() -> Self {
        Self {
            worker_threads: detected_workers(),
            stack_size: 4 * 1024 * 1024,
            thread_name: "ocrhub-server".to_owned(),
            thread_keep_alive: Duration::from_secs(300),
            max_blocking_threads: 128,
        }
    }

    /// Profile for tools and sidecars where the footprint matters more than throughput.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            worker_threads: (detected_workers() / 2).max(1),
            stack_size: 2 * 1024 * 1024,
            thread_name: "ocrhub-compact".to_owned(),
            thread_keep_alive: Duration::from_secs(30),
            max_blocking_threads: 16,
        }
    }

    #[must_use]
    pub const fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    #[must_use]
    pub const fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = size;
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    #[must_use]
    pub const fn with_max_blocking_threads(mut self, threads: usize) -> Self {
        self.max_blocking_threads = threads;
        self
    }

    #[must_use]
    pub const fn with_thread_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.thread_keep_alive = keep_alive;
        self
    }

    /// Clamps every knob into the range Tokio accepts.
    #[must_use]
    pub fn normalized(self) -> Self {
        let thread_name =
            if self.thread_name.trim().is_empty() { THREAD_NAME.to_owned() } else { self.thread_name };
        Self {
            worker_threads: self.worker_threads.clamp(1, MAX_WORKERS),
            stack_size: self.stack_size.clamp(MIN_STACK, MAX_STACK),
            thread_name,
            thread_keep_alive: self.thread_keep_alive,
            max_blocking_threads: self.max_blocking_threads.clamp(1, MAX_BLOCKING),
        }
    }
}

/// Builds a multithreaded runtime with I/O and timers enabled.
///
/// The configuration is [normalized](RuntimeConfig::normalized) first.
///
/// # Examples
///
/// ```rust,ignore
/// use ocrhub_runtime::{build_runtime_with_config, RuntimeConfig};
///
/// let config = RuntimeConfig::server().with_max_blocking_threads(32);
/// let runtime = build_runtime_with_config(&config)?;
/// runtime.block_on(async { /* serve */ });
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if Tokio cannot create the runtime.
pub fn build_runtime_with_config(config: &RuntimeConfig) -> Result<Runtime> {
    let config = config.clone().normalized();
    debug!(config = ?config, "Building tokio runtime");

    Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .thread_name(&config.thread_name)
        .thread_stack_size(config.stack_size)
        .thread_keep_alive(config.thread_keep_alive)
        .max_blocking_threads(config.max_blocking_threads)
        .enable_all()
        .build()
        .context("Failed to initialize runtime")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_clamps_every_knob() {
        let low = RuntimeConfig::default()
            .with_worker_threads(0)
            .with_stack_size(100)
            .with_max_blocking_threads(0)
            .with_thread_name("  ")
            .normalized();
        assert_eq!(low.worker_threads, 1);
        assert_eq!(low.stack_size, MIN_STACK);
        assert_eq!(low.max_blocking_threads, 1);
        assert_eq!(low.thread_name, THREAD_NAME);

        let high = RuntimeConfig::default()
            .with_worker_threads(5000)
            .with_stack_size(100 * 1024 * 1024)
            .with_max_blocking_threads(10_000)
            .normalized();
        assert_eq!(high.worker_threads, MAX_WORKERS);
        assert_eq!(high.stack_size, MAX_STACK);
        assert_eq!(high.max_blocking_threads, MAX_BLOCKING);
    }

    #[test]
    fn presets_are_already_normal() {
        for preset in [RuntimeConfig::default(), RuntimeConfig::server(), RuntimeConfig::compact()] {
            assert_eq!(preset.clone().normalized(), preset);
        }
    }

    #[test]
    fn server_profile_outsizes_compact() {
        let server = RuntimeConfig::server();
        let compact = RuntimeConfig::compact();
        assert!(server.max_blocking_threads > compact.max_blocking_threads);
        assert!(server.worker_threads >= compact.worker_threads);
        assert_eq!(server.thread_name, "ocrhub-server");
    }

    #[test]
    fn runtime_runs_blocking_work() {
        let config = RuntimeConfig::compact().with_worker_threads(1);
        let rt = build_runtime_with_config(&config).unwrap();
        let value = rt.block_on(async { tokio::task::spawn_blocking(|| 21 * 2).await.unwrap() });
        assert_eq!(value, 42);
    }
}
