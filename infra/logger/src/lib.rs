//! # Logger
//!
//! Process-wide `tracing` subscriber for the OCR service.
//!
//! Events go to stdout and, when a directory is configured, to a rolling file
//! written by a non-blocking worker. Output is either compact text or JSON
//! lines; JSON is what container log collectors expect.
//!
//! Filtering precedence: explicit directives ([`LoggerBuilder::directives`]),
//! then `RUST_LOG`, then the base level with [`QUIET_DEPENDENCIES`] applied.
//!
//! ## Example
//!
//! ```rust
//! # use ocrhub_logger::{LevelFilter, Logger};
//! let _logger = Logger::builder("ocrhub-server")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const DEFAULT_MAX_FILES: usize = 7;
const LOG_FILE_SUFFIX: &str = "log";

/// Transport and TLS crates capped at `warn` unless directives say otherwise.
pub const QUIET_DEPENDENCIES: [&str; 4] = ["hyper=warn", "h2=warn", "rustls=warn", "multer=warn"];

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Line format shared by every output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug)]
struct FileOutput {
    dir: PathBuf,
    rotation: Rotation,
    max_files: usize,
}

/// A builder for configuring and initializing the global tracing subscriber.
#[must_use = "The builder must be configured before it can be used to initialize the logger."]
#[derive(Debug)]
pub struct LoggerBuilder {
    name: String,
    level: LevelFilter,
    format: LogFormat,
    stdout: bool,
    directives: Option<String>,
    file: Option<FileOutput>,
}

impl LoggerBuilder {
    /// Base level used when no directives and no `RUST_LOG` are given.
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub const fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Shorthand for [`LogFormat::Json`] / [`LogFormat::Compact`].
    pub const fn json(self, enabled: bool) -> Self {
        self.format(if enabled { LogFormat::Json } else { LogFormat::Compact })
    }

    pub const fn stdout(mut self, enabled: bool) -> Self {
        self.stdout = enabled;
        self
    }

    /// Filter directives such as `ocrhub_recognition=debug,tower_http=info`.
    ///
    /// Takes precedence over `RUST_LOG`. Invalid directives make
    /// [`LoggerBuilder::init`] fail.
    pub fn directives(mut self, directives: impl Into<String>) -> Self {
        self.directives = Some(directives.into());
        self
    }

    /// Also write daily-rotated `<name>.<date>.log` files into `dir`.
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.file = Some(FileOutput {
            dir: dir.into(),
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
        });
        self
    }

    /// Rotation of the file output; ignored without [`LoggerBuilder::dir`].
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        if let Some(file) = &mut self.file {
            file.rotation = rotation;
        }
        self
    }

    /// Number of rotated files kept; ignored without [`LoggerBuilder::dir`].
    pub fn max_files(mut self, max: usize) -> Self {
        if let Some(file) = &mut self.file {
            file.max_files = max;
        }
        self
    }

    /// Installs the global subscriber.
    ///
    /// The returned [`Logger`] owns the file writer's worker guard; keep it
    /// alive until shutdown or buffered lines are lost.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, zero
    ///   `max_files`, bad directives, or no enabled output
    /// * [`LoggerError::Appender`] / [`LoggerError::Internal`] when the log
    ///   directory cannot be prepared
    /// * [`LoggerError::Subscriber`] when a global subscriber already exists
    pub fn init(self) -> Result<Logger, LoggerError> {
        self.validate()?;
        let filter = self.env_filter()?;

        let mut layers: Vec<BoxedLayer> = Vec::new();
        if self.stdout {
            layers.push(self.stdout_layer());
        }

        let guard = match &self.file {
            Some(file) => {
                let (file_layer, guard) = self.file_layer(file)?;
                layers.push(file_layer);
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No log output enabled; enable stdout or set a directory".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(layers).with(filter).try_init()?;

        Ok(Logger { guard })
    }

    fn validate(&self) -> Result<(), LoggerError> {
        if self.name.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Logger name cannot be empty".into(),
                context: None,
            });
        }
        if self.file.as_ref().is_some_and(|file| file.max_files == 0) {
            return Err(LoggerError::InvalidConfiguration {
                message: "max_files must be greater than zero".into(),
                context: Some(self.name.clone().into()),
            });
        }
        Ok(())
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        build_filter(
            self.level,
            self.directives.as_deref(),
            std::env::var(EnvFilter::DEFAULT_ENV).ok(),
        )
    }

    fn stdout_layer(&self) -> BoxedLayer {
        match self.format {
            LogFormat::Json => layer().json().with_current_span(true).with_span_list(false).boxed(),
            LogFormat::Compact => {
                layer().compact().with_ansi(std::io::stdout().is_terminal()).boxed()
            },
        }
    }

    fn file_layer(&self, file: &FileOutput) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
        std::fs::create_dir_all(&file.dir).map_err(|e| LoggerError::Internal {
            message: e.to_string().into(),
            context: Some(format!("Failed to create log directory {}", file.dir.display()).into()),
        })?;

        let appender = RollingFileAppender::builder()
            .rotation(file.rotation.clone())
            .filename_prefix(&self.name)
            .filename_suffix(LOG_FILE_SUFFIX)
            .max_log_files(file.max_files)
            .build(&file.dir)?;

        let (writer, guard) = tracing_appender::non_blocking(appender);
        let base = layer().with_writer(writer).with_ansi(false);

        let boxed = match self.format {
            LogFormat::Json => base.json().with_current_span(true).with_span_list(false).boxed(),
            LogFormat::Compact => base.boxed(),
        };
        Ok((boxed, guard))
    }
}

/// `directives`, then `rust_log`, then `level` with [`QUIET_DEPENDENCIES`].
///
/// The builder's default directive only applies to an empty list, so the
/// fallback spells the base level out next to the quiet targets.
fn build_filter(
    level: LevelFilter,
    directives: Option<&str>,
    rust_log: Option<String>,
) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(level.into());

    if let Some(directives) = directives {
        return builder.parse(directives).map_err(|e| LoggerError::InvalidConfiguration {
            message: format!("Invalid log filter '{directives}': {e}").into(),
            context: None,
        });
    }

    match rust_log {
        Some(env) if !env.trim().is_empty() => Ok(builder.parse_lossy(env)),
        _ => Ok(builder.parse_lossy(default_directives(level))),
    }
}

fn default_directives(level: LevelFilter) -> String {
    format!("{level},{}", QUIET_DEPENDENCIES.join(","))
}

/// Handle to the installed subscriber.
///
/// Dropping it flushes and stops the file worker.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts a builder; `name` prefixes the rolling log files.
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            name: name.into(),
            level: LevelFilter::INFO,
            format: LogFormat::Compact,
            stdout: true,
            directives: None,
            file: None,
        }
    }

    /// Whether a file output with its background worker is active.
    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}
