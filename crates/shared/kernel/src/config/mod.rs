use config::{Config, Environment, File, Map};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable that may point at the configuration file.
pub const CONFIG_PATH_ENV: &str = "OCRHUB_CONFIG";
/// Prefix of environment overrides (`OCRHUB__SERVER__PORT=9000`).
pub const ENV_PREFIX: &str = "OCRHUB";
/// File name (without extension) looked up when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "server";
/// Extensions probed, in order, when the resolved path has no file behind it.
pub const CONFIG_EXTENSIONS: [&str; 7] = ["toml", "json", "yaml", "yml", "ini", "ron", "json5"];

/// Custom error type for config loading.
#[ocrhub_derive::ocrhub_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Layered configuration loader: an optional file, then `OCRHUB__` environment overrides.
///
/// File resolution order:
/// 1. the path passed to [`ConfigLoader::file`];
/// 2. the path in `OCRHUB_CONFIG`;
/// 3. `server` in the working directory (any extension the `config` crate knows).
///
/// A missing file is not an error: the service runs on defaults plus environment.
/// Nested keys use a double underscore, e.g. `OCRHUB__OCR__DEFAULT_LANGUAGE=en`
/// maps to `ocr.default_language`.
#[derive(Debug, Default, Clone)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
    env: Option<Map<String, String>>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit configuration file; takes precedence over `OCRHUB_CONFIG`.
    #[must_use]
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Replaces the process environment with a fixed set of variables.
    ///
    /// Applies to both `OCRHUB_CONFIG` and the `OCRHUB__` overrides.
    #[must_use]
    pub fn env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Path the loader reads, after applying the resolution order.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }

        let from_env = match &self.env {
            Some(vars) => vars.get(CONFIG_PATH_ENV).cloned(),
            None => std::env::var(CONFIG_PATH_ENV).ok(),
        };

        from_env
            .filter(|p| !p.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
    }

    /// File the loader will read: the resolved path itself, or the first
    /// `<path>.<ext>` from [`CONFIG_EXTENSIONS`] that exists.
    #[must_use]
    pub fn located_file(&self) -> Option<PathBuf> {
        let path = self.resolved_path();
        if path.is_file() {
            return Some(path);
        }
        CONFIG_EXTENSIONS.iter().map(|ext| path.with_extension(ext)).find(|candidate| candidate.is_file())
    }

    /// Builds and deserializes the configuration.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if the merged
    /// values do not match the structure of `T`.
    pub fn load<T>(self) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
    {
        let located = self.located_file();
        let mut builder = Config::builder();
        match &located {
            Some(file) => {
                info!(path = %file.display(), "Loading config");
                builder = builder.add_source(File::from(file.as_path()));
            },
            None => {
                let path = self.resolved_path();
                debug!(path = %path.display(), "Config file not found, using defaults and environment");
            },
        }

        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(self.env);
        let builder = builder.add_source(environment);

        let config = builder
            .build()
            .context("Failed to build config")?
            .try_deserialize::<T>()
            .context("Failed to deserialize config")?;

        Ok(config)
    }
}

/// Shorthand for [`ConfigLoader`] with an optional explicit path.
///
/// # Errors
/// See [`ConfigLoader::load`].
///
/// # Example
/// ```rust
/// use ocrhub_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let loader = ConfigLoader::new();
    match path {
        Some(path) => loader.file(path).load(),
        None => loader.load(),
    }
}
