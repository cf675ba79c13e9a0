use crate::language::Language;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level configuration of the OCR service.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub ocr: OcrConfig,
    pub log: LogConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Data directories mounted into the container.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Scratch area for uploads and rasterized pages.
    pub input_dir: PathBuf,
    /// Where recognition results are written when `persist_results` is on.
    pub output_dir: PathBuf,
    pub persist_results: bool,
}

/// OCR engine and job limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub engine_binary: PathBuf,
    pub rasterizer_binary: PathBuf,
    /// Model cache (tessdata) directory; `None` uses the engine's built-in location.
    pub model_dir: Option<PathBuf>,
    pub default_language: Language,
    pub pdf_dpi: u32,
    pub pdf_max_pages: u32,
    pub page_segmentation_mode: u8,
    /// Exported to the engine as `OMP_THREAD_LIMIT`.
    pub thread_limit: u32,
    pub max_concurrent_jobs: usize,
    pub max_upload_bytes: usize,
    pub timeout_seconds: u64,
    pub health_timeout_seconds: u64,
}

/// Logging output.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level when neither `filter` nor `RUST_LOG` is set.
    pub level: String,
    /// Directive list, e.g. `ocrhub_recognition=debug,tower_http=info`.
    pub filter: Option<String>,
    /// Rolling log files are written here when set.
    pub dir: Option<PathBuf>,
    pub json: bool,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 8501, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("/app/data/input"),
            output_dir: PathBuf::from("/app/data/output"),
            persist_results: false,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine_binary: PathBuf::from("tesseract"),
            rasterizer_binary: PathBuf::from("pdftoppm"),
            model_dir: None,
            default_language: Language::Spanish,
            pdf_dpi: 300,
            pdf_max_pages: 1,
            page_segmentation_mode: 3,
            thread_limit: 1,
            max_concurrent_jobs: 2,
            max_upload_bytes: 50 * 1024 * 1024,
            timeout_seconds: 120,
            health_timeout_seconds: 8,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), filter: None, dir: None, json: false }
    }
}
