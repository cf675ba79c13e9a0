//! Recognition feature slice.
//!
//! Accepts document uploads, converts PDFs to page images, runs the OCR engine,
//! and reports the recognized lines. The engine and the rasterizer sit behind
//! [`OcrEngine`] and [`PageRasterizer`] so tests and alternative backends can
//! swap them without touching the pipeline.

mod command;
pub mod engine;
pub mod error;
#[cfg(feature = "server")]
mod handlers;
pub mod health;
pub mod pipeline;
pub mod rasterizer;
#[cfg(feature = "server")]
pub mod router;

pub use engine::{OcrEngine, RecognizedLine, RecognizedPage, TesseractEngine};
pub use error::RecognitionError;
pub use health::EngineHealthCheck;
pub use pipeline::{ProcessResponse, Recognizer, Upload, UploadedFile};
pub use rasterizer::{PageRasterizer, PdftoppmRasterizer};

use ocrhub_domain::config::ApiConfig;
use ocrhub_kernel::domain::registry::InitializedSlice;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Recognition feature state
#[ocrhub_derive::ocrhub_slice]
pub struct Recognition {
    pub recognizer: Recognizer,
    /// Engine version detected at startup; `None` when the engine could not be queried.
    pub engine_version: Option<String>,
}

/// What the recognition feature contributes to the server state.
#[derive(Debug)]
pub struct RecognitionFeature {
    pub slice: InitializedSlice,
    pub health: Arc<EngineHealthCheck>,
}

/// Initialize the recognition feature with the Tesseract engine and `pdftoppm`.
///
/// # Errors
/// Currently infallible; an engine that cannot be queried only logs a warning so
/// the health endpoint can report it.
pub async fn init(config: &ApiConfig) -> Result<RecognitionFeature, RecognitionError> {
    let engine = Arc::new(TesseractEngine::new(&config.ocr));
    let rasterizer = Arc::new(PdftoppmRasterizer::new(&config.ocr));
    init_with(config, engine, rasterizer).await
}

/// Initialize the recognition feature with explicit backends.
///
/// # Errors
/// See [`init`].
pub async fn init_with(
    config: &ApiConfig,
    engine: Arc<dyn OcrEngine>,
    rasterizer: Arc<dyn PageRasterizer>,
) -> Result<RecognitionFeature, RecognitionError> {
    let engine_version = match engine.version().await {
        Ok(version) => {
            info!(engine = engine.name(), version = %version, "OCR engine detected");
            Some(version)
        },
        Err(err) => {
            warn!(engine = engine.name(), kind = err.kind(), error = %err, "OCR engine not available");
            None
        },
    };

    let health = Arc::new(EngineHealthCheck::new(
        Arc::clone(&engine),
        &config.storage.input_dir,
        Duration::from_secs(config.ocr.health_timeout_seconds.max(1)),
    ));

    let recognizer = Recognizer::new(config.clone(), engine, rasterizer);
    let slice = Recognition::new(RecognitionInner { recognizer, engine_version });

    info!(
        languages = ?ocrhub_domain::Language::codes(),
        max_concurrent_jobs = config.ocr.max_concurrent_jobs,
        "Recognition slice initialized"
    );

    Ok(RecognitionFeature { slice: InitializedSlice::new(slice), health })
}
