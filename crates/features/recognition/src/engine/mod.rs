//! OCR engines and the recognized-text model they produce.

mod tesseract;
mod tsv;

pub use tesseract::TesseractEngine;
pub use tsv::parse_tsv;

use crate::error::RecognitionError;
use async_trait::async_trait;
use ocrhub_derive::api_model;
use ocrhub_domain::Language;
use std::fmt::Debug;
use std::path::Path;

/// One recognized line of text.
#[api_model]
#[derive(Clone, PartialEq)]
pub struct RecognizedLine {
    /// Corner points, clockwise from top-left: `[[x, y]; 4]`.
    #[cfg_attr(feature = "server", schema(value_type = Vec<Vec<u32>>))]
    pub bbox: Vec<[u32; 2]>,
    pub text: String,
    /// Mean word confidence in `0.0..=1.0`.
    pub confidence: f32,
}

/// Lines recognized on a single page image, in reading order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognizedPage {
    pub lines: Vec<RecognizedLine>,
}

impl RecognizedPage {
    #[must_use]
    pub fn text(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.text.as_str())
    }
}

/// Text recognizer over a single page image on disk.
#[async_trait]
pub trait OcrEngine: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Version string reported by the engine, e.g. `tesseract 5.3.0`.
    async fn version(&self) -> Result<String, RecognitionError>;

    async fn recognize(&self, image: &Path, language: Language) -> Result<RecognizedPage, RecognitionError>;
}
