//! PDF to page-image conversion.

use crate::command;
use crate::error::{RecognitionError, RecognitionErrorExt};
use async_trait::async_trait;
use ocrhub_domain::config::OcrConfig;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// File name prefix of rendered pages (`page-1.jpg`, `page-2.jpg`, ...).
const PAGE_PREFIX: &str = "page";

#[async_trait]
pub trait PageRasterizer: Debug + Send + Sync {
    /// Renders pages `1..=max_pages` of `pdf` into `out_dir`, returning the images in page order.
    async fn rasterize(&self, pdf: &Path, out_dir: &Path, max_pages: u32) -> Result<Vec<PathBuf>, RecognitionError>;
}

/// Poppler's `pdftoppm`, rendering JPEG pages.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    binary: PathBuf,
    dpi: u32,
    timeout: Duration,
}

impl PdftoppmRasterizer {
    #[must_use]
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            binary: config.rasterizer_binary.clone(),
            dpi: config.pdf_dpi.max(1),
            timeout: Duration::from_secs(config.timeout_seconds.max(1)),
        }
    }

    #[must_use]
    pub fn arguments(&self, pdf: &Path, out_dir: &Path, max_pages: u32) -> Vec<std::ffi::OsString> {
        vec![
            "-r".into(),
            self.dpi.to_string().into(),
            "-f".into(),
            "1".into(),
            "-l".into(),
            max_pages.max(1).to_string().into(),
            "-jpeg".into(),
            pdf.into(),
            out_dir.join(PAGE_PREFIX).into(),
        ]
    }
}

#[async_trait]
impl PageRasterizer for PdftoppmRasterizer {
    async fn rasterize(&self, pdf: &Path, out_dir: &Path, max_pages: u32) -> Result<Vec<PathBuf>, RecognitionError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(self.arguments(pdf, out_dir, max_pages));

        let output = command::run(cmd, self.timeout).await?;
        if !output.status.success() {
            return Err(RecognitionError::Rasterize {
                message: command::failure_message(&output).into(),
                context: Some(pdf.display().to_string().into()),
            });
        }

        let pages = rendered_pages(out_dir).await?;
        if pages.is_empty() {
            return Err(RecognitionError::Rasterize {
                message: "no pages rendered".into(),
                context: Some(pdf.display().to_string().into()),
            });
        }

        debug!(pdf = %pdf.display(), pages = pages.len(), dpi = self.dpi, "PDF rasterized");
        Ok(pages)
    }
}

/// Collects `page-N.jpg` files from `dir`, sorted by `N`.
///
/// `pdftoppm` zero-pads `N` to the width of the last page number, so sorting is numeric.
pub async fn rendered_pages(dir: &Path) -> Result<Vec<PathBuf>, RecognitionError> {
    let mut entries = tokio::fs::read_dir(dir).await.context("Listing rendered pages")?;
    let mut pages = Vec::new();

    while let Some(entry) = entries.next_entry().await.context("Listing rendered pages")? {
        let path = entry.path();
        if let Some(number) = page_number(&path) {
            pages.push((number, path));
        }
    }

    pages.sort_unstable_by_key(|(number, _)| *number);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

fn page_number(path: &Path) -> Option<u32> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(".jpg")?;
    stem.strip_prefix(PAGE_PREFIX)?.strip_prefix('-')?.parse().ok()
}
