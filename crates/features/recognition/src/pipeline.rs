//! The `/process` job: validate, store, rasterize, recognize, clean up.

use crate::engine::{OcrEngine, RecognizedLine};
use crate::error::{RecognitionError, RecognitionErrorExt};
use crate::rasterizer::PageRasterizer;
use ocrhub_derive::api_model;
use ocrhub_domain::config::ApiConfig;
use ocrhub_domain::{DocumentFormat, Language};
use ocrhub_kernel::safe_nanoid;
use ocrhub_kernel::security::secure_filename;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{Instrument, debug, info, info_span, warn};

/// A document received from a client.
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    /// File name exactly as the client sent it.
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Everything `/process` accepts.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file: Option<UploadedFile>,
    /// Raw language selector; the configured default applies when absent.
    pub language: Option<String>,
}

#[api_model(omit_empty = true)]
pub struct ProcessResponse {
    pub success: bool,
    /// Every recognized line, joined with `\n`.
    pub text: String,
    /// Recognized lines per page.
    pub raw_result: Vec<Vec<RecognizedLine>>,
    /// Language the document was recognized with.
    pub language: String,
    /// Sanitized file name.
    pub filename: String,
    pub pages: usize,
    pub job_id: String,
    pub elapsed_ms: u64,
    /// Where the JSON copy was written when result persistence is on.
    pub output_file: Option<String>,
}

/// Runs recognition jobs with bounded concurrency.
#[derive(Debug, Clone)]
pub struct Recognizer {
    config: ApiConfig,
    engine: Arc<dyn OcrEngine>,
    rasterizer: Arc<dyn PageRasterizer>,
    permits: Arc<Semaphore>,
}

/// Scratch directory owned by one job.
///
/// [`JobDir::remove`] deletes it on the blocking pool. A job that is dropped
/// before reaching it (client gone, timeout) still hands the removal to the
/// blocking pool from `Drop`.
#[derive(Debug)]
struct JobDir {
    path: PathBuf,
}

impl JobDir {
    async fn create(root: &Path, job_id: &str) -> Result<Self, RecognitionError> {
        let path = root.join(job_id);
        tokio::fs::create_dir_all(&path).await.context("Creating job directory")?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn remove(mut self) {
        let path = std::mem::take(&mut self.path);
        let result = tokio::fs::remove_dir_all(&path).await;
        log_removal(&path, result);
    }
}

impl Drop for JobDir {
    fn drop(&mut self) {
        if self.path.as_os_str().is_empty() {
            return;
        }
        let path = std::mem::take(&mut self.path);
        let remove = move || {
            let result = std::fs::remove_dir_all(&path);
            log_removal(&path, result);
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => drop(handle.spawn_blocking(remove)),
            Err(_) => remove(),
        }
    }
}

fn log_removal(path: &Path, result: std::io::Result<()>) {
    match result {
        Ok(()) => debug!(dir = %path.display(), "Job directory removed"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {},
        Err(err) => warn!(dir = %path.display(), error = %err, "Failed to remove job directory"),
    }
}

impl Recognizer {
    #[must_use]
    pub fn new(config: ApiConfig, engine: Arc<dyn OcrEngine>, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        let permits = Arc::new(Semaphore::new(config.ocr.max_concurrent_jobs.max(1)));
        Self { config, engine, rasterizer, permits }
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<dyn OcrEngine> {
        &self.engine
    }

    /// Jobs that could start right now without waiting.
    #[must_use]
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }

    /// Processes one upload end to end.
    ///
    /// # Errors
    /// * [`RecognitionError::NoFile`] when the upload carries no file.
    /// * [`RecognitionError::InvalidFile`] for an empty or unsupported file name.
    /// * Engine, rasterizer, timeout, and IO errors from the job itself.
    pub async fn process(&self, upload: Upload) -> Result<ProcessResponse, RecognitionError> {
        let started = Instant::now();

        let file = upload.file.ok_or(RecognitionError::NoFile { context: None })?;
        let Some(format) = DocumentFormat::from_filename(&file.name) else {
            return Err(RecognitionError::InvalidFile { filename: file.name, context: None });
        };
        let filename = secure_filename(&file.name).map_err(|_| RecognitionError::InvalidFile {
            filename: file.name.clone(),
            context: Some("Sanitizing file name".into()),
        })?;
        let language =
            upload.language.as_deref().map_or(self.config.ocr.default_language, Language::resolve);

        let job_id = safe_nanoid!();
        let span = info_span!("ocr_job", job_id = %job_id, filename = %filename, language = %language);

        async move {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| RecognitionError::from("Recognition pool is closed"))?;

            let dir = JobDir::create(&self.config.storage.input_dir, &job_id).await?;
            let lines = self.run_job(&dir, &filename, format, &file.bytes, language).await;
            dir.remove().await;
            let lines = lines?;

            let text = lines.iter().flatten().map(|line| line.text.as_str()).collect::<Vec<_>>().join("\n");
            let mut response = ProcessResponse {
                success: true,
                text,
                pages: lines.len(),
                raw_result: lines,
                language: language.code().to_owned(),
                filename,
                job_id,
                elapsed_ms: elapsed_ms(started),
                output_file: None,
            };

            if self.config.storage.persist_results {
                let path = self.persist(&mut response).await?;
                info!(output = %path.display(), "Result persisted");
            }

            info!(pages = response.pages, elapsed_ms = response.elapsed_ms, "Document processed");
            Ok(response)
        }
        .instrument(span)
        .await
    }

    async fn run_job(
        &self,
        dir: &JobDir,
        filename: &str,
        format: DocumentFormat,
        bytes: &[u8],
        language: Language,
    ) -> Result<Vec<Vec<RecognizedLine>>, RecognitionError> {
        let source = dir.path().join(filename);
        tokio::fs::write(&source, bytes).await.context("Saving upload")?;
        debug!(bytes = bytes.len(), format = %format, "Upload stored");

        let images = if format.is_pdf() {
            let pages_dir = dir.path().join("pages");
            tokio::fs::create_dir(&pages_dir).await.context("Creating pages directory")?;
            self.rasterizer.rasterize(&source, &pages_dir, self.config.ocr.pdf_max_pages).await?
        } else {
            vec![source]
        };

        let mut pages = Vec::with_capacity(images.len());
        for image in &images {
            let page = self.engine.recognize(image, language).await?;
            pages.push(page.lines);
        }
        Ok(pages)
    }

    /// Writes the response to `<output_dir>/<job_id>_<stem>.json` and records the path in it.
    async fn persist(&self, response: &mut ProcessResponse) -> Result<PathBuf, RecognitionError> {
        let stem = Path::new(&response.filename).file_stem().map_or_else(
            || response.filename.clone(),
            |stem| stem.to_string_lossy().into_owned(),
        );
        let path = self.config.storage.output_dir.join(format!("{}_{stem}.json", response.job_id));
        response.output_file = Some(path.display().to_string());

        let json = serde_json::to_vec_pretty(response).context("Encoding result")?;
        tokio::fs::create_dir_all(&self.config.storage.output_dir).await.context("Creating output directory")?;
        tokio::fs::write(&path, json).await.context("Writing result")?;
        Ok(path)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn scratch(root: &Path) -> JobDir {
        let path = root.join("job");
        std::fs::create_dir_all(path.join("pages")).unwrap();
        std::fs::write(path.join("pages/page-1.jpg"), b"raster").unwrap();
        JobDir { path }
    }

    #[tokio::test]
    async fn remove_waits_for_the_directory_to_go() {
        let root = tempfile::tempdir().unwrap();
        let dir = scratch(root.path());
        let path = dir.path().to_path_buf();

        dir.remove().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn dropped_dir_is_removed_on_the_blocking_pool() {
        let root = tempfile::tempdir().unwrap();
        let path = scratch(root.path()).path().to_path_buf();

        tokio::time::timeout(Duration::from_secs(5), async {
            while path.exists() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[test]
    fn dropped_dir_outside_a_runtime_is_removed_inline() {
        let root = tempfile::tempdir().unwrap();
        let path = scratch(root.path()).path().to_path_buf();
        assert!(!path.exists());
    }
}
