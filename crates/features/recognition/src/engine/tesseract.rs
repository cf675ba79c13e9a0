use super::{OcrEngine, RecognizedPage, parse_tsv};
use crate::command;
use crate::error::RecognitionError;
use async_trait::async_trait;
use ocrhub_domain::Language;
use ocrhub_domain::config::OcrConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Tesseract driven through its command line, one process per page.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    model_dir: Option<PathBuf>,
    psm: u8,
    thread_limit: u32,
    timeout: Duration,
}

impl TesseractEngine {
    #[must_use]
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            binary: config.engine_binary.clone(),
            model_dir: config.model_dir.clone(),
            psm: config.page_segmentation_mode,
            thread_limit: config.thread_limit.max(1),
            timeout: Duration::from_secs(config.timeout_seconds.max(1)),
        }
    }

    /// Arguments for recognizing `image`, excluding the binary itself.
    #[must_use]
    pub fn arguments(&self, image: &Path, language: Language) -> Vec<std::ffi::OsString> {
        let mut args: Vec<std::ffi::OsString> = vec![
            image.into(),
            "stdout".into(),
            "-l".into(),
            language.engine_code().into(),
            "--psm".into(),
            self.psm.to_string().into(),
        ];
        if let Some(dir) = &self.model_dir {
            args.push("--tessdata-dir".into());
            args.push(dir.into());
        }
        args.push("tsv".into());
        args
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.env("OMP_THREAD_LIMIT", self.thread_limit.to_string());
        cmd
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn version(&self) -> Result<String, RecognitionError> {
        let mut cmd = self.command();
        cmd.arg("--version");
        let output = command::run(cmd, self.timeout).await?;

        // Older releases print the banner on stderr.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        stdout
            .lines()
            .chain(stderr.lines())
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| RecognitionError::Engine {
                message: command::failure_message(&output).into(),
                context: Some("Reading engine version".into()),
            })
    }

    async fn recognize(&self, image: &Path, language: Language) -> Result<RecognizedPage, RecognitionError> {
        let mut cmd = self.command();
        cmd.args(self.arguments(image, language));

        let output = command::run(cmd, self.timeout).await?;
        if !output.status.success() {
            return Err(RecognitionError::Engine {
                message: command::failure_message(&output).into(),
                context: Some(image.display().to_string().into()),
            });
        }

        let page = parse_tsv(&String::from_utf8_lossy(&output.stdout))?;
        debug!(image = %image.display(), lines = page.lines.len(), "Page recognized");
        Ok(page)
    }
}
