use crate::engine::OcrEngine;
use crate::error::RecognitionError;
use async_trait::async_trait;
use ocrhub_domain::Language;
use ocrhub_kernel::safe_nanoid;
use ocrhub_kernel::server::{HealthCheck, HealthError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const PROBE_WIDTH: usize = 100;
const PROBE_HEIGHT: usize = 50;

/// Binary PGM (P5) of a blank white `100x50` page.
#[must_use]
pub fn blank_probe_image() -> Vec<u8> {
    let header = format!("P5\n{PROBE_WIDTH} {PROBE_HEIGHT}\n255\n");
    let mut image = Vec::with_capacity(header.len() + PROBE_WIDTH * PROBE_HEIGHT);
    image.extend_from_slice(header.as_bytes());
    image.resize(header.len() + PROBE_WIDTH * PROBE_HEIGHT, u8::MAX);
    image
}

/// Readiness probe that runs a real Spanish recognition on a blank page.
#[derive(Debug, Clone)]
pub struct EngineHealthCheck {
    engine: Arc<dyn OcrEngine>,
    scratch_dir: PathBuf,
    timeout: Duration,
}

impl EngineHealthCheck {
    #[must_use]
    pub fn new(engine: Arc<dyn OcrEngine>, scratch_dir: impl AsRef<Path>, timeout: Duration) -> Self {
        Self { engine, scratch_dir: scratch_dir.as_ref().to_path_buf(), timeout }
    }

    async fn probe(&self, image: &Path) -> Result<(), RecognitionError> {
        tokio::fs::write(image, blank_probe_image()).await?;
        self.engine.recognize(image, Language::Spanish).await?;
        Ok(())
    }
}

#[async_trait]
impl HealthCheck for EngineHealthCheck {
    fn name(&self) -> &'static str {
        "ocr_engine"
    }

    async fn check(&self) -> Result<(), HealthError> {
        let image = self.scratch_dir.join(format!(".health-{}.pgm", safe_nanoid!()));

        let outcome = tokio::time::timeout(self.timeout, self.probe(&image)).await;
        if let Err(err) = tokio::fs::remove_file(&image).await
            && err.kind() != std::io::ErrorKind::NotFound
        {
            debug!(path = %image.display(), error = %err, "Failed to remove health probe image");
        }

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(HealthError::Unhealthy { message: err.to_string().into(), context: Some(self.engine.name().into()) }),
            Err(_) => Err(HealthError::Timeout { seconds: self.timeout.as_secs(), context: Some(self.engine.name().into()) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_image_is_a_white_pgm() {
        let image = blank_probe_image();
        let header = b"P5\n100 50\n255\n";

        assert!(image.starts_with(header));
        assert_eq!(image.len(), header.len() + 5000);
        assert!(image[header.len()..].iter().all(|&px| px == 255));
    }
}
