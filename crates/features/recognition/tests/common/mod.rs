#![allow(dead_code, unreachable_pub)]

use async_trait::async_trait;
use ocrhub_domain::Language;
use ocrhub_domain::config::ApiConfig;
use ocrhub_recognition::{OcrEngine, PageRasterizer, RecognitionError, RecognizedLine, RecognizedPage};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Semaphore;

/// Echoes the image file's contents back as recognized lines.
#[derive(Debug, Default)]
pub struct EchoEngine {
    pub calls: Mutex<Vec<(PathBuf, Language)>>,
}

#[async_trait]
impl OcrEngine for EchoEngine {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn version(&self) -> Result<String, RecognitionError> {
        Ok("echo 1.0".to_owned())
    }

    async fn recognize(&self, image: &Path, language: Language) -> Result<RecognizedPage, RecognitionError> {
        let bytes = tokio::fs::read(image).await?;
        let content = String::from_utf8_lossy(&bytes);
        self.calls.lock().unwrap().push((image.to_path_buf(), language));

        let lines = content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|text| RecognizedLine {
                bbox: vec![[0, 0], [10, 0], [10, 5], [0, 5]],
                text: text.to_owned(),
                confidence: 0.9,
            })
            .collect();
        Ok(RecognizedPage { lines })
    }
}

/// Engine that fails in a fixed way.
#[derive(Debug, Clone, Copy)]
pub enum BrokenEngine {
    Missing,
    Crashing,
    Hanging,
}

#[async_trait]
impl OcrEngine for BrokenEngine {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn version(&self) -> Result<String, RecognitionError> {
        Err(RecognitionError::EngineUnavailable { binary: "broken".into(), context: None })
    }

    async fn recognize(&self, _image: &Path, _language: Language) -> Result<RecognizedPage, RecognitionError> {
        match self {
            Self::Missing => Err(RecognitionError::EngineUnavailable { binary: "broken".into(), context: None }),
            Self::Crashing => Err(RecognitionError::Engine { message: "exit status: 1".into(), context: None }),
            Self::Hanging => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(RecognitionError::Timeout { seconds: 3600, context: None })
            },
        }
    }
}

/// Blocks every page until the test releases it.
#[derive(Debug)]
pub struct GatedEngine {
    pub started: AtomicUsize,
    pub release: Semaphore,
}

impl GatedEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { started: AtomicUsize::new(0), release: Semaphore::new(0) })
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Polls until `count` pages have entered the engine.
    pub async fn wait_started(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.started() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }
}

#[async_trait]
impl OcrEngine for GatedEngine {
    fn name(&self) -> &'static str {
        "gated"
    }

    async fn version(&self) -> Result<String, RecognitionError> {
        Ok("gated 1.0".to_owned())
    }

    async fn recognize(&self, _image: &Path, _language: Language) -> Result<RecognizedPage, RecognitionError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.release.acquire().await.unwrap().forget();
        Ok(RecognizedPage { lines: Vec::new() })
    }
}

/// Writes `pages` fake JPEGs whose contents name their page and source.
#[derive(Debug)]
pub struct FakeRasterizer {
    pub pages: u32,
}

#[async_trait]
impl PageRasterizer for FakeRasterizer {
    async fn rasterize(&self, pdf: &Path, out_dir: &Path, max_pages: u32) -> Result<Vec<PathBuf>, RecognitionError> {
        let name = pdf.file_name().unwrap().to_string_lossy().into_owned();
        let mut out = Vec::new();
        for page in 1..=self.pages.min(max_pages.max(1)) {
            let path = out_dir.join(format!("page-{page}.jpg"));
            tokio::fs::write(&path, format!("page {page} of {name}\n")).await?;
            out.push(path);
        }
        Ok(out)
    }
}

pub struct Sandbox {
    pub root: TempDir,
    pub config: ApiConfig,
}

impl Sandbox {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let mut config = ApiConfig::default();
        config.storage.input_dir = root.path().join("input");
        config.storage.output_dir = root.path().join("output");
        std::fs::create_dir_all(&config.storage.input_dir).unwrap();
        std::fs::create_dir_all(&config.storage.output_dir).unwrap();
        Self { root, config }
    }

    pub fn input_entries(&self) -> usize {
        std::fs::read_dir(&self.config.storage.input_dir).unwrap().count()
    }

    /// Waits for cleanup handed to the blocking pool by a dropped job.
    pub async fn wait_input_empty(&self) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.input_entries() > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    pub fn output_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(&self.config.storage.output_dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }
}

pub fn echo() -> Arc<EchoEngine> {
    Arc::new(EchoEngine::default())
}

pub fn rasterizer(pages: u32) -> Arc<FakeRasterizer> {
    Arc::new(FakeRasterizer { pages })
}
