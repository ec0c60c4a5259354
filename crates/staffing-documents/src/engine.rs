//! HTML to PDF engines

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("engine produced no output")]
    EmptyOutput,
    #[error("render timed out after {0:?}")]
    TimedOut(Duration),
    #[error("render task aborted: {0}")]
    Aborted(String),
}

/// Converts a complete HTML document into PDF bytes
#[async_trait]
pub trait PdfEngine: Send + Sync {
    async fn render_pdf(&self, html: &str) -> Result<Bytes, EngineError>;

    fn name(&self) -> &str;
}

/// Run `engine` on its own task and give up after `timeout`.
///
/// On timeout the task is aborted, which drops any child process it spawned.
pub async fn render_with_timeout(
    engine: Arc<dyn PdfEngine>,
    html: String,
    timeout: Duration,
) -> Result<Bytes, EngineError> {
    let task = tokio::spawn(async move { engine.render_pdf(&html).await });
    let abort = task.abort_handle();

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(EngineError::Aborted(join_error.to_string())),
        Err(_) => {
            abort.abort();
            Err(EngineError::TimedOut(timeout))
        }
    }
}

/// Headless Chromium printing to PDF
pub struct ChromiumEngine {
    binary: PathBuf,
    work_dir: PathBuf,
}

impl ChromiumEngine {
    /// `work_dir` holds the transient html/pdf pair of each render and
    /// should be an absolute path
    pub fn new(binary: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            work_dir: work_dir.into(),
        }
    }

    pub fn with_temp_dir(binary: impl Into<PathBuf>) -> Self {
        Self::new(binary, std::env::temp_dir())
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("--headless")
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(format!("file://{}", input.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

/// Removes the transient files of one render, however it ends
struct ScratchFiles {
    paths: [PathBuf; 2],
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in &self.paths {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = ?path, error = %e, "Failed to remove render scratch file");
                }
            }
        }
    }
}

#[async_trait]
impl PdfEngine for ChromiumEngine {
    #[instrument(skip(self, html), fields(engine = "chromium", html_len = html.len()))]
    async fn render_pdf(&self, html: &str) -> Result<Bytes, EngineError> {
        tokio::fs::create_dir_all(&self.work_dir).await?;
        let stem = format!("contract-{}", uuid::Uuid::new_v4());
        let input = self.work_dir.join(format!("{}.html", stem));
        let output = self.work_dir.join(format!("{}.pdf", stem));
        let _scratch = ScratchFiles {
            paths: [input.clone(), output.clone()],
        };

        tokio::fs::write(&input, html).await?;
        let result = self.command(&input, &output).output().await?;
        if !result.status.success() {
            return Err(EngineError::Failed {
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        let pdf = tokio::fs::read(&output).await?;
        if pdf.is_empty() {
            return Err(EngineError::EmptyOutput);
        }
        debug!(size = pdf.len(), "PDF rendered");
        Ok(Bytes::from(pdf))
    }

    fn name(&self) -> &str {
        "chromium"
    }
}

/// Engine for tests: records every document and answers with fixed bytes
pub struct RecordingEngine {
    output: Bytes,
    delay: Option<Duration>,
    failure: Option<String>,
    rendered: Mutex<Vec<String>>,
}

impl Default for RecordingEngine {
    fn default() -> Self {
        Self {
            output: Bytes::from_static(b"%PDF-1.7\n%recorded\n"),
            delay: None,
            failure: None,
            rendered: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, output: impl Into<Bytes>) -> Self {
        self.output = output.into();
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail every render with `message`
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Documents rendered so far
    pub async fn rendered(&self) -> Vec<String> {
        self.rendered.lock().await.clone()
    }
}

#[async_trait]
impl PdfEngine for RecordingEngine {
    async fn render_pdf(&self, html: &str) -> Result<Bytes, EngineError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.rendered.lock().await.push(html.to_string());
        match &self.failure {
            Some(message) => Err(EngineError::Failed {
                status: "exit status: 1".to_string(),
                stderr: message.clone(),
            }),
            None => Ok(self.output.clone()),
        }
    }

    fn name(&self) -> &str {
        "recording"
    }
}
