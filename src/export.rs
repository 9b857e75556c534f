//! Export and share.
//!
//! [`ExportPipeline`] turns the frame on screen into a PNG file through an injected
//! [`ExportSink`] and remembers the result per [`Generation`], so tapping the same image twice
//! writes it once. The session clears the memo as soon as the text changes.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use crate::debounce::{Frame, Generation};
use crate::error::{ExportError, GuardViolation, Result};

/// MIME type of every exported artifact.
pub const MIME_TYPE: &str = "image/png";

/// File name of the exported artifact inside the sink.
pub const ARTIFACT_NAME: &str = "shared_image.png";

/// Sub-directory of the export root that holds artifacts.
pub const IMAGES_DIR: &str = "images";

/// Text attached to shared images.
pub const DEFAULT_CAPTION: &str = "check out this qr code I generated";

/// Title of the host's share chooser.
pub const CHOOSER_TITLE: &str = "qr generator";

/// Where exported bytes go.
pub trait ExportSink {
    /// Stores `bytes` under `name`, replacing any previous content, and returns the location.
    fn persist(
        &self,
        name: &str,
        bytes: &[u8],
    ) -> impl Future<Output = io::Result<PathBuf>> + Send;
}

/// Writes artifacts to `<root>/images/`.
#[derive(Debug, Clone)]
pub struct FileExportSink {
    root: PathBuf,
}

impl FileExportSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }
}

impl ExportSink for FileExportSink {
    async fn persist(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let dir = self.images_dir();
        tokio::fs::create_dir_all(&dir).await?;

        // Write to a temp file first, then rename so readers never see a partial image
        let path = dir.join(name);
        let temp_path = path.with_extension("png.tmp");
        tokio::fs::write(&temp_path, bytes).await?;
        if let Err(err) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(err);
        }
        Ok(path)
    }
}

/// A persisted, shareable image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedArtifact {
    /// Generation of the frame the artifact was produced from.
    pub generation: Generation,
    pub path: PathBuf,
}

impl ExportedArtifact {
    pub fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }

    /// `file://` reference handed to share targets.
    pub fn uri(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

/// What the host share capability receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub artifact: ExportedArtifact,
    pub mime_type: &'static str,
    pub caption: String,
    pub chooser_title: &'static str,
}

impl ShareRequest {
    pub fn new(artifact: ExportedArtifact, caption: impl Into<String>) -> Self {
        Self {
            artifact,
            mime_type: MIME_TYPE,
            caption: caption.into(),
            chooser_title: CHOOSER_TITLE,
        }
    }
}

/// The host's "share this artifact" capability.
pub trait ShareSink {
    fn share(&self, request: &ShareRequest);
}

/// Memoizing exporter.
#[derive(Debug)]
pub struct ExportPipeline<S> {
    sink: S,
    cached: Option<ExportedArtifact>,
    persisted: u64,
}

impl<S: ExportSink> ExportPipeline<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            cached: None,
            persisted: 0,
        }
    }

    /// Exports `frame`, reusing the cached artifact when it was produced from the same frame.
    ///
    /// `text` is the current input text and `current` the generation it belongs to; both may
    /// already be ahead of the frame. The artifact is only cached when `frame` is current.
    ///
    /// # Errors
    ///
    /// - [`GuardViolation::BlankText`] when `text` is blank; nothing is written.
    /// - [`ExportError`] when the image cannot be encoded or written; nothing is cached.
    pub async fn export(
        &mut self,
        frame: &Frame,
        text: &str,
        current: Generation,
    ) -> Result<ExportedArtifact> {
        if text.trim().is_empty() {
            return Err(GuardViolation::BlankText.into());
        }
        let cached = self.cached.as_ref().filter(|a| a.generation == frame.generation);
        if let Some(artifact) = cached {
            tracing::debug!(generation = %frame.generation, "reusing exported image");
            return Ok(artifact.clone());
        }

        let bytes = frame
            .image
            .to_png()
            .map_err(|source| ExportError::Png { source })?;
        let path = match self.sink.persist(ARTIFACT_NAME, &bytes).await {
            Ok(path) => path,
            Err(source) => {
                tracing::error!(
                    generation = %frame.generation,
                    error = %source,
                    "failed to export image"
                );
                return Err(ExportError::Io { source }.into());
            }
        };
        self.persisted += 1;
        tracing::info!(
            generation = %frame.generation,
            path = %path.display(),
            bytes = bytes.len(),
            "exported image"
        );

        let artifact = ExportedArtifact {
            generation: frame.generation,
            path,
        };
        if frame.generation == current {
            self.cached = Some(artifact.clone());
        } else {
            tracing::debug!(
                generation = %frame.generation,
                current = %current,
                "exported a lagging frame, not caching"
            );
        }
        Ok(artifact)
    }

    /// Drops the cached artifact unless it was produced from `generation`.
    pub fn retain(&mut self, generation: Generation) {
        if self.cached.as_ref().is_some_and(|a| a.generation != generation) {
            self.invalidate();
        }
    }

    /// Forgets the cached artifact.
    pub fn invalidate(&mut self) {
        if let Some(artifact) = self.cached.take() {
            tracing::trace!(generation = %artifact.generation, "export cache invalidated");
        }
    }

    pub fn cached(&self) -> Option<&ExportedArtifact> {
        self.cached.as_ref()
    }

    /// Number of successful writes to the sink.
    pub fn persist_count(&self) -> u64 {
        self.persisted
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

/// Returns the default export root for `cache_dir`.
pub fn default_export_root(cache_dir: &Path) -> PathBuf {
    cache_dir.join(env!("CARGO_PKG_NAME"))
}
