//! Export artifacts and sinks.
//!
//! # Responsibility
//! - Define the artifact formats a mind-map session can produce.
//! - Build text artifacts (vector, interchange, markdown) from current state.
//! - Persist artifacts through an injected `ArtifactSink`.
//!
//! # Invariants
//! - Artifacts are derived deterministically from the inputs at export time.
//! - Interchange content is exactly `#mindmap\n` + trimmed markdown.
//! - Export failures never touch session text state.

pub mod raster;

use futures::future::BoxFuture;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Mutex;

pub use raster::{rasterize, RasterEncoding, JPEG_QUALITY};

/// First line of every interchange file.
pub const INTERCHANGE_HEADER: &str = "#mindmap";

pub type ExportResult<T> = Result<T, ExportError>;

/// Future returned by asynchronous (raster) exports.
///
/// Resolves to `Ok(None)` when there was no surface to export. Encoding runs
/// on a Tokio blocking worker when polled inside a runtime and inline
/// otherwise, so any executor may drive it.
pub type PendingExport = BoxFuture<'static, ExportResult<Option<PathBuf>>>;

/// Export failure.
#[derive(Debug)]
pub enum ExportError {
    /// Surface markup could not be parsed as SVG.
    SvgParse(String),
    /// Pixel buffer allocation or image encoding failed.
    Raster(String),
    /// Background encode task was cancelled or panicked.
    Join(String),
    /// Writing the artifact failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SvgParse(message) => write!(f, "invalid surface markup: {message}"),
            Self::Raster(message) => write!(f, "raster encoding failed: {message}"),
            Self::Join(message) => write!(f, "raster task failed: {message}"),
            Self::Io { path, source } => {
                write!(f, "failed to write `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<tokio::task::JoinError> for ExportError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Join(value.to_string())
    }
}

/// Output artifact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Surface markup as `mindmap.svg`.
    Svg,
    /// Primary raster encoding, `mindmap.png`.
    Png,
    /// Secondary raster encoding, `mindmap.jpg`.
    Jpeg,
    /// Header-tagged markdown for outlining tools, `mindmap.xmind.md`.
    Interchange,
    /// Plain editable markdown, `mindmap.md`.
    Markdown,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        Self::Svg,
        Self::Png,
        Self::Jpeg,
        Self::Interchange,
        Self::Markdown,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Svg => "mindmap.svg",
            Self::Png => "mindmap.png",
            Self::Jpeg => "mindmap.jpg",
            Self::Interchange => "mindmap.xmind.md",
            Self::Markdown => "mindmap.md",
        }
    }

    /// Short name used on the command line and in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Interchange => "xmind",
            Self::Markdown => "md",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "xmind" | "interchange" => Some(Self::Interchange),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    /// Whether this format reads the visualization surface.
    pub fn needs_surface(self) -> bool {
        matches!(self, Self::Svg | Self::Png | Self::Jpeg)
    }
}

/// Materialized export output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn file_name(&self) -> &'static str {
        self.format.file_name()
    }
}

/// Builds the vector artifact from surface markup, verbatim.
pub fn vector_artifact(markup: &str) -> ExportArtifact {
    ExportArtifact {
        format: ExportFormat::Svg,
        bytes: markup.as_bytes().to_vec(),
    }
}

/// Builds the interchange artifact: header line plus trimmed markdown.
pub fn interchange_artifact(markdown: &str) -> ExportArtifact {
    ExportArtifact {
        format: ExportFormat::Interchange,
        bytes: format!("{INTERCHANGE_HEADER}\n{}", markdown.trim()).into_bytes(),
    }
}

/// Builds the plain markdown artifact without any header.
pub fn markdown_artifact(markdown: &str) -> ExportArtifact {
    ExportArtifact {
        format: ExportFormat::Markdown,
        bytes: markdown.as_bytes().to_vec(),
    }
}

/// Returns the markdown body of interchange content, or `None` when the
/// header line is missing.
pub fn strip_interchange_header(content: &str) -> Option<&str> {
    content
        .strip_prefix(INTERCHANGE_HEADER)
        .and_then(|rest| rest.strip_prefix('\n'))
}

/// Destination for exported artifacts.
pub trait ArtifactSink: Send + Sync {
    /// Persists one artifact and returns where it landed.
    fn save(&self, artifact: &ExportArtifact) -> ExportResult<PathBuf>;
}

/// Writes artifacts under a local directory using their standard names.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactSink for DirectorySink {
    fn save(&self, artifact: &ExportArtifact) -> ExportResult<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.dir.join(artifact.file_name());
        std::fs::write(&path, &artifact.bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Keeps artifacts in memory; useful for embedding hosts and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    saved: Mutex<Vec<ExportArtifact>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything saved so far, in save order.
    pub fn artifacts(&self) -> Vec<ExportArtifact> {
        match self.saved.lock() {
            Ok(saved) => saved.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ArtifactSink for MemorySink {
    fn save(&self, artifact: &ExportArtifact) -> ExportResult<PathBuf> {
        match self.saved.lock() {
            Ok(mut saved) => saved.push(artifact.clone()),
            Err(poisoned) => poisoned.into_inner().push(artifact.clone()),
        }
        Ok(PathBuf::from(artifact.file_name()))
    }
}

/// Export operations offered by a rendering component.
///
/// Surface-backed exports resolve to `Ok(None)` when no visualization
/// exists yet. Text-backed exports always produce a file.
pub trait MindMapExporter {
    fn export_vector(&self) -> ExportResult<Option<PathBuf>>;
    /// PNG raster export.
    fn export_raster_primary(&self) -> PendingExport;
    /// JPEG raster export.
    fn export_raster_secondary(&self) -> PendingExport;
    fn export_interchange(&self) -> ExportResult<PathBuf>;
    fn export_markdown(&self) -> ExportResult<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::{
        interchange_artifact, markdown_artifact, strip_interchange_header, vector_artifact,
        ArtifactSink, DirectorySink, ExportFormat,
    };

    #[test]
    fn formats_use_fixed_file_names() {
        let names = ExportFormat::ALL
            .iter()
            .map(|format| format.file_name())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "mindmap.svg",
                "mindmap.png",
                "mindmap.jpg",
                "mindmap.xmind.md",
                "mindmap.md"
            ]
        );
        assert_eq!(ExportFormat::parse(" JPEG "), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::parse("pdf"), None);
        assert!(!ExportFormat::Interchange.needs_surface());
    }

    #[test]
    fn interchange_prepends_header_to_trimmed_markdown() {
        let artifact = interchange_artifact("\n\n- a\n  - b\n\n");
        let content = String::from_utf8(artifact.bytes).unwrap();
        assert_eq!(content, "#mindmap\n- a\n  - b");
        assert_eq!(strip_interchange_header(&content), Some("- a\n  - b"));
        assert_eq!(strip_interchange_header("- a"), None);
    }

    #[test]
    fn vector_and_markdown_are_verbatim() {
        assert_eq!(vector_artifact("<svg/>").bytes, b"<svg/>".to_vec());
        assert_eq!(markdown_artifact("  - x \n").bytes, b"  - x \n".to_vec());
    }

    #[test]
    fn directory_sink_creates_missing_dirs() {
        let temp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(temp.path().join("nested/out"));
        let path = sink.save(&markdown_artifact("- a")).unwrap();
        assert!(path.ends_with("nested/out/mindmap.md"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "- a");
    }
}
