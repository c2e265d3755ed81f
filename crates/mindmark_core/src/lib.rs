//! Core logic for mindmark: pasted text to outline to mind-map.
//! This crate owns normalization, view synchronization and export.

pub mod config;
pub mod export;
pub mod generate;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod preview;
pub mod render;
pub mod session;
pub mod transform;
pub mod view;

pub use config::{AppConfig, ConfigError, OutlineServiceConfig};
pub use export::{
    ArtifactSink, DirectorySink, ExportArtifact, ExportError, ExportFormat, ExportResult,
    MemorySink, MindMapExporter, PendingExport, RasterEncoding, INTERCHANGE_HEADER,
};
pub use generate::{
    build_request, ChatMessage, ChatRequest, GenerateError, OutlineGenerator, OutlineTransport,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::outline::{OutlineLine, OutlineNode, OutlineTree};
pub use normalize::{classify, normalize, Normalization};
pub use preview::{HtmlPreview, PreviewRenderer};
pub use render::svg::{Camera, MapStyle, SvgMindMap, SvgRenderTarget};
pub use render::{RenderTarget, VisualizationHandle};
pub use session::SyncController;
pub use transform::{MarkdownTransformer, OutlineTransformer};
pub use view::MindMapView;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
