//! Hosting view for the mind-map visualization.
//!
//! # Responsibility
//! - Own the visualization handle for the lifetime of the view.
//! - Choose create-once versus update-in-place when markdown arrives.
//! - Serve export requests from the live surface and current markdown.
//!
//! # Invariants
//! - The handle is created lazily on the first non-empty markdown.
//! - Once created, the handle is only updated, never rebuilt.
//! - The handle is disposed exactly once, at the latest on drop.
//! - Surface interactions (pan, zoom, fold) never flow back into text.

use crate::export::{
    interchange_artifact, markdown_artifact, rasterize, vector_artifact, ArtifactSink,
    ExportArtifact, ExportResult, MindMapExporter, PendingExport, RasterEncoding,
};
use crate::render::svg::SvgRenderTarget;
use crate::render::{RenderTarget, VisualizationHandle};
use crate::transform::{MarkdownTransformer, OutlineTransformer};
use futures::future::{self, FutureExt};
use log::{debug, error, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Render-target host with lazily created visualization.
pub struct MindMapView<R: RenderTarget = SvgRenderTarget, T: OutlineTransformer = MarkdownTransformer>
{
    target: R,
    transformer: T,
    handle: Option<R::Handle>,
    markdown: String,
    sink: Arc<dyn ArtifactSink>,
}

impl<R: RenderTarget, T: OutlineTransformer> MindMapView<R, T> {
    pub fn new(target: R, transformer: T, sink: Arc<dyn ArtifactSink>) -> Self {
        Self {
            target,
            transformer,
            handle: None,
            markdown: String::new(),
            sink,
        }
    }

    /// Pushes markdown into the visualization.
    ///
    /// # Side effects
    /// - First non-empty call creates the handle.
    /// - Later calls update the existing handle and refit its frame.
    pub fn show(&mut self, markdown: &str) {
        self.markdown.clear();
        self.markdown.push_str(markdown);

        if let Some(handle) = self.handle.as_mut() {
            let tree = self.transformer.transform(markdown);
            handle.update(&tree);
            handle.fit();
            debug!(
                "event=view_update module=view status=ok nodes={}",
                tree.root.node_count()
            );
            return;
        }

        if markdown.trim().is_empty() {
            debug!("event=view_render module=view status=skip reason=empty_markdown");
            return;
        }

        let tree = self.transformer.transform(markdown);
        self.handle = Some(self.target.create(&tree));
        info!(
            "event=view_create module=view status=ok nodes={}",
            tree.root.node_count()
        );
    }

    /// Markdown most recently pushed into this view.
    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    pub fn is_created(&self) -> bool {
        self.handle.is_some()
    }

    pub fn surface(&self) -> Option<&R::Handle> {
        self.handle.as_ref()
    }

    /// Direct surface access for camera and fold interactions.
    pub fn surface_mut(&mut self) -> Option<&mut R::Handle> {
        self.handle.as_mut()
    }

    /// Tears the visualization down. Safe to call more than once.
    pub fn dispose(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.dispose();
            info!("event=view_dispose module=view status=ok");
        }
    }

    fn raster_job(&self, encoding: RasterEncoding) -> PendingExport {
        let format = encoding.format();
        let Some(markup) = self.handle.as_ref().map(VisualizationHandle::markup) else {
            info!(
                "event=export module=export status=skip format={} reason=no_surface",
                format.as_str()
            );
            return future::ready(Ok(None)).boxed();
        };
        let sink = Arc::clone(&self.sink);

        async move {
            let started_at = Instant::now();
            let encoded = encode_off_thread(markup, encoding).await;
            let saved = encoded.and_then(|artifact| {
                let bytes = artifact.bytes.len();
                sink.save(&artifact).map(|path| (path, bytes))
            });
            match saved {
                Ok((path, bytes)) => {
                    info!(
                        "event=export module=export status=ok format={} bytes={} duration_ms={}",
                        format.as_str(),
                        bytes,
                        started_at.elapsed().as_millis()
                    );
                    Ok(Some(path))
                }
                Err(err) => {
                    error!(
                        "event=export module=export status=error format={} duration_ms={} error={}",
                        format.as_str(),
                        started_at.elapsed().as_millis(),
                        err
                    );
                    Err(err)
                }
            }
        }
        .boxed()
    }
}

impl<R: RenderTarget, T: OutlineTransformer> MindMapExporter for MindMapView<R, T> {
    fn export_vector(&self) -> ExportResult<Option<PathBuf>> {
        let Some(handle) = self.handle.as_ref() else {
            info!("event=export module=export status=skip format=svg reason=no_surface");
            return Ok(None);
        };
        save_logged(self.sink.as_ref(), vector_artifact(&handle.markup())).map(Some)
    }

    fn export_raster_primary(&self) -> PendingExport {
        self.raster_job(RasterEncoding::Png)
    }

    fn export_raster_secondary(&self) -> PendingExport {
        self.raster_job(RasterEncoding::Jpeg)
    }

    fn export_interchange(&self) -> ExportResult<PathBuf> {
        save_logged(self.sink.as_ref(), interchange_artifact(&self.markdown))
    }

    fn export_markdown(&self) -> ExportResult<PathBuf> {
        save_logged(self.sink.as_ref(), markdown_artifact(&self.markdown))
    }
}

impl<R: RenderTarget, T: OutlineTransformer> Drop for MindMapView<R, T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Rasterizes on a blocking worker of the current runtime, or inline when
/// polled outside one.
async fn encode_off_thread(
    markup: String,
    encoding: RasterEncoding,
) -> ExportResult<ExportArtifact> {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        return rasterize(&markup, encoding);
    };
    match runtime
        .spawn_blocking(move || rasterize(&markup, encoding))
        .await
    {
        Ok(result) => result,
        Err(err) => Err(err.into()),
    }
}

fn save_logged(sink: &dyn ArtifactSink, artifact: ExportArtifact) -> ExportResult<PathBuf> {
    let format = artifact.format.as_str();
    match sink.save(&artifact) {
        Ok(path) => {
            info!(
                "event=export module=export status=ok format={} bytes={}",
                format,
                artifact.bytes.len()
            );
            Ok(path)
        }
        Err(err) => {
            error!(
                "event=export module=export status=error format={} error={}",
                format, err
            );
            Err(err)
        }
    }
}
