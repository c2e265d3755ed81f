//! Editing session synchronization.
//!
//! # Responsibility
//! - Own raw input, editable markdown and the edit-mode flag.
//! - Propagate edits one way: text -> markdown -> preview + mind-map.
//!
//! # Invariants
//! - Raw-text edits always pass through the normalizer.
//! - Markdown edits bypass the normalizer and leave raw text untouched.
//! - Mode toggles never mutate text state.
//! - Nothing reachable from the visualization writes back into text state.

use crate::config::AppConfig;
use crate::export::{DirectorySink, MindMapExporter};
use crate::normalize::classify;
use crate::preview::{HtmlPreview, PreviewRenderer};
use crate::render::svg::SvgRenderTarget;
use crate::render::RenderTarget;
use crate::transform::{MarkdownTransformer, OutlineTransformer};
use crate::view::MindMapView;
use log::debug;
use std::sync::Arc;

/// Single-user editing session controller.
pub struct SyncController<
    R: RenderTarget = SvgRenderTarget,
    T: OutlineTransformer = MarkdownTransformer,
    P: PreviewRenderer = HtmlPreview,
> {
    raw_text: String,
    markdown: String,
    preview_html: String,
    editing: bool,
    preview: P,
    view: MindMapView<R, T>,
}

impl SyncController {
    /// Builds the default stack exporting into `config.export_dir`.
    pub fn from_config(config: &AppConfig) -> Self {
        let sink = Arc::new(DirectorySink::new(config.export_dir.clone()));
        let view = MindMapView::new(SvgRenderTarget::default(), MarkdownTransformer, sink);
        Self::new(view, HtmlPreview)
    }
}

impl<R: RenderTarget, T: OutlineTransformer, P: PreviewRenderer> SyncController<R, T, P> {
    /// Starts an empty session in preview mode.
    pub fn new(view: MindMapView<R, T>, preview: P) -> Self {
        Self {
            raw_text: String::new(),
            markdown: String::new(),
            preview_html: String::new(),
            editing: false,
            preview,
            view,
        }
    }

    /// Handles an edit of the left (raw text) panel.
    pub fn on_raw_text_edit(&mut self, new_text: impl Into<String>) {
        self.raw_text = new_text.into();
        let normalized = classify(&self.raw_text);
        let rule = normalized.rule();
        self.markdown = normalized.render(&self.raw_text);
        debug!(
            "event=raw_text_edit module=session status=ok rule={} input_chars={} markdown_chars={}",
            rule,
            self.raw_text.chars().count(),
            self.markdown.chars().count()
        );
        self.forward();
    }

    /// Handles a direct edit of the middle (markdown) panel.
    pub fn on_markdown_edit(&mut self, new_markdown: impl Into<String>) {
        self.markdown = new_markdown.into();
        debug!(
            "event=markdown_edit module=session status=ok markdown_chars={}",
            self.markdown.chars().count()
        );
        self.forward();
    }

    /// Switches the middle panel to the raw markdown editor.
    pub fn enter_edit_mode(&mut self) {
        self.editing = true;
    }

    /// Switches the middle panel back to rendered preview.
    pub fn exit_edit_mode(&mut self) {
        self.editing = false;
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Current editable markdown.
    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    /// HTML rendered from the current markdown.
    pub fn preview_html(&self) -> &str {
        &self.preview_html
    }

    pub fn view(&self) -> &MindMapView<R, T> {
        &self.view
    }

    /// Surface access for camera and fold interactions.
    ///
    /// The surface has no path back into session text.
    pub fn surface_mut(&mut self) -> Option<&mut R::Handle> {
        self.view.surface_mut()
    }

    /// Export interface of the hosting view.
    pub fn exporter(&self) -> &impl MindMapExporter {
        &self.view
    }

    fn forward(&mut self) {
        self.preview_html = self.preview.render(&self.markdown);
        self.view.show(&self.markdown);
    }
}
