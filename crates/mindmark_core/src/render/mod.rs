//! Render target contracts for the mind-map visualization.
//!
//! # Responsibility
//! - Define the create/update/fit/dispose lifecycle of a visualization.
//! - Expose the surface markup that exports read from.
//!
//! # Invariants
//! - `create` is called once per hosting view; later edits go through
//!   `update` followed by `fit`.
//! - `update` keeps camera (pan/zoom) and fold state.
//! - Nothing on a handle can reach back into text state.

pub mod svg;

use crate::model::outline::OutlineTree;

/// Factory for long-lived visualization handles.
pub trait RenderTarget {
    type Handle: VisualizationHandle;

    /// Creates the visualization for the first non-empty outline.
    fn create(&self, tree: &OutlineTree) -> Self::Handle;
}

/// Live, mutable visualization surface.
pub trait VisualizationHandle {
    /// Replaces the rendered data in place.
    fn update(&mut self, tree: &OutlineTree);
    /// Recomputes the visible frame around current content.
    fn fit(&mut self);
    /// Serializes the current surface as standalone SVG markup.
    fn markup(&self) -> String;
    /// Releases surface resources. Further calls must be harmless.
    fn dispose(&mut self);
}
