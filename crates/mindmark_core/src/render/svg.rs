//! Default SVG mind-map render target.
//!
//! # Responsibility
//! - Lay out an outline tree left-to-right with branch coloring.
//! - Keep camera and fold state across data updates.
//! - Emit standalone SVG markup for display and export.
//!
//! # Invariants
//! - Layout is deterministic for the same tree, style and fold set.
//! - `update` never resets the camera; only `reset_camera` does.
//! - Fold state is keyed by label path and survives updates while the path
//!   still exists.

use super::{RenderTarget, VisualizationHandle};
use crate::model::outline::{OutlineNode, OutlineTree};
use log::debug;
use std::collections::HashSet;
use std::fmt::Write;

const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 8.0;
const WIDE_GLYPH_RATIO: f64 = 1.0;
const NARROW_GLYPH_RATIO: f64 = 0.6;

/// Visual constants for layout and markup.
#[derive(Debug, Clone, PartialEq)]
pub struct MapStyle {
    pub font_size: f64,
    pub font_family: String,
    /// Vertical distance between two leaf rows.
    pub row_height: f64,
    /// Gap between a node's right edge and its children.
    pub horizontal_gap: f64,
    /// Horizontal padding inside a node label.
    pub label_padding: f64,
    /// Margin around content when fitting.
    pub frame_padding: f64,
    pub text_color: String,
    /// Branch colors, cycled per top-level branch.
    pub palette: Vec<String>,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            font_family: "sans-serif".to_string(),
            row_height: 32.0,
            horizontal_gap: 48.0,
            label_padding: 6.0,
            frame_padding: 24.0,
            text_color: "#333333".to_string(),
            palette: [
                "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2",
                "#7f7f7f", "#bcbd22", "#17becf",
            ]
            .iter()
            .map(|value| value.to_string())
            .collect(),
        }
    }
}

impl MapStyle {
    fn color(&self, branch: usize) -> &str {
        if self.palette.is_empty() {
            return "#999999";
        }
        &self.palette[branch % self.palette.len()]
    }

    fn label_width(&self, label: &str) -> f64 {
        let glyphs = label
            .chars()
            .map(|c| {
                if c.is_ascii() {
                    NARROW_GLYPH_RATIO
                } else {
                    WIDE_GLYPH_RATIO
                }
            })
            .sum::<f64>();
        glyphs * self.font_size + self.label_padding * 2.0
    }
}

/// User camera applied on top of the fitted frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

/// Visible frame in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One laid-out node.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    /// Labels from the display root down to this node.
    pub path: Vec<String>,
    pub label: String,
    /// Left edge.
    pub x: f64,
    /// Underline position.
    pub y: f64,
    pub width: f64,
    pub depth: usize,
    pub branch: usize,
    pub has_children: bool,
    pub folded: bool,
}

/// Edge from a parent's right end to a child's left end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedLink {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub branch: usize,
}

/// Creates [`SvgMindMap`] handles sharing one style.
#[derive(Debug, Clone, Default)]
pub struct SvgRenderTarget {
    style: MapStyle,
}

impl SvgRenderTarget {
    pub fn new(style: MapStyle) -> Self {
        Self { style }
    }
}

impl RenderTarget for SvgRenderTarget {
    type Handle = SvgMindMap;

    fn create(&self, tree: &OutlineTree) -> SvgMindMap {
        let mut map = SvgMindMap {
            style: self.style.clone(),
            tree: tree.clone(),
            camera: Camera::default(),
            folded: HashSet::new(),
            nodes: Vec::new(),
            links: Vec::new(),
            view_box: empty_view_box(&self.style),
            disposed: false,
        };
        map.relayout();
        map.fit();
        map
    }
}

/// Live SVG mind-map surface.
#[derive(Debug, Clone)]
pub struct SvgMindMap {
    style: MapStyle,
    tree: OutlineTree,
    camera: Camera,
    folded: HashSet<Vec<String>>,
    nodes: Vec<PlacedNode>,
    links: Vec<PlacedLink>,
    view_box: ViewBox,
    disposed: bool,
}

impl SvgMindMap {
    pub fn tree(&self) -> &OutlineTree {
        &self.tree
    }

    pub fn nodes(&self) -> &[PlacedNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[PlacedLink] {
        &self.links
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn view_box(&self) -> ViewBox {
        self.view_box
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Moves the camera by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.camera.x += dx;
        self.camera.y += dy;
    }

    /// Multiplies the zoom factor, clamped to a sane range.
    pub fn zoom(&mut self, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.camera.scale = (self.camera.scale * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn reset_camera(&mut self) {
        self.camera = Camera::default();
    }

    /// Collapses or expands the subtree at `path`.
    ///
    /// Returns the new folded state, or `None` when no node with children
    /// lives at `path`.
    pub fn toggle_fold(&mut self, path: &[&str]) -> Option<bool> {
        let key = path.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let target = self
            .nodes
            .iter()
            .find(|node| node.path == key && node.has_children)?;
        let folded = !target.folded;
        if folded {
            self.folded.insert(key);
        } else {
            self.folded.remove(&key);
        }
        self.relayout();
        Some(folded)
    }

    pub fn is_folded(&self, path: &[&str]) -> bool {
        let key = path.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        self.folded.contains(&key)
    }

    fn relayout(&mut self) {
        let mut builder = LayoutBuilder {
            style: &self.style,
            folded: &self.folded,
            path: Vec::new(),
            nodes: Vec::new(),
            links: Vec::new(),
        };
        if !self.tree.is_empty() {
            let mut cursor = 0.0;
            builder.place(self.tree.display_root(), 0, 0.0, 0, &mut cursor);
        }
        self.nodes = builder.nodes;
        self.links = builder.links;
    }

    fn content_bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.nodes.first()?;
        let above = self.style.font_size * 1.5;
        let mut bounds = (first.x, first.y - above, first.x + first.width, first.y);
        for node in &self.nodes {
            bounds.0 = bounds.0.min(node.x);
            bounds.1 = bounds.1.min(node.y - above);
            bounds.2 = bounds.2.max(node.x + node.width);
            bounds.3 = bounds.3.max(node.y);
        }
        Some(bounds)
    }
}

impl VisualizationHandle for SvgMindMap {
    fn update(&mut self, tree: &OutlineTree) {
        if self.disposed {
            return;
        }
        self.tree = tree.clone();
        self.relayout();
        debug!(
            "event=surface_update module=render status=ok nodes={}",
            self.nodes.len()
        );
    }

    fn fit(&mut self) {
        let padding = self.style.frame_padding;
        self.view_box = match self.content_bounds() {
            Some((min_x, min_y, max_x, max_y)) => ViewBox {
                x: min_x - padding,
                y: min_y - padding,
                width: max_x - min_x + padding * 2.0,
                height: max_y - min_y + padding * 2.0,
            },
            None => empty_view_box(&self.style),
        };
    }

    fn markup(&self) -> String {
        if self.disposed {
            return String::new();
        }
        let mut out = String::new();
        write_markup(self, &mut out).map_or_else(|_| String::new(), |()| out)
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.tree = OutlineTree::default();
        self.nodes.clear();
        self.links.clear();
        self.folded.clear();
    }
}

struct LayoutBuilder<'a> {
    style: &'a MapStyle,
    folded: &'a HashSet<Vec<String>>,
    path: Vec<String>,
    nodes: Vec<PlacedNode>,
    links: Vec<PlacedLink>,
}

impl LayoutBuilder<'_> {
    /// Places `node` and its visible subtree; returns the node's y.
    fn place(
        &mut self,
        node: &OutlineNode,
        depth: usize,
        x: f64,
        branch: usize,
        cursor: &mut f64,
    ) -> f64 {
        self.path.push(node.content.clone());
        let width = self.style.label_width(&node.content);
        let has_children = !node.is_leaf();
        let folded = has_children && self.folded.contains(&self.path);
        let index = self.nodes.len();
        self.nodes.push(PlacedNode {
            path: self.path.clone(),
            label: node.content.clone(),
            x,
            y: 0.0,
            width,
            depth,
            branch,
            has_children,
            folded,
        });

        let y = if !has_children || folded {
            let y = *cursor;
            *cursor += self.style.row_height;
            y
        } else {
            let child_x = x + width + self.style.horizontal_gap;
            let mut placed = Vec::with_capacity(node.children.len());
            for (position, child) in node.children.iter().enumerate() {
                let child_branch = if depth == 0 { position } else { branch };
                let child_y = self.place(child, depth + 1, child_x, child_branch, cursor);
                placed.push((child_y, child_branch));
            }
            let first = placed.first().map_or(*cursor, |entry| entry.0);
            let last = placed.last().map_or(*cursor, |entry| entry.0);
            let y = (first + last) / 2.0;
            for (child_y, child_branch) in placed {
                self.links.push(PlacedLink {
                    from: (x + width, y),
                    to: (child_x, child_y),
                    branch: child_branch,
                });
            }
            y
        };

        self.nodes[index].y = y;
        self.path.pop();
        y
    }
}

fn empty_view_box(style: &MapStyle) -> ViewBox {
    let side = style.frame_padding * 2.0;
    ViewBox {
        x: -style.frame_padding,
        y: -style.frame_padding,
        width: side,
        height: side,
    }
}

fn write_markup(map: &SvgMindMap, out: &mut String) -> std::fmt::Result {
    let style = &map.style;
    let vb = map.view_box;
    let camera = map.camera;

    write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="mindmark" width="{w:.0}" height="{h:.0}" viewBox="{x:.1} {y:.1} {w:.1} {h:.1}">"#,
        x = vb.x,
        y = vb.y,
        w = vb.width.ceil(),
        h = vb.height.ceil(),
    )?;
    write!(
        out,
        r#"<g class="mindmark-camera" transform="translate({:.1} {:.1}) scale({:.3})">"#,
        camera.x, camera.y, camera.scale
    )?;

    for link in &map.links {
        let mid_x = (link.from.0 + link.to.0) / 2.0;
        write!(
            out,
            r#"<path class="mindmark-link" d="M{:.1},{:.1} C{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}" fill="none" stroke="{}" stroke-width="1.5"/>"#,
            link.from.0,
            link.from.1,
            mid_x,
            link.from.1,
            mid_x,
            link.to.1,
            link.to.0,
            link.to.1,
            style.color(link.branch)
        )?;
    }

    for node in &map.nodes {
        let color = style.color(node.branch);
        write!(
            out,
            r#"<g class="mindmark-node" data-depth="{}"><line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1.5"/>"#,
            node.depth,
            node.x,
            node.y,
            node.x + node.width,
            node.y,
            color
        )?;
        if node.has_children {
            let fill = if node.folded { color } else { "#ffffff" };
            write!(
                out,
                r#"<circle cx="{:.1}" cy="{:.1}" r="4" fill="{}" stroke="{}" stroke-width="1.5"/>"#,
                node.x + node.width,
                node.y,
                fill,
                color
            )?;
        }
        write!(
            out,
            r#"<text x="{:.1}" y="{:.1}" font-size="{}" font-family="{}" fill="{}">{}</text></g>"#,
            node.x + style.label_padding,
            node.y - style.font_size * 0.4,
            style.font_size,
            escape_xml(&style.font_family),
            style.text_color,
            escape_xml(&node.label)
        )?;
    }

    out.push_str("</g></svg>");
    Ok(())
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{escape_xml, MapStyle, SvgRenderTarget};
    use crate::model::outline::{OutlineNode, OutlineTree};
    use crate::render::{RenderTarget, VisualizationHandle};

    fn sample_tree() -> OutlineTree {
        OutlineTree::new(OutlineNode::default().with_children(vec![OutlineNode::new("root")
            .with_children(vec![
                OutlineNode::new("a").with_children(vec![
                    OutlineNode::new("a1"),
                    OutlineNode::new("a2"),
                ]),
                OutlineNode::new("b"),
            ])]))
    }

    #[test]
    fn layout_places_parents_between_children() {
        let map = SvgRenderTarget::default().create(&sample_tree());
        let nodes = map.nodes();
        assert_eq!(nodes.len(), 5);
        let a = nodes.iter().find(|n| n.label == "a").unwrap();
        let a1 = nodes.iter().find(|n| n.label == "a1").unwrap();
        let a2 = nodes.iter().find(|n| n.label == "a2").unwrap();
        assert!(a1.x > a.x + a.width);
        assert_eq!(a.y, (a1.y + a2.y) / 2.0);
        assert_eq!(map.links().len(), 4);
        assert_ne!(a.branch, nodes.iter().find(|n| n.label == "b").unwrap().branch);
    }

    #[test]
    fn update_keeps_camera_and_fold_state() {
        let mut map = SvgRenderTarget::default().create(&sample_tree());
        map.pan(10.0, -5.0);
        map.zoom(2.0);
        assert_eq!(map.toggle_fold(&["root", "a"]), Some(true));
        assert_eq!(map.nodes().len(), 3);

        map.update(&sample_tree());
        map.fit();
        assert_eq!(map.camera().x, 10.0);
        assert_eq!(map.camera().scale, 2.0);
        assert!(map.is_folded(&["root", "a"]));
        assert_eq!(map.nodes().len(), 3);

        assert_eq!(map.toggle_fold(&["root", "a"]), Some(false));
        assert_eq!(map.nodes().len(), 5);
        assert_eq!(map.toggle_fold(&["root", "b"]), None);
    }

    #[test]
    fn zoom_is_clamped_and_ignores_invalid_factors() {
        let mut map = SvgRenderTarget::default().create(&sample_tree());
        map.zoom(1000.0);
        assert_eq!(map.camera().scale, 8.0);
        map.zoom(0.0);
        map.zoom(f64::NAN);
        assert_eq!(map.camera().scale, 8.0);
        map.reset_camera();
        assert_eq!(map.camera().scale, 1.0);
    }

    #[test]
    fn markup_is_standalone_svg_with_escaped_labels() {
        let tree = OutlineTree::new(OutlineNode::new("").with_children(vec![
            OutlineNode::new("R&D <core>"),
        ]));
        let map = SvgRenderTarget::default().create(&tree);
        let markup = map.markup();
        assert!(markup.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(markup.ends_with("</svg>"));
        assert!(markup.contains("R&amp;D &lt;core&gt;"));
    }

    #[test]
    fn dispose_clears_surface() {
        let mut map = SvgRenderTarget::default().create(&sample_tree());
        map.dispose();
        assert!(map.is_disposed());
        assert!(map.markup().is_empty());
        map.update(&sample_tree());
        assert!(map.nodes().is_empty());
    }

    #[test]
    fn fit_frames_content_with_style_padding() {
        let style = MapStyle {
            frame_padding: 10.0,
            palette: vec!["#000000".to_string()],
            ..MapStyle::default()
        };
        let mut map = SvgRenderTarget::new(style).create(&sample_tree());
        let min_x = map
            .nodes()
            .iter()
            .map(|node| node.x)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(map.view_box().x, min_x - 10.0);
        assert!(map.markup().contains(r##"stroke="#000000""##));

        map.update(&OutlineTree::default());
        map.fit();
        assert_eq!(map.view_box().width, 20.0);
        assert_eq!(map.view_box().height, 20.0);
    }

    #[test]
    fn escape_xml_handles_quotes() {
        assert_eq!(escape_xml(r#"a"b'c"#), "a&quot;b&apos;c");
    }
}
