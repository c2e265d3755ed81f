//! Outline line and node tree types.
//!
//! # Responsibility
//! - Serialize outline lines into canonical nested-list markdown.
//! - Provide the node tree shape produced by outline transformers.
//!
//! # Invariants
//! - One `OutlineLine` renders to exactly one markdown line.
//! - Canonical lines use two spaces per level and a `- ` marker.

use serde::{Deserialize, Serialize};

/// Indentation unit used for one outline level.
pub const LEVEL_INDENT: &str = "  ";
/// Bullet marker emitted for every canonical line.
pub const BULLET_MARKER: &str = "- ";

/// One `(level, text)` pair extracted from raw input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineLine {
    /// Zero-based depth. Jumps deeper by more than one are allowed.
    pub level: usize,
    /// Trimmed, non-empty label.
    pub text: String,
}

impl OutlineLine {
    /// Builds a line from untrimmed content.
    ///
    /// Returns `None` when content is blank after trimming.
    pub fn new(level: usize, content: &str) -> Option<Self> {
        let text = content.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            level,
            text: text.to_string(),
        })
    }

    /// Renders this line as one canonical markdown bullet.
    pub fn to_markdown(&self) -> String {
        format!(
            "{}{}{}",
            LEVEL_INDENT.repeat(self.level),
            BULLET_MARKER,
            self.text
        )
    }
}

/// Serializes lines into canonical markdown joined with `\n`.
pub fn render_canonical(lines: &[OutlineLine]) -> String {
    lines
        .iter()
        .map(OutlineLine::to_markdown)
        .collect::<Vec<_>>()
        .join("\n")
}

/// One node of the hierarchical outline tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineNode {
    /// Inline label text, whitespace-collapsed.
    pub content: String,
    /// Ordered child nodes.
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            children: Vec::new(),
        }
    }

    /// Builder helper used by transformers and tests.
    pub fn with_children(mut self, children: Vec<OutlineNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Counts this node and all descendants.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(OutlineNode::node_count)
            .sum::<usize>()
    }

    /// Returns the longest root-to-leaf edge count below this node.
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Transformer output: a synthetic root holding top-level nodes.
///
/// The root carries empty content unless the source has exactly one
/// top-level node, see [`OutlineTree::display_root`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineTree {
    pub root: OutlineNode,
}

impl OutlineTree {
    pub fn new(root: OutlineNode) -> Self {
        Self { root }
    }

    /// Returns whether the tree holds nothing but an empty root.
    pub fn is_empty(&self) -> bool {
        self.root.content.is_empty() && self.root.children.is_empty()
    }

    /// Returns the node a mind-map should be centered on.
    ///
    /// A content-less root with a single child collapses into that child.
    pub fn display_root(&self) -> &OutlineNode {
        if self.root.content.is_empty() && self.root.children.len() == 1 {
            return &self.root.children[0];
        }
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::{render_canonical, OutlineLine, OutlineNode, OutlineTree};

    #[test]
    fn outline_line_rejects_blank_content() {
        assert!(OutlineLine::new(0, "   \t").is_none());
        let line = OutlineLine::new(2, "  topic ").expect("non-blank content");
        assert_eq!(line.text, "topic");
        assert_eq!(line.to_markdown(), "    - topic");
    }

    #[test]
    fn render_canonical_joins_without_trailing_newline() {
        let lines = vec![
            OutlineLine::new(0, "a").unwrap(),
            OutlineLine::new(3, "b").unwrap(),
        ];
        assert_eq!(render_canonical(&lines), "- a\n      - b");
        assert_eq!(render_canonical(&[]), "");
    }

    #[test]
    fn display_root_collapses_single_child() {
        let tree = OutlineTree::new(
            OutlineNode::default().with_children(vec![OutlineNode::new("only")
                .with_children(vec![OutlineNode::new("leaf")])]),
        );
        assert_eq!(tree.display_root().content, "only");
        assert_eq!(tree.root.node_count(), 3);
        assert_eq!(tree.root.depth(), 2);
        assert!(OutlineTree::default().is_empty());
    }
}
