//! Structural text normalizer.
//!
//! # Responsibility
//! - Infer outline hierarchy from pasted plain text.
//! - Emit canonical nested-list markdown for the editor and the mind-map.
//!
//! # Invariants
//! - `normalize` is total: it never fails and never panics.
//! - Text that already carries list markers is returned byte-for-byte.
//! - Blank and whitespace-only lines never produce output lines.
//! - Levels are computed per line; there is no running stack and no
//!   contiguity repair between neighbouring lines.

use crate::model::outline::{render_canonical, OutlineLine};
use once_cell::sync::Lazy;
use regex::Regex;

static MARKDOWN_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*[-*+]\s+|^\s*[0-9]+\.\s+").expect("valid list marker regex")
});
static TREE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\s│]*)([├└─]*)\s*(.*)$").expect("valid tree line regex"));
static INDENTED_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)(.*)$").expect("valid indented line regex"));
static LINE_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n").expect("valid line regex"));

const VERTICAL_BAR: char = '│';

/// Which cascade rule produced the normalized output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalization {
    /// Input already contains list markers and is kept as-is.
    AlreadyMarkdown,
    /// Lines derived from box-drawing tree glyphs.
    TreeDrawing(Vec<OutlineLine>),
    /// Lines derived from leading-space indentation only.
    Indented(Vec<OutlineLine>),
    /// Nothing recognizable; input is kept as-is.
    Unchanged,
}

impl Normalization {
    /// Stable rule name used in diagnostics.
    pub fn rule(&self) -> &'static str {
        match self {
            Self::AlreadyMarkdown => "markdown",
            Self::TreeDrawing(_) => "tree",
            Self::Indented(_) => "indent",
            Self::Unchanged => "identity",
        }
    }

    /// Produces the output text; pass-through rules return `original`.
    pub fn render(self, original: &str) -> String {
        match self {
            Self::AlreadyMarkdown | Self::Unchanged => original.to_string(),
            Self::TreeDrawing(lines) | Self::Indented(lines) => render_canonical(&lines),
        }
    }

    /// Extracted outline lines, empty for pass-through rules.
    pub fn lines(&self) -> &[OutlineLine] {
        match self {
            Self::TreeDrawing(lines) | Self::Indented(lines) => lines,
            Self::AlreadyMarkdown | Self::Unchanged => &[],
        }
    }
}

/// Normalizes raw text into canonical nested-list markdown.
///
/// Worst case returns the input unchanged.
pub fn normalize(text: &str) -> String {
    classify(text).render(text)
}

/// Runs the decision cascade and reports the first matching rule.
pub fn classify(text: &str) -> Normalization {
    if is_markdown_list(text) {
        return Normalization::AlreadyMarkdown;
    }

    let lines = LINE_BREAK_RE.split(text).collect::<Vec<_>>();

    let tree_lines = tree_drawing_lines(&lines);
    if !tree_lines.is_empty() {
        return Normalization::TreeDrawing(tree_lines);
    }

    let indented = indented_lines(&lines);
    if !indented.is_empty() {
        return Normalization::Indented(indented);
    }

    Normalization::Unchanged
}

/// Returns whether any line starts with an unordered or ordered list marker.
pub fn is_markdown_list(text: &str) -> bool {
    MARKDOWN_LIST_RE.is_match(text)
}

/// Tree-drawing rule.
///
/// Produces nothing unless at least one line carries a bar in its indent
/// prefix or a branch connector. The shallowest emitted line is anchored at
/// level 0; relative jumps between lines are kept untouched.
fn tree_drawing_lines(lines: &[&str]) -> Vec<OutlineLine> {
    let mut saw_glyph = false;
    let mut result = Vec::new();

    for raw_line in lines {
        let Some(caps) = TREE_LINE_RE.captures(raw_line) else {
            continue;
        };
        let prefix = caps.get(1).map_or("", |m| m.as_str());
        let connector = caps.get(2).map_or("", |m| m.as_str());
        let content = caps.get(3).map_or("", |m| m.as_str());

        let space_count = prefix.chars().filter(|c| *c == ' ').count();
        let bar_count = prefix.chars().filter(|c| *c == VERTICAL_BAR).count();
        if bar_count > 0 || !connector.is_empty() {
            saw_glyph = true;
        }

        let mut level = space_count / 2 + bar_count;
        if !connector.is_empty() {
            level += 1;
        }

        if let Some(line) = OutlineLine::new(level, content) {
            result.push(line);
        }
    }

    if !saw_glyph {
        return Vec::new();
    }

    let base = result.iter().map(|line| line.level).min().unwrap_or(0);
    for line in &mut result {
        line.level -= base;
    }
    result
}

/// Indentation rule: two leading spaces per level, tabs ignored.
fn indented_lines(lines: &[&str]) -> Vec<OutlineLine> {
    lines
        .iter()
        .filter_map(|raw_line| {
            let caps = INDENTED_LINE_RE.captures(raw_line)?;
            let indent = caps.get(1).map_or("", |m| m.as_str());
            let content = caps.get(2).map_or("", |m| m.as_str());
            let space_count = indent.chars().filter(|c| *c == ' ').count();
            OutlineLine::new(space_count / 2, content)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{classify, is_markdown_list, normalize, Normalization};

    #[test]
    fn markdown_detection_accepts_all_marker_kinds() {
        assert!(is_markdown_list("- a"));
        assert!(is_markdown_list("intro\n  * b"));
        assert!(is_markdown_list("+ c"));
        assert!(is_markdown_list("12. item"));
        assert!(!is_markdown_list("-a\n*b"));
        assert!(!is_markdown_list("3.14 is pi"));
    }

    #[test]
    fn markdown_input_is_returned_verbatim() {
        let input = "- a\n   - weird indent\n\n- b  ";
        assert_eq!(normalize(input), input);
        assert_eq!(classify(input), Normalization::AlreadyMarkdown);
    }

    #[test]
    fn tree_rule_counts_bars_spaces_and_connectors() {
        let input = "Project\n├─ Design\n│  ├─ Wireframes\n│  └─ Review\n└─ Build";
        assert_eq!(
            normalize(input),
            "- Project\n  - Design\n      - Wireframes\n      - Review\n  - Build"
        );
    }

    #[test]
    fn tree_rule_anchors_shallowest_line_at_zero() {
        let out = normalize("├─ a\n│  ├─ b");
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "- a");
        assert_eq!(lines[1], "    - b");
    }

    #[test]
    fn tree_rule_drops_glyph_only_lines() {
        let out = normalize("root\n│\n├─\n└─ leaf");
        assert_eq!(out, "- root\n  - leaf");
    }

    #[test]
    fn tabs_are_consumed_but_not_counted() {
        let out = normalize("root\n\t├─ child");
        assert_eq!(out, "- root\n  - child");
        let out = normalize("a\n\t\tb");
        assert_eq!(out, "- a\n- b");
    }

    #[test]
    fn indentation_rule_without_glyphs() {
        let normalized = classify("root\n  child\n    grandchild");
        assert_eq!(normalized.rule(), "indent");
        assert_eq!(normalized.lines().len(), 3);
        assert_eq!(
            normalize("root\n  child\n    grandchild"),
            "- root\n  - child\n    - grandchild"
        );
    }

    #[test]
    fn indentation_rule_keeps_level_jumps() {
        assert_eq!(normalize("top\n      deep"), "- top\n      - deep");
        assert_eq!(normalize("   odd"), "  - odd");
    }

    #[test]
    fn blank_lines_are_suppressed() {
        assert_eq!(normalize("a\n\n   \r\nb\r\n"), "- a\n- b");
    }

    #[test]
    fn blank_input_falls_back_to_identity() {
        for input in ["", "   ", "\n\n", " \t \n"] {
            assert_eq!(normalize(input), input);
            assert_eq!(classify(input), Normalization::Unchanged);
        }
    }

    #[test]
    fn normalize_is_idempotent_on_its_own_output() {
        for input in ["root\n  child", "A\n├─ B\n│  └─ C", "- already"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }
}
