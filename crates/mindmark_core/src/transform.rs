//! Markdown to outline tree transformation.
//!
//! # Responsibility
//! - Turn canonical or hand-edited markdown into an `OutlineTree`.
//! - Accept any markdown input; unknown constructs degrade to leaves or are
//!   skipped.
//!
//! # Invariants
//! - Empty input yields a root-only tree.
//! - List items nest by list structure, headings nest by heading level.
//! - Node labels are plain inline text with whitespace collapsed.

use crate::model::outline::{OutlineNode, OutlineTree};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Converts markdown into a hierarchical node tree.
pub trait OutlineTransformer {
    fn transform(&self, markdown: &str) -> OutlineTree;
}

/// Default transformer backed by `pulldown-cmark` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownTransformer;

impl OutlineTransformer for MarkdownTransformer {
    fn transform(&self, markdown: &str) -> OutlineTree {
        let mut builder = TreeBuilder::new();
        for event in Parser::new(markdown) {
            builder.handle(event);
        }
        builder.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Root,
    Heading(u8),
    Item,
    Block,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    node: OutlineNode,
}

struct TreeBuilder {
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Frame {
                kind: FrameKind::Root,
                node: OutlineNode::default(),
            }],
        }
    }

    fn top_kind(&self) -> FrameKind {
        self.stack
            .last()
            .map_or(FrameKind::Root, |frame| frame.kind)
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                let level = level as u8;
                while match self.top_kind() {
                    FrameKind::Heading(open) => open >= level,
                    FrameKind::Block | FrameKind::Item => true,
                    FrameKind::Root => false,
                } {
                    self.close_top();
                }
                self.open(FrameKind::Heading(level));
            }
            Event::Start(Tag::Item) => self.open(FrameKind::Item),
            Event::End(TagEnd::Item) => {
                while !matches!(self.top_kind(), FrameKind::Item | FrameKind::Root) {
                    self.close_top();
                }
                if self.top_kind() == FrameKind::Item {
                    self.close_top();
                }
            }
            Event::Start(Tag::Paragraph) | Event::Start(Tag::CodeBlock(_)) => {
                if matches!(self.top_kind(), FrameKind::Root | FrameKind::Heading(_)) {
                    self.open(FrameKind::Block);
                }
            }
            Event::End(TagEnd::Paragraph) | Event::End(TagEnd::CodeBlock) => {
                if self.top_kind() == FrameKind::Block {
                    self.close_top();
                }
            }
            Event::Text(text) | Event::Code(text) => self.append(&text),
            Event::SoftBreak | Event::HardBreak => self.append(" "),
            _ => {}
        }
    }

    fn open(&mut self, kind: FrameKind) {
        self.stack.push(Frame {
            kind,
            node: OutlineNode::default(),
        });
    }

    fn append(&mut self, text: &str) {
        if let Some(frame) = self.stack.last_mut() {
            if frame.kind != FrameKind::Root {
                frame.node.content.push_str(text);
            }
        }
    }

    fn close_top(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(mut frame) = self.stack.pop() else {
            return;
        };
        frame.node.content = collapse_whitespace(&frame.node.content);
        if frame.kind == FrameKind::Block
            && frame.node.content.is_empty()
            && frame.node.children.is_empty()
        {
            return;
        }
        if let Some(parent) = self.stack.last_mut() {
            parent.node.children.push(frame.node);
        }
    }

    fn finish(mut self) -> OutlineTree {
        while self.stack.len() > 1 {
            self.close_top();
        }
        let root = self
            .stack
            .pop()
            .map(|frame| frame.node)
            .unwrap_or_default();
        OutlineTree::new(root)
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::{MarkdownTransformer, OutlineTransformer};
    use crate::model::outline::OutlineNode;

    fn labels(nodes: &[OutlineNode]) -> Vec<&str> {
        nodes.iter().map(|node| node.content.as_str()).collect()
    }

    #[test]
    fn empty_input_yields_root_only_tree() {
        let tree = MarkdownTransformer.transform("");
        assert!(tree.is_empty());
        assert!(MarkdownTransformer.transform("  \n\n").is_empty());
    }

    #[test]
    fn nested_list_items_become_children() {
        let tree = MarkdownTransformer.transform("- a\n  - b\n  - c\n- d");
        assert_eq!(labels(&tree.root.children), vec!["a", "d"]);
        assert_eq!(labels(&tree.root.children[0].children), vec!["b", "c"]);
        assert_eq!(tree.display_root().content, "");
    }

    #[test]
    fn single_top_level_item_is_display_root() {
        let tree = MarkdownTransformer.transform("- root\n  - x\n  - y");
        assert_eq!(tree.display_root().content, "root");
        assert_eq!(tree.display_root().children.len(), 2);
    }

    #[test]
    fn headings_nest_by_level_and_own_following_lists() {
        let tree = MarkdownTransformer.transform("# T\n\n## S\n\n- i\n\n## S2\n");
        let top = &tree.root.children;
        assert_eq!(labels(top), vec!["T"]);
        assert_eq!(labels(&top[0].children), vec!["S", "S2"]);
        assert_eq!(labels(&top[0].children[0].children), vec!["i"]);
    }

    #[test]
    fn loose_paragraphs_and_inline_markup_flatten_to_text() {
        let tree = MarkdownTransformer.transform("# T\n\nsome *soft*\ntext\n\n- **bold** `code`\n\n- next");
        let heading = &tree.root.children[0];
        assert_eq!(
            labels(&heading.children),
            vec!["some soft text", "bold code", "next"]
        );
    }

    #[test]
    fn ordered_and_loose_lists_are_accepted() {
        let tree = MarkdownTransformer.transform("1. one\n\n2. two\n   - two.a");
        assert_eq!(labels(&tree.root.children), vec!["one", "two"]);
        assert_eq!(labels(&tree.root.children[1].children), vec!["two.a"]);
    }
}
