//! Markdown preview rendering for the middle panel.
//!
//! # Invariants
//! - Raw HTML in the source is shown as text, never as live markup.

use pulldown_cmark::{html, Event, Options, Parser};

/// Renders markdown into display HTML.
pub trait PreviewRenderer {
    fn render(&self, markdown: &str) -> String;
}

/// CommonMark HTML renderer with tables and strikethrough.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlPreview;

impl PreviewRenderer for HtmlPreview {
    fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        let parser = Parser::new_ext(markdown, options).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });
        let mut out = String::with_capacity(markdown.len() * 2);
        html::push_html(&mut out, parser);
        out
    }
}
