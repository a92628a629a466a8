//! Markdown rendering
//!
//! Callers depend only on [`MarkdownRender`], a pure text-to-HTML contract.
//! [`RegexRenderer`] is a deliberately small renderer that covers headers,
//! emphasis, links, images, inline code and paragraphs.
//! [`CommonMarkRenderer`] is the full parser for sites that need more.

use lazy_static::lazy_static;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;

use crate::config::MarkdownEngine;

/// Converts a markdown body into HTML.
///
/// Implementations must be deterministic: the same input always yields the
/// same output.
pub trait MarkdownRender: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// Build the renderer selected in the site configuration
pub fn renderer_for(engine: MarkdownEngine) -> Box<dyn MarkdownRender> {
    match engine {
        MarkdownEngine::Regex => Box::new(RegexRenderer),
        MarkdownEngine::CommonMark => Box::new(CommonMarkRenderer::new()),
    }
}

lazy_static! {
    static ref H3: Regex = Regex::new(r"(?m)^### (.*)$").unwrap();
    static ref H2: Regex = Regex::new(r"(?m)^## (.*)$").unwrap();
    static ref H1: Regex = Regex::new(r"(?m)^# (.*)$").unwrap();
    static ref BOLD_ITALIC: Regex = Regex::new(r"\*\*\*(.*?)\*\*\*").unwrap();
    static ref BOLD_STAR: Regex = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    static ref BOLD_UNDERSCORE: Regex = Regex::new(r"__(.*?)__").unwrap();
    static ref ITALIC_STAR: Regex = Regex::new(r"\*(.*?)\*").unwrap();
    static ref ITALIC_UNDERSCORE: Regex = Regex::new(r"_(.*?)_").unwrap();
    static ref IMAGE: Regex = Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap();
    static ref LINK: Regex = Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`([^`]+)`").unwrap();
}

/// Tags that open a block which must not be wrapped in `<p>`
const BLOCK_PREFIXES: [&str; 4] = ["<h", "<img", "<ul", "<ol"];

/// Ordered regex substitution renderer.
///
/// Not CommonMark: no lists, blockquotes, tables or fenced code, and
/// nested emphasis is only handled for the `***x***` form.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexRenderer;

impl MarkdownRender for RegexRenderer {
    fn render(&self, markdown: &str) -> String {
        let text = markdown.replace("\r\n", "\n");

        // Longest header prefix first so `###` is never read as `#`
        let text = H3.replace_all(&text, "<h3>${1}</h3>");
        let text = H2.replace_all(&text, "<h2>${1}</h2>");
        let text = H1.replace_all(&text, "<h1>${1}</h1>");

        // Longest emphasis marker first so `**` is never half-consumed by `*`
        let text = BOLD_ITALIC.replace_all(&text, "<strong><em>${1}</em></strong>");
        let text = BOLD_STAR.replace_all(&text, "<strong>${1}</strong>");
        let text = BOLD_UNDERSCORE.replace_all(&text, "<strong>${1}</strong>");
        let text = ITALIC_STAR.replace_all(&text, "<em>${1}</em>");
        let text = ITALIC_UNDERSCORE.replace_all(&text, "<em>${1}</em>");

        // Images share the bracket syntax with links and must go first
        let text = IMAGE.replace_all(&text, r#"<img src="${2}" alt="${1}" />"#);
        let text = LINK.replace_all(&text, r#"<a href="${2}">${1}</a>"#);

        let text = INLINE_CODE.replace_all(&text, "<code>${1}</code>");

        split_paragraphs(&text)
    }
}

/// Split on blank lines and wrap every non-block chunk in `<p>`
fn split_paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| {
            if BLOCK_PREFIXES.iter().any(|tag| block.starts_with(tag)) {
                block.to_string()
            } else {
                format!("<p>{}</p>", block.replace('\n', "<br>"))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// CommonMark renderer backed by pulldown-cmark
#[derive(Debug, Clone, Copy)]
pub struct CommonMarkRenderer {
    options: Options,
}

impl CommonMarkRenderer {
    pub fn new() -> Self {
        // Front-matter is stripped before rendering, so no metadata blocks
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;
        Self { options }
    }
}

impl Default for CommonMarkRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRender for CommonMarkRenderer {
    fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);
        html_output
    }
}
