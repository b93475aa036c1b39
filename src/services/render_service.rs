use std::collections::HashMap;
use std::fs;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use log::debug;
use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::errors::WikiError;
use crate::services::PathService;
use crate::types::{CodeBlock, RenderedDocument};
use crate::utils::{content_type_for, escape_attr, escape_html, unescape_html};

/// Fallback title for documents without a level-1 heading
pub const UNTITLED: &str = "Untitled";

/// Delimiter for the placeholders that stand in for fenced code spans
/// while the rest of the document goes through the markdown converter.
/// U+001A is a control character the converter passes through untouched.
const FENCE_MARK: char = '\u{1A}';

/// Converts one markdown file into a navigable HTML document.
///
/// The pipeline runs in a fixed order: fenced code spans are lifted out,
/// the remainder is converted to HTML, the spans are reinserted escaped
/// exactly once, `./` images are inlined as data URIs, `./` links are
/// rewritten to `?file=` references, and a final pass re-escapes every
/// code element so the output is idempotent.
pub struct RenderService {
    paths: PathService,
}

impl RenderService {
    pub fn new(paths: PathService) -> Self {
        Self { paths }
    }

    pub fn render(&self, path: &str) -> Result<RenderedDocument, WikiError> {
        debug!("Rendering '{}'", path);
        let raw = self.paths.read(path)?;
        let title = extract_title(&raw).unwrap_or_else(|| UNTITLED.to_string());

        let (stripped, code_blocks) = extract_code_blocks(&raw);
        let (converted, toc_html) = markdown_to_html(&stripped);
        let mut body_html = reinsert_code_blocks(&converted, &code_blocks);
        body_html = self.inline_images(&body_html, path);
        body_html = self.rewrite_links(&body_html, path);
        body_html = reescape_code_blocks(&body_html);

        Ok(RenderedDocument {
            title,
            body_html,
            toc_html,
            code_blocks,
        })
    }

    /// Inline `./`-relative images as data URIs so rendered pages are
    /// self-contained. A missing target keeps its original src.
    fn inline_images(&self, html: &str, page: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut rest = html;
        while let Some(pos) = rest.find("src=\"./") {
            let value_start = pos + "src=\"".len();
            let Some(value_len) = rest[value_start..].find('"') else {
                break;
            };
            let value = &rest[value_start..value_start + value_len];
            out.push_str(&rest[..pos]);
            out.push_str("src=\"");
            match self.image_data_uri(page, value) {
                Some(data_uri) => out.push_str(&data_uri),
                None => out.push_str(value),
            }
            out.push('"');
            rest = &rest[value_start + value_len + 1..];
        }
        out.push_str(rest);
        out
    }

    fn image_data_uri(&self, page: &str, src: &str) -> Option<String> {
        let target = self.paths.normalize(&join_sibling(page, src)).ok()?;
        let full = self.paths.resolve(&target);
        let bytes = fs::read(&full).ok()?;
        Some(format!(
            "data:{};base64,{}",
            content_type_for(&full),
            BASE64_STANDARD.encode(bytes)
        ))
    }

    /// Rewrite `./`-relative links to `?file=` references so following
    /// them re-enters the pipeline instead of leaving the viewer. Other
    /// hrefs pass through unmodified.
    fn rewrite_links(&self, html: &str, page: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut rest = html;
        while let Some(pos) = rest.find("href=\"./") {
            let value_start = pos + "href=\"".len();
            let Some(value_len) = rest[value_start..].find('"') else {
                break;
            };
            let value = &rest[value_start..value_start + value_len];
            out.push_str(&rest[..pos]);
            match self.paths.normalize(&join_sibling(page, value)) {
                Ok(target) => {
                    out.push_str("href=\"?file=");
                    out.push_str(&escape_attr(&target));
                    out.push_str("\" target=\"_self\"");
                }
                Err(_) => {
                    out.push_str("href=\"");
                    out.push_str(value);
                    out.push('"');
                }
            }
            rest = &rest[value_start + value_len + 1..];
        }
        out.push_str(rest);
        out
    }
}

/// First `# ` heading in the raw text, scanning top-down
pub fn extract_title(content: &str) -> Option<String> {
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix('#') {
            if rest.starts_with(char::is_whitespace) {
                let text = rest.trim();
                if !text.is_empty() {
                    return Some(text.to_string());
                }
            }
        }
    }
    None
}

/// Resolve a `./`-style reference against the directory of `page`
fn join_sibling(page: &str, reference: &str) -> String {
    let rel = reference.strip_prefix("./").unwrap_or(reference);
    match page.rsplit_once('/') {
        Some((dir, _)) => format!("{}/{}", dir, rel),
        None => rel.to_string(),
    }
}

fn fence_marker(index: usize) -> String {
    format!("{}{}{}", FENCE_MARK, index, FENCE_MARK)
}

/// Lift fenced code spans out of the source, replacing each with a marker
/// line. Fence contents must reach the output exactly as written, so they
/// never go through the markdown parser at all.
fn extract_code_blocks(raw: &str) -> (String, Vec<CodeBlock>) {
    let mut stripped = String::with_capacity(raw.len());
    let mut blocks: Vec<CodeBlock> = Vec::new();
    let mut in_fence = false;
    let mut language: Option<String> = None;
    let mut source = String::new();

    for line in raw.lines() {
        let trimmed = line.trim_start();
        if in_fence {
            if trimmed.starts_with("```") {
                stripped.push_str(&fence_marker(blocks.len()));
                stripped.push('\n');
                blocks.push(CodeBlock {
                    language: language.take(),
                    source: std::mem::take(&mut source),
                });
                in_fence = false;
            } else {
                source.push_str(line);
                source.push('\n');
            }
        } else if let Some(info) = trimmed.strip_prefix("```") {
            language = info.split_whitespace().next().map(str::to_string);
            in_fence = true;
        } else {
            stripped.push_str(line);
            stripped.push('\n');
        }
    }

    // An unterminated fence still renders as code rather than letting the
    // converter loose on its contents.
    if in_fence {
        stripped.push_str(&fence_marker(blocks.len()));
        stripped.push('\n');
        blocks.push(CodeBlock {
            language: language.take(),
            source,
        });
    }

    (stripped, blocks)
}

/// Put the lifted code spans back, each escaped for HTML exactly once
fn reinsert_code_blocks(html: &str, blocks: &[CodeBlock]) -> String {
    let mut out = html.to_string();
    for (index, block) in blocks.iter().enumerate() {
        let marker = fence_marker(index);
        let wrapped = format!("<p>{}</p>", marker);
        let rendered = render_code_block(block);
        if out.contains(&wrapped) {
            out = out.replace(&wrapped, &rendered);
        } else {
            out = out.replace(&marker, &rendered);
        }
    }
    out
}

fn render_code_block(block: &CodeBlock) -> String {
    match &block.language {
        Some(language) => format!(
            "<pre><code class=\"language-{}\">{}</code></pre>",
            escape_attr(language),
            escape_html(&block.source)
        ),
        None => format!("<pre><code>{}</code></pre>", escape_html(&block.source)),
    }
}

/// Convert markdown (with code spans already lifted out) to HTML, injecting
/// heading ids and building the table of contents. Soft line breaks become
/// `<br>` so single newlines survive rendering.
fn markdown_to_html(content: &str) -> (String, String) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);

    // First pass: collect headings for ids and the TOC
    let mut headings: Vec<(u32, String, String)> = Vec::new();
    let mut in_heading: Option<u32> = None;
    let mut buf = String::new();
    let mut id_counts: HashMap<String, usize> = HashMap::new();

    for ev in Parser::new_ext(content, options) {
        match ev {
            Event::Start(Tag::Heading { level, .. }) => {
                in_heading = Some(heading_level(level));
                buf.clear();
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(level) = in_heading.take() {
                    let mut id = slugify(&buf);
                    if id.is_empty() {
                        id = format!("h{}", level);
                    }
                    let count = id_counts.entry(id.clone()).or_insert(0);
                    if *count > 0 {
                        id = format!("{}-{}", id, *count);
                    }
                    *count += 1;
                    headings.push((level, id, buf.clone()));
                }
                buf.clear();
            }
            Event::Text(t) | Event::Code(t) => {
                if in_heading.is_some() {
                    buf.push_str(&t);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if in_heading.is_some() {
                    buf.push(' ');
                }
            }
            _ => {}
        }
    }

    // Second pass: emit HTML with heading ids and hardened soft breaks
    let mut out = String::new();
    let mut idx = 0usize;
    let mut closing: Vec<u32> = Vec::new();
    for ev in Parser::new_ext(content, options) {
        match ev {
            Event::Start(Tag::Heading { level, .. }) => {
                let level = heading_level(level);
                let id = headings.get(idx).map(|(_, id, _)| id.as_str()).unwrap_or("");
                out.push_str(&format!("<h{} id=\"{}\">", level, escape_attr(id)));
                closing.push(level);
                idx += 1;
            }
            Event::End(TagEnd::Heading(_)) => {
                let level = closing.pop().unwrap_or(1);
                out.push_str(&format!("</h{}>", level));
            }
            Event::SoftBreak => out.push_str("<br />\n"),
            _ => html::push_html(&mut out, std::iter::once(ev)),
        }
    }

    (out, build_toc_html(&headings))
}

/// Build nested TOC HTML from the collected headings
fn build_toc_html(headings: &[(u32, String, String)]) -> String {
    if headings.is_empty() {
        return String::new();
    }
    let mut html = String::new();
    html.push_str("<nav class=\"toc\"><div class=\"toc-title\">Contents</div>");
    let mut current = 0u32;
    for (level, id, title) in headings {
        if *level > 6 || *level < 1 {
            continue;
        }
        while current < *level {
            html.push_str("<ul>");
            current += 1;
        }
        while current > *level {
            html.push_str("</ul>");
            current -= 1;
        }
        html.push_str(&format!(
            "<li><a href=\"#{}\">{}</a></li>",
            escape_attr(id),
            escape_html(title)
        ));
    }
    while current > 0 {
        html.push_str("</ul>");
        current -= 1;
    }
    html.push_str("</nav>");
    html
}

fn heading_level(level: HeadingLevel) -> u32 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Create a URL-friendly slug from heading text
fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_dash = false;
    for ch in text.chars() {
        let c = ch.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_dash = false;
        } else if c.is_ascii_whitespace() || c == '-' || c == '_' {
            if !last_dash && !out.is_empty() {
                out.push('-');
                last_dash = true;
            }
        }
    }
    if out.ends_with('-') {
        out.pop();
    }
    out
}

/// Final defensive pass: re-extract every code element's text and escape it
/// exactly once, replacing whatever earlier stages emitted
fn reescape_code_blocks(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find("<pre><code") {
        let tag_start = start + "<pre><code".len();
        let Some(open_len) = rest[tag_start..].find('>') else {
            break;
        };
        let content_start = tag_start + open_len + 1;
        let Some(content_len) = rest[content_start..].find("</code></pre>") else {
            break;
        };
        let content = &rest[content_start..content_start + content_len];
        out.push_str(&rest[..content_start]);
        out.push_str(&escape_html(&unescape_html(content)));
        out.push_str("</code></pre>");
        rest = &rest[content_start + content_len + "</code></pre>".len()..];
    }
    out.push_str(rest);
    out
}
