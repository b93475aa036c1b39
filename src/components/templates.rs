use std::fs;
use std::path::Path;

use crate::errors::WikiError;
use crate::types::{RenderedDocument, SearchHit};
use crate::utils::{escape_attr, escape_html};

const STYLE_LINK: &str = "<link rel=\"stylesheet\" href=\"/static/css/lamina.css\">";

/// Assembles full HTML pages around rendered wiki content.
pub struct TemplateComponent;

impl TemplateComponent {
    pub fn new() -> Self {
        Self
    }

    /// Load and render the main HTML shell. Falls back to an inline shell
    /// when no template file is installed.
    pub fn render_page(
        &self,
        title: &str,
        sidebar: &str,
        content: &str,
    ) -> Result<String, WikiError> {
        if let Ok(base) = fs::read_to_string(Path::new("static/html/base.html")) {
            let html = base
                .replace("{{TITLE}}", &escape_html(title))
                .replace("{{STYLE}}", STYLE_LINK)
                .replace("{{SIDEBAR}}", sidebar)
                .replace("{{CONTENT}}", content);
            return Ok(html);
        }

        Ok(format!(
            "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
             <title>{}</title>{}</head><body><div class=\"layout\">\
             <aside class=\"sidebar\">{}</aside>\
             <main class=\"content\"><div class=\"article-card\">{}</div></main>\
             </div></body></html>",
            escape_html(title),
            STYLE_LINK,
            sidebar,
            content
        ))
    }

    /// Main article area: optional notice, breadcrumbs, last-modified line,
    /// the rendered body, and a collapsible raw-source view.
    pub fn article_html(
        &self,
        doc: &RenderedDocument,
        path: &str,
        source: &str,
        modified: &str,
        notice: Option<&str>,
    ) -> String {
        let mut html = String::new();
        if let Some(message) = notice {
            html.push_str(&format!(
                "<div class=\"notice\">{}</div>",
                escape_html(message)
            ));
        }
        html.push_str(&breadcrumbs_html(path));
        html.push_str(modified);
        html.push_str(&doc.body_html);
        html.push_str("<details class=\"source-view\"><summary>Source</summary>");
        html.push_str(&format!(
            "<pre class=\"raw-markdown\"><code class=\"language-markdown\">{}</code></pre>",
            escape_html(source)
        ));
        html.push_str("</details>");
        html
    }

    /// Search results listing, one clickable entry per hit
    pub fn search_results_html(&self, query: &str, hits: &[SearchHit]) -> String {
        let mut html = String::new();
        html.push_str("<div class=\"search-results\">");

        if query.is_empty() {
            html.push_str("<p class=\"no-query\">Enter a search term to find content.</p>");
            html.push_str("</div>");
            return html;
        }

        html.push_str(&format!(
            "<h1 class=\"search-header\">Search Results for \"{}\"</h1>",
            escape_html(query)
        ));
        html.push_str(&format!(
            "<p class=\"results-count\">Found {} result{}</p>",
            hits.len(),
            if hits.len() == 1 { "" } else { "s" }
        ));

        if hits.is_empty() {
            html.push_str("<p class=\"no-results\">No results found for your search.</p>");
        } else {
            html.push_str("<ul class=\"search-results-list\">");
            for hit in hits {
                html.push_str("<li class=\"search-result-item\">");
                html.push_str(&format!(
                    "<a href=\"?file={}\">{}</a>",
                    escape_attr(&hit.path),
                    escape_html(&hit.title)
                ));
                html.push_str(&format!(
                    "<p class=\"result-path\"><code>{}</code></p>",
                    escape_html(&hit.path)
                ));
                html.push_str(&format!(
                    "<p class=\"result-snippet\">{}</p>",
                    escape_html(&hit.snippet)
                ));
                html.push_str("</li>");
            }
            html.push_str("</ul>");
        }

        html.push_str("</div>");
        html
    }
}

impl Default for TemplateComponent {
    fn default() -> Self {
        Self::new()
    }
}

/// Breadcrumb trail from the FilePath segments
fn breadcrumbs_html(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return String::new();
    }
    let crumbs = parts
        .iter()
        .map(|part| format!("<span class=\"crumb\">{}</span>", escape_html(part)))
        .collect::<Vec<_>>()
        .join(" &gt; ");
    format!("<p class=\"breadcrumbs\"><small>{}</small></p>", crumbs)
}
