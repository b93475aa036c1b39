use axum::{
    body::Body,
    extract::{Path as AxumPath, RawQuery, State},
    http::{header, HeaderValue, Response},
    response::{Html, IntoResponse},
};
use log::{info, warn};

use crate::components::{NavigationComponent, TemplateComponent};
use crate::errors::WikiError;
use crate::services::{PathService, RenderService, SearchService, TreeService};
use crate::types::AppState;
use crate::utils::{content_type_for, last_modified_html, parse_query_param};

/// Default landing page when no file is selected
pub const DEFAULT_FILE: &str = "index.md";

/// Longest accepted search query; anything longer is clamped
const MAX_QUERY_LEN: usize = 1000;

/// GET `/` — render the selected file with sidebar navigation.
/// Selection comes from the `file` query parameter and falls back to the
/// root index when absent or invalid.
pub async fn handle_view(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, WikiError> {
    let raw = raw.unwrap_or_default();
    let requested = parse_query_param(&raw, "file").filter(|f| !f.is_empty());

    let paths = PathService::new(state.base_dir.as_ref().clone());
    let (selected, notice) = select_file(&paths, requested.as_deref());
    info!("Viewing '{}'", selected);

    let tree = TreeService::new(state.base_dir.as_ref().clone()).discover();
    let renderer = RenderService::new(paths.clone());
    let doc = renderer.render(&selected)?;
    let source = paths.read(&selected)?;
    let modified = last_modified_html(&paths.resolve(&selected));

    let navigation = NavigationComponent::new();
    let sidebar = navigation.build_sidebar_with_toc(&tree, &selected, &doc.toc_html);
    let templates = TemplateComponent::new();
    let article = templates.article_html(&doc, &selected, &source, &modified, notice.as_deref());
    let page = templates.render_page(&doc.title, &sidebar, &article)?;
    Ok(Html(page))
}

/// Resolve the requested file against the root, falling back to the index
/// page. A selection that fails validation or does not exist degrades to
/// the index with a user-visible notice instead of an error response.
pub fn select_file(paths: &PathService, requested: Option<&str>) -> (String, Option<String>) {
    match requested {
        None => (DEFAULT_FILE.to_string(), None),
        Some(raw) => match paths.normalize(raw) {
            Ok(normalized) if paths.exists(&normalized) => (normalized, None),
            Ok(normalized) => {
                warn!("Selected file not found: '{}'", normalized);
                let notice = format!("File not found: {}", normalized);
                (DEFAULT_FILE.to_string(), Some(notice))
            }
            Err(_) => {
                warn!("Rejected selected file: '{}'", raw);
                let notice = format!("Invalid file path: {}", raw);
                (DEFAULT_FILE.to_string(), Some(notice))
            }
        },
    }
}

/// GET `/search` — full-tree substring search
pub async fn handle_search(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, WikiError> {
    let raw = raw.unwrap_or_default();
    let mut query = parse_query_param(&raw, "q").unwrap_or_default();
    if query.chars().count() > MAX_QUERY_LEN {
        warn!("Truncating over-long search query");
        query = query.chars().take(MAX_QUERY_LEN).collect();
    }
    info!("Search request for '{}'", query);

    let tree = TreeService::new(state.base_dir.as_ref().clone()).discover();
    let paths = PathService::new(state.base_dir.as_ref().clone());
    let hits = SearchService::new(paths).search(&query, &tree);
    info!("Search for '{}' found {} results", query, hits.len());

    let navigation = NavigationComponent::new();
    let sidebar = navigation.build_sidebar_html(&tree, "");
    let templates = TemplateComponent::new();
    let content = templates.search_results_html(&query, &hits);
    let page = templates.render_page("Search", &sidebar, &content)?;
    Ok(Html(page))
}

/// GET `/static/*path` — serve stylesheet and other static assets
pub async fn handle_static(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
) -> Result<impl IntoResponse, WikiError> {
    let statics = PathService::new(state.static_dir.as_ref().clone());
    let normalized = statics.normalize(&path)?;
    let full = statics.resolve(&normalized);
    if !full.is_file() {
        return Err(WikiError::NotFound);
    }

    let bytes = std::fs::read(&full)?;
    let mut resp = Response::new(Body::from(bytes));
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&full)),
    );
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn paths(root: &Path) -> PathService {
        PathService::new(root.to_path_buf())
    }

    #[test]
    fn absent_selection_falls_back_to_the_index() {
        let dir = tempfile::tempdir().unwrap();
        let (selected, notice) = select_file(&paths(dir.path()), None);
        assert_eq!(selected, DEFAULT_FILE);
        assert_eq!(notice, None);
    }

    #[test]
    fn valid_selection_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("categories")).unwrap();
        std::fs::write(dir.path().join("categories/a.md"), "# A").unwrap();

        let (selected, notice) = select_file(&paths(dir.path()), Some("categories/a.md"));
        assert_eq!(selected, "categories/a.md");
        assert_eq!(notice, None);
    }

    #[test]
    fn missing_selection_degrades_with_a_notice() {
        let dir = tempfile::tempdir().unwrap();
        let (selected, notice) = select_file(&paths(dir.path()), Some("categories/gone.md"));
        assert_eq!(selected, DEFAULT_FILE);
        assert_eq!(notice.as_deref(), Some("File not found: categories/gone.md"));
    }

    #[test]
    fn escaping_selection_degrades_with_a_notice() {
        let dir = tempfile::tempdir().unwrap();
        let (selected, notice) = select_file(&paths(dir.path()), Some("../../etc/passwd"));
        assert_eq!(selected, DEFAULT_FILE);
        assert_eq!(notice.as_deref(), Some("Invalid file path: ../../etc/passwd"));
    }
}
