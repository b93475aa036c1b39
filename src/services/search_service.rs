use log::{debug, warn};

use crate::services::render_service::extract_title;
use crate::services::PathService;
use crate::types::{SearchHit, WikiTree};
use crate::utils::{capitalize, display_name};

/// Characters of context kept on each side of a snippet match
const SNIPPET_CONTEXT: usize = 50;

/// Case-insensitive substring search across every file reachable from a
/// WikiTree. Hits come back in tree traversal order (category, category
/// files, subcategory index, subcategory files) — a deliberate simplicity
/// trade-off, not relevance ranking.
pub struct SearchService {
    paths: PathService,
}

impl SearchService {
    pub fn new(paths: PathService) -> Self {
        Self { paths }
    }

    pub fn search(&self, term: &str, tree: &WikiTree) -> Vec<SearchHit> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            debug!("Empty search term, returning no hits");
            return Vec::new();
        }

        let mut hits = Vec::new();
        for (name, category) in &tree.categories {
            self.search_file(&category.path, Some(capitalize(name)), &term, &mut hits);
            for path in category.files.values() {
                self.search_file(path, None, &term, &mut hits);
            }
            for (sub_name, sub) in &category.subcategories {
                if let Some(index) = &sub.index {
                    let title = format!("{} Index", capitalize(sub_name));
                    self.search_file(index, Some(title), &term, &mut hits);
                }
                for path in sub.files.values() {
                    self.search_file(path, None, &term, &mut hits);
                }
            }
        }
        debug!("Search for '{}' produced {} hits", term, hits.len());
        hits
    }

    /// Probe one file, appending a hit when the term occurs. Unreadable
    /// files are skipped so a single bad file cannot abort the search.
    fn search_file(
        &self,
        path: &str,
        declared_title: Option<String>,
        term: &str,
        hits: &mut Vec<SearchHit>,
    ) {
        let content = match self.paths.read(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping unreadable file '{}' during search: {:?}", path, e);
                return;
            }
        };
        let lowered = content.to_lowercase();
        if !lowered.contains(term) {
            return;
        }

        let title = declared_title
            .or_else(|| extract_title(&content))
            .unwrap_or_else(|| display_name(file_stem(path)));

        hits.push(SearchHit {
            path: path.to_string(),
            title,
            snippet: snippet(&lowered, term),
        });
    }
}

fn file_stem(path: &str) -> &str {
    let name = match path.rsplit_once('/') {
        Some((_, name)) => name,
        None => path,
    };
    name.strip_suffix(".md").unwrap_or(name)
}

/// Window of up to [`SNIPPET_CONTEXT`] characters either side of the first
/// match, with ellipses marking a clipped start or end
fn snippet(lowered: &str, term: &str) -> String {
    let Some(pos) = lowered.find(term) else {
        return String::new();
    };
    let start = lowered[..pos]
        .char_indices()
        .rev()
        .nth(SNIPPET_CONTEXT - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let after = pos + term.len();
    let end = lowered[after..]
        .char_indices()
        .nth(SNIPPET_CONTEXT)
        .map(|(i, _)| after + i)
        .unwrap_or(lowered.len());

    let mut snippet = String::new();
    if start > 0 {
        snippet.push_str("...");
    }
    snippet.push_str(&lowered[start..end]);
    if end < lowered.len() {
        snippet.push_str("...");
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::TreeService;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;

    fn write(root: &Path, rel: &str, content: &str) {
        let full = root.join(rel);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    fn search(root: &Path, term: &str) -> Vec<SearchHit> {
        let tree = TreeService::new(root.to_path_buf()).discover();
        SearchService::new(PathService::new(root.to_path_buf())).search(term, &tree)
    }

    #[test]
    fn matching_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "categories/notes.md", "# Notes\n\nKernel Tuning\n");
        let hits = search(dir.path(), "kernel tuning");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "categories/notes.md");
    }

    #[test]
    fn snippet_is_ellipsed_on_both_sides() {
        let dir = tempfile::tempdir().unwrap();
        let padding = "x".repeat(80);
        let content = format!("# Pad\n\n{} hello {}\n", padding, padding);
        write(dir.path(), "categories/pad.md", &content);

        let hits = search(dir.path(), "hello");
        assert_eq!(hits.len(), 1);
        let snippet = &hits[0].snippet;
        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
        assert!(snippet.contains("hello"));
    }

    #[test]
    fn snippet_at_content_start_has_no_leading_ellipsis() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "categories/short.md", "hello world\n");
        let hits = search(dir.path(), "hello");
        assert_eq!(hits[0].snippet, "hello world\n");
    }

    #[test]
    fn hits_follow_tree_traversal_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "categories/alpha.md", "needle\n");
        write(root, "categories/alpha/page.md", "needle\n");
        write(root, "categories/alpha/sub/index.md", "needle\n");
        write(root, "categories/alpha/sub/leaf.md", "needle\n");
        write(root, "categories/beta.md", "needle\n");

        let hits = search(root, "needle");
        let paths: Vec<&str> = hits.iter().map(|h| h.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "categories/alpha.md",
                "categories/alpha/page.md",
                "categories/alpha/sub/index.md",
                "categories/alpha/sub/leaf.md",
                "categories/beta.md",
            ]
        );
    }

    #[test]
    fn titles_prefer_declared_then_heading_then_stem() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "categories/linux.md", "needle\n");
        write(root, "categories/linux/with-heading.md", "# Real Title\n\nneedle\n");
        write(root, "categories/linux/plain-notes.md", "needle only\n");
        write(root, "categories/linux/tools/index.md", "needle\n");

        let hits = search(root, "needle");
        let titles: Vec<&str> = hits.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Linux", "Plain Notes", "Real Title", "Tools Index"]
        );
    }

    #[test]
    fn empty_terms_return_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "categories/a.md", "content\n");
        assert!(search(dir.path(), "").is_empty());
        assert!(search(dir.path(), "   ").is_empty());
    }

    #[test]
    fn files_outside_the_tree_are_not_searched() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "index.md", "needle\n");
        write(root, "categories/a.md", "nothing here\n");

        // The root index is not part of the category tree
        assert!(search(root, "needle").is_empty());
    }
}
