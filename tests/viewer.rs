//! End-to-end coverage of the selection, discovery, rendering, and search
//! pipeline over a real wiki directory.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

use lamina::handlers::{select_file, DEFAULT_FILE};
use lamina::{PathService, RenderService, SearchService, TreeService};

fn write(root: &Path, rel: &str, content: &str) {
    let full = root.join(rel);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, content).unwrap();
}

#[test]
fn bare_wiki_root_serves_the_home_page() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "index.md", "# Home\nWelcome");

    let paths = PathService::new(dir.path().to_path_buf());
    let (selected, notice) = select_file(&paths, None);
    assert_eq!(selected, DEFAULT_FILE);
    assert_eq!(notice, None);

    let doc = RenderService::new(paths).render(&selected).unwrap();
    assert_eq!(doc.title, "Home");
    assert!(doc.body_html.contains("Welcome"));

    let tree = TreeService::new(dir.path().to_path_buf()).discover();
    assert!(tree.categories.is_empty());
}

#[test]
fn following_a_rewritten_link_reenters_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "index.md", "# Home\nWelcome");
    write(root, "categories/linux.md", "# Linux\n\n[shell](./linux/shell.md)\n");
    write(root, "categories/linux/shell.md", "# Shell\n\nPipes and redirects.\n");

    let paths = PathService::new(root.to_path_buf());
    let renderer = RenderService::new(paths.clone());

    let doc = renderer.render("categories/linux.md").unwrap();
    let needle = "href=\"?file=";
    let pos = doc.body_html.find(needle).expect("rewritten link");
    let rest = &doc.body_html[pos + needle.len()..];
    let target = &rest[..rest.find('"').unwrap()];
    assert_eq!(target, "categories/linux/shell.md");

    // Feed the rewritten target back through selection and rendering,
    // exactly as the host does when the link is clicked.
    let (selected, notice) = select_file(&paths, Some(target));
    assert_eq!(selected, "categories/linux/shell.md");
    assert_eq!(notice, None);
    let next = renderer.render(&selected).unwrap();
    assert_eq!(next.title, "Shell");
    assert!(next.body_html.contains("Pipes and redirects."));
}

#[test]
fn invalid_selection_degrades_to_a_navigable_home_page() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "index.md", "# Home\nWelcome");
    write(root, "categories/notes.md", "# Notes\n");

    let paths = PathService::new(root.to_path_buf());
    let (selected, notice) = select_file(&paths, Some("../../etc/passwd"));
    assert_eq!(selected, DEFAULT_FILE);
    assert!(notice.unwrap().starts_with("Invalid file path"));

    // The fallback page still renders
    let doc = RenderService::new(paths).render(&selected).unwrap();
    assert_eq!(doc.title, "Home");
}

#[test]
fn search_hits_resolve_back_to_renderable_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "index.md", "# Home\n");
    write(root, "categories/linux.md", "# Linux\n\nkernel notes\n");
    write(
        root,
        "categories/linux/boot/index.md",
        "# Boot\n\nkernel parameters\n",
    );

    let tree = TreeService::new(root.to_path_buf()).discover();
    let paths = PathService::new(root.to_path_buf());
    let hits = SearchService::new(paths.clone()).search("kernel", &tree);
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].path, "categories/linux.md");
    assert_eq!(hits[1].path, "categories/linux/boot/index.md");

    let renderer = RenderService::new(paths);
    for hit in &hits {
        assert!(renderer.render(&hit.path).is_ok());
    }
}

#[test]
fn rendering_is_stable_across_repeated_full_passes() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "categories/code.md",
        "# Code\n\n```python\nif a < b and b > c:\n    print(\"mid & done\")\n```\n\n[home](./code/extra.md)\n",
    );
    write(root, "categories/code/extra.md", "# Extra\n");

    let renderer = RenderService::new(PathService::new(root.to_path_buf()));
    let first = renderer.render("categories/code.md").unwrap();
    let second = renderer.render("categories/code.md").unwrap();
    assert_eq!(first.body_html, second.body_html);
    assert!(first.body_html.contains("&quot;mid &amp; done&quot;"));
    assert!(!first.body_html.contains("&amp;amp;"));
}
