use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub base_dir: Arc<PathBuf>,
    pub static_dir: Arc<PathBuf>,
}

/// The discovered category/subcategory/file hierarchy for one wiki root.
///
/// Keys are filename stems. BTreeMap iteration matches the sorted directory
/// listing order, so sidebar rendering and search traversal are identical
/// across runs and platforms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WikiTree {
    pub categories: BTreeMap<String, Category>,
}

/// One `categories/<name>.md` entry plus the contents of its directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// The category's own overview page
    pub path: String,
    /// Pages directly under `categories/<name>/`, keyed by file stem
    pub files: BTreeMap<String, String>,
    pub subcategories: BTreeMap<String, Subcategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subcategory {
    /// `categories/<cat>/<subcat>/index.md`, when present
    pub index: Option<String>,
    /// Sibling pages excluding index.md, keyed by file stem
    pub files: BTreeMap<String, String>,
}

/// The HTML-plus-metadata result of converting one markdown file
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub title: String,
    pub body_html: String,
    pub toc_html: String,
    pub code_blocks: Vec<CodeBlock>,
}

/// A fenced code span lifted out of a document during rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub source: String,
}

/// One search match, in tree traversal order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub path: String,
    pub title: String,
    pub snippet: String,
}
