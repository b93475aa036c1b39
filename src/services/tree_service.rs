use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::errors::WikiError;
use crate::types::{Category, Subcategory, WikiTree};

/// Discovers the category/subcategory/file hierarchy under the wiki root.
///
/// Layout convention:
///   categories/<cat>.md                  category overview page
///   categories/<cat>/<file>.md           category-level pages
///   categories/<cat>/<subcat>/index.md   subcategory overview (optional)
///   categories/<cat>/<subcat>/<file>.md  subcategory pages
pub struct TreeService {
    base_dir: PathBuf,
}

impl TreeService {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Build a fresh WikiTree from the directory convention.
    ///
    /// A missing `categories/` directory yields an empty tree. An entry
    /// that cannot be listed is skipped so one broken directory does not
    /// blank the navigation for the rest of the wiki.
    pub fn discover(&self) -> WikiTree {
        let mut tree = WikiTree::default();
        let categories_dir = self.base_dir.join("categories");
        if !categories_dir.is_dir() {
            return tree;
        }
        for stem in md_stems_or_empty(&categories_dir) {
            let category = self.discover_category(&stem);
            tree.categories.insert(stem, category);
        }
        debug!("Discovered {} categories", tree.categories.len());
        tree
    }

    fn discover_category(&self, name: &str) -> Category {
        let mut category = Category {
            path: format!("categories/{}.md", name),
            files: BTreeMap::new(),
            subcategories: BTreeMap::new(),
        };
        let category_dir = self.base_dir.join("categories").join(name);
        if !category_dir.is_dir() {
            return category;
        }

        for stem in md_stems_or_empty(&category_dir) {
            let path = format!("categories/{}/{}.md", name, stem);
            category.files.insert(stem, path);
        }

        for sub_name in subdirs_or_empty(&category_dir) {
            let sub_dir = category_dir.join(&sub_name);
            let mut subcategory = Subcategory::default();
            if sub_dir.join("index.md").is_file() {
                subcategory.index = Some(format!("categories/{}/{}/index.md", name, sub_name));
            }
            for stem in md_stems_or_empty(&sub_dir) {
                let path = format!("categories/{}/{}/{}.md", name, sub_name, stem);
                subcategory.files.insert(stem, path);
            }
            category.subcategories.insert(sub_name, subcategory);
        }

        category
    }
}

fn md_stems_or_empty(dir: &Path) -> Vec<String> {
    match list_md_stems(dir) {
        Ok(stems) => stems,
        Err(e) => {
            warn!("Skipping unlistable directory: {:?}", e);
            Vec::new()
        }
    }
}

fn subdirs_or_empty(dir: &Path) -> Vec<String> {
    match list_subdirs(dir) {
        Ok(names) => names,
        Err(e) => {
            warn!("Skipping unlistable directory: {:?}", e);
            Vec::new()
        }
    }
}

/// Stems of `*.md` files directly in `dir`, excluding `index.md` and
/// dotfiles, sorted for deterministic tree iteration
fn list_md_stems(dir: &Path) -> Result<Vec<String>, WikiError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| WikiError::Discovery(format!("{}: {}", dir.display(), e)))?;
    let mut stems = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else {
            warn!("Skipping unreadable entry in {:?}", dir);
            continue;
        };
        let name = entry.file_name().to_string_lossy().to_string();
        if name == "index.md" || name.starts_with('.') {
            continue;
        }
        let Some(stem) = name.strip_suffix(".md") else {
            continue;
        };
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            stems.push(stem.to_string());
        }
    }
    stems.sort();
    Ok(stems)
}

/// Immediate subdirectories of `dir`, excluding dot directories, sorted
fn list_subdirs(dir: &Path) -> Result<Vec<String>, WikiError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| WikiError::Discovery(format!("{}: {}", dir.display(), e)))?;
    let mut names = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else {
            warn!("Skipping unreadable entry in {:?}", dir);
            continue;
        };
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}
