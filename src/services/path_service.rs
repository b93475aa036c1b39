use std::fs;
use std::path::PathBuf;

use log::{debug, error, warn};

use crate::errors::WikiError;

/// Resolves and validates the root-relative paths used as node identifiers.
///
/// Every externally supplied path goes through [`PathService::normalize`]
/// before it touches the filesystem, so the rest of the pipeline never sees
/// platform separators or segments that climb out of the wiki root.
#[derive(Clone)]
pub struct PathService {
    base_dir: PathBuf,
}

impl PathService {
    pub fn new(base_dir: PathBuf) -> Self {
        debug!("Creating PathService with base directory: {:?}", base_dir);
        Self { base_dir }
    }

    /// Normalize a candidate path into a root-relative, slash-separated
    /// identifier. Backslashes are unified to forward slashes and `.`
    /// segments dropped. A path whose `..` segments would climb past the
    /// wiki root is rejected with `InvalidPath`, never clamped back inside.
    pub fn normalize(&self, raw: &str) -> Result<String, WikiError> {
        let unified = raw.replace('\\', "/");
        let mut parts: Vec<&str> = Vec::new();
        for part in unified.split('/') {
            match part {
                "" | "." => continue,
                ".." => {
                    if parts.pop().is_none() {
                        warn!("Rejected path escaping the wiki root: '{}'", raw);
                        return Err(WikiError::InvalidPath);
                    }
                }
                segment => parts.push(segment),
            }
        }
        if parts.is_empty() {
            return Err(WikiError::InvalidPath);
        }
        Ok(parts.join("/"))
    }

    /// Absolute location of a normalized path inside the wiki root
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Existence probe; no error on absence
    pub fn exists(&self, path: &str) -> bool {
        let full = self.resolve(path);
        full.is_file()
    }

    /// Read a file under the wiki root
    pub fn read(&self, path: &str) -> Result<String, WikiError> {
        let full = self.resolve(path);
        if !full.is_file() {
            warn!("File does not exist: {:?}", full);
            return Err(WikiError::NotFound);
        }
        fs::read_to_string(&full).map_err(|e| {
            error!("Failed to read file {:?}: {}", full, e);
            WikiError::Read(e)
        })
    }
}
