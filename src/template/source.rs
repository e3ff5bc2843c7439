use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::template::contract::{TemplateId, is_valid_template_id};

/// Extension of template documents in a [`DirSource`].
pub const TEMPLATE_EXTENSION: &str = "json";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("no template source for '{0}'")]
    NotFound(String),

    #[error("failed to read template '{id}': {message}")]
    Io { id: String, message: String },
}

/// Supplies raw template documents by id.
///
/// Only ever called with ids that passed [`TemplateId`] validation.
pub trait TemplateSource: Send + Sync {
    fn fetch(&self, id: &TemplateId) -> Result<String, SourceError>;

    /// Ids this source can currently provide, sorted.
    fn list_ids(&self) -> Vec<String>;
}

/// Reads `<root>/<id>.json`.
#[derive(Clone, Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &TemplateId) -> PathBuf {
        self.root
            .join(format!("{}.{TEMPLATE_EXTENSION}", id.as_str()))
    }
}

impl TemplateSource for DirSource {
    #[tracing::instrument(level = "debug", skip(self), fields(id = %id))]
    fn fetch(&self, id: &TemplateId) -> Result<String, SourceError> {
        let path = self.path_for(id);
        std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::NotFound(id.to_string()),
            _ => SourceError::Io {
                id: id.to_string(),
                message: format!("{}: {e}", path.display()),
            },
        })
    }

    fn list_ids(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut ids: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == TEMPLATE_EXTENSION))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_owned))
            .filter(|id| is_valid_template_id(id))
            .collect();
        ids.sort();
        ids
    }
}

/// In-memory documents, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySource {
    docs: Mutex<BTreeMap<String, String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: &str, text: impl Into<String>) {
        if let Ok(mut docs) = self.docs.lock() {
            docs.insert(id.to_owned(), text.into());
        }
    }

    pub fn remove(&self, id: &str) -> bool {
        self.docs
            .lock()
            .map(|mut docs| docs.remove(id).is_some())
            .unwrap_or(false)
    }
}

impl TemplateSource for MemorySource {
    fn fetch(&self, id: &TemplateId) -> Result<String, SourceError> {
        let docs = self.docs.lock().map_err(|_| SourceError::Io {
            id: id.to_string(),
            message: "memory source lock poisoned".to_owned(),
        })?;
        docs.get(id.as_str())
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }

    fn list_ids(&self) -> Vec<String> {
        self.docs
            .lock()
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/source.rs"]
mod tests;
