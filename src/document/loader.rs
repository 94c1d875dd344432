use crate::document::Document;
use crate::error::{RagError, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Reads every text file directly inside a directory.
///
/// Only files whose extension is in the allow-list are considered, and
/// subdirectories are never descended into. A candidate file that cannot be
/// read (permissions, invalid UTF-8) aborts the whole load so a build never
/// silently runs on a partial corpus.
pub struct DocumentLoader {
    documents_path: PathBuf,
    extensions: Vec<String>,
}

impl DocumentLoader {
    pub fn new(documents_path: impl Into<PathBuf>) -> Self {
        Self {
            documents_path: documents_path.into(),
            extensions: vec!["txt".to_string()],
        }
    }

    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    pub fn documents_path(&self) -> &Path {
        &self.documents_path
    }

    /// Returns the documents sorted by file name.
    pub async fn load_documents(&self) -> Result<Vec<Document>> {
        let dir = &self.documents_path;
        let metadata = fs::metadata(dir)
            .await
            .map_err(|e| RagError::file_access(dir, e))?;
        if !metadata.is_dir() {
            return Err(RagError::file_access(dir, "not a directory"));
        }

        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| RagError::file_access(dir, e))?;

        let mut candidates = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RagError::file_access(dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| RagError::file_access(&path, e))?;
            if file_type.is_dir() {
                continue;
            }
            if !self.has_allowed_extension(&path) {
                debug!("Skipping {} (extension not allowed)", path.display());
                continue;
            }
            candidates.push(path);
        }
        candidates.sort();

        let mut documents = Vec::with_capacity(candidates.len());
        for path in candidates {
            let content = fs::read_to_string(&path)
                .await
                .map_err(|e| RagError::file_access(&path, e))?;
            let id = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            debug!("Loaded {} ({} bytes)", id, content.len());
            documents.push(Document { id, path, content });
        }

        info!("Loaded {} documents from {}", documents.len(), dir.display());
        Ok(documents)
    }

    fn has_allowed_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }
}
