//! Output of assembled documents to a directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::assemble::Document;
use crate::error::WriteError;

/// Render one document as two-space indented JSON.
pub fn render_document(name: &str, document: &Document) -> Result<String, WriteError> {
    serde_json::to_string_pretty(&document.to_value()).map_err(|source| WriteError::Serialize {
        name: name.to_string(),
        source,
    })
}

/// Write every document into `dir`, creating it if needed.
///
/// Existing files are overwritten. The first failure aborts the loop.
pub fn write_documents(
    dir: &Path,
    documents: &BTreeMap<String, Document>,
) -> Result<Vec<PathBuf>, WriteError> {
    std::fs::create_dir_all(dir).map_err(|source| WriteError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(documents.len());
    for (name, document) in documents {
        let path = dir.join(name);
        let content = render_document(name, document)?;
        std::fs::write(&path, content).map_err(|source| WriteError::WriteFile {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "wrote schema document");
        written.push(path);
    }

    Ok(written)
}
