//! Invoice file discovery.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{IngestError, Result};

/// Lists all XML files in a directory (non-recursive).
///
/// Returns files sorted by filename.
pub fn list_xml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let is_xml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));

        if is_xml {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// Expands audit inputs into the list of documents to process.
///
/// Directories are replaced by their XML files; any other path is kept as
/// given so that an unreadable file surfaces as a per-document error.
/// Duplicates are dropped, keeping first-seen order.
pub fn collect_xml_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut documents = Vec::new();

    for input in inputs {
        let candidates = if input.is_dir() {
            let files = list_xml_files(input)?;
            debug!(dir = %input.display(), files = files.len(), "expanded input directory");
            files
        } else {
            vec![input.clone()]
        };
        for path in candidates {
            if seen.insert(path.clone()) {
                documents.push(path);
            }
        }
    }

    Ok(documents)
}
