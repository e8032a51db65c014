//! Export the assembled document as downloadable files.

use std::path::{Path, PathBuf};

/// File names the document is exported under; the content is identical.
pub const EXPORT_FILE_NAMES: [&str; 2] = ["optimized_prompt.txt", "optimized_prompt.md"];

/// Export format, distinguished only by file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Markdown,
}

impl ExportFormat {
    /// File name written for this format.
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Text => EXPORT_FILE_NAMES[0],
            ExportFormat::Markdown => EXPORT_FILE_NAMES[1],
        }
    }
}

/// Write `document` into `dir` under the file name for `format`.
///
/// An empty document has nothing to export and is refused.
pub fn export(dir: &Path, format: ExportFormat, document: &str) -> Result<PathBuf, Error> {
    if document.is_empty() {
        return Err(Error::Empty);
    }

    let path = dir.join(format.file_name());
    std::fs::write(&path, document).map_err(|e| Error::Write {
        path: path.display().to_string(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), "exported optimized prompt");
    Ok(path)
}

/// Write `document` under both export file names.
pub fn export_all(dir: &Path, document: &str) -> Result<Vec<PathBuf>, Error> {
    [ExportFormat::Text, ExportFormat::Markdown]
        .into_iter()
        .map(|format| export(dir, format, document))
        .collect()
}

/// Errors from exporting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("nothing to export: type a rough prompt first")]
    Empty,

    #[error("failed to write '{path}'")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_files_have_identical_content() {
        let dir = tempfile::tempdir().unwrap();
        let paths = export_all(dir.path(), "=== INPUT ===\nhello").unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("optimized_prompt.txt"));
        assert!(paths[1].ends_with("optimized_prompt.md"));
        for path in &paths {
            assert_eq!(std::fs::read_to_string(path).unwrap(), "=== INPUT ===\nhello");
        }
    }

    #[test]
    fn empty_document_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(export(dir.path(), ExportFormat::Markdown, ""), Err(Error::Empty)));
        assert!(!dir.path().join("optimized_prompt.md").exists());
    }

    #[test]
    fn missing_directory_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = export(&dir.path().join("nope"), ExportFormat::Text, "x").unwrap_err();
        assert!(err.to_string().contains("optimized_prompt.txt"));
    }
}
