//! Discovery of `.sql` source files under the configured root.

use crate::error::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect all `.sql` files under `root`, sorted by path so runs process
/// files in a deterministic order.
pub fn sql_files<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some("sql")
        {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// File name component of a source path, used as the ledger key.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_finds_sql_files_recursively_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("views")).unwrap();
        fs::write(dir.path().join("002_views.sql"), "select 1").unwrap();
        fs::write(dir.path().join("001_tables.sql"), "select 1").unwrap();
        fs::write(dir.path().join("views/003_reports.sql"), "select 1").unwrap();
        fs::write(dir.path().join("README.md"), "not sql").unwrap();

        let files = sql_files(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|p| file_name(p)).collect();
        assert_eq!(
            names,
            vec!["001_tables.sql", "002_views.sql", "003_reports.sql"]
        );
    }

    #[test]
    fn test_missing_root_is_io_error() {
        let err = sql_files("no/such/dir").unwrap_err();
        assert!(matches!(err, crate::error::FlowError::Io(_)));
    }

    #[test]
    fn test_file_name_strips_directories() {
        assert_eq!(file_name(Path::new("sql/views/001.sql")), "001.sql");
    }
}
