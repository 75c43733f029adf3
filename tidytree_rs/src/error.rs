//! Library error type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TidyError {
    #[error("repository root does not exist: {0}")]
    MissingRoot(PathBuf),

    #[error("repository root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("History error: {0}")]
    History(String),
}

pub type Result<T> = std::result::Result<T, TidyError>;

/// Fail fast on a root that cannot be analysed.
pub fn ensure_root(root: &std::path::Path) -> Result<()> {
    if !root.exists() {
        return Err(TidyError::MissingRoot(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(TidyError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rejects_missing_root() {
        let temp = TempDir::new().expect("temp dir");
        let missing = temp.path().join("nope");
        assert!(matches!(
            ensure_root(&missing),
            Err(TidyError::MissingRoot(_))
        ));
    }

    #[test]
    fn rejects_file_root() {
        let temp = TempDir::new().expect("temp dir");
        let file = temp.path().join("file.txt");
        std::fs::write(&file, "x").expect("write file");
        assert!(matches!(
            ensure_root(&file),
            Err(TidyError::NotADirectory(_))
        ));
        assert!(ensure_root(temp.path()).is_ok());
    }
}
