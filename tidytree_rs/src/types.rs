use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Extension (lowercase, no dot) treated as the implementation language.
pub const SOURCE_EXTENSION: &str = "py";

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One physical file discovered in the repository.
///
/// Built once by the scanner; never mutated by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute (or root-joined) path on disk.
    pub path: PathBuf,
    /// Path relative to the repository root, `/`-separated.
    pub relative_path: String,
    pub name: String,
    /// Lowercase extension without the dot; empty when absent.
    pub extension: String,
    pub size: u64,
    /// Imported module names in source order.
    pub imports: Vec<String>,
    pub has_main_guard: bool,
    pub is_executable: bool,
    pub has_tests: bool,
}

impl FileRecord {
    /// Build a record from a root and a relative path with no analysed metadata.
    pub fn new(root: &Path, relative_path: &str, size: u64) -> Self {
        let relative_path = normalize_relative(relative_path);
        let name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(relative_path.as_str())
            .to_string();
        let extension = extension_of(&name);
        Self {
            path: root.join(&relative_path),
            relative_path,
            name,
            extension,
            size,
            imports: Vec::new(),
            has_main_guard: false,
            is_executable: false,
            has_tests: false,
        }
    }

    /// Number of path components (1 for a root-level file).
    pub fn depth(&self) -> usize {
        self.relative_path.split('/').count()
    }

    pub fn is_root_level(&self) -> bool {
        self.depth() == 1
    }

    /// Directory part of the relative path; empty at root.
    pub fn parent_dir(&self) -> &str {
        match self.relative_path.rsplit_once('/') {
            Some((parent, _)) => parent,
            None => "",
        }
    }

    /// Directory components only, file name excluded.
    pub fn dir_segments(&self) -> impl Iterator<Item = &str> {
        self.parent_dir().split('/').filter(|s| !s.is_empty())
    }

    pub fn first_dir(&self) -> Option<&str> {
        self.dir_segments().next()
    }

    /// File name without its final extension.
    pub fn stem(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => self.name.as_str(),
        }
    }

    pub fn is_source(&self) -> bool {
        self.extension == SOURCE_EXTENSION
    }

    #[cfg(test)]
    pub(crate) fn at(relative_path: &str) -> Self {
        Self::new(Path::new("/repo"), relative_path, 0)
    }

    #[cfg(test)]
    pub(crate) fn with_imports(mut self, imports: &[&str]) -> Self {
        self.imports = imports.iter().map(|s| s.to_string()).collect();
        self
    }

    #[cfg(test)]
    pub(crate) fn with_tests(mut self) -> Self {
        self.has_tests = true;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_main_guard(mut self) -> Self {
        self.has_main_guard = true;
        self.is_executable = true;
        self
    }
}

pub fn normalize_relative(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches("./").to_string()
}

pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => String::new(),
    }
}

/// Parent directory of a `/`-separated relative path; empty at root.
pub fn parent_of(relative: &str) -> &str {
    relative.rsplit_once('/').map(|(p, _)| p).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_path_helpers() {
        let rec = FileRecord::at("pkg/sub/Module.PY");
        assert_eq!(rec.name, "Module.PY");
        assert_eq!(rec.extension, "py");
        assert_eq!(rec.depth(), 3);
        assert_eq!(rec.parent_dir(), "pkg/sub");
        assert_eq!(rec.first_dir(), Some("pkg"));
        assert_eq!(rec.stem(), "Module");
        assert!(rec.is_source());
    }

    #[test]
    fn root_level_and_dotfiles() {
        let rec = FileRecord::at(".gitignore");
        assert!(rec.is_root_level());
        assert_eq!(rec.extension, "");
        assert_eq!(rec.stem(), ".gitignore");
        assert_eq!(rec.parent_dir(), "");
        assert_eq!(rec.dir_segments().count(), 0);
    }

    #[test]
    fn normalizes_separators() {
        assert_eq!(normalize_relative("./a\\b.py"), "a/b.py");
        assert_eq!(parent_of("a/b/c.py"), "a/b");
        assert_eq!(parent_of("c.py"), "");
    }
}
