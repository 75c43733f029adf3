//! Configuration file support for tidytree.
//!
//! Loads optional `.tidytree/config.toml` from the repository root. Every key
//! extends or overrides one of the built-in rule tables.

use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// Directory holding tool-owned files; never scanned.
pub const CONFIG_DIR: &str = ".tidytree";

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct TidyConfig {
    pub classifier: ClassifierConfig,
    pub duplicates: DuplicatesConfig,
    pub scan: ScanConfig,
    pub git: GitConfig,
    pub preview: PreviewConfig,
}

/// Additions to the classifier rule tables.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Extra exact file names treated as configuration.
    pub extra_config_names: Vec<String>,
    /// Extra framework names that mark a module as application code.
    pub extra_app_imports: Vec<String>,
    /// Extra test framework module names.
    pub extra_test_imports: Vec<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct DuplicatesConfig {
    /// Replaces the built-in exempt list when present.
    pub exempt: Option<Vec<String>>,
    /// Name substrings whose duplication is always expected.
    pub extra_suppressed: Vec<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Extra glob patterns (matched against file names and relative paths).
    pub extra_ignore: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub timeout_secs: u64,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self { timeout_secs: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Cap on files drawn in the before/after tree.
    pub max_files: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { max_files: 50 }
    }
}

impl TidyConfig {
    /// Load config from `.tidytree/config.toml` in the given root directory.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_DIR).join("config.toml");
        Self::load_from_path(&config_path)
    }

    /// Load config from a specific path.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring invalid config");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read config");
                Self::default()
            }
        }
    }

    /// Strict parse, for callers that want the error.
    pub fn parse(content: &str) -> crate::error::Result<Self> {
        toml::from_str(content).map_err(|e| crate::error::TidyError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = TidyConfig::default();
        assert!(config.classifier.extra_config_names.is_empty());
        assert!(config.duplicates.exempt.is_none());
        assert!(config.scan.extra_ignore.is_empty());
        assert_eq!(config.git.timeout_secs, 5);
        assert_eq!(config.preview.max_files, 50);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().expect("temp dir");
        let config = TidyConfig::load(temp.path());
        assert_eq!(config.git.timeout_secs, 5);
    }

    #[test]
    fn test_load_valid_config() {
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).expect("create .tidytree");

        let mut file = std::fs::File::create(dir.join("config.toml")).expect("create config");
        writeln!(
            file,
            r#"
[classifier]
extra_app_imports = ["starlette"]

[duplicates]
exempt = ["__init__.py"]
extra_suppressed = ["routes.py"]

[git]
timeout_secs = 2
"#
        )
        .expect("write config");

        let config = TidyConfig::load(temp.path());
        assert_eq!(config.classifier.extra_app_imports, vec!["starlette"]);
        assert_eq!(
            config.duplicates.exempt.as_deref(),
            Some(&["__init__.py".to_string()][..])
        );
        assert_eq!(config.duplicates.extra_suppressed, vec!["routes.py"]);
        assert_eq!(config.git.timeout_secs, 2);
        assert_eq!(config.preview.max_files, 50);
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).expect("create .tidytree");
        std::fs::write(dir.join("config.toml"), "[git\ntimeout_secs = ").expect("write config");

        let config = TidyConfig::load(temp.path());
        assert_eq!(config.git.timeout_secs, 5);
        assert!(TidyConfig::parse("[git\n").is_err());
    }
}
