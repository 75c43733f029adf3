//! File classification: one category per record, first matching rule wins.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::TidyConfig;
use crate::types::{FileRecord, SOURCE_EXTENSION};

// ============================================================================
// Categories
// ============================================================================

/// Organizational category of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Source,
    Tests,
    Configuration,
    Scripts,
    Docs,
    Markdown,
    Data,
    Experiments,
    Unclassified,
}

impl Category {
    /// Short label used in proposal details.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Source => "src",
            Category::Tests => "tests",
            Category::Configuration => "configs",
            Category::Scripts => "scripts",
            Category::Docs => "docs",
            Category::Markdown => "markdown",
            Category::Data => "data",
            Category::Experiments => "experiments",
            Category::Unclassified => "unclassified",
        }
    }

    /// Directory that holds files of this category, if any.
    pub fn canonical_dir(&self) -> Option<&'static str> {
        match self {
            Category::Source => Some("src"),
            Category::Tests => Some("tests"),
            Category::Configuration => Some("configs"),
            Category::Scripts => Some("scripts"),
            Category::Docs | Category::Markdown => Some("docs"),
            Category::Data => Some("data"),
            Category::Experiments => Some("experiments"),
            Category::Unclassified => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Source => "Source",
            Category::Tests => "Tests",
            Category::Configuration => "Configuration",
            Category::Scripts => "Scripts",
            Category::Docs => "Docs",
            Category::Markdown => "Markdown",
            Category::Data => "Data",
            Category::Experiments => "Experiments",
            Category::Unclassified => "Unclassified",
        }
    }
}

// ============================================================================
// Rule tables
// ============================================================================

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Static rule data driving the classifier.
#[derive(Debug, Clone)]
pub struct ClassifierTables {
    /// Exact file names that are always configuration.
    pub config_names: Vec<String>,
    pub config_extensions: Vec<String>,
    pub data_extensions: Vec<String>,
    pub doc_extensions: Vec<String>,
    pub markdown_extensions: Vec<String>,
    pub script_prefixes: Vec<String>,
    pub experiment_prefixes: Vec<String>,
    pub experiment_names: Vec<String>,
    pub experiment_name_keywords: Vec<String>,
    pub experiment_dir_keywords: Vec<String>,
    pub backup_suffixes: Vec<String>,
    /// Substrings of imported modules that indicate application code.
    pub app_imports: Vec<String>,
    /// Exact module names of test frameworks.
    pub test_imports: Vec<String>,
}

impl Default for ClassifierTables {
    fn default() -> Self {
        Self {
            config_names: owned(&[
                "setup.py",
                "setup.cfg",
                "pyproject.toml",
                "requirements.txt",
                "requirements-dev.txt",
                "Pipfile",
                "poetry.lock",
                ".gitignore",
                ".dockerignore",
                "Dockerfile",
                "docker-compose.yml",
                ".env",
                ".env.example",
                "tox.ini",
                "pytest.ini",
                ".flake8",
                ".pylintrc",
                "mypy.ini",
            ]),
            config_extensions: owned(&["ini", "cfg", "conf", "yaml", "yml", "toml", "json"]),
            data_extensions: owned(&[
                "csv", "tsv", "json", "xml", "db", "sqlite", "sqlite3", "pkl", "pickle", "npy",
                "npz", "parquet", "feather",
            ]),
            doc_extensions: owned(&["rst", "txt", "pdf", "html", "htm"]),
            markdown_extensions: owned(&["md", "markdown"]),
            script_prefixes: owned(&[
                "run_", "main_", "cli_", "script_", "setup_", "deploy_", "build_",
            ]),
            experiment_prefixes: owned(&["temp_", "tmp_", "demo_", "example_", "prototype_"]),
            experiment_names: owned(&["experiment", "playground", "scratch", "test_run"]),
            experiment_name_keywords: owned(&["experiment", "playground", "scratch"]),
            experiment_dir_keywords: owned(&["experiment", "playground", "scratch", "temp", "tmp"]),
            backup_suffixes: owned(&[".bak"]),
            app_imports: owned(&[
                "fastapi",
                "flask",
                "django",
                "sqlalchemy",
                "pydantic",
                "numpy",
                "pandas",
                "scikit-learn",
                "torch",
                "tensorflow",
            ]),
            test_imports: owned(&[
                "pytest",
                "unittest",
                "mock",
                "testify",
                "hypothesis",
                "nose",
                "doctest",
            ]),
        }
    }
}

impl ClassifierTables {
    /// Built-in tables extended with the `[classifier]` config section.
    pub fn from_config(config: &TidyConfig) -> Self {
        let mut tables = Self::default();
        let extra = &config.classifier;
        tables.config_names.extend(extra.extra_config_names.iter().cloned());
        tables.app_imports.extend(extra.extra_app_imports.iter().cloned());
        tables.test_imports.extend(extra.extra_test_imports.iter().cloned());
        tables
    }

    pub fn is_config_name(&self, name: &str) -> bool {
        self.config_names.iter().any(|n| n == name)
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// Pure classifier: the same record always yields the same category.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    tables: ClassifierTables,
    /// Directories (relative, `/`-separated) holding an `__init__.py`.
    package_dirs: HashSet<String>,
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}

fn starts_with_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.starts_with(n.as_str()))
}

impl Classifier {
    pub fn new(tables: ClassifierTables) -> Self {
        Self {
            tables,
            package_dirs: HashSet::new(),
        }
    }

    /// Record which directories are packages, from the discovered file set.
    pub fn with_package_dirs(mut self, records: &[FileRecord]) -> Self {
        self.package_dirs = records
            .iter()
            .filter(|r| r.name == "__init__.py" && !r.is_root_level())
            .map(|r| r.parent_dir().to_string())
            .collect();
        self
    }

    pub fn tables(&self) -> &ClassifierTables {
        &self.tables
    }

    pub fn classify(&self, record: &FileRecord) -> Category {
        if self.tables.markdown_extensions.contains(&record.extension) {
            return Category::Markdown;
        }
        if record.extension != SOURCE_EXTENSION {
            return self.classify_non_source(record);
        }

        if self.is_experiment(record) {
            Category::Experiments
        } else if self.is_test(record) {
            Category::Tests
        } else if self.is_config(record) {
            Category::Configuration
        } else if self.is_script(record) {
            Category::Scripts
        } else if self.is_source(record) {
            Category::Source
        } else {
            Category::Unclassified
        }
    }

    fn classify_non_source(&self, record: &FileRecord) -> Category {
        let t = &self.tables;
        if t.is_config_name(&record.name) {
            Category::Configuration
        } else if t.data_extensions.contains(&record.extension) {
            Category::Data
        } else if t.config_extensions.contains(&record.extension) {
            Category::Configuration
        } else if t.doc_extensions.contains(&record.extension) {
            Category::Docs
        } else {
            Category::Unclassified
        }
    }

    pub fn is_experiment(&self, record: &FileRecord) -> bool {
        self.experiment_name_signal(record) || self.experiment_path_signal(record)
    }

    /// Scratch/backup naming on the file itself.
    pub fn experiment_name_signal(&self, record: &FileRecord) -> bool {
        let t = &self.tables;
        let name = record.name.to_lowercase();
        let stem = record.stem().to_lowercase();

        starts_with_any(&name, &t.experiment_prefixes)
            || t.experiment_names.contains(&stem)
            || contains_any(&name, &t.experiment_name_keywords)
            || name.starts_with("untitled")
            || t.backup_suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }

    /// Any path segment, file name included, carries a scratch keyword.
    /// Substring match, so `template_loader.py` counts.
    pub fn experiment_path_signal(&self, record: &FileRecord) -> bool {
        record
            .relative_path
            .split('/')
            .any(|seg| contains_any(&seg.to_lowercase(), &self.tables.experiment_dir_keywords))
    }

    /// A containing directory looks like a scratch area.
    pub fn experiment_dir_signal(&self, record: &FileRecord) -> bool {
        record.dir_segments().any(|seg| {
            contains_any(&seg.to_lowercase(), &self.tables.experiment_dir_keywords)
        })
    }

    /// Imported modules that are known test frameworks.
    pub fn test_framework_imports<'a>(&self, record: &'a FileRecord) -> Vec<&'a str> {
        record
            .imports
            .iter()
            .filter(|imp| self.tables.test_imports.contains(*imp))
            .map(String::as_str)
            .collect()
    }

    pub fn is_test(&self, record: &FileRecord) -> bool {
        let name = record.name.to_lowercase();
        record
            .dir_segments()
            .any(|seg| seg.to_lowercase().contains("test"))
            || record.has_tests
            || name.starts_with("test_")
            || record.stem().to_lowercase().ends_with("_test")
            || !self.test_framework_imports(record).is_empty()
    }

    pub fn is_config(&self, record: &FileRecord) -> bool {
        let stem = record.stem().to_lowercase();
        self.tables.is_config_name(&record.name)
            || stem == "config"
            || stem.ends_with("_config")
            || stem == "settings"
            || stem.ends_with("_settings")
    }

    pub fn is_script(&self, record: &FileRecord) -> bool {
        let name = record.name.to_lowercase();
        record.has_main_guard
            || starts_with_any(&name, &self.tables.script_prefixes)
            || record.dir_segments().any(|seg| seg == "scripts")
    }

    pub fn is_source(&self, record: &FileRecord) -> bool {
        record.dir_segments().any(|seg| seg == "src")
            || (!record.is_root_level() && self.package_dirs.contains(record.parent_dir()))
            || record
                .imports
                .iter()
                .any(|imp| contains_any(imp, &self.tables.app_imports))
            || record.imports.len() > 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(record: &FileRecord) -> Category {
        Classifier::default().classify(record)
    }

    #[test]
    fn markdown_always_wins() {
        assert_eq!(classify(&FileRecord::at("tests/README.md")), Category::Markdown);
        assert_eq!(classify(&FileRecord::at("notes.markdown")), Category::Markdown);
    }

    #[test]
    fn non_source_routing_order() {
        assert_eq!(classify(&FileRecord::at("requirements.txt")), Category::Configuration);
        assert_eq!(classify(&FileRecord::at("Dockerfile")), Category::Configuration);
        // json is both data and config; data is checked first
        assert_eq!(classify(&FileRecord::at("fixtures.json")), Category::Data);
        assert_eq!(classify(&FileRecord::at("deploy.yaml")), Category::Configuration);
        assert_eq!(classify(&FileRecord::at("guide.rst")), Category::Docs);
        assert_eq!(classify(&FileRecord::at("notes.txt")), Category::Docs);
        assert_eq!(classify(&FileRecord::at("logo.png")), Category::Unclassified);
        assert_eq!(classify(&FileRecord::at("Makefile")), Category::Unclassified);
    }

    #[test]
    fn experiment_checked_before_tests() {
        assert_eq!(classify(&FileRecord::at("temp_test_runner.py")), Category::Experiments);
        assert_eq!(classify(&FileRecord::at("test_run.py")), Category::Experiments);
        assert_eq!(classify(&FileRecord::at("my_playground_v2.py")), Category::Experiments);
        assert_eq!(classify(&FileRecord::at("tmp/helpers.py")), Category::Experiments);
        assert_eq!(classify(&FileRecord::at("untitled3.py")), Category::Experiments);
        assert!(Classifier::default().experiment_name_signal(&FileRecord::at("models.py.bak")));
        // only the `.bak` suffix marks a backup; other spellings stay for review
        assert_eq!(classify(&FileRecord::at("models_backup.py")), Category::Unclassified);
    }

    #[test]
    fn experiment_keywords_match_file_name_segment() {
        let classifier = Classifier::default();
        for path in ["template_loader.py", "attempt.py", "contemporary.py"] {
            let record = FileRecord::at(path);
            assert_eq!(classifier.classify(&record), Category::Experiments, "{path}");
            assert!(classifier.experiment_path_signal(&record));
            assert!(!classifier.experiment_dir_signal(&record));
        }
        assert!(classifier.experiment_dir_signal(&FileRecord::at("scratch/util.py")));
    }

    #[test]
    fn test_rule_ignores_file_name_segment() {
        // `contest.py` has "test" only in its name, not in a directory
        assert_eq!(classify(&FileRecord::at("contest.py")), Category::Unclassified);
    }

    #[test]
    fn test_rules() {
        assert_eq!(classify(&FileRecord::at("test_api.py")), Category::Tests);
        assert_eq!(classify(&FileRecord::at("api_test.py")), Category::Tests);
        assert_eq!(classify(&FileRecord::at("unit_tests/checks.py")), Category::Tests);
        assert_eq!(classify(&FileRecord::at("checks.py").with_tests()), Category::Tests);
        assert_eq!(
            classify(&FileRecord::at("checks.py").with_imports(&["pytest"])),
            Category::Tests
        );
        // exact match only for test frameworks
        assert_ne!(
            classify(&FileRecord::at("checks.py").with_imports(&["pytest_cov_helpers"])),
            Category::Tests
        );
    }

    #[test]
    fn config_rules_for_source_files() {
        assert_eq!(classify(&FileRecord::at("setup.py")), Category::Configuration);
        assert_eq!(classify(&FileRecord::at("config.py")), Category::Configuration);
        assert_eq!(classify(&FileRecord::at("db_config.py")), Category::Configuration);
        assert_eq!(classify(&FileRecord::at("settings.py")), Category::Configuration);
        assert_eq!(classify(&FileRecord::at("app_settings.py")), Category::Configuration);
    }

    #[test]
    fn script_rules() {
        assert_eq!(classify(&FileRecord::at("tool.py").with_main_guard()), Category::Scripts);
        assert_eq!(classify(&FileRecord::at("deploy_prod.py")), Category::Scripts);
        assert_eq!(classify(&FileRecord::at("scripts/clean.py")), Category::Scripts);
    }

    #[test]
    fn source_rules() {
        assert_eq!(classify(&FileRecord::at("src/core.py")), Category::Source);
        assert_eq!(
            classify(&FileRecord::at("api.py").with_imports(&["fastapi", "pydantic"])),
            Category::Source
        );
        assert_eq!(
            classify(&FileRecord::at("util.py").with_imports(&["os", "sys", "json"])),
            Category::Source
        );
        assert_eq!(
            classify(&FileRecord::at("util.py").with_imports(&["os", "sys"])),
            Category::Unclassified
        );
    }

    #[test]
    fn package_marker_makes_source() {
        let records = vec![FileRecord::at("pkg/__init__.py"), FileRecord::at("pkg/models.py")];
        let classifier = Classifier::default().with_package_dirs(&records);
        assert_eq!(classifier.classify(&records[1]), Category::Source);
        assert_eq!(Classifier::default().classify(&records[1]), Category::Unclassified);

        // a root-level __init__.py never marks root files as packaged
        let root = vec![FileRecord::at("__init__.py"), FileRecord::at("lonely.py")];
        let classifier = Classifier::default().with_package_dirs(&root);
        assert_eq!(classifier.classify(&root[1]), Category::Unclassified);
    }

    #[test]
    fn classification_is_idempotent() {
        let classifier = Classifier::default();
        let record = FileRecord::at("pkg/service.py").with_imports(&["flask"]);
        assert_eq!(classifier.classify(&record), classifier.classify(&record));
    }

    #[test]
    fn extra_tables_from_config() {
        let mut config = TidyConfig::default();
        config.classifier.extra_app_imports = vec!["starlette".to_string()];
        config.classifier.extra_config_names = vec!["Justfile".to_string()];
        let classifier = Classifier::new(ClassifierTables::from_config(&config));
        assert_eq!(
            classifier.classify(&FileRecord::at("asgi.py").with_imports(&["starlette"])),
            Category::Source
        );
        assert_eq!(classifier.classify(&FileRecord::at("Justfile")), Category::Configuration);
    }
}
