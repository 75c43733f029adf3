//! Repository type detection.
//!
//! Scores root-level marker files and extension counts to decide whether
//! structural moves make sense at all:
//! - setup.py / pyproject.toml / requirements.txt → Python markers
//! - package.json / tsconfig.json / angular.json → frontend markers
//! - pom.xml, go.mod, Gemfile, *.csproj → other ecosystems

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analyzer::extension_key;
use crate::types::FileRecord;

const PYTHON_ROOT_FILES: &[&str] = &[
    "setup.py",
    "setup.cfg",
    "pyproject.toml",
    "requirements.txt",
    "Pipfile",
    "poetry.lock",
    "tox.ini",
    "pytest.ini",
];

const FRONTEND_FILES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "angular.json",
    "tsconfig.json",
    "webpack.config.js",
    "vite.config.js",
    "next.config.js",
];

const JAVA_FILES: &[&str] = &["pom.xml", "build.gradle", "gradlew"];
const GO_FILES: &[&str] = &["go.mod", "go.sum"];
const RUBY_FILES: &[&str] = &["Gemfile", "Rakefile"];
const DOTNET_EXTENSIONS: &[&str] = &[".csproj", ".sln", ".fsproj", ".vbproj"];
const SCRIPT_EXTENSIONS: &[&str] = &[".ts", ".js", ".tsx", ".jsx"];

/// Coarse repository classification; gates every Move proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoType {
    PythonDominant,
    NonPython,
    Mixed,
}

impl RepoType {
    pub fn label(&self) -> &'static str {
        match self {
            RepoType::PythonDominant => "python_dominant",
            RepoType::NonPython => "non_python",
            RepoType::Mixed => "mixed",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RepoType::PythonDominant => "Python-dominant",
            RepoType::NonPython => "Non-Python",
            RepoType::Mixed => "Mixed",
        }
    }
}

/// Full detection outcome, kept for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct RepoDetection {
    pub repo_type: RepoType,
    pub python_score: u32,
    pub non_python_score: u32,
    pub python_percentage: f64,
    pub extension_counts: BTreeMap<String, usize>,
    pub root_files: BTreeSet<String>,
}

impl RepoDetection {
    /// Diagnostic view: counts, root files and which markers matched.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "repo_type": self.repo_type.label(),
            "python_score": self.python_score,
            "non_python_score": self.non_python_score,
            "python_percentage": self.python_percentage,
            "extension_counts": self.extension_counts,
            "root_files": self.root_files,
            "python_root_files": matching(&self.root_files, PYTHON_ROOT_FILES),
            "non_python_indicators": matching(&self.root_files, FRONTEND_FILES),
        })
    }
}

fn matching(root_files: &BTreeSet<String>, markers: &[&str]) -> Vec<String> {
    root_files
        .iter()
        .filter(|f| markers.contains(&f.as_str()))
        .cloned()
        .collect()
}

fn any_marker(root_files: &BTreeSet<String>, markers: &[&str]) -> bool {
    markers.iter().any(|m| root_files.contains(*m))
}

/// Decide the repository type from the discovered files.
pub fn detect_repo_type(records: &[FileRecord]) -> RepoDetection {
    let mut extension_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut root_files = BTreeSet::new();

    for record in records {
        *extension_counts
            .entry(extension_key(&record.extension))
            .or_insert(0) += 1;
        if record.is_root_level() {
            root_files.insert(record.name.clone());
        }
    }

    let count = |ext: &str| extension_counts.get(ext).copied().unwrap_or(0);
    let py_count = count(".py");

    let mut python_score = 2 * matching(&root_files, PYTHON_ROOT_FILES).len() as u32;
    python_score += match py_count {
        n if n > 10 => 3,
        n if n > 5 => 2,
        n if n > 0 => 1,
        _ => 0,
    };

    let mut non_python_score = 0;
    for markers in [FRONTEND_FILES, JAVA_FILES, GO_FILES, RUBY_FILES] {
        if any_marker(&root_files, markers) {
            non_python_score += 3;
        }
    }
    if DOTNET_EXTENSIONS.iter().any(|ext| count(ext) > 0) {
        non_python_score += 3;
    }
    let script_count: usize = SCRIPT_EXTENSIONS.iter().map(|ext| count(ext)).sum();
    non_python_score += match script_count {
        n if n > 20 => 2,
        n if n > 10 => 1,
        _ => 0,
    };

    let total = records.len();
    let python_percentage = py_count as f64 / total.max(1) as f64 * 100.0;

    let repo_type = if python_score >= 3 && python_percentage >= 50.0 {
        RepoType::PythonDominant
    } else if non_python_score >= 2 && python_percentage < 20.0 {
        RepoType::NonPython
    } else if python_percentage >= 30.0 {
        RepoType::Mixed
    } else {
        RepoType::NonPython
    };

    info!(
        repo_type = repo_type.label(),
        python_percentage,
        python_score,
        non_python_score,
        "repository type detected"
    );

    RepoDetection {
        repo_type,
        python_score,
        non_python_score,
        python_percentage,
        extension_counts,
        root_files,
    }
}
