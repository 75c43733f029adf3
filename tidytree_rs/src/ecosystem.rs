//! Ecosystem profiles: file names whose duplication is expected.

use serde::Serialize;

use crate::config::TidyConfig;
use crate::detect::RepoType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EcosystemProfile {
    pub name: String,
    /// Lowercase substrings; a matching duplicate group is never flagged.
    pub suppressed_duplicates: Vec<String>,
}

impl EcosystemProfile {
    fn build(name: &str, patterns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            suppressed_duplicates: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn python() -> Self {
        Self::build("python", &[])
    }

    pub fn nextjs() -> Self {
        Self::build(
            "nextjs",
            &[
                "index.html",
                "index.tsx",
                "index.ts",
                "page.tsx",
                "layout.tsx",
                "_app.tsx",
                "_document.tsx",
            ],
        )
    }

    pub fn frontend_static() -> Self {
        Self::build("frontend-static", &["index.html", "index.js", "index.css"])
    }

    /// Add `[duplicates].extra_suppressed` patterns from config.
    pub fn with_config(mut self, config: &TidyConfig) -> Self {
        self.suppressed_duplicates.extend(
            config
                .duplicates
                .extra_suppressed
                .iter()
                .map(|p| p.to_lowercase()),
        );
        self
    }

    pub fn suppresses_duplicate(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        self.suppressed_duplicates
            .iter()
            .any(|p| lower.contains(p.as_str()))
    }
}

/// Profile selected for a repository type. Non-Python and mixed repositories
/// are assumed to carry a frontend.
pub fn profile_for(repo_type: RepoType) -> EcosystemProfile {
    match repo_type {
        RepoType::PythonDominant => EcosystemProfile::python(),
        RepoType::NonPython | RepoType::Mixed => EcosystemProfile::nextjs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_profile_suppresses_nothing() {
        let profile = profile_for(RepoType::PythonDominant);
        assert_eq!(profile.name, "python");
        assert!(!profile.suppresses_duplicate("index.html"));
    }

    #[test]
    fn frontend_profiles_suppress_framework_files() {
        for repo_type in [RepoType::NonPython, RepoType::Mixed] {
            let profile = profile_for(repo_type);
            assert_eq!(profile.name, "nextjs");
            assert!(profile.suppresses_duplicate("page.tsx"));
            assert!(profile.suppresses_duplicate("Index.HTML"));
            assert!(!profile.suppresses_duplicate("utils.ts"));
        }
        assert!(EcosystemProfile::frontend_static().suppresses_duplicate("index.css"));
    }

    #[test]
    fn config_extends_suppression() {
        let mut config = TidyConfig::default();
        config.duplicates.extra_suppressed = vec!["Routes.py".to_string()];
        let profile = EcosystemProfile::python().with_config(&config);
        assert!(profile.suppresses_duplicate("routes.py"));
    }
}
