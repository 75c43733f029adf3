//! Duplicate-name and root-orphan detection.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::config::TidyConfig;
use crate::ecosystem::EcosystemProfile;
use crate::proposal::{Details, Proposal, RiskLevel, Signal};
use crate::types::FileRecord;

const EXAMPLE_LIMIT: usize = 3;

const HIGH_RISK_NAMES: &[&str] = &[
    "requirements.txt",
    ".env",
    "dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "pipfile",
    "pipfile.lock",
    "setup.py",
    "pyproject.toml",
];

const LOW_RISK_NAMES: &[&str] = &[
    "readme.md",
    "changelog.md",
    "license",
    "license.md",
    "license.txt",
    "contributing.md",
];

/// Root-level source files that are expected entry points.
const ROOT_ENTRY_POINTS: &[&str] = &["setup.py", "manage.py"];

/// Which structural files never count as duplicates.
#[derive(Debug, Clone)]
pub struct DuplicatePolicy {
    pub exempt: Vec<String>,
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        Self {
            exempt: vec![
                "__init__.py".to_string(),
                "__main__.py".to_string(),
                "conftest.py".to_string(),
            ],
        }
    }
}

impl DuplicatePolicy {
    pub fn from_config(config: &TidyConfig) -> Self {
        match &config.duplicates.exempt {
            Some(exempt) => Self {
                exempt: exempt.clone(),
            },
            None => Self::default(),
        }
    }

    pub fn is_exempt(&self, name: &str) -> bool {
        self.exempt.iter().any(|e| e == name)
    }
}

/// Risk of a duplicated name: critical manifests high, docs and logs low.
pub fn duplicate_risk(filename: &str) -> RiskLevel {
    let lower = filename.to_lowercase();
    if HIGH_RISK_NAMES.contains(&lower.as_str()) {
        RiskLevel::High
    } else if LOW_RISK_NAMES.contains(&lower.as_str())
        || lower.ends_with(".log")
        || lower.ends_with(".tmp")
    {
        RiskLevel::Low
    } else {
        RiskLevel::Medium
    }
}

/// One grouped Flag per case-insensitive name shared by two or more files.
pub fn detect_duplicates(
    records: &[FileRecord],
    policy: &DuplicatePolicy,
    profile: &EcosystemProfile,
) -> Vec<Proposal> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&FileRecord>> = HashMap::new();

    for record in records {
        if policy.is_exempt(&record.name) {
            continue;
        }
        let key = record.name.to_lowercase();
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(record);
    }

    let mut proposals = Vec::new();
    for key in order {
        let Some(members) = groups.get(&key) else {
            continue;
        };
        if members.len() < 2 {
            continue;
        }
        let first = members[0];
        if profile.suppresses_duplicate(&first.name) {
            debug!(name = %first.name, profile = %profile.name, "duplicate suppressed by profile");
            continue;
        }

        let total = members.len();
        let all: Vec<Value> = members
            .iter()
            .map(|r| Value::from(r.relative_path.clone()))
            .collect();
        let mut details = Details::new();
        details.insert("total_count".into(), Value::from(total));
        details.insert(
            "examples".into(),
            Value::Array(all.iter().take(EXAMPLE_LIMIT).cloned().collect()),
        );
        details.insert("all_duplicates".into(), Value::Array(all));
        if total > EXAMPLE_LIMIT {
            details.insert(
                "remaining".into(),
                Value::from(format!("+{} more", total - EXAMPLE_LIMIT)),
            );
        }

        proposals.push(Proposal::flag(
            Signal::DuplicateName,
            first.relative_path.clone(),
            format!("Duplicate filename: {} files named '{}'", total, first.name),
            duplicate_risk(&first.name),
            details,
        ));
    }
    proposals
}

/// Root-level source files other than the usual entry points.
pub fn detect_orphans(records: &[FileRecord]) -> Vec<Proposal> {
    records
        .iter()
        .filter(|r| r.is_root_level() && r.is_source())
        .filter(|r| !ROOT_ENTRY_POINTS.contains(&r.name.as_str()))
        .map(|r| {
            let mut details = Details::new();
            details.insert(
                "suggestion".into(),
                Value::from("Consider moving to src/ or scripts/"),
            );
            Proposal::flag(
                Signal::RootLevel,
                r.relative_path.clone(),
                "Python file at repository root",
                RiskLevel::Low,
                details,
            )
        })
        .collect()
}
