//! Text and JSON rendering of a refactor plan.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::proposal::Proposal;

use super::RefactorPlan;

const RULE_WIDTH: usize = 80;

const CONFIG_NAMES: &[&str] = &[
    ".env",
    ".gitignore",
    ".editorconfig",
    ".dockerignore",
    "setup.py",
    "setup.cfg",
    "pyproject.toml",
    "tox.ini",
    "pytest.ini",
    ".flake8",
    ".pylintrc",
    "tsconfig.json",
    "angular.json",
    "webpack.config.js",
    ".eslintrc",
    ".prettierrc",
];

const DEPENDENCY_NAMES: &[&str] = &[
    "requirements.txt",
    "requirements-dev.txt",
    "pipfile",
    "poetry.lock",
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "gemfile",
    "go.mod",
    "go.sum",
    "pom.xml",
];

/// Presentation-only grouping of proposals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DisplayGroup {
    Configuration,
    Dependencies,
    Documentation,
    SourceCode,
    Tests,
    Scripts,
    LogsArtifacts,
    Other,
}

impl DisplayGroup {
    pub const ALL: [DisplayGroup; 8] = [
        DisplayGroup::Configuration,
        DisplayGroup::Dependencies,
        DisplayGroup::Documentation,
        DisplayGroup::SourceCode,
        DisplayGroup::Tests,
        DisplayGroup::Scripts,
        DisplayGroup::LogsArtifacts,
        DisplayGroup::Other,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            DisplayGroup::Configuration => "Configuration",
            DisplayGroup::Dependencies => "Dependencies",
            DisplayGroup::Documentation => "Documentation",
            DisplayGroup::SourceCode => "Source Code",
            DisplayGroup::Tests => "Tests",
            DisplayGroup::Scripts => "Scripts",
            DisplayGroup::LogsArtifacts => "Logs & Artifacts",
            DisplayGroup::Other => "Other",
        }
    }

    pub fn of(proposal: &Proposal) -> Self {
        let source = proposal.source().to_lowercase();
        let filename = source.rsplit('/').next().unwrap_or(&source).to_string();
        let ends_with_any = |exts: &[&str]| exts.iter().any(|e| source.ends_with(e));

        if CONFIG_NAMES.contains(&filename.as_str())
            || (ends_with_any(&[".ini", ".cfg", ".conf", ".yaml", ".yml", ".toml"])
                && (filename.contains("config") || filename.contains("settings")))
        {
            DisplayGroup::Configuration
        } else if DEPENDENCY_NAMES.contains(&filename.as_str()) {
            DisplayGroup::Dependencies
        } else if ends_with_any(&[".log", ".tmp", ".cache"]) {
            DisplayGroup::LogsArtifacts
        } else if ends_with_any(&[".md", ".rst", ".txt"])
            || ["readme", "license", "changelog"]
                .iter()
                .any(|k| filename.contains(k))
        {
            DisplayGroup::Documentation
        } else if source.contains("script") {
            DisplayGroup::Scripts
        } else if source.contains("test") {
            DisplayGroup::Tests
        } else if ends_with_any(&[".py", ".ts", ".js"]) && source.contains("src/") {
            DisplayGroup::SourceCode
        } else {
            DisplayGroup::Other
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Multi-line block for one proposal.
pub fn render_proposal(proposal: &Proposal) -> String {
    let mut lines = vec![format!(
        "{}: {}",
        proposal.action().as_str().to_uppercase(),
        proposal.source()
    )];
    if let Some(target) = proposal.target() {
        lines.push(format!("    → {}", target));
    }
    lines.push(format!("REASON: {}", proposal.reason()));
    lines.push(format!("RISK: {}", proposal.risk().label()));

    let details = proposal.details();
    if let Some(Value::Array(examples)) = details.get("examples") {
        lines.push("  Examples:".to_string());
        for example in examples {
            lines.push(format!("    - {}", value_text(example)));
        }
        if let Some(remaining) = details.get("remaining") {
            lines.push(format!("    ({})", value_text(remaining)));
        }
    } else {
        for (key, value) in details {
            if key != "all_duplicates" {
                lines.push(format!("  {}: {}", key, value_text(value)));
            }
        }
    }
    lines.join("\n")
}

fn summary_counts(proposals: &[Proposal]) -> (BTreeMap<&'static str, usize>, BTreeMap<&'static str, usize>) {
    let mut by_action = BTreeMap::new();
    let mut by_risk = BTreeMap::new();
    for p in proposals {
        *by_action.entry(p.action().as_str()).or_insert(0) += 1;
        *by_risk.entry(p.risk().as_str()).or_insert(0) += 1;
    }
    (by_action, by_risk)
}

/// Grouped, numbered listing with a trailing summary.
pub fn render_proposals_text(proposals: &[Proposal]) -> String {
    if proposals.is_empty() {
        return "No proposals generated.".to_string();
    }

    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut lines = vec![
        heavy.clone(),
        format!("STRUCTURAL CHANGE PROPOSALS ({} total)", proposals.len()),
        heavy.clone(),
        String::new(),
    ];

    let mut groups: BTreeMap<DisplayGroup, Vec<&Proposal>> = BTreeMap::new();
    for p in proposals {
        groups.entry(DisplayGroup::of(p)).or_default().push(p);
    }

    let mut number = 1;
    for (group, members) in &groups {
        lines.push(light.clone());
        lines.push(format!(
            "{} ({} proposals)",
            group.display_name().to_uppercase(),
            members.len()
        ));
        lines.push(light.clone());
        lines.push(String::new());
        for p in members {
            lines.push(format!("[{}] {}", number, render_proposal(p)));
            lines.push(String::new());
            number += 1;
        }
    }

    let (by_action, by_risk) = summary_counts(proposals);
    lines.push(heavy.clone());
    lines.push("SUMMARY".to_string());
    lines.push(heavy);
    lines.push(format!("Total proposals: {}", proposals.len()));
    lines.push("\nBy action:".to_string());
    for (action, count) in &by_action {
        lines.push(format!("  {}: {}", action, count));
    }
    lines.push("\nBy risk level:".to_string());
    for (risk, count) in &by_risk {
        lines.push(format!("  {}: {}", risk, count));
    }
    lines.push("\nBy category:".to_string());
    for (group, members) in &groups {
        lines.push(format!("  {}: {}", group.display_name(), members.len()));
    }
    lines.join("\n")
}

/// Header line naming the repository type, then the grouped listing.
pub fn render_plan_text(plan: &RefactorPlan) -> String {
    let mut out = format!(
        "Repository type: {} ({:.1}% Python, profile: {})\n\n",
        plan.repo_type().display_name(),
        plan.detection.python_percentage,
        plan.profile.name
    );
    out.push_str(&render_proposals_text(&plan.proposals));
    out
}

pub fn plan_to_json(plan: &RefactorPlan) -> Value {
    let (by_action, by_risk) = summary_counts(&plan.proposals);
    json!({
        "repo_type": plan.repo_type().label(),
        "profile": plan.profile.name,
        "total_proposals": plan.proposals.len(),
        "proposals": plan.proposals,
        "summary": {
            "by_action": by_action,
            "by_risk": by_risk,
        },
    })
}
