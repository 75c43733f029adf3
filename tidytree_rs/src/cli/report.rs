//! The `propose` report: plan plus every advisory, as text or JSON.

use serde_json::{Value, json};

use crate::confidence::ConfidenceScore;
use crate::detect::RepoType;
use crate::git::{GitWarning, render_git_warnings};
use crate::impact::{ImportWarning, render_import_warnings};
use crate::refactor_plan::{RefactorPlan, plan_to_json, render_plan_text};
use crate::tree::{ImpactSummary, TreeDiff};

pub struct Preview {
    pub tree: TreeDiff,
    pub impact: ImpactSummary,
}

impl Preview {
    pub fn new(plan: &RefactorPlan, max_files: usize) -> Self {
        Self {
            tree: TreeDiff::from_proposals(&plan.proposals, max_files),
            impact: ImpactSummary::from_proposals(&plan.proposals),
        }
    }
}

pub struct ProposeReport<'a> {
    pub plan: &'a RefactorPlan,
    pub confidence: ConfidenceScore,
    pub import_warnings: Vec<ImportWarning>,
    pub git_warnings: Vec<GitWarning>,
    pub preview: Option<Preview>,
}

impl ProposeReport<'_> {
    pub fn to_json(&self) -> Value {
        let mut value = plan_to_json(self.plan);
        if let Some(obj) = value.as_object_mut() {
            obj.insert("confidence".into(), json!(self.confidence));
            obj.insert("import_warnings".into(), json!(self.import_warnings));
            obj.insert("git_warnings".into(), json!(self.git_warnings));
            if let Some(preview) = &self.preview {
                obj.insert(
                    "preview".into(),
                    json!({ "tree_diff": preview.tree, "impact": preview.impact }),
                );
            }
        }
        value
    }

    pub fn render_text(&self) -> String {
        let mut sections = vec![render_plan_text(self.plan)];

        match self.plan.repo_type() {
            RepoType::NonPython => sections.push(
                "[!] Non-Python repository: only duplicate detection is active".to_string(),
            ),
            RepoType::Mixed => sections
                .push("[i] Mixed repository: moves limited to Python files".to_string()),
            RepoType::PythonDominant => {}
        }

        if let Some(preview) = &self.preview {
            sections.push(preview.tree.render());
            sections.push(preview.impact.render());
        }

        sections.push(self.confidence.render());
        let imports = render_import_warnings(&self.import_warnings);
        if !imports.is_empty() {
            sections.push(imports);
        }
        let git = render_git_warnings(&self.git_warnings);
        if !git.is_empty() {
            sections.push(git);
        }

        sections.push(next_steps(self.plan.repo_type()));
        sections.join("\n\n")
    }
}

fn next_steps(repo_type: RepoType) -> String {
    let steps: &[&str] = match repo_type {
        RepoType::PythonDominant | RepoType::Mixed => &[
            "Review the proposals above",
            "Run 'tidytree apply' to walk through them (add --execute to move files)",
            "Run 'tidytree rollback --execute' to undo the most recent move",
        ],
        RepoType::NonPython => &[
            "Review flagged issues (duplicates, misplaced files)",
            "Moves are disabled for non-Python repositories",
        ],
    };
    let mut out = String::from("Next steps:");
    for (i, step) in steps.iter().enumerate() {
        out.push_str(&format!("\n  {}. {}", i + 1, step));
    }
    out
}
