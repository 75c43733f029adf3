//! Before/after directory previews and impact metrics for a proposal set.
//!
//! Pure simulation over proposal paths; the filesystem is never read.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::proposal::{Proposal, RiskLevel, count_moves_by_risk};

const RULE_WIDTH: usize = 60;

#[derive(Debug, Default)]
struct Node {
    dirs: BTreeMap<String, Node>,
    files: BTreeSet<String>,
}

impl Node {
    fn insert(&mut self, path: &str) {
        let mut parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let Some(file) = parts.pop() else {
            return;
        };
        let mut node = self;
        for dir in parts {
            node = node.dirs.entry(dir.to_string()).or_default();
        }
        node.files.insert(file.to_string());
    }

    fn render(&self, prefix_parts: &mut Vec<bool>, out: &mut Vec<String>) {
        // Directories first, then files, each alphabetically.
        let total = self.dirs.len() + self.files.len();
        let mut idx = 0;

        for (name, child) in &self.dirs {
            idx += 1;
            let is_last = idx == total;
            out.push(format!("{}{}/", line_prefix(prefix_parts, is_last), name));
            prefix_parts.push(!is_last);
            child.render(prefix_parts, out);
            prefix_parts.pop();
        }
        for name in &self.files {
            idx += 1;
            let is_last = idx == total;
            out.push(format!("{}{}", line_prefix(prefix_parts, is_last), name));
        }
    }
}

fn line_prefix(prefix_parts: &[bool], is_last: bool) -> String {
    let mut prefix = String::new();
    for &has_more in prefix_parts {
        if has_more {
            prefix.push_str("│   ");
        } else {
            prefix.push_str("    ");
        }
    }
    prefix.push_str(if is_last { "└── " } else { "├── " });
    prefix
}

fn render_tree(paths: &[String]) -> String {
    let mut root = Node::default();
    for path in paths {
        root.insert(path);
    }
    let mut lines = vec![".".to_string()];
    root.render(&mut Vec::new(), &mut lines);
    lines.join("\n")
}

// ============================================================================
// Tree diff
// ============================================================================

/// Affected files as they are now and as they would be after every Move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeDiff {
    pub before: Vec<String>,
    pub after: Vec<String>,
    /// Number of affected files before the display cap.
    pub total_affected: usize,
    pub max_files: usize,
}

impl TreeDiff {
    pub fn from_proposals(proposals: &[Proposal], max_files: usize) -> Self {
        let affected: BTreeSet<&str> = proposals.iter().map(Proposal::source).collect();
        let targets: BTreeMap<&str, &str> = proposals
            .iter()
            .filter_map(Proposal::as_move)
            .map(|m| (m.source.as_str(), m.target.as_str()))
            .collect();

        let before: Vec<String> = affected
            .iter()
            .take(max_files)
            .map(|s| s.to_string())
            .collect();

        let mut after: Vec<String> = affected
            .iter()
            .map(|s| targets.get(s).copied().unwrap_or(*s).to_string())
            .collect();
        after.sort();
        after.truncate(max_files);

        Self {
            before,
            after,
            total_affected: affected.len(),
            max_files,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.total_affected > self.max_files
    }

    fn truncation_note(&self) -> String {
        if self.is_truncated() {
            format!(
                "\n... showing {} of {} affected files",
                self.max_files, self.total_affected
            )
        } else {
            String::new()
        }
    }

    pub fn render_before(&self) -> String {
        render_tree(&self.before) + &self.truncation_note()
    }

    pub fn render_after(&self) -> String {
        render_tree(&self.after) + &self.truncation_note()
    }

    pub fn render(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        [
            rule.clone(),
            "DIRECTORY STRUCTURE PREVIEW".to_string(),
            rule.clone(),
            String::new(),
            "BEFORE (current):".to_string(),
            self.render_before(),
            String::new(),
            "AFTER (if proposals applied):".to_string(),
            self.render_after(),
            String::new(),
            rule,
        ]
        .join("\n")
    }
}

// ============================================================================
// Impact summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactSummary {
    pub total_moves: usize,
    pub total_flags: usize,
    /// Every ancestor directory of every Move target.
    pub new_directories: Vec<String>,
    pub risk_breakdown: BTreeMap<RiskLevel, usize>,
    pub duplicate_groups: usize,
}

impl ImpactSummary {
    pub fn from_proposals(proposals: &[Proposal]) -> Self {
        let moves: Vec<_> = proposals.iter().filter_map(Proposal::as_move).collect();

        let mut dirs = BTreeSet::new();
        for mv in &moves {
            let mut current = mv.target.as_str();
            while let Some((parent, _)) = current.rsplit_once('/') {
                if parent.is_empty() {
                    break;
                }
                dirs.insert(parent.to_string());
                current = parent;
            }
        }

        Self {
            total_moves: moves.len(),
            total_flags: proposals.iter().filter(|p| !p.is_move()).count(),
            new_directories: dirs.into_iter().collect(),
            risk_breakdown: count_moves_by_risk(proposals),
            duplicate_groups: proposals.iter().filter(|p| p.is_duplicate_flag()).count(),
        }
    }

    fn risk_count(&self, risk: RiskLevel) -> usize {
        self.risk_breakdown.get(&risk).copied().unwrap_or(0)
    }

    pub fn is_advisory_only(&self) -> bool {
        self.total_moves == 0 && self.total_flags > 0
    }

    pub fn render(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut lines = vec![rule.clone(), "IMPACT SUMMARY".to_string(), rule.clone()];

        if self.total_moves > 0 {
            lines.push(format!("Files to be moved:     {}", self.total_moves));
        }
        if !self.new_directories.is_empty() {
            let mut preview = self
                .new_directories
                .iter()
                .take(5)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            if self.new_directories.len() > 5 {
                preview.push_str(&format!(" (+{} more)", self.new_directories.len() - 5));
            }
            lines.push(format!(
                "New directories:       {} ({})",
                self.new_directories.len(),
                preview
            ));
        }
        for (risk, label) in [
            (RiskLevel::High, "High-risk moves:       "),
            (RiskLevel::Medium, "Medium-risk moves:     "),
            (RiskLevel::Low, "Low-risk moves:        "),
        ] {
            let n = self.risk_count(risk);
            if n > 0 {
                lines.push(format!("{label}{n}"));
            }
        }
        if self.total_flags > 0 {
            lines.push(format!("Files flagged:         {}", self.total_flags));
        }
        if self.duplicate_groups > 0 {
            lines.push(format!("Duplicate groups:      {}", self.duplicate_groups));
        }
        if self.is_advisory_only() {
            lines.push(String::new());
            lines.push("[!] ADVISORY MODE: no moves proposed".to_string());
            lines.push("    Review flagged items for manual cleanup".to_string());
        }

        lines.push(rule);
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::{Details, Signal};

    fn mv(source: &str, target: &str, risk: RiskLevel) -> Proposal {
        Proposal::move_to(source, target, "r", risk, Details::new())
    }

    fn flag(source: &str, signal: Signal) -> Proposal {
        Proposal::flag(signal, source, "r", RiskLevel::Low, Details::new())
    }

    #[test]
    fn test_tree_rendering() {
        let out = render_tree(&[
            "b.py".to_string(),
            "src/pkg/x.py".to_string(),
            "src/a.py".to_string(),
            "docs/readme.md".to_string(),
        ]);
        let expected = "\
.
├── docs/
│   └── readme.md
├── src/
│   ├── pkg/
│   │   └── x.py
│   └── a.py
└── b.py";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_tree_diff_before_after() {
        let proposals = vec![
            mv("api.py", "src/api.py", RiskLevel::Low),
            flag("backup/app.py", Signal::DuplicateName),
        ];
        let diff = TreeDiff::from_proposals(&proposals, 50);
        assert_eq!(diff.before, vec!["api.py", "backup/app.py"]);
        assert_eq!(diff.after, vec!["backup/app.py", "src/api.py"]);
        assert!(!diff.is_truncated());

        let text = diff.render();
        assert!(text.contains("BEFORE (current):"));
        assert!(text.contains("└── api.py"));
        assert!(text.contains("src/"));
    }

    #[test]
    fn test_tree_diff_truncates() {
        let proposals: Vec<Proposal> = (0..5)
            .map(|i| mv(&format!("f{i}.py"), &format!("src/f{i}.py"), RiskLevel::Low))
            .collect();
        let diff = TreeDiff::from_proposals(&proposals, 2);
        assert_eq!(diff.before.len(), 2);
        assert_eq!(diff.after.len(), 2);
        assert!(diff.render_before().ends_with("... showing 2 of 5 affected files"));
    }

    #[test]
    fn test_impact_summary() {
        let proposals = vec![
            mv("a.py", "src/pkg/a.py", RiskLevel::Low),
            mv("run.py", "scripts/run.py", RiskLevel::Medium),
            flag("app.py", Signal::DuplicateName),
            flag("x.py", Signal::NeedsReview),
        ];
        let summary = ImpactSummary::from_proposals(&proposals);
        assert_eq!(summary.total_moves, 2);
        assert_eq!(summary.total_flags, 2);
        assert_eq!(summary.new_directories, vec!["scripts", "src", "src/pkg"]);
        assert_eq!(summary.risk_breakdown.get(&RiskLevel::Medium), Some(&1));
        assert_eq!(summary.duplicate_groups, 1);

        let text = summary.render();
        assert!(text.contains("Files to be moved:     2"));
        assert!(text.contains("New directories:       3 (scripts, src, src/pkg)"));
        assert!(!text.contains("ADVISORY MODE"));
    }

    #[test]
    fn test_advisory_mode_note() {
        let summary = ImpactSummary::from_proposals(&[flag("a.ts", Signal::NeedsReview)]);
        assert!(summary.is_advisory_only());
        assert!(summary.render().contains("ADVISORY MODE"));
    }
}
