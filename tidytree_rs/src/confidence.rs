//! Confidence verdict for a proposal set.
//!
//! Starts from 100 points and applies fixed penalties and bonuses:
//! - non-Python repository: -30
//! - high-risk moves: -20 each, capped at three
//! - more than five medium-risk moves: -15
//! - import breakage warnings: -10 each, capped at three
//! - no tests while moves are pending: -10
//! - dry run: +5
//! - more than twenty moves: -15
//!
//! The factor lists explain the verdict; they never feed back into it.
//!
//! # Example
//!
//! ```rust
//! use tidytree::confidence::{ConfidenceInputs, Verdict, score_confidence};
//!
//! let score = score_confidence(&[], &ConfidenceInputs::default());
//! assert_eq!(score.verdict, Verdict::High);
//! ```

use serde::Serialize;

use crate::detect::RepoType;
use crate::proposal::{Proposal, RiskLevel};

pub const BASE_SCORE: i32 = 100;
pub const HIGH_THRESHOLD: i32 = 70;
pub const MEDIUM_THRESHOLD: i32 = 40;

/// Overall verdict, ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Low,
    Medium,
    High,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Low => "LOW",
            Verdict::Medium => "MEDIUM",
            Verdict::High => "HIGH",
        }
    }

    pub fn interpretation(&self) -> &'static str {
        match self {
            Verdict::High => "Changes appear safe to apply.",
            Verdict::Medium => "Review changes carefully before applying.",
            Verdict::Low => "High risk - consider smaller batches or manual review.",
        }
    }

    fn from_score(score: i32) -> Self {
        if score >= HIGH_THRESHOLD {
            Verdict::High
        } else if score >= MEDIUM_THRESHOLD {
            Verdict::Medium
        } else {
            Verdict::Low
        }
    }
}

/// Context flags that accompany the proposal set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfidenceInputs {
    pub repo_type: Option<RepoType>,
    pub has_tests: bool,
    pub import_warnings: usize,
    pub dry_run: bool,
}

impl Default for ConfidenceInputs {
    fn default() -> Self {
        Self {
            repo_type: None,
            has_tests: false,
            import_warnings: 0,
            dry_run: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfidenceScore {
    pub verdict: Verdict,
    /// Raw points behind the verdict.
    pub score: i32,
    pub positive_factors: Vec<String>,
    pub risk_factors: Vec<String>,
    pub move_count: usize,
    pub high_risk_count: usize,
    pub medium_risk_count: usize,
    pub low_risk_count: usize,
    pub import_warnings_count: usize,
    pub has_tests: bool,
    pub is_dry_run: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct MoveCounts {
    total: usize,
    high: usize,
    medium: usize,
    low: usize,
}

impl MoveCounts {
    fn of(proposals: &[Proposal]) -> Self {
        let mut counts = Self::default();
        for p in proposals.iter().filter(|p| p.is_move()) {
            counts.total += 1;
            match p.risk() {
                RiskLevel::High => counts.high += 1,
                RiskLevel::Medium => counts.medium += 1,
                RiskLevel::Low => counts.low += 1,
            }
        }
        counts
    }
}

fn points(counts: MoveCounts, inputs: &ConfidenceInputs) -> i32 {
    let mut score = BASE_SCORE;

    if inputs.repo_type == Some(RepoType::NonPython) {
        score -= 30;
    }
    score -= 20 * counts.high.min(3) as i32;

    // The >10 arm is unreachable once >5 has matched; only -15 ever applies.
    if counts.medium > 5 {
        score -= 15;
    } else if counts.medium > 10 {
        score -= 25;
    }

    score -= 10 * inputs.import_warnings.min(3) as i32;
    if !inputs.has_tests && counts.total > 0 {
        score -= 10;
    }
    if inputs.dry_run {
        score += 5;
    }
    if counts.total > 20 {
        score -= 15;
    }
    score
}

fn factors(counts: MoveCounts, inputs: &ConfidenceInputs) -> (Vec<String>, Vec<String>) {
    let mut positives = Vec::new();
    let mut risks = Vec::new();

    match inputs.repo_type {
        Some(RepoType::PythonDominant) => positives.push("Python-dominant repository".to_string()),
        Some(RepoType::NonPython) => risks.push("Non-Python repository (higher risk)".to_string()),
        Some(other) => positives.push(format!("{} repository", other.label())),
        None => {}
    }

    if inputs.has_tests {
        positives.push("Tests detected (easier to validate changes)".to_string());
    } else if counts.total > 0 {
        risks.push("No tests detected (harder to validate)".to_string());
    }

    match counts.total {
        0 => positives.push("No structural changes proposed".to_string()),
        n if n <= 5 => positives.push(format!("Small number of changes ({} moves)", n)),
        n if n <= 15 => risks.push(format!("Moderate number of changes ({} moves)", n)),
        n => risks.push(format!("Large number of changes ({} moves)", n)),
    }

    if counts.high > 0 {
        risks.push(format!("{} high-risk moves", counts.high));
    }
    if counts.medium > 0 {
        risks.push(format!("{} medium-risk moves", counts.medium));
    }
    if counts.low > 0 && counts.high == 0 && counts.medium == 0 {
        positives.push(format!("All moves are low-risk ({} moves)", counts.low));
    }

    if inputs.import_warnings > 0 {
        risks.push(format!(
            "{} potential import breakage(s)",
            inputs.import_warnings
        ));
    } else if counts.total > 0 {
        positives.push("No import breakage warnings".to_string());
    }

    if inputs.dry_run {
        positives.push("Dry-run mode (simulation only)".to_string());
    }

    (positives, risks)
}

/// Score a proposal set. Pure: same inputs, same verdict.
pub fn score_confidence(proposals: &[Proposal], inputs: &ConfidenceInputs) -> ConfidenceScore {
    let counts = MoveCounts::of(proposals);
    let score = points(counts, inputs);
    let (positive_factors, risk_factors) = factors(counts, inputs);

    ConfidenceScore {
        verdict: Verdict::from_score(score),
        score,
        positive_factors,
        risk_factors,
        move_count: counts.total,
        high_risk_count: counts.high,
        medium_risk_count: counts.medium,
        low_risk_count: counts.low,
        import_warnings_count: inputs.import_warnings,
        has_tests: inputs.has_tests,
        is_dry_run: inputs.dry_run,
    }
}

impl ConfidenceScore {
    pub fn render(&self) -> String {
        let rule = "=".repeat(60);
        let mut lines = vec![
            rule.clone(),
            format!("REORGANIZATION CONFIDENCE: {}", self.verdict.label()),
            rule.clone(),
            String::new(),
        ];
        if !self.positive_factors.is_empty() {
            lines.push("Positive factors:".to_string());
            for factor in &self.positive_factors {
                lines.push(format!("  ✔ {}", factor));
            }
        }
        if !self.risk_factors.is_empty() {
            if !self.positive_factors.is_empty() {
                lines.push(String::new());
            }
            lines.push("Risk factors:".to_string());
            for factor in &self.risk_factors {
                lines.push(format!("  ⚠ {}", factor));
            }
        }
        lines.push(String::new());
        lines.push(format!("Interpretation: {}", self.verdict.interpretation()));
        lines.push(rule);
        lines.join("\n")
    }
}
