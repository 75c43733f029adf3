//! Refactor plan generation for repository layout cleanup.
//!
//! Pipeline: detect repository type → classify every file → per-file
//! move/flag proposals → duplicate and orphan flags → repository-type gate →
//! redundant-flag suppression. Each stage is a pure function over value
//! sequences so it can be tested on its own.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::classify::{Category, Classifier, ClassifierTables};
use crate::config::TidyConfig;
use crate::detect::{RepoDetection, RepoType, detect_repo_type};
use crate::ecosystem::{EcosystemProfile, profile_for};
use crate::proposal::{Details, Proposal, RiskLevel, Signal};
use crate::types::FileRecord;

pub mod duplicates;
pub mod output;
pub mod reasons;
pub mod targets;

pub use duplicates::{DuplicatePolicy, detect_duplicates, detect_orphans, duplicate_risk};
pub use output::{DisplayGroup, plan_to_json, render_plan_text};
pub use reasons::build_reason;
pub use targets::{assess_risk, is_correctly_placed, target_path_for};

// ============================================================================
// Data Structures
// ============================================================================

/// Statistics for the refactor plan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanStats {
    /// Total files analyzed
    pub total_files: usize,
    /// Files per category
    pub by_category: BTreeMap<Category, usize>,
    /// Move proposals removed by the repository-type gate
    pub moves_dropped: usize,
    /// Informational flags removed because a move covers the same file
    pub flags_suppressed: usize,
}

/// Complete refactor plan for a repository.
#[derive(Debug, Clone, Serialize)]
pub struct RefactorPlan {
    pub detection: RepoDetection,
    pub profile: EcosystemProfile,
    /// Final proposals in generation order
    pub proposals: Vec<Proposal>,
    pub stats: PlanStats,
}

impl RefactorPlan {
    pub fn repo_type(&self) -> RepoType {
        self.detection.repo_type
    }

    pub fn moves(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter().filter(|p| p.is_move())
    }

    pub fn move_count(&self) -> usize {
        self.moves().count()
    }
}

// ============================================================================
// Per-file proposals
// ============================================================================

/// Move or flag for a single classified file; `None` when it is already in
/// place or the move would be a no-op.
pub fn propose_for_file(
    record: &FileRecord,
    category: Category,
    classifier: &Classifier,
) -> Option<Proposal> {
    if is_correctly_placed(record, category) {
        return None;
    }

    let Some(target) = target_path_for(record, category) else {
        let mut details = Details::new();
        details.insert("category".into(), Value::from(category.label()));
        return Some(Proposal::flag(
            Signal::NeedsReview,
            record.relative_path.clone(),
            "Could not classify - needs manual review",
            RiskLevel::Low,
            details,
        ));
    };

    if target == record.relative_path {
        return None;
    }

    let mut details = Details::new();
    details.insert("category".into(), Value::from(category.label()));
    let current = if record.is_root_level() {
        "root"
    } else {
        record.parent_dir()
    };
    details.insert("current_location".into(), Value::from(current));

    Some(Proposal::move_to(
        record.relative_path.clone(),
        target,
        build_reason(record, category, classifier),
        assess_risk(record, category),
        details,
    ))
}

// ============================================================================
// Safety filters
// ============================================================================

/// Strip every Move unless the repository is Python-dominant.
pub fn enforce_repo_gate(proposals: Vec<Proposal>, repo_type: RepoType) -> (Vec<Proposal>, usize) {
    if repo_type == RepoType::PythonDominant {
        return (proposals, 0);
    }
    let before = proposals.len();
    let kept: Vec<Proposal> = proposals.into_iter().filter(|p| !p.is_move()).collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Drop informational flags on files that already have a Move. Duplicate
/// flags always survive.
pub fn suppress_redundant_flags(proposals: Vec<Proposal>) -> (Vec<Proposal>, usize) {
    let moved: HashSet<String> = proposals
        .iter()
        .filter(|p| p.is_move())
        .map(|p| p.source().to_string())
        .collect();

    let before = proposals.len();
    let kept: Vec<Proposal> = proposals
        .into_iter()
        .filter(|p| {
            let redundant = match p.signal() {
                Some(signal) => {
                    signal.is_informational()
                        && signal != Signal::DuplicateName
                        && moved.contains(p.source())
                }
                None => false,
            };
            !redundant
        })
        .collect();
    let suppressed = before - kept.len();
    (kept, suppressed)
}

// ============================================================================
// Engine
// ============================================================================

/// Turns a discovered file set into a reviewed-change plan.
#[derive(Debug, Clone, Default)]
pub struct ProposalEngine {
    tables: ClassifierTables,
    duplicates: DuplicatePolicy,
    config: TidyConfig,
}

impl ProposalEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &TidyConfig) -> Self {
        Self {
            tables: ClassifierTables::from_config(config),
            duplicates: DuplicatePolicy::from_config(config),
            config: config.clone(),
        }
    }

    pub fn generate(&self, records: &[FileRecord]) -> RefactorPlan {
        let detection = detect_repo_type(records);
        let repo_type = detection.repo_type;
        let profile = profile_for(repo_type).with_config(&self.config);
        info!(profile = %profile.name, "ecosystem profile selected");

        match repo_type {
            RepoType::NonPython => {
                warn!("non-Python repository: move proposals disabled, flags only")
            }
            RepoType::Mixed => info!("mixed repository: moves considered for Python files only"),
            RepoType::PythonDominant => {}
        }

        let classifier = Classifier::new(self.tables.clone()).with_package_dirs(records);
        let classified: Vec<(&FileRecord, Category)> = records
            .iter()
            .map(|r| (r, classifier.classify(r)))
            .collect();

        let mut stats = PlanStats {
            total_files: records.len(),
            ..PlanStats::default()
        };
        for (_, category) in &classified {
            *stats.by_category.entry(*category).or_insert(0) += 1;
        }

        let mut proposals: Vec<Proposal> = classified
            .iter()
            .filter(|(record, _)| match repo_type {
                RepoType::PythonDominant => true,
                RepoType::Mixed => record.is_source(),
                RepoType::NonPython => false,
            })
            .filter_map(|(record, category)| propose_for_file(record, *category, &classifier))
            .collect();

        proposals.extend(detect_duplicates(records, &self.duplicates, &profile));
        if repo_type == RepoType::PythonDominant {
            proposals.extend(detect_orphans(records));
        }

        let (proposals, dropped) = enforce_repo_gate(proposals, repo_type);
        if dropped > 0 {
            info!(dropped, "dropped move proposals for non-Python repository");
        }
        let (proposals, suppressed) = suppress_redundant_flags(proposals);
        if suppressed > 0 {
            info!(suppressed, "suppressed redundant flag proposals");
        }

        stats.moves_dropped = dropped;
        stats.flags_suppressed = suppressed;
        info!(total = proposals.len(), "proposals generated");

        RefactorPlan {
            detection,
            profile,
            proposals,
            stats,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
