//! # tidytree
//!
//! **Reviewable, reversible layout cleanup** for repositories whose structure
//! has drifted: scripts at the root, tests next to modules, three copies of
//! `app.py`.
//!
//! tidytree never edits file contents and never touches git state. It
//! proposes; a human approves; every applied move is logged and can be
//! undone newest-first.
//!
//! ## Pipeline
//!
//! ```text
//! scan_repository -> detect_repo_type -> Classifier -> ProposalEngine
//!     -> { score_confidence, ImportAnalyzer, GitAdvisor }   (advisory)
//!     -> approval -> Executor -> audit log -> rollback
//! ```
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tidytree::analyzer::{ScanOptions, scan_repository};
//! use tidytree::refactor_plan::{ProposalEngine, render_plan_text};
//!
//! let records = scan_repository(Path::new("."), &ScanOptions::default()).unwrap();
//! let plan = ProposalEngine::new().generate(&records);
//! println!("{}", render_plan_text(&plan));
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! tidytree analyze                 # file statistics
//! tidytree propose --preview       # proposals + tree diff + advisories
//! tidytree apply --execute         # review and move, logged
//! tidytree rollback --execute      # undo the last move
//! ```

// ============================================================================
// Discovery and classification
// ============================================================================

/// Repository discovery and Python static analysis.
///
/// - [`analyzer::scan_repository`] - walk the tree into [`FileRecord`]s
/// - [`analyzer::py`] - import / main-guard / test detection
pub mod analyzer;
/// Ordered heuristic rules mapping a file to one [`Category`].
pub mod classify;
/// Python-dominant / non-Python / mixed decision.
pub mod detect;
/// Per-ecosystem duplicate-name suppression tables.
pub mod ecosystem;
pub mod types;

// ============================================================================
// Planning
// ============================================================================

pub mod proposal;
/// Proposal synthesis: moves, duplicate groups, orphans, safety gates.
///
/// # Key Types
///
/// - [`ProposalEngine`](refactor_plan::ProposalEngine) - builds a plan
/// - [`RefactorPlan`](refactor_plan::RefactorPlan) - proposals + detection + stats
pub mod refactor_plan;
/// HIGH / MEDIUM / LOW verdict with explainable factors.
pub mod confidence;
/// Static prediction of imports broken by proposed moves.
pub mod impact;
/// Read-only git awareness (uncommitted and tracked files).
pub mod git;
/// Before/after tree preview and impact metrics.
pub mod tree;

// ============================================================================
// Execution
// ============================================================================

/// Validated moves, dry runs and LIFO rollback.
pub mod executor;
/// Append-only JSON audit log at the repository root.
pub mod history;

// ============================================================================
// Ambient
// ============================================================================

pub mod cli;
/// `.tidytree/config.toml` loading.
pub mod config;
pub mod error;
/// Spinner and status-line helpers.
pub mod progress;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use classify::{Category, Classifier};
pub use confidence::{ConfidenceScore, Verdict, score_confidence};
pub use config::TidyConfig;
pub use detect::{RepoType, detect_repo_type};
pub use error::{Result, TidyError};
pub use executor::{ExecutionResult, Executor};
pub use proposal::{Proposal, RiskLevel};
pub use refactor_plan::{ProposalEngine, RefactorPlan};
pub use types::FileRecord;
