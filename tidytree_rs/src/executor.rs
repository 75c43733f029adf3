//! Applies approved Move proposals and undoes them.
//!
//! Each proposal goes Validate -> Simulate or Perform -> Record. Validation
//! failures and IO errors become failed [`ExecutionResult`]s; nothing here
//! panics or propagates on a bad move. Rollback replays the audit log in
//! LIFO order and stops at the first step that cannot be validated.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::{Result, ensure_root};
use crate::history::{AuditAction, AuditEntry, AuditLog};
use crate::proposal::{Details, MoveProposal, Proposal, RiskLevel};

/// ISO-8601 local timestamp.
fn now_iso8601() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Outcome of one apply or rollback attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub proposal: Proposal,
    pub success: bool,
    /// Not applicable, as opposed to failed.
    pub skipped: bool,
    pub message: String,
    pub timestamp: String,
}

impl ExecutionResult {
    fn new(proposal: Proposal, success: bool, message: String) -> Self {
        Self {
            proposal,
            success,
            skipped: false,
            message,
            timestamp: now_iso8601(),
        }
    }

    fn skipped(proposal: Proposal, message: String) -> Self {
        Self {
            skipped: true,
            ..Self::new(proposal, false, message)
        }
    }

    pub fn is_failure(&self) -> bool {
        !self.success && !self.skipped
    }

    /// Audit form, tagged with the proposal's own action.
    pub fn to_entry(&self) -> AuditEntry {
        self.to_entry_as(self.proposal.action().into())
    }

    pub fn to_entry_as(&self, action: AuditAction) -> AuditEntry {
        AuditEntry {
            timestamp: self.timestamp.clone(),
            action,
            source: self.proposal.source().to_string(),
            target: self.proposal.target().map(str::to_string),
            success: self.success,
            skipped: self.skipped,
            message: self.message.clone(),
            risk: self.proposal.risk(),
        }
    }
}

/// Counts over the results of one apply run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutionSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub dry_run: bool,
}

impl ExecutionSummary {
    pub fn from_results(results: &[ExecutionResult], dry_run: bool) -> Self {
        Self {
            total: results.len(),
            successful: results.iter().filter(|r| r.success).count(),
            failed: results.iter().filter(|r| r.is_failure()).count(),
            skipped: results.iter().filter(|r| r.skipped).count(),
            dry_run,
        }
    }

    pub fn render(&self) -> String {
        let mode = if self.dry_run { "DRY-RUN" } else { "EXECUTE" };
        format!(
            "Execution summary ({mode})\n  Total:      {}\n  Successful: {}\n  Failed:     {}\n  Skipped:    {}",
            self.total, self.successful, self.failed, self.skipped
        )
    }
}

pub struct Executor {
    root: PathBuf,
    dry_run: bool,
    results: Vec<ExecutionResult>,
    /// Results before this index are already in the audit log.
    saved: usize,
    log: AuditLog,
}

impl Executor {
    pub fn new(root: &Path, dry_run: bool) -> Result<Self> {
        ensure_root(root)?;
        let root = root.canonicalize()?;
        info!("Executor ready for {} (dry_run={})", root.display(), dry_run);
        Ok(Self {
            log: AuditLog::for_root(&root),
            root,
            dry_run,
            results: Vec::new(),
            saved: 0,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn results(&self) -> &[ExecutionResult] {
        &self.results
    }

    pub fn history(&self) -> &AuditLog {
        &self.log
    }

    // ============================================================================
    // Apply
    // ============================================================================

    pub fn apply(&mut self, proposal: &Proposal) -> ExecutionResult {
        let result = match proposal.as_move() {
            None => ExecutionResult::skipped(
                proposal.clone(),
                format!(
                    "Unsupported action: {} (only move is executable)",
                    proposal.action().as_str()
                ),
            ),
            Some(mv) => self.apply_move(proposal, mv),
        };
        self.results.push(result.clone());
        result
    }

    pub fn apply_all(&mut self, proposals: &[Proposal]) -> Vec<ExecutionResult> {
        proposals.iter().map(|p| self.apply(p)).collect()
    }

    fn apply_move(&self, proposal: &Proposal, mv: &MoveProposal) -> ExecutionResult {
        if let Err(problem) = self.validate_move(&mv.source, &mv.target) {
            return ExecutionResult::new(
                proposal.clone(),
                false,
                format!("Validation failed: {problem}"),
            );
        }

        if self.dry_run {
            let message = format!("[DRY-RUN] Would move {} -> {}", mv.source, mv.target);
            info!("{}", message);
            return ExecutionResult::new(proposal.clone(), true, message);
        }

        match self.perform_move(&mv.source, &mv.target) {
            Ok(()) => {
                let message = format!("Moved {} -> {}", mv.source, mv.target);
                info!("{}", message);
                ExecutionResult::new(proposal.clone(), true, message)
            }
            Err(e) => {
                let message = format!("Failed to execute: {e}");
                error!("{}", message);
                ExecutionResult::new(proposal.clone(), false, message)
            }
        }
    }

    fn validate_move(&self, source: &str, target: &str) -> std::result::Result<(), String> {
        if source.is_empty() {
            return Err("Source path is empty".to_string());
        }
        if target.is_empty() {
            return Err("Target path is empty".to_string());
        }

        let source_full = self.root.join(source);
        let target_full = self.root.join(target);

        if !source_full.exists() {
            return Err(format!(
                "Source file does not exist: {}",
                source_full.display()
            ));
        }
        if !source_full.is_file() {
            return Err(format!("Source is not a file: {}", source_full.display()));
        }
        if target_full.exists() {
            return Err(format!(
                "Target already exists (conflict): {}",
                target_full.display()
            ));
        }
        if let Some(parent) = target_full.parent() {
            if parent.exists() && !parent.is_dir() {
                return Err(format!(
                    "Target parent exists but is not a directory: {}",
                    parent.display()
                ));
            }
        }
        Ok(())
    }

    fn perform_move(&self, source: &str, target: &str) -> io::Result<()> {
        move_file(&self.root.join(source), &self.root.join(target))
    }

    /// Append results not yet persisted. Writes nothing in dry-run mode.
    pub fn save_history(&mut self) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        let pending: Vec<AuditEntry> = self.results[self.saved..]
            .iter()
            .map(ExecutionResult::to_entry)
            .collect();
        if pending.is_empty() {
            return Ok(());
        }
        self.log.append(&pending)?;
        self.saved = self.results.len();
        info!(
            "Saved {} entries to {}",
            pending.len(),
            self.log.path().display()
        );
        Ok(())
    }

    pub fn summary(&self) -> ExecutionSummary {
        ExecutionSummary::from_results(&self.results, self.dry_run)
    }

    // ============================================================================
    // Rollback
    // ============================================================================

    /// Undo the last `count` successful moves, most recent first.
    ///
    /// Stops at the first step that fails validation or IO; the failing
    /// result is the last element returned. Successful live steps are
    /// appended to the audit log as `rollback` entries.
    pub fn rollback(&mut self, count: usize) -> Vec<ExecutionResult> {
        if !self.log.exists() {
            info!("No history at {}", self.log.path().display());
            return Vec::new();
        }

        let entries = self.log.last_moves(count);
        if entries.is_empty() {
            info!("No successful moves found in history");
            return Vec::new();
        }

        let total = entries.len();
        info!(
            "Rolling back {} operations (dry_run={})",
            total, self.dry_run
        );

        let mut results = Vec::with_capacity(total);
        for (i, entry) in entries.iter().enumerate() {
            let result = self.rollback_entry(entry);
            let failed = !result.success;
            results.push(result);
            if failed {
                error!("Aborting rollback after {}/{} operations", i, total);
                break;
            }
        }

        if !self.dry_run {
            let done: Vec<AuditEntry> = results
                .iter()
                .filter(|r| r.success)
                .map(|r| r.to_entry_as(AuditAction::Rollback))
                .collect();
            if let Err(e) = self.log.append(&done) {
                error!("Failed to save rollback history: {}", e);
            }
        }

        results
    }

    fn rollback_entry(&self, entry: &AuditEntry) -> ExecutionResult {
        let original_target = entry.target.clone().unwrap_or_default();
        // Reverse roles: the recorded target is now the source.
        let proposal = Proposal::move_to(
            original_target.clone(),
            entry.source.clone(),
            format!("Rollback of {} -> {}", entry.source, original_target),
            RiskLevel::High,
            Details::new(),
        );

        if original_target.is_empty() {
            let message = format!(
                "Rollback validation failed: history entry for {} has no target",
                entry.source
            );
            error!("{}", message);
            return ExecutionResult::new(proposal, false, message);
        }

        let from = self.root.join(&original_target);
        let to = self.root.join(&entry.source);

        if !from.exists() {
            let message = format!(
                "Rollback validation failed: Moved file does not exist: {}",
                from.display()
            );
            error!("{}", message);
            return ExecutionResult::new(proposal, false, message);
        }
        if to.exists() {
            let message = format!(
                "Rollback validation failed: Original location already exists (conflict): {}",
                to.display()
            );
            error!("{}", message);
            return ExecutionResult::new(proposal, false, message);
        }

        if self.dry_run {
            let message = format!(
                "[DRY-RUN] Would rollback {} -> {}",
                original_target, entry.source
            );
            info!("{}", message);
            return ExecutionResult::new(proposal, true, message);
        }

        match move_file(&from, &to) {
            Ok(()) => {
                let message = format!("Rolled back {} -> {}", original_target, entry.source);
                info!("{}", message);
                ExecutionResult::new(proposal, true, message)
            }
            Err(e) => {
                let message = format!("Rollback failed: {e}");
                error!("{}", message);
                ExecutionResult::new(proposal, false, message)
            }
        }
    }
}

/// Rename, creating the destination's parents. Only a cross-device rename
/// falls back to copy and remove; every other error is returned as is.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
            info!("Created directory: {}", parent.display());
        }
    }
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!("Rename crosses devices, copying {}", from.display());
            copy_then_remove(from, to, |path| fs::remove_file(path))
        }
        Err(e) => Err(e),
    }
}

/// Copy `from` to `to`, then remove `from`. If the source cannot be removed
/// the copy is deleted again, so the file is left at exactly one path.
fn copy_then_remove<F>(from: &Path, to: &Path, remove_source: F) -> io::Result<()>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    fs::copy(from, to)?;
    if let Err(e) = remove_source(from) {
        if let Err(cleanup) = fs::remove_file(to) {
            error!("Failed to remove copy {}: {}", to.display(), cleanup);
        }
        return Err(e);
    }
    Ok(())
}
