//! Read-only git awareness.
//!
//! Shells out to the `git` executable with a bounded wait. Every failure
//! (tool missing, timeout, non-zero exit) degrades to "nothing to report";
//! this module never changes repository state.

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use crate::proposal::Proposal;

/// How many example paths a warning carries.
pub const WARNING_EXAMPLES: usize = 5;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GitWarningKind {
    Uncommitted,
    TrackedFiles,
}

/// Advisory produced before a reorganization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitWarning {
    pub kind: GitWarningKind,
    pub message: String,
    /// First few affected paths.
    pub details: Vec<String>,
    /// Number of affected paths before truncation.
    pub total: usize,
}

impl GitWarning {
    fn new(kind: GitWarningKind, message: String, paths: Vec<String>) -> Self {
        let total = paths.len();
        let details = paths.into_iter().take(WARNING_EXAMPLES).collect();
        Self {
            kind,
            message,
            details,
            total,
        }
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.details.len())
    }
}

/// Cached, read-only view of the repository's git state.
pub struct GitAdvisor {
    root: PathBuf,
    timeout: Duration,
    is_repo: OnceCell<bool>,
    uncommitted: OnceCell<Vec<String>>,
    tracked: RefCell<HashMap<String, bool>>,
}

impl GitAdvisor {
    pub fn new(root: &Path, timeout: Duration) -> Self {
        Self {
            root: root.to_path_buf(),
            timeout,
            is_repo: OnceCell::new(),
            uncommitted: OnceCell::new(),
            tracked: RefCell::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_repository(&self) -> bool {
        *self.is_repo.get_or_init(|| {
            match run_git(&self.root, &["rev-parse", "--is-inside-work-tree"], self.timeout) {
                Some(out) => out.trim() == "true",
                None => false,
            }
        })
    }

    /// Paths with staged, unstaged or untracked changes.
    pub fn uncommitted_files(&self) -> &[String] {
        self.uncommitted.get_or_init(|| {
            if !self.is_repository() {
                return Vec::new();
            }
            // Porcelain paths are relative to the top level even when the
            // scanned root is a subdirectory of the work tree.
            let prefix = run_git(&self.root, &["rev-parse", "--show-prefix"], self.timeout)
                .map(|out| out.trim().to_string())
                .unwrap_or_default();
            match run_git(&self.root, &["status", "--porcelain", "--", "."], self.timeout) {
                Some(out) => strip_prefix(parse_porcelain(&out), &prefix),
                None => Vec::new(),
            }
        })
    }

    pub fn is_tracked(&self, relative: &str) -> bool {
        if !self.is_repository() {
            return false;
        }
        if let Some(&cached) = self.tracked.borrow().get(relative) {
            return cached;
        }
        let tracked = run_git(&self.root, &["ls-files", "--", relative], self.timeout)
            .map(|out| !out.trim().is_empty())
            .unwrap_or(false);
        self.tracked
            .borrow_mut()
            .insert(relative.to_string(), tracked);
        tracked
    }

    /// Warnings for the given proposal set. Empty outside a git repository.
    pub fn analyze(&self, proposals: &[Proposal]) -> Vec<GitWarning> {
        if !self.is_repository() {
            return Vec::new();
        }

        let mut warnings = Vec::new();

        let uncommitted = self.uncommitted_files();
        if !uncommitted.is_empty() {
            warnings.push(GitWarning::new(
                GitWarningKind::Uncommitted,
                "Uncommitted changes detected".to_string(),
                uncommitted.to_vec(),
            ));
        }

        let tracked_moves: Vec<String> = proposals
            .iter()
            .filter_map(Proposal::as_move)
            .filter(|m| self.is_tracked(&m.source))
            .map(|m| m.source.clone())
            .collect();
        if !tracked_moves.is_empty() {
            warnings.push(GitWarning::new(
                GitWarningKind::TrackedFiles,
                format!("{} files to move are Git-tracked", tracked_moves.len()),
                tracked_moves,
            ));
        }

        warnings
    }
}

/// Text block for the report. Empty when there is nothing to say.
pub fn render_git_warnings(warnings: &[GitWarning]) -> String {
    if warnings.is_empty() {
        return String::new();
    }

    let rule = "=".repeat(60);
    let mut lines = vec![rule.clone(), "GIT AWARENESS (read-only)".to_string(), rule.clone()];
    lines.push(String::new());
    for warning in warnings {
        lines.push(format!("! {}", warning.message));
        for detail in &warning.details {
            lines.push(format!("    - {}", detail));
        }
        if warning.remaining() > 0 {
            lines.push(format!("    ... and {} more", warning.remaining()));
        }
        lines.push(String::new());
    }
    lines.push("Recommendation: run `git status` and commit changes before".to_string());
    lines.push("  applying the reorganization. tidytree never runs `git mv`.".to_string());
    lines.push(rule);
    lines.join("\n")
}

/// Run `git` in `dir`, returning stdout on a zero exit within `timeout`.
fn run_git(dir: &Path, args: &[&str], timeout: Duration) -> Option<String> {
    let mut child = match Command::new("git")
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            debug!("git {:?} could not start: {}", args, e);
            return None;
        }
    };

    // Drain stdout on a thread so a full pipe cannot stall the child.
    let mut stdout = child.stdout.take()?;
    let reader = thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stdout.read_to_end(&mut buf);
        buf
    });

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if start.elapsed() >= timeout => {
                warn!("git {:?} timed out after {:?}", args, timeout);
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                debug!("git {:?} wait failed: {}", args, e);
                return None;
            }
        }
    };

    let output = reader.join().ok()?;
    if !status.success() {
        debug!("git {:?} exited with {}", args, status);
        return None;
    }
    Some(String::from_utf8_lossy(&output).into_owned())
}

/// Paths from `git status --porcelain` (v1) output.
fn parse_porcelain(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.len() >= 4 && !line[..2].trim().is_empty())
        .map(|line| {
            let path = line[3..].trim();
            // Renames: "old -> new"
            let path = path.rsplit(" -> ").next().unwrap_or(path);
            path.trim_matches('"').to_string()
        })
        .collect()
}

/// Re-base top-level paths onto the scanned root (`prefix` ends in `/`).
fn strip_prefix(paths: Vec<String>, prefix: &str) -> Vec<String> {
    if prefix.is_empty() {
        return paths;
    }
    paths
        .into_iter()
        .filter_map(|path| path.strip_prefix(prefix).map(str::to_string))
        .collect()
}
