//! Append-only audit log of executed operations.
//!
//! The log is a pretty-printed JSON array at `<root>/.tidytree-history.json`.
//! Every write is read-entire-file, append, write-entire-file. A missing log
//! is an empty history; a malformed one is logged and treated as empty.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::{Result, TidyError};
use crate::proposal::{ActionKind, RiskLevel};

/// Conventional hidden filename at the repository root.
pub const HISTORY_FILE: &str = ".tidytree-history.json";

/// Action recorded in an audit entry. Read case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditAction {
    Move,
    Flag,
    Delete,
    Rollback,
    Other(String),
}

impl AuditAction {
    pub fn as_str(&self) -> &str {
        match self {
            AuditAction::Move => "move",
            AuditAction::Flag => "flag",
            AuditAction::Delete => "delete",
            AuditAction::Rollback => "rollback",
            AuditAction::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "move" => AuditAction::Move,
            "flag" => AuditAction::Flag,
            "delete" => AuditAction::Delete,
            "rollback" => AuditAction::Rollback,
            _ => AuditAction::Other(s.to_string()),
        }
    }
}

impl From<ActionKind> for AuditAction {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Move => AuditAction::Move,
            ActionKind::Flag => AuditAction::Flag,
            ActionKind::Delete => AuditAction::Delete,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AuditAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AuditAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(AuditAction::parse(&s))
    }
}

fn risk_from_str<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<RiskLevel, D::Error> {
    let s = String::deserialize(deserializer)?;
    RiskLevel::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("unknown risk '{s}'")))
}

/// One persisted execution outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// ISO-8601 local time.
    pub timestamp: String,
    pub action: AuditAction,
    pub source: String,
    #[serde(default)]
    pub target: Option<String>,
    pub success: bool,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub message: String,
    #[serde(deserialize_with = "risk_from_str")]
    pub risk: RiskLevel,
}

impl AuditEntry {
    /// Successful, non-skipped move that rollback may reverse.
    pub fn is_reversible_move(&self) -> bool {
        self.action == AuditAction::Move && self.success && !self.skipped
    }
}

/// Handle on the audit log of one repository.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn for_root(root: &Path) -> Self {
        Self {
            path: root.join(HISTORY_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// All entries; empty when the log is absent or unreadable.
    pub fn load(&self) -> Vec<AuditEntry> {
        match self.read() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring unreadable history {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Strict read. A missing file is still an empty history.
    pub fn read(&self) -> Result<Vec<AuditEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content)
            .map_err(|e| TidyError::History(format!("{}: {}", self.path.display(), e)))
    }

    /// Append entries, preserving whatever history is already on disk.
    /// An unreadable log counts as no prior history.
    pub fn append(&self, entries: &[AuditEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut history = self.load();
        history.extend_from_slice(entries);
        let json = serde_json::to_string_pretty(&history)?;
        fs::write(&self.path, json)
            .map_err(|e| TidyError::History(format!("{}: {}", self.path.display(), e)))?;
        debug!(
            "Appended {} entries to {} ({} total)",
            entries.len(),
            self.path.display(),
            history.len()
        );
        Ok(())
    }

    /// The last `count` reversible moves, most recent first.
    ///
    /// `rollback` entries are not matched against the moves they undid, so a
    /// move that was already rolled back is still a candidate. Rolling it back
    /// a second time fails validation because the moved file is gone.
    pub fn last_moves(&self, count: usize) -> Vec<AuditEntry> {
        let moves: Vec<AuditEntry> = self
            .load()
            .into_iter()
            .filter(AuditEntry::is_reversible_move)
            .collect();
        let start = moves.len().saturating_sub(count);
        moves.into_iter().skip(start).rev().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(action: AuditAction, source: &str, success: bool) -> AuditEntry {
        AuditEntry {
            timestamp: "2025-01-01T00:00:00".to_string(),
            action,
            source: source.to_string(),
            target: Some(format!("src/{source}")),
            success,
            skipped: false,
            message: String::new(),
            risk: RiskLevel::Low,
        }
    }

    #[test]
    fn test_missing_log_is_empty() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::for_root(dir.path());
        assert!(!log.exists());
        assert!(log.load().is_empty());
        assert!(log.read().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_log_is_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(HISTORY_FILE), "{ not json").unwrap();
        let log = AuditLog::for_root(dir.path());
        assert!(log.load().is_empty());
        assert!(matches!(log.read(), Err(TidyError::History(_))));
    }

    #[test]
    fn test_append_replaces_malformed_log() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(HISTORY_FILE), "{ not json").unwrap();
        let log = AuditLog::for_root(dir.path());
        log.append(&[entry(AuditAction::Move, "a.py", true)]).unwrap();
        let entries = log.read().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source, "a.py");
    }

    #[test]
    fn test_append_preserves_existing() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::for_root(dir.path());
        log.append(&[entry(AuditAction::Move, "a.py", true)]).unwrap();
        log.append(&[entry(AuditAction::Move, "b.py", true)]).unwrap();
        let entries = log.load();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].source, "a.py");
        assert_eq!(entries[1].source, "b.py");
    }

    #[test]
    fn test_reads_uppercase_actions_and_missing_skipped() {
        let dir = TempDir::new().unwrap();
        let raw = r#"[
            {"timestamp": "t", "action": "MOVE", "source": "a.py", "target": "src/a.py",
             "success": true, "message": "ok", "risk": "LOW"},
            {"timestamp": "t", "action": "ROLLBACK", "source": "src/a.py", "target": "a.py",
             "success": true, "skipped": false, "message": "ok", "risk": "high"}
        ]"#;
        fs::write(dir.path().join(HISTORY_FILE), raw).unwrap();
        let entries = AuditLog::for_root(dir.path()).load();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, AuditAction::Move);
        assert!(!entries[0].skipped);
        assert_eq!(entries[0].risk, RiskLevel::Low);
        assert_eq!(entries[1].action, AuditAction::Rollback);
    }

    #[test]
    fn test_last_moves_filters_and_reverses() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::for_root(dir.path());
        let mut skipped = entry(AuditAction::Move, "skipped.py", true);
        skipped.skipped = true;
        log.append(&[
            entry(AuditAction::Move, "first.py", true),
            entry(AuditAction::Move, "failed.py", false),
            entry(AuditAction::Flag, "flag.py", true),
            skipped,
            entry(AuditAction::Move, "second.py", true),
            entry(AuditAction::Rollback, "x.py", true),
            entry(AuditAction::Move, "third.py", true),
        ])
        .unwrap();

        let sources: Vec<String> = log.last_moves(2).into_iter().map(|e| e.source).collect();
        assert_eq!(sources, vec!["third.py", "second.py"]);

        let all: Vec<String> = log.last_moves(10).into_iter().map(|e| e.source).collect();
        assert_eq!(all, vec!["third.py", "second.py", "first.py"]);
    }

    #[test]
    fn test_rolled_back_move_is_still_a_candidate() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::for_root(dir.path());
        log.append(&[
            entry(AuditAction::Move, "a.py", true),
            entry(AuditAction::Rollback, "src/a.py", true),
        ])
        .unwrap();
        let moves = log.last_moves(1);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].source, "a.py");
    }

    #[test]
    fn test_serialized_action_is_lowercase() {
        let json = serde_json::to_string(&entry(AuditAction::Rollback, "a.py", true)).unwrap();
        assert!(json.contains("\"action\":\"rollback\""));
        assert!(json.contains("\"risk\":\"low\""));
    }
}
