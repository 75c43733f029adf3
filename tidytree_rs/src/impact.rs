//! Import breakage prediction for pending moves.
//!
//! Answers "which imports stop resolving once these files move" by reading
//! each moving source file's import statements and comparing the importer's
//! directory before and after the move. Static and advisory: nothing is
//! rewritten, and unreadable files simply produce no warnings.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::analyzer::py::{ImportStatement, parse_imports};
use crate::proposal::Proposal;
use crate::types::{SOURCE_EXTENSION, extension_of, parent_of};

/// A predicted import breakage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportWarning {
    /// File containing the import (relative to root)
    pub source_file: String,
    pub import: ImportStatement,
    pub reason: String,
    /// Files on the other side of the broken link
    pub affected_files: Vec<String>,
}

impl ImportWarning {
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("[!] Import Risk in {}:", self.source_file),
            format!("    Line {}: {}", self.import.line, self.import.display()),
            format!("    Risk: {}", self.reason),
        ];
        if !self.affected_files.is_empty() {
            let shown: Vec<&str> = self
                .affected_files
                .iter()
                .take(3)
                .map(String::as_str)
                .collect();
            lines.push(format!("    Affected: {}", shown.join(", ")));
        }
        lines.join("\n")
    }
}

fn dir_display(dir: &str) -> &str {
    if dir.is_empty() { "." } else { dir }
}

fn join_rel(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Walk `levels` directories up from `dir`; `None` when that leaves the root.
fn ascend(dir: &str, levels: usize) -> Option<String> {
    let mut parts: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    for _ in 0..levels {
        parts.pop()?;
    }
    Some(parts.join("/"))
}

/// Predicts broken imports for a proposal set.
pub struct ImportAnalyzer {
    root: PathBuf,
}

impl ImportAnalyzer {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn exists(&self, relative: &str) -> bool {
        self.root.join(relative).is_file()
    }

    /// Import statements of one source file; empty for anything unreadable.
    pub fn extract_imports(&self, relative: &str) -> Vec<ImportStatement> {
        if extension_of(relative) != SOURCE_EXTENSION {
            return Vec::new();
        }
        match fs::read(self.root.join(relative)) {
            Ok(bytes) => parse_imports(&String::from_utf8_lossy(&bytes)),
            Err(err) => {
                debug!(path = %relative, error = %err, "skipping import analysis");
                Vec::new()
            }
        }
    }

    pub fn analyze(&self, proposals: &[Proposal]) -> Vec<ImportWarning> {
        let moves: Vec<(&str, &str)> = proposals
            .iter()
            .filter_map(|p| p.as_move())
            .filter(|m| extension_of(&m.source) == SOURCE_EXTENSION)
            .map(|m| (m.source.as_str(), m.target.as_str()))
            .collect();
        if moves.is_empty() {
            return Vec::new();
        }

        let move_map: HashMap<&str, &str> = proposals
            .iter()
            .filter_map(|p| p.as_move())
            .map(|m| (m.source.as_str(), m.target.as_str()))
            .collect();

        let mut warnings = Vec::new();
        for (source, target) in moves {
            for statement in self.extract_imports(source) {
                if let Some(w) = self.check_import(source, target, &statement, &move_map) {
                    warnings.push(w);
                }
            }
        }
        debug!(warnings = warnings.len(), "import analysis complete");
        warnings
    }

    fn check_import(
        &self,
        source: &str,
        target: &str,
        statement: &ImportStatement,
        move_map: &HashMap<&str, &str>,
    ) -> Option<ImportWarning> {
        let source_dir = parent_of(source);
        let target_dir = parent_of(target);
        if source_dir == target_dir {
            return None;
        }
        if statement.is_relative {
            Some(self.relative_warning(source, source_dir, target_dir, statement, move_map))
        } else {
            self.local_module_warning(source, source_dir, target_dir, statement, move_map)
        }
    }

    fn relative_warning(
        &self,
        source: &str,
        source_dir: &str,
        target_dir: &str,
        statement: &ImportStatement,
        move_map: &HashMap<&str, &str>,
    ) -> ImportWarning {
        let mut affected = Vec::new();
        let first = statement.module.split('.').next().unwrap_or("");
        let base = if first.is_empty() {
            None
        } else {
            ascend(source_dir, statement.level.saturating_sub(1))
        };
        if let Some(base) = base {
            let candidate = join_rel(&base, &format!("{}.py", first));
            if move_map.contains_key(candidate.as_str()) || self.exists(&candidate) {
                affected.push(candidate);
            }
        }
        ImportWarning {
            source_file: source.to_string(),
            import: statement.clone(),
            reason: format!(
                "Relative import will break when moving from {}/ to {}/",
                dir_display(source_dir),
                dir_display(target_dir)
            ),
            affected_files: affected,
        }
    }

    fn local_module_warning(
        &self,
        source: &str,
        source_dir: &str,
        target_dir: &str,
        statement: &ImportStatement,
        move_map: &HashMap<&str, &str>,
    ) -> Option<ImportWarning> {
        let module = statement.module.split('.').next().unwrap_or("");
        if module.is_empty() {
            return None;
        }
        let local = join_rel(source_dir, &format!("{}.py", module));
        if !self.exists(&local) {
            return None;
        }

        let reason = match move_map.get(local.as_str()) {
            Some(moved_to) => {
                let moved_dir = parent_of(moved_to);
                if moved_dir == target_dir {
                    return None;
                }
                format!(
                    "Importing '{}' from same directory, but {}.py is moving to {}/",
                    module,
                    module,
                    dir_display(moved_dir)
                )
            }
            None => format!(
                "Importing '{}' from current directory, but moving away from {}/",
                module,
                dir_display(source_dir)
            ),
        };

        Some(ImportWarning {
            source_file: source.to_string(),
            import: statement.clone(),
            reason,
            affected_files: vec![local],
        })
    }
}

/// Text block for all warnings; empty when there are none.
pub fn render_import_warnings(warnings: &[ImportWarning]) -> String {
    if warnings.is_empty() {
        return String::new();
    }
    let rule = "=".repeat(60);
    let mut lines = vec![
        rule.clone(),
        format!("IMPORT WARNINGS ({})", warnings.len()),
        rule.clone(),
    ];
    for warning in warnings {
        lines.push(String::new());
        lines.push(warning.render());
    }
    lines.push(String::new());
    lines.push("Moves do not rewrite imports; fix these by hand after applying.".to_string());
    lines.push(rule);
    lines.join("\n")
}
