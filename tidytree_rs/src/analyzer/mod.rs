//! Repository discovery: walks the tree, drops noise, builds file records.

pub mod py;
mod regexes;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::{CONFIG_DIR, TidyConfig};
use crate::error::{Result, ensure_root};
use crate::history::HISTORY_FILE;
use crate::types::{FileRecord, SOURCE_EXTENSION};

use py::analyze_py_source;

/// Directory names never descended into.
const IGNORE_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".tox",
    ".eggs",
    "env",
    "ENV",
    "node_modules",
    "site-packages",
    "build",
    "dist",
    ".next",
    "out",
    "_next",
    "coverage",
    ".nuxt",
    ".output",
    ".vercel",
    ".netlify",
    CONFIG_DIR,
];

/// Compiled, binary and editor noise.
const IGNORE_FILE_PATTERNS: &[&str] = &[
    "*.pyc",
    "*.pyo",
    "*.pyd",
    "*.so",
    "*.dll",
    "*.dylib",
    ".DS_Store",
    "Thumbs.db",
    "*.swp",
    "*.swo",
    "*~",
];

/// Python files larger than this are recorded without static analysis.
pub const MAX_ANALYZED_BYTES: u64 = 2 * 1024 * 1024;

const EXECUTABLE_PREFIXES: &[&str] = &["run_", "main_", "cli_"];

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Extra glob patterns for files to skip.
    pub extra_ignore: Vec<String>,
}

impl ScanOptions {
    pub fn from_config(config: &TidyConfig) -> Self {
        Self {
            extra_ignore: config.scan.extra_ignore.clone(),
        }
    }
}

/// Build a globset from patterns, skipping invalid ones.
pub fn build_globset(patterns: &[String]) -> Option<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    let mut added = false;
    for pat in patterns {
        if pat.trim().is_empty() {
            continue;
        }
        match Glob::new(pat) {
            Ok(glob) => {
                builder.add(glob);
                added = true;
            }
            Err(err) => warn!(pattern = %pat, error = %err, "invalid glob"),
        }
    }
    if !added { None } else { builder.build().ok() }
}

fn is_ignored_dir(name: &str) -> bool {
    IGNORE_DIRS.contains(&name) || name.contains("venv") || name.ends_with(".egg-info")
}

fn keep_entry(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    !is_ignored_dir(&entry.file_name().to_string_lossy())
}

/// Walk `root` and return one record per repository file, in discovery order.
pub fn scan_repository(root: &Path, options: &ScanOptions) -> Result<Vec<FileRecord>> {
    ensure_root(root)?;

    let mut patterns: Vec<String> = IGNORE_FILE_PATTERNS.iter().map(|s| s.to_string()).collect();
    patterns.extend(options.extra_ignore.iter().cloned());
    let noise = build_globset(&patterns);

    let mut records = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(keep_entry);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable path");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");
        let name = entry.file_name().to_string_lossy().to_string();

        if relative == HISTORY_FILE {
            continue;
        }
        let is_noise = noise
            .as_ref()
            .is_some_and(|set| set.is_match(&name) || set.is_match(&relative));
        if is_noise {
            continue;
        }

        let size = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(err) => {
                warn!(path = %relative, error = %err, "skipping file without metadata");
                continue;
            }
        };

        records.push(build_record(root, &relative, size));
    }

    debug!(files = records.len(), root = %root.display(), "scan complete");
    Ok(records)
}

fn build_record(root: &Path, relative: &str, size: u64) -> FileRecord {
    let mut record = FileRecord::new(root, relative, size);

    if record.extension == SOURCE_EXTENSION {
        if size > MAX_ANALYZED_BYTES {
            debug!(path = %relative, size, "source file too large, skipping analysis");
        } else {
            match fs::read(&record.path) {
                Ok(bytes) => {
                    let content = String::from_utf8_lossy(&bytes);
                    let facts = analyze_py_source(&content);
                    record.imports = facts.module_names();
                    record.has_main_guard = facts.has_main_guard;
                    record.is_executable = facts.has_main_guard;
                    record.has_tests = facts.has_tests;
                }
                Err(err) => {
                    warn!(path = %relative, error = %err, "could not read source file");
                }
            }
        }

        let lower = record.name.to_lowercase();
        if EXECUTABLE_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            record.is_executable = true;
        }
        if lower.starts_with("test_") || lower.ends_with("_test.py") {
            record.has_tests = true;
        }
    }

    record
}

/// Aggregate counts over a scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSummary {
    pub total_files: usize,
    pub extensions: BTreeMap<String, usize>,
    pub python_files: usize,
    pub executables: usize,
    pub test_files: usize,
}

impl ScanSummary {
    pub fn from_records(records: &[FileRecord]) -> Self {
        let mut summary = Self {
            total_files: records.len(),
            ..Self::default()
        };
        for record in records {
            *summary
                .extensions
                .entry(extension_key(&record.extension))
                .or_insert(0) += 1;
            if record.is_source() {
                summary.python_files += 1;
            }
            if record.is_executable {
                summary.executables += 1;
            }
            if record.has_tests {
                summary.test_files += 1;
            }
        }
        summary
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Total files:      {}\n", self.total_files));
        out.push_str(&format!("Python files:     {}\n", self.python_files));
        out.push_str(&format!("Executable files: {}\n", self.executables));
        out.push_str(&format!("Test files:       {}\n", self.test_files));
        if !self.extensions.is_empty() {
            out.push_str("\nBy extension:\n");
            let mut sorted: Vec<_> = self.extensions.iter().collect();
            sorted.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
            for (ext, count) in sorted {
                out.push_str(&format!("  {:<14} {}\n", ext, count));
            }
        }
        out
    }
}

/// Counting key for an extension; extensionless files share one bucket.
pub fn extension_key(extension: &str) -> String {
    if extension.is_empty() {
        "no_extension".to_string()
    } else {
        format!(".{}", extension)
    }
}
