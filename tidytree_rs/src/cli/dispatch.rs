//! Command handlers.
//!
//! Each handler resolves the repository root, runs the library pipeline and
//! prints results. Fatal problems come back as `anyhow` errors; the binary
//! turns them into exit code 1.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::debug;

use crate::analyzer::{ScanOptions, ScanSummary, scan_repository};
use crate::confidence::{ConfidenceInputs, ConfidenceScore, score_confidence};
use crate::config::TidyConfig;
use crate::detect::detect_repo_type;
use crate::error::ensure_root;
use crate::executor::Executor;
use crate::git::{GitAdvisor, GitWarning, render_git_warnings};
use crate::impact::{ImportAnalyzer, ImportWarning, render_import_warnings};
use crate::progress::{self, Spinner, format_count, format_duration};
use crate::refactor_plan::output::render_proposal;
use crate::refactor_plan::{ProposalEngine, RefactorPlan, render_plan_text};
use crate::types::{FileRecord, OutputFormat};

use super::command::{
    AnalyzeOptions, ApplyOptions, Cli, Command, ProposeOptions, RollbackOptions,
};
use super::prompt::{self, Approval};
use super::report::{Preview, ProposeReport};

pub fn dispatch(cli: &Cli) -> Result<ExitCode> {
    match &cli.command {
        Command::Analyze(opts) => handle_analyze(opts),
        Command::Propose(opts) => handle_propose(opts),
        Command::Apply(opts) => handle_apply(opts),
        Command::Rollback(opts) => handle_rollback(opts),
    }
}

// ============================================================================
// Shared pipeline
// ============================================================================

struct Analysis {
    root: PathBuf,
    config: TidyConfig,
    records: Vec<FileRecord>,
}

fn resolve_root(repo: &Path) -> Result<PathBuf> {
    ensure_root(repo)?;
    repo.canonicalize()
        .with_context(|| format!("cannot resolve repository path {}", repo.display()))
}

fn scan(repo: &Path, show_progress: bool) -> Result<Analysis> {
    let root = resolve_root(repo)?;
    let config = TidyConfig::load(&root);

    let spinner = show_progress.then(|| Spinner::new(&format!("Scanning {}", root.display())));
    let started = Instant::now();
    let records = match scan_repository(&root, &ScanOptions::from_config(&config)) {
        Ok(records) => records,
        Err(e) => {
            if let Some(spinner) = &spinner {
                spinner.finish_error("Scan failed");
            }
            return Err(e).with_context(|| format!("failed to scan {}", root.display()));
        }
    };
    if let Some(spinner) = &spinner {
        spinner.finish_success(&format!(
            "Scanned {} in {}",
            format_count(records.len(), "file", "files"),
            format_duration(started.elapsed())
        ));
    }

    Ok(Analysis {
        root,
        config,
        records,
    })
}

struct Advisories {
    confidence: ConfidenceScore,
    import_warnings: Vec<ImportWarning>,
    git_warnings: Vec<GitWarning>,
}

fn advise(analysis: &Analysis, plan: &RefactorPlan, dry_run: bool, use_git: bool) -> Advisories {
    let import_warnings = ImportAnalyzer::new(&analysis.root).analyze(&plan.proposals);
    let git_warnings = if use_git {
        let timeout = Duration::from_secs(analysis.config.git.timeout_secs);
        GitAdvisor::new(&analysis.root, timeout).analyze(&plan.proposals)
    } else {
        Vec::new()
    };
    let inputs = ConfidenceInputs {
        repo_type: Some(plan.repo_type()),
        has_tests: analysis.records.iter().any(|r| r.has_tests),
        import_warnings: import_warnings.len(),
        dry_run,
    };
    Advisories {
        confidence: score_confidence(&plan.proposals, &inputs),
        import_warnings,
        git_warnings,
    }
}

// ============================================================================
// Handlers
// ============================================================================

fn handle_analyze(opts: &AnalyzeOptions) -> Result<ExitCode> {
    let analysis = scan(&opts.repo, true)?;
    let detection = detect_repo_type(&analysis.records);

    println!("Repository: {}", analysis.root.display());
    println!(
        "Repository type: {} ({:.1}% Python)",
        detection.repo_type.display_name(),
        detection.python_percentage
    );
    println!();
    print!("{}", ScanSummary::from_records(&analysis.records).render());
    Ok(ExitCode::SUCCESS)
}

fn handle_propose(opts: &ProposeOptions) -> Result<ExitCode> {
    let json = opts.format == OutputFormat::Json;
    let analysis = scan(&opts.repo, !json)?;
    let plan = ProposalEngine::from_config(&analysis.config).generate(&analysis.records);
    let advisories = advise(&analysis, &plan, true, !opts.no_git);

    let report = ProposeReport {
        plan: &plan,
        confidence: advisories.confidence,
        import_warnings: advisories.import_warnings,
        git_warnings: advisories.git_warnings,
        preview: opts
            .preview
            .then(|| Preview::new(&plan, analysis.config.preview.max_files)),
    };

    let rendered = if json {
        serde_json::to_string_pretty(&report.to_json())?
    } else {
        report.render_text()
    };

    match &opts.output {
        Some(path) => {
            fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            if !json {
                progress::success(&format!("Proposals written to {}", path.display()));
            }
        }
        None => println!("{rendered}"),
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_apply(opts: &ApplyOptions) -> Result<ExitCode> {
    let dry_run = !opts.execute;
    let analysis = scan(&opts.repo, true)?;
    let plan = ProposalEngine::from_config(&analysis.config).generate(&analysis.records);
    let advisories = advise(&analysis, &plan, dry_run, !opts.no_git);

    println!("{}", render_plan_text(&plan));
    println!();
    println!("{}", advisories.confidence.render());
    for block in [
        render_import_warnings(&advisories.import_warnings),
        render_git_warnings(&advisories.git_warnings),
    ] {
        if !block.is_empty() {
            println!();
            println!("{block}");
        }
    }
    println!();

    let moves: Vec<_> = plan.moves().collect();
    if moves.is_empty() {
        progress::info("No move proposals; nothing to apply.");
        return Ok(ExitCode::SUCCESS);
    }
    if dry_run {
        progress::info("Dry run: no files will be moved (pass --execute to apply).");
    }

    let mut executor = Executor::new(&analysis.root, dry_run)?;
    let mut input = io::stdin().lock();
    let mut output = io::stdout();
    let mut approve_all = opts.yes;

    for (i, proposal) in moves.iter().enumerate() {
        if !approve_all {
            println!();
            println!("[{}/{}] {}", i + 1, moves.len(), render_proposal(proposal));
            match prompt::ask(&mut input, &mut output, "Apply this move?")? {
                Approval::Yes => {}
                Approval::No => {
                    debug!("Declined {}", proposal.source());
                    continue;
                }
                Approval::All => approve_all = true,
                Approval::Quit => {
                    progress::info("Stopped; remaining proposals left untouched.");
                    break;
                }
            }
        }

        let result = executor.apply(proposal);
        if result.success {
            progress::success(&result.message);
        } else {
            progress::error(&result.message);
        }
    }

    let summary = executor.summary();
    println!();
    println!("{}", summary.render());

    if !dry_run && summary.total > 0 {
        match executor.save_history() {
            Ok(()) => progress::info(&format!(
                "History saved to {}",
                executor.history().path().display()
            )),
            Err(e) => progress::warning(&format!(
                "Moves were applied but history could not be saved: {e}"
            )),
        }
    }

    Ok(if summary.failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn handle_rollback(opts: &RollbackOptions) -> Result<ExitCode> {
    let root = resolve_root(&opts.repo)?;
    let dry_run = !opts.execute;
    let mut executor = Executor::new(&root, dry_run)?;

    if !executor.history().exists() {
        progress::info(&format!(
            "No history found at {}",
            executor.history().path().display()
        ));
        return Ok(ExitCode::SUCCESS);
    }

    let results = executor.rollback(opts.count);
    if results.is_empty() {
        progress::info("No successful moves to roll back.");
        return Ok(ExitCode::SUCCESS);
    }

    for result in &results {
        if result.success {
            progress::success(&result.message);
        } else {
            progress::error(&result.message);
        }
    }

    let done = results.iter().filter(|r| r.success).count();
    if results.last().is_some_and(|r| !r.success) {
        progress::error(&format!(
            "Rollback aborted after {} of {} requested",
            format_count(done, "move", "moves"),
            opts.count
        ));
        return Ok(ExitCode::FAILURE);
    }

    let verb = if dry_run { "Would roll back" } else { "Rolled back" };
    progress::success(&format!(
        "{} {}",
        verb,
        format_count(done, "move", "moves")
    ));
    if dry_run {
        progress::info("Dry run: pass --execute to restore files.");
    }
    Ok(ExitCode::SUCCESS)
}
