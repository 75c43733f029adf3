//! End-to-End CLI Tests for tidytree
//!
//! Each test builds a throwaway repository on disk and drives the binary.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const HISTORY_FILE: &str = ".tidytree-history.json";

/// Get a command pointing to the tidytree binary
fn tidytree() -> Command {
    let mut cmd = cargo_bin_cmd!("tidytree");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, content).expect("write file");
}

/// setup.py + requirements.txt + a root-level api.py module.
fn python_repo() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "setup.py", "from setuptools import setup\nsetup()\n");
    write(dir.path(), "requirements.txt", "fastapi\npydantic\n");
    write(
        dir.path(),
        "api.py",
        "import fastapi\nfrom pydantic import BaseModel\n\napp = fastapi.FastAPI()\n",
    );
    dir
}

fn angular_repo() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    write(dir.path(), "package.json", "{}");
    write(dir.path(), "angular.json", "{}");
    write(dir.path(), "tsconfig.json", "{}");
    for i in 0..20 {
        write(
            dir.path(),
            &format!("src/app/component{i}.ts"),
            "export class C {}\n",
        );
    }
    dir
}

fn propose_json(root: &Path) -> serde_json::Value {
    let output = tidytree()
        .args(["propose", "--format", "json", "--no-git"])
        .arg(root)
        .output()
        .expect("run tidytree");
    assert!(output.status.success(), "propose failed: {:?}", output);
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

// ============================================
// Basic CLI Tests
// ============================================

mod cli_basics {
    use super::*;

    #[test]
    fn shows_help() {
        tidytree()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("propose"))
            .stdout(predicate::str::contains("rollback"));
    }

    #[test]
    fn shows_version() {
        tidytree()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn missing_repo_fails_cleanly() {
        let dir = TempDir::new().expect("temp dir");
        tidytree()
            .arg("analyze")
            .arg(dir.path().join("does-not-exist"))
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("error: repository root does not exist"));
    }

    #[test]
    fn file_as_repo_fails_cleanly() {
        let dir = TempDir::new().expect("temp dir");
        write(dir.path(), "file.txt", "x");
        tidytree()
            .arg("propose")
            .arg(dir.path().join("file.txt"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("not a directory"));
    }
}

// ============================================
// Analyze
// ============================================

mod analyze {
    use super::*;

    #[test]
    fn prints_statistics() {
        let repo = python_repo();
        tidytree()
            .arg("analyze")
            .arg(repo.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Total files:      3"))
            .stdout(predicate::str::contains("Python files:     2"))
            .stdout(predicate::str::contains("Python-dominant"));
    }

    #[test]
    fn skips_noise_directories() {
        let repo = python_repo();
        write(repo.path(), "node_modules/pkg/index.js", "");
        write(repo.path(), "__pycache__/api.cpython-312.pyc", "");
        write(repo.path(), ".venv/lib/site.py", "");
        tidytree()
            .arg("analyze")
            .arg(repo.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Total files:      3"));
    }
}

// ============================================
// Propose
// ============================================

mod propose {
    use super::*;

    #[test]
    fn python_repo_moves_api_to_src() {
        let repo = python_repo();
        let json = propose_json(repo.path());
        assert_eq!(json["repo_type"], "python_dominant");
        let proposals = json["proposals"].as_array().expect("proposals array");
        let api = proposals
            .iter()
            .find(|p| p["source"] == "api.py")
            .expect("api.py proposal");
        assert_eq!(api["action"], "move");
        assert_eq!(api["target"], "src/api.py");
        assert!(api["reason"].as_str().unwrap().contains("imports"));
        assert!(json["confidence"]["verdict"].is_string());
        assert_eq!(json["total_proposals"], proposals.len());
    }

    #[test]
    fn non_python_repo_has_no_moves() {
        let repo = angular_repo();
        let json = propose_json(repo.path());
        assert_eq!(json["repo_type"], "non_python");
        let moves = json["proposals"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|p| p["action"] == "move")
            .count();
        assert_eq!(moves, 0);
    }

    #[test]
    fn flags_never_carry_targets() {
        let repo = python_repo();
        write(repo.path(), "backup/app.py", "x = 1\n");
        write(repo.path(), "app.py", "x = 2\n");
        let json = propose_json(repo.path());
        for p in json["proposals"].as_array().unwrap() {
            if p["action"] == "move" {
                assert!(p["target"].is_string());
            } else {
                assert!(p["target"].is_null());
            }
        }
        let duplicate = json["proposals"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| {
                p["reason"]
                    .as_str()
                    .is_some_and(|r| r.contains("Duplicate filename: 2 files named 'app.py'"))
            });
        assert!(duplicate.is_some());
    }

    #[test]
    fn text_report_with_preview() {
        let repo = python_repo();
        tidytree()
            .args(["propose", "--preview", "--no-git", "--no-color"])
            .arg(repo.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("MOVE: api.py"))
            .stdout(predicate::str::contains("DIRECTORY STRUCTURE PREVIEW"))
            .stdout(predicate::str::contains("IMPACT SUMMARY"))
            .stdout(predicate::str::contains("REORGANIZATION CONFIDENCE"));
    }

    #[test]
    fn writes_output_file() {
        let repo = python_repo();
        let out_dir = TempDir::new().expect("temp dir");
        let out = out_dir.path().join("plan.json");
        tidytree()
            .args(["propose", "--format", "json", "--no-git", "--output"])
            .arg(&out)
            .arg(repo.path())
            .assert()
            .success();
        let content = fs::read_to_string(&out).expect("report written");
        let json: serde_json::Value = serde_json::from_str(&content).expect("valid JSON");
        assert!(json["proposals"].is_array());
    }

    #[test]
    fn propose_never_modifies_repo() {
        let repo = python_repo();
        propose_json(repo.path());
        assert!(repo.path().join("api.py").exists());
        assert!(!repo.path().join("src").exists());
        assert!(!repo.path().join(HISTORY_FILE).exists());
    }
}

// ============================================
// Apply and rollback
// ============================================

mod apply_rollback {
    use super::*;

    #[test]
    fn dry_run_apply_changes_nothing() {
        let repo = python_repo();
        tidytree()
            .args(["apply", "--yes", "--no-git"])
            .arg(repo.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("[DRY-RUN] Would move api.py -> src/api.py"));
        assert!(repo.path().join("api.py").exists());
        assert!(!repo.path().join("src").exists());
        assert!(!repo.path().join(HISTORY_FILE).exists());
    }

    #[test]
    fn declining_every_prompt_moves_nothing() {
        let repo = python_repo();
        tidytree()
            .args(["apply", "--execute", "--no-git"])
            .arg(repo.path())
            .write_stdin("n\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Apply this move?"));
        assert!(repo.path().join("api.py").exists());
    }

    #[test]
    fn quit_stops_before_applying() {
        let repo = python_repo();
        tidytree()
            .args(["apply", "--execute", "--no-git"])
            .arg(repo.path())
            .write_stdin("q\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Stopped"));
        assert!(repo.path().join("api.py").exists());
    }

    #[test]
    fn execute_then_rollback_round_trip() {
        let repo = python_repo();
        let root = repo.path();

        tidytree()
            .args(["apply", "--execute", "--no-git"])
            .arg(root)
            .write_stdin("y\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Moved api.py -> src/api.py"));
        assert!(!root.join("api.py").exists());
        assert!(root.join("src/api.py").exists());

        let history: Vec<serde_json::Value> =
            serde_json::from_str(&fs::read_to_string(root.join(HISTORY_FILE)).unwrap()).unwrap();
        let before = history.len();

        // Dry-run rollback leaves everything alone.
        tidytree()
            .arg("rollback")
            .arg(root)
            .assert()
            .success()
            .stdout(predicate::str::contains("[DRY-RUN] Would rollback src/api.py -> api.py"));
        assert!(root.join("src/api.py").exists());

        tidytree()
            .args(["rollback", "--execute", "--count", "1"])
            .arg(root)
            .assert()
            .success()
            .stdout(predicate::str::contains("Rolled back src/api.py -> api.py"));
        assert!(root.join("api.py").exists());
        assert!(!root.join("src/api.py").exists());

        let history: Vec<serde_json::Value> =
            serde_json::from_str(&fs::read_to_string(root.join(HISTORY_FILE)).unwrap()).unwrap();
        assert_eq!(history.len(), before + 1);
        assert_eq!(history.last().unwrap()["action"], "rollback");
    }

    #[test]
    fn rollback_conflict_aborts_with_failure() {
        let repo = python_repo();
        let root = repo.path();
        tidytree()
            .args(["apply", "--execute", "--yes", "--no-git"])
            .arg(root)
            .assert()
            .success();
        write(root, "api.py", "# recreated\n");

        tidytree()
            .args(["rollback", "--execute"])
            .arg(root)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Rollback validation failed"))
            .stderr(predicate::str::contains("Rollback aborted"));
        assert!(root.join("src/api.py").exists());
    }

    #[test]
    fn rollback_without_history() {
        let repo = python_repo();
        tidytree()
            .arg("rollback")
            .arg(repo.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("No history found"));
    }
}
