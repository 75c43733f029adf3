//! Placement checks, target paths and move risk.

use crate::classify::Category;
use crate::proposal::RiskLevel;
use crate::types::FileRecord;

/// Configuration files that belong at the repository root.
pub const ROOT_CONFIG_NAMES: &[&str] = &[
    "setup.py",
    "setup.cfg",
    "pyproject.toml",
    "requirements.txt",
    ".gitignore",
];

/// Whether the first directory already matches the category's home.
pub fn is_correctly_placed(record: &FileRecord, category: Category) -> bool {
    let Some(first) = record.first_dir() else {
        return false;
    };
    match category {
        Category::Source => first == "src",
        Category::Tests => matches!(first, "tests" | "test"),
        Category::Configuration => matches!(first, "configs" | "config"),
        Category::Scripts => first == "scripts",
        Category::Docs => first == "docs",
        Category::Markdown => matches!(first, "docs" | "markdown"),
        Category::Data => first == "data",
        Category::Experiments => matches!(first, "experiments" | "playground"),
        Category::Unclassified => false,
    }
}

pub fn is_readme(name: &str) -> bool {
    name.eq_ignore_ascii_case("readme.md")
}

fn follows_test_naming(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.starts_with("test_") || lower.ends_with("_test.py")
}

/// Where a file of `category` should live; `None` for files that are only
/// ever flagged.
pub fn target_path_for(record: &FileRecord, category: Category) -> Option<String> {
    let name = record.name.as_str();
    let target = match category {
        Category::Source => format!("src/{}", record.relative_path),
        Category::Tests => {
            let new_name = if follows_test_naming(name) {
                name.to_string()
            } else {
                format!("test_{}", name)
            };
            if record.is_root_level() {
                format!("tests/{}", new_name)
            } else {
                format!("tests/{}/{}", record.parent_dir(), new_name)
            }
        }
        Category::Configuration => {
            if ROOT_CONFIG_NAMES.contains(&name) {
                name.to_string()
            } else {
                format!("configs/{}", name)
            }
        }
        Category::Scripts => format!("scripts/{}", name),
        Category::Docs => format!("docs/{}", name),
        Category::Markdown => {
            if is_readme(name) && record.is_root_level() {
                "README.md".to_string()
            } else {
                format!("docs/{}", name)
            }
        }
        Category::Data => format!("data/{}", name),
        Category::Experiments => format!("experiments/{}", name),
        Category::Unclassified => return None,
    };
    Some(target)
}

pub fn assess_risk(record: &FileRecord, category: Category) -> RiskLevel {
    if record.imports.len() > 10 {
        RiskLevel::High
    } else if record.is_executable || category == Category::Configuration {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
