//! Human-readable justification for a proposed move.
//!
//! Every sentence maps to a signal that was actually detected on the record.

use crate::classify::{Category, Classifier};
use crate::types::FileRecord;

use super::targets::is_readme;

const ROOT_LOCATION: &str = "repository root";

const CONFIG_KINDS: &[(&str, &str)] = &[
    (".env", "environment variables"),
    (".yaml", "YAML configuration"),
    (".yml", "YAML configuration"),
    (".toml", "TOML configuration"),
    (".ini", "INI configuration"),
    (".json", "JSON configuration"),
    ("requirements.txt", "Python dependencies"),
    ("Pipfile", "Python dependencies"),
    ("pyproject.toml", "Python project metadata"),
];

const STANDARD_ROOT_CONFIGS: &[&str] =
    &["setup.py", "setup.cfg", "pyproject.toml", "requirements.txt"];

fn data_kind(extension: &str) -> Option<&'static str> {
    match extension {
        "json" => Some("JSON data"),
        "csv" => Some("CSV data"),
        "txt" => Some("text data"),
        "xml" => Some("XML data"),
        "yaml" => Some("YAML data"),
        _ => None,
    }
}

fn location(record: &FileRecord) -> &str {
    if record.is_root_level() {
        ROOT_LOCATION
    } else {
        record.parent_dir()
    }
}

pub fn build_reason(record: &FileRecord, category: Category, classifier: &Classifier) -> String {
    let mut reasons: Vec<String> = Vec::new();
    let at_root = record.is_root_level();
    let name_lower = record.name.to_lowercase();

    match category {
        Category::Tests => {
            if record.has_tests {
                reasons.push(
                    "Contains test functions or test classes (pytest/unittest pattern detected)"
                        .into(),
                );
            }
            let frameworks = classifier.test_framework_imports(record);
            if !frameworks.is_empty() {
                let shown: Vec<&str> = frameworks.into_iter().take(2).collect();
                reasons.push(format!("Imports testing frameworks: {}", shown.join(", ")));
            }
            if name_lower.starts_with("test_") || name_lower.ends_with("_test.py") {
                reasons.push("Follows test file naming convention".into());
            }
            let loc = location(record);
            if loc != "tests" && loc != "test" {
                reasons.push(format!(
                    "Currently located in {}, should be in tests/ directory",
                    loc
                ));
            }
        }
        Category::Source => {
            if !record.imports.is_empty() {
                reasons.push(format!(
                    "Contains {} imports, indicating application logic",
                    record.imports.len()
                ));
            }
            if record.imports.len() > 5 {
                reasons.push("Multiple dependencies suggest core application module".into());
            }
            if !record.has_tests && !record.is_executable {
                reasons.push("Non-executable library code (not a script)".into());
            }
            if at_root {
                reasons.push(
                    "Python modules should be organized under src/ or package directory".into(),
                );
            }
        }
        Category::Scripts => {
            if record.has_main_guard {
                reasons.push("Contains __main__ block, indicating executable entry point".into());
            }
            if let Some(prefix) = classifier
                .tables()
                .script_prefixes
                .iter()
                .find(|p| name_lower.starts_with(p.as_str()))
            {
                reasons.push(format!("Script naming pattern detected ({})", prefix));
            }
            if at_root {
                reasons.push("Executable scripts should be organized in scripts/ directory".into());
            }
        }
        Category::Configuration => {
            match CONFIG_KINDS
                .iter()
                .find(|(pattern, _)| record.name.contains(*pattern))
            {
                Some((_, kind)) => reasons.push(format!("Configuration file: {}", kind)),
                None => reasons.push("Configuration file detected by naming pattern".into()),
            }
            let loc = location(record);
            if STANDARD_ROOT_CONFIGS.contains(&record.name.as_str()) {
                reasons.push("Standard root-level configuration file".into());
            } else if loc != "configs" && loc != "config" {
                reasons.push("Should be organized in configs/ directory".into());
            }
        }
        Category::Experiments => {
            let in_scratch_dir = classifier.experiment_dir_signal(record);
            if classifier.experiment_name_signal(record)
                || (classifier.experiment_path_signal(record) && !in_scratch_dir)
            {
                reasons.push("Temporary or experimental file naming pattern".into());
            }
            if in_scratch_dir {
                reasons.push("Located in experimental/playground area".into());
            }
            reasons.push("Consider moving to experiments/ or removing if obsolete".into());
        }
        Category::Markdown => {
            if is_readme(&record.name) && at_root {
                reasons.push("Primary project README - should remain at repository root".into());
            } else {
                reasons.push("Markdown documentation file".into());
                if at_root {
                    reasons
                        .push("Documentation files should be organized in docs/ directory".into());
                }
            }
        }
        Category::Data => {
            match data_kind(&record.extension) {
                Some(kind) => reasons.push(format!("Data file: {}", kind)),
                None => reasons.push("Data file detected".into()),
            }
            if at_root {
                reasons.push("Data files should be organized in data/ directory".into());
            }
        }
        Category::Docs => {
            if !record.extension.is_empty() {
                reasons.push(format!("Documentation file (.{})", record.extension));
            }
            if at_root {
                reasons.push("Documentation files should be organized in docs/ directory".into());
            }
        }
        Category::Unclassified => {}
    }

    if reasons.is_empty() {
        reasons.push(format!(
            "Classified as {} based on file analysis",
            category.label()
        ));
    }
    format!("{}.", reasons.join(". "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(record: &FileRecord, category: Category) -> String {
        build_reason(record, category, &Classifier::default())
    }

    #[test]
    fn source_reason_cites_import_count() {
        let record = FileRecord::at("api.py").with_imports(&["fastapi", "pydantic"]);
        let text = reason(&record, Category::Source);
        assert!(text.starts_with("Contains 2 imports, indicating application logic."));
        assert!(text.contains("Python modules should be organized under src/"));
        assert!(!text.contains("Multiple dependencies"));
        assert!(text.ends_with('.'));
    }

    #[test]
    fn test_reason_lists_frameworks_and_location() {
        let record = FileRecord::at("pkg/checks.py").with_imports(&["pytest", "os", "mock"]);
        let text = reason(&record, Category::Tests);
        assert!(text.contains("Imports testing frameworks: pytest, mock"));
        assert!(text.contains("Currently located in pkg, should be in tests/ directory"));
        assert!(!text.contains("Contains test functions"));
    }

    #[test]
    fn script_reason_only_cites_real_signals() {
        let record = FileRecord::at("run_all.py");
        let text = reason(&record, Category::Scripts);
        assert!(!text.contains("__main__"));
        assert!(text.contains("Script naming pattern detected (run_)"));

        let guarded = FileRecord::at("tool.py").with_main_guard();
        assert!(reason(&guarded, Category::Scripts).contains("Contains __main__ block"));
    }

    #[test]
    fn config_reason_kinds() {
        let text = reason(&FileRecord::at("app.yaml"), Category::Configuration);
        assert_eq!(
            text,
            "Configuration file: YAML configuration. Should be organized in configs/ directory."
        );
        let text = reason(&FileRecord::at("requirements.txt"), Category::Configuration);
        assert!(text.contains("Python dependencies"));
        assert!(text.contains("Standard root-level configuration file"));
    }

    #[test]
    fn experiment_reason_separates_name_and_dir() {
        let text = reason(&FileRecord::at("playground/notes.py"), Category::Experiments);
        assert!(!text.contains("naming pattern"));
        assert!(text.contains("Located in experimental/playground area"));
        assert!(text.ends_with("Consider moving to experiments/ or removing if obsolete."));

        let text = reason(&FileRecord::at("template_loader.py"), Category::Experiments);
        assert!(text.contains("naming pattern"));
        assert!(!text.contains("playground area"));
    }

    #[test]
    fn fallback_reason() {
        let record = FileRecord::at("pkg/x.py").with_tests();
        let text = reason(&record, Category::Source);
        assert_eq!(text, "Classified as src based on file analysis.");
    }
}
