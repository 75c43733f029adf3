//! Line-based Python source scanning: imports, entry guard, test definitions.

use serde::{Deserialize, Serialize};

use super::regexes::{
    regex_py_identifier, regex_py_main_guard, regex_py_test_class, regex_py_test_def,
};

/// One parsed import statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStatement {
    /// Module path with leading dots stripped (may be empty for `from . import x`).
    pub module: String,
    pub is_relative: bool,
    /// Number of leading dots; 0 for absolute imports.
    pub level: usize,
    /// 1-based line of the statement start.
    pub line: usize,
    pub names: Vec<String>,
    /// `from X import Y` rather than `import X`.
    pub from_form: bool,
}

impl ImportStatement {
    /// Render back in `from`/`import` form for reports.
    pub fn display(&self) -> String {
        if !self.from_form {
            return format!("import {}", self.module);
        }
        format!(
            "from {}{} import {}",
            ".".repeat(self.level),
            self.module,
            self.names.join(", ")
        )
    }
}

/// Static facts extracted from one Python file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PySourceFacts {
    pub imports: Vec<ImportStatement>,
    pub has_main_guard: bool,
    pub has_tests: bool,
}

impl PySourceFacts {
    /// Module names in the form stored on file records.
    pub fn module_names(&self) -> Vec<String> {
        self.imports
            .iter()
            .filter(|i| !i.module.is_empty())
            .map(|i| i.module.clone())
            .collect()
    }
}

pub fn analyze_py_source(content: &str) -> PySourceFacts {
    PySourceFacts {
        imports: parse_imports(content),
        has_main_guard: regex_py_main_guard().is_match(content),
        has_tests: regex_py_test_def().is_match(content) || regex_py_test_class().is_match(content),
    }
}

/// Logical lines (continuations joined) outside of triple-quoted strings.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut open_quote: Option<&'static str> = None;
    let mut pending: Option<(usize, String, usize)> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;

        if let Some(quote) = open_quote {
            if raw.matches(quote).count() % 2 == 1 {
                open_quote = None;
            }
            continue;
        }

        let code = raw.split('#').next().unwrap_or("").trim_end();

        if pending.is_none() {
            let mut opened = None;
            for quote in ["\"\"\"", "'''"] {
                if code.matches(quote).count() % 2 == 1 {
                    opened = Some(quote);
                    break;
                }
            }
            if let Some(quote) = opened {
                open_quote = Some(quote);
                continue;
            }
        }

        match pending.take() {
            Some((start, mut buf, depth)) => {
                buf.push(' ');
                buf.push_str(code.trim().trim_end_matches('\\'));
                let depth = depth + code.matches('(').count();
                let closes = code.matches(')').count();
                let depth = depth.saturating_sub(closes);
                if depth > 0 || code.ends_with('\\') {
                    pending = Some((start, buf, depth));
                } else {
                    out.push((start, buf));
                }
            }
            None => {
                let opens = code.matches('(').count();
                let closes = code.matches(')').count();
                let depth = opens.saturating_sub(closes);
                let text = code.trim_end_matches('\\').to_string();
                if depth > 0 || code.ends_with('\\') {
                    pending = Some((line_no, text, depth));
                } else {
                    out.push((line_no, text));
                }
            }
        }
    }

    if let Some((start, buf, _)) = pending {
        out.push((start, buf));
    }
    out
}

pub fn parse_imports(content: &str) -> Vec<ImportStatement> {
    let mut imports = Vec::new();

    for (line, text) in logical_lines(content) {
        let trimmed = text.trim_start();
        if let Some(rest) = trimmed.strip_prefix("import ") {
            for part in rest.split(',') {
                let part = part.trim();
                let (name, alias) = match part.split_once(" as ") {
                    Some((lhs, rhs)) => (lhs.trim(), Some(rhs.trim())),
                    None => (part, None),
                };
                if !regex_py_identifier().is_match(name) {
                    continue;
                }
                imports.push(ImportStatement {
                    module: name.to_string(),
                    is_relative: false,
                    level: 0,
                    line,
                    names: vec![alias.unwrap_or(name).to_string()],
                    from_form: false,
                });
            }
        } else if let Some(rest) = trimmed.strip_prefix("from ") {
            let Some((module_raw, names_raw)) = rest.split_once(" import ") else {
                continue;
            };
            let module_raw = module_raw.trim();
            let level = module_raw.chars().take_while(|c| *c == '.').count();
            let module = module_raw[level..].trim().to_string();
            if !module.is_empty() && !regex_py_identifier().is_match(&module) {
                continue;
            }
            if level == 0 && module.is_empty() {
                continue;
            }
            let names = names_raw
                .trim()
                .trim_start_matches('(')
                .trim_end_matches(')')
                .split(',')
                .map(|n| n.split(" as ").next().unwrap_or("").trim())
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect();
            imports.push(ImportStatement {
                module,
                is_relative: level > 0,
                level,
                line,
                names,
                from_form: true,
            });
        }
    }

    imports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_aliased_imports() {
        let src = "import os\nimport numpy as np, json\n";
        let imports = parse_imports(src);
        let modules: Vec<_> = imports.iter().map(|i| i.module.as_str()).collect();
        assert_eq!(modules, vec!["os", "numpy", "json"]);
        assert_eq!(imports[1].names, vec!["np"]);
        assert_eq!(imports[1].line, 2);
        assert!(imports.iter().all(|i| !i.is_relative));
    }

    #[test]
    fn parses_relative_from_imports() {
        let src = "from .utils import f, g as h\nfrom .. import shared\nfrom pkg.sub import x\n";
        let imports = parse_imports(src);
        assert_eq!(imports.len(), 3);

        assert_eq!(imports[0].module, "utils");
        assert!(imports[0].is_relative);
        assert_eq!(imports[0].level, 1);
        assert_eq!(imports[0].names, vec!["f", "g"]);

        assert_eq!(imports[1].module, "");
        assert_eq!(imports[1].level, 2);
        assert_eq!(imports[1].names, vec!["shared"]);

        assert_eq!(imports[2].module, "pkg.sub");
        assert_eq!(imports[2].level, 0);
    }

    #[test]
    fn joins_parenthesized_imports() {
        let src = "from app.models import (\n    User,\n    Group,  # comment\n)\nimport sys\n";
        let imports = parse_imports(src);
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].names, vec!["User", "Group"]);
        assert_eq!(imports[0].line, 1);
        assert_eq!(imports[1].module, "sys");
        assert_eq!(imports[1].line, 5);
    }

    #[test]
    fn ignores_imports_inside_docstrings_and_comments() {
        let src = "\"\"\"\nimport fake\n\"\"\"\n# import nope\nimport real\n";
        let imports = parse_imports(src);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].module, "real");
    }

    #[test]
    fn detects_main_guard_and_tests() {
        let src = r#"
import pytest

class TestThing:
    def test_ok(self):
        assert True

if __name__ == "__main__":
    pytest.main()
"#;
        let facts = analyze_py_source(src);
        assert!(facts.has_main_guard);
        assert!(facts.has_tests);
        assert_eq!(facts.module_names(), vec!["pytest"]);
    }

    #[test]
    fn plain_module_has_no_flags() {
        let facts = analyze_py_source("def helper():\n    return 1\n");
        assert!(!facts.has_main_guard);
        assert!(!facts.has_tests);
        assert!(facts.imports.is_empty());
    }

    #[test]
    fn display_round_trips_shape() {
        let imports = parse_imports("from .utils import f\nimport os\n");
        assert_eq!(imports[0].display(), "from .utils import f");
        assert_eq!(imports[1].display(), "import os");
    }
}
