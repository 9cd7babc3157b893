//! Structural tests for architectural boundary enforcement.
//!
//! These tests scan source files to verify that the layer boundaries
//! (domain, application, infra, presentation) are maintained.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Read a file and strip comment lines to avoid false positives.
fn read_non_comment_lines(path: &Path) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    content
        .lines()
        .filter(|l| {
            let trimmed = l.trim();
            !trimmed.starts_with("//") && !trimmed.starts_with("/*") && !trimmed.starts_with('*')
        })
        .map(String::from)
        .collect()
}

/// Track brace depth and return whether a line is inside a `#[cfg(test)]` block.
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            in_test_block: false,
            brace_depth: 0,
            test_block_start_depth: 0,
        }
    }

    /// Process a line and return `true` if it's inside a `#[cfg(test)]` block.
    fn process_line(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.contains("#[cfg(test)]") {
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

fn src_dir(parts: &[&str]) -> PathBuf {
    let mut dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    for part in parts {
        dir = dir.join(part);
    }
    dir
}

fn relative(file: &Path) -> String {
    file.strip_prefix(env!("CARGO_MANIFEST_DIR"))
        .unwrap_or(file)
        .display()
        .to_string()
}

/// Lines outside `#[cfg(test)]` blocks in `dir` containing any of `needles`.
fn non_test_lines_containing(dir: &Path, needles: &[&str]) -> Vec<String> {
    let mut violations = Vec::new();
    for file in collect_rs_files(dir) {
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        let rel = relative(&file);
        let mut tracker = CfgTestTracker::new();
        for (i, line) in content.lines().enumerate() {
            let in_test = tracker.process_line(line);
            let trimmed = line.trim();
            if in_test || trimmed.starts_with("//") {
                continue;
            }
            for needle in needles {
                if line.contains(needle) {
                    violations.push(format!("{rel}:{}: `{needle}`: {trimmed}", i + 1));
                }
            }
        }
    }
    violations
}

// ── No inline JSON branching ──────────────────────────────────────────────────

#[test]
fn no_inline_json_branching_in_commands() {
    let mut violations: Vec<String> = Vec::new();

    for file in collect_rs_files(&src_dir(&["commands"])) {
        let lines = read_non_comment_lines(&file);
        let rel = relative(&file);

        for (i, line) in lines.iter().enumerate() {
            let lineno = i + 1;
            if line.contains("json: bool") {
                violations.push(format!(
                    "{rel}:{lineno}: found `json: bool` parameter: {line}"
                ));
            }
            let trimmed = line.trim();
            if trimmed.starts_with("if json")
                || trimmed.starts_with("if !json")
                || trimmed.contains("is_json()")
            {
                violations.push(format!("{rel}:{lineno}: found inline JSON branch: {line}"));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Found inline JSON branching in commands/: use app.renderer() instead:\n{}",
        violations.join("\n")
    );
}

// ── Domain stays pure ─────────────────────────────────────────────────────────

#[test]
fn domain_has_no_io_or_async() {
    let violations = non_test_lines_containing(
        &src_dir(&["domain"]),
        &[
            "std::fs",
            "std::process",
            "tokio",
            "async fn",
            "println!",
            "eprintln!",
            "std::env",
        ],
    );
    assert!(
        violations.is_empty(),
        "domain/ must stay free of I/O and async:\n{}",
        violations.join("\n")
    );
}

#[test]
fn domain_has_no_imports_from_outer_layers() {
    let violations = non_test_lines_containing(
        &src_dir(&["domain"]),
        &[
            "crate::application",
            "crate::infra",
            "crate::commands",
            "crate::output",
            "crate::app::",
        ],
    );
    assert!(
        violations.is_empty(),
        "domain/ must not import from outer layers:\n{}",
        violations.join("\n")
    );
}

// ── Application depends only on domain ────────────────────────────────────────

#[test]
fn application_has_no_imports_from_infra_commands_or_output() {
    let violations = non_test_lines_containing(
        &src_dir(&["application"]),
        &["crate::infra", "crate::commands", "crate::output", "crate::app::"],
    );
    assert!(
        violations.is_empty(),
        "application/ must depend only on domain/ and its own ports:\n{}",
        violations.join("\n")
    );
}

// ── Trait bounds over concrete types ──────────────────────────────────────────

#[test]
fn no_concrete_adapters_in_service_signatures() {
    let concrete_types = ["LocalStateBackend", "YamlConfigStore", "TerminalReporter"];
    let mut violations: Vec<String> = Vec::new();

    for file in collect_rs_files(&src_dir(&["application", "services"])) {
        let rel = relative(&file);
        let lines = read_non_comment_lines(&file);
        for (i, line) in lines.iter().enumerate() {
            for concrete in &concrete_types {
                if line.contains(concrete) {
                    violations.push(format!(
                        "{rel}:{}: concrete type `{concrete}` in service: {line}",
                        i + 1
                    ));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Found concrete adapter types in application services: use port traits instead:\n{}",
        violations.join("\n")
    );
}

// ── Infra isolation ───────────────────────────────────────────────────────────

#[test]
fn infra_has_no_imports_from_commands_or_output() {
    let violations = non_test_lines_containing(
        &src_dir(&["infra"]),
        &["crate::commands", "crate::output"],
    );
    assert!(
        violations.is_empty(),
        "infra/ must not import from commands/ or output/:\n{}",
        violations.join("\n")
    );
}

#[test]
fn infra_has_no_print_macros_outside_tests() {
    let violations = non_test_lines_containing(&src_dir(&["infra"]), &["println!", "eprintln!"]);
    assert!(
        violations.is_empty(),
        "infra/ must not use println!/eprintln! outside #[cfg(test)]:\n{}",
        violations.join("\n")
    );
}

// ── Command handlers accept unified AppContext ────────────────────────────────

#[test]
fn command_handlers_accept_app_context() {
    let mut violations: Vec<String> = Vec::new();

    for file in collect_rs_files(&src_dir(&["commands"])) {
        let rel = relative(&file);
        for (i, line) in read_non_comment_lines(&file).iter().enumerate() {
            let trimmed = line.trim();
            let is_handler = trimmed.starts_with("pub fn run(")
                || trimmed.starts_with("pub async fn run(")
                || trimmed.starts_with("pub async fn purge_retained(");
            if is_handler && !trimmed.contains("app: &AppContext") {
                violations.push(format!("{rel}:{}: {trimmed}", i + 1));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Command handlers must take `app: &AppContext`:\n{}",
        violations.join("\n")
    );
}

// ── Shared wire types live in stackcraft-common ───────────────────────────────

#[test]
fn no_duplicate_wire_type_definitions_in_cli() {
    let wire_types = [
        "ResourceGraph",
        "LogicalId",
        "ResourceRef",
        "PolicyStatement",
        "DeploymentTarget",
        "RemovalPolicy",
    ];
    let mut violations: Vec<String> = Vec::new();

    for file in collect_rs_files(&src_dir(&[])) {
        let rel = relative(&file);
        for (i, line) in read_non_comment_lines(&file).iter().enumerate() {
            for name in &wire_types {
                if line.contains(&format!("struct {name} "))
                    || line.contains(&format!("struct {name}("))
                    || line.contains(&format!("enum {name} "))
                {
                    violations.push(format!(
                        "{rel}:{}: duplicate `{name}` in CLI src: {line}",
                        i + 1
                    ));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Found duplicate wire type definitions in CLI: use stackcraft_common instead:\n{}",
        violations.join("\n")
    );
}

// ── Line width ────────────────────────────────────────────────────────────────

/// Lines rustfmt can break stay within `max_width = 100`. String literals
/// are left alone since rustfmt cannot split them either.
#[test]
fn source_lines_fit_the_format_width() {
    let tests_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests");
    let mut files = collect_rs_files(&src_dir(&[]));
    files.extend(collect_rs_files(&tests_dir));

    let mut violations: Vec<String> = Vec::new();
    for file in files {
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        for (i, line) in content.lines().enumerate() {
            let width = line.chars().count();
            let literal_start = line.find('"').map(|b| line[..b].chars().count());
            let breakable = literal_start.is_none_or(|col| col >= 100);
            if width > 100 && breakable && !line.trim_start().starts_with("//") {
                violations.push(format!("{}:{}: {width} columns", relative(&file), i + 1));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Lines wider than 100 columns:\n{}",
        violations.join("\n")
    );
}
