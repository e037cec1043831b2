//! Integration Test: Panic Prohibition in the Journal Pipeline
//!
//! The journal normalizer and renderer are total functions: they accept
//! any payload the service has ever produced and must come back with a
//! structure, never a panic. A single `.unwrap()` on a hostile payload
//! would turn a malformed trace into a crashed client.
//!
//! **Policy**: Production code under `tracer/core/src/journal` MUST NOT
//! contain panicking calls. Test modules are exempt.

use std::fs;
use std::path::{Path, PathBuf};

/// Calls that can panic at runtime
const FORBIDDEN_CALLS: &[&str] = &[
    ".unwrap(",
    ".expect(",
    "panic!(",
    "unreachable!(",
    "todo!(",
    "unimplemented!(",
];

#[test]
fn test_no_panicking_calls_in_journal_pipeline() {
    let violations = find_panic_violations(&journal_src_dir());

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Panicking calls found in the journal pipeline!");
        eprintln!("Normalization and rendering must be total: any payload in, a tree out.\n");

        for violation in &violations {
            eprintln!("  ❌ {}", violation);
        }

        eprintln!("\n❌ FORBIDDEN in tracer/core/src/journal:");
        eprintln!("  - .unwrap(), .expect()");
        eprintln!("  - panic!(), unreachable!(), todo!(), unimplemented!()");
        eprintln!("\n✅ REQUIRED instead:");
        eprintln!("  - unwrap_or / unwrap_or_else / unwrap_or_default");
        eprintln!("  - map_or_else with an explicit fallback");
        eprintln!("  - the Opaque / structural-dump fallback for unknown shapes");
        eprintln!("\n✅ ACCEPTABLE:");
        eprintln!("  - Test code (#[cfg(test)] modules)");

        panic!(
            "\nFound {} panicking call(s) in the journal pipeline.\nFix these before merging!",
            violations.len()
        );
    }
}

/// The HTTP layer is async end to end; the blocking reqwest client would
/// stall the runtime from inside the poll loop.
#[test]
fn test_no_blocking_http_client_in_core() {
    let core_src = manifest_relative("../../tracer/core/src");
    let mut violations = Vec::new();

    for path in rust_files(&core_src) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        for (idx, line) in production_part(&content).lines().enumerate() {
            let code_part = line.split("//").next().unwrap_or(line);
            if code_part.contains("reqwest::blocking") {
                violations.push(format!(
                    "{}:{} - Blocking HTTP client: {}",
                    path.display(),
                    idx + 1,
                    line.trim()
                ));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Found blocking HTTP client usage:\n{}",
        violations.join("\n")
    );
}

fn journal_src_dir() -> PathBuf {
    manifest_relative("../../tracer/core/src/journal")
}

fn manifest_relative(rel: &str) -> PathBuf {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(rel);
    assert!(
        path.exists(),
        "source directory {} not found; did the tree layout change?",
        path.display()
    );
    path
}

fn find_panic_violations(dir: &Path) -> Vec<String> {
    let mut violations = Vec::new();
    for path in rust_files(dir) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        check_source(&path, production_part(&content), &mut violations);
    }
    violations
}

fn rust_files(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// Everything before the first `#[cfg(test)]` marker
///
/// The crate keeps unit tests in a trailing `#[cfg(test)] mod tests`, so
/// truncating there is enough to exempt test code.
fn production_part(content: &str) -> &str {
    match content.find("#[cfg(test)]") {
        Some(pos) => &content[..pos],
        None => content,
    }
}

fn check_source(path: &Path, source: &str, violations: &mut Vec<String>) {
    for (idx, line) in source.lines().enumerate() {
        // Skip comments - forbidden names may appear in prose.
        let code_part = line.split("//").next().unwrap_or(line);

        for forbidden in FORBIDDEN_CALLS {
            if code_part.contains(forbidden) {
                violations.push(format!(
                    "{}:{} - Panicking call `{}`: {}",
                    path.display(),
                    idx + 1,
                    forbidden.trim_matches(&['.', '('][..]),
                    line.trim()
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_flags_unwrap() {
        let mut violations = Vec::new();
        check_source(
            Path::new("fake.rs"),
            "fn f() {\n    value.unwrap();\n}\n",
            &mut violations,
        );
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("fake.rs:2"));
    }

    #[test]
    fn test_detector_allows_fallback_combinators() {
        let mut violations = Vec::new();
        check_source(
            Path::new("fake.rs"),
            "fn f() {\n    value.unwrap_or_default();\n    value.unwrap_or(0);\n}\n",
            &mut violations,
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_detector_skips_comments_and_test_modules() {
        let source = "fn f() {} // never .unwrap() here\n#[cfg(test)]\nmod tests {\n    fn g() { value.unwrap(); }\n}\n";
        let mut violations = Vec::new();
        check_source(Path::new("fake.rs"), production_part(source), &mut violations);
        assert!(violations.is_empty());
    }
}
