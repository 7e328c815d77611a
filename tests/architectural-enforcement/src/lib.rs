//! Architectural Enforcement
//!
//! Source scanners shared by the integration tests in `tests/`. The tests
//! enforce layering rules of the workspace:
//! - Only the gateway talks to the network
//! - No thread sleeps, and async sleeps only where a timer is the point
//! - Filesystem access stays in the session and config modules
//!
//! Scanning is line based. Comment lines and everything after the first
//! `#[cfg(test)]` of a file are ignored.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Production source directories, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["client/core/src", "tui/src"];

/// One line of production code
#[derive(Clone, Debug)]
pub struct SourceLine {
    /// Path relative to the workspace root, `/`-separated
    pub file: String,
    pub number: usize,
    pub text: String,
}

impl std::fmt::Display for SourceLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.file, self.number, self.text.trim())
    }
}

pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .canonicalize()
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../.."))
}

/// Code part of a line, without a trailing `//` comment
fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Production lines of one file
pub fn production_lines(file: &str, content: &str) -> Vec<SourceLine> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .map(|(idx, line)| SourceLine {
            file: file.to_string(),
            number: idx + 1,
            text: code_part(line).to_string(),
        })
        .collect()
}

/// Every production line under [`PRODUCTION_DIRS`]
pub fn scan_production() -> Vec<SourceLine> {
    let root = workspace_root();
    let mut lines = Vec::new();

    for dir in PRODUCTION_DIRS {
        let path = root.join(dir);
        for entry in WalkDir::new(&path).into_iter().filter_map(|e| e.ok()) {
            if entry.path().extension().and_then(|s| s.to_str()) != Some("rs") {
                continue;
            }
            let Ok(content) = fs::read_to_string(entry.path()) else {
                continue;
            };
            let relative = entry
                .path()
                .strip_prefix(&root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            lines.extend(production_lines(&relative, &content));
        }
    }

    lines
}

/// Lines containing `needle` outside the `allowed` files
pub fn violations<'a>(
    lines: &'a [SourceLine],
    needle: &str,
    allowed: &[&str],
) -> Vec<&'a SourceLine> {
    lines
        .iter()
        .filter(|line| line.text.contains(needle))
        .filter(|line| !allowed.contains(&line.file.as_str()))
        .collect()
}

/// Panic with a readable report when `found` is not empty
pub fn report(rule: &str, found: &[&SourceLine]) {
    if found.is_empty() {
        return;
    }
    eprintln!("\nRule violated: {rule}\n");
    for line in found {
        eprintln!("  {line}");
    }
    panic!("\nFound {} violation(s) of: {rule}", found.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let content = "use a;\n// reqwest in a comment\nfn f() {} // reqwest\n#[cfg(test)]\nmod tests { use reqwest; }\n";
        let lines = production_lines("x.rs", content);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["use a;", "fn f() {} "]);
        assert_eq!(lines[1].number, 3);
    }

    #[test]
    fn test_violations_respect_allow_list() {
        let lines = production_lines("a.rs", "use reqwest::Client;\n");
        assert_eq!(violations(&lines, "reqwest", &["a.rs"]).len(), 0);
        assert_eq!(violations(&lines, "reqwest", &["b.rs"]).len(), 1);
    }
}
