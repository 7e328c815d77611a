//! Integration Test: Test Support Gating
//!
//! **Policy**: the scripted transport in `fumotion-core` is compiled only for
//! tests or with the `test-utils` feature, and only dev-dependencies turn
//! that feature on.

use std::fs;

use architectural_enforcement::workspace_root;

fn manifest_section<'a>(manifest: &'a str, header: &str) -> Vec<&'a str> {
    manifest
        .lines()
        .skip_while(|l| l.trim() != header)
        .skip(1)
        .take_while(|l| !l.trim_start().starts_with('['))
        .collect()
}

#[test]
fn test_test_utils_module_is_gated() {
    let lib = fs::read_to_string(workspace_root().join("client/core/src/lib.rs"))
        .expect("client/core/src/lib.rs is readable");
    let lines: Vec<&str> = lib.lines().map(str::trim).collect();

    let position = lines
        .iter()
        .position(|l| *l == "pub mod test_utils;")
        .expect("test_utils module is declared");
    assert!(position > 0);
    assert_eq!(
        lines[position - 1],
        "#[cfg(any(test, feature = \"test-utils\"))]"
    );
}

#[test]
fn test_test_utils_feature_only_in_dev_dependencies() {
    for manifest_path in ["client/core/Cargo.toml", "tui/Cargo.toml"] {
        let manifest = fs::read_to_string(workspace_root().join(manifest_path))
            .expect("manifest is readable");

        let normal = manifest_section(&manifest, "[dependencies]");
        assert!(
            !normal.iter().any(|l| l.contains("test-utils")),
            "{manifest_path}: test-utils enabled outside dev-dependencies"
        );
    }

    let core = fs::read_to_string(workspace_root().join("client/core/Cargo.toml"))
        .expect("client/core/Cargo.toml is readable");
    let features = manifest_section(&core, "[features]");
    assert!(!features.iter().any(|l| l.trim_start().starts_with("default")));
}
