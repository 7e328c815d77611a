//! Integration Test: Network Isolation
//!
//! **Policy**: the gateway is the only component that performs network I/O.
//! `reqwest` is named in `client/core/src/gateway.rs` and nowhere else, and
//! the terminal surface does not even depend on it.

use std::fs;

use architectural_enforcement::{report, scan_production, violations, workspace_root};

const GATEWAY: &str = "client/core/src/gateway.rs";

#[test]
fn test_reqwest_only_in_gateway() {
    let lines = scan_production();
    assert!(
        lines.iter().any(|l| l.file == GATEWAY),
        "gateway source not found under {}",
        workspace_root().display()
    );
    report(
        "reqwest is used only by the gateway",
        &violations(&lines, "reqwest::", &[GATEWAY]),
    );
}

#[test]
fn test_no_blocking_http_client() {
    let lines = scan_production();
    report(
        "no blocking HTTP client",
        &violations(&lines, "reqwest::blocking", &[]),
    );
}

#[test]
fn test_no_raw_sockets() {
    let lines = scan_production();
    report("no std::net sockets", &violations(&lines, "std::net::", &[]));
}

#[test]
fn test_tui_does_not_depend_on_reqwest() {
    let manifest = fs::read_to_string(workspace_root().join("tui/Cargo.toml"))
        .expect("tui/Cargo.toml is readable");
    assert!(
        !manifest.lines().any(|l| l.trim_start().starts_with("reqwest")),
        "the terminal surface must reach the service through fumotion-core"
    );
}
