//! Integration Test: Sleep and Filesystem Prohibition
//!
//! **Policy**: production code never blocks a thread on a sleep. Async
//! sleeps are allowed only for the UI redraw tick and the scripted test
//! transport; periodic work uses `tokio::time::interval`.
//!
//! Filesystem access is limited to the session store, the config loader and
//! the binary's log file setup.

use architectural_enforcement::{report, scan_production, violations};

#[test]
fn test_no_thread_sleep() {
    let lines = scan_production();
    report(
        "no std::thread::sleep in production code",
        &violations(&lines, "thread::sleep", &[]),
    );
}

#[test]
fn test_async_sleep_only_for_ticks() {
    let lines = scan_production();
    report(
        "tokio sleeps only in the redraw tick and the mock transport",
        &violations(
            &lines,
            "time::sleep",
            &["tui/src/app.rs", "client/core/src/test_utils.rs"],
        ),
    );
}

#[test]
fn test_filesystem_access_is_contained() {
    let lines = scan_production();
    report(
        "std::fs only in session, config and the log setup",
        &violations(
            &lines,
            "std::fs",
            &[
                "client/core/src/session.rs",
                "client/core/src/config.rs",
                "tui/src/main.rs",
            ],
        ),
    );
}
