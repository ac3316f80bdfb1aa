use std::{
    env,
    process::Command,
    time::{SystemTime, UNIX_EPOCH},
};

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-env-changed=DOCPREP_RUN_CROSS_WINDOWS_TESTS");
    println!("cargo::rustc-check-cfg=cfg(docprep_skip_cross_windows_tests)");

    if skip_cross_windows_tests() {
        println!("cargo:rustc-cfg=docprep_skip_cross_windows_tests");
    }

    println!("cargo:rustc-env=DOCPREP_VERSION={}", version());
}

/// Symlink tests need a Windows host when targeting Windows.
/// `DOCPREP_RUN_CROSS_WINDOWS_TESTS` forces them on.
fn skip_cross_windows_tests() -> bool {
    if env::var_os("DOCPREP_RUN_CROSS_WINDOWS_TESTS").is_some() {
        return false;
    }
    let host = env::var("HOST").unwrap_or_default();
    let target = env::var("TARGET").unwrap_or_default();
    target.contains("windows") && !host.contains("windows")
}

/// `git describe` without the leading `v`; dirty or unknown builds get a timestamp suffix.
fn version() -> String {
    let described = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().trim_start_matches('v').to_string());

    match described {
        Some(v) if !v.is_empty() && !v.ends_with("-dirty") => v,
        Some(v) if !v.is_empty() => format!("{}-{}", v, timestamp()),
        _ => format!("0.0.0-unknown-{}", timestamp()),
    }
}

fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
