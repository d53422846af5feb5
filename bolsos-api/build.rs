//! Embeds build identification for the `GET /` banner and the startup log
//!
//! Sets GIT_HASH, BUILD_TIMESTAMP (UTC, RFC 3339) and BUILD_PROFILE.

use std::process::Command;

fn main() {
    // Re-run when HEAD moves so the banner tracks the checked-out commit
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=build.rs");

    let stamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".into());

    for (key, value) in [
        ("GIT_HASH", commit().unwrap_or_else(|| "unknown".into())),
        ("BUILD_TIMESTAMP", stamp),
        ("BUILD_PROFILE", profile),
    ] {
        println!("cargo:rustc-env={}={}", key, value);
    }
}

/// Short commit id, or `None` outside a git checkout
fn commit() -> Option<String> {
    let out = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let hash = String::from_utf8(out.stdout).ok()?;
    Some(hash.trim().to_owned()).filter(|h| !h.is_empty())
}
