//! Stamps the binary with git revision and build time for /version

use std::process::Command;

/// Run git and return trimmed stdout, or None outside a checkout
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_string()).filter(|s| !s.is_empty())
}

fn main() {
    let revisions = [
        ("GIT_COMMIT_SHORT", &["rev-parse", "--short", "HEAD"][..]),
        ("GIT_COMMIT_FULL", &["rev-parse", "HEAD"][..]),
    ];
    for (key, args) in revisions {
        let value = git(args).unwrap_or_else(|| "unknown".into());
        println!("cargo:rustc-env={key}={value}");
    }

    let built = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    println!("cargo:rustc-env=BUILD_TIMESTAMP={built}");

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
}
