use cargo_lock::Lockfile;
use serde::Serialize;
use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

// Mirrors cli::DepInfo on the binary side
#[derive(Serialize)]
struct DepInfo {
    name: String,
    version: String,
    checksum: Option<String>,
    source: Option<String>,
}

fn git_hash() -> String {
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn locked_deps(manifest_dir: &Path) -> Vec<DepInfo> {
    let lock_path = manifest_dir.join("Cargo.lock");
    // No lockfile yet on a first build; the binary then reports zero dependencies
    let Ok(lockfile) = Lockfile::load(lock_path) else {
        return Vec::new();
    };
    lockfile
        .packages
        .into_iter()
        .map(|pkg| DepInfo {
            name: pkg.name.as_str().to_string(),
            version: pkg.version.to_string(),
            checksum: pkg.checksum.map(|c| c.to_string()),
            source: pkg.source.map(|s| s.to_string()),
        })
        .collect()
}

fn main() {
    println!("cargo:rustc-env=MIQAT_GIT_HASH={}", git_hash());
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=Cargo.lock");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let deps = locked_deps(Path::new(&manifest_dir));
    let json_info = serde_json::to_string(&deps).expect("dependency list serializes");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest_path = Path::new(&out_dir).join("deps_info.json");
    fs::write(&dest_path, json_info).expect("Failed to write dependency info");
    println!("cargo:rustc-env=MIQAT_DEPS_INFO_PATH={}", dest_path.display());
}
