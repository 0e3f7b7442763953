//! Build script for the site crate.
//!
//! Fingerprints the stylesheet and the site script: each is copied to a
//! `derived/` directory under a content-hashed name, and the hash is exposed
//! to templates through `CSS_HASH` and `JS_HASH`, so both can be served with
//! an immutable cache lifetime.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Hex characters kept from the SHA-256 digest.
const HASH_LEN: usize = 10;

struct Asset {
    dir: &'static str,
    stem: &'static str,
    ext: &'static str,
    env_var: &'static str,
}

const ASSETS: [Asset; 2] = [
    Asset {
        dir: "static/css",
        stem: "site",
        ext: "css",
        env_var: "CSS_HASH",
    },
    Asset {
        dir: "static/js",
        stem: "site",
        ext: "js",
        env_var: "JS_HASH",
    },
];

fn main() {
    let manifest_dir = PathBuf::from(
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo"),
    );
    for asset in &ASSETS {
        fingerprint(&manifest_dir, asset);
    }
}

fn fingerprint(manifest_dir: &Path, asset: &Asset) {
    let dir = manifest_dir.join(asset.dir);
    let source = dir.join(format!("{}.{}", asset.stem, asset.ext));
    println!("cargo:rerun-if-changed={}", source.display());

    let Ok(content) = fs::read(&source) else {
        println!("cargo:warning=Missing {}, serving it unhashed", source.display());
        println!("cargo:rustc-env={}=", asset.env_var);
        return;
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let hash: String = digest.chars().take(HASH_LEN).collect();
    println!("cargo:rustc-env={}={hash}", asset.env_var);

    let derived = dir.join("derived");
    fs::create_dir_all(&derived).expect("Failed to create derived asset directory");

    // Drop stale fingerprints so the directory holds one copy per asset
    if let Ok(entries) = fs::read_dir(&derived) {
        let prefix = format!("{}.", asset.stem);
        let suffix = format!(".{}", asset.ext);
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(&prefix) && name.ends_with(&suffix) {
                let _ = fs::remove_file(entry.path());
            }
        }
    }

    fs::write(
        derived.join(format!("{}.{hash}.{}", asset.stem, asset.ext)),
        &content,
    )
    .expect("Failed to write fingerprinted asset");
}
