use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

const PROFILE: &str = "0F1E2D3C";

// Documents tree with a single profile holding one save file
fn documents() -> (TempDir, PathBuf) {
    let docs = tempfile::tempdir().unwrap();
    let profile = docs
        .path()
        .join("Rockstar Games/GTA V/Profiles")
        .join(PROFILE);
    fs::create_dir_all(&profile).unwrap();
    fs::write(profile.join("SGTA50000"), b"current").unwrap();
    (docs, profile)
}

fn run_cli(docs: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_gtav-saveload"))
        .arg("--documents-dir")
        .arg(docs)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run gtav-saveload")
}

#[test]
fn save_and_load_slot() {
    let (docs, profile) = documents();
    let out = run_cli(docs.path(), &["--save", "mission"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        fs::read(profile.join("Slots/mission/SGTA50000")).unwrap(),
        b"current"
    );

    fs::write(profile.join("SGTA50000"), b"later").unwrap();
    let out = run_cli(docs.path(), &["--load", "mission", "--quiet"]);
    assert!(out.status.success());
    assert_eq!(fs::read(profile.join("SGTA50000")).unwrap(), b"current");
}

#[test]
fn missing_slot_exits_nonzero() {
    let (docs, profile) = documents();
    let out = run_cli(docs.path(), &["--load", "ghost"]);
    assert_eq!(out.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&out.stderr).contains("ghost"));
    assert_eq!(fs::read(profile.join("SGTA50000")).unwrap(), b"current");
}

#[test]
fn load_save_file_by_pattern() {
    let (docs, profile) = documents();
    let lib = profile.join("Save Files");
    for name in ["Albert", "Chop The Dog", "Zebra"] {
        fs::create_dir_all(lib.join(name)).unwrap();
        fs::write(lib.join(name).join("SGTA50000"), name.as_bytes()).unwrap();
    }
    let out = run_cli(docs.path(), &["--load-save-file", "Chop"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("Chop The Dog"));
    assert_eq!(fs::read(profile.join("SGTA50000")).unwrap(), b"Chop The Dog");

    let out = run_cli(docs.path(), &["--load-save-file", "xyz"]);
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn flags_are_mutually_exclusive_and_required() {
    let (docs, _profile) = documents();
    let out = run_cli(docs.path(), &[]);
    assert_eq!(out.status.code(), Some(2));
    let out = run_cli(docs.path(), &["--save", "a", "--load", "b"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn invalid_slot_name_is_usage_error() {
    let (docs, profile) = documents();
    let out = run_cli(docs.path(), &["--save", "../outside"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(!profile.join("Slots").exists());
}

#[test]
fn save_dated_then_list_json() {
    let (docs, _profile) = documents();
    let out = run_cli(docs.path(), &["--save-dated"]);
    assert!(out.status.success());

    let out = run_cli(docs.path(), &["--list-slots", "--json"]);
    assert!(out.status.success());
    let v: Value = serde_json::from_slice(&out.stdout).expect("stdout should be valid JSON");
    let slots = v.as_array().unwrap();
    assert_eq!(slots.len(), 1);
    assert!(slots[0]["name"].as_str().unwrap().starts_with("dated-"));
    assert_eq!(slots[0]["files"], 1);
}

#[test]
fn unknown_profile_is_not_found() {
    let (docs, _profile) = documents();
    let out = run_cli(docs.path(), &["--profile", "nobody", "--save", "x"]);
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn clear_profile_removes_save_files() {
    let (docs, profile) = documents();
    fs::write(profile.join("pc_settings.bin"), b"keep").unwrap();
    let out = run_cli(docs.path(), &["--clear-profile"]);
    assert!(out.status.success());
    assert!(!profile.join("SGTA50000").exists());
    assert!(profile.join("pc_settings.bin").exists());
}
