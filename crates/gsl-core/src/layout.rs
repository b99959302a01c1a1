//! Where things live on disk for one GTA V profile.
//!
//! Nothing here is global: callers resolve a [`Layout`] once and hand it to
//! [`crate::slots::SlotManager`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::debug;

use crate::error::{Error, Result};

pub const SLOTS_DIR: &str = "Slots";
pub const SAVE_FILES_DIR: &str = "Save Files";
/// Name prefix of the files the game writes into a profile.
pub const SAVE_FILE_PREFIX: &str = "SGTA";
/// Environment variable overriding the documents directory, read by the CLI.
pub const DOCUMENTS_ENV: &str = "GTAV_SAVELOAD_DOCUMENTS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// The live directory the game reads and writes.
    pub current_dir: PathBuf,
    pub slots_dir: PathBuf,
    /// Read-only library of pre-made saves.
    pub save_files_dir: PathBuf,
    /// Only files whose name starts with this are copied. `None` copies everything.
    pub file_prefix: Option<String>,
}

impl Layout {
    /// The game's own layout: save files live directly in the profile directory.
    pub fn for_profile(profile_dir: &Path) -> Self {
        Self {
            current_dir: profile_dir.to_path_buf(),
            slots_dir: profile_dir.join(SLOTS_DIR),
            save_files_dir: profile_dir.join(SAVE_FILES_DIR),
            file_prefix: Some(SAVE_FILE_PREFIX.to_string()),
        }
    }

    pub fn with_current_dir(mut self, dir: PathBuf) -> Self {
        self.current_dir = dir;
        self
    }

    pub fn with_file_prefix(mut self, prefix: Option<String>) -> Self {
        self.file_prefix = prefix.filter(|p| !p.is_empty());
        self
    }

    pub fn slot_dir(&self, name: &str) -> PathBuf {
        self.slots_dir.join(name)
    }

    /// Does a file name pass the prefix filter?
    pub fn accepts(&self, file_name: &str) -> bool {
        match &self.file_prefix {
            Some(p) => file_name.starts_with(p.as_str()),
            None => true,
        }
    }

    /// Canonical paths of the slots root and save-file library when they sit
    /// somewhere below `current_dir`. These are never copied out of it.
    pub fn reserved_in_current(&self) -> Vec<PathBuf> {
        let Some(current) = canonical(&self.current_dir) else {
            return Vec::new();
        };
        [&self.slots_dir, &self.save_files_dir]
            .into_iter()
            .filter_map(|d| canonical(d))
            .filter(|d| d != &current && d.starts_with(&current))
            .collect()
    }
}

/// `fs::canonicalize`, falling back to the canonical parent for a path that
/// does not exist yet.
fn canonical(p: &Path) -> Option<PathBuf> {
    if let Ok(c) = fs::canonicalize(p) {
        return Some(c);
    }
    let parent = fs::canonicalize(p.parent()?).ok()?;
    Some(parent.join(p.file_name()?))
}

/// `<documents>/Rockstar Games/GTA V/Profiles`
pub fn profiles_root(documents: &Path) -> PathBuf {
    documents
        .join("Rockstar Games")
        .join("GTA V")
        .join("Profiles")
}

/// Explicit override, then the platform documents directory, then
/// `%USERPROFILE%\Documents`.
pub fn documents_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    if let Some(p) = dirs::document_dir() {
        return Ok(p);
    }
    std::env::var_os("USERPROFILE")
        .map(|home| PathBuf::from(home).join("Documents"))
        .ok_or_else(|| Error::usage("cannot locate the documents directory; pass --documents-dir"))
}

/// Pick the active profile under `root`: by id when given, otherwise the most
/// recently modified profile directory.
pub fn resolve_profile(root: &Path, id: Option<&str>) -> Result<PathBuf> {
    if !root.is_dir() {
        return Err(Error::not_found(
            "profiles directory",
            root.display().to_string(),
        ));
    }
    if let Some(id) = id {
        let p = root.join(id);
        if p.is_dir() {
            return Ok(p);
        }
        return Err(Error::not_found("profile", id));
    }
    let mut candidates: Vec<(SystemTime, PathBuf)> = Vec::new();
    for e in fs::read_dir(root)? {
        let e = e?;
        let p = e.path();
        if !p.is_dir() {
            continue;
        }
        let modified = e.metadata()?.modified()?;
        candidates.push((modified, p));
    }
    // newest first, name as tie-break
    candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    let (_, profile) = candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::not_found("profile", root.display().to_string()))?;
    debug!("active profile: {}", profile.display());
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_dirs_only_when_nested() {
        let d = tempfile::tempdir().unwrap();
        let p = d.path().join("profile");
        fs::create_dir_all(p.join(SLOTS_DIR)).unwrap();
        fs::create_dir_all(p.join("x")).unwrap();
        fs::create_dir_all(d.path().join("elsewhere")).unwrap();
        let root = fs::canonicalize(&p).unwrap();

        let l = Layout::for_profile(&p);
        assert_eq!(
            l.reserved_in_current(),
            vec![root.join(SLOTS_DIR), root.join(SAVE_FILES_DIR)]
        );
        let l = l.with_current_dir(p.join("x/.."));
        assert_eq!(l.reserved_in_current().len(), 2);
        let l = l.with_current_dir(d.path().join("elsewhere"));
        assert!(l.reserved_in_current().is_empty());
    }

    #[test]
    fn prefix_filter() {
        let l = Layout::for_profile(Path::new("/p"));
        assert!(l.accepts("SGTA50000"));
        assert!(!l.accepts("cfg.dat"));
        let l = l.with_file_prefix(None);
        assert!(l.accepts("cfg.dat"));
    }

    #[test]
    fn profile_by_id_and_missing() {
        let d = tempfile::tempdir().unwrap();
        fs::create_dir_all(d.path().join("abc123")).unwrap();
        assert_eq!(
            resolve_profile(d.path(), Some("abc123")).unwrap(),
            d.path().join("abc123")
        );
        assert!(resolve_profile(d.path(), Some("nope")).unwrap_err().is_not_found());
        assert!(resolve_profile(&d.path().join("missing"), None)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn single_profile_is_selected() {
        let d = tempfile::tempdir().unwrap();
        fs::create_dir_all(d.path().join("only")).unwrap();
        fs::write(d.path().join("stray.txt"), b"x").unwrap();
        assert_eq!(resolve_profile(d.path(), None).unwrap(), d.path().join("only"));
    }
}
