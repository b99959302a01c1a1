use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::error::{Error, Result};

pub const DATED_PREFIX: &str = "dated-";
pub const DATED_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// Slot name for a dated save, e.g. `dated-2026-10-16_142501`.
pub fn dated_slot_name(when: DateTime<Local>) -> String {
    format!("{}{}", DATED_PREFIX, when.format(DATED_FORMAT))
}

/// Reject names that would escape the slots root or collide with staging dirs.
pub fn validate_slot_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::usage("slot name must not be empty"));
    }
    if name == "." || name == ".." || name.starts_with('.') {
        return Err(Error::usage(format!("invalid slot name: {}", name)));
    }
    if name.contains(['/', '\\']) {
        return Err(Error::usage(format!(
            "slot name must not contain path separators: {}",
            name
        )));
    }
    Ok(())
}

/// Immediate, non-hidden subdirectories of `root` sorted by name. A missing
/// root yields an empty list.
pub fn list_dirs(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut out = Vec::new();
    let rd = match fs::read_dir(root) {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(e.into()),
    };
    for e in rd {
        let p = e?.path();
        if !p.is_dir() {
            continue;
        }
        let Some(name) = p.file_name().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        out.push((name, p));
    }
    out.sort();
    Ok(out)
}

/// Subdirectory whose name contains `pattern`, ignoring case. When several
/// match, the greatest name wins ("Chop 2" over "Chop 1").
pub fn find_name_contains(root: &Path, pattern: &str) -> Result<(String, PathBuf)> {
    if pattern.is_empty() {
        return Err(Error::usage("save file pattern must not be empty"));
    }
    let needle = pattern.to_lowercase();
    list_dirs(root)?
        .into_iter()
        .rev()
        .find(|(name, _)| name.to_lowercase().contains(&needle))
        .ok_or_else(|| Error::not_found("save file matching", pattern))
}

#[derive(Debug, Clone)]
pub struct SlotEntry {
    pub name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Slots newest first; equal timestamps fall back to name order.
pub fn slots_by_age(slots_dir: &Path) -> Result<Vec<SlotEntry>> {
    let mut out = Vec::new();
    for (name, path) in list_dirs(slots_dir)? {
        let modified = fs::metadata(&path)?.modified()?;
        out.push(SlotEntry {
            name,
            path,
            modified,
        });
    }
    out.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
    Ok(out)
}

pub fn nth_newest_slot(slots_dir: &Path, nth: usize) -> Result<SlotEntry> {
    slots_by_age(slots_dir)?
        .into_iter()
        .nth(nth)
        .ok_or_else(|| Error::not_found("nth newest slot", nth.to_string()))
}
