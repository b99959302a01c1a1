//! Staged directory copies.
//!
//! Every write first lands in a hidden staging directory on the same
//! filesystem and is then renamed into place, so a failure while reading the
//! source never leaves the destination half overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::Result;

/// Staging directory created inside a destination that receives files in place.
pub const STAGING_DIR: &str = ".gsl-staging";

/// What to take from a source tree.
#[derive(Debug, Clone, Default)]
pub struct CopyFilter {
    /// Only files whose name starts with this are taken.
    pub prefix: Option<String>,
    /// Canonical directory paths to leave out, at any depth.
    pub skip_dirs: Vec<PathBuf>,
}

impl CopyFilter {
    fn accepts_file(&self, name: &str) -> bool {
        self.prefix.as_deref().is_none_or(|p| name.starts_with(p))
    }

    fn skips_dir(&self, depth: usize, path: &Path) -> bool {
        // hidden names at the top are staging leftovers, never game data
        let hidden = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with('.'));
        (depth == 1 && hidden) || self.skip_dirs.iter().any(|d| d == path)
    }
}

/// Relative paths of every file `filter` lets through, in name order.
pub fn collect_files(src: &Path, filter: &CopyFilter) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    // walk the canonical form so skip paths compare equal however `src` is spelled
    let src = &fs::canonicalize(src)?;
    let walker = WalkDir::new(src)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && filter.skips_dir(e.depth(), e.path())));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !filter.accepts_file(&name) {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(src) {
            out.push(rel.to_path_buf());
        }
    }
    Ok(out)
}

fn copy_into(src: &Path, files: &[PathBuf], dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;
    for rel in files {
        let from = src.join(rel);
        let to = dst.join(rel);
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("stage {} -> {}", from.display(), to.display());
        fs::copy(&from, &to)?;
    }
    Ok(())
}

fn clear_stale(dir: &Path) -> Result<()> {
    if dir.exists() {
        warn!("removing leftover staging directory {}", dir.display());
        fs::remove_dir_all(dir)?;
    }
    Ok(())
}

/// Replace `dst` with a copy of the filtered contents of `src`.
///
/// `dst` ends up mirroring the source: files only present in the old `dst`
/// are gone afterwards.
pub fn replace_dir(src: &Path, dst: &Path, filter: &CopyFilter) -> Result<usize> {
    let files = collect_files(src, filter)?;
    let parent = dst.parent().unwrap_or(Path::new("."));
    let name = dst
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "slot".to_string());
    let staging = parent.join(format!(".{}.staging", name));
    let old = parent.join(format!(".{}.old", name));
    clear_stale(&staging)?;
    clear_stale(&old)?;

    if let Err(e) = copy_into(src, &files, &staging) {
        let _ = fs::remove_dir_all(&staging);
        return Err(e);
    }
    let replacing = dst.exists();
    if replacing {
        fs::rename(dst, &old)?;
    }
    if let Err(e) = fs::rename(&staging, dst) {
        if replacing {
            let _ = fs::rename(&old, dst);
        }
        return Err(e.into());
    }
    if replacing {
        fs::remove_dir_all(&old)?;
    }
    for rel in &files {
        info!("{} -> {}", src.join(rel).display(), dst.join(rel).display());
    }
    Ok(files.len())
}

/// Copy the filtered contents of `src` over `dst`, overwriting files with
/// the same relative path and leaving every other file in `dst` alone.
pub fn overlay_dir(src: &Path, dst: &Path, filter: &CopyFilter) -> Result<usize> {
    let files = collect_files(src, filter)?;
    let staging = dst.join(STAGING_DIR);
    clear_stale(&staging)?;

    if let Err(e) = copy_into(src, &files, &staging) {
        let _ = fs::remove_dir_all(&staging);
        return Err(e);
    }
    for rel in &files {
        let to = dst.join(rel);
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(staging.join(rel), &to)?;
        info!("{} -> {}", src.join(rel).display(), to.display());
    }
    fs::remove_dir_all(&staging)?;
    Ok(files.len())
}

/// Delete the top-level files of `dir` that `filter` accepts.
pub fn remove_files(dir: &Path, filter: &CopyFilter) -> Result<usize> {
    let mut removed = 0;
    for e in fs::read_dir(dir)? {
        let e = e?;
        if !e.file_type()?.is_file() {
            continue;
        }
        let name = e.file_name();
        if !filter.accepts_file(&name.to_string_lossy()) {
            continue;
        }
        let p = e.path();
        info!("delete: {}", p.display());
        fs::remove_file(&p)?;
        removed += 1;
    }
    Ok(removed)
}
