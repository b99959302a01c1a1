//! Zip snapshots of slot directories. The slot itself is left as it is.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};

pub const ARCHIVE_STAMP: &str = "%Y%m%d-%H%M%S";

/// `<slot>_<stamp>.zip`, placed beside the slot.
pub fn archive_path(slot: &Path, when: DateTime<Local>) -> PathBuf {
    let name = slot
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "slot".to_string());
    let stamp = when.format(ARCHIVE_STAMP);
    slot.with_file_name(format!("{}_{}.zip", name, stamp))
}

/// Write every file and directory below `slot` into a deflated zip and
/// return where it went.
pub fn archive_slot(slot: &Path, when: DateTime<Local>) -> Result<PathBuf> {
    if !slot.is_dir() {
        return Err(Error::not_found("slot directory", slot.display().to_string()));
    }
    let dest = archive_path(slot, when);
    let mut zip = ZipWriter::new(File::create(&dest)?);
    let opts = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for entry in WalkDir::new(slot).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(slot) else {
            continue;
        };
        // zip entry names always use forward slashes
        let entry_name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if entry.file_type().is_dir() {
            zip.add_directory(entry_name, opts)?;
            continue;
        }
        zip.start_file(entry_name, opts)?;
        zip.write_all(&fs::read(entry.path())?)?;
    }
    zip.finish()?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Read;

    #[test]
    fn archive_name_uses_slot_and_stamp() {
        let when = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            archive_path(Path::new("/p/Slots/heist"), when),
            PathBuf::from("/p/Slots/heist_20250102-030405.zip")
        );
    }

    #[test]
    fn archive_contains_nested_files() {
        let d = tempfile::tempdir().unwrap();
        let slot = d.path().join("heist");
        fs::create_dir_all(slot.join("sub")).unwrap();
        fs::write(slot.join("SGTA50000"), b"save").unwrap();
        fs::write(slot.join("sub/SGTA50001"), b"more").unwrap();

        let zip_path = archive_slot(&slot, Local::now()).unwrap();
        assert_eq!(zip_path.parent(), Some(d.path()));

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut body = String::new();
        archive
            .by_name("sub/SGTA50001")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "more");
    }

    #[test]
    fn archive_rejects_missing_dir() {
        let d = tempfile::tempdir().unwrap();
        assert!(
            archive_slot(&d.path().join("gone"), Local::now())
                .unwrap_err()
                .is_not_found()
        );
    }
}
