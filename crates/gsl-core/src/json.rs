use chrono::{DateTime, Local};
use serde_json::{Value, json};
use walkdir::WalkDir;

use crate::error::Result;
use crate::saves::SlotEntry;

/// Number of regular files below a slot, at any depth. An unreadable entry
/// is an error rather than a smaller count.
pub fn file_count(entry: &SlotEntry) -> Result<usize> {
    let mut n = 0;
    for e in WalkDir::new(&entry.path).min_depth(1) {
        if e?.file_type().is_file() {
            n += 1;
        }
    }
    Ok(n)
}

pub fn modified_local(entry: &SlotEntry) -> DateTime<Local> {
    DateTime::<Local>::from(entry.modified)
}

pub fn slot_to_json(entry: &SlotEntry) -> Result<Value> {
    Ok(json!({
        "name": entry.name,
        "path": entry.path.to_string_lossy(),
        "modified": modified_local(entry).to_rfc3339(),
        "files": file_count(entry)?,
    }))
}

pub fn slots_to_json(entries: &[SlotEntry]) -> Result<Value> {
    entries
        .iter()
        .map(slot_to_json)
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}
