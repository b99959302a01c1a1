use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::info;

use crate::copy::{self, CopyFilter};
use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::saves::{self, SlotEntry};

/// Copies save files between the current save directory, named slots and the
/// save-file library of one profile.
#[derive(Debug, Clone)]
pub struct SlotManager {
    layout: Layout,
}

impl SlotManager {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn from_current(&self) -> CopyFilter {
        CopyFilter {
            prefix: self.layout.file_prefix.clone(),
            skip_dirs: self.layout.reserved_in_current(),
        }
    }

    fn into_current(&self) -> CopyFilter {
        CopyFilter {
            prefix: self.layout.file_prefix.clone(),
            skip_dirs: Vec::new(),
        }
    }

    fn existing_slot(&self, name: &str) -> Result<PathBuf> {
        saves::validate_slot_name(name)?;
        let dir = self.layout.slot_dir(name);
        if !dir.is_dir() {
            return Err(Error::not_found("slot", name));
        }
        Ok(dir)
    }

    /// Snapshot the current save directory into `Slots/<name>`, replacing any
    /// previous slot of that name.
    pub fn save(&self, name: &str) -> Result<PathBuf> {
        saves::validate_slot_name(name)?;
        if !self.layout.current_dir.is_dir() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!(
                    "cannot read current save directory {}",
                    self.layout.current_dir.display()
                ),
            )));
        }
        fs::create_dir_all(&self.layout.slots_dir)?;
        let dest = self.layout.slot_dir(name);
        let n = copy::replace_dir(&self.layout.current_dir, &dest, &self.from_current())?;
        info!("saved {} file(s) to slot {}", n, name);
        Ok(dest)
    }

    /// `save` into a slot named after the local time. Two calls within the
    /// same second write the same slot.
    pub fn save_dated(&self) -> Result<String> {
        let name = saves::dated_slot_name(Local::now());
        self.save(&name)?;
        Ok(name)
    }

    /// Copy `Slots/<name>` over the current save directory.
    pub fn load(&self, name: &str) -> Result<()> {
        let src = self.existing_slot(name)?;
        self.load_from(&src)?;
        info!("loaded slot {}", name);
        Ok(())
    }

    /// Load the save-file library entry whose name contains `pattern`
    /// (case-insensitive; the greatest name wins a tie). Returns the matched name.
    pub fn load_save_file(&self, pattern: &str) -> Result<String> {
        let (name, src) = saves::find_name_contains(&self.layout.save_files_dir, pattern)?;
        self.load_from(&src)?;
        info!("loaded save file {}", name);
        Ok(name)
    }

    fn load_from(&self, src: &Path) -> Result<usize> {
        fs::create_dir_all(&self.layout.current_dir)?;
        copy::overlay_dir(src, &self.layout.current_dir, &self.into_current())
    }

    /// Delete the save files from the current save directory.
    pub fn clear(&self) -> Result<usize> {
        if !self.layout.current_dir.is_dir() {
            return Ok(0);
        }
        copy::remove_files(&self.layout.current_dir, &self.into_current())
    }

    /// Slots newest first.
    pub fn list(&self) -> Result<Vec<SlotEntry>> {
        saves::slots_by_age(&self.layout.slots_dir)
    }

    /// Load the `nth` newest slot (0 is the newest). Returns its name.
    pub fn load_nth_newest(&self, nth: usize) -> Result<String> {
        let slot = saves::nth_newest_slot(&self.layout.slots_dir, nth)?;
        self.load_from(&slot.path)?;
        info!("loaded slot {}", slot.name);
        Ok(slot.name)
    }

    /// Remove the `nth` newest slot entirely. Returns its name.
    pub fn delete_nth_newest(&self, nth: usize) -> Result<String> {
        let slot = saves::nth_newest_slot(&self.layout.slots_dir, nth)?;
        fs::remove_dir_all(&slot.path)?;
        info!("deleted slot {}", slot.name);
        Ok(slot.name)
    }

    /// Zip `Slots/<name>` next to it. Returns the archive path.
    pub fn archive(&self, name: &str) -> Result<PathBuf> {
        let dir = self.existing_slot(name)?;
        let dest = crate::archive::archive_slot(&dir, Local::now())?;
        info!("archived slot {} to {}", name, dest.display());
        Ok(dest)
    }
}
