//! gsl-core: GTA V save slot management
//!
//! This crate keeps a small surface:
//! - Profile and directory layout resolution (no global state)
//! - Staged copies between the current save directory and slots
//! - Slot listing, dated saves, save-file library lookup and zip backup
//!
pub mod archive;
pub mod copy;
pub mod error;
pub mod json;
pub mod layout;
pub mod saves;
pub mod slots;

pub use error::{Error, Result};
pub use layout::{Layout, documents_dir, profiles_root, resolve_profile};
pub use saves::SlotEntry;
pub use slots::SlotManager;
