//! Staged imports
//!
//! A decoded snapshot never touches the live inventory directly. It is held
//! in a [`StagedImport`] until the user either confirms (the inventory is
//! replaced wholesale) or declines (nothing happens).

use super::codec::DecodeError;
use super::link::ShareLink;
use crate::domain::{Inventory, Record, Snapshot};

/// A decoded snapshot awaiting confirmation
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a staged import does nothing until confirmed or discarded"]
pub struct StagedImport {
    snapshot: Snapshot,
}

/// Outcome of a confirmed import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// Records now in the inventory
    pub imported: usize,
    /// Records that were in the inventory before
    pub replaced: usize,
    /// Records dropped because their ID repeated an earlier one
    pub duplicates: usize,
}

impl StagedImport {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Decodes a share link into a staged import
    pub fn from_link(link: &ShareLink) -> Result<Self, DecodeError> {
        Ok(Self::new(link.decode()?))
    }

    /// Records waiting to be imported
    pub fn records(&self) -> &[Record] {
        &self.snapshot
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Replaces the whole inventory with the staged snapshot
    pub fn confirm(self, inventory: &mut Inventory) -> ImportReport {
        let replaced = inventory.len();
        let duplicates = inventory.replace(self.snapshot);
        ImportReport {
            imported: inventory.len(),
            replaced,
            duplicates,
        }
    }

    /// Drops the staged snapshot; the inventory is left untouched
    pub fn discard(self) {}
}
