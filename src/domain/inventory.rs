//! In-memory inventory
//!
//! The inventory owns the current snapshot and the actor registry. Update and
//! delete are checked against the permission model; a denied or unknown
//! target is a silent no-op reported as `false`/`None`, never an error.

use std::collections::HashSet;

use chrono::Utc;

use super::actor::{Actor, ActorRegistry};
use super::id::RecordId;
use super::record::{Record, RecordFields, RecordPatch, ValidationError};

/// The complete ordered list of records at one instant
pub type Snapshot = Vec<Record>;

/// Ordered collection of records with permission-checked mutations
#[derive(Debug, Clone)]
pub struct Inventory {
    records: Snapshot,
    actors: ActorRegistry,
}

impl Inventory {
    /// Creates an inventory from a stored snapshot
    pub fn new(actors: ActorRegistry, snapshot: Snapshot) -> Self {
        let mut inventory = Self {
            records: Vec::new(),
            actors,
        };
        inventory.replace(snapshot);
        inventory
    }

    pub fn empty(actors: ActorRegistry) -> Self {
        Self::new(actors, Vec::new())
    }

    pub fn actors(&self) -> &ActorRegistry {
        &self.actors
    }

    /// Records in insertion order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Returns true if `actor` may update or delete the record
    pub fn can_mutate(&self, actor: &Actor, record: &Record) -> bool {
        self.actors.can_mutate(actor, record)
    }

    /// Creates a record owned by `actor` and appends it
    pub fn create(&mut self, actor: &Actor, fields: RecordFields) -> Result<&Record, ValidationError> {
        let mut id = RecordId::generate(&fields.name, Utc::now());
        while self.get(&id).is_some() {
            id = RecordId::generate(&fields.name, Utc::now());
        }

        let record = Record::new(id, actor.id.clone(), fields)?;
        self.records.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    /// Merges `patch` into the record.
    ///
    /// Returns `Ok(false)` when the record does not exist or `actor` may not
    /// change it. Validation errors are reported before the permission check.
    pub fn update(
        &mut self,
        actor: &Actor,
        id: &RecordId,
        patch: RecordPatch,
    ) -> Result<bool, ValidationError> {
        patch.validate()?;

        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        if !self.actors.can_mutate(actor, &self.records[index]) {
            return Ok(false);
        }

        self.records[index].apply_patch(patch)?;
        Ok(true)
    }

    /// Removes the record, returning it if `actor` was allowed to
    pub fn delete(&mut self, actor: &Actor, id: &RecordId) -> Option<Record> {
        let index = self.position(id)?;
        if !self.actors.can_mutate(actor, &self.records[index]) {
            return None;
        }
        Some(self.records.remove(index))
    }

    /// Replaces the whole snapshot without permission checks.
    ///
    /// Only the import flow calls this. Records repeating an earlier ID are
    /// dropped so IDs stay unique.
    pub fn replace(&mut self, snapshot: Snapshot) -> usize {
        let mut seen = HashSet::new();
        let before = snapshot.len();
        self.records = snapshot
            .into_iter()
            .filter(|r| seen.insert(r.id.clone()))
            .collect();
        before - self.records.len()
    }

    /// Consumes the inventory, returning its snapshot
    pub fn into_snapshot(self) -> Snapshot {
        self.records
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|r| &r.id == id)
    }
}
