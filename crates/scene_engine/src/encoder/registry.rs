//! Id to file-offset registry
//!
//! Populated strictly in write order, one entry per object whose envelope
//! has been completely written. A lookup for an id that is absent means
//! "not written (yet)"; that is never conflated with a valid offset of 0.

use std::collections::HashMap;

use super::error::{EncodeError, EncodeResult};
use super::object::TypeId;

/// One resolved object location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    /// Object id
    pub id: String,
    /// Object type tag
    pub type_id: TypeId,
    /// Envelope offset
    pub offset: u32,
}

/// Mapping from object id to written envelope offset
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    entries: Vec<ReferenceEntry>,
    index: HashMap<String, usize>,
}

impl ObjectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a written object
    ///
    /// Duplicate ids are rejected and leave the registry unchanged.
    pub fn register(&mut self, id: &str, type_id: TypeId, offset: u32) -> EncodeResult<()> {
        if self.index.contains_key(id) {
            return Err(EncodeError::DuplicateId(id.to_string()));
        }
        self.index.insert(id.to_string(), self.entries.len());
        self.entries.push(ReferenceEntry {
            id: id.to_string(),
            type_id,
            offset,
        });
        Ok(())
    }

    /// Offset of a written object, `None` if it has not been written
    pub fn resolve(&self, id: &str) -> Option<u32> {
        self.entry(id).map(|entry| entry.offset)
    }

    /// Full entry for a written object
    pub fn entry(&self, id: &str) -> Option<&ReferenceEntry> {
        self.index.get(id).map(|&slot| &self.entries[slot])
    }

    /// Whether an object with this id has been written
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Entries in write order
    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
