//! The data-object model: type tags, payload variants, and the attribute map.
//!
//! Objects live in an [`ObjectSpace`](crate::space::ObjectSpace) and are
//! shared between modules through [`ObjectHandle`](crate::space::ObjectHandle)s;
//! this module defines what an object *is*, the space defines how it is owned.

pub mod attributes;
pub mod geometry;
pub mod payload;
pub mod set;
pub mod tag;

use std::sync::atomic::AtomicUsize;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

pub use geometry::GeometryData;
pub use payload::{ObjectError, Payload};
pub use set::SetData;
pub use tag::{TagSet, TypeTag};

/// A named, type-tagged data container with an open-ended attribute map.
///
/// The payload is fixed at creation; attributes are interior-mutable and
/// follow last-write-wins semantics. The reference count is managed
/// exclusively by the owning space's handles.
pub struct DataObject {
    name: String,
    payload: Payload,
    attributes: RwLock<FxHashMap<String, String>>,
    pub(crate) refs: AtomicUsize,
}

impl DataObject {
    pub(crate) fn new(name: String, payload: Payload) -> Self {
        Self {
            name,
            payload,
            attributes: RwLock::new(FxHashMap::default()),
            refs: AtomicUsize::new(1),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn tag(&self) -> TypeTag {
        self.payload.tag()
    }

    pub fn is_type(&self, tag: TypeTag) -> bool {
        self.tag() == tag
    }

    /// Append-or-overwrite; the last write for a given key wins.
    pub fn add_attribute(&self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.write().insert(key.into(), value.into());
    }

    /// Bulk append; each entry follows the same overwrite rule.
    pub fn add_attributes<I, K, V>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = self.attributes.write();
        for (key, value) in entries {
            map.insert(key.into(), value.into());
        }
    }

    /// Absent keys yield `None`, never an error.
    pub fn attribute(&self, key: &str) -> Option<String> {
        self.attributes.read().get(key).cloned()
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.read().contains_key(key)
    }

    /// A key-sorted snapshot of the whole attribute map.
    pub fn attributes(&self) -> Vec<(String, String)> {
        let mut entries: Vec<_> = self
            .attributes
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort();
        entries
    }
}

impl std::fmt::Debug for DataObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataObject")
            .field("name", &self.name)
            .field("tag", &self.tag())
            .finish_non_exhaustive()
    }
}
