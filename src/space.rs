//! The shared object space: name-keyed ownership of data objects.
//!
//! Every live object is reachable through [`ObjectHandle`]s, which are the
//! only reference-count mutators: cloning a handle is the increment, dropping
//! it is the decrement. When the last handle drops, the object's name is
//! unbound and the object is torn down exactly once. There is no manual
//! counter arithmetic anywhere else in the crate.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::object::{DataObject, GeometryData, Payload, SetData, TypeTag};

#[derive(Debug, Error)]
pub enum SpaceError {
    /// The name is bound to an object of a different kind; same-kind names
    /// are replaced instead.
    #[error("name {name:?} is bound to a {bound} object, cannot rebind it as {requested}")]
    TypeConflict {
        name: String,
        bound: TypeTag,
        requested: TypeTag,
    },

    #[error(transparent)]
    Object(#[from] crate::object::ObjectError),
}

#[derive(Default)]
struct SpaceInner {
    names: RwLock<FxHashMap<String, Arc<DataObject>>>,
    stats: StatCounters,
}

#[derive(Default)]
struct StatCounters {
    created: std::sync::atomic::AtomicUsize,
    destroyed: std::sync::atomic::AtomicUsize,
}

/// Point-in-time counters for the space; used for observability and for
/// asserting destruction happens exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpaceStats {
    pub created: usize,
    pub destroyed: usize,
    pub bound: usize,
}

/// The process-wide namespace of data objects.
///
/// Cheaply clonable; clones share the same namespace. Passed explicitly to
/// whoever needs it rather than living in a global.
#[derive(Clone, Default)]
pub struct ObjectSpace {
    inner: Arc<SpaceInner>,
}

impl ObjectSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to a fresh object and returns the first handle to it.
    ///
    /// A name already bound to an object of the same kind is rebound: the old
    /// object loses its name immediately and is destroyed once its remaining
    /// handles drop. Binding over a different kind is a [`SpaceError::TypeConflict`].
    pub fn create(
        &self,
        name: impl Into<String>,
        payload: Payload,
    ) -> Result<ObjectHandle, SpaceError> {
        let name = name.into();
        let object = Arc::new(DataObject::new(name.clone(), payload));
        let replaced;
        {
            let mut names = self.inner.names.write();
            if let Some(existing) = names.get(&name) {
                if existing.tag() != object.tag() {
                    return Err(SpaceError::TypeConflict {
                        name,
                        bound: existing.tag(),
                        requested: object.tag(),
                    });
                }
            }
            replaced = names.insert(name, object.clone());
            self.inner.stats.created.fetch_add(1, Ordering::Relaxed);
        }
        drop(replaced);
        Ok(ObjectHandle {
            object,
            space: Arc::downgrade(&self.inner),
        })
    }

    /// Shares an object by name. Fails softly (`None`) for unbound names and
    /// for objects whose last handle is concurrently dropping; a dying object
    /// is never resurrected.
    pub fn lookup(&self, name: &str) -> Option<ObjectHandle> {
        let names = self.inner.names.read();
        let object = names.get(name)?;
        let mut count = object.refs.load(Ordering::Relaxed);
        loop {
            if count == 0 {
                return None;
            }
            match object.refs.compare_exchange_weak(
                count,
                count + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    return Some(ObjectHandle {
                        object: object.clone(),
                        space: Arc::downgrade(&self.inner),
                    })
                }
                Err(actual) => count = actual,
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.names.read().contains_key(name)
    }

    /// Explicitly unbinds a name. Live handles keep the object alive; it is
    /// destroyed when the last of them drops. Returns whether a binding
    /// existed.
    pub fn unload(&self, name: &str) -> bool {
        let removed = self.inner.names.write().remove(name);
        removed.is_some()
    }

    /// Deep-copies an object under a new name.
    ///
    /// Attributes are always copied. Set children are recursively cloned
    /// under `"{new_name}_{i+1}"` names; all other payloads are value-copied.
    /// A geometry composite keeps sharing its grid and channel objects with
    /// the source, since those are independently named objects in their own
    /// right.
    pub fn clone_object(
        &self,
        source: &ObjectHandle,
        new_name: impl Into<String>,
    ) -> Result<ObjectHandle, SpaceError> {
        let new_name = new_name.into();
        let payload = match source.payload() {
            Payload::Set(set) => {
                let mut children = Vec::with_capacity(set.len());
                for (index, child) in set.children().iter().enumerate() {
                    children.push(self.clone_object(child, format!("{}_{}", new_name, index + 1))?);
                }
                Payload::Set(SetData::new(children))
            }
            other => other.clone(),
        };
        let copy = self.create(new_name, payload)?;
        copy.add_attributes(source.attributes());
        Ok(copy)
    }

    pub fn stats(&self) -> SpaceStats {
        SpaceStats {
            created: self.inner.stats.created.load(Ordering::Relaxed),
            destroyed: self.inner.stats.destroyed.load(Ordering::Relaxed),
            bound: self.inner.names.read().len(),
        }
    }
}

impl SpaceInner {
    /// Called when a handle observes the count reaching zero: unbind the name
    /// if this object is still the current binding, then count the teardown.
    /// The removed binding is dropped outside the lock so that cascaded
    /// releases of set children do not re-enter it.
    fn release(&self, object: &Arc<DataObject>) {
        let removed = {
            let mut names = self.names.write();
            match names.get(object.name()) {
                Some(bound) if Arc::ptr_eq(bound, object) => names.remove(object.name()),
                _ => None,
            }
        };
        self.stats.destroyed.fetch_add(1, Ordering::Relaxed);
        drop(removed);
    }
}

/// A shared-ownership handle to a [`DataObject`].
///
/// Cloning increments the object's reference count, dropping decrements it;
/// the object is destroyed when the count reaches zero. The handle derefs to
/// the object, so attribute and payload accessors are available directly.
pub struct ObjectHandle {
    object: Arc<DataObject>,
    space: Weak<SpaceInner>,
}

impl ObjectHandle {
    /// The current reference count; inspection only.
    pub fn ref_count(&self) -> usize {
        self.object.refs.load(Ordering::Relaxed)
    }

    /// The set payload, if this object is a set.
    pub fn as_set(&self) -> Option<&SetData> {
        match self.payload() {
            Payload::Set(set) => Some(set),
            _ => None,
        }
    }

    /// The geometry payload, if this object is a composite.
    pub fn as_geometry(&self) -> Option<&GeometryData> {
        match self.payload() {
            Payload::Geometry(geometry) => Some(geometry),
            _ => None,
        }
    }
}

impl std::ops::Deref for ObjectHandle {
    type Target = DataObject;

    fn deref(&self) -> &DataObject {
        &self.object
    }
}

impl Clone for ObjectHandle {
    fn clone(&self) -> Self {
        self.object.refs.fetch_add(1, Ordering::Relaxed);
        Self {
            object: self.object.clone(),
            space: self.space.clone(),
        }
    }
}

impl Drop for ObjectHandle {
    fn drop(&mut self) {
        if self.object.refs.fetch_sub(1, Ordering::AcqRel) == 1 {
            if let Some(space) = self.space.upgrade() {
                space.release(&self.object);
            }
        }
    }
}

impl std::fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectHandle")
            .field("name", &self.name())
            .field("tag", &self.tag())
            .field("refs", &self.ref_count())
            .finish()
    }
}
