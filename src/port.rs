//! Typed connection points between modules.
//!
//! An output port and the input ports connected to it share a single
//! current-object slot, so publishing on the output is immediately visible to
//! every connected input. A port holds at most one current object; publishing
//! replaces the previous one.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::module::ModuleInfo;
use crate::object::{TagSet, TypeTag};
use crate::space::ObjectHandle;

#[derive(Debug, Error)]
pub enum PortError {
    #[error("cannot connect {output:?} ({output_accepts}) to {input:?} ({input_accepts}): no common type")]
    Incompatible {
        output: String,
        output_accepts: String,
        input: String,
        input_accepts: String,
    },

    #[error("port {port:?} accepts {accepts} but was handed a {offered} object")]
    Rejected {
        port: String,
        accepts: String,
        offered: TypeTag,
    },

    #[error("module has no port named {0:?}")]
    NoSuchPort(String),
}

/// Name, description, and accepted-type predicate shared by both port kinds.
#[derive(Clone, Debug)]
pub struct PortSpec {
    name: String,
    description: String,
    accepts: TagSet,
}

impl PortSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn accepts(&self) -> TagSet {
        self.accepts
    }
}

type Slot = Arc<Mutex<Option<ObjectHandle>>>;

/// A module's receiving side. Required by default; [`InputPort::optional`]
/// relaxes that for inputs a module can do without.
pub struct InputPort {
    spec: PortSpec,
    required: bool,
    slot: Slot,
    connected: bool,
}

impl InputPort {
    pub fn new(name: impl Into<String>, accepts: TagSet, description: impl Into<String>) -> Self {
        Self {
            spec: PortSpec {
                name: name.into(),
                description: description.into(),
                accepts,
            },
            required: true,
            slot: Default::default(),
            connected: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn spec(&self) -> &PortSpec {
        &self.spec
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// The object currently visible on this port, retained for the caller.
    pub fn current(&self) -> Option<ObjectHandle> {
        self.slot.lock().clone()
    }

    /// Attaches this input to an upstream output's slot.
    pub fn connect_to(&mut self, output: &OutputPort) -> Result<(), PortError> {
        if (self.spec.accepts & output.spec.accepts).is_empty() {
            return Err(PortError::Incompatible {
                output: output.spec.name.clone(),
                output_accepts: output.spec.accepts.describe(),
                input: self.spec.name.clone(),
                input_accepts: self.spec.accepts.describe(),
            });
        }
        self.slot = output.slot.clone();
        self.connected = true;
        Ok(())
    }

    /// Places an object on the port directly, bypassing any connection; used
    /// by external collaborators and tests.
    pub fn feed(&self, object: ObjectHandle) -> Result<(), PortError> {
        if !self.spec.accepts.accepts(object.tag()) {
            return Err(PortError::Rejected {
                port: self.spec.name.clone(),
                accepts: self.spec.accepts.describe(),
                offered: object.tag(),
            });
        }
        *self.slot.lock() = Some(object);
        Ok(())
    }
}

/// A module's publishing side. Owns the object name under which results are
/// created (`"{Module}_{id}_{Port}"`) and, optionally, the name of the input
/// port its recomputation depends on.
pub struct OutputPort {
    spec: PortSpec,
    object_name: String,
    dependency: Option<String>,
    slot: Slot,
}

impl OutputPort {
    pub fn new(
        info: &ModuleInfo,
        name: impl Into<String>,
        accepts: TagSet,
        description: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            object_name: format!("{}_{}", info.instance_name(), name),
            spec: PortSpec {
                name,
                description: description.into(),
                accepts,
            },
            dependency: None,
            slot: Default::default(),
        }
    }

    /// Declares that this output must be recomputed whenever the named input
    /// changes; re-trigger metadata for schedulers.
    pub fn with_dependency(mut self, input_name: impl Into<String>) -> Self {
        self.dependency = Some(input_name.into());
        self
    }

    pub fn spec(&self) -> &PortSpec {
        &self.spec
    }

    pub fn dependency(&self) -> Option<&str> {
        self.dependency.as_deref()
    }

    /// The name new result objects should be created under.
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn current(&self) -> Option<ObjectHandle> {
        self.slot.lock().clone()
    }

    /// Publishes a result, replacing any previous current object.
    pub fn publish(&self, object: ObjectHandle) -> Result<(), PortError> {
        if !self.spec.accepts.accepts(object.tag()) {
            return Err(PortError::Rejected {
                port: self.spec.name.clone(),
                accepts: self.spec.accepts.describe(),
                offered: object.tag(),
            });
        }
        *self.slot.lock() = Some(object);
        Ok(())
    }

    /// Drops the current object; downstream inputs see an empty port.
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }
}
