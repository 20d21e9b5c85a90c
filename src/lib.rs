//! A dataflow module execution core for scientific visualization pipelines.
//!
//! Data objects are typed, reference-counted, and live in a shared,
//! name-keyed [`space::ObjectSpace`]. Modules receive objects on typed input
//! ports, transform them, and publish results on output ports under a
//! compute-on-demand contract; an external scheduler (or the bundled
//! [`pipeline::Pipeline`] reference runner) decides when each step fires.

pub mod diagnostics;
pub mod module;
pub mod modules;
pub mod object;
pub mod pipeline;
pub mod port;
pub mod space;
pub mod utility_modules;

// Re-exports the common pieces needed to write a module.
pub mod module_tools {
    pub use crate::diagnostics::{Reporter, Severity, SinkFlavor};
    pub use crate::module::{
        execute, ComputeError, ComputeStatus, Module, ModuleContext, ModuleInfo,
    };
    pub use crate::object::{Payload, SetData, TagSet, TypeTag};
    pub use crate::port::{InputPort, OutputPort};
    pub use crate::space::{ObjectHandle, ObjectSpace};
}
