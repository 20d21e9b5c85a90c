//! The module execution contract.
//!
//! A module declares its ports once at construction and implements a
//! single-shot, synchronous [`Module::compute`]. The framework wraps each
//! invocation in [`execute`], which validates required inputs, maps errors to
//! a [`ComputeStatus`] for the scheduler, and routes diagnostics.

use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use crate::diagnostics::{Reporter, SinkFlavor};
use crate::object::{ObjectError, TypeTag};
use crate::port::{InputPort, OutputPort, PortError};
use crate::space::{ObjectSpace, SpaceError};

static MODULE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Identity of one module instance: kind name, unique id, and a user-visible
/// title. The title defaults to `"{name}_{id}"`; anything else is treated as
/// user-chosen.
#[derive(Clone, Debug)]
pub struct ModuleInfo {
    name: String,
    id: usize,
    title: String,
}

impl ModuleInfo {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let id = MODULE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let title = format!("{}_{}", name, id);
        Self { name, id, title }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// `"{name}_{id}"`; the prefix for output object names.
    pub fn instance_name(&self) -> String {
        format!("{}_{}", self.name, self.id)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Whether the title still has the auto-generated `"{name}_{id}"` shape.
    pub fn title_is_default(&self) -> bool {
        self.title == self.instance_name()
    }
}

/// Completion status handed to the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComputeStatus {
    /// Expected outputs were published; the pipeline continues.
    Success,
    /// This module's outputs are invalid; this branch is stale.
    Fail,
    /// Fatal, non-recoverable; the whole pipeline run halts.
    StopPipeline,
}

impl std::fmt::Display for ComputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComputeStatus::Success => f.write_str("SUCCESS"),
            ComputeStatus::Fail => f.write_str("FAIL"),
            ComputeStatus::StopPipeline => f.write_str("STOP_PIPELINE"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("required input port {0:?} has no current object")]
    MissingInput(String),

    #[error("{0}")]
    Validation(String),

    /// A structural hard stop: the wrong kind of object arrived on a port
    /// that the module cannot work without. Halts the whole pipeline.
    #[error("did not receive a {expected} object at port {port:?}, got a {found}")]
    WrongInputType {
        port: String,
        expected: String,
        found: TypeTag,
    },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("could not create output object: {0}")]
    Space(#[from] SpaceError),

    #[error("could not create output object: {0}")]
    Object(#[from] ObjectError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ComputeError {
    pub fn status(&self) -> ComputeStatus {
        match self {
            ComputeError::WrongInputType { .. } => ComputeStatus::StopPipeline,
            _ => ComputeStatus::Fail,
        }
    }
}

/// Everything a compute step may touch besides its own ports: the shared
/// object space and a reporter bound to this module's title.
pub struct ModuleContext {
    space: ObjectSpace,
    reporter: Reporter,
}

impl ModuleContext {
    pub fn new(space: ObjectSpace, reporter: Reporter) -> Self {
        Self { space, reporter }
    }

    pub fn space(&self) -> &ObjectSpace {
        &self.space
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }
}

/// A unit of computation with declared ports.
///
/// `compute` runs synchronously to completion; required inputs are guaranteed
/// present when it is invoked through [`execute`]. No reentrancy: only one
/// invocation per instance is in flight at a time.
pub trait Module: Send {
    fn info(&self) -> &ModuleInfo;
    fn info_mut(&mut self) -> &mut ModuleInfo;

    fn inputs(&self) -> &[InputPort];
    fn inputs_mut(&mut self) -> &mut [InputPort];
    fn outputs(&self) -> &[OutputPort];

    fn compute(&mut self, ctx: &ModuleContext) -> Result<(), ComputeError>;

    fn input(&self, name: &str) -> Option<&InputPort> {
        self.inputs().iter().find(|port| port.spec().name() == name)
    }

    fn input_mut(&mut self, name: &str) -> Option<&mut InputPort> {
        self.inputs_mut()
            .iter_mut()
            .find(|port| port.spec().name() == name)
    }

    fn output(&self, name: &str) -> Option<&OutputPort> {
        self.outputs().iter().find(|port| port.spec().name() == name)
    }
}

/// Runs one compute step: validates required inputs, invokes the module, and
/// maps the outcome to a status. Fatal errors are double-reported so they
/// show up in both interactive and log-only sinks.
pub fn execute(module: &mut dyn Module, space: &ObjectSpace, sink: &SinkFlavor) -> ComputeStatus {
    let reporter = Reporter::new(sink.clone(), module.info().title().to_string());
    for input in module.inputs() {
        if input.is_required() && input.current().is_none() {
            let err = ComputeError::MissingInput(input.spec().name().to_string());
            reporter.error(err.to_string());
            return ComputeStatus::Fail;
        }
    }
    let ctx = ModuleContext::new(space.clone(), reporter.clone());
    match module.compute(&ctx) {
        Ok(()) => ComputeStatus::Success,
        Err(err) => {
            let status = err.status();
            if status == ComputeStatus::StopPipeline {
                reporter.fatal(err.to_string());
            } else {
                reporter.error(err.to_string());
            }
            status
        }
    }
}

/// A named module factory, registered at link time.
pub struct ModuleKind {
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub instantiate: fn() -> Box<dyn Module>,
}

/// The registry of all linked module kinds.
#[linkme::distributed_slice]
pub static MODULE_KINDS: [ModuleKind] = [..];

pub fn module_kinds() -> impl Iterator<Item = &'static ModuleKind> {
    MODULE_KINDS.iter()
}

pub fn find_module_kind(name: &str) -> Option<&'static ModuleKind> {
    MODULE_KINDS.iter().find(|kind| kind.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{MemorySink, Severity};
    use crate::object::{Payload, TagSet};
    use ndarray::Array1;

    struct Passthrough {
        info: ModuleInfo,
        inputs: Vec<InputPort>,
        outputs: Vec<OutputPort>,
    }

    impl Passthrough {
        fn new() -> Self {
            let info = ModuleInfo::new("Passthrough");
            let outputs = vec![OutputPort::new(&info, "Out0", TagSet::all(), "copy")
                .with_dependency("In0")];
            Self {
                info,
                inputs: vec![InputPort::new("In0", TagSet::all(), "anything")],
                outputs,
            }
        }
    }

    impl Module for Passthrough {
        fn info(&self) -> &ModuleInfo {
            &self.info
        }
        fn info_mut(&mut self) -> &mut ModuleInfo {
            &mut self.info
        }
        fn inputs(&self) -> &[InputPort] {
            &self.inputs
        }
        fn inputs_mut(&mut self) -> &mut [InputPort] {
            &mut self.inputs
        }
        fn outputs(&self) -> &[OutputPort] {
            &self.outputs
        }
        fn compute(&mut self, _ctx: &ModuleContext) -> Result<(), ComputeError> {
            let current = self.inputs[0]
                .current()
                .ok_or_else(|| ComputeError::MissingInput("In0".into()))?;
            self.outputs[0].publish(current)?;
            Ok(())
        }
    }

    #[test]
    fn missing_required_input_fails_before_compute() {
        let space = ObjectSpace::new();
        let sink = MemorySink::new();
        let mut module = Passthrough::new();
        let status = execute(&mut module, &space, &sink.clone().into());
        assert_eq!(status, ComputeStatus::Fail);
        assert_eq!(sink.messages().len(), 1);
        assert_eq!(sink.messages()[0].severity, Severity::Error);
        assert!(module.outputs()[0].current().is_none());
    }

    #[test]
    fn successful_compute_publishes() {
        let space = ObjectSpace::new();
        let sink = MemorySink::new();
        let mut module = Passthrough::new();
        let field = space
            .create("field", Payload::Float(Array1::zeros(4)))
            .unwrap();
        module.inputs()[0].feed(field).unwrap();
        let status = execute(&mut module, &space, &sink.clone().into());
        assert_eq!(status, ComputeStatus::Success);
        assert!(module.outputs()[0].current().is_some());
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn titles_default_to_the_instance_name() {
        let mut info = ModuleInfo::new("Collect");
        assert!(info.title_is_default());
        assert_eq!(info.title(), &info.instance_name());
        info.set_title("my geometry");
        assert!(!info.title_is_default());
    }

    #[test]
    fn wrong_input_type_is_a_pipeline_stop() {
        let err = ComputeError::WrongInputType {
            port: "input_0".into(),
            expected: "Set".into(),
            found: TypeTag::Float,
        };
        assert_eq!(err.status(), ComputeStatus::StopPipeline);
        assert_eq!(
            ComputeError::Validation("no grid".into()).status(),
            ComputeStatus::Fail
        );
    }
}
