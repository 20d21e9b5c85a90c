use crate::module::{ComputeError, Module, ModuleContext, ModuleInfo};
use crate::object::TagSet;
use crate::port::{InputPort, OutputPort};
use crate::space::{ObjectHandle, ObjectSpace};

type Producer = dyn FnMut(&ObjectSpace, &str) -> anyhow::Result<ObjectHandle> + Send;

/// Publishes whatever its closure produces; the head end of a test pipeline.
///
/// The closure receives the space and the output port's object name and
/// returns the handle to publish. It runs once per compute step, so reruns
/// produce fresh objects.
pub struct Source {
    info: ModuleInfo,
    outputs: Vec<OutputPort>,
    inputs: Vec<InputPort>,
    producer: Box<Producer>,
}

impl Source {
    pub fn new<F>(accepts: TagSet, producer: F) -> Self
    where
        F: FnMut(&ObjectSpace, &str) -> anyhow::Result<ObjectHandle> + Send + 'static,
    {
        let info = ModuleInfo::new("Source");
        let outputs = vec![OutputPort::new(&info, "Out0", accepts, "generated object")];
        Self {
            info,
            outputs,
            inputs: vec![],
            producer: Box::new(producer),
        }
    }
}

impl Module for Source {
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

    fn compute(&mut self, ctx: &ModuleContext) -> Result<(), ComputeError> {
        let object = (self.producer)(ctx.space(), self.outputs[0].object_name())?;
        self.outputs[0].publish(object)?;
        Ok(())
    }
}
