use std::sync::Arc;

use parking_lot::Mutex;

use crate::module::{ComputeError, Module, ModuleContext, ModuleInfo};
use crate::object::TagSet;
use crate::port::{InputPort, OutputPort};
use crate::space::ObjectHandle;

/// Captures every object that arrives on its input; the tail end of a test
/// pipeline. The captured handles stay alive until the probe is dropped or
/// [`ProbeCapture::take`] is called.
pub struct Probe {
    info: ModuleInfo,
    inputs: Vec<InputPort>,
    outputs: Vec<OutputPort>,
    captured: ProbeCapture,
}

/// Shared view into a probe's captured objects.
#[derive(Clone, Default)]
pub struct ProbeCapture {
    objects: Arc<Mutex<Vec<ObjectHandle>>>,
}

impl ProbeCapture {
    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }

    pub fn last(&self) -> Option<ObjectHandle> {
        self.objects.lock().last().cloned()
    }

    pub fn take(&self) -> Vec<ObjectHandle> {
        std::mem::take(&mut self.objects.lock())
    }
}

impl Probe {
    pub fn new(accepts: TagSet) -> Self {
        let info = ModuleInfo::new("Probe");
        Self {
            info,
            inputs: vec![InputPort::new("In0", accepts, "probed object")],
            outputs: vec![],
            captured: ProbeCapture::default(),
        }
    }

    /// A probe whose input may be left dangling.
    pub fn optional(mut self) -> Self {
        let input = self.inputs.remove(0);
        self.inputs.push(input.optional());
        self
    }

    pub fn capture(&self) -> ProbeCapture {
        self.captured.clone()
    }
}

impl Module for Probe {
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
        if let Some(object) = self.inputs[0].current() {
            self.captured.objects.lock().push(object);
        }
        Ok(())
    }
}
