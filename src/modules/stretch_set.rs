//! Stretch data in transient datasets: repeat every timestep of a set a
//! fixed number of times and relabel the timestep range.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::module::{
    ComputeError, Module, ModuleContext, ModuleInfo, ModuleKind, MODULE_KINDS,
};
use crate::object::attributes::{format_timestep, ATTR_TIMESTEP};
use crate::object::{Payload, SetData, TagSet, TypeTag};
use crate::port::{InputPort, OutputPort};

/// Number of independent data channels; input and output ports pair up by
/// index.
pub const MAX_DATA_PORTS: usize = 8;

/// Parameters of the [`StretchSet`] module.
#[derive(Clone, Debug, Serialize, Deserialize, Builder)]
#[builder(default)]
pub struct StretchParams {
    /// Factor by which the dataset is extended; values below 1 clamp to 1.
    pub factor: i64,
}

impl Default for StretchParams {
    fn default() -> Self {
        Self { factor: 1 }
    }
}

pub struct StretchSet {
    info: ModuleInfo,
    params: StretchParams,
    inputs: Vec<InputPort>,
    outputs: Vec<OutputPort>,
}

impl StretchSet {
    pub fn new(params: StretchParams) -> Self {
        let info = ModuleInfo::new("StretchSet");
        let mut inputs = Vec::with_capacity(MAX_DATA_PORTS);
        let mut outputs = Vec::with_capacity(MAX_DATA_PORTS);
        for index in 0..MAX_DATA_PORTS {
            let input_name = format!("input_{}", index);
            inputs.push(InputPort::new(&input_name, TagSet::all(), "data set").optional());
            outputs.push(
                OutputPort::new(&info, format!("output_{}", index), TagSet::all(), "data set")
                    .with_dependency(input_name),
            );
        }
        Self {
            info,
            params,
            inputs,
            outputs,
        }
    }

    pub fn params(&self) -> &StretchParams {
        &self.params
    }

    pub fn set_params(&mut self, params: StretchParams) {
        self.params = params;
    }
}

impl Default for StretchSet {
    fn default() -> Self {
        Self::new(StretchParams::default())
    }
}

impl Module for StretchSet {
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
        let factor = self.params.factor.max(1) as usize;
        for channel in 0..MAX_DATA_PORTS {
            let Some(input) = self.inputs[channel].current() else {
                continue;
            };
            let Some(set) = input.as_set() else {
                // Anything but a set on a connected channel is a structural
                // fault that halts the whole pipeline.
                return Err(ComputeError::WrongInputType {
                    port: self.inputs[channel].spec().name().to_string(),
                    expected: TypeTag::Set.to_string(),
                    found: input.tag(),
                });
            };

            let steps = set.children();
            if steps.is_empty() {
                // Degenerate but well-formed: publish an empty set so that
                // downstream ports are never left unset.
                ctx.reporter().warning(format!(
                    "received an empty set at port {:?}",
                    self.inputs[channel].spec().name()
                ));
                let empty = ctx
                    .space()
                    .create(self.outputs[channel].object_name(), Payload::Set(SetData::new(vec![])))?;
                empty.add_attribute(ATTR_TIMESTEP, format_timestep(1, 0));
                self.outputs[channel].publish(empty)?;
                continue;
            }

            let mut stretched = Vec::with_capacity(steps.len() * factor);
            for step in steps {
                for _ in 0..factor {
                    stretched.push(step.clone());
                }
            }
            let total = stretched.len();

            let result = ctx
                .space()
                .create(self.outputs[channel].object_name(), Payload::Set(SetData::new(stretched)))?;
            result.add_attribute(ATTR_TIMESTEP, format_timestep(1, total));
            self.outputs[channel].publish(result)?;
        }
        Ok(())
    }
}

fn instantiate() -> Box<dyn Module> {
    Box::<StretchSet>::default()
}

#[linkme::distributed_slice(MODULE_KINDS)]
static STRETCH_SET_KIND: ModuleKind = ModuleKind {
    name: "StretchSet",
    category: "Filter",
    description: "Stretch data in transient datasets",
    instantiate,
};
