//! A minimal single-threaded reference runner.
//!
//! Real deployments drive modules from an external scheduler; this runner
//! exists so that module graphs can be wired, validated and executed
//! end-to-end inside one process. Modules run in topological order; a
//! `StopPipeline` status halts the whole run.

#[cfg(feature = "dot")]
mod dot;

use derive_builder::Builder;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use crate::diagnostics::SinkFlavor;
use crate::module::{execute, ComputeStatus, Module};
use crate::port::PortError;
use crate::space::ObjectSpace;

/// Identifies a module within one [`Pipeline`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModuleId(usize);

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline has no module with id {0:?}")]
    NoSuchModule(ModuleId),

    #[error("module {0:?} participates in a cycle")]
    Cycle(String),

    #[error("required input {port:?} of module {module:?} is neither connected nor fed")]
    UnconnectedInput { module: String, port: String },

    #[error(transparent)]
    Port(#[from] PortError),
}

struct Connection {
    source: ModuleId,
    output: String,
    target: ModuleId,
    input: String,
}

/// Outcome of a single module's compute step within a run.
#[derive(Clone, Debug)]
pub struct RunRecord {
    pub module: String,
    pub status: ComputeStatus,
}

/// Outcome of a whole run.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub records: Vec<RunRecord>,
    pub halted: bool,
}

impl RunSummary {
    pub fn passed(&self) -> bool {
        !self.halted
            && self
                .records
                .iter()
                .all(|record| record.status == ComputeStatus::Success)
    }

    pub fn dump_failures(&self) {
        for record in &self.records {
            if record.status != ComputeStatus::Success {
                eprintln!("{}: {}", record.module, record.status);
            }
        }
        if self.halted {
            eprintln!("pipeline halted");
        }
    }
}

#[derive(Clone, Debug, Default, Builder)]
#[builder(default)]
pub struct RunOptions {
    /// Stop at the first `Fail` instead of continuing independent branches.
    pub stop_on_fail: bool,
}

/// A wiring of modules over one shared object space.
pub struct Pipeline {
    space: ObjectSpace,
    sink: SinkFlavor,
    modules: Vec<Box<dyn Module>>,
    connections: Vec<Connection>,
}

impl Pipeline {
    pub fn new(space: ObjectSpace) -> Self {
        Self {
            space,
            sink: SinkFlavor::default(),
            modules: vec![],
            connections: vec![],
        }
    }

    pub fn with_sink(mut self, sink: SinkFlavor) -> Self {
        self.sink = sink;
        self
    }

    pub fn space(&self) -> &ObjectSpace {
        &self.space
    }

    pub fn add_module(&mut self, module: impl Module + 'static) -> ModuleId {
        self.add_boxed(Box::new(module))
    }

    /// Adds an already-boxed module, e.g. one produced by the registry.
    pub fn add_boxed(&mut self, module: Box<dyn Module>) -> ModuleId {
        self.modules.push(module);
        ModuleId(self.modules.len() - 1)
    }

    pub fn module(&self, id: ModuleId) -> Option<&dyn Module> {
        self.modules.get(id.0).map(|module| module.as_ref())
    }

    pub fn module_mut(&mut self, id: ModuleId) -> Option<&mut (dyn Module + 'static)> {
        self.modules.get_mut(id.0).map(|module| module.as_mut())
    }

    /// Wires `source`'s output port to `target`'s input port. The accepted
    /// type sets must overlap; self-edges are rejected outright.
    pub fn connect(
        &mut self,
        source: ModuleId,
        output: &str,
        target: ModuleId,
        input: &str,
    ) -> Result<(), PipelineError> {
        if source.0 >= self.modules.len() {
            return Err(PipelineError::NoSuchModule(source));
        }
        if target.0 >= self.modules.len() {
            return Err(PipelineError::NoSuchModule(target));
        }
        if source == target {
            return Err(PipelineError::Cycle(
                self.modules[source.0].info().title().to_string(),
            ));
        }

        let split = source.0.max(target.0);
        let (low, high) = self.modules.split_at_mut(split);
        let (source_module, target_module) = if source.0 < target.0 {
            (&*low[source.0], &mut high[0])
        } else {
            (&*high[0], &mut low[target.0])
        };

        let output_port = source_module
            .output(output)
            .ok_or_else(|| PortError::NoSuchPort(output.to_string()))?;
        let input_port = target_module
            .input_mut(input)
            .ok_or_else(|| PortError::NoSuchPort(input.to_string()))?;
        input_port.connect_to(output_port)?;

        self.connections.push(Connection {
            source,
            output: output.to_string(),
            target,
            input: input.to_string(),
        });
        Ok(())
    }

    /// Topological execution order; fails on cycles.
    fn order(&self) -> Result<Vec<usize>, PipelineError> {
        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> =
            (0..self.modules.len()).map(|i| graph.add_node(i)).collect();
        for connection in &self.connections {
            graph.add_edge(nodes[connection.source.0], nodes[connection.target.0], ());
        }
        match toposort(&graph, None) {
            Ok(sorted) => Ok(sorted.into_iter().map(|node| graph[node]).collect()),
            Err(cycle) => Err(PipelineError::Cycle(
                self.modules[graph[cycle.node_id()]].info().title().to_string(),
            )),
        }
    }

    /// Checks the wiring without running: acyclic, and every required input
    /// either connected or already fed an object.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.order()?;
        for module in &self.modules {
            for input in module.inputs() {
                if input.is_required() && !input.is_connected() && input.current().is_none() {
                    return Err(PipelineError::UnconnectedInput {
                        module: module.info().title().to_string(),
                        port: input.spec().name().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Executes every module once, upstream before downstream.
    ///
    /// A module's outputs are cleared before its compute step, so a failing
    /// step leaves stale objects nowhere; downstream modules then fail their
    /// own required-input validation instead of reading old results.
    pub fn run(&mut self, options: &RunOptions) -> Result<RunSummary, PipelineError> {
        self.validate()?;
        let order = self.order()?;
        let mut records = Vec::with_capacity(order.len());
        let mut halted = false;
        for index in order {
            let module = &mut self.modules[index];
            for output in module.outputs() {
                output.clear();
            }
            let status = execute(module.as_mut(), &self.space, &self.sink);
            records.push(RunRecord {
                module: module.info().title().to_string(),
                status,
            });
            match status {
                ComputeStatus::StopPipeline => {
                    halted = true;
                    break;
                }
                ComputeStatus::Fail if options.stop_on_fail => break,
                _ => {}
            }
        }
        Ok(RunSummary { records, halted })
    }
}
