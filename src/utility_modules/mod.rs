//! Source and capture modules for wiring up and inspecting pipelines,
//! primarily in tests.

mod probe;
mod source;

pub use probe::{Probe, ProbeCapture};
pub use source::Source;
