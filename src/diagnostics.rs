//! User-facing diagnostics.
//!
//! Modules report through a [`Reporter`], which stamps the module label onto
//! each message and forwards it to a sink. The sink set is closed: console
//! for interactive use, an in-memory buffer for tests, and a channel for
//! batch/log consumers. Fatal conditions are double-reported (error plus
//! info) so they are visible in both interactive and log-only contexts.

use enum_dispatch::enum_dispatch;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => f.write_str("INFO"),
            Severity::Warning => f.write_str("WARNING"),
            Severity::Error => f.write_str("ERROR"),
        }
    }
}

/// One user-facing message, tagged with the emitting module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, derive_more::Constructor)]
pub struct Diagnostic {
    pub module: String,
    pub severity: Severity,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.module, self.message)
    }
}

#[enum_dispatch]
pub trait DiagnosticSink {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Errors to stderr, everything else to stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

impl DiagnosticSink for ConsoleSink {
    fn emit(&self, diagnostic: Diagnostic) {
        if diagnostic.severity == Severity::Error {
            eprintln!("{diagnostic}");
        } else {
            println!("{diagnostic}");
        }
    }
}

/// Shared in-memory buffer; clones observe the same messages.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<Diagnostic>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Diagnostic> {
        self.buffer.lock().clone()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.buffer.lock())
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.buffer.lock().push(diagnostic);
    }
}

/// Forwards into a crossbeam channel for out-of-band consumption. Dropped
/// receivers make emission a no-op rather than an error.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    sender: crossbeam::channel::Sender<Diagnostic>,
}

impl ChannelSink {
    pub fn new() -> (Self, crossbeam::channel::Receiver<Diagnostic>) {
        let (sender, receiver) = crossbeam::channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl DiagnosticSink for ChannelSink {
    fn emit(&self, diagnostic: Diagnostic) {
        let _ = self.sender.send(diagnostic);
    }
}

/// The closed set of sink implementations.
#[enum_dispatch(DiagnosticSink)]
#[derive(Clone, Debug)]
pub enum SinkFlavor {
    Console(ConsoleSink),
    Memory(MemorySink),
    Channel(ChannelSink),
}

impl Default for SinkFlavor {
    fn default() -> Self {
        ConsoleSink.into()
    }
}

/// A sink bound to one module's label.
#[derive(Clone, Debug)]
pub struct Reporter {
    sink: SinkFlavor,
    module: String,
}

impl Reporter {
    pub fn new(sink: SinkFlavor, module: impl Into<String>) -> Self {
        Self {
            sink,
            module: module.into(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn report(&self, severity: Severity, message: impl Into<String>) {
        self.sink.emit(Diagnostic::new(
            self.module.clone(),
            severity,
            message.into(),
        ));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.report(Severity::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.report(Severity::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.report(Severity::Error, message);
    }

    /// Double-reports a fatal condition as both error and info.
    pub fn fatal(&self, message: impl Into<String>) {
        let message = message.into();
        self.report(Severity::Error, message.clone());
        self.report(Severity::Info, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporter_stamps_the_module_label() {
        let sink = MemorySink::new();
        let reporter = Reporter::new(sink.clone().into(), "Collect_0");
        reporter.warning("no normals");
        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].module, "Collect_0");
        assert_eq!(messages[0].severity, Severity::Warning);
    }

    #[test]
    fn fatal_is_double_reported() {
        let sink = MemorySink::new();
        let reporter = Reporter::new(sink.clone().into(), "StretchSet_1");
        reporter.fatal("bad input");
        let severities: Vec<_> = sink.messages().iter().map(|d| d.severity).collect();
        assert_eq!(severities, vec![Severity::Error, Severity::Info]);
    }

    #[test]
    fn channel_sink_tolerates_a_dropped_receiver() {
        let (sink, receiver) = ChannelSink::new();
        drop(receiver);
        sink.emit(Diagnostic::new("M".into(), Severity::Info, "late".into()));
    }

    #[test]
    fn diagnostics_serialize() {
        let diagnostic = Diagnostic::new("Collect_0".into(), Severity::Error, "boom".into());
        let json = serde_json::to_string(&diagnostic).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, diagnostic);
    }
}
