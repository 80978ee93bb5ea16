//! Lifecycle event sinks used by the room hub.
//!
//! A tracer never reports failure to its caller: a sink that cannot be
//! written to simply loses the record.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Records discrete lifecycle events (join, leave, forward).
pub trait Tracer: Send + Sync {
    fn trace(&self, record: fmt::Arguments<'_>);
}

/// Writes one line per record to any `io::Write` destination.
pub struct WriterTracer<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> WriterTracer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Consume the tracer and return the underlying writer.
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> Tracer for WriterTracer<W> {
    fn trace(&self, record: fmt::Arguments<'_>) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        let _ = writeln!(out, "{record}");
    }
}

/// Routes records into the `tracing` subscriber.
pub struct LogTracer;

impl Tracer for LogTracer {
    fn trace(&self, record: fmt::Arguments<'_>) {
        tracing::info!(target: "wschat::trace", "{record}");
    }
}

struct NullTracer;

impl Tracer for NullTracer {
    fn trace(&self, _record: fmt::Arguments<'_>) {}
}

/// A tracer that ignores every record.
pub fn off() -> Arc<dyn Tracer> {
    Arc::new(NullTracer)
}

/// A tracer writing to `out`.
pub fn new<W: Write + Send + 'static>(out: W) -> Arc<dyn Tracer> {
    Arc::new(WriterTracer::new(out))
}
