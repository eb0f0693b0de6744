// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use tessera_core::trace::{
    BatchEvent, DispatchEvent, GateEvent, ListenerFailure, MutationEvent, RootEvent, SkippedMutation, TeardownEvent,
    TraceSink,
};

use crate::names;

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_batch(&mut self, e: &BatchEvent) {
        let _ = writeln!(
            self.writer,
            "[batch] #{} records={} skipped={} changed={}",
            e.batch_index, e.records, e.skipped, e.changed,
        );
    }

    fn on_mutation_skipped(&mut self, e: &SkippedMutation) {
        let _ = writeln!(
            self.writer,
            "[skip] batch=#{} {} {} ({})",
            e.batch_index,
            names::mutation_kind(e.kind),
            e.tag,
            names::skip_reason(e.reason),
        );
    }

    fn on_gate(&mut self, e: &GateEvent) {
        let _ = writeln!(
            self.writer,
            "[gate] {} readiness={} pending={}",
            names::gate_action(e.action),
            names::readiness(e.readiness),
            e.pending,
        );
    }

    fn on_dispatch(&mut self, e: &DispatchEvent) {
        let failed = if e.failed == 0 {
            String::from("ok")
        } else {
            format!("FAILED={}", e.failed)
        };
        let _ = writeln!(
            self.writer,
            "[dispatch] tags={} node={} subtree={} {failed}",
            e.tags, e.node_listeners, e.subtree_listeners,
        );
    }

    fn on_listener_failed(&mut self, e: &ListenerFailure) {
        let _ = writeln!(
            self.writer,
            "[listener:FAILED] {} listener on {}",
            names::topology(e.topology),
            e.tag,
        );
    }

    fn on_root(&mut self, e: &RootEvent) {
        let _ = writeln!(self.writer, "[root] {} {}", e.tag, names::root_action(e.action));
    }

    fn on_teardown(&mut self, e: &TeardownEvent) {
        let _ = writeln!(self.writer, "[teardown] ran={} failed={}", e.ran, e.failed);
    }

    fn on_mutation(&mut self, e: &MutationEvent) {
        let _ = writeln!(
            self.writer,
            "[mutation] batch=#{} at={} {} {} changed={}",
            e.batch_index,
            e.position,
            names::mutation_kind(e.kind),
            e.tag,
            e.changed,
        );
    }
}

#[cfg(test)]
mod tests {
    use tessera_core::mutation::{MutationKind, SkipReason};
    use tessera_core::tag::Tag;
    use tessera_core::trace::RootAction;

    use super::*;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn pretty_print_skip() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_mutation_skipped(&SkippedMutation {
            batch_index: 4,
            kind: MutationKind::Insert,
            tag: Tag(12),
            reason: SkipReason::MissingParent,
        });
        let output = output(sink);
        assert!(output.contains("[skip]"), "got: {output}");
        assert!(output.contains("insert #12 (missing-parent)"), "got: {output}");
    }

    #[test]
    fn pretty_print_dispatch_flags_failures() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_dispatch(&DispatchEvent {
            tags: 3,
            node_listeners: 2,
            subtree_listeners: 1,
            failed: 1,
        });
        sink.on_root(&RootEvent {
            tag: Tag(1),
            action: RootAction::DestroyDeferred,
        });
        let output = output(sink);
        assert!(output.contains("FAILED=1"), "got: {output}");
        assert!(output.contains("[root] #1 destroy-deferred"), "got: {output}");
        assert_eq!(output.lines().count(), 2);
    }
}
