// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for batch application and notification delivery.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! engine calls as it applies batches, buffers changes, and fans out
//! notifications. All method bodies default to no-ops, so implementing only
//! the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates per-record [`MutationEvent`]s and
//!   the corresponding `TraceSink` method.

use crate::gate::Readiness;
use crate::listener::ListenerTopology;
use crate::mutation::{MutationKind, SkipReason};
use crate::tag::Tag;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What the readiness gate did at the end of a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateAction {
    /// Changes were kept buffered because the gate is not ready.
    Buffered,
    /// Pending changes were drained for dispatch.
    Flushed,
}

/// Root lifecycle transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RootAction {
    /// A root node was created.
    Created,
    /// Destruction was requested while children remained.
    DestroyDeferred,
    /// A root node was removed from the store.
    Destroyed,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after every record of a batch has been applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchEvent {
    /// Monotonic batch counter.
    pub batch_index: u64,
    /// Number of records in the batch.
    pub records: usize,
    /// Number of records that were no-ops because of a race.
    pub skipped: usize,
    /// Number of distinct tags the batch reported as changed.
    pub changed: usize,
}

/// Emitted when a record is applied as a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkippedMutation {
    /// Batch the record belongs to.
    pub batch_index: u64,
    /// Record kind.
    pub kind: MutationKind,
    /// Tag the record is about.
    pub tag: Tag,
    /// Which tag was missing.
    pub reason: SkipReason,
}

/// Emitted when the readiness gate buffers or flushes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GateEvent {
    /// What happened.
    pub action: GateAction,
    /// Readiness at the time of the event.
    pub readiness: Readiness,
    /// Tags pending (for [`GateAction::Buffered`]) or drained (for
    /// [`GateAction::Flushed`]).
    pub pending: usize,
}

/// Emitted after a notification fan-out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchEvent {
    /// Number of changed tags dispatched.
    pub tags: usize,
    /// Per-node listener invocations.
    pub node_listeners: usize,
    /// Subtree listener invocations.
    pub subtree_listeners: usize,
    /// Invocations that panicked.
    pub failed: usize,
}

/// Emitted for each listener invocation that panicked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerFailure {
    /// Tag the listener was registered on.
    pub tag: Tag,
    /// Which registry the listener came from.
    pub topology: ListenerTopology,
}

/// Emitted on root lifecycle transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RootEvent {
    /// Root tag.
    pub tag: Tag,
    /// What happened.
    pub action: RootAction,
}

/// Emitted after the cleanup stack ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TeardownEvent {
    /// Cleanups that ran.
    pub ran: usize,
    /// Cleanups that panicked.
    pub failed: usize,
}

/// A per-record application trace.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MutationEvent {
    /// Batch the record belongs to.
    pub batch_index: u64,
    /// Position of the record within the batch.
    pub position: usize,
    /// Record kind.
    pub kind: MutationKind,
    /// Tag the record is about.
    pub tag: Tag,
    /// Number of tags the record reported as changed.
    pub changed: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the engine.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after a batch was applied.
    fn on_batch(&mut self, e: &BatchEvent) {
        _ = e;
    }

    /// Called when a record is applied as a no-op.
    fn on_mutation_skipped(&mut self, e: &SkippedMutation) {
        _ = e;
    }

    /// Called when the gate buffers or flushes.
    fn on_gate(&mut self, e: &GateEvent) {
        _ = e;
    }

    /// Called after notifications were fanned out.
    fn on_dispatch(&mut self, e: &DispatchEvent) {
        _ = e;
    }

    /// Called for each listener invocation that panicked.
    fn on_listener_failed(&mut self, e: &ListenerFailure) {
        _ = e;
    }

    /// Called on root lifecycle transitions.
    fn on_root(&mut self, e: &RootEvent) {
        _ = e;
    }

    /// Called after the cleanup stack ran.
    fn on_teardown(&mut self, e: &TeardownEvent) {
        _ = e;
    }

    /// Called for every applied record (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_mutation(&mut self, e: &MutationEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`BatchEvent`].
    #[inline]
    pub fn batch(&mut self, e: &BatchEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_batch(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SkippedMutation`].
    #[inline]
    pub fn mutation_skipped(&mut self, e: &SkippedMutation) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_mutation_skipped(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`GateEvent`].
    #[inline]
    pub fn gate(&mut self, e: &GateEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_gate(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DispatchEvent`].
    #[inline]
    pub fn dispatch(&mut self, e: &DispatchEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_dispatch(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ListenerFailure`].
    #[inline]
    pub fn listener_failed(&mut self, e: &ListenerFailure) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_listener_failed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RootEvent`].
    #[inline]
    pub fn root(&mut self, e: &RootEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_root(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TeardownEvent`].
    #[inline]
    pub fn teardown(&mut self, e: &TeardownEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_teardown(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`MutationEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn mutation(&mut self, e: &MutationEvent) {
        if let Some(s) = &mut self.sink {
            s.on_mutation(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_batch() -> BatchEvent {
        BatchEvent {
            batch_index: 3,
            records: 5,
            skipped: 1,
            changed: 2,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_batch(&sample_batch());
        sink.on_gate(&GateEvent {
            action: GateAction::Buffered,
            readiness: Readiness::NotReady,
            pending: 4,
        });
        sink.on_root(&RootEvent {
            tag: Tag(1),
            action: RootAction::Created,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.batch(&sample_batch());
        tracer.dispatch(&DispatchEvent {
            tags: 1,
            node_listeners: 0,
            subtree_listeners: 0,
            failed: 0,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            batches: Vec<u64>,
            skipped: Vec<SkipReason>,
        }
        impl TraceSink for RecordingSink {
            fn on_batch(&mut self, e: &BatchEvent) {
                self.batches.push(e.batch_index);
            }
            fn on_mutation_skipped(&mut self, e: &SkippedMutation) {
                self.skipped.push(e.reason);
            }
        }

        let mut sink = RecordingSink {
            batches: Vec::new(),
            skipped: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.batch(&sample_batch());
        tracer.mutation_skipped(&SkippedMutation {
            batch_index: 3,
            kind: MutationKind::Update,
            tag: Tag(8),
            reason: SkipReason::MissingNode,
        });
        drop(tracer);
        assert_eq!(sink.batches, &[3]);
        assert_eq!(sink.skipped, &[SkipReason::MissingNode]);
    }
}
