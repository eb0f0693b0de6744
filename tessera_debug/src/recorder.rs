// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON Lines event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and appends one JSON object per
//! event to a shared text buffer. Each object carries an `"event"` name and
//! the event's fields. [`decode`] reads a recording back as an iterator of
//! [`RecordedEvent`].
//!
//! Clones of a recorder share one buffer, so a caller can hand one clone to
//! [`TreeEngine::set_trace_sink`](tessera_core::engine::TreeEngine::set_trace_sink)
//! and read the recording through another.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};
use tessera_core::tag::Tag;
use tessera_core::trace::{
    BatchEvent, DispatchEvent, GateEvent, ListenerFailure, MutationEvent, RootEvent, SkippedMutation, TeardownEvent,
    TraceSink,
};

use crate::names;

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

const EVENT_BATCH: &str = "batch";
const EVENT_SKIPPED: &str = "skipped";
const EVENT_GATE: &str = "gate";
const EVENT_DISPATCH: &str = "dispatch";
const EVENT_LISTENER_FAILED: &str = "listener-failed";
const EVENT_ROOT: &str = "root";
const EVENT_TEARDOWN: &str = "teardown";
const EVENT_MUTATION: &str = "mutation";

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that records events as JSON Lines.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    buf: Rc<RefCell<String>>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recording.
    #[must_use]
    pub fn to_json_lines(&self) -> String {
        self.buf.borrow().clone()
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.borrow().lines().count()
    }

    /// Returns whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.borrow().is_empty()
    }

    /// Discards the recording.
    pub fn clear(&self) {
        self.buf.borrow_mut().clear();
    }

    fn record(&self, event: &str, mut fields: Value) {
        if let Value::Object(map) = &mut fields {
            map.insert("event".into(), Value::from(event));
        }
        let mut buf = self.buf.borrow_mut();
        buf.push_str(&fields.to_string());
        buf.push('\n');
    }
}

impl TraceSink for RecorderSink {
    fn on_batch(&mut self, e: &BatchEvent) {
        self.record(
            EVENT_BATCH,
            json!({
                "batch": e.batch_index,
                "records": e.records,
                "skipped": e.skipped,
                "changed": e.changed,
            }),
        );
    }

    fn on_mutation_skipped(&mut self, e: &SkippedMutation) {
        self.record(
            EVENT_SKIPPED,
            json!({
                "batch": e.batch_index,
                "kind": names::mutation_kind(e.kind),
                "tag": e.tag.get(),
                "reason": names::skip_reason(e.reason),
            }),
        );
    }

    fn on_gate(&mut self, e: &GateEvent) {
        self.record(
            EVENT_GATE,
            json!({
                "action": names::gate_action(e.action),
                "readiness": names::readiness(e.readiness),
                "pending": e.pending,
            }),
        );
    }

    fn on_dispatch(&mut self, e: &DispatchEvent) {
        self.record(
            EVENT_DISPATCH,
            json!({
                "tags": e.tags,
                "node": e.node_listeners,
                "subtree": e.subtree_listeners,
                "failed": e.failed,
            }),
        );
    }

    fn on_listener_failed(&mut self, e: &ListenerFailure) {
        self.record(
            EVENT_LISTENER_FAILED,
            json!({
                "tag": e.tag.get(),
                "topology": names::topology(e.topology),
            }),
        );
    }

    fn on_root(&mut self, e: &RootEvent) {
        self.record(
            EVENT_ROOT,
            json!({
                "tag": e.tag.get(),
                "action": names::root_action(e.action),
            }),
        );
    }

    fn on_teardown(&mut self, e: &TeardownEvent) {
        self.record(EVENT_TEARDOWN, json!({ "ran": e.ran, "failed": e.failed }));
    }

    fn on_mutation(&mut self, e: &MutationEvent) {
        self.record(
            EVENT_MUTATION,
            json!({
                "batch": e.batch_index,
                "position": e.position,
                "kind": names::mutation_kind(e.kind),
                "tag": e.tag.get(),
                "changed": e.changed,
            }),
        );
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a JSON Lines recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`BatchEvent`].
    Batch(BatchEvent),
    /// A [`SkippedMutation`].
    Skipped(SkippedMutation),
    /// A [`GateEvent`].
    Gate(GateEvent),
    /// A [`DispatchEvent`].
    Dispatch(DispatchEvent),
    /// A [`ListenerFailure`].
    ListenerFailed(ListenerFailure),
    /// A [`RootEvent`].
    Root(RootEvent),
    /// A [`TeardownEvent`].
    Teardown(TeardownEvent),
    /// A [`MutationEvent`].
    Mutation(MutationEvent),
}

/// Decodes a recording produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first line that is not a known event.
pub fn decode(text: &str) -> DecodeIter<'_> {
    DecodeIter { lines: text.lines() }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    lines: std::str::Lines<'a>,
}

fn field_u64(v: &Value, key: &str) -> Option<u64> {
    v.get(key)?.as_u64()
}

fn field_usize(v: &Value, key: &str) -> Option<usize> {
    usize::try_from(field_u64(v, key)?).ok()
}

fn field_tag(v: &Value, key: &str) -> Option<Tag> {
    u32::try_from(field_u64(v, key)?).ok().map(Tag)
}

fn field_str<'v>(v: &'v Value, key: &str) -> Option<&'v str> {
    v.get(key)?.as_str()
}

fn decode_line(line: &str) -> Option<RecordedEvent> {
    let v: Value = serde_json::from_str(line).ok()?;
    Some(match field_str(&v, "event")? {
        EVENT_BATCH => RecordedEvent::Batch(BatchEvent {
            batch_index: field_u64(&v, "batch")?,
            records: field_usize(&v, "records")?,
            skipped: field_usize(&v, "skipped")?,
            changed: field_usize(&v, "changed")?,
        }),
        EVENT_SKIPPED => RecordedEvent::Skipped(SkippedMutation {
            batch_index: field_u64(&v, "batch")?,
            kind: names::parse_mutation_kind(field_str(&v, "kind")?)?,
            tag: field_tag(&v, "tag")?,
            reason: names::parse_skip_reason(field_str(&v, "reason")?)?,
        }),
        EVENT_GATE => RecordedEvent::Gate(GateEvent {
            action: names::parse_gate_action(field_str(&v, "action")?)?,
            readiness: names::parse_readiness(field_str(&v, "readiness")?)?,
            pending: field_usize(&v, "pending")?,
        }),
        EVENT_DISPATCH => RecordedEvent::Dispatch(DispatchEvent {
            tags: field_usize(&v, "tags")?,
            node_listeners: field_usize(&v, "node")?,
            subtree_listeners: field_usize(&v, "subtree")?,
            failed: field_usize(&v, "failed")?,
        }),
        EVENT_LISTENER_FAILED => RecordedEvent::ListenerFailed(ListenerFailure {
            tag: field_tag(&v, "tag")?,
            topology: names::parse_topology(field_str(&v, "topology")?)?,
        }),
        EVENT_ROOT => RecordedEvent::Root(RootEvent {
            tag: field_tag(&v, "tag")?,
            action: names::parse_root_action(field_str(&v, "action")?)?,
        }),
        EVENT_TEARDOWN => RecordedEvent::Teardown(TeardownEvent {
            ran: field_usize(&v, "ran")?,
            failed: field_usize(&v, "failed")?,
        }),
        EVENT_MUTATION => RecordedEvent::Mutation(MutationEvent {
            batch_index: field_u64(&v, "batch")?,
            position: field_usize(&v, "position")?,
            kind: names::parse_mutation_kind(field_str(&v, "kind")?)?,
            tag: field_tag(&v, "tag")?,
            changed: field_usize(&v, "changed")?,
        }),
        _ => return None,
    })
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        decode_line(self.lines.next()?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
