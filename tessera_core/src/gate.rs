// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Readiness gate: buffers changed tags until the host can take updates.
//!
//! Every applier step marks its changed tags into a dirty tracker on the
//! [`NODE`](crate::dirty::NODE) and [`CHILDREN`](crate::dirty::CHILDREN)
//! channels. Nothing drains while the gate is [`Readiness::NotReady`], so
//! any number of batches accumulate into one union. A drain empties both
//! channels and yields the union sorted and deduplicated, which the caller
//! dispatches exactly once.

use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker};

use crate::dirty;
use crate::mutation::ChangedTags;
use crate::tag::Tag;

/// Whether the consuming UI can take notifications.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Readiness {
    /// Notifications are buffered.
    NotReady,
    /// Notifications are delivered at the end of every step.
    #[default]
    Ready,
}

/// Buffers changed tags and decides when they are delivered.
#[derive(Debug)]
pub struct ReadinessGate {
    readiness: Readiness,
    dirty: DirtyTracker<u32>,
    marked: usize,
}

impl ReadinessGate {
    /// Creates a gate with nothing pending.
    #[must_use]
    pub fn new(readiness: Readiness) -> Self {
        Self {
            readiness,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            marked: 0,
        }
    }

    /// Returns the current readiness.
    #[must_use]
    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// Returns whether anything was marked since the last drain.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.marked > 0
    }

    /// Returns the number of marks since the last drain. A tag marked twice
    /// counts twice.
    #[must_use]
    pub fn pending_marks(&self) -> usize {
        self.marked
    }

    /// Marks the tags of one applier step.
    pub fn record(&mut self, changed: &ChangedTags) {
        for tag in &changed.nodes {
            self.dirty.mark(tag.get(), dirty::NODE);
        }
        for tag in &changed.children {
            self.dirty.mark(tag.get(), dirty::CHILDREN);
        }
        self.marked += changed.nodes.len() + changed.children.len();
    }

    /// Drains pending tags if the gate is ready and anything is pending.
    ///
    /// Called at the end of every step.
    pub fn take_ready(&mut self) -> Option<Vec<Tag>> {
        if self.readiness == Readiness::Ready && self.has_pending() {
            Some(self.drain())
        } else {
            None
        }
    }

    /// Changes readiness.
    ///
    /// A `NotReady → Ready` transition drains everything buffered. Any other
    /// call returns `None` and leaves pending tags alone.
    pub fn set_readiness(&mut self, readiness: Readiness) -> Option<Vec<Tag>> {
        let previous = core::mem::replace(&mut self.readiness, readiness);
        if previous == Readiness::NotReady && readiness == Readiness::Ready {
            self.take_ready()
        } else {
            None
        }
    }

    fn drain(&mut self) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self
            .dirty
            .drain(dirty::NODE)
            .deterministic()
            .run()
            .map(Tag)
            .collect();
        tags.extend(
            self.dirty
                .drain(dirty::CHILDREN)
                .deterministic()
                .run()
                .map(Tag),
        );
        tags.sort_unstable();
        tags.dedup();
        self.marked = 0;
        tags
    }
}
