// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine facade.
//!
//! [`TreeEngine`] owns the node store, the animated overlay, the readiness
//! gate, and the listener registries, and is the only way to mutate them.
//! Every entry point that changes the tree follows the same step:
//!
//! ```text
//!   records ──► MutationApplier (per record, in order) ──► ChangedTags
//!                    │                                         │
//!                    ▼                                         ▼
//!          structural listeners (inline)           ReadinessGate::record()
//!                                                              │
//!                                  end of step: take_ready() ──┘
//!                                                              │
//!                                                              ▼
//!                                                ListenerHub::dispatch()
//! ```
//!
//! A step dispatches at most once, after its last record.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use serde_json::Value;

use crate::cleanup::{CleanupStack, TeardownReport};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::gate::{Readiness, ReadinessGate};
use crate::listener::{DispatchReport, ListenerHub, SubtreeListener, Subscription};
use crate::mutation::{ChildMutation, Mutation, MutationApplier, MutationKind, MutationOutcome, SkipReason};
use crate::overlay::AnimatedOverlay;
use crate::props::PropBag;
use crate::tag::Tag;
use crate::trace::{
    BatchEvent, DispatchEvent, GateAction, GateEvent, ListenerFailure, RootAction, RootEvent, SkippedMutation,
    TeardownEvent, TraceSink, Tracer,
};
use crate::tree::{Node, NodeStore};
use crate::wrapper::{NodeWrapper, WrapperRegistry};

/// A record of a batch that was applied as a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Position of the record in the batch.
    pub position: usize,
    /// Record kind.
    pub kind: MutationKind,
    /// Tag the record is about.
    pub tag: Tag,
    /// Which tag was missing.
    pub reason: SkipReason,
}

/// Result of [`TreeEngine::apply_batch`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Monotonic batch counter, starting at 1.
    pub batch_index: u64,
    /// Number of records applied.
    pub records: usize,
    /// Records that were no-ops.
    pub skipped: Vec<SkippedRecord>,
    /// Tags this batch changed, ascending.
    pub changed: Vec<Tag>,
    /// Roots whose deferred destruction completed during this batch.
    pub roots_destroyed: Vec<Tag>,
    /// Structural listener invocations that panicked.
    pub structural_failures: Vec<ListenerFailure>,
    /// The dispatch at the end of the batch, if the gate let one through.
    pub dispatch: Option<DispatchReport>,
}

/// Result of [`TreeEngine::destroy_root`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RootTeardown {
    /// The root had no children and is gone.
    Destroyed,
    /// The root still has children. It is removed by the mutation that
    /// detaches the last one.
    Deferred,
}

/// Live node count for one type.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeStat {
    /// Type discriminator.
    pub type_name: String,
    /// Live nodes of this type.
    pub count: usize,
    /// Share of all live nodes, in percent.
    pub share: f64,
}

/// Snapshot of the tree's composition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeStats {
    /// Live nodes.
    pub total: usize,
    /// Per-type counts, by count descending then type name.
    pub by_type: Vec<TypeStat>,
    /// Tags with an animated overlay entry.
    pub animated: usize,
    /// Indexed external ids.
    pub external_ids: usize,
}

/// Local mirror of a remotely computed tree.
pub struct TreeEngine {
    config: EngineConfig,
    store: NodeStore,
    overlay: AnimatedOverlay,
    gate: ReadinessGate,
    listeners: ListenerHub,
    wrappers: WrapperRegistry,
    cleanups: CleanupStack,
    pending_roots: Vec<Tag>,
    batch_index: u64,
    trace_sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for TreeEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TreeEngine")
            .field("config", &self.config)
            .field("nodes", &self.store.len())
            .field("readiness", &self.gate.readiness())
            .field("pending_roots", &self.pending_roots)
            .field("batch_index", &self.batch_index)
            .finish_non_exhaustive()
    }
}

impl Default for TreeEngine {
    fn default() -> Self {
        Self::new(EngineConfig::new())
    }
}

fn tracer(sink: &mut Option<Box<dyn TraceSink>>) -> Tracer<'_> {
    match sink.as_deref_mut() {
        Some(sink) => Tracer::new(sink),
        None => Tracer::none(),
    }
}

impl TreeEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            store: NodeStore::new(),
            overlay: AnimatedOverlay::new(),
            gate: ReadinessGate::new(config.initial_readiness),
            listeners: ListenerHub::new(),
            wrappers: WrapperRegistry::new(),
            cleanups: CleanupStack::new(),
            pending_roots: Vec::new(),
            batch_index: 0,
            trace_sink: None,
        }
    }

    /// Installs the sink that receives trace events.
    ///
    /// Events are only emitted with the `trace` feature.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.trace_sink = Some(sink);
    }

    /// Removes and returns the installed trace sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.trace_sink.take()
    }

    // -- Queries --

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the node for `tag`, if live.
    #[must_use]
    pub fn get(&self, tag: Tag) -> Option<&Node> {
        self.store.get(tag)
    }

    /// Looks a node up by its external id (hints stripped).
    #[must_use]
    pub fn find_by_external_id(&self, id: &str) -> Option<&Node> {
        self.store.find_by_external_id(id)
    }

    /// Returns the path from the outermost ancestor down to `tag`.
    #[must_use]
    pub fn lineage(&self, tag: Tag) -> Vec<&Node> {
        self.store.lineage(tag)
    }

    /// Returns the node store for read-only inspection.
    #[must_use]
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Returns the animated overlay for read-only inspection.
    #[must_use]
    pub fn overlay(&self) -> &AnimatedOverlay {
        &self.overlay
    }

    /// Returns the tree's composition.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let total = self.store.len();
        let mut by_type: Vec<TypeStat> = self
            .store
            .stats_by_type()
            .into_iter()
            .map(|(type_name, count)| TypeStat {
                type_name,
                count,
                share: share_percent(count, total),
            })
            .collect();
        by_type.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.type_name.cmp(&b.type_name)));
        TreeStats {
            total,
            by_type,
            animated: self.overlay.len(),
            external_ids: self.store.external_id_count(),
        }
    }

    /// Returns the roots whose destruction is waiting for their children to
    /// be detached.
    #[must_use]
    pub fn pending_root_destroys(&self) -> &[Tag] {
        &self.pending_roots
    }

    // -- Listeners --

    /// Registers a per-node listener on `tag`.
    pub fn subscribe(&self, tag: Tag, f: impl Fn(&Node) + 'static) -> Subscription {
        self.listeners.subscribe(tag, f)
    }

    /// Registers a subtree listener on `root`.
    pub fn subscribe_subtree(&self, root: Tag, listener: SubtreeListener) -> Subscription {
        self.listeners.subscribe_subtree(root, listener)
    }

    /// Registers a structural listener on `parent`.
    pub fn subscribe_structural(&self, parent: Tag, f: impl Fn(&ChildMutation) + 'static) -> Subscription {
        self.listeners.subscribe_structural(parent, f)
    }

    /// Returns a handle to the listener registries, for use inside callbacks.
    #[must_use]
    pub fn listeners(&self) -> ListenerHub {
        self.listeners.clone()
    }

    // -- Mutation --

    /// Applies a batch of records in order, then dispatches once if ready.
    pub fn apply_batch(&mut self, records: impl IntoIterator<Item = Mutation>) -> BatchReport {
        self.batch_index += 1;
        let mut report = BatchReport {
            batch_index: self.batch_index,
            ..BatchReport::default()
        };
        let mut changed = Vec::new();

        {
            let mut tracer = tracer(&mut self.trace_sink);
            let mut fanout = self.listeners.structural_fanout();
            for (position, mutation) in records.into_iter().enumerate() {
                let kind = mutation.kind();
                let tag = mutation.tag();
                let outcome =
                    MutationApplier::new(&mut self.store, &mut self.overlay, &self.config).apply(mutation, &mut fanout);
                report.records += 1;

                #[cfg(feature = "trace-rich")]
                tracer.mutation(&crate::trace::MutationEvent {
                    batch_index: self.batch_index,
                    position,
                    kind,
                    tag,
                    changed: outcome.changed.nodes.len() + outcome.changed.children.len(),
                });

                if let Some(reason) = outcome.skipped {
                    tracer.mutation_skipped(&SkippedMutation {
                        batch_index: self.batch_index,
                        kind,
                        tag,
                        reason,
                    });
                    report.skipped.push(SkippedRecord {
                        position,
                        kind,
                        tag,
                        reason,
                    });
                }
                self.gate.record(&outcome.changed);
                changed.extend(outcome.changed.to_sorted_vec());

                for root in complete_pending_roots(&mut self.store, &mut self.overlay, &mut self.pending_roots) {
                    tracer.root(&RootEvent {
                        tag: root,
                        action: RootAction::Destroyed,
                    });
                    report.roots_destroyed.push(root);
                }
            }
            report.structural_failures = fanout.into_failures();
            for failure in &report.structural_failures {
                tracer.listener_failed(failure);
            }

            changed.sort_unstable();
            changed.dedup();
            tracer.batch(&BatchEvent {
                batch_index: self.batch_index,
                records: report.records,
                skipped: report.skipped.len(),
                changed: changed.len(),
            });
        }

        report.changed = changed;
        report.dispatch = self.end_step();
        report
    }

    /// Pushes an animation fragment for `tag`.
    ///
    /// The fragment is kept in the overlay even if `tag` is not live yet.
    pub fn push_animated_props(&mut self, tag: Tag, fragment: &PropBag) -> Option<DispatchReport> {
        let mut fanout = self.listeners.structural_fanout();
        let outcome = MutationApplier::new(&mut self.store, &mut self.overlay, &self.config).push_animated_props(
            tag,
            fragment,
            &mut fanout,
        );
        let failures = fanout.into_failures();
        self.finish_single(MutationKind::AnimatedProps, tag, &outcome, &failures);
        self.end_step()
    }

    /// Replaces the state of `tag` wholesale.
    pub fn set_state(&mut self, tag: Tag, state: Value) -> Option<DispatchReport> {
        let outcome = MutationApplier::new(&mut self.store, &mut self.overlay, &self.config).set_state(tag, state);
        self.finish_single(MutationKind::State, tag, &outcome, &[]);
        self.end_step()
    }

    fn finish_single(&mut self, kind: MutationKind, tag: Tag, outcome: &MutationOutcome, failures: &[ListenerFailure]) {
        let mut tracer = tracer(&mut self.trace_sink);
        if let Some(reason) = outcome.skipped {
            tracer.mutation_skipped(&SkippedMutation {
                batch_index: self.batch_index,
                kind,
                tag,
                reason,
            });
        }
        for failure in failures {
            tracer.listener_failed(failure);
        }
        self.gate.record(&outcome.changed);
    }

    // -- Roots --

    /// Creates an empty, zero-sized root.
    pub fn create_root(&mut self, tag: Tag) -> Result<(), EngineError> {
        if let Some(existing) = self.store.get(tag) {
            return Err(if existing.is_root() {
                EngineError::RootAlreadyExists(tag)
            } else {
                EngineError::TagInUse(tag)
            });
        }
        self.store.save(Node::root(tag));
        tracer(&mut self.trace_sink).root(&RootEvent {
            tag,
            action: RootAction::Created,
        });
        Ok(())
    }

    /// Destroys a root, now if it has no children, otherwise as soon as a
    /// mutation detaches its last child.
    pub fn destroy_root(&mut self, tag: Tag) -> Result<RootTeardown, EngineError> {
        let node = self.store.get(tag).ok_or(EngineError::UnknownRoot(tag))?;
        if !node.is_root() {
            return Err(EngineError::NotARoot(tag));
        }
        let mut tracer = tracer(&mut self.trace_sink);
        if node.children_tags.is_empty() {
            self.store.delete(tag);
            self.overlay.remove(tag);
            self.pending_roots.retain(|&t| t != tag);
            tracer.root(&RootEvent {
                tag,
                action: RootAction::Destroyed,
            });
            Ok(RootTeardown::Destroyed)
        } else {
            if !self.pending_roots.contains(&tag) {
                self.pending_roots.push(tag);
            }
            tracer.root(&RootEvent {
                tag,
                action: RootAction::DestroyDeferred,
            });
            Ok(RootTeardown::Deferred)
        }
    }

    // -- Readiness --

    /// Returns the current readiness.
    #[must_use]
    pub fn readiness(&self) -> Readiness {
        self.gate.readiness()
    }

    /// Changes readiness. Becoming ready delivers everything buffered in one
    /// dispatch.
    pub fn set_readiness(&mut self, readiness: Readiness) -> Option<DispatchReport> {
        let tags = self.gate.set_readiness(readiness)?;
        Some(self.deliver(tags))
    }

    /// Returns whether changes are waiting for the gate to open.
    #[must_use]
    pub fn has_pending_notifications(&self) -> bool {
        self.gate.has_pending()
    }

    fn end_step(&mut self) -> Option<DispatchReport> {
        if let Some(tags) = self.gate.take_ready() {
            return Some(self.deliver(tags));
        }
        if self.gate.has_pending() {
            tracer(&mut self.trace_sink).gate(&GateEvent {
                action: GateAction::Buffered,
                readiness: self.gate.readiness(),
                pending: self.gate.pending_marks(),
            });
        }
        None
    }

    fn deliver(&mut self, tags: Vec<Tag>) -> DispatchReport {
        let mut tracer = tracer(&mut self.trace_sink);
        tracer.gate(&GateEvent {
            action: GateAction::Flushed,
            readiness: self.gate.readiness(),
            pending: tags.len(),
        });
        let report = self.listeners.dispatch(&self.store, &tags);
        for failure in &report.failures {
            tracer.listener_failed(failure);
        }
        tracer.dispatch(&DispatchEvent {
            tags: report.tags.len(),
            node_listeners: report.node_listeners_called,
            subtree_listeners: report.subtree_listeners_called,
            failed: report.failed_listeners,
        });
        report
    }

    // -- Wrappers --

    /// Returns the wrapper registry, to register per-type factories.
    pub fn wrappers_mut(&mut self) -> &mut WrapperRegistry {
        &mut self.wrappers
    }

    /// Builds the wrapper for the live node `tag`.
    #[must_use]
    pub fn wrap(&self, tag: Tag) -> Option<Box<dyn NodeWrapper>> {
        self.store.get(tag).map(|node| self.wrappers.wrap(node))
    }

    // -- Cleanup --

    /// Registers a callback to run on [`teardown`](Self::teardown).
    pub fn defer_cleanup(&mut self, f: impl FnOnce() + 'static) {
        self.cleanups.push(f);
    }

    /// Runs every deferred cleanup, newest first.
    pub fn teardown(&mut self) -> TeardownReport {
        let report = self.cleanups.run();
        tracer(&mut self.trace_sink).teardown(&TeardownEvent {
            ran: report.ran,
            failed: report.failed,
        });
        report
    }
}

/// Removes every pending root that has no children left (or is already
/// gone) and returns the roots actually removed.
fn complete_pending_roots(store: &mut NodeStore, overlay: &mut AnimatedOverlay, pending: &mut Vec<Tag>) -> Vec<Tag> {
    let mut destroyed = Vec::new();
    pending.retain(|&root| match store.get(root) {
        None => false,
        Some(node) if node.children_tags.is_empty() => {
            store.delete(root);
            overlay.remove(root);
            destroyed.push(root);
            false
        }
        Some(_) => true,
    });
    destroyed
}

fn share_percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}
