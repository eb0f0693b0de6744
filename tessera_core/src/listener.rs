// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener registries and notification fan-out.
//!
//! Three topologies are kept apart:
//!
//! - **Per-node** listeners receive the changed [`Node`] itself.
//! - **Subtree** listeners are registered on a root (or any ancestor) and
//!   fire once per dispatch when anything beneath it changed. A
//!   [`SubtreeListener`] is identified by its allocation, so one listener
//!   registered on several ancestors of a changed tag still fires once.
//! - **Structural** listeners receive [`ChildMutation`]s for a parent,
//!   synchronously while a record is being applied.
//!
//! The registries sit behind a shared [`ListenerHub`] handle. Callbacks may
//! clone the hub and subscribe or unsubscribe while being called: the hub
//! snapshots the listeners it is about to call and holds no borrow while
//! calling out.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;

use hashbrown::{HashMap, HashSet};

use crate::isolate::run_isolated;
use crate::mutation::{ChildMutation, StructuralObserver};
use crate::tag::Tag;
use crate::trace::ListenerFailure;
use crate::tree::{Node, NodeStore};

/// Which registry a listener lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerTopology {
    /// Per-node listeners.
    Node,
    /// Subtree listeners.
    Subtree,
    /// Structural (child mutation) listeners.
    Structural,
}

/// A callback fired when anything in a subtree changed.
///
/// Clones share identity: registering clones of one listener on several
/// ancestors makes it fire once per dispatch.
#[derive(Clone)]
pub struct SubtreeListener(Rc<dyn Fn()>);

impl SubtreeListener {
    /// Wraps a callback.
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    fn identity(&self) -> *const () {
        Rc::as_ptr(&self.0).cast::<()>()
    }
}

impl core::fmt::Debug for SubtreeListener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("SubtreeListener").field(&self.identity()).finish()
    }
}

type NodeCallback = Rc<dyn Fn(&Node)>;
type StructuralCallback = Rc<dyn Fn(&ChildMutation)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct ListenerId(u64);

struct Registry {
    next_id: u64,
    node: HashMap<Tag, Vec<(ListenerId, NodeCallback)>>,
    subtree: HashMap<Tag, Vec<(ListenerId, SubtreeListener)>>,
    structural: HashMap<Tag, Vec<(ListenerId, StructuralCallback)>>,
}

impl Registry {
    fn new() -> Self {
        Self {
            next_id: 0,
            node: HashMap::new(),
            subtree: HashMap::new(),
            structural: HashMap::new(),
        }
    }

    fn allocate(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn remove(&mut self, topology: ListenerTopology, tag: Tag, id: ListenerId) {
        match topology {
            ListenerTopology::Node => remove_entry(&mut self.node, tag, id),
            ListenerTopology::Subtree => remove_entry(&mut self.subtree, tag, id),
            ListenerTopology::Structural => remove_entry(&mut self.structural, tag, id),
        }
    }

    fn count(&self, topology: ListenerTopology, tag: Tag) -> usize {
        match topology {
            ListenerTopology::Node => self.node.get(&tag).map_or(0, Vec::len),
            ListenerTopology::Subtree => self.subtree.get(&tag).map_or(0, Vec::len),
            ListenerTopology::Structural => self.structural.get(&tag).map_or(0, Vec::len),
        }
    }
}

fn remove_entry<T>(map: &mut HashMap<Tag, Vec<(ListenerId, T)>>, tag: Tag, id: ListenerId) {
    if let Some(list) = map.get_mut(&tag) {
        list.retain(|(existing, _)| *existing != id);
        if list.is_empty() {
            map.remove(&tag);
        }
    }
}

fn snapshot<T: Clone>(map: &HashMap<Tag, Vec<(ListenerId, T)>>, tag: Tag) -> Vec<T> {
    map.get(&tag)
        .map(|list| list.iter().map(|(_, f)| f.clone()).collect())
        .unwrap_or_default()
}

/// Result of one notification fan-out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Changed tags, ascending.
    pub tags: Vec<Tag>,
    /// Per-node listener invocations.
    pub node_listeners_called: usize,
    /// Subtree listener invocations (after deduplication).
    pub subtree_listeners_called: usize,
    /// Invocations that panicked.
    pub failed_listeners: usize,
    /// Where each failure happened.
    pub failures: Vec<ListenerFailure>,
}

/// Shared handle to the listener registries.
///
/// Cloning is cheap and every clone refers to the same registries.
#[derive(Clone)]
pub struct ListenerHub {
    registry: Rc<RefCell<Registry>>,
}

impl core::fmt::Debug for ListenerHub {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListenerHub").finish_non_exhaustive()
    }
}

impl Default for ListenerHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerHub {
    /// Creates empty registries.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry::new())),
        }
    }

    // -- Registration --

    /// Registers a per-node listener on `tag`.
    pub fn subscribe(&self, tag: Tag, f: impl Fn(&Node) + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.allocate();
        registry.node.entry(tag).or_default().push((id, Rc::new(f)));
        self.handle(ListenerTopology::Node, tag, id)
    }

    /// Registers a subtree listener on `root`.
    pub fn subscribe_subtree(&self, root: Tag, listener: SubtreeListener) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.allocate();
        registry.subtree.entry(root).or_default().push((id, listener));
        self.handle(ListenerTopology::Subtree, root, id)
    }

    /// Registers a structural listener on `parent`.
    pub fn subscribe_structural(&self, parent: Tag, f: impl Fn(&ChildMutation) + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.allocate();
        registry.structural.entry(parent).or_default().push((id, Rc::new(f)));
        self.handle(ListenerTopology::Structural, parent, id)
    }

    /// Returns the number of listeners registered on `tag` in one topology.
    #[must_use]
    pub fn listener_count(&self, topology: ListenerTopology, tag: Tag) -> usize {
        self.registry.borrow().count(topology, tag)
    }

    fn handle(&self, topology: ListenerTopology, tag: Tag, id: ListenerId) -> Subscription {
        Subscription {
            registry: Rc::downgrade(&self.registry),
            topology,
            tag,
            id,
        }
    }

    // -- Delivery --

    /// Notifies listeners about `tags`.
    ///
    /// Per-node listeners of every live tag run first, in tag order. Then
    /// subtree listeners found along each tag's lineage run once each, in
    /// the order they were first reached. Tags that are no longer live are
    /// skipped.
    ///
    /// Both listener sets are snapshotted before the first callback runs.
    /// Subscribing or unsubscribing from inside a callback takes effect on
    /// the next dispatch.
    pub fn dispatch(&self, store: &NodeStore, tags: &[Tag]) -> DispatchReport {
        let mut report = DispatchReport {
            tags: tags.to_vec(),
            ..DispatchReport::default()
        };

        let mut per_node: Vec<(&Node, Vec<NodeCallback>)> = Vec::new();
        let mut subtree: Vec<(Tag, SubtreeListener)> = Vec::new();
        {
            let registry = self.registry.borrow();
            for &tag in tags {
                let Some(node) = store.get(tag) else {
                    continue;
                };
                let listeners = snapshot(&registry.node, tag);
                if !listeners.is_empty() {
                    per_node.push((node, listeners));
                }
            }

            let mut seen = HashSet::new();
            for &tag in tags {
                for ancestor in store.lineage_tags(tag) {
                    let Some(list) = registry.subtree.get(&ancestor) else {
                        continue;
                    };
                    for (_, listener) in list {
                        if seen.insert(listener.identity()) {
                            subtree.push((ancestor, listener.clone()));
                        }
                    }
                }
            }
        }

        for (node, listeners) in per_node {
            for listener in listeners {
                report.node_listeners_called += 1;
                if !run_isolated(|| listener(node)) {
                    report.record_failure(node.tag, ListenerTopology::Node);
                }
            }
        }
        for (tag, listener) in subtree {
            report.subtree_listeners_called += 1;
            if !run_isolated(|| (listener.0)()) {
                report.record_failure(tag, ListenerTopology::Subtree);
            }
        }

        report
    }

    /// Returns a [`StructuralObserver`] that forwards child mutations to the
    /// structural listeners in this hub.
    #[must_use]
    pub fn structural_fanout(&self) -> StructuralFanout<'_> {
        StructuralFanout {
            hub: self,
            failures: Vec::new(),
        }
    }
}

impl DispatchReport {
    fn record_failure(&mut self, tag: Tag, topology: ListenerTopology) {
        self.failed_listeners += 1;
        self.failures.push(ListenerFailure { tag, topology });
    }
}

/// Forwards child mutations to structural listeners and collects failures.
#[derive(Debug)]
pub struct StructuralFanout<'a> {
    hub: &'a ListenerHub,
    failures: Vec<ListenerFailure>,
}

impl StructuralFanout<'_> {
    /// Returns the invocations that panicked.
    #[must_use]
    pub fn into_failures(self) -> Vec<ListenerFailure> {
        self.failures
    }
}

impl StructuralObserver for StructuralFanout<'_> {
    fn on_child_mutation(&mut self, parent: Tag, event: &ChildMutation) {
        let listeners = snapshot(&self.hub.registry.borrow().structural, parent);
        for listener in listeners {
            if !run_isolated(|| listener(event)) {
                self.failures.push(ListenerFailure {
                    tag: parent,
                    topology: ListenerTopology::Structural,
                });
            }
        }
    }
}

/// Handle to one registered listener.
///
/// Dropping the handle does not unsubscribe. The handle does not keep the
/// registries alive.
#[derive(Clone, Debug)]
pub struct Subscription {
    registry: Weak<RefCell<Registry>>,
    topology: ListenerTopology,
    tag: Tag,
    id: ListenerId,
}

impl Subscription {
    /// Removes the listener. Calling this more than once, or from inside a
    /// callback, is fine.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(self.topology, self.tag, self.id);
        }
    }

    /// Returns the tag the listener is registered on.
    #[must_use]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the registry the listener lives in.
    #[must_use]
    pub fn topology(&self) -> ListenerTopology {
        self.topology
    }

    /// Converts the handle into a closure that unsubscribes, for use with a
    /// [`CleanupStack`](crate::cleanup::CleanupStack).
    pub fn into_cleanup(self) -> impl FnOnce() + 'static {
        move || self.unsubscribe()
    }
}
