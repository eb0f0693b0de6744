// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mutation records and the applier that turns them into store updates.
//!
//! [`MutationApplier::apply`] handles one record at a time and returns the
//! tags whose observable state changed. Records of a batch must be applied
//! in arrival order: an INSERT expects its child to have been created by an
//! earlier record, and REMOVE/DELETE undo edges established by earlier
//! INSERTs.
//!
//! Missing tags are structural races, not errors. Every operation that finds
//! a tag missing returns an outcome carrying a [`SkipReason`] and leaves the
//! store untouched.
//!
//! Child-structure events ([`ChildMutation`]) are delivered to a
//! [`StructuralObserver`] inline, while the record is being applied. They are
//! the only notifications not deferred to the end of the batch.

use alloc::vec::Vec;

use crate::config::EngineConfig;
use crate::overlay::AnimatedOverlay;
use crate::props::{PropBag, merge_into, merged_state, split_by_keys};
use crate::tag::Tag;
use crate::tree::{Descriptor, Node, NodeStore};

/// One structural edit of the mirrored tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    /// Registers a new, detached node.
    Create(Descriptor),
    /// Attaches `child` under `parent` at `index`.
    Insert {
        /// New parent.
        parent: Tag,
        /// Node being attached.
        child: Tag,
        /// Position among the parent's children.
        index: usize,
    },
    /// Merges a descriptor into the live node with the same tag.
    Update(Descriptor),
    /// Detaches `child` from `parent`. The child stays live.
    Remove {
        /// Current parent.
        parent: Tag,
        /// Node being detached.
        child: Tag,
        /// Index the remote core believes the child is at.
        index: usize,
    },
    /// Destroys a node.
    Delete {
        /// Node being destroyed.
        tag: Tag,
    },
    /// Marks that a subtree was torn down by the preceding records.
    RemoveDeleteTree {
        /// Root of the torn-down subtree.
        tag: Tag,
    },
}

/// Discriminant of a [`Mutation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// [`Mutation::Create`].
    Create,
    /// [`Mutation::Insert`].
    Insert,
    /// [`Mutation::Update`].
    Update,
    /// [`Mutation::Remove`].
    Remove,
    /// [`Mutation::Delete`].
    Delete,
    /// [`Mutation::RemoveDeleteTree`].
    RemoveDeleteTree,
    /// An animated property push (not a batch record).
    AnimatedProps,
    /// A wholesale state replacement (not a batch record).
    State,
}

impl Mutation {
    /// Returns the record's discriminant.
    #[must_use]
    pub const fn kind(&self) -> MutationKind {
        match self {
            Self::Create(_) => MutationKind::Create,
            Self::Insert { .. } => MutationKind::Insert,
            Self::Update(_) => MutationKind::Update,
            Self::Remove { .. } => MutationKind::Remove,
            Self::Delete { .. } => MutationKind::Delete,
            Self::RemoveDeleteTree { .. } => MutationKind::RemoveDeleteTree,
        }
    }

    /// Returns the tag the record is about (the child for INSERT/REMOVE).
    #[must_use]
    pub const fn tag(&self) -> Tag {
        match self {
            Self::Create(d) | Self::Update(d) => d.tag,
            Self::Insert { child, .. } | Self::Remove { child, .. } => *child,
            Self::Delete { tag } | Self::RemoveDeleteTree { tag } => *tag,
        }
    }
}

/// Tags whose observable state changed while applying one record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangedTags {
    /// Nodes whose own fields changed (properties, state, parent).
    pub nodes: Vec<Tag>,
    /// Nodes whose child list changed.
    pub children: Vec<Tag>,
}

impl ChangedTags {
    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.children.is_empty()
    }

    /// Returns whether `tag` changed in either category.
    #[must_use]
    pub fn contains(&self, tag: Tag) -> bool {
        self.nodes.contains(&tag) || self.children.contains(&tag)
    }

    /// Returns the union of both categories, sorted and deduplicated.
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self.nodes.iter().chain(&self.children).copied().collect();
        tags.sort_unstable();
        tags.dedup();
        tags
    }
}

/// Why a record was applied as a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The record's own tag is not live.
    MissingNode,
    /// The parent named by the record is not live.
    MissingParent,
    /// The child named by the record is not live.
    MissingChild,
    /// A CREATE named a tag that is already live.
    AlreadyLive,
}

/// Result of applying one record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MutationOutcome {
    /// Tags to notify once the batch is complete.
    pub changed: ChangedTags,
    /// Set when the record was a no-op because of a structural race.
    pub skipped: Option<SkipReason>,
}

impl MutationOutcome {
    fn changed(changed: ChangedTags) -> Self {
        Self {
            changed,
            skipped: None,
        }
    }

    fn skipped(reason: SkipReason) -> Self {
        Self {
            changed: ChangedTags::default(),
            skipped: Some(reason),
        }
    }
}

/// Kind of a [`ChildMutation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChildMutationKind {
    /// A child was inserted.
    InsertChild,
    /// A child's properties changed.
    UpdateChild,
    /// A child is about to be removed.
    RemoveChild,
}

/// Child-structure event delivered to a parent's structural listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChildMutation {
    /// What happened.
    pub kind: ChildMutationKind,
    /// Index of the child within the parent.
    pub child_index: usize,
    /// The child.
    pub child_tag: Tag,
}

/// Receives child-structure events as records are applied.
pub trait StructuralObserver {
    /// Called synchronously for each event on `parent`.
    fn on_child_mutation(&mut self, parent: Tag, event: &ChildMutation);
}

/// Applies mutation records and animated pushes to a [`NodeStore`].
///
/// Borrows exactly what it writes: the store and the overlay. Structural
/// events go to the observer passed to each call.
#[derive(Debug)]
pub struct MutationApplier<'a> {
    store: &'a mut NodeStore,
    overlay: &'a mut AnimatedOverlay,
    animated_prop_keys: &'static [&'static str],
    hint_prefix: &'static str,
}

impl<'a> MutationApplier<'a> {
    /// Creates an applier using the key allowlist and hint prefix from
    /// `config`.
    #[must_use]
    pub fn new(store: &'a mut NodeStore, overlay: &'a mut AnimatedOverlay, config: &EngineConfig) -> Self {
        Self {
            store,
            overlay,
            animated_prop_keys: config.animated_prop_keys,
            hint_prefix: config.hint_prefix,
        }
    }

    /// Applies one record.
    pub fn apply(&mut self, mutation: Mutation, observer: &mut dyn StructuralObserver) -> MutationOutcome {
        match mutation {
            Mutation::Create(descriptor) => self.create(descriptor),
            Mutation::Insert {
                parent,
                child,
                index,
            } => self.insert(parent, child, index, observer),
            Mutation::Update(descriptor) => self.update(descriptor, observer),
            Mutation::Remove {
                parent,
                child,
                index,
            } => self.remove(parent, child, index, observer),
            Mutation::Delete { tag } => self.delete(tag),
            Mutation::RemoveDeleteTree { .. } => MutationOutcome::default(),
        }
    }

    /// Merges an animation fragment into the overlay and onto the node.
    ///
    /// The overlay entry is kept even when the node is not live, so a later
    /// UPDATE still picks it up.
    pub fn push_animated_props(
        &mut self,
        tag: Tag,
        fragment: &PropBag,
        observer: &mut dyn StructuralObserver,
    ) -> MutationOutcome {
        let merged = self.overlay.merge(tag, fragment).clone();
        let Some(current) = self.store.get(tag) else {
            return MutationOutcome::skipped(SkipReason::MissingNode);
        };
        let (props_part, raw_part) = split_by_keys(&merged, self.animated_prop_keys);
        let mut next = current.clone();
        if next.is_dynamic_binder {
            // `props` is re-derived from `raw_props` on save.
            merge_into(&mut next.raw_props, &props_part);
        } else {
            merge_into(&mut next.props, &props_part);
        }
        merge_into(&mut next.raw_props, &raw_part);
        let parent = next.parent_tag;
        self.store.save(next);
        self.notify_updated(parent, tag, observer);
        MutationOutcome::changed(ChangedTags {
            nodes: alloc::vec![tag],
            children: Vec::new(),
        })
    }

    /// Replaces a node's state wholesale.
    pub fn set_state(&mut self, tag: Tag, state: serde_json::Value) -> MutationOutcome {
        let Some(current) = self.store.get(tag) else {
            return MutationOutcome::skipped(SkipReason::MissingNode);
        };
        let mut next = current.clone();
        next.state = state;
        self.store.save(next);
        MutationOutcome::changed(ChangedTags {
            nodes: alloc::vec![tag],
            children: Vec::new(),
        })
    }

    fn create(&mut self, descriptor: Descriptor) -> MutationOutcome {
        if self.store.contains(descriptor.tag) {
            return MutationOutcome::skipped(SkipReason::AlreadyLive);
        }
        self.store.save(Node::from_descriptor(descriptor, self.hint_prefix));
        MutationOutcome::default()
    }

    fn insert(
        &mut self,
        parent: Tag,
        child: Tag,
        index: usize,
        observer: &mut dyn StructuralObserver,
    ) -> MutationOutcome {
        let Some(mut child_node) = self.store.get(child).cloned() else {
            return MutationOutcome::skipped(SkipReason::MissingChild);
        };
        if !self.store.contains(parent) {
            return MutationOutcome::skipped(SkipReason::MissingParent);
        }
        let mut changed = ChangedTags::default();

        // A child attached elsewhere is detached from its old parent first.
        if let Some(old_parent) = child_node.parent_tag.filter(|&p| p != parent) {
            self.detach_from(old_parent, child, None, observer);
            changed.children.push(old_parent);
        }

        let Some(mut parent_node) = self.store.get(parent).cloned() else {
            return MutationOutcome::skipped(SkipReason::MissingParent);
        };
        if let Some(existing) = parent_node.child_index(child) {
            parent_node.children_tags.remove(existing);
        }
        let index = index.min(parent_node.children_tags.len());
        parent_node.children_tags.insert(index, child);
        child_node.parent_tag = Some(parent);

        self.store.save(child_node);
        self.store.save(parent_node);
        observer.on_child_mutation(
            parent,
            &ChildMutation {
                kind: ChildMutationKind::InsertChild,
                child_index: index,
                child_tag: child,
            },
        );

        changed.nodes.push(child);
        changed.children.push(parent);
        MutationOutcome::changed(changed)
    }

    fn update(&mut self, descriptor: Descriptor, observer: &mut dyn StructuralObserver) -> MutationOutcome {
        let tag = descriptor.tag;
        let Some(current) = self.store.get(tag) else {
            return MutationOutcome::skipped(SkipReason::MissingNode);
        };
        let incoming = Node::from_descriptor(descriptor, self.hint_prefix);
        let mut next = current.clone();

        next.type_name = incoming.type_name;
        next.layout_metrics = incoming.layout_metrics;
        next.is_dynamic_binder = incoming.is_dynamic_binder;
        next.external_id = incoming.external_id;
        next.hints = incoming.hints;
        merge_into(&mut next.props, &incoming.props);
        merge_into(&mut next.raw_props, &incoming.raw_props);
        next.state = merged_state(&next.state, &incoming.state);

        // Animation values win over whatever the structural update carried.
        if let Some(animated) = self.overlay.get(tag) {
            merge_into(&mut next.props, animated);
            merge_into(&mut next.raw_props, animated);
        }

        let parent = next.parent_tag;
        self.store.save(next);
        self.notify_updated(parent, tag, observer);
        MutationOutcome::changed(ChangedTags {
            nodes: alloc::vec![tag],
            children: Vec::new(),
        })
    }

    fn remove(
        &mut self,
        parent: Tag,
        child: Tag,
        index_hint: usize,
        observer: &mut dyn StructuralObserver,
    ) -> MutationOutcome {
        if !self.detach_from(parent, child, Some(index_hint), observer) {
            return MutationOutcome::skipped(SkipReason::MissingParent);
        }
        MutationOutcome::changed(ChangedTags {
            nodes: Vec::new(),
            children: alloc::vec![parent],
        })
    }

    fn delete(&mut self, tag: Tag) -> MutationOutcome {
        let Some(node) = self.store.get(tag) else {
            return MutationOutcome::skipped(SkipReason::MissingNode);
        };
        let mut changed = ChangedTags::default();
        if let Some(parent) = node.parent_tag {
            if let Some(mut parent_node) = self.store.get(parent).cloned() {
                if let Some(index) = parent_node.child_index(tag) {
                    parent_node.children_tags.remove(index);
                    self.store.save(parent_node);
                }
            }
            changed.children.push(parent);
        }
        self.store.delete(tag);
        self.overlay.remove(tag);
        MutationOutcome::changed(changed)
    }

    /// Emits REMOVE_CHILD on `parent`, then unlinks `child` on both sides.
    ///
    /// Returns `false` if `parent` is not live.
    fn detach_from(
        &mut self,
        parent: Tag,
        child: Tag,
        index_hint: Option<usize>,
        observer: &mut dyn StructuralObserver,
    ) -> bool {
        let Some(mut parent_node) = self.store.get(parent).cloned() else {
            return false;
        };
        let actual = parent_node.child_index(child);
        if let Some(child_index) = actual.or(index_hint) {
            observer.on_child_mutation(
                parent,
                &ChildMutation {
                    kind: ChildMutationKind::RemoveChild,
                    child_index,
                    child_tag: child,
                },
            );
        }
        if let Some(index) = actual {
            parent_node.children_tags.remove(index);
            self.store.save(parent_node);
        }
        if let Some(mut child_node) = self.store.get(child).cloned() {
            if child_node.parent_tag == Some(parent) {
                child_node.parent_tag = None;
                self.store.save(child_node);
            }
        }
        true
    }

    fn notify_updated(&self, parent: Option<Tag>, child: Tag, observer: &mut dyn StructuralObserver) {
        let Some(parent) = parent else {
            return;
        };
        let Some(child_index) = self.store.get(parent).and_then(|p| p.child_index(child)) else {
            return;
        };
        observer.on_child_mutation(
            parent,
            &ChildMutation {
                kind: ChildMutationKind::UpdateChild,
                child_index,
                child_tag: child,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use serde_json::{Value, json};

    use super::*;

    fn bag(value: Value) -> PropBag {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other:?}"),
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Vec<(Tag, ChildMutation)>,
    }

    impl StructuralObserver for RecordingObserver {
        fn on_child_mutation(&mut self, parent: Tag, event: &ChildMutation) {
            self.events.push((parent, *event));
        }
    }

    struct Fixture {
        store: NodeStore,
        overlay: AnimatedOverlay,
        config: EngineConfig,
        observer: RecordingObserver,
    }

    impl Fixture {
        fn new() -> Self {
            let mut store = NodeStore::new();
            store.save(Node::root(Tag(1)));
            Self {
                store,
                overlay: AnimatedOverlay::new(),
                config: EngineConfig::new(),
                observer: RecordingObserver::default(),
            }
        }

        fn apply(&mut self, mutation: Mutation) -> MutationOutcome {
            MutationApplier::new(&mut self.store, &mut self.overlay, &self.config).apply(mutation, &mut self.observer)
        }

        fn push(&mut self, tag: Tag, fragment: Value) -> MutationOutcome {
            MutationApplier::new(&mut self.store, &mut self.overlay, &self.config).push_animated_props(
                tag,
                &bag(fragment),
                &mut self.observer,
            )
        }

        fn create_child(&mut self, tag: u32, index: usize) {
            self.apply(Mutation::Create(Descriptor::new(Tag(tag), "View")));
            self.apply(Mutation::Insert {
                parent: Tag(1),
                child: Tag(tag),
                index,
            });
        }

        fn children(&self, tag: u32) -> Vec<Tag> {
            self.store.get(Tag(tag)).map(|n| n.children_tags.clone()).unwrap_or_default()
        }
    }

    #[test]
    fn create_produces_no_changes() {
        let mut fx = Fixture::new();
        let outcome = fx.apply(Mutation::Create(Descriptor::new(Tag(2), "View")));
        assert!(outcome.changed.is_empty());
        assert!(outcome.skipped.is_none());
        assert!(fx.store.contains(Tag(2)));
    }

    #[test]
    fn create_of_live_tag_is_skipped_and_keeps_links() {
        let mut fx = Fixture::new();
        fx.create_child(2, 0);
        fx.apply(Mutation::Create(Descriptor::new(Tag(3), "Text")));
        fx.apply(Mutation::Insert {
            parent: Tag(2),
            child: Tag(3),
            index: 0,
        });
        let render_key = fx.store.get(Tag(2)).map(|n| n.render_key);

        let outcome = fx.apply(Mutation::Create(Descriptor::new(Tag(2), "Other")));
        assert_eq!(outcome.skipped, Some(SkipReason::AlreadyLive));
        assert!(outcome.changed.is_empty());

        let node = fx.store.get(Tag(2)).unwrap();
        assert_eq!(node.type_name, "View");
        assert_eq!(node.parent_tag, Some(Tag(1)));
        assert_eq!(node.children_tags, vec![Tag(3)]);
        assert_eq!(Some(node.render_key), render_key);
        assert_eq!(fx.children(1), vec![Tag(2)]);
        assert_eq!(fx.store.get(Tag(3)).unwrap().parent_tag, Some(Tag(2)));
    }

    #[test]
    fn create_then_insert_links_both_sides() {
        let mut fx = Fixture::new();
        let desc = Descriptor::new(Tag(2), "X").with_props(bag(json!({"color": "red"})));
        fx.apply(Mutation::Create(desc));
        let outcome = fx.apply(Mutation::Insert {
            parent: Tag(1),
            child: Tag(2),
            index: 0,
        });

        assert_eq!(fx.children(1), vec![Tag(2)]);
        let child = fx.store.get(Tag(2)).map(Clone::clone);
        assert_eq!(child.as_ref().and_then(|n| n.parent_tag), Some(Tag(1)));
        assert_eq!(child.map(|n| n.props["color"].clone()), Some(json!("red")));
        assert_eq!(outcome.changed.to_sorted_vec(), vec![Tag(1), Tag(2)]);
        assert_eq!(fx.store.lineage_tags(Tag(2)), vec![Tag(1), Tag(2)]);
    }

    #[test]
    fn insert_shifts_later_children_right() {
        let mut fx = Fixture::new();
        fx.create_child(2, 0);
        fx.create_child(3, 1);
        fx.create_child(4, 2);
        fx.create_child(5, 1);
        assert_eq!(fx.children(1), vec![Tag(2), Tag(5), Tag(3), Tag(4)]);
    }

    #[test]
    fn insert_index_past_end_appends() {
        let mut fx = Fixture::new();
        fx.create_child(2, 0);
        fx.create_child(3, 40);
        assert_eq!(fx.children(1), vec![Tag(2), Tag(3)]);
    }

    #[test]
    fn reinsert_keeps_child_listed_once() {
        let mut fx = Fixture::new();
        fx.create_child(2, 0);
        fx.create_child(3, 1);
        fx.apply(Mutation::Insert {
            parent: Tag(1),
            child: Tag(2),
            index: 1,
        });
        assert_eq!(fx.children(1), vec![Tag(3), Tag(2)]);
    }

    #[test]
    fn insert_under_new_parent_detaches_from_old() {
        let mut fx = Fixture::new();
        fx.create_child(2, 0);
        fx.create_child(3, 1);
        let outcome = fx.apply(Mutation::Insert {
            parent: Tag(2),
            child: Tag(3),
            index: 0,
        });
        assert_eq!(fx.children(1), vec![Tag(2)]);
        assert_eq!(fx.children(2), vec![Tag(3)]);
        assert!(outcome.changed.children.contains(&Tag(1)));
    }

    #[test]
    fn insert_emits_structural_event() {
        let mut fx = Fixture::new();
        fx.create_child(2, 0);
        assert_eq!(
            fx.observer.events,
            vec![(
                Tag(1),
                ChildMutation {
                    kind: ChildMutationKind::InsertChild,
                    child_index: 0,
                    child_tag: Tag(2),
                }
            )]
        );
    }

    #[test]
    fn insert_with_missing_child_is_skipped() {
        let mut fx = Fixture::new();
        let outcome = fx.apply(Mutation::Insert {
            parent: Tag(1),
            child: Tag(9),
            index: 0,
        });
        assert_eq!(outcome.skipped, Some(SkipReason::MissingChild));
        assert!(fx.children(1).is_empty());
    }

    #[test]
    fn update_merges_bags_and_keeps_children() {
        let mut fx = Fixture::new();
        let desc = Descriptor::new(Tag(2), "View")
            .with_props(bag(json!({"color": "red", "width": 10})))
            .with_state(json!({"pressed": false}));
        fx.apply(Mutation::Create(desc));
        fx.apply(Mutation::Insert {
            parent: Tag(1),
            child: Tag(2),
            index: 0,
        });
        fx.apply(Mutation::Create(Descriptor::new(Tag(3), "View")));
        fx.apply(Mutation::Insert {
            parent: Tag(2),
            child: Tag(3),
            index: 0,
        });

        let update = Descriptor::new(Tag(2), "View")
            .with_props(bag(json!({"width": 20})))
            .with_state(json!({"focused": true}));
        let outcome = fx.apply(Mutation::Update(update));

        let node = fx.store.get(Tag(2)).cloned().unwrap_or_else(|| Node::root(Tag(0)));
        assert_eq!(node.props["color"], json!("red"));
        assert_eq!(node.props["width"], json!(20));
        assert_eq!(node.state, json!({"pressed": false, "focused": true}));
        assert_eq!(node.children_tags, vec![Tag(3)]);
        assert_eq!(node.parent_tag, Some(Tag(1)));
        assert_eq!(outcome.changed.nodes, vec![Tag(2)]);
    }

    #[test]
    fn update_emits_update_child_with_current_index() {
        let mut fx = Fixture::new();
        fx.create_child(2, 0);
        fx.create_child(3, 0);
        fx.observer.events.clear();
        fx.apply(Mutation::Update(Descriptor::new(Tag(2), "View")));
        assert_eq!(
            fx.observer.events,
            vec![(
                Tag(1),
                ChildMutation {
                    kind: ChildMutationKind::UpdateChild,
                    child_index: 1,
                    child_tag: Tag(2),
                }
            )]
        );
    }

    #[test]
    fn update_of_unknown_tag_is_skipped() {
        let mut fx = Fixture::new();
        let outcome = fx.apply(Mutation::Update(Descriptor::new(Tag(42), "View")));
        assert_eq!(outcome.skipped, Some(SkipReason::MissingNode));
        assert!(!fx.store.contains(Tag(42)));
    }

    #[test]
    fn animated_props_survive_unrelated_update() {
        let mut fx = Fixture::new();
        fx.create_child(2, 0);
        fx.push(Tag(2), json!({"a": 1}));
        fx.apply(Mutation::Update(
            Descriptor::new(Tag(2), "View").with_raw_props(bag(json!({"b": 2}))),
        ));
        let node = fx.store.get(Tag(2)).cloned().unwrap_or_else(|| Node::root(Tag(0)));
        assert_eq!(node.raw_props["a"], json!(1));
        assert_eq!(node.raw_props["b"], json!(2));
    }

    #[test]
    fn animated_props_win_over_structural_update() {
        let mut fx = Fixture::new();
        fx.create_child(2, 0);
        fx.push(Tag(2), json!({"opacity": 0.25}));
        fx.apply(Mutation::Update(
            Descriptor::new(Tag(2), "View").with_props(bag(json!({"opacity": 1.0}))),
        ));
        let node = fx.store.get(Tag(2)).cloned().unwrap_or_else(|| Node::root(Tag(0)));
        assert_eq!(node.props["opacity"], json!(0.25));
    }

    #[test]
    fn animated_push_splits_by_allowlist() {
        let mut fx = Fixture::new();
        fx.create_child(2, 0);
        fx.observer.events.clear();
        let outcome = fx.push(Tag(2), json!({"opacity": 0.5, "progress": 0.3}));
        let node = fx.store.get(Tag(2)).cloned().unwrap_or_else(|| Node::root(Tag(0)));
        assert_eq!(node.props.get("opacity"), Some(&json!(0.5)));
        assert!(node.props.get("progress").is_none());
        assert_eq!(node.raw_props.get("progress"), Some(&json!(0.3)));
        assert_eq!(outcome.changed.nodes, vec![Tag(2)]);
        assert_eq!(fx.observer.events.len(), 1);
        assert_eq!(fx.observer.events[0].1.kind, ChildMutationKind::UpdateChild);
    }

    #[test]
    fn animated_push_for_missing_node_is_kept_for_later() {
        let mut fx = Fixture::new();
        let outcome = fx.push(Tag(2), json!({"opacity": 0.1}));
        assert_eq!(outcome.skipped, Some(SkipReason::MissingNode));
        assert!(fx.overlay.get(Tag(2)).is_some());
    }

    #[test]
    fn animated_push_on_dynamic_binder_keeps_bags_consistent() {
        let mut fx = Fixture::new();
        fx.apply(Mutation::Create(
            Descriptor::new(Tag(2), "Custom")
                .with_raw_props(bag(json!({"label": "x"})))
                .dynamic_binder(),
        ));
        fx.push(Tag(2), json!({"opacity": 0.5}));
        let node = fx.store.get(Tag(2)).cloned().unwrap_or_else(|| Node::root(Tag(0)));
        assert_eq!(node.props, node.raw_props);
        assert_eq!(node.props["opacity"], json!(0.5));
        assert_eq!(node.props["label"], json!("x"));
    }

    #[test]
    fn remove_detaches_and_reports_parent() {
        let mut fx = Fixture::new();
        fx.create_child(2, 0);
        fx.create_child(3, 1);
        fx.observer.events.clear();
        let outcome = fx.apply(Mutation::Remove {
            parent: Tag(1),
            child: Tag(2),
            index: 7,
        });
        assert_eq!(fx.children(1), vec![Tag(3)]);
        assert_eq!(fx.store.get(Tag(2)).and_then(|n| n.parent_tag), None);
        assert!(fx.store.contains(Tag(2)));
        assert_eq!(outcome.changed.to_sorted_vec(), vec![Tag(1)]);
        // The real index wins over the hint.
        assert_eq!(fx.observer.events[0].1.child_index, 0);
        assert_eq!(fx.observer.events[0].1.kind, ChildMutationKind::RemoveChild);
    }

    #[test]
    fn remove_falls_back_to_hint_for_event_index() {
        let mut fx = Fixture::new();
        fx.apply(Mutation::Create(Descriptor::new(Tag(2), "View")));
        fx.apply(Mutation::Remove {
            parent: Tag(1),
            child: Tag(2),
            index: 3,
        });
        assert_eq!(fx.observer.events.last().map(|e| e.1.child_index), Some(3));
    }

    #[test]
    fn remove_with_missing_parent_is_noop() {
        let mut fx = Fixture::new();
        fx.create_child(2, 0);
        let outcome = fx.apply(Mutation::Remove {
            parent: Tag(50),
            child: Tag(2),
            index: 0,
        });
        assert_eq!(outcome.skipped, Some(SkipReason::MissingParent));
        assert!(outcome.changed.is_empty());
        assert_eq!(fx.store.get(Tag(2)).and_then(|n| n.parent_tag), Some(Tag(1)));
    }

    #[test]
    fn remove_then_delete_leaves_nothing_behind() {
        let mut fx = Fixture::new();
        fx.create_child(2, 0);
        fx.push(Tag(2), json!({"opacity": 0.5}));
        fx.apply(Mutation::Remove {
            parent: Tag(1),
            child: Tag(2),
            index: 0,
        });
        let outcome = fx.apply(Mutation::Delete { tag: Tag(2) });
        assert!(fx.store.get(Tag(2)).is_none());
        assert!(fx.children(1).is_empty());
        assert!(fx.overlay.get(Tag(2)).is_none());
        assert!(outcome.changed.is_empty());
    }

    #[test]
    fn delete_attached_node_unlinks_from_parent() {
        let mut fx = Fixture::new();
        fx.create_child(2, 0);
        let outcome = fx.apply(Mutation::Delete { tag: Tag(2) });
        assert!(fx.children(1).is_empty());
        assert_eq!(outcome.changed.children, vec![Tag(1)]);
    }

    #[test]
    fn remove_delete_tree_is_a_marker() {
        let mut fx = Fixture::new();
        fx.create_child(2, 0);
        let before = fx.store.get(Tag(1)).map(|n| n.render_key);
        let outcome = fx.apply(Mutation::RemoveDeleteTree { tag: Tag(2) });
        assert_eq!(outcome, MutationOutcome::default());
        assert_eq!(fx.store.get(Tag(1)).map(|n| n.render_key), before);
    }

    #[test]
    fn render_key_strictly_increases_across_mutations() {
        let mut fx = Fixture::new();
        fx.create_child(2, 0);
        let mut last = fx.store.get(Tag(2)).map(|n| n.render_key);
        for step in 0..5 {
            if step % 2 == 0 {
                fx.apply(Mutation::Update(Descriptor::new(Tag(2), "View")));
            } else {
                fx.push(Tag(2), json!({"opacity": step}));
            }
            let now = fx.store.get(Tag(2)).map(|n| n.render_key);
            assert!(now > last, "render key must grow: {now:?} <= {last:?}");
            last = now;
        }
    }

    #[test]
    fn set_state_replaces_wholesale() {
        let mut fx = Fixture::new();
        fx.apply(Mutation::Create(
            Descriptor::new(Tag(2), "View").with_state(json!({"a": 1, "b": 2})),
        ));
        let mut applier = MutationApplier::new(&mut fx.store, &mut fx.overlay, &fx.config);
        let outcome = applier.set_state(Tag(2), json!({"c": 3}));
        assert_eq!(outcome.changed.nodes, vec![Tag(2)]);
        assert_eq!(fx.store.get(Tag(2)).map(|n| n.state.clone()), Some(json!({"c": 3})));
    }

    #[test]
    fn mutation_kind_and_tag() {
        let m = Mutation::Insert {
            parent: Tag(1),
            child: Tag(2),
            index: 0,
        };
        assert_eq!(m.kind(), MutationKind::Insert);
        assert_eq!(m.tag(), Tag(2));
        assert_eq!(Mutation::Delete { tag: Tag(5) }.tag(), Tag(5));
    }
}
