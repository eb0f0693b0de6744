// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node storage with single-node bookkeeping.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use super::external_id::ExternalIdIndex;
use super::node::Node;
use crate::tag::Tag;

/// Owns every live node, keyed by [`Tag`].
///
/// The store only guarantees that single-node bookkeeping is consistent: the
/// render key sequence and the external-id index. Keeping both sides of a
/// parent/child edge in lockstep is the job of the
/// [`MutationApplier`](crate::mutation::MutationApplier), which always writes
/// whole nodes through [`save`](Self::save).
#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: HashMap<Tag, Node>,
    external_ids: ExternalIdIndex,
}

impl NodeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Queries --

    /// Returns the node for `tag`, if live.
    #[must_use]
    pub fn get(&self, tag: Tag) -> Option<&Node> {
        self.nodes.get(&tag)
    }

    /// Returns whether `tag` is live.
    #[must_use]
    pub fn contains(&self, tag: Tag) -> bool {
        self.nodes.contains_key(&tag)
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the store holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns all live tags in ascending order.
    #[must_use]
    pub fn tags(&self) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self.nodes.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    /// Looks a node up by its external id (hints stripped).
    #[must_use]
    pub fn find_by_external_id(&self, id: &str) -> Option<&Node> {
        self.external_ids.get(id).and_then(|tag| self.nodes.get(&tag))
    }

    /// Returns the number of external ids currently indexed.
    #[must_use]
    pub fn external_id_count(&self) -> usize {
        self.external_ids.len()
    }

    /// Returns the path from the outermost ancestor down to `tag`, inclusive.
    ///
    /// Empty if `tag` is not live. The walk stops at the first parent that is
    /// not live, and never takes more steps than there are live nodes.
    #[must_use]
    pub fn lineage(&self, tag: Tag) -> Vec<&Node> {
        let mut path = Vec::new();
        let mut current = self.nodes.get(&tag);
        while let Some(node) = current {
            if path.len() == self.nodes.len() {
                break;
            }
            path.push(node);
            current = node.parent_tag.and_then(|p| self.nodes.get(&p));
        }
        path.reverse();
        path
    }

    /// Like [`lineage`](Self::lineage), but returns tags only.
    #[must_use]
    pub fn lineage_tags(&self, tag: Tag) -> Vec<Tag> {
        self.lineage(tag).into_iter().map(|n| n.tag).collect()
    }

    /// Counts live nodes grouped by type.
    #[must_use]
    pub fn stats_by_type(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for node in self.nodes.values() {
            *counts.entry(node.type_name.clone()).or_insert(0) += 1;
        }
        counts
    }

    // -- Mutation --

    /// Stores `node`, replacing any previous entry for its tag.
    ///
    /// The render key becomes the previous value plus one, or 0 for a tag
    /// that was not live. Dynamic binders get `props` re-derived from
    /// `raw_props`. Returns the assigned render key.
    pub fn save(&mut self, mut node: Node) -> u64 {
        let tag = node.tag;
        let previous = self.nodes.get(&tag);
        node.render_key = previous.map_or(0, |p| p.render_key + 1);
        if let Some(stale) = previous.and_then(|p| p.external_id.as_deref()) {
            self.external_ids.remove_if_owned(stale, tag);
        }
        if node.is_dynamic_binder {
            node.props = node.raw_props.clone();
        }
        if let Some(id) = node.external_id.as_deref() {
            self.external_ids.insert(id, tag);
        }
        let render_key = node.render_key;
        self.nodes.insert(tag, node);
        render_key
    }

    /// Removes `tag` and its external-id mapping. Children are untouched.
    pub fn delete(&mut self, tag: Tag) -> Option<Node> {
        let node = self.nodes.remove(&tag)?;
        if let Some(id) = node.external_id.as_deref() {
            self.external_ids.remove_if_owned(id, tag);
        }
        Some(node)
    }
}
