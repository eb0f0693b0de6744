// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node and descriptor records.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Rect;
use serde_json::Value;

use super::external_id::ExternalId;
use crate::props::PropBag;
use crate::tag::Tag;

/// Type discriminator of root nodes.
pub const ROOT_TYPE: &str = "RootView";

/// Writing direction a node was laid out in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayoutDirection {
    /// Direction was not resolved.
    #[default]
    Undefined,
    /// Left to right.
    Ltr,
    /// Right to left.
    Rtl,
}

/// Computed layout of a node, written by layout and read by consumers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutMetrics {
    /// Origin and size, in the parent's coordinate space.
    pub frame: Rect,
    /// Resolved writing direction.
    pub direction: LayoutDirection,
}

impl LayoutMetrics {
    /// Zero-sized metrics at the origin.
    pub const ZERO: Self = Self {
        frame: Rect::new(0.0, 0.0, 0.0, 0.0),
        direction: LayoutDirection::Undefined,
    };
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self::ZERO
    }
}

/// The authoritative record for one node, as decoded from the remote core.
///
/// Used by CREATE and UPDATE mutations. Structure (`parent_tag`,
/// `children_tags`) is not part of a descriptor: only INSERT and REMOVE
/// change it.
#[derive(Clone, Debug, PartialEq)]
pub struct Descriptor {
    /// Node identity.
    pub tag: Tag,
    /// Type discriminator.
    pub type_name: String,
    /// Typed (or precomputed) property bag.
    pub props: PropBag,
    /// Untransformed property bag.
    pub raw_props: PropBag,
    /// Opaque component state.
    pub state: Value,
    /// Computed layout.
    pub layout_metrics: LayoutMetrics,
    /// Whether `raw_props` is authoritative and `props` derived from it.
    pub is_dynamic_binder: bool,
    /// External id as sent, possibly carrying hints.
    pub external_id: Option<String>,
}

impl Descriptor {
    /// Creates a descriptor with empty bags, null state, and zero layout.
    #[must_use]
    pub fn new(tag: Tag, type_name: impl Into<String>) -> Self {
        Self {
            tag,
            type_name: type_name.into(),
            props: PropBag::new(),
            raw_props: PropBag::new(),
            state: Value::Null,
            layout_metrics: LayoutMetrics::ZERO,
            is_dynamic_binder: false,
            external_id: None,
        }
    }

    /// Sets the typed property bag.
    #[must_use]
    pub fn with_props(mut self, props: PropBag) -> Self {
        self.props = props;
        self
    }

    /// Sets the raw property bag.
    #[must_use]
    pub fn with_raw_props(mut self, raw_props: PropBag) -> Self {
        self.raw_props = raw_props;
        self
    }

    /// Sets the component state.
    #[must_use]
    pub fn with_state(mut self, state: Value) -> Self {
        self.state = state;
        self
    }

    /// Sets the layout metrics.
    #[must_use]
    pub fn with_layout(mut self, layout_metrics: LayoutMetrics) -> Self {
        self.layout_metrics = layout_metrics;
        self
    }

    /// Marks the descriptor as a dynamic binder.
    #[must_use]
    pub fn dynamic_binder(mut self) -> Self {
        self.is_dynamic_binder = true;
        self
    }

    /// Sets the raw external id.
    #[must_use]
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
}

/// A live node in the mirrored tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// Node identity.
    pub tag: Tag,
    /// Type discriminator.
    pub type_name: String,
    /// Parent, absent for roots and detached nodes.
    pub parent_tag: Option<Tag>,
    /// Children in render order.
    pub children_tags: Vec<Tag>,
    /// Typed property bag. Derived from `raw_props` for dynamic binders.
    pub props: PropBag,
    /// Untransformed property bag.
    pub raw_props: PropBag,
    /// Opaque component state.
    pub state: Value,
    /// Computed layout.
    pub layout_metrics: LayoutMetrics,
    /// Whether `raw_props` is authoritative.
    pub is_dynamic_binder: bool,
    /// Revision counter, bumped by the store on every save.
    pub render_key: u64,
    /// External id with hints stripped.
    pub external_id: Option<String>,
    /// Hints parsed out of the external id.
    pub hints: Vec<String>,
}

impl Node {
    /// Builds a detached node from a descriptor, parsing hints out of its
    /// external id with the given prefix.
    #[must_use]
    pub fn from_descriptor(descriptor: Descriptor, hint_prefix: &str) -> Self {
        let (external_id, hints) = split_external_id(descriptor.external_id.as_deref(), hint_prefix);
        Self {
            tag: descriptor.tag,
            type_name: descriptor.type_name,
            parent_tag: None,
            children_tags: Vec::new(),
            props: descriptor.props,
            raw_props: descriptor.raw_props,
            state: descriptor.state,
            layout_metrics: descriptor.layout_metrics,
            is_dynamic_binder: descriptor.is_dynamic_binder,
            render_key: 0,
            external_id,
            hints,
        }
    }

    /// Creates an empty root node.
    #[must_use]
    pub fn root(tag: Tag) -> Self {
        Self::from_descriptor(Descriptor::new(tag, ROOT_TYPE), "")
    }

    /// Returns whether this node is a root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.type_name == ROOT_TYPE
    }

    /// Returns the bag that is authoritative for this node.
    #[must_use]
    pub fn authoritative_props(&self) -> &PropBag {
        if self.is_dynamic_binder {
            &self.raw_props
        } else {
            &self.props
        }
    }

    /// Returns whether the external id carried the given hint.
    #[must_use]
    pub fn has_hint(&self, hint: &str) -> bool {
        self.hints.iter().any(|h| h == hint)
    }

    /// Returns the position of `child` in this node's children.
    #[must_use]
    pub fn child_index(&self, child: Tag) -> Option<usize> {
        self.children_tags.iter().position(|&t| t == child)
    }
}

fn split_external_id(raw: Option<&str>, hint_prefix: &str) -> (Option<String>, Vec<String>) {
    match raw {
        Some(raw) => {
            let parsed = ExternalId::parse(raw, hint_prefix);
            (Some(parsed.id.into()), parsed.hints().map(String::from).collect())
        }
        None => (None, Vec::new()),
    }
}
