// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-type view facades over nodes.
//!
//! A [`WrapperRegistry`] maps a node's type discriminator to a factory that
//! builds a [`NodeWrapper`] for it. Types without a factory get an
//! [`IdentityWrapper`], which presents the node as stored. The store itself
//! never looks at types.

use alloc::boxed::Box;
use alloc::string::String;

use hashbrown::HashMap;

use crate::props::PropBag;
use crate::tag::Tag;
use crate::tree::Node;

/// A view facade built from a snapshot of one node.
pub trait NodeWrapper {
    /// The snapshot the wrapper was built from.
    fn node(&self) -> &Node;

    /// Properties as this wrapper presents them.
    fn props(&self) -> &PropBag {
        self.node().authoritative_props()
    }

    /// Tag of the wrapped node.
    fn tag(&self) -> Tag {
        self.node().tag
    }
}

/// Presents a node as stored.
#[derive(Clone, Debug, PartialEq)]
pub struct IdentityWrapper {
    node: Node,
}

impl IdentityWrapper {
    /// Wraps a snapshot of `node`.
    #[must_use]
    pub fn new(node: &Node) -> Self {
        Self { node: node.clone() }
    }
}

impl NodeWrapper for IdentityWrapper {
    fn node(&self) -> &Node {
        &self.node
    }
}

type Factory = Box<dyn Fn(&Node) -> Box<dyn NodeWrapper>>;

/// Type discriminator → wrapper factory.
#[derive(Default)]
pub struct WrapperRegistry {
    factories: HashMap<String, Factory>,
}

impl core::fmt::Debug for WrapperRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WrapperRegistry")
            .field("types", &self.factories.len())
            .finish_non_exhaustive()
    }
}

impl WrapperRegistry {
    /// Creates a registry with no factories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory for `type_name`, replacing any previous one.
    pub fn register<W, F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        W: NodeWrapper + 'static,
        F: Fn(&Node) -> W + 'static,
    {
        self.factories.insert(
            type_name.into(),
            Box::new(move |node: &Node| Box::new(factory(node)) as Box<dyn NodeWrapper>),
        );
    }

    /// Returns whether `type_name` has a factory.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Builds the wrapper for `node`.
    #[must_use]
    pub fn wrap(&self, node: &Node) -> Box<dyn NodeWrapper> {
        match self.factories.get(node.type_name.as_str()) {
            Some(factory) => factory(node),
            None => Box::new(IdentityWrapper::new(node)),
        }
    }
}
