// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mirrored tree data model.
//!
//! A *node* is the local copy of one element of the remote tree. Each node
//! has:
//!
//! - An identity ([`Tag`](crate::tag::Tag)) assigned by the remote core.
//! - Structure: an optional parent and an ordered list of children. Only
//!   INSERT, REMOVE, and DELETE mutations change structure.
//! - Two property bags, `props` and `raw_props`. For dynamic binders
//!   `raw_props` is authoritative and `props` is derived from it on save.
//! - Opaque `state`, computed [`LayoutMetrics`], and a `render_key` revision
//!   counter that the [`NodeStore`] bumps on every save.
//!
//! Nodes are stored whole: the store replaces entries wholesale and never
//! edits a field in place.

pub mod external_id;
mod node;
mod store;

pub use external_id::{DEFAULT_HINT_PREFIX, ExternalId};
pub use node::{Descriptor, LayoutDirection, LayoutMetrics, Node, ROOT_TYPE};
pub use store::NodeStore;
