// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The [`ReadinessGate`](crate::gate::ReadinessGate) marks every tag a
//! mutation reports as changed into a [`understory_dirty`] tracker, keyed by
//! the tag's raw value. Two channels keep the two kinds of change apart:
//!
//! - [`NODE`]: the node's own fields changed (properties, state, parent).
//! - [`CHILDREN`]: the node's child list changed.
//!
//! Neither channel propagates: listeners on ancestors are reached by the
//! dispatcher's lineage walk, not by dirty propagation. Both channels are
//! drained together when the gate flushes, and a tag dirty on both is
//! dispatched once.

use understory_dirty::Channel;

/// A node's own fields changed.
pub const NODE: Channel = Channel::new(0);

/// A node's child list changed.
pub const CHILDREN: Channel = Channel::new(1);
