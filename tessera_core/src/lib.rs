// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local mirror of a remotely computed UI descriptor tree.
//!
//! `tessera_core` keeps a queryable copy of a tree whose structure and
//! properties are computed elsewhere, applies batches of decoded mutation
//! records to it, and notifies local observers of what changed. It is
//! `no_std` compatible (with `alloc`) and single-threaded.
//!
//! # Architecture
//!
//! A batch flows through the engine like this:
//!
//! ```text
//!   [Mutation; n]
//!       │
//!       ▼
//!   MutationApplier ──► NodeStore / AnimatedOverlay
//!       │      │
//!       │      └──► StructuralObserver (child insert/update/remove, inline)
//!       ▼
//!   ChangedTags ──► ReadinessGate ──(ready)──► ListenerHub::dispatch()
//!                        │                       │
//!                   (not ready)            per-node listeners,
//!                    buffered              then subtree listeners
//! ```
//!
//! **[`tree`]**: [`Node`](tree::Node) and [`Descriptor`](tree::Descriptor)
//! records, the [`NodeStore`](tree::NodeStore), and external-id parsing.
//!
//! **[`props`]**: Property bag helpers (key-by-key merge, allowlist split).
//!
//! **[`overlay`]**: Per-tag animated property fragments that win over
//! structural updates.
//!
//! **[`mutation`]**: Mutation records and the
//! [`MutationApplier`](mutation::MutationApplier).
//!
//! **[`dirty`]**: Dirty-tracking channels via `understory_dirty`.
//!
//! **[`gate`]**: The [`ReadinessGate`](gate::ReadinessGate) that buffers
//! notifications until the host is ready.
//!
//! **[`listener`]**: Per-node, subtree, and structural listener registries.
//!
//! **[`engine`]**: [`TreeEngine`](engine::TreeEngine), the facade that wires
//! everything together.
//!
//! **[`wrapper`]** and **[`cleanup`]**: Per-type view facades and
//! reverse-order teardown.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types,
//! with the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Isolates listener and cleanup panics with
//!   unwind boundaries, and enables `std` support in dependencies. Without
//!   it a panicking listener or cleanup callback unwinds out of the dispatch
//!   or teardown that called it, and the callbacks after it do not run.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-record
//!   mutation events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod cleanup;
pub mod config;
pub mod dirty;
pub mod engine;
pub mod error;
pub mod gate;
mod isolate;
pub mod listener;
pub mod mutation;
pub mod overlay;
pub mod props;
pub mod tag;
pub mod trace;
pub mod tree;
pub mod wrapper;
