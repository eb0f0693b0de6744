// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, JSON recording, and tree dumps for tessera diagnostics.
//!
//! This crate provides [`TraceSink`](tessera_core::trace::TraceSink)
//! implementations for development and post-mortem analysis, plus JSON
//! snapshots for node inspection:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: JSON Lines recording with
//!   [`recorder::decode`] for playback.
//! - [`dump`]: JSON snapshots of a subtree and of
//!   [`TreeStats`](tessera_core::engine::TreeStats).

pub mod dump;
mod names;
pub mod pretty;
pub mod recorder;
