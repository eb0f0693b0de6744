// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stable names for core enums, shared by the pretty printer and the
//! recorder.

use tessera_core::gate::Readiness;
use tessera_core::listener::ListenerTopology;
use tessera_core::mutation::{MutationKind, SkipReason};
use tessera_core::trace::{GateAction, RootAction};

pub(crate) fn mutation_kind(kind: MutationKind) -> &'static str {
    match kind {
        MutationKind::Create => "create",
        MutationKind::Insert => "insert",
        MutationKind::Update => "update",
        MutationKind::Remove => "remove",
        MutationKind::Delete => "delete",
        MutationKind::RemoveDeleteTree => "remove-delete-tree",
        MutationKind::AnimatedProps => "animated-props",
        MutationKind::State => "state",
    }
}

pub(crate) fn parse_mutation_kind(name: &str) -> Option<MutationKind> {
    Some(match name {
        "create" => MutationKind::Create,
        "insert" => MutationKind::Insert,
        "update" => MutationKind::Update,
        "remove" => MutationKind::Remove,
        "delete" => MutationKind::Delete,
        "remove-delete-tree" => MutationKind::RemoveDeleteTree,
        "animated-props" => MutationKind::AnimatedProps,
        "state" => MutationKind::State,
        _ => return None,
    })
}

pub(crate) fn skip_reason(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::MissingNode => "missing-node",
        SkipReason::MissingParent => "missing-parent",
        SkipReason::MissingChild => "missing-child",
        SkipReason::AlreadyLive => "already-live",
    }
}

pub(crate) fn parse_skip_reason(name: &str) -> Option<SkipReason> {
    Some(match name {
        "missing-node" => SkipReason::MissingNode,
        "missing-parent" => SkipReason::MissingParent,
        "missing-child" => SkipReason::MissingChild,
        "already-live" => SkipReason::AlreadyLive,
        _ => return None,
    })
}

pub(crate) fn readiness(readiness: Readiness) -> &'static str {
    match readiness {
        Readiness::NotReady => "not-ready",
        Readiness::Ready => "ready",
    }
}

pub(crate) fn parse_readiness(name: &str) -> Option<Readiness> {
    Some(match name {
        "not-ready" => Readiness::NotReady,
        "ready" => Readiness::Ready,
        _ => return None,
    })
}

pub(crate) fn gate_action(action: GateAction) -> &'static str {
    match action {
        GateAction::Buffered => "buffered",
        GateAction::Flushed => "flushed",
    }
}

pub(crate) fn parse_gate_action(name: &str) -> Option<GateAction> {
    Some(match name {
        "buffered" => GateAction::Buffered,
        "flushed" => GateAction::Flushed,
        _ => return None,
    })
}

pub(crate) fn topology(topology: ListenerTopology) -> &'static str {
    match topology {
        ListenerTopology::Node => "node",
        ListenerTopology::Subtree => "subtree",
        ListenerTopology::Structural => "structural",
    }
}

pub(crate) fn parse_topology(name: &str) -> Option<ListenerTopology> {
    Some(match name {
        "node" => ListenerTopology::Node,
        "subtree" => ListenerTopology::Subtree,
        "structural" => ListenerTopology::Structural,
        _ => return None,
    })
}

pub(crate) fn root_action(action: RootAction) -> &'static str {
    match action {
        RootAction::Created => "created",
        RootAction::DestroyDeferred => "destroy-deferred",
        RootAction::Destroyed => "destroyed",
    }
}

pub(crate) fn parse_root_action(name: &str) -> Option<RootAction> {
    Some(match name {
        "created" => RootAction::Created,
        "destroy-deferred" => RootAction::DestroyDeferred,
        "destroyed" => RootAction::Destroyed,
        _ => return None,
    })
}
