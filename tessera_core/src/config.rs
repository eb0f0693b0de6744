// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration.

use crate::gate::Readiness;
use crate::overlay::DEFAULT_ANIMATED_PROP_KEYS;
use crate::tree::DEFAULT_HINT_PREFIX;

/// Configuration for a [`TreeEngine`](crate::engine::TreeEngine).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Readiness the engine starts in.
    pub initial_readiness: Readiness,
    /// Keys of an animated fragment routed to `props`. Every other key goes
    /// to `raw_props`.
    pub animated_prop_keys: &'static [&'static str],
    /// Prefix that marks an external id as carrying hints.
    pub hint_prefix: &'static str,
}

impl EngineConfig {
    /// Starts ready, with the default key allowlist and hint prefix.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_readiness: Readiness::Ready,
            animated_prop_keys: DEFAULT_ANIMATED_PROP_KEYS,
            hint_prefix: DEFAULT_HINT_PREFIX,
        }
    }

    /// Starts not ready: notifications are buffered until the host calls
    /// [`set_readiness`](crate::engine::TreeEngine::set_readiness).
    #[must_use]
    pub const fn paused() -> Self {
        Self {
            initial_readiness: Readiness::NotReady,
            ..Self::new()
        }
    }

    /// Replaces the animated key allowlist.
    #[must_use]
    pub const fn with_animated_prop_keys(mut self, keys: &'static [&'static str]) -> Self {
        self.animated_prop_keys = keys;
        self
    }

    /// Replaces the hint prefix.
    #[must_use]
    pub const fn with_hint_prefix(mut self, prefix: &'static str) -> Self {
        self.hint_prefix = prefix;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_only_in_readiness() {
        let ready = EngineConfig::new();
        let paused = EngineConfig::paused();
        assert_eq!(ready.initial_readiness, Readiness::Ready);
        assert_eq!(paused.initial_readiness, Readiness::NotReady);
        assert_eq!(ready.hint_prefix, paused.hint_prefix);
        assert_eq!(ready.animated_prop_keys, paused.animated_prop_keys);
    }

    #[test]
    fn builders_override_fields() {
        const KEYS: &[&str] = &["opacity"];
        let config = EngineConfig::new().with_animated_prop_keys(KEYS).with_hint_prefix("@@");
        assert_eq!(config.animated_prop_keys, KEYS);
        assert_eq!(config.hint_prefix, "@@");
    }
}
