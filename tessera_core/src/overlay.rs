// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animated property overlay.
//!
//! Animation drivers push property fragments per tag through a side channel.
//! The overlay keeps the merged result of every fragment pushed for a tag so
//! that a later structural UPDATE can re-apply it after its own merge. The
//! entry lives until the tag is deleted.

use hashbrown::HashMap;

use crate::props::{PropBag, merge_into};
use crate::tag::Tag;

/// Default keys routed to the typed `props` side of a node.
///
/// Everything else in an animated fragment lands on `raw_props`.
pub const DEFAULT_ANIMATED_PROP_KEYS: &[&str] = &[
    "opacity",
    "transform",
    "backgroundColor",
    "borderColor",
    "tintColor",
    "shadowColor",
    "shadowOpacity",
    "shadowRadius",
    "shadowOffset",
];

/// Per-tag merged animation fragments.
#[derive(Debug, Default)]
pub struct AnimatedOverlay {
    entries: HashMap<Tag, PropBag>,
}

impl AnimatedOverlay {
    /// Creates an empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `fragment` into the entry for `tag` and returns the result.
    pub fn merge(&mut self, tag: Tag, fragment: &PropBag) -> &PropBag {
        let entry = self.entries.entry(tag).or_default();
        merge_into(entry, fragment);
        entry
    }

    /// Returns the merged entry for `tag`.
    #[must_use]
    pub fn get(&self, tag: Tag) -> Option<&PropBag> {
        self.entries.get(&tag)
    }

    /// Drops the entry for `tag`.
    pub fn remove(&mut self, tag: Tag) -> Option<PropBag> {
        self.entries.remove(&tag)
    }

    /// Returns the number of tags with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no tag has an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn bag(value: Value) -> PropBag {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other:?}"),
        }
    }

    #[test]
    fn fragments_accumulate_per_tag() {
        let mut overlay = AnimatedOverlay::new();
        overlay.merge(Tag(1), &bag(json!({"opacity": 0.2, "x": 1})));
        let merged = overlay.merge(Tag(1), &bag(json!({"opacity": 0.8})));
        assert_eq!(merged["opacity"], json!(0.8));
        assert_eq!(merged["x"], json!(1));
        assert!(overlay.get(Tag(2)).is_none());
    }

    #[test]
    fn remove_forgets_entry() {
        let mut overlay = AnimatedOverlay::new();
        overlay.merge(Tag(1), &bag(json!({"opacity": 1})));
        assert_eq!(overlay.len(), 1);
        assert!(overlay.remove(Tag(1)).is_some());
        assert!(overlay.is_empty());
    }
}
