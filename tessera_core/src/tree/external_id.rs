// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! External ids and the hint syntax embedded in them.
//!
//! A raw external id either is the id itself, or has the shape
//! `<prefix>hint1;hint2:<id>`. Hints are flags the remote side attaches to a
//! node without adding a dedicated property.

use alloc::string::String;

use hashbrown::HashMap;

use crate::tag::Tag;

/// Hint prefix used unless the engine is configured otherwise.
pub const DEFAULT_HINT_PREFIX: &str = "__hints::";

/// A parsed external id borrowing from the raw string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExternalId<'a> {
    /// The id with prefix and hints stripped.
    pub id: &'a str,
    hints: &'a str,
}

impl<'a> ExternalId<'a> {
    /// Parses a raw external id.
    ///
    /// An empty `prefix` disables hint parsing. A prefixed id without a `:`
    /// separator is taken verbatim with no hints.
    #[must_use]
    pub fn parse(raw: &'a str, prefix: &str) -> Self {
        if !prefix.is_empty() {
            if let Some(rest) = raw.strip_prefix(prefix) {
                if let Some((hints, id)) = rest.split_once(':') {
                    return Self { id, hints };
                }
            }
        }
        Self { id: raw, hints: "" }
    }

    /// Iterates over the non-empty hints.
    pub fn hints(&self) -> impl Iterator<Item = &'a str> {
        self.hints.split(';').filter(|h| !h.is_empty())
    }
}

/// Reverse lookup from external id to tag.
#[derive(Debug, Default)]
pub(crate) struct ExternalIdIndex {
    by_id: HashMap<String, Tag>,
}

impl ExternalIdIndex {
    pub(crate) fn get(&self, id: &str) -> Option<Tag> {
        self.by_id.get(id).copied()
    }

    pub(crate) fn insert(&mut self, id: &str, tag: Tag) {
        self.by_id.insert(id.into(), tag);
    }

    /// Removes `id` only if it still maps to `tag`.
    pub(crate) fn remove_if_owned(&mut self, id: &str, tag: Tag) {
        if self.by_id.get(id) == Some(&tag) {
            self.by_id.remove(id);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn plain_id_has_no_hints() {
        let parsed = ExternalId::parse("submit-button", DEFAULT_HINT_PREFIX);
        assert_eq!(parsed.id, "submit-button");
        assert_eq!(parsed.hints().count(), 0);
    }

    #[test]
    fn prefixed_id_yields_hints_and_id() {
        let parsed = ExternalId::parse("__hints::a;;b:list", DEFAULT_HINT_PREFIX);
        assert_eq!(parsed.id, "list");
        assert_eq!(parsed.hints().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn id_may_contain_colons() {
        let parsed = ExternalId::parse("__hints::x:ns:item", DEFAULT_HINT_PREFIX);
        assert_eq!(parsed.id, "ns:item");
        assert_eq!(parsed.hints().collect::<Vec<_>>(), ["x"]);
    }

    #[test]
    fn prefix_without_separator_is_verbatim() {
        let parsed = ExternalId::parse("__hints::orphan", DEFAULT_HINT_PREFIX);
        assert_eq!(parsed.id, "__hints::orphan");
        assert_eq!(parsed.hints().count(), 0);
    }

    #[test]
    fn index_only_removes_owned_mapping() {
        let mut index = ExternalIdIndex::default();
        index.insert("x", Tag(1));
        index.insert("x", Tag(2));
        index.remove_if_owned("x", Tag(1));
        assert_eq!(index.get("x"), Some(Tag(2)));
        index.remove_if_owned("x", Tag(2));
        assert_eq!(index.get("x"), None);
        assert_eq!(index.len(), 0);
    }
}
