// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract violations reported by the engine.
//!
//! Structural races inside a mutation batch are not errors; they are
//! reported as [`SkipReason`](crate::mutation::SkipReason)s. The variants
//! here cover misuse of the root lifecycle API, where the caller asked for
//! something that cannot be done. No variant is returned after the store
//! has been touched.

use crate::tag::Tag;

/// Errors returned by [`TreeEngine`](crate::engine::TreeEngine) root
/// lifecycle calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// `create_root` was called for a tag that is already a live root.
    #[error("root {0} already exists")]
    RootAlreadyExists(Tag),
    /// `create_root` was called for a tag held by a non-root node.
    #[error("tag {0} is in use by a non-root node")]
    TagInUse(Tag),
    /// `destroy_root` was called for a tag that is not live.
    #[error("no root with tag {0}")]
    UnknownRoot(Tag),
    /// `destroy_root` was called for a live node that is not a root.
    #[error("node {0} is not a root")]
    NotARoot(Tag),
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn messages_name_the_tag() {
        assert_eq!(EngineError::RootAlreadyExists(Tag(1)).to_string(), "root #1 already exists");
        assert_eq!(EngineError::NotARoot(Tag(9)).to_string(), "node #9 is not a root");
    }
}
