// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property bags and the merge rules shared by updates and the animated
//! overlay.
//!
//! A [`PropBag`] is a JSON object. Merging is shallow: keys present in the
//! incoming bag replace the stored value, keys absent from it keep whatever
//! was stored before.

use alloc::string::String;

use serde_json::{Map, Value};

/// A property bag as sent by the remote core.
pub type PropBag = Map<String, Value>;

/// Merges `incoming` into `base`, incoming keys winning.
pub fn merge_into(base: &mut PropBag, incoming: &PropBag) {
    for (key, value) in incoming {
        base.insert(key.clone(), value.clone());
    }
}

/// Returns `base` with `incoming` merged on top.
#[must_use]
pub fn merged(base: &PropBag, incoming: &PropBag) -> PropBag {
    let mut out = base.clone();
    merge_into(&mut out, incoming);
    out
}

/// Merges opaque component state.
///
/// Two objects merge key-by-key. Any other combination takes the incoming
/// value, except that an incoming `null` keeps the stored state (the remote
/// core sends `null` when an update carries no state).
#[must_use]
pub fn merged_state(base: &Value, incoming: &Value) -> Value {
    match (base, incoming) {
        (Value::Object(base), Value::Object(incoming)) => Value::Object(merged(base, incoming)),
        (_, Value::Null) => base.clone(),
        (_, incoming) => incoming.clone(),
    }
}

/// Splits a fragment into the keys that belong on the typed `props` side and
/// everything else, which belongs on `raw_props`.
#[must_use]
pub fn split_by_keys(fragment: &PropBag, props_keys: &[&str]) -> (PropBag, PropBag) {
    let mut props = PropBag::new();
    let mut raw = PropBag::new();
    for (key, value) in fragment {
        if props_keys.contains(&key.as_str()) {
            props.insert(key.clone(), value.clone());
        } else {
            raw.insert(key.clone(), value.clone());
        }
    }
    (props, raw)
}
