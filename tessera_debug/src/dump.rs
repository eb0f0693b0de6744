// Copyright 2026 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON snapshots for node inspection.
//!
//! [`subtree`] renders a node and its descendants as nested JSON objects,
//! children in render order. [`stats`] renders a
//! [`TreeStats`](tessera_core::engine::TreeStats).

use std::collections::HashSet;

use kurbo::Rect;
use serde_json::{Map, Value, json};
use tessera_core::engine::TreeStats;
use tessera_core::tag::Tag;
use tessera_core::tree::{LayoutDirection, Node, NodeStore};

/// Renders the subtree rooted at `root`, or `None` if `root` is not live.
///
/// Children that are not live are rendered as `{"tag": n, "missing": true}`.
/// A node reached twice (a corrupted cycle) is rendered as
/// `{"tag": n, "cycle": true}` the second time.
#[must_use]
pub fn subtree(store: &NodeStore, root: Tag) -> Option<Value> {
    let node = store.get(root)?;
    let mut visited = HashSet::new();
    Some(node_json(store, node, &mut visited))
}

/// Renders `root`'s subtree as pretty-printed JSON text.
#[must_use]
pub fn subtree_pretty(store: &NodeStore, root: Tag) -> Option<String> {
    subtree(store, root).and_then(|v| serde_json::to_string_pretty(&v).ok())
}

fn node_json(store: &NodeStore, node: &Node, visited: &mut HashSet<Tag>) -> Value {
    if !visited.insert(node.tag) {
        return json!({ "tag": node.tag.get(), "cycle": true });
    }
    let children: Vec<Value> = node
        .children_tags
        .iter()
        .map(|&child| match store.get(child) {
            Some(child) => node_json(store, child, visited),
            None => json!({ "tag": child.get(), "missing": true }),
        })
        .collect();

    let mut out = Map::new();
    out.insert("tag".into(), json!(node.tag.get()));
    out.insert("type".into(), json!(node.type_name));
    out.insert("renderKey".into(), json!(node.render_key));
    if let Some(id) = &node.external_id {
        out.insert("externalId".into(), json!(id));
    }
    if !node.hints.is_empty() {
        out.insert("hints".into(), json!(node.hints));
    }
    if node.is_dynamic_binder {
        out.insert("dynamicBinder".into(), Value::Bool(true));
    }
    out.insert("props".into(), Value::Object(node.props.clone()));
    out.insert("rawProps".into(), Value::Object(node.raw_props.clone()));
    if !node.state.is_null() {
        out.insert("state".into(), node.state.clone());
    }
    out.insert("frame".into(), frame_json(node.layout_metrics.frame));
    out.insert("direction".into(), json!(direction_name(node.layout_metrics.direction)));
    out.insert("children".into(), Value::Array(children));
    Value::Object(out)
}

fn frame_json(frame: Rect) -> Value {
    json!({
        "x": frame.x0,
        "y": frame.y0,
        "width": frame.width(),
        "height": frame.height(),
    })
}

fn direction_name(direction: LayoutDirection) -> &'static str {
    match direction {
        LayoutDirection::Undefined => "undefined",
        LayoutDirection::Ltr => "ltr",
        LayoutDirection::Rtl => "rtl",
    }
}

/// Renders tree statistics.
#[must_use]
pub fn stats(stats: &TreeStats) -> Value {
    let by_type: Vec<Value> = stats
        .by_type
        .iter()
        .map(|s| {
            json!({
                "type": s.type_name,
                "count": s.count,
                "share": s.share,
            })
        })
        .collect();
    json!({
        "total": stats.total,
        "animated": stats.animated,
        "externalIds": stats.external_ids,
        "byType": by_type,
    })
}

#[cfg(test)]
mod tests {
    use tessera_core::engine::TreeEngine;
    use tessera_core::mutation::Mutation;
    use tessera_core::tree::{Descriptor, LayoutMetrics};

    use super::*;

    fn engine() -> TreeEngine {
        let mut engine = TreeEngine::default();
        engine.create_root(Tag(1)).unwrap();
        let mut props = Map::new();
        props.insert("color".into(), json!("red"));
        let layout = LayoutMetrics {
            frame: Rect::new(10.0, 20.0, 110.0, 70.0),
            direction: LayoutDirection::Rtl,
        };
        engine.apply_batch([
            Mutation::Create(
                Descriptor::new(Tag(2), "View")
                    .with_props(props)
                    .with_layout(layout)
                    .with_external_id("__hints::lazy:card"),
            ),
            Mutation::Insert {
                parent: Tag(1),
                child: Tag(2),
                index: 0,
            },
            Mutation::Create(Descriptor::new(Tag(3), "Text")),
            Mutation::Insert {
                parent: Tag(2),
                child: Tag(3),
                index: 0,
            },
        ]);
        engine
    }

    #[test]
    fn subtree_nests_children_in_order() {
        let engine = engine();
        let dump = subtree(engine.store(), Tag(1)).unwrap();
        assert_eq!(dump["type"], json!("RootView"));
        let card = &dump["children"][0];
        assert_eq!(card["tag"], json!(2));
        assert_eq!(card["props"]["color"], json!("red"));
        assert_eq!(card["externalId"], json!("card"));
        assert_eq!(card["hints"], json!(["lazy"]));
        assert_eq!(card["frame"]["width"], json!(100.0));
        assert_eq!(card["direction"], json!("rtl"));
        assert_eq!(card["children"][0]["type"], json!("Text"));
    }

    #[test]
    fn subtree_of_missing_tag_is_none() {
        let engine = engine();
        assert!(subtree(engine.store(), Tag(42)).is_none());
        assert!(subtree_pretty(engine.store(), Tag(2)).is_some_and(|s| s.contains("\"card\"")));
    }

    #[test]
    fn stats_render_by_type() {
        let engine = engine();
        let dump = stats(&engine.stats());
        assert_eq!(dump["total"], json!(3));
        assert_eq!(dump["externalIds"], json!(1));
        assert_eq!(dump["byType"].as_array().map(Vec::len), Some(3));
    }
}
