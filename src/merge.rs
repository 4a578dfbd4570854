//! Merging: schema forests from multiple plugins, and nested value tables.
//!
//! Plugin forests are combined as a left fold in ascending priority order,
//! so the last forest wins conflicts. The precedence contract:
//!
//! - Keys present on only one side pass through unchanged.
//! - Container meets container (and mode meets mode): the later side's
//!   metadata (`title`/`hint`/`family`, and a mode's `default`) wins, but
//!   children merge key-by-key with the same rule. This lets a plugin
//!   extend another plugin's group without redeclaring every sibling.
//! - Leaf meets leaf, or the two sides disagree on node type: the later
//!   side wins outright, no field-by-field merging.

use toml::Table;

use crate::schema::{Children, Forest, NodeKind, SchemaNode, Section};

/// Deep-merge `overlay` on top of `base`.
/// If both sides have a Table for the same key, recurse.
/// Otherwise, `overlay`'s value wins.
pub fn deep_merge(mut base: Table, overlay: Table) -> Table {
    for (key, overlay_val) in overlay {
        match (base.remove(&key), overlay_val) {
            (Some(toml::Value::Table(base_tbl)), toml::Value::Table(overlay_tbl)) => {
                base.insert(key, toml::Value::Table(deep_merge(base_tbl, overlay_tbl)));
            }
            (_, overlay_val) => {
                base.insert(key, overlay_val);
            }
        }
    }
    base
}

/// Merge two schema nodes declared at the same path, `b` taking precedence.
pub fn merge_nodes(a: &SchemaNode, b: &SchemaNode) -> SchemaNode {
    match (&a.kind, &b.kind) {
        (NodeKind::Container { children: ac }, NodeKind::Container { children: bc }) => {
            SchemaNode {
                kind: NodeKind::Container {
                    children: merge_children(ac, bc),
                },
                ..b.clone()
            }
        }
        (NodeKind::Mode { modes: am, .. }, NodeKind::Mode { modes: bm, default }) => SchemaNode {
            kind: NodeKind::Mode {
                modes: merge_children(am, bm),
                default: default.clone(),
            },
            ..b.clone()
        },
        // Leaf collision or type mismatch: later plugin wins outright.
        _ => b.clone(),
    }
}

/// Key-by-key child merge. Shared keys keep `a`'s position, `b`-only keys
/// append in `b`'s order.
fn merge_children(a: &Children, b: &Children) -> Children {
    let mut out = a.clone();
    for (key, b_node) in b {
        let merged = match out.get(key) {
            Some(a_node) => merge_nodes(a_node, b_node),
            None => b_node.clone(),
        };
        out.insert(key.clone(), merged);
    }
    out
}

fn merge_section(a: &Section, b: &Section) -> Section {
    let mut out = a.clone();
    for (key, b_node) in b {
        let merged = match out.get(key) {
            Some(a_node) => merge_nodes(a_node, b_node),
            None => b_node.clone(),
        };
        out.insert(key.clone(), merged);
    }
    out
}

fn merge_forest(a: &Forest, b: &Forest) -> Forest {
    let mut out = a.clone();
    for (key, b_section) in b {
        let merged = match out.get(key) {
            Some(a_section) => merge_section(a_section, b_section),
            None => b_section.clone(),
        };
        out.insert(key.clone(), merged);
    }
    out
}

/// Fold a sequence of plugin forests into one.
///
/// Forests must be supplied in ascending priority order: a later forest's
/// leaves, titles, and hints win on conflict. An empty sequence yields an
/// empty forest.
pub fn merge_forests<'a, I>(forests: I) -> Forest
where
    I: IntoIterator<Item = &'a Forest>,
{
    forests
        .into_iter()
        .fold(Forest::new(), |acc, next| merge_forest(&acc, next))
}
