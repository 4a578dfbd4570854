//! Depth-first traversal over schema trees.
//!
//! This is the single traversal implementation shared by default extraction
//! and comment rendering — nothing else in the crate recurses over schema
//! structure for per-node work. The sequence is pre-order and follows
//! insertion order of `children`/`modes`, so repeated walks of the same
//! tree produce identical sequences. File formatting and the persistence
//! hash depend on that determinism.

use crate::schema::{Forest, NodeKind, SchemaNode};

/// One visited node: the path that addresses it and the node itself.
///
/// Paths start at `[section, container]`; a mode's named sub-trees appear
/// as `[.., mode_name]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Visit<'a> {
    pub path: Vec<String>,
    pub node: &'a SchemaNode,
}

/// Walk a whole forest in section → container → subtree order.
pub fn walk_forest(forest: &Forest) -> Vec<Visit<'_>> {
    let mut out = Vec::new();
    for (sec_name, section) in forest {
        for (cont_name, node) in section {
            walk_node(node, vec![sec_name.clone(), cont_name.clone()], &mut out);
        }
    }
    out
}

/// Walk a single subtree rooted at `path`, visiting the root first.
pub fn walk_node<'a>(node: &'a SchemaNode, path: Vec<String>, out: &mut Vec<Visit<'a>>) {
    out.push(Visit {
        path: path.clone(),
        node,
    });
    match &node.kind {
        NodeKind::Container { children } => {
            for (name, child) in children {
                let mut child_path = path.clone();
                child_path.push(name.clone());
                walk_node(child, child_path, out);
            }
        }
        NodeKind::Mode { modes, .. } => {
            for (name, mode) in modes {
                let mut mode_path = path.clone();
                mode_path.push(name.clone());
                walk_node(mode, mode_path, out);
            }
        }
        _ => {}
    }
}
