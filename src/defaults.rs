//! Flattening a merged forest into its default values.
//!
//! The extracted mapping seeds the value store: entries are appended only
//! where the loaded state has no value, never overwriting what the user
//! persisted.

use indexmap::IndexMap;
use toml::Value;

use crate::schema::{Forest, NodeKind};
use crate::walk::walk_forest;

/// Flatten a forest into `dotted path → default` with no nested structure.
///
/// Containers contribute nothing of their own. A mode contributes a
/// synthetic `<path>.mode` entry holding the name of its default mode, and
/// its named sub-trees are flattened like any container. Leaves map to
/// their declared default, `None` where absent or invalid.
pub fn extract_defaults(forest: &Forest) -> IndexMap<String, Option<Value>> {
    let mut out = IndexMap::new();
    for visit in walk_forest(forest) {
        match &visit.node.kind {
            NodeKind::Container { .. } => {}
            NodeKind::Mode { .. } => {
                let mut path = visit.path.join(".");
                path.push_str(".mode");
                out.insert(path, visit.node.default_value());
            }
            _ => {
                out.insert(visit.path.join("."), visit.node.default_value());
            }
        }
    }
    out
}
