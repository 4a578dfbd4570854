//! Diffing the value store against a merged forest for persistence.
//!
//! A dump is schema-shaped: for every leaf the engine decides between
//! three outcomes — drop the entry entirely (no declared default: the
//! value is hardware/session-only and must reset next session), replace it
//! with a sentinel token (at default or never customized), or let the
//! stored value flow through verbatim. The schema-shaped patch is then
//! merged over the store's raw table, which is what preserves values owned
//! by plugins that did not run this session.
//!
//! Sentinels exist as string tokens only inside persisted files; internal
//! logic works with [`Sentinel`] and the three-state [`DumpValue`].

use indexmap::IndexMap;
use toml::{Table, Value};

use crate::persist::settings_hash;
use crate::schema::{Forest, NodeKind, SchemaNode, value_eq};
use crate::store::ConfigStore;

/// Which token marks un-customized leaves in a persisted file.
///
/// State files use [`Default`](Sentinel::Default): a leaf equal to its
/// schema default is written as the token, so the user sees which fields
/// are at default and can override by replacing it. Profile templates use
/// [`Unset`](Sentinel::Unset): only never-customized leaves get the token,
/// values equal to the default are still recorded verbatim (a profile
/// applies them explicitly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    Default,
    Unset,
}

impl Sentinel {
    pub(crate) fn token(self) -> &'static str {
        match self {
            Sentinel::Default => "default",
            Sentinel::Unset => "unset",
        }
    }

    fn is_token(s: &str) -> bool {
        s == Sentinel::Default.token() || s == Sentinel::Unset.token()
    }
}

/// One entry of a schema-shaped patch, before merging over stored values.
enum DumpValue {
    /// Tombstone: the entry must not survive the merge.
    Drop,
    Scalar(Value),
    Table(IndexMap<String, DumpValue>),
}

/// Produce the serializable nested mapping for `store` relative to
/// `forest`, with `version` as the leading key.
///
/// Keys present in the store but absent from the forest (inactive
/// plugins) are preserved verbatim; no-default leaves are removed; empty
/// tables collapse away.
pub fn dump_forest(forest: &Forest, store: &ConfigStore, sentinel: Sentinel) -> Table {
    let mut patch: IndexMap<String, DumpValue> = IndexMap::new();
    for (sec_name, section) in forest {
        let mut sec = IndexMap::new();
        for (cont_name, node) in section {
            let dumped = dump_node(node, &format!("{sec_name}.{cont_name}"), store, sentinel);
            if !dumped.is_empty() {
                sec.insert(cont_name.clone(), DumpValue::Table(dumped));
            }
        }
        patch.insert(sec_name.clone(), DumpValue::Table(sec));
    }

    let mut base = store.as_table().clone();
    base.remove("version");

    let mut out = Table::new();
    out.insert(
        "version".to_string(),
        Value::String(settings_hash(forest)),
    );
    for (key, value) in merge_patch(&base, &patch) {
        out.insert(key, value);
    }
    out
}

/// Decide a single leaf's dump outcome.
fn leaf_entry(
    default: Option<Value>,
    current: Option<&Value>,
    sentinel: Sentinel,
) -> Option<DumpValue> {
    let Some(default) = default else {
        return Some(DumpValue::Drop);
    };
    match current {
        None => Some(DumpValue::Scalar(Value::String(sentinel.token().into()))),
        Some(v) if sentinel == Sentinel::Default && value_eq(&default, v) => {
            Some(DumpValue::Scalar(Value::String(sentinel.token().into())))
        }
        // Customized value: no patch entry, it flows through from the store.
        Some(_) => None,
    }
}

fn dump_node(
    node: &SchemaNode,
    prefix: &str,
    store: &ConfigStore,
    sentinel: Sentinel,
) -> IndexMap<String, DumpValue> {
    let mut out = IndexMap::new();
    match &node.kind {
        NodeKind::Container { children } => {
            for (name, child) in children {
                let child_path = format!("{prefix}.{name}");
                if child.is_group() {
                    let dumped = dump_node(child, &child_path, store, sentinel);
                    if !dumped.is_empty() {
                        out.insert(name.clone(), DumpValue::Table(dumped));
                    }
                } else if let Some(entry) =
                    leaf_entry(child.default_value(), store.get(&child_path), sentinel)
                {
                    out.insert(name.clone(), entry);
                }
            }
        }
        NodeKind::Mode { modes, .. } => {
            // The implicit selector behaves like a leaf at `<path>.mode`.
            if let Some(entry) = leaf_entry(
                node.default_value(),
                store.get(&format!("{prefix}.mode")),
                sentinel,
            ) {
                out.insert("mode".to_string(), entry);
            }
            // All modes are rendered, not only the active one, so a user
            // can pre-configure an inactive mode.
            for (name, mode) in modes {
                let dumped = dump_node(mode, &format!("{prefix}.{name}"), store, sentinel);
                if !dumped.is_empty() {
                    out.insert(name.clone(), DumpValue::Table(dumped));
                }
            }
        }
        _ => {}
    }
    out
}

/// Merge a schema-shaped patch over previously stored values. Stored keys
/// untouched by the patch pass through; tombstones delete; tables that end
/// up empty are omitted.
fn merge_patch(prev: &Table, patch: &IndexMap<String, DumpValue>) -> Table {
    let mut out = Table::new();
    for (key, prev_val) in prev {
        match patch.get(key) {
            None => {
                out.insert(key.clone(), prev_val.clone());
            }
            Some(patch_val) => {
                if let Some(merged) = merge_value(Some(prev_val), patch_val) {
                    out.insert(key.clone(), merged);
                }
            }
        }
    }
    for (key, patch_val) in patch {
        if prev.contains_key(key) {
            continue;
        }
        if let Some(merged) = merge_value(None, patch_val) {
            out.insert(key.clone(), merged);
        }
    }
    out
}

fn merge_value(prev: Option<&Value>, patch: &DumpValue) -> Option<Value> {
    match patch {
        DumpValue::Drop => None,
        DumpValue::Scalar(v) => Some(v.clone()),
        DumpValue::Table(entries) => {
            let empty = Table::new();
            let prev_tbl = match prev {
                Some(Value::Table(t)) => t,
                _ => &empty,
            };
            let merged = merge_patch(prev_tbl, entries);
            if merged.is_empty() {
                None
            } else {
                Some(Value::Table(merged))
            }
        }
    }
}

/// Recursively remove sentinel tokens from loaded data, collapsing tables
/// that become empty. Absence (not an explicit value) is what lets the
/// defaults underlay show through on load.
pub(crate) fn strip_sentinels(value: Value) -> Option<Value> {
    match value {
        Value::String(s) if Sentinel::is_token(&s) => None,
        Value::Table(entries) => {
            let mut out = Table::new();
            for (key, child) in entries {
                if let Some(stripped) = strip_sentinels(child) {
                    out.insert(key, stripped);
                }
            }
            if out.is_empty() {
                None
            } else {
                Some(Value::Table(out))
            }
        }
        other => Some(other),
    }
}
