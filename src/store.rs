//! The current configuration values, distinct from the schema that
//! describes them.
//!
//! [`ConfigStore`] wraps an ordered nested table addressed by dotted paths
//! (`"general.main.power_mode.mode"`). It tracks whether it has been
//! mutated since it was loaded; the persistence gate uses that flag to
//! skip redundant disk writes. Callers serialize all mutations — the store
//! provides no internal locking.

use toml::{Table, Value};

use crate::merge::deep_merge;

/// An ordered, path-addressable key/value store for session configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    root: Table,
    updated: bool,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already-built nested table. The store starts clean.
    pub fn from_table(root: Table) -> Self {
        Self {
            root,
            updated: false,
        }
    }

    /// Overlay tables in order, later layers winning key-by-key, and wrap
    /// the result. Used to put loaded state on top of extracted defaults.
    pub fn from_layers<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Table>,
    {
        let root = layers.into_iter().fold(Table::new(), deep_merge);
        Self::from_table(root)
    }

    /// Look up a value by dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let value = current.get(segment)?;
            if segments.peek().is_none() {
                return Some(value);
            }
            current = value.as_table()?;
        }
        None
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Set a value by dotted path, creating intermediate tables as needed.
    /// A non-table intermediate is replaced. Storing a value equal to the
    /// existing one leaves the dirty flag untouched.
    pub fn set(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        let (leaf, parents) = segments.split_last().expect("path is never empty");

        let mut current = &mut self.root;
        for segment in parents {
            if !current.get(*segment).is_some_and(Value::is_table) {
                current.insert(segment.to_string(), Value::Table(Table::new()));
            }
            current = current
                .get_mut(*segment)
                .and_then(Value::as_table_mut)
                .expect("intermediate was just made a table");
        }

        if current.get(*leaf) == Some(&value) {
            return;
        }
        current.insert(leaf.to_string(), value);
        self.updated = true;
    }

    /// Whether the store has been mutated since load (or the last
    /// [`mark_clean`](Self::mark_clean)).
    pub fn updated(&self) -> bool {
        self.updated
    }

    /// Clear the dirty flag, e.g. after a successful write.
    pub fn mark_clean(&mut self) {
        self.updated = false;
    }

    /// The underlying nested table.
    pub fn as_table(&self) -> &Table {
        &self.root
    }

    pub fn into_table(self) -> Table {
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_creates_intermediate_tables() {
        let mut store = ConfigStore::new();
        store.set("general.main.power_mode.mode", Value::String("turbo".into()));
        assert_eq!(
            store.get("general.main.power_mode.mode"),
            Some(&Value::String("turbo".into()))
        );
        assert!(store.get("general.main").unwrap().is_table());
    }

    #[test]
    fn get_missing_path_is_none() {
        let store = ConfigStore::new();
        assert_eq!(store.get("general.main.missing"), None);
        assert!(!store.contains("general"));
    }

    #[test]
    fn set_marks_updated_only_on_change() {
        let mut store = ConfigStore::new();
        assert!(!store.updated());

        store.set("a.b", Value::Integer(1));
        assert!(store.updated());

        store.mark_clean();
        store.set("a.b", Value::Integer(1));
        assert!(!store.updated());

        store.set("a.b", Value::Integer(2));
        assert!(store.updated());
    }

    #[test]
    fn set_replaces_scalar_intermediate() {
        let mut store = ConfigStore::new();
        store.set("a", Value::Integer(1));
        store.set("a.b", Value::Integer(2));
        assert_eq!(store.get("a.b"), Some(&Value::Integer(2)));
    }

    #[test]
    fn layers_overlay_in_order() {
        let defaults: Table = "[main]\nx = 1\ny = 2\n".parse().unwrap();
        let loaded: Table = "[main]\ny = 9\n".parse().unwrap();

        let store = ConfigStore::from_layers([defaults, loaded]);
        assert_eq!(store.get("main.x"), Some(&Value::Integer(1)));
        assert_eq!(store.get("main.y"), Some(&Value::Integer(9)));
        assert!(!store.updated());
    }

    #[test]
    fn traversal_through_scalar_is_none() {
        let mut store = ConfigStore::new();
        store.set("a.b", Value::Integer(1));
        assert_eq!(store.get("a.b.c"), None);
    }
}
