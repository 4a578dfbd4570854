//! Persistence: the write gate, state/profile files, and loading.
//!
//! A persisted file is the rendered annotation block followed by a TOML
//! body whose leading key is `version = "<hash>"`. The hash is derived
//! from the rendered annotation text, so it changes exactly when the
//! merged schema changes (plugin added/removed, metadata edited). The gate
//! skips a write when the stored version already matches and the store has
//! not been mutated.
//!
//! Missing or malformed files are never fatal on load — the caller gets
//! `None` and falls back to defaults. Write failures propagate.

use std::path::Path;

use sha2::{Digest, Sha256};
use toml::{Table, Value};

use crate::defaults::extract_defaults;
use crate::dump::{Sentinel, dump_forest, strip_sentinels};
use crate::error::SettingsError;
use crate::render::{PROFILE_HEADER, STATE_HEADER, render_comment};
use crate::schema::Forest;
use crate::store::ConfigStore;

/// Short content hash of the rendered state annotation block: the first
/// 8 hex characters of its SHA-256 digest. This is the `version` value
/// written to persisted files.
pub fn settings_hash(forest: &Forest) -> String {
    let digest = Sha256::digest(render_comment(forest, STATE_HEADER).as_bytes());
    digest.iter().take(4).map(|b| format!("{b:02x}")).collect()
}

/// A store holding every declared default and nothing else.
pub fn get_default_state(forest: &Forest) -> ConfigStore {
    let mut store = ConfigStore::new();
    for (path, value) in extract_defaults(forest) {
        if let Some(value) = value {
            store.set(&path, value);
        }
    }
    store.mark_clean();
    store
}

/// Whether the gate allows skipping a write for this store and forest.
fn unchanged(store: &ConfigStore, hash: &str) -> bool {
    store.get("version").and_then(Value::as_str) == Some(hash) && !store.updated()
}

fn write_file(
    path: &Path,
    forest: &Forest,
    store: &ConfigStore,
    sentinel: Sentinel,
    header: &str,
) -> Result<(), SettingsError> {
    let body = dump_forest(forest, store, sentinel);
    let mut content = render_comment(forest, header);
    content.push_str(&toml::to_string(&body)?);
    std::fs::write(path, content).map_err(|e| SettingsError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Persist the session state. Returns whether a write actually occurred:
/// `Ok(false)` means the file already reflects this store and schema.
///
/// On a successful write the new schema hash is recorded in the store's
/// `version` key and the dirty flag is cleared, so an immediately
/// following save is a no-op.
pub fn save_state(
    path: &Path,
    forest: &Forest,
    store: &mut ConfigStore,
) -> Result<bool, SettingsError> {
    let hash = settings_hash(forest);
    if unchanged(store, &hash) {
        tracing::debug!(path = %path.display(), "state unchanged, skipping write");
        return Ok(false);
    }
    write_file(path, forest, store, Sentinel::Default, STATE_HEADER)?;
    store.set("version", Value::String(hash));
    store.mark_clean();
    Ok(true)
}

/// Persist a profile. With no store, writes a pure template (every leaf
/// `unset`) unconditionally; with a store, the same gate as
/// [`save_state`] applies.
pub fn save_profile(
    path: &Path,
    forest: &Forest,
    store: Option<&mut ConfigStore>,
) -> Result<bool, SettingsError> {
    let Some(store) = store else {
        write_file(
            path,
            forest,
            &ConfigStore::new(),
            Sentinel::Unset,
            PROFILE_HEADER,
        )?;
        return Ok(true);
    };

    let hash = settings_hash(forest);
    if unchanged(store, &hash) {
        tracing::debug!(path = %path.display(), "profile unchanged, skipping write");
        return Ok(false);
    }
    write_file(path, forest, store, Sentinel::Unset, PROFILE_HEADER)?;
    store.set("version", Value::String(hash));
    store.mark_clean();
    Ok(true)
}

fn read_table(path: &Path) -> Result<Table, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    content.parse::<Table>().map_err(|e| SettingsError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load session state: persisted values overlaid on the forest's
/// defaults. `None` when the file is missing or malformed (logged, not
/// fatal) — the caller should fall back to [`get_default_state`].
pub fn load_state(path: &Path, forest: &Forest) -> Option<ConfigStore> {
    let raw = match read_table(path) {
        Ok(table) => table,
        Err(e) => {
            tracing::warn!("state file unavailable, using defaults: {e}");
            return None;
        }
    };
    let loaded = match strip_sentinels(Value::Table(raw)) {
        Some(Value::Table(table)) => table,
        _ => Table::new(),
    };
    let defaults = get_default_state(forest).into_table();
    Some(ConfigStore::from_layers([defaults, loaded]))
}

/// Load a profile: persisted values only, no defaults underneath.
/// `None` when the file is missing or malformed (logged, not fatal).
pub fn load_profile(path: &Path) -> Option<ConfigStore> {
    let raw = match read_table(path) {
        Ok(table) => table,
        Err(e) => {
            tracing::warn!("profile file unavailable, skipping: {e}");
            return None;
        }
    };
    let loaded = match strip_sentinels(Value::Table(raw)) {
        Some(Value::Table(table)) => table,
        _ => Table::new(),
    };
    Some(ConfigStore::from_table(loaded))
}
