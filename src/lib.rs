//! Settings schema trees for device-quirk daemons: merge, defaults, and
//! annotated persistence.
//!
//! A quirk-management daemon for handheld gaming devices loads a set of
//! plugins, and each plugin declares the settings it exposes — toggles,
//! numeric ranges, multiple-choice modes, nested groups — as a schema
//! tree. This crate is the engine that turns those per-plugin trees into
//! one coherent, persistent configuration:
//!
//! ```ignore
//! let merged = merge_forests(plugins.iter().map(|p| &p.schema));
//! let mut store = load_state(&state_path, &merged)
//!     .unwrap_or_else(|| get_default_state(&merged));
//! // ... plugins mutate `store` during the session ...
//! let wrote = save_state(&state_path, &merged, &mut store)?;
//! ```
//!
//! # Schema model
//!
//! A [`SchemaNode`] pairs display metadata (title, hint, family tags) with
//! a [`NodeKind`]: leaf kinds (`Event`, `Bool`, `Multiple`, `Discrete`,
//! `Number`, `Integer`, `Color`) hold user-settable values;
//! [`Container`](NodeKind::Container) groups children; and
//! [`Mode`](NodeKind::Mode) is an exclusive choice between whole
//! sub-trees, with an implicit `mode` selector leaf. Plugins register
//! schema at a fixed two-level grouping, the [`Forest`]
//! (section → container → tree). All maps preserve insertion order, and
//! every ordered operation in the crate is deterministic on top of that.
//!
//! # Merging
//!
//! [`merge_forests`] folds plugin forests in ascending priority order.
//! Containers and modes merge structurally — children union key-by-key,
//! so a plugin can extend another plugin's group without redeclaring its
//! siblings — while leaf conflicts and type disagreements resolve to the
//! later (higher-priority) plugin wholesale. See [`merge_forests`] and
//! [`merge_nodes`] for the precise contract.
//!
//! # Values vs. schema
//!
//! The current session's values live in a [`ConfigStore`], an ordered
//! nested table addressed by dotted paths, with a dirty flag that feeds
//! the persistence gate. [`extract_defaults`] flattens a merged forest
//! into `path → default`, and [`get_default_state`] turns that into a
//! pure-defaults store.
//!
//! # Persistence
//!
//! [`save_state`] writes a file with two parts: a regenerated,
//! box-drawing-annotated comment block documenting every node
//! ([`render_comment`]), and a TOML body produced by diffing the store
//! against the schema ([`dump_forest`]). Three rules shape the body:
//!
//! - a leaf with no declared default is never persisted (hardware and
//!   session-only state resets every session);
//! - a leaf at its default (or never set) is written as the sentinel
//!   token `"default"` so users can spot and override it;
//! - values for plugins that did not run this session are preserved
//!   verbatim, so disabling a plugin loses nothing.
//!
//! Profiles ([`save_profile`]/[`load_profile`]) share the format but mark
//! un-customized leaves `"unset"` and record default-equal values
//! explicitly.
//!
//! Writes are gated: the file carries `version = "<hash>"`, the first 8
//! hex characters of a digest of the rendered annotation block, and
//! [`save_state`] skips the write when the version matches and the store
//! is clean. [`load_state`] is the inverse of the dump: sentinels strip
//! to absence and the remainder overlays the extracted defaults. Missing
//! or corrupt files fall back to defaults with a warning, never an error.
//!
//! # What this crate is not
//!
//! Plugin discovery, event queues, device mapping tables, and the daemon
//! lifecycle live with the caller. The engine is single-threaded and
//! synchronous: callers serialize store mutations and saves. Whole-file
//! rewrites are as atomic as the filesystem makes them; a daemon wanting
//! crash safety should write to a temporary path and rename.

pub mod error;
pub mod schema;

mod defaults;
mod dump;
mod merge;
mod persist;
mod render;
mod store;
mod walk;

pub use defaults::extract_defaults;
pub use dump::{Sentinel, dump_forest};
pub use error::SettingsError;
pub use merge::{deep_merge, merge_forests, merge_nodes};
pub use persist::{
    get_default_state, load_profile, load_state, save_profile, save_state, settings_hash,
};
pub use render::{PROFILE_HEADER, STATE_HEADER, render_comment};
pub use schema::{Children, Forest, NodeKind, SchemaNode, Section};
pub use store::ConfigStore;
pub use walk::{Visit, walk_forest, walk_node};
