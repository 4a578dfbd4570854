//! Rendering a schema forest into the annotation block of a persisted
//! file.
//!
//! Every node contributes its title, word-wrapped hint, type constraints,
//! and default, indented with box-drawing connectors that mirror the tree
//! shape. The block is regenerated on every write — user edits to it are
//! discarded — and its exact text is what the persistence gate hashes, so
//! rendering must be deterministic.

use toml::Value;

use crate::schema::{Forest, NodeKind, SchemaNode};
use crate::walk::walk_forest;

pub const STATE_HEADER: &str = "\
#
# Quirk Daemon State Config
#
# This file contains plugin software-only configuration that is retained
# across reboots. You may edit it in place of using a frontend.
#
# Parameters that are stored in hardware (TDP, RGB colors, etc.) and risky
# parameters that might cause instability and should be reset across
# sessions are not part of this file. Use profiles to apply changes to
# these settings.
#
# Persisted (software) parameters are marked by having a default value.
# Non-persisted/hardware parameters do not have a default value.
#
# This file and its comments are autogenerated. Your comments will be
# discarded during configuration changes. Parameters with the value
# `default` are ignored and are meant as a template for you to change them.
#
# - CONFIGURATION PARAMETERS
#";

pub const PROFILE_HEADER: &str = "\
#
# Quirk Daemon Profile Config
#
# This file contains the configuration options that will be set when
# applying the profile which shares this file name.
#
# Settings are applied once, when applying the profile, and only the ones
# that are stated change. They may therefore drift as the system state
# changes (e.g., native TDP shortcuts, controller profile shortcuts).
#
# It is possible to set all supported parameters using profiles, and it is
# encouraged to stack profiles together: TDP-only profiles that control the
# energy budget, controller profiles that switch controller behavior, and
# so on, applied together per game.
#
# This file and its comments are autogenerated. Your comments will be
# discarded during configuration changes. Parameters with the value
# `unset` are ignored and are meant as a template for you to change them.
#
# - CONFIGURATION PARAMETERS
#";

const WRAP_COLUMNS: usize = 80;

/// Human-readable value rendering for annotation lines. Booleans are
/// capitalized to match the `boolean: [False, True]` constraint text.
fn fmt_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Boolean(true) => "True".to_string(),
        Value::Boolean(false) => "False".to_string(),
        other => other.to_string(),
    }
}

/// The declared default, unvalidated, for display purposes only.
fn declared_default(node: &SchemaNode) -> Option<String> {
    match &node.kind {
        NodeKind::Event { default } | NodeKind::Bool { default } => {
            default.map(|b| fmt_value(&Value::Boolean(b)))
        }
        NodeKind::Multiple { default, .. } => default.clone(),
        NodeKind::Discrete { default, .. } => default.as_ref().map(fmt_value),
        NodeKind::Number { default, .. } => default.map(|f| Value::Float(f).to_string()),
        NodeKind::Integer { default, .. } => default.map(|i| i.to_string()),
        NodeKind::Color | NodeKind::Container { .. } => None,
        NodeKind::Mode { default, .. } => default.clone(),
    }
}

/// Describe one node: title, wrapped hint, constraints, default. No
/// trailing newline.
fn describe(node: &SchemaNode) -> String {
    let mut desc = format!("*{}*\n", node.title);

    if let Some(hint) = &node.hint {
        let mut line = String::new();
        for token in hint.split(' ') {
            if line.len() + token.len() > WRAP_COLUMNS {
                desc.push_str(&line);
                desc.push('\n');
                line.clear();
            }
            line.push_str(token);
            line.push(' ');
        }
        if !line.is_empty() {
            desc.push_str(&line);
            desc.push('\n');
        }
    }

    match &node.kind {
        NodeKind::Mode { modes, .. } => {
            let names: Vec<&str> = modes.keys().map(String::as_str).collect();
            desc.push_str(&format!("- modes: [{}]\n", names.join(", ")));
        }
        NodeKind::Number { min, max, .. } => {
            let lo = min.map_or("-inf".to_string(), |m| m.to_string());
            let hi = max.map_or("+inf".to_string(), |m| m.to_string());
            desc.push_str(&format!("- numerical: [{lo}, {hi}]\n"));
        }
        NodeKind::Bool { .. } => desc.push_str("- boolean: [False, True]\n"),
        NodeKind::Multiple { options, .. } => {
            let keys: Vec<&str> = options.keys().map(String::as_str).collect();
            desc.push_str(&format!("- options: [{}]\n", keys.join(", ")));
        }
        NodeKind::Discrete { options, .. } => {
            let vals: Vec<String> = options.iter().map(fmt_value).collect();
            desc.push_str(&format!("- options: [{}]\n", vals.join(", ")));
        }
        _ => {}
    }

    if let Some(default) = declared_default(node) {
        desc.push_str(&format!("- default: {default}\n"));
    }

    desc.pop();
    desc
}

/// Render the full annotation block for a forest: the header followed by
/// one connector-indented description per node, in walk order.
///
/// Indentation depth tracks path length; closing `└` connectors are drawn
/// where the next node in traversal order sits at a shallower depth.
pub fn render_comment(forest: &Forest, header: &str) -> String {
    let visits = walk_forest(forest);
    let entries: Vec<(String, String, usize, bool)> = visits
        .iter()
        .map(|v| {
            (
                v.path.join("."),
                describe(v.node),
                v.path.len().saturating_sub(1),
                v.node.is_group(),
            )
        })
        .collect();

    let bars = |n: usize| "│".repeat(n);
    let mut out = String::from(header);
    for (i, (path, desc, depth, is_group)) in entries.iter().enumerate() {
        out.push_str(&format!(
            "\n# {}┌> {}\n# {} ",
            bars(depth.saturating_sub(1)),
            path,
            bars(*depth)
        ));

        let lines: Vec<&str> = desc.split('\n').collect();
        let (body, last) = lines.split_at(lines.len() - 1);
        out.push_str(&body.join(&format!("\n# {} ", bars(*depth))));

        let mut next_depth = match entries.get(i + 1) {
            Some(next) => next.2 as i64,
            None => 0,
        };
        if !is_group {
            next_depth -= 1;
        }
        let next_depth = next_depth.clamp(0, *depth as i64) as usize;

        out.push_str(&format!(
            "\n# {}{} {}",
            bars(next_depth),
            "└".repeat(depth - next_depth),
            last[0]
        ));
        out.push_str(&format!("\n# {}", bars(next_depth)));
    }
    out.push_str("\n\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn sample_forest() -> Forest {
        let mut modes = IndexMap::new();
        modes.insert(
            "quiet".to_string(),
            SchemaNode::container("Quiet", IndexMap::new()),
        );
        modes.insert(
            "turbo".to_string(),
            SchemaNode::container("Turbo", IndexMap::new()),
        );

        let mut children = IndexMap::new();
        children.insert(
            "power_mode".to_string(),
            SchemaNode::mode("Power Mode", modes, Some("quiet"))
                .with_hint("Selects the active power profile."),
        );
        children.insert(
            "deadzone".to_string(),
            SchemaNode::new(
                "Deadzone",
                NodeKind::Number {
                    min: Some(0.0),
                    max: None,
                    default: Some(0.1),
                },
            ),
        );
        children.insert(
            "swap".to_string(),
            SchemaNode::new("Swap Buttons", NodeKind::Bool { default: Some(false) }),
        );

        let mut section = IndexMap::new();
        section.insert("main".to_string(), SchemaNode::container("Main", children));

        let mut forest = Forest::new();
        forest.insert("general".to_string(), section);
        forest
    }

    #[test]
    fn every_line_is_a_comment() {
        let text = render_comment(&sample_forest(), STATE_HEADER);
        for line in text.lines() {
            assert!(
                line.is_empty() || line.starts_with('#'),
                "not a comment line: {line:?}"
            );
        }
    }

    #[test]
    fn constraint_annotations_present() {
        let text = render_comment(&sample_forest(), STATE_HEADER);
        assert!(text.contains("- modes: [quiet, turbo]"));
        assert!(text.contains("- numerical: [0, +inf]"));
        assert!(text.contains("- boolean: [False, True]"));
        assert!(text.contains("- default: quiet"));
        assert!(text.contains("- default: False"));
    }

    #[test]
    fn paths_are_marked_with_open_connectors() {
        let text = render_comment(&sample_forest(), STATE_HEADER);
        assert!(text.contains("┌> general.main\n"));
        assert!(text.contains("┌> general.main.power_mode\n"));
        assert!(text.contains("┌> general.main.power_mode.quiet\n"));
    }

    #[test]
    fn depth_decreases_draw_closing_connectors() {
        let text = render_comment(&sample_forest(), STATE_HEADER);
        // power_mode.turbo sits at depth 3; the following node (swap's
        // sibling level) is shallower, so its block closes with └ runs.
        assert!(text.contains("└"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let forest = sample_forest();
        assert_eq!(
            render_comment(&forest, STATE_HEADER),
            render_comment(&forest, STATE_HEADER)
        );
    }

    #[test]
    fn long_hints_wrap_at_token_boundaries() {
        let hint = "word ".repeat(40); // 200 characters of tokens
        let mut children = IndexMap::new();
        children.insert(
            "x".to_string(),
            SchemaNode::new("X", NodeKind::Bool { default: None }).with_hint(hint.trim()),
        );
        let mut section = IndexMap::new();
        section.insert("main".to_string(), SchemaNode::container("Main", children));
        let mut forest = Forest::new();
        forest.insert("general".to_string(), section);

        let text = render_comment(&forest, STATE_HEADER);
        for line in text.lines() {
            assert!(line.chars().count() < 100, "overlong line: {line:?}");
        }
    }

    #[test]
    fn headers_differ_between_state_and_profile() {
        let forest = sample_forest();
        let state = render_comment(&forest, STATE_HEADER);
        let profile = render_comment(&forest, PROFILE_HEADER);
        assert!(state.contains("State Config"));
        assert!(profile.contains("Profile Config"));
        assert_ne!(state, profile);
    }
}
