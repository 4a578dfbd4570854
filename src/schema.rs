//! The settings schema model: the node sum type and the forest layout.
//!
//! Plugins describe the settings they expose as trees of [`SchemaNode`]s.
//! Every node carries display metadata (`title`, optional `hint`, `family`
//! tags) plus a [`NodeKind`] payload. Leaf kinds hold an actual
//! user-settable value; [`Container`](NodeKind::Container) groups children,
//! and [`Mode`](NodeKind::Mode) is an exclusive choice between sub-trees.
//!
//! A plugin registers its schema at a fixed two-level grouping: a
//! [`Forest`] maps section name → [`Section`], and a section maps container
//! name → root container node. Nodes are built once per plugin per session
//! and never mutated afterwards.
//!
//! Schema can also live in data files: nodes serialize with an internal
//! `type` tag (`event`, `bool`, `multiple`, `discrete`, `number`,
//! `integer`, `color`, `container`, `mode`), so a whole [`Forest`]
//! round-trips through TOML.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use toml::Value;

/// Ordered children of a container or mode node.
pub type Children = IndexMap<String, SchemaNode>;

/// Ordered mapping from container name to its root node.
pub type Section = IndexMap<String, SchemaNode>;

/// The two-level (section → container) grouping at which plugins register
/// schema and at which merge precedence is resolved.
pub type Forest = IndexMap<String, Section>;

/// A single node in a settings schema tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Display name.
    pub title: String,
    /// Free-text description, word-wrapped when rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Grouping/capability tags for external consumers; opaque to this crate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub family: Vec<String>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

/// Type-specific payload of a schema node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    /// A fire-and-reset action: emits an event without holding state.
    Event {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<bool>,
    },
    /// Checkbox.
    Bool {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<bool>,
    },
    /// Exclusive choice among named string options (key → label).
    Multiple {
        options: IndexMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
    /// Exclusive choice among an ordered sequence of numeric options.
    Discrete {
        options: Vec<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
    /// Bounded or unbounded floating value.
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<f64>,
    },
    /// Bounded or unbounded integer value.
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<i64>,
    },
    /// RGB value. Hardware/session-only: never carries a default and is
    /// never persisted.
    Color,
    /// Ordered group of child nodes; holds no value of its own.
    Container { children: Children },
    /// Exclusive choice between sub-trees. Each named mode is a container;
    /// `default` names which mode is active when unset.
    Mode {
        modes: Children,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
}

impl SchemaNode {
    pub fn new(title: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            title: title.into(),
            hint: None,
            family: Vec::new(),
            kind,
        }
    }

    /// Shorthand for a container node.
    pub fn container(title: impl Into<String>, children: Children) -> Self {
        Self::new(title, NodeKind::Container { children })
    }

    /// Shorthand for a mode node.
    pub fn mode(title: impl Into<String>, modes: Children, default: Option<&str>) -> Self {
        Self::new(
            title,
            NodeKind::Mode {
                modes,
                default: default.map(str::to_string),
            },
        )
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_family<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.family = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this node groups other nodes rather than holding a value.
    pub fn is_group(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Container { .. } | NodeKind::Mode { .. }
        )
    }

    /// The node's declared default as a config value, validated against the
    /// node's own constraints.
    ///
    /// A default that violates its constraints (out of `[min, max]`, not a
    /// member of `options`, naming an absent mode) is a schema-authoring
    /// bug: it is logged and treated as absent rather than failing the
    /// caller. Containers and colors never have a default; a mode's default
    /// is the name of its active mode.
    pub fn default_value(&self) -> Option<Value> {
        let valid = |ok: bool, v: Value| {
            if ok {
                Some(v)
            } else {
                tracing::warn!(
                    title = %self.title,
                    "declared default violates the node's constraints, treating as absent"
                );
                None
            }
        };

        match &self.kind {
            NodeKind::Event { default } | NodeKind::Bool { default } => {
                default.map(Value::Boolean)
            }
            NodeKind::Multiple { options, default } => {
                let d = default.as_ref()?;
                valid(options.contains_key(d), Value::String(d.clone()))
            }
            NodeKind::Discrete { options, default } => {
                let d = default.as_ref()?;
                valid(options.iter().any(|o| value_eq(o, d)), d.clone())
            }
            NodeKind::Number { min, max, default } => {
                let d = (*default)?;
                let ok = min.is_none_or(|m| d >= m) && max.is_none_or(|m| d <= m);
                valid(ok, Value::Float(d))
            }
            NodeKind::Integer { min, max, default } => {
                let d = (*default)?;
                let ok = min.is_none_or(|m| d >= m) && max.is_none_or(|m| d <= m);
                valid(ok, Value::Integer(d))
            }
            NodeKind::Color | NodeKind::Container { .. } => None,
            NodeKind::Mode { modes, default } => {
                let d = default.as_ref()?;
                valid(modes.contains_key(d), Value::String(d.clone()))
            }
        }
    }
}

/// Value equality that compares integers and floats numerically, so a user
/// writing `3` in the file matches a declared default of `3.0`.
pub(crate) fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
            *a as f64 == *b
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_default_value() {
        let node = SchemaNode::new("Swap", NodeKind::Bool { default: Some(true) });
        assert_eq!(node.default_value(), Some(Value::Boolean(true)));
    }

    #[test]
    fn color_never_has_default() {
        let node = SchemaNode::new("LED Color", NodeKind::Color);
        assert_eq!(node.default_value(), None);
    }

    #[test]
    fn multiple_default_must_be_an_option() {
        let mut options = IndexMap::new();
        options.insert("xbox".to_string(), "Xbox".to_string());
        let node = SchemaNode::new(
            "Controller Emulation",
            NodeKind::Multiple {
                options,
                default: Some("dualsense".to_string()),
            },
        );
        assert_eq!(node.default_value(), None);
    }

    #[test]
    fn number_default_out_of_bounds_is_absent() {
        let node = SchemaNode::new(
            "Deadzone",
            NodeKind::Number {
                min: Some(0.0),
                max: Some(1.0),
                default: Some(2.0),
            },
        );
        assert_eq!(node.default_value(), None);
    }

    #[test]
    fn integer_default_within_bounds() {
        let node = SchemaNode::new(
            "TDP",
            NodeKind::Integer {
                min: Some(4),
                max: Some(30),
                default: Some(15),
            },
        );
        assert_eq!(node.default_value(), Some(Value::Integer(15)));
    }

    #[test]
    fn discrete_default_compares_numerically() {
        let node = SchemaNode::new(
            "Refresh",
            NodeKind::Discrete {
                options: vec![Value::Integer(40), Value::Integer(60)],
                default: Some(Value::Float(60.0)),
            },
        );
        assert_eq!(node.default_value(), Some(Value::Float(60.0)));
    }

    #[test]
    fn mode_default_must_name_a_mode() {
        let mut modes = IndexMap::new();
        modes.insert(
            "quiet".to_string(),
            SchemaNode::container("Quiet", IndexMap::new()),
        );
        let node = SchemaNode::mode("Power", modes.clone(), Some("quiet"));
        assert_eq!(
            node.default_value(),
            Some(Value::String("quiet".to_string()))
        );

        let bad = SchemaNode::mode("Power", modes, Some("turbo"));
        assert_eq!(bad.default_value(), None);
    }

    #[test]
    fn schema_round_trips_through_toml() {
        let mut children = IndexMap::new();
        children.insert(
            "enabled".to_string(),
            SchemaNode::new("Enabled", NodeKind::Bool { default: Some(false) })
                .with_hint("Turn the shim on."),
        );
        let node = SchemaNode::container("Shim", children).with_family(["quirk"]);

        let text = toml::to_string(&node).unwrap();
        let back: SchemaNode = toml::from_str(&text).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn tagged_schema_parses_from_toml() {
        let node: SchemaNode = toml::from_str(
            r#"
            type = "integer"
            title = "TDP"
            min = 4
            max = 30
            default = 15
            "#,
        )
        .unwrap();
        assert!(matches!(
            node.kind,
            NodeKind::Integer {
                min: Some(4),
                max: Some(30),
                default: Some(15),
            }
        ));
    }
}
