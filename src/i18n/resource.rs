//! Language resource tree: parsed content of one language file.
//!
//! A resource is a tree of namespaces (JSON objects) whose leaves are scalars.
//! Lookups walk the tree with dotted keys such as `"App.Name"`.

use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// A mapping from key segment to value (one level of nesting).
pub type Namespace = BTreeMap<String, ResourceValue>;

/// A leaf value in a language resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(Number),
    Bool(bool),
    Null,
    /// Arrays are not navigable; they render as compact JSON.
    Array(Vec<Value>),
}

impl Scalar {
    /// Render the scalar as display text.
    ///
    /// Returns `None` for `Null`, which lookups treat as a miss.
    pub fn render(&self) -> Option<String> {
        match self {
            Scalar::Text(text) => Some(text.clone()),
            Scalar::Number(number) => Some(number.to_string()),
            Scalar::Bool(flag) => Some(flag.to_string()),
            Scalar::Null => None,
            Scalar::Array(items) => Some(Value::Array(items.clone()).to_string()),
        }
    }
}

/// A node in a language resource: either a leaf or a nested namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceValue {
    Leaf(Scalar),
    Node(Namespace),
}

impl From<Value> for ResourceValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => ResourceValue::Node(
                map.into_iter()
                    .map(|(key, value)| (key, ResourceValue::from(value)))
                    .collect(),
            ),
            Value::String(text) => ResourceValue::Leaf(Scalar::Text(text)),
            Value::Number(number) => ResourceValue::Leaf(Scalar::Number(number)),
            Value::Bool(flag) => ResourceValue::Leaf(Scalar::Bool(flag)),
            Value::Null => ResourceValue::Leaf(Scalar::Null),
            Value::Array(items) => ResourceValue::Leaf(Scalar::Array(items)),
        }
    }
}

/// The parsed key tree of one language.
///
/// Resources are built once per load and never mutated afterwards; the
/// localizer shares them behind an `Arc` and replaces them wholesale.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LanguageResource {
    language: String,
    root: Namespace,
}

impl LanguageResource {
    /// Create a resource for `language` from its root namespace.
    pub fn new(language: impl Into<String>, root: Namespace) -> Self {
        Self {
            language: language.into(),
            root,
        }
    }

    /// Build a resource from a JSON object.
    ///
    /// Returns `None` if `value` is not an object.
    pub fn from_json(language: impl Into<String>, value: Value) -> Option<Self> {
        match ResourceValue::from(value) {
            ResourceValue::Node(root) => Some(Self::new(language, root)),
            ResourceValue::Leaf(_) => None,
        }
    }

    /// The language id this resource was loaded for.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The top-level namespace.
    pub fn root(&self) -> &Namespace {
        &self.root
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Walk `dotted_key` and return the leaf it names, if any.
    ///
    /// Every segment except the last must name a namespace and the last must
    /// name a leaf. Anything else is a miss.
    pub fn lookup(&self, dotted_key: &str) -> Option<&Scalar> {
        let mut segments = dotted_key.split('.');
        let first = segments.next()?;
        let mut current = self.root.get(first)?;

        for segment in segments {
            match current {
                ResourceValue::Node(namespace) => current = namespace.get(segment)?,
                ResourceValue::Leaf(_) => return None,
            }
        }

        match current {
            ResourceValue::Leaf(scalar) => Some(scalar),
            ResourceValue::Node(_) => None,
        }
    }

    /// Resolve `dotted_key` to display text, applying the fallback policy.
    ///
    /// On a miss, returns `fallback` when given, otherwise `"[dotted_key]"`
    /// so untranslated keys stay visible. An empty key returns the fallback
    /// or an empty string.
    pub fn resolve(&self, dotted_key: &str, fallback: Option<&str>) -> String {
        self.try_resolve(dotted_key)
            .unwrap_or_else(|| miss_text(dotted_key, fallback))
    }

    /// Resolve `dotted_key` without applying any fallback.
    pub fn try_resolve(&self, dotted_key: &str) -> Option<String> {
        if dotted_key.is_empty() {
            return None;
        }
        self.lookup(dotted_key).and_then(Scalar::render)
    }

    /// All dotted leaf keys in depth-first order.
    pub fn flatten_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        collect_keys(&self.root, "", &mut keys);
        keys
    }
}

/// Text shown for a lookup miss.
pub(crate) fn miss_text(dotted_key: &str, fallback: Option<&str>) -> String {
    match fallback {
        Some(text) => text.to_string(),
        None if dotted_key.is_empty() => String::new(),
        None => format!("[{}]", dotted_key),
    }
}

fn collect_keys(namespace: &Namespace, prefix: &str, keys: &mut Vec<String>) {
    for (segment, value) in namespace {
        let key = if prefix.is_empty() {
            segment.clone()
        } else {
            format!("{}.{}", prefix, segment)
        };

        match value {
            ResourceValue::Node(nested) => collect_keys(nested, &key, keys),
            ResourceValue::Leaf(_) => keys.push(key),
        }
    }
}
