//! JSON hydration and serialization for field trees.
//!
//! Both directions are keyed by each node's `name` attribute (the stable
//! wire key), never by `identifier`: identifiers are value-level tags and
//! need be neither serializable nor comparable to strings.
//!
//! Hydration is lenient about content and strict about shape: a JSON key
//! with no matching tree path is ignored, a tree path absent from the JSON
//! keeps its current value, and a scalar that does not coerce to the leaf
//! kind is stored as its raw string rendering (the legal in-flight edit
//! state) so submit-time validation reports it. Only a container-shape
//! mismatch is an error.

use super::{Field, Group, Leaf, LeafKind, Repeatable};
use crate::form::value::{parse_datetime, Value};
use serde_json::{Map, Value as Json};
use std::fmt;

/// Structural mismatch between a tree and a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydrateError {
    /// The `name` of the node where the walk failed, or `<root>`.
    pub at: String,
    pub expected: &'static str,
    pub found: &'static str,
}

impl fmt::Display for HydrateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "structural mismatch at `{}`: expected {}, found {}",
            self.at, self.expected, self.found
        )
    }
}

impl std::error::Error for HydrateError {}

fn json_shape(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

fn node_name<Id>(field: &Field<Id>) -> String {
    field
        .attrs()
        .name
        .clone()
        .unwrap_or_else(|| "<root>".to_string())
}

/// Bulk-populate a tree's values from a JSON document.
pub fn update_values_from_json<Id: Clone>(
    json: &Json,
    field: Field<Id>,
) -> Result<Field<Id>, HydrateError> {
    match field {
        Field::Leaf(mut l) => match json {
            Json::Array(_) | Json::Object(_) => Err(HydrateError {
                at: node_name(&Field::Leaf(l)),
                expected: "a scalar",
                found: json_shape(json),
            }),
            scalar => {
                l.value = coerce_for_kind(l.kind, scalar);
                Ok(Field::Leaf(l))
            }
        },
        Field::Group(g) => match json {
            Json::Object(object) => hydrate_group(object, g).map(Field::Group),
            other => Err(HydrateError {
                at: node_name(&Field::Group(g)),
                expected: "an object",
                found: json_shape(other),
            }),
        },
        Field::Repeatable(r) => match json {
            Json::Array(elements) => hydrate_repeatable(elements, r).map(Field::Repeatable),
            other => Err(HydrateError {
                at: node_name(&Field::Repeatable(r)),
                expected: "an array",
                found: json_shape(other),
            }),
        },
    }
}

fn hydrate_group<Id: Clone>(
    object: &Map<String, Json>,
    mut g: Group<Id>,
) -> Result<Group<Id>, HydrateError> {
    let mut children = Vec::with_capacity(g.children.len());
    for child in g.children {
        let matched = child.attrs().name.as_ref().and_then(|key| object.get(key));
        children.push(match matched {
            Some(json) => update_values_from_json(json, child)?,
            None => child,
        });
    }
    g.children = children;
    Ok(g)
}

fn hydrate_repeatable<Id: Clone>(
    elements: &[Json],
    mut r: Repeatable<Id>,
) -> Result<Repeatable<Id>, HydrateError> {
    let mut instances = Vec::new();
    for element in elements.iter().take(r.max_instances()) {
        let fresh = (*r.template).clone().cleared();
        instances.push(update_values_from_json(element, fresh)?);
    }
    while instances.len() < r.min_instances() {
        instances.push((*r.template).clone().cleared());
    }
    r.instances = instances;
    Ok(r)
}

/// Kind-directed coercion of a JSON scalar into a leaf value. A scalar
/// that does not coerce is stored as its raw string rendering.
fn coerce_for_kind(kind: LeafKind, json: &Json) -> Value {
    if json.is_null() {
        return Value::Null;
    }
    let raw = || match json {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    };
    match kind {
        LeafKind::Text | LeafKind::Email | LeafKind::Autocomplete => Value::Str(raw()),
        LeafKind::Int => match json {
            Json::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .unwrap_or_else(|| Value::Str(raw())),
            Json::String(s) => s
                .trim()
                .parse()
                .map(Value::Int)
                .unwrap_or_else(|_| Value::Str(s.clone())),
            _ => Value::Str(raw()),
        },
        LeafKind::Float => match json {
            Json::Number(n) => n
                .as_f64()
                .map(Value::Float)
                .unwrap_or_else(|| Value::Str(raw())),
            Json::String(s) => s
                .trim()
                .parse()
                .map(Value::Float)
                .unwrap_or_else(|_| Value::Str(s.clone())),
            _ => Value::Str(raw()),
        },
        LeafKind::Boolean => match json {
            Json::Bool(b) => Value::Bool(*b),
            Json::String(s) => match s.trim() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::Str(s.clone()),
            },
            _ => Value::Str(raw()),
        },
        LeafKind::DateTime => match json {
            Json::String(s) => parse_datetime(s)
                .map(Value::DateTime)
                .unwrap_or_else(|| Value::Str(s.clone())),
            _ => Value::Str(raw()),
        },
        // Select-like leaves keep the scalar's own shape so option
        // equality works for typed option values.
        LeafKind::Select | LeafKind::StrictAutocomplete => {
            Value::from_json(json).unwrap_or_else(|| Value::Str(raw()))
        }
    }
}

/// The JSON projection of a node's values, keyed by `name`. Nodes without
/// a `name` are skipped; repeatables become arrays.
pub fn to_json<Id>(field: &Field<Id>) -> Json {
    match field {
        Field::Leaf(l) => leaf_json(l),
        Field::Group(g) => {
            let mut object = Map::new();
            for child in &g.children {
                if let Some(key) = &child.attrs().name {
                    object.insert(key.clone(), to_json(child));
                }
            }
            Json::Object(object)
        }
        Field::Repeatable(r) => Json::Array(r.instances.iter().map(to_json).collect()),
    }
}

fn leaf_json<Id>(leaf: &Leaf<Id>) -> Json {
    // A raw in-flight string on a typed leaf serializes in its typed form
    // when it coerces, raw otherwise.
    match leaf.kind {
        LeafKind::Int => leaf
            .value
            .as_int()
            .map(Json::from)
            .unwrap_or_else(|| leaf.value.to_json()),
        LeafKind::Float => leaf
            .value
            .as_float()
            .and_then(serde_json::Number::from_f64)
            .map(Json::Number)
            .unwrap_or_else(|| leaf.value.to_json()),
        LeafKind::Boolean => leaf
            .value
            .as_bool()
            .map(Json::Bool)
            .unwrap_or_else(|| leaf.value.to_json()),
        _ => leaf.value.to_json(),
    }
}
