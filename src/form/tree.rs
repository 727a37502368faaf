//! The recursive field tree.
//!
//! A tree describes a form's shape, presentation attributes and live
//! values. It is a tree, not a graph: every node owns its children
//! exclusively and no node appears twice. Each user edit produces a new
//! tree value; nothing here mutates in place.
//!
//! Identifier lookup is a full-tree traversal with an exactly-once
//! contract: zero or multiple matches are configuration errors (a
//! malformed tree/parser pairing), reported as [`LookupError`] and never
//! silently resolved.

use super::attributes::{Attr, Attributes};
use super::ident::Reindex;
use super::value::Value;
use serde::Serialize;
use std::fmt;

pub mod hydrate;

// ============================================================================
// Node types
// ============================================================================

/// What a leaf accepts and how its raw text is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LeafKind {
    Text,
    Int,
    Float,
    Boolean,
    Select,
    Email,
    DateTime,
    Autocomplete,
    /// Autocomplete whose final value must match one of the options.
    StrictAutocomplete,
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LeafKind::Text => "text",
            LeafKind::Int => "int",
            LeafKind::Float => "float",
            LeafKind::Boolean => "boolean",
            LeafKind::Select => "select",
            LeafKind::Email => "email",
            LeafKind::DateTime => "datetime",
            LeafKind::Autocomplete => "autocomplete",
            LeafKind::StrictAutocomplete => "strict-autocomplete",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Leaf<Id> {
    pub kind: LeafKind,
    pub attrs: Attributes<Id>,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group<Id> {
    pub attrs: Attributes<Id>,
    pub children: Vec<Field<Id>>,
}

/// A bounded, dynamically sized list of instances cloned from a template.
#[derive(Debug, Clone, PartialEq)]
pub struct Repeatable<Id> {
    pub attrs: Attributes<Id>,
    pub template: Box<Field<Id>>,
    pub instances: Vec<Field<Id>>,
}

impl<Id> Repeatable<Id> {
    pub fn min_instances(&self) -> usize {
        self.attrs.min.map(|n| n.max(0) as usize).unwrap_or(0)
    }

    pub fn max_instances(&self) -> usize {
        self.attrs
            .max
            .map(|n| n.max(0) as usize)
            .unwrap_or(usize::MAX)
    }

    /// Append a fresh instance cloned from the template (values cleared,
    /// attributes preserved). A no-op at the `max` bound.
    pub fn push_instance(mut self) -> Self
    where
        Id: Clone,
    {
        if self.instances.len() < self.max_instances() {
            self.instances.push((*self.template).clone().cleared());
        }
        self
    }

    /// Remove the instance at `index`. A no-op at the `min` bound or when
    /// the index is out of range.
    pub fn remove_instance(mut self, index: usize) -> Self {
        if index < self.instances.len() && self.instances.len() > self.min_instances() {
            self.instances.remove(index);
        }
        self
    }
}

/// A node in the form tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<Id> {
    Leaf(Leaf<Id>),
    Group(Group<Id>),
    Repeatable(Repeatable<Id>),
}

// ============================================================================
// Lookup errors
// ============================================================================

/// Identifier lookup failure. Both absence and ambiguity are reported;
/// the engine cannot distinguish an author mistake from a legitimately
/// absent field without this explicit signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    NotFound,
    Ambiguous,
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::NotFound => write!(f, "identifier not found in tree"),
            LookupError::Ambiguous => write!(f, "identifier matches more than one node"),
        }
    }
}

impl std::error::Error for LookupError {}

// ============================================================================
// Construction
// ============================================================================

fn leaf<Id>(kind: LeafKind, attrs: Vec<Attr<Id>>) -> Field<Id> {
    let mut initial = Value::Null;
    let attrs = attrs
        .into_iter()
        .filter_map(|attr| match attr {
            Attr::Value(v) => {
                initial = v;
                None
            }
            other => Some(other),
        })
        .collect();
    Field::Leaf(Leaf {
        kind,
        attrs: Attributes::from_attrs(attrs),
        value: initial,
    })
}

pub fn text<Id>(attrs: Vec<Attr<Id>>) -> Field<Id> {
    leaf(LeafKind::Text, attrs)
}

pub fn int<Id>(attrs: Vec<Attr<Id>>) -> Field<Id> {
    leaf(LeafKind::Int, attrs)
}

pub fn float<Id>(attrs: Vec<Attr<Id>>) -> Field<Id> {
    leaf(LeafKind::Float, attrs)
}

pub fn boolean<Id>(attrs: Vec<Attr<Id>>) -> Field<Id> {
    leaf(LeafKind::Boolean, attrs)
}

pub fn select<Id>(attrs: Vec<Attr<Id>>) -> Field<Id> {
    leaf(LeafKind::Select, attrs)
}

pub fn email<Id>(attrs: Vec<Attr<Id>>) -> Field<Id> {
    leaf(LeafKind::Email, attrs)
}

pub fn datetime<Id>(attrs: Vec<Attr<Id>>) -> Field<Id> {
    leaf(LeafKind::DateTime, attrs)
}

pub fn autocomplete<Id>(attrs: Vec<Attr<Id>>) -> Field<Id> {
    leaf(LeafKind::Autocomplete, attrs)
}

pub fn strict_autocomplete<Id>(attrs: Vec<Attr<Id>>) -> Field<Id> {
    leaf(LeafKind::StrictAutocomplete, attrs)
}

pub fn group<Id>(attrs: Vec<Attr<Id>>, children: Vec<Field<Id>>) -> Field<Id> {
    Field::Group(Group {
        attrs: Attributes::from_attrs(attrs),
        children,
    })
}

/// Build a repeatable node. Instances are seeded from `initial` when
/// provided, padded with cleared template clones up to the `min` bound
/// and truncated to the `max` bound.
pub fn repeatable<Id: Clone>(
    attrs: Vec<Attr<Id>>,
    template: Field<Id>,
    initial: Vec<Field<Id>>,
) -> Field<Id> {
    let mut node = Repeatable {
        attrs: Attributes::from_attrs(attrs),
        template: Box::new(template),
        instances: initial,
    };
    while node.instances.len() < node.min_instances() {
        node.instances.push((*node.template).clone().cleared());
    }
    let max = node.max_instances();
    node.instances.truncate(max);
    Field::Repeatable(node)
}

// ============================================================================
// Accessors and transforms
// ============================================================================

impl<Id> Field<Id> {
    pub fn attrs(&self) -> &Attributes<Id> {
        match self {
            Field::Leaf(l) => &l.attrs,
            Field::Group(g) => &g.attrs,
            Field::Repeatable(r) => &r.attrs,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf<Id>> {
        match self {
            Field::Leaf(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group<Id>> {
        match self {
            Field::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_repeatable(&self) -> Option<&Repeatable<Id>> {
        match self {
            Field::Repeatable(r) => Some(r),
            _ => None,
        }
    }

    /// The current value, for leaves.
    pub fn value(&self) -> Option<&Value> {
        self.as_leaf().map(|l| &l.value)
    }

    /// Rewrap every identifier in the subtree through `f`, preserving
    /// shape. This is how independently authored sub-forms compose into a
    /// parent form under a sum-type identifier.
    pub fn map<J, F>(self, f: &F) -> Field<J>
    where
        F: Fn(Id) -> J,
    {
        match self {
            Field::Leaf(l) => Field::Leaf(Leaf {
                kind: l.kind,
                attrs: l.attrs.map(f),
                value: l.value,
            }),
            Field::Group(g) => Field::Group(Group {
                attrs: g.attrs.map(f),
                children: g.children.into_iter().map(|c| c.map(f)).collect(),
            }),
            Field::Repeatable(r) => Field::Repeatable(Repeatable {
                attrs: r.attrs.map(f),
                template: Box::new((*r.template).map(f)),
                instances: r.instances.into_iter().map(|c| c.map(f)).collect(),
            }),
        }
    }

    /// Qualify every identifier in the subtree with an instance index.
    pub fn reindexed(self, index: usize) -> Field<Id>
    where
        Id: Reindex,
    {
        self.map(&move |id: Id| id.reindex(index))
    }

    /// Reset every live value in the subtree. Used when cloning a
    /// repeatable template into a fresh instance.
    pub fn cleared(self) -> Field<Id> {
        match self {
            Field::Leaf(mut l) => {
                l.value = Value::Null;
                l.attrs.selection = None;
                Field::Leaf(l)
            }
            Field::Group(mut g) => {
                g.children = g.children.into_iter().map(Field::cleared).collect();
                Field::Group(g)
            }
            Field::Repeatable(mut r) => {
                r.instances = r.instances.into_iter().map(Field::cleared).collect();
                Field::Repeatable(r)
            }
        }
    }

    /// Locate the unique node carrying `id`, returning it with its child
    /// index path from this root. Traversal covers live nodes only (group
    /// children and repeatable instances, not templates).
    pub fn find_by_id(&self, id: &Id) -> Result<(Vec<usize>, &Field<Id>), LookupError>
    where
        Id: PartialEq,
    {
        let mut hits = Vec::new();
        let mut path = Vec::new();
        collect_matches(self, id, &mut path, &mut hits);
        match (hits.pop(), hits.is_empty()) {
            (None, _) => Err(LookupError::NotFound),
            (Some(hit), true) => Ok(hit),
            (Some(_), false) => Err(LookupError::Ambiguous),
        }
    }

    /// Locate the unique node carrying `id` and replace it with
    /// `transform(node)`.
    pub fn update_with_id<F>(self, id: &Id, transform: F) -> Result<Field<Id>, LookupError>
    where
        Id: PartialEq,
        F: FnOnce(Field<Id>) -> Field<Id>,
    {
        let path = self.find_by_id(id)?.0;
        Ok(self.with_transformed(&path, transform))
    }

    /// The node at a child index path, if the path is valid.
    pub fn get_at_path(&self, path: &[usize]) -> Option<&Field<Id>> {
        match path.split_first() {
            None => Some(self),
            Some((&index, rest)) => match self {
                Field::Group(g) => g.children.get(index)?.get_at_path(rest),
                Field::Repeatable(r) => r.instances.get(index)?.get_at_path(rest),
                Field::Leaf(_) => None,
            },
        }
    }

    /// Replace the node at a child index path. Paths come from the same
    /// traversal that produced them (`find_by_id`, parser rewrites), so an
    /// invalid path leaves the tree untouched rather than panicking.
    pub fn replace_at_path(self, path: &[usize], replacement: Field<Id>) -> Field<Id> {
        self.with_transformed(path, move |_| replacement)
    }

    fn with_transformed<F>(self, path: &[usize], transform: F) -> Field<Id>
    where
        F: FnOnce(Field<Id>) -> Field<Id>,
    {
        match path.split_first() {
            None => transform(self),
            Some((&index, rest)) => match self {
                Field::Group(mut g) => {
                    if index < g.children.len() {
                        let child = g.children.remove(index);
                        g.children.insert(index, child.with_transformed(rest, transform));
                    }
                    Field::Group(g)
                }
                Field::Repeatable(mut r) => {
                    if index < r.instances.len() {
                        let child = r.instances.remove(index);
                        r.instances
                            .insert(index, child.with_transformed(rest, transform));
                    }
                    Field::Repeatable(r)
                }
                other => other,
            },
        }
    }
}

fn collect_matches<'a, Id: PartialEq>(
    field: &'a Field<Id>,
    id: &Id,
    path: &mut Vec<usize>,
    hits: &mut Vec<(Vec<usize>, &'a Field<Id>)>,
) {
    if field.attrs().identifier.as_ref() == Some(id) {
        hits.push((path.clone(), field));
    }
    let children: &[Field<Id>] = match field {
        Field::Group(g) => &g.children,
        Field::Repeatable(r) => &r.instances,
        Field::Leaf(_) => return,
    };
    for (index, child) in children.iter().enumerate() {
        path.push(index);
        collect_matches(child, id, path, hits);
        path.pop();
    }
}
