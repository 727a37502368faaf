//! Presentation attributes and the attribute-list builder.
//!
//! Trees are authored from attribute lists: every constructor takes a
//! `Vec<Attr<Id>>` and folds it into an [`Attributes`] record. The last
//! setting of an attribute wins, matching how an author reads the list.

use super::mask::MaskPattern;
use super::value::Value;
use serde::Serialize;
use std::fmt;

/// Node metadata. Everything is optional except the `required`/`disabled`
/// flags, which default to off.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributes<Id> {
    pub label: Option<String>,
    /// Stable wire key for the JSON projection. Identifiers are value-level
    /// and deliberately not used as wire keys.
    pub name: Option<String>,
    pub placeholder: Option<String>,
    pub hint: Option<String>,
    pub required: bool,
    pub disabled: bool,
    /// Mask spec for masked text leaves.
    pub pattern: Option<MaskPattern>,
    /// Numeric bounds on numeric leaves, instance-count bounds on
    /// repeatables.
    pub min: Option<i64>,
    pub max: Option<i64>,
    /// Ordered (label, value) pairs for select/autocomplete leaves.
    pub options: Vec<(String, Value)>,
    /// Application-defined tag correlating this node with a parser.
    pub identifier: Option<Id>,
    /// Caret selection, only meaningful for masked text leaves.
    pub selection: Option<(usize, usize)>,
    /// Button copy for repeatable groups.
    pub add_label: Option<String>,
    pub remove_label: Option<String>,
}

impl<Id> Attributes<Id> {
    pub fn new() -> Self {
        Attributes {
            label: None,
            name: None,
            placeholder: None,
            hint: None,
            required: false,
            disabled: false,
            pattern: None,
            min: None,
            max: None,
            options: Vec::new(),
            identifier: None,
            selection: None,
            add_label: None,
            remove_label: None,
        }
    }

    /// Fold an attribute list, last setting wins.
    pub fn from_attrs(attrs: Vec<Attr<Id>>) -> Self {
        let mut out = Attributes::new();
        for attr in attrs {
            match attr {
                Attr::Label(s) => out.label = Some(s),
                Attr::Name(s) => out.name = Some(s),
                Attr::Placeholder(s) => out.placeholder = Some(s),
                Attr::Hint(s) => out.hint = Some(s),
                Attr::Required(flag) => out.required = flag,
                Attr::Disabled(flag) => out.disabled = flag,
                Attr::Pattern(p) => out.pattern = Some(p),
                Attr::Min(n) => out.min = Some(n),
                Attr::Max(n) => out.max = Some(n),
                Attr::Options(opts) => out.options = opts,
                Attr::Identifier(id) => out.identifier = Some(id),
                Attr::Selection(start, end) => out.selection = Some((start, end)),
                Attr::AddLabel(s) => out.add_label = Some(s),
                Attr::RemoveLabel(s) => out.remove_label = Some(s),
                Attr::Value(_) => {}
            }
        }
        out
    }

    /// Rewrap the identifier through an injection, preserving everything
    /// else. Used by `Field::map` to compose sub-forms.
    pub fn map<J, F>(self, f: &F) -> Attributes<J>
    where
        F: Fn(Id) -> J,
    {
        Attributes {
            label: self.label,
            name: self.name,
            placeholder: self.placeholder,
            hint: self.hint,
            required: self.required,
            disabled: self.disabled,
            pattern: self.pattern,
            min: self.min,
            max: self.max,
            options: self.options,
            identifier: self.identifier.map(f),
            selection: self.selection,
            add_label: self.add_label,
            remove_label: self.remove_label,
        }
    }
}

impl<Id> Default for Attributes<Id> {
    fn default() -> Self {
        Attributes::new()
    }
}

/// A single attribute setting, consumed by the tree constructors.
#[derive(Debug, Clone, PartialEq)]
pub enum Attr<Id> {
    Label(String),
    Name(String),
    Placeholder(String),
    Hint(String),
    Required(bool),
    Disabled(bool),
    Pattern(MaskPattern),
    Min(i64),
    Max(i64),
    Options(Vec<(String, Value)>),
    Identifier(Id),
    Selection(usize, usize),
    AddLabel(String),
    RemoveLabel(String),
    /// Initial value, consumed by leaf constructors rather than stored.
    Value(Value),
}

// Attribute-list constructors. These read best at the call site:
//
//   text(vec![label("Card number"), name("number"), required(), identifier(Id::Number)])

pub fn label<Id>(text: &str) -> Attr<Id> {
    Attr::Label(text.to_string())
}

pub fn name<Id>(key: &str) -> Attr<Id> {
    Attr::Name(key.to_string())
}

pub fn placeholder<Id>(text: &str) -> Attr<Id> {
    Attr::Placeholder(text.to_string())
}

pub fn hint<Id>(text: &str) -> Attr<Id> {
    Attr::Hint(text.to_string())
}

pub fn required<Id>() -> Attr<Id> {
    Attr::Required(true)
}

pub fn disabled<Id>() -> Attr<Id> {
    Attr::Disabled(true)
}

pub fn pattern<Id>(mask: MaskPattern) -> Attr<Id> {
    Attr::Pattern(mask)
}

pub fn min<Id>(bound: i64) -> Attr<Id> {
    Attr::Min(bound)
}

pub fn max<Id>(bound: i64) -> Attr<Id> {
    Attr::Max(bound)
}

pub fn options<Id>(pairs: Vec<(String, Value)>) -> Attr<Id> {
    Attr::Options(pairs)
}

pub fn identifier<Id>(id: Id) -> Attr<Id> {
    Attr::Identifier(id)
}

pub fn selection<Id>(start: usize, end: usize) -> Attr<Id> {
    Attr::Selection(start, end)
}

pub fn add_label<Id>(text: &str) -> Attr<Id> {
    Attr::AddLabel(text.to_string())
}

pub fn remove_label<Id>(text: &str) -> Attr<Id> {
    Attr::RemoveLabel(text.to_string())
}

pub fn value<Id>(initial: Value) -> Attr<Id> {
    Attr::Value(initial)
}

/// The bound violated by an out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Bound {
    Min(i64),
    Max(i64),
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Min(n) => write!(f, "minimum {}", n),
            Bound::Max(n) => write!(f, "maximum {}", n),
        }
    }
}
