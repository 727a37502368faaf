//! The validation error taxonomy.
//!
//! Every variant is recoverable by design: errors are data returned to
//! the caller, who decides how (or whether) to surface them. Nothing here
//! aborts anything.

use crate::form::attributes::Bound;
use crate::form::tree::{LeafKind, LookupError};
use std::fmt;

/// A single validation error, tagged with the field it concerns.
#[derive(Debug, Clone, PartialEq)]
pub enum Error<Id> {
    /// A required field has nothing entered.
    RequiredMissing(Id),
    /// The raw text cannot be coerced to the leaf's kind.
    TypeMismatch(Id, LeafKind),
    /// The raw text does not satisfy a pattern (mask spec or regex source).
    PatternMismatch(Id, String),
    /// A parsed value violates a numeric bound.
    OutOfRange(Id, Bound),
    /// A field-scoped or global custom message.
    Custom(Option<Id>, String),
    /// An identifier used by a parser resolved to zero or multiple nodes.
    /// This marks a malformed tree/parser pairing, not a user error.
    InvalidLookup(Id, LookupError),
}

impl<Id: fmt::Debug> fmt::Display for Error<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::RequiredMissing(id) => write!(f, "{:?}: required field is empty", id),
            Error::TypeMismatch(id, kind) => {
                write!(f, "{:?}: value is not a valid {}", id, kind)
            }
            Error::PatternMismatch(id, pattern) => {
                write!(f, "{:?}: value does not match pattern `{}`", id, pattern)
            }
            Error::OutOfRange(id, bound) => {
                write!(f, "{:?}: value is outside the {}", id, bound)
            }
            Error::Custom(Some(id), message) => write!(f, "{:?}: {}", id, message),
            Error::Custom(None, message) => write!(f, "{}", message),
            Error::InvalidLookup(id, cause) => write!(f, "{:?}: {}", id, cause),
        }
    }
}

impl<Id: fmt::Debug> std::error::Error for Error<Id> {}

// Constructors used by the primitives. A leaf reached through `field(id,
// ...)` always carries that id in its attributes, so primitives bind their
// errors from the leaf itself; the `None` fallbacks cover parsers run
// against identifier-less roots.

pub(crate) fn required_missing<Id>(id: Option<Id>) -> Error<Id> {
    match id {
        Some(id) => Error::RequiredMissing(id),
        None => Error::Custom(None, "required field is empty".to_string()),
    }
}

pub(crate) fn type_mismatch<Id>(id: Option<Id>, kind: LeafKind) -> Error<Id> {
    match id {
        Some(id) => Error::TypeMismatch(id, kind),
        None => Error::Custom(None, format!("value is not a valid {}", kind)),
    }
}

pub(crate) fn pattern_mismatch<Id>(id: Option<Id>, pattern: &str) -> Error<Id> {
    match id {
        Some(id) => Error::PatternMismatch(id, pattern.to_string()),
        None => Error::Custom(
            None,
            format!("value does not match pattern `{}`", pattern),
        ),
    }
}

pub(crate) fn out_of_range<Id>(id: Option<Id>, bound: Bound) -> Error<Id> {
    match id {
        Some(id) => Error::OutOfRange(id, bound),
        None => Error::Custom(None, format!("value is outside the {}", bound)),
    }
}
