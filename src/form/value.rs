//! Runtime value representation for field content.
//!
//! Every leaf holds a [`Value`] independently of how it will eventually be
//! parsed. During an in-flight edit the raw string representation is held
//! (whatever the user typed) until the next parse re-establishes the typed
//! form, so coercion accessors accept raw strings wherever the string
//! parses.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use serde_json::Value as Json;
use std::fmt;

/// Accepted textual datetime renderings, most specific first.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Tagged union holding a field's current content.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    List(Vec<Value>),
}

impl Value {
    /// True for the states a text box renders as "nothing entered yet".
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Str(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// The editing representation: what a text box would display.
    pub fn raw_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Str(s) => s.clone(),
            Value::Int(n) => n.to_string(),
            Value::Float(x) => x.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::DateTime(dt) => dt.format(DATETIME_FORMATS[0]).to_string(),
            // Lists have no single-line editing form
            Value::List(_) => String::new(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Str(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            Value::Str(s) => parse_datetime(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Project into a `serde_json` value. Datetimes serialize as
    /// `%Y-%m-%dT%H:%M:%S` strings.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Str(s) => Json::String(s.clone()),
            Value::Int(n) => Json::from(*n),
            Value::Float(x) => serde_json::Number::from_f64(*x)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Bool(b) => Json::Bool(*b),
            Value::DateTime(dt) => Json::String(dt.format(DATETIME_FORMATS[0]).to_string()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
        }
    }

    /// Shape-preserving conversion from a `serde_json` value.
    ///
    /// Objects have no leaf-level counterpart and return `None`; they are
    /// handled structurally by tree hydration.
    pub fn from_json(json: &Json) -> Option<Value> {
        match json {
            Json::Null => Some(Value::Null),
            Json::Bool(b) => Some(Value::Bool(*b)),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Value::Int(i))
                } else {
                    n.as_f64().map(Value::Float)
                }
            }
            Json::String(s) => Some(Value::Str(s.clone())),
            Json::Array(items) => items
                .iter()
                .map(Value::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
            Json::Object(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw_text())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Parse a textual datetime in any of the accepted renderings.
pub(crate) fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_strings_coerce_to_numbers() {
        assert_eq!(Value::Str("42".into()).as_int(), Some(42));
        assert_eq!(Value::Str(" 2.5 ".into()).as_float(), Some(2.5));
        assert_eq!(Value::Str("nope".into()).as_int(), None);
    }

    #[test]
    fn int_widens_to_float_but_not_back() {
        assert_eq!(Value::Int(3).as_float(), Some(3.0));
        assert_eq!(Value::Float(3.5).as_int(), None);
    }

    #[test]
    fn emptiness_is_null_blank_or_empty_list() {
        assert!(Value::Null.is_empty());
        assert!(Value::Str(String::new()).is_empty());
        assert!(Value::List(Vec::new()).is_empty());
        assert!(!Value::Int(0).is_empty());
        assert!(!Value::Bool(false).is_empty());
    }

    #[test]
    fn datetime_accepts_both_renderings() {
        let with_seconds = Value::Str("2024-07-01T12:30:05".into());
        let without = Value::Str("2024-07-01T12:30".into());
        assert!(with_seconds.as_datetime().is_some());
        assert!(without.as_datetime().is_some());
        assert_eq!(
            with_seconds.as_datetime().unwrap().format("%H:%M:%S").to_string(),
            "12:30:05"
        );
    }

    #[test]
    fn list_access_is_shape_checked() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(list.as_list(), Some(&[Value::Int(1), Value::Int(2)][..]));
        assert_eq!(Value::Str("1,2".into()).as_list(), None);
    }

    #[test]
    fn json_round_trip_preserves_scalars() {
        for value in [
            Value::Null,
            Value::Str("hi".into()),
            Value::Int(-7),
            Value::Bool(true),
            Value::List(vec![Value::Int(1), Value::Int(2)]),
        ] {
            assert_eq!(Value::from_json(&value.to_json()), Some(value));
        }
    }
}
