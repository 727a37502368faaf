//! Leaf-level parser primitives.
//!
//! Primitives run against a single resolved leaf (usually via
//! `field(id, ...)`) and bind their errors to the leaf's own identifier.
//! The required check comes first everywhere: required-and-empty is
//! always `RequiredMissing`, before any coercion is attempted.

use super::combinators::{Parser, Step};
use super::error::{self, Error};
use crate::form::attributes::Bound;
use crate::form::mask::{caret, MaskPattern};
use crate::form::tree::{Field, Leaf, LeafKind};
use crate::form::value::Value;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"));

/// Lift a per-leaf function into a parser, rejecting non-leaf roots.
fn leaf_parser<Id, A, F>(parse: F) -> Parser<Id, A>
where
    Id: Clone + 'static,
    A: 'static,
    F: Fn(&Leaf<Id>) -> Result<A, Vec<Error<Id>>> + 'static,
{
    Parser::new(move |root| match root {
        Field::Leaf(leaf) => Step {
            rewrites: Vec::new(),
            result: parse(leaf),
        },
        other => Step::err(vec![Error::Custom(
            other.attrs().identifier.clone(),
            "parser expects a leaf field".to_string(),
        )]),
    })
}

/// Any text. Empty is only an error on required fields.
pub fn string<Id: Clone + 'static>() -> Parser<Id, String> {
    leaf_parser(|leaf| {
        let raw = leaf.value.raw_text();
        if raw.is_empty() && leaf.attrs.required {
            return Err(vec![error::required_missing(leaf.attrs.identifier.clone())]);
        }
        Ok(raw)
    })
}

/// A whole number, respecting `min`/`max` attribute bounds.
pub fn int<Id: Clone + 'static>() -> Parser<Id, i64> {
    leaf_parser(|leaf| {
        let id = leaf.attrs.identifier.clone();
        if leaf.value.is_empty() {
            return Err(vec![if leaf.attrs.required {
                error::required_missing(id)
            } else {
                error::type_mismatch(id, LeafKind::Int)
            }]);
        }
        let parsed = leaf
            .value
            .as_int()
            .ok_or_else(|| vec![error::type_mismatch(id.clone(), LeafKind::Int)])?;
        check_int_bounds(parsed, leaf)?;
        Ok(parsed)
    })
}

/// A floating-point number, respecting `min`/`max` attribute bounds.
pub fn float<Id: Clone + 'static>() -> Parser<Id, f64> {
    leaf_parser(|leaf| {
        let id = leaf.attrs.identifier.clone();
        if leaf.value.is_empty() {
            return Err(vec![if leaf.attrs.required {
                error::required_missing(id)
            } else {
                error::type_mismatch(id, LeafKind::Float)
            }]);
        }
        let parsed = leaf
            .value
            .as_float()
            .ok_or_else(|| vec![error::type_mismatch(id.clone(), LeafKind::Float)])?;
        if let Some(min) = leaf.attrs.min {
            if parsed < min as f64 {
                return Err(vec![error::out_of_range(id, Bound::Min(min))]);
            }
        }
        if let Some(max) = leaf.attrs.max {
            if parsed > max as f64 {
                return Err(vec![error::out_of_range(id, Bound::Max(max))]);
            }
        }
        Ok(parsed)
    })
}

fn check_int_bounds<Id: Clone>(parsed: i64, leaf: &Leaf<Id>) -> Result<(), Vec<Error<Id>>> {
    let id = leaf.attrs.identifier.clone();
    if let Some(min) = leaf.attrs.min {
        if parsed < min {
            return Err(vec![error::out_of_range(id, Bound::Min(min))]);
        }
    }
    if let Some(max) = leaf.attrs.max {
        if parsed > max {
            return Err(vec![error::out_of_range(id, Bound::Max(max))]);
        }
    }
    Ok(())
}

/// A checkbox-style boolean. An untouched (null) leaf reads as `false`;
/// a required leaf must have been touched.
pub fn boolean<Id: Clone + 'static>() -> Parser<Id, bool> {
    leaf_parser(|leaf| {
        let id = leaf.attrs.identifier.clone();
        if leaf.value.is_empty() {
            if leaf.attrs.required {
                return Err(vec![error::required_missing(id)]);
            }
            return Ok(false);
        }
        leaf.value
            .as_bool()
            .ok_or_else(|| vec![error::type_mismatch(id, LeafKind::Boolean)])
    })
}

/// A datetime in `%Y-%m-%dT%H:%M[:%S]` rendering.
pub fn datetime<Id: Clone + 'static>() -> Parser<Id, NaiveDateTime> {
    leaf_parser(|leaf| {
        let id = leaf.attrs.identifier.clone();
        if leaf.value.is_empty() {
            return Err(vec![if leaf.attrs.required {
                error::required_missing(id)
            } else {
                error::type_mismatch(id, LeafKind::DateTime)
            }]);
        }
        leaf.value
            .as_datetime()
            .ok_or_else(|| vec![error::type_mismatch(id, LeafKind::DateTime)])
    })
}

/// A regex-validated email address. Empty is fine unless required.
pub fn email<Id: Clone + 'static>() -> Parser<Id, String> {
    leaf_parser(|leaf| {
        let id = leaf.attrs.identifier.clone();
        let raw = leaf.value.raw_text();
        if raw.is_empty() {
            if leaf.attrs.required {
                return Err(vec![error::required_missing(id)]);
            }
            return Ok(raw);
        }
        if EMAIL_RE.is_match(raw.trim()) {
            Ok(raw.trim().to_string())
        } else {
            Err(vec![error::pattern_mismatch(id, EMAIL_RE.as_str())])
        }
    })
}

/// The selected option's value.
///
/// Select and strict-autocomplete leaves must match one of the `options`
/// entries (by value, or by typed-out label); plain autocomplete lets
/// free text through unchanged.
pub fn choice<Id: Clone + 'static>() -> Parser<Id, Value> {
    leaf_parser(|leaf| {
        let id = leaf.attrs.identifier.clone();
        match leaf.kind {
            LeafKind::Select | LeafKind::Autocomplete | LeafKind::StrictAutocomplete => {}
            other => return Err(vec![error::type_mismatch(id, other)]),
        }
        if leaf.value.is_empty() {
            return if leaf.attrs.required {
                Err(vec![error::required_missing(id)])
            } else {
                Ok(Value::Null)
            };
        }
        let matched = leaf.attrs.options.iter().find(|(label, value)| {
            *value == leaf.value || leaf.value.as_str() == Some(label.as_str())
        });
        match (matched, leaf.kind) {
            (Some((_, value)), _) => Ok(value.clone()),
            (None, LeafKind::Autocomplete) => Ok(leaf.value.clone()),
            (None, _) => Err(vec![Error::Custom(
                id,
                "no matching option".to_string(),
            )]),
        }
    })
}

/// Terminal mask validation: the raw value's significant characters must
/// fill `pattern` exactly; the cleaned-and-reformatted string is the
/// result. Partial input is only an error here, at submit time.
pub fn formatted_string<Id: Clone + 'static>(pattern: MaskPattern) -> Parser<Id, String> {
    leaf_parser(move |leaf| {
        let id = leaf.attrs.identifier.clone();
        let raw = leaf.value.raw_text();
        if raw.is_empty() {
            if leaf.attrs.required {
                return Err(vec![error::required_missing(id)]);
            }
            return Ok(String::new());
        }
        if pattern.matches(&raw) {
            Ok(pattern.format(&raw))
        } else {
            Err(vec![error::pattern_mismatch(id, pattern.source())])
        }
    })
}

/// `Ok(None)` on an empty leaf, `Some` of the inner parse otherwise.
pub fn optional<Id, A>(parser: Parser<Id, A>) -> Parser<Id, Option<A>>
where
    Id: Clone + 'static,
    A: 'static,
{
    Parser::new(move |root| match root {
        Field::Leaf(leaf) if leaf.value.is_empty() => Step::ok(None),
        _ => {
            let step = parser.run(root);
            Step {
                rewrites: step.rewrites,
                result: step.result.map(Some),
            }
        }
    })
}

/// Live masking: reformat the raw text through `pattern` and reposition
/// the caret, feeding the rewritten leaf back through the rewrite
/// channel. No terminal validation happens here; pair with
/// [`formatted_string`] at submit time.
pub fn masked<Id: Clone + 'static>(pattern: MaskPattern) -> Parser<Id, String> {
    string().and_update(move |field, raw: String| {
        let Field::Leaf(leaf) = field else {
            // `string()` already rejected non-leaf roots.
            return (field.clone(), raw);
        };
        let raw_len = raw.chars().count();
        let (start, end) = leaf.attrs.selection.unwrap_or((raw_len, raw_len));
        let formatted = pattern.format(&raw);
        let start = caret::caret_after(&pattern, &raw, start);
        let end = caret::caret_after(&pattern, &raw, end);
        let mut rewritten = leaf.clone();
        rewritten.value = Value::Str(formatted.clone());
        rewritten.attrs.selection = Some((start, end));
        (Field::Leaf(rewritten), formatted)
    })
}
