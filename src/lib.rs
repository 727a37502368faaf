//! # formlet
//!
//! A field-tree and parser-combinator engine for typed, validated forms.
//!
//! A form is described as a tree of fields (leaves, groups, repeatable
//! groups) carrying presentation attributes and live values. Parsers
//! project such a tree into a typed domain value while collecting
//! per-field errors, and the masking engine keeps free-text input
//! formatted without losing the caret across reformatting.
//!
//! The engine is purely in-process: it consumes input events and returns
//! `(tree, result)` pairs. Rendering, transport and persistence are the
//! caller's concern.

pub mod form;

pub use form::mask::MaskPattern;
pub use form::parser::{Error, Parser};
pub use form::tree::Field;
pub use form::value::Value;
