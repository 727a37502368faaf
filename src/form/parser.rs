//! Tree-directed parser combinators.
//!
//! A [`Parser<Id, A>`](combinators::Parser) is a pure computation that,
//! given a tree rooted at some `Field<Id>`, yields a typed value or a list
//! of per-field errors. Parsers never mutate the tree they are run
//! against; the only feedback channel is the explicit rewrite list carried
//! by every [`Step`](combinators::Step), which exists to support live
//! masking.
//!
//! Error accumulation is applicative across independent fields
//! (`and_map`, `map2..map5` collect every error, left to right in
//! composition order) and monadic within a single field's chain
//! (`and_then` short-circuits).

pub mod combinators;
pub mod error;
pub mod primitives;

pub use combinators::{
    fail, field, json, list, map2, map3, map4, map5, succeed, Parser, Rewrite, Step,
};
pub use error::Error;
pub use primitives::{
    boolean, choice, datetime, email, float, formatted_string, int, masked, optional, string,
};
