//! The update/validate protocol.
//!
//! Two entry points over a `(Parser, Field)` pair: [`parse_update`] runs
//! on every input event and returns both the updated tree and a fresh
//! validation result; [`parse_validate`] / [`parse`] run at submit time
//! with no pending event. All three are pure functions of their inputs —
//! trees are immutable values threaded explicitly, so concurrent edits
//! are impossible by construction.
//!
//! A field's lifecycle (pristine, editing, valid, invalid) is emergent
//! from the call pattern; nothing is stored. An invalid field never
//! blocks further edits, and submission always proceeds to validation —
//! whether to gate on `Err` is the caller's decision.

use super::parser::{Error, Parser};
use super::tree::Field;
use super::value::Value;

/// A raw edit delivered by the surrounding application. Asynchronous
/// collaborator results (e.g. fetched autocomplete options) arrive as
/// ordinary events too; the engine has no notion of in-flight work.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent<Id> {
    TextChanged {
        id: Id,
        text: String,
        /// Caret selection after the edit, when the caller tracks it.
        selection: Option<(usize, usize)>,
    },
    SelectionMoved {
        id: Id,
        start: usize,
        end: usize,
    },
    OptionPicked {
        id: Id,
        value: Value,
    },
    Toggled {
        id: Id,
        on: bool,
    },
    OptionsLoaded {
        id: Id,
        options: Vec<(String, Value)>,
    },
    InstanceAdded {
        id: Id,
    },
    InstanceRemoved {
        id: Id,
        index: usize,
    },
}

/// Run the parser with no pending event, discarding the tree.
pub fn parse<Id, A>(parser: &Parser<Id, A>, tree: &Field<Id>) -> Result<A, Vec<Error<Id>>>
where
    Id: Clone + 'static,
    A: 'static,
{
    parser.run(tree).result
}

/// Submit-time pass: run the parser and apply its rewrites, returning the
/// (possibly attribute-updated) tree alongside the result.
pub fn parse_validate<Id, A>(
    parser: &Parser<Id, A>,
    tree: &Field<Id>,
) -> (Field<Id>, Result<A, Vec<Error<Id>>>)
where
    Id: Clone + 'static,
    A: 'static,
{
    let step = parser.run(tree);
    let mut out = tree.clone();
    for rewrite in step.rewrites {
        out = out.replace_at_path(&rewrite.path, rewrite.field);
    }
    (out, step.result)
}

/// Apply a raw input event, re-run the parser, and apply its rewrites.
///
/// The returned tree is the parser-rewritten one (e.g. reformatted text
/// with a repositioned caret), not the raw-edited intermediate. An event
/// whose identifier does not resolve leaves the tree untouched and
/// reports the lookup failure.
pub fn parse_update<Id, A>(
    parser: &Parser<Id, A>,
    event: &InputEvent<Id>,
    tree: &Field<Id>,
) -> (Field<Id>, Result<A, Vec<Error<Id>>>)
where
    Id: Clone + PartialEq + 'static,
    A: 'static,
{
    match apply_event(tree.clone(), event) {
        Err(error) => (tree.clone(), Err(vec![error])),
        Ok(edited) => {
            let step = parser.run(&edited);
            let mut out = edited;
            for rewrite in step.rewrites {
                out = out.replace_at_path(&rewrite.path, rewrite.field);
            }
            (out, step.result)
        }
    }
}

/// Apply the raw edit described by an event. Events that target a node of
/// the wrong shape (a text change on a group, an instance add on a leaf)
/// leave that node unchanged.
pub fn apply_event<Id>(tree: Field<Id>, event: &InputEvent<Id>) -> Result<Field<Id>, Error<Id>>
where
    Id: Clone + PartialEq,
{
    let (id, transform): (&Id, Box<dyn FnOnce(Field<Id>) -> Field<Id> + '_>) = match event {
        InputEvent::TextChanged {
            id,
            text,
            selection,
        } => (
            id,
            Box::new(move |field| match field {
                Field::Leaf(mut l) => {
                    l.value = Value::Str(text.clone());
                    if let Some(sel) = selection {
                        l.attrs.selection = Some(*sel);
                    }
                    Field::Leaf(l)
                }
                other => other,
            }),
        ),
        InputEvent::SelectionMoved { id, start, end } => (
            id,
            Box::new(move |field| match field {
                Field::Leaf(mut l) => {
                    l.attrs.selection = Some((*start, *end));
                    Field::Leaf(l)
                }
                other => other,
            }),
        ),
        InputEvent::OptionPicked { id, value } => (
            id,
            Box::new(move |field| match field {
                Field::Leaf(mut l) => {
                    l.value = value.clone();
                    Field::Leaf(l)
                }
                other => other,
            }),
        ),
        InputEvent::Toggled { id, on } => (
            id,
            Box::new(move |field| match field {
                Field::Leaf(mut l) => {
                    l.value = Value::Bool(*on);
                    Field::Leaf(l)
                }
                other => other,
            }),
        ),
        InputEvent::OptionsLoaded { id, options } => (
            id,
            Box::new(move |field| match field {
                Field::Leaf(mut l) => {
                    l.attrs.options = options.clone();
                    Field::Leaf(l)
                }
                other => other,
            }),
        ),
        InputEvent::InstanceAdded { id } => (
            id,
            Box::new(|field| match field {
                Field::Repeatable(r) => Field::Repeatable(r.push_instance()),
                other => other,
            }),
        ),
        InputEvent::InstanceRemoved { id, index } => (
            id,
            Box::new(move |field| match field {
                Field::Repeatable(r) => Field::Repeatable(r.remove_instance(*index)),
                other => other,
            }),
        ),
    };
    tree.update_with_id(id, transform)
        .map_err(|cause| Error::InvalidLookup(id.clone(), cause))
}
