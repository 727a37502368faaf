//! The parser type and its combinators.

use super::error::Error;
use crate::form::tree::{hydrate, Field};
use serde_json::Value as Json;
use std::rc::Rc;

/// A tree slice rewritten by a parser, addressed by child index path so
/// rewrites stay unambiguous across cloned repeatable instances.
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite<Id> {
    pub path: Vec<usize>,
    pub field: Field<Id>,
}

/// One run of a parser against a tree: the rewrites to feed back plus the
/// parse result.
#[derive(Debug)]
pub struct Step<Id, A> {
    pub rewrites: Vec<Rewrite<Id>>,
    pub result: Result<A, Vec<Error<Id>>>,
}

impl<Id, A> Step<Id, A> {
    pub fn ok(value: A) -> Self {
        Step {
            rewrites: Vec::new(),
            result: Ok(value),
        }
    }

    pub fn err(errors: Vec<Error<Id>>) -> Self {
        Step {
            rewrites: Vec::new(),
            result: Err(errors),
        }
    }
}

/// A pure, composable computation projecting a field tree into a typed
/// value while collecting per-field errors.
pub struct Parser<Id, A> {
    runner: Rc<dyn Fn(&Field<Id>) -> Step<Id, A>>,
}

impl<Id, A> Clone for Parser<Id, A> {
    fn clone(&self) -> Self {
        Parser {
            runner: Rc::clone(&self.runner),
        }
    }
}

impl<Id: Clone + 'static, A: 'static> Parser<Id, A> {
    pub(crate) fn new(runner: impl Fn(&Field<Id>) -> Step<Id, A> + 'static) -> Self {
        Parser {
            runner: Rc::new(runner),
        }
    }

    /// Run against a tree root. Exposed for the protocol entry points;
    /// most callers want `protocol::parse` and friends.
    pub fn run(&self, root: &Field<Id>) -> Step<Id, A> {
        (self.runner)(root)
    }

    pub fn map<B: 'static>(self, f: impl Fn(A) -> B + 'static) -> Parser<Id, B> {
        Parser::new(move |root| {
            let step = self.run(root);
            Step {
                rewrites: step.rewrites,
                result: step.result.map(&f),
            }
        })
    }

    /// Applicative pairing: both sides always run, so errors from
    /// independent fields accumulate into one list (left side's errors
    /// first) instead of stopping at the first failure.
    pub fn and_map<B: 'static>(self, other: Parser<Id, B>) -> Parser<Id, (A, B)> {
        Parser::new(move |root| {
            let left = self.run(root);
            let right = other.run(root);
            let mut rewrites = left.rewrites;
            rewrites.extend(right.rewrites);
            let result = match (left.result, right.result) {
                (Ok(a), Ok(b)) => Ok((a, b)),
                (Err(mut ea), Err(eb)) => {
                    ea.extend(eb);
                    Err(ea)
                }
                (Err(ea), Ok(_)) => Err(ea),
                (Ok(_), Err(eb)) => Err(eb),
            };
            Step { rewrites, result }
        })
    }

    /// Monadic sequencing: on success the value picks the next parser, on
    /// failure the chain short-circuits. Used when a later parse depends
    /// on validated output from an earlier one within the same field, not
    /// across independent fields.
    pub fn and_then<B: 'static>(
        self,
        f: impl Fn(A) -> Parser<Id, B> + 'static,
    ) -> Parser<Id, B> {
        Parser::new(move |root| {
            let step = self.run(root);
            match step.result {
                Err(errors) => Step {
                    rewrites: step.rewrites,
                    result: Err(errors),
                },
                Ok(a) => {
                    let next = f(a).run(root);
                    let mut rewrites = step.rewrites;
                    rewrites.extend(next.rewrites);
                    Step {
                        rewrites,
                        result: next.result,
                    }
                }
            }
        })
    }

    /// The masking side channel: after a successful parse, `f` receives
    /// the live field (as already rewritten by earlier stages of this
    /// chain) and the parsed value, and returns the rewritten field plus
    /// the value to propagate. The rewrite is explicit data in the step,
    /// never a hidden mutation.
    pub fn and_update<B: 'static>(
        self,
        f: impl Fn(&Field<Id>, A) -> (Field<Id>, B) + 'static,
    ) -> Parser<Id, B> {
        Parser::new(move |root| {
            let step = self.run(root);
            match step.result {
                Err(errors) => Step {
                    rewrites: step.rewrites,
                    result: Err(errors),
                },
                Ok(a) => {
                    let mut rewrites = step.rewrites;
                    let view = rewrites
                        .iter()
                        .rev()
                        .find(|r| r.path.is_empty())
                        .map(|r| r.field.clone())
                        .unwrap_or_else(|| root.clone());
                    let (rewritten, value) = f(&view, a);
                    rewrites.retain(|r| !r.path.is_empty());
                    rewrites.push(Rewrite {
                        path: Vec::new(),
                        field: rewritten,
                    });
                    Step {
                        rewrites,
                        result: Ok(value),
                    }
                }
            }
        })
    }
}

/// Always yields `value`, consuming no field.
pub fn succeed<Id: Clone + 'static, A: Clone + 'static>(value: A) -> Parser<Id, A> {
    Parser::new(move |_| Step::ok(value.clone()))
}

/// Always fails with a global custom message.
pub fn fail<Id: Clone + 'static, A: 'static>(message: &str) -> Parser<Id, A> {
    let message = message.to_string();
    Parser::new(move |_| Step::err(vec![Error::Custom(None, message.clone())]))
}

/// Resolve `id` in the tree, then run `inner` against that subtree.
///
/// The resolved node carries `id` in its own attributes (that is how it
/// was found), so `inner`'s errors come back tagged with it. Zero or
/// multiple matches are configuration errors surfaced as
/// [`Error::InvalidLookup`].
pub fn field<Id, A>(id: Id, inner: Parser<Id, A>) -> Parser<Id, A>
where
    Id: Clone + PartialEq + 'static,
    A: 'static,
{
    Parser::new(move |root| match root.find_by_id(&id) {
        Err(cause) => Step::err(vec![Error::InvalidLookup(id.clone(), cause)]),
        Ok((path, node)) => {
            let mut step = inner.run(node);
            for rewrite in &mut step.rewrites {
                let mut prefixed = path.clone();
                prefixed.extend(rewrite.path.drain(..));
                rewrite.path = prefixed;
            }
            step
        }
    })
}

/// Run `parser` once per repeatable instance (or group child), in index
/// order. An instance's failure does not prevent siblings from being
/// parsed: the result is every success, or the concatenation of every
/// failing instance's errors.
pub fn list<Id, A>(parser: Parser<Id, A>) -> Parser<Id, Vec<A>>
where
    Id: Clone + 'static,
    A: 'static,
{
    Parser::new(move |root| {
        let children: &[Field<Id>] = match root {
            Field::Repeatable(r) => &r.instances,
            Field::Group(g) => &g.children,
            Field::Leaf(_) => {
                return Step::err(vec![Error::Custom(
                    root.attrs().identifier.clone(),
                    "list parser applied to a leaf field".to_string(),
                )]);
            }
        };
        let mut rewrites = Vec::new();
        let mut values = Vec::new();
        let mut errors = Vec::new();
        for (index, child) in children.iter().enumerate() {
            let step = parser.run(child);
            for mut rewrite in step.rewrites {
                rewrite.path.insert(0, index);
                rewrites.push(rewrite);
            }
            match step.result {
                Ok(value) => values.push(value),
                Err(child_errors) => errors.extend(child_errors),
            }
        }
        let result = if errors.is_empty() {
            Ok(values)
        } else {
            Err(errors)
        };
        Step { rewrites, result }
    })
}

/// Serialize the full tree's values into JSON (keyed by `name`), honoring
/// `required`: a required-but-empty leaf contributes a `RequiredMissing`
/// error instead of a value.
pub fn json<Id: Clone + 'static>() -> Parser<Id, Json> {
    Parser::new(|root| {
        let mut errors = Vec::new();
        collect_required(root, &mut errors);
        if errors.is_empty() {
            Step::ok(hydrate::to_json(root))
        } else {
            Step::err(errors)
        }
    })
}

fn collect_required<Id: Clone>(field: &Field<Id>, errors: &mut Vec<Error<Id>>) {
    match field {
        Field::Leaf(l) => {
            if l.attrs.required && l.value.is_empty() {
                errors.push(match l.attrs.identifier.clone() {
                    Some(id) => Error::RequiredMissing(id),
                    None => Error::Custom(
                        None,
                        format!(
                            "required field `{}` is empty",
                            l.attrs.name.as_deref().unwrap_or("<unnamed>")
                        ),
                    ),
                });
            }
        }
        Field::Group(g) => {
            for child in &g.children {
                collect_required(child, errors);
            }
        }
        Field::Repeatable(r) => {
            for instance in &r.instances {
                collect_required(instance, errors);
            }
        }
    }
}

pub fn map2<Id, A, B, Out, F>(f: F, pa: Parser<Id, A>, pb: Parser<Id, B>) -> Parser<Id, Out>
where
    Id: Clone + 'static,
    A: 'static,
    B: 'static,
    Out: 'static,
    F: Fn(A, B) -> Out + 'static,
{
    pa.and_map(pb).map(move |(a, b)| f(a, b))
}

pub fn map3<Id, A, B, C, Out, F>(
    f: F,
    pa: Parser<Id, A>,
    pb: Parser<Id, B>,
    pc: Parser<Id, C>,
) -> Parser<Id, Out>
where
    Id: Clone + 'static,
    A: 'static,
    B: 'static,
    C: 'static,
    Out: 'static,
    F: Fn(A, B, C) -> Out + 'static,
{
    pa.and_map(pb)
        .and_map(pc)
        .map(move |((a, b), c)| f(a, b, c))
}

pub fn map4<Id, A, B, C, D, Out, F>(
    f: F,
    pa: Parser<Id, A>,
    pb: Parser<Id, B>,
    pc: Parser<Id, C>,
    pd: Parser<Id, D>,
) -> Parser<Id, Out>
where
    Id: Clone + 'static,
    A: 'static,
    B: 'static,
    C: 'static,
    D: 'static,
    Out: 'static,
    F: Fn(A, B, C, D) -> Out + 'static,
{
    pa.and_map(pb)
        .and_map(pc)
        .and_map(pd)
        .map(move |(((a, b), c), d)| f(a, b, c, d))
}

pub fn map5<Id, A, B, C, D, E, Out, F>(
    f: F,
    pa: Parser<Id, A>,
    pb: Parser<Id, B>,
    pc: Parser<Id, C>,
    pd: Parser<Id, D>,
    pe: Parser<Id, E>,
) -> Parser<Id, Out>
where
    Id: Clone + 'static,
    A: 'static,
    B: 'static,
    C: 'static,
    D: 'static,
    E: 'static,
    Out: 'static,
    F: Fn(A, B, C, D, E) -> Out + 'static,
{
    pa.and_map(pb)
        .and_map(pc)
        .and_map(pd)
        .and_map(pe)
        .map(move |((((a, b), c), d), e)| f(a, b, c, d, e))
}
