//! Combinator behavior against small, hand-built trees.
//!
//! Accumulation is applicative across independent fields (every error is
//! collected, left to right in composition order) and monadic within a
//! single field's chain (`and_then` short-circuits).

use formlet::form::attributes::{identifier, required, value};
use formlet::form::parser::{self, Error};
use formlet::form::protocol::parse;
use formlet::form::tree::{self, Field, LeafKind, LookupError};
use formlet::form::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Id {
    Name,
    Age,
    Score,
    Item,
    Items,
}

fn person(name_value: Value, age_value: Value, score_value: Value) -> Field<Id> {
    tree::group(
        vec![],
        vec![
            tree::text(vec![identifier(Id::Name), required(), value(name_value)]),
            tree::int(vec![identifier(Id::Age), required(), value(age_value)]),
            tree::float(vec![identifier(Id::Score), value(score_value)]),
        ],
    )
}

#[test]
fn required_empty_text_yields_required_missing() {
    let tree = person(Value::Null, Value::Int(30), Value::Float(1.0));
    let parser = parser::field(Id::Name, parser::string());
    assert_eq!(
        parse(&parser, &tree),
        Err(vec![Error::RequiredMissing(Id::Name)])
    );
}

#[test]
fn applicative_composition_collects_every_error_in_order() {
    // All three fields invalid: errors arrive in composition order, not
    // tree order.
    let tree = person(
        Value::Null,
        Value::Str("not a number".into()),
        Value::Str("also not".into()),
    );
    let parser = parser::map3(
        |score: f64, name: String, age: i64| (score, name, age),
        parser::field(Id::Score, parser::float()),
        parser::field(Id::Name, parser::string()),
        parser::field(Id::Age, parser::int()),
    );
    assert_eq!(
        parse(&parser, &tree),
        Err(vec![
            Error::TypeMismatch(Id::Score, LeafKind::Float),
            Error::RequiredMissing(Id::Name),
            Error::TypeMismatch(Id::Age, LeafKind::Int),
        ])
    );
}

#[test]
fn and_map_still_runs_the_right_side_after_a_left_failure() {
    let tree = person(Value::Null, Value::Str("x".into()), Value::Float(0.5));
    let parser = parser::field(Id::Name, parser::string())
        .and_map(parser::field(Id::Age, parser::int()));
    let errors = parse(&parser, &tree).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0], Error::RequiredMissing(Id::Name));
    assert_eq!(errors[1], Error::TypeMismatch(Id::Age, LeafKind::Int));
}

#[test]
fn and_then_short_circuits_within_a_chain() {
    let tree = person(Value::Str("Ada".into()), Value::Str("x".into()), Value::Null);
    // The follow-up parser would fail loudly; it must never run.
    let parser = parser::field(Id::Age, parser::int())
        .and_then(|_| parser::fail::<Id, i64>("unreachable"));
    assert_eq!(
        parse(&parser, &tree),
        Err(vec![Error::TypeMismatch(Id::Age, LeafKind::Int)])
    );
}

#[test]
fn and_then_feeds_the_value_into_the_next_parser() {
    let tree = person(Value::Str("Ada".into()), Value::Int(17), Value::Null);
    let parser = parser::field(Id::Age, parser::int()).and_then(|age| {
        if age >= 18 {
            parser::succeed(age)
        } else {
            parser::fail("must be an adult")
        }
    });
    assert_eq!(
        parse(&parser, &tree),
        Err(vec![Error::Custom(None, "must be an adult".into())])
    );
}

#[test]
fn succeed_consumes_no_field() {
    let tree = person(Value::Null, Value::Null, Value::Null);
    assert_eq!(parse(&parser::succeed::<Id, i64>(7), &tree), Ok(7));
}

#[test]
fn optional_turns_empty_into_none() {
    let tree = person(Value::Str("Ada".into()), Value::Int(1), Value::Null);
    let parser = parser::field(Id::Score, parser::optional(parser::float()));
    assert_eq!(parse(&parser, &tree), Ok(None));

    let tree = person(Value::Str("Ada".into()), Value::Int(1), Value::Float(0.25));
    assert_eq!(parse(&parser, &tree), Ok(Some(0.25)));
}

#[test]
fn missing_identifier_is_a_configuration_error() {
    let tree = tree::group::<Id>(vec![], vec![tree::text(vec![identifier(Id::Name)])]);
    let parser = parser::field(Id::Age, parser::int());
    assert_eq!(
        parse(&parser, &tree),
        Err(vec![Error::InvalidLookup(Id::Age, LookupError::NotFound)])
    );
}

#[test]
fn duplicated_identifier_is_ambiguous_not_first_match() {
    let tree = tree::group(
        vec![],
        vec![
            tree::text(vec![identifier(Id::Name), value(Value::Str("first".into()))]),
            tree::text(vec![identifier(Id::Name), value(Value::Str("second".into()))]),
        ],
    );
    let parser = parser::field(Id::Name, parser::string());
    assert_eq!(
        parse(&parser, &tree),
        Err(vec![Error::InvalidLookup(Id::Name, LookupError::Ambiguous)])
    );
}

#[test]
fn list_parses_every_instance_and_isolates_failures() {
    let instances = vec![
        tree::int(vec![identifier(Id::Item), value(Value::Int(1))]),
        tree::int(vec![identifier(Id::Item), value(Value::Str("broken".into()))]),
        tree::int(vec![identifier(Id::Item), value(Value::Int(3))]),
    ];
    let tree = tree::group(
        vec![],
        vec![tree::repeatable(
            vec![identifier(Id::Items)],
            tree::int(vec![identifier(Id::Item)]),
            instances,
        )],
    );
    let parser = parser::field(Id::Items, parser::list(parser::int()));
    // Only the middle instance's error surfaces; siblings are unaffected.
    assert_eq!(
        parse(&parser, &tree),
        Err(vec![Error::TypeMismatch(Id::Item, LeafKind::Int)])
    );
}

#[test]
fn list_returns_all_values_in_index_order() {
    let instances = vec![
        tree::int(vec![identifier(Id::Item), value(Value::Int(10))]),
        tree::int(vec![identifier(Id::Item), value(Value::Int(20))]),
    ];
    let tree = tree::group(
        vec![],
        vec![tree::repeatable(
            vec![identifier(Id::Items)],
            tree::int(vec![identifier(Id::Item)]),
            instances,
        )],
    );
    let parser = parser::field(Id::Items, parser::list(parser::int()));
    assert_eq!(parse(&parser, &tree), Ok(vec![10, 20]));
}

#[test]
fn int_respects_bound_attributes() {
    use formlet::form::attributes::{max, min, Bound};
    let tree = tree::group(
        vec![],
        vec![tree::int(vec![
            identifier(Id::Age),
            min(0),
            max(130),
            value(Value::Int(200)),
        ])],
    );
    let parser = parser::field(Id::Age, parser::int());
    assert_eq!(
        parse(&parser, &tree),
        Err(vec![Error::OutOfRange(Id::Age, Bound::Max(130))])
    );
}

#[test]
fn email_is_regex_validated() {
    let form = |v: Value| tree::group(vec![], vec![tree::email(vec![identifier(Id::Name), value(v)])]);
    let parser = parser::field(Id::Name, parser::email());

    assert_eq!(
        parse(&parser, &form(Value::Str("ada@lovelace.dev".into()))),
        Ok("ada@lovelace.dev".to_string())
    );
    let errors = parse(&parser, &form(Value::Str("not-an-email".into()))).unwrap_err();
    assert!(matches!(errors[0], Error::PatternMismatch(Id::Name, _)));
    // Optional and empty passes through.
    assert_eq!(parse(&parser, &form(Value::Null)), Ok(String::new()));
}

#[test]
fn datetime_accepts_iso_renderings_only() {
    let form = |v: Value| tree::group(vec![], vec![tree::datetime(vec![identifier(Id::Name), value(v)])]);
    let parser = parser::field(Id::Name, parser::datetime());

    let parsed = parse(&parser, &form(Value::Str("2026-08-07T09:30".into()))).unwrap();
    assert_eq!(parsed.format("%Y-%m-%d %H:%M").to_string(), "2026-08-07 09:30");
    assert_eq!(
        parse(&parser, &form(Value::Str("yesterday".into()))),
        Err(vec![Error::TypeMismatch(Id::Name, LeafKind::DateTime)])
    );
}

#[test]
fn boolean_reads_untouched_as_false() {
    let form = |v: Value| tree::group(vec![], vec![tree::boolean(vec![identifier(Id::Name), value(v)])]);
    let parser = parser::field(Id::Name, parser::boolean());

    assert_eq!(parse(&parser, &form(Value::Null)), Ok(false));
    assert_eq!(parse(&parser, &form(Value::Bool(true))), Ok(true));
    assert_eq!(parse(&parser, &form(Value::Str("true".into()))), Ok(true));
    assert_eq!(
        parse(&parser, &form(Value::Int(1))),
        Err(vec![Error::TypeMismatch(Id::Name, LeafKind::Boolean)])
    );
}

#[test]
fn json_projection_honors_required() {
    use formlet::form::attributes::name;
    let tree = tree::group(
        vec![],
        vec![
            tree::text(vec![
                identifier(Id::Name),
                name("name"),
                required(),
                value(Value::Str("Ada".into())),
            ]),
            tree::int(vec![identifier(Id::Age), name("age"), required()]),
        ],
    );
    let parser = parser::json::<Id>();
    assert_eq!(
        parse(&parser, &tree),
        Err(vec![Error::RequiredMissing(Id::Age)])
    );

    let filled = tree
        .update_with_id(&Id::Age, |field| match field {
            Field::Leaf(mut l) => {
                l.value = Value::Int(36);
                Field::Leaf(l)
            }
            other => other,
        })
        .unwrap();
    let json = parse(&parser, &filled).unwrap();
    assert_eq!(json, serde_json::json!({ "name": "Ada", "age": 36 }));
}
