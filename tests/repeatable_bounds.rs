//! Repeatable groups hold their instance-count bounds under any sequence
//! of add/remove operations; out-of-bounds operations are clamped no-ops.

use formlet::form::attributes::{identifier, max, min, value};
use formlet::form::protocol::{parse_update, InputEvent};
use formlet::form::tree::{self, Field, Repeatable};
use formlet::form::value::Value;
use formlet::form::parser;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Id {
    Items,
    Item,
}

#[derive(Debug, Clone)]
enum Op {
    Add,
    Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Add), (0usize..6).prop_map(Op::Remove)]
}

fn bounded_repeatable(lo: usize, hi: usize, start: usize) -> Repeatable<Id> {
    let instances = (0..start)
        .map(|_| tree::text(vec![identifier(Id::Item)]))
        .collect();
    let Field::Repeatable(r) = tree::repeatable(
        vec![min(lo as i64), max(hi as i64)],
        tree::text(vec![identifier(Id::Item)]),
        instances,
    ) else {
        unreachable!()
    };
    r
}

proptest! {
    #[test]
    fn any_op_sequence_keeps_count_within_bounds(
        lo in 0usize..3,
        span in 0usize..4,
        extra in 0usize..4,
        ops in prop::collection::vec(op_strategy(), 0..20),
    ) {
        let hi = lo + span;
        let start = lo + extra.min(span);
        let mut node = bounded_repeatable(lo, hi, start);
        prop_assert!(node.instances.len() >= lo && node.instances.len() <= hi);
        for op in ops {
            node = match op {
                Op::Add => node.push_instance(),
                Op::Remove(index) => node.remove_instance(index),
            };
            prop_assert!(node.instances.len() >= lo);
            prop_assert!(node.instances.len() <= hi);
        }
    }
}

#[test]
fn add_at_max_and_remove_at_min_are_no_ops() {
    let node = bounded_repeatable(1, 2, 2);
    let node = node.push_instance();
    assert_eq!(node.instances.len(), 2);
    let node = node.remove_instance(0);
    let node = node.remove_instance(0);
    assert_eq!(node.instances.len(), 1);
}

#[test]
fn indexed_identifiers_disambiguate_cloned_instances() {
    use formlet::form::ident::Indexed;

    // Template identifiers are index-qualified; each instance is
    // renumbered after cloning so direct addressing stays unambiguous.
    let template = tree::text(vec![identifier(Indexed::new(0, Id::Item))]);
    let Field::Repeatable(r) = tree::repeatable(
        vec![identifier(Indexed::new(0, Id::Items)), max(4)],
        template,
        Vec::new(),
    ) else {
        unreachable!()
    };
    let mut r = r.push_instance().push_instance();
    r.instances = r
        .instances
        .into_iter()
        .enumerate()
        .map(|(index, instance)| instance.reindexed(index))
        .collect();
    let tree = Field::Repeatable(r);

    let target = Indexed::new(1, Id::Item);
    let (path, node) = tree.find_by_id(&target).unwrap();
    assert_eq!(path, vec![1]);
    assert_eq!(node.attrs().identifier, Some(target));
    // Path addressing agrees with identifier lookup.
    assert_eq!(tree.get_at_path(&path), Some(node));

    let updated = tree
        .update_with_id(&target, |field| match field {
            Field::Leaf(mut l) => {
                l.value = Value::Str("second".into());
                Field::Leaf(l)
            }
            other => other,
        })
        .unwrap();
    let second = updated.get_at_path(&[1]).unwrap();
    assert_eq!(second.value(), Some(&Value::Str("second".into())));
    let first = updated.get_at_path(&[0]).unwrap();
    assert_eq!(first.value(), Some(&Value::Null));
}

#[test]
fn instance_events_flow_through_parse_update() {
    use formlet::form::attributes::{add_label, remove_label};
    let tree = tree::group(
        vec![],
        vec![tree::repeatable(
            vec![
                identifier(Id::Items),
                min(1),
                max(3),
                add_label("Add another"),
                remove_label("Remove"),
            ],
            tree::text(vec![identifier(Id::Item)]),
            vec![tree::text(vec![
                identifier(Id::Item),
                value(Value::Str("first".into())),
            ])],
        )],
    );
    let parser = parser::field(Id::Items, parser::list(parser::string()));

    let (tree, result) = parse_update(&parser, &InputEvent::InstanceAdded { id: Id::Items }, &tree);
    assert_eq!(result, Ok(vec!["first".to_string(), String::new()]));
    let items = tree.find_by_id(&Id::Items).unwrap().1;
    assert_eq!(items.as_repeatable().unwrap().instances.len(), 2);
    // Button copy survives instance churn.
    assert_eq!(items.attrs().add_label.as_deref(), Some("Add another"));
    assert_eq!(items.attrs().remove_label.as_deref(), Some("Remove"));

    // Removing below min is a clamped no-op, not an error.
    let (tree, result) = parse_update(
        &parser,
        &InputEvent::InstanceRemoved {
            id: Id::Items,
            index: 0,
        },
        &tree,
    );
    let (tree, _) = parse_update(
        &parser,
        &InputEvent::InstanceRemoved {
            id: Id::Items,
            index: 0,
        },
        &tree,
    );
    assert!(result.is_ok());
    assert_eq!(
        tree.find_by_id(&Id::Items)
            .unwrap()
            .1
            .as_repeatable()
            .unwrap()
            .instances
            .len(),
        1
    );
}
