//! Property-based tests for the condition algebra

use super::conditions::{Comparator, Condition, ConditionKind, Literal};
use super::f_expression::NumericExpression;
use super::types::TypedObject;
use proptest::prelude::*;
use std::collections::HashMap;

fn arb_literal() -> impl Strategy<Value = Literal> {
    (
        prop::sample::select(vec!["on", "clear", "at", "holding"]),
        prop::collection::vec(prop::sample::select(vec!["a", "b", "?x", "?y"]), 0..3),
        any::<bool>(),
    )
        .prop_map(|(predicate, args, negated)| Literal {
            predicate: predicate.to_string(),
            args: args.into_iter().map(str::to_string).collect(),
            negated,
        })
}

fn arb_comparison() -> impl Strategy<Value = Condition> {
    (
        prop::sample::select(vec![
            Comparator::Lt,
            Comparator::Le,
            Comparator::Eq,
            Comparator::Ge,
            Comparator::Gt,
        ]),
        prop::sample::select(vec!["fuel", "distance", "cost"]),
        -10.0..10.0f64,
    )
        .prop_map(|(comparator, symbol, value)| {
            Condition::comparison(
                comparator,
                NumericExpression::primitive(symbol, vec![]),
                NumericExpression::constant(value),
            )
        })
}

fn arb_condition() -> impl Strategy<Value = Condition> {
    let leaf = prop_oneof![
        Just(Condition::truth()),
        Just(Condition::falsity()),
        arb_literal().prop_map(Condition::literal),
        arb_comparison(),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Condition::conjunction),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Condition::disjunction),
            (prop::sample::select(vec!["?x", "?y", "?z"]), inner.clone()).prop_map(
                |(var, part)| Condition::universal(vec![TypedObject::new(var, "object")], part)
            ),
            (prop::sample::select(vec!["?x", "?y", "?z"]), inner).prop_map(|(var, part)| {
                Condition::existential(vec![TypedObject::new(var, "object")], part)
            }),
        ]
    })
}

/// True if any nested junctor, constant part, or singleton junctor
/// remains, i.e. the condition is not in simplified form.
fn has_redundancy(condition: &Condition) -> bool {
    match condition.kind() {
        ConditionKind::Conjunction(parts) => {
            parts.len() < 2
                || parts.iter().any(|p| {
                    matches!(
                        p.kind(),
                        ConditionKind::Conjunction(_) | ConditionKind::Truth | ConditionKind::Falsity
                    ) || has_redundancy(p)
                })
        }
        ConditionKind::Disjunction(parts) => {
            parts.len() < 2
                || parts.iter().any(|p| {
                    matches!(
                        p.kind(),
                        ConditionKind::Disjunction(_) | ConditionKind::Truth | ConditionKind::Falsity
                    ) || has_redundancy(p)
                })
        }
        ConditionKind::Universal(q) | ConditionKind::Existential(q) => {
            q.part.is_constant() || has_redundancy(&q.part)
        }
        _ => false,
    }
}

fn has_negative_part(condition: &Condition) -> bool {
    match condition.kind() {
        ConditionKind::Literal(lit) => lit.negated,
        ConditionKind::Comparison(_) => true,
        ConditionKind::Conjunction(parts) | ConditionKind::Disjunction(parts) => {
            parts.iter().any(has_negative_part)
        }
        ConditionKind::Universal(q) | ConditionKind::Existential(q) => has_negative_part(&q.part),
        _ => false,
    }
}

proptest! {
    #[test]
    fn prop_double_negation_is_identity(cond in arb_condition()) {
        prop_assert_eq!(cond.negate().negate(), cond);
    }

    #[test]
    fn prop_negation_changes_hash_of_literals(lit in arb_literal()) {
        let cond = Condition::literal(lit);
        prop_assert_ne!(cond.negate().content_hash(), cond.content_hash());
    }

    #[test]
    fn prop_simplified_is_idempotent(cond in arb_condition()) {
        let once = cond.simplified();
        prop_assert_eq!(once.simplified(), once);
    }

    #[test]
    fn prop_simplified_has_no_redundancy(cond in arb_condition()) {
        prop_assert!(!has_redundancy(&cond.simplified()));
    }

    #[test]
    fn prop_relaxed_removes_negative_parts(cond in arb_condition()) {
        prop_assert!(!has_negative_part(&cond.relaxed()));
    }

    #[test]
    fn prop_equal_conditions_hash_identically(cond in arb_condition()) {
        let twin = cond.clone();
        prop_assert_eq!(cond.content_hash(), twin.content_hash());
        prop_assert_eq!(cond, twin);
    }

    #[test]
    fn prop_uniquify_preserves_shape(cond in arb_condition()) {
        let mut type_map = HashMap::new();
        let renamed = cond.uniquify_variables(&mut type_map, &HashMap::new());
        prop_assert_eq!(
            std::mem::discriminant(renamed.kind()),
            std::mem::discriminant(cond.kind())
        );
        prop_assert_eq!(renamed.has_disjunction(), cond.has_disjunction());
        prop_assert_eq!(renamed.has_universal_part(), cond.has_universal_part());
        prop_assert_eq!(renamed.has_existential_part(), cond.has_existential_part());
    }
}
