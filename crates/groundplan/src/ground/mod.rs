//! Grounding: instantiating conditions against known facts
//!
//! Grounding substitutes concrete objects for a condition's variables and
//! resolves it against two fact sets: the init facts (unconditionally true
//! in the initial state and never changed) and the fluent facts (whose
//! truth depends on runtime state). The result is a sequence of ground
//! literals and comparisons, or a definitive `Impossible` signal meaning
//! the candidate substitution can never be satisfied.
//!
//! `Impossible` is an expected, frequent outcome: the caller simply
//! discards the candidate. It propagates as an `Err` through nested
//! conjunctions and existentials, so a single contradicted literal aborts
//! the whole candidate without accumulating partial results.

use crate::pddl::conditions::{Comparison, Condition, ConditionKind, Literal};
use crate::pddl::f_expression::{
    FunctionAssignment, NumericConstant, NumericExpression, PrimitiveNumericExpression,
};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt;

/// Error during grounding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroundError {
    /// The substitution contradicts the known facts; the candidate is
    /// infeasible. Recoverable: callers discard the candidate.
    Impossible,
    /// A non-fluent numeric function has no value in the initial state.
    UndefinedFunction { pne: PrimitiveNumericExpression },
    /// Instantiation reached a variant that normalization should have
    /// removed (disjunction, universal quantifier, unnormalized nesting).
    NotNormalized { condition: String },
}

impl fmt::Display for GroundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroundError::Impossible => write!(f, "grounding is impossible for this candidate"),
            GroundError::UndefinedFunction { pne } => {
                write!(f, "no initial value for non-fluent function {}", pne)
            }
            GroundError::NotNormalized { condition } => {
                write!(f, "cannot instantiate condition (not normalized): {}", condition)
            }
        }
    }
}

impl Error for GroundError {}

/// The numeric side of the known facts: which ground functions are fluent
/// (their value is runtime state) and the initial values of the rest.
#[derive(Debug, Clone, Default)]
pub struct NumericContext {
    pub fluent_functions: HashSet<PrimitiveNumericExpression>,
    pub init_values: HashMap<PrimitiveNumericExpression, f64>,
}

impl NumericContext {
    /// Create an empty numeric context
    pub fn new() -> Self {
        NumericContext::default()
    }
}

/// Instantiate a normalized condition under a variable substitution.
///
/// Ground literals and comparisons are appended to `result`. Positive
/// literals already known true are dropped; literals contradicting the
/// init facts make the whole candidate [`GroundError::Impossible`].
/// The condition must be simplified first: conjunctions assert an empty
/// accumulation buffer on entry.
pub fn instantiate(
    condition: &Condition,
    var_mapping: &HashMap<String, String>,
    init_facts: &HashSet<Literal>,
    fluent_facts: &HashSet<Literal>,
    numeric: &NumericContext,
    result: &mut Vec<Condition>,
) -> Result<(), GroundError> {
    match condition.kind() {
        ConditionKind::Truth => Ok(()),
        ConditionKind::Falsity => Err(GroundError::Impossible),
        ConditionKind::Literal(lit) => {
            instantiate_literal(lit, var_mapping, init_facts, fluent_facts, result)
        }
        ConditionKind::Conjunction(parts) => {
            debug_assert!(result.is_empty(), "condition not simplified");
            for part in parts {
                instantiate(part, var_mapping, init_facts, fluent_facts, numeric, result)?;
            }
            Ok(())
        }
        ConditionKind::Existential(q) => {
            debug_assert!(result.is_empty(), "existential condition not simplified");
            instantiate(&q.part, var_mapping, init_facts, fluent_facts, numeric, result)
        }
        ConditionKind::Comparison(c) => {
            let left = c.parts.0.instantiate(var_mapping, numeric)?;
            let right = c.parts.1.instantiate(var_mapping, numeric)?;
            let ground = Comparison {
                comparator: c.comparator,
                parts: (left, right),
                negated: c.negated,
            };
            // Truth of the comparison is deferred to runtime.
            result.push(if ground.negated {
                Condition::negated_comparison(ground.comparator, ground.parts.0, ground.parts.1)
            } else {
                Condition::comparison(ground.comparator, ground.parts.0, ground.parts.1)
            });
            Ok(())
        }
        ConditionKind::Disjunction(_) | ConditionKind::Universal(_) => {
            Err(GroundError::NotNormalized {
                condition: condition.to_string(),
            })
        }
    }
}

fn instantiate_literal(
    literal: &Literal,
    var_mapping: &HashMap<String, String>,
    init_facts: &HashSet<Literal>,
    fluent_facts: &HashSet<Literal>,
    result: &mut Vec<Condition>,
) -> Result<(), GroundError> {
    let args: Vec<String> = literal
        .args
        .iter()
        .map(|arg| var_mapping.get(arg).cloned().unwrap_or_else(|| arg.clone()))
        .collect();
    let atom = Literal::atom(literal.predicate.clone(), args);

    if !literal.negated {
        if fluent_facts.contains(&atom) {
            result.push(Condition::literal(atom));
            Ok(())
        } else if init_facts.contains(&atom) {
            // Unconditionally true: drop.
            Ok(())
        } else {
            Err(GroundError::Impossible)
        }
    } else if fluent_facts.contains(&atom) {
        result.push(Condition::literal(atom.negate()));
        Ok(())
    } else if init_facts.contains(&atom) {
        Err(GroundError::Impossible)
    } else {
        // Unconditionally false positive form: the negation holds, drop.
        Ok(())
    }
}

impl NumericExpression {
    /// Ground this expression: substitute variables, keep fluent function
    /// references symbolic, and fold non-fluent references to their initial
    /// value.
    pub fn instantiate(
        &self,
        var_mapping: &HashMap<String, String>,
        numeric: &NumericContext,
    ) -> Result<NumericExpression, GroundError> {
        match self {
            NumericExpression::Constant(_) => Ok(self.clone()),
            NumericExpression::Primitive(pne) => {
                let ground = pne.rename_variables(var_mapping);
                if numeric.fluent_functions.contains(&ground) {
                    Ok(NumericExpression::Primitive(ground))
                } else if let Some(&value) = numeric.init_values.get(&ground) {
                    Ok(NumericExpression::Constant(NumericConstant::new(value)))
                } else {
                    Err(GroundError::UndefinedFunction { pne: ground })
                }
            }
            NumericExpression::Arithmetic { op, parts } => {
                let parts = parts
                    .iter()
                    .map(|part| part.instantiate(var_mapping, numeric))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(NumericExpression::Arithmetic { op: *op, parts })
            }
        }
    }
}

impl FunctionAssignment {
    /// Ground this assignment. The target must be a fluent function.
    pub fn instantiate(
        &self,
        var_mapping: &HashMap<String, String>,
        numeric: &NumericContext,
    ) -> Result<FunctionAssignment, GroundError> {
        let target = self.target.rename_variables(var_mapping);
        if !numeric.fluent_functions.contains(&target) {
            return Err(GroundError::UndefinedFunction { pne: target });
        }
        let value = self.value.instantiate(var_mapping, numeric)?;
        Ok(FunctionAssignment::new(self.kind, target, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pddl::conditions::Comparator;
    use crate::pddl::f_expression::ArithmeticOp;
    use crate::pddl::types::TypedObject;
    use crate::pddl::AssignmentKind;

    fn lit(pred: &str, args: &[&str]) -> Literal {
        Literal::atom(pred, args.iter().map(|a| a.to_string()).collect())
    }

    fn mapping(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_fluent_atom_is_kept() {
        let fluent_facts: HashSet<Literal> = [lit("on", &["a", "b"])].into_iter().collect();
        let init_facts = HashSet::new();
        let mut result = Vec::new();

        instantiate(
            &Condition::literal(lit("on", &["?x", "b"])),
            &mapping(&[("?x", "a")]),
            &init_facts,
            &fluent_facts,
            &NumericContext::new(),
            &mut result,
        )
        .unwrap();

        assert_eq!(result, vec![Condition::literal(lit("on", &["a", "b"]))]);
    }

    #[test]
    fn test_init_atom_is_dropped() {
        let init_facts: HashSet<Literal> = [lit("block", &["a"])].into_iter().collect();
        let fluent_facts = HashSet::new();
        let mut result = Vec::new();

        instantiate(
            &Condition::literal(lit("block", &["?x"])),
            &mapping(&[("?x", "a")]),
            &init_facts,
            &fluent_facts,
            &NumericContext::new(),
            &mut result,
        )
        .unwrap();

        assert!(result.is_empty());
    }

    #[test]
    fn test_unknown_atom_is_impossible() {
        let mut result = Vec::new();
        let err = instantiate(
            &Condition::literal(lit("on", &["?x", "b"])),
            &mapping(&[("?x", "a")]),
            &HashSet::new(),
            &HashSet::new(),
            &NumericContext::new(),
            &mut result,
        )
        .unwrap_err();
        assert_eq!(err, GroundError::Impossible);
        assert!(result.is_empty());
    }

    #[test]
    fn test_negated_literal_cases() {
        let init_facts: HashSet<Literal> = [lit("block", &["a"])].into_iter().collect();
        let fluent_facts: HashSet<Literal> = [lit("clear", &["a"])].into_iter().collect();
        let numeric = NumericContext::new();

        // Negated fluent atom is kept negated.
        let mut result = Vec::new();
        instantiate(
            &Condition::literal(lit("clear", &["a"]).negate()),
            &HashMap::new(),
            &init_facts,
            &fluent_facts,
            &numeric,
            &mut result,
        )
        .unwrap();
        assert_eq!(
            result,
            vec![Condition::literal(lit("clear", &["a"]).negate())]
        );

        // Negated atom whose positive form is an init fact is impossible.
        let mut result = Vec::new();
        let err = instantiate(
            &Condition::literal(lit("block", &["a"]).negate()),
            &HashMap::new(),
            &init_facts,
            &fluent_facts,
            &numeric,
            &mut result,
        )
        .unwrap_err();
        assert_eq!(err, GroundError::Impossible);

        // Negated atom unknown everywhere: trivially true, dropped.
        let mut result = Vec::new();
        instantiate(
            &Condition::literal(lit("on", &["a", "b"]).negate()),
            &HashMap::new(),
            &init_facts,
            &fluent_facts,
            &numeric,
            &mut result,
        )
        .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_conjunction_aborts_without_partial_results() {
        let fluent_facts: HashSet<Literal> = [lit("on", &["a", "b"])].into_iter().collect();
        let cond = Condition::conjunction(vec![
            Condition::literal(lit("on", &["a", "b"])),
            Condition::literal(lit("on", &["b", "c"])),
        ]);

        let mut result = Vec::new();
        let err = instantiate(
            &cond,
            &HashMap::new(),
            &HashSet::new(),
            &fluent_facts,
            &NumericContext::new(),
            &mut result,
        )
        .unwrap_err();
        assert_eq!(err, GroundError::Impossible);
    }

    #[test]
    fn test_conjunction_collects_all_parts() {
        let fluent_facts: HashSet<Literal> =
            [lit("on", &["a", "b"]), lit("clear", &["c"])].into_iter().collect();
        let init_facts: HashSet<Literal> = [lit("block", &["a"])].into_iter().collect();
        let cond = Condition::conjunction(vec![
            Condition::literal(lit("block", &["?x"])),
            Condition::literal(lit("on", &["?x", "b"])),
            Condition::literal(lit("clear", &["c"])),
        ]);

        let mut result = Vec::new();
        instantiate(
            &cond,
            &mapping(&[("?x", "a")]),
            &init_facts,
            &fluent_facts,
            &NumericContext::new(),
            &mut result,
        )
        .unwrap();
        assert_eq!(
            result,
            vec![
                Condition::literal(lit("on", &["a", "b"])),
                Condition::literal(lit("clear", &["c"])),
            ]
        );
    }

    #[test]
    fn test_existential_instantiates_part() {
        let fluent_facts: HashSet<Literal> = [lit("on", &["a", "b"])].into_iter().collect();
        // Already existentially expanded: the parameter is bound by the mapping.
        let cond = Condition::existential(
            vec![TypedObject::new("?x", "block")],
            Condition::literal(lit("on", &["?x", "b"])),
        );

        let mut result = Vec::new();
        instantiate(
            &cond,
            &mapping(&[("?x", "a")]),
            &HashSet::new(),
            &fluent_facts,
            &NumericContext::new(),
            &mut result,
        )
        .unwrap();
        assert_eq!(result, vec![Condition::literal(lit("on", &["a", "b"]))]);
    }

    #[test]
    fn test_comparison_grounds_numeric_parts() {
        let mut numeric = NumericContext::new();
        let fuel_a = PrimitiveNumericExpression::new("fuel", vec!["a".to_string()]);
        numeric.fluent_functions.insert(fuel_a.clone());
        numeric
            .init_values
            .insert(PrimitiveNumericExpression::new("capacity", vec![]), 10.0);

        let cond = Condition::comparison(
            Comparator::Lt,
            NumericExpression::primitive("fuel", vec!["?x".to_string()]),
            NumericExpression::primitive("capacity", vec![]),
        );

        let mut result = Vec::new();
        instantiate(
            &cond,
            &mapping(&[("?x", "a")]),
            &HashSet::new(),
            &HashSet::new(),
            &numeric,
            &mut result,
        )
        .unwrap();

        assert_eq!(
            result,
            vec![Condition::comparison(
                Comparator::Lt,
                NumericExpression::Primitive(fuel_a),
                NumericExpression::constant(10.0),
            )]
        );
    }

    #[test]
    fn test_undefined_function_is_fatal() {
        let cond = Condition::comparison(
            Comparator::Gt,
            NumericExpression::primitive("weight", vec!["a".to_string()]),
            NumericExpression::constant(0.0),
        );

        let mut result = Vec::new();
        let err = instantiate(
            &cond,
            &HashMap::new(),
            &HashSet::new(),
            &HashSet::new(),
            &NumericContext::new(),
            &mut result,
        )
        .unwrap_err();
        match err {
            GroundError::UndefinedFunction { pne } => assert_eq!(pne.symbol, "weight"),
            other => panic!("expected UndefinedFunction, got {:?}", other),
        }
    }

    #[test]
    fn test_unnormalized_condition_is_rejected() {
        let cond = Condition::disjunction(vec![Condition::literal(lit("p", &[]))]);
        let mut result = Vec::new();
        let err = instantiate(
            &cond,
            &HashMap::new(),
            &HashSet::new(),
            &HashSet::new(),
            &NumericContext::new(),
            &mut result,
        )
        .unwrap_err();
        assert!(matches!(err, GroundError::NotNormalized { .. }));
    }

    #[test]
    fn test_arithmetic_expression_grounds_recursively() {
        let mut numeric = NumericContext::new();
        numeric
            .init_values
            .insert(PrimitiveNumericExpression::new("base", vec![]), 4.0);
        let fluent = PrimitiveNumericExpression::new("load", vec!["t1".to_string()]);
        numeric.fluent_functions.insert(fluent.clone());

        let expr = NumericExpression::sum(vec![
            NumericExpression::primitive("base", vec![]),
            NumericExpression::primitive("load", vec!["?t".to_string()]),
        ]);
        let ground = expr
            .instantiate(&mapping(&[("?t", "t1")]), &numeric)
            .unwrap();

        assert_eq!(
            ground,
            NumericExpression::Arithmetic {
                op: ArithmeticOp::Sum,
                parts: vec![
                    NumericExpression::constant(4.0),
                    NumericExpression::Primitive(fluent),
                ],
            }
        );
    }

    #[test]
    fn test_function_assignment_grounding() {
        let mut numeric = NumericContext::new();
        let fuel = PrimitiveNumericExpression::new("fuel", vec!["t1".to_string()]);
        numeric.fluent_functions.insert(fuel.clone());
        numeric
            .init_values
            .insert(PrimitiveNumericExpression::new("rate", vec![]), 2.0);

        let assignment = FunctionAssignment::new(
            AssignmentKind::Increase,
            PrimitiveNumericExpression::new("fuel", vec!["?t".to_string()]),
            NumericExpression::primitive("rate", vec![]),
        );
        let ground = assignment
            .instantiate(&mapping(&[("?t", "t1")]), &numeric)
            .unwrap();

        assert_eq!(ground.target, fuel);
        assert_eq!(ground.value, NumericExpression::constant(2.0));

        // Non-fluent target is rejected.
        let bad = FunctionAssignment::new(
            AssignmentKind::Assign,
            PrimitiveNumericExpression::new("rate", vec![]),
            NumericExpression::constant(1.0),
        );
        assert!(matches!(
            bad.instantiate(&HashMap::new(), &numeric),
            Err(GroundError::UndefinedFunction { .. })
        ));
    }
}
