//! Constant detection and in-place folding over the axiom DAG

use super::AxiomError;
use crate::pddl::axioms::{AxiomArena, AxiomId, AxiomKind, AxiomPart};
use crate::pddl::f_expression::{ArithmeticOp, NumericConstant, PrimitiveNumericExpression};
use indexmap::IndexSet;
use std::collections::{HashMap, HashSet};

/// Fold every axiom that reduces to a compile-time constant, rewriting it
/// in place, and return the set of constant axioms in input order.
pub(super) fn identify_constants(
    arena: &mut AxiomArena,
    axioms: &[AxiomId],
    axiom_by_effect: &HashMap<PrimitiveNumericExpression, AxiomId>,
) -> Result<IndexSet<AxiomId>, AxiomError> {
    let mut folder = ConstantFolder {
        arena,
        axiom_by_effect,
        memo: HashMap::new(),
        in_progress: HashSet::new(),
    };
    let mut constant_axioms = IndexSet::new();
    for &id in axioms {
        if folder.fold_axiom(id)?.is_some() {
            constant_axioms.insert(id);
        }
    }
    Ok(constant_axioms)
}

/// Recursive constant evaluator over the shared axiom DAG.
///
/// Results are memoized per axiom so shared sub-DAGs are visited once per
/// pass, and the in-progress set turns a dependency cycle into an error
/// instead of unbounded recursion.
struct ConstantFolder<'a> {
    arena: &'a mut AxiomArena,
    axiom_by_effect: &'a HashMap<PrimitiveNumericExpression, AxiomId>,
    memo: HashMap<AxiomId, Option<f64>>,
    in_progress: HashSet<AxiomId>,
}

impl<'a> ConstantFolder<'a> {
    /// Returns `Some(value)` if the axiom is constant (folding it in
    /// place), `None` if it depends on a fluent read.
    fn fold_axiom(&mut self, id: AxiomId) -> Result<Option<f64>, AxiomError> {
        if let Some(&value) = self.memo.get(&id) {
            return Ok(value);
        }
        if !self.in_progress.insert(id) {
            return Err(AxiomError::CyclicDependency {
                effect: self.arena.get(id).effect.clone(),
            });
        }
        let value = self.fold_axiom_inner(id)?;
        self.in_progress.remove(&id);
        self.memo.insert(id, value);
        Ok(value)
    }

    fn fold_axiom_inner(&mut self, id: AxiomId) -> Result<Option<f64>, AxiomError> {
        let (op, parts) = {
            let axiom = self.arena.get(id);
            (axiom.op, axiom.parts.clone())
        };

        // Already a bare constant: nothing to rewrite.
        if op.is_none() {
            if let [AxiomPart::Constant(c)] = parts.as_slice() {
                return Ok(Some(c.value));
            }
        }

        let mut values = Vec::with_capacity(parts.len());
        for part in &parts {
            match self.fold_part(part)? {
                Some(value) => values.push(value),
                // One fluent read makes the whole axiom non-constant;
                // leave it unmodified.
                None => return Ok(None),
            }
        }

        let value = fold_values(op, &values, || self.arena.get(id).effect.clone())?;

        let axiom = self.arena.get_mut(id);
        axiom.parts = vec![AxiomPart::Constant(NumericConstant::new(value))];
        axiom.op = None;
        axiom.kind = AxiomKind::Constant;
        Ok(Some(value))
    }

    fn fold_part(&mut self, part: &AxiomPart) -> Result<Option<f64>, AxiomError> {
        match part {
            AxiomPart::Constant(c) => Ok(Some(c.value)),
            AxiomPart::Pne(pne) => match self.axiom_by_effect.get(pne) {
                Some(&dep) => self.fold_axiom(dep),
                // No defining axiom: a fluent read, never constant.
                None => Ok(None),
            },
        }
    }
}

/// Evaluate an operator over collected operand values: unary minus
/// negates, n-ary operators fold left (matching left-associative
/// arithmetic).
fn fold_values(
    op: Option<ArithmeticOp>,
    values: &[f64],
    effect: impl Fn() -> PrimitiveNumericExpression,
) -> Result<f64, AxiomError> {
    match (op, values) {
        (_, []) => Err(AxiomError::EmptyAxiom { effect: effect() }),
        (None, [value]) => Ok(*value),
        (Some(ArithmeticOp::Difference) | Some(ArithmeticOp::AdditiveInverse), [value]) => {
            Ok(-value)
        }
        (Some(op), [_]) => Err(AxiomError::MalformedAxiom {
            effect: effect(),
            reason: format!("operator {} applied to a single operand", op),
        }),
        (None, _) => Err(AxiomError::MalformedAxiom {
            effect: effect(),
            reason: "multiple operands without an operator".to_string(),
        }),
        (Some(op), [first, rest @ ..]) => {
            let mut acc = *first;
            for value in rest {
                acc = op.apply(acc, *value).ok_or_else(|| AxiomError::MalformedAxiom {
                    effect: effect(),
                    reason: format!("operator {} is not n-ary", op),
                })?;
            }
            Ok(acc)
        }
    }
}
