//! Numeric axiom analysis: constant folding, layering, equivalence merging
//!
//! Given the numeric axioms of a task, this module determines which of
//! them are compile-time constants (rewriting those in place), assigns
//! every remaining axiom a stratification layer consistent with
//! topological order over the dependency DAG, and merges structurally
//! equivalent axioms within a layer into shared representatives. The
//! result is the layered evaluation plan the search engine uses to compute
//! derived values bottom-up.

mod folding;
mod layering;

use crate::pddl::axioms::{AxiomArena, AxiomId};
use crate::pddl::f_expression::PrimitiveNumericExpression;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Layer assigned to constants and to references that no axiom defines
pub const CONSTANT_OR_NO_AXIOM: i32 = -1;

/// Error during axiom analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxiomError {
    /// An axiom has no parts.
    EmptyAxiom { effect: PrimitiveNumericExpression },
    /// Two axioms define the same effect.
    DuplicateEffect { effect: PrimitiveNumericExpression },
    /// The dependency graph contains a cycle through this effect.
    CyclicDependency { effect: PrimitiveNumericExpression },
    /// An axiom's operator does not fit its operand count.
    MalformedAxiom {
        effect: PrimitiveNumericExpression,
        reason: String,
    },
}

impl fmt::Display for AxiomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxiomError::EmptyAxiom { effect } => {
                write!(f, "axiom for {} has no parts", effect)
            }
            AxiomError::DuplicateEffect { effect } => {
                write!(f, "effect {} is defined by more than one axiom", effect)
            }
            AxiomError::CyclicDependency { effect } => {
                write!(f, "axiom dependency cycle through {}", effect)
            }
            AxiomError::MalformedAxiom { effect, reason } => {
                write!(f, "malformed axiom for {}: {}", effect, reason)
            }
        }
    }
}

impl Error for AxiomError {}

/// The result of analyzing a set of numeric axioms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxiomAnalysis {
    /// Partition of the axioms by layer; constant axioms sit in the
    /// [`CONSTANT_OR_NO_AXIOM`] bucket.
    pub axioms_by_layer: IndexMap<i32, Vec<AxiomId>>,
    /// The highest assigned layer.
    pub max_layer: i32,
    /// Effect of a merged axiom -> the representative axiom it equals.
    pub equivalence: HashMap<PrimitiveNumericExpression, AxiomId>,
    /// Axioms proven constant, in input order.
    pub constant_axioms: IndexSet<AxiomId>,
}

/// Analyze a set of numeric axioms.
///
/// Validates the input (non-empty parts, unique effects), folds constant
/// axioms in place in the arena, computes the layer partition, and merges
/// structurally equivalent axioms layer by layer.
pub fn handle_axioms(
    arena: &mut AxiomArena,
    axioms: &[AxiomId],
) -> Result<AxiomAnalysis, AxiomError> {
    let axiom_by_effect = axiom_by_effect(arena, axioms)?;
    let constant_axioms = folding::identify_constants(arena, axioms, &axiom_by_effect)?;
    let (axioms_by_layer, max_layer) =
        layering::compute_layers(arena, axioms, &constant_axioms, &axiom_by_effect)?;
    let equivalence = layering::identify_equivalent_axioms(arena, &axioms_by_layer);
    Ok(AxiomAnalysis {
        axioms_by_layer,
        max_layer,
        equivalence,
        constant_axioms,
    })
}

/// Index the axioms by their effect, validating the input up front.
fn axiom_by_effect(
    arena: &AxiomArena,
    axioms: &[AxiomId],
) -> Result<HashMap<PrimitiveNumericExpression, AxiomId>, AxiomError> {
    let mut by_effect = HashMap::with_capacity(axioms.len());
    for &id in axioms {
        let axiom = arena.get(id);
        if axiom.parts.is_empty() {
            return Err(AxiomError::EmptyAxiom {
                effect: axiom.effect.clone(),
            });
        }
        if by_effect.insert(axiom.effect.clone(), id).is_some() {
            return Err(AxiomError::DuplicateEffect {
                effect: axiom.effect.clone(),
            });
        }
    }
    Ok(by_effect)
}
