//! Axiom stratification and structural-equivalence merging

use super::{AxiomError, CONSTANT_OR_NO_AXIOM};
use crate::pddl::axioms::{AxiomArena, AxiomId, AxiomPart};
use crate::pddl::f_expression::{ArithmeticOp, PrimitiveNumericExpression};
use indexmap::{IndexMap, IndexSet};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Assign every axiom a layer such that all its dependencies sit on
/// strictly smaller layers; constant axioms and unresolved references get
/// the [`CONSTANT_OR_NO_AXIOM`] sentinel. Returns the layer partition (in
/// input order within each bucket) and the maximum layer.
pub(super) fn compute_layers(
    arena: &AxiomArena,
    axioms: &[AxiomId],
    constant_axioms: &IndexSet<AxiomId>,
    axiom_by_effect: &HashMap<PrimitiveNumericExpression, AxiomId>,
) -> Result<(IndexMap<i32, Vec<AxiomId>>, i32), AxiomError> {
    let mut computer = LayerComputer {
        arena,
        constant_axioms,
        axiom_by_effect,
        layers: HashMap::new(),
        in_progress: HashSet::new(),
    };

    let mut max_layer = CONSTANT_OR_NO_AXIOM;
    for &id in axioms {
        max_layer = max_layer.max(computer.layer_of(id)?);
    }

    let mut axioms_by_layer: IndexMap<i32, Vec<AxiomId>> = IndexMap::new();
    for &id in axioms {
        let layer = computer.layers[&id];
        axioms_by_layer.entry(layer).or_default().push(id);
    }
    Ok((axioms_by_layer, max_layer))
}

struct LayerComputer<'a> {
    arena: &'a AxiomArena,
    constant_axioms: &'a IndexSet<AxiomId>,
    axiom_by_effect: &'a HashMap<PrimitiveNumericExpression, AxiomId>,
    layers: HashMap<AxiomId, i32>,
    in_progress: HashSet<AxiomId>,
}

impl<'a> LayerComputer<'a> {
    fn layer_of(&mut self, id: AxiomId) -> Result<i32, AxiomError> {
        if let Some(&layer) = self.layers.get(&id) {
            return Ok(layer);
        }
        if self.constant_axioms.contains(&id) {
            self.layers.insert(id, CONSTANT_OR_NO_AXIOM);
            return Ok(CONSTANT_OR_NO_AXIOM);
        }
        if !self.in_progress.insert(id) {
            return Err(AxiomError::CyclicDependency {
                effect: self.arena.get(id).effect.clone(),
            });
        }

        let mut layer = 0;
        for part in &self.arena.get(id).parts {
            let dep_layer = match part {
                AxiomPart::Constant(_) => CONSTANT_OR_NO_AXIOM,
                AxiomPart::Pne(pne) => match self.axiom_by_effect.get(pne) {
                    Some(&dep) => self.layer_of(dep)?,
                    None => CONSTANT_OR_NO_AXIOM,
                },
            };
            layer = layer.max(dep_layer + 1);
        }

        self.in_progress.remove(&id);
        self.layers.insert(id, layer);
        Ok(layer)
    }
}

/// Merge structurally equivalent axioms, layer by layer from the lowest.
///
/// Within a layer each axiom's operand sequence is canonicalized through
/// the merges recorded so far (operands always sit on strictly lower
/// layers); axioms agreeing on (operator, canonical operands) collapse
/// onto the first-seen representative.
pub(super) fn identify_equivalent_axioms(
    arena: &AxiomArena,
    axioms_by_layer: &IndexMap<i32, Vec<AxiomId>>,
) -> HashMap<PrimitiveNumericExpression, AxiomId> {
    let mut equivalence: HashMap<PrimitiveNumericExpression, AxiomId> = HashMap::new();

    let mut layers: Vec<i32> = axioms_by_layer.keys().copied().collect();
    layers.sort_unstable();

    for layer in layers {
        let mut key_to_unique: HashMap<(Option<ArithmeticOp>, Vec<AxiomPart>), AxiomId> =
            HashMap::new();
        for &id in &axioms_by_layer[&layer] {
            let axiom = arena.get(id);
            let canonical_parts: Vec<AxiomPart> = axiom
                .parts
                .iter()
                .map(|part| match part {
                    AxiomPart::Pne(pne) => match equivalence.get(pne) {
                        Some(&representative) => {
                            AxiomPart::Pne(arena.get(representative).effect.clone())
                        }
                        None => part.clone(),
                    },
                    AxiomPart::Constant(_) => part.clone(),
                })
                .collect();

            match key_to_unique.entry((axiom.op, canonical_parts)) {
                Entry::Occupied(entry) => {
                    // An equivalent axiom was already seen in this layer.
                    equivalence.insert(axiom.effect.clone(), *entry.get());
                }
                Entry::Vacant(entry) => {
                    entry.insert(id);
                }
            }
        }
    }
    equivalence
}
