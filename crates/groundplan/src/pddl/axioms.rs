//! Numeric axioms: rules computing one derived value from others
//!
//! Axioms are the one mutable part of the data model: the constant-folding
//! pass rewrites an axiom's operator, parts, and kind tag in place when the
//! axiom is proven to reduce to a single constant. To allow that aliased
//! mutation safely, axioms live in an arena and are addressed by stable
//! `AxiomId` handles; any map that refers to an axiom (such as the
//! effect-to-axiom index) stores the handle, never a copy.

use super::f_expression::{ArithmeticOp, NumericConstant, PrimitiveNumericExpression};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle to an axiom in an [`AxiomArena`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AxiomId(pub(crate) u32);

impl AxiomId {
    /// Get the raw ID value (for debugging/serialization)
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AxiomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// Whether an axiom still computes a derived value or has been folded to a
/// constant
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxiomKind {
    Derived,
    Constant,
}

/// An operand of a numeric axiom: either a literal constant or a reference
/// to another numeric function (which may itself be defined by an axiom)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxiomPart {
    Constant(NumericConstant),
    Pne(PrimitiveNumericExpression),
}

impl fmt::Display for AxiomPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxiomPart::Constant(c) => write!(f, "{}", c),
            AxiomPart::Pne(pne) => write!(f, "{}", pne),
        }
    }
}

/// A numeric axiom: `effect := op(parts...)`.
///
/// `op == None` means the axiom copies its single part. A single-part
/// `Difference` (or `AdditiveInverse`) is unary negation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericAxiom {
    pub effect: PrimitiveNumericExpression,
    pub op: Option<ArithmeticOp>,
    pub parts: Vec<AxiomPart>,
    pub kind: AxiomKind,
}

impl NumericAxiom {
    /// A derived axiom combining parts with an operator
    pub fn derived(
        effect: PrimitiveNumericExpression,
        op: Option<ArithmeticOp>,
        parts: Vec<AxiomPart>,
    ) -> Self {
        NumericAxiom {
            effect,
            op,
            parts,
            kind: AxiomKind::Derived,
        }
    }

    /// An axiom that is a constant from the start
    pub fn constant(effect: PrimitiveNumericExpression, value: f64) -> Self {
        NumericAxiom {
            effect,
            op: None,
            parts: vec![AxiomPart::Constant(NumericConstant::new(value))],
            kind: AxiomKind::Constant,
        }
    }
}

impl fmt::Display for NumericAxiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} := ", self.effect)?;
        match self.op {
            Some(op) if self.parts.len() == 1 => write!(f, "{}{}", op, self.parts[0]),
            Some(op) => {
                for (i, part) in self.parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", op)?;
                    }
                    write!(f, "{}", part)?;
                }
                Ok(())
            }
            None => write!(f, "{}", self.parts[0]),
        }
    }
}

/// Arena owning all numeric axioms of a task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AxiomArena {
    axioms: Vec<NumericAxiom>,
}

impl AxiomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        AxiomArena { axioms: Vec::new() }
    }

    /// Add an axiom, returning its handle
    pub fn alloc(&mut self, axiom: NumericAxiom) -> AxiomId {
        let id = AxiomId(self.axioms.len() as u32);
        self.axioms.push(axiom);
        id
    }

    /// Get the axiom behind a handle
    pub fn get(&self, id: AxiomId) -> &NumericAxiom {
        &self.axioms[id.0 as usize]
    }

    /// Get mutable access to the axiom behind a handle
    pub fn get_mut(&mut self, id: AxiomId) -> &mut NumericAxiom {
        &mut self.axioms[id.0 as usize]
    }

    /// All handles, in allocation order
    pub fn ids(&self) -> impl Iterator<Item = AxiomId> {
        (0..self.axioms.len() as u32).map(AxiomId)
    }

    /// Number of axioms in the arena
    pub fn len(&self) -> usize {
        self.axioms.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.axioms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pne(symbol: &str) -> PrimitiveNumericExpression {
        PrimitiveNumericExpression::new(symbol, vec![])
    }

    #[test]
    fn test_arena_alloc_and_get() {
        let mut arena = AxiomArena::new();
        let a = arena.alloc(NumericAxiom::constant(pne("f"), 3.0));
        let b = arena.alloc(NumericAxiom::derived(
            pne("g"),
            Some(ArithmeticOp::Sum),
            vec![AxiomPart::Pne(pne("f")), AxiomPart::Constant(NumericConstant::new(2.0))],
        ));

        assert_ne!(a, b);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a).effect, pne("f"));
        assert_eq!(arena.get(b).op, Some(ArithmeticOp::Sum));
        assert_eq!(arena.ids().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_arena_in_place_mutation() {
        let mut arena = AxiomArena::new();
        let id = arena.alloc(NumericAxiom::derived(
            pne("f"),
            Some(ArithmeticOp::Sum),
            vec![
                AxiomPart::Constant(NumericConstant::new(1.0)),
                AxiomPart::Constant(NumericConstant::new(2.0)),
            ],
        ));

        let axiom = arena.get_mut(id);
        axiom.parts = vec![AxiomPart::Constant(NumericConstant::new(3.0))];
        axiom.op = None;
        axiom.kind = AxiomKind::Constant;

        assert_eq!(arena.get(id).kind, AxiomKind::Constant);
        assert_eq!(
            arena.get(id).parts,
            vec![AxiomPart::Constant(NumericConstant::new(3.0))]
        );
    }

    #[test]
    fn test_display() {
        let axiom = NumericAxiom::derived(
            pne("f"),
            Some(ArithmeticOp::Sum),
            vec![AxiomPart::Pne(pne("g")), AxiomPart::Constant(NumericConstant::new(2.0))],
        );
        assert_eq!(axiom.to_string(), "f() := g() + 2");
    }
}
