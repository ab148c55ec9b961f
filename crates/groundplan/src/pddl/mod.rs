//! Typed planning-domain data model
//!
//! This module provides the fundamental types the middle-end operates on:
//! conditions, numeric expressions, typed objects, and numeric axioms.
//! Conditions are structurally immutable and carry a content hash computed
//! at construction; axioms live in an arena and are mutated in place by the
//! analysis pass.

pub mod axioms;
pub mod conditions;
pub mod f_expression;
pub mod types;

#[cfg(test)]
mod proptest_tests;

// Re-export commonly used types
pub use axioms::{AxiomArena, AxiomId, AxiomKind, AxiomPart, NumericAxiom};
pub use conditions::{Comparator, Comparison, Condition, ConditionKind, Literal, Quantified};
pub use f_expression::{
    ArithmeticOp, AssignmentKind, FunctionAssignment, NumericConstant, NumericExpression,
    PrimitiveNumericExpression,
};
pub use types::TypedObject;
