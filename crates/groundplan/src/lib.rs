//! groundplan: semantic middle-end for numeric planning domains
//!
//! This library takes a lifted, typed planning-domain description and
//! prepares it for a search engine: it normalizes and grounds logical
//! conditions against known facts, and analyzes numeric derived-value
//! rules (axioms) to fold compile-time constants, assign stratification
//! layers, and merge structurally equivalent axioms.

pub mod axiom_rules;
pub mod ground;
pub mod pddl;

// Re-export commonly used types from pddl
pub use pddl::{
    ArithmeticOp, AssignmentKind, AxiomArena, AxiomId, AxiomKind, AxiomPart, Comparator,
    Comparison, Condition, ConditionKind, FunctionAssignment, Literal, NumericAxiom,
    NumericConstant, NumericExpression, PrimitiveNumericExpression, TypedObject,
};

// Re-export the grounding engine
pub use ground::{instantiate, GroundError, NumericContext};

// Re-export the axiom analysis pipeline
pub use axiom_rules::{handle_axioms, AxiomAnalysis, AxiomError, CONSTANT_OR_NO_AXIOM};
