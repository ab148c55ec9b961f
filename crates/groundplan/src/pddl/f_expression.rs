//! Numeric expressions over planning-domain functions
//!
//! Numeric values are modeled as an immutable DAG of constants, primitive
//! numeric expressions (references to declared functions, resolved at
//! runtime or by an axiom), and arithmetic combinators. Equality and
//! hashing of constants go through the IEEE bit pattern so expressions can
//! be used as map keys.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A floating-point constant
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NumericConstant {
    pub value: f64,
}

impl NumericConstant {
    /// Create a new constant
    pub fn new(value: f64) -> Self {
        NumericConstant { value }
    }
}

impl From<f64> for NumericConstant {
    fn from(value: f64) -> Self {
        NumericConstant::new(value)
    }
}

// Bit-pattern equality: constants are compared as constructed, not under
// float arithmetic identities (so -0.0 != 0.0 and NaN == NaN here).
impl PartialEq for NumericConstant {
    fn eq(&self, other: &Self) -> bool {
        self.value.to_bits() == other.value.to_bits()
    }
}

impl Eq for NumericConstant {}

impl Hash for NumericConstant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.to_bits().hash(state);
    }
}

impl fmt::Display for NumericConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A reference to a declared numeric function applied to arguments.
///
/// This is a name, not a value: its value is supplied by the runtime state
/// or computed by a numeric axiom whose effect names it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrimitiveNumericExpression {
    pub symbol: String,
    pub args: Vec<String>,
}

impl PrimitiveNumericExpression {
    /// Create a new primitive numeric expression
    pub fn new(symbol: impl Into<String>, args: Vec<String>) -> Self {
        PrimitiveNumericExpression {
            symbol: symbol.into(),
            args,
        }
    }

    /// Rename arguments through a lookup-or-identity map
    pub fn rename_variables(&self, renamings: &HashMap<String, String>) -> Self {
        PrimitiveNumericExpression {
            symbol: self.symbol.clone(),
            args: self
                .args
                .iter()
                .map(|arg| renamings.get(arg).cloned().unwrap_or_else(|| arg.clone()))
                .collect(),
        }
    }
}

impl fmt::Display for PrimitiveNumericExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.symbol)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Sum,
    Product,
    Difference,
    Quotient,
    AdditiveInverse,
    ScaleUp,
    ScaleDown,
}

impl ArithmeticOp {
    /// The operator's symbol
    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Sum => "+",
            ArithmeticOp::Product | ArithmeticOp::ScaleUp => "*",
            ArithmeticOp::Difference | ArithmeticOp::AdditiveInverse => "-",
            ArithmeticOp::Quotient | ArithmeticOp::ScaleDown => "/",
        }
    }

    /// Apply this operator to two operands.
    ///
    /// Returns `None` for `AdditiveInverse`, which is unary.
    pub fn apply(self, lhs: f64, rhs: f64) -> Option<f64> {
        match self {
            ArithmeticOp::Sum => Some(lhs + rhs),
            ArithmeticOp::Product | ArithmeticOp::ScaleUp => Some(lhs * rhs),
            ArithmeticOp::Difference => Some(lhs - rhs),
            ArithmeticOp::Quotient | ArithmeticOp::ScaleDown => Some(lhs / rhs),
            ArithmeticOp::AdditiveInverse => None,
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A numeric expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericExpression {
    Constant(NumericConstant),
    Primitive(PrimitiveNumericExpression),
    Arithmetic {
        op: ArithmeticOp,
        parts: Vec<NumericExpression>,
    },
}

impl NumericExpression {
    /// A constant expression
    pub fn constant(value: f64) -> Self {
        NumericExpression::Constant(NumericConstant::new(value))
    }

    /// A primitive numeric expression
    pub fn primitive(symbol: impl Into<String>, args: Vec<String>) -> Self {
        NumericExpression::Primitive(PrimitiveNumericExpression::new(symbol, args))
    }

    pub fn sum(parts: Vec<NumericExpression>) -> Self {
        NumericExpression::Arithmetic {
            op: ArithmeticOp::Sum,
            parts,
        }
    }

    pub fn product(parts: Vec<NumericExpression>) -> Self {
        NumericExpression::Arithmetic {
            op: ArithmeticOp::Product,
            parts,
        }
    }

    pub fn difference(parts: Vec<NumericExpression>) -> Self {
        NumericExpression::Arithmetic {
            op: ArithmeticOp::Difference,
            parts,
        }
    }

    pub fn quotient(parts: Vec<NumericExpression>) -> Self {
        NumericExpression::Arithmetic {
            op: ArithmeticOp::Quotient,
            parts,
        }
    }

    pub fn additive_inverse(part: NumericExpression) -> Self {
        NumericExpression::Arithmetic {
            op: ArithmeticOp::AdditiveInverse,
            parts: vec![part],
        }
    }

    /// Rename variables through a lookup-or-identity map
    pub fn rename_variables(&self, renamings: &HashMap<String, String>) -> NumericExpression {
        match self {
            NumericExpression::Constant(_) => self.clone(),
            NumericExpression::Primitive(pne) => {
                NumericExpression::Primitive(pne.rename_variables(renamings))
            }
            NumericExpression::Arithmetic { op, parts } => NumericExpression::Arithmetic {
                op: *op,
                parts: parts
                    .iter()
                    .map(|part| part.rename_variables(renamings))
                    .collect(),
            },
        }
    }

    /// Collect all primitive numeric expressions referenced by this expression
    pub fn primitive_numeric_expressions(&self) -> HashSet<PrimitiveNumericExpression> {
        let mut result = HashSet::new();
        self.collect_primitives(&mut result);
        result
    }

    fn collect_primitives(&self, result: &mut HashSet<PrimitiveNumericExpression>) {
        match self {
            NumericExpression::Constant(_) => {}
            NumericExpression::Primitive(pne) => {
                result.insert(pne.clone());
            }
            NumericExpression::Arithmetic { parts, .. } => {
                for part in parts {
                    part.collect_primitives(result);
                }
            }
        }
    }
}

impl fmt::Display for NumericExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericExpression::Constant(c) => write!(f, "{}", c),
            NumericExpression::Primitive(pne) => write!(f, "{}", pne),
            NumericExpression::Arithmetic { op, parts } => {
                write!(f, "(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 || parts.len() == 1 {
                        // Unary minus prints as (-x)
                        write!(f, " {} ", op)?;
                    }
                    write!(f, "{}", part)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// How an assignment effect combines the target with the value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentKind {
    Assign,
    Increase,
    Decrease,
}

/// A numeric effect: assign to / increase / decrease a function value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionAssignment {
    pub kind: AssignmentKind,
    pub target: PrimitiveNumericExpression,
    pub value: NumericExpression,
}

impl FunctionAssignment {
    /// Create a new function assignment
    pub fn new(
        kind: AssignmentKind,
        target: PrimitiveNumericExpression,
        value: NumericExpression,
    ) -> Self {
        FunctionAssignment {
            kind,
            target,
            value,
        }
    }

    /// Rename variables in target and value
    pub fn rename_variables(&self, renamings: &HashMap<String, String>) -> FunctionAssignment {
        FunctionAssignment {
            kind: self.kind,
            target: self.target.rename_variables(renamings),
            value: self.value.rename_variables(renamings),
        }
    }
}

impl fmt::Display for FunctionAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            AssignmentKind::Assign => "assign",
            AssignmentKind::Increase => "increase",
            AssignmentKind::Decrease => "decrease",
        };
        write!(f, "({} {} {})", verb, self.target, self.value)
    }
}
