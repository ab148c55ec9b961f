//! Conditions: hash-consed boolean/comparison expression trees
//!
//! Conditions are structurally immutable: a content hash is computed once
//! at construction and equality compares the cached hash before falling
//! back to an exact structural match. Rewrites (`simplified`, `relaxed`,
//! `untyped`, `negate`, `uniquify_variables`) always produce new trees;
//! subtrees are shared via `Rc`, so trees referenced from several owners
//! are never invalidated by a rewrite.
//!
//! Variables are distinguished from constants by a leading `?` sigil.

use super::f_expression::NumericExpression;
use super::types::TypedObject;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// A predicate applied to arguments, with a polarity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub predicate: String,
    pub args: Vec<String>,
    pub negated: bool,
}

impl Literal {
    /// Create a positive literal
    pub fn atom(predicate: impl Into<String>, args: Vec<String>) -> Self {
        Literal {
            predicate: predicate.into(),
            args,
            negated: false,
        }
    }

    /// Create a negative literal
    pub fn negated_atom(predicate: impl Into<String>, args: Vec<String>) -> Self {
        Literal {
            predicate: predicate.into(),
            args,
            negated: true,
        }
    }

    /// The complement of this literal
    pub fn negate(&self) -> Literal {
        Literal {
            predicate: self.predicate.clone(),
            args: self.args.clone(),
            negated: !self.negated,
        }
    }

    /// The positive form of this literal
    pub fn positive(&self) -> Literal {
        Literal {
            predicate: self.predicate.clone(),
            args: self.args.clone(),
            negated: false,
        }
    }

    /// Rename arguments through a lookup-or-identity map
    pub fn rename_variables(&self, renamings: &HashMap<String, String>) -> Literal {
        Literal {
            predicate: self.predicate.clone(),
            args: self
                .args
                .iter()
                .map(|arg| renamings.get(arg).cloned().unwrap_or_else(|| arg.clone()))
                .collect(),
            negated: self.negated,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "~")?;
        }
        write!(f, "{}(", self.predicate)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

/// Comparison operators between numeric expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl Comparator {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Eq => "=",
            Comparator::Ge => ">=",
            Comparator::Gt => ">",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A comparison between two numeric expressions, with a polarity.
///
/// Unlike plain literals, the truth of a comparison is decided at runtime;
/// grounding only resolves its numeric references.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Comparison {
    pub comparator: Comparator,
    pub parts: (NumericExpression, NumericExpression),
    pub negated: bool,
}

/// A quantifier body: typed parameters over a single part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantified {
    pub parameters: Vec<TypedObject>,
    pub part: Condition,
}

/// The variants of a condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionKind {
    Truth,
    Falsity,
    Literal(Literal),
    Conjunction(Vec<Condition>),
    Disjunction(Vec<Condition>),
    Universal(Quantified),
    Existential(Quantified),
    Comparison(Comparison),
}

/// An immutable condition tree with a cached content hash.
///
/// Cloning is cheap (a reference-count bump plus the hash); equal-by-
/// structure conditions hash identically and are interchangeable as map
/// keys.
#[derive(Debug, Clone)]
pub struct Condition {
    hash: u64,
    kind: Rc<ConditionKind>,
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        // Compare hash first for speed reasons.
        self.hash == other.hash && *self.kind == *other.kind
    }
}

impl Eq for Condition {}

impl Hash for Condition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

fn compute_hash(kind: &ConditionKind) -> u64 {
    let mut h = DefaultHasher::new();
    match kind {
        ConditionKind::Truth => 0u8.hash(&mut h),
        ConditionKind::Falsity => 1u8.hash(&mut h),
        ConditionKind::Literal(lit) => {
            2u8.hash(&mut h);
            lit.hash(&mut h);
        }
        ConditionKind::Conjunction(parts) => {
            3u8.hash(&mut h);
            for part in parts {
                part.hash.hash(&mut h);
            }
        }
        ConditionKind::Disjunction(parts) => {
            4u8.hash(&mut h);
            for part in parts {
                part.hash.hash(&mut h);
            }
        }
        ConditionKind::Universal(q) => {
            5u8.hash(&mut h);
            q.parameters.hash(&mut h);
            q.part.hash.hash(&mut h);
        }
        ConditionKind::Existential(q) => {
            6u8.hash(&mut h);
            q.parameters.hash(&mut h);
            q.part.hash.hash(&mut h);
        }
        ConditionKind::Comparison(c) => {
            7u8.hash(&mut h);
            c.hash(&mut h);
        }
    }
    h.finish()
}

impl Condition {
    fn new(kind: ConditionKind) -> Self {
        let hash = compute_hash(&kind);
        Condition {
            hash,
            kind: Rc::new(kind),
        }
    }

    /// The always-true condition
    pub fn truth() -> Self {
        Condition::new(ConditionKind::Truth)
    }

    /// The always-false condition
    pub fn falsity() -> Self {
        Condition::new(ConditionKind::Falsity)
    }

    /// A literal condition
    pub fn literal(literal: Literal) -> Self {
        Condition::new(ConditionKind::Literal(literal))
    }

    /// A conjunction of parts (not simplified)
    pub fn conjunction(parts: Vec<Condition>) -> Self {
        Condition::new(ConditionKind::Conjunction(parts))
    }

    /// A disjunction of parts (not simplified)
    pub fn disjunction(parts: Vec<Condition>) -> Self {
        Condition::new(ConditionKind::Disjunction(parts))
    }

    /// A universally quantified condition
    pub fn universal(parameters: Vec<TypedObject>, part: Condition) -> Self {
        Condition::new(ConditionKind::Universal(Quantified { parameters, part }))
    }

    /// An existentially quantified condition
    pub fn existential(parameters: Vec<TypedObject>, part: Condition) -> Self {
        Condition::new(ConditionKind::Existential(Quantified { parameters, part }))
    }

    /// A comparison between two numeric expressions
    pub fn comparison(
        comparator: Comparator,
        left: NumericExpression,
        right: NumericExpression,
    ) -> Self {
        Condition::new(ConditionKind::Comparison(Comparison {
            comparator,
            parts: (left, right),
            negated: false,
        }))
    }

    /// A negated comparison
    pub fn negated_comparison(
        comparator: Comparator,
        left: NumericExpression,
        right: NumericExpression,
    ) -> Self {
        Condition::new(ConditionKind::Comparison(Comparison {
            comparator,
            parts: (left, right),
            negated: true,
        }))
    }

    /// A comparison normalized to compare against zero:
    /// `lhs op rhs` stored as `(lhs - rhs) op 0`
    pub fn comparison_to_zero(
        comparator: Comparator,
        left: NumericExpression,
        right: NumericExpression,
    ) -> Self {
        Condition::comparison(
            comparator,
            NumericExpression::difference(vec![left, right]),
            NumericExpression::constant(0.0),
        )
    }

    fn from_comparison(comparison: Comparison) -> Self {
        Condition::new(ConditionKind::Comparison(comparison))
    }

    /// The variant of this condition
    pub fn kind(&self) -> &ConditionKind {
        &self.kind
    }

    /// The content hash computed at construction
    pub fn content_hash(&self) -> u64 {
        self.hash
    }

    /// Whether this is `Truth` or `Falsity`
    pub fn is_constant(&self) -> bool {
        matches!(*self.kind, ConditionKind::Truth | ConditionKind::Falsity)
    }

    /// Push negation through to the literal/comparison level (De Morgan)
    pub fn negate(&self) -> Condition {
        match self.kind() {
            ConditionKind::Truth => Condition::falsity(),
            ConditionKind::Falsity => Condition::truth(),
            ConditionKind::Literal(lit) => Condition::literal(lit.negate()),
            ConditionKind::Conjunction(parts) => {
                Condition::disjunction(parts.iter().map(|p| p.negate()).collect())
            }
            ConditionKind::Disjunction(parts) => {
                Condition::conjunction(parts.iter().map(|p| p.negate()).collect())
            }
            ConditionKind::Universal(q) => {
                Condition::existential(q.parameters.clone(), q.part.negate())
            }
            ConditionKind::Existential(q) => {
                Condition::universal(q.parameters.clone(), q.part.negate())
            }
            ConditionKind::Comparison(c) => Condition::from_comparison(Comparison {
                comparator: c.comparator,
                parts: c.parts.clone(),
                negated: !c.negated,
            }),
        }
    }

    /// Simplify bottom-up: flatten nested junctors, remove identity
    /// elements, short-circuit on absorbing elements, collapse singletons,
    /// and drop quantifiers over constant conditions.
    pub fn simplified(&self) -> Condition {
        match self.kind() {
            ConditionKind::Conjunction(parts) => {
                let parts: Vec<Condition> = parts.iter().map(|p| p.simplified()).collect();
                simplify_conjunction(parts)
            }
            ConditionKind::Disjunction(parts) => {
                let parts: Vec<Condition> = parts.iter().map(|p| p.simplified()).collect();
                simplify_disjunction(parts)
            }
            ConditionKind::Universal(q) => {
                let part = q.part.simplified();
                if part.is_constant() {
                    part
                } else {
                    Condition::universal(q.parameters.clone(), part)
                }
            }
            ConditionKind::Existential(q) => {
                let part = q.part.simplified();
                if part.is_constant() {
                    part
                } else {
                    Condition::existential(q.parameters.clone(), part)
                }
            }
            // Constants, literals and comparisons have no boolean parts.
            _ => self.clone(),
        }
    }

    /// Delete-relaxation: negated literals and numeric comparisons are
    /// assumed satisfiable and become `Truth`.
    pub fn relaxed(&self) -> Condition {
        match self.kind() {
            ConditionKind::Literal(lit) if lit.negated => Condition::truth(),
            ConditionKind::Comparison(_) => Condition::truth(),
            ConditionKind::Conjunction(parts) => {
                Condition::conjunction(parts.iter().map(|p| p.relaxed()).collect())
            }
            ConditionKind::Disjunction(parts) => {
                Condition::disjunction(parts.iter().map(|p| p.relaxed()).collect())
            }
            ConditionKind::Universal(q) => {
                Condition::universal(q.parameters.clone(), q.part.relaxed())
            }
            ConditionKind::Existential(q) => {
                Condition::existential(q.parameters.clone(), q.part.relaxed())
            }
            _ => self.clone(),
        }
    }

    /// Strip typing by folding each quantifier's parameter types into its
    /// body as type-membership literals.
    pub fn untyped(&self) -> Condition {
        match self.kind() {
            ConditionKind::Conjunction(parts) => {
                Condition::conjunction(parts.iter().map(|p| p.untyped()).collect())
            }
            ConditionKind::Disjunction(parts) => {
                Condition::disjunction(parts.iter().map(|p| p.untyped()).collect())
            }
            ConditionKind::Universal(q) => {
                let part = q.part.untyped();
                let mut body: Vec<Condition> = q
                    .parameters
                    .iter()
                    .map(|par| par.get_atom().negate())
                    .collect();
                body.push(part);
                Condition::universal(q.parameters.clone(), Condition::disjunction(body))
            }
            ConditionKind::Existential(q) => {
                let part = q.part.untyped();
                let mut body: Vec<Condition> =
                    q.parameters.iter().map(|par| par.get_atom()).collect();
                body.push(part);
                Condition::existential(q.parameters.clone(), Condition::conjunction(body))
            }
            _ => self.clone(),
        }
    }

    /// Rename quantified variables to globally fresh names.
    ///
    /// The renaming map is threaded top-down (preorder): each quantifier
    /// copies the map it received, adds fresh names for its own parameters,
    /// and passes the copy into its body, so nested quantifiers over the
    /// same source name produce distinct fresh names without capture.
    pub fn uniquify_variables(
        &self,
        type_map: &mut HashMap<String, String>,
        renamings: &HashMap<String, String>,
    ) -> Condition {
        match self.kind() {
            ConditionKind::Truth | ConditionKind::Falsity => self.clone(),
            ConditionKind::Literal(lit) => Condition::literal(lit.rename_variables(renamings)),
            ConditionKind::Comparison(c) => Condition::from_comparison(Comparison {
                comparator: c.comparator,
                parts: (
                    c.parts.0.rename_variables(renamings),
                    c.parts.1.rename_variables(renamings),
                ),
                negated: c.negated,
            }),
            ConditionKind::Conjunction(parts) => Condition::conjunction(
                parts
                    .iter()
                    .map(|p| p.uniquify_variables(type_map, renamings))
                    .collect(),
            ),
            ConditionKind::Disjunction(parts) => Condition::disjunction(
                parts
                    .iter()
                    .map(|p| p.uniquify_variables(type_map, renamings))
                    .collect(),
            ),
            ConditionKind::Universal(q) => {
                let (parameters, part) = uniquify_quantified(q, type_map, renamings);
                Condition::universal(parameters, part)
            }
            ConditionKind::Existential(q) => {
                let (parameters, part) = uniquify_quantified(q, type_map, renamings);
                Condition::existential(parameters, part)
            }
        }
    }

    /// All free variables (args with the `?` sigil not bound by a quantifier)
    pub fn free_variables(&self) -> HashSet<String> {
        let mut result = HashSet::new();
        self.collect_free_variables(&mut result);
        result
    }

    fn collect_free_variables(&self, result: &mut HashSet<String>) {
        match self.kind() {
            ConditionKind::Truth | ConditionKind::Falsity => {}
            ConditionKind::Literal(lit) => {
                result.extend(lit.args.iter().filter(|a| a.starts_with('?')).cloned());
            }
            ConditionKind::Comparison(c) => {
                for expr in [&c.parts.0, &c.parts.1] {
                    for pne in expr.primitive_numeric_expressions() {
                        result.extend(pne.args.iter().filter(|a| a.starts_with('?')).cloned());
                    }
                }
            }
            ConditionKind::Conjunction(parts) | ConditionKind::Disjunction(parts) => {
                for part in parts {
                    part.collect_free_variables(result);
                }
            }
            ConditionKind::Universal(q) | ConditionKind::Existential(q) => {
                let mut inner = q.part.free_variables();
                for par in &q.parameters {
                    inner.remove(&par.name);
                }
                result.extend(inner);
            }
        }
    }

    /// Whether any disjunction occurs in this condition
    pub fn has_disjunction(&self) -> bool {
        match self.kind() {
            ConditionKind::Disjunction(_) => true,
            ConditionKind::Conjunction(parts) => parts.iter().any(|p| p.has_disjunction()),
            ConditionKind::Universal(q) | ConditionKind::Existential(q) => {
                q.part.has_disjunction()
            }
            _ => false,
        }
    }

    /// Whether any universal quantifier occurs in this condition
    pub fn has_universal_part(&self) -> bool {
        match self.kind() {
            ConditionKind::Universal(_) => true,
            ConditionKind::Conjunction(parts) | ConditionKind::Disjunction(parts) => {
                parts.iter().any(|p| p.has_universal_part())
            }
            ConditionKind::Existential(q) => q.part.has_universal_part(),
            _ => false,
        }
    }

    /// Whether any existential quantifier occurs in this condition
    pub fn has_existential_part(&self) -> bool {
        match self.kind() {
            ConditionKind::Existential(_) => true,
            ConditionKind::Conjunction(parts) | ConditionKind::Disjunction(parts) => {
                parts.iter().any(|p| p.has_existential_part())
            }
            ConditionKind::Universal(q) => q.part.has_existential_part(),
            _ => false,
        }
    }
}

fn uniquify_quantified(
    q: &Quantified,
    type_map: &mut HashMap<String, String>,
    renamings: &HashMap<String, String>,
) -> (Vec<TypedObject>, Condition) {
    // Copy the map so sibling scopes stay independent.
    let mut renamings = renamings.clone();
    let parameters: Vec<TypedObject> = q
        .parameters
        .iter()
        .map(|par| par.uniquify_name(type_map, &mut renamings))
        .collect();
    let part = q.part.uniquify_variables(type_map, &renamings);
    (parameters, part)
}

fn simplify_conjunction(parts: Vec<Condition>) -> Condition {
    let mut result_parts = Vec::new();
    for part in parts {
        match part.kind() {
            ConditionKind::Conjunction(inner) => result_parts.extend(inner.iter().cloned()),
            ConditionKind::Falsity => return Condition::falsity(),
            ConditionKind::Truth => {}
            _ => result_parts.push(part.clone()),
        }
    }
    if result_parts.is_empty() {
        return Condition::truth();
    }
    if result_parts.len() == 1 {
        return result_parts.pop().expect("non-empty");
    }
    Condition::conjunction(result_parts)
}

fn simplify_disjunction(parts: Vec<Condition>) -> Condition {
    let mut result_parts = Vec::new();
    for part in parts {
        match part.kind() {
            ConditionKind::Disjunction(inner) => result_parts.extend(inner.iter().cloned()),
            ConditionKind::Truth => return Condition::truth(),
            ConditionKind::Falsity => {}
            _ => result_parts.push(part.clone()),
        }
    }
    if result_parts.is_empty() {
        return Condition::falsity();
    }
    if result_parts.len() == 1 {
        return result_parts.pop().expect("non-empty");
    }
    Condition::disjunction(result_parts)
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ConditionKind::Truth => write!(f, "true"),
            ConditionKind::Falsity => write!(f, "false"),
            ConditionKind::Literal(lit) => write!(f, "{}", lit),
            ConditionKind::Conjunction(parts) => write_junctor(f, "&", parts),
            ConditionKind::Disjunction(parts) => write_junctor(f, "|", parts),
            ConditionKind::Universal(q) => write_quantified(f, "forall", q),
            ConditionKind::Existential(q) => write_quantified(f, "exists", q),
            ConditionKind::Comparison(c) => {
                if c.negated {
                    write!(f, "~")?;
                }
                write!(f, "({} {} {})", c.parts.0, c.comparator, c.parts.1)
            }
        }
    }
}

fn write_junctor(f: &mut fmt::Formatter<'_>, sep: &str, parts: &[Condition]) -> fmt::Result {
    write!(f, "(")?;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", sep)?;
        }
        write!(f, "{}", part)?;
    }
    write!(f, ")")
}

fn write_quantified(f: &mut fmt::Formatter<'_>, word: &str, q: &Quantified) -> fmt::Result {
    write!(f, "({} [", word)?;
    for (i, par) in q.parameters.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", par)?;
    }
    write!(f, "]: {})", q.part)
}
