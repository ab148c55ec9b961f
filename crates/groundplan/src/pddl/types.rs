//! Typed objects (quantifier parameters and domain objects)

use super::conditions::{Condition, Literal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A named object with a type, as declared in the domain or bound by a
/// quantifier. Variables carry a leading `?` sigil; constants do not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedObject {
    pub name: String,
    pub type_name: String,
}

impl TypedObject {
    /// Create a new typed object
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        TypedObject {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    /// The type-membership atom for this object, e.g. `block(?x)`
    pub fn get_atom(&self) -> Condition {
        Condition::literal(Literal::atom(
            self.type_name.clone(),
            vec![self.name.clone()],
        ))
    }

    /// Give this object a fresh, globally unique name.
    ///
    /// The fresh name is derived from the number of names generated so far,
    /// recorded in `type_map`, so nested quantifiers binding the same source
    /// name always receive distinct replacements. The old-to-new mapping is
    /// added to `renamings` for substitution into the quantifier body.
    pub fn uniquify_name(
        &self,
        type_map: &mut HashMap<String, String>,
        renamings: &mut HashMap<String, String>,
    ) -> TypedObject {
        let new_name = format!("{}@{}", self.name, type_map.len());
        renamings.insert(self.name.clone(), new_name.clone());
        type_map.insert(new_name.clone(), self.type_name.clone());
        TypedObject::new(new_name, self.type_name.clone())
    }
}

impl fmt::Display for TypedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniquify_name_generates_distinct_names() {
        let mut type_map = HashMap::new();
        let mut renamings = HashMap::new();

        let x = TypedObject::new("?x", "block");
        let first = x.uniquify_name(&mut type_map, &mut renamings);

        let mut inner_renamings = renamings.clone();
        let second = x.uniquify_name(&mut type_map, &mut inner_renamings);

        assert_ne!(first.name, second.name);
        assert_eq!(type_map.get(&first.name), Some(&"block".to_string()));
        assert_eq!(type_map.get(&second.name), Some(&"block".to_string()));
        // The inner scope sees the inner renaming, the outer scope the outer one.
        assert_eq!(renamings.get("?x"), Some(&first.name));
        assert_eq!(inner_renamings.get("?x"), Some(&second.name));
    }

    #[test]
    fn test_get_atom() {
        let x = TypedObject::new("?x", "block");
        let atom = x.get_atom();
        assert_eq!(
            atom,
            Condition::literal(Literal::atom("block", vec!["?x".to_string()]))
        );
    }
}
