//! Variable scopes.
//!
//! Scopes form a conceptual chain global → class → function-like →
//! branch clone, but each scope owns its full variable map: function-like
//! scopes are closed (they start empty rather than inheriting outer
//! variables) and branching constructs copy the map before refining it.

use crate::fqsen::{ClassFqsen, FunctionLikeFqsen};
use crate::union::UnionType;
use phast_common::Atom;
use rustc_hash::FxHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Class,
    FunctionLike,
    /// A per-branch clone of an enclosing scope.
    Branch,
}

/// A variable binding.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    pub name: Atom,
    pub union_type: UnionType,
    pub is_reference: bool,
    pub is_superglobal: bool,
}

impl Variable {
    #[must_use]
    pub fn new(name: Atom, union_type: UnionType) -> Self {
        Self {
            name,
            union_type,
            is_reference: false,
            is_superglobal: false,
        }
    }

    #[must_use]
    pub fn reference(name: Atom, union_type: UnionType) -> Self {
        Self {
            is_reference: true,
            ..Self::new(name, union_type)
        }
    }
}

#[derive(Clone, Debug)]
pub struct Scope {
    kind: ScopeKind,
    class_fqsen: Option<ClassFqsen>,
    function_fqsen: Option<FunctionLikeFqsen>,
    template_types: FxHashMap<Atom, UnionType>,
    variables: FxHashMap<Atom, Variable>,
}

impl Scope {
    #[must_use]
    pub fn global() -> Self {
        Self {
            kind: ScopeKind::Global,
            class_fqsen: None,
            function_fqsen: None,
            template_types: FxHashMap::default(),
            variables: FxHashMap::default(),
        }
    }

    /// The scope of a class body. Carries the template-type map from the
    /// class's `@template` annotations.
    #[must_use]
    pub fn class(class_fqsen: ClassFqsen, template_types: FxHashMap<Atom, UnionType>) -> Self {
        Self {
            kind: ScopeKind::Class,
            class_fqsen: Some(class_fqsen),
            function_fqsen: None,
            template_types,
            variables: FxHashMap::default(),
        }
    }

    /// A closed function-like scope. Starts with no variables; the class
    /// FQSEN and template map are retained from the enclosing scope so
    /// member types still resolve.
    #[must_use]
    pub fn function_like(enclosing: &Scope, fqsen: FunctionLikeFqsen) -> Self {
        Self {
            kind: ScopeKind::FunctionLike,
            class_fqsen: enclosing.class_fqsen,
            function_fqsen: Some(fqsen),
            template_types: enclosing.template_types.clone(),
            variables: FxHashMap::default(),
        }
    }

    /// Copy-on-branch clone.
    #[must_use]
    pub fn branch_clone(&self) -> Self {
        Self {
            kind: ScopeKind::Branch,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    #[must_use]
    pub fn is_in_class_scope(&self) -> bool {
        self.class_fqsen.is_some()
    }

    #[must_use]
    pub fn class_fqsen(&self) -> Option<ClassFqsen> {
        self.class_fqsen
    }

    #[must_use]
    pub fn is_in_function_like_scope(&self) -> bool {
        self.function_fqsen.is_some()
    }

    #[must_use]
    pub fn function_fqsen(&self) -> Option<FunctionLikeFqsen> {
        self.function_fqsen
    }

    #[must_use]
    pub fn template_types(&self) -> &FxHashMap<Atom, UnionType> {
        &self.template_types
    }

    #[must_use]
    pub fn is_template_type(&self, name: Atom) -> bool {
        self.template_types.contains_key(&name)
    }

    /// A clone whose template map also contains `templates`. Used while
    /// parsing a doc comment whose own `@template` tags must be visible
    /// to the types in the same comment.
    #[must_use]
    pub fn with_added_template_types(
        &self,
        templates: impl IntoIterator<Item = (Atom, UnionType)>,
    ) -> Self {
        let mut scope = self.clone();
        scope.template_types.extend(templates);
        scope
    }

    // ==================== Variables ====================

    #[must_use]
    pub fn has_variable(&self, name: Atom) -> bool {
        self.variables.contains_key(&name)
    }

    #[must_use]
    pub fn get_variable(&self, name: Atom) -> Option<&Variable> {
        self.variables.get(&name)
    }

    pub fn add_variable(&mut self, variable: Variable) {
        self.variables.insert(variable.name, variable);
    }

    pub fn remove_variable(&mut self, name: Atom) {
        self.variables.remove(&name);
    }

    /// Clone-and-insert, for the immutable-context update style.
    #[must_use]
    pub fn with_variable(&self, variable: Variable) -> Self {
        let mut scope = self.clone();
        scope.add_variable(variable);
        scope
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    #[must_use]
    pub fn variable_names(&self) -> Vec<Atom> {
        self.variables.keys().copied().collect()
    }
}

/// Hard-coded superglobal union types.
pub mod superglobals {
    use super::UnionType;

    /// The union type of a superglobal, if `name` is one.
    #[must_use]
    pub fn union_type(name: &str) -> Option<UnionType> {
        let source = match name {
            "argv" => "string[]",
            "argc" => "int",
            "_GET" | "_POST" | "_COOKIE" | "_REQUEST" => "string[]|string[][]",
            "_SERVER" | "_SESSION" | "GLOBALS" => "array",
            "_ENV" => "string[]",
            "_FILES" => "int[][]|string[][]|int[][][]|string[][][]",
            "http_response_header" => "string[]|null",
            _ => return None,
        };
        Some(UnionType::from_native_string(source))
    }

    #[must_use]
    pub fn is_superglobal(name: &str) -> bool {
        union_type(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::Type;

    #[test]
    fn function_scope_is_closed() {
        let mut outer = Scope::global();
        outer.add_variable(Variable::new(Atom::new("x"), UnionType::of(Type::INT)));
        let inner = Scope::function_like(
            &outer,
            FunctionLikeFqsen::Function(crate::fqsen::FunctionFqsen::from_full_name("\\f")),
        );
        assert!(!inner.has_variable(Atom::new("x")));
    }

    #[test]
    fn branch_clone_copies_variables() {
        let mut scope = Scope::global();
        scope.add_variable(Variable::new(Atom::new("x"), UnionType::of(Type::INT)));
        let mut branch = scope.branch_clone();
        branch.add_variable(Variable::new(Atom::new("y"), UnionType::of(Type::STRING)));
        assert!(branch.has_variable(Atom::new("x")));
        assert!(!scope.has_variable(Atom::new("y")));
    }

    #[test]
    fn superglobal_table() {
        assert!(superglobals::is_superglobal("_GET"));
        assert!(!superglobals::is_superglobal("get"));
        let argv = superglobals::union_type("argv").unwrap();
        assert_eq!(argv, UnionType::of(Type::generic_array_of(Type::STRING)));
    }
}
