//! The analysis context.
//!
//! A `Context` bundles everything the engine knows about the current
//! analysis point: file, line, namespace, the namespace-use map, the
//! scope, the strict-types flag and the set of suppressed issue names.
//! Contexts are never mutated in place - every update goes through a
//! `with_*` method returning a fresh value - because branching constructs
//! duplicate and recombine them freely.

use crate::fqsen::{ClassFqsen, FunctionLikeFqsen};
use crate::scope::{Scope, Variable};
use phast_ast::flags::name_flags;
use phast_common::Atom;
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;

/// The three namespace-use kinds; aliases are tracked per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UseKind {
    Normal,
    Function,
    Const,
}

type NamespaceMap = FxHashMap<(UseKind, Atom), Atom>;

#[derive(Clone)]
pub struct Context {
    file: Atom,
    line: u32,
    namespace: Atom,
    namespace_map: Rc<NamespaceMap>,
    scope: Rc<Scope>,
    strict_types: bool,
    suppressed: Rc<FxHashSet<Atom>>,
}

impl Context {
    #[must_use]
    pub fn new(file: Atom) -> Self {
        Self {
            file,
            line: 0,
            namespace: Atom::empty(),
            namespace_map: Rc::new(NamespaceMap::default()),
            scope: Rc::new(Scope::global()),
            strict_types: false,
            suppressed: Rc::new(FxHashSet::default()),
        }
    }

    // ==================== Accessors ====================

    #[must_use]
    pub fn file(&self) -> Atom {
        self.file
    }

    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[must_use]
    pub fn namespace(&self) -> Atom {
        self.namespace
    }

    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    #[must_use]
    pub fn is_strict_types(&self) -> bool {
        self.strict_types
    }

    #[must_use]
    pub fn is_in_class_scope(&self) -> bool {
        self.scope.is_in_class_scope()
    }

    #[must_use]
    pub fn class_fqsen_in_scope(&self) -> Option<ClassFqsen> {
        self.scope.class_fqsen()
    }

    #[must_use]
    pub fn is_in_function_like_scope(&self) -> bool {
        self.scope.is_in_function_like_scope()
    }

    #[must_use]
    pub fn function_fqsen_in_scope(&self) -> Option<FunctionLikeFqsen> {
        self.scope.function_fqsen()
    }

    #[must_use]
    pub fn is_in_global_scope(&self) -> bool {
        !self.scope.is_in_function_like_scope()
    }

    #[must_use]
    pub fn is_suppressed(&self, issue_name: &str) -> bool {
        self.suppressed.contains(&Atom::new(issue_name))
    }

    #[must_use]
    pub fn is_template_type_in_scope(&self, name: &str) -> bool {
        self.scope.is_template_type(Atom::new(name))
    }

    // ==================== Copy-and-update ====================

    #[must_use]
    pub fn with_line(&self, line: u32) -> Self {
        if line == 0 || line == self.line {
            return self.clone();
        }
        Self {
            line,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_namespace(&self, namespace: Atom) -> Self {
        Self {
            namespace,
            // A namespace block resets the use map.
            namespace_map: Rc::new(NamespaceMap::default()),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_namespace_map_entry(&self, kind: UseKind, alias: Atom, target: Atom) -> Self {
        let mut map = (*self.namespace_map).clone();
        map.insert((kind, alias.to_lowercase()), target);
        Self {
            namespace_map: Rc::new(map),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_scope(&self, scope: Scope) -> Self {
        Self {
            scope: Rc::new(scope),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_strict_types(&self, strict_types: bool) -> Self {
        Self {
            strict_types,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_added_suppressions(&self, issue_names: impl IntoIterator<Item = Atom>) -> Self {
        let mut suppressed = (*self.suppressed).clone();
        suppressed.extend(issue_names);
        Self {
            suppressed: Rc::new(suppressed),
            ..self.clone()
        }
    }

    /// Convenience: a context whose scope also binds `variable`.
    #[must_use]
    pub fn with_variable(&self, variable: Variable) -> Self {
        self.with_scope(self.scope.with_variable(variable))
    }

    // ==================== Name resolution ====================

    /// Resolve a class-position name node's text to a fully qualified
    /// name string, honoring the name flags.
    #[must_use]
    pub fn resolve_class_name(&self, name: &str, flags: u32) -> String {
        if flags == name_flags::NAME_RELATIVE {
            return self.prefix_with_namespace(name.trim_start_matches("namespace\\"));
        }
        if flags == name_flags::NAME_FQ || name.starts_with('\\') {
            return format!("\\{}", name.trim_start_matches('\\'));
        }
        self.qualify(name, UseKind::Normal)
    }

    /// Resolve a class name appearing in a type string or doc comment.
    #[must_use]
    pub fn qualify_class_name(&self, name: &str) -> String {
        if name.starts_with('\\') {
            return name.to_owned();
        }
        self.qualify(name, UseKind::Normal)
    }

    /// Resolve a function-position name. Returns the in-namespace
    /// candidate plus the global fallback PHP would try second.
    #[must_use]
    pub fn resolve_function_name(&self, name: &str, flags: u32) -> (String, Option<String>) {
        if flags == name_flags::NAME_FQ || name.starts_with('\\') {
            return (format!("\\{}", name.trim_start_matches('\\')), None);
        }
        if !name.contains('\\') {
            if let Some(target) = self.lookup_alias(UseKind::Function, name) {
                return (format!("\\{target}"), None);
            }
            let primary = self.prefix_with_namespace(name);
            let fallback = if self.namespace.is_empty() {
                None
            } else {
                Some(format!("\\{name}"))
            };
            return (primary, fallback);
        }
        (self.qualify(name, UseKind::Normal), None)
    }

    /// Resolve a constant-position name, with the same global fallback
    /// rule as functions.
    #[must_use]
    pub fn resolve_constant_name(&self, name: &str, flags: u32) -> (String, Option<String>) {
        if flags == name_flags::NAME_FQ || name.starts_with('\\') {
            return (format!("\\{}", name.trim_start_matches('\\')), None);
        }
        if !name.contains('\\') {
            if let Some(target) = self.lookup_alias(UseKind::Const, name) {
                return (format!("\\{target}"), None);
            }
            let primary = self.prefix_with_namespace(name);
            let fallback = if self.namespace.is_empty() {
                None
            } else {
                Some(format!("\\{name}"))
            };
            return (primary, fallback);
        }
        (self.qualify(name, UseKind::Normal), None)
    }

    fn lookup_alias(&self, kind: UseKind, alias: &str) -> Option<Atom> {
        self.namespace_map
            .get(&(kind, Atom::new(alias).to_lowercase()))
            .copied()
    }

    fn prefix_with_namespace(&self, name: &str) -> String {
        if self.namespace.is_empty() {
            format!("\\{name}")
        } else {
            format!("\\{}\\{}", self.namespace, name)
        }
    }

    /// Qualified-name resolution: the first segment goes through the use
    /// map, the remainder rides along.
    fn qualify(&self, name: &str, kind: UseKind) -> String {
        let (first, rest) = match name.find('\\') {
            Some(pos) => (&name[..pos], Some(&name[pos + 1..])),
            None => (name, None),
        };
        if let Some(target) = self.lookup_alias(kind, first) {
            return match rest {
                Some(rest) => format!("\\{target}\\{rest}"),
                None => format!("\\{target}"),
            };
        }
        self.prefix_with_namespace(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> Context {
        Context::new(Atom::new("src.php"))
    }

    #[test]
    fn resolves_through_use_map() {
        let ctx = context()
            .with_namespace(Atom::new("N"))
            .with_namespace_map_entry(UseKind::Normal, Atom::new("X"), Atom::new("OtherNs\\X"));
        assert_eq!(ctx.resolve_class_name("X", name_flags::NAME_NOT_FQ), "\\OtherNs\\X");
        // Aliases are case-insensitive.
        assert_eq!(ctx.resolve_class_name("x", name_flags::NAME_NOT_FQ), "\\OtherNs\\X");
    }

    #[test]
    fn unknown_names_land_in_current_namespace() {
        let ctx = context().with_namespace(Atom::new("N"));
        assert_eq!(ctx.resolve_class_name("Y", name_flags::NAME_NOT_FQ), "\\N\\Y");
        assert_eq!(ctx.resolve_class_name("\\Y", name_flags::NAME_NOT_FQ), "\\Y");
    }

    #[test]
    fn qualified_first_segment_goes_through_map() {
        let ctx = context()
            .with_namespace_map_entry(UseKind::Normal, Atom::new("A"), Atom::new("Deep\\A"));
        assert_eq!(ctx.resolve_class_name("A\\B", name_flags::NAME_NOT_FQ), "\\Deep\\A\\B");
    }

    #[test]
    fn function_fallback_to_global() {
        let ctx = context().with_namespace(Atom::new("N"));
        let (primary, fallback) = ctx.resolve_function_name("strlen", name_flags::NAME_NOT_FQ);
        assert_eq!(primary, "\\N\\strlen");
        assert_eq!(fallback.as_deref(), Some("\\strlen"));
    }

    #[test]
    fn namespace_switch_resets_use_map() {
        let ctx = context()
            .with_namespace_map_entry(UseKind::Normal, Atom::new("X"), Atom::new("Other\\X"))
            .with_namespace(Atom::new("M"));
        assert_eq!(ctx.resolve_class_name("X", name_flags::NAME_NOT_FQ), "\\M\\X");
    }

    #[test]
    fn with_line_is_cheap_and_correct() {
        let ctx = context().with_line(7);
        assert_eq!(ctx.line(), 7);
        // Line 0 means "unknown"; the previous line sticks.
        assert_eq!(ctx.with_line(0).line(), 7);
    }
}
