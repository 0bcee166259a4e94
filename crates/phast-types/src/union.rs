//! Union types: unordered sets of atomic types.

use crate::cast;
use crate::context::Context;
use crate::fqsen::ClassFqsen;
use crate::hierarchy::ClassHierarchy;
use crate::ty::{NativeType, Type};
use phast_common::Atom;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::fmt;

/// An unordered set of [`Type`]s.
///
/// The empty union means "no information", not "no value"; most
/// operations treat it permissively.
#[derive(Clone, Debug, Default)]
pub struct UnionType {
    types: SmallVec<[Type; 3]>,
}

impl PartialEq for UnionType {
    fn eq(&self, other: &Self) -> bool {
        self.types.len() == other.types.len()
            && self.types.iter().all(|t| other.types.contains(t))
    }
}

impl UnionType {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn of(ty: Type) -> Self {
        Self {
            types: SmallVec::from_iter([ty]),
        }
    }

    #[must_use]
    pub fn from_types(types: impl IntoIterator<Item = Type>) -> Self {
        let mut union = Self::empty();
        for ty in types {
            union.add_type(ty);
        }
        union
    }

    pub fn add_type(&mut self, ty: Type) {
        if !self.types.contains(&ty) {
            self.types.push(ty);
        }
    }

    pub fn add_union(&mut self, other: &UnionType) {
        for ty in &other.types {
            self.add_type(ty.clone());
        }
    }

    pub fn remove_type(&mut self, ty: &Type) {
        self.types.retain(|t| t != ty);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn types(&self) -> impl Iterator<Item = &Type> {
        self.types.iter()
    }

    #[must_use]
    pub fn has_type(&self, ty: &Type) -> bool {
        self.types.contains(ty)
    }

    #[must_use]
    pub fn has_template_type(&self) -> bool {
        fn contains_template(ty: &Type) -> bool {
            match ty {
                Type::Template(_) => true,
                Type::GenericArray(element) => contains_template(element),
                Type::ClassInstance { params, .. } => {
                    params.iter().any(|p| p.types().any(contains_template))
                }
                _ => false,
            }
        }
        self.types.iter().any(contains_template)
    }

    #[must_use]
    pub fn has_static_type(&self) -> bool {
        self.types.iter().any(|t| t.is_native(NativeType::Static))
    }

    /// Remove the late-static-binding type; used when a member type
    /// escapes its defining class.
    pub fn remove_static_type(&mut self) {
        self.remove_type(&Type::STATIC);
    }

    #[must_use]
    pub fn has_native(&self, native: NativeType) -> bool {
        self.types.iter().any(|t| t.is_native(native))
    }

    /// True when every type is `array` or a generic array.
    #[must_use]
    pub fn is_exclusively_array_like(&self) -> bool {
        !self.is_empty() && self.types.iter().all(Type::is_array_like)
    }

    /// The class FQSENs named by this union.
    #[must_use]
    pub fn class_fqsens(&self) -> Vec<ClassFqsen> {
        self.types.iter().filter_map(Type::class_fqsen).collect()
    }

    /// Wrap every type as the element type of a generic array
    /// (`int|string` → `int[]|string[]`).
    #[must_use]
    pub fn as_generic_array_types(&self) -> UnionType {
        UnionType::from_types(
            self.types
                .iter()
                .map(|t| Type::generic_array_of(t.clone())),
        )
    }

    /// Unwrap generic arrays to their element types; a plain `array`
    /// contributes `mixed`.
    #[must_use]
    pub fn generic_array_element_types(&self) -> UnionType {
        let mut union = UnionType::empty();
        for ty in &self.types {
            match ty {
                Type::GenericArray(element) => union.add_type((**element).clone()),
                Type::Native(NativeType::Array) => union.add_type(Type::MIXED),
                _ => {}
            }
        }
        union
    }

    /// Add every transitive ancestor of every class type. Cycle-safe.
    #[must_use]
    pub fn as_expanded_types(&self, hierarchy: &dyn ClassHierarchy) -> UnionType {
        let mut expanded = self.clone();
        let mut visited: FxHashSet<(Atom, Atom)> = FxHashSet::default();
        let mut pending: Vec<ClassFqsen> = self.class_fqsens();
        while let Some(class) = pending.pop() {
            let key = {
                let (ns, name, _) = class.canonical();
                (ns, name)
            };
            if !visited.insert(key) {
                continue;
            }
            for ancestor in hierarchy.direct_ancestors(class) {
                expanded.add_type(Type::class(ancestor));
                pending.push(ancestor);
            }
        }
        expanded
    }

    /// True iff every type on the left can cast to some type in `target`.
    #[must_use]
    pub fn can_cast_to_union(&self, target: &UnionType, hierarchy: &dyn ClassHierarchy) -> bool {
        cast::union_can_cast_to_union(self, target, hierarchy)
    }

    /// Substitute `@template` identifiers with concrete unions. One pass;
    /// the map's values may not themselves contain template types.
    #[must_use]
    pub fn with_template_parameter_type_map(&self, map: &FxHashMap<Atom, UnionType>) -> UnionType {
        if map.is_empty() || !self.has_template_type() {
            return self.clone();
        }
        let mut union = UnionType::empty();
        for ty in &self.types {
            substitute_into(ty, map, &mut union);
        }
        union
    }

    /// Parse a `|`-separated type string resolved in `context`.
    ///
    /// Each piece is a generic-array suffix chain (`T[]`), a native name,
    /// a `@template` identifier in scope, or a class name resolved
    /// through the namespace-use map.
    #[must_use]
    pub fn from_string_in_context(source: &str, context: &Context) -> UnionType {
        let mut union = UnionType::empty();
        for piece in source.split('|') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            if let Some(ty) = type_from_string_in_context(piece, context) {
                union.add_type(ty);
            }
        }
        union
    }

    /// Parse a type string containing only natives and `[]` suffixes.
    /// Used for bundled signatures and superglobal seeds, which need no
    /// namespace resolution.
    #[must_use]
    pub fn from_native_string(source: &str) -> UnionType {
        let mut union = UnionType::empty();
        for piece in source.split('|') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            let (base, depth) = strip_array_suffixes(piece);
            let Some(native) = NativeType::from_name(base) else {
                continue;
            };
            union.add_type(wrap_array(Type::Native(native), depth));
        }
        union
    }
}

fn substitute_into(ty: &Type, map: &FxHashMap<Atom, UnionType>, out: &mut UnionType) {
    match ty {
        Type::Template(id) => match map.get(id) {
            Some(concrete) => out.add_union(concrete),
            None => out.add_type(ty.clone()),
        },
        Type::GenericArray(element) => {
            let mut elements = UnionType::empty();
            substitute_into(element, map, &mut elements);
            if elements.is_empty() {
                out.add_type(ty.clone());
            } else {
                for element in elements.types() {
                    out.add_type(Type::generic_array_of(element.clone()));
                }
            }
        }
        Type::ClassInstance { fqsen, params } => {
            let params = params
                .iter()
                .map(|p| p.with_template_parameter_type_map(map))
                .collect();
            out.add_type(Type::ClassInstance {
                fqsen: *fqsen,
                params,
            });
        }
        _ => out.add_type(ty.clone()),
    }
}

fn strip_array_suffixes(piece: &str) -> (&str, usize) {
    let mut base = piece;
    let mut depth = 0;
    while let Some(stripped) = base.strip_suffix("[]") {
        base = stripped;
        depth += 1;
    }
    (base, depth)
}

fn wrap_array(mut ty: Type, depth: usize) -> Type {
    for _ in 0..depth {
        ty = Type::generic_array_of(ty);
    }
    ty
}

fn type_from_string_in_context(piece: &str, context: &Context) -> Option<Type> {
    let (base, depth) = strip_array_suffixes(piece);
    if base.is_empty() {
        // Bare `[]` shorthand for an untyped array.
        return Some(wrap_array(Type::ARRAY, depth.saturating_sub(1)));
    }
    // Generic class syntax: `Container<int,string>`.
    if let Some(lt) = base.find('<') {
        if !base.ends_with('>') {
            return None;
        }
        let name = &base[..lt];
        let inner = &base[lt + 1..base.len() - 1];
        let params = split_template_args(inner)
            .into_iter()
            .map(|arg| UnionType::from_string_in_context(arg, context))
            .collect();
        let full = context.qualify_class_name(name);
        return Some(wrap_array(
            Type::ClassInstance {
                fqsen: ClassFqsen::from_full_name(&full),
                params,
            },
            depth,
        ));
    }
    let base_ty = if let Some(native) = NativeType::from_name(base) {
        Type::Native(native)
    } else if context.is_template_type_in_scope(base) {
        Type::Template(Atom::new(base))
    } else {
        let full = context.qualify_class_name(base);
        Type::class(ClassFqsen::from_full_name(&full))
    };
    Some(wrap_array(base_ty, depth))
}

/// Split template arguments on commas outside nested angle brackets.
fn split_template_args(inner: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push(inner[start..].trim());
    args.retain(|a| !a.is_empty());
    args
}

impl fmt::Display for UnionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sort for a stable rendering; the set itself is unordered.
        let mut rendered: Vec<String> = self.types.iter().map(Type::to_string).collect();
        rendered.sort();
        f.write_str(&rendered.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_type_dedupes() {
        let mut union = UnionType::empty();
        union.add_type(Type::INT);
        union.add_type(Type::INT);
        assert_eq!(union.len(), 1);
    }

    #[test]
    fn set_equality_ignores_order() {
        let a = UnionType::from_types([Type::INT, Type::STRING]);
        let b = UnionType::from_types([Type::STRING, Type::INT]);
        assert_eq!(a, b);
    }

    #[test]
    fn generic_array_wrap_and_unwrap() {
        let scalar = UnionType::from_types([Type::INT, Type::STRING]);
        let wrapped = scalar.as_generic_array_types();
        assert!(wrapped.has_type(&Type::generic_array_of(Type::INT)));
        assert_eq!(wrapped.generic_array_element_types(), scalar);
    }

    #[test]
    fn plain_array_unwraps_to_mixed() {
        let union = UnionType::of(Type::ARRAY);
        assert_eq!(
            union.generic_array_element_types(),
            UnionType::of(Type::MIXED)
        );
    }

    #[test]
    fn template_substitution() {
        let t = Atom::new("T");
        let union = UnionType::from_types([
            Type::Template(t),
            Type::generic_array_of(Type::Template(t)),
            Type::STRING,
        ]);
        let mut map = FxHashMap::default();
        map.insert(t, UnionType::of(Type::INT));
        let concrete = union.with_template_parameter_type_map(&map);
        assert!(concrete.has_type(&Type::INT));
        assert!(concrete.has_type(&Type::generic_array_of(Type::INT)));
        assert!(concrete.has_type(&Type::STRING));
        assert!(!concrete.has_template_type());
    }

    #[test]
    fn unmapped_template_is_kept() {
        let union = UnionType::of(Type::Template(Atom::new("U")));
        let concrete = union.with_template_parameter_type_map(&FxHashMap::default());
        assert_eq!(concrete, union);
    }

    #[test]
    fn native_string_parsing() {
        let union = UnionType::from_native_string("string[]|string[][]");
        assert!(union.has_type(&Type::generic_array_of(Type::STRING)));
        assert!(union.has_type(&Type::generic_array_of(Type::generic_array_of(Type::STRING))));
        assert_eq!(union.len(), 2);
    }

    #[test]
    fn display_is_sorted_and_stable() {
        let union = UnionType::from_types([Type::STRING, Type::INT]);
        assert_eq!(union.to_string(), "int|string");
    }
}
