//! The can-cast-to relation.
//!
//! `L` casts to a target union when it structurally equals a member,
//! when `mixed` is involved on either side, when the native coercion
//! table reaches a member, or when a member names an ancestor class of
//! `L`. Generic arrays recurse element-wise.

use crate::fqsen::ClassFqsen;
use crate::hierarchy::ClassHierarchy;
use crate::ty::{NativeType, Type};
use crate::union::UnionType;
use phast_common::Atom;
use rustc_hash::FxHashSet;

/// Non-strict native coercions, directed `from` → `to`.
fn native_can_cast(from: NativeType, to: NativeType) -> bool {
    use NativeType::*;
    if from == to || from == Mixed || to == Mixed || from == Null {
        return true;
    }
    match (from, to) {
        (Int, Float) | (Float, Int) => true,
        (Int | Float | Bool | Null, String) => true,
        // Callable strings.
        (String, Callable) => true,
        _ => false,
    }
}

fn class_key(fqsen: ClassFqsen) -> (Atom, Atom) {
    let (ns, name, _) = fqsen.canonical();
    (ns, name)
}

fn is_ancestor_of(
    candidate: ClassFqsen,
    class: ClassFqsen,
    hierarchy: &dyn ClassHierarchy,
) -> bool {
    let target = class_key(candidate);
    let mut visited: FxHashSet<(Atom, Atom)> = FxHashSet::default();
    let mut pending = vec![class];
    while let Some(current) = pending.pop() {
        if !visited.insert(class_key(current)) {
            continue;
        }
        for ancestor in hierarchy.direct_ancestors(current) {
            if class_key(ancestor) == target {
                return true;
            }
            pending.push(ancestor);
        }
    }
    false
}

fn type_can_cast_to_type(left: &Type, right: &Type, hierarchy: &dyn ClassHierarchy) -> bool {
    if left == right {
        return true;
    }
    match (left, right) {
        (Type::Native(NativeType::Mixed), _) | (_, Type::Native(NativeType::Mixed)) => true,
        (Type::Native(NativeType::Null), _) => true,
        (Type::Native(l), Type::Native(r)) => native_can_cast(*l, *r),
        // T[] → array, and element-wise to S[].
        (Type::GenericArray(_), Type::Native(NativeType::Array)) => true,
        (Type::GenericArray(l), Type::GenericArray(r)) => {
            type_can_cast_to_type(l, r, hierarchy)
        }
        // Closures are callables; any object is an `object`.
        (Type::Callable(_), Type::Native(NativeType::Callable)) => true,
        (Type::Callable(_), Type::ClassInstance { fqsen, .. })
            if fqsen.name.to_lowercase() == Atom::new("closure") =>
        {
            true
        }
        (Type::ClassInstance { .. }, Type::Native(NativeType::Object)) => true,
        (Type::ClassInstance { fqsen, .. }, Type::Native(NativeType::Callable))
            if fqsen.name.to_lowercase() == Atom::new("closure") =>
        {
            true
        }
        (
            Type::ClassInstance { fqsen: l, .. },
            Type::ClassInstance { fqsen: r, .. },
        ) => {
            if class_key(*l) == class_key(*r) {
                return true;
            }
            is_ancestor_of(*r, *l, hierarchy)
        }
        // Late static binding behaves like an unresolved object.
        (Type::Native(NativeType::Static), Type::ClassInstance { .. })
        | (Type::Native(NativeType::Static), Type::Native(NativeType::Object)) => true,
        (Type::Template(l), Type::Template(r)) => l == r,
        _ => false,
    }
}

fn type_can_cast_to_union(
    left: &Type,
    target: &UnionType,
    hierarchy: &dyn ClassHierarchy,
) -> bool {
    target
        .types()
        .any(|right| type_can_cast_to_type(left, right, hierarchy))
}

/// True iff every left type reaches some target type. Either side being
/// empty means "no information" and passes.
pub fn union_can_cast_to_union(
    left: &UnionType,
    target: &UnionType,
    hierarchy: &dyn ClassHierarchy,
) -> bool {
    if left.is_empty() || target.is_empty() {
        return true;
    }
    left.types()
        .all(|l| type_can_cast_to_union(l, target, hierarchy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::EmptyHierarchy;

    fn can_cast(left: Type, right: Type) -> bool {
        UnionType::of(left).can_cast_to_union(&UnionType::of(right), &EmptyHierarchy)
    }

    #[test]
    fn reflexive_for_every_native() {
        for native in [
            NativeType::Array,
            NativeType::Bool,
            NativeType::Callable,
            NativeType::Float,
            NativeType::Int,
            NativeType::Null,
            NativeType::Object,
            NativeType::String,
            NativeType::Mixed,
            NativeType::Void,
            NativeType::Resource,
            NativeType::Static,
        ] {
            assert!(can_cast(Type::Native(native), Type::Native(native)));
        }
    }

    #[test]
    fn numeric_and_scalar_coercions() {
        assert!(can_cast(Type::INT, Type::FLOAT));
        assert!(can_cast(Type::FLOAT, Type::INT));
        assert!(can_cast(Type::INT, Type::STRING));
        assert!(can_cast(Type::BOOL, Type::STRING));
        assert!(!can_cast(Type::STRING, Type::INT));
        assert!(!can_cast(Type::ARRAY, Type::STRING));
    }

    #[test]
    fn null_and_mixed_are_permissive() {
        assert!(can_cast(Type::NULL, Type::class(ClassFqsen::from_full_name("\\A"))));
        assert!(can_cast(Type::MIXED, Type::INT));
        assert!(can_cast(Type::INT, Type::MIXED));
    }

    #[test]
    fn generic_arrays_recurse() {
        assert!(can_cast(Type::generic_array_of(Type::INT), Type::ARRAY));
        assert!(can_cast(
            Type::generic_array_of(Type::INT),
            Type::generic_array_of(Type::FLOAT)
        ));
        assert!(!can_cast(
            Type::generic_array_of(Type::STRING),
            Type::generic_array_of(Type::INT)
        ));
    }

    #[test]
    fn every_left_type_must_reach_target() {
        let left = UnionType::from_types([Type::INT, Type::ARRAY]);
        let target = UnionType::of(Type::STRING);
        assert!(!left.can_cast_to_union(&target, &EmptyHierarchy));

        let target = UnionType::from_types([Type::STRING, Type::ARRAY]);
        assert!(left.can_cast_to_union(&target, &EmptyHierarchy));
    }

    #[test]
    fn empty_sides_pass() {
        let empty = UnionType::empty();
        let ints = UnionType::of(Type::INT);
        assert!(empty.can_cast_to_union(&ints, &EmptyHierarchy));
        assert!(ints.can_cast_to_union(&empty, &EmptyHierarchy));
    }

    #[test]
    fn object_accepts_any_class() {
        let class = Type::class(ClassFqsen::from_full_name("\\My\\Widget"));
        assert!(can_cast(class.clone(), Type::OBJECT));
        assert!(!can_cast(Type::OBJECT, class));
    }
}
