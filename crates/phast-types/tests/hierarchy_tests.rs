//! Cast-relation and type-expansion behavior over a class hierarchy.

use phast_common::Atom;
use phast_types::{ClassFqsen, ClassHierarchy, Type, UnionType};
use rustc_hash::FxHashMap;

/// A hand-built hierarchy: child canonical name -> direct ancestors.
struct TestHierarchy {
    edges: FxHashMap<(Atom, Atom), Vec<ClassFqsen>>,
}

impl TestHierarchy {
    fn new(pairs: &[(&str, &str)]) -> Self {
        let mut edges: FxHashMap<(Atom, Atom), Vec<ClassFqsen>> = FxHashMap::default();
        for (child, parent) in pairs {
            let child = ClassFqsen::from_full_name(child);
            let (ns, name, _) = child.canonical();
            edges
                .entry((ns, name))
                .or_default()
                .push(ClassFqsen::from_full_name(parent));
        }
        Self { edges }
    }
}

impl ClassHierarchy for TestHierarchy {
    fn direct_ancestors(&self, class: ClassFqsen) -> Vec<ClassFqsen> {
        let (ns, name, _) = class.canonical();
        self.edges.get(&(ns, name)).cloned().unwrap_or_default()
    }

    fn has_class(&self, class: ClassFqsen) -> bool {
        let (ns, name, _) = class.canonical();
        self.edges.contains_key(&(ns, name))
    }
}

fn class_union(name: &str) -> UnionType {
    UnionType::of(Type::class(ClassFqsen::from_full_name(name)))
}

#[test]
fn child_casts_to_parent_transitively() {
    // C extends B extends A.
    let hierarchy = TestHierarchy::new(&[("\\C", "\\B"), ("\\B", "\\A")]);
    assert!(class_union("\\C").can_cast_to_union(&class_union("\\B"), &hierarchy));
    assert!(class_union("\\C").can_cast_to_union(&class_union("\\A"), &hierarchy));
    // Downcast is not a cast.
    assert!(!class_union("\\A").can_cast_to_union(&class_union("\\C"), &hierarchy));
}

#[test]
fn cast_is_reflexive_for_classes() {
    let hierarchy = TestHierarchy::new(&[]);
    assert!(class_union("\\A").can_cast_to_union(&class_union("\\A"), &hierarchy));
}

#[test]
fn expanded_types_collect_all_ancestors() {
    let hierarchy = TestHierarchy::new(&[("\\C", "\\B"), ("\\B", "\\A")]);
    let expanded = class_union("\\C").as_expanded_types(&hierarchy);
    assert!(expanded.has_type(&Type::class(ClassFqsen::from_full_name("\\C"))));
    assert!(expanded.has_type(&Type::class(ClassFqsen::from_full_name("\\B"))));
    assert!(expanded.has_type(&Type::class(ClassFqsen::from_full_name("\\A"))));
    assert_eq!(expanded.len(), 3);
}

#[test]
fn expansion_survives_inheritance_cycles() {
    let hierarchy = TestHierarchy::new(&[("\\A", "\\B"), ("\\B", "\\A")]);
    let expanded = class_union("\\A").as_expanded_types(&hierarchy);
    assert_eq!(expanded.len(), 2);
    // The cast walk terminates too.
    assert!(!class_union("\\A").can_cast_to_union(&class_union("\\X"), &hierarchy));
}

#[test]
fn generic_array_of_classes_casts_elementwise() {
    let hierarchy = TestHierarchy::new(&[("\\B", "\\A")]);
    let bs = UnionType::of(Type::generic_array_of(Type::class(
        ClassFqsen::from_full_name("\\B"),
    )));
    let as_ = UnionType::of(Type::generic_array_of(Type::class(
        ClassFqsen::from_full_name("\\A"),
    )));
    assert!(bs.can_cast_to_union(&as_, &hierarchy));
    assert!(!as_.can_cast_to_union(&bs, &hierarchy));
}
