//! Ancestor hydration.
//!
//! `hydrate` expands a class with the members of its interface, trait and
//! parent closure, in that order. It runs at most once per class (the
//! `is_hydrated` flag is set before recursing, so cycles terminate), and
//! favors the earliest-defined member on conflicts. Template parameters
//! bound through `@inherits` rewrite imported member types.

use crate::codebase::CodeBase;
use crate::element::{ClassConstant, ElementFlags, Method, Property};
use phast_common::issue::{IssueInstance, catalog};
use phast_common::Atom;
use phast_types::{ClassConstFqsen, ClassFqsen, Type, UnionType};
use rustc_hash::FxHashMap;
use tracing::trace;

impl CodeBase {
    /// Ensure the ancestor closure of `fqsen` is imported. Idempotent.
    /// Missing ancestors are skipped here; the per-class analyzers
    /// report them.
    pub fn hydrate(&mut self, fqsen: ClassFqsen) -> Vec<IssueInstance> {
        let mut issues = Vec::new();
        self.hydrate_inner(fqsen, &mut issues);
        issues
    }

    fn hydrate_inner(&mut self, fqsen: ClassFqsen, issues: &mut Vec<IssueInstance>) {
        let Ok(class) = self.get_class_by_fqsen_mut(fqsen) else {
            return;
        };
        if class.is_hydrated {
            return;
        }
        // Set before recursing so inheritance cycles terminate.
        class.is_hydrated = true;
        trace!(class = %fqsen, "hydrating");

        let file = class.file;
        let line = class.line;
        let inherited_type = class.inherited_type.clone();
        let parent = class.parent;
        let ancestors = class.ancestor_fqsens();

        for ancestor in ancestors {
            if !self.has_class_with_fqsen(ancestor) {
                continue;
            }
            self.hydrate_inner(ancestor, issues);
            let template_map = if Some(ancestor) == parent {
                self.parent_template_map(ancestor, inherited_type.as_ref())
            } else {
                FxHashMap::default()
            };
            self.import_members(fqsen, ancestor, &template_map, issues);
        }

        // Every class exposes the `class` string constant.
        let class_const_fqsen = ClassConstFqsen::new(fqsen, Atom::new("class"));
        if !self.has_class_constant_with_fqsen(class_const_fqsen) {
            let mut constant =
                ClassConstant::new(class_const_fqsen, file, line, ElementFlags::INTERNAL);
            constant.union_type = UnionType::of(Type::STRING);
            self.add_class_constant(constant);
        }

        self.coerce_generator_methods(fqsen);
    }

    /// Map the parent's `@template` names to the concrete unions bound by
    /// this class's `@inherits` annotation.
    fn parent_template_map(
        &self,
        parent: ClassFqsen,
        inherited_type: Option<&UnionType>,
    ) -> FxHashMap<Atom, UnionType> {
        let mut map = FxHashMap::default();
        let Some(inherited) = inherited_type else {
            return map;
        };
        let Ok(parent_class) = self.get_class_by_fqsen(parent) else {
            return map;
        };
        if parent_class.template_types.is_empty() {
            return map;
        }
        let parent_key = {
            let (ns, name, _) = parent.canonical();
            (ns, name)
        };
        for ty in inherited.types() {
            let Type::ClassInstance { fqsen, params } = ty else {
                continue;
            };
            let (ns, name, _) = fqsen.canonical();
            if (ns, name) != parent_key {
                continue;
            }
            for (template, concrete) in parent_class.template_types.iter().zip(params) {
                map.insert(*template, concrete.clone());
            }
        }
        map
    }

    fn import_members(
        &mut self,
        target: ClassFqsen,
        ancestor: ClassFqsen,
        template_map: &FxHashMap<Atom, UnionType>,
        issues: &mut Vec<IssueInstance>,
    ) {
        // Methods: an existing declaration wins and becomes an override.
        let ancestor_methods: Vec<Method> = self.methods_for_class(ancestor).cloned().collect();
        for method in ancestor_methods {
            let target_fqsen = method.fqsen.with_class(target);
            if self.has_method_with_fqsen(target_fqsen) {
                if let Ok(existing) = self.get_method_by_fqsen_mut(target_fqsen) {
                    if existing.defining_fqsen.class == target {
                        existing.flags |= ElementFlags::OVERRIDE;
                    }
                }
                continue;
            }
            let mut imported = method;
            imported.fqsen = target_fqsen;
            imported.union_type = imported
                .union_type
                .with_template_parameter_type_map(template_map);
            for parameter in &mut imported.parameters {
                parameter.union_type = parameter
                    .union_type
                    .with_template_parameter_type_map(template_map);
            }
            self.add_method(imported);
        }

        // Properties: earliest definition wins; a second, differently
        // typed definition from another ancestor is a composition
        // conflict.
        let ancestor_properties: Vec<Property> =
            self.properties_for_class(ancestor).cloned().collect();
        for property in ancestor_properties {
            let target_fqsen = property.fqsen.with_class(target);
            if self.has_property_with_fqsen(target_fqsen) {
                let Ok(existing) = self.get_property_by_fqsen(target_fqsen) else {
                    continue;
                };
                let foreign = existing.defining_fqsen.class != target;
                let distinct_origin = existing.defining_fqsen != property.defining_fqsen;
                if foreign
                    && distinct_origin
                    && !existing.union_type.is_empty()
                    && !property.union_type.is_empty()
                    && existing.union_type != property.union_type
                {
                    issues.push(IssueInstance::new(
                        &catalog::INCOMPATIBLE_COMPOSITION_PROP,
                        existing.file.as_str(),
                        existing.line,
                        vec![
                            existing.defining_fqsen.class.to_string(),
                            property.defining_fqsen.class.to_string(),
                            property.name.to_string(),
                            target.to_string(),
                        ],
                    ));
                }
                continue;
            }
            let mut imported = property;
            imported.fqsen = target_fqsen;
            imported.union_type = imported
                .union_type
                .with_template_parameter_type_map(template_map);
            self.add_property(imported);
        }

        // Class constants: earliest definition wins, silently.
        let ancestor_constants: Vec<ClassConstant> =
            self.class_constants_for_class(ancestor).cloned().collect();
        for constant in ancestor_constants {
            if constant.name == Atom::new("class") {
                continue;
            }
            let target_fqsen = constant.fqsen.with_class(target);
            if self.has_class_constant_with_fqsen(target_fqsen) {
                continue;
            }
            let mut imported = constant;
            imported.fqsen = target_fqsen;
            self.add_class_constant(imported);
        }
    }

    /// Methods flagged as yielding return `\Generator` unless their
    /// declared type already names a traversable supertype.
    fn coerce_generator_methods(&mut self, fqsen: ClassFqsen) {
        let generator = generator_type();
        let method_fqsens: Vec<_> = self
            .methods_for_class(fqsen)
            .filter(|m| m.flags.contains(ElementFlags::YIELDS))
            .map(|m| m.fqsen)
            .collect();
        for method_fqsen in method_fqsens {
            if let Ok(method) = self.get_method_by_fqsen_mut(method_fqsen) {
                if !is_traversable_union(&method.union_type) {
                    method.union_type = UnionType::of(generator.clone());
                }
            }
        }
    }
}

/// The built-in generator class type.
#[must_use]
pub fn generator_type() -> Type {
    Type::class(ClassFqsen::from_full_name("\\Generator"))
}

/// Whether the union already names a generator supertype.
#[must_use]
pub fn is_traversable_union(union: &UnionType) -> bool {
    union.class_fqsens().iter().any(|fqsen| {
        matches!(
            fqsen.name.to_lowercase().as_str(),
            "generator" | "traversable" | "iterator" | "iterable"
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Class, Parameter};
    use phast_types::{MethodFqsen, PropertyFqsen};

    fn file() -> Atom {
        Atom::new("src.php")
    }

    fn add_class_named(codebase: &mut CodeBase, name: &str) -> ClassFqsen {
        codebase.add_class(Class::new(
            ClassFqsen::from_full_name(name),
            file(),
            1,
            ElementFlags::empty(),
        ))
    }

    fn add_property_typed(codebase: &mut CodeBase, class: ClassFqsen, name: &str, ty: Type) {
        let mut property =
            Property::new(PropertyFqsen::new(class, Atom::new(name)), file(), 2, ElementFlags::empty());
        property.union_type = UnionType::of(ty);
        codebase.add_property(property);
    }

    #[test]
    fn members_flow_down_from_parents() {
        let mut codebase = CodeBase::empty();
        let parent = add_class_named(&mut codebase, "\\Base");
        add_property_typed(&mut codebase, parent, "count", Type::INT);
        codebase.add_method(Method::new(
            MethodFqsen::new(parent, Atom::new("run")),
            file(),
            3,
            ElementFlags::empty(),
        ));

        let child = add_class_named(&mut codebase, "\\Child");
        codebase.get_class_by_fqsen_mut(child).unwrap().parent = Some(parent);

        let issues = codebase.hydrate(child);
        assert!(issues.is_empty());
        let inherited = codebase
            .get_property_by_fqsen(PropertyFqsen::new(child, Atom::new("count")))
            .unwrap();
        assert_eq!(inherited.union_type, UnionType::of(Type::INT));
        // Defining FQSEN is preserved, containing FQSEN is retargeted.
        assert_eq!(inherited.defining_fqsen.class, parent);
        assert_eq!(inherited.fqsen.class, child);
        assert!(codebase.has_method_with_fqsen(MethodFqsen::new(child, Atom::new("run"))));
    }

    #[test]
    fn hydration_is_idempotent() {
        let mut codebase = CodeBase::empty();
        let parent = add_class_named(&mut codebase, "\\Base");
        add_property_typed(&mut codebase, parent, "x", Type::INT);
        let child = add_class_named(&mut codebase, "\\Child");
        codebase.get_class_by_fqsen_mut(child).unwrap().parent = Some(parent);

        codebase.hydrate(child);
        let after_once: Vec<_> = codebase.properties_for_class(child).map(|p| p.name).collect();
        codebase.hydrate(child);
        codebase.hydrate(child);
        let after_thrice: Vec<_> = codebase.properties_for_class(child).map(|p| p.name).collect();
        assert_eq!(after_once, after_thrice);
    }

    #[test]
    fn inheritance_cycles_terminate() {
        let mut codebase = CodeBase::empty();
        let a = add_class_named(&mut codebase, "\\A");
        let b = add_class_named(&mut codebase, "\\B");
        codebase.get_class_by_fqsen_mut(a).unwrap().parent = Some(b);
        codebase.get_class_by_fqsen_mut(b).unwrap().parent = Some(a);
        codebase.hydrate(a);
    }

    #[test]
    fn own_declaration_wins_and_is_marked_override() {
        let mut codebase = CodeBase::empty();
        let parent = add_class_named(&mut codebase, "\\Base");
        codebase.add_method(Method::new(
            MethodFqsen::new(parent, Atom::new("run")),
            file(),
            3,
            ElementFlags::empty(),
        ));
        let child = add_class_named(&mut codebase, "\\Child");
        codebase.get_class_by_fqsen_mut(child).unwrap().parent = Some(parent);
        codebase.add_method(Method::new(
            MethodFqsen::new(child, Atom::new("run")),
            file(),
            9,
            ElementFlags::empty(),
        ));

        codebase.hydrate(child);
        let method = codebase
            .get_method_by_fqsen(MethodFqsen::new(child, Atom::new("run")))
            .unwrap();
        assert_eq!(method.line, 9);
        assert!(method.flags.contains(ElementFlags::OVERRIDE));
    }

    #[test]
    fn template_parameters_rewrite_imported_types() {
        let mut codebase = CodeBase::empty();
        let parent = add_class_named(&mut codebase, "\\Container");
        {
            let class = codebase.get_class_by_fqsen_mut(parent).unwrap();
            class.template_types = vec![Atom::new("T")];
        }
        let mut getter = Method::new(
            MethodFqsen::new(parent, Atom::new("first")),
            file(),
            2,
            ElementFlags::empty(),
        );
        getter.union_type = UnionType::of(Type::Template(Atom::new("T")));
        let mut setter_param = Parameter::new(
            Atom::new("value"),
            UnionType::of(Type::Template(Atom::new("T"))),
            3,
        );
        setter_param.line = 3;
        let mut setter = Method::new(
            MethodFqsen::new(parent, Atom::new("push")),
            file(),
            3,
            ElementFlags::empty(),
        );
        setter.parameters = vec![setter_param];
        setter.recount_parameters();
        codebase.add_method(getter);
        codebase.add_method(setter);

        let child = add_class_named(&mut codebase, "\\IntContainer");
        {
            let class = codebase.get_class_by_fqsen_mut(child).unwrap();
            class.parent = Some(parent);
            class.inherited_type = Some(UnionType::of(Type::ClassInstance {
                fqsen: parent,
                params: vec![UnionType::of(Type::INT)],
            }));
        }

        codebase.hydrate(child);
        let first = codebase
            .get_method_by_fqsen(MethodFqsen::new(child, Atom::new("first")))
            .unwrap();
        assert_eq!(first.union_type, UnionType::of(Type::INT));
        let push = codebase
            .get_method_by_fqsen(MethodFqsen::new(child, Atom::new("push")))
            .unwrap();
        assert_eq!(push.parameters[0].union_type, UnionType::of(Type::INT));
        // The substrate is untouched.
        let original = codebase
            .get_method_by_fqsen(MethodFqsen::new(parent, Atom::new("first")))
            .unwrap();
        assert!(original.union_type.has_template_type());
    }

    #[test]
    fn class_constant_is_injected() {
        let mut codebase = CodeBase::empty();
        let fqsen = add_class_named(&mut codebase, "\\A");
        codebase.hydrate(fqsen);
        let constant = codebase
            .get_class_constant_by_fqsen(ClassConstFqsen::new(fqsen, Atom::new("class")))
            .unwrap();
        assert_eq!(constant.union_type, UnionType::of(Type::STRING));
    }

    #[test]
    fn yield_methods_become_generators() {
        let mut codebase = CodeBase::empty();
        let fqsen = add_class_named(&mut codebase, "\\A");
        let mut method = Method::new(
            MethodFqsen::new(fqsen, Atom::new("items")),
            file(),
            2,
            ElementFlags::YIELDS,
        );
        method.union_type = UnionType::of(Type::INT);
        codebase.add_method(method);
        codebase.hydrate(fqsen);
        let method = codebase
            .get_method_by_fqsen(MethodFqsen::new(fqsen, Atom::new("items")))
            .unwrap();
        assert_eq!(method.union_type, UnionType::of(generator_type()));
    }

    #[test]
    fn conflicting_trait_properties_report_composition() {
        let mut codebase = CodeBase::empty();
        let trait_a = add_class_named(&mut codebase, "\\TraitA");
        let trait_b = add_class_named(&mut codebase, "\\TraitB");
        add_property_typed(&mut codebase, trait_a, "shared", Type::INT);
        add_property_typed(&mut codebase, trait_b, "shared", Type::STRING);

        let user = add_class_named(&mut codebase, "\\User");
        codebase.get_class_by_fqsen_mut(user).unwrap().traits = vec![trait_a, trait_b];

        let issues = codebase.hydrate(user);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue.name, "PhanIncompatibleCompositionProp");
        // Earliest definition wins.
        let winner = codebase
            .get_property_by_fqsen(PropertyFqsen::new(user, Atom::new("shared")))
            .unwrap();
        assert_eq!(winner.union_type, UnionType::of(Type::INT));
    }
}
