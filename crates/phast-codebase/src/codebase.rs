//! The `CodeBase` registry.
//!
//! The authoritative, mutable map from FQSEN to element. Classes,
//! functions and global constants key on their canonical (lowercased
//! where case-insensitive) name triple; class members key on the class
//! triple plus the member name. Re-adding a colliding FQSEN bumps the
//! newcomer's alternate id and records the redefinition for the
//! duplicate analyzer.

use crate::element::{
    Class, ClassConstant, Func, GlobalConstant, Location, Method, Property,
};
use crate::signatures;
use phast_common::Atom;
use phast_types::{
    ClassConstFqsen, ClassFqsen, ClassHierarchy, Fqsen, FunctionFqsen, GlobalConstFqsen,
    MethodFqsen, PropertyFqsen,
};
use rustc_hash::FxHashMap;
use std::fmt;
use tracing::debug;

/// A requested FQSEN was absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MissingSymbol(pub Fqsen);

impl fmt::Display for MissingSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing symbol {}", self.0)
    }
}

impl std::error::Error for MissingSymbol {}

/// A recorded collision, reported later by the duplicate analyzer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedefineRecord {
    Class {
        new: ClassFqsen,
        previous: ClassFqsen,
    },
    Function {
        new: FunctionFqsen,
        previous: FunctionFqsen,
        previous_is_internal: bool,
    },
}

type ClassKey = (Atom, Atom, u32);
type MemberMap<T> = FxHashMap<Atom, T>;

#[derive(Clone, Default)]
pub struct CodeBase {
    classes: FxHashMap<ClassKey, Class>,
    functions: FxHashMap<ClassKey, Func>,
    global_constants: FxHashMap<ClassKey, GlobalConstant>,
    methods: FxHashMap<ClassKey, MemberMap<Method>>,
    properties: FxHashMap<ClassKey, MemberMap<Property>>,
    class_constants: FxHashMap<ClassKey, MemberMap<ClassConstant>>,
    redefine_records: Vec<RedefineRecord>,
}

fn class_key(fqsen: ClassFqsen) -> ClassKey {
    fqsen.canonical()
}

impl CodeBase {
    /// An empty registry with no internal symbols. Tests use this.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry seeded with the bundled builtin signature map and the
    /// always-available internal classes.
    #[must_use]
    pub fn new() -> Self {
        let mut codebase = Self::default();
        signatures::seed(&mut codebase);
        codebase
    }

    // ==================== Classes ====================

    /// Insert a class. Re-adding the declaration already stored under
    /// the FQSEN is a no-op; a genuine collision bumps the newcomer's
    /// alternate id until free and records the redefinition. Returns
    /// the FQSEN the class landed under.
    pub fn add_class(&mut self, mut class: Class) -> ClassFqsen {
        let mut fqsen = class.fqsen;
        if let Some(existing) = self.classes.get(&class_key(fqsen)) {
            if existing.file == class.file && existing.line == class.line {
                return fqsen;
            }
            let previous = fqsen;
            let mut alt = fqsen.alt + 1;
            while self.classes.contains_key(&class_key(fqsen.with_alt(alt))) {
                alt += 1;
            }
            fqsen = fqsen.with_alt(alt);
            class.fqsen = fqsen;
            debug!(class = %fqsen, "class redefinition, bumped alternate id");
            self.redefine_records.push(RedefineRecord::Class {
                new: fqsen,
                previous,
            });
        }
        self.classes.insert(class_key(fqsen), class);
        fqsen
    }

    #[must_use]
    pub fn has_class_with_fqsen(&self, fqsen: ClassFqsen) -> bool {
        self.classes.contains_key(&class_key(fqsen))
    }

    pub fn get_class_by_fqsen(&self, fqsen: ClassFqsen) -> Result<&Class, MissingSymbol> {
        self.classes
            .get(&class_key(fqsen))
            .ok_or(MissingSymbol(Fqsen::Class(fqsen)))
    }

    pub fn get_class_by_fqsen_mut(
        &mut self,
        fqsen: ClassFqsen,
    ) -> Result<&mut Class, MissingSymbol> {
        self.classes
            .get_mut(&class_key(fqsen))
            .ok_or(MissingSymbol(Fqsen::Class(fqsen)))
    }

    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.values()
    }

    #[must_use]
    pub fn class_fqsens(&self) -> Vec<ClassFqsen> {
        self.classes.values().map(|c| c.fqsen).collect()
    }

    // ==================== Methods ====================

    pub fn add_method(&mut self, method: Method) {
        self.methods
            .entry(class_key(method.fqsen.class))
            .or_default()
            .insert(method.fqsen.canonical_name(), method);
    }

    #[must_use]
    pub fn has_method_with_fqsen(&self, fqsen: MethodFqsen) -> bool {
        self.methods
            .get(&class_key(fqsen.class))
            .is_some_and(|map| map.contains_key(&fqsen.canonical_name()))
    }

    pub fn get_method_by_fqsen(&self, fqsen: MethodFqsen) -> Result<&Method, MissingSymbol> {
        self.methods
            .get(&class_key(fqsen.class))
            .and_then(|map| map.get(&fqsen.canonical_name()))
            .ok_or(MissingSymbol(Fqsen::Method(fqsen)))
    }

    pub fn get_method_by_fqsen_mut(
        &mut self,
        fqsen: MethodFqsen,
    ) -> Result<&mut Method, MissingSymbol> {
        self.methods
            .get_mut(&class_key(fqsen.class))
            .and_then(|map| map.get_mut(&fqsen.canonical_name()))
            .ok_or(MissingSymbol(Fqsen::Method(fqsen)))
    }

    pub fn methods_for_class(&self, class: ClassFqsen) -> impl Iterator<Item = &Method> {
        self.methods
            .get(&class_key(class))
            .into_iter()
            .flat_map(|map| map.values())
    }

    // ==================== Properties ====================

    pub fn add_property(&mut self, property: Property) {
        self.properties
            .entry(class_key(property.fqsen.class))
            .or_default()
            .insert(property.fqsen.canonical_name(), property);
    }

    #[must_use]
    pub fn has_property_with_fqsen(&self, fqsen: PropertyFqsen) -> bool {
        self.properties
            .get(&class_key(fqsen.class))
            .is_some_and(|map| map.contains_key(&fqsen.canonical_name()))
    }

    pub fn get_property_by_fqsen(&self, fqsen: PropertyFqsen) -> Result<&Property, MissingSymbol> {
        self.properties
            .get(&class_key(fqsen.class))
            .and_then(|map| map.get(&fqsen.canonical_name()))
            .ok_or(MissingSymbol(Fqsen::Property(fqsen)))
    }

    pub fn get_property_by_fqsen_mut(
        &mut self,
        fqsen: PropertyFqsen,
    ) -> Result<&mut Property, MissingSymbol> {
        self.properties
            .get_mut(&class_key(fqsen.class))
            .and_then(|map| map.get_mut(&fqsen.canonical_name()))
            .ok_or(MissingSymbol(Fqsen::Property(fqsen)))
    }

    pub fn properties_for_class(&self, class: ClassFqsen) -> impl Iterator<Item = &Property> {
        self.properties
            .get(&class_key(class))
            .into_iter()
            .flat_map(|map| map.values())
    }

    // ==================== Class constants ====================

    pub fn add_class_constant(&mut self, constant: ClassConstant) {
        self.class_constants
            .entry(class_key(constant.fqsen.class))
            .or_default()
            .insert(constant.fqsen.canonical_name(), constant);
    }

    #[must_use]
    pub fn has_class_constant_with_fqsen(&self, fqsen: ClassConstFqsen) -> bool {
        self.class_constants
            .get(&class_key(fqsen.class))
            .is_some_and(|map| map.contains_key(&fqsen.canonical_name()))
    }

    pub fn get_class_constant_by_fqsen(
        &self,
        fqsen: ClassConstFqsen,
    ) -> Result<&ClassConstant, MissingSymbol> {
        self.class_constants
            .get(&class_key(fqsen.class))
            .and_then(|map| map.get(&fqsen.canonical_name()))
            .ok_or(MissingSymbol(Fqsen::ClassConst(fqsen)))
    }

    pub fn class_constants_for_class(
        &self,
        class: ClassFqsen,
    ) -> impl Iterator<Item = &ClassConstant> {
        self.class_constants
            .get(&class_key(class))
            .into_iter()
            .flat_map(|map| map.values())
    }

    // ==================== Functions ====================

    /// Insert a function, bumping the alternate id on collision. Internal
    /// signature alternates collide silently; source redefinitions are
    /// recorded.
    pub fn add_function(&mut self, mut func: Func) -> FunctionFqsen {
        let mut fqsen = func.fqsen;
        if let Some(previous) = self.functions.get(&class_key_fn(fqsen)) {
            let previous_fqsen = previous.fqsen;
            let previous_is_internal = previous.is_internal();
            let mut alt = fqsen.alt + 1;
            while self.functions.contains_key(&class_key_fn(fqsen.with_alt(alt))) {
                alt += 1;
            }
            fqsen = fqsen.with_alt(alt);
            func.fqsen = fqsen;
            if !func.is_internal() {
                self.redefine_records.push(RedefineRecord::Function {
                    new: fqsen,
                    previous: previous_fqsen,
                    previous_is_internal,
                });
            }
        }
        self.functions.insert(class_key_fn(fqsen), func);
        fqsen
    }

    #[must_use]
    pub fn has_function_with_fqsen(&self, fqsen: FunctionFqsen) -> bool {
        self.functions.contains_key(&class_key_fn(fqsen))
    }

    pub fn get_function_by_fqsen(&self, fqsen: FunctionFqsen) -> Result<&Func, MissingSymbol> {
        self.functions
            .get(&class_key_fn(fqsen))
            .ok_or(MissingSymbol(Fqsen::Function(fqsen)))
    }

    pub fn get_function_by_fqsen_mut(
        &mut self,
        fqsen: FunctionFqsen,
    ) -> Result<&mut Func, MissingSymbol> {
        self.functions
            .get_mut(&class_key_fn(fqsen))
            .ok_or(MissingSymbol(Fqsen::Function(fqsen)))
    }

    /// The function and all its overload alternates, lowest alt first.
    #[must_use]
    pub fn get_function_alternates(&self, fqsen: FunctionFqsen) -> Vec<&Func> {
        let mut out = Vec::new();
        let mut alt = 0;
        loop {
            match self.functions.get(&class_key_fn(fqsen.with_alt(alt))) {
                Some(func) => out.push(func),
                None => break,
            }
            alt += 1;
        }
        out
    }

    pub fn functions(&self) -> impl Iterator<Item = &Func> {
        self.functions.values()
    }

    // ==================== Global constants ====================

    pub fn add_global_constant(&mut self, constant: GlobalConstant) -> GlobalConstFqsen {
        let mut fqsen = constant.fqsen;
        let mut constant = constant;
        let mut alt = fqsen.alt;
        while self.global_constants.contains_key(&class_key_const(fqsen.with_alt(alt))) {
            alt += 1;
        }
        fqsen = fqsen.with_alt(alt);
        constant.fqsen = fqsen;
        self.global_constants.insert(class_key_const(fqsen), constant);
        fqsen
    }

    #[must_use]
    pub fn has_global_constant_with_fqsen(&self, fqsen: GlobalConstFqsen) -> bool {
        self.global_constants.contains_key(&class_key_const(fqsen))
    }

    pub fn get_global_constant_by_fqsen(
        &self,
        fqsen: GlobalConstFqsen,
    ) -> Result<&GlobalConstant, MissingSymbol> {
        self.global_constants
            .get(&class_key_const(fqsen))
            .ok_or(MissingSymbol(Fqsen::GlobalConst(fqsen)))
    }

    // ==================== Redefinitions ====================

    #[must_use]
    pub fn redefine_records(&self) -> &[RedefineRecord] {
        &self.redefine_records
    }

    // ==================== References ====================

    /// Record a reference to `fqsen` from `location`. Unknown targets
    /// are ignored; reference counting is best-effort.
    pub fn add_reference(&mut self, fqsen: Fqsen, location: Location) {
        match fqsen {
            Fqsen::Class(f) => {
                if let Ok(class) = self.get_class_by_fqsen_mut(f) {
                    class.add_reference(location);
                }
            }
            Fqsen::Function(f) => {
                if let Ok(func) = self.get_function_by_fqsen_mut(f) {
                    func.add_reference(location);
                }
            }
            Fqsen::Method(f) => {
                if let Ok(method) = self.get_method_by_fqsen_mut(f) {
                    method.add_reference(location);
                }
            }
            Fqsen::Property(f) => {
                if let Ok(property) = self.get_property_by_fqsen_mut(f) {
                    property.add_reference(location);
                }
            }
            Fqsen::ClassConst(f) => {
                if let Some(constant) = self
                    .class_constants
                    .get_mut(&class_key(f.class))
                    .and_then(|map| map.get_mut(&f.canonical_name()))
                {
                    constant.add_reference(location);
                }
            }
            Fqsen::GlobalConst(f) => {
                if let Some(constant) = self.global_constants.get_mut(&class_key_const(f)) {
                    constant.add_reference(location);
                }
            }
        }
    }

    /// A class's reference count including all of its members'.
    #[must_use]
    pub fn class_total_reference_count(&self, fqsen: ClassFqsen) -> usize {
        let own = self
            .get_class_by_fqsen(fqsen)
            .map_or(0, |c| c.references.len());
        let methods: usize = self
            .methods_for_class(fqsen)
            .map(|m| m.references.len())
            .sum();
        let properties: usize = self
            .properties_for_class(fqsen)
            .map(|p| p.references.len())
            .sum();
        let constants: usize = self
            .class_constants_for_class(fqsen)
            .map(|c| c.references.len())
            .sum();
        own + methods + properties + constants
    }
}

fn class_key_fn(fqsen: FunctionFqsen) -> ClassKey {
    fqsen.canonical()
}

fn class_key_const(fqsen: GlobalConstFqsen) -> ClassKey {
    fqsen.canonical()
}

impl ClassHierarchy for CodeBase {
    fn direct_ancestors(&self, class: ClassFqsen) -> Vec<ClassFqsen> {
        self.get_class_by_fqsen(class)
            .map(|c| c.ancestor_fqsens())
            .unwrap_or_default()
    }

    fn has_class(&self, class: ClassFqsen) -> bool {
        self.has_class_with_fqsen(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementFlags;

    fn class(name: &str, line: u32) -> Class {
        Class::new(
            ClassFqsen::from_full_name(name),
            Atom::new("src.php"),
            line,
            ElementFlags::empty(),
        )
    }

    #[test]
    fn added_classes_are_retrievable() {
        let mut codebase = CodeBase::empty();
        let fqsen = codebase.add_class(class("\\A", 1));
        assert!(codebase.has_class_with_fqsen(fqsen));
        assert_eq!(codebase.get_class_by_fqsen(fqsen).unwrap().fqsen, fqsen);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut codebase = CodeBase::empty();
        codebase.add_class(class("\\Ns\\Widget", 1));
        assert!(codebase.has_class_with_fqsen(ClassFqsen::from_full_name("\\ns\\widget")));
    }

    #[test]
    fn readding_the_same_declaration_is_a_no_op() {
        let mut codebase = CodeBase::empty();
        let first = codebase.add_class(class("\\A", 1));
        let again = codebase.add_class(class("\\A", 1));
        assert_eq!(first, again);
        assert_eq!(first.alt, 0);
        assert!(codebase.redefine_records().is_empty());
    }

    #[test]
    fn collisions_bump_alternate_ids() {
        let mut codebase = CodeBase::empty();
        let first = codebase.add_class(class("\\A", 1));
        let second = codebase.add_class(class("\\A", 5));
        let third = codebase.add_class(class("\\A", 9));
        assert_eq!(first.alt, 0);
        assert_eq!(second.alt, 1);
        assert_eq!(third.alt, 2);
        // All three remain independently retrievable.
        assert!(codebase.get_class_by_fqsen(first).is_ok());
        assert!(codebase.get_class_by_fqsen(second).is_ok());
        assert!(codebase.get_class_by_fqsen(third).is_ok());
        assert_eq!(codebase.redefine_records().len(), 2);
    }

    #[test]
    fn missing_lookup_fails_with_the_fqsen() {
        let codebase = CodeBase::empty();
        let fqsen = ClassFqsen::from_full_name("\\Nope");
        let err = codebase.get_class_by_fqsen(fqsen).unwrap_err();
        assert_eq!(err, MissingSymbol(Fqsen::Class(fqsen)));
    }

    #[test]
    fn methods_key_on_class_plus_name() {
        let mut codebase = CodeBase::empty();
        let class_fqsen = codebase.add_class(class("\\A", 1));
        let method_fqsen = MethodFqsen::new(class_fqsen, Atom::new("doThing"));
        codebase.add_method(Method::new(
            method_fqsen,
            Atom::new("src.php"),
            2,
            ElementFlags::empty(),
        ));
        assert!(codebase.has_method_with_fqsen(method_fqsen));
        // Method lookup is case-insensitive.
        assert!(codebase.has_method_with_fqsen(MethodFqsen::new(class_fqsen, Atom::new("dothing"))));
        // Property names are not.
        let prop = PropertyFqsen::new(class_fqsen, Atom::new("Value"));
        codebase.add_property(Property::new(
            prop,
            Atom::new("src.php"),
            3,
            ElementFlags::empty(),
        ));
        assert!(codebase.has_property_with_fqsen(prop));
        assert!(!codebase.has_property_with_fqsen(PropertyFqsen::new(class_fqsen, Atom::new("value"))));
    }

    #[test]
    fn function_alternates_are_enumerable() {
        let mut codebase = CodeBase::empty();
        let fqsen = FunctionFqsen::from_full_name("\\f");
        codebase.add_function(Func::new(fqsen, Atom::new("a.php"), 1, ElementFlags::empty()));
        codebase.add_function(Func::new(fqsen, Atom::new("b.php"), 1, ElementFlags::empty()));
        let alternates = codebase.get_function_alternates(fqsen);
        assert_eq!(alternates.len(), 2);
        assert_eq!(alternates[1].fqsen.alt, 1);
    }

    #[test]
    fn reference_counts_aggregate() {
        let mut codebase = CodeBase::empty();
        let class_fqsen = codebase.add_class(class("\\A", 1));
        let method_fqsen = MethodFqsen::new(class_fqsen, Atom::new("m"));
        codebase.add_method(Method::new(
            method_fqsen,
            Atom::new("src.php"),
            2,
            ElementFlags::empty(),
        ));
        let loc = |line| Location {
            file: Atom::new("use.php"),
            line,
        };
        codebase.add_reference(Fqsen::Class(class_fqsen), loc(1));
        codebase.add_reference(Fqsen::Method(method_fqsen), loc(2));
        codebase.add_reference(Fqsen::Method(method_fqsen), loc(3));
        assert_eq!(codebase.class_total_reference_count(class_fqsen), 3);
    }
}
