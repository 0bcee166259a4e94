//! Structural elements.
//!
//! One struct per element kind, each carrying the common block of
//! name/location/flags/type/references fields directly. Cross-element
//! links are FQSENs, never references; the `CodeBase` owns every element
//! by value.

use bitflags::bitflags;
use phast_common::Atom;
use phast_types::{
    ClassConstFqsen, ClassFqsen, FunctionFqsen, GlobalConstFqsen, MethodFqsen, PropertyFqsen,
    UnionType,
};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

bitflags! {
    /// Modifier and bookkeeping flags shared by the element kinds.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ElementFlags: u32 {
        const PUBLIC        = 1 << 0;
        const PROTECTED     = 1 << 1;
        const PRIVATE       = 1 << 2;
        const STATIC        = 1 << 3;
        const ABSTRACT      = 1 << 4;
        const FINAL         = 1 << 5;
        /// Declared as an interface.
        const INTERFACE     = 1 << 6;
        /// Declared as a trait.
        const TRAIT         = 1 << 7;
        /// Comes from the bundled signature map or seed classes, not
        /// from analyzed source.
        const INTERNAL      = 1 << 8;
        /// Marked `@deprecated`.
        const DEPRECATED    = 1 << 9;
        /// Overrides an ancestor member.
        const OVERRIDE      = 1 << 10;
        /// Function-like whose body contains `yield`.
        const YIELDS        = 1 << 11;
        /// Function-like declared `function &f()`.
        const RETURNS_REF   = 1 << 12;
        /// Property synthesized from `__get` or a dynamic write.
        const DYNAMIC       = 1 << 13;
        /// Constructor whose body calls `parent::__construct()`.
        const CALLS_PARENT_CTOR = 1 << 14;
    }
}

impl ElementFlags {
    #[must_use]
    pub fn is_private(self) -> bool {
        self.contains(Self::PRIVATE)
    }

    #[must_use]
    pub fn is_protected(self) -> bool {
        self.contains(Self::PROTECTED)
    }

    /// Public is the default visibility when no modifier is present.
    #[must_use]
    pub fn is_public(self) -> bool {
        !self.intersects(Self::PRIVATE | Self::PROTECTED)
    }

    /// Ordering key for visibility-narrowing checks: public < protected
    /// < private.
    #[must_use]
    pub fn visibility_rank(self) -> u8 {
        if self.is_private() {
            2
        } else if self.is_protected() {
            1
        } else {
            0
        }
    }
}

/// A source location a reference was recorded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: Atom,
    pub line: u32,
}

/// One formal parameter of a function-like.
#[derive(Clone, Debug)]
pub struct Parameter {
    pub name: Atom,
    /// The effective type: declared signature type unioned with the
    /// doc-comment `@param` type.
    pub union_type: UnionType,
    /// True when a doc comment contributed to `union_type`.
    pub has_doc_type: bool,
    pub is_variadic: bool,
    pub is_by_ref: bool,
    pub has_default: bool,
    pub default_type: UnionType,
    pub line: u32,
}

impl Parameter {
    #[must_use]
    pub fn new(name: Atom, union_type: UnionType, line: u32) -> Self {
        Self {
            name,
            union_type,
            has_doc_type: false,
            is_variadic: false,
            is_by_ref: false,
            has_default: false,
            default_type: UnionType::empty(),
            line,
        }
    }

    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.has_default || self.is_variadic
    }
}

/// A class, interface or trait.
#[derive(Clone, Debug)]
pub struct Class {
    pub fqsen: ClassFqsen,
    pub name: Atom,
    pub file: Atom,
    pub line: u32,
    pub flags: ElementFlags,
    pub parent: Option<ClassFqsen>,
    pub interfaces: Vec<ClassFqsen>,
    pub traits: Vec<ClassFqsen>,
    /// Ordered `@template` parameter names.
    pub template_types: Vec<Atom>,
    /// The `@inherits` annotation, binding concrete types to the
    /// parent's template parameters.
    pub inherited_type: Option<UnionType>,
    pub suppressions: SmallVec<[Atom; 2]>,
    pub references: FxHashSet<Location>,
    pub is_hydrated: bool,
}

impl Class {
    #[must_use]
    pub fn new(fqsen: ClassFqsen, file: Atom, line: u32, flags: ElementFlags) -> Self {
        Self {
            fqsen,
            name: fqsen.name,
            file,
            line,
            flags,
            parent: None,
            interfaces: Vec::new(),
            traits: Vec::new(),
            template_types: Vec::new(),
            inherited_type: None,
            suppressions: SmallVec::new(),
            references: FxHashSet::default(),
            is_hydrated: false,
        }
    }

    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flags.contains(ElementFlags::INTERFACE)
    }

    #[must_use]
    pub fn is_trait(&self) -> bool {
        self.flags.contains(ElementFlags::TRAIT)
    }

    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags.contains(ElementFlags::ABSTRACT)
    }

    #[must_use]
    pub fn is_generic(&self) -> bool {
        !self.template_types.is_empty()
    }

    /// Every recorded direct ancestor, in hydration order: interfaces,
    /// traits, parent.
    #[must_use]
    pub fn ancestor_fqsens(&self) -> Vec<ClassFqsen> {
        let mut out = self.interfaces.clone();
        out.extend(self.traits.iter().copied());
        out.extend(self.parent);
        out
    }

    pub fn add_reference(&mut self, location: Location) {
        self.references.insert(location);
    }

    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        if self.is_interface() {
            "Interface"
        } else if self.is_trait() {
            "Trait"
        } else {
            "Class"
        }
    }
}

/// A method on a class.
#[derive(Clone, Debug)]
pub struct Method {
    pub fqsen: MethodFqsen,
    /// Where the method was first declared; differs from `fqsen` for
    /// hydrated copies.
    pub defining_fqsen: MethodFqsen,
    pub name: Atom,
    pub file: Atom,
    pub line: u32,
    pub flags: ElementFlags,
    /// The return type.
    pub union_type: UnionType,
    pub parameters: Vec<Parameter>,
    pub required_param_count: usize,
    pub optional_param_count: usize,
    pub suppressions: SmallVec<[Atom; 2]>,
    pub references: FxHashSet<Location>,
}

impl Method {
    #[must_use]
    pub fn new(fqsen: MethodFqsen, file: Atom, line: u32, flags: ElementFlags) -> Self {
        Self {
            fqsen,
            defining_fqsen: fqsen,
            name: fqsen.name,
            file,
            line,
            flags,
            union_type: UnionType::empty(),
            parameters: Vec::new(),
            required_param_count: 0,
            optional_param_count: 0,
            suppressions: SmallVec::new(),
            references: FxHashSet::default(),
        }
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(ElementFlags::STATIC)
    }

    #[must_use]
    pub fn is_variadic(&self) -> bool {
        self.parameters.iter().any(|p| p.is_variadic)
    }

    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.fqsen.canonical_name() == Atom::new("__construct")
    }

    pub fn recount_parameters(&mut self) {
        self.required_param_count = self.parameters.iter().filter(|p| !p.is_optional()).count();
        self.optional_param_count = self.parameters.len() - self.required_param_count;
    }

    pub fn add_reference(&mut self, location: Location) {
        self.references.insert(location);
    }
}

/// A free function or closure.
#[derive(Clone, Debug)]
pub struct Func {
    pub fqsen: FunctionFqsen,
    pub name: Atom,
    pub file: Atom,
    pub line: u32,
    pub flags: ElementFlags,
    /// The return type.
    pub union_type: UnionType,
    pub parameters: Vec<Parameter>,
    pub required_param_count: usize,
    pub optional_param_count: usize,
    pub suppressions: SmallVec<[Atom; 2]>,
    pub references: FxHashSet<Location>,
}

impl Func {
    #[must_use]
    pub fn new(fqsen: FunctionFqsen, file: Atom, line: u32, flags: ElementFlags) -> Self {
        Self {
            fqsen,
            name: fqsen.name,
            file,
            line,
            flags,
            union_type: UnionType::empty(),
            parameters: Vec::new(),
            required_param_count: 0,
            optional_param_count: 0,
            suppressions: SmallVec::new(),
            references: FxHashSet::default(),
        }
    }

    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.flags.contains(ElementFlags::INTERNAL)
    }

    #[must_use]
    pub fn is_variadic(&self) -> bool {
        self.parameters.iter().any(|p| p.is_variadic)
    }

    pub fn recount_parameters(&mut self) {
        self.required_param_count = self.parameters.iter().filter(|p| !p.is_optional()).count();
        self.optional_param_count = self.parameters.len() - self.required_param_count;
    }

    pub fn add_reference(&mut self, location: Location) {
        self.references.insert(location);
    }
}

/// A property on a class.
#[derive(Clone, Debug)]
pub struct Property {
    pub fqsen: PropertyFqsen,
    pub defining_fqsen: PropertyFqsen,
    pub name: Atom,
    pub file: Atom,
    pub line: u32,
    pub flags: ElementFlags,
    pub union_type: UnionType,
    pub suppressions: SmallVec<[Atom; 2]>,
    pub references: FxHashSet<Location>,
}

impl Property {
    #[must_use]
    pub fn new(fqsen: PropertyFqsen, file: Atom, line: u32, flags: ElementFlags) -> Self {
        Self {
            fqsen,
            defining_fqsen: fqsen,
            name: fqsen.name,
            file,
            line,
            flags,
            union_type: UnionType::empty(),
            suppressions: SmallVec::new(),
            references: FxHashSet::default(),
        }
    }

    pub fn add_reference(&mut self, location: Location) {
        self.references.insert(location);
    }
}

/// A class constant.
#[derive(Clone, Debug)]
pub struct ClassConstant {
    pub fqsen: ClassConstFqsen,
    pub defining_fqsen: ClassConstFqsen,
    pub name: Atom,
    pub file: Atom,
    pub line: u32,
    pub flags: ElementFlags,
    pub union_type: UnionType,
    pub suppressions: SmallVec<[Atom; 2]>,
    pub references: FxHashSet<Location>,
}

impl ClassConstant {
    #[must_use]
    pub fn new(fqsen: ClassConstFqsen, file: Atom, line: u32, flags: ElementFlags) -> Self {
        Self {
            fqsen,
            defining_fqsen: fqsen,
            name: fqsen.name,
            file,
            line,
            flags,
            union_type: UnionType::empty(),
            suppressions: SmallVec::new(),
            references: FxHashSet::default(),
        }
    }

    pub fn add_reference(&mut self, location: Location) {
        self.references.insert(location);
    }
}

/// A global constant.
#[derive(Clone, Debug)]
pub struct GlobalConstant {
    pub fqsen: GlobalConstFqsen,
    pub name: Atom,
    pub file: Atom,
    pub line: u32,
    pub flags: ElementFlags,
    pub union_type: UnionType,
    pub references: FxHashSet<Location>,
}

impl GlobalConstant {
    #[must_use]
    pub fn new(fqsen: GlobalConstFqsen, file: Atom, line: u32, flags: ElementFlags) -> Self {
        Self {
            fqsen,
            name: fqsen.name,
            file,
            line,
            flags,
            union_type: UnionType::empty(),
            references: FxHashSet::default(),
        }
    }

    pub fn add_reference(&mut self, location: Location) {
        self.references.insert(location);
    }
}
