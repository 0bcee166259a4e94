//! Fully qualified structural element names.
//!
//! An FQSEN is the canonical identifier of a class, function, global
//! constant, method, property or class constant. All name parts are
//! interned [`Atom`]s, so FQSENs are small `Copy` values whose equality
//! and hashing cost two or three integer compares - the map-keying role
//! the source language fills with interned, reference-equal objects.
//!
//! PHP class, function and method names are case-insensitive; the
//! `canonical` accessors produce the lowercased key used for lookups
//! while the stored atoms preserve the declared spelling for display.

use phast_common::Atom;
use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

fn split_full_name(full: &str) -> (Atom, Atom) {
    let trimmed = full.trim_start_matches('\\');
    match trimmed.rfind('\\') {
        Some(pos) => (Atom::new(&trimmed[..pos]), Atom::new(&trimmed[pos + 1..])),
        None => (Atom::empty(), Atom::new(trimmed)),
    }
}

fn write_global(f: &mut fmt::Formatter<'_>, namespace: Atom, name: Atom, alt: u32) -> fmt::Result {
    if namespace.is_empty() {
        write!(f, "\\{name}")?;
    } else {
        write!(f, "\\{namespace}\\{name}")?;
    }
    if alt != 0 {
        write!(f, ",{alt}")?;
    }
    Ok(())
}

macro_rules! global_fqsen {
    ($(#[$doc:meta])* $ty:ident, case_insensitive = $ci:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $ty {
            pub namespace: Atom,
            pub name: Atom,
            pub alt: u32,
        }

        impl $ty {
            #[must_use]
            pub fn new(namespace: Atom, name: Atom) -> Self {
                Self { namespace, name, alt: 0 }
            }

            /// Parse a `\Ns\Name` string (leading backslash optional).
            #[must_use]
            pub fn from_full_name(full: &str) -> Self {
                let (namespace, name) = split_full_name(full);
                Self { namespace, name, alt: 0 }
            }

            #[must_use]
            pub fn with_alt(self, alt: u32) -> Self {
                Self { alt, ..self }
            }

            #[must_use]
            pub fn is_alternate(self) -> bool {
                self.alt != 0
            }

            /// The case-normalized lookup key.
            #[must_use]
            pub fn canonical(self) -> (Atom, Atom, u32) {
                if $ci {
                    (self.namespace.to_lowercase(), self.name.to_lowercase(), self.alt)
                } else {
                    (self.namespace.to_lowercase(), self.name, self.alt)
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write_global(f, self.namespace, self.name, self.alt)
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($ty), self)
            }
        }
    };
}

global_fqsen!(
    /// A class, interface or trait name.
    ClassFqsen,
    case_insensitive = true
);
global_fqsen!(
    /// A free function name.
    FunctionFqsen,
    case_insensitive = true
);
global_fqsen!(
    /// A global constant name. Constants are case-sensitive.
    GlobalConstFqsen,
    case_insensitive = false
);

impl FunctionFqsen {
    /// Synthesize the FQSEN of a closure from its declaration site.
    ///
    /// The digest is stable across runs for a given `(file, line)` pair.
    #[must_use]
    pub fn for_closure(file: Atom, line: u32) -> Self {
        let mut hasher = FxHasher::default();
        file.as_str().hash(&mut hasher);
        line.hash(&mut hasher);
        let digest = hasher.finish() as u32;
        Self {
            namespace: Atom::empty(),
            name: Atom::new(&format!("closure_{digest:08x}")),
            alt: 0,
        }
    }
}

macro_rules! member_fqsen {
    ($(#[$doc:meta])* $ty:ident, case_insensitive = $ci:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $ty {
            pub class: ClassFqsen,
            pub name: Atom,
            pub alt: u32,
        }

        impl $ty {
            #[must_use]
            pub fn new(class: ClassFqsen, name: Atom) -> Self {
                Self { class, name, alt: 0 }
            }

            /// The same member name on a different class; used when
            /// hydration retargets an inherited member.
            #[must_use]
            pub fn with_class(self, class: ClassFqsen) -> Self {
                Self { class, ..self }
            }

            /// The case-normalized lookup key for the member name.
            #[must_use]
            pub fn canonical_name(self) -> Atom {
                if $ci { self.name.to_lowercase() } else { self.name }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}::{}", self.class, self.name)?;
                if self.alt != 0 {
                    write!(f, ",{}", self.alt)?;
                }
                Ok(())
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($ty), self)
            }
        }
    };
}

member_fqsen!(
    /// A method on a class.
    MethodFqsen,
    case_insensitive = true
);
member_fqsen!(
    /// A property on a class. Property names are case-sensitive.
    PropertyFqsen,
    case_insensitive = false
);
member_fqsen!(
    /// A class constant. Constant names are case-sensitive.
    ClassConstFqsen,
    case_insensitive = false
);

/// Any FQSEN, for heterogeneous reference tracking.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Fqsen {
    Class(ClassFqsen),
    Function(FunctionFqsen),
    GlobalConst(GlobalConstFqsen),
    Method(MethodFqsen),
    Property(PropertyFqsen),
    ClassConst(ClassConstFqsen),
}

impl fmt::Display for Fqsen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fqsen::Class(x) => x.fmt(f),
            Fqsen::Function(x) => x.fmt(f),
            Fqsen::GlobalConst(x) => x.fmt(f),
            Fqsen::Method(x) => x.fmt(f),
            Fqsen::Property(x) => x.fmt(f),
            Fqsen::ClassConst(x) => x.fmt(f),
        }
    }
}

/// The FQSEN of the function-like whose body is being analyzed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FunctionLikeFqsen {
    Function(FunctionFqsen),
    Method(MethodFqsen),
}

impl fmt::Display for FunctionLikeFqsen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionLikeFqsen::Function(x) => x.fmt(f),
            FunctionLikeFqsen::Method(x) => x.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        let class = ClassFqsen::from_full_name("\\Ns\\Name");
        assert_eq!(class.to_string(), "\\Ns\\Name");
        assert_eq!(class.with_alt(2).to_string(), "\\Ns\\Name,2");

        let global = ClassFqsen::from_full_name("Foo");
        assert_eq!(global.to_string(), "\\Foo");

        let method = MethodFqsen::new(class, Atom::new("bar"));
        assert_eq!(method.to_string(), "\\Ns\\Name::bar");
    }

    #[test]
    fn equal_names_are_equal_values() {
        let a = ClassFqsen::from_full_name("\\A\\B");
        let b = ClassFqsen::new(Atom::new("A"), Atom::new("B"));
        assert_eq!(a, b);
    }

    #[test]
    fn canonical_key_is_case_insensitive_for_classes() {
        let a = ClassFqsen::from_full_name("\\Ns\\Foo");
        let b = ClassFqsen::from_full_name("\\ns\\FOO");
        assert_ne!(a, b);
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn constants_stay_case_sensitive() {
        let a = GlobalConstFqsen::from_full_name("\\FOO");
        let b = GlobalConstFqsen::from_full_name("\\foo");
        assert_ne!(a.canonical(), b.canonical());
    }

    #[test]
    fn closure_digest_is_stable() {
        let file = Atom::new("src/a.php");
        let one = FunctionFqsen::for_closure(file, 10);
        let two = FunctionFqsen::for_closure(file, 10);
        let other = FunctionFqsen::for_closure(file, 11);
        assert_eq!(one, two);
        assert_ne!(one, other);
        assert!(one.name.as_str().starts_with("closure_"));
    }
}
