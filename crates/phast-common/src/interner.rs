//! String interning for identifier deduplication.
//!
//! Every name the analyzer touches (namespaces, class names, member names,
//! variable names, file paths) is interned into a process-wide table. The
//! resulting [`Atom`] is a `Copy` token whose equality and hash are O(1),
//! which makes FQSENs cheap composite map keys.

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::sync::{OnceLock, RwLock};

/// An interned string.
///
/// Two `Atom`s compare equal iff they were interned from equal strings.
/// The backing storage lives for the whole process, so `as_str` hands out
/// a `&'static str`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom(u32);

impl Atom {
    /// Intern `s` in the global table.
    pub fn new(s: &str) -> Self {
        global().intern(s)
    }

    /// The empty atom.
    pub fn empty() -> Self {
        global().intern("")
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        global().resolve(self)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.as_str().is_empty()
    }

    /// Intern the ASCII-lowercased form. PHP class, function and method
    /// names are case-insensitive; lookups key on this.
    #[must_use]
    pub fn to_lowercase(self) -> Self {
        let s = self.as_str();
        if s.chars().all(|c| !c.is_ascii_uppercase()) {
            return self;
        }
        Self::new(&s.to_ascii_lowercase())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({:?})", self.as_str())
    }
}

impl From<&str> for Atom {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Process-wide intern table.
///
/// Lookup goes through a sharded concurrent map; resolution indexes a
/// grow-only vector of leaked strings.
pub struct Interner {
    map: DashMap<&'static str, u32, FxBuildHasher>,
    strings: RwLock<Vec<&'static str>>,
}

impl Interner {
    fn new() -> Self {
        Self {
            map: DashMap::with_hasher(FxBuildHasher::default()),
            strings: RwLock::new(Vec::with_capacity(1024)),
        }
    }

    fn intern(&self, s: &str) -> Atom {
        if let Some(id) = self.map.get(s) {
            return Atom(*id);
        }
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let mut strings = self.strings.write().unwrap_or_else(|e| e.into_inner());
        // Re-check under the write lock: another thread may have interned
        // the same string between the map probe and here.
        if let Some(id) = self.map.get(leaked) {
            return Atom(*id);
        }
        let id = u32::try_from(strings.len()).expect("interner overflow");
        strings.push(leaked);
        self.map.insert(leaked, id);
        Atom(id)
    }

    fn resolve(&self, atom: Atom) -> &'static str {
        let strings = self.strings.read().unwrap_or_else(|e| e.into_inner());
        strings[atom.0 as usize]
    }
}

fn global() -> &'static Interner {
    static GLOBAL: OnceLock<Interner> = OnceLock::new();
    GLOBAL.get_or_init(Interner::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let a = Atom::new("Foo");
        let b = Atom::new("Foo");
        let c = Atom::new("Bar");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str(), "Foo");
    }

    #[test]
    fn lowercasing_reinterns() {
        let mixed = Atom::new("MyClass");
        let lower = mixed.to_lowercase();
        assert_eq!(lower.as_str(), "myclass");
        assert_eq!(lower, Atom::new("myclass"));
        // Already-lowercase atoms come back unchanged.
        assert_eq!(lower.to_lowercase(), lower);
    }

    #[test]
    fn empty_atom() {
        assert!(Atom::empty().is_empty());
        assert_eq!(Atom::empty(), Atom::new(""));
    }
}
