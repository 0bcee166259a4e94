//! The atomic `Type`.

use crate::fqsen::{ClassFqsen, FunctionFqsen};
use crate::union::UnionType;
use phast_ast::Child;
use phast_common::Atom;
use std::fmt;

/// The built-in native types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NativeType {
    Array,
    Bool,
    Callable,
    Float,
    Int,
    Null,
    Object,
    String,
    Mixed,
    Void,
    Resource,
    /// Late static binding: the called class.
    Static,
}

impl NativeType {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "array" => Self::Array,
            "bool" | "boolean" => Self::Bool,
            "callable" => Self::Callable,
            "float" | "double" => Self::Float,
            "int" | "integer" => Self::Int,
            "null" => Self::Null,
            "object" => Self::Object,
            "string" => Self::String,
            "mixed" => Self::Mixed,
            "void" => Self::Void,
            "resource" => Self::Resource,
            "static" => Self::Static,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Bool => "bool",
            Self::Callable => "callable",
            Self::Float => "float",
            Self::Int => "int",
            Self::Null => "null",
            Self::Object => "object",
            Self::String => "string",
            Self::Mixed => "mixed",
            Self::Void => "void",
            Self::Resource => "resource",
            Self::Static => "static",
        }
    }

    /// Scalars coerce to string in non-strict mode.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        matches!(self, Self::Bool | Self::Float | Self::Int | Self::String)
    }
}

/// An atomic type. Two types compare equal by structural deep equality.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Native(NativeType),
    /// An instance of a class, optionally with concrete template
    /// parameters (`Container<int>`).
    ClassInstance {
        fqsen: ClassFqsen,
        params: Vec<UnionType>,
    },
    /// `T[]`.
    GenericArray(Box<Type>),
    /// A callable bound to a known closure.
    Callable(FunctionFqsen),
    /// A `@template` type parameter.
    Template(Atom),
}

impl Type {
    pub const ARRAY: Type = Type::Native(NativeType::Array);
    pub const BOOL: Type = Type::Native(NativeType::Bool);
    pub const FLOAT: Type = Type::Native(NativeType::Float);
    pub const INT: Type = Type::Native(NativeType::Int);
    pub const NULL: Type = Type::Native(NativeType::Null);
    pub const OBJECT: Type = Type::Native(NativeType::Object);
    pub const STRING: Type = Type::Native(NativeType::String);
    pub const MIXED: Type = Type::Native(NativeType::Mixed);
    pub const VOID: Type = Type::Native(NativeType::Void);
    pub const STATIC: Type = Type::Native(NativeType::Static);

    #[must_use]
    pub fn class(fqsen: ClassFqsen) -> Self {
        Type::ClassInstance {
            fqsen,
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn generic_array_of(element: Type) -> Self {
        Type::GenericArray(Box::new(element))
    }

    /// Lift an AST literal to its native type.
    #[must_use]
    pub fn from_literal(child: &Child) -> Option<Self> {
        match child {
            Child::Int(_) => Some(Type::INT),
            Child::Float(_) => Some(Type::FLOAT),
            Child::Str(_) => Some(Type::STRING),
            Child::Bool(_) => Some(Type::BOOL),
            Child::Null => Some(Type::NULL),
            Child::Node(_) => None,
        }
    }

    #[must_use]
    pub fn is_native(&self, native: NativeType) -> bool {
        matches!(self, Type::Native(n) if *n == native)
    }

    /// Array-like: `array` or any `T[]`.
    #[must_use]
    pub fn is_array_like(&self) -> bool {
        matches!(self, Type::GenericArray(_)) || self.is_native(NativeType::Array)
    }

    #[must_use]
    pub fn class_fqsen(&self) -> Option<ClassFqsen> {
        match self {
            Type::ClassInstance { fqsen, .. } => Some(*fqsen),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Native(native) => f.write_str(native.name()),
            Type::ClassInstance { fqsen, params } => {
                write!(f, "{fqsen}")?;
                if !params.is_empty() {
                    write!(f, "<")?;
                    for (i, param) in params.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{param}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::GenericArray(element) => write!(f, "{element}[]"),
            Type::Callable(fqsen) => write!(f, "callable({fqsen})"),
            Type::Template(id) => f.write_str(id.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_names_round_trip() {
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
            assert_eq!(NativeType::from_name(native.name()), Some(native));
        }
        assert_eq!(NativeType::from_name("integer"), Some(NativeType::Int));
        assert_eq!(NativeType::from_name("Foo"), None);
    }

    #[test]
    fn literal_lifting() {
        assert_eq!(Type::from_literal(&Child::Int(3)), Some(Type::INT));
        assert_eq!(Type::from_literal(&Child::Str("x".into())), Some(Type::STRING));
        assert_eq!(Type::from_literal(&Child::Null), Some(Type::NULL));
    }

    #[test]
    fn display_forms() {
        let class = ClassFqsen::from_full_name("\\Ns\\Box");
        assert_eq!(Type::class(class).to_string(), "\\Ns\\Box");
        assert_eq!(Type::generic_array_of(Type::INT).to_string(), "int[]");
        assert_eq!(
            Type::generic_array_of(Type::generic_array_of(Type::STRING)).to_string(),
            "string[][]"
        );
    }

    #[test]
    fn structural_equality() {
        let a = Type::generic_array_of(Type::class(ClassFqsen::from_full_name("\\A")));
        let b = Type::generic_array_of(Type::class(ClassFqsen::from_full_name("\\A")));
        assert_eq!(a, b);
    }
}
