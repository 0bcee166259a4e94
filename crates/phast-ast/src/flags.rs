//! Per-kind interpretations of the node flag word.
//!
//! Flags are plain `u32` constants rather than typed bitflags because the
//! same word is reused with a different meaning per node kind, exactly as
//! the embedding parser produces it.

/// `Kind::Class` flags.
pub mod class_flags {
    pub const CLASS_ABSTRACT: u32 = 1 << 4;
    pub const CLASS_FINAL: u32 = 1 << 5;
    pub const CLASS_INTERFACE: u32 = 1 << 6;
    pub const CLASS_TRAIT: u32 = 1 << 7;
}

/// Member and function modifier flags (`Kind::Method`, `Kind::PropGroup`,
/// `Kind::ClassConstDecl`).
pub mod modifier_flags {
    pub const MODIFIER_PUBLIC: u32 = 1 << 8;
    pub const MODIFIER_PROTECTED: u32 = 1 << 9;
    pub const MODIFIER_PRIVATE: u32 = 1 << 10;
    pub const MODIFIER_STATIC: u32 = 1 << 11;
    pub const MODIFIER_ABSTRACT: u32 = 1 << 12;
    pub const MODIFIER_FINAL: u32 = 1 << 13;
    /// The function-like returns by reference.
    pub const RETURNS_REF: u32 = 1 << 14;

    pub const VISIBILITY_MASK: u32 = MODIFIER_PUBLIC | MODIFIER_PROTECTED | MODIFIER_PRIVATE;
}

/// `Kind::Param` flags.
pub mod param_flags {
    pub const PARAM_REF: u32 = 1 << 0;
    pub const PARAM_VARIADIC: u32 = 1 << 1;
}

/// `Kind::Use` / `Kind::GroupUse` / `Kind::UseElem` flags.
pub mod use_flags {
    pub const USE_NORMAL: u32 = 1;
    pub const USE_FUNCTION: u32 = 2;
    pub const USE_CONST: u32 = 3;
}

/// `Kind::Name` flags.
pub mod name_flags {
    /// Fully qualified: `\Foo\Bar`.
    pub const NAME_FQ: u32 = 0;
    /// Qualified relative to the use map and namespace: `Foo\Bar`.
    pub const NAME_NOT_FQ: u32 = 1;
    /// Relative to the current namespace: `namespace\Foo`.
    pub const NAME_RELATIVE: u32 = 2;
}

/// `Kind::BinaryOp` and `Kind::AssignOp` flags.
pub mod binary_flags {
    pub const BINARY_ADD: u32 = 1;
    pub const BINARY_SUB: u32 = 2;
    pub const BINARY_MUL: u32 = 3;
    pub const BINARY_DIV: u32 = 4;
    pub const BINARY_MOD: u32 = 5;
    pub const BINARY_POW: u32 = 6;
    pub const BINARY_CONCAT: u32 = 7;
    pub const BINARY_SHIFT_LEFT: u32 = 8;
    pub const BINARY_SHIFT_RIGHT: u32 = 9;
    pub const BINARY_BITWISE_AND: u32 = 10;
    pub const BINARY_BITWISE_OR: u32 = 11;
    pub const BINARY_BITWISE_XOR: u32 = 12;
    pub const BINARY_BOOL_AND: u32 = 13;
    pub const BINARY_BOOL_OR: u32 = 14;
    pub const BINARY_BOOL_XOR: u32 = 15;
    pub const BINARY_IS_EQUAL: u32 = 16;
    pub const BINARY_IS_NOT_EQUAL: u32 = 17;
    pub const BINARY_IS_IDENTICAL: u32 = 18;
    pub const BINARY_IS_NOT_IDENTICAL: u32 = 19;
    pub const BINARY_IS_SMALLER: u32 = 20;
    pub const BINARY_IS_SMALLER_OR_EQUAL: u32 = 21;
    pub const BINARY_IS_GREATER: u32 = 22;
    pub const BINARY_IS_GREATER_OR_EQUAL: u32 = 23;
    pub const BINARY_SPACESHIP: u32 = 24;
    pub const BINARY_COALESCE: u32 = 25;
}

/// `Kind::UnaryOp` flags.
pub mod unary_flags {
    pub const UNARY_BOOL_NOT: u32 = 1;
    pub const UNARY_BITWISE_NOT: u32 = 2;
    pub const UNARY_MINUS: u32 = 3;
    pub const UNARY_PLUS: u32 = 4;
    pub const UNARY_SILENCE: u32 = 5;
}

/// `Kind::Cast` and `Kind::Type` flags.
pub mod type_flags {
    pub const TYPE_ARRAY: u32 = 1;
    pub const TYPE_BOOL: u32 = 2;
    pub const TYPE_CALLABLE: u32 = 3;
    pub const TYPE_DOUBLE: u32 = 4;
    pub const TYPE_LONG: u32 = 5;
    pub const TYPE_NULL: u32 = 6;
    pub const TYPE_OBJECT: u32 = 7;
    pub const TYPE_STRING: u32 = 8;
    pub const TYPE_VOID: u32 = 9;
    pub const TYPE_ITERABLE: u32 = 10;
}

/// `Kind::MagicConst` flags.
pub mod magic_const_flags {
    pub const MAGIC_LINE: u32 = 1;
    pub const MAGIC_FILE: u32 = 2;
    pub const MAGIC_DIR: u32 = 3;
    pub const MAGIC_CLASS: u32 = 4;
    pub const MAGIC_FUNCTION: u32 = 5;
    pub const MAGIC_METHOD: u32 = 6;
    pub const MAGIC_NAMESPACE: u32 = 7;
}
