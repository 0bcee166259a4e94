//! FQSENs, the type lattice and analysis contexts for the phast PHP
//! analyzer.
//!
//! This crate provides:
//! - `fqsen` - Fully qualified structural element names
//! - `ty` / `union` - `Type` variants and `UnionType` sets
//! - `cast` - The can-cast-to relation and native coercion table
//! - `hierarchy` - The `ClassHierarchy` seam the cast relation walks
//! - `scope` / `context` - Variable scopes and the immutable `Context`
//! - `comment` - Doc-comment (`@param`, `@return`, ...) parsing

pub mod cast;
pub mod comment;
pub mod context;
pub mod fqsen;
pub mod hierarchy;
pub mod scope;
pub mod ty;
pub mod union;

pub use comment::Comment;
pub use context::{Context, UseKind};
pub use fqsen::{
    ClassConstFqsen, ClassFqsen, Fqsen, FunctionFqsen, FunctionLikeFqsen, GlobalConstFqsen,
    MethodFqsen, PropertyFqsen,
};
pub use hierarchy::{ClassHierarchy, EmptyHierarchy};
pub use scope::{Scope, ScopeKind, Variable};
pub use ty::{NativeType, Type};
pub use union::UnionType;
