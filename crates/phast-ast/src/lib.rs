//! AST data model consumed by the phast PHP analyzer.
//!
//! The analyzer does not parse source itself; an embedding parser hands it
//! trees of [`Node`]. Each node carries a [`Kind`], a `u32` flag word
//! (interpreted per kind via the constant tables in [`flags`]), a line
//! number, an optional doc comment, and children: either an ordered list
//! (statement lists, argument lists) or a named map (declarations,
//! operators).
//!
//! [`builder`] provides the constructor functions the embedding parser and
//! the test suites use to assemble trees.

pub mod builder;
pub mod flags;
pub mod kind;
pub mod node;

pub use kind::Kind;
pub use node::{Child, Children, Node};
