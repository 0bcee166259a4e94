//! Command-line front-end for the phast PHP analyzer.
//!
//! The core consumes ASTs; this crate supplies everything around it:
//! argument parsing, project configuration loading, input discovery
//! (AST dumps produced by the embedding parser), output printing and
//! exit codes.

pub mod args;
pub mod ast_json;
pub mod driver;
pub mod printer;

pub use args::CliArgs;
pub use driver::{run, EXIT_CONFIG_ERROR, EXIT_ISSUES_FOUND, EXIT_SUCCESS};
