//! The engine's internal failure taxonomy.
//!
//! These are raised inside visitors and caught at visitor boundaries;
//! they never escape to the file-level driver.

use phast_codebase::MissingSymbol;
use phast_common::IssueInstance;
use std::fmt;

#[derive(Debug)]
pub enum AnalysisError {
    /// A requested FQSEN was absent from the CodeBase. Callers usually
    /// recover by emitting the appropriate `Undeclared*` diagnostic.
    MissingSymbol(MissingSymbol),
    /// An expected child node of a particular shape was not present
    /// (e.g. a dynamic method name). Swallowed; the construct is
    /// treated as unanalyzable.
    NodeShape(&'static str),
    /// Carries an issue for the boundary to emit or suppress.
    IssueRaise(Box<IssueInstance>),
    /// A construct the engine cannot reason about.
    Unanalyzable,
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

impl From<MissingSymbol> for AnalysisError {
    fn from(err: MissingSymbol) -> Self {
        AnalysisError::MissingSymbol(err)
    }
}

impl AnalysisError {
    #[must_use]
    pub fn raise(instance: IssueInstance) -> Self {
        AnalysisError::IssueRaise(Box::new(instance))
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::MissingSymbol(err) => err.fmt(f),
            AnalysisError::NodeShape(what) => write!(f, "unexpected node shape: {what}"),
            AnalysisError::IssueRaise(instance) => write!(f, "{instance}"),
            AnalysisError::Unanalyzable => f.write_str("unanalyzable"),
        }
    }
}

impl std::error::Error for AnalysisError {}
