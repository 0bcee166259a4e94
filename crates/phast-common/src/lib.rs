//! Common types and utilities for the phast PHP analyzer.
//!
//! This crate provides foundational types used across all phast crates:
//! - String interning (`Atom`, `Interner`)
//! - Analyzer configuration (`Config`)
//! - The issue catalog (`Issue`, `IssueInstance`, severities, categories)
//! - Issue filtering and the buffering `Collector`

// String interning for identifier and FQSEN deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Analyzer configuration
pub mod config;
pub use config::Config;

// Issue catalog and instances
pub mod issue;
pub use issue::{Issue, IssueCategory, IssueInstance, Severity, format_message};

// Issue filtering and buffering
pub mod collector;
pub use collector::{Collector, IssueFilter};
