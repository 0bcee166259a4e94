//! The two-phase whole-program driver.
//!
//! The parse pass over all files completes before analysis begins on
//! any file. File order is deterministic: input order with first
//! occurrences kept. With `processes > 1` the analysis phase partitions
//! the file list by `index mod N`; each worker analyzes its share
//! against a private CodeBase clone and the parent merges the issues.

use crate::parse::ParsePass;
use crate::state::AnalysisState;
use phast_ast::Node;
use phast_codebase::CodeBase;
use phast_common::{Atom, Collector, Config, IssueInstance};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{debug, info};

/// One input file: its reported name and its AST.
pub struct SourceFile {
    pub name: Atom,
    pub root: Node,
}

impl SourceFile {
    #[must_use]
    pub fn new(name: impl AsRef<str>, root: Node) -> Self {
        Self {
            name: Atom::new(name.as_ref()),
            root,
        }
    }
}

/// Run the full pipeline: parse, hydrate, per-class analysis, file
/// analysis, optional dead-code pass.
pub fn run(
    codebase: &mut CodeBase,
    config: &Config,
    files: &[SourceFile],
    collector: &mut Collector,
) {
    // Deterministic order: input order, first occurrence wins.
    let mut seen = FxHashSet::default();
    let ordered: Vec<&SourceFile> = files
        .iter()
        .filter(|f| seen.insert(f.name))
        .collect();
    info!(files = ordered.len(), "analysis pipeline start");

    // Phase 1: parse everything.
    {
        let mut parser = ParsePass::new(codebase, config);
        for file in &ordered {
            parser.parse_file(file.name, &file.root);
        }
    }

    // Hydrate the full ancestor closure.
    for fqsen in codebase.class_fqsens() {
        for issue in codebase.hydrate(fqsen) {
            collector.collect(issue);
        }
    }

    // Per-class analyzers.
    {
        let mut state = AnalysisState::new(codebase, config, collector);
        state.analyze_classes();
    }

    // Phase 2: analyze.
    let analyzable: Vec<&SourceFile> = ordered
        .iter()
        .copied()
        .filter(|f| !is_excluded_from_analysis(config, f.name.as_str()))
        .collect();
    debug!(files = analyzable.len(), "analysis phase");

    if config.processes <= 1 {
        let mut state = AnalysisState::new(codebase, config, collector);
        for file in &analyzable {
            state.analyze_file(file.name, &file.root);
        }
    } else {
        let groups = partition(&analyzable, config.processes);
        let seeded: &CodeBase = codebase;
        let results: Vec<Vec<IssueInstance>> = groups
            .par_iter()
            .map(|group| {
                // Each worker gets a private clone seeded from the
                // parse phase; type widening stays worker-local.
                let mut local = seeded.clone();
                let mut local_collector = Collector::new();
                let mut state = AnalysisState::new(&mut local, config, &mut local_collector);
                for file in group {
                    state.analyze_file(file.name, &file.root);
                }
                local_collector.flush()
            })
            .collect();
        for issues in results {
            for issue in issues {
                collector.collect(issue);
            }
        }
    }

    // Reference counts only make sense with the global single-process
    // view; Config::validate rejects the other combination.
    if config.dead_code_detection {
        let mut state = AnalysisState::new(codebase, config, collector);
        state.analyze_dead_code();
    }
    info!(issues = collector.len(), "analysis pipeline done");
}

fn partition<'f>(files: &[&'f SourceFile], n: usize) -> Vec<Vec<&'f SourceFile>> {
    let mut groups: Vec<Vec<&SourceFile>> = (0..n).map(|_| Vec::new()).collect();
    for (index, file) in files.iter().enumerate() {
        groups[index % n].push(file);
    }
    groups
}

fn is_excluded_from_analysis(config: &Config, file: &str) -> bool {
    if config.exclude_file_list.iter().any(|f| f == file) {
        return true;
    }
    config
        .exclude_analysis_directory_list
        .iter()
        .any(|dir| file.starts_with(dir.trim_end_matches('/')))
}
