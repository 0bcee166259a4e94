//! The CLI driver: configuration, discovery, pipeline, output.

use crate::args::CliArgs;
use crate::ast_json;
use crate::printer::printer_for;
use anyhow::{Context as _, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use phast_analyzer::SourceFile;
use phast_codebase::CodeBase;
use phast_common::collector::{MinimumSeverityFilter, SuppressionFilter};
use phast_common::issue::catalog;
use phast_common::{Collector, Config, IssueInstance};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ISSUES_FOUND: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Run the analyzer; returns the process exit code.
pub fn run(args: &CliArgs) -> Result<i32> {
    let config = load_config(args)?;
    config.validate().map_err(anyhow::Error::from)?;

    let exclude = build_exclude_set(&config)?;
    let inputs = discover_inputs(args, &exclude);
    if inputs.is_empty() {
        anyhow::bail!("no input files (pass --file or --directory)");
    }

    let mut collector = Collector::new()
        .with_filter(Box::new(SuppressionFilter::from_config(&config)))
        .with_filter(Box::new(MinimumSeverityFilter {
            minimum: config.minimum_severity,
        }));

    if args.progress {
        eprintln!("phast: reading {} file(s)", inputs.len());
    }
    let mut files = Vec::new();
    for path in &inputs {
        match read_source_file(path) {
            Ok(file) => files.push(file),
            // AST-producer failures degrade to syntax diagnostics.
            Err(err) => collector.collect(IssueInstance::new(
                &catalog::SYNTAX_ERROR,
                path.to_string_lossy().into_owned(),
                0,
                vec![err.to_string()],
            )),
        }
    }

    let mut codebase = CodeBase::new();
    if args.progress {
        eprintln!("phast: analyzing");
    }
    phast_analyzer::run(&mut codebase, &config, &files, &mut collector);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.dump_signatures {
        for line in dump_signatures(&codebase) {
            use std::io::Write;
            writeln!(out, "{line}")?;
        }
        return Ok(EXIT_SUCCESS);
    }

    let issues = collector.flush();
    printer_for(args.output_mode).print(&mut out, &issues)?;
    Ok(if issues.is_empty() {
        EXIT_SUCCESS
    } else {
        EXIT_ISSUES_FOUND
    })
}

fn load_config(args: &CliArgs) -> Result<Config> {
    let mut config = match &args.project_config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("unreadable config file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid config file {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(minimum_severity) = args.minimum_severity {
        config.minimum_severity = minimum_severity;
    }
    if let Some(processes) = args.processes {
        config.processes = processes;
    }
    if args.dead_code_detection {
        config.dead_code_detection = true;
    }
    if args.quick {
        config.quick_mode = true;
    }
    if args.no_signature_compatibility {
        config.analyze_signature_compatibility = false;
    }
    Ok(config)
}

fn build_exclude_set(config: &Config) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in &config.exclude_file_list {
        builder.add(Glob::new(pattern).with_context(|| format!("bad exclude glob {pattern}"))?);
    }
    Ok(builder.build()?)
}

/// Explicit files first, then directory scans in sorted order.
fn discover_inputs(args: &CliArgs, exclude: &GlobSet) -> Vec<PathBuf> {
    let mut inputs: Vec<PathBuf> = args.files.clone();
    for directory in &args.directories {
        let walker = WalkDir::new(directory)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok());
        for entry in walker {
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if !path.to_string_lossy().ends_with(".ast.json") {
                continue;
            }
            if exclude.is_match(path) {
                warn!(path = %path.display(), "excluded from input");
                continue;
            }
            inputs.push(path.to_owned());
        }
    }
    inputs
}

fn read_source_file(path: &Path) -> Result<SourceFile> {
    let text = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    let root = ast_json::node_from_json(&value)?;
    // Report issues against the source name, not the dump name.
    let name = path
        .to_string_lossy()
        .trim_end_matches(".ast.json")
        .to_owned();
    Ok(SourceFile::new(name, root))
}

/// `<fqsen>: T $p1, $p2 -> return`, sorted.
#[must_use]
pub fn dump_signatures(codebase: &CodeBase) -> Vec<String> {
    let mut lines = Vec::new();
    for func in codebase.functions() {
        if func.is_internal() {
            continue;
        }
        lines.push(signature_line(
            &func.fqsen.to_string(),
            &func.parameters,
            &func.union_type,
        ));
    }
    for class in codebase.classes() {
        for method in codebase.methods_for_class(class.fqsen) {
            if method.defining_fqsen.class != class.fqsen {
                continue;
            }
            lines.push(signature_line(
                &method.fqsen.to_string(),
                &method.parameters,
                &method.union_type,
            ));
        }
    }
    lines.sort();
    lines
}

/// One signature in its textual form: parameters as `type $name`, the
/// return type after `->`.
#[must_use]
pub fn signature_line(
    label: &str,
    parameters: &[phast_codebase::Parameter],
    return_type: &phast_types::UnionType,
) -> String {
    let params: Vec<String> = parameters
        .iter()
        .map(|p| {
            if p.union_type.is_empty() {
                format!("${}", p.name)
            } else {
                format!("{} ${}", p.union_type, p.name)
            }
        })
        .collect();
    if return_type.is_empty() {
        format!("{label}: {}", params.join(", "))
    } else {
        format!("{label}: {} -> {}", params.join(", "), return_type)
    }
}
