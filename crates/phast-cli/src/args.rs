use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the phast binary.
#[derive(Parser, Debug)]
#[command(name = "phast", version, about = "phast - a static analyzer for PHP")]
pub struct CliArgs {
    // ==================== Inputs ====================
    /// Path to the project configuration file (JSON).
    #[arg(short = 'c', long = "project-config")]
    pub project_config: Option<PathBuf>,

    /// Directories to scan recursively for AST dumps (*.ast.json).
    #[arg(short = 'd', long = "directory")]
    pub directories: Vec<PathBuf>,

    /// Individual AST dump files to analyze.
    #[arg(short = 'f', long = "file")]
    pub files: Vec<PathBuf>,

    // ==================== Analysis options ====================
    /// Lowest severity to report (0, 5 or 10).
    #[arg(short = 'm', long = "minimum-severity")]
    pub minimum_severity: Option<u8>,

    /// Number of analysis workers.
    #[arg(short = 'j', long = "processes")]
    pub processes: Option<usize>,

    /// Enable unreferenced-declaration detection (single process only).
    #[arg(long = "dead-code-detection")]
    pub dead_code_detection: bool,

    /// Quicker, shallower analysis.
    #[arg(long = "quick")]
    pub quick: bool,

    /// Skip override-signature compatibility checks.
    #[arg(long = "no-signature-compatibility")]
    pub no_signature_compatibility: bool,

    // ==================== Output ====================
    /// Output format.
    #[arg(short = 'o', long = "output-mode", value_enum, default_value = "plain")]
    pub output_mode: OutputMode,

    /// Dump every known function and method signature instead of
    /// reporting issues.
    #[arg(long = "dump-signatures")]
    pub dump_signatures: bool,

    /// Print phase progress on stderr.
    #[arg(long = "progress")]
    pub progress: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    Plain,
    Json,
    Csv,
    Checkstyle,
}
