//! Analyzer configuration.
//!
//! `Config` is deserialized from a project configuration file by the CLI
//! and threaded explicitly through the pipeline; the engine never reaches
//! for global configuration state.

use serde::Deserialize;

/// Analyzer options.
///
/// Field defaults mirror a permissive single-process run: every check that
/// needs an opt-in is off, doc-comment types are read, and undeclared
/// variables at the top level of a script are tolerated.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "snake_case")]
pub struct Config {
    /// Root directory of the analyzed project. File paths in issues are
    /// reported relative to this.
    pub project_root_directory: String,

    /// Lowest severity that passes the output filter (0, 5 or 10).
    pub minimum_severity: u8,

    /// Disables recursive call-graph re-analysis beyond one level.
    pub quick_mode: bool,

    /// Check for constructs with changed semantics across language versions.
    pub backward_compatibility_checks: bool,

    /// Count references and report unreferenced classes, methods,
    /// properties, constants and functions. Requires a single process.
    pub dead_code_detection: bool,

    /// Check override signatures for ancestor compatibility.
    pub analyze_signature_compatibility: bool,

    /// When true, writes to undeclared properties create the property
    /// instead of reporting it.
    pub allow_missing_properties: bool,

    /// Enable `@template` generics.
    pub generic_types_enabled: bool,

    /// When false, doc-comment annotations are not parsed at all.
    pub read_type_annotations: bool,

    /// Tolerate undeclared variables in the global scope.
    pub ignore_undeclared_variables_in_global_scope: bool,

    /// Classes (by FQSEN string) whose subclasses must call
    /// `parent::__construct()`.
    pub parent_constructor_required: Vec<String>,

    /// Directories parsed but excluded from the analysis phase.
    pub exclude_analysis_directory_list: Vec<String>,

    /// Files excluded from both phases.
    pub exclude_file_list: Vec<String>,

    /// Issue type names that are never emitted.
    pub suppress_issue_types: Vec<String>,

    /// When non-empty, only these issue type names are emitted.
    pub whitelist_issue_types: Vec<String>,

    /// Type overrides for global variables, name → union type string.
    pub globals_type_map: std::collections::BTreeMap<String, String>,

    /// Additional variable names treated as superglobals.
    pub runkit_superglobals: Vec<String>,

    /// Number of analysis workers.
    pub processes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_root_directory: ".".to_owned(),
            minimum_severity: 0,
            quick_mode: false,
            backward_compatibility_checks: false,
            dead_code_detection: false,
            analyze_signature_compatibility: true,
            allow_missing_properties: false,
            generic_types_enabled: true,
            read_type_annotations: true,
            ignore_undeclared_variables_in_global_scope: false,
            parent_constructor_required: Vec::new(),
            exclude_analysis_directory_list: Vec::new(),
            exclude_file_list: Vec::new(),
            suppress_issue_types: Vec::new(),
            whitelist_issue_types: Vec::new(),
            globals_type_map: std::collections::BTreeMap::new(),
            runkit_superglobals: Vec::new(),
            processes: 1,
        }
    }
}

/// A rejected configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processes == 0 {
            return Err(ConfigError("processes must be at least 1".to_owned()));
        }
        // Reference counts need a global view; a partitioned run would
        // report false positives for every cross-partition reference.
        if self.dead_code_detection && self.processes > 1 {
            return Err(ConfigError(
                "dead_code_detection is incompatible with processes > 1".to_owned(),
            ));
        }
        if !matches!(self.minimum_severity, 0 | 5 | 10) {
            return Err(ConfigError(format!(
                "minimum_severity must be 0, 5 or 10, got {}",
                self.minimum_severity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn dead_code_requires_single_process() {
        let config = Config {
            dead_code_detection: true,
            processes: 4,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_severity() {
        let config = Config {
            minimum_severity: 3,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserializes_partial_json() {
        let config: Config = serde_json::from_str(
            r#"{"minimum_severity": 5, "dead_code_detection": true}"#,
        )
        .unwrap();
        assert_eq!(config.minimum_severity, 5);
        assert!(config.dead_code_detection);
        assert_eq!(config.processes, 1);
    }

    #[test]
    fn rejects_unknown_keys() {
        let result: Result<Config, _> = serde_json::from_str(r#"{"no_such_option": true}"#);
        assert!(result.is_err());
    }
}
