//! End-to-end driver tests over real files, plus the textual signature
//! round trip.

use clap::Parser;
use phast_cli::args::CliArgs;
use phast_cli::driver::{dump_signatures, run, signature_line, EXIT_ISSUES_FOUND, EXIT_SUCCESS};
use phast_codebase::CodeBase;
use std::path::Path;

const EXTENDS_UNDECLARED: &str = r#"{
    "kind": "StmtList", "line": 1,
    "children": [{
        "kind": "Class", "flags": 0, "line": 1,
        "children": {
            "name": "B",
            "extends": { "kind": "Name", "flags": 1, "line": 1, "children": { "name": "C" } },
            "stmts": { "kind": "StmtList", "line": 1, "children": [] }
        }
    }]
}"#;

const CLEAN: &str = r#"{
    "kind": "StmtList", "line": 1,
    "children": [{
        "kind": "Class", "flags": 0, "line": 1,
        "children": {
            "name": "A",
            "stmts": { "kind": "StmtList", "line": 1, "children": [] }
        }
    }]
}"#;

fn args_for(path: &Path) -> CliArgs {
    CliArgs::parse_from(["phast", "--file", path.to_str().unwrap()])
}

#[test]
fn issues_found_sets_the_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("src.ast.json");
    std::fs::write(&path, EXTENDS_UNDECLARED).unwrap();
    assert_eq!(run(&args_for(&path)).unwrap(), EXIT_ISSUES_FOUND);
}

#[test]
fn clean_input_exits_successfully() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("src.ast.json");
    std::fs::write(&path, CLEAN).unwrap();
    assert_eq!(run(&args_for(&path)).unwrap(), EXIT_SUCCESS);
}

#[test]
fn malformed_dump_becomes_a_syntax_issue() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ast.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert_eq!(run(&args_for(&path)).unwrap(), EXIT_ISSUES_FOUND);
}

#[test]
fn missing_inputs_are_a_configuration_error() {
    let args = CliArgs::parse_from(["phast"]);
    assert!(run(&args).is_err());
}

#[test]
fn directory_discovery_finds_dumps() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.ast.json"), EXTENDS_UNDECLARED).unwrap();
    std::fs::write(dir.path().join("ignored.txt"), "not a dump").unwrap();
    let args = CliArgs::parse_from(["phast", "--directory", dir.path().to_str().unwrap()]);
    assert_eq!(run(&args).unwrap(), EXIT_ISSUES_FOUND);
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("phast.json");
    std::fs::write(&config_path, r#"{"no_such_option": 1}"#).unwrap();
    let src = dir.path().join("src.ast.json");
    std::fs::write(&src, CLEAN).unwrap();
    let args = CliArgs::parse_from([
        "phast",
        "--project-config",
        config_path.to_str().unwrap(),
        "--file",
        src.to_str().unwrap(),
    ]);
    assert!(run(&args).is_err());
}

#[test]
fn severity_filter_can_silence_low_issues() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("src.ast.json");
    // An unused statement-position variable in the global scope.
    std::fs::write(
        &path,
        r#"{
            "kind": "StmtList", "line": 1,
            "children": [
                { "kind": "Assign", "line": 1, "children": {
                    "var": { "kind": "Var", "line": 1, "children": { "name": "x" } },
                    "expr": 1
                }},
                { "kind": "Var", "line": 2, "children": { "name": "x" } }
            ]
        }"#,
    )
    .unwrap();
    let loud = CliArgs::parse_from(["phast", "--file", path.to_str().unwrap()]);
    assert_eq!(run(&loud).unwrap(), EXIT_ISSUES_FOUND);
    let quiet = CliArgs::parse_from([
        "phast",
        "--file",
        path.to_str().unwrap(),
        "--minimum-severity",
        "5",
    ]);
    assert_eq!(run(&quiet).unwrap(), EXIT_SUCCESS);
}

// ==================== Signature round trip ====================

#[test]
fn doc_comment_types_round_trip_through_the_signature_dump() {
    use phast_analyzer::ParsePass;
    use phast_ast::builder::{func_decl, param, stmt_list};
    use phast_common::{Atom, Config};
    use phast_types::FunctionFqsen;

    let mut codebase = CodeBase::empty();
    let config = Config::default();
    let root = stmt_list(
        1,
        vec![func_decl(1, "f", vec![param(1, 0, None, "x", None)], vec![])
            .with_doc("/**\n * @param int|string $x\n * @return string\n */")],
    );
    ParsePass::new(&mut codebase, &config).parse_file(Atom::new("src"), &root);

    let func = codebase
        .get_function_by_fqsen(FunctionFqsen::from_full_name("\\f"))
        .unwrap();
    let line = signature_line(&func.fqsen.to_string(), &func.parameters, &func.union_type);
    assert_eq!(line, "\\f: int|string $x -> string");

    let dump = dump_signatures(&codebase);
    assert_eq!(dump, vec!["\\f: int|string $x -> string".to_owned()]);
}

#[test]
fn untyped_parameters_dump_bare_names() {
    use phast_codebase::Parameter;
    use phast_common::Atom;
    use phast_types::UnionType;

    let parameter = Parameter::new(Atom::new("x"), UnionType::empty(), 1);
    assert_eq!(
        signature_line("\\g", &[parameter], &UnionType::empty()),
        "\\g: $x"
    );
}
