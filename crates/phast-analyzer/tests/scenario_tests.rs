//! Whole-pipeline scenarios over hand-built ASTs, checking the rendered
//! diagnostic stream.

use phast_analyzer::SourceFile;
use phast_ast::builder::*;
use phast_ast::flags::{binary_flags, modifier_flags, type_flags};
use phast_ast::{Child, Node};
use phast_codebase::CodeBase;
use phast_common::{Collector, Config};

fn analyze_with(config: Config, root: Node) -> Vec<String> {
    let mut codebase = CodeBase::new();
    let mut collector = Collector::new();
    let files = vec![SourceFile::new("src", root)];
    phast_analyzer::run(&mut codebase, &config, &files, &mut collector);
    collector.flush().iter().map(|i| i.to_string()).collect()
}

fn analyze(root: Node) -> Vec<String> {
    analyze_with(Config::default(), root)
}

#[test]
fn extending_an_undeclared_class_is_reported() {
    // class A {} class B extends C {}
    let root = stmt_list(
        1,
        vec![
            class(1, 0, "A", vec![]),
            class(1, 0, "B", vec![]).with_child("extends", name(1, "C")),
        ],
    );
    assert_eq!(
        analyze(root),
        vec!["src:1 PhanUndeclaredExtendedClass Class extends undeclared class \\C"]
    );
}

#[test]
fn argument_type_mismatch_is_reported() {
    // function f(int $x) {} f("s");
    let root = stmt_list(
        1,
        vec![
            func_decl(
                1,
                "f",
                vec![param(1, 0, Some(type_node(1, type_flags::TYPE_LONG)), "x", None)],
                vec![],
            ),
            call(1, name(1, "f"), vec![Child::Str("s".into())]),
        ],
    );
    assert_eq!(
        analyze(root),
        vec![
            "src:1 PhanTypeMismatchArgumentInternal Argument 1 (x) is string but \\f() takes int"
        ]
    );
}

#[test]
fn property_assignment_mismatch_is_reported() {
    // class A { public int $n; function g() { $this->n = "s"; } }
    let root = stmt_list(
        1,
        vec![class(
            1,
            0,
            "A",
            vec![
                prop_group(
                    1,
                    modifier_flags::MODIFIER_PUBLIC,
                    Some(type_node(1, type_flags::TYPE_LONG)),
                    vec![prop_elem(1, "n", None)],
                ),
                method(
                    1,
                    modifier_flags::MODIFIER_PUBLIC,
                    "g",
                    vec![],
                    Some(vec![assign(
                        1,
                        prop_access(1, var(1, "this"), "n"),
                        Child::Str("s".into()),
                    )]),
                ),
            ],
        )],
    );
    assert_eq!(
        analyze(root),
        vec!["src:1 PhanTypeMismatchProperty Assigning string to property but \\A::n is int"]
    );
}

#[test]
fn clean_foreach_over_inferred_array_is_silent() {
    // $x = [1,2,3]; foreach ($x as $k => $v) { echo $v + 1; }
    let elements = vec![
        array_elem(1, Child::Int(1), None),
        array_elem(1, Child::Int(2), None),
        array_elem(1, Child::Int(3), None),
    ];
    let root = stmt_list(
        1,
        vec![
            assign(1, var(1, "x"), Child::Node(array(1, elements))),
            foreach(
                1,
                var(1, "x"),
                var(1, "v"),
                Some(var(1, "k")),
                vec![echo(
                    1,
                    vec![Child::Node(binary_op(
                        1,
                        binary_flags::BINARY_ADD,
                        Child::Node(var(1, "v")),
                        Child::Int(1),
                    ))],
                )],
            ),
        ],
    );
    assert_eq!(analyze(root), Vec::<String>::new());
}

#[test]
fn missing_parent_constructor_call_is_reported() {
    // class A { function __construct() {} }
    // class B extends A { function __construct() { } }
    let root = stmt_list(
        1,
        vec![
            class(
                1,
                0,
                "A",
                vec![method(
                    1,
                    modifier_flags::MODIFIER_PUBLIC,
                    "__construct",
                    vec![],
                    Some(vec![]),
                )],
            ),
            class(
                1,
                0,
                "B",
                vec![method(
                    1,
                    modifier_flags::MODIFIER_PUBLIC,
                    "__construct",
                    vec![],
                    Some(vec![]),
                )],
            )
            .with_child("extends", name(1, "A")),
        ],
    );
    let config = Config {
        parent_constructor_required: vec!["A".to_owned()],
        ..Config::default()
    };
    assert_eq!(
        analyze_with(config, root),
        vec![
            "src:1 PhanTypeParentConstructorCalled Must call parent::__construct() from \\B which extends \\A"
        ]
    );
}

#[test]
fn undeclared_type_in_signature_is_reported() {
    // namespace N; use \OtherNs\X; function f(): X { return new X(); }
    let body = vec![ret(
        1,
        Some(Child::Node(new_object(1, name(1, "X"), vec![]))),
    )];
    let root = stmt_list(
        1,
        vec![
            namespace(1, Some("N"), None),
            use_stmt(
                1,
                phast_ast::flags::use_flags::USE_NORMAL,
                vec![use_elem(1, "OtherNs\\X", None)],
            ),
            func_decl(1, "f", vec![], body).with_child("returnType", name(1, "X")),
        ],
    );
    let issues = analyze(root);
    assert!(
        issues.contains(
            &"src:1 PhanUndeclaredTypeReturnType Return type of \\N\\f is undeclared type \\OtherNs\\X"
                .to_owned()
        ),
        "missing return-type issue in {issues:?}"
    );
    // The instantiation itself is also undeclared.
    assert!(
        issues
            .iter()
            .any(|i| i.contains("PhanUndeclaredClass ") && i.contains("\\OtherNs\\X")),
        "missing undeclared-class issue in {issues:?}"
    );
}

#[test]
fn satisfied_parent_constructor_call_is_silent() {
    let calling_body = vec![static_call(1, name(1, "parent"), "__construct", vec![])];
    let root = stmt_list(
        1,
        vec![
            class(
                1,
                0,
                "A",
                vec![method(
                    1,
                    modifier_flags::MODIFIER_PUBLIC,
                    "__construct",
                    vec![],
                    Some(vec![]),
                )],
            ),
            class(
                1,
                0,
                "B",
                vec![method(
                    1,
                    modifier_flags::MODIFIER_PUBLIC,
                    "__construct",
                    vec![],
                    Some(calling_body),
                )],
            )
            .with_child("extends", name(1, "A")),
        ],
    );
    let config = Config {
        parent_constructor_required: vec!["A".to_owned()],
        ..Config::default()
    };
    assert_eq!(analyze_with(config, root), Vec::<String>::new());
}
