//! Behavior tests for the analysis pass: scope merging, narrowing,
//! property widening, magic methods, noop and dead-code detection.

use phast_analyzer::SourceFile;
use phast_ast::builder::*;
use phast_ast::flags::{binary_flags, modifier_flags, param_flags, type_flags};
use phast_ast::{Child, Node};
use phast_codebase::CodeBase;
use phast_common::{Collector, Config};
use phast_types::{PropertyFqsen, ClassFqsen, Type, UnionType};

fn analyze_with(config: Config, root: Node) -> (CodeBase, Vec<String>) {
    let mut codebase = CodeBase::new();
    let mut collector = Collector::new();
    let files = vec![SourceFile::new("src", root)];
    phast_analyzer::run(&mut codebase, &config, &files, &mut collector);
    let issues = collector.flush().iter().map(|i| i.to_string()).collect();
    (codebase, issues)
}

fn analyze(root: Node) -> (CodeBase, Vec<String>) {
    analyze_with(Config::default(), root)
}

/// Wrap statements in `function f() { ... }` so variables live in a
/// closed scope.
fn in_function(stmts: Vec<Node>) -> Node {
    stmt_list(1, vec![func_decl(1, "f", vec![], stmts)])
}

#[test]
fn undeclared_variable_in_function_scope() {
    let (_, issues) = analyze(in_function(vec![echo(2, vec![Child::Node(var(2, "nope"))])]));
    assert_eq!(
        issues,
        vec!["src:2 PhanUndeclaredVariable Variable $nope is undeclared"]
    );
}

#[test]
fn superglobals_are_always_defined() {
    let (_, issues) = analyze(in_function(vec![echo(
        2,
        vec![Child::Node(dim(2, var(2, "_GET"), Some(Child::Str("k".into()))))],
    )]));
    assert_eq!(issues, Vec::<String>::new());
}

#[test]
fn variable_defined_on_one_branch_gains_null() {
    // if (cond) { $a = 1; } echo $a;  -- tolerated outside strict mode
    let body = vec![
        if_stmt(
            2,
            vec![if_elem(
                2,
                Some(var(2, "c")),
                vec![assign(3, var(3, "a"), Child::Int(1))],
            )],
        ),
        echo(5, vec![Child::Node(var(5, "a"))]),
    ];
    let mut stmts = vec![assign(1, var(1, "c"), Child::Bool(true))];
    stmts.extend(body);
    let (_, issues) = analyze(in_function(stmts));
    assert_eq!(issues, Vec::<String>::new());
}

#[test]
fn strict_mode_drops_partial_branch_variables() {
    let stmts = vec![
        assign(2, var(2, "c"), Child::Bool(true)),
        if_stmt(
            3,
            vec![if_elem(
                3,
                Some(var(3, "c")),
                vec![assign(4, var(4, "a"), Child::Int(1))],
            )],
        ),
        echo(6, vec![Child::Node(var(6, "a"))]),
    ];
    let root = stmt_list(
        1,
        vec![
            declare_strict_types(1, 1),
            func_decl(1, "f", vec![], stmts),
        ],
    );
    let (_, issues) = analyze(root);
    assert_eq!(
        issues,
        vec!["src:6 PhanUndeclaredVariable Variable $a is undeclared"]
    );
}

#[test]
fn variable_defined_on_all_branches_survives() {
    let stmts = vec![
        assign(2, var(2, "c"), Child::Bool(true)),
        if_stmt(
            3,
            vec![
                if_elem(3, Some(var(3, "c")), vec![assign(4, var(4, "a"), Child::Int(1))]),
                if_elem(5, None, vec![assign(6, var(6, "a"), Child::Str("s".into()))]),
            ],
        ),
        echo(8, vec![Child::Node(var(8, "a"))]),
    ];
    let root = stmt_list(
        1,
        vec![declare_strict_types(1, 1), func_decl(1, "f", vec![], stmts)],
    );
    // Defined on every branch: fine even under strict types.
    let (_, issues) = analyze(root);
    assert_eq!(issues, Vec::<String>::new());
}

#[test]
fn catch_only_variables_survive_the_merge() {
    let stmts = vec![
        try_stmt(
            2,
            vec![],
            vec![catch(
                3,
                vec![name_fq(3, "Exception")],
                "e",
                vec![assign(4, var(4, "caught"), Child::Int(1))],
            )],
            None,
        ),
        echo(6, vec![Child::Node(var(6, "caught"))]),
    ];
    let (_, issues) = analyze(in_function(stmts));
    assert_eq!(issues, Vec::<String>::new());
}

#[test]
fn catching_an_undeclared_class_is_reported() {
    let stmts = vec![try_stmt(
        2,
        vec![],
        vec![catch(3, vec![name(3, "NoSuchError")], "e", vec![])],
        None,
    )];
    let (_, issues) = analyze(in_function(stmts));
    assert_eq!(
        issues,
        vec!["src:3 PhanUndeclaredClassCatch Catching undeclared class \\NoSuchError"]
    );
}

#[test]
fn property_writes_widen_the_union() {
    // class A { public $p; function g() { $this->p = 1; } }
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
                    None,
                    vec![prop_elem(1, "p", None)],
                ),
                method(
                    2,
                    modifier_flags::MODIFIER_PUBLIC,
                    "g",
                    vec![],
                    Some(vec![assign(
                        3,
                        prop_access(3, var(3, "this"), "p"),
                        Child::Int(7),
                    )]),
                ),
            ],
        )],
    );
    let (codebase, issues) = analyze(root);
    assert_eq!(issues, Vec::<String>::new());
    let prop = codebase
        .get_property_by_fqsen(PropertyFqsen::new(
            ClassFqsen::from_full_name("\\A"),
            phast_common::Atom::new("p"),
        ))
        .unwrap();
    assert!(prop.union_type.has_type(&Type::INT));
}

#[test]
fn magic_get_synthesizes_properties() {
    // class A { function __get($name) { return 1; } function g() { echo $this->anything; } }
    let getter = method(
        2,
        modifier_flags::MODIFIER_PUBLIC,
        "__get",
        vec![param(2, 0, None, "name", None)],
        Some(vec![ret(2, Some(Child::Int(1)))]),
    );
    let root = stmt_list(
        1,
        vec![class(
            1,
            0,
            "A",
            vec![
                getter,
                method(
                    3,
                    modifier_flags::MODIFIER_PUBLIC,
                    "g",
                    vec![],
                    Some(vec![echo(
                        4,
                        vec![Child::Node(prop_access(4, var(4, "this"), "anything"))],
                    )]),
                ),
            ],
        )],
    );
    let (codebase, issues) = analyze(root);
    assert_eq!(issues, Vec::<String>::new());
    assert!(codebase.has_property_with_fqsen(PropertyFqsen::new(
        ClassFqsen::from_full_name("\\A"),
        phast_common::Atom::new("anything"),
    )));
}

#[test]
fn undeclared_property_access_is_reported() {
    let root = stmt_list(
        1,
        vec![class(
            1,
            0,
            "A",
            vec![method(
                2,
                modifier_flags::MODIFIER_PUBLIC,
                "g",
                vec![],
                Some(vec![echo(
                    3,
                    vec![Child::Node(prop_access(3, var(3, "this"), "missing"))],
                )]),
            )],
        )],
    );
    let (_, issues) = analyze(root);
    assert_eq!(
        issues,
        vec!["src:3 PhanUndeclaredProperty Reference to undeclared property \\A::missing"]
    );
}

#[test]
fn instanceof_narrows_the_guarded_branch() {
    // function f($x) { if ($x instanceof \A) { $x->m(); } }
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
                    "m",
                    vec![],
                    Some(vec![]),
                )],
            ),
            func_decl(
                2,
                "f",
                vec![param(2, 0, None, "x", None)],
                vec![if_stmt(
                    3,
                    vec![if_elem(
                        3,
                        Some(instanceof(3, var(3, "x"), name_fq(3, "A"))),
                        vec![method_call(4, var(4, "x"), "m", vec![])],
                    )],
                )],
            ),
        ],
    );
    let (_, issues) = analyze(root);
    assert_eq!(issues, Vec::<String>::new());
}

#[test]
fn calling_an_undeclared_method_is_reported() {
    let root = stmt_list(
        1,
        vec![
            class(1, 0, "A", vec![]),
            func_decl(
                2,
                "f",
                vec![],
                vec![method_call(3, new_object(3, name(3, "A"), vec![]), "m", vec![])],
            ),
        ],
    );
    let (_, issues) = analyze(root);
    assert_eq!(
        issues,
        vec!["src:3 PhanUndeclaredMethod Call to undeclared method \\A::m"]
    );
}

#[test]
fn too_few_arguments_to_a_userland_function() {
    let root = stmt_list(
        1,
        vec![
            func_decl(
                1,
                "f",
                vec![param(1, 0, Some(type_node(1, type_flags::TYPE_LONG)), "x", None)],
                vec![],
            ),
            call(2, name(2, "f"), vec![]),
        ],
    );
    let (_, issues) = analyze(root);
    assert_eq!(
        issues,
        vec!["src:2 PhanParamTooFew Call with 0 arg(s) to \\f() which requires 1 arg(s) defined at src:1"]
    );
}

#[test]
fn variadic_callees_skip_arity_checks() {
    let root = stmt_list(
        1,
        vec![
            func_decl(
                1,
                "f",
                vec![param(1, param_flags::PARAM_VARIADIC, None, "rest", None)],
                vec![],
            ),
            call(2, name(2, "f"), vec![Child::Int(1), Child::Int(2), Child::Int(3)]),
        ],
    );
    let (_, issues) = analyze(root);
    assert_eq!(issues, Vec::<String>::new());
}

#[test]
fn non_variable_by_ref_argument_is_reported() {
    // sort(1) - sort takes its array by reference.
    let root = stmt_list(1, vec![call(2, name(2, "sort"), vec![Child::Int(1)])]);
    let (_, issues) = analyze(root);
    assert!(
        issues.iter().any(|i| i.contains(
            "PhanTypeNonVarPassByRef Only variables can be passed by reference at argument 1 in \\sort()"
        )),
        "unexpected issues: {issues:?}"
    );
}

#[test]
fn noop_statements_are_low_severity_issues() {
    let stmts = vec![
        assign(2, var(2, "x"), Child::Int(1)),
        var(3, "x"),
        array(4, vec![]),
    ];
    let (_, issues) = analyze(in_function(stmts));
    assert_eq!(
        issues,
        vec![
            "src:3 PhanNoopVariable Unused variable",
            "src:4 PhanNoopArray Unused array",
        ]
    );
}

#[test]
fn dead_code_detection_reports_unreferenced_declarations() {
    let root = stmt_list(
        1,
        vec![
            class(1, 0, "Unused", vec![]),
            func_decl(2, "unused_function", vec![], vec![]),
            func_decl(3, "used_function", vec![], vec![]),
            call(4, name(4, "used_function"), vec![]),
        ],
    );
    let config = Config {
        dead_code_detection: true,
        ..Config::default()
    };
    let (_, issues) = analyze_with(config, root);
    assert!(issues
        .contains(&"src:1 PhanUnreferencedClass Possibly zero references to class \\Unused".to_owned()));
    assert!(issues.iter().any(|i| i.contains("PhanUnreferencedFunction") && i.ends_with("\\unused_function")));
    assert!(
        !issues.iter().any(|i| i.ends_with("function \\used_function")),
        "called function got flagged: {issues:?}"
    );
}

#[test]
fn closures_capture_use_variables() {
    // $a = 1; $f = function () use ($a) { echo $a; };
    let stmts = vec![
        assign(2, var(2, "a"), Child::Int(1)),
        assign(
            3,
            var(3, "f"),
            Child::Node(closure(
                3,
                vec![],
                vec![closure_var(3, "a", 0)],
                vec![echo(4, vec![Child::Node(var(4, "a"))])],
            )),
        ),
    ];
    let (_, issues) = analyze(in_function(stmts));
    assert_eq!(issues, Vec::<String>::new());
}

#[test]
fn closures_do_not_leak_outer_variables() {
    // $b = 1; $f = function () { echo $b; };  -- $b not captured
    let stmts = vec![
        assign(2, var(2, "b"), Child::Int(1)),
        assign(
            3,
            var(3, "f"),
            Child::Node(closure(
                3,
                vec![],
                vec![],
                vec![echo(4, vec![Child::Node(var(4, "b"))])],
            )),
        ),
    ];
    let (_, issues) = analyze(in_function(stmts));
    assert_eq!(
        issues,
        vec!["src:4 PhanUndeclaredVariable Variable $b is undeclared"]
    );
}

#[test]
fn suppression_comments_silence_issues() {
    let suppressed = func_decl(
        2,
        "f",
        vec![],
        vec![echo(3, vec![Child::Node(var(3, "nope"))])],
    )
    .with_doc("/** @suppress PhanUndeclaredVariable */");
    let (_, issues) = analyze(stmt_list(1, vec![suppressed]));
    assert_eq!(issues, Vec::<String>::new());
}

#[test]
fn deprecated_function_calls_are_flagged() {
    let root = stmt_list(
        1,
        vec![
            func_decl(1, "old", vec![], vec![]).with_doc("/** @deprecated */"),
            call(2, name(2, "old"), vec![]),
        ],
    );
    let (_, issues) = analyze(root);
    assert_eq!(
        issues,
        vec!["src:2 PhanDeprecatedFunction Call to deprecated function \\old() defined at src:1"]
    );
}

#[test]
fn redefined_classes_get_alternate_ids_and_a_diagnostic() {
    let root = stmt_list(
        1,
        vec![class(1, 0, "A", vec![]), class(5, 0, "A", vec![])],
    );
    let (codebase, issues) = analyze(root);
    assert!(codebase.has_class_with_fqsen(ClassFqsen::from_full_name("\\A").with_alt(1)));
    assert_eq!(
        issues,
        vec![
            "src:5 PhanRedefineClass Class \\A defined at src:5 was previously defined as Class \\A at src:1"
        ]
    );
}

#[test]
fn binary_concat_of_arrays_is_flagged() {
    let stmts = vec![
        assign(2, var(2, "a"), Child::Node(array(2, vec![]))),
        echo(
            3,
            vec![Child::Node(binary_op(
                3,
                binary_flags::BINARY_CONCAT,
                Child::Node(var(3, "a")),
                Child::Str("x".into()),
            ))],
        ),
    ];
    let (_, issues) = analyze(in_function(stmts));
    assert_eq!(
        issues,
        vec!["src:3 PhanTypeArrayOperator Invalid array operator between types array and string"]
    );
}

#[test]
fn incompatible_override_signature_is_reported() {
    let base = class(
        1,
        0,
        "Base",
        vec![method(
            1,
            modifier_flags::MODIFIER_PUBLIC,
            "m",
            vec![param(1, 0, Some(type_node(1, type_flags::TYPE_LONG)), "x", None)],
            Some(vec![ret(1, Some(Child::Int(1)))]),
        )
        .with_child("returnType", type_node(1, type_flags::TYPE_LONG))],
    );
    let child = class(
        2,
        0,
        "Child",
        vec![method(
            3,
            modifier_flags::MODIFIER_PUBLIC,
            "m",
            vec![param(3, 0, Some(type_node(3, type_flags::TYPE_STRING)), "x", None)],
            Some(vec![ret(3, Some(Child::Str("s".into())))]),
        )
        .with_child("returnType", type_node(3, type_flags::TYPE_STRING))],
    )
    .with_child("extends", name(2, "Base"));
    let (_, issues) = analyze(stmt_list(1, vec![base, child]));
    assert_eq!(
        issues,
        vec![
            "src:3 PhanSignatureMismatch Declaration of \\Child::m should be compatible with \\Base::m defined in src:1"
        ]
    );
}

#[test]
fn compatible_override_is_silent() {
    let make = |line: u32, class_name: &str| {
        class(
            line,
            0,
            class_name,
            vec![method(
                line,
                modifier_flags::MODIFIER_PUBLIC,
                "m",
                vec![param(line, 0, Some(type_node(line, type_flags::TYPE_LONG)), "x", None)],
                Some(vec![ret(line, Some(Child::Int(1)))]),
            )
            .with_child("returnType", type_node(line, type_flags::TYPE_LONG))],
        )
    };
    let base = make(1, "Base");
    let child = make(2, "Child").with_child("extends", name(2, "Base"));
    let (_, issues) = analyze(stmt_list(1, vec![base, child]));
    assert_eq!(issues, Vec::<String>::new());
}

#[test]
fn generic_container_methods_substitute_templates() {
    // class Container with @template T, method first(): T via doc.
    // class IntBox extends Container with @inherits Container<int>.
    // function f(IntBox $b): int { return $b->first(); } is clean.
    let container = class(
        1,
        0,
        "Container",
        vec![method(
            2,
            modifier_flags::MODIFIER_PUBLIC,
            "first",
            vec![],
            Some(vec![ret(2, Some(Child::Int(1)))]),
        )
        .with_doc("/** @return T */")],
    )
    .with_doc("/** @template T */");
    let int_box = class(4, 0, "IntBox", vec![])
        .with_child("extends", name(4, "Container"))
        .with_doc("/** @inherits Container<int> */");
    let user = func_decl(
        6,
        "f",
        vec![param(6, 0, Some(name(6, "IntBox")), "b", None)],
        vec![ret(
            7,
            Some(Child::Node(method_call(7, var(7, "b"), "first", vec![]))),
        )],
    )
    .with_child("returnType", type_node(6, type_flags::TYPE_LONG));
    let (codebase, issues) = analyze(stmt_list(1, vec![container, int_box, user]));
    assert_eq!(issues, Vec::<String>::new());
    // The inherited copy is concretely typed.
    let first = codebase
        .get_method_by_fqsen(phast_types::MethodFqsen::new(
            ClassFqsen::from_full_name("\\IntBox"),
            phast_common::Atom::new("first"),
        ))
        .unwrap();
    assert_eq!(first.union_type, UnionType::of(Type::INT));
}
