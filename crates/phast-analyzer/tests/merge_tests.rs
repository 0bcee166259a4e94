//! Direct tests of the context-merge rules.

use phast_analyzer::AnalysisState;
use phast_codebase::CodeBase;
use phast_common::{Atom, Collector, Config};
use phast_types::{Context, Type, UnionType, Variable};

fn with_state<R>(f: impl FnOnce(&mut AnalysisState<'_>) -> R) -> R {
    let mut codebase = CodeBase::empty();
    let config = Config::default();
    let mut collector = Collector::new();
    let mut state = AnalysisState::new(&mut codebase, &config, &mut collector);
    f(&mut state)
}

fn outer() -> Context {
    Context::new(Atom::new("t.php"))
}

fn bind(ctx: &Context, name: &str, ty: Type) -> Context {
    ctx.with_variable(Variable::new(Atom::new(name), UnionType::of(ty)))
}

#[test]
fn variable_on_all_branches_unions_per_branch_types() {
    with_state(|state| {
        let outer = outer();
        let b1 = bind(&outer, "v", Type::INT);
        let b2 = bind(&outer, "v", Type::STRING);
        let merged = state.merge_branch_scopes(&outer, &[b1, b2]);
        let v = merged.scope().get_variable(Atom::new("v")).unwrap();
        assert_eq!(
            v.union_type,
            UnionType::from_types([Type::INT, Type::STRING])
        );
    });
}

#[test]
fn variable_on_some_branches_gains_null() {
    with_state(|state| {
        let outer = outer();
        let b1 = bind(&outer, "v", Type::INT);
        let merged = state.merge_branch_scopes(&outer, &[b1, outer.clone()]);
        let v = merged.scope().get_variable(Atom::new("v")).unwrap();
        assert_eq!(v.union_type, UnionType::from_types([Type::INT, Type::NULL]));
    });
}

#[test]
fn strict_mode_does_not_propagate_partial_variables() {
    with_state(|state| {
        let outer = outer().with_strict_types(true);
        let b1 = bind(&outer, "v", Type::INT);
        let merged = state.merge_branch_scopes(&outer, &[b1, outer.clone()]);
        assert!(merged.scope().get_variable(Atom::new("v")).is_none());
    });
}

#[test]
fn outer_variables_survive_merges_untouched() {
    with_state(|state| {
        let outer = bind(&outer(), "kept", Type::BOOL);
        let b1 = outer.with_scope(outer.scope().branch_clone());
        let b2 = outer.with_scope(outer.scope().branch_clone());
        let merged = state.merge_branch_scopes(&outer, &[b1, b2]);
        let kept = merged.scope().get_variable(Atom::new("kept")).unwrap();
        assert_eq!(kept.union_type, UnionType::of(Type::BOOL));
    });
}

#[test]
fn try_variables_widen_with_catch_types() {
    with_state(|state| {
        let outer = outer();
        let try_ctx = bind(&outer, "v", Type::INT);
        let catch_ctx = bind(&outer, "v", Type::STRING);
        let merged = state.merge_try_scopes(&outer, &try_ctx, &[catch_ctx], None);
        let v = merged.scope().get_variable(Atom::new("v")).unwrap();
        assert_eq!(
            v.union_type,
            UnionType::from_types([Type::INT, Type::STRING])
        );
    });
}

#[test]
fn catch_only_variables_gain_null() {
    with_state(|state| {
        let outer = outer();
        let try_ctx = outer.with_scope(outer.scope().branch_clone());
        let catch_ctx = bind(&outer, "e", Type::STRING);
        let merged = state.merge_try_scopes(&outer, &try_ctx, &[catch_ctx], None);
        let e = merged.scope().get_variable(Atom::new("e")).unwrap();
        assert_eq!(
            e.union_type,
            UnionType::from_types([Type::STRING, Type::NULL])
        );
    });
}

#[test]
fn finally_types_overwrite() {
    with_state(|state| {
        let outer = outer();
        let try_ctx = bind(&outer, "v", Type::INT);
        let finally_ctx = bind(&outer, "v", Type::STRING);
        let merged = state.merge_try_scopes(&outer, &try_ctx, &[], Some(&finally_ctx));
        let v = merged.scope().get_variable(Atom::new("v")).unwrap();
        assert_eq!(v.union_type, UnionType::of(Type::STRING));
    });
}
