//! Joining sibling contexts after branching constructs.

use crate::state::AnalysisState;
use phast_common::Atom;
use phast_types::{Context, Type, UnionType, Variable};
use rustc_hash::FxHashSet;

impl AnalysisState<'_> {
    /// Join the contexts of `if`/`elseif`/`else` branches.
    ///
    /// A variable defined on every branch gets the union of its
    /// per-branch types. A variable defined on only some branches gets
    /// the union plus `null` - or, under strict types, is not
    /// propagated at all. When the branches do not cover every path
    /// (no `else`), the caller passes the outer context as one of the
    /// branches.
    pub fn merge_branch_scopes(&self, outer: &Context, branches: &[Context]) -> Context {
        if branches.is_empty() {
            return outer.clone();
        }
        let mut names: FxHashSet<Atom> = FxHashSet::default();
        for branch in branches {
            names.extend(branch.scope().variable_names());
        }

        let mut scope = outer.scope().branch_clone();
        for name in names {
            let present: Vec<&Variable> = branches
                .iter()
                .filter_map(|b| b.scope().get_variable(name))
                .collect();
            if present.len() == branches.len() {
                let mut union = UnionType::empty();
                for variable in &present {
                    union.add_union(&variable.union_type);
                }
                scope.add_variable(Variable::new(name, union));
            } else if !outer.is_strict_types() {
                let mut union = UnionType::empty();
                for variable in &present {
                    union.add_union(&variable.union_type);
                }
                union.add_type(Type::NULL);
                scope.add_variable(Variable::new(name, union));
            }
        }
        outer.with_scope(scope)
    }

    /// Join `try`/`catch`/`finally` contexts.
    ///
    /// Starts from the try block's variables; variables also present in
    /// a catch widen with the catch's type, variables present only in
    /// catches gain `null` to signal possible absence, and a `finally`
    /// block's final types overwrite everything.
    pub fn merge_try_scopes(
        &self,
        outer: &Context,
        try_ctx: &Context,
        catch_ctxs: &[Context],
        finally_ctx: Option<&Context>,
    ) -> Context {
        let mut scope = try_ctx.scope().branch_clone();

        let mut catch_names: FxHashSet<Atom> = FxHashSet::default();
        for catch_ctx in catch_ctxs {
            catch_names.extend(catch_ctx.scope().variable_names());
        }
        for name in catch_names {
            let mut union = UnionType::empty();
            for catch_ctx in catch_ctxs {
                if let Some(variable) = catch_ctx.scope().get_variable(name) {
                    union.add_union(&variable.union_type);
                }
            }
            match try_ctx.scope().get_variable(name) {
                Some(existing) => {
                    union.add_union(&existing.union_type);
                    scope.add_variable(Variable::new(name, union));
                }
                None => {
                    union.add_type(Type::NULL);
                    scope.add_variable(Variable::new(name, union));
                }
            }
        }

        if let Some(finally_ctx) = finally_ctx {
            for variable in finally_ctx.scope().variables() {
                scope.add_variable(variable.clone());
            }
        }
        outer.with_scope(scope)
    }
}
