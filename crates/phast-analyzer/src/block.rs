//! Statement walking and scope management.
//!
//! `analyze_node` threads an immutable [`Context`] through the statement
//! list: scopes open on class/function/method/closure entry, branching
//! constructs clone the scope per branch and merge the results, and
//! expression statements run through the type visitor for their side
//! effects and noop checks.

use crate::parse::{apply_use_elem, use_kind_from_flags};
use crate::state::AnalysisState;
use phast_ast::{Child, Kind, Node};
use phast_codebase::ElementFlags;
use phast_common::issue::catalog;
use phast_common::Atom;
use phast_types::{
    ClassFqsen, Context, FunctionFqsen, FunctionLikeFqsen, MethodFqsen, NativeType, Scope, Type,
    UnionType, Variable,
};
use rustc_hash::FxHashMap;
use tracing::debug;

impl AnalysisState<'_> {
    pub fn analyze_file(&mut self, file: Atom, root: &Node) {
        debug!(file = %file, "analysis pass");
        let ctx = Context::new(file);
        self.analyze_node(ctx, root);
    }

    /// Analyze one statement node, returning the context its successors
    /// see.
    pub fn analyze_node(&mut self, ctx: Context, node: &Node) -> Context {
        let ctx = ctx.with_line(node.line);
        match node.kind {
            Kind::StmtList => {
                let mut ctx = ctx;
                for stmt in node.list().iter().filter_map(Child::as_node) {
                    self.check_statement_noop(&ctx, stmt);
                    ctx = self.analyze_node(ctx, stmt);
                }
                ctx
            }

            // ==================== Scope visitor duties ====================
            Kind::Namespace => {
                let inner = match node.child_str("name") {
                    Some(name) => ctx.with_namespace(Atom::new(name)),
                    None => ctx.with_namespace(Atom::empty()),
                };
                match node.child_node("stmts") {
                    Some(stmts) => {
                        self.analyze_node(inner, stmts);
                        ctx
                    }
                    None => inner,
                }
            }
            Kind::Use => {
                let kind = use_kind_from_flags(node.flags);
                node.list()
                    .iter()
                    .filter_map(Child::as_node)
                    .fold(ctx, |ctx, elem| apply_use_elem(&ctx, kind, elem, None))
            }
            Kind::GroupUse => {
                let kind = use_kind_from_flags(node.flags);
                let prefix = node.child_str("prefix").map(str::to_owned);
                match node.child_node("uses") {
                    Some(uses) => uses
                        .list()
                        .iter()
                        .filter_map(Child::as_node)
                        .fold(ctx, |ctx, elem| {
                            apply_use_elem(&ctx, kind, elem, prefix.as_deref())
                        }),
                    None => ctx,
                }
            }
            Kind::Declare => match node.child("strict_types") {
                Some(Child::Int(1)) => ctx.with_strict_types(true),
                _ => ctx,
            },

            // ==================== Declarations ====================
            Kind::Class => {
                self.analyze_class(&ctx, node);
                ctx
            }
            Kind::FuncDecl => {
                self.analyze_function_like(&ctx, node, None);
                ctx
            }

            // ==================== Control flow ====================
            Kind::If => self.analyze_if(ctx, node),
            Kind::While => self.analyze_loop(ctx, node, true),
            Kind::DoWhile => self.analyze_do_while(ctx, node),
            Kind::For => self.analyze_for(ctx, node),
            Kind::Foreach => self.analyze_foreach(ctx, node),
            Kind::Switch => self.analyze_switch(ctx, node),
            Kind::Try => self.analyze_try(ctx, node),

            // ==================== Simple statements ====================
            Kind::Return => {
                self.analyze_return(&ctx, node);
                ctx
            }
            Kind::Echo => {
                for child in node.list() {
                    self.union_type_of_child(&ctx, &child.clone());
                }
                ctx
            }
            Kind::Throw => {
                if let Some(expr) = node.child_node("expr") {
                    self.union_type_of(&ctx, expr);
                }
                ctx
            }
            Kind::Global => {
                let mut ctx = ctx;
                for var in node.list().iter().filter_map(Child::as_node) {
                    if let Some(name) = var.child_str("name") {
                        let union = self
                            .config
                            .globals_type_map
                            .get(name)
                            .map(|s| UnionType::from_string_in_context(s, &ctx))
                            .unwrap_or_else(|| UnionType::of(Type::MIXED));
                        ctx = ctx.with_variable(Variable::new(Atom::new(name), union));
                    }
                }
                ctx
            }
            Kind::StaticVar => {
                let mut ctx = ctx;
                if let Some(name) = node.child_str("name") {
                    let union = node
                        .child("default")
                        .and_then(|d| crate::parse::default_value_type(d))
                        .map(UnionType::of)
                        .unwrap_or_default();
                    ctx = ctx.with_variable(Variable::new(Atom::new(name), union));
                }
                ctx
            }
            Kind::Unset => {
                let mut scope = ctx.scope().branch_clone();
                for var in node.list().iter().filter_map(Child::as_node) {
                    if var.kind == Kind::Var {
                        if let Some(name) = var.child_str("name") {
                            scope.remove_variable(Atom::new(name));
                        }
                    }
                }
                ctx.with_scope(scope)
            }
            Kind::Break | Kind::Continue => ctx,

            // ==================== Assignments ====================
            Kind::Assign => {
                let right = node
                    .child("expr")
                    .cloned()
                    .map(|c| self.union_type_of_child(&ctx, &c))
                    .unwrap_or_default();
                match node.child_node("var") {
                    Some(target) => self.analyze_assignment(ctx, target, &right, false),
                    None => ctx,
                }
            }
            Kind::AssignOp => {
                let right = node
                    .child("expr")
                    .cloned()
                    .map(|c| self.union_type_of_child(&ctx, &c))
                    .unwrap_or_default();
                let Some(target) = node.child_node("var") else {
                    return ctx;
                };
                let left = self.union_type_of(&ctx, target);
                let result = self.binary_op_result(&ctx, node.flags, &left, &right);
                self.analyze_assignment(ctx, target, &result, false)
            }
            Kind::AssignRef => {
                let right = node
                    .child_node("expr")
                    .map(|e| self.union_type_of(&ctx, e))
                    .unwrap_or_default();
                let Some(target) = node.child_node("var") else {
                    return ctx;
                };
                if target.kind == Kind::Var {
                    if let Some(name) = target.child_str("name") {
                        return ctx.with_variable(Variable::reference(Atom::new(name), right));
                    }
                }
                ctx
            }

            // Everything else is an expression statement.
            _ => {
                self.check_backward_compatibility(&ctx, node);
                self.union_type_of(&ctx, node);
                ctx
            }
        }
    }

    // ==================== Declarations ====================

    fn analyze_class(&mut self, ctx: &Context, node: &Node) {
        let Some(name) = node.child_str("name") else {
            return;
        };
        let fqsen = ClassFqsen::new(ctx.namespace(), Atom::new(name));
        let (template_map, suppressions): (FxHashMap<Atom, UnionType>, Vec<Atom>) =
            match self.codebase.get_class_by_fqsen(fqsen) {
                Ok(class) => (
                    class
                        .template_types
                        .iter()
                        .map(|t| (*t, UnionType::empty()))
                        .collect(),
                    class.suppressions.to_vec(),
                ),
                Err(_) => (FxHashMap::default(), Vec::new()),
            };
        let class_ctx = ctx
            .with_scope(Scope::class(fqsen, template_map))
            .with_added_suppressions(suppressions);

        let Some(stmts) = node.child_node("stmts") else {
            return;
        };
        for member in stmts.list().iter().filter_map(Child::as_node) {
            if member.kind == Kind::Method {
                self.analyze_function_like(&class_ctx, member, Some(fqsen));
            }
        }
    }

    /// Open the closed scope of a function or method and analyze its
    /// body.
    fn analyze_function_like(
        &mut self,
        ctx: &Context,
        node: &Node,
        class_fqsen: Option<ClassFqsen>,
    ) {
        let Some(name) = node.child_str("name") else {
            return;
        };
        let (fqsen, parameters, return_type, flags, suppressions) = match class_fqsen {
            Some(class_fqsen) => {
                let method_fqsen = MethodFqsen::new(class_fqsen, Atom::new(name));
                let Ok(method) = self.codebase.get_method_by_fqsen(method_fqsen) else {
                    return;
                };
                (
                    FunctionLikeFqsen::Method(method_fqsen),
                    method.parameters.clone(),
                    method.union_type.clone(),
                    method.flags,
                    method.suppressions.to_vec(),
                )
            }
            None => {
                let func_fqsen = FunctionFqsen::new(ctx.namespace(), Atom::new(name));
                let Ok(func) = self.codebase.get_function_by_fqsen(func_fqsen) else {
                    return;
                };
                (
                    FunctionLikeFqsen::Function(func_fqsen),
                    func.parameters.clone(),
                    func.union_type.clone(),
                    func.flags,
                    func.suppressions.to_vec(),
                )
            }
        };

        let mut scope = Scope::function_like(ctx.scope(), fqsen);
        for parameter in &parameters {
            let mut variable = Variable::new(parameter.name, parameter.union_type.clone());
            variable.is_reference = parameter.is_by_ref;
            scope.add_variable(variable);
        }
        if let Some(class_fqsen) = class_fqsen {
            if !flags.contains(ElementFlags::STATIC) {
                scope.add_variable(Variable::new(
                    Atom::new("this"),
                    UnionType::of(Type::class(class_fqsen)),
                ));
            }
        }
        let body_ctx = ctx.with_scope(scope).with_added_suppressions(suppressions);

        let Some(stmts) = node.child_node("stmts") else {
            return;
        };
        self.analyze_node(body_ctx.clone(), stmts);
        self.check_missing_return(&body_ctx, node, stmts, fqsen, &return_type, flags);
    }

    fn check_missing_return(
        &mut self,
        ctx: &Context,
        node: &Node,
        stmts: &Node,
        fqsen: FunctionLikeFqsen,
        return_type: &UnionType,
        flags: ElementFlags,
    ) {
        if return_type.is_empty()
            || flags.intersects(ElementFlags::YIELDS | ElementFlags::ABSTRACT)
        {
            return;
        }
        let tolerant = return_type.has_native(NativeType::Void)
            || return_type.has_native(NativeType::Null)
            || return_type.has_native(NativeType::Mixed)
            || phast_codebase::hydrate::is_traversable_union(return_type);
        if tolerant {
            return;
        }
        let has_return = stmts.any_in_body(&|n| {
            n.kind == Kind::Return && n.child("expr").is_some()
        });
        if !has_return {
            self.emit(
                ctx,
                &catalog::TYPE_MISSING_RETURN,
                node.line,
                vec![fqsen.to_string(), return_type.to_string()],
            );
        }
    }

    fn analyze_return(&mut self, ctx: &Context, node: &Node) {
        let value_type = node
            .child("expr")
            .cloned()
            .map(|c| self.union_type_of_child(ctx, &c));
        let Some(value_type) = value_type else {
            return;
        };
        let Some(fqsen) = ctx.function_fqsen_in_scope() else {
            return;
        };
        let declared = match fqsen {
            FunctionLikeFqsen::Method(f) => self
                .codebase
                .get_method_by_fqsen(f)
                .map(|m| m.union_type.clone()),
            FunctionLikeFqsen::Function(f) => self
                .codebase
                .get_function_by_fqsen(f)
                .map(|f| f.union_type.clone()),
        };
        let Ok(declared) = declared else {
            return;
        };
        if declared.is_empty() || value_type.is_empty() {
            return;
        }
        // Template returns are judged at the instantiation site, not in
        // the generic body.
        if declared.has_template_type() {
            return;
        }
        let expanded = value_type.as_expanded_types(self.codebase);
        if !expanded.can_cast_to_union(&declared, self.codebase) {
            self.emit(
                ctx,
                &catalog::TYPE_MISMATCH_RETURN,
                node.line,
                vec![
                    value_type.to_string(),
                    fqsen.to_string(),
                    declared.to_string(),
                ],
            );
        }
    }

    // ==================== Branching ====================

    fn analyze_if(&mut self, ctx: Context, node: &Node) -> Context {
        let mut branches = Vec::new();
        let mut has_else = false;
        for elem in node.list().iter().filter_map(Child::as_node) {
            let cond = elem.child_node("cond");
            let branch_ctx = ctx.with_scope(ctx.scope().branch_clone());
            let branch_ctx = match cond {
                Some(cond) => {
                    // The guard runs for its side effects, then narrows
                    // the branch.
                    self.union_type_of(&branch_ctx, cond);
                    self.narrow_condition(&branch_ctx, cond)
                }
                None => {
                    has_else = true;
                    branch_ctx
                }
            };
            let after = match elem.child_node("stmts") {
                Some(stmts) => self.analyze_node(branch_ctx, stmts),
                None => branch_ctx,
            };
            branches.push(after);
        }
        if !has_else {
            // The fall-through path counts as a branch.
            branches.push(ctx.clone());
        }
        self.merge_branch_scopes(&ctx, &branches)
    }

    fn analyze_loop(&mut self, ctx: Context, node: &Node, narrow: bool) -> Context {
        let branch_ctx = ctx.with_scope(ctx.scope().branch_clone());
        let branch_ctx = match node.child_node("cond") {
            Some(cond) => {
                self.union_type_of(&branch_ctx, cond);
                if narrow {
                    self.narrow_condition(&branch_ctx, cond)
                } else {
                    branch_ctx
                }
            }
            None => branch_ctx,
        };
        let after = match node.child_node("stmts") {
            Some(stmts) => self.analyze_node(branch_ctx, stmts),
            None => branch_ctx,
        };
        // The body may run zero times.
        self.merge_branch_scopes(&ctx, &[after, ctx.clone()])
    }

    fn analyze_do_while(&mut self, ctx: Context, node: &Node) -> Context {
        let branch_ctx = ctx.with_scope(ctx.scope().branch_clone());
        let after = match node.child_node("stmts") {
            Some(stmts) => self.analyze_node(branch_ctx, stmts),
            None => branch_ctx,
        };
        if let Some(cond) = node.child_node("cond") {
            self.union_type_of(&after, cond);
        }
        // The body runs at least once.
        self.merge_branch_scopes(&ctx, &[after])
    }

    fn analyze_for(&mut self, ctx: Context, node: &Node) -> Context {
        let mut ctx = ctx;
        if let Some(init) = node.child_node("init") {
            ctx = self.analyze_node(ctx, init);
        }
        let branch_ctx = ctx.with_scope(ctx.scope().branch_clone());
        if let Some(cond) = node.child_node("cond") {
            self.union_type_of(&branch_ctx, cond);
        }
        let after = match node.child_node("stmts") {
            Some(stmts) => self.analyze_node(branch_ctx, stmts),
            None => branch_ctx,
        };
        if let Some(loop_expr) = node.child_node("loop") {
            self.union_type_of(&after, loop_expr);
        }
        self.merge_branch_scopes(&ctx, &[after, ctx.clone()])
    }

    fn analyze_foreach(&mut self, ctx: Context, node: &Node) -> Context {
        let iterated = node
            .child_node("expr")
            .map(|e| self.union_type_of(&ctx, e))
            .unwrap_or_default();

        let traversable = iterated.is_empty()
            || iterated.has_native(NativeType::Mixed)
            || iterated.types().any(Type::is_array_like)
            || !iterated.class_fqsens().is_empty();
        if !traversable {
            self.emit(
                &ctx,
                &catalog::TYPE_MISMATCH_FOREACH,
                node.line,
                vec![iterated.to_string()],
            );
        }

        let mut element = iterated.generic_array_element_types();
        if element.is_empty() && !iterated.class_fqsens().is_empty() {
            element = UnionType::of(Type::MIXED);
        }

        let mut branch_scope = ctx.scope().branch_clone();
        if let Some(value) = node.child_node("value") {
            if value.kind == Kind::Var {
                if let Some(name) = value.child_str("name") {
                    branch_scope.add_variable(Variable::new(Atom::new(name), element.clone()));
                }
            }
        }
        if let Some(key) = node.child_node("key") {
            if let Some(name) = key.child_str("name") {
                branch_scope.add_variable(Variable::new(
                    Atom::new(name),
                    UnionType::from_types([Type::INT, Type::STRING]),
                ));
            }
        }
        let branch_ctx = ctx.with_scope(branch_scope);
        let after = match node.child_node("stmts") {
            Some(stmts) => self.analyze_node(branch_ctx, stmts),
            None => branch_ctx,
        };
        self.merge_branch_scopes(&ctx, &[after, ctx.clone()])
    }

    fn analyze_switch(&mut self, ctx: Context, node: &Node) -> Context {
        if let Some(cond) = node.child_node("cond") {
            self.union_type_of(&ctx, cond);
        }
        let mut branches = Vec::new();
        if let Some(cases) = node.child_node("stmts") {
            for case in cases.list().iter().filter_map(Child::as_node) {
                if let Some(case_cond) = case.child_node("cond") {
                    self.union_type_of(&ctx, case_cond);
                }
                let branch_ctx = ctx.with_scope(ctx.scope().branch_clone());
                let after = match case.child_node("stmts") {
                    Some(stmts) => self.analyze_node(branch_ctx, stmts),
                    None => branch_ctx,
                };
                branches.push(after);
            }
        }
        // Fall-through without a matching case.
        branches.push(ctx.clone());
        self.merge_branch_scopes(&ctx, &branches)
    }

    fn analyze_try(&mut self, ctx: Context, node: &Node) -> Context {
        let try_ctx = match node.child_node("try") {
            Some(stmts) => {
                let branch_ctx = ctx.with_scope(ctx.scope().branch_clone());
                self.analyze_node(branch_ctx, stmts)
            }
            None => ctx.clone(),
        };

        let mut catch_ctxs = Vec::new();
        if let Some(catches) = node.child_node("catches") {
            for catch in catches.list().iter().filter_map(Child::as_node) {
                let mut caught = UnionType::empty();
                if let Some(classes) = catch.child_node("classes") {
                    for class_node in classes.list().iter().filter_map(Child::as_node) {
                        if let Ok(fqsen) = self.resolve_class_node(&ctx, class_node) {
                            if !self.codebase.has_class_with_fqsen(fqsen) {
                                self.emit(
                                    &ctx,
                                    &catalog::UNDECLARED_CLASS_CATCH,
                                    catch.line,
                                    vec![fqsen.to_string()],
                                );
                            }
                            caught.add_type(Type::class(fqsen));
                        }
                    }
                }
                let mut catch_scope = ctx.scope().branch_clone();
                if let Some(var_name) = catch.child_str("var") {
                    catch_scope.add_variable(Variable::new(Atom::new(var_name), caught));
                }
                let catch_ctx = ctx.with_scope(catch_scope);
                let after = match catch.child_node("stmts") {
                    Some(stmts) => self.analyze_node(catch_ctx, stmts),
                    None => catch_ctx,
                };
                catch_ctxs.push(after);
            }
        }

        let finally_ctx = node.child_node("finally").map(|stmts| {
            let branch_ctx = ctx.with_scope(ctx.scope().branch_clone());
            self.analyze_node(branch_ctx, stmts)
        });

        self.merge_try_scopes(&ctx, &try_ctx, &catch_ctxs, finally_ctx.as_ref())
    }

    // ==================== Statement-position checks ====================

    /// Side-effect-free expressions in statement position.
    fn check_statement_noop(&mut self, ctx: &Context, node: &Node) {
        let issue = match node.kind {
            Kind::Var => &catalog::NOOP_VARIABLE,
            Kind::Const | Kind::ClassConst => &catalog::NOOP_CONSTANT,
            Kind::Prop | Kind::StaticProp => &catalog::NOOP_PROPERTY,
            Kind::Array => &catalog::NOOP_ARRAY,
            Kind::Closure => &catalog::NOOP_CLOSURE,
            _ => return,
        };
        self.emit(ctx, issue, node.line, Vec::new());
    }

    /// PHP 5 evaluated `$obj->$prop[i]` differently than PHP 7.
    fn check_backward_compatibility(&mut self, ctx: &Context, node: &Node) {
        if !self.config.backward_compatibility_checks {
            return;
        }
        if node.kind != Kind::Dim {
            return;
        }
        let Some(expr) = node.child_node("expr") else {
            return;
        };
        if matches!(expr.kind, Kind::Prop | Kind::StaticProp)
            && expr.child_str("prop").is_none()
            && expr.child("prop").is_some()
        {
            self.emit(ctx, &catalog::COMPATIBLE_PHP7, node.line, Vec::new());
        }
    }
}
