//! Call-site argument validation.
//!
//! Checks arity (variadic- and unpack-aware, with overload alternates),
//! pass-by-reference shape, and castability of each actual against its
//! formal. A handful of builtins with arity-dependent signatures get
//! hand-coded second-case checks.

use crate::state::AnalysisState;
use phast_ast::{Child, Kind, Node};
use phast_codebase::{Func, Method, Parameter};
use phast_common::issue::catalog;
use phast_common::Atom;
use phast_types::{Context, NativeType, MethodFqsen, UnionType};

/// An owned snapshot of a callee's signature, detached from the
/// CodeBase borrow.
pub(crate) struct CalleeSignature {
    /// Display form for messages, e.g. `\f` or `\A::m`.
    pub label: String,
    /// Bare lowercased name, for the special-case table.
    pub short_name: String,
    pub parameters: Vec<Parameter>,
    pub required: usize,
    pub is_internal: bool,
    pub file: Atom,
    pub line: u32,
    /// Overload alternates (for internal functions), primary included.
    pub alternates: Vec<AlternateSignature>,
}

pub(crate) struct AlternateSignature {
    pub parameters: Vec<Parameter>,
    pub required: usize,
}

impl CalleeSignature {
    pub fn for_method(method: &Method) -> Self {
        Self {
            label: method.fqsen.to_string(),
            short_name: method.name.to_lowercase().as_str().to_owned(),
            parameters: method.parameters.clone(),
            required: method.required_param_count,
            is_internal: method.flags.contains(phast_codebase::ElementFlags::INTERNAL),
            file: method.file,
            line: method.line,
            alternates: vec![AlternateSignature {
                parameters: method.parameters.clone(),
                required: method.required_param_count,
            }],
        }
    }

    pub fn for_function(func: &Func, alternates: Vec<&Func>) -> Self {
        let alternates = alternates
            .iter()
            .map(|alt| AlternateSignature {
                parameters: alt.parameters.clone(),
                required: alt.required_param_count,
            })
            .collect();
        Self {
            label: func.fqsen.to_string(),
            short_name: func.name.to_lowercase().as_str().to_owned(),
            parameters: func.parameters.clone(),
            required: func.required_param_count,
            is_internal: func.is_internal(),
            file: func.file,
            line: func.line,
            alternates,
        }
    }

    fn is_variadic(&self) -> bool {
        self.parameters.iter().any(|p| p.is_variadic)
    }
}

impl AlternateSignature {
    fn accepts_count(&self, argc: usize) -> bool {
        let variadic = self.parameters.iter().any(|p| p.is_variadic);
        argc >= self.required && (variadic || argc <= self.parameters.len())
    }
}

impl AnalysisState<'_> {
    pub(crate) fn analyze_call_args(
        &mut self,
        ctx: &Context,
        signature: &CalleeSignature,
        args_node: &Node,
        arg_types: &[UnionType],
    ) {
        let args = args_node.list();
        let argc = args.len();
        let has_unpack = args
            .iter()
            .filter_map(Child::as_node)
            .any(|a| a.kind == Kind::Unpack);

        // Arity. Spread arguments defeat counting.
        if !has_unpack {
            if argc < signature.required
                && !signature.alternates.iter().any(|a| a.accepts_count(argc))
            {
                let (issue, mut issue_args) = if signature.is_internal {
                    (
                        &catalog::PARAM_TOO_FEW_INTERNAL,
                        vec![
                            argc.to_string(),
                            signature.label.clone(),
                            signature.required.to_string(),
                        ],
                    )
                } else {
                    (
                        &catalog::PARAM_TOO_FEW,
                        vec![
                            argc.to_string(),
                            signature.label.clone(),
                            signature.required.to_string(),
                        ],
                    )
                };
                if !signature.is_internal {
                    issue_args.push(signature.file.to_string());
                    issue_args.push(signature.line.to_string());
                }
                self.emit(ctx, issue, 0, issue_args);
            }
            if argc > signature.parameters.len()
                && !signature.is_variadic()
                && !signature.alternates.iter().any(|a| a.accepts_count(argc))
            {
                let mut issue_args = vec![
                    argc.to_string(),
                    signature.label.clone(),
                    signature.parameters.len().to_string(),
                ];
                let issue = if signature.is_internal {
                    &catalog::PARAM_TOO_MANY_INTERNAL
                } else {
                    issue_args.push(signature.file.to_string());
                    issue_args.push(signature.line.to_string());
                    &catalog::PARAM_TOO_MANY
                };
                self.emit(ctx, issue, 0, issue_args);
            }
        }

        // Pass-by-reference actuals must be writable places.
        for (i, child) in args.iter().enumerate() {
            let formal = self.formal_at(signature, i);
            let Some(formal) = formal else {
                continue;
            };
            if !formal.is_by_ref {
                continue;
            }
            let acceptable = matches!(
                child,
                Child::Node(node) if matches!(
                    node.kind,
                    Kind::Var | Kind::Dim | Kind::Prop | Kind::StaticProp
                )
            );
            if !acceptable {
                self.emit(
                    ctx,
                    &catalog::TYPE_NON_VAR_PASS_BY_REF,
                    0,
                    vec![(i + 1).to_string(), signature.label.clone()],
                );
            }
        }

        // Arity-dependent builtins take over type checking entirely.
        if self.check_param_special(ctx, signature, arg_types) {
            return;
        }

        for (i, actual) in arg_types.iter().enumerate() {
            let Some(formal) = self.formal_at(signature, i).cloned() else {
                continue;
            };
            if formal.union_type.is_empty() || actual.is_empty() {
                continue;
            }
            if self.config.quick_mode && formal.has_doc_type {
                continue;
            }
            let expanded = actual.as_expanded_types(self.codebase);
            let mut ok = expanded.can_cast_to_union(&formal.union_type, self.codebase);
            if !ok && !ctx.is_strict_types() && formal.union_type.has_native(NativeType::String) {
                ok = self.has_to_string_method(actual);
            }
            if !ok {
                // Another overload may accept this position.
                ok = signature.alternates.iter().any(|alt| {
                    alt.parameters.get(i).is_some_and(|p| {
                        !p.union_type.is_empty()
                            && expanded.can_cast_to_union(&p.union_type, self.codebase)
                    })
                });
            }
            if ok {
                continue;
            }
            // Signature-declared expectations use the short form; doc
            // comment expectations carry the declaration site.
            if signature.is_internal || !formal.has_doc_type {
                self.emit(
                    ctx,
                    &catalog::TYPE_MISMATCH_ARGUMENT_INTERNAL,
                    0,
                    vec![
                        (i + 1).to_string(),
                        formal.name.to_string(),
                        actual.to_string(),
                        signature.label.clone(),
                        formal.union_type.to_string(),
                    ],
                );
            } else {
                self.emit(
                    ctx,
                    &catalog::TYPE_MISMATCH_ARGUMENT,
                    0,
                    vec![
                        (i + 1).to_string(),
                        formal.name.to_string(),
                        actual.to_string(),
                        signature.label.clone(),
                        formal.union_type.to_string(),
                        signature.file.to_string(),
                        signature.line.to_string(),
                    ],
                );
            }
        }
    }

    fn formal_at<'s>(
        &self,
        signature: &'s CalleeSignature,
        position: usize,
    ) -> Option<&'s Parameter> {
        match signature.parameters.get(position) {
            Some(parameter) => Some(parameter),
            None => signature.parameters.last().filter(|p| p.is_variadic),
        }
    }

    /// Whether a class-typed actual can stringify itself.
    fn has_to_string_method(&self, actual: &UnionType) -> bool {
        actual.class_fqsens().iter().any(|&fqsen| {
            self.codebase
                .has_method_with_fqsen(MethodFqsen::new(fqsen, Atom::new("__toString")))
        })
    }

    /// Hand-coded checks for builtins whose expectations depend on
    /// arity or sibling arguments. Returns true when this callee is one
    /// of them.
    fn check_param_special(
        &mut self,
        ctx: &Context,
        signature: &CalleeSignature,
        arg_types: &[UnionType],
    ) -> bool {
        let is_string = |u: &UnionType| u.has_native(NativeType::String);
        let is_array = |u: &UnionType| u.types().any(phast_types::Type::is_array_like);
        let is_callable = |u: &UnionType| {
            u.has_native(NativeType::Callable)
                || is_string(u)
                || u.types()
                    .any(|t| matches!(t, phast_types::Type::Callable(_)))
                || u.has_native(NativeType::Mixed)
                || u.is_empty()
        };

        match signature.short_name.as_str() {
            "implode" | "join" => {
                if arg_types.len() == 2 {
                    let (glue, pieces) = (&arg_types[0], &arg_types[1]);
                    if glue.is_empty() || pieces.is_empty() {
                        return true;
                    }
                    // Either order is fine, but both sides of one kind
                    // are not.
                    if is_array(glue) && is_array(pieces) {
                        self.emit(
                            ctx,
                            &catalog::PARAM_SPECIAL1,
                            0,
                            vec![
                                "2".to_owned(),
                                "pieces".to_owned(),
                                pieces.to_string(),
                                signature.label.clone(),
                                "string".to_owned(),
                                "1".to_owned(),
                                "array".to_owned(),
                            ],
                        );
                    } else if is_string(glue) && is_string(pieces) && !is_array(pieces) {
                        self.emit(
                            ctx,
                            &catalog::PARAM_SPECIAL1,
                            0,
                            vec![
                                "2".to_owned(),
                                "pieces".to_owned(),
                                pieces.to_string(),
                                signature.label.clone(),
                                "array".to_owned(),
                                "1".to_owned(),
                                "string".to_owned(),
                            ],
                        );
                    }
                }
                true
            }
            "min" | "max" => {
                if arg_types.len() == 1 && !arg_types[0].is_empty() && !is_array(&arg_types[0]) {
                    self.emit(
                        ctx,
                        &catalog::PARAM_SPECIAL2,
                        0,
                        vec![
                            "1".to_owned(),
                            "values".to_owned(),
                            arg_types[0].to_string(),
                            signature.label.clone(),
                            "array".to_owned(),
                        ],
                    );
                }
                true
            }
            "strtok" => {
                if arg_types.len() == 1 && !arg_types[0].is_empty() && !is_string(&arg_types[0]) {
                    self.emit(
                        ctx,
                        &catalog::PARAM_SPECIAL2,
                        0,
                        vec![
                            "1".to_owned(),
                            "token".to_owned(),
                            arg_types[0].to_string(),
                            signature.label.clone(),
                            "string".to_owned(),
                        ],
                    );
                }
                true
            }
            "array_udiff" | "array_diff_uassoc" | "array_uintersect" => {
                if let Some(last) = arg_types.last() {
                    if arg_types.len() >= 3 && !is_callable(last) {
                        self.emit(
                            ctx,
                            &catalog::PARAM_SPECIAL3,
                            0,
                            vec![signature.label.clone(), "callable".to_owned()],
                        );
                    }
                }
                true
            }
            "array_udiff_uassoc" | "array_uintersect_uassoc" => {
                if arg_types.len() >= 4 {
                    if let Some(last) = arg_types.last() {
                        if !is_callable(last) {
                            self.emit(
                                ctx,
                                &catalog::PARAM_SPECIAL3,
                                0,
                                vec![signature.label.clone(), "callable".to_owned()],
                            );
                        }
                    }
                    let second_last = &arg_types[arg_types.len() - 2];
                    if !is_callable(second_last) {
                        self.emit(
                            ctx,
                            &catalog::PARAM_SPECIAL4,
                            0,
                            vec![signature.label.clone(), "callable".to_owned()],
                        );
                    }
                }
                true
            }
            _ => false,
        }
    }
}
