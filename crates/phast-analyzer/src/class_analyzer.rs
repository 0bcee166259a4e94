//! Per-class analyzers.
//!
//! These run after hydration, before the file analysis pass: duplicate
//! reporting, ancestor existence, required parent constructor calls,
//! declared-type validity for properties, parameters and returns,
//! default-value sanity, and override signature compatibility. The
//! reference-count dead-code pass runs last, after file analysis.

use crate::state::AnalysisState;
use phast_codebase::{ElementFlags, Method, RedefineRecord};
use phast_common::issue::catalog;
use phast_types::{ClassFqsen, Context, Type, UnionType};
use tracing::debug;

impl AnalysisState<'_> {
    /// Run every per-class analyzer.
    pub fn analyze_classes(&mut self) {
        self.report_redefinitions();
        let fqsens = self.codebase.class_fqsens();
        for fqsen in fqsens {
            let Ok(class) = self.codebase.get_class_by_fqsen(fqsen) else {
                continue;
            };
            if class.flags.contains(ElementFlags::INTERNAL) {
                continue;
            }
            self.check_ancestry(fqsen);
            self.check_parent_constructor(fqsen);
            self.check_property_types(fqsen);
            self.check_method_types(fqsen);
            if self.config.analyze_signature_compatibility {
                self.check_override_signatures(fqsen);
            }
        }
        self.check_function_types();
    }

    fn class_context(&self, fqsen: ClassFqsen) -> Option<Context> {
        let class = self.codebase.get_class_by_fqsen(fqsen).ok()?;
        Some(
            Context::new(class.file)
                .with_line(class.line)
                .with_added_suppressions(class.suppressions.iter().copied()),
        )
    }

    // ==================== Redefinitions ====================

    fn report_redefinitions(&mut self) {
        let records: Vec<RedefineRecord> = self.codebase.redefine_records().to_vec();
        for record in records {
            match record {
                RedefineRecord::Class { new, previous } => {
                    let (Ok(new_class), Ok(previous_class)) = (
                        self.codebase.get_class_by_fqsen(new),
                        self.codebase.get_class_by_fqsen(previous),
                    ) else {
                        continue;
                    };
                    let args = vec![
                        format!("{} {}", new_class.kind_label(), previous),
                        new_class.file.to_string(),
                        new_class.line.to_string(),
                        format!("{} {}", previous_class.kind_label(), previous),
                        previous_class.file.to_string(),
                        previous_class.line.to_string(),
                    ];
                    let (file, line) = (new_class.file, new_class.line);
                    let ctx = Context::new(file).with_line(line);
                    self.emit(&ctx, &catalog::REDEFINE_CLASS, line, args);
                }
                RedefineRecord::Function {
                    new,
                    previous,
                    previous_is_internal,
                } => {
                    let Ok(new_func) = self.codebase.get_function_by_fqsen(new) else {
                        continue;
                    };
                    let (file, line) = (new_func.file, new_func.line);
                    let ctx = Context::new(file).with_line(line);
                    if previous_is_internal {
                        let args = vec![
                            previous.to_string(),
                            file.to_string(),
                            line.to_string(),
                        ];
                        self.emit(&ctx, &catalog::REDEFINE_FUNCTION_INTERNAL, line, args);
                    } else {
                        let Ok(previous_func) = self.codebase.get_function_by_fqsen(previous)
                        else {
                            continue;
                        };
                        let args = vec![
                            previous.to_string(),
                            file.to_string(),
                            line.to_string(),
                            previous_func.file.to_string(),
                            previous_func.line.to_string(),
                        ];
                        self.emit(&ctx, &catalog::REDEFINE_FUNCTION, line, args);
                    }
                }
            }
        }
    }

    // ==================== Ancestry ====================

    fn check_ancestry(&mut self, fqsen: ClassFqsen) {
        let Some(ctx) = self.class_context(fqsen) else {
            return;
        };
        let Ok(class) = self.codebase.get_class_by_fqsen(fqsen) else {
            return;
        };
        let line = class.line;
        let parent = class.parent;
        let interfaces = class.interfaces.clone();
        let traits = class.traits.clone();

        if let Some(parent) = parent {
            if !self.codebase.has_class_with_fqsen(parent) {
                self.emit(
                    &ctx,
                    &catalog::UNDECLARED_EXTENDED_CLASS,
                    line,
                    vec![parent.to_string()],
                );
            }
        }
        for interface in interfaces {
            if !self.codebase.has_class_with_fqsen(interface) {
                self.emit(
                    &ctx,
                    &catalog::UNDECLARED_INTERFACE,
                    line,
                    vec![interface.to_string()],
                );
            }
        }
        for trait_fqsen in traits {
            if !self.codebase.has_class_with_fqsen(trait_fqsen) {
                self.emit(
                    &ctx,
                    &catalog::UNDECLARED_TRAIT,
                    line,
                    vec![trait_fqsen.to_string()],
                );
            }
        }
    }

    // ==================== Parent constructor ====================

    fn check_parent_constructor(&mut self, fqsen: ClassFqsen) {
        if self.config.parent_constructor_required.is_empty() {
            return;
        }
        let Some(ctx) = self.class_context(fqsen) else {
            return;
        };
        let Ok(class) = self.codebase.get_class_by_fqsen(fqsen) else {
            return;
        };
        let line = class.line;
        let Some(parent) = class.parent else {
            return;
        };
        let required = self.config.parent_constructor_required.iter().any(|name| {
            let wanted = name.trim_start_matches('\\');
            parent
                .to_string()
                .trim_start_matches('\\')
                .eq_ignore_ascii_case(wanted)
                || parent.name.as_str().eq_ignore_ascii_case(wanted)
        });
        if !required {
            return;
        }
        let ctor_fqsen = phast_types::MethodFqsen::new(fqsen, phast_common::Atom::new("__construct"));
        let Ok(ctor) = self.codebase.get_method_by_fqsen(ctor_fqsen) else {
            return;
        };
        // Only a constructor declared on this class can be at fault.
        if ctor.defining_fqsen.class != fqsen {
            return;
        }
        if !ctor.flags.contains(ElementFlags::CALLS_PARENT_CTOR) {
            self.emit(
                &ctx,
                &catalog::TYPE_PARENT_CONSTRUCTOR_CALLED,
                line,
                vec![fqsen.to_string(), parent.to_string()],
            );
        }
    }

    // ==================== Declared-type validity ====================

    fn undeclared_class_types(&self, union: &UnionType) -> Vec<ClassFqsen> {
        union
            .types()
            .filter_map(Type::class_fqsen)
            .filter(|f| !self.codebase.has_class_with_fqsen(*f))
            .collect()
    }

    fn check_property_types(&mut self, fqsen: ClassFqsen) {
        let Some(ctx) = self.class_context(fqsen) else {
            return;
        };
        let properties: Vec<_> = self
            .codebase
            .properties_for_class(fqsen)
            .filter(|p| p.defining_fqsen.class == fqsen)
            .filter(|p| !p.flags.contains(ElementFlags::DYNAMIC))
            .map(|p| (p.fqsen, p.line, p.union_type.clone()))
            .collect();
        for (prop_fqsen, line, union) in properties {
            for unknown in self.undeclared_class_types(&union) {
                self.emit(
                    &ctx,
                    &catalog::UNDECLARED_TYPE_PROPERTY,
                    line,
                    vec![prop_fqsen.to_string(), unknown.to_string()],
                );
            }
        }
    }

    fn check_method_types(&mut self, fqsen: ClassFqsen) {
        let Some(ctx) = self.class_context(fqsen) else {
            return;
        };
        let methods: Vec<Method> = self
            .codebase
            .methods_for_class(fqsen)
            .filter(|m| m.defining_fqsen.class == fqsen)
            .filter(|m| !m.flags.contains(ElementFlags::INTERNAL))
            .cloned()
            .collect();
        for method in methods {
            let ctx = ctx.with_added_suppressions(method.suppressions.iter().copied());
            self.check_signature_types(&ctx, &method.fqsen.to_string(), method.line, &method.parameters, &method.union_type);
        }
    }

    fn check_function_types(&mut self) {
        let functions: Vec<_> = self
            .codebase
            .functions()
            .filter(|f| !f.is_internal())
            .map(|f| {
                (
                    f.fqsen.to_string(),
                    f.file,
                    f.line,
                    f.parameters.clone(),
                    f.union_type.clone(),
                    f.suppressions.to_vec(),
                )
            })
            .collect();
        for (label, file, line, parameters, return_type, suppressions) in functions {
            let ctx = Context::new(file)
                .with_line(line)
                .with_added_suppressions(suppressions);
            self.check_signature_types(&ctx, &label, line, &parameters, &return_type);
        }
    }

    fn check_signature_types(
        &mut self,
        ctx: &Context,
        label: &str,
        line: u32,
        parameters: &[phast_codebase::Parameter],
        return_type: &UnionType,
    ) {
        for parameter in parameters {
            for unknown in self.undeclared_class_types(&parameter.union_type) {
                self.emit(
                    ctx,
                    &catalog::UNDECLARED_TYPE_PARAMETER,
                    parameter.line.max(line),
                    vec![unknown.to_string()],
                );
            }
            // Defaults must satisfy the declared type.
            if !parameter.union_type.is_empty()
                && !parameter.default_type.is_empty()
                && !parameter
                    .default_type
                    .can_cast_to_union(&parameter.union_type, self.codebase)
            {
                self.emit(
                    ctx,
                    &catalog::TYPE_MISMATCH_DEFAULT,
                    parameter.line.max(line),
                    vec![
                        parameter.union_type.to_string(),
                        parameter.name.to_string(),
                        parameter.default_type.to_string(),
                    ],
                );
            }
        }
        for unknown in self.undeclared_class_types(return_type) {
            self.emit(
                ctx,
                &catalog::UNDECLARED_TYPE_RETURN_TYPE,
                line,
                vec![label.to_owned(), unknown.to_string()],
            );
        }
    }

    // ==================== Override compatibility ====================

    fn check_override_signatures(&mut self, fqsen: ClassFqsen) {
        let Some(ctx) = self.class_context(fqsen) else {
            return;
        };
        let methods: Vec<Method> = self
            .codebase
            .methods_for_class(fqsen)
            .filter(|m| m.defining_fqsen.class == fqsen)
            .filter(|m| !m.is_constructor())
            .cloned()
            .collect();
        if methods.is_empty() {
            return;
        }
        let ancestors = self.non_trait_ancestors(fqsen);
        for method in methods {
            for &ancestor in &ancestors {
                let ancestor_fqsen =
                    phast_types::MethodFqsen::new(ancestor, method.fqsen.name);
                let Ok(base) = self.codebase.get_method_by_fqsen(ancestor_fqsen) else {
                    continue;
                };
                // Compare against the declaration, wherever this
                // ancestor inherited it from.
                if base.defining_fqsen.class != ancestor {
                    continue;
                }
                let base = base.clone();
                let ctx = ctx.with_added_suppressions(method.suppressions.iter().copied());
                self.compare_override(&ctx, &method, &base);
            }
        }
    }

    /// Parent chain plus interfaces, transitively; traits excluded
    /// (trait methods are flattened into the class, not overridden).
    fn non_trait_ancestors(&self, fqsen: ClassFqsen) -> Vec<ClassFqsen> {
        let mut out = Vec::new();
        let mut visited = rustc_hash::FxHashSet::default();
        let mut pending = vec![fqsen];
        while let Some(current) = pending.pop() {
            let Ok(class) = self.codebase.get_class_by_fqsen(current) else {
                continue;
            };
            for ancestor in class.parent.into_iter().chain(class.interfaces.iter().copied()) {
                let key = {
                    let (ns, name, _) = ancestor.canonical();
                    (ns, name)
                };
                if visited.insert(key) {
                    out.push(ancestor);
                    pending.push(ancestor);
                }
            }
        }
        out
    }

    fn compare_override(&mut self, ctx: &Context, method: &Method, base: &Method) {
        let line = method.line;
        let base_is_internal = base.flags.contains(ElementFlags::INTERNAL);

        // Static-ness and by-ref-ness must agree.
        if method.is_static() != base.is_static() {
            let issue = if base.is_static() {
                &catalog::ACCESS_STATIC_TO_NON_STATIC
            } else {
                &catalog::ACCESS_NON_STATIC_TO_STATIC
            };
            self.emit(ctx, issue, line, vec![method.fqsen.to_string()]);
            return;
        }

        // Visibility cannot narrow.
        if method.flags.visibility_rank() > base.flags.visibility_rank() {
            self.emit(
                ctx,
                &catalog::ACCESS_SIGNATURE_MISMATCH,
                line,
                vec![
                    method.fqsen.to_string(),
                    base.fqsen.to_string(),
                    base.file.to_string(),
                    base.line.to_string(),
                ],
            );
            return;
        }

        let mut compatible = true;
        if method.required_param_count > base.required_param_count {
            compatible = false;
        }
        if method.parameters.len() < base.parameters.len() {
            compatible = false;
        }
        if method.flags.contains(ElementFlags::RETURNS_REF)
            != base.flags.contains(ElementFlags::RETURNS_REF)
        {
            compatible = false;
        }
        if compatible {
            let shared = method.parameters.len().min(base.parameters.len());
            for i in 0..shared {
                let ours = &method.parameters[i];
                let theirs = &base.parameters[i];
                if ours.is_by_ref != theirs.is_by_ref {
                    compatible = false;
                    break;
                }
                if theirs.union_type.is_empty()
                    || theirs.union_type.has_native(phast_types::NativeType::Mixed)
                {
                    continue;
                }
                // The base parameter must be reachable from the
                // override's parameter type.
                if !ours
                    .union_type
                    .can_cast_to_union(&theirs.union_type, self.codebase)
                {
                    compatible = false;
                    break;
                }
            }
        }
        // Covariant return.
        if compatible
            && !base.union_type.is_empty()
            && !method
                .union_type
                .can_cast_to_union(&base.union_type, self.codebase)
        {
            compatible = false;
        }

        if !compatible {
            if base_is_internal {
                self.emit(
                    ctx,
                    &catalog::SIGNATURE_MISMATCH_INTERNAL,
                    line,
                    vec![method.fqsen.to_string(), base.fqsen.to_string()],
                );
            } else {
                self.emit(
                    ctx,
                    &catalog::SIGNATURE_MISMATCH,
                    line,
                    vec![
                        method.fqsen.to_string(),
                        base.fqsen.to_string(),
                        base.file.to_string(),
                        base.line.to_string(),
                    ],
                );
            }
        }
    }

    // ==================== Dead code ====================

    /// Report declarations with zero recorded references. Requires the
    /// single-process global view.
    pub fn analyze_dead_code(&mut self) {
        debug!("dead code pass");
        let fqsens = self.codebase.class_fqsens();
        for fqsen in fqsens {
            let Ok(class) = self.codebase.get_class_by_fqsen(fqsen) else {
                continue;
            };
            if class.flags.contains(ElementFlags::INTERNAL) {
                continue;
            }
            let Some(ctx) = self.class_context(fqsen) else {
                continue;
            };
            let line = class.line;
            if self.codebase.class_total_reference_count(fqsen) == 0 {
                self.emit(
                    &ctx,
                    &catalog::UNREFERENCED_CLASS,
                    line,
                    vec![fqsen.to_string()],
                );
            }

            let members: Vec<(&'static phast_common::Issue, String, u32)> = self
                .codebase
                .methods_for_class(fqsen)
                .filter(|m| m.defining_fqsen.class == fqsen)
                .filter(|m| !m.name.as_str().starts_with("__"))
                .filter(|m| m.references.is_empty())
                .map(|m| (&catalog::UNREFERENCED_METHOD, m.fqsen.to_string(), m.line))
                .chain(
                    self.codebase
                        .properties_for_class(fqsen)
                        .filter(|p| p.defining_fqsen.class == fqsen)
                        .filter(|p| !p.flags.contains(ElementFlags::DYNAMIC))
                        .filter(|p| p.references.is_empty())
                        .map(|p| (&catalog::UNREFERENCED_PROPERTY, p.fqsen.to_string(), p.line)),
                )
                .chain(
                    self.codebase
                        .class_constants_for_class(fqsen)
                        .filter(|c| !c.flags.contains(ElementFlags::INTERNAL))
                        .filter(|c| c.references.is_empty())
                        .map(|c| (&catalog::UNREFERENCED_CONSTANT, c.fqsen.to_string(), c.line)),
                )
                .collect();
            for (issue, display, line) in members {
                self.emit(&ctx, issue, line, vec![display]);
            }
        }

        let functions: Vec<_> = self
            .codebase
            .functions()
            .filter(|f| !f.is_internal())
            .filter(|f| !f.name.as_str().starts_with("closure_"))
            .filter(|f| f.references.is_empty())
            .map(|f| (f.fqsen.to_string(), f.file, f.line))
            .collect();
        for (display, file, line) in functions {
            let ctx = Context::new(file).with_line(line);
            self.emit(&ctx, &catalog::UNREFERENCED_FUNCTION, line, vec![display]);
        }
    }
}
