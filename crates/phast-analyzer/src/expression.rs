//! Expression type inference.
//!
//! One visitor method per node kind; the default arm yields the empty
//! union. The public entry point `union_type_of` catches the internal
//! failure taxonomy at the boundary and degrades to the empty union.

use crate::arguments::CalleeSignature;
use crate::error::{AnalysisError, AnalysisResult};
use crate::state::AnalysisState;
use phast_ast::flags::{magic_const_flags, unary_flags};
use phast_ast::{Child, Kind, Node};
use phast_codebase::{ElementFlags, Func, Parameter};
use phast_common::issue::catalog;
use phast_common::{Atom, IssueInstance};
use phast_types::scope::superglobals;
use phast_types::{
    ClassConstFqsen, ClassFqsen, Context, Fqsen, FunctionFqsen, FunctionLikeFqsen, MethodFqsen,
    NativeType, PropertyFqsen, Scope, Type, UnionType, Variable,
};
use rustc_hash::FxHashMap;

/// How many array-literal elements the homogeneity heuristic samples.
const ARRAY_SHAPE_SAMPLE: usize = 5;

impl AnalysisState<'_> {
    /// Infer the type of an expression node, emitting recoverable issues.
    pub fn union_type_of(&mut self, ctx: &Context, node: &Node) -> UnionType {
        let result = self.visit_expr(ctx, node);
        self.expr_boundary(ctx, result)
    }

    /// Infer the type of a child slot (literal or node).
    pub fn union_type_of_child(&mut self, ctx: &Context, child: &Child) -> UnionType {
        match child {
            Child::Node(node) => self.union_type_of(ctx, node),
            literal => Type::from_literal(literal)
                .map(UnionType::of)
                .unwrap_or_default(),
        }
    }

    pub(crate) fn visit_expr(&mut self, ctx: &Context, node: &Node) -> AnalysisResult<UnionType> {
        let ctx = &ctx.with_line(node.line);
        match node.kind {
            Kind::Var => self.visit_var(ctx, node),
            Kind::Const => self.visit_const(ctx, node),
            Kind::MagicConst => Ok(match node.flags {
                magic_const_flags::MAGIC_LINE => UnionType::of(Type::INT),
                _ => UnionType::of(Type::STRING),
            }),
            Kind::EncapsList => Ok(UnionType::of(Type::STRING)),
            Kind::Array => self.visit_array(ctx, node),
            Kind::Cast => Ok(UnionType::of(Type::Native(
                crate::parse::native_from_type_flags(node.flags),
            ))),
            Kind::BinaryOp => self.visit_binary_op(ctx, node),
            Kind::UnaryOp => self.visit_unary_op(ctx, node),
            Kind::Conditional => self.visit_conditional(ctx, node),
            Kind::Dim => self.visit_dim(ctx, node),
            Kind::New => self.visit_new(ctx, node),
            Kind::Instanceof => self.visit_instanceof(ctx, node),
            Kind::Clone => {
                let expr = node
                    .child_node("expr")
                    .ok_or(AnalysisError::NodeShape("clone without operand"))?;
                Ok(self.union_type_of(ctx, expr))
            }
            Kind::PreInc | Kind::PreDec | Kind::PostInc | Kind::PostDec => {
                self.visit_inc_dec(ctx, node)
            }
            Kind::Isset | Kind::Empty => Ok(UnionType::of(Type::BOOL)),
            Kind::Print => Ok(UnionType::of(Type::INT)),
            Kind::Prop => self.visit_prop(ctx, node),
            Kind::StaticProp => self.visit_static_prop(ctx, node),
            Kind::ClassConst => self.visit_class_const(ctx, node),
            Kind::MethodCall => self.visit_method_call(ctx, node, false),
            Kind::StaticCall => self.visit_method_call(ctx, node, true),
            Kind::Call => self.visit_call(ctx, node),
            Kind::Closure => self.visit_closure(ctx, node),
            Kind::Assign | Kind::AssignOp => {
                // Expression-position assignment: yields the assigned
                // value's type. The statement walk threads the scope
                // update.
                let value = node
                    .child("expr")
                    .cloned()
                    .ok_or(AnalysisError::NodeShape("assign without value"))?;
                Ok(self.union_type_of_child(ctx, &value))
            }
            // Assign-by-reference is not modeled; its value contributes
            // no type information.
            Kind::AssignRef => Ok(UnionType::empty()),
            Kind::List => Ok(UnionType::of(Type::ARRAY)),
            Kind::Yield | Kind::YieldFrom => Ok(UnionType::empty()),
            _ => Ok(UnionType::empty()),
        }
    }

    // ==================== Leaves ====================

    fn visit_var(&mut self, ctx: &Context, node: &Node) -> AnalysisResult<UnionType> {
        let Some(name) = node.child_str("name") else {
            // Variable-variables are beyond the engine.
            return Err(AnalysisError::Unanalyzable);
        };
        if let Some(variable) = ctx.scope().get_variable(Atom::new(name)) {
            return Ok(variable.union_type.clone());
        }
        if let Some(union) = superglobals::union_type(name) {
            return Ok(union);
        }
        if self.config.runkit_superglobals.iter().any(|s| s == name) {
            return Ok(UnionType::empty());
        }
        if let Some(type_string) = self.config.globals_type_map.get(name) {
            return Ok(UnionType::from_string_in_context(type_string, ctx));
        }
        if ctx.is_in_global_scope() && self.config.ignore_undeclared_variables_in_global_scope {
            return Ok(UnionType::empty());
        }
        Err(AnalysisError::raise(IssueInstance::new(
            &catalog::UNDECLARED_VARIABLE,
            ctx.file().as_str(),
            ctx.line(),
            vec![name.to_owned()],
        )))
    }

    fn visit_const(&mut self, ctx: &Context, node: &Node) -> AnalysisResult<UnionType> {
        let name_node = node
            .child_node("name")
            .ok_or(AnalysisError::NodeShape("const without name"))?;
        let name = name_node
            .child_str("name")
            .ok_or(AnalysisError::NodeShape("name node without text"))?;
        match name.to_ascii_lowercase().as_str() {
            "true" | "false" => return Ok(UnionType::of(Type::BOOL)),
            "null" => return Ok(UnionType::of(Type::NULL)),
            _ => {}
        }
        let (primary, fallback) = ctx.resolve_constant_name(name, name_node.flags);
        for candidate in std::iter::once(primary.clone()).chain(fallback) {
            let fqsen = phast_types::GlobalConstFqsen::from_full_name(&candidate);
            if let Ok(constant) = self.codebase.get_global_constant_by_fqsen(fqsen) {
                let union = constant.union_type.clone();
                self.record_reference(ctx, Fqsen::GlobalConst(fqsen));
                return Ok(union);
            }
        }
        Err(AnalysisError::raise(IssueInstance::new(
            &catalog::UNDECLARED_CONSTANT,
            ctx.file().as_str(),
            ctx.line(),
            vec![primary],
        )))
    }

    // ==================== Composites ====================

    fn visit_array(&mut self, ctx: &Context, node: &Node) -> AnalysisResult<UnionType> {
        let elements: Vec<&Node> = node.list().iter().filter_map(Child::as_node).collect();
        if elements.is_empty() {
            return Ok(UnionType::of(Type::ARRAY));
        }
        // Peek at the first few elements only; a homogeneous sample
        // promotes the literal to a generic array.
        let mut sampled: Vec<UnionType> = Vec::new();
        for element in elements.iter().take(ARRAY_SHAPE_SAMPLE) {
            let value = element.child("value").cloned();
            match value {
                Some(value) => sampled.push(self.union_type_of_child(ctx, &value)),
                None => sampled.push(UnionType::empty()),
            }
        }
        let first = &sampled[0];
        let homogeneous =
            first.len() == 1 && !first.is_empty() && sampled.iter().all(|u| u == first);
        if homogeneous {
            Ok(first.as_generic_array_types())
        } else {
            Ok(UnionType::of(Type::ARRAY))
        }
    }

    fn visit_unary_op(&mut self, ctx: &Context, node: &Node) -> AnalysisResult<UnionType> {
        let operand = node.child("expr").cloned();
        let operand_type = operand
            .map(|o| self.union_type_of_child(ctx, &o))
            .unwrap_or_default();
        Ok(match node.flags {
            unary_flags::UNARY_BOOL_NOT => UnionType::of(Type::BOOL),
            unary_flags::UNARY_BITWISE_NOT => UnionType::of(Type::INT),
            unary_flags::UNARY_MINUS | unary_flags::UNARY_PLUS => {
                numeric_result(&operand_type)
            }
            unary_flags::UNARY_SILENCE => operand_type,
            _ => UnionType::empty(),
        })
    }

    fn visit_inc_dec(&mut self, ctx: &Context, node: &Node) -> AnalysisResult<UnionType> {
        let operand = node
            .child("var")
            .or_else(|| node.child("expr"))
            .cloned();
        let operand_type = operand
            .map(|o| self.union_type_of_child(ctx, &o))
            .unwrap_or_default();
        Ok(numeric_result(&operand_type))
    }

    fn visit_conditional(&mut self, ctx: &Context, node: &Node) -> AnalysisResult<UnionType> {
        let true_ctx = match node.child_node("cond") {
            Some(cond) => {
                // The guard also runs for its side effects.
                self.union_type_of(ctx, cond);
                self.narrow_condition(ctx, cond)
            }
            None => ctx.clone(),
        };
        let true_type = match node.child("true") {
            Some(child) => self.union_type_of_child(&true_ctx, &child.clone()),
            // Short ternary: the condition's value is the true side.
            None => match node.child_node("cond") {
                Some(cond) => self.union_type_of(&true_ctx, cond),
                None => UnionType::empty(),
            },
        };
        let false_type = match node.child("false") {
            Some(child) => self.union_type_of_child(ctx, &child.clone()),
            None => UnionType::empty(),
        };

        let mut union = true_type.clone();
        union.add_union(&false_type);
        // Exactly one empty side widens with mixed; both empty stays
        // empty.
        if true_type.is_empty() != false_type.is_empty() {
            union.add_type(Type::MIXED);
        }
        Ok(union)
    }

    fn visit_dim(&mut self, ctx: &Context, node: &Node) -> AnalysisResult<UnionType> {
        let expr = node
            .child_node("expr")
            .ok_or(AnalysisError::NodeShape("dim without expression"))?;
        let expr_type = self.union_type_of(ctx, expr);
        if let Some(index) = node.child("dim") {
            self.union_type_of_child(ctx, &index.clone());
        }
        if expr_type.is_empty() || expr_type.has_native(NativeType::Mixed) {
            return Ok(UnionType::empty());
        }
        let mut result = expr_type.generic_array_element_types();
        if expr_type.has_native(NativeType::String) {
            result.add_type(Type::STRING);
        }
        if result.is_empty() && !expr_type.has_native(NativeType::Array) {
            self.emit(
                ctx,
                &catalog::TYPE_ARRAY_SUSPICIOUS,
                0,
                vec![expr_type.to_string()],
            );
        }
        Ok(result)
    }

    fn visit_instanceof(&mut self, ctx: &Context, node: &Node) -> AnalysisResult<UnionType> {
        if let Some(expr) = node.child_node("expr") {
            self.union_type_of(ctx, expr);
        }
        if let Some(class_node) = node.child_node("class") {
            if class_node.kind == Kind::Name {
                if let Ok(fqsen) = self.resolve_class_node(ctx, class_node) {
                    if !self.codebase.has_class_with_fqsen(fqsen) {
                        self.emit(
                            ctx,
                            &catalog::UNDECLARED_CLASS_INSTANCEOF,
                            0,
                            vec![fqsen.to_string()],
                        );
                    } else {
                        self.record_reference(ctx, Fqsen::Class(fqsen));
                    }
                }
            }
        }
        Ok(UnionType::of(Type::BOOL))
    }

    fn visit_new(&mut self, ctx: &Context, node: &Node) -> AnalysisResult<UnionType> {
        let class_node = node
            .child_node("class")
            .ok_or(AnalysisError::NodeShape("new without class"))?;
        if class_node.kind != Kind::Name {
            // `new $className` instantiates something; all we know is
            // that it is an object.
            return Ok(UnionType::of(Type::OBJECT));
        }
        let fqsen = self.resolve_class_node(ctx, class_node)?;
        if !self.codebase.has_class_with_fqsen(fqsen) {
            return Err(AnalysisError::raise(IssueInstance::new(
                &catalog::UNDECLARED_CLASS,
                ctx.file().as_str(),
                ctx.line(),
                vec![fqsen.to_string()],
            )));
        }

        let (is_interface, is_abstract, is_deprecated, is_generic, templates, file, line) = {
            let class = self.codebase.get_class_by_fqsen(fqsen)?;
            (
                class.is_interface(),
                class.is_abstract(),
                class.flags.contains(ElementFlags::DEPRECATED),
                class.is_generic(),
                class.template_types.clone(),
                class.file,
                class.line,
            )
        };
        if is_interface {
            self.emit(
                ctx,
                &catalog::TYPE_INSTANTIATE_INTERFACE,
                0,
                vec![fqsen.to_string()],
            );
        } else if is_abstract {
            self.emit(
                ctx,
                &catalog::TYPE_INSTANTIATE_ABSTRACT,
                0,
                vec![fqsen.to_string()],
            );
        }
        if is_deprecated {
            self.emit(
                ctx,
                &catalog::DEPRECATED_CLASS,
                0,
                vec![fqsen.to_string(), file.to_string(), line.to_string()],
            );
        }
        self.record_reference(ctx, Fqsen::Class(fqsen));

        // Constructor: argument validation plus reference tracking.
        let ctor_fqsen = MethodFqsen::new(fqsen, Atom::new("__construct"));
        let arg_types = self.arg_list_types(ctx, node.child_node("args"));
        if let Ok(ctor) = self.codebase.get_method_by_fqsen(ctor_fqsen) {
            let signature = CalleeSignature::for_method(ctor);
            self.record_reference(ctx, Fqsen::Method(ctor_fqsen));
            if let Some(args) = node.child_node("args") {
                self.analyze_call_args(ctx, &signature, args, &arg_types);
            }
        }

        // A generic class pairs constructor arguments with its template
        // list, in order.
        if is_generic && self.config.generic_types_enabled {
            if arg_types.len() < templates.len() {
                let missing: Vec<String> = templates[arg_types.len()..]
                    .iter()
                    .map(|t| t.to_string())
                    .collect();
                self.emit(
                    ctx,
                    &catalog::GENERIC_CONSTRUCTOR_TYPES,
                    0,
                    vec![missing.join(","), fqsen.to_string()],
                );
            }
            let params: Vec<UnionType> = templates
                .iter()
                .enumerate()
                .map(|(i, _)| arg_types.get(i).cloned().unwrap_or_default())
                .collect();
            return Ok(UnionType::of(Type::ClassInstance { fqsen, params }));
        }
        Ok(UnionType::of(Type::class(fqsen)))
    }

    fn visit_closure(&mut self, ctx: &Context, node: &Node) -> AnalysisResult<UnionType> {
        let fqsen = FunctionFqsen::for_closure(ctx.file(), node.line);
        if !self.codebase.has_function_with_fqsen(fqsen) {
            let mut func = Func::new(fqsen, ctx.file(), node.line, ElementFlags::empty());
            func.parameters = self.closure_parameters(ctx, node);
            func.recount_parameters();
            self.codebase.add_function(func);
        }

        // Open the closed scope, capture `use` variables, bind
        // parameters, and analyze the body in place.
        let mut scope = Scope::function_like(ctx.scope(), FunctionLikeFqsen::Function(fqsen));
        if let Some(uses) = node.child_node("uses") {
            for captured in uses.list().iter().filter_map(Child::as_node) {
                let Some(name) = captured.child_str("name") else {
                    continue;
                };
                let atom = Atom::new(name);
                let union = ctx
                    .scope()
                    .get_variable(atom)
                    .map(|v| v.union_type.clone())
                    .unwrap_or_default();
                scope.add_variable(Variable::new(atom, union));
            }
        }
        if let Ok(func) = self.codebase.get_function_by_fqsen(fqsen) {
            for parameter in func.parameters.clone() {
                scope.add_variable(Variable::new(parameter.name, parameter.union_type));
            }
        }
        // `$this` flows into closures declared in a method body.
        if let Some(class_fqsen) = ctx.class_fqsen_in_scope() {
            scope.add_variable(Variable::new(
                Atom::new("this"),
                UnionType::of(Type::class(class_fqsen)),
            ));
        }
        let body_ctx = ctx.with_scope(scope);
        if let Some(stmts) = node.child_node("stmts") {
            self.analyze_node(body_ctx, stmts);
        }

        Ok(UnionType::of(Type::Callable(fqsen)))
    }

    fn closure_parameters(&mut self, ctx: &Context, node: &Node) -> Vec<Parameter> {
        let Some(params) = node.child_node("params") else {
            return Vec::new();
        };
        params
            .list()
            .iter()
            .filter_map(Child::as_node)
            .filter_map(|param| {
                let name = param.child_str("name")?;
                let union = param
                    .child_node("type")
                    .map(|t| crate::parse::type_node_to_union(ctx, t))
                    .unwrap_or_default();
                let mut parameter = Parameter::new(Atom::new(name), union, param.line);
                parameter.is_by_ref =
                    param.flags & phast_ast::flags::param_flags::PARAM_REF != 0;
                parameter.is_variadic =
                    param.flags & phast_ast::flags::param_flags::PARAM_VARIADIC != 0;
                parameter.has_default = param.child("default").is_some();
                Some(parameter)
            })
            .collect()
    }

    // ==================== Members ====================

    fn visit_prop(&mut self, ctx: &Context, node: &Node) -> AnalysisResult<UnionType> {
        let Some(prop_name) = node.child_str("prop") else {
            return Err(AnalysisError::NodeShape("dynamic property name"));
        };
        let expr = node
            .child_node("expr")
            .ok_or(AnalysisError::NodeShape("property access without object"))?;
        let receiver = self.union_type_of(ctx, expr);
        let class_fqsens = receiver.class_fqsens();
        if class_fqsens.is_empty() {
            return Ok(UnionType::empty());
        }
        self.property_type(ctx, &receiver, &class_fqsens, prop_name, false)
    }

    fn visit_static_prop(&mut self, ctx: &Context, node: &Node) -> AnalysisResult<UnionType> {
        let Some(prop_name) = node.child_str("prop") else {
            return Err(AnalysisError::NodeShape("dynamic property name"));
        };
        let class_node = node
            .child_node("class")
            .ok_or(AnalysisError::NodeShape("static property without class"))?;
        let fqsen = self.resolve_class_node(ctx, class_node)?;
        if !self.codebase.has_class_with_fqsen(fqsen) {
            return Err(AnalysisError::raise(IssueInstance::new(
                &catalog::UNDECLARED_STATIC_PROPERTY,
                ctx.file().as_str(),
                ctx.line(),
                vec![prop_name.to_owned(), fqsen.to_string()],
            )));
        }
        let receiver = UnionType::of(Type::class(fqsen));
        self.property_type(ctx, &receiver, &[fqsen], prop_name, true)
    }

    /// Look `prop_name` up on every class in the receiver union.
    fn property_type(
        &mut self,
        ctx: &Context,
        receiver: &UnionType,
        class_fqsens: &[ClassFqsen],
        prop_name: &str,
        is_static: bool,
    ) -> AnalysisResult<UnionType> {
        let name = Atom::new(prop_name);
        for &class_fqsen in class_fqsens {
            let prop_fqsen = PropertyFqsen::new(class_fqsen, name);
            let Ok(property) = self.codebase.get_property_by_fqsen(prop_fqsen) else {
                continue;
            };
            let flags = property.flags;
            let defining = property.defining_fqsen;
            let (file, line) = (property.file, property.line);
            let mut union = property.union_type.clone();

            self.check_member_visibility(
                ctx,
                flags,
                defining.class,
                &catalog::ACCESS_PROPERTY_PRIVATE,
                &catalog::ACCESS_PROPERTY_PROTECTED,
                &prop_fqsen.to_string(),
                (file, line),
            )?;
            if flags.contains(ElementFlags::DEPRECATED) {
                self.emit(
                    ctx,
                    &catalog::DEPRECATED_PROPERTY,
                    0,
                    vec![prop_fqsen.to_string(), file.to_string(), line.to_string()],
                );
            }

            let template_map = self.receiver_template_map(class_fqsen, receiver);
            union = union.with_template_parameter_type_map(&template_map);
            // `static` only means something inside the defining class.
            if ctx.class_fqsen_in_scope() != Some(defining.class) {
                union.remove_static_type();
            }
            self.record_reference(ctx, Fqsen::Property(prop_fqsen));
            return Ok(union);
        }

        // Unresolved: __get synthesizes a dynamic property.
        for &class_fqsen in class_fqsens {
            let getter = MethodFqsen::new(class_fqsen, Atom::new("__get"));
            if let Ok(magic) = self.codebase.get_method_by_fqsen(getter) {
                let union = magic.union_type.clone();
                let mut synthesized = phast_codebase::Property::new(
                    PropertyFqsen::new(class_fqsen, name),
                    ctx.file(),
                    ctx.line(),
                    ElementFlags::DYNAMIC,
                );
                synthesized.union_type = union.clone();
                self.codebase.add_property(synthesized);
                return Ok(union);
            }
        }

        if self.config.allow_missing_properties {
            if let Some(&class_fqsen) = class_fqsens
                .iter()
                .find(|f| self.codebase.has_class_with_fqsen(**f))
            {
                let synthesized = phast_codebase::Property::new(
                    PropertyFqsen::new(class_fqsen, name),
                    ctx.file(),
                    ctx.line(),
                    ElementFlags::DYNAMIC,
                );
                self.codebase.add_property(synthesized);
                return Ok(UnionType::empty());
            }
        }

        let display = match class_fqsens.first() {
            Some(class_fqsen) => format!("{}::{}", class_fqsen, prop_name),
            None => prop_name.to_owned(),
        };
        let issue = if is_static {
            &catalog::UNDECLARED_STATIC_PROPERTY
        } else {
            &catalog::UNDECLARED_PROPERTY
        };
        let args = if is_static {
            vec![
                prop_name.to_owned(),
                class_fqsens
                    .first()
                    .map(|f| f.to_string())
                    .unwrap_or_default(),
            ]
        } else {
            vec![display]
        };
        Err(AnalysisError::raise(IssueInstance::new(
            issue,
            ctx.file().as_str(),
            ctx.line(),
            args,
        )))
    }

    fn visit_class_const(&mut self, ctx: &Context, node: &Node) -> AnalysisResult<UnionType> {
        let Some(const_name) = node.child_str("const") else {
            return Err(AnalysisError::NodeShape("dynamic constant name"));
        };
        let class_node = node
            .child_node("class")
            .ok_or(AnalysisError::NodeShape("class constant without class"))?;
        let fqsen = self.resolve_class_node(ctx, class_node)?;
        if const_name == "class" {
            return Ok(UnionType::of(Type::STRING));
        }
        let const_fqsen = ClassConstFqsen::new(fqsen, Atom::new(const_name));
        match self.codebase.get_class_constant_by_fqsen(const_fqsen) {
            Ok(constant) => {
                let union = constant.union_type.clone();
                self.record_reference(ctx, Fqsen::ClassConst(const_fqsen));
                Ok(union)
            }
            Err(_) => Err(AnalysisError::raise(IssueInstance::new(
                &catalog::UNDECLARED_CLASS_CONSTANT,
                ctx.file().as_str(),
                ctx.line(),
                vec![const_name.to_owned(), fqsen.to_string()],
            ))),
        }
    }

    // ==================== Calls ====================

    fn visit_method_call(
        &mut self,
        ctx: &Context,
        node: &Node,
        is_static: bool,
    ) -> AnalysisResult<UnionType> {
        let Some(method_name) = node.child_str("method") else {
            return Err(AnalysisError::NodeShape("dynamic method name"));
        };
        let (receiver, class_fqsens, via_keyword) = if is_static {
            let class_node = node
                .child_node("class")
                .ok_or(AnalysisError::NodeShape("static call without class"))?;
            let keyword = class_node
                .child_str("name")
                .is_some_and(|n| {
                    matches!(n.to_ascii_lowercase().as_str(), "parent" | "self" | "static")
                });
            let fqsen = self.resolve_class_node(ctx, class_node)?;
            (UnionType::of(Type::class(fqsen)), vec![fqsen], keyword)
        } else {
            let expr = node
                .child_node("expr")
                .ok_or(AnalysisError::NodeShape("method call without object"))?;
            let receiver = self.union_type_of(ctx, expr);
            let fqsens = receiver.class_fqsens();
            (receiver, fqsens, false)
        };

        if class_fqsens.is_empty() {
            if !receiver.is_empty()
                && !receiver.has_native(NativeType::Mixed)
                && !receiver.has_native(NativeType::Object)
                && !receiver.has_static_type()
            {
                self.emit(
                    ctx,
                    &catalog::NON_CLASS_METHOD_CALL,
                    0,
                    vec![method_name.to_owned(), receiver.to_string()],
                );
            }
            return Ok(UnionType::empty());
        }

        let name = Atom::new(method_name);
        let mut saw_unknown_class = None;
        for &class_fqsen in &class_fqsens {
            if !self.codebase.has_class_with_fqsen(class_fqsen) {
                saw_unknown_class = Some(class_fqsen);
                continue;
            }
            let method_fqsen = MethodFqsen::new(class_fqsen, name);
            let Ok(method) = self.codebase.get_method_by_fqsen(method_fqsen) else {
                continue;
            };
            let flags = method.flags;
            let defining = method.defining_fqsen;
            let (file, line) = (method.file, method.line);
            let signature = CalleeSignature::for_method(method);
            let mut union = method.union_type.clone();

            self.check_member_visibility(
                ctx,
                flags,
                defining.class,
                &catalog::ACCESS_METHOD_PRIVATE,
                &catalog::ACCESS_METHOD_PROTECTED,
                &method_fqsen.to_string(),
                (file, line),
            )?;
            if is_static && !flags.contains(ElementFlags::STATIC) && !via_keyword {
                self.emit(
                    ctx,
                    &catalog::STATIC_CALL_TO_NON_STATIC,
                    0,
                    vec![
                        method_fqsen.to_string(),
                        file.to_string(),
                        line.to_string(),
                    ],
                );
            }
            if flags.contains(ElementFlags::DEPRECATED) {
                self.emit(
                    ctx,
                    &catalog::DEPRECATED_FUNCTION,
                    0,
                    vec![
                        method_fqsen.to_string(),
                        file.to_string(),
                        line.to_string(),
                    ],
                );
            }
            self.record_reference(ctx, Fqsen::Method(method_fqsen));

            if let Some(args) = node.child_node("args") {
                let arg_types = self.arg_list_types(ctx, Some(args));
                self.analyze_call_args(ctx, &signature, args, &arg_types);
            }

            let template_map = self.receiver_template_map(class_fqsen, &receiver);
            union = union.with_template_parameter_type_map(&template_map);
            if union.has_static_type() {
                // Late static binding: the called class stands in.
                union.remove_static_type();
                union.add_union(&receiver);
            }
            return Ok(union);
        }

        // Magic dispatch behaves like a variadic method without types.
        let magic = if is_static { "__callStatic" } else { "__call" };
        for &class_fqsen in &class_fqsens {
            let magic_fqsen = MethodFqsen::new(class_fqsen, Atom::new(magic));
            if let Ok(method) = self.codebase.get_method_by_fqsen(magic_fqsen) {
                return Ok(method.union_type.clone());
            }
        }

        if let Some(unknown) = saw_unknown_class {
            return Err(AnalysisError::raise(IssueInstance::new(
                &catalog::UNDECLARED_CLASS_METHOD,
                ctx.file().as_str(),
                ctx.line(),
                vec![method_name.to_owned(), unknown.to_string()],
            )));
        }
        let display = class_fqsens
            .first()
            .map(|f| format!("{f}::{method_name}"))
            .unwrap_or_else(|| method_name.to_owned());
        let issue = if is_static {
            &catalog::UNDECLARED_STATIC_METHOD
        } else {
            &catalog::UNDECLARED_METHOD
        };
        Err(AnalysisError::raise(IssueInstance::new(
            issue,
            ctx.file().as_str(),
            ctx.line(),
            vec![display],
        )))
    }

    fn visit_call(&mut self, ctx: &Context, node: &Node) -> AnalysisResult<UnionType> {
        let expr = node
            .child_node("expr")
            .ok_or(AnalysisError::NodeShape("call without callee"))?;
        match expr.kind {
            Kind::Name => {
                let name = expr
                    .child_str("name")
                    .ok_or(AnalysisError::NodeShape("name node without text"))?;
                let (primary, fallback) = ctx.resolve_function_name(name, expr.flags);
                let mut resolved = None;
                for candidate in std::iter::once(primary.clone()).chain(fallback) {
                    let fqsen = FunctionFqsen::from_full_name(&candidate);
                    if self.codebase.has_function_with_fqsen(fqsen) {
                        resolved = Some(fqsen);
                        break;
                    }
                }
                let Some(fqsen) = resolved else {
                    return Err(AnalysisError::raise(IssueInstance::new(
                        &catalog::UNDECLARED_FUNCTION,
                        ctx.file().as_str(),
                        ctx.line(),
                        vec![format!("{primary}()")],
                    )));
                };

                let (signature, union, is_deprecated, file, line) = {
                    let func = self.codebase.get_function_by_fqsen(fqsen)?;
                    (
                        CalleeSignature::for_function(func, self.codebase.get_function_alternates(fqsen)),
                        func.union_type.clone(),
                        func.flags.contains(ElementFlags::DEPRECATED),
                        func.file,
                        func.line,
                    )
                };
                if is_deprecated {
                    self.emit(
                        ctx,
                        &catalog::DEPRECATED_FUNCTION,
                        0,
                        vec![fqsen.to_string(), file.to_string(), line.to_string()],
                    );
                }
                self.record_reference(ctx, Fqsen::Function(fqsen));
                if let Some(args) = node.child_node("args") {
                    let arg_types = self.arg_list_types(ctx, Some(args));
                    self.analyze_call_args(ctx, &signature, args, &arg_types);
                }
                Ok(union)
            }
            Kind::Var | Kind::Prop => {
                let callee_type = self.union_type_of(ctx, expr);
                for ty in callee_type.types() {
                    if let Type::Callable(fqsen) = ty {
                        if let Ok(func) = self.codebase.get_function_by_fqsen(*fqsen) {
                            return Ok(func.union_type.clone());
                        }
                    }
                }
                Ok(UnionType::empty())
            }
            _ => {
                self.union_type_of(ctx, expr);
                Ok(UnionType::empty())
            }
        }
    }

    // ==================== Helpers ====================

    /// The types of every argument at a call site.
    pub(crate) fn arg_list_types(
        &mut self,
        ctx: &Context,
        args: Option<&Node>,
    ) -> Vec<UnionType> {
        let Some(args) = args else {
            return Vec::new();
        };
        args.list()
            .iter()
            .map(|child| self.union_type_of_child(ctx, &child.clone()))
            .collect()
    }

    /// Visibility rules for member access from the current context.
    fn check_member_visibility(
        &mut self,
        ctx: &Context,
        flags: ElementFlags,
        defining_class: ClassFqsen,
        private_issue: &'static phast_common::Issue,
        protected_issue: &'static phast_common::Issue,
        display: &str,
        defined_at: (Atom, u32),
    ) -> AnalysisResult<()> {
        let args = vec![
            display.to_owned(),
            defined_at.0.to_string(),
            defined_at.1.to_string(),
        ];
        if flags.is_private() {
            if ctx.class_fqsen_in_scope() != Some(defining_class) {
                return Err(AnalysisError::raise(IssueInstance::new(
                    private_issue,
                    ctx.file().as_str(),
                    ctx.line(),
                    args,
                )));
            }
        } else if flags.is_protected() {
            let ok = ctx
                .class_fqsen_in_scope()
                .is_some_and(|current| self.is_same_or_subclass(current, defining_class));
            if !ok {
                return Err(AnalysisError::raise(IssueInstance::new(
                    protected_issue,
                    ctx.file().as_str(),
                    ctx.line(),
                    args,
                )));
            }
        }
        Ok(())
    }

    /// Map a generic class's template names to the concrete parameters
    /// carried by the receiver's class type, if any.
    fn receiver_template_map(
        &self,
        class_fqsen: ClassFqsen,
        receiver: &UnionType,
    ) -> FxHashMap<Atom, UnionType> {
        let mut map = FxHashMap::default();
        let Ok(class) = self.codebase.get_class_by_fqsen(class_fqsen) else {
            return map;
        };
        if class.template_types.is_empty() {
            return map;
        }
        for ty in receiver.types() {
            let Type::ClassInstance { fqsen, params } = ty else {
                continue;
            };
            if fqsen.canonical() != class_fqsen.canonical() || params.is_empty() {
                continue;
            }
            for (template, concrete) in class.template_types.iter().zip(params) {
                map.insert(*template, concrete.clone());
            }
        }
        map
    }
}

/// Increment/decrement and arithmetic negation: follow the operand when
/// it is numerically precise, fall back to `int|float`.
fn numeric_result(operand: &UnionType) -> UnionType {
    let ints = operand.has_native(NativeType::Int);
    let floats = operand.has_native(NativeType::Float);
    if ints && !floats && operand.len() == 1 {
        UnionType::of(Type::INT)
    } else if floats && !ints && operand.len() == 1 {
        UnionType::of(Type::FLOAT)
    } else {
        UnionType::from_types([Type::INT, Type::FLOAT])
    }
}
