//! The parse pass.
//!
//! Walks every file's AST and populates the CodeBase with declared
//! symbols. No cross-file resolution happens here - ancestor names are
//! recorded as FQSENs and checked after hydration - and nothing is
//! emitted; redefinitions are recorded inside the CodeBase.

use phast_ast::flags::{class_flags, modifier_flags, param_flags, type_flags, use_flags};
use phast_ast::{Child, Kind, Node};
use phast_codebase::{
    Class, ClassConstant, CodeBase, ElementFlags, Func, GlobalConstant, Method, Parameter,
    Property,
};
use phast_common::{Atom, Config};
use phast_types::{
    ClassConstFqsen, ClassFqsen, Comment, Context, FunctionFqsen, GlobalConstFqsen, MethodFqsen,
    NativeType, PropertyFqsen, Scope, Type, UnionType, UseKind,
};
use rustc_hash::FxHashMap;
use tracing::debug;

pub struct ParsePass<'a> {
    pub codebase: &'a mut CodeBase,
    pub config: &'a Config,
}

impl<'a> ParsePass<'a> {
    pub fn new(codebase: &'a mut CodeBase, config: &'a Config) -> Self {
        Self { codebase, config }
    }

    pub fn parse_file(&mut self, file: Atom, root: &Node) {
        debug!(file = %file, "parse pass");
        let ctx = Context::new(file);
        self.parse_node(ctx, root);
    }

    /// Parse one node, returning the context subsequent siblings see.
    fn parse_node(&mut self, ctx: Context, node: &Node) -> Context {
        let ctx = ctx.with_line(node.line);
        match node.kind {
            Kind::StmtList => node
                .list()
                .iter()
                .filter_map(Child::as_node)
                .fold(ctx, |ctx, stmt| self.parse_node(ctx, stmt)),

            Kind::Namespace => {
                let inner = match node.child_str("name") {
                    Some(name) => ctx.with_namespace(Atom::new(name)),
                    None => ctx.with_namespace(Atom::empty()),
                };
                match node.child_node("stmts") {
                    // Braced form: the namespace ends with the block.
                    Some(stmts) => {
                        self.parse_node(inner, stmts);
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

            Kind::Declare => {
                // declare() is file-scoped for strict_types.
                match node.child("strict_types") {
                    Some(Child::Int(1)) => ctx.with_strict_types(true),
                    _ => ctx,
                }
            }

            Kind::Class => {
                self.parse_class(&ctx, node);
                ctx
            }

            Kind::FuncDecl => {
                self.parse_function(&ctx, node);
                ctx
            }

            Kind::ConstDecl => {
                for elem in node.list().iter().filter_map(Child::as_node) {
                    self.parse_global_constant(&ctx, elem);
                }
                ctx
            }

            // Statements may nest declarations (conditional classes,
            // nested function definitions); keep walking.
            Kind::If
            | Kind::IfElem
            | Kind::While
            | Kind::DoWhile
            | Kind::For
            | Kind::Foreach
            | Kind::Switch
            | Kind::SwitchList
            | Kind::SwitchCase
            | Kind::Try
            | Kind::CatchList
            | Kind::Catch => {
                for child in node.child_nodes() {
                    self.parse_node(ctx.clone(), child);
                }
                ctx
            }

            _ => ctx,
        }
    }

    // ==================== Classes ====================

    fn parse_class(&mut self, ctx: &Context, node: &Node) {
        let Some(name) = node.child_str("name") else {
            return;
        };
        let fqsen = ClassFqsen::new(ctx.namespace(), Atom::new(name));
        let mut class = Class::new(
            fqsen,
            ctx.file(),
            node.line,
            class_element_flags(node.flags),
        );

        if let Some(extends) = node.child_node("extends") {
            if let Some(parent_name) = extends.child_str("name") {
                class.parent = Some(ClassFqsen::from_full_name(
                    &ctx.resolve_class_name(parent_name, extends.flags),
                ));
            }
        }
        class.interfaces = name_list_fqsens(ctx, node.child_node("implements"));
        class.traits = name_list_fqsens(ctx, node.child_node("uses"));

        let comment = self.parse_doc(ctx, node.doc_comment.as_deref());
        if let Some(comment) = &comment {
            class.template_types = comment.template_types.clone();
            class.inherited_type = comment.inherited_type.clone();
            class.suppressions.extend(comment.suppressions.iter().copied());
            if comment.is_deprecated {
                class.flags |= ElementFlags::DEPRECATED;
            }
        }

        let fqsen = self.codebase.add_class(class);

        // Member doc-comment types must see the class's template names.
        let template_map: FxHashMap<Atom, UnionType> = comment
            .map(|c| {
                c.template_types
                    .iter()
                    .map(|t| (*t, UnionType::empty()))
                    .collect()
            })
            .unwrap_or_default();
        let class_ctx = ctx.with_scope(Scope::class(fqsen, template_map));

        if let Some(stmts) = node.child_node("stmts") {
            for member in stmts.list().iter().filter_map(Child::as_node) {
                match member.kind {
                    Kind::Method => self.parse_method(&class_ctx, fqsen, member),
                    Kind::PropGroup => self.parse_property_group(&class_ctx, fqsen, member),
                    Kind::ClassConstDecl => self.parse_class_constants(&class_ctx, fqsen, member),
                    _ => {}
                }
            }
        }
    }

    fn parse_method(&mut self, ctx: &Context, class_fqsen: ClassFqsen, node: &Node) {
        let Some(name) = node.child_str("name") else {
            return;
        };
        let fqsen = MethodFqsen::new(class_fqsen, Atom::new(name));
        let mut method = Method::new(
            fqsen,
            ctx.file(),
            node.line,
            member_element_flags(node.flags),
        );

        let comment = self.parse_doc(ctx, node.doc_comment.as_deref());
        method.parameters = self.parse_parameters(ctx, node, comment.as_ref());
        method.union_type = self.parse_return_type(ctx, node, comment.as_ref());
        if let Some(comment) = &comment {
            method.suppressions.extend(comment.suppressions.iter().copied());
            if comment.is_deprecated {
                method.flags |= ElementFlags::DEPRECATED;
            }
        }

        if let Some(stmts) = node.child_node("stmts") {
            if body_yields(stmts) {
                method.flags |= ElementFlags::YIELDS;
            }
            if method.is_constructor() && body_calls_parent_constructor(stmts) {
                method.flags |= ElementFlags::CALLS_PARENT_CTOR;
            }
        }

        method.recount_parameters();
        self.codebase.add_method(method);
    }

    fn parse_property_group(&mut self, ctx: &Context, class_fqsen: ClassFqsen, node: &Node) {
        let declared = node
            .child_node("type")
            .map(|t| type_node_to_union(ctx, t))
            .unwrap_or_default();
        let group_comment = self.parse_doc(ctx, node.doc_comment.as_deref());
        let Some(props) = node.child_node("props") else {
            return;
        };
        for elem in props.list().iter().filter_map(Child::as_node) {
            let Some(name) = elem.child_str("name") else {
                continue;
            };
            let fqsen = PropertyFqsen::new(class_fqsen, Atom::new(name));
            let mut property = Property::new(
                fqsen,
                ctx.file(),
                elem.line,
                member_element_flags(node.flags),
            );

            // Declared type ∪ `@var` type ∪ default value type.
            property.union_type = declared.clone();
            let elem_comment = self.parse_doc(ctx, elem.doc_comment.as_deref());
            let comment = elem_comment.as_ref().or(group_comment.as_ref());
            if let Some(comment) = comment {
                if let Some(var_type) = comment.var_type() {
                    property.union_type.add_union(var_type);
                }
                if comment.is_deprecated {
                    property.flags |= ElementFlags::DEPRECATED;
                }
            }
            if let Some(default) = elem.child("default") {
                if let Some(ty) = default_value_type(default) {
                    property.union_type.add_type(ty);
                }
            }
            self.codebase.add_property(property);
        }
    }

    fn parse_class_constants(&mut self, ctx: &Context, class_fqsen: ClassFqsen, node: &Node) {
        for elem in node.list().iter().filter_map(Child::as_node) {
            let Some(name) = elem.child_str("name") else {
                continue;
            };
            let fqsen = ClassConstFqsen::new(class_fqsen, Atom::new(name));
            let mut constant = ClassConstant::new(
                fqsen,
                ctx.file(),
                elem.line,
                member_element_flags(node.flags),
            );
            if let Some(value) = elem.child("value") {
                if let Some(ty) = default_value_type(value) {
                    constant.union_type.add_type(ty);
                }
            }
            self.codebase.add_class_constant(constant);
        }
    }

    // ==================== Functions and constants ====================

    fn parse_function(&mut self, ctx: &Context, node: &Node) {
        let Some(name) = node.child_str("name") else {
            return;
        };
        let fqsen = FunctionFqsen::new(ctx.namespace(), Atom::new(name));
        let mut func = Func::new(fqsen, ctx.file(), node.line, ElementFlags::empty());

        let comment = self.parse_doc(ctx, node.doc_comment.as_deref());
        func.parameters = self.parse_parameters(ctx, node, comment.as_ref());
        func.union_type = self.parse_return_type(ctx, node, comment.as_ref());
        if let Some(comment) = &comment {
            func.suppressions.extend(comment.suppressions.iter().copied());
            if comment.is_deprecated {
                func.flags |= ElementFlags::DEPRECATED;
            }
        }
        if node.flags & modifier_flags::RETURNS_REF != 0 {
            func.flags |= ElementFlags::RETURNS_REF;
        }
        if let Some(stmts) = node.child_node("stmts") {
            if body_yields(stmts) {
                func.flags |= ElementFlags::YIELDS;
                if !phast_codebase::hydrate::is_traversable_union(&func.union_type) {
                    func.union_type = UnionType::of(phast_codebase::hydrate::generator_type());
                }
            }
        }

        func.recount_parameters();
        self.codebase.add_function(func);
    }

    fn parse_global_constant(&mut self, ctx: &Context, elem: &Node) {
        let Some(name) = elem.child_str("name") else {
            return;
        };
        let fqsen = GlobalConstFqsen::new(ctx.namespace(), Atom::new(name));
        let mut constant = GlobalConstant::new(fqsen, ctx.file(), elem.line, ElementFlags::empty());
        if let Some(value) = elem.child("value") {
            if let Some(ty) = default_value_type(value) {
                constant.union_type.add_type(ty);
            }
        }
        self.codebase.add_global_constant(constant);
    }

    // ==================== Shared pieces ====================

    fn parse_doc(&self, ctx: &Context, doc: Option<&str>) -> Option<Comment> {
        if !self.config.read_type_annotations {
            return None;
        }
        doc.map(|source| Comment::parse(source, ctx))
    }

    fn parse_parameters(
        &mut self,
        ctx: &Context,
        node: &Node,
        comment: Option<&Comment>,
    ) -> Vec<Parameter> {
        let Some(params) = node.child_node("params") else {
            return Vec::new();
        };
        params
            .list()
            .iter()
            .filter_map(Child::as_node)
            .filter_map(|param| self.parse_parameter(ctx, param, comment))
            .collect()
    }

    fn parse_parameter(
        &mut self,
        ctx: &Context,
        node: &Node,
        comment: Option<&Comment>,
    ) -> Option<Parameter> {
        let name = node.child_str("name")?;
        let mut union = node
            .child_node("type")
            .map(|t| type_node_to_union(ctx, t))
            .unwrap_or_default();
        let doc_type = comment.and_then(|c| c.parameter_type(name));
        if let Some(doc_type) = doc_type {
            union.add_union(doc_type);
        }
        let mut parameter = Parameter::new(Atom::new(name), union, node.line);
        parameter.has_doc_type = doc_type.is_some();
        parameter.is_by_ref = node.flags & param_flags::PARAM_REF != 0;
        parameter.is_variadic = node.flags & param_flags::PARAM_VARIADIC != 0;
        if let Some(default) = node.child("default") {
            parameter.has_default = true;
            if let Some(ty) = default_value_type(default) {
                parameter.default_type.add_type(ty);
            }
        }
        Some(parameter)
    }

    fn parse_return_type(
        &mut self,
        ctx: &Context,
        node: &Node,
        comment: Option<&Comment>,
    ) -> UnionType {
        let mut union = node
            .child_node("returnType")
            .map(|t| type_node_to_union(ctx, t))
            .unwrap_or_default();
        if let Some(comment) = comment {
            union.add_union(&comment.return_type);
        }
        union
    }
}

// ==================== Free helpers ====================

pub(crate) fn use_kind_from_flags(flags: u32) -> UseKind {
    match flags {
        use_flags::USE_FUNCTION => UseKind::Function,
        use_flags::USE_CONST => UseKind::Const,
        _ => UseKind::Normal,
    }
}

pub(crate) fn apply_use_elem(
    ctx: &Context,
    kind: UseKind,
    elem: &Node,
    prefix: Option<&str>,
) -> Context {
    let Some(name) = elem.child_str("name") else {
        return ctx.clone();
    };
    let full = match prefix {
        Some(prefix) => format!("{}\\{}", prefix.trim_matches('\\'), name.trim_start_matches('\\')),
        None => name.trim_start_matches('\\').to_owned(),
    };
    let alias = elem
        .child_str("alias")
        .map(str::to_owned)
        .unwrap_or_else(|| {
            full.rsplit('\\')
                .next()
                .unwrap_or(full.as_str())
                .to_owned()
        });
    ctx.with_namespace_map_entry(kind, Atom::new(&alias), Atom::new(&full))
}

fn class_element_flags(flags: u32) -> ElementFlags {
    let mut out = ElementFlags::empty();
    if flags & class_flags::CLASS_INTERFACE != 0 {
        out |= ElementFlags::INTERFACE;
    }
    if flags & class_flags::CLASS_TRAIT != 0 {
        out |= ElementFlags::TRAIT;
    }
    if flags & class_flags::CLASS_ABSTRACT != 0 {
        out |= ElementFlags::ABSTRACT;
    }
    if flags & class_flags::CLASS_FINAL != 0 {
        out |= ElementFlags::FINAL;
    }
    out
}

fn member_element_flags(flags: u32) -> ElementFlags {
    let mut out = ElementFlags::empty();
    if flags & modifier_flags::MODIFIER_PUBLIC != 0 {
        out |= ElementFlags::PUBLIC;
    }
    if flags & modifier_flags::MODIFIER_PROTECTED != 0 {
        out |= ElementFlags::PROTECTED;
    }
    if flags & modifier_flags::MODIFIER_PRIVATE != 0 {
        out |= ElementFlags::PRIVATE;
    }
    if flags & modifier_flags::MODIFIER_STATIC != 0 {
        out |= ElementFlags::STATIC;
    }
    if flags & modifier_flags::MODIFIER_ABSTRACT != 0 {
        out |= ElementFlags::ABSTRACT;
    }
    if flags & modifier_flags::MODIFIER_FINAL != 0 {
        out |= ElementFlags::FINAL;
    }
    if flags & modifier_flags::RETURNS_REF != 0 {
        out |= ElementFlags::RETURNS_REF;
    }
    out
}

fn name_list_fqsens(ctx: &Context, list: Option<&Node>) -> Vec<ClassFqsen> {
    let Some(list) = list else {
        return Vec::new();
    };
    list.list()
        .iter()
        .filter_map(Child::as_node)
        .filter_map(|name_node| {
            let name = name_node.child_str("name")?;
            Some(ClassFqsen::from_full_name(
                &ctx.resolve_class_name(name, name_node.flags),
            ))
        })
        .collect()
}

/// Convert a declared type annotation node to a union type.
pub(crate) fn type_node_to_union(ctx: &Context, node: &Node) -> UnionType {
    match node.kind {
        Kind::Type => UnionType::of(Type::Native(native_from_type_flags(node.flags))),
        Kind::NullableType => {
            let mut union = node
                .child_node("type")
                .map(|inner| type_node_to_union(ctx, inner))
                .unwrap_or_default();
            union.add_type(Type::NULL);
            union
        }
        Kind::Name => match node.child_str("name") {
            Some(name) => {
                if let Some(native) = NativeType::from_name(name) {
                    UnionType::of(Type::Native(native))
                } else if ctx.is_template_type_in_scope(name) {
                    UnionType::of(Type::Template(Atom::new(name)))
                } else {
                    UnionType::of(Type::class(ClassFqsen::from_full_name(
                        &ctx.resolve_class_name(name, node.flags),
                    )))
                }
            }
            None => UnionType::empty(),
        },
        _ => UnionType::empty(),
    }
}

pub(crate) fn native_from_type_flags(flags: u32) -> NativeType {
    match flags {
        type_flags::TYPE_ARRAY | type_flags::TYPE_ITERABLE => NativeType::Array,
        type_flags::TYPE_BOOL => NativeType::Bool,
        type_flags::TYPE_CALLABLE => NativeType::Callable,
        type_flags::TYPE_DOUBLE => NativeType::Float,
        type_flags::TYPE_LONG => NativeType::Int,
        type_flags::TYPE_NULL => NativeType::Null,
        type_flags::TYPE_OBJECT => NativeType::Object,
        type_flags::TYPE_STRING => NativeType::String,
        type_flags::TYPE_VOID => NativeType::Void,
        _ => NativeType::Mixed,
    }
}

/// The type of a compile-time default value; `None` for expressions the
/// parse pass does not evaluate.
pub(crate) fn default_value_type(child: &Child) -> Option<Type> {
    match child {
        Child::Node(node) if node.kind == Kind::Array => Some(Type::ARRAY),
        Child::Node(_) => None,
        literal => Type::from_literal(literal),
    }
}

fn body_yields(stmts: &Node) -> bool {
    stmts.any_in_body(&|n| matches!(n.kind, Kind::Yield | Kind::YieldFrom))
}

fn body_calls_parent_constructor(stmts: &Node) -> bool {
    stmts.any_in_body(&|n| {
        n.kind == Kind::StaticCall
            && n.child_node("class")
                .and_then(|c| c.child_str("name"))
                .is_some_and(|name| name.eq_ignore_ascii_case("parent"))
            && n.child_str("method")
                .is_some_and(|m| m.eq_ignore_ascii_case("__construct"))
    })
}
