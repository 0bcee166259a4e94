//! Guard-condition narrowing.
//!
//! `narrow_condition` produces the context the true branch of an
//! `if`/ternary guard runs under. The false branch keeps the outer
//! context; negations are not modeled.

use crate::state::AnalysisState;
use phast_ast::flags::binary_flags;
use phast_ast::{Child, Kind, Node};
use phast_common::Atom;
use phast_types::{Context, NativeType, Type, UnionType, Variable};

impl AnalysisState<'_> {
    pub fn narrow_condition(&mut self, ctx: &Context, cond: &Node) -> Context {
        match cond.kind {
            Kind::Instanceof => self.narrow_instanceof(ctx, cond),
            Kind::Call => self.narrow_type_check_call(ctx, cond),
            // `empty($v)` / `isset($v)` assert nothing about the type,
            // but do establish the variable.
            Kind::Empty | Kind::Isset => self.establish_variable(ctx, cond.child_node("expr")),
            // `a && b` narrows cumulatively.
            Kind::BinaryOp if cond.flags == binary_flags::BINARY_BOOL_AND => {
                let after_left = match cond.child_node("left") {
                    Some(left) => self.narrow_condition(ctx, left),
                    None => ctx.clone(),
                };
                match cond.child_node("right") {
                    Some(right) => self.narrow_condition(&after_left, right),
                    None => after_left,
                }
            }
            _ => ctx.clone(),
        }
    }

    fn narrow_instanceof(&mut self, ctx: &Context, cond: &Node) -> Context {
        let Some(expr) = cond.child_node("expr") else {
            return ctx.clone();
        };
        if expr.kind != Kind::Var {
            return ctx.clone();
        }
        let Some(name) = expr.child_str("name") else {
            return ctx.clone();
        };
        let Some(class_node) = cond.child_node("class") else {
            return ctx.clone();
        };
        let Ok(fqsen) = self.resolve_class_node(ctx, class_node) else {
            return ctx.clone();
        };
        ctx.with_variable(Variable::new(
            Atom::new(name),
            UnionType::of(Type::class(fqsen)),
        ))
    }

    /// `is_<native>($v)` overwrites the variable's union with the
    /// asserted native union.
    fn narrow_type_check_call(&mut self, ctx: &Context, cond: &Node) -> Context {
        let Some(callee) = cond.child_node("expr") else {
            return ctx.clone();
        };
        let Some(function_name) = callee.child_str("name") else {
            return ctx.clone();
        };
        let Some(args) = cond.child_node("args") else {
            return ctx.clone();
        };
        let Some(Child::Node(arg)) = args.list().first() else {
            return ctx.clone();
        };
        if arg.kind != Kind::Var {
            return ctx.clone();
        }
        let Some(var_name) = arg.child_str("name") else {
            return ctx.clone();
        };

        let asserted = match function_name.to_ascii_lowercase().as_str() {
            "is_int" | "is_integer" | "is_long" => UnionType::of(Type::INT),
            "is_string" => UnionType::of(Type::STRING),
            "is_bool" => UnionType::of(Type::BOOL),
            "is_float" | "is_double" | "is_real" => UnionType::of(Type::FLOAT),
            "is_null" => UnionType::of(Type::NULL),
            "is_object" => UnionType::of(Type::OBJECT),
            "is_callable" => UnionType::of(Type::Native(NativeType::Callable)),
            "is_resource" => UnionType::of(Type::Native(NativeType::Resource)),
            "is_numeric" => UnionType::from_types([Type::INT, Type::FLOAT, Type::STRING]),
            "is_array" => {
                // A generic-array variable stays precise; the assertion
                // unions rather than overwrites.
                let atom = Atom::new(var_name);
                let existing = ctx.scope().get_variable(atom).map(|v| v.union_type.clone());
                let narrowed = match existing {
                    Some(current)
                        if current.types().any(|t| matches!(t, Type::GenericArray(_))) =>
                    {
                        let mut union = UnionType::from_types(
                            current
                                .types()
                                .filter(|t| t.is_array_like())
                                .cloned(),
                        );
                        union.add_type(Type::ARRAY);
                        union
                    }
                    _ => UnionType::of(Type::ARRAY),
                };
                return ctx.with_variable(Variable::new(atom, narrowed));
            }
            _ => return ctx.clone(),
        };
        ctx.with_variable(Variable::new(Atom::new(var_name), asserted))
    }

    fn establish_variable(&mut self, ctx: &Context, expr: Option<&Node>) -> Context {
        let Some(expr) = expr else {
            return ctx.clone();
        };
        if expr.kind != Kind::Var {
            return ctx.clone();
        }
        let Some(name) = expr.child_str("name") else {
            return ctx.clone();
        };
        let atom = Atom::new(name);
        if ctx.scope().has_variable(atom) {
            return ctx.clone();
        }
        ctx.with_variable(Variable::new(atom, UnionType::empty()))
    }
}
