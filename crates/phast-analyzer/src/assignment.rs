//! Assignment targets.
//!
//! `analyze_assignment` handles the left-hand side of `=`, parameterized
//! by the right-hand union type and a dimension flag, and returns the
//! context subsequent statements see.

use crate::state::AnalysisState;
use phast_ast::{Child, Kind, Node};
use phast_common::issue::catalog;
use phast_common::Atom;
use phast_types::scope::superglobals;
use phast_types::{Context, PropertyFqsen, Variable};
use phast_types::UnionType;

impl AnalysisState<'_> {
    pub fn analyze_assignment(
        &mut self,
        ctx: Context,
        target: &Node,
        right: &UnionType,
        is_dim: bool,
    ) -> Context {
        let ctx = ctx.with_line(target.line);
        match target.kind {
            Kind::Var => self.assign_var(ctx, target, right, is_dim),
            Kind::Dim => self.assign_dim(ctx, target, right),
            Kind::Prop => self.assign_prop(ctx, target, right),
            // Static property assignment falls through to the variable
            // arm, which never consults the class scope. Known engine
            // limitation, kept as-is.
            Kind::StaticProp => self.assign_var(ctx, target, right, is_dim),
            Kind::List | Kind::Array => self.assign_list(ctx, target, right),
            _ => ctx,
        }
    }

    fn assign_var(
        &mut self,
        ctx: Context,
        target: &Node,
        right: &UnionType,
        is_dim: bool,
    ) -> Context {
        let Some(name) = target.child_str("name") else {
            return ctx;
        };
        if superglobals::is_superglobal(name) {
            return ctx;
        }
        let atom = Atom::new(name);
        let union = if is_dim {
            // Dimension writes widen rather than replace.
            let mut union = ctx
                .scope()
                .get_variable(atom)
                .map(|v| v.union_type.clone())
                .unwrap_or_default();
            union.add_union(right);
            union
        } else {
            right.clone()
        };
        let mut variable = Variable::new(atom, union);
        if let Some(existing) = ctx.scope().get_variable(atom) {
            variable.is_reference = existing.is_reference;
        }
        ctx.with_variable(variable)
    }

    fn assign_dim(&mut self, ctx: Context, target: &Node, right: &UnionType) -> Context {
        let Some(expr) = target.child_node("expr") else {
            return ctx;
        };
        // `$GLOBALS['name'] = ...` registers a variable; known
        // superglobal keys keep their hard-coded types.
        if expr.kind == Kind::Var && expr.child_str("name") == Some("GLOBALS") {
            if let Some(Child::Str(key)) = target.child("dim") {
                if !superglobals::is_superglobal(key) {
                    return ctx.with_variable(Variable::new(Atom::new(key), right.clone()));
                }
            }
            return ctx;
        }
        let wrapped = right.as_generic_array_types();
        self.analyze_assignment(ctx, expr, &wrapped, true)
    }

    fn assign_list(&mut self, ctx: Context, target: &Node, right: &UnionType) -> Context {
        // Broadcast the element type to each destructuring target.
        let element_types = right.generic_array_element_types();
        let mut ctx = ctx;
        for element in target.list().iter().filter_map(Child::as_node) {
            let value = match element.kind {
                Kind::ArrayElem => element.child_node("value"),
                _ => Some(element),
            };
            if let Some(value) = value {
                ctx = self.analyze_assignment(ctx, value, &element_types, false);
            }
        }
        ctx
    }

    fn assign_prop(&mut self, ctx: Context, target: &Node, right: &UnionType) -> Context {
        let Some(prop_name) = target.child_str("prop") else {
            return ctx;
        };
        let Some(expr) = target.child_node("expr") else {
            return ctx;
        };
        let receiver = self.union_type_of(&ctx, expr);
        let class_fqsens = receiver.class_fqsens();
        if class_fqsens.is_empty() {
            return ctx;
        }
        let name = Atom::new(prop_name);

        for &class_fqsen in &class_fqsens {
            let prop_fqsen = PropertyFqsen::new(class_fqsen, name);
            let Ok(property) = self.codebase.get_property_by_fqsen(prop_fqsen) else {
                continue;
            };
            let declared = property.union_type.clone();
            if !declared.is_empty()
                && !right.is_empty()
                && !right.can_cast_to_union(&declared, self.codebase)
            {
                self.emit(
                    &ctx,
                    &catalog::TYPE_MISMATCH_PROPERTY,
                    target.line,
                    vec![
                        right.to_string(),
                        prop_fqsen.to_string(),
                        declared.to_string(),
                    ],
                );
                return ctx;
            }
            // Provably-typed write: widen the property's union.
            if let Ok(property) = self.codebase.get_property_by_fqsen_mut(prop_fqsen) {
                property.union_type.add_union(right);
            }
            return ctx;
        }

        // Unresolved target: synthesize when the class keeps an open
        // shape, complain otherwise.
        let open_shape = self.config.allow_missing_properties
            || class_fqsens
                .iter()
                .any(|f| f.name.to_lowercase() == Atom::new("stdclass"));
        if let Some(&class_fqsen) = class_fqsens.first() {
            if open_shape && self.codebase.has_class_with_fqsen(class_fqsen) {
                let prop_fqsen = PropertyFqsen::new(class_fqsen, name);
                let mut property = phast_codebase::Property::new(
                    prop_fqsen,
                    ctx.file(),
                    target.line,
                    phast_codebase::ElementFlags::DYNAMIC,
                );
                property.union_type = right.clone();
                self.codebase.add_property(property);
            } else {
                self.emit(
                    &ctx,
                    &catalog::UNDECLARED_PROPERTY,
                    target.line,
                    vec![format!("{}::{}", class_fqsen, prop_name)],
                );
            }
        }
        ctx
    }
}
