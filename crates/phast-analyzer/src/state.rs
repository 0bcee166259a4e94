//! Shared state of the analysis pass.
//!
//! `AnalysisState` separates state from logic: the visitor modules
//! (`expression`, `assignment`, `block`, ...) are implemented as methods
//! on it so they can borrow the CodeBase mutably while emitting issues.

use crate::error::{AnalysisError, AnalysisResult};
use phast_ast::{Kind, Node};
use phast_codebase::{CodeBase, Location};
use phast_common::issue::{catalog, Issue, IssueInstance};
use phast_common::{Collector, Config};
use phast_types::{ClassFqsen, Context, Fqsen, UnionType};

pub struct AnalysisState<'a> {
    pub codebase: &'a mut CodeBase,
    pub config: &'a Config,
    pub collector: &'a mut Collector,
}

impl<'a> AnalysisState<'a> {
    pub fn new(
        codebase: &'a mut CodeBase,
        config: &'a Config,
        collector: &'a mut Collector,
    ) -> Self {
        Self {
            codebase,
            config,
            collector,
        }
    }

    /// Emit an issue unless the surrounding scope suppresses it.
    pub fn emit(&mut self, ctx: &Context, issue: &'static Issue, line: u32, args: Vec<String>) {
        if ctx.is_suppressed(issue.name) {
            return;
        }
        self.collector.collect(IssueInstance::new(
            issue,
            ctx.file().as_str(),
            if line == 0 { ctx.line() } else { line },
            args,
        ));
    }

    /// The top-level boundary of the expression visitor: emits carried
    /// issues and falls back to the empty union.
    pub fn expr_boundary(&mut self, ctx: &Context, result: AnalysisResult<UnionType>) -> UnionType {
        match result {
            Ok(union) => union,
            Err(AnalysisError::IssueRaise(instance)) => {
                if !ctx.is_suppressed(instance.issue.name) {
                    self.collector.collect(*instance);
                }
                UnionType::empty()
            }
            Err(AnalysisError::Unanalyzable) => {
                self.emit(ctx, &catalog::UNANALYZABLE, 0, Vec::new());
                UnionType::empty()
            }
            // Node-shape surprises and unresolved symbols that no one
            // turned into a diagnostic degrade to "no information".
            Err(AnalysisError::NodeShape(_)) | Err(AnalysisError::MissingSymbol(_)) => {
                UnionType::empty()
            }
        }
    }

    /// Record a reference for dead-code detection.
    pub fn record_reference(&mut self, ctx: &Context, fqsen: Fqsen) {
        if !self.config.dead_code_detection {
            return;
        }
        self.codebase.add_reference(
            fqsen,
            Location {
                file: ctx.file(),
                line: ctx.line(),
            },
        );
    }

    /// Resolve a class-position node (`Name`, or the `self`/`parent`/
    /// `static` keywords) to a class FQSEN.
    pub fn resolve_class_node(
        &mut self,
        ctx: &Context,
        node: &Node,
    ) -> AnalysisResult<ClassFqsen> {
        if node.kind != Kind::Name {
            return Err(AnalysisError::NodeShape("class node is not a name"));
        }
        let name = node
            .child_str("name")
            .ok_or(AnalysisError::NodeShape("name node without text"))?;
        match name.to_ascii_lowercase().as_str() {
            "self" | "static" => ctx.class_fqsen_in_scope().ok_or_else(|| {
                AnalysisError::raise(IssueInstance::new(
                    &catalog::CONTEXT_NOT_OBJECT,
                    ctx.file().as_str(),
                    ctx.line(),
                    vec![name.to_owned()],
                ))
            }),
            "parent" => {
                let class_fqsen = ctx.class_fqsen_in_scope().ok_or_else(|| {
                    AnalysisError::raise(IssueInstance::new(
                        &catalog::CONTEXT_NOT_OBJECT,
                        ctx.file().as_str(),
                        ctx.line(),
                        vec!["parent".to_owned()],
                    ))
                })?;
                let class = self.codebase.get_class_by_fqsen(class_fqsen)?;
                class.parent.ok_or_else(|| {
                    AnalysisError::raise(IssueInstance::new(
                        &catalog::PARENTLESS_CLASS,
                        ctx.file().as_str(),
                        ctx.line(),
                        vec![class_fqsen.to_string()],
                    ))
                })
            }
            _ => {
                let full = ctx.resolve_class_name(name, node.flags);
                Ok(ClassFqsen::from_full_name(&full))
            }
        }
    }

    /// Whether `class` is `ancestor` or transitively extends/implements
    /// it. Used by visibility checks.
    pub fn is_same_or_subclass(&self, class: ClassFqsen, ancestor: ClassFqsen) -> bool {
        use phast_types::ClassHierarchy;
        fn key(f: ClassFqsen) -> (phast_common::Atom, phast_common::Atom) {
            let (ns, name, _) = f.canonical();
            (ns, name)
        }
        if key(class) == key(ancestor) {
            return true;
        }
        let mut pending = self.codebase.direct_ancestors(class);
        let mut visited = rustc_hash::FxHashSet::default();
        while let Some(current) = pending.pop() {
            if !visited.insert(key(current)) {
                continue;
            }
            if key(current) == key(ancestor) {
                return true;
            }
            pending.extend(self.codebase.direct_ancestors(current));
        }
        false
    }
}
