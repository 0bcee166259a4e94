//! The `Node` tree.

use crate::kind::Kind;
use rustc_hash::FxHashMap;

/// A child slot: a sub-node or a literal scalar.
///
/// Scalars appear where the grammar allows literals directly (names,
/// default values, array elements, dimension keys).
#[derive(Clone, Debug, PartialEq)]
pub enum Child {
    Node(Node),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Child {
    #[must_use]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Child::Node(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Child::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Child::Null)
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl From<&str> for Child {
    fn from(s: &str) -> Self {
        Child::Str(s.to_owned())
    }
}

/// Child storage: ordered for statement/argument lists, named for
/// declarations and operators.
#[derive(Clone, Debug, PartialEq)]
pub enum Children {
    Empty,
    List(Vec<Child>),
    Map(FxHashMap<&'static str, Child>),
}

/// One AST node.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: Kind,
    pub flags: u32,
    pub line: u32,
    pub doc_comment: Option<String>,
    pub children: Children,
}

impl Node {
    #[must_use]
    pub fn new(kind: Kind, flags: u32, line: u32) -> Self {
        Self {
            kind,
            flags,
            line,
            doc_comment: None,
            children: Children::Empty,
        }
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc_comment = Some(doc.into());
        self
    }

    /// Add or replace a named child. Converts `Empty` storage to a map.
    #[must_use]
    pub fn with_child(mut self, name: &'static str, child: impl Into<Child>) -> Self {
        match &mut self.children {
            Children::Map(map) => {
                map.insert(name, child.into());
            }
            Children::Empty => {
                let mut map = FxHashMap::default();
                map.insert(name, child.into());
                self.children = Children::Map(map);
            }
            Children::List(_) => panic!("named child on a list node"),
        }
        self
    }

    /// Set ordered children. Converts `Empty` storage to a list.
    #[must_use]
    pub fn with_list(mut self, children: Vec<Child>) -> Self {
        debug_assert!(matches!(self.children, Children::Empty));
        self.children = Children::List(children);
        self
    }

    // ==================== Accessors ====================

    /// Look up a named child; absent and explicit-null are both `None`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Child> {
        match &self.children {
            Children::Map(map) => map.get(name).filter(|c| !c.is_null()),
            _ => None,
        }
    }

    #[must_use]
    pub fn child_node(&self, name: &str) -> Option<&Node> {
        self.child(name).and_then(Child::as_node)
    }

    #[must_use]
    pub fn child_str(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(Child::as_str)
    }

    /// Ordered children; empty slice for map-shaped and empty nodes.
    #[must_use]
    pub fn list(&self) -> &[Child] {
        match &self.children {
            Children::List(items) => items,
            _ => &[],
        }
    }

    /// Every child node regardless of storage shape, for generic walks.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Node> {
        let (list, map): (&[Child], Option<&FxHashMap<&'static str, Child>>) =
            match &self.children {
                Children::List(items) => (items.as_slice(), None),
                Children::Map(map) => (&[], Some(map)),
                Children::Empty => (&[], None),
            };
        list.iter()
            .filter_map(Child::as_node)
            .chain(map.into_iter().flat_map(|m| m.values()).filter_map(Child::as_node))
    }

    /// Recursively test whether any descendant (stopping at nested
    /// function-like boundaries) matches `predicate`.
    #[must_use]
    pub fn any_in_body(&self, predicate: &dyn Fn(&Node) -> bool) -> bool {
        for child in self.child_nodes() {
            if matches!(child.kind, Kind::Closure | Kind::FuncDecl | Kind::Method | Kind::Class) {
                continue;
            }
            if predicate(child) || child.any_in_body(predicate) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_children_roundtrip() {
        let node = Node::new(Kind::Assign, 0, 3)
            .with_child("var", Node::new(Kind::Var, 0, 3).with_child("name", "x"))
            .with_child("expr", Child::Int(1));
        assert_eq!(node.child_node("var").unwrap().kind, Kind::Var);
        assert!(node.child("missing").is_none());
        assert!(matches!(node.child("expr"), Some(Child::Int(1))));
    }

    #[test]
    fn explicit_null_child_reads_as_absent() {
        let node = Node::new(Kind::Conditional, 0, 1)
            .with_child("cond", Child::Bool(true))
            .with_child("true", Child::Null);
        assert!(node.child("true").is_none());
    }

    #[test]
    fn body_scan_stops_at_closures() {
        let yield_node = Node::new(Kind::Yield, 0, 2);
        let closure = Node::new(Kind::Closure, 0, 1)
            .with_child("stmts", Node::new(Kind::StmtList, 0, 1).with_list(vec![yield_node.into()]));
        let body = Node::new(Kind::StmtList, 0, 1).with_list(vec![closure.into()]);
        assert!(!body.any_in_body(&|n| n.kind == Kind::Yield));

        let direct = Node::new(Kind::StmtList, 0, 1)
            .with_list(vec![Node::new(Kind::Yield, 0, 2).into()]);
        assert!(direct.any_in_body(&|n| n.kind == Kind::Yield));
    }
}
