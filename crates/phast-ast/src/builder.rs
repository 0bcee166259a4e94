//! Constructor functions for assembling trees.
//!
//! The embedding parser (and the test suites) build nodes through these
//! rather than spelling out child maps by hand. Each constructor documents
//! the child names it populates.

use crate::flags::name_flags;
use crate::kind::Kind;
use crate::node::{Child, Node};

// ==================== Names and variables ====================

/// `Name` node, resolved through the namespace-use map (`NAME_NOT_FQ`).
#[must_use]
pub fn name(line: u32, s: &str) -> Node {
    Node::new(Kind::Name, name_flags::NAME_NOT_FQ, line).with_child("name", s)
}

/// `Name` node that is already fully qualified (`\Foo\Bar`).
#[must_use]
pub fn name_fq(line: u32, s: &str) -> Node {
    Node::new(Kind::Name, name_flags::NAME_FQ, line).with_child("name", s)
}

#[must_use]
pub fn name_list(line: u32, names: Vec<Node>) -> Node {
    Node::new(Kind::NameList, 0, line).with_list(names.into_iter().map(Child::from).collect())
}

/// `$name`. Child: `name`.
#[must_use]
pub fn var(line: u32, name: &str) -> Node {
    Node::new(Kind::Var, 0, line).with_child("name", name)
}

/// A constant reference. Child: `name` (a `Name` node).
#[must_use]
pub fn const_ref(line: u32, name_node: Node) -> Node {
    Node::new(Kind::Const, 0, line).with_child("name", name_node)
}

// ==================== Structure ====================

#[must_use]
pub fn stmt_list(line: u32, stmts: Vec<Node>) -> Node {
    Node::new(Kind::StmtList, 0, line).with_list(stmts.into_iter().map(Child::from).collect())
}

/// `namespace Ns;` or `namespace Ns { ... }`. Children: `name`, `stmts`.
#[must_use]
pub fn namespace(line: u32, name: Option<&str>, stmts: Option<Node>) -> Node {
    let mut node = Node::new(Kind::Namespace, 0, line);
    node = match name {
        Some(n) => node.with_child("name", n),
        None => node.with_child("name", Child::Null),
    };
    match stmts {
        Some(s) => node.with_child("stmts", s),
        None => node.with_child("stmts", Child::Null),
    }
}

/// `use A\B as C;`. Children of each `UseElem`: `name`, `alias`.
#[must_use]
pub fn use_stmt(line: u32, use_kind: u32, elems: Vec<Node>) -> Node {
    Node::new(Kind::Use, use_kind, line)
        .with_list(elems.into_iter().map(Child::from).collect())
}

#[must_use]
pub fn use_elem(line: u32, name: &str, alias: Option<&str>) -> Node {
    let node = Node::new(Kind::UseElem, 0, line).with_child("name", name);
    match alias {
        Some(a) => node.with_child("alias", a),
        None => node.with_child("alias", Child::Null),
    }
}

/// `use Prefix\{A, B as C};`. Children: `prefix`, `uses` (list of UseElem).
#[must_use]
pub fn group_use(line: u32, use_kind: u32, prefix: &str, elems: Vec<Node>) -> Node {
    Node::new(Kind::GroupUse, use_kind, line)
        .with_child("prefix", prefix)
        .with_child("uses", name_list_like(line, elems))
}

fn name_list_like(line: u32, elems: Vec<Node>) -> Node {
    Node::new(Kind::NameList, 0, line).with_list(elems.into_iter().map(Child::from).collect())
}

/// `declare(strict_types=1);`. Child: `strict_types`.
#[must_use]
pub fn declare_strict_types(line: u32, value: i64) -> Node {
    Node::new(Kind::Declare, 0, line).with_child("strict_types", Child::Int(value))
}

// ==================== Declarations ====================

/// Class/interface/trait declaration. Children: `name`, `extends` (Name),
/// `implements` (NameList), `uses` (NameList), `stmts` (StmtList).
#[must_use]
pub fn class(line: u32, flags: u32, name: &str, stmts: Vec<Node>) -> Node {
    Node::new(Kind::Class, flags, line)
        .with_child("name", name)
        .with_child("extends", Child::Null)
        .with_child("implements", Child::Null)
        .with_child("uses", Child::Null)
        .with_child("stmts", stmt_list(line, stmts))
}

/// Method declaration. Children: `name`, `params` (ParamList), `stmts`
/// (StmtList or null for abstract), `returnType`.
#[must_use]
pub fn method(line: u32, flags: u32, name: &str, params: Vec<Node>, stmts: Option<Vec<Node>>) -> Node {
    let node = Node::new(Kind::Method, flags, line)
        .with_child("name", name)
        .with_child("params", param_list(line, params))
        .with_child("returnType", Child::Null);
    match stmts {
        Some(s) => node.with_child("stmts", stmt_list(line, s)),
        None => node.with_child("stmts", Child::Null),
    }
}

/// Function declaration. Same children as [`method`].
#[must_use]
pub fn func_decl(line: u32, name: &str, params: Vec<Node>, stmts: Vec<Node>) -> Node {
    Node::new(Kind::FuncDecl, 0, line)
        .with_child("name", name)
        .with_child("params", param_list(line, params))
        .with_child("returnType", Child::Null)
        .with_child("stmts", stmt_list(line, stmts))
}

/// Closure. Children: `params`, `uses` (ClosureUses), `stmts`, `returnType`.
#[must_use]
pub fn closure(line: u32, params: Vec<Node>, uses: Vec<Node>, stmts: Vec<Node>) -> Node {
    Node::new(Kind::Closure, 0, line)
        .with_child("params", param_list(line, params))
        .with_child(
            "uses",
            Node::new(Kind::ClosureUses, 0, line)
                .with_list(uses.into_iter().map(Child::from).collect()),
        )
        .with_child("returnType", Child::Null)
        .with_child("stmts", stmt_list(line, stmts))
}

/// A `use ($v)` capture of a closure. Child: `name`.
#[must_use]
pub fn closure_var(line: u32, name: &str, flags: u32) -> Node {
    Node::new(Kind::ClosureVar, flags, line).with_child("name", name)
}

#[must_use]
pub fn param_list(line: u32, params: Vec<Node>) -> Node {
    Node::new(Kind::ParamList, 0, line).with_list(params.into_iter().map(Child::from).collect())
}

/// Parameter. Children: `type` (Type/Name/NullableType or null), `name`,
/// `default`.
#[must_use]
pub fn param(line: u32, flags: u32, type_node: Option<Node>, name: &str, default: Option<Child>) -> Node {
    let node = Node::new(Kind::Param, flags, line).with_child("name", name);
    let node = match type_node {
        Some(t) => node.with_child("type", t),
        None => node.with_child("type", Child::Null),
    };
    match default {
        Some(d) => node.with_child("default", d),
        None => node.with_child("default", Child::Null),
    }
}

/// Property group. Children: `type`, `props` (list of PropElem).
#[must_use]
pub fn prop_group(line: u32, flags: u32, type_node: Option<Node>, props: Vec<Node>) -> Node {
    let node = Node::new(Kind::PropGroup, flags, line).with_child(
        "props",
        Node::new(Kind::NameList, 0, line).with_list(props.into_iter().map(Child::from).collect()),
    );
    match type_node {
        Some(t) => node.with_child("type", t),
        None => node.with_child("type", Child::Null),
    }
}

/// One property element. Children: `name`, `default`.
#[must_use]
pub fn prop_elem(line: u32, name: &str, default: Option<Child>) -> Node {
    let node = Node::new(Kind::PropElem, 0, line).with_child("name", name);
    match default {
        Some(d) => node.with_child("default", d),
        None => node.with_child("default", Child::Null),
    }
}

/// Class constant declaration group.
#[must_use]
pub fn class_const_decl(line: u32, flags: u32, elems: Vec<Node>) -> Node {
    Node::new(Kind::ClassConstDecl, flags, line)
        .with_list(elems.into_iter().map(Child::from).collect())
}

/// Top-level constant declaration group.
#[must_use]
pub fn const_decl(line: u32, elems: Vec<Node>) -> Node {
    Node::new(Kind::ConstDecl, 0, line).with_list(elems.into_iter().map(Child::from).collect())
}

/// One `NAME = value` element. Children: `name`, `value`.
#[must_use]
pub fn const_elem(line: u32, name: &str, value: Child) -> Node {
    Node::new(Kind::ConstElem, 0, line)
        .with_child("name", name)
        .with_child("value", value)
}

/// Native type annotation (`flags::type_flags`).
#[must_use]
pub fn type_node(line: u32, type_flag: u32) -> Node {
    Node::new(Kind::Type, type_flag, line)
}

// ==================== Expressions ====================

/// `f(...)`. Children: `expr` (usually a Name), `args` (ArgList).
#[must_use]
pub fn call(line: u32, expr: Node, args: Vec<Child>) -> Node {
    Node::new(Kind::Call, 0, line)
        .with_child("expr", expr)
        .with_child("args", arg_list(line, args))
}

/// `$x->m(...)`. Children: `expr`, `method`, `args`.
#[must_use]
pub fn method_call(line: u32, expr: Node, method: &str, args: Vec<Child>) -> Node {
    Node::new(Kind::MethodCall, 0, line)
        .with_child("expr", expr)
        .with_child("method", method)
        .with_child("args", arg_list(line, args))
}

/// `X::m(...)`. Children: `class` (Name), `method`, `args`.
#[must_use]
pub fn static_call(line: u32, class: Node, method: &str, args: Vec<Child>) -> Node {
    Node::new(Kind::StaticCall, 0, line)
        .with_child("class", class)
        .with_child("method", method)
        .with_child("args", arg_list(line, args))
}

/// `new X(...)`. Children: `class` (Name), `args`.
#[must_use]
pub fn new_object(line: u32, class: Node, args: Vec<Child>) -> Node {
    Node::new(Kind::New, 0, line)
        .with_child("class", class)
        .with_child("args", arg_list(line, args))
}

#[must_use]
pub fn arg_list(line: u32, args: Vec<Child>) -> Node {
    Node::new(Kind::ArgList, 0, line).with_list(args)
}

/// `$x->p`. Children: `expr`, `prop`.
#[must_use]
pub fn prop_access(line: u32, expr: Node, prop: &str) -> Node {
    Node::new(Kind::Prop, 0, line)
        .with_child("expr", expr)
        .with_child("prop", prop)
}

/// `X::$p`. Children: `class`, `prop`.
#[must_use]
pub fn static_prop(line: u32, class: Node, prop: &str) -> Node {
    Node::new(Kind::StaticProp, 0, line)
        .with_child("class", class)
        .with_child("prop", prop)
}

/// `X::C`. Children: `class`, `const`.
#[must_use]
pub fn class_const(line: u32, class: Node, name: &str) -> Node {
    Node::new(Kind::ClassConst, 0, line)
        .with_child("class", class)
        .with_child("const", name)
}

/// `$x[$i]`. Children: `expr`, `dim` (null for `$x[] =`).
#[must_use]
pub fn dim(line: u32, expr: Node, index: Option<Child>) -> Node {
    let node = Node::new(Kind::Dim, 0, line).with_child("expr", expr);
    match index {
        Some(i) => node.with_child("dim", i),
        None => node.with_child("dim", Child::Null),
    }
}

/// Array literal; elements are `ArrayElem` nodes.
#[must_use]
pub fn array(line: u32, elems: Vec<Node>) -> Node {
    Node::new(Kind::Array, 0, line).with_list(elems.into_iter().map(Child::from).collect())
}

/// One array element. Children: `value`, `key`.
#[must_use]
pub fn array_elem(line: u32, value: Child, key: Option<Child>) -> Node {
    let node = Node::new(Kind::ArrayElem, 0, line).with_child("value", value);
    match key {
        Some(k) => node.with_child("key", k),
        None => node.with_child("key", Child::Null),
    }
}

/// `$v = expr`. Children: `var`, `expr`.
#[must_use]
pub fn assign(line: u32, target: Node, value: Child) -> Node {
    Node::new(Kind::Assign, 0, line)
        .with_child("var", target)
        .with_child("expr", value)
}

/// `$v op= expr`, flags from `binary_flags`.
#[must_use]
pub fn assign_op(line: u32, flags: u32, target: Node, value: Child) -> Node {
    Node::new(Kind::AssignOp, flags, line)
        .with_child("var", target)
        .with_child("expr", value)
}

/// `$v =& expr`. Children: `var`, `expr`.
#[must_use]
pub fn assign_ref(line: u32, target: Node, value: Node) -> Node {
    Node::new(Kind::AssignRef, 0, line)
        .with_child("var", target)
        .with_child("expr", value)
}

/// Binary operation, flags from `binary_flags`. Children: `left`, `right`.
#[must_use]
pub fn binary_op(line: u32, flags: u32, left: Child, right: Child) -> Node {
    Node::new(Kind::BinaryOp, flags, line)
        .with_child("left", left)
        .with_child("right", right)
}

/// Unary operation, flags from `unary_flags`. Child: `expr`.
#[must_use]
pub fn unary_op(line: u32, flags: u32, expr: Child) -> Node {
    Node::new(Kind::UnaryOp, flags, line).with_child("expr", expr)
}

/// Cast, flags from `type_flags`. Child: `expr`.
#[must_use]
pub fn cast(line: u32, flags: u32, expr: Child) -> Node {
    Node::new(Kind::Cast, flags, line).with_child("expr", expr)
}

/// `c ? t : e` (`t` null for the short form). Children: `cond`, `true`,
/// `false`.
#[must_use]
pub fn conditional(line: u32, cond: Node, if_true: Option<Child>, if_false: Child) -> Node {
    let node = Node::new(Kind::Conditional, 0, line).with_child("cond", cond);
    let node = match if_true {
        Some(t) => node.with_child("true", t),
        None => node.with_child("true", Child::Null),
    };
    node.with_child("false", if_false)
}

/// `$x instanceof C`. Children: `expr`, `class`.
#[must_use]
pub fn instanceof(line: u32, expr: Node, class: Node) -> Node {
    Node::new(Kind::Instanceof, 0, line)
        .with_child("expr", expr)
        .with_child("class", class)
}

#[must_use]
pub fn clone_of(line: u32, expr: Node) -> Node {
    Node::new(Kind::Clone, 0, line).with_child("expr", expr)
}

#[must_use]
pub fn empty_check(line: u32, expr: Node) -> Node {
    Node::new(Kind::Empty, 0, line).with_child("expr", expr)
}

#[must_use]
pub fn isset_check(line: u32, expr: Node) -> Node {
    Node::new(Kind::Isset, 0, line).with_child("expr", expr)
}

// ==================== Statements ====================

/// `return expr;`. Child: `expr` (null for bare return).
#[must_use]
pub fn ret(line: u32, expr: Option<Child>) -> Node {
    let node = Node::new(Kind::Return, 0, line);
    match expr {
        Some(e) => node.with_child("expr", e),
        None => node.with_child("expr", Child::Null),
    }
}

#[must_use]
pub fn echo(line: u32, exprs: Vec<Child>) -> Node {
    Node::new(Kind::Echo, 0, line).with_list(exprs)
}

/// `if`/`elseif`/`else` chain: a list of `IfElem`s.
#[must_use]
pub fn if_stmt(line: u32, elems: Vec<Node>) -> Node {
    Node::new(Kind::If, 0, line).with_list(elems.into_iter().map(Child::from).collect())
}

/// One branch. Children: `cond` (null for `else`), `stmts`.
#[must_use]
pub fn if_elem(line: u32, cond: Option<Node>, stmts: Vec<Node>) -> Node {
    let node = Node::new(Kind::IfElem, 0, line).with_child("stmts", stmt_list(line, stmts));
    match cond {
        Some(c) => node.with_child("cond", c),
        None => node.with_child("cond", Child::Null),
    }
}

/// `foreach (expr as $key => $value)`. Children: `expr`, `value`, `key`,
/// `stmts`.
#[must_use]
pub fn foreach(line: u32, expr: Node, value: Node, key: Option<Node>, stmts: Vec<Node>) -> Node {
    let node = Node::new(Kind::Foreach, 0, line)
        .with_child("expr", expr)
        .with_child("value", value)
        .with_child("stmts", stmt_list(line, stmts));
    match key {
        Some(k) => node.with_child("key", k),
        None => node.with_child("key", Child::Null),
    }
}

#[must_use]
pub fn while_stmt(line: u32, cond: Node, stmts: Vec<Node>) -> Node {
    Node::new(Kind::While, 0, line)
        .with_child("cond", cond)
        .with_child("stmts", stmt_list(line, stmts))
}

/// `try { } catch () { } finally { }`. Children: `try`, `catches`
/// (CatchList), `finally` (StmtList or null).
#[must_use]
pub fn try_stmt(line: u32, body: Vec<Node>, catches: Vec<Node>, finally: Option<Vec<Node>>) -> Node {
    let node = Node::new(Kind::Try, 0, line)
        .with_child("try", stmt_list(line, body))
        .with_child(
            "catches",
            Node::new(Kind::CatchList, 0, line)
                .with_list(catches.into_iter().map(Child::from).collect()),
        );
    match finally {
        Some(f) => node.with_child("finally", stmt_list(line, f)),
        None => node.with_child("finally", Child::Null),
    }
}

/// One catch clause. Children: `classes` (NameList), `var`, `stmts`.
#[must_use]
pub fn catch(line: u32, classes: Vec<Node>, var_name: &str, stmts: Vec<Node>) -> Node {
    Node::new(Kind::Catch, 0, line)
        .with_child("classes", name_list(line, classes))
        .with_child("var", var_name)
        .with_child("stmts", stmt_list(line, stmts))
}

#[must_use]
pub fn throw(line: u32, expr: Node) -> Node {
    Node::new(Kind::Throw, 0, line).with_child("expr", expr)
}

#[must_use]
pub fn yield_value(line: u32, value: Option<Child>, key: Option<Child>) -> Node {
    let node = Node::new(Kind::Yield, 0, line);
    let node = match value {
        Some(v) => node.with_child("value", v),
        None => node.with_child("value", Child::Null),
    };
    match key {
        Some(k) => node.with_child("key", k),
        None => node.with_child("key", Child::Null),
    }
}
