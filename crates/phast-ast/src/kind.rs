//! Node kinds.

/// The kind of an AST node.
///
/// Declaration and statement kinds use named children; expression list
/// kinds (`StmtList`, `ArgList`, ...) use ordered children. The expected
/// child names for each kind are documented on the [`crate::builder`]
/// constructors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    // ==================== Declarations ====================
    /// A class, interface or trait declaration (discriminated by
    /// `flags::class_flags`).
    Class,
    /// `const A = ...;` elements inside a class body.
    ClassConstDecl,
    /// One `NAME = value` element of a const declaration.
    ConstElem,
    /// A property declaration group (one visibility, one declared type,
    /// one or more elements).
    PropGroup,
    /// One `$name = default` element of a property group.
    PropElem,
    Method,
    FuncDecl,
    Closure,
    ParamList,
    Param,
    /// Top-level `const NAME = ...;`.
    ConstDecl,

    // ==================== Namespaces ====================
    Namespace,
    Use,
    GroupUse,
    UseElem,
    Declare,

    // ==================== Statements ====================
    StmtList,
    Return,
    Echo,
    If,
    IfElem,
    While,
    DoWhile,
    For,
    Foreach,
    Switch,
    SwitchList,
    SwitchCase,
    Try,
    CatchList,
    Catch,
    Throw,
    Break,
    Continue,
    Global,
    StaticVar,
    Unset,

    // ==================== Expressions ====================
    Var,
    Name,
    /// An ordered list of `Name` nodes (extends/implements/trait-use lists,
    /// catch class lists).
    NameList,
    Const,
    MagicConst,
    Call,
    MethodCall,
    StaticCall,
    New,
    Prop,
    StaticProp,
    ClassConst,
    Dim,
    Array,
    ArrayElem,
    Assign,
    AssignOp,
    AssignRef,
    BinaryOp,
    UnaryOp,
    Cast,
    Isset,
    Empty,
    Conditional,
    Instanceof,
    Clone,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    Print,
    /// `list(...) = ` / `[...] = ` destructuring target.
    List,
    ClosureUses,
    ClosureVar,
    Yield,
    YieldFrom,
    /// Interpolated string.
    EncapsList,
    ArgList,
    /// A spread argument `...$args` at a call site.
    Unpack,

    // ==================== Type annotations ====================
    /// A native type annotation (discriminated by `flags::type_flags`).
    Type,
    /// `?T`.
    NullableType,
}

impl Kind {
    /// True for nodes that can appear in statement position and carry
    /// their own scope effect (declarations handled by the parse pass).
    #[must_use]
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            Kind::Class | Kind::Method | Kind::FuncDecl | Kind::ConstDecl | Kind::PropGroup
        )
    }

    /// Parse the kind name an AST dump uses (`"Class"`, `"StmtList"`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Class" => Kind::Class,
            "ClassConstDecl" => Kind::ClassConstDecl,
            "ConstElem" => Kind::ConstElem,
            "PropGroup" => Kind::PropGroup,
            "PropElem" => Kind::PropElem,
            "Method" => Kind::Method,
            "FuncDecl" => Kind::FuncDecl,
            "Closure" => Kind::Closure,
            "ParamList" => Kind::ParamList,
            "Param" => Kind::Param,
            "ConstDecl" => Kind::ConstDecl,
            "Namespace" => Kind::Namespace,
            "Use" => Kind::Use,
            "GroupUse" => Kind::GroupUse,
            "UseElem" => Kind::UseElem,
            "Declare" => Kind::Declare,
            "StmtList" => Kind::StmtList,
            "Return" => Kind::Return,
            "Echo" => Kind::Echo,
            "If" => Kind::If,
            "IfElem" => Kind::IfElem,
            "While" => Kind::While,
            "DoWhile" => Kind::DoWhile,
            "For" => Kind::For,
            "Foreach" => Kind::Foreach,
            "Switch" => Kind::Switch,
            "SwitchList" => Kind::SwitchList,
            "SwitchCase" => Kind::SwitchCase,
            "Try" => Kind::Try,
            "CatchList" => Kind::CatchList,
            "Catch" => Kind::Catch,
            "Throw" => Kind::Throw,
            "Break" => Kind::Break,
            "Continue" => Kind::Continue,
            "Global" => Kind::Global,
            "StaticVar" => Kind::StaticVar,
            "Unset" => Kind::Unset,
            "Var" => Kind::Var,
            "Name" => Kind::Name,
            "NameList" => Kind::NameList,
            "Const" => Kind::Const,
            "MagicConst" => Kind::MagicConst,
            "Call" => Kind::Call,
            "MethodCall" => Kind::MethodCall,
            "StaticCall" => Kind::StaticCall,
            "New" => Kind::New,
            "Prop" => Kind::Prop,
            "StaticProp" => Kind::StaticProp,
            "ClassConst" => Kind::ClassConst,
            "Dim" => Kind::Dim,
            "Array" => Kind::Array,
            "ArrayElem" => Kind::ArrayElem,
            "Assign" => Kind::Assign,
            "AssignOp" => Kind::AssignOp,
            "AssignRef" => Kind::AssignRef,
            "BinaryOp" => Kind::BinaryOp,
            "UnaryOp" => Kind::UnaryOp,
            "Cast" => Kind::Cast,
            "Isset" => Kind::Isset,
            "Empty" => Kind::Empty,
            "Conditional" => Kind::Conditional,
            "Instanceof" => Kind::Instanceof,
            "Clone" => Kind::Clone,
            "PreInc" => Kind::PreInc,
            "PreDec" => Kind::PreDec,
            "PostInc" => Kind::PostInc,
            "PostDec" => Kind::PostDec,
            "Print" => Kind::Print,
            "List" => Kind::List,
            "ClosureUses" => Kind::ClosureUses,
            "ClosureVar" => Kind::ClosureVar,
            "Yield" => Kind::Yield,
            "YieldFrom" => Kind::YieldFrom,
            "EncapsList" => Kind::EncapsList,
            "ArgList" => Kind::ArgList,
            "Unpack" => Kind::Unpack,
            "Type" => Kind::Type,
            "NullableType" => Kind::NullableType,
            _ => return None,
        })
    }
}
