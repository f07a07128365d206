//! AST (Abstract Syntax Tree) definitions for the C subset
//!
//! Two layers live here:
//! - syntax produced by the parser ([`Program`], [`TopLevel`], [`TypeSpec`])
//! - the annotated tree handed to the stepper ([`CompiledFile`], [`FunctionDef`],
//!   [`Node`], resolved [`Type`]s and per-function [`FrameInventory`]s)
//!
//! Tree children are reference counted ([`NodeRef`]) so that pending
//! continuations can hold on to the rest of a block or a loop without
//! borrowing from the compiled file.

use crate::memory::value::Value;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a tree node.
pub type NodeRef = Rc<Node>;

/// Byte-offset range into the source text, `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// The source text covered by this span, if it is in range.
    pub fn text(self, source: &str) -> Option<&str> {
        source.get(self.start..self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Line/column position (both 1-based) for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Maps byte offsets back to line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .char_indices()
                .filter(|&(_, ch)| ch == '\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    pub fn locate(&self, offset: usize) -> SourceLocation {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        SourceLocation::new(line + 1, offset - self.line_starts[line] + 1)
    }

    /// Byte range of the 1-based `line`, without its newline.
    pub fn line_span(&self, line: usize, source: &str) -> Option<Span> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(source.len());
        Some(Span::new(start, end))
    }
}

/// Base types supported by the interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Int,
    Char,
    Float,
    Str,
    Void,
}

impl BaseType {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "int" => Some(BaseType::Int),
            "char" => Some(BaseType::Char),
            "float" => Some(BaseType::Float),
            "string" => Some(BaseType::Str),
            "void" => Some(BaseType::Void),
            _ => None,
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BaseType::Int => "int",
            BaseType::Char => "char",
            BaseType::Float => "float",
            BaseType::Str => "string",
            BaseType::Void => "void",
        };
        f.write_str(name)
    }
}

/// Type name as written in the source, before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName {
    Base(BaseType),
    Struct(String),
}

/// Declared type as written: base name, pointer stars, array dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: TypeName,
    pub pointer_depth: usize, // 0 = not pointer, 1 = *, 2 = **, etc.
    pub array_dims: Vec<usize>,
    pub span: Span,
}

impl TypeSpec {
    pub fn new(name: TypeName, span: Span) -> Self {
        TypeSpec {
            name,
            pointer_depth: 0,
            array_dims: Vec::new(),
            span,
        }
    }

    pub fn with_pointer(mut self) -> Self {
        self.pointer_depth += 1;
        self
    }

    pub fn with_array(mut self, size: usize) -> Self {
        self.array_dims.push(size);
        self
    }
}

/// Fully resolved type, as recorded in frame inventories and produced by
/// runtime type constructors.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Base(BaseType),
    /// A struct reached through a pointer; kept by name so self-referential
    /// structs stay finite.
    Named(String),
    Pointer(Box<Type>),
    Array(Box<Type>, usize),
    Struct {
        name: String,
        fields: Vec<(String, Type)>,
    },
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Base(base) => write!(f, "{}", base),
            Type::Named(name) => write!(f, "{}", name),
            Type::Pointer(inner) => write!(f, "{}*", inner),
            Type::Array(inner, len) => write!(f, "{}[{}]", inner, len),
            Type::Struct { name, .. } => write!(f, "struct {}", name),
        }
    }
}

/// Type constructor as it appears inside an expression (e.g. the argument
/// of `malloc`). Sub-parts are nodes, resolved by the stepper at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Base(BaseType),
    Named(String),
    Pointer(NodeRef),
    Array {
        element: NodeRef,
        size: NodeRef,
    },
    Struct {
        name: String,
        fields: Rc<[(String, NodeRef)]>,
    },
}

/// Type tag carried by literal nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitTag {
    Int,
    Char,
    Str,
    Bool,
    Ptr,
    Untyped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub tag: LitTag,
    pub value: Value,
}

impl Literal {
    pub fn new(tag: LitTag, value: Value) -> Self {
        Literal { tag, value }
    }
}

/// Binary operators accepted by the grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Scope,
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
    Assign,
    MulAssign,
    DivAssign,
    AddAssign,
    SubAssign,
    Comma,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Scope => "::",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::BitAnd => "&",
            BinOp::BitXor => "^",
            BinOp::BitOr => "|",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Assign => "=",
            BinOp::MulAssign => "*=",
            BinOp::DivAssign => "/=",
            BinOp::AddAssign => "+=",
            BinOp::SubAssign => "-=",
            BinOp::Comma => ",",
        }
    }
}

/// Prefix operators accepted by the grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Sizeof,
    PreInc,
    PreDec,
    BitNot,
    Not,
    Neg,
    Plus,
    AddrOf,
    Deref,
    New,
    Delete,
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Sizeof => "sizeof",
            UnOp::PreInc => "++",
            UnOp::PreDec => "--",
            UnOp::BitNot => "~",
            UnOp::Not => "!",
            UnOp::Neg => "-",
            UnOp::Plus => "+",
            UnOp::AddrOf => "&",
            UnOp::Deref => "*",
            UnOp::New => "new",
            UnOp::Delete => "delete",
        }
    }
}

/// Native callables living in the global namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Print,
    Malloc,
}

impl Builtin {
    pub const ALL: [Builtin; 2] = [Builtin::Print, Builtin::Malloc];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Malloc => "malloc",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Builtin::ALL.into_iter().find(|b| b.name() == name)
    }
}

/// Annotated tree nodes, statements and expressions alike
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(Literal),
    Var(String),
    Builtin(Builtin),
    Nop,
    Type(TypeExpr),
    Block(Rc<[NodeRef]>),
    Decl {
        name: String,
        ty: TypeSpec,
        init: Option<NodeRef>,
    },
    Unary {
        op: UnOp,
        operand: NodeRef,
    },
    Binary {
        op: BinOp,
        left: NodeRef,
        right: NodeRef,
    },
    Member {
        base: NodeRef,
        field: String,
    },
    Index {
        base: NodeRef,
        index: NodeRef,
    },
    Deref(NodeRef),
    Return(Option<NodeRef>),
    Call {
        callee: NodeRef,
        args: Rc<[NodeRef]>,
    },
    /// Pause boundary around one statement
    Steppoint {
        span: Span,
        stmt: NodeRef,
    },
    /// `while (cond) body`
    Loop {
        cond: NodeRef,
        body: NodeRef,
    },
}

impl Node {
    /// Short name of the node kind, used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Literal(_) => "literal",
            Node::Var(_) => "variable",
            Node::Builtin(_) => "builtin",
            Node::Nop => "nop",
            Node::Type(_) => "type",
            Node::Block(_) => "block",
            Node::Decl { .. } => "declaration",
            Node::Unary { .. } => "unary operator",
            Node::Binary { .. } => "binary operator",
            Node::Member { .. } => "member access",
            Node::Index { .. } => "index access",
            Node::Deref(_) => "dereference",
            Node::Return(_) => "return",
            Node::Call { .. } => "call",
            Node::Steppoint { .. } => "steppoint",
            Node::Loop { .. } => "loop",
        }
    }

    pub fn int(value: i64) -> Node {
        Node::Literal(Literal::new(LitTag::Int, Value::Number(value as f64)))
    }

    pub fn var(name: impl Into<String>) -> Node {
        Node::Var(name.into())
    }
}

// ===== Parser output =====

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeSpec,
}

/// `struct Name { ... };` or `class Name { ... };`
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub return_type: TypeSpec,
    pub params: Vec<ParamDecl>,
    pub body: NodeRef,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopLevel {
    Struct(StructDecl),
    Function(FunctionDecl),
}

/// Top-level program structure as parsed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub nodes: Vec<TopLevel>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}

// ===== Analysis output =====

/// Every local slot of a function (parameters first) with its type.
///
/// Insertion order is the order of first declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameInventory {
    slots: Vec<(String, Type)>,
}

impl FrameInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a slot; a repeated name keeps its position and takes the new type.
    pub fn insert(&mut self, name: impl Into<String>, ty: Type) {
        let name = name.into();
        match self.slots.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = ty,
            None => self.slots.push((name, ty)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.slots.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.slots.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

/// A user function ready for execution
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Param>,
    pub body: NodeRef,
    pub frame: FrameInventory,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<(String, Type)>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Function(Rc<FunctionDef>),
    Struct(Rc<StructDef>),
}

/// Result of parsing plus analysis: declarations in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledFile {
    pub decls: Vec<Decl>,
}

impl CompiledFile {
    pub fn functions(&self) -> impl Iterator<Item = &Rc<FunctionDef>> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Function(f) => Some(f),
            Decl::Struct(_) => None,
        })
    }

    pub fn function(&self, name: &str) -> Option<&Rc<FunctionDef>> {
        self.functions().find(|f| f.name == name)
    }

    pub fn structs(&self) -> impl Iterator<Item = &Rc<StructDef>> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Struct(s) => Some(s),
            Decl::Function(_) => None,
        })
    }
}
