//! Syntax tree for one Lark compilation unit
//!
//! The parser produces one [`Unit`] per source file. Nodes are
//! arena-allocated and addressed through typed [`Idx`] handles; every node
//! carries the span the lexer measured for it. The tree is immutable once
//! parsing finishes — resolution and later passes only read it.

use lk_arena::{Arena, Idx};
use lk_intern::Symbol;
use lk_span::Span;

/// Handle to an expression in [`Unit::exprs`]
pub type ExprId = Idx<Expr>;
/// Handle to a statement in [`Unit::stmts`]
pub type StmtId = Idx<Stmt>;
/// Handle to a type reference in [`Unit::type_refs`]
pub type TypeRefId = Idx<TypeRef>;

/// An identifier token: interned name plus the token's span
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ident {
    /// Interned name
    pub name: Symbol,
    /// Span of the identifier token
    pub span: Span,
}

/// A parsed compilation unit (one source file)
#[derive(Debug, Default)]
pub struct Unit {
    /// Top-level declarations in source order
    pub items: Vec<Item>,
    /// Expression arena
    pub exprs: Arena<Expr>,
    /// Statement arena
    pub stmts: Arena<Stmt>,
    /// Type-reference arena
    pub type_refs: Arena<TypeRef>,
}

impl Unit {
    /// Create an empty unit
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression node
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        self.exprs.alloc(expr)
    }

    /// Allocate a statement node
    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        self.stmts.alloc(stmt)
    }

    /// Allocate a type-reference node
    pub fn alloc_type_ref(&mut self, type_ref: TypeRef) -> TypeRefId {
        self.type_refs.alloc(type_ref)
    }
}

/// A top-level declaration
#[derive(Debug)]
pub enum Item {
    /// Class or interface declaration
    Class(ClassDecl),
    /// Top-level function, getter or setter
    Function(FunctionDecl),
    /// Top-level variable
    Variable(VariableDecl),
}

/// Whether a function-shaped declaration is a plain function, a getter
/// or a setter
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Accessor {
    /// Plain function or method
    None,
    /// `get name() { ... }`
    Getter,
    /// `set name(value) { ... }`
    Setter,
}

/// A class declaration
#[derive(Debug)]
pub struct ClassDecl {
    /// Class name token
    pub name: Ident,
    /// Declared type parameters, in order
    pub type_params: Vec<Ident>,
    /// Supertype reference, if an `extends` clause is present
    pub extends: Option<TypeRefId>,
    /// Members in source order
    pub members: Vec<Member>,
    /// Span of the whole declaration
    pub span: Span,
}

/// A class member
#[derive(Debug)]
pub enum Member {
    /// Instance or static field
    Field(FieldDecl),
    /// Method, getter or setter
    Method(MethodDecl),
    /// Constructor (named or unnamed)
    Constructor(ConstructorDecl),
}

/// A field declaration
#[derive(Debug)]
pub struct FieldDecl {
    /// Field name token
    pub name: Ident,
    /// Declared type, if annotated
    pub ty: Option<TypeRefId>,
    /// `static` modifier
    pub is_static: bool,
    /// Initializer expression, if present
    pub initializer: Option<ExprId>,
    /// Span of the whole declaration
    pub span: Span,
}

/// A formal parameter
#[derive(Debug)]
pub struct Param {
    /// Parameter name token
    pub name: Ident,
    /// Declared type, if annotated
    pub ty: Option<TypeRefId>,
}

/// A method, getter or setter declaration inside a class
#[derive(Debug)]
pub struct MethodDecl {
    /// Member name token
    pub name: Ident,
    /// Plain method vs getter vs setter
    pub accessor: Accessor,
    /// `static` modifier
    pub is_static: bool,
    /// Formal parameters
    pub params: Vec<Param>,
    /// Declared return type, if annotated
    pub return_ty: Option<TypeRefId>,
    /// Body statements; `None` for abstract members
    pub body: Option<Vec<StmtId>>,
    /// Span of the whole declaration
    pub span: Span,
}

/// A top-level function, getter or setter
#[derive(Debug)]
pub struct FunctionDecl {
    /// Function name token
    pub name: Ident,
    /// Plain function vs getter vs setter
    pub accessor: Accessor,
    /// Formal parameters
    pub params: Vec<Param>,
    /// Declared return type, if annotated
    pub return_ty: Option<TypeRefId>,
    /// Body statements
    pub body: Vec<StmtId>,
    /// Span of the whole declaration
    pub span: Span,
}

/// A top-level variable declaration
#[derive(Debug)]
pub struct VariableDecl {
    /// Variable name token
    pub name: Ident,
    /// Declared type, if annotated
    pub ty: Option<TypeRefId>,
    /// Initializer expression, if present
    pub initializer: Option<ExprId>,
    /// Span of the whole declaration
    pub span: Span,
}

/// A constructor declaration
///
/// The unnamed constructor of class `A` is written `A(...)`; a named
/// constructor is written `A.foo(...)`. `name` holds only the `foo`
/// suffix, while `name_span` covers the full `A` / `A.foo` token run that
/// duplicate diagnostics point at.
#[derive(Debug)]
pub struct ConstructorDecl {
    /// Name suffix for named constructors; `None` for the unnamed one
    pub name: Option<Symbol>,
    /// Span of the full constructor name (`A` or `A.foo`)
    pub name_span: Span,
    /// `const` modifier
    pub is_const: bool,
    /// `factory` modifier
    pub is_factory: bool,
    /// Formal parameters
    pub params: Vec<Param>,
    /// Initializer-list entries (`: x = expr, y = expr`), in source order
    pub initializers: Vec<Initializer>,
    /// Forwarding clause, if this constructor redirects
    pub redirect: Option<Redirect>,
    /// Body statements; `None` when the declaration ends with `;`
    pub body: Option<Vec<StmtId>>,
    /// Span of the whole declaration
    pub span: Span,
}

/// One entry of a constructor initializer list: `field = value`
#[derive(Debug)]
pub struct Initializer {
    /// Initialized field, parsed as an identifier expression
    pub field: ExprId,
    /// Initializing expression
    pub value: ExprId,
    /// Span of the whole entry
    pub span: Span,
}

/// A constructor forwarding clause (`: this(...)`, `: this.foo(...)`,
/// `: super(...)`, `: super.foo(...)`)
#[derive(Debug)]
pub struct Redirect {
    /// Whether the target constructor lives on this class or the supertype
    pub target: RedirectTarget,
    /// Target constructor name suffix; `None` for the unnamed constructor
    pub name: Option<Symbol>,
    /// Span of the forwarding clause
    pub span: Span,
}

/// Which class a constructor forwards to
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RedirectTarget {
    /// `: this(...)` — another constructor of the same class
    This,
    /// `: super(...)` — a constructor of the supertype
    Super,
}

/// A statement
#[derive(Debug)]
pub enum Stmt {
    /// Expression statement
    Expr {
        /// The evaluated expression
        expr: ExprId,
        /// Statement span
        span: Span,
    },
    /// `return` with optional value
    Return {
        /// Returned expression, if any
        value: Option<ExprId>,
        /// Statement span
        span: Span,
    },
    /// Local variable declaration
    Local(LocalDecl),
    /// Nested block, opening a fresh scope
    Block {
        /// Statements in the block
        stmts: Vec<StmtId>,
        /// Block span
        span: Span,
    },
}

/// A local variable declaration statement
#[derive(Debug)]
pub struct LocalDecl {
    /// Variable name token
    pub name: Ident,
    /// Declared type, if annotated
    pub ty: Option<TypeRefId>,
    /// Initializer expression, if present
    pub initializer: Option<ExprId>,
    /// Statement span
    pub span: Span,
}

/// An expression
#[derive(Debug)]
pub enum Expr {
    /// Literal of any kind; opaque to name resolution
    Literal {
        /// Literal span
        span: Span,
    },
    /// Simple identifier reference
    Identifier {
        /// Referenced name
        name: Symbol,
        /// Identifier span
        span: Span,
    },
    /// `this`
    This {
        /// Span of the `this` token
        span: Span,
    },
    /// `super.member` access or invocation
    Super(SuperAccess),
    /// `receiver.field`
    Field {
        /// Receiver expression
        receiver: ExprId,
        /// Accessed field name
        field: Ident,
        /// Whole-expression span
        span: Span,
    },
    /// Function or method call
    Call {
        /// Called expression
        callee: ExprId,
        /// Arguments in order
        args: Vec<ExprId>,
        /// Whole-expression span
        span: Span,
    },
    /// Assignment
    Assign {
        /// Assigned-to expression
        target: ExprId,
        /// Assigned value
        value: ExprId,
        /// Whole-expression span
        span: Span,
    },
    /// List literal
    List {
        /// Element expressions
        elements: Vec<ExprId>,
        /// Whole-expression span
        span: Span,
    },
    /// Map literal
    Map {
        /// Key/value entries
        entries: Vec<(ExprId, ExprId)>,
        /// Whole-expression span
        span: Span,
    },
}

/// A `super.member` access
#[derive(Debug)]
pub struct SuperAccess {
    /// Span of the `super` token itself
    pub span: Span,
    /// Accessed member name
    pub member: Ident,
    /// Plain access vs invocation
    pub kind: SuperAccessKind,
    /// Invocation arguments; empty for plain accesses
    pub args: Vec<ExprId>,
}

/// How a `super` member is used
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SuperAccessKind {
    /// `super.foo` read or write
    Field,
    /// `super.foo(...)`
    Invocation,
}

/// A use of a type name, optionally with type arguments
///
/// `span` runs from the first character of the name through the closing
/// angle bracket of the argument list (or just the name when no list is
/// written); arity diagnostics point at this span.
#[derive(Debug)]
pub struct TypeRef {
    /// Type name token
    pub name: Ident,
    /// Supplied type arguments, in order
    pub args: Vec<TypeRefId>,
    /// Span of the whole reference
    pub span: Span,
}
