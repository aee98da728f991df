//! Bound declarations
//!
//! Resolution turns every named syntax node into a [`Declaration`] owned
//! by exactly one scope. Declarations are arena-allocated; scopes and the
//! binding tables in [`crate::BoundUnit`] refer to them by [`DeclId`].

use lk_arena::Idx;
use lk_intern::Symbol;
use lk_span::Span;

/// Handle to a declaration in the unit's declaration arena
pub type DeclId = Idx<Declaration>;

/// What a declaration declares
///
/// This is a closed set: every decision point in the pass matches it
/// exhaustively, so adding a kind forces each site to be revisited.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// Class or interface
    Class,
    /// Instance or static field
    Field,
    /// Instance or static method
    Method,
    /// Getter
    Getter,
    /// Setter
    Setter,
    /// Constructor, named or unnamed
    Constructor,
    /// Class type parameter
    TypeParameter,
    /// Top-level function
    TopLevelFunction,
    /// Top-level variable
    TopLevelVariable,
    /// Formal parameter of a member or function
    Parameter,
    /// Local variable
    LocalVariable,
}

impl DeclKind {
    /// Whether this kind can denote a type in a type reference
    pub fn is_type(self) -> bool {
        matches!(self, Self::Class | Self::TypeParameter)
    }
}

/// A named, source-located entity bound during resolution
#[derive(Debug, Clone)]
pub struct Declaration {
    /// Name the declaration is bound under. Constructors bind under their
    /// full name (`A`, `A.foo`), which is also their display name in
    /// duplicate diagnostics.
    pub name: Symbol,
    /// Declaration kind
    pub kind: DeclKind,
    /// Span of the name token (for constructors, the full `A` / `A.foo`
    /// token run)
    pub name_span: Span,
    /// Span of the whole declaration
    pub decl_span: Span,
    /// `static` modifier
    pub is_static: bool,
    /// `const` modifier
    pub is_const: bool,
    /// `factory` modifier
    pub is_factory: bool,
    /// Declared type-parameter count; the arity oracle for type
    /// references naming this declaration. Zero for non-types.
    pub type_param_count: usize,
}

impl Declaration {
    /// Create a declaration with no modifiers
    pub fn plain(name: Symbol, kind: DeclKind, name_span: Span, decl_span: Span) -> Self {
        Self {
            name,
            kind,
            name_span,
            decl_span,
            is_static: false,
            is_const: false,
            is_factory: false,
            type_param_count: 0,
        }
    }
}
