//! Scope tree for name resolution
//!
//! Scopes form a tree rooted at the library scope: one class scope per
//! declared type, one member-body scope per constructor/method/getter/
//! setter, and nested block scopes for locals. A scope maps each simple
//! name to the declarations bound under it, in insertion order; lookup
//! checks own bindings first, then walks the parent chain. Members of a
//! class are bound directly in its class scope, so member bodies see them
//! without any supertype traversal (inherited members go through the
//! [`crate::SuperMemberLookup`] hook instead).
//!
//! The tree is built once while resolving a unit and never mutated
//! afterwards.

use crate::decl::DeclId;
use indexmap::IndexMap;
use lk_intern::Symbol;

/// Unique identifier for a scope
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct ScopeId(pub u32);

/// Kind of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Library (top-level) scope, the root
    Library,
    /// Class body scope
    Class,
    /// Constructor/method/getter/setter body scope
    MemberBody,
    /// Nested block scope
    Block,
}

/// A single scope in the tree
#[derive(Debug)]
pub struct Scope {
    /// Parent scope (`None` only for the library scope)
    pub parent: Option<ScopeId>,
    /// Kind of scope
    pub kind: ScopeKind,
    /// Declarations bound under each name, in insertion order. A name
    /// holds more than one declaration for getter/setter properties and
    /// for conflicting declarations that were diagnosed but still bound.
    bindings: IndexMap<Symbol, Vec<DeclId>>,
}

impl Scope {
    fn new(parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            parent,
            kind,
            bindings: IndexMap::new(),
        }
    }
}

/// Scope tree for one compilation unit
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    /// Library-level (root) scope
    pub library_scope: ScopeId,
}

impl ScopeTree {
    /// Create a tree containing only the library scope
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(None, ScopeKind::Library)],
            library_scope: ScopeId(0),
        }
    }

    /// Create a child scope
    pub fn create_child(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        let scope_id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(Some(parent), kind));
        scope_id
    }

    /// Bind a declaration under `name` in `scope`
    ///
    /// Binding never fails: compatibility between declarations sharing a
    /// name is the declaration index's decision, and even conflicting
    /// declarations stay bound so later references still resolve.
    pub fn bind(&mut self, scope: ScopeId, name: Symbol, decl: DeclId) {
        self.scopes[scope.0 as usize]
            .bindings
            .entry(name)
            .or_default()
            .push(decl);
    }

    /// Declarations bound under `name` in `scope` itself, in insertion
    /// order; empty if the name is unbound there
    pub fn bound_in(&self, scope: ScopeId, name: Symbol) -> &[DeclId] {
        self.scopes[scope.0 as usize]
            .bindings
            .get(&name)
            .map_or(&[], Vec::as_slice)
    }

    /// Resolve `name` from `scope`, walking up the parent chain
    ///
    /// Returns the first declaration bound under the name in the nearest
    /// scope that binds it (for a getter/setter property that is the
    /// earlier-declared accessor).
    pub fn lookup(&self, scope: ScopeId, name: Symbol) -> Option<DeclId> {
        let mut current = scope;
        loop {
            let scope_data = &self.scopes[current.0 as usize];
            if let Some(decls) = scope_data.bindings.get(&name) {
                if let Some(&first) = decls.first() {
                    return Some(first);
                }
            }
            current = scope_data.parent?;
        }
    }

    /// Get a scope by ID
    pub fn scope(&self, scope: ScopeId) -> &Scope {
        &self.scopes[scope.0 as usize]
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
