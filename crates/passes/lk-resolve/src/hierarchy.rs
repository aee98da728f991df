//! Supertype-member lookup hook
//!
//! The full type-hierarchy walk belongs to the type-checking
//! collaborator; this pass only needs to ask "does type `T` declare or
//! inherit a member named `N`, and is it static?" to validate legal
//! `super.name` accesses. Drivers inject an implementation; units without
//! supertype members can use [`NoSuperMembers`].

use lk_intern::Symbol;

/// Kind of member found on a supertype
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SuperMemberKind {
    /// Field
    Field,
    /// Getter
    Getter,
    /// Method
    Method,
}

/// A member found on a supertype
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SuperMember {
    /// What kind of member was found
    pub kind: SuperMemberKind,
    /// Whether the member is static
    pub is_static: bool,
}

/// The type-hierarchy collaborator's view of declared/inherited members
pub trait SuperMemberLookup {
    /// Look up member `name` on type `ty`, following the hierarchy
    fn lookup(&self, ty: Symbol, name: Symbol) -> Option<SuperMember>;
}

/// Hierarchy view that knows no members; every `super.name` access is
/// unresolved
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSuperMembers;

impl SuperMemberLookup for NoSuperMembers {
    fn lookup(&self, _ty: Symbol, _name: Symbol) -> Option<SuperMember> {
        None
    }
}
