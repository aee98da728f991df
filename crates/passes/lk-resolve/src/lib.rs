//! Name resolution for Lark
//!
//! This crate is the binding phase of the front end. Given a parsed
//! compilation unit it builds the lexical/namespace structure, binds every
//! identifier, type name, `this` and `super` occurrence to the declaration
//! it denotes, and diagnoses declaration-level conflicts and contextual
//! violations.
//!
//! # Architecture
//!
//! Resolution runs as two sub-passes over one immutable syntax tree:
//! - **Declaration index**: folds over declarations in source order,
//!   building the library and class scopes and diagnosing duplicate
//!   members, duplicate top-level definitions and illegal constructor
//!   forms.
//! - **Context resolver**: walks every body against the built scopes,
//!   recording bindings and diagnosing illegal `this`/`super` placement,
//!   wrong-arity generic instantiations, illegal `super` member accesses
//!   and constructor redirection faults.
//!
//! Every violation found is reported to the injected [`DiagnosticSink`]
//! in detection order and resolution continues; a unit with zero reported
//! errors is successfully resolved. Units are independent: several may be
//! resolved concurrently as long as each gets its own sink, with the
//! immutable [`Builtins`] set as the only shared state.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lk_resolve::{resolve, Builtins, ErrorCollector, NoSuperMembers};
//!
//! let mut sink = ErrorCollector::default();
//! let bound = resolve(&unit, &interner, &mut sink, &Builtins::core(), &NoSuperMembers);
//! if bound.is_resolved() {
//!     // Hand bound references to type inference
//! }
//! ```

pub mod builtins;
pub mod decl;
pub mod error;
pub mod hierarchy;
pub mod index;
pub mod resolver;
pub mod scope;

pub use builtins::{BuiltinType, Builtins};
pub use decl::{DeclId, DeclKind, Declaration};
pub use error::{DiagnosticSink, ErrorCode, ErrorCollector, ResolutionError};
pub use hierarchy::{NoSuperMembers, SuperMember, SuperMemberKind, SuperMemberLookup};
pub use resolver::{BoundUnit, ContextResolver, EnclosingContext};
pub use scope::{Scope, ScopeId, ScopeKind, ScopeTree};

use lk_ast::Unit;
use lk_intern::Interner;

/// Resolve one compilation unit
///
/// Builds the declaration index over `unit` with `builtins`
/// pre-registered in the library scope, then runs the context resolver
/// over every body. Each detected [`ResolutionError`] is handed to `sink`
/// exactly once, in detection order, with no buffering or deduplication.
/// The returned [`BoundUnit`] carries the scope tree and the binding
/// tables that type checking consumes.
pub fn resolve(
    unit: &Unit,
    interner: &Interner,
    sink: &mut dyn DiagnosticSink,
    builtins: &Builtins,
    hierarchy: &dyn SuperMemberLookup,
) -> BoundUnit {
    let indexed = index::DeclarationIndex::build(unit, interner, builtins, sink);
    let root_type = interner.intern(builtins.root_type);
    ContextResolver::new(unit, interner, indexed, hierarchy, root_type, sink).run()
}
