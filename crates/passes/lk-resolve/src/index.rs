//! Declaration index
//!
//! First of the two resolution sub-passes. Folds over a unit's
//! declarations in source order — the top-level pass first, then each
//! class's members in declaration order — building the library and class
//! scopes and diagnosing namespace conflicts as it goes.
//!
//! Conflict detection is an explicit fold: each name's state is a
//! [`BindingState`] value that only ever moves forward, so diagnostics
//! already emitted are never revisited. The one compatible combination is
//! a getter and a setter of the same name, which merge into a property;
//! every other pair clashes, and both participants of a two-member clash
//! are flagged.

use crate::builtins::Builtins;
use crate::decl::{DeclId, DeclKind, Declaration};
use crate::error::{CountingSink, DiagnosticSink, ErrorCode, ResolutionError};
use crate::scope::{ScopeId, ScopeKind, ScopeTree};
use indexmap::IndexMap;
use lk_arena::Arena;
use lk_ast::{Accessor, ClassDecl, ConstructorDecl, Item, Member, Unit};
use lk_intern::{Interner, Symbol};
use lk_span::Span;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Scopes and declarations produced by the declaration index, consumed by
/// the context resolver
#[derive(Debug)]
pub struct IndexedUnit {
    /// Scope tree holding the library and class scopes
    pub scopes: ScopeTree,
    /// All declarations of the unit, including pre-registered builtins
    pub decls: Arena<Declaration>,
    /// Class scope of each declared type
    pub class_scopes: FxHashMap<Symbol, ScopeId>,
    /// Number of diagnostics reported while indexing; the context
    /// resolver folds this into the final [`crate::BoundUnit`] count
    pub error_count: usize,
}

/// Per-name binding state of the conflict fold
///
/// A name absent from the fold map is vacant. States only move forward;
/// `Clashed` is terminal and every further arrival under that name is
/// flagged on arrival.
#[derive(Debug, Clone, Copy)]
enum BindingState {
    /// Exactly one declaration so far
    Single(DeclId),
    /// A compatible getter/setter pair forming one property
    Property {
        getter: DeclId,
        setter: DeclId,
        /// Earlier-declared accessor, the collision partner for
        /// non-accessor arrivals
        first: DeclId,
    },
    /// A conflict was diagnosed under this name
    Clashed {
        first: DeclId,
        getter: Option<DeclId>,
        setter: Option<DeclId>,
    },
}

/// Accessor grouping of a declaration kind for compatibility decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Getter,
    Setter,
    Plain,
}

fn group_of(kind: DeclKind) -> Group {
    match kind {
        DeclKind::Getter => Group::Getter,
        DeclKind::Setter => Group::Setter,
        DeclKind::Class
        | DeclKind::Field
        | DeclKind::Method
        | DeclKind::Constructor
        | DeclKind::TypeParameter
        | DeclKind::TopLevelFunction
        | DeclKind::TopLevelVariable
        | DeclKind::Parameter
        | DeclKind::LocalVariable => Group::Plain,
    }
}

/// Builds the scope tree and declaration arena for one unit
pub struct DeclarationIndex<'a> {
    unit: &'a Unit,
    interner: &'a Interner,
    scopes: ScopeTree,
    decls: Arena<Declaration>,
    class_scopes: FxHashMap<Symbol, ScopeId>,
    flagged: FxHashSet<DeclId>,
}

impl<'a> DeclarationIndex<'a> {
    /// Index `unit`: pre-register `builtins`, fold the top level, then
    /// each class body, reporting conflicts to `sink` in detection order
    pub fn build(
        unit: &'a Unit,
        interner: &'a Interner,
        builtins: &Builtins,
        sink: &mut dyn DiagnosticSink,
    ) -> IndexedUnit {
        let mut index = Self {
            unit,
            interner,
            scopes: ScopeTree::new(),
            decls: Arena::default(),
            class_scopes: FxHashMap::default(),
            flagged: FxHashSet::default(),
        };

        let mut counting = CountingSink::new(sink);
        index.register_builtins(builtins);
        index.index_top_level(&mut counting);
        index.index_class_bodies(&mut counting);

        debug!(
            declarations = index.decls.len(),
            classes = index.class_scopes.len(),
            errors = counting.count,
            "declaration index built"
        );

        IndexedUnit {
            scopes: index.scopes,
            decls: index.decls,
            class_scopes: index.class_scopes,
            error_count: counting.count,
        }
    }

    /// Bind the built-in types into the library scope
    ///
    /// Builtins are ordinary declarations for lookup and arity purposes
    /// but are registered before user code and never diagnosed; they have
    /// no source, so they carry the zero span.
    fn register_builtins(&mut self, builtins: &Builtins) {
        for builtin in &builtins.types {
            let name = self.interner.intern(builtin.name);
            let mut decl =
                Declaration::plain(name, DeclKind::Class, Span::new(0, 0, 0), Span::new(0, 0, 0));
            decl.type_param_count = builtin.type_params;
            let decl_id = self.decls.alloc(decl);
            let library = self.scopes.library_scope;
            self.scopes.bind(library, name, decl_id);
        }
    }

    /// Fold the top-level declarations into the library scope
    fn index_top_level(&mut self, sink: &mut dyn DiagnosticSink) {
        let mut fold: IndexMap<Symbol, BindingState> = IndexMap::new();
        let library = self.scopes.library_scope;
        let unit = self.unit;

        for item in &unit.items {
            let decl = match item {
                Item::Class(class) => {
                    let mut decl = Declaration::plain(
                        class.name.name,
                        DeclKind::Class,
                        class.name.span,
                        class.span,
                    );
                    decl.type_param_count = class.type_params.len();
                    decl
                }
                Item::Function(function) => Declaration::plain(
                    function.name.name,
                    match function.accessor {
                        Accessor::None => DeclKind::TopLevelFunction,
                        Accessor::Getter => DeclKind::Getter,
                        Accessor::Setter => DeclKind::Setter,
                    },
                    function.name.span,
                    function.span,
                ),
                Item::Variable(variable) => Declaration::plain(
                    variable.name.name,
                    DeclKind::TopLevelVariable,
                    variable.name.span,
                    variable.span,
                ),
            };
            self.declare(
                library,
                &mut fold,
                decl,
                ErrorCode::DuplicateTopLevelDefinition,
                sink,
            );
        }
    }

    /// Fold each class body into its class scope, in declaration order
    fn index_class_bodies(&mut self, sink: &mut dyn DiagnosticSink) {
        let unit = self.unit;
        for item in &unit.items {
            if let Item::Class(class) = item {
                self.index_class(class, sink);
            }
        }
    }

    fn index_class(&mut self, class: &ClassDecl, sink: &mut dyn DiagnosticSink) {
        let class_scope = self
            .scopes
            .create_child(self.scopes.library_scope, ScopeKind::Class);
        self.class_scopes.insert(class.name.name, class_scope);

        // Type parameters are visible throughout the class body but live
        // outside the member conflict fold.
        for type_param in &class.type_params {
            let decl = Declaration::plain(
                type_param.name,
                DeclKind::TypeParameter,
                type_param.span,
                type_param.span,
            );
            let decl_id = self.decls.alloc(decl);
            self.scopes.bind(class_scope, type_param.name, decl_id);
        }

        let mut fold: IndexMap<Symbol, BindingState> = IndexMap::new();
        for member in &class.members {
            match member {
                Member::Field(field) => {
                    let mut decl = Declaration::plain(
                        field.name.name,
                        DeclKind::Field,
                        field.name.span,
                        field.span,
                    );
                    decl.is_static = field.is_static;
                    self.declare(class_scope, &mut fold, decl, ErrorCode::DuplicateMember, sink);
                }
                Member::Method(method) => {
                    let mut decl = Declaration::plain(
                        method.name.name,
                        match method.accessor {
                            Accessor::None => DeclKind::Method,
                            Accessor::Getter => DeclKind::Getter,
                            Accessor::Setter => DeclKind::Setter,
                        },
                        method.name.span,
                        method.span,
                    );
                    decl.is_static = method.is_static;
                    self.declare(class_scope, &mut fold, decl, ErrorCode::DuplicateMember, sink);
                }
                Member::Constructor(ctor) => {
                    let full_name = self.constructor_name(class, ctor);
                    let mut decl = Declaration::plain(
                        full_name,
                        DeclKind::Constructor,
                        ctor.name_span,
                        ctor.span,
                    );
                    decl.is_const = ctor.is_const;
                    decl.is_factory = ctor.is_factory;
                    self.declare(class_scope, &mut fold, decl, ErrorCode::DuplicateMember, sink);

                    // A const constructor may redirect or end with `;`,
                    // but never declares a body, not even an empty one.
                    if ctor.is_const && ctor.body.is_some() {
                        sink.report(ResolutionError::new(
                            ErrorCode::ConstConstructorCannotHaveBody,
                            ctor.name_span,
                            "A const constructor cannot have a body",
                        ));
                    }
                }
            }
        }
    }

    /// Full conflict-grouping name of a constructor: the class name for
    /// the unnamed constructor, `Class.name` for a named one
    fn constructor_name(&self, class: &ClassDecl, ctor: &ConstructorDecl) -> Symbol {
        match ctor.name {
            Some(suffix) => {
                let class_name = self.interner.resolve(class.name.name);
                let suffix = self.interner.resolve(suffix);
                self.interner.intern(&format!("{class_name}.{suffix}"))
            }
            None => class.name.name,
        }
    }

    /// Admit one declaration into `scope`, advancing the per-name fold
    /// state and diagnosing a clash where the kinds are incompatible
    fn declare(
        &mut self,
        scope: ScopeId,
        fold: &mut IndexMap<Symbol, BindingState>,
        decl: Declaration,
        code: ErrorCode,
        sink: &mut dyn DiagnosticSink,
    ) {
        let name = decl.name;
        let group = group_of(decl.kind);
        let decl_id = self.decls.alloc(decl);
        self.scopes.bind(scope, name, decl_id);

        let (next, partner) = match fold.get(&name).copied() {
            None => (BindingState::Single(decl_id), None),
            Some(BindingState::Single(existing)) => {
                let existing_group = group_of(self.decls[existing].kind);
                match (existing_group, group) {
                    (Group::Getter, Group::Setter) => (
                        BindingState::Property {
                            getter: existing,
                            setter: decl_id,
                            first: existing,
                        },
                        None,
                    ),
                    (Group::Setter, Group::Getter) => (
                        BindingState::Property {
                            getter: decl_id,
                            setter: existing,
                            first: existing,
                        },
                        None,
                    ),
                    _ => (
                        BindingState::Clashed {
                            first: existing,
                            getter: slot(Group::Getter, existing_group, existing)
                                .or(slot(Group::Getter, group, decl_id)),
                            setter: slot(Group::Setter, existing_group, existing)
                                .or(slot(Group::Setter, group, decl_id)),
                        },
                        Some(existing),
                    ),
                }
            }
            Some(BindingState::Property {
                getter,
                setter,
                first,
            }) => {
                let partner = match group {
                    Group::Getter => getter,
                    Group::Setter => setter,
                    Group::Plain => first,
                };
                (
                    BindingState::Clashed {
                        first,
                        getter: Some(getter),
                        setter: Some(setter),
                    },
                    Some(partner),
                )
            }
            Some(BindingState::Clashed {
                first,
                getter,
                setter,
            }) => {
                let partner = match group {
                    Group::Getter => getter.unwrap_or(first),
                    Group::Setter => setter.unwrap_or(first),
                    Group::Plain => first,
                };
                (
                    BindingState::Clashed {
                        first,
                        getter: getter.or(slot(Group::Getter, group, decl_id)),
                        setter: setter.or(slot(Group::Setter, group, decl_id)),
                    },
                    Some(partner),
                )
            }
        };
        fold.insert(name, next);

        if let Some(partner) = partner {
            self.clash(partner, decl_id, code, sink);
        }
    }

    /// Report a clash: the colliding prior declaration first, if it has
    /// not been flagged yet, then the newly arrived one
    fn clash(
        &mut self,
        partner: DeclId,
        new_decl: DeclId,
        code: ErrorCode,
        sink: &mut dyn DiagnosticSink,
    ) {
        if self.flagged.insert(partner) {
            sink.report(self.duplicate_error(partner, code));
        }
        self.flagged.insert(new_decl);
        sink.report(self.duplicate_error(new_decl, code));
    }

    fn duplicate_error(&self, decl_id: DeclId, code: ErrorCode) -> ResolutionError {
        let decl = &self.decls[decl_id];
        let display = self.interner.resolve(decl.name);
        let message = match code {
            ErrorCode::DuplicateTopLevelDefinition => {
                format!("Duplicate top-level definition '{display}'")
            }
            _ => format!("Duplicate member '{display}'"),
        };
        ResolutionError::new(code, decl.name_span, message)
    }
}

/// `Some(decl)` when `group` matches the `wanted` accessor slot
fn slot(wanted: Group, group: Group, decl: DeclId) -> Option<DeclId> {
    (group == wanted).then_some(decl)
}
