//! Context resolver
//!
//! Second of the two resolution sub-passes. Walks every statement and
//! expression body against the scope tree the declaration index built,
//! recording which declaration each identifier and type name denotes and
//! diagnosing contextual violations: illegal `this`/`super` placement,
//! wrong-arity generic instantiations, illegal `super` member accesses,
//! constructor redirection cycles and const-redirection mismatches.
//!
//! Diagnostics are never control flow: every violation is reported to the
//! sink and the walk continues. The walk is a synchronous depth-first
//! traversal with no suspension points; an internal inconsistency in the
//! input tree (a dangling arena handle, a class without an indexed scope)
//! is a programming error and panics rather than surfacing as a user
//! diagnostic.

use crate::decl::{DeclId, DeclKind, Declaration};
use crate::error::{CountingSink, DiagnosticSink, ErrorCode, ResolutionError};
use crate::hierarchy::{SuperMember, SuperMemberKind, SuperMemberLookup};
use crate::index::IndexedUnit;
use crate::scope::{ScopeId, ScopeKind, ScopeTree};
use lk_arena::Arena;
use lk_ast::{
    ClassDecl, ConstructorDecl, Expr, ExprId, Ident, Item, Member, Param, RedirectTarget, Stmt,
    StmtId, SuperAccessKind, TypeRefId, Unit,
};
use lk_intern::{Interner, Symbol};
use lk_span::Span;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Where in the unit the walk currently is, for `this`/`super` legality
///
/// Every point where `this` or `super` may occur is in exactly one of
/// these contexts, determined by the nearest enclosing construct.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EnclosingContext {
    /// Top-level variable initializer or top-level function body
    TopLevel,
    /// Inside a type body but outside every member body (a field
    /// initializer expression)
    InTypeNotInMethod,
    /// Static method, getter or setter body
    StaticMember,
    /// Factory constructor body
    FactoryConstructor,
    /// Instance method/getter/setter body or non-factory constructor
    /// body — the only context where `this` and `super` are legal
    Instance,
}

/// Result of resolving one compilation unit
#[derive(Debug)]
pub struct BoundUnit {
    /// Scope tree, including member-body and block scopes
    pub scopes: ScopeTree,
    /// All declarations of the unit
    pub declarations: Arena<Declaration>,
    /// Identifier expression → declaration it denotes
    pub resolutions: FxHashMap<ExprId, DeclId>,
    /// Type reference → type declaration it denotes
    pub type_bindings: FxHashMap<TypeRefId, DeclId>,
    /// Number of diagnostics reported while resolving
    pub error_count: usize,
}

impl BoundUnit {
    /// Whether the unit resolved without any diagnostic
    pub fn is_resolved(&self) -> bool {
        self.error_count == 0
    }
}

/// Walks member and top-level bodies, producing bindings and contextual
/// diagnostics
pub struct ContextResolver<'a> {
    unit: &'a Unit,
    interner: &'a Interner,
    scopes: ScopeTree,
    decls: Arena<Declaration>,
    class_scopes: FxHashMap<Symbol, ScopeId>,
    hierarchy: &'a dyn SuperMemberLookup,
    /// Interned name of the implicit root supertype
    root_type: Symbol,
    sink: CountingSink<'a>,
    /// Diagnostics already reported by the declaration index
    index_errors: usize,
    resolutions: FxHashMap<ExprId, DeclId>,
    type_bindings: FxHashMap<TypeRefId, DeclId>,
    current_scope: ScopeId,
    context: EnclosingContext,
    /// Supertype name of the enclosing class, when inside one
    current_super: Option<Symbol>,
}

impl<'a> ContextResolver<'a> {
    /// Create a resolver over the scopes `index` built
    pub fn new(
        unit: &'a Unit,
        interner: &'a Interner,
        index: IndexedUnit,
        hierarchy: &'a dyn SuperMemberLookup,
        root_type: Symbol,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        let library_scope = index.scopes.library_scope;
        Self {
            unit,
            interner,
            scopes: index.scopes,
            decls: index.decls,
            class_scopes: index.class_scopes,
            hierarchy,
            root_type,
            sink: CountingSink::new(sink),
            index_errors: index.error_count,
            resolutions: FxHashMap::default(),
            type_bindings: FxHashMap::default(),
            current_scope: library_scope,
            context: EnclosingContext::TopLevel,
            current_super: None,
        }
    }

    /// Resolve every body in the unit
    pub fn run(mut self) -> BoundUnit {
        let unit = self.unit;
        for item in &unit.items {
            match item {
                Item::Variable(variable) => {
                    if let Some(ty) = variable.ty {
                        self.resolve_type(ty);
                    }
                    if let Some(init) = variable.initializer {
                        self.resolve_expr(init);
                    }
                }
                Item::Function(function) => {
                    self.resolve_param_types(&function.params);
                    if let Some(ty) = function.return_ty {
                        self.resolve_type(ty);
                    }
                    let body_scope = self
                        .scopes
                        .create_child(self.scopes.library_scope, ScopeKind::MemberBody);
                    let previous = self.enter(body_scope, EnclosingContext::TopLevel);
                    self.define_params(&function.params);
                    self.resolve_stmts(&function.body);
                    self.leave(previous);
                }
                Item::Class(class) => self.resolve_class(class),
            }
        }

        debug!(
            resolutions = self.resolutions.len(),
            type_bindings = self.type_bindings.len(),
            "context resolution finished"
        );

        BoundUnit {
            scopes: self.scopes,
            declarations: self.decls,
            resolutions: self.resolutions,
            type_bindings: self.type_bindings,
            error_count: self.index_errors + self.sink.count,
        }
    }

    fn resolve_class(&mut self, class: &ClassDecl) {
        let class_scope = *self
            .class_scopes
            .get(&class.name.name)
            .expect("class scope indexed before context resolution");

        let previous_super = self.current_super;
        self.current_super = Some(match class.extends {
            Some(extends) => self.unit.type_refs[extends].name.name,
            None => self.root_type,
        });

        let previous = self.enter(class_scope, EnclosingContext::InTypeNotInMethod);

        if let Some(extends) = class.extends {
            self.resolve_type(extends);
        }

        for member in &class.members {
            match member {
                Member::Field(field) => {
                    if let Some(ty) = field.ty {
                        self.resolve_type(ty);
                    }
                    // Field initializers evaluate outside any member
                    // body; `this` and `super` are illegal there.
                    if let Some(init) = field.initializer {
                        self.resolve_expr(init);
                    }
                }
                Member::Method(method) => {
                    self.resolve_param_types(&method.params);
                    if let Some(ty) = method.return_ty {
                        self.resolve_type(ty);
                    }
                    if let Some(body) = &method.body {
                        let context = if method.is_static {
                            EnclosingContext::StaticMember
                        } else {
                            EnclosingContext::Instance
                        };
                        self.resolve_member_body(class_scope, context, &method.params, body);
                    }
                }
                Member::Constructor(ctor) => self.resolve_constructor(ctor, class_scope),
            }
        }

        self.check_redirects(class, class_scope);

        self.leave(previous);
        self.current_super = previous_super;
    }

    /// Resolve a constructor's initializer list and body
    ///
    /// Both share one member-body scope, so parameters are visible to the
    /// initializer expressions. The initializer list of a non-factory
    /// constructor is an instance context.
    fn resolve_constructor(&mut self, ctor: &ConstructorDecl, class_scope: ScopeId) {
        self.resolve_param_types(&ctor.params);
        let context = if ctor.is_factory {
            EnclosingContext::FactoryConstructor
        } else {
            EnclosingContext::Instance
        };
        let body_scope = self.scopes.create_child(class_scope, ScopeKind::MemberBody);
        let previous = self.enter(body_scope, context);
        self.define_params(&ctor.params);
        for initializer in &ctor.initializers {
            self.resolve_expr(initializer.field);
            self.resolve_expr(initializer.value);
        }
        if let Some(body) = &ctor.body {
            self.resolve_stmts(body);
        }
        self.leave(previous);
    }

    fn resolve_member_body(
        &mut self,
        class_scope: ScopeId,
        context: EnclosingContext,
        params: &[Param],
        body: &[StmtId],
    ) {
        let body_scope = self.scopes.create_child(class_scope, ScopeKind::MemberBody);
        let previous = self.enter(body_scope, context);
        self.define_params(params);
        self.resolve_stmts(body);
        self.leave(previous);
    }

    /// Enter a scope/context pair, returning the pair to restore
    fn enter(
        &mut self,
        scope: ScopeId,
        context: EnclosingContext,
    ) -> (ScopeId, EnclosingContext) {
        let previous = (self.current_scope, self.context);
        self.current_scope = scope;
        self.context = context;
        previous
    }

    fn leave(&mut self, previous: (ScopeId, EnclosingContext)) {
        self.current_scope = previous.0;
        self.context = previous.1;
    }

    fn resolve_param_types(&mut self, params: &[Param]) {
        for param in params {
            if let Some(ty) = param.ty {
                self.resolve_type(ty);
            }
        }
    }

    fn define_params(&mut self, params: &[Param]) {
        for param in params {
            let decl = Declaration::plain(
                param.name.name,
                DeclKind::Parameter,
                param.name.span,
                param.name.span,
            );
            let decl_id = self.decls.alloc(decl);
            self.scopes.bind(self.current_scope, param.name.name, decl_id);
        }
    }

    fn resolve_stmts(&mut self, stmts: &[StmtId]) {
        for &stmt in stmts {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt_id: StmtId) {
        match &self.unit.stmts[stmt_id] {
            Stmt::Expr { expr, .. } => self.resolve_expr(*expr),
            Stmt::Return { value, .. } => {
                if let Some(value) = *value {
                    self.resolve_expr(value);
                }
            }
            Stmt::Block { stmts, .. } => {
                let block_scope = self.scopes.create_child(self.current_scope, ScopeKind::Block);
                let previous = self.enter(block_scope, self.context);
                // Stmt borrows self.unit, which outlives the resolver
                let stmts: Vec<StmtId> = stmts.clone();
                self.resolve_stmts(&stmts);
                self.leave(previous);
            }
            Stmt::Local(local) => {
                if let Some(ty) = local.ty {
                    self.resolve_type(ty);
                }
                // The initializer resolves before the local becomes
                // visible.
                if let Some(init) = local.initializer {
                    self.resolve_expr(init);
                }
                let decl = Declaration::plain(
                    local.name.name,
                    DeclKind::LocalVariable,
                    local.name.span,
                    local.span,
                );
                let decl_id = self.decls.alloc(decl);
                self.scopes.bind(self.current_scope, local.name.name, decl_id);
            }
        }
    }

    fn resolve_expr(&mut self, expr_id: ExprId) {
        match &self.unit.exprs[expr_id] {
            Expr::Literal { .. } => {}
            Expr::Identifier { name, .. } => {
                // Unresolved plain identifiers are the type checker's to
                // diagnose; the resolver only records what it can bind.
                if let Some(decl) = self.scopes.lookup(self.current_scope, *name) {
                    self.resolutions.insert(expr_id, decl);
                }
            }
            Expr::This { span } => {
                let span = *span;
                self.check_this(span);
            }
            Expr::Super(access) => {
                let args = access.args.clone();
                let (span, member, kind) = (access.span, access.member, access.kind);
                self.check_super(span, member, kind);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::Field { receiver, .. } => {
                let receiver = *receiver;
                self.resolve_expr(receiver);
            }
            Expr::Call { callee, args, .. } => {
                let (callee, args) = (*callee, args.clone());
                self.resolve_expr(callee);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::Assign { target, value, .. } => {
                let (target, value) = (*target, *value);
                self.resolve_expr(target);
                self.resolve_expr(value);
            }
            Expr::List { elements, .. } => {
                let elements = elements.clone();
                for element in elements {
                    self.resolve_expr(element);
                }
            }
            Expr::Map { entries, .. } => {
                let entries = entries.clone();
                for (key, value) in entries {
                    self.resolve_expr(key);
                    self.resolve_expr(value);
                }
            }
        }
    }

    /// Diagnose `this` outside an instance context; the span is exactly
    /// the `this` token
    fn check_this(&mut self, span: Span) {
        let violation = match self.context {
            EnclosingContext::TopLevel => Some((
                ErrorCode::ThisOnTopLevel,
                "'this' cannot be referenced on the top level",
            )),
            EnclosingContext::InTypeNotInMethod => Some((
                ErrorCode::ThisOutsideOfMethod,
                "'this' cannot be referenced outside of an instance method",
            )),
            EnclosingContext::StaticMember => Some((
                ErrorCode::ThisInStaticMethod,
                "'this' cannot be referenced in a static method",
            )),
            EnclosingContext::FactoryConstructor => Some((
                ErrorCode::ThisInFactoryConstructor,
                "'this' cannot be referenced in a factory constructor",
            )),
            EnclosingContext::Instance => None,
        };
        if let Some((code, message)) = violation {
            self.sink.report(ResolutionError::new(code, span, message));
        }
    }

    /// Diagnose `super` outside an instance context, and resolve the
    /// accessed member through the hierarchy hook where it is legal
    fn check_super(&mut self, span: Span, member: Ident, access: SuperAccessKind) {
        let violation = match self.context {
            EnclosingContext::TopLevel => Some((
                ErrorCode::SuperOnTopLevel,
                "'super' cannot be referenced on the top level",
            )),
            EnclosingContext::InTypeNotInMethod => Some((
                ErrorCode::SuperOutsideOfMethod,
                "'super' cannot be referenced outside of an instance method",
            )),
            EnclosingContext::StaticMember => Some((
                ErrorCode::SuperInStaticMethod,
                "'super' cannot be referenced in a static method",
            )),
            EnclosingContext::FactoryConstructor => Some((
                ErrorCode::SuperInFactoryConstructor,
                "'super' cannot be referenced in a factory constructor",
            )),
            EnclosingContext::Instance => None,
        };
        if let Some((code, message)) = violation {
            self.sink.report(ResolutionError::new(code, span, message));
            return;
        }

        let Some(super_type) = self.current_super else {
            // `Instance` context always has an enclosing class.
            debug_assert!(false, "instance context without an enclosing class");
            return;
        };
        let name = self.interner.resolve(member.name);
        match self.hierarchy.lookup(super_type, member.name) {
            None => {
                let message = match access {
                    SuperAccessKind::Invocation => {
                        format!("cannot resolve method '{name}' in the supertype")
                    }
                    SuperAccessKind::Field => {
                        format!("cannot resolve '{name}' in the supertype")
                    }
                };
                self.sink.report(ResolutionError::new(
                    ErrorCode::CannotResolveSuperMember,
                    member.span,
                    message,
                ));
            }
            Some(SuperMember {
                is_static: true,
                kind,
            }) => {
                let code = match kind {
                    SuperMemberKind::Field => ErrorCode::StaticSuperField,
                    SuperMemberKind::Getter => ErrorCode::StaticSuperGetter,
                    SuperMemberKind::Method => ErrorCode::StaticSuperMethod,
                };
                self.sink.report(ResolutionError::new(
                    code,
                    member.span,
                    format!("'{name}' is a static member of the supertype"),
                ));
            }
            Some(_) => {}
        }
    }

    /// Resolve a type reference and check its type-argument arity
    fn resolve_type(&mut self, type_ref_id: TypeRefId) {
        let type_ref = &self.unit.type_refs[type_ref_id];
        let (name, span, args) = (type_ref.name, type_ref.span, type_ref.args.clone());

        if let Some(decl_id) = self.scopes.lookup(self.current_scope, name.name) {
            let decl = &self.decls[decl_id];
            if decl.kind.is_type() {
                self.type_bindings.insert(type_ref_id, decl_id);
                let expected = decl.type_param_count;
                let supplied = args.len();
                if supplied != expected {
                    let display = self.interner.resolve(name.name);
                    self.sink.report(ResolutionError::new(
                        ErrorCode::WrongNumberOfTypeArguments,
                        span,
                        format!(
                            "wrong number of type arguments for '{display}': \
                             expected {expected}, found {supplied}"
                        ),
                    ));
                }
            }
        }

        for arg in args {
            self.resolve_type(arg);
        }
    }

    /// Validate constructor redirections of one class: every constructor
    /// on a redirection cycle is flagged, and a `const` constructor must
    /// not forward to a non-`const` one
    fn check_redirects(&mut self, class: &ClassDecl, class_scope: ScopeId) {
        let ctors: Vec<&ConstructorDecl> = class
            .members
            .iter()
            .filter_map(|member| match member {
                Member::Constructor(ctor) => Some(ctor),
                _ => None,
            })
            .collect();
        if ctors.is_empty() {
            return;
        }

        // Redirection graph over this class's constructors; `super`
        // redirects leave the class and cannot close a cycle here.
        let ids: Vec<DeclId> = ctors
            .iter()
            .map(|ctor| self.constructor_decl(class, ctor, class_scope))
            .collect();
        let mut successor: FxHashMap<DeclId, DeclId> = FxHashMap::default();
        for (ctor, &id) in ctors.iter().zip(&ids) {
            let Some(redirect) = &ctor.redirect else {
                continue;
            };
            if redirect.target != RedirectTarget::This {
                continue;
            }
            let target_name = match redirect.name {
                Some(suffix) => {
                    let class_name = self.interner.resolve(class.name.name);
                    let suffix = self.interner.resolve(suffix);
                    self.interner.intern(&format!("{class_name}.{suffix}"))
                }
                None => class.name.name,
            };
            let target = self
                .scopes
                .bound_in(class_scope, target_name)
                .iter()
                .copied()
                .find(|&candidate| self.decls[candidate].kind == DeclKind::Constructor);
            let Some(target) = target else {
                // Unresolved redirect targets are the type checker's to
                // diagnose.
                continue;
            };
            successor.insert(id, target);

            if self.decls[id].is_const && !self.decls[target].is_const {
                let display = self.interner.resolve(self.decls[id].name);
                self.sink.report(ResolutionError::new(
                    ErrorCode::ConstRedirectedConstructor,
                    redirect.span,
                    format!(
                        "const constructor '{display}' cannot redirect to a \
                         non-const constructor"
                    ),
                ));
            }
        }

        for (ctor, &id) in ctors.iter().zip(&ids) {
            if self.on_cycle(id, &successor, ids.len()) {
                let display = self.interner.resolve(self.decls[id].name);
                self.sink.report(ResolutionError::new(
                    ErrorCode::CyclicRedirectedConstructor,
                    ctor.name_span,
                    format!("cycle in redirecting constructors involving '{display}'"),
                ));
            }
        }
    }

    /// Whether `start` is on a redirection cycle: following successors
    /// returns to it within the constructor count
    fn on_cycle(
        &self,
        start: DeclId,
        successor: &FxHashMap<DeclId, DeclId>,
        bound: usize,
    ) -> bool {
        let mut current = start;
        for _ in 0..bound {
            let Some(&next) = successor.get(&current) else {
                return false;
            };
            if next == start {
                return true;
            }
            current = next;
        }
        false
    }

    /// The indexed declaration of a constructor, found by its full name
    /// in the class scope
    fn constructor_decl(
        &self,
        class: &ClassDecl,
        ctor: &ConstructorDecl,
        class_scope: ScopeId,
    ) -> DeclId {
        let full_name = match ctor.name {
            Some(suffix) => {
                let class_name = self.interner.resolve(class.name.name);
                let suffix = self.interner.resolve(suffix);
                self.interner
                    .get(&format!("{class_name}.{suffix}"))
                    .expect("constructor name interned during indexing")
            }
            None => class.name.name,
        };
        // Several constructors may share the name when duplicates were
        // diagnosed; pairing them positionally keeps redirect edges on
        // the right declaration.
        let position = class
            .members
            .iter()
            .filter_map(|member| match member {
                Member::Constructor(candidate) => Some(candidate),
                _ => None,
            })
            .filter(|candidate| candidate.name == ctor.name)
            .position(|candidate| std::ptr::eq(candidate, ctor))
            .expect("constructor belongs to its class");
        self.scopes
            .bound_in(class_scope, full_name)
            .iter()
            .copied()
            .filter(|&candidate| self.decls[candidate].kind == DeclKind::Constructor)
            .nth(position)
            .expect("constructor indexed before context resolution")
    }
}
