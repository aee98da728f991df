//! Shared fixture builder for the resolver test suites
//!
//! Tests construct units the way the parser would, with every span
//! matching the source text the fixture mimics, then run `resolve` with a
//! capturing sink and compare the reported `(code, line, column, length)`
//! tuples against expectations.

// Each test binary uses its own subset of the builder.
#![allow(dead_code)]

use lk_ast::{
    Accessor, ClassDecl, ConstructorDecl, Expr, ExprId, FieldDecl, FunctionDecl, Ident,
    Initializer, Item, LocalDecl, Member, MethodDecl, Param, Redirect, RedirectTarget, Stmt,
    StmtId, SuperAccess, SuperAccessKind, TypeRef, TypeRefId, Unit, VariableDecl,
};
use lk_intern::{Interner, Symbol};
use lk_resolve::{
    resolve, BoundUnit, Builtins, ErrorCode, ErrorCollector, NoSuperMembers, ResolutionError,
    SuperMember, SuperMemberKind, SuperMemberLookup,
};
use lk_span::Span;
use std::collections::HashMap;

/// Shorthand span constructor
pub fn sp(line: u32, column: u32, length: u32) -> Span {
    Span::new(line, column, length)
}

/// A unit under construction plus its interner
pub struct Fixture {
    pub unit: Unit,
    pub interner: Interner,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            unit: Unit::new(),
            interner: Interner::new(),
        }
    }

    pub fn ident(&mut self, name: &str, line: u32, column: u32) -> Ident {
        Ident {
            name: self.interner.intern(name),
            span: sp(line, column, name.len() as u32),
        }
    }

    // --- type references

    /// Type reference without arguments; span is the name token
    pub fn ty(&mut self, name: &str, line: u32, column: u32) -> TypeRefId {
        let name = self.ident(name, line, column);
        self.unit.alloc_type_ref(TypeRef {
            name,
            args: vec![],
            span: name.span,
        })
    }

    /// Generic type reference; `full_length` covers the name through the
    /// closing angle bracket
    pub fn generic_ty(
        &mut self,
        name: &str,
        line: u32,
        column: u32,
        args: Vec<TypeRefId>,
        full_length: u32,
    ) -> TypeRefId {
        let name = self.ident(name, line, column);
        self.unit.alloc_type_ref(TypeRef {
            name,
            args,
            span: sp(line, column, full_length),
        })
    }

    // --- expressions

    pub fn literal(&mut self, line: u32, column: u32, length: u32) -> ExprId {
        self.unit.alloc_expr(Expr::Literal {
            span: sp(line, column, length),
        })
    }

    pub fn name(&mut self, name: &str, line: u32, column: u32) -> ExprId {
        let name_sym = self.interner.intern(name);
        self.unit.alloc_expr(Expr::Identifier {
            name: name_sym,
            span: sp(line, column, name.len() as u32),
        })
    }

    /// `this` token at the given position (length 4)
    pub fn this(&mut self, line: u32, column: u32) -> ExprId {
        self.unit.alloc_expr(Expr::This {
            span: sp(line, column, 4),
        })
    }

    /// `super.member(...)` with the `super` token at the given position
    /// (length 5); the member ident sits after `super.`
    pub fn super_call(&mut self, line: u32, column: u32, member: &str) -> ExprId {
        let member = self.ident(member, line, column + 6);
        self.unit.alloc_expr(Expr::Super(SuperAccess {
            span: sp(line, column, 5),
            member,
            kind: SuperAccessKind::Invocation,
            args: vec![],
        }))
    }

    /// `super.member` field access
    pub fn super_field(&mut self, line: u32, column: u32, member: &str) -> ExprId {
        let member = self.ident(member, line, column + 6);
        self.unit.alloc_expr(Expr::Super(SuperAccess {
            span: sp(line, column, 5),
            member,
            kind: SuperAccessKind::Field,
            args: vec![],
        }))
    }

    // --- statements

    pub fn ret(&mut self, value: ExprId) -> StmtId {
        let span = self.expr_span(value);
        self.unit.alloc_stmt(Stmt::Return {
            value: Some(value),
            span,
        })
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        let span = self.expr_span(expr);
        self.unit.alloc_stmt(Stmt::Expr { expr, span })
    }

    pub fn local(
        &mut self,
        name: &str,
        line: u32,
        column: u32,
        ty: Option<TypeRefId>,
        initializer: Option<ExprId>,
    ) -> StmtId {
        let name = self.ident(name, line, column);
        self.unit.alloc_stmt(Stmt::Local(LocalDecl {
            name,
            ty,
            initializer,
            span: name.span,
        }))
    }

    pub fn block(&mut self, line: u32, column: u32, stmts: Vec<StmtId>) -> StmtId {
        self.unit.alloc_stmt(Stmt::Block {
            stmts,
            span: sp(line, column, 1),
        })
    }

    fn expr_span(&self, expr: ExprId) -> Span {
        match &self.unit.exprs[expr] {
            Expr::Literal { span }
            | Expr::Identifier { span, .. }
            | Expr::This { span }
            | Expr::Field { span, .. }
            | Expr::Call { span, .. }
            | Expr::Assign { span, .. }
            | Expr::List { span, .. }
            | Expr::Map { span, .. } => *span,
            Expr::Super(access) => access.span,
        }
    }

    // --- class members

    pub fn field(&mut self, name: &str, line: u32, column: u32) -> Member {
        self.field_with(name, line, column, None)
    }

    pub fn field_with(
        &mut self,
        name: &str,
        line: u32,
        column: u32,
        initializer: Option<ExprId>,
    ) -> Member {
        let name = self.ident(name, line, column);
        Member::Field(FieldDecl {
            name,
            ty: None,
            is_static: false,
            initializer,
            span: name.span,
        })
    }

    pub fn method(&mut self, name: &str, line: u32, column: u32, body: Vec<StmtId>) -> Member {
        self.method_member(name, line, column, Accessor::None, false, body)
    }

    pub fn static_method(
        &mut self,
        name: &str,
        line: u32,
        column: u32,
        body: Vec<StmtId>,
    ) -> Member {
        self.method_member(name, line, column, Accessor::None, true, body)
    }

    pub fn getter(&mut self, name: &str, line: u32, column: u32) -> Member {
        self.method_member(name, line, column, Accessor::Getter, false, vec![])
    }

    pub fn setter(&mut self, name: &str, line: u32, column: u32) -> Member {
        self.method_member(name, line, column, Accessor::Setter, false, vec![])
    }

    fn method_member(
        &mut self,
        name: &str,
        line: u32,
        column: u32,
        accessor: Accessor,
        is_static: bool,
        body: Vec<StmtId>,
    ) -> Member {
        let name = self.ident(name, line, column);
        let params = if accessor == Accessor::Setter {
            vec![self.param("value", line)]
        } else {
            vec![]
        };
        Member::Method(MethodDecl {
            name,
            accessor,
            is_static,
            params,
            return_ty: None,
            body: Some(body),
            span: name.span,
        })
    }

    fn param(&mut self, name: &str, line: u32) -> Param {
        let name = self.ident(name, line, 1);
        Param { name, ty: None }
    }

    /// Formal parameter at an explicit position
    pub fn param_at(&mut self, name: &str, line: u32, column: u32) -> Param {
        let name = self.ident(name, line, column);
        Param { name, ty: None }
    }

    /// Initializer-list entry `field = value` with the field name at the
    /// given position
    pub fn initializer(
        &mut self,
        field: &str,
        line: u32,
        column: u32,
        value: ExprId,
    ) -> Initializer {
        let field = self.name(field, line, column);
        let value_span = self.expr_span(value);
        let length = (value_span.column + value_span.length).saturating_sub(column);
        Initializer {
            field,
            value,
            span: sp(line, column, length),
        }
    }

    /// Constructor; `display` is the full source name (`A` or `A.foo`)
    pub fn ctor(
        &mut self,
        display: &str,
        line: u32,
        column: u32,
        body: Option<Vec<StmtId>>,
    ) -> Member {
        self.ctor_member(display, line, column, false, false, vec![], vec![], None, body)
    }

    /// Constructor with parameters and an initializer list
    pub fn ctor_with(
        &mut self,
        display: &str,
        line: u32,
        column: u32,
        params: Vec<Param>,
        initializers: Vec<Initializer>,
        body: Option<Vec<StmtId>>,
    ) -> Member {
        self.ctor_member(
            display,
            line,
            column,
            false,
            false,
            params,
            initializers,
            None,
            body,
        )
    }

    pub fn const_ctor(
        &mut self,
        display: &str,
        line: u32,
        column: u32,
        body: Option<Vec<StmtId>>,
    ) -> Member {
        self.ctor_member(display, line, column, true, false, vec![], vec![], None, body)
    }

    pub fn factory_ctor(
        &mut self,
        display: &str,
        line: u32,
        column: u32,
        body: Vec<StmtId>,
    ) -> Member {
        self.ctor_member(
            display,
            line,
            column,
            false,
            true,
            vec![],
            vec![],
            None,
            Some(body),
        )
    }

    /// Constructor redirecting to `: this(...)` / `: this.target(...)`
    pub fn redirecting_ctor(
        &mut self,
        display: &str,
        line: u32,
        column: u32,
        target: Option<&str>,
        is_const: bool,
    ) -> Member {
        let redirect = Redirect {
            target: RedirectTarget::This,
            name: target.map(|suffix| self.interner.intern(suffix)),
            span: sp(line, column, display.len() as u32),
        };
        self.ctor_member(
            display,
            line,
            column,
            is_const,
            false,
            vec![],
            vec![],
            Some(redirect),
            None,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn ctor_member(
        &mut self,
        display: &str,
        line: u32,
        column: u32,
        is_const: bool,
        is_factory: bool,
        params: Vec<Param>,
        initializers: Vec<Initializer>,
        redirect: Option<Redirect>,
        body: Option<Vec<StmtId>>,
    ) -> Member {
        let name = display
            .split_once('.')
            .map(|(_, suffix)| self.interner.intern(suffix));
        let name_span = sp(line, column, display.len() as u32);
        Member::Constructor(ConstructorDecl {
            name,
            name_span,
            is_const,
            is_factory,
            params,
            initializers,
            redirect,
            body,
            span: name_span,
        })
    }

    // --- top-level items

    pub fn class(&mut self, name: &str, line: u32, column: u32, members: Vec<Member>) {
        self.class_item(name, line, column, vec![], None, members);
    }

    /// Class with declared type parameters (`class A<T> { ... }`)
    pub fn generic_class(
        &mut self,
        name: &str,
        line: u32,
        column: u32,
        type_params: Vec<Ident>,
        members: Vec<Member>,
    ) {
        self.class_item(name, line, column, type_params, None, members);
    }

    pub fn class_extending(
        &mut self,
        name: &str,
        line: u32,
        column: u32,
        extends: TypeRefId,
        members: Vec<Member>,
    ) {
        self.class_item(name, line, column, vec![], Some(extends), members);
    }

    fn class_item(
        &mut self,
        name: &str,
        line: u32,
        column: u32,
        type_params: Vec<Ident>,
        extends: Option<TypeRefId>,
        members: Vec<Member>,
    ) {
        let name = self.ident(name, line, column);
        self.unit.items.push(Item::Class(ClassDecl {
            name,
            type_params,
            extends,
            members,
            span: name.span,
        }));
    }

    pub fn top_var(&mut self, name: &str, line: u32, column: u32, initializer: Option<ExprId>) {
        self.top_var_typed(name, line, column, None, initializer);
    }

    pub fn top_var_typed(
        &mut self,
        name: &str,
        line: u32,
        column: u32,
        ty: Option<TypeRefId>,
        initializer: Option<ExprId>,
    ) {
        let name = self.ident(name, line, column);
        self.unit.items.push(Item::Variable(VariableDecl {
            name,
            ty,
            initializer,
            span: name.span,
        }));
    }

    pub fn top_fn(&mut self, name: &str, line: u32, column: u32, body: Vec<StmtId>) {
        self.top_fn_item(name, line, column, Accessor::None, body);
    }

    pub fn top_getter(&mut self, name: &str, line: u32, column: u32) {
        self.top_fn_item(name, line, column, Accessor::Getter, vec![]);
    }

    pub fn top_setter(&mut self, name: &str, line: u32, column: u32) {
        self.top_fn_item(name, line, column, Accessor::Setter, vec![]);
    }

    fn top_fn_item(
        &mut self,
        name: &str,
        line: u32,
        column: u32,
        accessor: Accessor,
        body: Vec<StmtId>,
    ) {
        let name = self.ident(name, line, column);
        let params = if accessor == Accessor::Setter {
            vec![self.param("value", line)]
        } else {
            vec![]
        };
        self.unit.items.push(Item::Function(FunctionDecl {
            name,
            accessor,
            params,
            return_ty: None,
            body,
            span: name.span,
        }));
    }

    // --- running

    pub fn resolve(&self) -> Vec<ResolutionError> {
        self.resolve_with(&NoSuperMembers)
    }

    pub fn resolve_with(&self, hierarchy: &dyn SuperMemberLookup) -> Vec<ResolutionError> {
        self.resolve_bound(hierarchy).1
    }

    pub fn resolve_bound(
        &self,
        hierarchy: &dyn SuperMemberLookup,
    ) -> (BoundUnit, Vec<ResolutionError>) {
        let mut sink = ErrorCollector::default();
        let bound = resolve(
            &self.unit,
            &self.interner,
            &mut sink,
            &Builtins::core(),
            hierarchy,
        );
        (bound, sink.errors)
    }
}

/// Hierarchy hook backed by a `(type, member)` map, the test double for
/// the type-hierarchy collaborator
#[derive(Default)]
pub struct MapHierarchy {
    members: HashMap<(Symbol, Symbol), SuperMember>,
}

impl MapHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        fixture: &Fixture,
        ty: &str,
        member: &str,
        kind: SuperMemberKind,
        is_static: bool,
    ) {
        let key = (fixture.interner.intern(ty), fixture.interner.intern(member));
        self.members.insert(key, SuperMember { kind, is_static });
    }
}

impl SuperMemberLookup for MapHierarchy {
    fn lookup(&self, ty: Symbol, name: Symbol) -> Option<SuperMember> {
        self.members.get(&(ty, name)).copied()
    }
}

/// Assert the reported `(code, line, column, length)` tuples, in order
#[track_caller]
pub fn assert_errors(errors: &[ResolutionError], expected: &[(ErrorCode, u32, u32, u32)]) {
    let actual: Vec<(ErrorCode, u32, u32, u32)> = errors
        .iter()
        .map(|error| {
            (
                error.code,
                error.span.line,
                error.span.column,
                error.span.length,
            )
        })
        .collect();
    assert_eq!(actual, expected, "reported diagnostics: {errors:#?}");
}
