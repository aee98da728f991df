//! Error taxonomy and diagnostic sink for name resolution

use lk_span::Span;

/// Stable error kinds, one per distinct resolution violation
///
/// Every diagnostic the pass emits carries exactly one of these codes so
/// tests can match on kind rather than message text. All codes are
/// recoverable: resolution reports and continues.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum ErrorCode {
    /// Two incompatible class members share a name
    DuplicateMember,
    /// Two incompatible top-level declarations share a name
    DuplicateTopLevelDefinition,
    /// A `const` constructor declares a body
    ConstConstructorCannotHaveBody,
    /// `this` in a top-level element
    ThisOnTopLevel,
    /// `this` in a class body but outside any member body
    ThisOutsideOfMethod,
    /// `this` in a static method, getter or setter
    ThisInStaticMethod,
    /// `this` in a factory constructor
    ThisInFactoryConstructor,
    /// `super` in a top-level element
    SuperOnTopLevel,
    /// `super` in a class body but outside any member body
    SuperOutsideOfMethod,
    /// `super` in a static method, getter or setter
    SuperInStaticMethod,
    /// `super` in a factory constructor
    SuperInFactoryConstructor,
    /// `super.name` does not resolve in the supertype
    CannotResolveSuperMember,
    /// `super.name` resolved to a static field
    StaticSuperField,
    /// `super.name` resolved to a static getter
    StaticSuperGetter,
    /// `super.name(...)` resolved to a static method
    StaticSuperMethod,
    /// Type-argument count differs from the declared parameter count
    WrongNumberOfTypeArguments,
    /// Constructor participates in a redirection cycle
    CyclicRedirectedConstructor,
    /// `const` constructor redirects to a non-`const` constructor
    ConstRedirectedConstructor,
}

/// One reported resolution diagnostic
///
/// The span is always the exact token run the violation points at, as
/// measured by the lexer; the pass never widens or invents spans.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {span}")]
pub struct ResolutionError {
    /// Stable error kind
    pub code: ErrorCode,
    /// Exact source location of the violation
    pub span: Span,
    /// Human-readable message; duplicate diagnostics quote the display
    /// name of the offending declaration
    pub message: String,
}

impl ResolutionError {
    /// Create a diagnostic
    pub fn new(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        Self {
            code,
            span,
            message: message.into(),
        }
    }
}

/// Receiver for diagnostics, invoked once per detected violation in
/// detection order
///
/// The pass never buffers, filters or deduplicates; whatever policy a
/// driver wants lives behind its sink implementation.
pub trait DiagnosticSink {
    /// Receive one diagnostic
    fn report(&mut self, error: ResolutionError);
}

/// Sink that keeps every diagnostic, in order
#[derive(Debug, Default)]
pub struct ErrorCollector {
    /// Collected diagnostics in detection order
    pub errors: Vec<ResolutionError>,
}

impl DiagnosticSink for ErrorCollector {
    fn report(&mut self, error: ResolutionError) {
        self.errors.push(error);
    }
}

/// Sink adapter counting diagnostics on their way to the caller's sink
///
/// Both sub-passes thread their reports through one of these, so the
/// error count in [`crate::BoundUnit`] always matches what the caller's
/// sink received, whichever pass detected the violation.
pub(crate) struct CountingSink<'a> {
    pub(crate) inner: &'a mut dyn DiagnosticSink,
    pub(crate) count: usize,
}

impl<'a> CountingSink<'a> {
    pub(crate) fn new(inner: &'a mut dyn DiagnosticSink) -> Self {
        Self { inner, count: 0 }
    }
}

impl DiagnosticSink for CountingSink<'_> {
    fn report(&mut self, error: ResolutionError) {
        self.count += 1;
        self.inner.report(error);
    }
}
