//! Source locations for diagnostics
//!
//! The lexer produces a span for every token and the parser copies those
//! spans onto syntax nodes. Later passes only ever forward spans they were
//! given; nothing downstream invents one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A contiguous run of characters in one source file.
///
/// Lines and columns are 1-based, matching what editors and the test
/// fixtures count. `length` is measured in characters of the spanned text.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// 1-based source line of the first spanned character
    pub line: u32,
    /// 1-based source column of the first spanned character
    pub column: u32,
    /// Number of spanned characters
    pub length: u32,
}

impl Span {
    /// Create a span at `line:column` covering `length` characters
    pub fn new(line: u32, column: u32, length: u32) -> Self {
        Self {
            line,
            column,
            length,
        }
    }

    /// Span length in characters
    pub fn len(&self) -> u32 {
        self.length
    }

    /// Whether the span covers no characters
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{}:{}+{}",
            self.line, self.column, self.length
        )
    }
}
