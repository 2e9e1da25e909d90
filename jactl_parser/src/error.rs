//! Compile-time parse errors.

use crate::span::Span;
use thiserror::Error;

/// A single parse/compile error attached to a source location.
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("unexpected token '{found}' at {span:?}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        span: Span,
    },

    #[error("unexpected end of input at {span:?}, expected {expected}")]
    UnexpectedEof { expected: String, span: Span },

    #[error("invalid escape sequence '{sequence}' at {span:?}")]
    InvalidEscape { sequence: String, span: Span },

    #[error("unterminated string literal starting at {span:?}")]
    UnterminatedString { span: Span },

    #[error("unterminated regex literal starting at {span:?}")]
    UnterminatedRegex { span: Span },

    #[error("invalid number literal '{literal}' at {span:?}")]
    InvalidNumber { literal: String, span: Span },

    #[error("{message} at {span:?}")]
    InvalidSyntax { message: String, span: Span },

    /// No such field on a `new` literal-argument class instantiation (scenario 3).
    #[error("No such field: {field} at {span:?}")]
    NoSuchField { field: String, span: Span },

    /// Two equal literal patterns in the same `switch` (§8 "Switch pattern uniqueness").
    #[error("duplicate switch case value at {span:?} (already used at {first_span:?})")]
    DuplicateSwitchCase { span: Span, first_span: Span },

    /// `def (x,y) = expr` where the rhs is not (syntactically) a list literal
    /// and a `var` target needs its element type inferred.
    #[error("multi-assign rhs must be a list literal when a target uses var, at {span:?}")]
    MultiAssignRhsNotList { span: Span },

    /// `static final` modifier combination, rejected by §4.C "Class declarations".
    #[error("'static final' is not permitted at {span:?}")]
    StaticFinalNotAllowed { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnexpectedEof { span, .. }
            | ParseError::InvalidEscape { span, .. }
            | ParseError::UnterminatedString { span }
            | ParseError::UnterminatedRegex { span }
            | ParseError::InvalidNumber { span, .. }
            | ParseError::InvalidSyntax { span, .. }
            | ParseError::NoSuchField { span, .. }
            | ParseError::DuplicateSwitchCase { span, .. }
            | ParseError::MultiAssignRhsNotList { span }
            | ParseError::StaticFinalNotAllowed { span } => *span,
        }
    }

    pub fn unexpected_token(found: impl Into<String>, expected: impl Into<String>, span: Span) -> Self {
        ParseError::UnexpectedToken {
            found: found.into(),
            expected: expected.into(),
            span,
        }
    }

    pub fn unexpected_eof(expected: impl Into<String>, span: Span) -> Self {
        ParseError::UnexpectedEof {
            expected: expected.into(),
            span,
        }
    }

    pub fn invalid_syntax(message: impl Into<String>, span: Span) -> Self {
        ParseError::InvalidSyntax {
            message: message.into(),
            span,
        }
    }

    /// Render the source line plus a `^^^` marker under the error span.
    pub fn format_with_context(&self, source: &str) -> String {
        let span = self.span();
        let lines: Vec<&str> = source.lines().collect();
        let line_idx = span.start_line.saturating_sub(1);
        if line_idx >= lines.len() {
            return String::new();
        }
        let line = lines[line_idx];
        let col = span.start_column.saturating_sub(1);
        let len = if span.start_line == span.end_line {
            span.end_column.saturating_sub(span.start_column).max(1)
        } else {
            1
        };
        let marker = "^".repeat(len.min(line.len().saturating_sub(col)).max(1));
        format!(
            "  {} | {}\n  {} | {}{}",
            span.start_line,
            line,
            " ".repeat(span.start_line.to_string().len()),
            " ".repeat(col),
            marker
        )
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Accumulates independent parse errors so they can be reported together
#[derive(Debug, Default, Clone)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn take(self) -> Vec<ParseError> {
        self.errors
    }

    pub fn first(&self) -> Option<&ParseError> {
        self.errors.first()
    }

    pub fn format_all(&self, source: &str) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let context = e.format_with_context(source);
                format!("Error {}: {}\n{}", i + 1, e, context)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_multiple_errors() {
        let mut errors = ParseErrors::new();
        let span = Span::new(0, 1, 1, 1, 1, 2);
        errors.push(ParseError::unexpected_token("}", "expression", span));
        errors.push(ParseError::unexpected_eof("statement", span));
        assert_eq!(errors.len(), 2);
        assert!(!errors.is_empty());
    }

    #[test]
    fn format_with_context_marks_span() {
        let source = "def x = \n";
        let span = Span::new(8, 8, 1, 1, 9, 9);
        let err = ParseError::unexpected_eof("expression", span);
        let ctx = err.format_with_context(source);
        assert!(ctx.contains("def x ="));
        assert!(ctx.contains('^'));
    }
}
