//! Post-parse error kinds: `CompileError` for resolve/emit-time
//! compile errors, and the runtime error data shapes the emitted bytecode
//! constructs but never itself raises — this crate only emits the
//! instructions that construct and throw them, the (external) runtime raises
//! them.
//!
//! A closed enum built on `thiserror`, for consistency with
//! `jactl_parser::ParseError`'s own `thiserror` usage.

use jactl_parser::span::Span;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CompileError {
    #[error("no such field: {field} at {span:?}")]
    NoSuchField { field: String, span: Span },

    #[error("operator {op} not applicable to {left} and {right}")]
    BadOperandTypes { left: String, op: String, right: String },

    #[error("class '{name}' not found")]
    UnknownClass { name: String },

    #[error("'{name}' is not defined")]
    UndefinedVariable { name: String, span: Span },

    #[error("a remaining Unknown type reached emission for '{context}' at {span:?}")]
    UnresolvedType { context: String, span: Span },

    #[error("invalid multi-assign: {message} at {span:?}")]
    InvalidMultiAssign { message: String, span: Span },

    #[error("operand tracker invariant violated: {message}")]
    TrackerInvariant { message: String },

    #[error("{0}")]
    ParseFailed(String),
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Multiple independent `CompileError`s accumulated during a single resolve/
/// emit pass, raised together.
#[derive(Debug, Default, Clone)]
pub struct CompileErrors {
    errors: Vec<CompileError>,
}

impl CompileErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: CompileError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn into_result<T>(self, value: T) -> Result<T, CompileErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileErrors {}

impl From<CompileError> for CompileErrors {
    fn from(error: CompileError) -> Self {
        let mut errors = CompileErrors::new();
        errors.push(error);
        errors
    }
}

/// Runtime error data shapes: the emitter constructs these as
/// values in the emitted bytecode, it never raises them itself.
#[derive(Debug, Clone, PartialEq)]
pub struct NullError {
    pub message: String,
    pub source: String,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    DivideByZero,
    IndexOutOfBounds { index: i64, length: usize },
    BadCast { from: String, to: String },
    MissingMandatoryField { class: String, field: String },
    AutoCreateDisallowed { class: String },
    AsyncInNoAsyncContext,
    UnknownNamedArgument { name: String },
    DuplicateNamedArgument { name: String },
    BadCheckpointVersion { expected: u32, found: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub source: String,
    pub offset: usize,
}

/// The async suspension sentinel: structural, never mixed into the error channel. Carries
/// enough state for an external scheduler to resume the invocation.
#[derive(Debug, Clone)]
pub struct Continuation {
    pub captured_continuation: Option<Box<Continuation>>,
    /// Handle to this method's continuation-entry point.
    pub continuation_entry: String,
    pub resume_location_id: u32,
    pub longs: Vec<i64>,
    pub objects: Vec<serde_json::Value>,
}
