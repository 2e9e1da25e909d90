//! Recursive-descent parser and typed AST for the Jactl scripting language
//!
//! This crate covers tokenising and parsing only: it builds a fully-formed
//! [`ast::Ast`] with syntactic types (`ast::DeclaredType`) and unresolved
//! identifiers, but does no name resolution, type inference, or code
//! generation — those live downstream in the `jactl` crate.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;

pub use ast::Ast;
pub use error::{ParseError, ParseErrors, ParseResult};
pub use parser::{parse, Parser};
pub use span::Span;
