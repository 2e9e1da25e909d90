//! Expression-string interpolation and regex match/substitute literals.
//!
//! Both forms are scanned out-of-band by the [`crate::lexer::Lexer`]: the
//! parser consumes the opening delimiter *without* letting the normal
//! token-pull machinery run over the raw text, drives
//! [`crate::lexer::Lexer::scan_string_segment`] /
//! [`crate::lexer::Lexer::scan_regex_segment`] directly, then resumes normal
//! tokenisation once a segment hands back control at a real code boundary
//! (an interpolated `${ ... }` or the text after the literal).

use super::Parser;
use crate::ast::{ExprId, ExprKind, StringPart};
use crate::error::{ParseError, ParseResult};
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    /// Consume the current token without asking the lexer for the next one.
    /// Used right before a manual `scan_*_segment` call, since those assume
    /// the lexer's byte position is still sitting just past the delimiter
    /// that produced the current token.
    fn consume_without_pull(&mut self) {
        self.previous = self.current.take();
    }

    pub(crate) fn parse_expr_string(&mut self) -> ParseResult<ExprId> {
        let start = self.current_span();
        self.consume_without_pull(); // opening "

        let mut parts = Vec::new();
        loop {
            let (content, boundary) = self.lexer.scan_string_segment()?;
            if !content.text.is_empty() {
                parts.push(StringPart::Literal(Self::unescape(content.text)));
            }
            match boundary {
                TokenKind::DoubleQuote => {
                    self.advance();
                    break;
                }
                TokenKind::ExprStringStart => {
                    self.advance();
                    let saved = self.ignore_eol;
                    self.ignore_eol = true;
                    let expr = self.parse_expression()?;
                    self.ignore_eol = saved;
                    parts.push(StringPart::Interpolation(expr));
                    if !self.check(&TokenKind::RightBrace) {
                        return Err(ParseError::unexpected_token(
                            self.current_text(),
                            "'}'",
                            self.current_span(),
                        ));
                    }
                    self.consume_without_pull(); // '}' — resume scanning literal text right after it
                }
                _ => unreachable!("scan_string_segment only returns DoubleQuote or ExprStringStart"),
            }
        }

        let span = start.merge(&self.previous_span());
        if parts.is_empty() {
            parts.push(StringPart::Literal(String::new()));
        }
        Ok(self.push_expr(ExprKind::ExprString(parts), span))
    }

    fn unescape(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some('$') => out.push('$'),
                    Some(other) => out.push(other),
                    None => {}
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Parses the regex operand of `=~` / `!~`, including the `s/pattern/
    /// replacement/flags` substitution form.
    /// Called with `self.current` still on the `=~`/`!~` operator token.
    pub(crate) fn parse_regex_match_rhs(&mut self, subject: ExprId, negated: bool) -> ParseResult<ExprId> {
        let start = self.ast.expr(subject).span;
        self.lexer.start_regex();
        self.advance(); // consume =~ / !~

        let is_substitution = self.check(&TokenKind::Identifier)
            && self.current_text() == "s"
            && self.source_byte_at(self.current_span().end) == Some(b'/');
        if is_substitution {
            self.consume_without_pull();
            self.lexer.start_regex();
            self.advance();
        }

        if !self.check(&TokenKind::RegexStart) {
            return Err(ParseError::unexpected_token(self.current_text(), "a regex literal", self.current_span()));
        }
        self.consume_without_pull();

        let pattern = if is_substitution {
            self.scan_regex_parts(TokenKind::RegexReplaceSeparator)?
        } else {
            self.scan_regex_parts(TokenKind::RegexEnd)?
        };

        let replace = if is_substitution {
            Some(self.scan_regex_parts(TokenKind::RegexEnd)?)
        } else {
            None
        };

        self.advance(); // resume normal tokenisation right after the closing '/'

        let global = self.consume_adjacent_flag('g');
        let _case_insensitive = self.consume_adjacent_flag('i');

        let span = start.merge(&self.previous_span());
        Ok(self.push_expr(
            ExprKind::RegexMatch { subject, pattern, replace, negated, global },
            span,
        ))
    }

    fn scan_regex_parts(&mut self, terminator: TokenKind) -> ParseResult<Vec<StringPart>> {
        let (content, _term) = self.lexer.scan_regex_segment(terminator)?;
        if content.text.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![StringPart::Literal(content.text.to_string())])
        }
    }

    /// A single-letter flag (`g`, `i`) written directly after the regex's
    /// closing `/` with no intervening whitespace.
    fn consume_adjacent_flag(&mut self, flag: char) -> bool {
        let text = self.current_text();
        if self.check(&TokenKind::Identifier) && text.len() == 1 && text.chars().next() == Some(flag) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn source_byte_at(&self, offset: usize) -> Option<u8> {
        self.lexer.source().as_bytes().get(offset).copied()
    }

    /// A bare regex literal used as an expression (`/pattern/`) implicitly
    /// matches against `it`.
    pub(crate) fn parse_bare_regex_literal(&mut self) -> ParseResult<ExprId> {
        let start = self.current_span();
        let it_span = start;
        let it = self.push_expr(ExprKind::UnresolvedIdentifier("it".to_string()), it_span);
        self.consume_without_pull(); // RegexStart
        let pattern = self.scan_regex_parts(TokenKind::RegexEnd)?;
        self.advance();
        let global = self.consume_adjacent_flag('g');
        let span = start.merge(&self.previous_span());
        Ok(self.push_expr(
            ExprKind::RegexMatch { subject: it, pattern, replace: None, negated: false, global },
            span,
        ))
    }

    /// Coerce a bare identifier immediately following `.`/`?.` into a string
    /// literal field name, e.g. `a.b` has field name `"b"` even though `b` is otherwise
    /// an identifier expression.
    pub(crate) fn parse_field_name_as_string(&mut self) -> ParseResult<ExprId> {
        let span = self.current_span();
        if self.check(&TokenKind::Identifier) || self.current_kind().and_then(|k| k.keyword_text()).is_some() {
            let text = self.current_text().to_string();
            self.advance();
            Ok(self.push_expr(ExprKind::Literal(crate::ast::ConstValue::String(text)), span))
        } else if self.check(&TokenKind::LeftParen) {
            self.advance();
            let saved = self.ignore_eol;
            self.ignore_eol = true;
            let expr = self.parse_expression()?;
            self.ignore_eol = saved;
            self.expect(TokenKind::RightParen)?;
            Ok(expr)
        } else {
            Err(ParseError::unexpected_token(self.current_text(), "a field name", self.current_span()))
        }
    }
}
