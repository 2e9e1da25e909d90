//! Lexer for Jactl source code.
//!
//! Wraps the logos-generated scanner with the stateful parts the tokeniser
//! contract requires: expression-string interpolation, and the
//! `startRegex()` out-of-band hint that reinterprets a pending `/` as the
//! beginning of a regex literal instead of the division operator.

use logos::Logos;

use crate::error::{ParseError, ParseResult};
use crate::span::{SourceMap, Span};
use crate::token::TokenKind;

/// A token with its span and raw source text.
#[derive(Debug, Clone)]
pub struct SpannedToken<'a> {
    pub token: TokenKind,
    pub span: Span,
    pub text: &'a str,
}

impl<'a> SpannedToken<'a> {
    pub fn new(token: TokenKind, span: Span, text: &'a str) -> Self {
        Self { token, span, text }
    }
}

/// Jactl lexer.
pub struct Lexer<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, TokenKind>,
    source_map: SourceMap,
    peeked: Option<Result<SpannedToken<'a>, ParseError>>,
    position: usize,
    offset: usize,
    /// Set by the parser just before asking for the next token, when a `/`
    /// at this position should be read as a regex literal rather than
    /// division `).
    want_regex: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            inner: TokenKind::lexer(source),
            source_map: SourceMap::new(source),
            peeked: None,
            position: 0,
            offset: 0,
            want_regex: false,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    fn make_span(&self, start: usize, end: usize) -> Span {
        self.source_map.span(start, end)
    }

    /// Out-of-band hint from the parser: the next `/` should start a regex
    /// literal, not a division/`/=` operator.
    pub fn start_regex(&mut self) {
        self.want_regex = true;
        // A `/` may already be buffered as a plain Slash; invalidate it so
        // it is rescanned as a regex start on the next pull.
        if matches!(
            self.peeked,
            Some(Ok(SpannedToken {
                token: TokenKind::Slash | TokenKind::SlashEqual,
                ..
            }))
        ) {
            let tok = self.peeked.take().unwrap().unwrap();
            self.restart_from(tok.span.start);
        }
    }

    pub fn peek(&mut self) -> Option<&Result<SpannedToken<'a>, ParseError>> {
        if self.peeked.is_none() {
            self.peeked = self.next_token_internal();
        }
        self.peeked.as_ref()
    }

    pub fn next_token(&mut self) -> Option<Result<SpannedToken<'a>, ParseError>> {
        if let Some(peeked) = self.peeked.take() {
            return Some(peeked);
        }
        self.next_token_internal()
    }

    fn next_token_internal(&mut self) -> Option<Result<SpannedToken<'a>, ParseError>> {
        let result = self.inner.next()?;
        let span = self.inner.span();
        let start = self.offset + span.start;
        let end = self.offset + span.end;
        self.position = end;

        match result {
            Ok(TokenKind::DoubleQuote) => match self.scan_expr_string_open(end) {
                Ok(()) => Some(Ok(SpannedToken::new(
                    TokenKind::DoubleQuote,
                    self.make_span(start, end),
                    &self.source[start..end],
                ))),
                Err(e) => {
                    self.restart_from(self.source.len());
                    Some(Err(e))
                }
            },

            Ok(TokenKind::Slash) if self.want_regex => {
                self.want_regex = false;
                let span = self.make_span(start, end);
                Some(Ok(SpannedToken::new(TokenKind::RegexStart, span, "/")))
            }

            Ok(token) => {
                self.want_regex = false;
                let span = self.make_span(start, end);
                let text = &self.source[start..end];
                Some(Ok(SpannedToken::new(token, span, text)))
            }

            Err(()) => Some(Err(ParseError::InvalidSyntax {
                message: "unrecognized token".to_string(),
                span: self.make_span(start, end),
            })),
        }
    }

    /// Called right after a [`TokenKind::RegexStart`] or
    /// [`TokenKind::RegexReplaceSeparator`]: scans up to (not including) the
    /// next unescaped `/`, returning the segment as a `StringContent` token
    /// and leaving the lexer positioned just after the terminating slash,
    /// which is returned as the requested boundary kind.
    pub fn scan_regex_segment(
        &mut self,
        terminator: TokenKind,
    ) -> ParseResult<(SpannedToken<'a>, SpannedToken<'a>)> {
        self.peeked = None;
        let start = self.position;
        let bytes = self.source.as_bytes();
        let mut pos = start;
        loop {
            match memchr::memchr2(b'\\', b'/', &bytes[pos..]) {
                None => {
                    return Err(ParseError::UnterminatedRegex {
                        span: self.make_span(start, self.source.len()),
                    })
                }
                Some(offset) => {
                    pos += offset;
                    if bytes[pos] == b'\\' && pos + 1 < bytes.len() {
                        pos += 2;
                        continue;
                    }
                    break;
                }
            }
        }
        let content_span = self.make_span(start, pos);
        let content = SpannedToken::new(TokenKind::StringContent, content_span, &self.source[start..pos]);
        let term_span = self.make_span(pos, pos + 1);
        let term = SpannedToken::new(terminator, term_span, "/");
        self.restart_from(pos + 1);
        Ok((content, term))
    }

    /// Pre-scan of a `"..."` string literal: records nothing structurally but
    /// validates it is well-formed enough to split on `${...}` lazily. Actual
    /// segment extraction happens via [`Lexer::scan_string_segment`], driven
    /// by the parser so nested braces inside an interpolation can themselves
    /// contain map/list literals.
    fn scan_expr_string_open(&mut self, _after_quote: usize) -> ParseResult<()> {
        Ok(())
    }

    /// Called by the parser immediately after consuming the opening `"` (or
    /// after closing an `${...}` interpolation): scans literal string text up
    /// to the next unescaped `"` or unescaped `${`, returning that content
    /// plus which boundary token terminated it.
    pub fn scan_string_segment(&mut self) -> ParseResult<(SpannedToken<'a>, TokenKind)> {
        self.peeked = None;
        let start = self.position;
        let bytes = self.source.as_bytes();
        let mut pos = start;
        loop {
            if pos >= bytes.len() {
                return Err(ParseError::UnterminatedString {
                    span: self.make_span(start, bytes.len()),
                });
            }
            match memchr::memchr3(b'\\', b'"', b'$', &bytes[pos..]) {
                None => {
                    return Err(ParseError::UnterminatedString {
                        span: self.make_span(start, bytes.len()),
                    })
                }
                Some(offset) => {
                    pos += offset;
                    match bytes[pos] {
                        b'\\' if pos + 1 < bytes.len() => {
                            pos += 2;
                            continue;
                        }
                        b'"' => {
                            let content = self.make_span(start, pos);
                            let tok = SpannedToken::new(
                                TokenKind::StringContent,
                                content,
                                &self.source[start..pos],
                            );
                            self.restart_from(pos + 1);
                            return Ok((tok, TokenKind::DoubleQuote));
                        }
                        b'$' if bytes.get(pos + 1) == Some(&b'{') => {
                            let content = self.make_span(start, pos);
                            let tok = SpannedToken::new(
                                TokenKind::StringContent,
                                content,
                                &self.source[start..pos],
                            );
                            self.restart_from(pos + 2);
                            return Ok((tok, TokenKind::ExprStringStart));
                        }
                        _ => {
                            pos += 1;
                            continue;
                        }
                    }
                }
            }
        }
    }

    /// Restart the lexer from a new byte offset (used after manually
    /// consuming raw text, e.g. string/regex segments).
    pub fn restart_from(&mut self, pos: usize) {
        self.peeked = None;
        self.position = pos;
        let logos_abs_pos = self.offset + self.inner.span().end;
        if pos > logos_abs_pos && pos <= self.source.len() {
            let skip = pos - logos_abs_pos;
            self.inner.bump(skip);
        } else if pos < self.source.len() {
            self.inner = TokenKind::lexer(&self.source[pos..]);
            self.offset = pos;
        } else {
            self.inner = TokenKind::lexer("");
            self.offset = pos;
        }
    }

    pub fn is_eof(&mut self) -> bool {
        self.peek().is_none()
    }
}

/// Tokenise the whole source (used by callers that just want a flat token
/// list, e.g. tests and the `testing` feature utilities).
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken<'_>, ParseError>> {
    let mut lexer = Lexer::new(source);
    let mut out = Vec::new();
    while let Some(tok) = lexer.next_token() {
        out.push(tok);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_simple_arithmetic() {
        let toks = tokenize("1 + 2 * 3");
        let kinds: Vec<_> = toks.into_iter().map(|t| t.unwrap().token).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::IntLiteral,
                TokenKind::Plus,
                TokenKind::IntLiteral,
                TokenKind::Star,
                TokenKind::IntLiteral,
            ]
        );
    }

    #[test]
    fn start_regex_converts_slash() {
        let mut lexer = Lexer::new("/abc/");
        lexer.start_regex();
        let tok = lexer.next_token().unwrap().unwrap();
        assert_eq!(tok.token, TokenKind::RegexStart);
        let (content, term) = lexer.scan_regex_segment(TokenKind::RegexEnd).unwrap();
        assert_eq!(content.text, "abc");
        assert_eq!(term.token, TokenKind::RegexEnd);
    }

    #[test]
    fn string_segment_splits_on_interpolation() {
        let mut lexer = Lexer::new("\"x=${1+2}\"");
        let tok = lexer.next_token().unwrap().unwrap();
        assert_eq!(tok.token, TokenKind::DoubleQuote);
        let (seg, boundary) = lexer.scan_string_segment().unwrap();
        assert_eq!(seg.text, "x=");
        assert_eq!(boundary, TokenKind::ExprStringStart);
    }
}
