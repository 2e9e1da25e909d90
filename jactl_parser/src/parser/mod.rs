//! Recursive-descent parser for Jactl.
//!
//! Builds the typed [`crate::ast::Ast`] directly — there is no separate
//! concrete syntax tree step. Ambiguity between maps/lists/closures/blocks is
//! resolved with bounded [`Parser::lookahead`] (snapshot + speculative parse
//! + rewind); the precedence climb lives in [`precedence_climb`].

mod class_decl;
mod collections;
mod control_flow;
mod lvalue;
mod precedence_climb;
mod primary;
mod strings;

use crate::ast::{Ast, ExprFlags, ExprId, ExprKind, ExprNode, StmtId, StmtKind, StmtNode};
use crate::error::{ParseError, ParseErrors, ParseResult};
use crate::lexer::{Lexer, SpannedToken};
use crate::span::{SourceMap, Span};
use crate::token::TokenKind;

/// A restorable snapshot of everything lookahead must not leak through on
/// failure.
struct Snapshot {
    previous: Option<TokenKind>,
    current_pos: usize,
    ignore_eol: bool,
    error_count: usize,
    expr_count: usize,
    stmt_count: usize,
}

pub struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    source_map: SourceMap,
    current: Option<SpannedToken<'a>>,
    previous: Option<SpannedToken<'a>>,
    pub(crate) errors: ParseErrors,
    pub(crate) ast: Ast,

    /// Toggled inside bracketed contexts: parens, `[...]`, arrow-preceded
    /// blocks, and inside string-interpolation braces . While
    /// true, EOL tokens are skipped like whitespace.
    pub(crate) ignore_eol: bool,

    /// Incremented while speculatively parsing inside [`Parser::lookahead`].
    /// State-mutating helpers (function-stack pushes, per-block function
    /// registration, class pushes) check this and no-op while it is nonzero,
    /// so a failed lookahead never leaves stray side effects behind.
    pub(crate) lookahead_depth: u32,

    /// Names of functions currently being parsed, innermost last; suppressed
    /// during lookahead.
    pub(crate) function_stack: Vec<String>,
    /// Names of classes currently being parsed, innermost last; suppressed
    /// during lookahead.
    pub(crate) class_stack: Vec<String>,
    /// Labels currently in scope for `break label` / `continue label`.
    pub(crate) label_stack: Vec<String>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let source_map = SourceMap::new(source);
        let mut parser = Self {
            source,
            lexer: Lexer::new(source),
            source_map,
            current: None,
            previous: None,
            errors: ParseErrors::new(),
            ast: Ast::new(),
            ignore_eol: false,
            lookahead_depth: 0,
            function_stack: Vec::new(),
            class_stack: Vec::new(),
            label_stack: Vec::new(),
        };
        parser.advance();
        parser
    }

    /// Parse a whole script: a sequence of top-level statements, returning
    /// the arena and the top-level statement list, or the accumulated
    /// [`ParseErrors`] if any were raised.
    pub fn parse_script(mut self) -> Result<(Ast, Vec<StmtId>), ParseErrors> {
        let mut stmts = Vec::new();
        self.skip_separators();
        while !self.is_at_end() {
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
            self.skip_separators();
        }
        if self.errors.is_empty() {
            Ok((self.ast, stmts))
        } else {
            Err(self.errors)
        }
    }

    // ==================== Token management ====================

    pub(crate) fn advance(&mut self) -> Option<SpannedToken<'a>> {
        let prev = self.current.take();
        if let Some(p) = &prev {
            self.previous = Some(p.clone());
        }
        loop {
            match self.next_raw_token() {
                Some(Ok(tok)) => {
                    if self.ignore_eol && tok.token == TokenKind::Eol {
                        continue;
                    }
                    self.current = Some(tok);
                    break;
                }
                Some(Err(e)) => {
                    self.errors.push(e);
                    continue;
                }
                None => {
                    self.current = None;
                    break;
                }
            }
        }
        prev
    }

    fn next_raw_token(&mut self) -> Option<Result<SpannedToken<'a>, ParseError>> {
        self.lexer.next_token()
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.current.as_ref().map(|t| &t.token == kind).unwrap_or(false)
    }

    pub(crate) fn check_any(&self, kinds: &[TokenKind]) -> bool {
        self.current.as_ref().map(|t| kinds.contains(&t.token)).unwrap_or(false)
    }

    pub(crate) fn current_kind(&self) -> Option<TokenKind> {
        self.current.as_ref().map(|t| t.token.clone())
    }

    pub(crate) fn current_text(&self) -> &'a str {
        self.current.as_ref().map(|t| t.text).unwrap_or("")
    }

    pub(crate) fn peek_kind(&mut self) -> Option<TokenKind> {
        self.lexer.peek().and_then(|r| r.as_ref().ok()).map(|t| t.token.clone())
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> ParseResult<SpannedToken<'a>> {
        if self.check(&kind) {
            Ok(self.advance().unwrap())
        } else {
            let found = self.current.as_ref().map(|t| t.text).unwrap_or("end of input");
            Err(ParseError::unexpected_token(found, format!("{kind:?}"), self.current_span()))
        }
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.current
            .as_ref()
            .map(|t| t.span)
            .unwrap_or_else(|| self.source_map.span(self.source.len(), self.source.len()))
    }

    pub(crate) fn previous_span(&self) -> Span {
        self.previous.as_ref().map(|t| t.span).unwrap_or_else(|| self.current_span())
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current.is_none()
    }

    pub(crate) fn skip_separators(&mut self) {
        while self.check(&TokenKind::Eol) || self.check(&TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// Error recovery: discard tokens up to the next statement boundary.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.check(&TokenKind::Eol) || self.check(&TokenKind::Semicolon) {
                self.advance();
                return;
            }
            if self.current.as_ref().map(|t| t.token.is_statement_keyword()).unwrap_or(false) {
                return;
            }
            self.advance();
        }
    }

    // ==================== Lookahead / snapshot / rewind ====================

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            previous: self.previous.as_ref().map(|t| t.token.clone()),
            current_pos: self.current.as_ref().map(|t| t.span.start).unwrap_or(self.source.len()),
            ignore_eol: self.ignore_eol,
            error_count: self.errors.len(),
            expr_count: self.ast.expr_count(),
            stmt_count: self.ast.stmt_count(),
        }
    }

    /// Restore exactly the state captured by [`Parser::snapshot`]. Arena
    /// entries created during the failed attempt are left in place (harmless
    /// orphans — see module docs) rather than rewound, since nothing else
    /// references them.
    fn rewind(&mut self, snap: Snapshot) {
        self.lexer = Lexer::new(self.source);
        self.lexer.restart_from(snap.current_pos);
        self.current = None;
        self.previous = None;
        self.ignore_eol = snap.ignore_eol;
        self.advance();
        while self.errors.len() > snap.error_count {
            // Drop the speculative errors accumulated during the failed attempt.
            let mut errs = std::mem::take(&mut self.errors).take();
            errs.truncate(snap.error_count);
            for e in errs {
                self.errors.push(e);
            }
        }
        let _ = (snap.previous, snap.expr_count, snap.stmt_count);
    }

    /// Try each predicate in turn against a snapshot; if any returns `false`
    /// (or the attempt records a new compile error), restore the snapshot and
    /// return `false`. On full success, the parser state from the successful
    /// attempt is kept. Side effects gated on [`Parser::lookahead_depth`] are
    /// suppressed for the duration so a failed probe is invisible elsewhere
    pub(crate) fn lookahead(&mut self, mut attempt: impl FnMut(&mut Self) -> bool) -> bool {
        let snap = self.snapshot();
        self.lookahead_depth += 1;
        let ok = attempt(self) && self.errors.len() == snap.error_count;
        self.lookahead_depth -= 1;
        if !ok {
            self.rewind(snap);
        }
        ok
    }

    // ==================== Statements ====================

    pub(crate) fn parse_statement(&mut self) -> ParseResult<StmtId> {
        let start = self.current_span();
        let kind = self.current_kind();
        let stmt_kind = match kind {
            Some(TokenKind::KwClass) => {
                let class_id = self.parse_class_decl()?;
                StmtKind::ClassDecl(class_id)
            }
            Some(TokenKind::KwIf) => return self.parse_if_statement(),
            Some(TokenKind::KwUnless) => return self.parse_unless_statement(),
            Some(TokenKind::KwWhile) => return self.parse_while_statement(),
            Some(TokenKind::KwDo) => return self.parse_do_until_statement(),
            Some(TokenKind::KwFor) => return self.parse_for_statement(),
            Some(TokenKind::KwBreak) => {
                self.advance();
                let label = self.parse_optional_label();
                StmtKind::Break(label)
            }
            Some(TokenKind::KwContinue) => {
                self.advance();
                let label = self.parse_optional_label();
                StmtKind::Continue(label)
            }
            Some(TokenKind::KwReturn) => {
                self.advance();
                let value = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                StmtKind::Return(value)
            }
            Some(TokenKind::LeftBrace) => {
                return self.parse_block();
            }
            Some(TokenKind::KwDef) | Some(TokenKind::KwVar) => {
                return self.parse_decl_statement();
            }
            Some(k) if k.is_type_keyword() => {
                return self.parse_decl_statement();
            }
            // `label: loop`.
            Some(TokenKind::Identifier)
                if self.peek_kind() == Some(TokenKind::Colon) && self.is_loop_label_ahead() =>
            {
                return self.parse_labelled_loop();
            }
            _ => {
                let expr = self.parse_expression()?;
                StmtKind::ExprStmt(expr)
            }
        };
        let span = start.merge(&self.previous_span());
        Ok(self.ast.push_stmt(StmtNode { kind: stmt_kind, span }))
    }

    fn at_statement_end(&self) -> bool {
        self.is_at_end() || self.check(&TokenKind::Eol) || self.check(&TokenKind::Semicolon) || self.check(&TokenKind::RightBrace)
    }

    fn parse_optional_label(&mut self) -> Option<String> {
        if let Some(TokenKind::Identifier) = self.current_kind() {
            if self.label_stack.iter().any(|l| l == self.current_text()) {
                let name = self.current_text().to_string();
                self.advance();
                return Some(name);
            }
        }
        None
    }

    fn is_loop_label_ahead(&mut self) -> bool {
        self.lookahead(|p| {
            p.advance(); // identifier
            p.advance(); // colon
            p.check_any(&[TokenKind::KwWhile, TokenKind::KwFor, TokenKind::KwDo])
        })
    }

    fn parse_labelled_loop(&mut self) -> ParseResult<StmtId> {
        let label = self.current_text().to_string();
        self.advance(); // identifier
        self.advance(); // colon
        self.label_stack.push(label.clone());
        let result = match self.current_kind() {
            Some(TokenKind::KwWhile) => self.parse_while_statement_labelled(Some(label)),
            Some(TokenKind::KwFor) => self.parse_for_statement_labelled(Some(label)),
            Some(TokenKind::KwDo) => self.parse_do_until_statement_labelled(Some(label)),
            _ => Err(ParseError::invalid_syntax("expected a loop after label", self.current_span())),
        };
        self.label_stack.pop();
        result
    }

    pub(crate) fn parse_block(&mut self) -> ParseResult<StmtId> {
        let start = self.current_span();
        self.expect(TokenKind::LeftBrace)?;
        let mut stmts = Vec::new();
        self.skip_separators();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            match self.parse_statement() {
                Ok(s) => stmts.push(s),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
            self.skip_separators();
        }
        self.expect(TokenKind::RightBrace)?;
        let span = start.merge(&self.previous_span());
        Ok(self.ast.push_stmt(StmtNode { kind: StmtKind::Block(stmts), span }))
    }

    // ==================== Expression entry point ====================

    pub(crate) fn parse_expression(&mut self) -> ParseResult<ExprId> {
        self.parse_assignment()
    }

    pub(crate) fn push_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.ast.push_expr(ExprNode {
            kind,
            span,
            flags: ExprFlags {
                is_result_used: true,
                ..ExprFlags::default()
            },
        })
    }
}

/// Parse Jactl source into an AST plus top-level statement list.
pub fn parse(source: &str) -> Result<(Ast, Vec<StmtId>), ParseErrors> {
    Parser::new(source).parse_script()
}
