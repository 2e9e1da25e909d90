//! `if`/`unless`, `while`/`do-until`/`for`, `break`/`continue`.

use super::Parser;
use crate::ast::{ExprKind, StmtId, StmtKind, StmtNode};
use crate::error::ParseResult;
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    pub(super) fn parse_if_statement(&mut self) -> ParseResult<StmtId> {
        let start = self.current_span();
        self.expect(TokenKind::KwIf)?;
        self.expect(TokenKind::LeftParen)?;
        let saved = self.ignore_eol;
        self.ignore_eol = true;
        let cond = self.parse_expression()?;
        self.ignore_eol = saved;
        self.expect(TokenKind::RightParen)?;
        let then_branch = self.parse_statement_as_block()?;
        let else_branch = if self.match_token(&TokenKind::KwElse) {
            Some(self.parse_statement_as_block()?)
        } else {
            None
        };
        let span = start.merge(&self.previous_span());
        Ok(self.ast.push_stmt(StmtNode {
            kind: StmtKind::If { cond, then_branch, else_branch },
            span,
        }))
    }

    /// `unless (cond) body` is `if (!cond) body` — the inversion happens here
    /// so downstream passes only ever see [`StmtKind::If`].
    pub(super) fn parse_unless_statement(&mut self) -> ParseResult<StmtId> {
        let start = self.current_span();
        self.expect(TokenKind::KwUnless)?;
        self.expect(TokenKind::LeftParen)?;
        let saved = self.ignore_eol;
        self.ignore_eol = true;
        let raw_cond = self.parse_expression()?;
        self.ignore_eol = saved;
        self.expect(TokenKind::RightParen)?;
        let cond_span = self.ast.expr(raw_cond).span;
        let cond = self.push_expr(ExprKind::Unary { op: crate::ast::UnaryOp::Not, operand: raw_cond }, cond_span);
        let then_branch = self.parse_statement_as_block()?;
        let span = start.merge(&self.previous_span());
        Ok(self.ast.push_stmt(StmtNode {
            kind: StmtKind::If { cond, then_branch, else_branch: None },
            span,
        }))
    }

    /// A single statement used as a loop/if body is wrapped in a block so the
    /// emitter always sees a uniform shape.
    fn parse_statement_as_block(&mut self) -> ParseResult<StmtId> {
        if self.check(&TokenKind::LeftBrace) {
            self.parse_block()
        } else {
            let start = self.current_span();
            let stmt = self.parse_statement()?;
            let span = start.merge(&self.previous_span());
            Ok(self.ast.push_stmt(StmtNode { kind: StmtKind::Block(vec![stmt]), span }))
        }
    }

    pub(super) fn parse_while_statement(&mut self) -> ParseResult<StmtId> {
        self.parse_while_statement_labelled(None)
    }

    pub(super) fn parse_while_statement_labelled(&mut self, label: Option<String>) -> ParseResult<StmtId> {
        let start = self.current_span();
        self.expect(TokenKind::KwWhile)?;
        self.expect(TokenKind::LeftParen)?;
        let saved = self.ignore_eol;
        self.ignore_eol = true;
        let cond = self.parse_expression()?;
        self.ignore_eol = saved;
        self.expect(TokenKind::RightParen)?;
        let body = self.parse_statement_as_block()?;
        let span = start.merge(&self.previous_span());
        Ok(self.ast.push_stmt(StmtNode {
            kind: StmtKind::While { label, cond, body, updates: None, run_body_first: false },
            span,
        }))
    }

    pub(super) fn parse_do_until_statement(&mut self) -> ParseResult<StmtId> {
        self.parse_do_until_statement_labelled(None)
    }

    pub(super) fn parse_do_until_statement_labelled(&mut self, label: Option<String>) -> ParseResult<StmtId> {
        let start = self.current_span();
        self.expect(TokenKind::KwDo)?;
        let body = self.parse_statement_as_block()?;
        self.expect(TokenKind::KwUntil)?;
        self.expect(TokenKind::LeftParen)?;
        let saved = self.ignore_eol;
        self.ignore_eol = true;
        let until_cond = self.parse_expression()?;
        self.ignore_eol = saved;
        self.expect(TokenKind::RightParen)?;
        // `While` always means "loop while cond holds"; `until` means the
        // opposite, so invert here rather than teaching the emitter two
        // senses of the same node.
        let cond_span = self.ast.expr(until_cond).span;
        let cond = self.push_expr(ExprKind::Unary { op: crate::ast::UnaryOp::Not, operand: until_cond }, cond_span);
        let span = start.merge(&self.previous_span());
        Ok(self.ast.push_stmt(StmtNode {
            kind: StmtKind::While { label, cond, body, updates: None, run_body_first: true },
            span,
        }))
    }

    /// `for (init; cond; updates) body` desugars to a labelled `while` with
    /// `updates` run at the continue label.
    pub(super) fn parse_for_statement(&mut self) -> ParseResult<StmtId> {
        self.parse_for_statement_labelled(None)
    }

    pub(super) fn parse_for_statement_labelled(&mut self, label: Option<String>) -> ParseResult<StmtId> {
        let start = self.current_span();
        self.expect(TokenKind::KwFor)?;
        self.expect(TokenKind::LeftParen)?;
        let saved = self.ignore_eol;
        self.ignore_eol = true;

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_for_clause_statement()?)
        };
        self.expect(TokenKind::Semicolon)?;

        let cond = if self.check(&TokenKind::Semicolon) {
            let true_span = self.current_span();
            self.push_expr(ExprKind::Literal(crate::ast::ConstValue::Boolean(true)), true_span)
        } else {
            self.parse_expression()?
        };
        self.expect(TokenKind::Semicolon)?;

        let updates = if self.check(&TokenKind::RightParen) {
            None
        } else {
            let update_start = self.current_span();
            let mut stmts = Vec::new();
            loop {
                let expr = self.parse_expression()?;
                let span = self.ast.expr(expr).span;
                stmts.push(self.ast.push_stmt(StmtNode { kind: StmtKind::ExprStmt(expr), span }));
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            let span = update_start.merge(&self.previous_span());
            Some(self.ast.push_stmt(StmtNode { kind: StmtKind::Block(stmts), span }))
        };
        self.ignore_eol = saved;
        self.expect(TokenKind::RightParen)?;

        let body = self.parse_statement_as_block()?;
        let loop_span = start.merge(&self.previous_span());
        let while_stmt = self.ast.push_stmt(StmtNode {
            kind: StmtKind::While { label, cond, body, updates, run_body_first: false },
            span: loop_span,
        });

        match init {
            Some(init_stmt) => Ok(self.ast.push_stmt(StmtNode {
                kind: StmtKind::Block(vec![init_stmt, while_stmt]),
                span: loop_span,
            })),
            None => Ok(while_stmt),
        }
    }

    /// The `init` clause of a `for` may be a `var`/`def`/typed declaration or
    /// a plain expression statement.
    fn parse_for_clause_statement(&mut self) -> ParseResult<StmtId> {
        match self.current_kind() {
            Some(TokenKind::KwDef) | Some(TokenKind::KwVar) => self.parse_decl_statement(),
            Some(k) if k.is_type_keyword() => self.parse_decl_statement(),
            _ => {
                let start = self.current_span();
                let expr = self.parse_expression()?;
                let span = start.merge(&self.previous_span());
                Ok(self.ast.push_stmt(StmtNode { kind: StmtKind::ExprStmt(expr), span }))
            }
        }
    }
}
