//! Ternary/elvis, the ~15-level binary operator-precedence climb, and the
//! postfix chain (`.`/`?.`/`[...]`/`?[...]`/calls/`++`/`--`).

use super::Parser;
use crate::ast::{AccessKind, ExprId, ExprKind, UnaryOp};
use crate::error::ParseResult;
use crate::token::{Associativity, Precedence, TokenKind};

impl Precedence {
    /// One level higher, used to enforce left-associativity in the climber
    /// (a left-assoc operator's right operand may not itself absorb another
    /// operator at the same level).
    fn one_above(self) -> Precedence {
        use Precedence::*;
        match self {
            Comma => Assign,
            Assign => Ternary,
            Ternary => OrOr,
            OrOr => AndAnd,
            AndAnd => BitOr,
            BitOr => BitXor,
            BitXor => BitAnd,
            BitAnd => Equality,
            Equality => Relational,
            Relational => Shift,
            Shift => Additive,
            Additive => Multiplicative,
            Multiplicative => Unary,
            Unary => Postfix,
            Postfix => Postfix,
        }
    }
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_ternary(&mut self) -> ParseResult<ExprId> {
        let cond = self.parse_binary(Precedence::OrOr)?;
        if self.match_token(&TokenKind::Question) {
            let saved = self.ignore_eol;
            self.ignore_eol = true;
            let then_branch = self.parse_ternary()?;
            self.expect(TokenKind::Colon)?;
            let else_branch = self.parse_ternary()?;
            self.ignore_eol = saved;
            let span = self.ast.expr(cond).span.merge(&self.ast.expr(else_branch).span);
            return Ok(self.push_expr(ExprKind::Ternary { cond, then_branch, else_branch }, span));
        }
        if self.match_token(&TokenKind::QuestionColon) {
            let default = self.parse_ternary()?;
            let span = self.ast.expr(cond).span.merge(&self.ast.expr(default).span);
            return Ok(self.push_expr(ExprKind::Elvis { cond, default }, span));
        }
        Ok(cond)
    }

    /// Climbs everything from `||` (the level just below ternary) down to
    /// the unary/postfix tier, stopping at assignment and ternary, which are
    /// handled one layer up by [`Parser::parse_assignment`] /
    /// [`Parser::parse_ternary`].
    pub(crate) fn parse_binary(&mut self, min_prec: Precedence) -> ParseResult<ExprId> {
        let mut lhs = self.parse_unary()?;
        loop {
            let Some(kind) = self.current_kind() else { break };

            if kind == TokenKind::KwInstanceOf {
                if Precedence::Relational < min_prec {
                    break;
                }
                lhs = self.maybe_parse_instanceof(lhs)?;
                continue;
            }
            if matches!(kind, TokenKind::EqualTilde | TokenKind::BangTilde) {
                if Precedence::Relational < min_prec {
                    break;
                }
                let negated = kind == TokenKind::BangTilde;
                lhs = self.parse_regex_match_rhs(lhs, negated)?;
                continue;
            }
            if matches!(kind, TokenKind::KwIn | TokenKind::BangIn) {
                if Precedence::Relational < min_prec {
                    break;
                }
                let negated = kind == TokenKind::BangIn;
                self.advance();
                let rhs = self.parse_binary(Precedence::Relational.one_above())?;
                let span = self.ast.expr(lhs).span.merge(&self.ast.expr(rhs).span);
                let op = if negated { crate::ast::BinaryOp::NotIn } else { crate::ast::BinaryOp::In };
                lhs = self.push_expr(ExprKind::Binary { left: lhs, op, right: rhs }, span);
                continue;
            }

            let Some((prec, assoc)) = kind.binary_precedence() else { break };
            if prec == Precedence::Assign || prec == Precedence::Ternary || prec < min_prec {
                break;
            }
            self.advance();
            let next_min = match assoc {
                Associativity::Left => prec.one_above(),
                Associativity::Right => prec,
            };
            let rhs = self.parse_binary(next_min)?;
            let op = Self::token_to_binary_op(&kind);
            let span = self.ast.expr(lhs).span.merge(&self.ast.expr(rhs).span);
            lhs = self.push_expr(ExprKind::Binary { left: lhs, op, right: rhs }, span);
        }
        Ok(lhs)
    }

    fn token_to_binary_op(kind: &TokenKind) -> crate::ast::BinaryOp {
        use crate::ast::BinaryOp::*;
        use TokenKind::*;
        match kind {
            Plus => Add,
            Minus => Subtract,
            Star => Multiply,
            Slash => Divide,
            Percent => Modulo,
            EqualEqual => Equal,
            BangEqual => NotEqual,
            TripleEqual => Identical,
            BangDoubleEqual => NotIdentical,
            Less => crate::ast::BinaryOp::Less,
            LessEqual => crate::ast::BinaryOp::LessEqual,
            Greater => crate::ast::BinaryOp::Greater,
            GreaterEqual => crate::ast::BinaryOp::GreaterEqual,
            Spaceship => Compare,
            AndAndTok => And,
            OrOrTok => Or,
            Amp => BitAnd,
            Pipe => BitOr,
            Caret => BitXor,
            ShiftLeft => crate::ast::BinaryOp::ShiftLeft,
            ShiftRight => crate::ast::BinaryOp::ShiftRight,
            UnsignedShiftRight => crate::ast::BinaryOp::UnsignedShiftRight,
            _ => unreachable!("unexpected binary operator token {kind:?}"),
        }
    }

    pub(crate) fn parse_postfix(&mut self) -> ParseResult<ExprId> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.current_kind() {
                Some(TokenKind::Dot) | Some(TokenKind::QuestionDot) => {
                    let optional = matches!(self.current_kind(), Some(TokenKind::QuestionDot));
                    self.advance();
                    if self.check(&TokenKind::Identifier) && self.peek_kind() == Some(TokenKind::LeftParen) {
                        let name = self.current_text().to_string();
                        self.advance();
                        self.advance(); // (
                        let args = self.parse_arg_list()?;
                        self.expect(TokenKind::RightParen)?;
                        let span = self.ast.expr(expr).span.merge(&self.previous_span());
                        expr = self.push_expr(ExprKind::MethodCall { parent: expr, name, args, optional }, span);
                    } else {
                        let field = self.parse_field_name_as_string()?;
                        let kind = if optional { AccessKind::OptionalDot } else { AccessKind::Dot };
                        let span = self.ast.expr(expr).span.merge(&self.ast.expr(field).span);
                        expr = self.push_expr(
                            ExprKind::FieldAccess { parent: expr, field, kind, create_if_missing: false },
                            span,
                        );
                    }
                }
                Some(TokenKind::LeftBracket) | Some(TokenKind::QuestionLeftBracket) => {
                    let optional = matches!(self.current_kind(), Some(TokenKind::QuestionLeftBracket));
                    self.advance();
                    let saved = self.ignore_eol;
                    self.ignore_eol = true;
                    let field = self.parse_expression()?;
                    self.ignore_eol = saved;
                    self.expect(TokenKind::RightBracket)?;
                    let kind = if optional { AccessKind::OptionalBracket } else { AccessKind::Bracket };
                    let span = self.ast.expr(expr).span.merge(&self.previous_span());
                    expr = self.push_expr(
                        ExprKind::FieldAccess { parent: expr, field, kind, create_if_missing: false },
                        span,
                    );
                }
                Some(TokenKind::LeftParen) => {
                    self.advance();
                    let args = self.parse_arg_list()?;
                    self.expect(TokenKind::RightParen)?;
                    let span = self.ast.expr(expr).span.merge(&self.previous_span());
                    expr = self.push_expr(ExprKind::Call { callee: expr, args }, span);
                }
                Some(TokenKind::PlusPlus) => {
                    self.advance();
                    let span = self.ast.expr(expr).span.merge(&self.previous_span());
                    expr = self.push_expr(ExprKind::Unary { op: UnaryOp::PostIncrement, operand: expr }, span);
                }
                Some(TokenKind::MinusMinus) => {
                    self.advance();
                    let span = self.ast.expr(expr).span.merge(&self.previous_span());
                    expr = self.push_expr(ExprKind::Unary { op: UnaryOp::PostDecrement, operand: expr }, span);
                }
                _ => break,
            }
        }
        Ok(expr)
    }
}
