//! Assignment and lvalue rewriting: turns a parsed lvalue expression plus `=`/compound-`=`
//! RHS into `VarOpAssign` / `FieldOpAssign` / `MultiAssign`, with
//! auto-creation (`create_if_missing`) threaded through compound field-path
//! writes.

use super::Parser;
use crate::ast::{BinaryOp, DeclaredType, ExprId, ExprKind, VarDecl};
use crate::error::{ParseError, ParseResult};
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    pub(crate) fn parse_assignment(&mut self) -> ParseResult<ExprId> {
        let lhs = self.parse_ternary()?;
        match self.current_kind() {
            Some(kind) if kind.is_assignment_like() => self.finish_assignment(lhs, kind),
            _ => Ok(lhs),
        }
    }

    fn finish_assignment(&mut self, lhs: ExprId, op_token: TokenKind) -> ParseResult<ExprId> {
        self.advance(); // consume the assignment operator
        let saved = self.ignore_eol;
        self.ignore_eol = true;
        let rhs = self.parse_assignment()?; // right-associative
        self.ignore_eol = saved;

        let compound_op = Self::compound_op_for(&op_token);

        if let ExprKind::ListLiteral(items) = self.ast.expr(lhs).kind.clone() {
            if matches!(op_token, TokenKind::Equal) {
                return self.rewrite_multi_assign(items, rhs, lhs);
            }
            return Err(ParseError::invalid_syntax(
                "tuple assignment only supports '='",
                self.ast.expr(lhs).span,
            ));
        }

        match self.ast.expr(lhs).kind.clone() {
            ExprKind::Identifier(_) | ExprKind::UnresolvedIdentifier(_) | ExprKind::CaptureIdentifier(_) => {
                let span = self.ast.expr(lhs).span.merge(&self.ast.expr(rhs).span);
                Ok(self.push_expr(ExprKind::VarOpAssign { target: lhs, op: compound_op, value: rhs }, span))
            }
            ExprKind::FieldAccess { parent, field, kind, .. } => {
                let value = match compound_op {
                    None => rhs,
                    Some(op) => {
                        let rhs_span = self.ast.expr(rhs).span;
                        let noop = self.push_expr(ExprKind::Noop, rhs_span);
                        self.push_expr(ExprKind::Binary { left: noop, op, right: rhs }, rhs_span)
                    }
                };
                // Compound assignment through a field path auto-creates
                // missing intermediate maps/lists; plain `=` does not.
                let create_if_missing = compound_op.is_some();
                self.ast.expr_mut(parent).flags.create_if_missing = create_if_missing;
                let span = self.ast.expr(lhs).span.merge(&self.ast.expr(rhs).span);
                Ok(self.push_expr(
                    ExprKind::FieldOpAssign { parent, accessor: kind, field, value },
                    span,
                ))
            }
            ExprKind::Nested(inner) => {
                // `(a.b) = rhs` — the parens don't change lvalue-ness.
                self.finish_assignment_on(inner, rhs, compound_op)
            }
            _ => Err(ParseError::invalid_syntax("invalid assignment target", self.ast.expr(lhs).span)),
        }
    }

    fn finish_assignment_on(&mut self, target: ExprId, rhs: ExprId, compound_op: Option<BinaryOp>) -> ParseResult<ExprId> {
        match self.ast.expr(target).kind.clone() {
            ExprKind::Identifier(_) | ExprKind::UnresolvedIdentifier(_) => {
                let span = self.ast.expr(target).span.merge(&self.ast.expr(rhs).span);
                Ok(self.push_expr(ExprKind::VarOpAssign { target, op: compound_op, value: rhs }, span))
            }
            ExprKind::FieldAccess { parent, field, kind, .. } => {
                let value = match compound_op {
                    None => rhs,
                    Some(op) => {
                        let rhs_span = self.ast.expr(rhs).span;
                        let noop = self.push_expr(ExprKind::Noop, rhs_span);
                        self.push_expr(ExprKind::Binary { left: noop, op, right: rhs }, rhs_span)
                    }
                };
                self.ast.expr_mut(parent).flags.create_if_missing = compound_op.is_some();
                let span = self.ast.expr(target).span.merge(&self.ast.expr(rhs).span);
                Ok(self.push_expr(ExprKind::FieldOpAssign { parent, accessor: kind, field, value }, span))
            }
            _ => Err(ParseError::invalid_syntax("invalid assignment target", self.ast.expr(target).span)),
        }
    }

    /// Map a compound-assignment token to the binary operator it implies;
    /// `None` for plain `=`.
    fn compound_op_for(token: &TokenKind) -> Option<BinaryOp> {
        use TokenKind::*;
        Some(match token {
            Equal => return None,
            PlusEqual => BinaryOp::Add,
            MinusEqual => BinaryOp::Subtract,
            StarEqual => BinaryOp::Multiply,
            SlashEqual => BinaryOp::Divide,
            PercentEqual => BinaryOp::Modulo,
            AmpEqual => BinaryOp::BitAnd,
            PipeEqual => BinaryOp::BitOr,
            CaretEqual => BinaryOp::BitXor,
            ShiftLeftEqual => BinaryOp::ShiftLeft,
            ShiftRightEqual => BinaryOp::ShiftRight,
            UnsignedShiftRightEqual => BinaryOp::UnsignedShiftRight,
            // `?:=` / `?=` carry no plain binary-op counterpart; the emitter
            // special-cases them (assign-if-null / assign-if-absent).
            QuestionColonEqual | QuestionEqual => return None,
            _ => return None,
        })
    }

    /// `(x, y) = expr` reassigning existing lvalues . `lhs` is the transient parenthesised-tuple
    /// `ListLiteral` produced by `parse_paren_expr_or_tuple`; each item must
    /// itself be a valid lvalue. The method emitter synthesises the
    /// temp-bind-then-assign-each sequence from `temp`/`targets`/`value`.
    fn rewrite_multi_assign(&mut self, items: Vec<ExprId>, value: ExprId, lhs: ExprId) -> ParseResult<ExprId> {
        let start = self.ast.expr(lhs).span;
        for item in &items {
            match self.ast.expr(*item).kind {
                ExprKind::Identifier(_) | ExprKind::UnresolvedIdentifier(_) | ExprKind::FieldAccess { .. } => {}
                _ => return Err(ParseError::invalid_syntax("invalid assignment target", self.ast.expr(*item).span)),
            }
        }
        let mut temp_decl = VarDecl::new("__multiAssignTemp", DeclaredType::Def, start);
        temp_decl.initializer = Some(value);
        let temp = self.ast.push_var_decl(temp_decl);
        let span = start.merge(&self.ast.expr(value).span);
        Ok(self.push_expr(ExprKind::MultiAssign { temp, targets: items, value }, span))
    }
}
