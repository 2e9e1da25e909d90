//! List/map/empty-map literal disambiguation and closure/implicit-`it`
//! parsing.

use super::Parser;
use crate::ast::{DeclaredType, ExprId, ExprKind, FunDecl, MapKey, StmtKind, StmtNode, VarDecl, VarDeclId};
use crate::error::{ParseError, ParseResult};
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    /// `[` starts a list (`[1, 2]`), a map (`[a: 1, b: 2]`), or the special
    /// empty-map literal `[:]` — the only one of the three that an empty
    /// `[]` can't ambiguously mean, since an empty list is written `[]`.
    pub(crate) fn parse_list_or_map_literal(&mut self) -> ParseResult<ExprId> {
        let start = self.current_span();
        self.expect(TokenKind::LeftBracket)?;
        let saved = self.ignore_eol;
        self.ignore_eol = true;

        if self.match_token(&TokenKind::Colon) {
            self.expect(TokenKind::RightBracket)?;
            self.ignore_eol = saved;
            let span = start.merge(&self.previous_span());
            return Ok(self.push_expr(ExprKind::MapLiteral(Vec::new()), span));
        }
        if self.check(&TokenKind::RightBracket) {
            self.advance();
            self.ignore_eol = saved;
            let span = start.merge(&self.previous_span());
            return Ok(self.push_expr(ExprKind::ListLiteral(Vec::new()), span));
        }

        // A map entry looks like `key:`; reuse the real key parser inside a
        // lookahead probe rather than hand-rolling a quiet variant, since a
        // failed lookahead's arena growth is a harmless orphan.
        let is_map = self.lookahead(|p| matches!(p.parse_map_key(), Ok(_)) && p.check(&TokenKind::Colon));

        let result = if is_map {
            let entries = self.parse_map_entries()?;
            self.ignore_eol = saved;
            self.expect(TokenKind::RightBracket)?;
            let span = start.merge(&self.previous_span());
            self.push_expr(ExprKind::MapLiteral(entries), span)
        } else {
            let items = self.parse_list_items()?;
            self.ignore_eol = saved;
            self.expect(TokenKind::RightBracket)?;
            let span = start.merge(&self.previous_span());
            self.push_expr(ExprKind::ListLiteral(items), span)
        };
        Ok(result)
    }

    fn parse_map_key(&mut self) -> ParseResult<MapKey> {
        match self.current_kind() {
            Some(TokenKind::Identifier) => {
                let name = self.current_text().to_string();
                self.advance();
                Ok(MapKey::Name(name))
            }
            Some(TokenKind::DoubleQuote) => {
                let expr = self.parse_expr_string()?;
                match &self.ast.expr(expr).kind {
                    ExprKind::ExprString(parts) if parts.len() == 1 => match &parts[0] {
                        crate::ast::StringPart::Literal(s) => Ok(MapKey::Name(s.clone())),
                        crate::ast::StringPart::Interpolation(_) => Ok(MapKey::Expr(expr)),
                    },
                    _ => Ok(MapKey::Expr(expr)),
                }
            }
            Some(TokenKind::LeftParen) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RightParen)?;
                Ok(MapKey::Expr(expr))
            }
            Some(k) if k.keyword_text().is_some() => {
                let name = self.current_text().to_string();
                self.advance();
                Ok(MapKey::Name(name))
            }
            _ => Err(ParseError::unexpected_token(self.current_text(), "a map key", self.current_span())),
        }
    }

    fn parse_map_entries(&mut self) -> ParseResult<Vec<(MapKey, ExprId)>> {
        let mut entries = Vec::new();
        loop {
            let key = self.parse_map_key()?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expression()?;
            entries.push((key, value));
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
            if self.check(&TokenKind::RightBracket) {
                break;
            }
        }
        Ok(entries)
    }

    fn parse_list_items(&mut self) -> ParseResult<Vec<ExprId>> {
        let mut items = Vec::new();
        loop {
            items.push(self.parse_expression()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
            if self.check(&TokenKind::RightBracket) {
                break;
            }
        }
        Ok(items)
    }

    /// `{ params -> body }` or a bare `{ ... }` given an implicit single `it`
    /// parameter . Reached
    /// only from expression position — a `{` starting a statement is a plain
    /// block, handled directly by [`Parser::parse_statement`].
    pub(crate) fn parse_closure_or_block_expr(&mut self) -> ParseResult<ExprId> {
        let start = self.current_span();
        self.expect(TokenKind::LeftBrace)?;

        let explicit_params = self.is_explicit_closure_params_ahead();
        let mut params = if explicit_params {
            let p = self.parse_closure_param_list()?;
            self.expect(TokenKind::Arrow)?;
            p
        } else {
            Vec::new()
        };

        let implicit_it_param = params.is_empty();
        if implicit_it_param {
            let mut decl = VarDecl::new("it", DeclaredType::Def, start);
            decl.roles.is_param = true;
            params.push(self.ast.push_var_decl(decl));
        }

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
        let body = self.ast.push_stmt(StmtNode { kind: StmtKind::Block(stmts), span });

        let fun = FunDecl {
            name: "<closure>".to_string(),
            params,
            return_type: DeclaredType::Def,
            body,
            is_closure: true,
            implicit_it_param,
            has_wrapper: true,
            is_async: false,
            heap_locals: Vec::new(),
            span,
        };
        let fun_id = self.ast.push_fun_decl(fun);
        Ok(self.push_expr(ExprKind::Closure(fun_id), span))
    }

    fn is_explicit_closure_params_ahead(&mut self) -> bool {
        self.lookahead(|p| {
            if p.check(&TokenKind::Arrow) {
                return true;
            }
            loop {
                if p.current_kind().map(|k| k.is_type_keyword()).unwrap_or(false) {
                    if p.parse_declared_type().is_err() {
                        return false;
                    }
                }
                if !p.check(&TokenKind::Identifier) {
                    return false;
                }
                p.advance();
                if p.match_token(&TokenKind::Equal) && p.parse_expression().is_err() {
                    return false;
                }
                if p.match_token(&TokenKind::Comma) {
                    continue;
                }
                break;
            }
            p.check(&TokenKind::Arrow)
        })
    }

    fn parse_closure_param_list(&mut self) -> ParseResult<Vec<VarDeclId>> {
        let mut params = Vec::new();
        if self.check(&TokenKind::Arrow) {
            return Ok(params);
        }
        loop {
            let span = self.current_span();
            let ty = if self.current_kind().map(|k| k.is_type_keyword()).unwrap_or(false) {
                self.parse_declared_type()?
            } else {
                DeclaredType::Def
            };
            let name = self.expect(TokenKind::Identifier)?.text.to_string();
            let mut decl = VarDecl::new(name, ty, span);
            decl.roles.is_param = true;
            if self.match_token(&TokenKind::Equal) {
                decl.initializer = Some(self.parse_expression()?);
            }
            params.push(self.ast.push_var_decl(decl));
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }
}
