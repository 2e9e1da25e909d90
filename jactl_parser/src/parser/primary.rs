//! Primary expressions: literals, identifiers, parenthesised expressions
//! (cast vs. grouping vs. tuple-lvalue), `new`, `instanceof`, and variable /
//! function declarations.

use super::Parser;
use crate::ast::{
    Arg, ConstValue, DeclaredType, ExprFlags, ExprId, ExprKind, ExprNode, FunDecl, StmtId, StmtKind,
    StmtNode, VarDecl,
};
use crate::error::{ParseError, ParseResult};
use crate::span::Span;
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    pub(crate) fn parse_unary(&mut self) -> ParseResult<ExprId> {
        let start = self.current_span();
        match self.current_kind() {
            Some(TokenKind::Bang) => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(&self.ast.expr(operand).span);
                Ok(self.push_expr(ExprKind::Unary { op: crate::ast::UnaryOp::Not, operand }, span))
            }
            Some(TokenKind::Minus) => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(&self.ast.expr(operand).span);
                Ok(self.push_expr(ExprKind::Unary { op: crate::ast::UnaryOp::Negate, operand }, span))
            }
            Some(TokenKind::Plus) => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(&self.ast.expr(operand).span);
                Ok(self.push_expr(ExprKind::Unary { op: crate::ast::UnaryOp::Plus, operand }, span))
            }
            Some(TokenKind::Tilde) => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(&self.ast.expr(operand).span);
                Ok(self.push_expr(ExprKind::Unary { op: crate::ast::UnaryOp::BitNot, operand }, span))
            }
            Some(TokenKind::PlusPlus) => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(&self.ast.expr(operand).span);
                Ok(self.push_expr(ExprKind::Unary { op: crate::ast::UnaryOp::PreIncrement, operand }, span))
            }
            Some(TokenKind::MinusMinus) => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(&self.ast.expr(operand).span);
                Ok(self.push_expr(ExprKind::Unary { op: crate::ast::UnaryOp::PreDecrement, operand }, span))
            }
            // `(Type) expr` cast — disambiguated from a parenthesised
            // expression by lookahead.
            Some(TokenKind::LeftParen) if self.is_cast_ahead() => self.parse_cast(),
            _ => self.parse_postfix(),
        }
    }

    /// Probe `( Type )` followed by something that can start an expression
    /// expr` vs parenthesised expression").
    fn is_cast_ahead(&mut self) -> bool {
        self.lookahead(|p| {
            p.advance(); // (
            if !p.parse_type_name_quiet() {
                return false;
            }
            if !p.check(&TokenKind::RightParen) {
                return false;
            }
            p.advance(); // )
            matches!(
                p.current_kind(),
                Some(
                    TokenKind::Identifier
                        | TokenKind::IntLiteral
                        | TokenKind::LongLiteral
                        | TokenKind::DoubleLiteral
                        | TokenKind::DecimalLiteral
                        | TokenKind::DoubleQuote
                        | TokenKind::LeftParen
                        | TokenKind::Minus
                        | TokenKind::Bang
                        | TokenKind::KwNew
                )
            )
        })
    }

    /// Consume a type name (built-in keyword or dotted class path, optional
    /// trailing `[]`) without building any AST — used only to probe ahead.
    fn parse_type_name_quiet(&mut self) -> bool {
        let is_builtin = matches!(
            self.current_kind(),
            Some(
                TokenKind::KwBoolean
                    | TokenKind::KwByte
                    | TokenKind::KwInt
                    | TokenKind::KwLong
                    | TokenKind::KwDouble
                    | TokenKind::KwDecimal
                    | TokenKind::KwString
                    | TokenKind::KwMap
                    | TokenKind::KwList
                    | TokenKind::KwObject
            )
        );
        if is_builtin {
            self.advance();
        } else if self.check(&TokenKind::Identifier) {
            self.advance();
            while self.check(&TokenKind::Dot) {
                self.advance();
                if !self.match_token(&TokenKind::Identifier) {
                    return false;
                }
            }
        } else {
            return false;
        }
        while self.check(&TokenKind::LeftBracket) && self.peek_kind() == Some(TokenKind::RightBracket) {
            self.advance();
            self.advance();
        }
        true
    }

    fn parse_cast(&mut self) -> ParseResult<ExprId> {
        let start = self.current_span();
        self.expect(TokenKind::LeftParen)?;
        let ty = self.parse_declared_type()?;
        self.expect(TokenKind::RightParen)?;
        let operand = self.parse_unary()?;
        let span = start.merge(&self.ast.expr(operand).span);
        // Casts are modelled as a method-call-like convert node; the actual
        // conversion semantics are applied by the
        // method emitter once the resolver has attached concrete types.
        Ok(self.push_expr(
            ExprKind::MethodCall {
                parent: operand,
                name: format!("@cast:{}", Self::declared_type_tag(&ty)),
                args: Vec::new(),
                optional: false,
            },
            span,
        ))
    }

    fn declared_type_tag(ty: &DeclaredType) -> String {
        match ty {
            DeclaredType::Def => "def".into(),
            DeclaredType::Var => "var".into(),
            DeclaredType::Boolean => "boolean".into(),
            DeclaredType::Byte => "byte".into(),
            DeclaredType::Int => "int".into(),
            DeclaredType::Long => "long".into(),
            DeclaredType::Double => "double".into(),
            DeclaredType::Decimal => "Decimal".into(),
            DeclaredType::String => "String".into(),
            DeclaredType::Map => "Map".into(),
            DeclaredType::List => "List".into(),
            DeclaredType::Object => "Object".into(),
            DeclaredType::ClassPath(p) => p.join("."),
            DeclaredType::Array(inner) => format!("{}[]", Self::declared_type_tag(inner)),
        }
    }

    pub(crate) fn parse_declared_type(&mut self) -> ParseResult<DeclaredType> {
        let mut ty = match self.current_kind() {
            Some(TokenKind::KwDef) => {
                self.advance();
                DeclaredType::Def
            }
            Some(TokenKind::KwVar) => {
                self.advance();
                DeclaredType::Var
            }
            Some(TokenKind::KwBoolean) => {
                self.advance();
                DeclaredType::Boolean
            }
            Some(TokenKind::KwByte) => {
                self.advance();
                DeclaredType::Byte
            }
            Some(TokenKind::KwInt) => {
                self.advance();
                DeclaredType::Int
            }
            Some(TokenKind::KwLong) => {
                self.advance();
                DeclaredType::Long
            }
            Some(TokenKind::KwDouble) => {
                self.advance();
                DeclaredType::Double
            }
            Some(TokenKind::KwDecimal) => {
                self.advance();
                DeclaredType::Decimal
            }
            Some(TokenKind::KwString) => {
                self.advance();
                DeclaredType::String
            }
            Some(TokenKind::KwMap) => {
                self.advance();
                DeclaredType::Map
            }
            Some(TokenKind::KwList) => {
                self.advance();
                DeclaredType::List
            }
            Some(TokenKind::KwObject) => {
                self.advance();
                DeclaredType::Object
            }
            Some(TokenKind::Identifier) => {
                let mut path = vec![self.current_text().to_string()];
                self.advance();
                while self.check(&TokenKind::Dot) && self.peek_kind() == Some(TokenKind::Identifier) {
                    self.advance();
                    path.push(self.current_text().to_string());
                    self.advance();
                }
                DeclaredType::ClassPath(path)
            }
            _ => {
                return Err(ParseError::invalid_syntax("expected a type", self.current_span()));
            }
        };
        while self.check(&TokenKind::LeftBracket) && self.peek_kind() == Some(TokenKind::RightBracket) {
            self.advance();
            self.advance();
            ty = DeclaredType::Array(Box::new(ty));
        }
        Ok(ty)
    }

    // ==================== Declarations ====================

    /// `def (x, y) = expr` multi-assign, a single `Type name [= init]`, or
    /// several comma-separated declarations sharing one type.
    pub(crate) fn parse_decl_statement(&mut self) -> ParseResult<StmtId> {
        let start = self.current_span();
        if matches!(self.current_kind(), Some(TokenKind::KwDef) | Some(TokenKind::KwVar))
            && self.peek_kind() == Some(TokenKind::LeftParen)
        {
            return self.parse_multi_assign_decl();
        }

        let ty = self.parse_declared_type()?;
        let mut decls = Vec::new();
        loop {
            let name_span = self.current_span();
            let name = self.expect(TokenKind::Identifier)?.text.to_string();

            // `Type name(params) { body }` — a function declaration, not a
            // variable declaration.
            if self.check(&TokenKind::LeftParen) {
                let fun_stmt = self.parse_function_decl_rest(name, ty, name_span)?;
                return Ok(fun_stmt);
            }

            let mut decl = VarDecl::new(name.clone(), ty.clone(), name_span);
            if matches!(ty, DeclaredType::Var) && !self.check(&TokenKind::Equal) {
                return Err(ParseError::invalid_syntax(
                    "'var' requires an initialiser",
                    self.current_span(),
                ));
            }
            if self.match_token(&TokenKind::Equal) {
                let saved = self.ignore_eol;
                self.ignore_eol = true;
                let init = self.parse_expression()?;
                self.ignore_eol = saved;
                decl.initializer = Some(init);
            }
            let decl_id = self.ast.push_var_decl(decl);
            let span = name_span.merge(&self.previous_span());
            decls.push(self.ast.push_stmt(StmtNode { kind: StmtKind::VarDecl(decl_id), span }));

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        if decls.len() == 1 {
            Ok(decls[0])
        } else {
            let span = start.merge(&self.previous_span());
            Ok(self.ast.push_stmt(StmtNode { kind: StmtKind::Block(decls), span }))
        }
    }

    fn parse_function_decl_rest(
        &mut self,
        name: String,
        return_type: DeclaredType,
        name_span: Span,
    ) -> ParseResult<StmtId> {
        self.expect(TokenKind::LeftParen)?;
        let params = self.parse_param_list()?;
        self.expect(TokenKind::RightParen)?;
        self.function_stack.push(name.clone());
        let body = self.parse_block()?;
        self.function_stack.pop();
        let span = name_span.merge(&self.previous_span());
        let fun = FunDecl {
            name,
            params,
            return_type,
            body,
            is_closure: false,
            implicit_it_param: false,
            has_wrapper: true,
            is_async: false,
            heap_locals: Vec::new(),
            span,
        };
        let fun_id = self.ast.push_fun_decl(fun);
        Ok(self.ast.push_stmt(StmtNode { kind: StmtKind::FunDecl(fun_id), span }))
    }

    pub(crate) fn parse_param_list(&mut self) -> ParseResult<Vec<crate::ast::VarDeclId>> {
        let mut params = Vec::new();
        if self.check(&TokenKind::RightParen) {
            return Ok(params);
        }
        loop {
            let span = self.current_span();
            let ty = if self.current_kind().map(|k| k.is_type_keyword()).unwrap_or(false)
                && !matches!(self.peek_kind(), Some(TokenKind::Comma) | Some(TokenKind::RightParen) | Some(TokenKind::Equal))
            {
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

    /// `def (x, y) = expr`: binds one synthesised
    /// temp and one declaration per target, each initialised from `temp[i]`.
    fn parse_multi_assign_decl(&mut self) -> ParseResult<StmtId> {
        let start = self.current_span();
        let is_var = matches!(self.current_kind(), Some(TokenKind::KwVar));
        self.advance(); // def | var
        self.expect(TokenKind::LeftParen)?;
        let mut names = Vec::new();
        loop {
            let span = self.current_span();
            let name = self.expect(TokenKind::Identifier)?.text.to_string();
            names.push((name, span));
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;
        self.expect(TokenKind::Equal)?;
        let saved = self.ignore_eol;
        self.ignore_eol = true;
        let value = self.parse_expression()?;
        self.ignore_eol = saved;

        // `var` targets infer their type from the i-th element of a list
        // literal RHS; any other RHS shape is a compile-time error for them.
        if is_var && !matches!(self.ast.expr(value).kind, ExprKind::ListLiteral(_)) {
            return Err(ParseError::MultiAssignRhsNotList { span: self.ast.expr(value).span });
        }

        let temp_span = start;
        let mut temp_decl = VarDecl::new("__multiAssignTemp", DeclaredType::Def, temp_span);
        temp_decl.initializer = Some(value);
        let temp = self.ast.push_var_decl(temp_decl);

        let mut decl_stmts = Vec::new();
        for (i, (name, span)) in names.into_iter().enumerate() {
            let ty = if is_var { DeclaredType::Var } else { DeclaredType::Def };
            let mut decl = VarDecl::new(name, ty, span);
            let index_lit = self.push_expr(ExprKind::Literal(ConstValue::Int(i as i32)), span);
            let temp_ref = self.push_expr(ExprKind::Identifier(temp), span);
            let indexed = self.push_expr(
                ExprKind::FieldAccess {
                    parent: temp_ref,
                    field: index_lit,
                    kind: crate::ast::AccessKind::Bracket,
                    create_if_missing: false,
                },
                span,
            );
            decl.initializer = Some(indexed);
            let decl_id = self.ast.push_var_decl(decl);
            decl_stmts.push(self.ast.push_stmt(StmtNode { kind: StmtKind::VarDecl(decl_id), span }));
        }

        let span = start.merge(&self.previous_span());
        let mut stmts = vec![self.ast.push_stmt(StmtNode { kind: StmtKind::VarDecl(temp), span })];
        stmts.extend(decl_stmts);
        Ok(self.ast.push_stmt(StmtNode { kind: StmtKind::Block(stmts), span }))
    }

    // ==================== Literals, identifiers, new/instanceof ====================

    pub(crate) fn parse_primary(&mut self) -> ParseResult<ExprId> {
        let start = self.current_span();
        match self.current_kind() {
            Some(TokenKind::IntLiteral) => {
                let text = self.current_text().replace('_', "");
                self.advance();
                let v: i32 = text.parse().map_err(|_| ParseError::InvalidNumber { literal: text.clone(), span: start })?;
                Ok(self.push_expr(ExprKind::Literal(ConstValue::Int(v)), start))
            }
            Some(TokenKind::LongLiteral) => {
                let text = self.current_text().trim_end_matches(['l', 'L']).replace('_', "");
                self.advance();
                let v: i64 = text.parse().map_err(|_| ParseError::InvalidNumber { literal: text.clone(), span: start })?;
                Ok(self.push_expr(ExprKind::Literal(ConstValue::Long(v)), start))
            }
            Some(TokenKind::DoubleLiteral) => {
                let text = self.current_text().trim_end_matches(['d', 'D']).replace('_', "");
                self.advance();
                let v: f64 = text.parse().map_err(|_| ParseError::InvalidNumber { literal: text.clone(), span: start })?;
                Ok(self.push_expr(ExprKind::Literal(ConstValue::Double(v)), start))
            }
            Some(TokenKind::DecimalLiteral) => {
                let text = self.current_text().to_string();
                self.advance();
                Ok(self.push_expr(ExprKind::Literal(ConstValue::String(text)), start))
            }
            Some(TokenKind::KwTrue) => {
                self.advance();
                Ok(self.push_expr(ExprKind::Literal(ConstValue::Boolean(true)), start))
            }
            Some(TokenKind::KwFalse) => {
                self.advance();
                Ok(self.push_expr(ExprKind::Literal(ConstValue::Boolean(false)), start))
            }
            Some(TokenKind::KwNull) => {
                self.advance();
                Ok(self.push_expr(ExprKind::Literal(ConstValue::Null), start))
            }
            Some(TokenKind::DoubleQuote) => self.parse_expr_string(),
            Some(TokenKind::RegexStart) => self.parse_bare_regex_literal(),
            // A `/` at the start of a primary expression is a bare regex
            // literal, not division — re-pull it with the regex hint armed
            // `).
            Some(TokenKind::Slash) => {
                let slash_start = start.start;
                self.lexer.start_regex();
                self.lexer.restart_from(slash_start);
                self.current = None;
                self.advance();
                self.parse_bare_regex_literal()
            }
            Some(TokenKind::CaptureIdentifier) => {
                let text = self.current_text();
                let n: u32 = text.trim_start_matches('$').parse().unwrap_or(0);
                self.advance();
                Ok(self.push_expr(ExprKind::CaptureIdentifier(n), start))
            }
            Some(TokenKind::KwNew) => self.parse_new(),
            Some(TokenKind::KwPrint) | Some(TokenKind::KwPrintln) => self.parse_print(),
            Some(TokenKind::KwDie) => self.parse_die(),
            Some(TokenKind::KwEval) => self.parse_eval(),
            Some(TokenKind::KwSleep) => self.parse_sleep(),
            Some(TokenKind::KwSwitch) => self.parse_switch(),
            Some(TokenKind::LeftBracket) => self.parse_list_or_map_literal(),
            Some(TokenKind::LeftBrace) => self.parse_closure_or_block_expr(),
            Some(TokenKind::LeftParen) => self.parse_paren_expr_or_tuple(),
            Some(TokenKind::Identifier) => {
                let name = self.current_text().to_string();
                self.advance();
                Ok(self.push_expr(ExprKind::UnresolvedIdentifier(name), start))
            }
            _ => Err(ParseError::unexpected_token(
                self.current_text(),
                "an expression",
                self.current_span(),
            )),
        }
    }

    fn parse_new(&mut self) -> ParseResult<ExprId> {
        let start = self.current_span();
        self.expect(TokenKind::KwNew)?;
        let mut path = vec![self.expect(TokenKind::Identifier)?.text.to_string()];
        while self.check(&TokenKind::Dot) && self.peek_kind() == Some(TokenKind::Identifier) {
            self.advance();
            path.push(self.expect(TokenKind::Identifier)?.text.to_string());
        }
        let args = if self.match_token(&TokenKind::LeftParen) {
            let a = self.parse_arg_list()?;
            self.expect(TokenKind::RightParen)?;
            a
        } else {
            Vec::new()
        };
        let span = start.merge(&self.previous_span());
        Ok(self.push_expr(ExprKind::New { class_path: path, args }, span))
    }

    pub(crate) fn parse_arg_list(&mut self) -> ParseResult<Vec<Arg>> {
        let mut args = Vec::new();
        let saved = self.ignore_eol;
        self.ignore_eol = true;
        if !self.check(&TokenKind::RightParen) {
            loop {
                let is_spread = self.match_token(&TokenKind::Ellipsis);
                // `name: expr` named argument — only when followed by a colon
                // and not ambiguous with a ternary/map-key-like expression.
                let name = if self.check(&TokenKind::Identifier) && self.peek_kind() == Some(TokenKind::Colon) {
                    let n = self.current_text().to_string();
                    self.advance();
                    self.advance();
                    Some(n)
                } else {
                    None
                };
                let value = self.parse_expression()?;
                args.push(Arg { name, value, is_spread });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.ignore_eol = saved;
        Ok(args)
    }

    fn parse_print(&mut self) -> ParseResult<ExprId> {
        let start = self.current_span();
        let newline = matches!(self.current_kind(), Some(TokenKind::KwPrintln));
        self.advance();
        let arg = if self.at_statement_end() {
            let s = self.current_span();
            self.push_expr(ExprKind::Literal(ConstValue::String(String::new())), s)
        } else {
            self.parse_expression()?
        };
        let span = start.merge(&self.previous_span());
        Ok(self.push_expr(ExprKind::Print { arg, newline }, span))
    }

    fn parse_die(&mut self) -> ParseResult<ExprId> {
        let start = self.current_span();
        self.expect(TokenKind::KwDie)?;
        let arg = self.parse_expression()?;
        let span = start.merge(&self.previous_span());
        Ok(self.push_expr(ExprKind::Die { arg }, span))
    }

    fn parse_eval(&mut self) -> ParseResult<ExprId> {
        let start = self.current_span();
        self.expect(TokenKind::KwEval)?;
        self.expect(TokenKind::LeftParen)?;
        let source = self.parse_expression()?;
        self.expect(TokenKind::RightParen)?;
        let span = start.merge(&self.previous_span());
        Ok(self.push_expr(ExprKind::Eval { source }, span))
    }

    fn parse_sleep(&mut self) -> ParseResult<ExprId> {
        let start = self.current_span();
        self.expect(TokenKind::KwSleep)?;
        self.expect(TokenKind::LeftParen)?;
        let duration = self.parse_expression()?;
        let result = if self.match_token(&TokenKind::Comma) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenKind::RightParen)?;
        let span = start.merge(&self.previous_span());
        Ok(self.push_expr(ExprKind::Sleep { duration, result }, span))
    }

    fn parse_paren_expr_or_tuple(&mut self) -> ParseResult<ExprId> {
        let start = self.current_span();
        self.expect(TokenKind::LeftParen)?;
        let saved = self.ignore_eol;
        self.ignore_eol = true;
        let mut items = vec![self.parse_expression()?];
        let mut was_tuple = false;
        while self.match_token(&TokenKind::Comma) {
            was_tuple = true;
            items.push(self.parse_expression()?);
        }
        self.ignore_eol = saved;
        self.expect(TokenKind::RightParen)?;
        let span = start.merge(&self.previous_span());
        if was_tuple {
            // Transient shape only: consumed by `parse_assignment` and
            // rewritten into `MultiAssign` when followed by `=`
            // . Never reaches the emitter as-is.
            Ok(self.ast.push_expr(ExprNode {
                kind: ExprKind::ListLiteral(items),
                span,
                flags: ExprFlags { is_result_used: true, was_nested: true, ..ExprFlags::default() },
            }))
        } else {
            let inner = items.pop().unwrap();
            self.ast.expr_mut(inner).flags.was_nested = true;
            Ok(self.push_expr(ExprKind::Nested(inner), span))
        }
    }

    fn parse_instanceof_rhs(&mut self) -> ParseResult<Vec<String>> {
        let mut path = vec![self.expect(TokenKind::Identifier)?.text.to_string()];
        while self.check(&TokenKind::Dot) && self.peek_kind() == Some(TokenKind::Identifier) {
            self.advance();
            path.push(self.expect(TokenKind::Identifier)?.text.to_string());
        }
        Ok(path)
    }

    pub(crate) fn maybe_parse_instanceof(&mut self, lhs: ExprId) -> ParseResult<ExprId> {
        let start = self.ast.expr(lhs).span;
        self.advance(); // instanceof
        let class_path = self.parse_instanceof_rhs()?;
        let span = start.merge(&self.previous_span());
        Ok(self.push_expr(ExprKind::InstanceOf { expr: lhs, class_path }, span))
    }

    // ==================== switch ====================

    /// `switch (subject) { case pattern[, pattern...] [if guard] -> body ... }`
    /// Duplicate literal patterns are rejected at parse time.
    fn parse_switch(&mut self) -> ParseResult<ExprId> {
        let start = self.current_span();
        self.expect(TokenKind::KwSwitch)?;
        self.expect(TokenKind::LeftParen)?;
        let saved = self.ignore_eol;
        self.ignore_eol = true;
        let subject = self.parse_expression()?;
        self.ignore_eol = saved;
        self.expect(TokenKind::RightParen)?;
        self.expect(TokenKind::LeftBrace)?;
        self.skip_separators();

        let mut cases = Vec::new();
        let mut default = None;
        let mut seen_literals: Vec<(crate::ast::ConstValue, Span)> = Vec::new();

        while self.match_token(&TokenKind::KwCase) {
            let case_start = self.previous_span();
            let mut patterns = vec![self.parse_switch_pattern()?];
            while self.match_token(&TokenKind::Comma) {
                patterns.push(self.parse_switch_pattern()?);
            }
            for pattern in &patterns {
                if let crate::ast::SwitchPattern::Literal(value) = pattern {
                    if let Some((_, first_span)) =
                        seen_literals.iter().find(|(seen, _)| seen == value)
                    {
                        return Err(ParseError::DuplicateSwitchCase {
                            span: case_start,
                            first_span: *first_span,
                        });
                    }
                    seen_literals.push((value.clone(), case_start));
                }
            }
            let guard = if self.match_token(&TokenKind::KwIf) {
                self.expect(TokenKind::LeftParen)?;
                let g = self.parse_expression()?;
                self.expect(TokenKind::RightParen)?;
                Some(g)
            } else {
                None
            };
            self.expect(TokenKind::Arrow)?;
            let body = self.parse_expression()?;
            let span = case_start.merge(&self.ast.expr(body).span);
            cases.push(crate::ast::SwitchCase { patterns, guard, body, span });
            self.skip_separators();
        }

        // A trailing `default -> expr` arm, recognised as a bare wildcard
        // case written without `case`.
        if self.check(&TokenKind::Identifier) && self.current_text() == "default" {
            self.advance();
            self.expect(TokenKind::Arrow)?;
            default = Some(self.parse_expression()?);
            self.skip_separators();
        }

        self.expect(TokenKind::RightBrace)?;
        let span = start.merge(&self.previous_span());
        Ok(self.push_expr(ExprKind::Switch { subject, cases, default }, span))
    }

    fn parse_switch_pattern(&mut self) -> ParseResult<crate::ast::SwitchPattern> {
        use crate::ast::{ConstValue, SwitchPattern};
        match self.current_kind() {
            Some(TokenKind::Identifier) if self.current_text() == "_" => {
                self.advance();
                Ok(SwitchPattern::Wildcard)
            }
            Some(TokenKind::IntLiteral) => {
                let text = self.current_text().replace('_', "");
                self.advance();
                let v: i32 = text
                    .parse()
                    .map_err(|_| ParseError::InvalidNumber { literal: text.clone(), span: self.previous_span() })?;
                Ok(SwitchPattern::Literal(ConstValue::Int(v)))
            }
            Some(TokenKind::KwTrue) => {
                self.advance();
                Ok(SwitchPattern::Literal(ConstValue::Boolean(true)))
            }
            Some(TokenKind::KwFalse) => {
                self.advance();
                Ok(SwitchPattern::Literal(ConstValue::Boolean(false)))
            }
            Some(TokenKind::KwNull) => {
                self.advance();
                Ok(SwitchPattern::Literal(ConstValue::Null))
            }
            Some(TokenKind::DoubleQuote) => {
                let expr = self.parse_expr_string()?;
                match &self.ast.expr(expr).kind {
                    ExprKind::ExprString(parts) if parts.len() == 1 => match &parts[0] {
                        crate::ast::StringPart::Literal(s) => Ok(SwitchPattern::Literal(ConstValue::String(s.clone()))),
                        crate::ast::StringPart::Interpolation(_) => Ok(SwitchPattern::ExprPattern(expr)),
                    },
                    _ => Ok(SwitchPattern::ExprPattern(expr)),
                }
            }
            Some(TokenKind::CaptureIdentifier) => {
                let text = self.current_text();
                let n: u32 = text.trim_start_matches('$').parse().unwrap_or(0);
                self.advance();
                Ok(SwitchPattern::CaptureGroup(n))
            }
            Some(TokenKind::LeftBracket) => {
                self.advance();
                let mut items = Vec::new();
                if !self.check(&TokenKind::RightBracket) {
                    loop {
                        items.push(self.parse_switch_pattern()?);
                        if !self.match_token(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RightBracket)?;
                Ok(SwitchPattern::List(items))
            }
            Some(TokenKind::Identifier) if self.peek_kind() == Some(TokenKind::LeftParen) => {
                let mut path = vec![self.current_text().to_string()];
                self.advance();
                while self.check(&TokenKind::Dot) && self.peek_kind() == Some(TokenKind::Identifier) {
                    self.advance();
                    path.push(self.expect(TokenKind::Identifier)?.text.to_string());
                }
                self.expect(TokenKind::LeftParen)?;
                let mut args = Vec::new();
                if !self.check(&TokenKind::RightParen) {
                    loop {
                        args.push(self.parse_switch_pattern()?);
                        if !self.match_token(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RightParen)?;
                Ok(SwitchPattern::TypePattern { class_path: path, ctor_args: Some(args) })
            }
            Some(TokenKind::Identifier) => {
                let name = self.current_text().to_string();
                self.advance();
                if name.chars().next().map(|c| c.is_uppercase()).unwrap_or(false) {
                    Ok(SwitchPattern::TypePattern { class_path: vec![name], ctor_args: None })
                } else {
                    Ok(SwitchPattern::Binding(name))
                }
            }
            _ => Err(ParseError::unexpected_token(self.current_text(), "a switch pattern", self.current_span())),
        }
    }
}
