//! Class declarations: fields, methods, constructors, `extends`, and nested
//! classes.

use super::Parser;
use crate::ast::{ClassDecl, ClassDeclId, DeclaredType, FunDecl, FunDeclId, VarDecl, VarDeclId};
use crate::error::{ParseError, ParseResult};
use crate::token::TokenKind;

enum ClassMember {
    Field(VarDeclId),
    Method(FunDeclId),
    Inner(ClassDeclId),
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_class_decl(&mut self) -> ParseResult<ClassDeclId> {
        let start = self.current_span();
        self.expect(TokenKind::KwClass)?;
        let name = self.expect(TokenKind::Identifier)?.text.to_string();
        self.class_stack.push(name.clone());

        let base_class = if self.match_token(&TokenKind::KwExtends) {
            Some(self.parse_class_path()?)
        } else {
            None
        };

        self.expect(TokenKind::LeftBrace)?;
        self.skip_separators();
        let mut fields = Vec::new();
        let mut methods = Vec::new();
        let mut inner_classes = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            match self.parse_class_member(&name) {
                Ok(members) => {
                    for m in members {
                        match m {
                            ClassMember::Field(id) => fields.push(id),
                            ClassMember::Method(id) => methods.push(id),
                            ClassMember::Inner(id) => inner_classes.push(id),
                        }
                    }
                }
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
            self.skip_separators();
        }
        self.expect(TokenKind::RightBrace)?;
        self.class_stack.pop();

        let span = start.merge(&self.previous_span());
        Ok(self.ast.push_class_decl(ClassDecl { name, base_class, fields, methods, inner_classes, span }))
    }

    fn parse_class_path(&mut self) -> ParseResult<Vec<String>> {
        let mut path = vec![self.expect(TokenKind::Identifier)?.text.to_string()];
        while self.check(&TokenKind::Dot) && self.peek_kind() == Some(TokenKind::Identifier) {
            self.advance();
            path.push(self.expect(TokenKind::Identifier)?.text.to_string());
        }
        Ok(path)
    }

    fn parse_class_member(&mut self, class_name: &str) -> ParseResult<Vec<ClassMember>> {
        let mut is_static = false;
        let mut is_final = false;
        let mut is_const = false;
        loop {
            match self.current_kind() {
                Some(TokenKind::KwStatic) => {
                    is_static = true;
                    self.advance();
                }
                Some(TokenKind::KwFinal) => {
                    is_final = true;
                    self.advance();
                }
                Some(TokenKind::KwConst) => {
                    is_const = true;
                    self.advance();
                }
                _ => break,
            }
        }
        if is_static && is_final {
            return Err(ParseError::StaticFinalNotAllowed { span: self.current_span() });
        }

        if self.check(&TokenKind::KwClass) {
            let id = self.parse_class_decl()?;
            return Ok(vec![ClassMember::Inner(id)]);
        }

        // `ClassName(args) { body }` — a constructor, which carries no
        // declared return type of its own.
        if self.check(&TokenKind::Identifier)
            && self.current_text() == class_name
            && self.peek_kind() == Some(TokenKind::LeftParen)
        {
            let name_span = self.current_span();
            self.advance();
            let method = self.parse_method_rest(class_name.to_string(), DeclaredType::Object, name_span)?;
            return Ok(vec![ClassMember::Method(method)]);
        }

        let ty = self.parse_declared_type()?;
        let mut out = Vec::new();
        loop {
            let name_span = self.current_span();
            let name = self.expect(TokenKind::Identifier)?.text.to_string();

            if self.check(&TokenKind::LeftParen) {
                let method = self.parse_method_rest(name, ty, name_span)?;
                return Ok(vec![ClassMember::Method(method)]);
            }

            let mut decl = VarDecl::new(name, ty.clone(), name_span);
            decl.roles.is_field = true;
            decl.roles.is_static = is_static;
            decl.roles.is_final = is_final;
            decl.roles.is_const = is_const;
            if self.match_token(&TokenKind::Equal) {
                decl.initializer = Some(self.parse_expression()?);
            }
            out.push(ClassMember::Field(self.ast.push_var_decl(decl)));

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        Ok(out)
    }

    fn parse_method_rest(
        &mut self,
        name: String,
        return_type: DeclaredType,
        name_span: crate::span::Span,
    ) -> ParseResult<FunDeclId> {
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
        Ok(self.ast.push_fun_decl(fun))
    }
}
