//! Declaration parsing implementation
//!
//! This module handles parsing of top-level declarations:
//!
//! - Struct definitions: `struct Name { ... };` and `class Name { ... };`
//! - Function definitions: `type name(params) { ... }`
//! - Type parsing: base types, struct names, pointers
//! - Function parameters and struct fields
//!
//! # Grammar
//!
//! ```text
//! declaration  ::= struct_def | function_def
//! struct_def   ::= ("struct" | "class") identifier "{" member* "}" ";"
//! member       ::= ("public" | "private") ":" | type identifier array_dims ";"
//! function_def ::= type identifier "(" params ")" block
//! type         ::= (base_type | "struct" identifier | struct_name) "*"*
//! array_dims   ::= ("[" int_literal "]")*
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser, ANY};
use std::rc::Rc;

impl Parser {
    /// Parse a top-level declaration (function or struct definition)
    pub(crate) fn parse_top_level_declaration(&mut self) -> Result<TopLevel, ParseError> {
        // Distinguish:
        //   struct Name { ... };           <- struct definition
        //   struct Name* func_name(...) .. <- function with struct return type
        let is_struct_def = match self.peek() {
            Token::Class(_) => true,
            Token::Struct(_) => matches!(
                (self.peek_ahead(1), self.peek_ahead(2)),
                (Some(Token::Ident(_, _)), Some(Token::LBrace(_)))
            ),
            _ => false,
        };

        if is_struct_def {
            Ok(TopLevel::Struct(self.parse_struct_definition()?))
        } else {
            Ok(TopLevel::Function(self.parse_function_definition()?))
        }
    }

    /// Parse struct definition: struct Name { fields };
    pub(crate) fn parse_struct_definition(&mut self) -> Result<StructDecl, ParseError> {
        let start = self.current_span();
        self.advance(); // consume 'struct' or 'class'

        let name = self.expect_identifier()?;
        // Registered before the body so fields can point back at the struct
        self.struct_names.insert(name.clone());

        self.expect_lbrace("after struct name")?;

        let mut fields = Vec::new();
        while !self.check(&Token::RBrace(ANY)) && !self.is_at_end() {
            if self.match_token(&Token::Public(ANY)) || self.match_token(&Token::Private(ANY)) {
                self.expect_token(&Token::Colon(ANY), "Expected ':' after access specifier")?;
                continue;
            }

            let ty = self.parse_type()?;
            let field_name = self.expect_identifier()?;
            let ty = self.parse_array_dims(ty)?;
            self.expect_semicolon("after struct field")?;

            fields.push(FieldDecl {
                name: field_name,
                ty,
            });
        }

        self.expect_rbrace("after struct fields")?;
        self.expect_semicolon("after struct definition")?;

        Ok(StructDecl {
            name,
            fields,
            span: self.span_since(start),
        })
    }

    /// Parse function definition: type name(params) { body }
    pub(crate) fn parse_function_definition(&mut self) -> Result<FunctionDecl, ParseError> {
        let start = self.current_span();
        let return_type = self.parse_type()?;
        let name = self.expect_identifier()?;

        self.expect_lparen("after function name")?;
        let params = self.parse_parameter_list()?;
        self.expect_rparen("after parameters")?;
        let span = self.span_since(start);

        self.expect_lbrace("before function body")?;
        let body = self.parse_block_statements()?;
        self.expect_rbrace("after function body")?;

        Ok(FunctionDecl {
            name,
            return_type,
            params,
            body: Rc::new(Node::Block(body.into())),
            span,
        })
    }

    /// Parse parameter list: (type name, type name, ...)
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<ParamDecl>, ParseError> {
        let mut params = Vec::new();

        if self.check(&Token::RParen(ANY)) {
            return Ok(params);
        }

        // Special case: (void) means no parameters
        if self.check(&Token::Void(ANY))
            && matches!(self.peek_ahead(1), Some(Token::RParen(_)))
        {
            self.advance(); // consume 'void'
            return Ok(params);
        }

        loop {
            let ty = self.parse_type()?;
            let name = self.expect_identifier()?;
            params.push(ParamDecl { name, ty });

            if !self.match_token(&Token::Comma(ANY)) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse type: (base_type | struct Name | Name) [*]*
    pub(crate) fn parse_type(&mut self) -> Result<TypeSpec, ParseError> {
        let start = self.current_span();

        let name = match self.peek_token() {
            Token::Struct(_) => {
                self.advance();
                TypeName::Struct(self.expect_identifier()?)
            }
            Token::Ident(name, _) if self.struct_names.contains(&name) => {
                self.advance();
                TypeName::Struct(name)
            }
            token => match base_type(&token) {
                Some(base) => {
                    self.advance();
                    TypeName::Base(base)
                }
                None => {
                    return Err(self.error_at(start, format!("Expected type, found {}", token)));
                }
            },
        };

        let mut ty = TypeSpec::new(name, start);
        while self.match_token(&Token::Star(ANY)) {
            ty = ty.with_pointer();
        }
        ty.span = self.span_since(start);

        Ok(ty)
    }

    /// Parse trailing array dimensions: [N][M]...
    pub(crate) fn parse_array_dims(&mut self, mut ty: TypeSpec) -> Result<TypeSpec, ParseError> {
        while self.match_token(&Token::LBracket(ANY)) {
            match self.peek_token() {
                Token::IntLiteral(n, _) if n >= 0 => {
                    self.advance();
                    ty = ty.with_array(n as usize);
                }
                _ => {
                    return Err(ParseError {
                        message: "Array size must be a constant integer".to_string(),
                        location: self.current_location(),
                    });
                }
            }
            self.expect_token(&Token::RBracket(ANY), "Expected ']' after array size")?;
        }
        Ok(ty)
    }
}

/// Base type named by a keyword token
pub(crate) fn base_type(token: &Token) -> Option<BaseType> {
    match token {
        Token::Int(_) => Some(BaseType::Int),
        Token::Char(_) => Some(BaseType::Char),
        Token::Float(_) => Some(BaseType::Float),
        Token::Str(_) => Some(BaseType::Str),
        Token::Void(_) => Some(BaseType::Void),
        _ => None,
    }
}
