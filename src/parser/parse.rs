//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the parse entry points.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: Parsing struct and function declarations, and types
//! - `statements`: Parsing statements and wrapping them in steppoints
//! - `expressions`: Parsing expressions, one method per precedence level
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token};
use rustc_hash::FxHashSet;
use std::fmt;

/// Placeholder span for tokens built only to compare discriminants
pub(crate) const ANY: Span = Span { start: 0, end: 0 };

/// Parser error type
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser for the C subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Struct names declared so far; a bare struct name starts a declaration
    pub(crate) struct_names: FxHashSet<String>,
    lines: LineIndex,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            struct_names: FxHashSet::default(),
            lines: LineIndex::new(source),
        })
    }

    /// Parse the entire program (top-level declarations)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            let decl = self.parse_top_level_declaration()?;
            program.nodes.push(decl);
        }

        Ok(program)
    }

    /// Parse exactly one function definition and nothing else
    pub fn parse_function(&mut self) -> Result<FunctionDecl, ParseError> {
        let function = self.parse_function_definition()?;
        self.expect_end("after function")?;
        Ok(function)
    }

    /// Parse exactly one statement and nothing else
    pub fn parse_single_statement(&mut self) -> Result<NodeRef, ParseError> {
        let stmt = self.parse_statement()?;
        self.expect_end("after statement")?;
        Ok(stmt)
    }

    /// Parse exactly one expression and nothing else
    pub fn parse_single_expression(&mut self) -> Result<NodeRef, ParseError> {
        let expr = self.parse_expression()?;
        self.expect_end("after expression")?;
        Ok(expr)
    }

    // ===== Helper methods =====

    /// Whether the upcoming tokens start a type (and so a declaration)
    pub(crate) fn is_type_start(&self) -> bool {
        match self.peek() {
            Token::Int(_)
            | Token::Char(_)
            | Token::Float(_)
            | Token::Str(_)
            | Token::Void(_)
            | Token::Struct(_) => true,
            Token::Ident(name, _) => {
                self.struct_names.contains(name)
                    && matches!(
                        self.peek_ahead(1),
                        Some(Token::Ident(_, _)) | Some(Token::Star(_))
                    )
            }
            _ => false,
        }
    }

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_token(&self) -> Token {
        self.tokens[self.position].clone()
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    /// Span starting at the current token
    pub(crate) fn current_span(&self) -> Span {
        self.peek().span()
    }

    /// Span from `start` to the end of the last consumed token
    pub(crate) fn span_since(&self, start: Span) -> Span {
        start.to(self.previous().span())
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.lines.locate(self.current_span().start)
    }

    pub(crate) fn error_at(&self, span: Span, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            location: self.lines.locate(span.start),
        }
    }

    pub(crate) fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError {
                message: format!("{}, found {}", message, self.peek()),
                location: self.current_location(),
            })
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&Token::LParen(ANY), &format!("Expected '(' {ctx}"))
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&Token::RParen(ANY), &format!("Expected ')' {ctx}"))
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&Token::LBrace(ANY), &format!("Expected '{{' {ctx}"))
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&Token::RBrace(ANY), &format!("Expected '}}' {ctx}"))
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&Token::Semicolon(ANY), &format!("Expected ';' {ctx}"))
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            Err(ParseError {
                message: format!("Expected identifier, found {}", self.peek()),
                location: self.current_location(),
            })
        }
    }

    fn expect_end(&self, ctx: &str) -> Result<(), ParseError> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(ParseError {
                message: format!("Unexpected {} {}", self.peek(), ctx),
                location: self.current_location(),
            })
        }
    }
}
