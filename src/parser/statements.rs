//! Statement parsing implementation
//!
//! This module handles parsing of all statement types:
//!
//! - Variable definitions: `int x;`, `int a[3];`, `Node* p = NULL;`
//! - Loops: `while (cond) stmt`
//! - Jump statements: `return expr?;`
//! - Compound statements: `{ ... }`
//! - Expression statements and the empty statement `;`
//!
//! # Grammar
//!
//! ```text
//! statement ::= while_stmt | block | var_def | return_stmt | expr_stmt | ";"
//! ```
//!
//! # Steppoints
//!
//! Every simple statement, and every `while` condition, is wrapped in a
//! [`Node::Steppoint`] covering exactly its source text. Blocks and loops are
//! not wrapped themselves; their parts are.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser, ANY};
use std::rc::Rc;

impl Parser {
    /// Parse block statements (inside braces, excluding the braces themselves)
    pub(crate) fn parse_block_statements(&mut self) -> Result<Vec<NodeRef>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(&Token::RBrace(ANY)) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse a statement
    pub fn parse_statement(&mut self) -> Result<NodeRef, ParseError> {
        let start = self.current_span();

        if self.match_token(&Token::While(ANY)) {
            return self.parse_while_statement();
        }

        if self.match_token(&Token::LBrace(ANY)) {
            let statements = self.parse_block_statements()?;
            self.expect_rbrace("after block")?;
            return Ok(Rc::new(Node::Block(statements.into())));
        }

        let stmt = if self.match_token(&Token::Semicolon(ANY)) {
            Node::Nop
        } else if self.match_token(&Token::Return(ANY)) {
            self.parse_return_statement()?
        } else if self.is_type_start() {
            self.parse_variable_definition()?
        } else {
            let expr = self.parse_expression()?;
            self.expect_semicolon("after expression")?;
            return Ok(self.steppoint(start, expr));
        };

        Ok(self.steppoint(start, Rc::new(stmt)))
    }

    /// Wrap `stmt` in a steppoint spanning from `start` to the last consumed token
    fn steppoint(&self, start: Span, stmt: NodeRef) -> NodeRef {
        Rc::new(Node::Steppoint {
            span: self.span_since(start),
            stmt,
        })
    }

    /// Parse return statement (after the `return` keyword)
    fn parse_return_statement(&mut self) -> Result<Node, ParseError> {
        let expr = if self.check(&Token::Semicolon(ANY)) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        self.expect_semicolon("after return")?;

        Ok(Node::Return(expr))
    }

    /// Parse while statement (after the `while` keyword)
    fn parse_while_statement(&mut self) -> Result<NodeRef, ParseError> {
        self.expect_lparen("after 'while'")?;
        let cond_start = self.current_span();
        let cond = self.parse_expression()?;
        let cond = self.steppoint(cond_start, cond);
        self.expect_rparen("after while condition")?;

        let body = self.parse_statement()?;

        Ok(Rc::new(Node::Loop { cond, body }))
    }

    /// Parse variable definition: type name [N]... (= expr)? ;
    fn parse_variable_definition(&mut self) -> Result<Node, ParseError> {
        let ty = self.parse_type()?;
        let name = self.expect_identifier()?;
        let ty = self.parse_array_dims(ty)?;

        // Kept in the tree; the stepper does not evaluate it
        let init = if self.match_token(&Token::Eq(ANY)) {
            Some(self.parse_assignment()?)
        } else {
            None
        };

        self.expect_semicolon("after variable definition")?;

        Ok(Node::Decl { name, ty, init })
    }
}
