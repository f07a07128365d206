//! Expression parsing implementation
//!
//! This module handles parsing of expressions with one recursive descent
//! method per precedence level.
//!
//! # Precedence (loosest first)
//!
//! | Level          | Operators                         | Associativity |
//! |----------------|-----------------------------------|---------------|
//! | comma          | `,`                               | left          |
//! | assignment     | `=` `*=` `/=` `+=` `-=`           | right         |
//! | logical or     | `\|\|`                            | left          |
//! | logical and    | `&&`                              | left          |
//! | bitwise        | `\|`, then `^`, then `&`          | left          |
//! | equality       | `==` `!=`                         | left          |
//! | relational     | `<` `>` `<=` `>=`                 | left          |
//! | shift          | `<<` `>>`                         | left          |
//! | additive       | `+` `-`                           | left          |
//! | multiplicative | `*` `/` `%`                       | left          |
//! | prefix         | `sizeof ++ -- ~ ! - + & * new delete` | right     |
//! | postfix        | call, `[]`, `.`, `->`             | left          |
//! | scope          | `::`                              | left          |
//!
//! `p->f` is desugared to a member access on a dereference of `p`.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::memory::value::Value;
use crate::parser::ast::*;
use crate::parser::declarations::base_type;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser, ANY};
use std::rc::Rc;

fn binary(op: BinOp, left: NodeRef, right: NodeRef) -> NodeRef {
    Rc::new(Node::Binary { op, left, right })
}

impl Parser {
    /// Parse expression (top-level entry point, includes the comma operator)
    pub fn parse_expression(&mut self) -> Result<NodeRef, ParseError> {
        let mut left = self.parse_assignment()?;

        while self.match_token(&Token::Comma(ANY)) {
            let right = self.parse_assignment()?;
            left = binary(BinOp::Comma, left, right);
        }

        Ok(left)
    }

    /// Parse assignment (right-associative)
    pub(crate) fn parse_assignment(&mut self) -> Result<NodeRef, ParseError> {
        let target = self.parse_logical_or()?;

        let op = match self.peek() {
            Token::Eq(_) => BinOp::Assign,
            Token::StarEq(_) => BinOp::MulAssign,
            Token::SlashEq(_) => BinOp::DivAssign,
            Token::PlusEq(_) => BinOp::AddAssign,
            Token::MinusEq(_) => BinOp::SubAssign,
            _ => return Ok(target),
        };
        self.advance();

        let value = self.parse_assignment()?;
        Ok(binary(op, target, value))
    }

    /// Parse one left-associative level: `next (op next)*`
    fn parse_left_assoc(
        &mut self,
        next: fn(&mut Self) -> Result<NodeRef, ParseError>,
        operator: fn(&Token) -> Option<BinOp>,
    ) -> Result<NodeRef, ParseError> {
        let mut left = next(self)?;

        while let Some(op) = operator(self.peek()) {
            self.advance();
            let right = next(self)?;
            left = binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<NodeRef, ParseError> {
        self.parse_left_assoc(Self::parse_logical_and, |t| match t {
            Token::OrOr(_) => Some(BinOp::Or),
            _ => None,
        })
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<NodeRef, ParseError> {
        self.parse_left_assoc(Self::parse_bitwise_or, |t| match t {
            Token::AndAnd(_) => Some(BinOp::And),
            _ => None,
        })
    }

    /// Parse bitwise OR (|)
    fn parse_bitwise_or(&mut self) -> Result<NodeRef, ParseError> {
        self.parse_left_assoc(Self::parse_bitwise_xor, |t| match t {
            Token::Pipe(_) => Some(BinOp::BitOr),
            _ => None,
        })
    }

    /// Parse bitwise XOR (^)
    fn parse_bitwise_xor(&mut self) -> Result<NodeRef, ParseError> {
        self.parse_left_assoc(Self::parse_bitwise_and, |t| match t {
            Token::Caret(_) => Some(BinOp::BitXor),
            _ => None,
        })
    }

    /// Parse bitwise AND (&)
    fn parse_bitwise_and(&mut self) -> Result<NodeRef, ParseError> {
        self.parse_left_assoc(Self::parse_equality, |t| match t {
            Token::Amp(_) => Some(BinOp::BitAnd),
            _ => None,
        })
    }

    /// Parse equality (==, !=)
    fn parse_equality(&mut self) -> Result<NodeRef, ParseError> {
        self.parse_left_assoc(Self::parse_relational, |t| match t {
            Token::EqEq(_) => Some(BinOp::Eq),
            Token::NotEq(_) => Some(BinOp::Ne),
            _ => None,
        })
    }

    /// Parse relational (<, >, <=, >=)
    fn parse_relational(&mut self) -> Result<NodeRef, ParseError> {
        self.parse_left_assoc(Self::parse_shift, |t| match t {
            Token::Lt(_) => Some(BinOp::Lt),
            Token::Gt(_) => Some(BinOp::Gt),
            Token::Le(_) => Some(BinOp::Le),
            Token::Ge(_) => Some(BinOp::Ge),
            _ => None,
        })
    }

    /// Parse shift (<<, >>)
    fn parse_shift(&mut self) -> Result<NodeRef, ParseError> {
        self.parse_left_assoc(Self::parse_additive, |t| match t {
            Token::LtLt(_) => Some(BinOp::Shl),
            Token::GtGt(_) => Some(BinOp::Shr),
            _ => None,
        })
    }

    /// Parse additive (+, -)
    fn parse_additive(&mut self) -> Result<NodeRef, ParseError> {
        self.parse_left_assoc(Self::parse_multiplicative, |t| match t {
            Token::Plus(_) => Some(BinOp::Add),
            Token::Minus(_) => Some(BinOp::Sub),
            _ => None,
        })
    }

    /// Parse multiplicative (*, /, %)
    fn parse_multiplicative(&mut self) -> Result<NodeRef, ParseError> {
        self.parse_left_assoc(Self::parse_prefix, |t| match t {
            Token::Star(_) => Some(BinOp::Mul),
            Token::Slash(_) => Some(BinOp::Div),
            Token::Percent(_) => Some(BinOp::Mod),
            _ => None,
        })
    }

    /// Parse prefix operators
    fn parse_prefix(&mut self) -> Result<NodeRef, ParseError> {
        let op = match self.peek() {
            Token::Sizeof(_) => UnOp::Sizeof,
            Token::PlusPlus(_) => UnOp::PreInc,
            Token::MinusMinus(_) => UnOp::PreDec,
            Token::Tilde(_) => UnOp::BitNot,
            Token::Bang(_) => UnOp::Not,
            Token::Minus(_) => UnOp::Neg,
            Token::Plus(_) => UnOp::Plus,
            Token::Amp(_) => UnOp::AddrOf,
            Token::Star(_) => UnOp::Deref,
            Token::New(_) => UnOp::New,
            Token::Delete(_) => UnOp::Delete,
            _ => return self.parse_postfix(),
        };
        self.advance();

        let operand = self.parse_prefix()?;
        Ok(Rc::new(Node::Unary { op, operand }))
    }

    /// Parse postfix: calls, indexing, member access
    fn parse_postfix(&mut self) -> Result<NodeRef, ParseError> {
        let mut expr = self.parse_scope()?;

        loop {
            if self.match_token(&Token::LParen(ANY)) {
                let args = self.parse_arguments()?;
                expr = Rc::new(Node::Call {
                    callee: expr,
                    args: args.into(),
                });
            } else if self.match_token(&Token::LBracket(ANY)) {
                let index = self.parse_expression()?;
                self.expect_token(&Token::RBracket(ANY), "Expected ']' after index")?;
                expr = Rc::new(Node::Index { base: expr, index });
            } else if self.match_token(&Token::Dot(ANY)) {
                let field = self.expect_identifier()?;
                expr = Rc::new(Node::Member { base: expr, field });
            } else if self.match_token(&Token::Arrow(ANY)) {
                let field = self.expect_identifier()?;
                expr = Rc::new(Node::Member {
                    base: Rc::new(Node::Deref(expr)),
                    field,
                });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse call arguments (after the opening parenthesis)
    fn parse_arguments(&mut self) -> Result<Vec<NodeRef>, ParseError> {
        let mut args = Vec::new();

        if !self.check(&Token::RParen(ANY)) {
            loop {
                args.push(self.parse_assignment()?);
                if !self.match_token(&Token::Comma(ANY)) {
                    break;
                }
            }
        }

        self.expect_rparen("after arguments")?;
        Ok(args)
    }

    /// Parse scope resolution (::)
    fn parse_scope(&mut self) -> Result<NodeRef, ParseError> {
        self.parse_left_assoc(Self::parse_primary, |t| match t {
            Token::ColonColon(_) => Some(BinOp::Scope),
            _ => None,
        })
    }

    /// Parse primary expression
    fn parse_primary(&mut self) -> Result<NodeRef, ParseError> {
        let token = self.peek_token();

        let node = match token {
            Token::IntLiteral(n, _) => Node::int(n),
            Token::CharLiteral(c, _) => Node::Literal(Literal::new(
                LitTag::Char,
                Value::Number(u32::from(c) as f64),
            )),
            Token::StringLiteral(s, _) => Node::Literal(Literal::new(LitTag::Str, Value::Str(s))),
            Token::Ident(name, _) => Node::Var(name),
            Token::LParen(_) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen("after expression")?;
                return Ok(expr);
            }
            ref other => match base_type(other) {
                // A base type keyword names a type, e.g. `malloc(int)`
                Some(base) => Node::Type(TypeExpr::Base(base)),
                None => {
                    return Err(ParseError {
                        message: format!("Expected expression, found {}", other),
                        location: self.current_location(),
                    });
                }
            },
        };
        self.advance();

        Ok(Rc::new(node))
    }
}
