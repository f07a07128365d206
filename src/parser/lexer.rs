//! Lexer (tokenizer) for C source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! `#include` and other preprocessor directives are silently skipped rather than
//! parsed, matching the interpreter's no-preprocessor policy.

use super::ast::{SourceLocation, Span};
use std::fmt;

/// All token variants produced by the lexer.
///
/// Every variant carries the byte [`Span`] it was read from, so statement
/// spans can be assembled from their first and last tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    IntLiteral(i64, Span),
    CharLiteral(char, Span),
    StringLiteral(String, Span),

    // Identifiers
    Ident(String, Span),

    // Keywords
    Int(Span),
    Char(Span),
    Float(Span),
    Str(Span),
    Void(Span),
    Struct(Span),
    Class(Span),
    Public(Span),
    Private(Span),
    While(Span),
    Return(Span),
    Sizeof(Span),
    New(Span),
    Delete(Span),

    // Arithmetic
    Plus(Span),    // +
    Minus(Span),   // -
    Star(Span),    // *
    Slash(Span),   // /
    Percent(Span), // %

    // Comparison
    EqEq(Span),  // ==
    NotEq(Span), // !=
    Lt(Span),    // <
    Le(Span),    // <=
    Gt(Span),    // >
    Ge(Span),    // >=

    // Logical
    AndAnd(Span), // &&
    OrOr(Span),   // ||
    Bang(Span),   // !

    // Bitwise
    Amp(Span),   // &
    Pipe(Span),  // |
    Caret(Span), // ^
    Tilde(Span), // ~
    LtLt(Span),  // <<
    GtGt(Span),  // >>

    // Assignment
    Eq(Span),      // =
    PlusEq(Span),  // +=
    MinusEq(Span), // -=
    StarEq(Span),  // *=
    SlashEq(Span), // /=

    // Increment/Decrement
    PlusPlus(Span),   // ++
    MinusMinus(Span), // --

    // Member access and scope
    Dot(Span),        // .
    Arrow(Span),      // ->
    ColonColon(Span), // ::
    Colon(Span),      // :

    // Punctuation
    LParen(Span),    // (
    RParen(Span),    // )
    LBrace(Span),    // {
    RBrace(Span),    // }
    LBracket(Span),  // [
    RBracket(Span),  // ]
    Semicolon(Span), // ;
    Comma(Span),     // ,

    // End of file
    Eof(Span),
}

impl Token {
    /// Returns the source span this token was read from.
    pub fn span(&self) -> Span {
        match self {
            Token::IntLiteral(_, span)
            | Token::CharLiteral(_, span)
            | Token::StringLiteral(_, span)
            | Token::Ident(_, span)
            | Token::Int(span)
            | Token::Char(span)
            | Token::Float(span)
            | Token::Str(span)
            | Token::Void(span)
            | Token::Struct(span)
            | Token::Class(span)
            | Token::Public(span)
            | Token::Private(span)
            | Token::While(span)
            | Token::Return(span)
            | Token::Sizeof(span)
            | Token::New(span)
            | Token::Delete(span)
            | Token::Plus(span)
            | Token::Minus(span)
            | Token::Star(span)
            | Token::Slash(span)
            | Token::Percent(span)
            | Token::EqEq(span)
            | Token::NotEq(span)
            | Token::Lt(span)
            | Token::Le(span)
            | Token::Gt(span)
            | Token::Ge(span)
            | Token::AndAnd(span)
            | Token::OrOr(span)
            | Token::Bang(span)
            | Token::Amp(span)
            | Token::Pipe(span)
            | Token::Caret(span)
            | Token::Tilde(span)
            | Token::LtLt(span)
            | Token::GtGt(span)
            | Token::Eq(span)
            | Token::PlusEq(span)
            | Token::MinusEq(span)
            | Token::StarEq(span)
            | Token::SlashEq(span)
            | Token::PlusPlus(span)
            | Token::MinusMinus(span)
            | Token::Dot(span)
            | Token::Arrow(span)
            | Token::ColonColon(span)
            | Token::Colon(span)
            | Token::LParen(span)
            | Token::RParen(span)
            | Token::LBrace(span)
            | Token::RBrace(span)
            | Token::LBracket(span)
            | Token::RBracket(span)
            | Token::Semicolon(span)
            | Token::Comma(span)
            | Token::Eof(span) => *span,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::IntLiteral(n, _) => write!(f, "int literal {}", n),
            Token::CharLiteral(c, _) => write!(f, "char literal {:?}", c),
            Token::StringLiteral(s, _) => write!(f, "string literal {:?}", s),
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Int(_) => write!(f, "'int'"),
            Token::Char(_) => write!(f, "'char'"),
            Token::Float(_) => write!(f, "'float'"),
            Token::Str(_) => write!(f, "'string'"),
            Token::Void(_) => write!(f, "'void'"),
            Token::Struct(_) => write!(f, "'struct'"),
            Token::Class(_) => write!(f, "'class'"),
            Token::Public(_) => write!(f, "'public'"),
            Token::Private(_) => write!(f, "'private'"),
            Token::While(_) => write!(f, "'while'"),
            Token::Return(_) => write!(f, "'return'"),
            Token::Sizeof(_) => write!(f, "'sizeof'"),
            Token::New(_) => write!(f, "'new'"),
            Token::Delete(_) => write!(f, "'delete'"),
            Token::Plus(_) => write!(f, "'+'"),
            Token::Minus(_) => write!(f, "'-'"),
            Token::Star(_) => write!(f, "'*'"),
            Token::Slash(_) => write!(f, "'/'"),
            Token::Percent(_) => write!(f, "'%'"),
            Token::EqEq(_) => write!(f, "'=='"),
            Token::NotEq(_) => write!(f, "'!='"),
            Token::Lt(_) => write!(f, "'<'"),
            Token::Le(_) => write!(f, "'<='"),
            Token::Gt(_) => write!(f, "'>'"),
            Token::Ge(_) => write!(f, "'>='"),
            Token::AndAnd(_) => write!(f, "'&&'"),
            Token::OrOr(_) => write!(f, "'||'"),
            Token::Bang(_) => write!(f, "'!'"),
            Token::Amp(_) => write!(f, "'&'"),
            Token::Pipe(_) => write!(f, "'|'"),
            Token::Caret(_) => write!(f, "'^'"),
            Token::Tilde(_) => write!(f, "'~'"),
            Token::LtLt(_) => write!(f, "'<<'"),
            Token::GtGt(_) => write!(f, "'>>'"),
            Token::Eq(_) => write!(f, "'='"),
            Token::PlusEq(_) => write!(f, "'+='"),
            Token::MinusEq(_) => write!(f, "'-='"),
            Token::StarEq(_) => write!(f, "'*='"),
            Token::SlashEq(_) => write!(f, "'/='"),
            Token::PlusPlus(_) => write!(f, "'++'"),
            Token::MinusMinus(_) => write!(f, "'--'"),
            Token::Dot(_) => write!(f, "'.'"),
            Token::Arrow(_) => write!(f, "'->'"),
            Token::ColonColon(_) => write!(f, "'::'"),
            Token::Colon(_) => write!(f, "':'"),
            Token::LParen(_) => write!(f, "'('"),
            Token::RParen(_) => write!(f, "')'"),
            Token::LBrace(_) => write!(f, "'{{'"),
            Token::RBrace(_) => write!(f, "'}}'"),
            Token::LBracket(_) => write!(f, "'['"),
            Token::RBracket(_) => write!(f, "']'"),
            Token::Semicolon(_) => write!(f, "';'"),
            Token::Comma(_) => write!(f, "','"),
            Token::Eof(_) => write!(f, "end of file"),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lexer error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

/// Lexer for C source code
pub struct Lexer {
    input: Vec<(usize, char)>,
    source_len: usize,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.char_indices().collect(),
            source_len: input.len(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                let end = self.offset();
                tokens.push(Token::Eof(Span::new(end, end)));
                break;
            }

            if self.peek() == Some('#') {
                self.skip_preprocessor_directive();
                continue;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let start = self.offset();
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        match ch {
            '"' => self.string_literal(start, loc),
            '\'' => self.char_literal(start),
            '0'..='9' => self.number_literal(ch, start, loc),
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.identifier_or_keyword(ch, start)),

            '+' => Ok(self.one_of(start, &[('+', Token::PlusPlus), ('=', Token::PlusEq)], Token::Plus)),
            '-' => Ok(self.one_of(
                start,
                &[('-', Token::MinusMinus), ('=', Token::MinusEq), ('>', Token::Arrow)],
                Token::Minus,
            )),
            '*' => Ok(self.one_of(start, &[('=', Token::StarEq)], Token::Star)),
            '/' => Ok(self.one_of(start, &[('=', Token::SlashEq)], Token::Slash)),
            '%' => Ok(self.one_of(start, &[], Token::Percent)),
            '=' => Ok(self.one_of(start, &[('=', Token::EqEq)], Token::Eq)),
            '!' => Ok(self.one_of(start, &[('=', Token::NotEq)], Token::Bang)),
            '<' => Ok(self.one_of(start, &[('=', Token::Le), ('<', Token::LtLt)], Token::Lt)),
            '>' => Ok(self.one_of(start, &[('=', Token::Ge), ('>', Token::GtGt)], Token::Gt)),
            '&' => Ok(self.one_of(start, &[('&', Token::AndAnd)], Token::Amp)),
            '|' => Ok(self.one_of(start, &[('|', Token::OrOr)], Token::Pipe)),
            ':' => Ok(self.one_of(start, &[(':', Token::ColonColon)], Token::Colon)),
            '^' => Ok(Token::Caret(self.span_from(start))),
            '~' => Ok(Token::Tilde(self.span_from(start))),
            '.' => Ok(Token::Dot(self.span_from(start))),
            '(' => Ok(Token::LParen(self.span_from(start))),
            ')' => Ok(Token::RParen(self.span_from(start))),
            '{' => Ok(Token::LBrace(self.span_from(start))),
            '}' => Ok(Token::RBrace(self.span_from(start))),
            '[' => Ok(Token::LBracket(self.span_from(start))),
            ']' => Ok(Token::RBracket(self.span_from(start))),
            ';' => Ok(Token::Semicolon(self.span_from(start))),
            ',' => Ok(Token::Comma(self.span_from(start))),

            _ => Err(LexError {
                message: format!("Unexpected character: '{}'", ch),
                location: loc,
            }),
        }
    }

    /// Picks a two-character operator when the next character matches one of
    /// `pairs`, otherwise the single-character `fallback`.
    fn one_of(
        &mut self,
        start: usize,
        pairs: &[(char, fn(Span) -> Token)],
        fallback: fn(Span) -> Token,
    ) -> Token {
        if let Some(next) = self.peek() {
            if let Some((_, make)) = pairs.iter().find(|(c, _)| *c == next) {
                self.advance();
                return make(self.span_from(start));
            }
        }
        fallback(self.span_from(start))
    }

    /// Parse string literal
    fn string_literal(&mut self, start: usize, loc: SourceLocation) -> Result<Token, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == '"' {
                self.advance(); // consume closing quote
                return Ok(Token::StringLiteral(string, self.span_from(start)));
            }

            if ch == '\\' {
                self.advance();
                string.push(self.escape()?);
            } else {
                string.push(ch);
                self.advance();
            }
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Parse character literal
    fn char_literal(&mut self, start: usize) -> Result<Token, LexError> {
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file in character literal".to_string(),
            location: self.current_location(),
        })?;

        let value = if ch == '\\' { self.escape()? } else { ch };

        if self.advance() != Some('\'') {
            return Err(LexError {
                message: "Expected closing quote in character literal".to_string(),
                location: self.current_location(),
            });
        }

        Ok(Token::CharLiteral(value, self.span_from(start)))
    }

    /// Decode the character after a backslash
    fn escape(&mut self) -> Result<char, LexError> {
        let escaped = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file in escape sequence".to_string(),
            location: self.current_location(),
        })?;

        match escaped {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            'r' => Ok('\r'),
            '\\' => Ok('\\'),
            '"' => Ok('"'),
            '\'' => Ok('\''),
            '0' => Ok('\0'),
            _ => Err(LexError {
                message: format!("Unknown escape sequence: \\{}", escaped),
                location: self.current_location(),
            }),
        }
    }

    /// Parse numeric literal (integers only)
    fn number_literal(
        &mut self,
        first_digit: char,
        start: usize,
        loc: SourceLocation,
    ) -> Result<Token, LexError> {
        let mut num_str = String::new();
        num_str.push(first_digit);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let value = num_str.parse::<i64>().map_err(|_| LexError {
            message: format!("Invalid integer literal: {}", num_str),
            location: loc,
        })?;

        Ok(Token::IntLiteral(value, self.span_from(start)))
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, start: usize) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let span = self.span_from(start);
        match ident.as_str() {
            "int" => Token::Int(span),
            "char" => Token::Char(span),
            "float" => Token::Float(span),
            "string" => Token::Str(span),
            "void" => Token::Void(span),
            "struct" => Token::Struct(span),
            "class" => Token::Class(span),
            "public" => Token::Public(span),
            "private" => Token::Private(span),
            "while" => Token::While(span),
            "return" => Token::Return(span),
            "sizeof" => Token::Sizeof(span),
            "new" => Token::New(span),
            "delete" => Token::Delete(span),
            _ => Token::Ident(ident, span),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    /// Skip preprocessor directive (#include, etc.)
    fn skip_preprocessor_directive(&mut self) {
        self.skip_line_comment();
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).map(|&(_, ch)| ch)
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).map(|&(_, ch)| ch)
    }

    fn advance(&mut self) -> Option<char> {
        let &(_, ch) = self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Byte offset of the next unread character
    fn offset(&self) -> usize {
        self.input
            .get(self.position)
            .map(|&(offset, _)| offset)
            .unwrap_or(self.source_len)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.offset())
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_tokens() {
        let mut lexer = Lexer::new("int main() { return 0; }");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "main"));
        assert!(matches!(tokens[2], Token::LParen(_)));
        assert!(matches!(tokens[3], Token::RParen(_)));
        assert!(matches!(tokens[4], Token::LBrace(_)));
        assert!(matches!(tokens[5], Token::Return(_)));
        assert!(matches!(tokens[6], Token::IntLiteral(0, _)));
        assert!(matches!(tokens[7], Token::Semicolon(_)));
        assert!(matches!(tokens[8], Token::RBrace(_)));
        assert!(matches!(tokens[9], Token::Eof(_)));
    }

    #[test]
    fn test_operators() {
        let mut lexer = Lexer::new("++ -- += -= == != && || -> :: <<");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::PlusPlus(_)));
        assert!(matches!(tokens[1], Token::MinusMinus(_)));
        assert!(matches!(tokens[2], Token::PlusEq(_)));
        assert!(matches!(tokens[3], Token::MinusEq(_)));
        assert!(matches!(tokens[4], Token::EqEq(_)));
        assert!(matches!(tokens[5], Token::NotEq(_)));
        assert!(matches!(tokens[6], Token::AndAnd(_)));
        assert!(matches!(tokens[7], Token::OrOr(_)));
        assert!(matches!(tokens[8], Token::Arrow(_)));
        assert!(matches!(tokens[9], Token::ColonColon(_)));
        assert!(matches!(tokens[10], Token::LtLt(_)));
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let mut lexer = Lexer::new("x = 42;");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens[0].span(), Span::new(0, 1));
        assert_eq!(tokens[1].span(), Span::new(2, 3));
        assert_eq!(tokens[2].span(), Span::new(4, 6));
        assert_eq!(tokens[3].span(), Span::new(6, 7));
        assert_eq!(tokens[4].span(), Span::new(7, 7));
    }

    #[test]
    fn test_comments() {
        let mut lexer = Lexer::new("int x; // comment\nint y; /* block\ncomment */ int z;");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "x"));
        assert!(matches!(tokens[2], Token::Semicolon(_)));
        assert!(matches!(tokens[3], Token::Int(_)));
        assert!(matches!(tokens[4], Token::Ident(ref s, _) if s == "y"));
        assert!(matches!(tokens[5], Token::Semicolon(_)));
        assert!(matches!(tokens[6], Token::Int(_)));
        assert!(matches!(tokens[7], Token::Ident(ref s, _) if s == "z"));
    }

    #[test]
    fn test_string_and_char_literals() {
        let mut lexer = Lexer::new(r#""hello\nworld" 'a' '\n'"#);
        let tokens = lexer.tokenize().unwrap();

        match &tokens[0] {
            Token::StringLiteral(s, _) => assert_eq!(s, "hello\nworld"),
            _ => panic!("Expected string literal"),
        }
        assert!(matches!(tokens[1], Token::CharLiteral('a', _)));
        assert!(matches!(tokens[2], Token::CharLiteral('\n', _)));
    }

    #[test]
    fn test_preprocessor_skip() {
        let mut lexer = Lexer::new("#include <stdio.h>\nint x;");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "x"));
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        let mut lexer = Lexer::new("\"abc");
        let err = lexer.tokenize().unwrap_err();
        assert_eq!(err.location, SourceLocation::new(1, 1));
    }
}
