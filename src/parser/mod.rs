//! C subset front end
//!
//! This module transforms source text into the annotated tree the stepper runs:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → [`Program`](ast::Program))
//! - [`analysis`]: Type resolution and frame inventories
//!   (program → [`CompiledFile`])
//! - [`ast`]: Tree definitions for both stages
//!
//! # Supported C Subset
//!
//! - Types: `int`, `char`, `float`, `string`, `void`, structs/classes,
//!   pointers, fixed-size arrays
//! - Statements: variable definitions, `while`, `return`, blocks, expression
//!   statements
//! - Expressions: the full C-like operator ladder is parsed; which operators
//!   actually run is up to the stepper
//! - No preprocessor (`#include` lines are skipped)
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser, one method per precedence level.
//! No external parser generator dependencies.

pub mod analysis;
pub mod ast;
pub mod lexer;
pub mod parse;

mod declarations;
mod expressions;
mod statements;

use analysis::AnalysisError;
use ast::CompiledFile;
use parse::{ParseError, Parser};
use std::fmt;

/// Failure of the front end, before any stepping happens
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// Lexing or parsing failed
    Parse(ParseError),
    Analysis(AnalysisError),
}

impl CompileError {
    pub fn location(&self) -> ast::SourceLocation {
        match self {
            CompileError::Parse(err) => err.location,
            CompileError::Analysis(err) => err.location(),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Parse(err) => write!(f, "{}", err),
            CompileError::Analysis(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Parse(err) => Some(err),
            CompileError::Analysis(err) => Some(err),
        }
    }
}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        CompileError::Parse(err)
    }
}

impl From<AnalysisError> for CompileError {
    fn from(err: AnalysisError) -> Self {
        CompileError::Analysis(err)
    }
}

/// Parse and analyze a whole source file
pub fn compile_file(source: &str) -> Result<CompiledFile, CompileError> {
    let program = Parser::new(source)?.parse_program()?;
    tracing::trace!(declarations = program.nodes.len(), "parsed program");
    Ok(analysis::analyze(&program, source)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_file_keeps_declaration_order() {
        let file = compile_file(
            "struct P { int x; };\nint add(int a, int b) { return a + b; }\nint main() { }",
        )
        .unwrap();

        assert_eq!(file.decls.len(), 3);
        let names: Vec<&str> = file.functions().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["add", "main"]);
        assert_eq!(file.function("add").unwrap().position.start, 21);
    }

    #[test]
    fn test_compile_errors_carry_locations() {
        let err = compile_file("int main() {\n  int x\n}").unwrap_err();
        assert!(matches!(err, CompileError::Parse(_)));
        assert_eq!(err.location().line, 3);

        let err = compile_file("int main() { \"open").unwrap_err();
        assert!(matches!(err, CompileError::Parse(_)));
    }
}
