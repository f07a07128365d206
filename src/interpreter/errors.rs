//! Error types for the stepper
//!
//! This module defines [`RuntimeError`], which represents every fatal condition
//! met while stepping (as opposed to parse or analysis errors, which are
//! reported by [`CompileError`]), and [`Error`], which covers both for
//! interpreter construction.
//!
//! Runtime errors are never recovered from. They mark constructs outside the
//! supported subset or a program the subset cannot express, not guest-level
//! exceptions.

use crate::memory::value::Address;
use crate::parser::CompileError;
use std::fmt;

/// Fatal errors that can occur during stepping
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Operator accepted by the grammar but not implemented
    UnsupportedOperator {
        operator: &'static str,
        arity: &'static str,
    },

    /// A value was required but the expression reduced to something else
    NotAValue { found: &'static str },

    /// Assignment or access target is not a location
    NotAddressable { found: &'static str },

    /// Undefined variable reference
    UndefinedVariable { name: String },

    /// Callee does not evaluate to a function or builtin
    NotCallable { found: String },

    /// Function argument count mismatch
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        got: usize,
    },

    /// Type error
    TypeError { expected: String, got: String },

    /// Struct field not found
    MissingStructField { field: String },

    /// Array index outside the array
    IndexOutOfRange { index: i64, len: usize },

    /// Default value of `ty` would exceed the cell limit
    AllocationTooLarge { ty: String, limit: usize },

    /// Heap access at an address that was never allocated
    InvalidAddress { address: Address },

    /// `return` evaluated while no function is active
    ReturnOutsideFunction,

    /// Main function not found
    NoMainFunction,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UnsupportedOperator { operator, arity } => {
                write!(f, "Unsupported {} operator '{}'", arity, operator)
            }
            RuntimeError::NotAValue { found } => {
                write!(f, "Expected a value, found a {}", found)
            }
            RuntimeError::NotAddressable { found } => {
                write!(f, "Expected an addressable location, found a {}", found)
            }
            RuntimeError::UndefinedVariable { name } => {
                write!(f, "Undefined variable '{}'", name)
            }
            RuntimeError::NotCallable { found } => {
                write!(f, "'{}' is not callable", found)
            }
            RuntimeError::ArgumentCountMismatch {
                function,
                expected,
                got,
            } => {
                write!(
                    f,
                    "Function '{}' expects {} argument{}, got {}",
                    function,
                    expected,
                    if *expected == 1 { "" } else { "s" },
                    got
                )
            }
            RuntimeError::TypeError { expected, got } => {
                write!(f, "Type error: expected {}, got {}", expected, got)
            }
            RuntimeError::MissingStructField { field } => {
                write!(f, "Struct does not have field '{}'", field)
            }
            RuntimeError::AllocationTooLarge { ty, limit } => {
                write!(f, "Value of type {} exceeds {} cells", ty, limit)
            }
            RuntimeError::IndexOutOfRange { index, len } => {
                write!(
                    f,
                    "Index {} out of bounds for array of length {}",
                    index, len
                )
            }
            RuntimeError::InvalidAddress { address } => {
                write!(f, "Invalid heap address {}", address)
            }
            RuntimeError::ReturnOutsideFunction => {
                write!(f, "'return' outside of a function")
            }
            RuntimeError::NoMainFunction => {
                write!(f, "No main() function found")
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Any error raised while building an interpreter
#[derive(Debug)]
pub enum Error {
    Compile(CompileError),
    Runtime(RuntimeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Compile(err) => write!(f, "{}", err),
            Error::Runtime(err) => write!(f, "Runtime error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Compile(err) => Some(err),
            Error::Runtime(err) => Some(err),
        }
    }
}

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        Error::Compile(err)
    }
}

impl From<RuntimeError> for Error {
    fn from(err: RuntimeError) -> Self {
        Error::Runtime(err)
    }
}
