//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents every runtime value
//! the stepper can hold. Values are untyped at this level: `int`, `char` and
//! `float` all live in [`Value::Number`], and the type tags only exist on
//! literal and declaration nodes.
//!
//! # Value Types
//!
//! - [`Value::Number`]: any arithmetic value, kept as a real number
//! - [`Value::Bool`]: result of a comparison
//! - [`Value::Pointer`]: heap address (0 is the null pointer)
//! - [`Value::Str`]: string contents
//! - [`Value::Unset`]: a pointer slot that was never assigned
//! - [`Value::Array`] / [`Value::Struct`]: aggregates, struct fields in declared order
//! - [`Value::Function`] / [`Value::Builtin`]: callables living in the global namespace

use crate::interpreter::errors::RuntimeError;
use crate::parser::ast::{Builtin, FunctionDef};
use std::fmt;
use std::rc::Rc;

/// Memory address type (64-bit)
pub type Address = u64;

/// Runtime values in the interpreter
#[derive(Debug, Clone, Default)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Pointer(Address),
    Str(String),
    #[default]
    Unset,
    Array(Vec<Value>),
    Struct(Vec<(String, Value)>), // Field name -> field value, declared order
    Function(Rc<FunctionDef>),
    Builtin(Builtin),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Pointer(a), Value::Pointer(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Unset, Value::Unset) => true,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            // Function bodies are never compared structurally
            (Value::Function(a), Value::Function(b)) => {
                a.name == b.name && a.position == b.position
            }
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Short name of the value kind, used in type errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Pointer(_) => "pointer",
            Value::Str(_) => "string",
            Value::Unset => "unset pointer",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Function(_) => "function",
            Value::Builtin(_) => "builtin",
        }
    }

    /// Numeric view used by arithmetic and comparisons.
    ///
    /// Booleans count as 0/1, pointers as their address and an unset pointer
    /// as NaN, so it never compares equal to anything.
    pub fn to_number(&self) -> Result<f64, RuntimeError> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Pointer(addr) => Ok(*addr as f64),
            Value::Unset => Ok(f64::NAN),
            other => Err(RuntimeError::TypeError {
                expected: "number".to_string(),
                got: other.kind().to_string(),
            }),
        }
    }

    /// Interpret this value as a heap address.
    pub fn as_address(&self) -> Result<Address, RuntimeError> {
        match self {
            Value::Pointer(addr) => Ok(*addr),
            Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Ok(*n as Address),
            other => Err(RuntimeError::TypeError {
                expected: "pointer".to_string(),
                got: other.kind().to_string(),
            }),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Bool(b) => *b,
            Value::Pointer(addr) => *addr != 0,
            Value::Str(s) => !s.is_empty(),
            Value::Unset => false,
            Value::Array(_) | Value::Struct(_) | Value::Function(_) | Value::Builtin(_) => true,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        match self {
            Value::Struct(fields) => fields
                .iter_mut()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Bool(b) => write!(f, "{}", b),
            Value::Pointer(addr) => write!(f, "{}", addr),
            Value::Str(s) => f.write_str(s),
            Value::Unset => f.write_str("(unset)"),
            Value::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Value::Struct(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
            Value::Function(def) => write!(f, "<function {}>", def.name),
            Value::Builtin(builtin) => write!(f, "<builtin {}>", builtin.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::Number(5.0).to_string(), "5");
        assert_eq!(Value::Number(-2.0).to_string(), "-2");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Unset.to_string(), "(unset)");
        assert_eq!(
            Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]).to_string(),
            "[1, 2]"
        );
        assert_eq!(
            Value::Struct(vec![
                ("a".to_string(), Value::Number(1.0)),
                ("b".to_string(), Value::Number(2.0)),
            ])
            .to_string(),
            "{a: 1, b: 2}"
        );
    }

    #[test]
    fn test_to_number() {
        assert_eq!(Value::Bool(true).to_number().unwrap(), 1.0);
        assert_eq!(Value::Pointer(10000).to_number().unwrap(), 10000.0);
        assert!(Value::Unset.to_number().unwrap().is_nan());
        assert!(Value::Str("x".to_string()).to_number().is_err());
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Number(3.0).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Pointer(0).is_truthy());
        assert!(!Value::Unset.is_truthy());
        assert!(Value::Bool(true).is_truthy());
    }

    #[test]
    fn test_struct_fields() {
        let mut value = Value::Struct(vec![("val".to_string(), Value::Number(0.0))]);
        *value.field_mut("val").unwrap() = Value::Number(7.0);
        assert_eq!(value.field("val"), Some(&Value::Number(7.0)));
        assert_eq!(value.field("next"), None);
    }
}
