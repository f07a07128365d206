//! Reduced operands and addressable locations
//!
//! Evaluating an expression does not always produce a value. Member, index
//! and dereference expressions reduce to a [`Place`]: a location that can be
//! read later with [`Memory::resolve_location`](super::Memory::resolve_location)
//! or written with [`Memory::store_location`](super::Memory::store_location).
//! The same reduced place therefore serves as both lvalue and rvalue.

use super::value::{Address, Value};
use crate::parser::ast::{Builtin, Type};
use std::fmt;

/// An addressable location
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    /// Variable name, resolved through the current frame then globals
    Var(String),
    Member(Box<Place>, String),
    /// The index stays an operand and is read when the place is accessed
    Index(Box<Place>, Box<Operand>),
    /// Heap cell at an already evaluated address
    Deref(Address),
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::Var(name) => f.write_str(name),
            Place::Member(base, field) => match base.as_ref() {
                Place::Deref(addr) => write!(f, "(*{}).{}", addr, field),
                _ => write!(f, "{}.{}", base, field),
            },
            Place::Index(base, index) => write!(f, "{}[{}]", base, index),
            Place::Deref(addr) => write!(f, "*{}", addr),
        }
    }
}

/// What a node reduces to once the stepper is done with it
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A plain value (literals and computed results)
    Lit(Value),
    Place(Place),
    /// A resolved type, produced by type constructor nodes
    Type(Type),
    Builtin(Builtin),
    /// Result of statements and other nodes with no value
    Unit,
}

impl Operand {
    pub fn kind(&self) -> &'static str {
        match self {
            Operand::Lit(_) => "value",
            Operand::Place(_) => "location",
            Operand::Type(_) => "type",
            Operand::Builtin(_) => "builtin",
            Operand::Unit => "statement",
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Lit(value) => write!(f, "{}", value),
            Operand::Place(place) => write!(f, "{}", place),
            Operand::Type(ty) => write!(f, "{}", ty),
            Operand::Builtin(builtin) => f.write_str(builtin.name()),
            Operand::Unit => f.write_str("()"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_display() {
        let place = Place::Member(Box::new(Place::Deref(10000)), "val".to_string());
        assert_eq!(place.to_string(), "(*10000).val");

        let place = Place::Index(
            Box::new(Place::Var("a".to_string())),
            Box::new(Operand::Place(Place::Var("i".to_string()))),
        );
        assert_eq!(place.to_string(), "a[i]");
    }
}
