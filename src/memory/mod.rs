//! Memory model for the stepper
//!
//! This module provides the core memory abstractions:
//! - [`value`]: Runtime value representation
//! - [`location`]: Reduced operands and addressable [`Place`]s
//! - [`stack`]: Call stack with frames and local variables
//! - [`heap`]: Heap cells behind an [`Allocator`](heap::Allocator)
//! - [`globals`]: Global namespace
//! - [`init`]: Default values per type
//!
//! # Reads and writes
//!
//! A bare variable is read from the current frame, falling back to globals.
//! Writing a bare variable updates the current frame if it declares the name
//! and then *always* writes the same value into globals too. Reads never see
//! that mirror while the local exists; it surfaces once the frame is gone.
//!
//! Array and field accesses are unchecked in C. Here an index past the end or
//! a field the struct lacks stops the run with a [`RuntimeError`].

pub mod globals;
pub mod heap;
pub mod init;
pub mod location;
pub mod stack;
pub mod value;

use crate::interpreter::errors::RuntimeError;
use crate::parser::ast::CompiledFile;
use globals::Globals;
use heap::Heap;
use location::{Operand, Place};
use stack::Stack;
use value::Value;

/// Stack, heap and globals of one machine
#[derive(Debug)]
pub struct Memory {
    pub stack: Stack,
    pub heap: Heap,
    pub globals: Globals,
}

impl Memory {
    pub fn new(heap: Heap) -> Self {
        Memory {
            stack: Stack::new(),
            heap,
            globals: Globals::new(),
        }
    }

    /// Bind every user function of `file` in the global namespace
    pub fn define_functions(&mut self, file: &CompiledFile) {
        for function in file.functions() {
            self.globals
                .define(function.name.clone(), Value::Function(function.clone()));
        }
    }

    /// Read the value stored at `place`
    pub fn resolve_location(&self, place: &Place) -> Result<Value, RuntimeError> {
        self.lookup(place).cloned()
    }

    /// Write `value` to `place`
    pub fn store_location(&mut self, place: &Place, value: Value) -> Result<(), RuntimeError> {
        match place {
            Place::Var(name) => {
                let frame = self.stack.current_frame_mut();
                if let Some(slot) = frame.get_var_mut(name) {
                    *slot = value.clone();
                }
                self.globals.define(name.clone(), value);
                Ok(())
            }
            Place::Deref(address) => self.heap.store(*address, value),
            Place::Member(..) | Place::Index(..) => {
                *self.lookup_mut(place)? = value;
                Ok(())
            }
        }
    }

    /// Value of a reduced operand. Only literals and places carry values.
    pub fn evaluate_expression_value(&self, operand: &Operand) -> Result<Value, RuntimeError> {
        match operand {
            Operand::Lit(value) => Ok(value.clone()),
            Operand::Place(place) => self.resolve_location(place),
            Operand::Builtin(builtin) => Ok(Value::Builtin(*builtin)),
            Operand::Type(_) | Operand::Unit => Err(RuntimeError::NotAValue {
                found: operand.kind(),
            }),
        }
    }

    fn lookup(&self, place: &Place) -> Result<&Value, RuntimeError> {
        match place {
            Place::Var(name) => self
                .stack
                .current_frame()
                .get_var(name)
                .or_else(|| self.globals.get(name))
                .ok_or_else(|| RuntimeError::UndefinedVariable { name: name.clone() }),
            Place::Member(base, field) => {
                let value = self.lookup(base)?;
                expect_struct(value)?;
                value
                    .field(field)
                    .ok_or_else(|| RuntimeError::MissingStructField {
                        field: field.clone(),
                    })
            }
            Place::Index(base, index) => {
                let index = self.index_value(index)?;
                match self.lookup(base)? {
                    Value::Array(elements) => usize::try_from(index)
                        .ok()
                        .and_then(|i| elements.get(i))
                        .ok_or(RuntimeError::IndexOutOfRange {
                            index,
                            len: elements.len(),
                        }),
                    other => Err(RuntimeError::TypeError {
                        expected: "array".to_string(),
                        got: other.kind().to_string(),
                    }),
                }
            }
            Place::Deref(address) => self.heap.load(*address),
        }
    }

    fn lookup_mut(&mut self, place: &Place) -> Result<&mut Value, RuntimeError> {
        match place {
            Place::Var(name) => {
                if self.stack.current_frame().contains(name) {
                    return self
                        .stack
                        .current_frame_mut()
                        .get_var_mut(name)
                        .ok_or_else(|| RuntimeError::UndefinedVariable { name: name.clone() });
                }
                self.globals
                    .get_mut(name)
                    .ok_or_else(|| RuntimeError::UndefinedVariable { name: name.clone() })
            }
            Place::Member(base, field) => {
                let value = self.lookup_mut(base)?;
                expect_struct(value)?;
                value
                    .field_mut(field)
                    .ok_or_else(|| RuntimeError::MissingStructField {
                        field: field.clone(),
                    })
            }
            Place::Index(base, index) => {
                let index = self.index_value(index)?;
                match self.lookup_mut(base)? {
                    Value::Array(elements) => {
                        let len = elements.len();
                        usize::try_from(index)
                            .ok()
                            .and_then(|i| elements.get_mut(i))
                            .ok_or(RuntimeError::IndexOutOfRange { index, len })
                    }
                    other => Err(RuntimeError::TypeError {
                        expected: "array".to_string(),
                        got: other.kind().to_string(),
                    }),
                }
            }
            Place::Deref(address) => self.heap.load_mut(*address),
        }
    }

    /// Indices are truncated toward zero
    fn index_value(&self, index: &Operand) -> Result<i64, RuntimeError> {
        let number = self.evaluate_expression_value(index)?.to_number()?;
        if !number.is_finite() {
            return Err(RuntimeError::TypeError {
                expected: "integer index".to_string(),
                got: number.to_string(),
            });
        }
        Ok(number.trunc() as i64)
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(Heap::default())
    }
}

fn expect_struct(value: &Value) -> Result<(), RuntimeError> {
    match value {
        Value::Struct(_) => Ok(()),
        other => Err(RuntimeError::TypeError {
            expected: "struct".to_string(),
            got: other.kind().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stack::StackFrame;

    fn var(name: &str) -> Place {
        Place::Var(name.to_string())
    }

    #[test]
    fn test_local_shadows_global_on_read() {
        let mut memory = Memory::default();
        memory.globals.define("x", Value::Number(1.0));
        memory.stack.push_frame(StackFrame::new("main", 0));
        memory
            .stack
            .current_frame_mut()
            .declare_var("x", Value::Number(2.0));

        assert_eq!(memory.resolve_location(&var("x")).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn test_store_mirrors_into_globals() {
        let mut memory = Memory::default();
        memory.stack.push_frame(StackFrame::new("main", 0));
        memory
            .stack
            .current_frame_mut()
            .declare_var("x", Value::Number(0.0));

        memory.store_location(&var("x"), Value::Number(9.0)).unwrap();

        assert_eq!(
            memory.stack.current_frame().get_var("x"),
            Some(&Value::Number(9.0))
        );
        assert_eq!(memory.globals.get("x"), Some(&Value::Number(9.0)));
    }

    #[test]
    fn test_store_to_undeclared_name_creates_global() {
        let mut memory = Memory::default();
        memory.store_location(&var("y"), Value::Number(3.0)).unwrap();
        assert!(!memory.stack.current_frame().contains("y"));
        assert_eq!(memory.resolve_location(&var("y")).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_member_and_index_through_heap() {
        let mut memory = Memory::default();
        let addr = memory.heap.allocate();
        memory
            .heap
            .store(
                addr,
                Value::Struct(vec![(
                    "items".to_string(),
                    Value::Array(vec![Value::Number(0.0); 3]),
                )]),
            )
            .unwrap();

        let place = Place::Index(
            Box::new(Place::Member(
                Box::new(Place::Deref(addr)),
                "items".to_string(),
            )),
            Box::new(Operand::Lit(Value::Number(2.0))),
        );
        memory.store_location(&place, Value::Number(5.0)).unwrap();
        assert_eq!(memory.resolve_location(&place).unwrap(), Value::Number(5.0));

        let out_of_range = Place::Index(
            Box::new(Place::Member(
                Box::new(Place::Deref(addr)),
                "items".to_string(),
            )),
            Box::new(Operand::Lit(Value::Number(3.0))),
        );
        assert!(matches!(
            memory.resolve_location(&out_of_range),
            Err(RuntimeError::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_non_values_are_rejected() {
        let memory = Memory::default();
        assert!(matches!(
            memory.evaluate_expression_value(&Operand::Unit),
            Err(RuntimeError::NotAValue { .. })
        ));
        assert!(matches!(
            memory.resolve_location(&var("missing")),
            Err(RuntimeError::UndefinedVariable { .. })
        ));
        assert_eq!(
            memory.resolve_location(&var("NULL")).unwrap(),
            Value::Pointer(0)
        );
    }
}
