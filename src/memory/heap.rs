//! Heap implementation for the interpreter
//!
//! The heap maps addresses to stored values. Addresses come from an
//! [`Allocator`]; the only allocator today is [`BumpAllocator`], which hands
//! out strictly increasing addresses one fixed cell apart and never reuses
//! them. `delete` is accepted by the grammar but never reaches the heap, so
//! nothing is ever freed.

use super::value::{Address, Value};
use crate::interpreter::constants::{HEAP_ADDRESS_START, HEAP_CELL_SIZE};
use crate::interpreter::errors::RuntimeError;
use std::collections::BTreeMap;
use std::fmt;

/// Source of fresh heap addresses
pub trait Allocator: fmt::Debug {
    /// Reserve one cell and return its address.
    fn allocate(&mut self) -> Address;
}

/// Monotonic allocator: every call returns the previous address plus a
/// fixed increment.
#[derive(Debug, Clone)]
pub struct BumpAllocator {
    next: Address,
    increment: Address,
}

impl BumpAllocator {
    pub fn new(start: Address, increment: usize) -> Self {
        BumpAllocator {
            next: start,
            increment: increment as Address,
        }
    }
}

impl Default for BumpAllocator {
    fn default() -> Self {
        Self::new(HEAP_ADDRESS_START, HEAP_CELL_SIZE)
    }
}

impl Allocator for BumpAllocator {
    fn allocate(&mut self) -> Address {
        let address = self.next;
        self.next += self.increment;
        address
    }
}

/// Heap memory
#[derive(Debug)]
pub struct Heap {
    cells: BTreeMap<Address, Value>,
    allocator: Box<dyn Allocator>,
}

impl Heap {
    pub fn new(allocator: Box<dyn Allocator>) -> Self {
        Heap {
            cells: BTreeMap::new(),
            allocator,
        }
    }

    /// Reserve a new cell. The cell holds [`Value::Unset`] until stored to.
    pub fn allocate(&mut self) -> Address {
        let address = self.allocator.allocate();
        self.cells.insert(address, Value::Unset);
        address
    }

    pub fn load(&self, address: Address) -> Result<&Value, RuntimeError> {
        self.cells
            .get(&address)
            .ok_or(RuntimeError::InvalidAddress { address })
    }

    pub fn load_mut(&mut self, address: Address) -> Result<&mut Value, RuntimeError> {
        self.cells
            .get_mut(&address)
            .ok_or(RuntimeError::InvalidAddress { address })
    }

    /// Overwrite an allocated cell
    pub fn store(&mut self, address: Address, value: Value) -> Result<(), RuntimeError> {
        *self.load_mut(address)? = value;
        Ok(())
    }

    /// Allocated cells in address order
    pub fn cells(&self) -> impl Iterator<Item = (Address, &Value)> {
        self.cells.iter().map(|(addr, value)| (*addr, value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new(Box::new(BumpAllocator::default()))
    }
}
