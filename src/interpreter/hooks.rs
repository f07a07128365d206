//! Observation callbacks fired while stepping
//!
//! Hooks are called synchronously from inside a step and can only observe:
//! nothing they do changes the control flow of the program being run.
//! Every method has a no-op default, so an implementation overrides only
//! what it needs.

use crate::memory::location::Place;
use crate::memory::value::{Address, Value};
use crate::parser::ast::{FrameInventory, Type};

pub trait Hooks {
    /// Text produced by the `print` builtin
    fn on_print(&mut self, _text: &str) {}

    /// A user function is about to run its body
    fn on_fn_call(&mut self, _name: &str, _frame: &FrameInventory) {}

    /// A user function returned. `None` when it returned no value.
    fn on_fn_end(&mut self, _name: &str, _return_value: Option<&Value>) {}

    /// `malloc` reserved `address` for a value of type `ty`
    fn on_dynamic_allocation(&mut self, _ty: &Type, _address: Address) {}

    /// A location was assigned, either by `=` or by parameter binding
    fn on_assign(&mut self, _place: &Place, _value: &Value) {}
}

/// Hooks that ignore every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl Hooks for NoHooks {}

impl<H: Hooks + ?Sized> Hooks for &mut H {
    fn on_print(&mut self, text: &str) {
        (**self).on_print(text)
    }

    fn on_fn_call(&mut self, name: &str, frame: &FrameInventory) {
        (**self).on_fn_call(name, frame)
    }

    fn on_fn_end(&mut self, name: &str, return_value: Option<&Value>) {
        (**self).on_fn_end(name, return_value)
    }

    fn on_dynamic_allocation(&mut self, ty: &Type, address: Address) {
        (**self).on_dynamic_allocation(ty, address)
    }

    fn on_assign(&mut self, place: &Place, value: &Value) {
        (**self).on_assign(place, value)
    }
}

impl<H: Hooks + ?Sized> Hooks for Box<H> {
    fn on_print(&mut self, text: &str) {
        (**self).on_print(text)
    }

    fn on_fn_call(&mut self, name: &str, frame: &FrameInventory) {
        (**self).on_fn_call(name, frame)
    }

    fn on_fn_end(&mut self, name: &str, return_value: Option<&Value>) {
        (**self).on_fn_end(name, return_value)
    }

    fn on_dynamic_allocation(&mut self, ty: &Type, address: Address) {
        (**self).on_dynamic_allocation(ty, address)
    }

    fn on_assign(&mut self, place: &Place, value: &Value) {
        (**self).on_assign(place, value)
    }
}
