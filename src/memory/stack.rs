//! Call stack implementation
//!
//! This module provides the call stack for function execution:
//! - [`Stack`]: The call stack containing frames
//! - [`StackFrame`]: A single function's activation record
//!
//! The stack is seeded with one root frame ([`ROOT_FRAME`]) that is never
//! popped, so there is always a current frame while stepping.

use super::value::Value;
use rustc_hash::FxHashMap;

/// Name of the frame that exists before `main` is entered
pub const ROOT_FRAME: &str = "<global>";

/// Stack frame for a function call
#[derive(Debug, Clone, PartialEq)]
pub struct StackFrame {
    pub function_name: String,
    locals: FxHashMap<String, Value>,
    insertion_order: Vec<String>, // Track order of variable declarations
    /// Depth of the continuation stack when the call was made; returning
    /// discards everything pending above it.
    return_base: usize,
}

impl StackFrame {
    pub fn new(function_name: impl Into<String>, return_base: usize) -> Self {
        StackFrame {
            function_name: function_name.into(),
            locals: FxHashMap::default(),
            insertion_order: Vec::new(),
            return_base,
        }
    }

    /// Declare a local slot; redeclaring keeps the original position.
    pub fn declare_var(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if !self.locals.contains_key(&name) {
            self.insertion_order.push(name.clone());
        }
        self.locals.insert(name, value);
    }

    pub fn get_var(&self, name: &str) -> Option<&Value> {
        self.locals.get(name)
    }

    pub fn get_var_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.locals.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locals.contains_key(name)
    }

    /// Locals in declaration order
    pub fn vars(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.insertion_order
            .iter()
            .filter_map(|name| self.locals.get(name).map(|v| (name.as_str(), v)))
    }

    pub fn len(&self) -> usize {
        self.insertion_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insertion_order.is_empty()
    }

    pub fn return_base(&self) -> usize {
        self.return_base
    }
}

/// The call stack
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    frames: Vec<StackFrame>,
}

impl Stack {
    pub fn new() -> Self {
        Stack {
            frames: vec![StackFrame::new(ROOT_FRAME, 0)],
        }
    }

    /// Push a new stack frame
    pub fn push_frame(&mut self, frame: StackFrame) {
        self.frames.push(frame);
    }

    /// Pop the top stack frame. The root frame is never popped.
    pub fn pop_frame(&mut self) -> Option<StackFrame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Get the current (top) frame
    pub fn current_frame(&self) -> &StackFrame {
        // The root frame is never popped
        &self.frames[self.frames.len() - 1]
    }

    /// Get a mutable reference to the current frame
    pub fn current_frame_mut(&mut self) -> &mut StackFrame {
        let top = self.frames.len() - 1;
        &mut self.frames[top]
    }

    /// Get all frames, root first
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// Number of active calls (the root frame is not counted)
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_frame_is_never_popped() {
        let mut stack = Stack::new();
        assert_eq!(stack.depth(), 0);
        assert!(stack.pop_frame().is_none());
        assert_eq!(stack.current_frame().function_name, ROOT_FRAME);

        stack.push_frame(StackFrame::new("main", 1));
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.pop_frame().map(|f| f.function_name), Some("main".to_string()));
        assert_eq!(stack.frames().len(), 1);
    }

    #[test]
    fn test_frame_keeps_declaration_order() {
        let mut frame = StackFrame::new("f", 0);
        frame.declare_var("b", Value::Number(1.0));
        frame.declare_var("a", Value::Number(2.0));
        frame.declare_var("b", Value::Number(3.0));

        let vars: Vec<(&str, &Value)> = frame.vars().collect();
        assert_eq!(vars, vec![("b", &Value::Number(3.0)), ("a", &Value::Number(2.0))]);
    }
}
