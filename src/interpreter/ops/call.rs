//! Calls, parameter binding and `return`
//!
//! A call to a user function:
//! 1. reduces the callee to a function value
//! 2. evaluates the arguments from last to first, binding each to its
//!    parameter
//! 3. builds the frame from the function's inventory: bound parameters keep
//!    their argument, every other slot gets its type's default value
//! 4. pushes the frame, fires `on_fn_call` and moves the position to the
//!    function header
//! 5. runs the body above a [`Kont::FunctionBody`] marker
//!
//! `return` truncates the work list back to that marker, skipping whatever
//! was left of the body. Finishing the body pops the frame and fires
//! `on_fn_end`.

use crate::interpreter::continuation::{Control, Kont, Transition};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::hooks::Hooks;
use crate::interpreter::machine::{continue_with, Machine};
use crate::memory::init::default_value;
use crate::memory::location::{Operand, Place};
use crate::memory::stack::StackFrame;
use crate::memory::value::Value;
use crate::parser::ast::{FunctionDef, NodeRef};
use std::rc::Rc;
use tracing::debug;

impl<H: Hooks> Machine<H> {
    pub(crate) fn apply_callee(
        &mut self,
        callee: Operand,
        args: Rc<[NodeRef]>,
    ) -> Result<Transition, RuntimeError> {
        match self.value_of(&callee)? {
            Value::Builtin(builtin) => {
                if args.len() != 1 {
                    return Err(RuntimeError::ArgumentCountMismatch {
                        function: builtin.name().to_string(),
                        expected: 1,
                        got: args.len(),
                    });
                }
                Ok(self.descend(Kont::BuiltinArg(builtin), &args[0]))
            }
            Value::Function(function) => {
                if args.len() > function.params.len() {
                    return Err(RuntimeError::ArgumentCountMismatch {
                        function: function.name.clone(),
                        expected: function.params.len(),
                        got: args.len(),
                    });
                }
                match args.len().checked_sub(1) {
                    None => self.enter_function(function, Vec::new()),
                    Some(last) => {
                        let arg = args[last].clone();
                        self.konts.push(Kont::Argument {
                            function,
                            args,
                            index: last,
                            bound: Vec::new(),
                        });
                        Ok(Transition::Continue(Control::Eval(arg)))
                    }
                }
            }
            _ => Err(RuntimeError::NotCallable {
                found: callee.to_string(),
            }),
        }
    }

    /// Argument `index` is reduced; bind it and move to the one before it
    pub(crate) fn bind_argument(
        &mut self,
        function: Rc<FunctionDef>,
        args: Rc<[NodeRef]>,
        index: usize,
        mut bound: Vec<(String, Value)>,
        argument: Operand,
    ) -> Result<Transition, RuntimeError> {
        let value = self.value_of(&argument)?;
        bound.push((function.params[index].name.clone(), value));

        if index == 0 {
            return self.enter_function(function, bound);
        }

        let arg = args[index - 1].clone();
        self.konts.push(Kont::Argument {
            function,
            args,
            index: index - 1,
            bound,
        });
        Ok(Transition::Continue(Control::Eval(arg)))
    }

    fn enter_function(
        &mut self,
        function: Rc<FunctionDef>,
        bound: Vec<(String, Value)>,
    ) -> Result<Transition, RuntimeError> {
        let mut frame = StackFrame::new(function.name.clone(), self.konts.len());

        for (name, ty) in function.frame.iter() {
            match bound.iter().find(|(param, _)| param == name) {
                Some((_, value)) => {
                    self.hooks.on_assign(&Place::Var(name.to_string()), value);
                    frame.declare_var(name, value.clone());
                }
                None => frame.declare_var(name, default_value(ty)?),
            }
        }

        self.konts.push(Kont::FunctionBody(function.clone()));
        self.memory.stack.push_frame(frame);
        self.hooks.on_fn_call(&function.name, &function.frame);
        // Stays on the header until the body's first statement resumes
        self.position = Some(function.position);
        debug!(
            function = %function.name,
            depth = self.memory.stack.depth(),
            "entered function"
        );

        Ok(Transition::Continue(Control::Eval(function.body.clone())))
    }

    /// Leave the innermost function with `value`
    pub(crate) fn return_from_function(
        &mut self,
        value: Option<Value>,
    ) -> Result<Transition, RuntimeError> {
        if self.memory.stack.depth() == 0 {
            return Err(RuntimeError::ReturnOutsideFunction);
        }

        let base = self.memory.stack.current_frame().return_base();
        self.konts.truncate(base + 1);

        Ok(continue_with(match value {
            Some(value) => Operand::Lit(value),
            None => Operand::Unit,
        }))
    }

    /// The body finished, by `return` or by running off its end
    pub(crate) fn finish_call(
        &mut self,
        function: &FunctionDef,
        result: Operand,
    ) -> Result<Transition, RuntimeError> {
        let value = match result {
            Operand::Unit => None,
            other => Some(self.value_of(&other)?),
        };

        self.memory.stack.pop_frame();
        self.hooks.on_fn_end(&function.name, value.as_ref());
        debug!(
            function = %function.name,
            depth = self.memory.stack.depth(),
            "left function"
        );

        Ok(continue_with(match value {
            Some(value) => Operand::Lit(value),
            None => Operand::Unit,
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::errors::RuntimeError;
    use crate::interpreter::hooks::{Hooks, NoHooks};
    use crate::interpreter::machine::tests::run_expression_in;
    use crate::interpreter::machine::Machine;
    use crate::memory::value::Value;
    use crate::memory::Memory;
    use crate::parser::ast::FrameInventory;
    use crate::parser::compile_file;

    #[derive(Default)]
    struct Calls(Vec<String>);

    impl Hooks for Calls {
        fn on_fn_call(&mut self, name: &str, _frame: &FrameInventory) {
            self.0.push(format!("call {}", name));
        }

        fn on_fn_end(&mut self, name: &str, value: Option<&Value>) {
            match value {
                Some(value) => self.0.push(format!("end {} {}", name, value)),
                None => self.0.push(format!("end {}", name)),
            }
        }
    }

    fn machine<H: Hooks>(source: &str, hooks: H) -> Machine<H> {
        let file = compile_file(source).unwrap();
        let mut memory = Memory::default();
        memory.define_functions(&file);
        Machine::new(memory, hooks)
    }

    /// Steppoints inside called bodies are stepped over
    fn call<H: Hooks>(machine: &mut Machine<H>, expression: &str) -> Value {
        run_expression_in(machine, expression).unwrap()
    }

    #[test]
    fn test_call_returns_value_and_pops_frame() {
        let mut m = machine(
            "int add(int a, int b) { return a + b; }",
            Calls::default(),
        );

        assert_eq!(call(&mut m, "add(2, 3)"), Value::Number(5.0));
        assert_eq!(m.memory.stack.depth(), 0);
        assert!(m.konts.is_empty());
        assert_eq!(m.hooks.0, vec!["call add", "end add 5"]);
    }

    #[test]
    fn test_return_skips_rest_of_body() {
        let mut m = machine(
            "int f(int n) { while (1) { return n; x = 1; } x = 2; }",
            NoHooks,
        );
        assert_eq!(call(&mut m, "f(4)"), Value::Number(4.0));
        assert!(m.memory.globals.get("x").is_none());
    }

    #[test]
    fn test_recursion() {
        let mut m = machine(
            "int fact(int n) { while (n < 2) { return 1; } return n * fact(n - 1); }",
            Calls::default(),
        );
        assert_eq!(call(&mut m, "fact(5)"), Value::Number(120.0));
        assert_eq!(m.hooks.0.len(), 10);
        assert_eq!(m.hooks.0[4], "call fact");
        assert_eq!(m.hooks.0[5], "end fact 1");
    }

    #[test]
    fn test_missing_arguments_get_default_values() {
        let mut m = machine("int f(int a, int b) { return b; }", NoHooks);
        assert_eq!(call(&mut m, "f(1)"), Value::Number(0.0));
    }

    #[test]
    fn test_call_errors() {
        let mut m = machine("void f() { }", NoHooks);
        assert!(matches!(
            run_expression_in(&mut m, "f(1)"),
            Err(RuntimeError::ArgumentCountMismatch {
                expected: 0,
                got: 1,
                ..
            })
        ));
        assert!(matches!(
            run_expression_in(&mut m, "print(1, 2)"),
            Err(RuntimeError::ArgumentCountMismatch { expected: 1, got: 2, .. })
        ));
        assert!(matches!(
            run_expression_in(&mut m, "NULL(1)"),
            Err(RuntimeError::NotCallable { .. })
        ));
        // `f` has no return value to use
        assert!(matches!(
            run_expression_in(&mut m, "f()"),
            Err(RuntimeError::NotAValue { found: "statement" })
        ));
    }
}
