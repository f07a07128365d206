//! Built-in function implementations
//!
//! Builtins live in the global namespace next to user functions and always
//! take exactly one argument.
//!
//! # Supported Built-ins
//!
//! - `print(x)`: hands the display text of `x` to [`Hooks::on_print`] and
//!   evaluates to the builtin itself
//! - `malloc(T)`: reserves one heap cell for a value of type `T`, fires
//!   [`Hooks::on_dynamic_allocation`], stores `T`'s default value and
//!   evaluates to a pointer to the cell
//!
//! # Implementation Notes
//!
//! - Heap cells are never reclaimed; there is no `free`
//! - Every allocation takes one fixed increment of address space, whatever
//!   the type

use crate::interpreter::continuation::Transition;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::hooks::Hooks;
use crate::interpreter::machine::{continue_with, Machine};
use crate::memory::init::default_value;
use crate::memory::location::Operand;
use crate::memory::value::Value;
use crate::parser::ast::Builtin;
use tracing::debug;

impl<H: Hooks> Machine<H> {
    pub(crate) fn call_builtin(
        &mut self,
        builtin: Builtin,
        argument: Operand,
    ) -> Result<Transition, RuntimeError> {
        match builtin {
            Builtin::Print => self.builtin_print(argument),
            Builtin::Malloc => self.builtin_malloc(argument),
        }
    }

    fn builtin_print(&mut self, argument: Operand) -> Result<Transition, RuntimeError> {
        let text = self.value_of(&argument)?.to_string();
        self.hooks.on_print(&text);
        Ok(continue_with(Operand::Builtin(Builtin::Print)))
    }

    fn builtin_malloc(&mut self, argument: Operand) -> Result<Transition, RuntimeError> {
        let Operand::Type(ty) = argument else {
            return Err(RuntimeError::TypeError {
                expected: "type".to_string(),
                got: argument.kind().to_string(),
            });
        };

        let value = default_value(&ty)?;
        let address = self.memory.heap.allocate();
        self.hooks.on_dynamic_allocation(&ty, address);
        self.memory.heap.store(address, value)?;
        debug!(%ty, address, "allocated");

        Ok(continue_with(Operand::Lit(Value::Pointer(address))))
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::errors::RuntimeError;
    use crate::interpreter::hooks::Hooks;
    use crate::interpreter::machine::tests::run_expression_in;
    use crate::interpreter::machine::Machine;
    use crate::memory::value::{Address, Value};
    use crate::memory::Memory;
    use crate::parser::ast::{BaseType, Type};

    #[derive(Default)]
    struct Log {
        printed: Vec<String>,
        allocations: Vec<(Type, Address)>,
    }

    impl Hooks for Log {
        fn on_print(&mut self, text: &str) {
            self.printed.push(text.to_string());
        }

        fn on_dynamic_allocation(&mut self, ty: &Type, address: Address) {
            self.allocations.push((ty.clone(), address));
        }
    }

    #[test]
    fn test_print_formats_values() {
        let mut machine = Machine::new(Memory::default(), Log::default());

        run_expression_in(&mut machine, "print(1 + 1)").unwrap();
        run_expression_in(&mut machine, "print(7 / 2)").unwrap();
        run_expression_in(&mut machine, "print(\"hi\")").unwrap();
        run_expression_in(&mut machine, "print(1 < 2)").unwrap();
        run_expression_in(&mut machine, "print('a')").unwrap();

        assert_eq!(machine.hooks.printed, vec!["2", "3.5", "hi", "true", "97"]);
    }

    #[test]
    fn test_print_evaluates_to_itself() {
        let mut machine = Machine::new(Memory::default(), Log::default());
        assert_eq!(
            run_expression_in(&mut machine, "print(0)").unwrap(),
            Value::Builtin(crate::parser::ast::Builtin::Print)
        );
    }

    #[test]
    fn test_malloc_allocates_consecutive_cells() {
        let mut machine = Machine::new(Memory::default(), Log::default());

        let first = run_expression_in(&mut machine, "malloc(int)").unwrap();
        let second = run_expression_in(&mut machine, "malloc(string)").unwrap();

        assert_eq!(first, Value::Pointer(10_000));
        assert_eq!(second, Value::Pointer(10_004));
        assert_eq!(
            machine.hooks.allocations,
            vec![
                (Type::Base(BaseType::Int), 10_000),
                (Type::Base(BaseType::Str), 10_004),
            ]
        );
        assert_eq!(machine.memory.heap.load(10_000).unwrap(), &Value::Number(0.0));
        assert_eq!(
            machine.memory.heap.load(10_004).unwrap(),
            &Value::Str(String::new())
        );
    }

    #[test]
    fn test_malloc_needs_a_type() {
        let mut machine = Machine::new(Memory::default(), Log::default());
        assert!(matches!(
            run_expression_in(&mut machine, "malloc(4)"),
            Err(RuntimeError::TypeError { .. })
        ));
        assert!(machine.hooks.allocations.is_empty());
    }
}
