//! `while` loops
//!
//! The condition is a steppoint of its own, so every test of the condition is
//! one step. A true condition runs the body and then evaluates the loop node
//! again; there is no `break` or `continue`.

use crate::interpreter::continuation::{Control, Kont, Transition};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::hooks::Hooks;
use crate::interpreter::machine::{continue_with, Machine};
use crate::memory::location::Operand;
use crate::parser::ast::NodeRef;

impl<H: Hooks> Machine<H> {
    pub(crate) fn apply_loop_test(
        &mut self,
        looped: NodeRef,
        body: NodeRef,
        condition: Operand,
    ) -> Result<Transition, RuntimeError> {
        if !self.value_of(&condition)?.is_truthy() {
            return Ok(continue_with(Operand::Unit));
        }

        self.konts.push(Kont::LoopRepeat(looped));
        Ok(Transition::Continue(Control::Eval(body)))
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::continuation::{Control, Kont};
    use crate::interpreter::hooks::NoHooks;
    use crate::interpreter::machine::Machine;
    use crate::memory::value::Value;
    use crate::memory::Memory;
    use crate::parser::parse::Parser;

    fn count_steps(source: &str) -> (Machine<NoHooks>, usize) {
        let stmt = Parser::new(source)
            .and_then(|mut parser| parser.parse_single_statement())
            .unwrap();
        let mut machine = Machine::new(Memory::default(), NoHooks);
        machine.konts.push(Kont::Halt);

        let mut control = Some(Control::Eval(stmt));
        let mut steps = 0;
        while let Some(next) = control {
            control = machine.run(next).unwrap();
            steps += 1;
        }
        (machine, steps)
    }

    #[test]
    fn test_loop_repeats_until_condition_fails() {
        let (machine, _) = count_steps("{ i = 0; while (i < 3) { i = i + 1; } }");
        assert_eq!(machine.memory.globals.get("i"), Some(&Value::Number(3.0)));
    }

    #[test]
    fn test_each_condition_test_is_a_step() {
        // 1 assignment, 4 condition tests, 3 increments, then the final run
        let (_, steps) = count_steps("{ i = 0; while (i < 3) i = i + 1; }");
        assert_eq!(steps, 9);
    }

    #[test]
    fn test_false_condition_skips_body() {
        let (machine, _) = count_steps("while (0) { x = 1; }");
        assert!(machine.memory.globals.get("x").is_none());
    }
}
