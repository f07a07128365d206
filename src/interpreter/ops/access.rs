//! Member, index and dereference locations
//!
//! None of these read the addressed value. They reduce to a [`Place`] that
//! the consumer (assignment, an operator, a call argument) resolves or stores.

use crate::interpreter::continuation::{Kont, Transition};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::hooks::Hooks;
use crate::interpreter::machine::{continue_with, expect_place, Machine};
use crate::memory::location::{Operand, Place};
use crate::parser::ast::NodeRef;

impl<H: Hooks> Machine<H> {
    pub(crate) fn apply_member(
        &mut self,
        field: String,
        base: Operand,
    ) -> Result<Transition, RuntimeError> {
        let base = expect_place(base)?;
        Ok(continue_with(Operand::Place(Place::Member(
            Box::new(base),
            field,
        ))))
    }

    /// Base is reduced; evaluate the index next
    pub(crate) fn apply_index_base(
        &mut self,
        index: NodeRef,
        base: Operand,
    ) -> Result<Transition, RuntimeError> {
        let base = expect_place(base)?;
        Ok(self.descend(Kont::Index(base), &index))
    }

    pub(crate) fn apply_index(&mut self, base: Place, index: Operand) -> Transition {
        continue_with(Operand::Place(Place::Index(Box::new(base), Box::new(index))))
    }

    /// The pointer itself is read here; the cell it points to is not
    pub(crate) fn apply_deref(&mut self, pointer: Operand) -> Result<Transition, RuntimeError> {
        let address = self.value_of(&pointer)?.as_address()?;
        Ok(continue_with(Operand::Place(Place::Deref(address))))
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::errors::RuntimeError;
    use crate::interpreter::hooks::NoHooks;
    use crate::interpreter::machine::tests::{run_expression, run_expression_in};
    use crate::interpreter::machine::Machine;
    use crate::memory::value::Value;
    use crate::memory::Memory;

    fn machine_with_node() -> Machine<NoHooks> {
        let mut memory = Memory::default();
        let address = memory.heap.allocate();
        memory
            .heap
            .store(
                address,
                Value::Struct(vec![
                    ("val".to_string(), Value::Number(0.0)),
                    ("next".to_string(), Value::Unset),
                ]),
            )
            .unwrap();
        memory.globals.define("p", Value::Pointer(address));
        memory.globals.define(
            "arr",
            Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]),
        );
        Machine::new(memory, NoHooks)
    }

    #[test]
    fn test_arrow_reads_and_writes_heap_cell() {
        let mut machine = machine_with_node();

        run_expression_in(&mut machine, "p->val = 7").unwrap();
        assert_eq!(
            run_expression_in(&mut machine, "p->val + 1").unwrap(),
            Value::Number(8.0)
        );
        assert_eq!(
            machine.memory.heap.load(10_000).unwrap().field("val"),
            Some(&Value::Number(7.0))
        );
    }

    #[test]
    fn test_index_is_resolved_at_use() {
        let mut machine = machine_with_node();

        run_expression_in(&mut machine, "i = 1").unwrap();
        run_expression_in(&mut machine, "arr[i] = arr[0] + 10").unwrap();
        assert_eq!(
            machine.memory.globals.get("arr"),
            Some(&Value::Array(vec![Value::Number(1.0), Value::Number(11.0)]))
        );

        assert!(matches!(
            run_expression_in(&mut machine, "arr[2]"),
            Err(RuntimeError::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_member_errors() {
        let mut machine = machine_with_node();
        assert!(matches!(
            run_expression_in(&mut machine, "p->missing"),
            Err(RuntimeError::MissingStructField { .. })
        ));
        assert!(matches!(
            run_expression_in(&mut machine, "p->next->val"),
            Err(RuntimeError::TypeError { .. })
        ));
        assert!(matches!(
            run_expression("NULL->val"),
            Err(RuntimeError::InvalidAddress { address: 0 })
        ));
    }
}
