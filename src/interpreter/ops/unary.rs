//! Unary operator evaluation

use crate::interpreter::continuation::Transition;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::hooks::Hooks;
use crate::interpreter::machine::{continue_with, Machine};
use crate::memory::location::Operand;
use crate::memory::value::Value;
use crate::parser::ast::UnOp;

impl<H: Hooks> Machine<H> {
    pub(crate) fn apply_unary(
        &mut self,
        op: UnOp,
        operand: Operand,
    ) -> Result<Transition, RuntimeError> {
        match op {
            UnOp::Neg => {
                let value = self.value_of(&operand)?.to_number()?;
                Ok(continue_with(Operand::Lit(Value::Number(-value))))
            }
            UnOp::Plus => Ok(continue_with(operand)),
            _ => Err(unsupported(op)),
        }
    }
}

fn unsupported(op: UnOp) -> RuntimeError {
    RuntimeError::UnsupportedOperator {
        operator: op.symbol(),
        arity: "unary",
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::errors::RuntimeError;
    use crate::interpreter::machine::tests::run_expression;
    use crate::memory::value::Value;

    #[test]
    fn test_negation() {
        assert_eq!(run_expression("-5").unwrap(), Value::Number(-5.0));
        assert_eq!(run_expression("- -2").unwrap(), Value::Number(2.0));
        assert_eq!(run_expression("+7").unwrap(), Value::Number(7.0));
    }

    #[test]
    fn test_unimplemented_unary_operators_are_fatal() {
        for source in ["!1", "~1", "&1", "*1", "++1", "sizeof 1"] {
            let err = run_expression(source).unwrap_err();
            assert!(
                matches!(err, RuntimeError::UnsupportedOperator { arity: "unary", .. }),
                "{}: {:?}",
                source,
                err
            );
        }
    }
}
