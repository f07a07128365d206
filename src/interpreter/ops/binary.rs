//! Binary operator evaluation
//!
//! Both operands are already reduced when these run (left first). Arithmetic
//! is done on real numbers: `7 / 2` is `3.5` and nothing wraps around.

use crate::interpreter::continuation::Transition;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::hooks::Hooks;
use crate::interpreter::machine::{continue_with, expect_place, Machine};
use crate::memory::location::Operand;
use crate::memory::value::Value;
use crate::parser::ast::BinOp;
use std::cmp::Ordering;

impl<H: Hooks> Machine<H> {
    pub(crate) fn apply_binary(
        &mut self,
        op: BinOp,
        left: Operand,
        right: Operand,
    ) -> Result<Transition, RuntimeError> {
        use BinOp::*;

        let result = match op {
            Assign => return self.assign(left, right),
            Add | Sub | Mul | Div => {
                let l = self.value_of(&left)?.to_number()?;
                let r = self.value_of(&right)?.to_number()?;
                Value::Number(arithmetic(op, l, r))
            }
            Lt | Gt | Le | Ge | Eq | Ne => {
                let l = self.value_of(&left)?;
                let r = self.value_of(&right)?;
                Value::Bool(compare(op, &l, &r)?)
            }
            _ => {
                return Err(RuntimeError::UnsupportedOperator {
                    operator: op.symbol(),
                    arity: "binary",
                })
            }
        };

        Ok(continue_with(Operand::Lit(result)))
    }

    /// `place = value`; the expression evaluates to the stored value
    fn assign(&mut self, target: Operand, source: Operand) -> Result<Transition, RuntimeError> {
        let place = expect_place(target)?;
        let value = self.value_of(&source)?;

        self.memory.store_location(&place, value.clone())?;
        self.hooks.on_assign(&place, &value);

        Ok(continue_with(Operand::Lit(value)))
    }
}

fn arithmetic(op: BinOp, l: f64, r: f64) -> f64 {
    match op {
        BinOp::Add => l + r,
        BinOp::Sub => l - r,
        BinOp::Mul => l * r,
        _ => l / r,
    }
}

/// Strings compare lexicographically, everything else numerically
fn compare(op: BinOp, l: &Value, r: &Value) -> Result<bool, RuntimeError> {
    let ordering = match (l, r) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => l.to_number()?.partial_cmp(&r.to_number()?),
    };

    // NaN (an unset pointer) is unordered and unequal to everything
    let Some(ordering) = ordering else {
        return Ok(op == BinOp::Ne);
    };

    Ok(match op {
        BinOp::Lt => ordering == Ordering::Less,
        BinOp::Gt => ordering == Ordering::Greater,
        BinOp::Le => ordering != Ordering::Greater,
        BinOp::Ge => ordering != Ordering::Less,
        BinOp::Eq => ordering == Ordering::Equal,
        _ => ordering != Ordering::Equal,
    })
}
