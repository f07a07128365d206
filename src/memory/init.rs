//! Default values for freshly allocated storage
//!
//! Every frame slot and heap cell starts out with the zero value of its
//! declared type:
//!
//! | Type            | Default                               |
//! |-----------------|---------------------------------------|
//! | base            | `0` (`string` → empty string)         |
//! | pointer         | [`Value::Unset`], never `0`           |
//! | array of `T[n]` | `n` defaults of `T`                   |
//! | struct          | per-field defaults, declared order    |

use super::value::Value;
use crate::interpreter::constants::MAX_DEFAULT_CELLS;
use crate::interpreter::errors::RuntimeError;
use crate::parser::ast::{BaseType, Type};

/// Produce the zero value of `ty`.
///
/// Fails without allocating when the value would hold more than
/// [`MAX_DEFAULT_CELLS`] scalar cells.
pub fn default_value(ty: &Type) -> Result<Value, RuntimeError> {
    match cell_count(ty) {
        Some(cells) if cells <= MAX_DEFAULT_CELLS => Ok(build(ty)),
        _ => Err(RuntimeError::AllocationTooLarge {
            ty: ty.to_string(),
            limit: MAX_DEFAULT_CELLS,
        }),
    }
}

/// Scalar cells in a value of `ty`; `None` on overflow
fn cell_count(ty: &Type) -> Option<usize> {
    match ty {
        Type::Array(element, len) => len.checked_mul(cell_count(element)?),
        Type::Struct { fields, .. } => fields
            .iter()
            .try_fold(0usize, |total, (_, field_ty)| {
                total.checked_add(cell_count(field_ty)?)
            })
            .map(|cells| cells.max(1)),
        _ => Some(1),
    }
}

fn build(ty: &Type) -> Value {
    match ty {
        Type::Base(BaseType::Str) => Value::Str(String::new()),
        Type::Base(_) => Value::Number(0.0),
        Type::Pointer(_) => Value::Unset,
        // A struct known only by name carries no layout to build from
        Type::Named(_) => Value::Unset,
        Type::Array(element, len) => Value::Array((0..*len).map(|_| build(element)).collect()),
        Type::Struct { fields, .. } => Value::Struct(
            fields
                .iter()
                .map(|(name, field_ty)| (name.clone(), build(field_ty)))
                .collect(),
        ),
    }
}
