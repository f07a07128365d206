//! Runtime type constructors
//!
//! Type nodes only show up where a type is inspected while running, such as
//! the argument of `malloc`. Each sub-part is stepped like any other node and
//! the resolved [`Type`] is rebuilt on the way back up.

use crate::interpreter::continuation::{Control, Kont, Transition};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::hooks::Hooks;
use crate::interpreter::machine::{continue_with, Machine};
use crate::memory::location::Operand;
use crate::parser::ast::{NodeRef, Type, TypeExpr};
use std::rc::Rc;

impl<H: Hooks> Machine<H> {
    pub(crate) fn eval_type(&mut self, expr: &TypeExpr) -> Result<Transition, RuntimeError> {
        match expr {
            TypeExpr::Base(base) => Ok(continue_with(Operand::Type(Type::Base(*base)))),
            TypeExpr::Named(name) => Ok(continue_with(Operand::Type(Type::Named(name.clone())))),
            TypeExpr::Pointer(inner) => Ok(self.descend(Kont::TypePointer, inner)),
            TypeExpr::Array { element, size } => {
                Ok(self.descend(Kont::TypeArraySize(size.clone()), element))
            }
            TypeExpr::Struct { name, fields } => {
                Ok(self.next_field(name.clone(), fields.clone(), Vec::new()))
            }
        }
    }

    pub(crate) fn apply_type_pointer(&mut self, inner: Operand) -> Result<Transition, RuntimeError> {
        let inner = expect_type(inner)?;
        Ok(continue_with(Operand::Type(Type::Pointer(Box::new(inner)))))
    }

    /// Element type is resolved; evaluate the size next
    pub(crate) fn apply_type_array_size(
        &mut self,
        size: NodeRef,
        element: Operand,
    ) -> Result<Transition, RuntimeError> {
        let element = expect_type(element)?;
        Ok(self.descend(Kont::TypeArray(element), &size))
    }

    pub(crate) fn apply_type_array(
        &mut self,
        element: Type,
        size: Operand,
    ) -> Result<Transition, RuntimeError> {
        let size = self.value_of(&size)?.to_number()?;
        if !size.is_finite() || size < 0.0 {
            return Err(RuntimeError::TypeError {
                expected: "array size".to_string(),
                got: size.to_string(),
            });
        }
        Ok(continue_with(Operand::Type(Type::Array(
            Box::new(element),
            size as usize,
        ))))
    }

    pub(crate) fn apply_type_struct_field(
        &mut self,
        name: String,
        fields: Rc<[(String, NodeRef)]>,
        mut done: Vec<(String, Type)>,
        field_type: Operand,
    ) -> Result<Transition, RuntimeError> {
        let field_type = expect_type(field_type)?;
        let field_name = fields[done.len()].0.clone();
        done.push((field_name, field_type));
        Ok(self.next_field(name, fields, done))
    }

    /// Resolve the next field in declaration order, or finish the struct
    fn next_field(
        &mut self,
        name: String,
        fields: Rc<[(String, NodeRef)]>,
        done: Vec<(String, Type)>,
    ) -> Transition {
        match fields.get(done.len()).map(|(_, node)| node.clone()) {
            Some(node) => {
                self.konts.push(Kont::TypeStruct { name, fields, done });
                Transition::Continue(Control::Eval(node))
            }
            None => continue_with(Operand::Type(Type::Struct { name, fields: done })),
        }
    }
}

fn expect_type(operand: Operand) -> Result<Type, RuntimeError> {
    match operand {
        Operand::Type(ty) => Ok(ty),
        other => Err(RuntimeError::TypeError {
            expected: "type".to_string(),
            got: other.kind().to_string(),
        }),
    }
}
