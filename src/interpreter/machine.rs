//! The stepping machine
//!
//! [`Machine`] owns the whole execution state: memory, hooks, the externally
//! visible position and the continuation work list. It runs transitions until
//! a steppoint pauses it or the entry call returns.
//!
//! Node kinds are dispatched here; the per-kind work lives in `impl Machine`
//! blocks spread over sibling modules:
//! - `ops::unary`, `ops::binary`: operators
//! - `ops::access`: member, index and dereference locations
//! - `ops::call`: calls, parameter binding and `return`
//! - `ops::types`: runtime type constructors
//! - `builtins`: `print` and `malloc`
//! - `loops`: `while`

use crate::interpreter::continuation::{Control, Kont, Transition};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::hooks::Hooks;
use crate::memory::location::{Operand, Place};
use crate::memory::value::Value;
use crate::memory::Memory;
use crate::parser::ast::{Node, NodeRef, Span};
use std::rc::Rc;
use tracing::{debug, trace};

pub struct Machine<H> {
    pub(crate) memory: Memory,
    pub(crate) hooks: H,
    /// Span of the statement last resumed, or the header of a function just
    /// entered; `None` before start and after the end
    pub(crate) position: Option<Span>,
    pub(crate) konts: Vec<Kont>,
}

impl<H: Hooks> Machine<H> {
    pub fn new(memory: Memory, hooks: H) -> Self {
        Machine {
            memory,
            hooks,
            position: None,
            konts: Vec::new(),
        }
    }

    /// Control that calls `entry` with no arguments and halts when it returns
    pub(crate) fn start(&mut self, entry: &str) -> Control {
        self.konts.clear();
        self.konts.push(Kont::Halt);
        Control::Eval(Rc::new(Node::Call {
            callee: Rc::new(Node::var(entry)),
            args: Vec::<NodeRef>::new().into(),
        }))
    }

    /// Run from `control` until the next pause (returning how to resume) or
    /// until the program ends (returning `None`).
    pub(crate) fn run(&mut self, mut control: Control) -> Result<Option<Control>, RuntimeError> {
        loop {
            match self.transition(control)? {
                Transition::Continue(next) => control = next,
                Transition::Pause(next) => return Ok(Some(next)),
                Transition::Halt => return Ok(None),
            }
        }
    }

    fn transition(&mut self, control: Control) -> Result<Transition, RuntimeError> {
        match control {
            Control::Eval(node) => self.eval(node),
            Control::Apply(operand) => self.apply(operand),
            Control::Resume { span, stmt } => {
                self.position = Some(span);
                Ok(Transition::Continue(Control::Eval(stmt)))
            }
        }
    }

    /// Drop all pending work after a fatal error
    pub(crate) fn abort(&mut self) {
        self.konts.clear();
    }

    fn eval(&mut self, node: NodeRef) -> Result<Transition, RuntimeError> {
        trace!(kind = node.kind(), "eval");

        match node.as_ref() {
            Node::Literal(lit) => Ok(continue_with(Operand::Lit(lit.value.clone()))),
            Node::Var(name) => Ok(continue_with(Operand::Place(Place::Var(name.clone())))),
            Node::Builtin(builtin) => Ok(continue_with(Operand::Builtin(*builtin))),
            // Declared storage already exists; the initializer is not run
            Node::Nop | Node::Decl { .. } => Ok(continue_with(Operand::Unit)),
            Node::Type(expr) => self.eval_type(expr),
            Node::Block(stmts) => Ok(self.next_statement(stmts.clone(), 0)),
            Node::Unary { op, operand } => Ok(self.descend(Kont::Unary(*op), operand)),
            Node::Binary { op, left, right } => Ok(self.descend(
                Kont::BinaryRight {
                    op: *op,
                    right: right.clone(),
                },
                left,
            )),
            Node::Member { base, field } => Ok(self.descend(Kont::Member(field.clone()), base)),
            Node::Index { base, index } => Ok(self.descend(Kont::IndexBase(index.clone()), base)),
            Node::Deref(inner) => Ok(self.descend(Kont::Deref, inner)),
            Node::Return(Some(value)) => Ok(self.descend(Kont::Return, value)),
            Node::Return(None) => self.return_from_function(None),
            Node::Call { callee, args } => Ok(self.descend(Kont::Callee(args.clone()), callee)),
            // The position moves only once the statement is resumed
            Node::Steppoint { span, stmt } => {
                debug!(%span, depth = self.memory.stack.depth(), "paused");
                Ok(Transition::Pause(Control::Resume {
                    span: *span,
                    stmt: stmt.clone(),
                }))
            }
            Node::Loop { cond, body } => Ok(self.descend(
                Kont::LoopTest {
                    looped: node.clone(),
                    body: body.clone(),
                },
                cond,
            )),
        }
    }

    fn apply(&mut self, operand: Operand) -> Result<Transition, RuntimeError> {
        let Some(kont) = self.konts.pop() else {
            return Ok(Transition::Halt);
        };

        match kont {
            Kont::Halt => {
                self.position = None;
                debug!("program finished");
                Ok(Transition::Halt)
            }
            Kont::Block { stmts, next } => Ok(self.next_statement(stmts, next)),
            Kont::Unary(op) => self.apply_unary(op, operand),
            Kont::BinaryRight { op, right } => {
                Ok(self.descend(Kont::Binary { op, left: operand }, &right))
            }
            Kont::Binary { op, left } => self.apply_binary(op, left, operand),
            Kont::Member(field) => self.apply_member(field, operand),
            Kont::IndexBase(index) => self.apply_index_base(index, operand),
            Kont::Index(base) => Ok(self.apply_index(base, operand)),
            Kont::Deref => self.apply_deref(operand),
            Kont::Return => {
                let value = self.value_of(&operand)?;
                self.return_from_function(Some(value))
            }
            Kont::Callee(args) => self.apply_callee(operand, args),
            Kont::BuiltinArg(builtin) => self.call_builtin(builtin, operand),
            Kont::Argument {
                function,
                args,
                index,
                bound,
            } => self.bind_argument(function, args, index, bound, operand),
            Kont::FunctionBody(function) => self.finish_call(&function, operand),
            Kont::LoopTest { looped, body } => self.apply_loop_test(looped, body, operand),
            Kont::LoopRepeat(looped) => Ok(Transition::Continue(Control::Eval(looped))),
            Kont::TypePointer => self.apply_type_pointer(operand),
            Kont::TypeArraySize(size) => self.apply_type_array_size(size, operand),
            Kont::TypeArray(element) => self.apply_type_array(element, operand),
            Kont::TypeStruct { name, fields, done } => {
                self.apply_type_struct_field(name, fields, done, operand)
            }
        }
    }

    /// Push `kont` and evaluate `child`
    pub(crate) fn descend(&mut self, kont: Kont, child: &NodeRef) -> Transition {
        self.konts.push(kont);
        Transition::Continue(Control::Eval(child.clone()))
    }

    /// Run statement `next` of a block, or finish the block
    fn next_statement(&mut self, stmts: Rc<[NodeRef]>, next: usize) -> Transition {
        match stmts.get(next).cloned() {
            Some(stmt) => {
                self.konts.push(Kont::Block {
                    stmts,
                    next: next + 1,
                });
                Transition::Continue(Control::Eval(stmt))
            }
            None => continue_with(Operand::Unit),
        }
    }

    /// Value carried by a reduced operand
    pub(crate) fn value_of(&self, operand: &Operand) -> Result<Value, RuntimeError> {
        self.memory.evaluate_expression_value(operand)
    }
}

/// Hand `operand` to the next continuation
pub(crate) fn continue_with(operand: Operand) -> Transition {
    Transition::Continue(Control::Apply(operand))
}

/// Require a location, e.g. for the target of `=`
pub(crate) fn expect_place(operand: Operand) -> Result<Place, RuntimeError> {
    match operand {
        Operand::Place(place) => Ok(place),
        other => Err(RuntimeError::NotAddressable {
            found: other.kind(),
        }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::interpreter::hooks::NoHooks;
    use crate::parser::parse::Parser;

    /// Evaluate a standalone expression against empty memory
    pub(crate) fn run_expression(source: &str) -> Result<Value, RuntimeError> {
        run_expression_in(&mut Machine::new(Memory::default(), NoHooks), source)
    }

    pub(crate) fn run_expression_in<H: Hooks>(
        machine: &mut Machine<H>,
        source: &str,
    ) -> Result<Value, RuntimeError> {
        let node = Parser::new(source)
            .and_then(|mut parser| parser.parse_single_expression())
            .unwrap();
        let operand = reduce(machine, node)?;
        machine.value_of(&operand)
    }

    /// Evaluate `node` to its operand without going through a call
    pub(crate) fn reduce<H: Hooks>(
        machine: &mut Machine<H>,
        node: NodeRef,
    ) -> Result<Operand, RuntimeError> {
        let base = machine.konts.len();
        let mut control = Control::Eval(node);
        loop {
            if let Control::Apply(operand) = &control {
                if machine.konts.len() == base {
                    return Ok(operand.clone());
                }
            }
            match machine.transition(control)? {
                Transition::Continue(next) | Transition::Pause(next) => control = next,
                Transition::Halt => panic!("expression halted the machine"),
            }
        }
    }

    #[test]
    fn test_block_runs_statements_in_order() {
        let mut machine = Machine::new(Memory::default(), NoHooks);
        let stmts: Vec<NodeRef> = ["a = 1;", "b = a + 1;", "a = b * 10;"]
            .iter()
            .map(|s| {
                Parser::new(s)
                    .and_then(|mut parser| parser.parse_single_statement())
                    .unwrap()
            })
            .collect();
        machine.konts.push(Kont::Halt);

        let mut control = Some(Control::Eval(Rc::new(Node::Block(stmts.into()))));
        let mut pauses = 0;
        while let Some(next) = control {
            control = machine.run(next).unwrap();
            if control.is_some() {
                pauses += 1;
            }
        }

        assert_eq!(pauses, 3);
        assert_eq!(machine.position, None);
        assert_eq!(machine.memory.globals.get("a"), Some(&Value::Number(20.0)));
    }

    #[test]
    fn test_position_moves_when_a_statement_resumes() {
        let mut machine = Machine::new(Memory::default(), NoHooks);
        let source = "{\n  x = 4;\n  y = 5;\n}";
        let block = Parser::new(source)
            .and_then(|mut parser| parser.parse_single_statement())
            .unwrap();
        machine.konts.push(Kont::Halt);

        // Paused in front of `x = 4;`, which has not been resumed yet
        let resume = machine.run(Control::Eval(block)).unwrap().unwrap();
        assert_eq!(machine.position, None);

        let resume = machine.run(resume).unwrap().unwrap();
        assert_eq!(machine.position.and_then(|span| span.text(source)), Some("x = 4;"));
        assert_eq!(machine.memory.globals.get("x"), Some(&Value::Number(4.0)));
        assert!(machine.memory.globals.get("y").is_none());

        assert!(machine.run(resume).unwrap().is_none());
        assert_eq!(machine.memory.globals.get("y"), Some(&Value::Number(5.0)));
    }

    #[test]
    fn test_abort_drops_pending_work() {
        let mut machine = Machine::new(Memory::default(), NoHooks);
        let control = machine.start("main");
        assert!(matches!(
            machine.run(control),
            Err(RuntimeError::UndefinedVariable { .. })
        ));
        machine.abort();
        assert!(machine.konts.is_empty());
    }
}
