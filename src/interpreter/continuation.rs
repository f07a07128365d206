//! Explicit continuation records
//!
//! The stepper never recurses on the host stack to run the guest program.
//! Instead, "what happens once this node has produced its operand" is stored
//! as a [`Kont`] on a work list owned by the machine. Evaluating a node either
//! descends into a child (pushing the work left to do) or hands an operand to
//! the most recent record.

use crate::memory::location::{Operand, Place};
use crate::memory::value::Value;
use crate::parser::ast::{BinOp, Builtin, FunctionDef, NodeRef, Span, Type, UnOp};
use std::rc::Rc;

/// The machine's current instruction
#[derive(Debug, Clone)]
pub enum Control {
    /// Evaluate a node
    Eval(NodeRef),
    /// Hand an operand to the top continuation
    Apply(Operand),
    /// Run a paused statement, moving the position onto `span` first
    Resume { span: Span, stmt: NodeRef },
}

/// Outcome of one machine transition
#[derive(Debug)]
pub(crate) enum Transition {
    Continue(Control),
    /// A steppoint was reached; resume with this control on the next step
    Pause(Control),
    Halt,
}

/// Pending work, innermost last
#[derive(Debug, Clone)]
pub(crate) enum Kont {
    /// Bottom of the list: the entry call has returned
    Halt,
    /// Remaining statements of a block, starting at `next`
    Block { stmts: Rc<[NodeRef]>, next: usize },
    Unary(UnOp),
    /// Left operand done, right still to evaluate
    BinaryRight { op: BinOp, right: NodeRef },
    Binary { op: BinOp, left: Operand },
    Member(String),
    /// Base done, index still to evaluate
    IndexBase(NodeRef),
    Index(Place),
    Deref,
    Return,
    /// Callee evaluated next, then these arguments
    Callee(Rc<[NodeRef]>),
    BuiltinArg(Builtin),
    /// Arguments are evaluated from last to first; `index` is the one
    /// currently being evaluated
    Argument {
        function: Rc<FunctionDef>,
        args: Rc<[NodeRef]>,
        index: usize,
        bound: Vec<(String, Value)>,
    },
    /// Marks a call boundary; `return` unwinds to here
    FunctionBody(Rc<FunctionDef>),
    LoopTest { looped: NodeRef, body: NodeRef },
    LoopRepeat(NodeRef),
    TypePointer,
    TypeArraySize(NodeRef),
    TypeArray(Type),
    TypeStruct {
        name: String,
        fields: Rc<[(String, NodeRef)]>,
        done: Vec<(String, Type)>,
    },
}
