//! Statement stepper for the C subset
//!
//! This module provides the execution logic:
//! - [`engine`]: [`Interpreter`], the driver with `step()`/`run()`
//! - [`hooks`]: Observation callbacks
//! - [`errors`]: Runtime error types
//! - [`constants`]: Entry point name, heap layout and size limits
//!
//! # Execution Model
//!
//! Evaluation is continuation-passing with the continuations made explicit:
//! the machine keeps a work list of pending records and alternates between
//! evaluating a node and handing an operand to the innermost record. Nothing
//! recurses on the host stack, so deep guest recursion and long blocks cost
//! heap memory only.
//!
//! The parser wraps every statement (and every `while` condition) in a
//! steppoint. Reaching one is the only way the machine stops before the
//! program ends, so one step runs one statement. The visible position moves
//! when a paused statement resumes, and a call moves it to the callee's
//! header until the callee's first statement runs.
//!
//! # Built-in Functions
//!
//! `print` and `malloc` live in the global namespace next to user functions;
//! see `builtins`.

mod builtins;
pub mod constants;
pub(crate) mod continuation;
pub mod engine;
pub mod errors;
pub mod hooks;
mod loops;
pub(crate) mod machine;
mod ops;

pub use engine::{Interpreter, Options, StepState};
pub use errors::{Error, RuntimeError};
pub use hooks::{Hooks, NoHooks};
