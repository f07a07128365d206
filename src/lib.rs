//! # Introduction
//!
//! cstep runs a small subset of C one statement at a time. After every step
//! the caller can look at the current source position, the call stack, the
//! heap and the global namespace, which makes it a back end for program
//! visualizers and teaching tools.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Parser → Analysis → CompiledFile → Interpreter (step/run) → Hooks
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds the tree with a steppoint
//!    around every statement, then resolves types and frame inventories.
//! 2. [`interpreter`]: the stepping machine and its driver,
//!    [`interpreter::Interpreter`].
//! 3. [`memory`]: [`memory::value::Value`]s in a
//!    [`memory::stack::Stack`] of frames, a never-reclaimed
//!    [`memory::heap::Heap`] and [`memory::globals::Globals`].
//! 4. [`snapshot`]: owned [`snapshot::Snapshot`]s of that state and
//!    [`snapshot::Recorder`], a hooks implementation that logs every event.
//!
//! ## Supported C subset
//!
//! Types: `int`, `char`, `float`, `string`, `void`, structs/classes, pointers,
//! fixed-size arrays.
//! Control flow: `while`, `return`, blocks.
//! Operators: `+ - * /`, comparisons, `=`, member/index/arrow access, unary
//! `-`/`+`. Other operators parse but stop the run when evaluated.
//! Built-ins: `print`, `malloc`.
//!
//! ```
//! use cstep::interpreter::Interpreter;
//! use cstep::snapshot::Recorder;
//!
//! let source = "int main() { int x; x = 2; x = x + 3; print(x); }";
//! let mut interp = Interpreter::with_hooks(source, Recorder::new()).unwrap();
//! interp.run().unwrap();
//! assert_eq!(interp.hooks().terminal.get_output(), vec!["5"]);
//! ```

pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod snapshot;
