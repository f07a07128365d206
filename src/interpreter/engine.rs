// Stepper driver for the C subset

use crate::interpreter::constants::{ENTRY_FUNCTION, HEAP_ADDRESS_START, HEAP_CELL_SIZE};
use crate::interpreter::continuation::Control;
use crate::interpreter::errors::{Error, RuntimeError};
use crate::interpreter::hooks::{Hooks, NoHooks};
use crate::interpreter::machine::Machine;
use crate::memory::globals::Globals;
use crate::memory::heap::{BumpAllocator, Heap};
use crate::memory::stack::Stack;
use crate::memory::value::Address;
use crate::memory::Memory;
use crate::parser::ast::{CompiledFile, Span};
use crate::parser::compile_file;
use crate::snapshot::Snapshot;
use tracing::{debug, warn};

/// Interpreter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Opaque error-format tag, kept for whoever reports errors
    pub error_format: Option<String>,
    /// Address of the first heap allocation
    pub heap_start: Address,
    /// Distance between consecutive heap allocations
    pub heap_increment: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            error_format: None,
            heap_start: HEAP_ADDRESS_START,
            heap_increment: HEAP_CELL_SIZE,
        }
    }
}

/// Where the driver stands after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    /// Stopped in front of a statement; more steps will run it
    Paused,
    /// The program finished or was aborted
    Done,
}

impl StepState {
    pub fn is_done(self) -> bool {
        self == StepState::Done
    }
}

/// Statement-by-statement driver for one program
///
/// Construction compiles the source, calls `main` and runs up to the first
/// statement. Each [`step`](Interpreter::step) then runs exactly one
/// statement (or one loop condition) and stops in front of the next.
pub struct Interpreter<H: Hooks = NoHooks> {
    machine: Machine<H>,

    /// How to resume; `None` once the program is done
    pending: Option<Control>,

    /// Error that aborted the run, if any
    fault: Option<RuntimeError>,

    error_format: Option<String>,
}

impl Interpreter<NoHooks> {
    /// Create an interpreter that reports nothing
    pub fn new(source: &str) -> Result<Self, Error> {
        Self::with_hooks(source, NoHooks)
    }
}

impl<H: Hooks> Interpreter<H> {
    pub fn with_hooks(source: &str, hooks: H) -> Result<Self, Error> {
        Self::with_options(source, Options::default(), hooks)
    }

    pub fn with_options(source: &str, options: Options, hooks: H) -> Result<Self, Error> {
        let file = compile_file(source)?;
        Self::from_compiled(&file, options, hooks)
    }

    /// Create an interpreter for an already compiled file
    pub fn from_compiled(file: &CompiledFile, options: Options, hooks: H) -> Result<Self, Error> {
        if file.function(ENTRY_FUNCTION).is_none() {
            return Err(RuntimeError::NoMainFunction.into());
        }

        let allocator = BumpAllocator::new(options.heap_start, options.heap_increment);
        let mut memory = Memory::new(Heap::new(Box::new(allocator)));
        memory.define_functions(file);

        let mut machine = Machine::new(memory, hooks);
        let start = machine.start(ENTRY_FUNCTION);
        let pending = machine.run(start)?;
        debug!(position = ?machine.position, "interpreter ready");

        Ok(Interpreter {
            machine,
            pending,
            fault: None,
            error_format: options.error_format,
        })
    }

    /// Run the next statement and pause in front of the one after it
    ///
    /// The position moves onto the statement as it starts running, and onto a
    /// function's header when that statement enters a call.
    ///
    /// Stepping a finished program does nothing and reports
    /// [`StepState::Done`] again. A runtime error aborts the run: it is
    /// returned once, the position stays on the failing statement, and later
    /// steps report `Done`.
    pub fn step(&mut self) -> Result<StepState, RuntimeError> {
        let Some(control) = self.pending.take() else {
            return Ok(StepState::Done);
        };

        match self.machine.run(control) {
            Ok(next) => {
                self.pending = next;
                Ok(self.state())
            }
            Err(err) => {
                self.machine.abort();
                warn!(error = %err, position = ?self.machine.position, "run aborted");
                self.fault = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Step until the program is done
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        while !self.step()?.is_done() {}
        Ok(())
    }

    pub fn state(&self) -> StepState {
        match self.pending {
            Some(_) => StepState::Paused,
            None => StepState::Done,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state().is_done()
    }

    /// Span of the statement the last step ran, or the header of the function
    /// it entered; `None` once the program returned from `main`
    pub fn position(&self) -> Option<Span> {
        self.machine.position
    }

    pub fn stack(&self) -> &Stack {
        &self.machine.memory.stack
    }

    pub fn heap(&self) -> &Heap {
        &self.machine.memory.heap
    }

    pub fn globals(&self) -> &Globals {
        &self.machine.memory.globals
    }

    pub fn hooks(&self) -> &H {
        &self.machine.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.machine.hooks
    }

    pub fn into_hooks(self) -> H {
        self.machine.hooks
    }

    /// The error that aborted the run, if any
    pub fn fault(&self) -> Option<&RuntimeError> {
        self.fault.as_ref()
    }

    pub fn error_format(&self) -> Option<&str> {
        self.error_format.as_deref()
    }

    /// Owned copy of the current position and memory
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.machine.memory, self.machine.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::value::Value;

    #[test]
    fn test_construction_pauses_on_main_header() {
        let source = "int main() {\n  int x;\n  x = 1;\n}";
        let mut interp = Interpreter::new(source).unwrap();

        assert_eq!(interp.state(), StepState::Paused);
        assert_eq!(interp.position().and_then(|s| s.text(source)), Some("int main()"));
        assert_eq!(interp.stack().depth(), 1);
        assert_eq!(interp.stack().current_frame().function_name, "main");

        interp.step().unwrap();
        assert_eq!(interp.position().and_then(|s| s.text(source)), Some("int x;"));
    }

    #[test]
    fn test_empty_main_finishes_during_construction() {
        let interp = Interpreter::new("int main() { }").unwrap();
        assert!(interp.is_done());
        assert_eq!(interp.position(), None);
        assert_eq!(interp.stack().depth(), 0);
    }

    #[test]
    fn test_missing_main() {
        assert!(matches!(
            Interpreter::new("int helper() { return 1; }"),
            Err(Error::Runtime(RuntimeError::NoMainFunction))
        ));
        assert!(matches!(
            Interpreter::new("int main() { int x }"),
            Err(Error::Compile(_))
        ));
    }

    #[test]
    fn test_fault_is_sticky() {
        let source = "int main() {\n  int x;\n  x = 5 % 2;\n  x = 1;\n}";
        let mut interp = Interpreter::new(source).unwrap();

        assert_eq!(interp.step(), Ok(StepState::Paused));
        let err = interp.step().unwrap_err();
        assert!(matches!(err, RuntimeError::UnsupportedOperator { .. }));
        assert_eq!(interp.fault(), Some(&err));
        assert_eq!(interp.position().and_then(|s| s.text(source)), Some("x = 5 % 2;"));

        assert_eq!(interp.step(), Ok(StepState::Done));
        assert_eq!(interp.step(), Ok(StepState::Done));
        assert_eq!(
            interp.stack().current_frame().get_var("x"),
            Some(&Value::Number(0.0))
        );
    }

    #[test]
    fn test_options_move_the_heap() {
        let options = Options {
            error_format: Some("long".to_string()),
            heap_start: 500,
            heap_increment: 8,
        };
        let mut interp = Interpreter::with_options(
            "int main() { int* a; int* b; a = malloc(int); b = malloc(int); }",
            options,
            NoHooks,
        )
        .unwrap();
        interp.run().unwrap();

        let addresses: Vec<Address> = interp.heap().cells().map(|(addr, _)| addr).collect();
        assert_eq!(addresses, vec![500, 508]);
        assert_eq!(interp.error_format(), Some("long"));
    }
}
