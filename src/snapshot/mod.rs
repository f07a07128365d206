// Inspectable copies of interpreter state and a recording hooks implementation

use crate::interpreter::hooks::Hooks;
use crate::memory::location::Place;
use crate::memory::value::{Address, Value};
use crate::memory::Memory;
use crate::parser::ast::{FrameInventory, Span, Type};

/// Mock terminal for capturing `print` output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockTerminal {
    pub lines: Vec<String>,
}

impl MockTerminal {
    pub fn new() -> Self {
        MockTerminal { lines: Vec::new() }
    }

    /// One `print` call; text may itself contain newlines
    pub fn print(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    /// Get all lines as a vector of strings
    pub fn get_output(&self) -> Vec<String> {
        self.lines
            .iter()
            .flat_map(|text| {
                let mut result: Vec<String> = text.split('\n').map(|s| s.to_string()).collect();
                // Remove trailing empty string if text ended with newline
                if result.len() > 1 && result.last().is_some_and(|s| s.is_empty()) {
                    result.pop();
                }
                result
            })
            .collect()
    }
}

/// Locals of one frame, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub function: String,
    pub vars: Vec<(String, Value)>,
}

/// Snapshot of execution state
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub position: Option<Span>,
    /// Outermost first; the root frame is included
    pub frames: Vec<FrameSnapshot>,
    /// Allocated cells in address order
    pub heap: Vec<(Address, Value)>,
    /// Globals in definition order
    pub globals: Vec<(String, Value)>,
}

impl Snapshot {
    pub fn capture(memory: &Memory, position: Option<Span>) -> Self {
        let frames = memory
            .stack
            .frames()
            .iter()
            .map(|frame| FrameSnapshot {
                function: frame.function_name.clone(),
                vars: frame
                    .vars()
                    .map(|(name, value)| (name.to_string(), value.clone()))
                    .collect(),
            })
            .collect();

        Snapshot {
            position,
            frames,
            heap: memory
                .heap
                .cells()
                .map(|(addr, value)| (addr, value.clone()))
                .collect(),
            globals: memory
                .globals
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        }
    }

    /// Locals of the innermost frame
    pub fn current_frame(&self) -> Option<&FrameSnapshot> {
        self.frames.last()
    }

    pub fn heap_value(&self, address: Address) -> Option<&Value> {
        self.heap
            .iter()
            .find(|(addr, _)| *addr == address)
            .map(|(_, value)| value)
    }
}

/// One hook invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Print(String),
    FnCall {
        name: String,
        frame: FrameInventory,
    },
    FnEnd {
        name: String,
        value: Option<Value>,
    },
    Allocation {
        ty: Type,
        address: Address,
    },
    Assign {
        place: Place,
        value: Value,
    },
}

/// Hooks that keep every event, with printed text also sent to a terminal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recorder {
    pub events: Vec<Event>,
    pub terminal: MockTerminal,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values passed to `on_assign`, in order
    pub fn assigned_values(&self) -> Vec<Value> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Assign { value, .. } => Some(value.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Hooks for Recorder {
    fn on_print(&mut self, text: &str) {
        self.terminal.print(text);
        self.events.push(Event::Print(text.to_string()));
    }

    fn on_fn_call(&mut self, name: &str, frame: &FrameInventory) {
        self.events.push(Event::FnCall {
            name: name.to_string(),
            frame: frame.clone(),
        });
    }

    fn on_fn_end(&mut self, name: &str, return_value: Option<&Value>) {
        self.events.push(Event::FnEnd {
            name: name.to_string(),
            value: return_value.cloned(),
        });
    }

    fn on_dynamic_allocation(&mut self, ty: &Type, address: Address) {
        self.events.push(Event::Allocation {
            ty: ty.clone(),
            address,
        });
    }

    fn on_assign(&mut self, place: &Place, value: &Value) {
        self.events.push(Event::Assign {
            place: place.clone(),
            value: value.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::stack::StackFrame;

    #[test]
    fn test_terminal_splits_lines() {
        let mut terminal = MockTerminal::new();
        terminal.print("a\nb\n");
        terminal.print("");
        terminal.print("c");
        assert_eq!(terminal.get_output(), vec!["a", "b", "", "c"]);
    }

    #[test]
    fn test_capture_copies_memory() {
        let mut memory = Memory::default();
        memory.stack.push_frame(StackFrame::new("main", 0));
        memory
            .stack
            .current_frame_mut()
            .declare_var("x", Value::Number(1.0));
        let addr = memory.heap.allocate();

        let snapshot = Snapshot::capture(&memory, Some(Span::new(0, 3)));
        memory
            .stack
            .current_frame_mut()
            .declare_var("y", Value::Number(2.0));

        assert_eq!(snapshot.frames.len(), 2);
        let main = snapshot.current_frame().unwrap();
        assert_eq!(main.function, "main");
        assert_eq!(main.vars, vec![("x".to_string(), Value::Number(1.0))]);
        assert_eq!(snapshot.heap_value(addr), Some(&Value::Unset));
        assert!(snapshot.globals.iter().any(|(name, _)| name == "NULL"));
        assert_ne!(snapshot, Snapshot::capture(&memory, Some(Span::new(0, 3))));
    }
}
