// Constants for the stepper

/// Address of the first heap allocation
pub const HEAP_ADDRESS_START: u64 = 10_000;

/// Distance between two successive heap allocations.
/// Every allocation occupies exactly one cell, whatever its type.
pub const HEAP_CELL_SIZE: usize = 4;

/// Most scalar cells a single default-initialized value may hold.
/// Larger frame slots or heap cells fail with `AllocationTooLarge`.
pub const MAX_DEFAULT_CELLS: usize = 1 << 24;

/// Name of the function the driver calls on construction
pub const ENTRY_FUNCTION: &str = "main";
