// Constants for the processor

/// Default memory limit for a recorded execution trace (64 MiB)
pub const TRACE_MEMORY_LIMIT: usize = 64 * 1024 * 1024;

/// Maximum number of instructions a recorded trace will execute
pub const TRACE_STEP_LIMIT: usize = 100_000;
