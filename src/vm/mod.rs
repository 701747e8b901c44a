//! Stack machine: opcode set, state, and the execution engine.

pub mod engine;
pub mod op;
pub mod state;

pub use engine::{RunFailure, VirtualMachine, VmError, VmStatus};
pub use op::Opcode;
pub use state::{HistoryEntry, VmState};
