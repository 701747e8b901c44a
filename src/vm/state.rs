use crate::codon::Codon;
use crate::render::{Hsl, Transform};
use crate::vm::op::Opcode;
use serde::{Deserialize, Serialize};

/// Transform and colour captured by SAVE_STATE.
///
/// RESTORE_STATE only re-applies these two, so nothing else is kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    pub transform: Transform,
    pub color: Hsl,
}

/// Everything the machine needs to resume at an instruction boundary.
///
/// `Clone` is the snapshot operation: every field is plain owned data, so a
/// clone is a full independent copy. The history travels with the state, so
/// a snapshot can be resumed on any machine, even one that has since been
/// reset or has run another program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmState {
    pub stack: Vec<i64>,
    /// Token index being executed; in a snapshot, the next one to execute.
    pub ip: usize,
    pub transform: Transform,
    pub color: Hsl,
    pub state_stack: Vec<SavedState>,
    /// Instructions dispatched so far in this run, loop replays included.
    pub instruction_count: usize,
    pub seed: i64,
    /// Instructions LOOP can replay, oldest first.
    pub history: Vec<HistoryEntry>,
}

impl VmState {
    pub fn new(transform: Transform, seed: i64) -> Self {
        Self {
            stack: Vec::new(),
            ip: 0,
            transform,
            color: Hsl::default(),
            state_stack: Vec::new(),
            instruction_count: 0,
            seed,
            history: Vec::new(),
        }
    }

    pub fn top(&self) -> Option<i64> {
        self.stack.last().copied()
    }

    pub(crate) fn saved(&self) -> SavedState {
        SavedState {
            transform: self.transform,
            color: self.color,
        }
    }
}

/// One executed instruction, kept so LOOP can replay it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub opcode: Opcode,
    pub codon: Codon,
    /// Decoded literal, present only for PUSH.
    pub literal: Option<u8>,
}

impl HistoryEntry {
    pub fn new(opcode: Opcode, codon: Codon) -> Self {
        Self {
            opcode,
            codon,
            literal: None,
        }
    }

    pub fn push(codon: Codon, literal: u8) -> Self {
        Self {
            opcode: Opcode::Push,
            codon,
            literal: Some(literal),
        }
    }
}
