use serde::{Deserialize, Serialize};
use std::fmt;

/// Every operation the machine understands. Several codons map to each opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Opcode {
    // --- Control ---
    Start,
    Stop,

    // --- Drawing primitives ---
    Circle,
    Rect,
    Line,
    Triangle,
    Ellipse,
    Noise,

    // --- Transforms ---
    Translate,
    Rotate,
    Scale,
    Color,

    // --- Stack ---
    Push,
    Dup,
    Pop,
    Swap,

    // --- Arithmetic ---
    Add,
    Sub,
    Mul,
    Div, // Traps on a zero divisor, floors otherwise.

    // --- Comparison ---
    Eq,
    Lt,

    // --- Save / restore ---
    SaveState,
    RestoreState,

    // --- Loop ---
    Loop,

    // --- Utility ---
    Nop,
}

impl Opcode {
    pub const ALL: [Opcode; 26] = [
        Opcode::Start,
        Opcode::Stop,
        Opcode::Circle,
        Opcode::Rect,
        Opcode::Line,
        Opcode::Triangle,
        Opcode::Ellipse,
        Opcode::Noise,
        Opcode::Translate,
        Opcode::Rotate,
        Opcode::Scale,
        Opcode::Color,
        Opcode::Push,
        Opcode::Dup,
        Opcode::Pop,
        Opcode::Swap,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Eq,
        Opcode::Lt,
        Opcode::SaveState,
        Opcode::RestoreState,
        Opcode::Loop,
        Opcode::Nop,
    ];

    /// Stack depth the instruction needs before it runs. DUP reads its
    /// operand without popping it; PUSH takes its literal from the stream.
    pub const fn operands(self) -> usize {
        match self {
            Opcode::Circle | Opcode::Line | Opcode::Triangle => 1,
            Opcode::Rect | Opcode::Ellipse | Opcode::Noise => 2,
            Opcode::Translate => 2,
            Opcode::Rotate | Opcode::Scale => 1,
            Opcode::Color => 3,
            Opcode::Dup | Opcode::Pop => 1,
            Opcode::Swap => 2,
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => 2,
            Opcode::Eq | Opcode::Lt => 2,
            Opcode::Loop => 2,
            Opcode::Start
            | Opcode::Stop
            | Opcode::Push
            | Opcode::SaveState
            | Opcode::RestoreState
            | Opcode::Nop => 0,
        }
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Start => "START",
            Opcode::Stop => "STOP",
            Opcode::Circle => "CIRCLE",
            Opcode::Rect => "RECT",
            Opcode::Line => "LINE",
            Opcode::Triangle => "TRIANGLE",
            Opcode::Ellipse => "ELLIPSE",
            Opcode::Noise => "NOISE",
            Opcode::Translate => "TRANSLATE",
            Opcode::Rotate => "ROTATE",
            Opcode::Scale => "SCALE",
            Opcode::Color => "COLOR",
            Opcode::Push => "PUSH",
            Opcode::Dup => "DUP",
            Opcode::Pop => "POP",
            Opcode::Swap => "SWAP",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Eq => "EQ",
            Opcode::Lt => "LT",
            Opcode::SaveState => "SAVE_STATE",
            Opcode::RestoreState => "RESTORE_STATE",
            Opcode::Loop => "LOOP",
            Opcode::Nop => "NOP",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_requirements() {
        assert_eq!(Opcode::Push.operands(), 0);
        assert_eq!(Opcode::Dup.operands(), 1);
        assert_eq!(Opcode::Rect.operands(), 2);
        assert_eq!(Opcode::Color.operands(), 3);
        assert_eq!(Opcode::Loop.operands(), 2);
        assert_eq!(Opcode::RestoreState.operands(), 0);
    }

    #[test]
    fn test_mnemonics_are_unique() {
        let mut names: Vec<&str> = Opcode::ALL.iter().map(|op| op.mnemonic()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Opcode::ALL.len());
        assert_eq!(Opcode::SaveState.to_string(), "SAVE_STATE");
    }
}
