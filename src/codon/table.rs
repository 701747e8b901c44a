//! The fixed codon -> opcode table.
//!
//! Rows are indexed by [`Codon::index`]. Opcodes that own a whole block share
//! the first two bases; split blocks pair third-position A/G against C/T, the
//! same wobble pattern the biological code uses. Existing programs depend on
//! this exact layout.

use super::{Codon, CODON_COUNT};
use crate::vm::op::Opcode;

#[rustfmt::skip]
static CODON_TABLE: [Opcode; CODON_COUNT] = {
    use Opcode::*;
    [
    // AA_          AC_            AG_          AT_
    Line, Line, Line, Line,
    Translate, Translate, Translate, Translate,
    Rotate, Rotate, Rotate, Rotate,
    Nop, Dup, Start, Dup,
    // CA_          CC_            CG_          CT_
    Pop, Add, Pop, Add,
    Rect, Rect, Rect, Rect,
    Scale, Eq, Scale, Eq,
    Noise, Sub, Noise, Sub,
    // GA_          GC_            GG_          GT_
    Push, Push, Push, Push,
    Triangle, Lt, Triangle, Lt,
    Circle, Circle, Circle, Circle,
    Ellipse, Ellipse, Ellipse, Ellipse,
    // TA_          TC_            TG_          TT_
    Stop, Mul, Stop, Mul,
    SaveState, RestoreState, SaveState, RestoreState,
    Stop, Div, Swap, Div,
    Color, Loop, Color, Loop,
    ]
};

/// Looks up the opcode for `codon`. Total over all 64 codons.
#[inline]
pub fn opcode_of(codon: Codon) -> Opcode {
    CODON_TABLE[codon.index()]
}

/// All codons that map to `opcode`, in table order.
pub fn synonyms(opcode: Opcode) -> Vec<Codon> {
    Codon::all().filter(|c| opcode_of(*c) == opcode).collect()
}

/// Effect of replacing one codon with another, judged by the table alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substitution {
    /// Same codon.
    Identical,
    /// Different codon, same opcode.
    Silent,
    /// Replacement is a STOP where the original was not: execution is truncated.
    Nonsense,
    /// Different opcode.
    Missense,
}

pub fn classify_substitution(original: Codon, replacement: Codon) -> Substitution {
    if original == replacement {
        return Substitution::Identical;
    }
    let before = opcode_of(original);
    let after = opcode_of(replacement);
    if before == after {
        Substitution::Silent
    } else if after == Opcode::Stop {
        Substitution::Nonsense
    } else {
        Substitution::Missense
    }
}
