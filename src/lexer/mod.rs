//! Turns program text into codon tokens.
//!
//! Comments start with `;` and run to the end of the line. Whitespace is
//! ignored, so a codon may be split across a space or newline; the advisory
//! [`validate::validate_frame`] pass reports when that happens.

pub mod validate;

use crate::codon::{Base, Codon};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use validate::{validate_frame, validate_structure, Diagnostic, DiagnosticKind, Severity};

/// Starts a line comment.
pub const COMMENT_MARKER: char = ';';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Invalid character '{character}' at line {line}, column {column}")]
    InvalidCharacter {
        character: char,
        line: usize,
        column: usize,
    },
    #[error("Incomplete codon at line {line}: final triplet is {missing} base(s) short")]
    IncompleteCodon { missing: usize, line: usize },
}

/// A codon together with where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub codon: Codon,
    /// Byte offset of the codon's first base in the source.
    pub position: usize,
    /// 1-based line of the codon's first base.
    pub line: usize,
}

/// A single base with its location, before grouping into codons.
#[derive(Debug, Clone, Copy)]
struct Located {
    base: Base,
    position: usize,
    line: usize,
}

/// Splits `source` into codon tokens. Opcodes are not resolved here.
///
/// # Errors
/// * `LexError::InvalidCharacter` for any non-base, non-whitespace character outside a comment.
/// * `LexError::IncompleteCodon` when the base count is not a multiple of three.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut bases = Vec::with_capacity(source.len());
    let mut line = 1;
    let mut column = 0;
    let mut in_comment = false;

    for (position, c) in source.char_indices() {
        column += 1;
        if c == '\n' {
            line += 1;
            column = 0;
            in_comment = false;
            continue;
        }
        if in_comment || c.is_whitespace() {
            continue;
        }
        if c == COMMENT_MARKER {
            in_comment = true;
            continue;
        }
        let base = Base::from_char(c).ok_or(LexError::InvalidCharacter {
            character: c,
            line,
            column,
        })?;
        bases.push(Located {
            base,
            position,
            line,
        });
    }

    let remainder = bases.len() % 3;
    if remainder != 0 {
        let line = bases.last().map(|b| b.line).unwrap_or(line);
        return Err(LexError::IncompleteCodon {
            missing: 3 - remainder,
            line,
        });
    }

    Ok(bases
        .chunks_exact(3)
        .map(|triplet| Token {
            codon: Codon::new(triplet[0].base, triplet[1].base, triplet[2].base),
            position: triplet[0].position,
            line: triplet[0].line,
        })
        .collect())
}
