//! Bases and codons: the lexical atoms of a program.
//!
//! A [`Codon`] is an ordered triple of [`Base`]s. Read as a base-4 number
//! (most significant base first) it doubles as a numeric literal in `[0, 63]`
//! and as the row index into the [`table`] of opcodes.

pub mod table;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use table::{classify_substitution, opcode_of, Substitution};

/// Number of distinct codons (4^3).
pub const CODON_COUNT: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodonError {
    #[error("Unknown codon '{0}': expected exactly three of A, C, G, T")]
    UnknownCodon(String),
}

/// One nucleotide symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Base {
    A,
    C,
    G,
    T,
}

impl Base {
    pub const ALL: [Base; 4] = [Base::A, Base::C, Base::G, Base::T];

    /// Parses a single source character. Only uppercase symbols are accepted.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Base::A),
            'C' => Some(Base::C),
            'G' => Some(Base::G),
            'T' => Some(Base::T),
            _ => None,
        }
    }

    /// Base-4 digit value: A=0, C=1, G=2, T=3.
    #[inline]
    pub const fn digit(self) -> u8 {
        self as u8
    }

    pub const fn as_char(self) -> char {
        match self {
            Base::A => 'A',
            Base::C => 'C',
            Base::G => 'G',
            Base::T => 'T',
        }
    }
}

/// Immutable triple of bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Codon([Base; 3]);

impl Codon {
    pub const fn new(first: Base, second: Base, third: Base) -> Self {
        Self([first, second, third])
    }

    pub const fn bases(&self) -> [Base; 3] {
        self.0
    }

    /// Position of this codon in the 64-entry table, `first*16 + second*4 + third`.
    #[inline]
    pub const fn index(&self) -> usize {
        let [first, second, third] = self.0;
        first.digit() as usize * 16 + second.digit() as usize * 4 + third.digit() as usize
    }

    /// Builds the codon at `index` (taken modulo 64).
    pub const fn from_index(index: usize) -> Self {
        let i = index % CODON_COUNT;
        Self([
            Base::ALL[i / 16],
            Base::ALL[(i / 4) % 4],
            Base::ALL[i % 4],
        ])
    }

    /// Decodes this codon as a numeric literal in `[0, 63]`.
    #[inline]
    pub const fn literal(&self) -> u8 {
        self.index() as u8
    }

    /// Returns a copy with the base at `position` (0..3) replaced.
    pub fn with_base(&self, position: usize, base: Base) -> Self {
        let mut bases = self.0;
        bases[position % 3] = base;
        Self(bases)
    }

    /// Iterates all 64 codons in table order.
    pub fn all() -> impl Iterator<Item = Codon> {
        (0..CODON_COUNT).map(Codon::from_index)
    }
}

impl fmt::Display for Codon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for base in self.0 {
            write!(f, "{}", base.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for Codon {
    type Err = CodonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bases: Vec<Base> = s.chars().map(Base::from_char).collect::<Option<_>>().ok_or_else(|| {
            CodonError::UnknownCodon(s.to_string())
        })?;
        match bases.as_slice() {
            [a, b, c] => Ok(Codon::new(*a, *b, *c)),
            _ => Err(CodonError::UnknownCodon(s.to_string())),
        }
    }
}

impl From<Codon> for String {
    fn from(codon: Codon) -> Self {
        codon.to_string()
    }
}

impl TryFrom<String> for Codon {
    type Error = CodonError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
