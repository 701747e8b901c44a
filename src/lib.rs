//! Interpreter for programs written as DNA-style codons.
//!
//! Source text is a sequence of three-letter codons over `A, C, G, T`. The
//! [`lexer`] splits it into tokens, the [`codon::table`] maps each codon to
//! an [`vm::op::Opcode`] (many codons per opcode, like the genetic code), and
//! the [`vm::engine::VirtualMachine`] executes them on an operand stack while
//! driving a [`render::Renderer`].

pub mod batch;
pub mod codon;
pub mod config;
pub mod lexer;
pub mod render;
pub mod timeline;
pub mod vm;
