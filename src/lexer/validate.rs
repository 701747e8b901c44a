//! Advisory passes over source text and tokens.
//!
//! Neither pass fails: both return a list of [`Diagnostic`]s for a linting
//! surface to display. Execution does not depend on them.

use super::{Token, COMMENT_MARKER};
use crate::codon::opcode_of;
use crate::vm::op::Opcode;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Whitespace splits a codon that is otherwise complete.
    FrameBreak,
    /// The first instruction is not START.
    MissingStart,
    /// A START appears after a STOP and can never run.
    StartAfterStop,
    /// The last instruction is not STOP.
    MissingStop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    pub line: Option<usize>,
    pub position: Option<usize>,
}

impl Diagnostic {
    fn new(kind: DiagnosticKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            line: None,
            position: None,
        }
    }

    fn at(mut self, line: usize, position: usize) -> Self {
        self.line = Some(line);
        self.position = Some(position);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
        };
        match self.line {
            Some(line) => write!(f, "{} (line {}): {}", level, line, self.message),
            None => write!(f, "{}: {}", level, self.message),
        }
    }
}

/// Reports every whitespace run that falls inside a triplet.
///
/// Bases are counted from the start of the program; a break is any whitespace
/// seen while one or two bases of the current codon have been read. A run of
/// consecutive whitespace is reported once.
pub fn validate_frame(source: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut bases_in_codon = 0usize;
    let mut line = 1;
    let mut in_comment = false;
    let mut reported_run = false;

    for (position, c) in source.char_indices() {
        let is_newline = c == '\n';
        if in_comment && !is_newline {
            continue;
        }
        in_comment = false;

        if c.is_whitespace() || c == COMMENT_MARKER {
            if bases_in_codon != 0 && !reported_run {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::FrameBreak,
                        Severity::Warning,
                        format!(
                            "codon split after {} base(s); {} more needed before the break",
                            bases_in_codon,
                            3 - bases_in_codon
                        ),
                    )
                    .at(line, position),
                );
                reported_run = true;
            }
            if c == COMMENT_MARKER {
                in_comment = true;
            }
        } else {
            bases_in_codon = (bases_in_codon + 1) % 3;
            reported_run = false;
        }

        if is_newline {
            line += 1;
        }
    }

    diagnostics
}

/// Checks START/STOP placement. PUSH literals are skipped, so a literal that
/// happens to spell a STOP codon is not mistaken for one.
pub fn validate_structure(tokens: &[Token]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    match tokens.first() {
        Some(token) if opcode_of(token.codon) == Opcode::Start => {}
        Some(token) => diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::MissingStart,
                Severity::Warning,
                format!("program should begin with START (ATG), found {}", token.codon),
            )
            .at(token.line, token.position),
        ),
        None => diagnostics.push(Diagnostic::new(
            DiagnosticKind::MissingStart,
            Severity::Warning,
            "empty program: missing START (ATG)",
        )),
    }

    let mut index = 0;
    let mut seen_stop = false;
    let mut last = None;
    while index < tokens.len() {
        let token = &tokens[index];
        let opcode = opcode_of(token.codon);
        match opcode {
            Opcode::Start if seen_stop => diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::StartAfterStop,
                    Severity::Warning,
                    "START after STOP is unreachable",
                )
                .at(token.line, token.position),
            ),
            Opcode::Stop => seen_stop = true,
            _ => {}
        }
        last = Some(token);
        index += if opcode == Opcode::Push { 2 } else { 1 };
    }

    match last {
        Some(token) if opcode_of(token.codon) == Opcode::Stop => {}
        Some(token) => diagnostics.push(
            Diagnostic::new(
                DiagnosticKind::MissingStop,
                Severity::Info,
                format!("program should end with STOP (TAA, TAG, TGA), found {}", token.codon),
            )
            .at(token.line, token.position),
        ),
        None => diagnostics.push(Diagnostic::new(
            DiagnosticKind::MissingStop,
            Severity::Info,
            "empty program: missing STOP",
        )),
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
        diagnostics.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn test_frame_clean_program_has_no_warnings() {
        assert!(validate_frame("ATG GAA AAT\nGGA TAA").is_empty());
    }

    #[test]
    fn test_frame_break_inside_triplet() {
        let diagnostics = validate_frame("ATG GA A GGA");
        assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::FrameBreak]);
        assert_eq!(diagnostics[0].position, Some(6));
        assert_eq!(diagnostics[0].line, Some(1));
    }

    #[test]
    fn test_frame_break_reported_once_per_run() {
        let diagnostics = validate_frame("A   \n  TG");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_frame_break_before_comment() {
        let diagnostics = validate_frame("ATG G; split\nAA");
        assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::FrameBreak]);
    }

    #[test]
    fn test_frame_ignores_comment_contents() {
        assert!(validate_frame("ATG ; G A T\nTAA").is_empty());
    }

    #[test]
    fn test_structure_well_formed() {
        let tokens = tokenize("ATG GAA AAT GGA TAA").unwrap();
        assert!(validate_structure(&tokens).is_empty());
    }

    #[test]
    fn test_structure_missing_start_and_stop() {
        let tokens = tokenize("GAA AAT GGA").unwrap();
        assert_eq!(
            kinds(&validate_structure(&tokens)),
            vec![DiagnosticKind::MissingStart, DiagnosticKind::MissingStop]
        );
    }

    #[test]
    fn test_structure_start_after_stop() {
        let tokens = tokenize("ATG TAA ATG GGA TAA").unwrap();
        let diagnostics = validate_structure(&tokens);
        assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::StartAfterStop]);
        assert_eq!(diagnostics[0].position, Some(8));
    }

    #[test]
    fn test_structure_skips_push_literals() {
        // TAA is a literal (48) here, not a STOP; ATG is a literal too.
        let tokens = tokenize("ATG GAA TAA GAA ATG TAA").unwrap();
        assert!(validate_structure(&tokens).is_empty());
        let tokens = tokenize("ATG GAA TAA").unwrap();
        assert_eq!(
            kinds(&validate_structure(&tokens)),
            vec![DiagnosticKind::MissingStop]
        );
    }

    #[test]
    fn test_structure_empty_program() {
        assert_eq!(
            kinds(&validate_structure(&[])),
            vec![DiagnosticKind::MissingStart, DiagnosticKind::MissingStop]
        );
    }
}
