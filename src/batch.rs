//! Runs many programs at once, one machine per program.
//!
//! Machines are not reentrant, so each program gets its own
//! [`VirtualMachine`] and [`RecordingRenderer`]; nothing is shared between
//! workers.

use crate::config::{SurfaceConfig, VmConfig};
use crate::lexer::{tokenize, LexError};
use crate::render::RecordingRenderer;
use crate::vm::engine::{VirtualMachine, VmError};
use log::debug;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use thiserror::Error;

/// Anything that can stop a program from producing a full run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProgramError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Vm(#[from] VmError),
}

/// Summary of one program's run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    /// Position of the program in the input slice.
    pub index: usize,
    /// Calls that drew something.
    pub drawing_calls: usize,
    /// Snapshots produced, including any before a fault.
    pub snapshots: usize,
    pub instructions: usize,
    pub error: Option<ProgramError>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Evaluates every source in parallel. Results keep input order.
pub fn run_batch(sources: &[String], vm: &VmConfig, surface: &SurfaceConfig) -> Vec<BatchOutcome> {
    let outcomes: Vec<BatchOutcome> = sources
        .par_iter()
        .enumerate()
        .map(|(index, source)| run_one(index, source, vm, surface))
        .collect();

    let failures = outcomes.iter().filter(|o| !o.is_ok()).count();
    debug!(
        "Batch of {} program(s) finished, {} failed",
        outcomes.len(),
        failures
    );
    outcomes
}

fn run_one(index: usize, source: &str, config: &VmConfig, surface: &SurfaceConfig) -> BatchOutcome {
    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(e) => {
            return BatchOutcome {
                index,
                drawing_calls: 0,
                snapshots: 0,
                instructions: 0,
                error: Some(e.into()),
            }
        }
    };

    let renderer = RecordingRenderer::new(surface.width, surface.height);
    let mut vm = VirtualMachine::with_config(renderer, config);
    let (snapshots, error) = match vm.run(&tokens) {
        Ok(snapshots) => (snapshots.len(), None),
        Err(failure) => (failure.snapshots.len(), Some(failure.error.into())),
    };

    BatchOutcome {
        index,
        drawing_calls: vm.renderer().drawing_calls().len(),
        snapshots,
        instructions: vm.state().instruction_count,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_preserves_order_and_reports_errors() {
        let sources = vec![
            "ATG GAA AAT GGA TAA".to_string(),
            "ATG GAX".to_string(),
            "ATG GGA TAA".to_string(),
            "ATG GAA AGG GGA GAA AAG GAA AAG TTC TAA".to_string(),
        ];
        let outcomes = run_batch(&sources, &VmConfig::default(), &SurfaceConfig::default());

        assert_eq!(outcomes.len(), 4);
        assert!(outcomes.iter().enumerate().all(|(i, o)| o.index == i));

        assert!(outcomes[0].is_ok());
        assert_eq!(outcomes[0].drawing_calls, 1);
        assert_eq!(outcomes[0].snapshots, 4);

        assert!(matches!(outcomes[1].error, Some(ProgramError::Lex(_))));

        assert!(matches!(
            outcomes[2].error,
            Some(ProgramError::Vm(VmError::StackUnderflow { ip: 1, .. }))
        ));
        assert_eq!(outcomes[2].snapshots, 1);

        assert!(outcomes[3].is_ok());
        assert_eq!(outcomes[3].drawing_calls, 3);
    }

    #[test]
    fn test_each_program_gets_a_fresh_machine() {
        let sources = vec!["ATG GAA AAT GAA AAT TAA".to_string(); 16];
        let outcomes = run_batch(&sources, &VmConfig::default(), &SurfaceConfig::default());
        assert!(outcomes.iter().all(|o| o.instructions == 3));
    }
}
