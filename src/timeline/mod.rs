//! Timeline export for persisting a run and replaying it elsewhere.
//!
//! A timeline carries the program text, every snapshot the machine produced
//! and the renderer call trace, so a player can scrub back and forth without
//! executing the program again.

use crate::config::{SurfaceConfig, VmConfig};
use crate::render::RenderCall;
use crate::vm::engine::RunFailure;
use crate::vm::state::VmState;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

pub const SCHEMA_VERSION: &str = "1.0.0";

/// Complete record of one run.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TimelineExport {
    pub schema_version: String,
    /// Seconds since the Unix epoch.
    pub generated_at: u64,
    /// Program text exactly as it was tokenized.
    pub source: String,
    pub source_hash: String,
    pub vm: VmConfig,
    pub surface: SurfaceConfig,
    /// One entry per executed instruction
    pub snapshots: Vec<VmState>,
    pub render_calls: Vec<RenderCall>,
    /// Error message if the run faulted; snapshots then stop at the fault.
    pub failure: Option<String>,
}

impl TimelineExport {
    /// Builds an export from the outcome of
    /// [`VirtualMachine::run`](crate::vm::engine::VirtualMachine::run).
    pub fn new(
        source: String,
        vm: VmConfig,
        surface: SurfaceConfig,
        outcome: Result<Vec<VmState>, RunFailure>,
        render_calls: Vec<RenderCall>,
    ) -> Self {
        let (snapshots, failure) = match outcome {
            Ok(snapshots) => (snapshots, None),
            Err(RunFailure { error, snapshots }) => (snapshots, Some(error.to_string())),
        };
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: chrono::Utc::now().timestamp() as u64,
            source_hash: source_fingerprint(&source),
            source,
            vm,
            surface,
            snapshots,
            render_calls,
            failure,
        }
    }

    /// False when `source` was edited after the run was recorded.
    pub fn source_matches(&self) -> bool {
        source_fingerprint(&self.source) == self.source_hash
    }

    /// Snapshot at `step`, if the run got that far.
    pub fn frame(&self, step: usize) -> Option<&VmState> {
        self.snapshots.get(step)
    }
}

#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("Timeline file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Timeline JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fingerprint of the program text. Not cryptographic; it only catches a
/// timeline being paired with an edited program.
fn source_fingerprint(source: &str) -> String {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

pub fn save_timeline(export: &TimelineExport, path: &Path) -> Result<(), TimelineError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, export)?;
    writer.flush()?;
    Ok(())
}

pub fn load_timeline(path: &Path) -> Result<TimelineExport, TimelineError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::render::RecordingRenderer;
    use crate::vm::engine::VirtualMachine;
    use tempfile::NamedTempFile;

    fn record(source: &str) -> TimelineExport {
        let surface = SurfaceConfig::default();
        let mut vm = VirtualMachine::new(RecordingRenderer::new(surface.width, surface.height));
        let tokens = tokenize(source).unwrap();
        let outcome = vm.run(&tokens);
        let calls = vm.renderer_mut().take_calls();
        TimelineExport::new(source.to_string(), VmConfig::default(), surface, outcome, calls)
    }

    #[test]
    fn test_timeline_creation() {
        let export = record("ATG GAA AAT GGA TAA");
        assert_eq!(export.schema_version, SCHEMA_VERSION);
        assert_eq!(export.snapshots.len(), 4);
        assert!(export.failure.is_none());
        assert_eq!(export.frame(1).map(|s| s.stack.clone()), Some(vec![3]));
        assert!(export.frame(4).is_none());
        assert!(export.source_matches());
    }

    #[test]
    fn test_failed_run_keeps_partial_timeline() {
        let export = record("ATG GAA AAT GGA GGA TAA");
        assert_eq!(export.snapshots.len(), 3);
        let failure = export.failure.unwrap();
        assert!(failure.contains("Stack underflow"), "{}", failure);
    }

    #[test]
    fn test_timeline_serialization() {
        let export = record("ATG GAA AAT GGA TAA");

        let temp_file = NamedTempFile::new().unwrap();
        save_timeline(&export, temp_file.path()).unwrap();

        let loaded = load_timeline(temp_file.path()).unwrap();
        assert_eq!(loaded.schema_version, export.schema_version);
        assert_eq!(loaded.snapshots, export.snapshots);
        assert_eq!(loaded.render_calls, export.render_calls);
        assert!(loaded.source_matches());
    }

    #[test]
    fn test_edited_source_is_detected() {
        let mut export = record("ATG GAA AAT GGA TAA");
        export.source.push_str(" GGA");
        assert!(!export.source_matches());
    }

    #[test]
    fn test_loading_garbage_reports_json_error() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "{ not json").unwrap();
        assert!(matches!(
            load_timeline(temp_file.path()),
            Err(TimelineError::Json(_))
        ));
    }
}
