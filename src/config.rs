use crate::vm::engine::DEFAULT_INSTRUCTION_LIMIT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration read from `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    /// Path to the program source to run.
    pub program_file: String,
    /// Where to write the JSON timeline of the run, if anywhere.
    #[serde(default)]
    pub timeline_output: Option<String>,
    #[serde(default)]
    pub vm: VmConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
}

/// Execution limits and defaults for one machine.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct VmConfig {
    /// Sandbox ceiling on dispatched instructions, loop replays included.
    pub instruction_limit: usize,
    /// Seed value the machine state starts from after a reset.
    pub seed: i64,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            instruction_limit: DEFAULT_INSTRUCTION_LIMIT,
            seed: 0,
        }
    }
}

/// Size of the drawing surface in pixels.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 400.0,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Rejects settings the machine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program_file.trim().is_empty() {
            return Err(ConfigError::Invalid("program_file must not be empty".to_string()));
        }
        if self.vm.instruction_limit == 0 {
            return Err(ConfigError::Invalid(
                "vm.instruction_limit must be greater than zero".to_string(),
            ));
        }
        if !(self.surface.width > 0.0 && self.surface.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "surface must have a positive size, got {}x{}",
                self.surface.width, self.surface.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
program_file = "programs/spiral.dna"
timeline_output = "timeline.json"

[vm]
instruction_limit = 500
seed = 7

[surface]
width = 800.0
height = 600.0
"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.program_file, "programs/spiral.dna");
        assert_eq!(config.timeline_output.as_deref(), Some("timeline.json"));
        assert_eq!(
            config.vm,
            VmConfig {
                instruction_limit: 500,
                seed: 7
            }
        );
        assert_eq!(config.surface.width, 800.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let file = write_config("program_file = \"a.dna\"\n[vm]\nseed = 3\n");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.vm.instruction_limit, DEFAULT_INSTRUCTION_LIMIT);
        assert_eq!(config.vm.seed, 3);
        assert_eq!(config.surface, SurfaceConfig::default());
        assert!(config.timeline_output.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config {
            program_file: "a.dna".to_string(),
            timeline_output: None,
            vm: VmConfig::default(),
            surface: SurfaceConfig::default(),
        };
        config.vm.instruction_limit = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.vm.instruction_limit = 10;
        config.surface.width = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_and_parse_errors() {
        assert!(matches!(
            Config::load(Path::new("/nonexistent/config.toml")),
            Err(ConfigError::Io(_))
        ));
        let file = write_config("program_file = 12");
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse(_))));
    }
}
