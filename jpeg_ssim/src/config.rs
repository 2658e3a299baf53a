//! Compressor configuration.

use crate::error::ConfigError;
use crate::quality_search::SearchConfig;
use shared_utils::{check_dangerous_directory, TargetSsim};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CompressConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub target: TargetSsim,
    /// Longest side allowed in the output; `None` keeps the original size.
    pub max_dimension: Option<u32>,
    /// Parent for per-image scratch directories; `None` keeps trials in memory.
    pub scratch_root: Option<PathBuf>,
    pub recursive: bool,
    /// Worker threads; 0 lets rayon decide.
    pub jobs: usize,
    pub search: SearchConfig,
}

impl CompressConfig {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(input_dir: P, output_dir: Q, target: TargetSsim) -> Self {
        Self {
            input_dir: input_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            target,
            max_dimension: None,
            scratch_root: None,
            recursive: false,
            jobs: 0,
            search: SearchConfig::default(),
        }
    }

    pub fn with_max_dimension(mut self, max: Option<u32>) -> Self {
        self.max_dimension = max;
        self
    }

    pub fn with_scratch_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.scratch_root = Some(root.as_ref().to_path_buf());
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.input_dir.is_dir() {
            return Err(ConfigError::InputNotFound(self.input_dir.clone()));
        }
        if self.max_dimension == Some(0) {
            return Err(ConfigError::InvalidMaxDimension(0));
        }
        check_dangerous_directory(&self.output_dir).map_err(ConfigError::Unsafe)?;
        self.search.validate()
    }
}

/// Validates a raw SSIM factor from the command line.
pub fn parse_target(value: f64) -> Result<TargetSsim, ConfigError> {
    Ok(TargetSsim::new(value)?)
}

/// Validates a raw maximum dimension from the command line.
pub fn parse_max_dimension(value: i64) -> Result<u32, ConfigError> {
    match u32::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ConfigError::InvalidMaxDimension(value)),
    }
}
