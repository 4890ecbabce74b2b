use config::{Config, ConfigError, File as ConfigFile};
use serde::Deserialize;
use std::path::PathBuf;

use crate::hasher::HashAlgorithm;

/// Default ceiling on archive member count before contents are skipped.
pub const DEFAULT_ARCHIVE_MEMBER_LIMIT: usize = 1000;

/// Maximum member count an archive may have for its contents to be expanded.
/// Evaluated independently at every nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionThreshold {
    /// Catalog archives themselves without expanding contents.
    NoRecursion,
    /// Expand only archives with at most this many members.
    Max(usize),
    /// Expand every archive regardless of member count.
    Unlimited,
}

impl Default for RecursionThreshold {
    fn default() -> Self {
        RecursionThreshold::Max(DEFAULT_ARCHIVE_MEMBER_LIMIT)
    }
}

impl RecursionThreshold {
    pub fn allows(&self, member_count: usize) -> bool {
        match self {
            RecursionThreshold::NoRecursion => false,
            RecursionThreshold::Max(limit) => member_count <= *limit,
            RecursionThreshold::Unlimited => true,
        }
    }

    /// Whether archive contents are expanded at all.
    pub fn expands(&self) -> bool {
        !matches!(self, RecursionThreshold::NoRecursion)
    }
}

/// Everything one catalog run needs: what to walk, how to hash, and when to
/// skip archive contents. Fixed for the whole run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_paths: Vec<PathBuf>,
    pub algorithm: HashAlgorithm,
    pub threshold: RecursionThreshold,
}

impl RunConfig {
    pub fn new(input_paths: Vec<PathBuf>) -> Self {
        Self {
            input_paths,
            algorithm: HashAlgorithm::default(),
            threshold: RecursionThreshold::default(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_threshold(mut self, threshold: RecursionThreshold) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Optional defaults loaded from `Config.toml`; command-line flags override.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub output_dir: Option<String>,
    pub algorithm: Option<HashAlgorithm>,
    pub archive_member_limit: Option<usize>,
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
