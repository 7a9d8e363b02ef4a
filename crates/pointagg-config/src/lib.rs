//! TOML configuration for Pointagg: reducer partitioning, merge order,
//! grouped hard limits, and report output.
//!
//! Every key is optional; unknown keys are rejected so typos surface early.


use pointagg_core::executor::{ExecutionConfig, MergeOrder, PartitionStrategy, ReducerConfig};
use serde::Deserialize;
use std::{
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// Default file name looked up by the CLI when no path is given.
pub const CONFIG_FILE_NAME: &str = "pointagg.toml";

const DEFAULT_PARTITIONS: usize = 4;
const DEFAULT_MAX_GROUPS: u64 = 10_000;
const DEFAULT_MAX_GROUP_BYTES: u64 = 16 * 1024 * 1024;
const DEFAULT_OUTPUT_LIMIT: usize = 20;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("executor.partitions must be at least 1")]
    ZeroPartitions,

    #[error("executor.{field} must be at least 1")]
    ZeroLimit { field: &'static str },
}

///
/// PointaggConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PointaggConfig {
    pub executor: ExecutorSection,
    pub output: OutputSection,
}

impl PointaggConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse configuration from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    /// Read `path` when given, else `pointagg.toml` in the working directory
    /// when present, else fall back to defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let default_path = Path::new(CONFIG_FILE_NAME);
        if default_path.is_file() {
            Self::load(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

///
/// PartitionStrategyKind
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStrategyKind {
    #[default]
    RoundRobin,
    Contiguous,
    Hashed,
    Seeded,
}

impl PartitionStrategyKind {
    #[must_use]
    pub const fn resolve(self, seed: u64) -> PartitionStrategy {
        match self {
            Self::RoundRobin => PartitionStrategy::RoundRobin,
            Self::Contiguous => PartitionStrategy::Contiguous,
            Self::Hashed => PartitionStrategy::Hashed,
            Self::Seeded => PartitionStrategy::Seeded { seed },
        }
    }
}

///
/// MergeOrderKind
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MergeOrderKind {
    LeftFold,
    RightFold,
    #[default]
    Balanced,
    Seeded,
}

impl MergeOrderKind {
    #[must_use]
    pub const fn resolve(self, seed: u64) -> MergeOrder {
        match self {
            Self::LeftFold => MergeOrder::LeftFold,
            Self::RightFold => MergeOrder::RightFold,
            Self::Balanced => MergeOrder::Balanced,
            Self::Seeded => MergeOrder::Seeded { seed },
        }
    }
}

///
/// ExecutorSection
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorSection {
    pub partitions: usize,
    pub partition_strategy: PartitionStrategyKind,
    pub merge_order: MergeOrderKind,
    pub seed: u64,
    pub parallel: bool,
    pub max_groups: u64,
    pub max_group_bytes: u64,
}

impl Default for ExecutorSection {
    fn default() -> Self {
        Self {
            partitions: DEFAULT_PARTITIONS,
            partition_strategy: PartitionStrategyKind::default(),
            merge_order: MergeOrderKind::default(),
            seed: 0,
            parallel: true,
            max_groups: DEFAULT_MAX_GROUPS,
            max_group_bytes: DEFAULT_MAX_GROUP_BYTES,
        }
    }
}

impl ExecutorSection {
    /// Validate this section into a reducer configuration.
    pub fn reducer_config(&self) -> Result<ReducerConfig, ConfigError> {
        let partitions = NonZeroUsize::new(self.partitions).ok_or(ConfigError::ZeroPartitions)?;
        if self.max_groups == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_groups",
            });
        }
        if self.max_group_bytes == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_group_bytes",
            });
        }

        Ok(ReducerConfig::default()
            .with_partitions(partitions)
            .with_strategy(self.partition_strategy.resolve(self.seed))
            .with_merge_order(self.merge_order.resolve(self.seed))
            .with_parallel(self.parallel)
            .with_limits(ExecutionConfig::with_hard_limits(
                self.max_groups,
                self.max_group_bytes,
            )))
    }
}

///
/// OutputFormat
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

///
/// OutputSection
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub format: OutputFormat,
    /// Maximum ranked rows shown; `0` shows every group.
    pub limit: usize,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            limit: DEFAULT_OUTPUT_LIMIT,
        }
    }
}
