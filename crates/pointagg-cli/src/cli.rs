//! Command-line argument structures for the `pointagg` binary.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use pointagg_config::{
    ExecutorSection, MergeOrderKind, OutputFormat, OutputSection, PartitionStrategyKind,
};
use std::path::PathBuf;

/// Attribute capped order points per group with a partitioned reducer
#[derive(Debug, Parser)]
#[command(name = "pointagg", version, long_about = None)]
pub(crate) struct Cli {
    /// Log verbosity (-v debug, -vv trace); POINTAGG_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Reduce JSON-lines order rows into ranked points per group
    Run(RunArgs),

    /// Compare every partitioning and merge order against a single buffer
    Check(CheckArgs),

    /// Print the declared interface of the point attribution aggregate
    Signature(SignatureArgs),
}

///
/// SourceArgs
///

#[derive(Debug, Args)]
pub(crate) struct SourceArgs {
    /// JSON-lines input file; omit or pass "-" to read stdin
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Config file (defaults to ./pointagg.toml when present)
    #[arg(short, long, env = "POINTAGG_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

///
/// ExecutorArgs
///
/// Overrides applied on top of the `[executor]` config section.
///

#[derive(Debug, Default, Args)]
pub(crate) struct ExecutorArgs {
    /// Number of partitions
    #[arg(short, long)]
    pub partitions: Option<usize>,

    /// Row placement across partitions
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Order in which partial buffers are merged
    #[arg(long, value_enum)]
    pub merge_order: Option<MergeOrderArg>,

    /// Seed for the seeded strategy and merge order
    #[arg(long)]
    pub seed: Option<u64>,

    /// Reduce partitions on the calling thread
    #[arg(long)]
    pub sequential: bool,

    /// Hard limit on distinct groups
    #[arg(long)]
    pub max_groups: Option<u64>,

    /// Hard limit on estimated group state bytes
    #[arg(long)]
    pub max_group_bytes: Option<u64>,
}

impl ExecutorArgs {
    pub(crate) fn apply(&self, section: &mut ExecutorSection) {
        if let Some(partitions) = self.partitions {
            section.partitions = partitions;
        }
        if let Some(strategy) = self.strategy {
            section.partition_strategy = strategy.into();
        }
        if let Some(merge_order) = self.merge_order {
            section.merge_order = merge_order.into();
        }
        if let Some(seed) = self.seed {
            section.seed = seed;
        }
        if self.sequential {
            section.parallel = false;
        }
        if let Some(max_groups) = self.max_groups {
            section.max_groups = max_groups;
        }
        if let Some(max_group_bytes) = self.max_group_bytes {
            section.max_group_bytes = max_group_bytes;
        }
    }
}

///
/// RunArgs
///

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub executor: ExecutorArgs,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Ranked rows to show; 0 shows every group
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Append the execution metrics report as JSON
    #[arg(long)]
    pub metrics: bool,
}

impl RunArgs {
    pub(crate) fn apply_output(&self, section: &mut OutputSection) {
        if let Some(format) = self.format {
            section.format = format.into();
        }
        if let Some(limit) = self.limit {
            section.limit = limit;
        }
    }
}

///
/// CheckArgs
///

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Number of partitions
    #[arg(short, long)]
    pub partitions: Option<usize>,

    /// Seed for the seeded strategy and merge order
    #[arg(long)]
    pub seed: Option<u64>,
}

///
/// SignatureArgs
///

#[derive(Debug, Args)]
pub(crate) struct SignatureArgs {
    /// Print the signature as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum StrategyArg {
    RoundRobin,
    Contiguous,
    Hashed,
    Seeded,
}

impl From<StrategyArg> for PartitionStrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::RoundRobin => Self::RoundRobin,
            StrategyArg::Contiguous => Self::Contiguous,
            StrategyArg::Hashed => Self::Hashed,
            StrategyArg::Seeded => Self::Seeded,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum MergeOrderArg {
    LeftFold,
    RightFold,
    Balanced,
    Seeded,
}

impl From<MergeOrderArg> for MergeOrderKind {
    fn from(arg: MergeOrderArg) -> Self {
        match arg {
            MergeOrderArg::LeftFold => Self::LeftFold,
            MergeOrderArg::RightFold => Self::RightFold,
            MergeOrderArg::Balanced => Self::Balanced,
            MergeOrderArg::Seeded => Self::Seeded,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum FormatArg {
    Table,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Table => Self::Table,
            FormatArg::Json => Self::Json,
        }
    }
}
