use pointagg_config::ConfigError;
use pointagg_core::executor::GroupError;
use std::io;
use thiserror::Error as ThisError;

///
/// CliError
///

#[derive(Debug, ThisError)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read input '{source_name}': {source}")]
    Input {
        source_name: String,
        #[source]
        source: io::Error,
    },

    #[error("input line {line}: {source}")]
    Row {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("grouped reduce failed: {0}")]
    Reduce(#[from] GroupError),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{mismatches} of {runs} partitioned runs disagreed with the single-buffer result")]
    CheckFailed { mismatches: usize, runs: usize },
}
