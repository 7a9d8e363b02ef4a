//! Subcommand handlers.

use crate::{
    cli::{CheckArgs, Command, RunArgs, SignatureArgs},
    error::CliError,
    input::{GroupKey, read_rows},
    render::{render_json, render_signature, render_table},
};
use pointagg_config::{OutputFormat, PointaggConfig};
use pointagg_core::{
    aggregate::{AggregateFunction, OrderRow, PointAttribution, Points},
    executor::{
        GroupedOutput, GroupedReducer, MergeOrder, PartitionStrategy, ReducerConfig, reduce_single,
    },
    obs::{metrics_report, metrics_reset_all},
};
use std::io::{self, Write};

pub(crate) fn dispatch(command: Command) -> Result<(), CliError> {
    match command {
        Command::Run(args) => run(&args),
        Command::Check(args) => check(&args),
        Command::Signature(args) => signature(&args),
    }
}

fn run(args: &RunArgs) -> Result<(), CliError> {
    let mut config = PointaggConfig::discover(args.source.config.as_deref())?;
    args.executor.apply(&mut config.executor);
    args.apply_output(&mut config.output);

    let reducer_config = config.executor.reducer_config()?;
    let rows = read_rows(args.source.input.as_deref())?;

    metrics_reset_all();
    let output = GroupedReducer::new(PointAttribution, reducer_config).execute(rows)?;

    let mut out = io::stdout().lock();
    match config.output.format {
        OutputFormat::Table => render_table(&mut out, &output, config.output.limit)?,
        OutputFormat::Json => render_json(&mut out, &output, config.output.limit)?,
    }

    if args.metrics {
        serde_json::to_writer_pretty(&mut out, &metrics_report(None))?;
        writeln!(out)?;
    }

    Ok(())
}

fn check(args: &CheckArgs) -> Result<(), CliError> {
    let mut config = PointaggConfig::discover(args.source.config.as_deref())?;
    if let Some(partitions) = args.partitions {
        config.executor.partitions = partitions;
    }
    if let Some(seed) = args.seed {
        config.executor.seed = seed;
    }

    let base = config.executor.reducer_config()?;
    let rows = read_rows(args.source.input.as_deref())?;
    let reference = reduce_single(&PointAttribution, &rows);

    let mut out = io::stdout().lock();
    let outcome = check_rows(&mut out, &rows, &reference, base, config.executor.seed)?;
    writeln!(
        out,
        "{} runs, {} groups, {} mismatches",
        outcome.runs,
        reference.len(),
        outcome.mismatches
    )?;

    if outcome.mismatches > 0 {
        return Err(CliError::CheckFailed {
            mismatches: outcome.mismatches,
            runs: outcome.runs,
        });
    }

    Ok(())
}

///
/// CheckOutcome
///

#[derive(Debug, Default, Eq, PartialEq)]
struct CheckOutcome {
    runs: usize,
    mismatches: usize,
}

// Every strategy and merge order, each run both in parallel and sequentially.
fn check_rows<W: Write>(
    out: &mut W,
    rows: &[(GroupKey, OrderRow)],
    reference: &GroupedOutput<GroupKey, Points>,
    base: ReducerConfig,
    seed: u64,
) -> Result<CheckOutcome, CliError> {
    let mut outcome = CheckOutcome::default();

    for strategy in PartitionStrategy::all(seed) {
        for merge_order in MergeOrder::all(seed) {
            for parallel in [true, false] {
                let config = base
                    .with_strategy(strategy)
                    .with_merge_order(merge_order)
                    .with_parallel(parallel);
                let output = GroupedReducer::new(PointAttribution, config).execute(rows.to_vec())?;

                outcome.runs += 1;
                let status = if output == *reference {
                    "ok"
                } else {
                    outcome.mismatches += 1;
                    tracing::warn!(%strategy, %merge_order, parallel, "partitioned result differs");
                    "MISMATCH"
                };
                writeln!(
                    out,
                    "{status:<8} strategy={strategy} merge_order={merge_order} parallel={parallel}"
                )?;
            }
        }
    }

    Ok(outcome)
}

fn signature(args: &SignatureArgs) -> Result<(), CliError> {
    let signature = PointAttribution.signature();
    let mut out = io::stdout().lock();

    if args.json {
        serde_json::to_writer_pretty(&mut out, &signature)?;
        writeln!(out)?;
    } else {
        render_signature(&mut out, &signature)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    fn config(partitions: usize) -> ReducerConfig {
        ReducerConfig::default()
            .with_partitions(NonZeroUsize::new(partitions).expect("partitions should be non-zero"))
    }

    fn rows() -> Vec<(GroupKey, OrderRow)> {
        vec![
            (GroupKey::from_parts(&["jean", "x"]), OrderRow::new(5)),
            (GroupKey::from_parts(&["holden", "y"]), OrderRow::new(2)),
            (GroupKey::from_parts(&["jean", "x"]), OrderRow::null()),
            (GroupKey::from_parts(&["jean", "x"]), OrderRow::new(1)),
            (GroupKey::from_parts(&["holden", "y"]), OrderRow::new(9)),
        ]
    }

    #[test]
    fn check_rows_reports_no_mismatches() {
        let rows = rows();
        let reference = reduce_single(&PointAttribution, &rows);
        let mut out = Vec::new();

        let outcome =
            check_rows(&mut out, &rows, &reference, config(3), 42).expect("check should run");

        assert_eq!(
            outcome,
            CheckOutcome {
                runs: 32,
                mismatches: 0
            }
        );
        let text = String::from_utf8(out).expect("check output should be utf-8");
        assert_eq!(text.lines().count(), 32);
        assert!(text.lines().all(|line| line.starts_with("ok")));
    }

    #[test]
    fn check_rows_flags_a_wrong_reference() {
        let rows = rows();
        let wrong = reduce_single(&PointAttribution, &rows[..1]);
        let mut out = Vec::new();

        let outcome =
            check_rows(&mut out, &rows, &wrong, config(2), 0).expect("check should run");

        assert_eq!(outcome.mismatches, outcome.runs);
    }
}
