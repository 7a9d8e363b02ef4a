use crate::{
    cli::{Cli, Command, FormatArg, MergeOrderArg, StrategyArg},
    error::CliError,
    input::{GroupKey, parse_rows},
    render::{render_json, render_signature, render_table},
};
use clap::{CommandFactory, Parser};
use pointagg_config::{MergeOrderKind, OutputFormat, PartitionStrategyKind, PointaggConfig};
use pointagg_core::{
    aggregate::{AggregateFunction, OrderRow, PointAttribution, Points},
    executor::{GroupedOutput, reduce_single},
};
use std::path::Path;

fn ranked_output() -> GroupedOutput<GroupKey, Points> {
    let rows = vec![
        (GroupKey::from_parts(&["alice"]), OrderRow::new(5)),
        (GroupKey::from_parts(&["bob"]), OrderRow::new(1)),
        (GroupKey::from_parts(&["carol"]), OrderRow::new(2)),
        (GroupKey::from_parts(&["carol"]), OrderRow::new(2)),
    ];

    reduce_single(&PointAttribution, &rows)
}

fn rendered(write: impl FnOnce(&mut Vec<u8>)) -> String {
    let mut out = Vec::new();
    write(&mut out);

    String::from_utf8(out).expect("rendered output should be utf-8")
}

//
// ARGS
//

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn run_flags_override_config_sections() {
    let cli = Cli::try_parse_from([
        "pointagg",
        "run",
        "orders.jsonl",
        "--partitions",
        "8",
        "--strategy",
        "seeded",
        "--merge-order",
        "right-fold",
        "--seed",
        "7",
        "--sequential",
        "--format",
        "json",
        "--limit",
        "0",
        "--metrics",
    ])
    .expect("run args should parse");

    let Command::Run(args) = cli.command else {
        panic!("expected run command");
    };
    assert_eq!(args.source.input.as_deref(), Some(Path::new("orders.jsonl")));
    assert_eq!(args.executor.strategy, Some(StrategyArg::Seeded));
    assert_eq!(args.executor.merge_order, Some(MergeOrderArg::RightFold));
    assert_eq!(args.format, Some(FormatArg::Json));
    assert!(args.metrics);

    let mut config = PointaggConfig::default();
    args.executor.apply(&mut config.executor);
    args.apply_output(&mut config.output);

    assert_eq!(config.executor.partitions, 8);
    assert_eq!(
        config.executor.partition_strategy,
        PartitionStrategyKind::Seeded
    );
    assert_eq!(config.executor.merge_order, MergeOrderKind::RightFold);
    assert_eq!(config.executor.seed, 7);
    assert!(!config.executor.parallel);
    assert_eq!(config.output.format, OutputFormat::Json);
    assert_eq!(config.output.limit, 0);
}

#[test]
fn absent_flags_keep_config_values() {
    let cli = Cli::try_parse_from(["pointagg", "run"]).expect("bare run should parse");
    let Command::Run(args) = cli.command else {
        panic!("expected run command");
    };

    let mut config = PointaggConfig::default();
    args.executor.apply(&mut config.executor);
    args.apply_output(&mut config.output);

    assert_eq!(config, PointaggConfig::default());
    assert!(args.source.input.is_none());
}

#[test]
fn unknown_strategy_flag_is_rejected() {
    let result = Cli::try_parse_from(["pointagg", "run", "--strategy", "random"]);

    assert!(result.is_err());
}

#[test]
fn verbose_is_global() {
    let cli = Cli::try_parse_from(["pointagg", "signature", "-vv", "--json"])
        .expect("signature args should parse");

    assert_eq!(cli.verbose, 2);
    assert!(matches!(cli.command, Command::Signature(ref args) if args.json));
}

//
// INPUT
//

#[test]
fn parse_rows_reads_keys_and_nullable_quantities() {
    let source = br#"{"key": ["jean", "nyc"], "quantity": 4}

{"key": ["holden", "sf"], "quantity": null}
{"key": ["jean", "nyc"]}
"#;

    let rows = parse_rows(&source[..], "test").expect("rows should parse");

    assert_eq!(
        rows,
        vec![
            (GroupKey::from_parts(&["jean", "nyc"]), OrderRow::new(4)),
            (GroupKey::from_parts(&["holden", "sf"]), OrderRow::null()),
            (GroupKey::from_parts(&["jean", "nyc"]), OrderRow::null()),
        ]
    );
}

#[test]
fn parse_rows_reports_the_failing_line() {
    let source = b"{\"key\": [\"a\"], \"quantity\": 1}\n{\"key\": \"a\"}\n";

    let err = parse_rows(&source[..], "test").expect_err("bad row should fail");

    assert!(matches!(err, CliError::Row { line: 2, .. }));
}

#[test]
fn parse_rows_rejects_unknown_fields() {
    let source = b"{\"key\": [\"a\"], \"qty\": 1}\n";

    let err = parse_rows(&source[..], "test").expect_err("unknown field should fail");

    assert!(matches!(err, CliError::Row { line: 1, .. }));
}

#[test]
fn parse_rows_rejects_out_of_range_quantity() {
    let source = b"{\"key\": [\"a\"], \"quantity\": 4294967296}\n";

    assert!(parse_rows(&source[..], "test").is_err());
}

#[test]
fn group_key_display_joins_columns() {
    assert_eq!(GroupKey::from_parts(&["jean", "nyc"]).to_string(), "jean / nyc");
}

//
// RENDER
//

#[test]
fn table_ranks_groups_by_points() {
    let output = ranked_output();

    let text = rendered(|out| render_table(out, &output, 20).expect("table should render"));

    assert_eq!(
        text,
        "key    points\n\
         -----  ------\n\
         carol       4\n\
         alice       3\n\
         bob         1\n"
    );
}

#[test]
fn table_limit_notes_hidden_groups() {
    let output = ranked_output();

    let text = rendered(|out| render_table(out, &output, 2).expect("table should render"));

    assert_eq!(text.lines().count(), 5);
    assert!(text.ends_with("only showing top 2 of 3 groups\n"));
}

#[test]
fn json_lines_follow_ranking() {
    let output = ranked_output();

    let text = rendered(|out| render_json(out, &output, 0).expect("json should render"));

    assert_eq!(
        text,
        "{\"key\":[\"carol\"],\"points\":4}\n\
         {\"key\":[\"alice\"],\"points\":3}\n\
         {\"key\":[\"bob\"],\"points\":1}\n"
    );
}

#[test]
fn signature_lists_columns() {
    let text = rendered(|out| {
        render_signature(out, &PointAttribution.signature()).expect("signature should render");
    });

    assert!(text.starts_with("aggregate      point_attribution\n"));
    assert!(text.contains("input          quantity int32 null\n"));
    assert!(text.contains("buffer         sum int64 not null\n"));
    assert!(text.contains("output         int64\n"));
    assert!(text.ends_with("deterministic  true\n"));
}
