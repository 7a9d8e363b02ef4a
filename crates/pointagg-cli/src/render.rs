//! Report rendering for ranked per-group points and the aggregate signature.

use crate::input::GroupKey;
use pointagg_core::{
    aggregate::{AggregateSignature, ColumnSpec, Points},
    executor::GroupedOutput,
};
use serde::Serialize;
use std::io::{self, Write};

const KEY_HEADER: &str = "key";
const POINTS_HEADER: &str = "points";

#[derive(Serialize)]
struct JsonRow<'a> {
    key: &'a GroupKey,
    points: Points,
}

// `0` keeps every row
fn visible(total: usize, limit: usize) -> usize {
    if limit == 0 { total } else { total.min(limit) }
}

/// Ranked groups as an aligned two-column table.
pub(crate) fn render_table<W: Write>(
    out: &mut W,
    output: &GroupedOutput<GroupKey, Points>,
    limit: usize,
) -> io::Result<()> {
    let ranked = output.ranked();
    let shown = &ranked[..visible(ranked.len(), limit)];

    let cells: Vec<(String, String)> = shown
        .iter()
        .map(|row| (row.key().to_string(), row.output().to_string()))
        .collect();
    let key_width = cells
        .iter()
        .map(|(key, _)| key.len())
        .chain([KEY_HEADER.len()])
        .max()
        .unwrap_or_default();
    let points_width = cells
        .iter()
        .map(|(_, points)| points.len())
        .chain([POINTS_HEADER.len()])
        .max()
        .unwrap_or_default();

    writeln!(out, "{KEY_HEADER:<key_width$}  {POINTS_HEADER:>points_width$}")?;
    writeln!(out, "{}  {}", "-".repeat(key_width), "-".repeat(points_width))?;
    for (key, points) in &cells {
        writeln!(out, "{key:<key_width$}  {points:>points_width$}")?;
    }

    if shown.len() < ranked.len() {
        writeln!(out, "only showing top {} of {} groups", shown.len(), ranked.len())?;
    }

    Ok(())
}

/// Ranked groups as JSON lines.
pub(crate) fn render_json<W: Write>(
    out: &mut W,
    output: &GroupedOutput<GroupKey, Points>,
    limit: usize,
) -> Result<(), serde_json::Error> {
    let ranked = output.ranked();

    for row in ranked.iter().take(visible(ranked.len(), limit)) {
        serde_json::to_writer(
            &mut *out,
            &JsonRow {
                key: row.key(),
                points: *row.output(),
            },
        )?;
        writeln!(out).map_err(serde_json::Error::io)?;
    }

    Ok(())
}

/// Human-readable aggregate interface.
pub(crate) fn render_signature<W: Write>(
    out: &mut W,
    signature: &AggregateSignature,
) -> io::Result<()> {
    writeln!(out, "aggregate      {}", signature.name)?;
    writeln!(out, "input          {}", columns(signature.input))?;
    writeln!(out, "buffer         {}", columns(signature.buffer))?;
    writeln!(out, "output         {}", signature.output)?;
    writeln!(out, "deterministic  {}", signature.deterministic)
}

fn columns(specs: &[ColumnSpec]) -> String {
    specs
        .iter()
        .map(|spec| {
            let null = if spec.nullable { " null" } else { " not null" };
            format!("{} {}{null}", spec.name, spec.ty)
        })
        .collect::<Vec<_>>()
        .join(", ")
}
