//! JSON-lines order rows: one `{"key": [..], "quantity": int|null}` per line.

use crate::error::CliError;
use pointagg_core::aggregate::OrderRow;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

const STDIN_NAME: &str = "<stdin>";

///
/// GroupKey
///
/// Composite grouping key; ordered column by column.
///

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub(crate) struct GroupKey(Vec<String>);

impl GroupKey {
    #[cfg(test)]
    pub(crate) fn from_parts(parts: &[&str]) -> Self {
        Self(parts.iter().map(ToString::to_string).collect())
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" / "))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InputRecord {
    key: Vec<String>,
    #[serde(default)]
    quantity: Option<i32>,
}

/// Read rows from `path`, or stdin when absent or `-`.
pub(crate) fn read_rows(path: Option<&Path>) -> Result<Vec<(GroupKey, OrderRow)>, CliError> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path).map_err(|source| CliError::Input {
                source_name: path.display().to_string(),
                source,
            })?;
            parse_rows(BufReader::new(file), &path.display().to_string())
        }
        _ => parse_rows(io::stdin().lock(), STDIN_NAME),
    }
}

/// Parse JSON-lines rows; blank lines are skipped, line numbers are 1-based.
pub(crate) fn parse_rows<R: BufRead>(
    reader: R,
    source_name: &str,
) -> Result<Vec<(GroupKey, OrderRow)>, CliError> {
    let mut rows = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CliError::Input {
            source_name: source_name.to_string(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let record: InputRecord = serde_json::from_str(&line).map_err(|source| CliError::Row {
            line: index + 1,
            source,
        })?;
        rows.push((GroupKey(record.key), OrderRow::from(record.quantity)));
    }

    tracing::debug!(source = source_name, rows = rows.len(), "input rows parsed");

    Ok(rows)
}
