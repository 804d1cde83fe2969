use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{DateErrorPolicy, Extractor, ExtractorTable};
use crate::dates;
use crate::error::{NormalizeError, Result};
use crate::record::{NormalizedRecord, RawRow};

/// Records produced by the mapping stage.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Mapped {
    pub records: Vec<NormalizedRecord>,
    /// Date fields nulled under [`DateErrorPolicy::Null`].
    pub nulled_dates: usize,
}

/// A date cell no strategy could read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unparseable {
    pub column: String,
    pub value: String,
}

/// Runs a single extractor against a row.
pub fn extract(
    extractor: &Extractor,
    row: &RawRow,
) -> std::result::Result<Option<String>, Unparseable> {
    match extractor {
        Extractor::DirectMap { column } => Ok(row.get(column).map(str::to_string)),
        Extractor::FirstNonNull { columns } => {
            Ok(columns.iter().find_map(|c| row.get(c)).map(str::to_string))
        }
        Extractor::DateNormalize { column, strategy } => match row.get(column) {
            None => Ok(None),
            Some(raw) => dates::normalize(raw, strategy)
                .map(Some)
                .ok_or_else(|| Unparseable {
                    column: column.clone(),
                    value: raw.to_string(),
                }),
        },
    }
}

/// Maps one row to exactly one record. `index` is the 1-based record number used in errors.
pub fn map_record(
    row: &RawRow,
    table: &ExtractorTable,
    policy: DateErrorPolicy,
    index: usize,
) -> Result<(NormalizedRecord, usize)> {
    let mut nulled = 0;
    let mut field = |extractor: &Extractor| -> Result<Option<String>> {
        match extract(extractor, row) {
            Ok(value) => Ok(value),
            Err(Unparseable { column, value }) => match policy {
                DateErrorPolicy::Fail => Err(NormalizeError::DateParse {
                    column,
                    value,
                    row: index,
                }),
                DateErrorPolicy::Null => {
                    warn!(
                        column = %column,
                        value = %value,
                        row = index,
                        "unparseable date, field set to null"
                    );
                    nulled += 1;
                    Ok(None)
                }
            },
        }
    };

    let record = NormalizedRecord {
        email: field(&table.email)?,
        sent_date: field(&table.sent_date)?,
        clicked_date: field(&table.clicked_date)?,
    };
    Ok((record, nulled))
}

pub fn normalize(
    rows: &[RawRow],
    table: &ExtractorTable,
    policy: DateErrorPolicy,
) -> Result<Mapped> {
    // Results are gathered in row order first so the reported failure is
    // always the lowest-numbered bad record, whichever worker hit it.
    #[cfg(feature = "parallel")]
    let mapped: Vec<(NormalizedRecord, usize)> = rows
        .par_iter()
        .enumerate()
        .map(|(i, row)| map_record(row, table, policy, i + 1))
        .collect::<Vec<_>>()
        .into_iter()
        .collect::<Result<_>>()?;

    #[cfg(not(feature = "parallel"))]
    let mapped: Vec<(NormalizedRecord, usize)> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| map_record(row, table, policy, i + 1))
        .collect::<Result<_>>()?;

    let nulled_dates: usize = mapped.iter().map(|(_, n)| n).sum();
    let records: Vec<NormalizedRecord> = mapped.into_iter().map(|(r, _)| r).collect();
    debug!(records = records.len(), nulled_dates, "mapped rows");
    Ok(Mapped {
        records,
        nulled_dates,
    })
}
