use csv::ReaderBuilder;
use std::io::Read;
use std::sync::Arc;
use tracing::debug;

use crate::config::Schema;
use crate::error::{NormalizeError, Result};
use crate::record::{Header, RawRow};

/// Rough bytes-per-row used to pre-size the row buffer.
const APPROX_ROW_BYTES: usize = 256;

/// Reads delimited text into rows projected onto the columns `schema` references.
///
/// Fully blank rows are dropped and every missing marker becomes `None`.
pub fn load<R: Read>(input: R, schema: &Schema) -> Result<Vec<RawRow>> {
    load_with_hint(input, schema, 0)
}

/// Same as [`load`], with the input size used to pre-size the output.
pub fn load_with_hint<R: Read>(
    input: R,
    schema: &Schema,
    size_hint: usize,
) -> Result<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let source_header = reader.headers().map_err(malformed)?.clone();
    if source_header.is_empty() || source_header.iter().all(str::is_empty) {
        return Err(NormalizeError::MalformedInput("missing header row".into()));
    }
    let source_header = Header::new(source_header.iter().map(str::to_string).collect());

    let missing: Vec<String> = schema
        .required_columns
        .iter()
        .filter(|c| source_header.position(c).is_none())
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(NormalizeError::SchemaMismatch { missing });
    }

    let projected = Arc::new(Header::new(schema.referenced_columns()));
    let positions: Vec<Option<usize>> = projected
        .names()
        .iter()
        .map(|c| source_header.position(c))
        .collect();

    let mut rows = Vec::with_capacity(size_hint / APPROX_ROW_BYTES);
    let mut blank = 0usize;
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(malformed)?;
        if record.len() > source_header.len() {
            return Err(NormalizeError::MalformedInput(format!(
                "data row {} has {} fields, header has {}",
                i + 1,
                record.len(),
                source_header.len()
            )));
        }
        if record.iter().all(|cell| schema.is_missing(cell)) {
            blank += 1;
            continue;
        }
        let cells = positions
            .iter()
            .map(|pos| {
                pos.and_then(|p| record.get(p))
                    .filter(|cell| !schema.is_missing(cell))
                    .map(str::to_string)
            })
            .collect();
        rows.push(RawRow::new(Arc::clone(&projected), cells));
    }

    debug!(rows = rows.len(), blank, "loaded input table");
    Ok(rows)
}

fn malformed(err: csv::Error) -> NormalizeError {
    let at = err
        .position()
        .map(|p| format!(" at line {}", p.line()))
        .unwrap_or_default();
    NormalizeError::MalformedInput(format!("{err}{at}"))
}
