use csv::WriterBuilder;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{NormalizeError, Result};
use crate::record::NormalizedRecord;

/// Delimited-text writer for normalized records. The header is written on creation,
/// so an empty run still produces `email,sent_date,clicked_date`.
pub struct RecordWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(out: W, delimiter: u8) -> Result<Self> {
        let mut inner = WriterBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .from_writer(out);
        inner.write_record(NormalizedRecord::FIELDS)?;
        Ok(Self { inner })
    }

    pub fn write_batch(&mut self, records: &[NormalizedRecord]) -> Result<()> {
        for record in records {
            self.inner.write_record([
                record.email.as_deref().unwrap_or(""),
                record.sent_date.as_deref().unwrap_or(""),
                record.clicked_date.as_deref().unwrap_or(""),
            ])?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Resolves an `--output` argument: `stdout`/`-`, or a file path whose
/// extension picks the delimiter (`.tsv` for tabs, comma otherwise).
pub fn create_writer(output_arg: &str) -> Result<RecordWriter<Box<dyn Write>>> {
    match output_arg {
        "stdout" | "-" => RecordWriter::new(Box::new(io::stdout().lock()) as Box<dyn Write>, b','),
        path if path.ends_with(".tsv") => RecordWriter::new(open(path)?, b'\t'),
        path if path.ends_with(".csv")
            || path.contains('/')
            || path.contains('\\')
            || path.contains('.') =>
        {
            RecordWriter::new(open(path)?, b',')
        }
        _ => Err(NormalizeError::Config(format!(
            "unknown output: {output_arg}. Use 'stdout' or a file path"
        ))),
    }
}

fn open(path: &str) -> Result<Box<dyn Write>> {
    create_parent_dirs(path)?;
    Ok(Box::new(BufWriter::new(File::create(path)?)))
}

fn create_parent_dirs(file_path: &str) -> Result<()> {
    if let Some(parent) = Path::new(file_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Renders records to an in-memory CSV string.
pub fn to_csv_string(records: &[NormalizedRecord]) -> Result<String> {
    let mut buf = Vec::new();
    let mut writer = RecordWriter::new(&mut buf, b',')?;
    writer.write_batch(records)?;
    writer.finish()?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}
