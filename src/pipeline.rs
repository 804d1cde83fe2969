//! Loader -> filter -> expander -> mapper, each stage consuming the whole
//! table the previous one produced.

use std::io::{Read, Write};
use tracing::{info, info_span};

use crate::config::{DateErrorPolicy, Schema};
use crate::error::Result;
use crate::output::RecordWriter;
use crate::record::NormalizedRecord;
use crate::{expander, filter, loader, normalizer, schemas};

/// Row counts after each stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub loaded: usize,
    pub filtered: usize,
    pub expanded: usize,
    pub records: usize,
    pub nulled_dates: usize,
}

/// One configured normalization run. Holds no state between invocations.
#[derive(Debug, Clone)]
pub struct Pipeline {
    schema: Schema,
    policy: DateErrorPolicy,
}

impl Pipeline {
    pub fn new(schema: Schema, policy: DateErrorPolicy) -> Self {
        Self { schema, policy }
    }

    pub fn from_preset(preset: &str, policy: DateErrorPolicy) -> Result<Self> {
        Ok(Self::new(schemas::lookup(preset)?, policy))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn normalize<R: Read>(&self, input: R) -> Result<(Vec<NormalizedRecord>, RunSummary)> {
        self.normalize_with_hint(input, 0)
    }

    /// `size_hint` is the input length in bytes, when known.
    pub fn normalize_with_hint<R: Read>(
        &self,
        input: R,
        size_hint: usize,
    ) -> Result<(Vec<NormalizedRecord>, RunSummary)> {
        let span = info_span!("normalize", schema = %self.schema.name);
        let _guard = span.enter();

        let rows = loader::load_with_hint(input, &self.schema, size_hint)?;
        let loaded = rows.len();
        let rows = filter::filter_rows(rows, &self.schema);
        let filtered = rows.len();
        let rows = expander::expand_rows(&rows, &self.schema);
        let expanded = rows.len();
        let mapped = normalizer::normalize(&rows, &self.schema.extractors, self.policy)?;

        let summary = RunSummary {
            loaded,
            filtered,
            expanded,
            records: mapped.records.len(),
            nulled_dates: mapped.nulled_dates,
        };
        info!(
            loaded,
            filtered,
            expanded,
            records = summary.records,
            nulled_dates = summary.nulled_dates,
            "normalized export"
        );
        Ok((mapped.records, summary))
    }

    /// Normalizes `input` and writes CSV to `out`. Nothing is written unless every stage succeeded.
    pub fn run<R: Read, W: Write>(&self, input: R, out: W) -> Result<RunSummary> {
        let (records, summary) = self.normalize(input)?;
        let mut writer = RecordWriter::new(out, b',')?;
        writer.write_batch(&records)?;
        writer.finish()?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NormalizeError;

    const INPUT: &str = "\
_time,recipient,ccAddresses{},toAddresses{},eventType,clickTime
04/27/2020 00:32,a@x.com,b@x.com,b@x.com,messagesBlocked,
04/27/2020 01:00,c@x.com,,,irrelevantType,
,,,,,
04/27/2020 02:00,,,,messagesDelivered,
";

    #[test]
    fn summary_counts_each_stage() {
        let pipeline = Pipeline::from_preset("proofpoint-v1", DateErrorPolicy::Fail).unwrap();
        let (records, summary) = pipeline.normalize(INPUT.as_bytes()).unwrap();
        assert_eq!(
            summary,
            RunSummary {
                loaded: 3,
                filtered: 1,
                expanded: 2,
                records: 2,
                nulled_dates: 0,
            }
        );
        assert!(records.iter().all(|r| r.email.is_some()));
    }

    #[test]
    fn failed_run_writes_nothing() {
        let pipeline = Pipeline::from_preset("proofpoint", DateErrorPolicy::Fail).unwrap();
        let input = "_time,recipient,eventType,clickTime\nlater,a@x.com,messagesBlocked,\n";
        let mut out = Vec::new();
        let err = pipeline.run(input.as_bytes(), &mut out).unwrap_err();
        assert!(matches!(err, NormalizeError::DateParse { .. }));
        assert!(out.is_empty());
    }
}
