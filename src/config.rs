use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{NormalizeError, Result};

/// How a date column is turned into the canonical `YYYY-MM-DD HH:MM` string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DateStrategy {
    /// Try each explicit pattern in order, then fall back to a permissive
    /// parse that keeps the wall-clock time and drops any offset.
    FormatList { formats: Vec<String> },
    /// Permissive parse, then convert the instant to UTC.
    TimezoneAware,
}

/// Per-field extraction rule. The table of these is data, not code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extractor {
    DirectMap { column: String },
    FirstNonNull { columns: Vec<String> },
    DateNormalize { column: String, strategy: DateStrategy },
}

impl Extractor {
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Extractor::DirectMap { column } | Extractor::DateNormalize { column, .. } => {
                vec![column.as_str()]
            }
            Extractor::FirstNonNull { columns } => columns.iter().map(String::as_str).collect(),
        }
    }
}

/// Output field -> extractor. Field set and order are fixed by
/// [`NormalizedRecord`](crate::record::NormalizedRecord).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorTable {
    pub email: Extractor,
    pub sent_date: Extractor,
    pub clicked_date: Extractor,
}

impl ExtractorTable {
    pub fn iter(&self) -> [(&'static str, &Extractor); 3] {
        [
            ("email", &self.email),
            ("sent_date", &self.sent_date),
            ("clicked_date", &self.clicked_date),
        ]
    }
}

/// What to do when a single date cell cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DateErrorPolicy {
    /// Abort the whole run.
    #[default]
    Fail,
    /// Null the offending field, log a warning and carry on.
    Null,
}

/// A versioned vendor export schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub required_columns: Vec<String>,
    #[serde(default = "default_event_type_column")]
    pub event_type_column: String,
    pub event_types: Vec<String>,
    /// Columns that may carry an address; a row needs at least one of them.
    pub email_columns: Vec<String>,
    pub recipient_column: String,
    pub cc_column: String,
    pub to_column: String,
    #[serde(default = "default_missing_markers")]
    pub missing_markers: Vec<String>,
    pub extractors: ExtractorTable,
}

fn default_event_type_column() -> String {
    "eventType".to_string()
}

/// Tokens spreadsheet and SIEM exports use for "no value".
pub fn default_missing_markers() -> Vec<String> {
    [
        "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
        "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Schema {
    pub fn from_json_str(input: &str) -> Result<Self> {
        let schema: Schema = serde_json::from_str(input)
            .map_err(|e| NormalizeError::Config(format!("invalid schema: {e}")))?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.event_types.is_empty() {
            return Err(NormalizeError::Config(format!(
                "schema {} has an empty event type allow-list",
                self.name
            )));
        }
        if self.email_columns.is_empty() {
            return Err(NormalizeError::Config(format!(
                "schema {} names no email columns",
                self.name
            )));
        }
        Ok(())
    }

    /// Every column any stage looks at, in first-seen order.
    pub fn referenced_columns(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut push = |c: &str| {
            if !out.iter().any(|seen| seen == c) {
                out.push(c.to_string());
            }
        };
        self.required_columns.iter().for_each(|c| push(c));
        push(&self.event_type_column);
        self.email_columns.iter().for_each(|c| push(c));
        push(&self.recipient_column);
        push(&self.cc_column);
        push(&self.to_column);
        for (_, extractor) in self.extractors.iter() {
            extractor.columns().into_iter().for_each(&mut push);
        }
        out
    }

    pub fn is_missing(&self, cell: &str) -> bool {
        self.missing_markers.iter().any(|m| m == cell)
    }
}
