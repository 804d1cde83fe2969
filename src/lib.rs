//! Normalizes email-security vendor event exports into flat
//! `email,sent_date,clicked_date` records.

pub mod config;
pub mod dates;
pub mod error;
pub mod expander;
pub mod filter;
pub mod loader;
pub mod normalizer;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod schemas;

pub use config::{DateErrorPolicy, DateStrategy, Extractor, ExtractorTable, Schema};
pub use error::{NormalizeError, Result};
pub use pipeline::{Pipeline, RunSummary};
pub use record::{NormalizedRecord, RawRow};
