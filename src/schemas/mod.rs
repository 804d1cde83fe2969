pub mod proofpoint;

use crate::config::Schema;
use crate::error::{NormalizeError, Result};

pub const PRESETS: &[&str] = &["proofpoint", "proofpoint-v1"];

pub fn lookup(preset: &str) -> Result<Schema> {
    match preset {
        "proofpoint" => Ok(proofpoint::current()),
        "proofpoint-v1" => Ok(proofpoint::v1()),
        _ => Err(NormalizeError::Config(format!(
            "unknown preset: {preset} (available: {})",
            PRESETS.join(", ")
        ))),
    }
}
