//! ProofPoint TAP event exports (as pulled through Splunk).

use crate::config::{default_missing_markers, DateStrategy, Extractor, ExtractorTable, Schema};

static TIME: &str = "_time";
static RECIPIENT: &str = "recipient";
static CC: &str = "ccAddresses{}";
static TO: &str = "toAddresses{}";
static CLICK_TIME: &str = "clickTime";
static EVENT_TYPE: &str = "eventType";

static EVENT_TYPES: [&str; 4] = [
    "messagesBlocked",
    "clicksBlocked",
    "messagesDelivered",
    "clicksPermitted",
];

/// Historical export format, e.g. `04/27/2020 00:32`.
pub static V1_FORMATS: [&str; 1] = ["%m/%d/%Y %H:%M"];

/// Current revision: ISO-8601 timestamps with mixed offsets, converted to UTC.
pub fn current() -> Schema {
    build("proofpoint", DateStrategy::TimezoneAware)
}

/// Legacy revision: US-style local timestamps, explicit format list.
pub fn v1() -> Schema {
    build(
        "proofpoint-v1",
        DateStrategy::FormatList {
            formats: V1_FORMATS.iter().map(|f| f.to_string()).collect(),
        },
    )
}

fn build(name: &str, dates: DateStrategy) -> Schema {
    let owned = |cols: &[&str]| cols.iter().map(|c| c.to_string()).collect::<Vec<_>>();
    Schema {
        name: name.to_string(),
        required_columns: owned(&[TIME, RECIPIENT, CLICK_TIME, EVENT_TYPE]),
        event_type_column: EVENT_TYPE.to_string(),
        event_types: owned(&EVENT_TYPES),
        email_columns: owned(&[RECIPIENT, CC, TO]),
        recipient_column: RECIPIENT.to_string(),
        cc_column: CC.to_string(),
        to_column: TO.to_string(),
        missing_markers: default_missing_markers(),
        extractors: ExtractorTable {
            email: Extractor::FirstNonNull {
                columns: owned(&[RECIPIENT, CC, TO]),
            },
            sent_date: Extractor::DateNormalize {
                column: TIME.to_string(),
                strategy: dates.clone(),
            },
            clicked_date: Extractor::DateNormalize {
                column: CLICK_TIME.to_string(),
                strategy: dates,
            },
        },
    }
}
