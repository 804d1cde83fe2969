use tracing::debug;

use crate::config::Schema;
use crate::record::RawRow;

/// Keeps rows whose event type is allow-listed and that carry at least one address.
pub fn filter_rows(rows: Vec<RawRow>, schema: &Schema) -> Vec<RawRow> {
    let before = rows.len();
    let kept: Vec<RawRow> = rows.into_iter().filter(|row| is_relevant(row, schema)).collect();
    debug!(before, after = kept.len(), "filtered rows");
    kept
}

pub fn is_relevant(row: &RawRow, schema: &Schema) -> bool {
    let allowed = row
        .get(&schema.event_type_column)
        .is_some_and(|event| schema.event_types.iter().any(|t| t == event));
    allowed && schema.email_columns.iter().any(|c| row.is_present(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas;

    fn row(event: Option<&str>, recipient: Option<&str>, cc: Option<&str>) -> RawRow {
        RawRow::from_pairs(&[
            ("eventType", event),
            ("recipient", recipient),
            ("ccAddresses{}", cc),
            ("toAddresses{}", None),
        ])
    }

    #[test]
    fn keeps_allow_listed_rows_in_order() {
        let schema = schemas::lookup("proofpoint").unwrap();
        let rows = vec![
            row(Some("messagesDelivered"), Some("1@x.com"), None),
            row(Some("irrelevantType"), Some("2@x.com"), None),
            row(Some("clicksBlocked"), Some("3@x.com"), None),
            row(None, Some("4@x.com"), None),
        ];
        let kept = filter_rows(rows, &schema);
        let emails: Vec<_> = kept.iter().map(|r| r.get("recipient").unwrap()).collect();
        assert_eq!(emails, vec!["1@x.com", "3@x.com"]);
    }

    #[test]
    fn needs_some_address() {
        let schema = schemas::lookup("proofpoint").unwrap();
        assert!(!is_relevant(&row(Some("messagesBlocked"), None, None), &schema));
        assert!(is_relevant(&row(Some("messagesBlocked"), None, Some("c@x.com")), &schema));
    }

    #[test]
    fn missing_event_type_column_never_matches() {
        let schema = schemas::lookup("proofpoint").unwrap();
        let row = RawRow::from_pairs(&[("recipient", Some("a@x.com"))]);
        assert!(!is_relevant(&row, &schema));
    }

    #[test]
    fn event_type_match_is_exact() {
        let schema = schemas::lookup("proofpoint").unwrap();
        assert!(!is_relevant(&row(Some("MessagesBlocked"), Some("a@x.com"), None), &schema));
        assert!(!is_relevant(&row(Some(" messagesBlocked"), Some("a@x.com"), None), &schema));
    }
}
