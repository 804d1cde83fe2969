//! Fan-out of rows that carry several recipient addresses.
//!
//! A row can name a primary recipient plus a cc and a to address in separate
//! columns. Each distinct address becomes its own row:
//!
//! - the primary row always survives. When its recipient cell is empty it
//!   takes the first present address of cc, to;
//! - a cc row follows when cc is present and differs from the recipient cell;
//! - a to row follows when to is present and differs from the cc value.
//!
//! Every emitted row has its cc and to cells cleared, so expanding the output
//! again yields the same rows. Comparisons are exact string equality.

use tracing::debug;

use crate::config::Schema;
use crate::record::RawRow;

pub fn expand_rows(rows: &[RawRow], schema: &Schema) -> Vec<RawRow> {
    let total = rows.iter().map(|row| expansion_count(row, schema)).sum();
    let mut out = Vec::with_capacity(total);
    for row in rows {
        expand_row_into(row, schema, &mut out);
    }
    debug!(before = rows.len(), after = out.len(), "expanded rows");
    out
}

/// Pushes the one to three rows `row` expands into onto `out`.
pub fn expand_row_into(row: &RawRow, schema: &Schema, out: &mut Vec<RawRow>) {
    let recipient = row.get(&schema.recipient_column);
    let cc = row.get(&schema.cc_column);
    let to = row.get(&schema.to_column);

    let base = row
        .with(&schema.cc_column, None)
        .with(&schema.to_column, None);
    let emit = |address: &str| base.with(&schema.recipient_column, Some(address.to_string()));

    out.push(match recipient.or(cc).or(to) {
        Some(address) => emit(address),
        None => base.clone(),
    });
    if let Some(cc) = cc.filter(|cc| Some(*cc) != recipient) {
        out.push(emit(cc));
    }
    if let Some(to) = to.filter(|to| Some(*to) != cc) {
        out.push(emit(to));
    }
}

/// Number of rows `row` expands into.
pub fn expansion_count(row: &RawRow, schema: &Schema) -> usize {
    let recipient = row.get(&schema.recipient_column);
    let cc = row.get(&schema.cc_column);
    let to = row.get(&schema.to_column);
    1 + usize::from(cc.is_some() && cc != recipient) + usize::from(to.is_some() && to != cc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas;

    fn row(recipient: Option<&str>, cc: Option<&str>, to: Option<&str>) -> RawRow {
        RawRow::from_pairs(&[
            ("_time", Some("04/27/2020 00:32")),
            ("recipient", recipient),
            ("ccAddresses{}", cc),
            ("toAddresses{}", to),
            ("eventType", Some("messagesBlocked")),
        ])
    }

    fn recipients(rows: &[RawRow]) -> Vec<Option<&str>> {
        rows.iter().map(|r| r.get("recipient")).collect()
    }

    #[test]
    fn single_address_is_untouched() {
        let schema = schemas::lookup("proofpoint").unwrap();
        let out = expand_rows(&[row(Some("a@x.com"), None, None)], &schema);
        assert_eq!(recipients(&out), vec![Some("a@x.com")]);
        assert_eq!(out[0].get("_time"), Some("04/27/2020 00:32"));
    }

    #[test]
    fn to_equal_to_cc_is_not_repeated() {
        let schema = schemas::lookup("proofpoint").unwrap();
        let out = expand_rows(&[row(Some("a@x.com"), Some("b@x.com"), Some("b@x.com"))], &schema);
        assert_eq!(recipients(&out), vec![Some("a@x.com"), Some("b@x.com")]);
    }

    #[test]
    fn three_distinct_addresses_triple() {
        let schema = schemas::lookup("proofpoint").unwrap();
        let out = expand_rows(&[row(Some("a@x.com"), Some("b@x.com"), Some("c@x.com"))], &schema);
        assert_eq!(
            recipients(&out),
            vec![Some("a@x.com"), Some("b@x.com"), Some("c@x.com")]
        );
        for r in &out {
            assert_eq!(r.get("ccAddresses{}"), None);
            assert_eq!(r.get("toAddresses{}"), None);
            assert_eq!(r.get("eventType"), Some("messagesBlocked"));
        }
    }

    #[test]
    fn cc_equal_to_recipient_is_skipped() {
        let schema = schemas::lookup("proofpoint").unwrap();
        let out = expand_rows(&[row(Some("a@x.com"), Some("a@x.com"), None)], &schema);
        assert_eq!(recipients(&out), vec![Some("a@x.com")]);
    }

    #[test]
    fn to_is_compared_against_cc_not_recipient() {
        let schema = schemas::lookup("proofpoint").unwrap();
        let out = expand_rows(&[row(Some("a@x.com"), Some("b@x.com"), Some("a@x.com"))], &schema);
        assert_eq!(
            recipients(&out),
            vec![Some("a@x.com"), Some("b@x.com"), Some("a@x.com")]
        );
    }

    #[test]
    fn comparisons_are_case_and_space_sensitive() {
        let schema = schemas::lookup("proofpoint").unwrap();
        let out = expand_rows(&[row(Some("a@x.com"), Some("A@x.com "), None)], &schema);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn missing_recipient_promotes_cc() {
        let schema = schemas::lookup("proofpoint").unwrap();
        let out = expand_rows(&[row(None, Some("b@x.com"), Some("c@x.com"))], &schema);
        assert_eq!(
            recipients(&out),
            vec![Some("b@x.com"), Some("b@x.com"), Some("c@x.com")]
        );
    }

    #[test]
    fn missing_recipient_still_counts_cc_against_the_empty_cell() {
        let schema = schemas::lookup("proofpoint").unwrap();
        let source = [
            row(None, Some("g@x.com"), Some("h@x.com")),
            row(None, Some("g@x.com"), Some("g@x.com")),
        ];
        let out = expand_rows(&source, &schema);
        assert_eq!(
            recipients(&out),
            vec![
                Some("g@x.com"),
                Some("g@x.com"),
                Some("h@x.com"),
                Some("g@x.com"),
                Some("g@x.com"),
            ]
        );
        assert!(out.iter().all(|r| r.get("recipient").is_some()));
        assert_eq!(expand_rows(&out, &schema), out);
    }

    #[test]
    fn expanding_twice_is_a_no_op() {
        let schema = schemas::lookup("proofpoint").unwrap();
        let once = expand_rows(&[row(Some("a@x.com"), Some("b@x.com"), Some("c@x.com"))], &schema);
        let twice = expand_rows(&once, &schema);
        assert_eq!(once, twice);
    }

    #[test]
    fn count_matches_expansion() {
        let schema = schemas::lookup("proofpoint").unwrap();
        let source = row(Some("a@x.com"), Some("b@x.com"), Some("b@x.com"));
        let mut out = Vec::new();
        expand_row_into(&source, &schema, &mut out);
        assert_eq!(expansion_count(&source, &schema), out.len());
    }
}
