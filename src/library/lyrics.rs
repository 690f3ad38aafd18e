use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::library_store::WIRE_DATE_FORMAT;

/// Splits raw lyrics into stanzas on blank lines. Empty stanzas are dropped.
pub fn split_stanzas(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .map(|stanza| stanza.trim_matches('\n'))
        .filter(|stanza| !stanza.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a day-first date such as `16.07.2006`.
pub fn parse_wire_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), WIRE_DATE_FORMAT)
        .with_context(|| format!("Invalid date '{}', expected dd.mm.yyyy", raw))
}
