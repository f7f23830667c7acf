use crate::error::InputRejection;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// One meter observation: the cumulative kWh reading on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageEntry {
    pub date: Date,
    /// Earlier versions of the form stored this field as `kwh`.
    #[serde(alias = "kwh")]
    pub reading: f64,
}

impl UsageEntry {
    /// Validates raw form input, in the order a user would notice the problem.
    pub fn parse(date_text: &str, reading_text: &str) -> Result<Self, InputRejection> {
        let date_text = date_text.trim();
        let reading_text = reading_text.trim();
        if date_text.is_empty() {
            return Err(InputRejection::EmptyDate);
        }
        if reading_text.is_empty() {
            return Err(InputRejection::EmptyReading);
        }
        let reading = reading_text
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite())
            .ok_or(InputRejection::NotANumber)?;
        let date =
            Date::strptime("%Y-%m-%d", date_text).map_err(|_| InputRejection::InvalidDate)?;
        Ok(Self { date, reading })
    }
}

/// Serializes the sequence into the persisted blob layout.
pub fn encode_entries(entries: &[UsageEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string(entries)
}

/// Parses a persisted blob. Any shape mismatch yields `None`.
///
/// The blob lives outside our control, so the result is re-sorted by date.
pub fn decode_entries(blob: &str) -> Option<Vec<UsageEntry>> {
    let mut entries: Vec<UsageEntry> = serde_json::from_str(blob).ok()?;
    entries.sort_by_key(|entry| entry.date);
    Some(entries)
}
