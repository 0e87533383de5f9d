//! CSV schedule import.
//!
//! Expected header: `title,start_event,end_event` (extra columns are
//! ignored). Timestamps use the 12-hour spreadsheet layout
//! `2024-03-01 09:00:00 AM` and are normalized to 24-hour form. The whole
//! file is parsed before anything is written, so one bad row rejects the
//! import.

use almanac_types::NewEvent;
use almanac_types::api::ImportRow;
use almanac_types::time::parse_import_timestamp;

use crate::error::{ApiError, ApiResult};

/// Only files with this extension are accepted.
pub fn is_csv_filename(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".csv")
}

pub fn parse_csv(data: &[u8]) -> ApiResult<Vec<NewEvent>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut events = Vec::new();
    for (idx, record) in reader.deserialize::<ImportRow>().enumerate() {
        let row_no = idx + 1;
        let row = record.map_err(|e| ApiError::validation(format!("row {}: {}", row_no, e)))?;

        let start = parse_import_timestamp(&row.start_event)
            .map_err(|e| ApiError::validation(format!("row {}: {}", row_no, e)))?;
        let end = parse_import_timestamp(&row.end_event)
            .map_err(|e| ApiError::validation(format!("row {}: {}", row_no, e)))?;

        events.push(NewEvent {
            title: row.title,
            start,
            end,
        });
    }

    Ok(events)
}
