//! CSV writers for the tables produced by the log-processing core.

use std::path::Path;

use anyhow::Result;
use carwatch_core::time_utils::format_timestamp;
use carwatch_data::tables::{EventRow, TimesTable, WideTimesTable};

/// Write the long-format times table. Missing observations become empty
/// cells, one row per (subject, day, sample type).
pub fn write_times_csv(path: &Path, table: &TimesTable) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "subject",
        "date",
        "day_id",
        "sample_type",
        "timestamp",
        "minutes_since_awakening",
    ])?;
    for row in table.rows() {
        wtr.write_record([
            row.subject.as_str(),
            &row.date.to_string(),
            &row.day_id.to_string(),
            &row.sample_type.label(),
            &row.timestamp.map(format_timestamp).unwrap_or_default(),
            &row
                .minutes_since_awakening
                .map(|m| m.to_string())
                .unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the wide-format times table: one row per participant.
pub fn write_times_wide_csv(path: &Path, table: &WideTimesTable) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(table.header())?;
    for row in &table.rows {
        let mut record = vec![row.subject.clone()];
        record.extend(
            row.cells
                .iter()
                .map(|cell| cell.map(format_timestamp).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the flat event table, one row per log event.
pub fn write_events_csv(path: &Path, rows: &[EventRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["subject", "timestamp", "action", "extras"])?;
    for row in rows {
        wtr.write_record([
            row.subject.as_str(),
            &format_timestamp(row.timestamp),
            row.action.as_str(),
            row.extras.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
