//! Tabular output structures consumed by external exporters.
//!
//! The long format carries one row per (day, sample type) observation;
//! the wide format pivots those observations into one row per participant
//! over an ordered column registry, so column sets stay identical across a
//! heterogeneous cohort.

use carwatch_core::models::{EventRecord, SampleType};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

// ── Long format ───────────────────────────────────────────────────────────────

/// One observation row of the long-format times table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeRow {
    pub subject: String,
    pub date: NaiveDate,
    pub day_id: u32,
    pub sample_type: SampleType,
    /// `None` when the observation is missing; the row is still emitted.
    pub timestamp: Option<NaiveDateTime>,
    /// Minutes between awakening and this sample; `None` for awakening and
    /// evening rows, and whenever the day's awakening is unknown.
    pub minutes_since_awakening: Option<i64>,
}

/// Long-format sampling/awakening times, one row per observation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimesTable {
    rows: Vec<TimeRow>,
}

impl TimesTable {
    pub fn from_rows(rows: Vec<TimeRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TimeRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Concatenate several participants' tables into one cohort table.
    pub fn concat(tables: impl IntoIterator<Item = TimesTable>) -> TimesTable {
        let rows = tables.into_iter().flat_map(|t| t.rows).collect();
        TimesTable { rows }
    }

    /// Pivot into one row per participant.
    ///
    /// The column registry is built once over every (day, sample type) key
    /// present in the table, across all subjects, before any row is
    /// materialised, so every participant gets the identical column set and
    /// missing cells become explicit nulls.
    pub fn to_wide(&self) -> WideTimesTable {
        let mut keys: Vec<(u32, SampleType)> = self
            .rows
            .iter()
            .map(|r| (r.day_id, r.sample_type))
            .collect();
        keys.sort();
        keys.dedup();
        let columns: Vec<WideColumn> = keys
            .into_iter()
            .map(|(day_id, sample_type)| WideColumn {
                day_id,
                sample_type,
            })
            .collect();

        let mut subjects: Vec<String> = self.rows.iter().map(|r| r.subject.clone()).collect();
        subjects.sort();
        subjects.dedup();

        let rows = subjects
            .into_iter()
            .map(|subject| {
                let cells = columns
                    .iter()
                    .map(|col| {
                        self.rows
                            .iter()
                            .find(|r| {
                                r.subject == subject
                                    && r.day_id == col.day_id
                                    && r.sample_type == col.sample_type
                            })
                            .and_then(|r| r.timestamp)
                    })
                    .collect();
                WideRow { subject, cells }
            })
            .collect();

        WideTimesTable { columns, rows }
    }
}

// ── Wide format ───────────────────────────────────────────────────────────────

/// One pivoted column: a (day, sample type) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WideColumn {
    pub day_id: u32,
    pub sample_type: SampleType,
}

impl WideColumn {
    /// Column header, e.g. `"day1_awakening"` or `"day2_sample_3"`.
    pub fn label(&self) -> String {
        format!("day{}_{}", self.day_id, self.sample_type.label())
    }

    /// Inverse of [`WideColumn::label`].
    pub fn parse_label(label: &str) -> Option<Self> {
        let rest = label.strip_prefix("day")?;
        let (day, sample) = rest.split_once('_')?;
        Some(Self {
            day_id: day.parse().ok()?,
            sample_type: SampleType::parse_label(sample)?,
        })
    }
}

/// One participant's pivoted row; `cells` aligns with the table's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub subject: String,
    pub cells: Vec<Option<NaiveDateTime>>,
}

/// Wide-format times table: one row per participant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideTimesTable {
    pub columns: Vec<WideColumn>,
    pub rows: Vec<WideRow>,
}

impl WideTimesTable {
    /// CSV-style header: `subject` followed by the column labels.
    pub fn header(&self) -> Vec<String> {
        std::iter::once("subject".to_string())
            .chain(self.columns.iter().map(WideColumn::label))
            .collect()
    }

    /// Un-pivot back into (subject, day, sample type, timestamp) tuples,
    /// one per cell. Used to check the long/wide round trip.
    pub fn to_long_cells(&self) -> Vec<(String, u32, SampleType, Option<NaiveDateTime>)> {
        self.rows
            .iter()
            .flat_map(|row| {
                self.columns.iter().zip(&row.cells).map(|(col, cell)| {
                    (row.subject.clone(), col.day_id, col.sample_type, *cell)
                })
            })
            .collect()
    }
}

// ── Event table ───────────────────────────────────────────────────────────────

/// One event rendered for the flat inspection table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRow {
    pub subject: String,
    pub timestamp: NaiveDateTime,
    pub action: String,
    /// The extras map as a JSON object string.
    pub extras: String,
}

impl EventRow {
    pub fn from_event(subject: &str, event: &EventRecord) -> Self {
        Self {
            subject: subject.to_string(),
            timestamp: event.timestamp,
            action: event.action.as_str().to_string(),
            extras: serde_json::to_string(&event.extras).expect("extras are serializable"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use carwatch_core::time_utils::parse_log_timestamp;

    fn ts(s: &str) -> NaiveDateTime {
        parse_log_timestamp(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn row(
        subject: &str,
        day_id: u32,
        sample_type: SampleType,
        timestamp: Option<&str>,
    ) -> TimeRow {
        TimeRow {
            subject: subject.to_string(),
            date: date("2019-12-05"),
            day_id,
            sample_type,
            timestamp: timestamp.map(ts),
            minutes_since_awakening: None,
        }
    }

    // ── WideColumn ────────────────────────────────────────────────────────────

    #[test]
    fn test_wide_column_label_round_trip() {
        for col in [
            WideColumn {
                day_id: 1,
                sample_type: SampleType::Awakening,
            },
            WideColumn {
                day_id: 2,
                sample_type: SampleType::Sample(3),
            },
            WideColumn {
                day_id: 3,
                sample_type: SampleType::Evening,
            },
        ] {
            assert_eq!(WideColumn::parse_label(&col.label()), Some(col));
        }
    }

    #[test]
    fn test_wide_column_parse_rejects_garbage() {
        assert_eq!(WideColumn::parse_label("sample_1"), None);
        assert_eq!(WideColumn::parse_label("dayX_awakening"), None);
        assert_eq!(WideColumn::parse_label("day1_lunch"), None);
    }

    // ── to_wide ───────────────────────────────────────────────────────────────

    #[test]
    fn test_to_wide_union_of_columns_across_subjects() {
        // Subject A has two days, subject B only one.
        let table = TimesTable::from_rows(vec![
            row("A", 1, SampleType::Awakening, Some("2019-12-05T07:00:00")),
            row("A", 2, SampleType::Awakening, Some("2019-12-06T07:10:00")),
            row("B", 1, SampleType::Awakening, Some("2019-12-05T06:50:00")),
        ]);
        let wide = table.to_wide();

        assert_eq!(wide.columns.len(), 2);
        assert_eq!(wide.rows.len(), 2);
        // B's missing day-2 cell is an explicit null, not an omitted column.
        let b = wide.rows.iter().find(|r| r.subject == "B").unwrap();
        assert_eq!(b.cells, vec![Some(ts("2019-12-05T06:50:00")), None]);
    }

    #[test]
    fn test_to_wide_columns_ordered() {
        let table = TimesTable::from_rows(vec![
            row("A", 1, SampleType::Evening, None),
            row("A", 1, SampleType::Sample(2), None),
            row("A", 1, SampleType::Awakening, None),
            row("A", 1, SampleType::Sample(1), None),
        ]);
        let labels: Vec<String> = table.to_wide().columns.iter().map(WideColumn::label).collect();
        assert_eq!(
            labels,
            vec![
                "day1_awakening",
                "day1_sample_1",
                "day1_sample_2",
                "day1_evening"
            ]
        );
    }

    #[test]
    fn test_to_wide_subjects_sorted() {
        let table = TimesTable::from_rows(vec![
            row("B", 1, SampleType::Awakening, None),
            row("A", 1, SampleType::Awakening, None),
        ]);
        let wide = table.to_wide();
        let subjects: Vec<&str> = wide
            .rows
            .iter()
            .map(|r| r.subject.as_str())
            .collect();
        assert_eq!(subjects, vec!["A", "B"]);
    }

    #[test]
    fn test_wide_long_round_trip() {
        let rows = vec![
            row("A", 1, SampleType::Awakening, Some("2019-12-05T07:00:00")),
            row("A", 1, SampleType::Sample(1), Some("2019-12-05T07:05:00")),
            row("A", 1, SampleType::Evening, None),
            row("B", 1, SampleType::Awakening, None),
            row("B", 1, SampleType::Sample(1), Some("2019-12-05T07:30:00")),
            row("B", 1, SampleType::Evening, Some("2019-12-04T21:00:00")),
        ];
        let table = TimesTable::from_rows(rows.clone());
        let cells = table.to_wide().to_long_cells();

        // Every long row appears as exactly one wide cell with the same value.
        for r in &rows {
            let matching: Vec<_> = cells
                .iter()
                .filter(|(subject, day_id, sample_type, _)| {
                    subject == &r.subject && *day_id == r.day_id && *sample_type == r.sample_type
                })
                .collect();
            assert_eq!(matching.len(), 1);
            assert_eq!(matching[0].3, r.timestamp);
        }
        assert_eq!(cells.len(), rows.len());
    }

    // ── concat ────────────────────────────────────────────────────────────────

    #[test]
    fn test_concat_preserves_rows() {
        let a = TimesTable::from_rows(vec![row("A", 1, SampleType::Awakening, None)]);
        let b = TimesTable::from_rows(vec![row("B", 1, SampleType::Awakening, None)]);
        let combined = TimesTable::concat([a, b]);
        assert_eq!(combined.len(), 2);
    }

    // ── header ────────────────────────────────────────────────────────────────

    #[test]
    fn test_wide_header_leads_with_subject() {
        let table = TimesTable::from_rows(vec![row(
            "A",
            1,
            SampleType::Awakening,
            Some("2019-12-05T07:00:00"),
        )]);
        let header = table.to_wide().header();
        assert_eq!(header, vec!["subject", "day1_awakening"]);
    }
}
