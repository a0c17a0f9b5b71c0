//! Log data from one single participant.
//!
//! A [`ParticipantLog`] owns the reconciled event sequence of one subject
//! across all recorded days and derives sampling days, awakening times and
//! saliva-sampling times from it.

use std::collections::BTreeMap;
use std::path::Path;

use carwatch_core::error::{LogError, Result};
use carwatch_core::models::{
    ActionKind, AwakeningKind, EventRecord, ExtraValue, ParticipantMetadata, SampleType,
};
use carwatch_core::study::StudyConfig;
use carwatch_core::time_utils::sampling_date;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::parser::{self, ParseReport, ParsedLog};
use crate::tables::{EventRow, TimeRow, TimesTable, WideTimesTable};

// ── Derived per-day types ─────────────────────────────────────────────────────

/// One sampling day's slice of the event sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingDay {
    /// Sampling date the day is attributed to (date of its last event,
    /// rolled over past the cutoff hour).
    pub date: NaiveDate,
    /// 1-based ordinal of the day within the log.
    pub day_id: u32,
    pub events: Vec<EventRecord>,
}

/// The awakening observation of one sampling day.
#[derive(Debug, Clone, PartialEq)]
pub struct AwakeningTime {
    pub date: NaiveDate,
    pub day_id: u32,
    /// `None` when no awakening was reported for the day, or when the first
    /// alarm stop belongs to a later sample's alarm.
    pub timestamp: Option<NaiveDateTime>,
    pub kind: Option<AwakeningKind>,
}

/// One confirmed saliva sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTime {
    pub sample_type: SampleType,
    pub timestamp: NaiveDateTime,
    /// The app-reported 0-based saliva id, when the scan carried one.
    pub saliva_id: Option<i64>,
}

/// All confirmed samples of one sampling day, in scan order.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySamples {
    pub date: NaiveDate,
    pub day_id: u32,
    pub samples: Vec<SampleTime>,
}

// ── ParticipantLog ────────────────────────────────────────────────────────────

/// The complete, time-sorted, deduplicated log of one participant.
#[derive(Debug, Clone)]
pub struct ParticipantLog {
    subject_id: String,
    events: Vec<EventRecord>,
    config: StudyConfig,
    metadata: ParticipantMetadata,
    report: ParseReport,
}

impl ParticipantLog {
    // ── Constructors ──────────────────────────────────────────────────────────

    /// Load a participant's per-day CSV files from a `logs_<ID>` folder.
    pub fn from_folder(path: &Path, config: &StudyConfig) -> Result<Self> {
        config.validate()?;
        let subject_id = subject_id_from_path(path, false)?;
        let parsed = parser::parse_folder(path)?;
        Ok(Self::from_parts(subject_id, parsed, config.clone()))
    }

    /// Load a participant's log from a `logs_<ID>.zip` export.
    ///
    /// See [`crate::parser`] for the extraction semantics of
    /// `extract_folder` / `overwrite_unzipped`.
    pub fn from_zip_file(
        path: &Path,
        config: &StudyConfig,
        extract_folder: bool,
        overwrite_unzipped: bool,
    ) -> Result<Self> {
        config.validate()?;
        let subject_id = subject_id_from_path(path, true)?;
        let parsed = parser::parse_zip(path, extract_folder, overwrite_unzipped)?;
        Ok(Self::from_parts(subject_id, parsed, config.clone()))
    }

    pub(crate) fn from_parts(subject_id: String, parsed: ParsedLog, config: StudyConfig) -> Self {
        let metadata = extract_metadata(&parsed.events);
        debug!(
            "participant {}: {} events, {} malformed rows",
            subject_id,
            parsed.events.len(),
            parsed.report.malformed_count(),
        );
        Self {
            subject_id,
            events: parsed.events,
            config,
            metadata,
            report: parsed.report,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// The full event sequence, ascending by timestamp.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    pub fn metadata(&self) -> &ParticipantMetadata {
        &self.metadata
    }

    /// Row-level accounting from the parse (malformed rows etc.).
    pub fn parse_report(&self) -> &ParseReport {
        &self.report
    }

    /// First calendar date with log data. Most likely the day the app was
    /// installed, not necessarily the first sampling day.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.events.first().map(EventRecord::date)
    }

    /// Last calendar date with log data.
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.events.last().map(EventRecord::date)
    }

    /// All distinct calendar dates with log data, ascending.
    pub fn log_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.events.iter().map(EventRecord::date).collect();
        dates.dedup();
        dates
    }

    /// The extras of the first event with the given action, if any.
    pub fn extras_for_action(&self, action: &ActionKind) -> Option<&BTreeMap<String, ExtraValue>> {
        self.events
            .iter()
            .find(|e| &e.action == action)
            .map(|e| &e.extras)
    }

    // ── Filtering ─────────────────────────────────────────────────────────────

    /// Events matching the given criteria (logical AND).
    ///
    /// An empty `actions` slice matches any action; `date` matches on
    /// calendar-day equality. An empty result is valid.
    pub fn filter_events(
        &self,
        actions: &[ActionKind],
        date: Option<NaiveDate>,
    ) -> Vec<EventRecord> {
        self.events
            .iter()
            .filter(|e| actions.is_empty() || actions.contains(&e.action))
            .filter(|e| date.map(|d| e.date() == d).unwrap_or(true))
            .cloned()
            .collect()
    }

    // ── Day segmentation ──────────────────────────────────────────────────────

    /// Partition the event sequence into sampling days.
    ///
    /// A boundary falls between consecutive events when the earlier one is
    /// an explicit `day_finished` marker, or when their sampling dates
    /// differ under the configured cutoff hour (events at or past the
    /// cutoff roll over to the next day, so evening samples group with the
    /// following morning). A trailing partial day is still emitted.
    pub fn split_sampling_days(&self) -> Result<Vec<SamplingDay>> {
        split_events(&self.events, &self.config)
    }

    // ── Time extraction ───────────────────────────────────────────────────────

    /// The awakening observation of every sampling day, chronological.
    ///
    /// A spontaneous-awakening report wins over an alarm stop; an alarm
    /// stop whose `saliva_id` is non-zero belongs to a later sample's alarm,
    /// so the awakening time stays unknown for that day.
    pub fn awakening_times(&self) -> Result<Vec<AwakeningTime>> {
        let days = self.split_sampling_days()?;
        Ok(days
            .iter()
            .map(|day| {
                let (timestamp, kind) = day_awakening(day);
                AwakeningTime {
                    date: day.date,
                    day_id: day.day_id,
                    timestamp,
                    kind,
                }
            })
            .collect())
    }

    /// The confirmed saliva samples of every sampling day, in scan order.
    ///
    /// Morning samples are indexed 1-based by position; a scan whose
    /// `saliva_id` reaches the configured sample count is the evening
    /// sample. Scans beyond the configured count are kept and indexed past
    /// the range rather than dropped.
    pub fn sampling_times(&self) -> Result<Vec<DaySamples>> {
        let days = self.split_sampling_days()?;
        Ok(days
            .iter()
            .map(|day| DaySamples {
                date: day.date,
                day_id: day.day_id,
                samples: day_samples(day, &self.config),
            })
            .collect())
    }

    /// Combine awakening and sampling times into the long-format table:
    /// one row per (day, sample type), with explicit nulls for missing
    /// observations so the cardinality stays stable across days.
    pub fn export_times(&self) -> Result<TimesTable> {
        let days = self.split_sampling_days()?;
        let mut rows = Vec::new();

        for day in &days {
            let (awakening, _) = day_awakening(day);
            rows.push(TimeRow {
                subject: self.subject_id.clone(),
                date: day.date,
                day_id: day.day_id,
                sample_type: SampleType::Awakening,
                timestamp: awakening,
                minutes_since_awakening: None,
            });

            let samples = day_samples(day, &self.config);
            let morning_count = samples
                .iter()
                .filter(|s| matches!(s.sample_type, SampleType::Sample(_)))
                .count();
            let slots = self.config.num_samples.max(morning_count);
            let offset = if self.config.sample_index_one_based { 1 } else { 0 };
            for slot in 0..slots as u32 {
                let n = slot + offset;
                let timestamp = samples
                    .iter()
                    .find(|s| s.sample_type == SampleType::Sample(n))
                    .map(|s| s.timestamp);
                let minutes_since_awakening = match (awakening, timestamp) {
                    (Some(awake), Some(ts)) => Some((ts - awake).num_minutes()),
                    _ => None,
                };
                rows.push(TimeRow {
                    subject: self.subject_id.clone(),
                    date: day.date,
                    day_id: day.day_id,
                    sample_type: SampleType::Sample(n),
                    timestamp,
                    minutes_since_awakening,
                });
            }

            if self.config.has_evening_sample {
                let timestamp = samples
                    .iter()
                    .find(|s| s.sample_type == SampleType::Evening)
                    .map(|s| s.timestamp);
                rows.push(TimeRow {
                    subject: self.subject_id.clone(),
                    date: day.date,
                    day_id: day.day_id,
                    sample_type: SampleType::Evening,
                    timestamp,
                    minutes_since_awakening: None,
                });
            }
        }

        Ok(TimesTable::from_rows(rows))
    }

    /// [`ParticipantLog::export_times`] pivoted into one row per
    /// participant with `day{N}_{sample_type}` columns.
    pub fn export_times_wide(&self) -> Result<WideTimesTable> {
        Ok(self.export_times()?.to_wide())
    }

    /// The raw event sequence as a flat table, for inspection and export.
    /// Not used by the time-extraction logic.
    pub fn data_as_table(&self) -> Vec<EventRow> {
        self.events
            .iter()
            .map(|e| EventRow::from_event(&self.subject_id, e))
            .collect()
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Derive the subject id from a log folder name or ZIP file stem.
fn subject_id_from_path(path: &Path, is_zip: bool) -> Result<String> {
    let name = if is_zip {
        path.file_stem().and_then(|s| s.to_str())
    } else {
        path.file_name().and_then(|s| s.to_str())
    };
    let name = name.ok_or_else(|| LogError::Identifier {
        name: path.display().to_string(),
    })?;
    parser::subject_id_from_name(name)
}

/// Boundary walk over a sorted event sequence.
fn split_events(events: &[EventRecord], config: &StudyConfig) -> Result<Vec<SamplingDay>> {
    if events.is_empty() {
        return Err(LogError::Segmentation);
    }

    let cutoff = config.cutoff_hour;
    let mut slices: Vec<Vec<EventRecord>> = Vec::new();
    let mut current: Vec<EventRecord> = Vec::new();

    for event in events {
        let boundary = match current.last() {
            None => false,
            Some(prev) => {
                prev.action == ActionKind::DayFinished
                    || sampling_date(prev.timestamp, cutoff) != sampling_date(event.timestamp, cutoff)
            }
        };
        if boundary {
            slices.push(std::mem::take(&mut current));
        }
        current.push(event.clone());
    }
    slices.push(current);

    Ok(slices
        .into_iter()
        .enumerate()
        .map(|(i, events)| {
            let last = events.last().expect("day slices are non-empty");
            SamplingDay {
                date: sampling_date(last.timestamp, cutoff),
                day_id: (i + 1) as u32,
                events,
            }
        })
        .collect())
}

/// First awakening observation within one day.
fn day_awakening(day: &SamplingDay) -> (Option<NaiveDateTime>, Option<AwakeningKind>) {
    if let Some(event) = day
        .events
        .iter()
        .find(|e| e.action == ActionKind::SpontaneousAwakening)
    {
        return (Some(event.timestamp), Some(AwakeningKind::SelfReport));
    }

    if let Some(event) = day.events.iter().find(|e| e.action == ActionKind::AlarmStop) {
        let saliva_id = event.extra("saliva_id").and_then(ExtraValue::as_i64);
        return match saliva_id {
            // The wake-up alarm carries saliva id 0 (or none at all).
            None | Some(0) => (Some(event.timestamp), Some(AwakeningKind::Alarm)),
            Some(_) => (None, Some(AwakeningKind::Alarm)),
        };
    }

    (None, None)
}

/// Confirmed samples within one day, indexed by scan order.
fn day_samples(day: &SamplingDay, config: &StudyConfig) -> Vec<SampleTime> {
    let mut samples = Vec::new();
    let offset = if config.sample_index_one_based { 1 } else { 0 };
    let mut morning_count = 0u32;

    for event in day
        .events
        .iter()
        .filter(|e| e.action.is_sample_confirmation())
    {
        let saliva_id = event.extra("saliva_id").and_then(ExtraValue::as_i64);
        let is_evening = config.has_evening_sample
            && saliva_id
                .map(|id| id >= config.num_samples as i64)
                .unwrap_or(false);
        let sample_type = if is_evening {
            SampleType::Evening
        } else {
            let index = morning_count + offset;
            morning_count += 1;
            SampleType::Sample(index)
        };
        samples.push(SampleTime {
            sample_type,
            timestamp: event.timestamp,
            saliva_id,
        });
    }

    samples
}

/// Pull the participant metadata out of the dedicated report events.
fn extract_metadata(events: &[EventRecord]) -> ParticipantMetadata {
    let mut meta = ParticipantMetadata::default();

    if let Some(event) = events.iter().find(|e| e.action == ActionKind::AppMetadata) {
        // The version name carries a build suffix after '_'.
        meta.app_version = event
            .extra("app_version_name")
            .map(|v| v.to_string().split('_').next().unwrap_or_default().to_string());
    }

    if let Some(event) = events.iter().find(|e| e.action == ActionKind::PhoneMetadata) {
        meta.phone_model = event.extra("model").map(|v| v.to_string());
        meta.phone_manufacturer = event.extra("manufacturer").map(|v| v.to_string());
        meta.os_version = event.extra("version_sdk_level").map(|v| v.to_string());
    }

    meta
}

// ── Tests ─────────────────────────────────────────────────────────────────────
