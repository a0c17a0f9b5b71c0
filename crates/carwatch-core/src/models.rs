use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::LogError;

// ── ActionKind ────────────────────────────────────────────────────────────────

/// The action tag of one log line, as written by the CARWatch app.
///
/// Known tags map to dedicated variants; anything else is preserved in
/// [`ActionKind::Other`] so that logs from newer app versions survive a
/// round trip through the pipeline instead of being dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKind {
    AppMetadata,
    PhoneMetadata,
    SubjectIdSet,
    AlarmSet,
    TimerSet,
    AlarmCancel,
    AlarmRing,
    AlarmSnooze,
    AlarmStop,
    AlarmKillall,
    EveningSalivette,
    BarcodeScanInit,
    BarcodeScanned,
    InvalidBarcodeScanned,
    DuplicateBarcodeScanned,
    ManualSampleConfirmed,
    SpontaneousAwakening,
    LightsOut,
    DayFinished,
    ServiceStarted,
    ServiceStopped,
    ScreenOff,
    ScreenOn,
    UserPresent,
    PhoneBootInit,
    PhoneBootComplete,
    /// An action tag not known to this version of the pipeline.
    Other(String),
}

impl ActionKind {
    /// Map a raw action string to its [`ActionKind`].
    ///
    /// Unknown tags are kept verbatim in [`ActionKind::Other`].
    pub fn parse(tag: &str) -> Self {
        match tag {
            "app_metadata" => Self::AppMetadata,
            "phone_metadata" => Self::PhoneMetadata,
            "subject_id_set" => Self::SubjectIdSet,
            "alarm_set" => Self::AlarmSet,
            "timer_set" => Self::TimerSet,
            "alarm_cancel" => Self::AlarmCancel,
            "alarm_ring" => Self::AlarmRing,
            "alarm_snooze" => Self::AlarmSnooze,
            "alarm_stop" => Self::AlarmStop,
            "alarm_killall" => Self::AlarmKillall,
            "evening_salivette" => Self::EveningSalivette,
            "barcode_scan_init" => Self::BarcodeScanInit,
            "barcode_scanned" => Self::BarcodeScanned,
            "invalid_barcode_scanned" => Self::InvalidBarcodeScanned,
            "duplicate_barcode_scanned" => Self::DuplicateBarcodeScanned,
            "manual_sample_confirmed" => Self::ManualSampleConfirmed,
            "spontaneous_awakening" => Self::SpontaneousAwakening,
            "lights_out" => Self::LightsOut,
            "day_finished" => Self::DayFinished,
            "service_started" => Self::ServiceStarted,
            "service_stopped" => Self::ServiceStopped,
            "screen_off" => Self::ScreenOff,
            "screen_on" => Self::ScreenOn,
            "user_present" => Self::UserPresent,
            "phone_boot_init" => Self::PhoneBootInit,
            "phone_boot_complete" => Self::PhoneBootComplete,
            other => Self::Other(other.to_string()),
        }
    }

    /// The wire name of this action tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::AppMetadata => "app_metadata",
            Self::PhoneMetadata => "phone_metadata",
            Self::SubjectIdSet => "subject_id_set",
            Self::AlarmSet => "alarm_set",
            Self::TimerSet => "timer_set",
            Self::AlarmCancel => "alarm_cancel",
            Self::AlarmRing => "alarm_ring",
            Self::AlarmSnooze => "alarm_snooze",
            Self::AlarmStop => "alarm_stop",
            Self::AlarmKillall => "alarm_killall",
            Self::EveningSalivette => "evening_salivette",
            Self::BarcodeScanInit => "barcode_scan_init",
            Self::BarcodeScanned => "barcode_scanned",
            Self::InvalidBarcodeScanned => "invalid_barcode_scanned",
            Self::DuplicateBarcodeScanned => "duplicate_barcode_scanned",
            Self::ManualSampleConfirmed => "manual_sample_confirmed",
            Self::SpontaneousAwakening => "spontaneous_awakening",
            Self::LightsOut => "lights_out",
            Self::DayFinished => "day_finished",
            Self::ServiceStarted => "service_started",
            Self::ServiceStopped => "service_stopped",
            Self::ScreenOff => "screen_off",
            Self::ScreenOn => "screen_on",
            Self::UserPresent => "user_present",
            Self::PhoneBootInit => "phone_boot_init",
            Self::PhoneBootComplete => "phone_boot_complete",
            Self::Other(tag) => tag,
        }
    }

    /// Whether this action records a confirmed saliva sample.
    pub fn is_sample_confirmation(&self) -> bool {
        matches!(self, Self::BarcodeScanned | Self::ManualSampleConfirmed)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ActionKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ── ExtraValue ────────────────────────────────────────────────────────────────

/// One value from the open-schema `extras` mapping of a log line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ExtraValue {
    /// Coerce a raw CSV cell into a typed value.
    ///
    /// Numbers are only recognised when the coercion is unambiguous: an
    /// integer must round-trip exactly (so barcode payloads like `0690005`
    /// keep their leading zero and stay text), and a float must carry a
    /// decimal point.
    pub fn coerce(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            if i.to_string() == raw {
                return Self::Int(i);
            }
        }
        if raw.contains('.') {
            if let Ok(f) = raw.parse::<f64>() {
                if f.is_finite() {
                    return Self::Float(f);
                }
            }
        }
        Self::Text(raw.to_string())
    }

    /// The value as an integer, if it represents one exactly.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// The value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ExtraValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => f.write_str(s),
        }
    }
}

// ── EventRecord ───────────────────────────────────────────────────────────────

/// A single parsed log line: local timestamp, action tag and open extras.
///
/// Created only by the log parser; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    /// Local wall-clock time of the event (the log format carries no zone).
    pub timestamp: NaiveDateTime,
    /// Action tag of the log line.
    pub action: ActionKind,
    /// All columns beyond `timestamp`/`action`, keyed by column name.
    pub extras: BTreeMap<String, ExtraValue>,
}

impl EventRecord {
    /// Calendar date of the event.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Look up one extras value by column name.
    pub fn extra(&self, key: &str) -> Option<&ExtraValue> {
        self.extras.get(key)
    }

    /// Deterministic identity key used to collapse exact duplicates from
    /// overlapping exports. The extras map is a `BTreeMap`, so the JSON
    /// rendering is order-stable.
    pub fn dedup_key(&self) -> String {
        let extras = serde_json::to_string(&self.extras).expect("extras are serializable");
        format!("{}|{}|{}", self.timestamp, self.action.as_str(), extras)
    }
}

// ── ParticipantMetadata ───────────────────────────────────────────────────────

/// Device and app metadata reported by the dedicated metadata events.
///
/// Every field is `None` when the corresponding report is absent from the log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParticipantMetadata {
    /// App version, e.g. `"1.1.0"` (build suffix stripped).
    pub app_version: Option<String>,
    /// OS version (the reported SDK level rendered as a string).
    pub os_version: Option<String>,
    /// Phone model name.
    pub phone_model: Option<String>,
    /// Phone manufacturer name.
    pub phone_manufacturer: Option<String>,
}

impl ParticipantMetadata {
    /// Read one field by its [`MetadataField`] selector.
    pub fn get(&self, field: MetadataField) -> Option<&str> {
        match field {
            MetadataField::AppVersion => self.app_version.as_deref(),
            MetadataField::OsVersion => self.os_version.as_deref(),
            MetadataField::PhoneModel => self.phone_model.as_deref(),
            MetadataField::PhoneManufacturer => self.phone_manufacturer.as_deref(),
        }
    }
}

/// Selector for one [`ParticipantMetadata`] attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    AppVersion,
    OsVersion,
    PhoneModel,
    PhoneManufacturer,
}

impl MetadataField {
    /// All recognised field names.
    pub const ALL: &'static [&'static str] =
        &["app_version", "os_version", "phone_model", "phone_manufacturer"];

    /// The field's snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppVersion => "app_version",
            Self::OsVersion => "os_version",
            Self::PhoneModel => "phone_model",
            Self::PhoneManufacturer => "phone_manufacturer",
        }
    }
}

impl std::str::FromStr for MetadataField {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app_version" => Ok(Self::AppVersion),
            "os_version" => Ok(Self::OsVersion),
            "phone_model" => Ok(Self::PhoneModel),
            "phone_manufacturer" => Ok(Self::PhoneManufacturer),
            other => Err(LogError::UnknownField(other.to_string())),
        }
    }
}

// ── SampleType ────────────────────────────────────────────────────────────────

/// Category of one extracted time observation within a sampling day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    /// The (first) awakening report of the day.
    Awakening,
    /// The n-th morning saliva sample, 1-based.
    Sample(u32),
    /// The evening saliva sample.
    Evening,
}

impl SampleType {
    /// Column/row label, e.g. `"awakening"`, `"sample_3"`, `"evening"`.
    pub fn label(&self) -> String {
        match self {
            Self::Awakening => "awakening".to_string(),
            Self::Sample(n) => format!("sample_{}", n),
            Self::Evening => "evening".to_string(),
        }
    }

    /// Inverse of [`SampleType::label`].
    pub fn parse_label(label: &str) -> Option<Self> {
        match label {
            "awakening" => Some(Self::Awakening),
            "evening" => Some(Self::Evening),
            other => {
                let n = other.strip_prefix("sample_")?.parse().ok()?;
                Some(Self::Sample(n))
            }
        }
    }

    fn sort_key(&self) -> (u8, u32) {
        match self {
            Self::Awakening => (0, 0),
            Self::Sample(n) => (1, *n),
            Self::Evening => (2, 0),
        }
    }
}

impl Ord for SampleType {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for SampleType {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for SampleType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

// ── AwakeningKind ─────────────────────────────────────────────────────────────

/// How an awakening time was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwakeningKind {
    /// Participant tapped the spontaneous-awakening button.
    SelfReport,
    /// Participant stopped the wake-up alarm.
    Alarm,
}

impl AwakeningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfReport => "self-report",
            Self::Alarm => "alarm",
        }
    }
}

impl fmt::Display for AwakeningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AwakeningKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
