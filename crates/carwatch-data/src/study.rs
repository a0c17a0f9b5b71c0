//! Log files from a complete study.
//!
//! A [`StudyLog`] maps subject ids to their [`ParticipantLog`]s, built by a
//! cohort-folder scan with partial-success semantics: one unreadable
//! participant export never blocks the rest of the cohort.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use carwatch_core::error::{LogError, Result};
use carwatch_core::models::MetadataField;
use carwatch_core::study::StudyConfig;
use tracing::{debug, info, warn};

use crate::parser::subject_id_from_name;
use crate::participant::ParticipantLog;
use crate::tables::{EventRow, TimesTable, WideTimesTable};

// ── ScanFailure ───────────────────────────────────────────────────────────────

/// One participant export that could not be loaded during a cohort scan.
#[derive(Debug)]
pub struct ScanFailure {
    /// The folder or ZIP file that failed.
    pub path: PathBuf,
    pub error: LogError,
}

// ── StudyLog ──────────────────────────────────────────────────────────────────

/// All participant logs of one study, keyed by subject id.
///
/// Keys are kept in a sorted map, so iteration order (and with it every
/// derived table) is deterministic regardless of directory scan order.
#[derive(Debug, Default)]
pub struct StudyLog {
    participants: BTreeMap<String, ParticipantLog>,
    failures: Vec<ScanFailure>,
}

impl StudyLog {
    /// Scan `folder` (non-recursively) for participant exports, `logs_<ID>`
    /// sub-folders or `logs_<ID>.zip` archives, and load each one.
    ///
    /// A candidate that fails to parse is recorded in
    /// [`StudyLog::failures`] and excluded from the mapping; the scan
    /// itself only fails when no candidate exists at all.
    pub fn from_folder(
        folder: &Path,
        config: &StudyConfig,
        extract_folder: bool,
        overwrite_unzipped: bool,
    ) -> Result<Self> {
        config.validate()?;

        let candidates = find_participant_candidates(folder);
        if candidates.is_empty() {
            return Err(LogError::NoLogFiles(folder.to_path_buf()));
        }

        let mut participants: BTreeMap<String, ParticipantLog> = BTreeMap::new();
        let mut failures: Vec<ScanFailure> = Vec::new();

        for path in candidates {
            let loaded = if path.is_dir() {
                ParticipantLog::from_folder(&path, config)
            } else {
                ParticipantLog::from_zip_file(&path, config, extract_folder, overwrite_unzipped)
            };

            match loaded {
                Ok(log) => {
                    let subject_id = log.subject_id().to_string();
                    if participants.contains_key(&subject_id) {
                        warn!(
                            "duplicate subject id {} at {}, keeping the first",
                            subject_id,
                            path.display()
                        );
                        failures.push(ScanFailure {
                            path,
                            error: LogError::DuplicateSubject(subject_id),
                        });
                    } else {
                        participants.insert(subject_id, log);
                    }
                }
                Err(error) => {
                    warn!("skipping participant log {}: {}", path.display(), error);
                    failures.push(ScanFailure { path, error });
                }
            }
        }

        info!(
            "study scan: {} participants loaded, {} skipped",
            participants.len(),
            failures.len()
        );
        Ok(Self {
            participants,
            failures,
        })
    }

    // ── Lookup and iteration ──────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Subject ids, ascending.
    pub fn subject_ids(&self) -> Vec<&str> {
        self.participants.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParticipantLog)> {
        self.participants.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, subject_id: &str) -> Option<&ParticipantLog> {
        self.participants.get(subject_id)
    }

    /// Like [`StudyLog::get`], but a miss is a typed error.
    pub fn try_get(&self, subject_id: &str) -> Result<&ParticipantLog> {
        self.participants
            .get(subject_id)
            .ok_or_else(|| LogError::ParticipantNotFound(subject_id.to_string()))
    }

    /// Participant exports that were skipped during the scan.
    pub fn failures(&self) -> &[ScanFailure] {
        &self.failures
    }

    // ── Cohort tables ─────────────────────────────────────────────────────────

    /// Every participant's event table, concatenated; rows carry the
    /// subject id.
    pub fn data_as_table(&self) -> Vec<EventRow> {
        self.participants
            .values()
            .flat_map(ParticipantLog::data_as_table)
            .collect()
    }

    /// Long-format sampling/awakening times for the whole cohort.
    pub fn export_times(&self) -> Result<TimesTable> {
        let mut tables = Vec::with_capacity(self.participants.len());
        for log in self.participants.values() {
            tables.push(log.export_times()?);
        }
        Ok(TimesTable::concat(tables))
    }

    /// Wide-format times: one row per participant over the union of all
    /// participants' (day, sample type) columns.
    pub fn export_times_wide(&self) -> Result<WideTimesTable> {
        Ok(self.export_times()?.to_wide())
    }

    // ── Metadata ──────────────────────────────────────────────────────────────

    /// One metadata value per participant, in subject order.
    pub fn metadata_values(&self, field: MetadataField) -> Vec<(String, Option<String>)> {
        self.participants
            .iter()
            .map(|(id, log)| (id.clone(), log.metadata().get(field).map(str::to_string)))
            .collect()
    }

    /// Frequency count of a metadata attribute across the cohort, sorted by
    /// value. Participants without the attribute are not counted.
    ///
    /// Fails with [`LogError::UnknownField`] when `field` is not one of the
    /// recognised attribute names.
    pub fn get_metadata_stats(&self, field: &str) -> Result<Vec<(String, usize)>> {
        let field: MetadataField = field.parse()?;
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for log in self.participants.values() {
            if let Some(value) = log.metadata().get(field) {
                *counts.entry(value.to_string()).or_insert(0) += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }
}

// ── Folder scanning ───────────────────────────────────────────────────────────

/// Non-recursive scan for participant exports: sub-folders and `.zip` files
/// whose name matches the `logs_<ID>` convention. Sorted by path.
fn find_participant_candidates(folder: &Path) -> Vec<PathBuf> {
    if !folder.exists() {
        warn!("Study folder does not exist: {}", folder.display());
        return Vec::new();
    }

    let mut candidates: Vec<PathBuf> = walkdir::WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let path = entry.path();
            let name = if entry.file_type().is_dir() {
                path.file_name().and_then(|n| n.to_str())
            } else if path.extension().map(|ext| ext == "zip").unwrap_or(false) {
                path.file_stem().and_then(|n| n.to_str())
            } else {
                None
            };
            match name {
                Some(name) => subject_id_from_name(name).is_ok(),
                None => {
                    debug!("ignoring non-participant entry {}", path.display());
                    false
                }
            }
        })
        .map(|entry| entry.into_path())
        .collect();

    candidates.sort();
    candidates
}

// ── Tests ─────────────────────────────────────────────────────────────────────
