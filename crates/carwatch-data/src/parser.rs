//! CSV log discovery and loading for CARWatch participants.
//!
//! Reads the per-day log files written by the companion mobile app, either
//! directly from a participant folder or from the CSV members of a ZIP
//! export, and converts them into deduplicated, time-sorted
//! [`EventRecord`] sequences for downstream processing.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use carwatch_core::error::{LogError, Result};
use carwatch_core::models::{ActionKind, EventRecord, ExtraValue};
use carwatch_core::time_utils::parse_log_timestamp;
use regex::Regex;
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Find the per-day `*.csv` log files directly inside `folder`, sorted by
/// name. Hidden files (`.`- or `__`-prefixed) are skipped; the scan is
/// non-recursive.
pub fn find_csv_files(folder: &Path) -> Vec<PathBuf> {
    if !folder.exists() {
        warn!("Log folder does not exist: {}", folder.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            entry.file_type().is_file()
                && name.ends_with(".csv")
                && !name.starts_with('.')
                && !name.starts_with("__")
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Derive the participant id from a log folder name or ZIP file stem.
///
/// The naming convention is `logs_<ID>` with an alphanumeric id. This is an
/// explicit parse, never best-effort slicing: anything else fails with
/// [`LogError::Identifier`].
pub fn subject_id_from_name(name: &str) -> Result<String> {
    let re = Regex::new(r"^logs_([A-Za-z0-9]+)$").expect("regex is valid");
    re.captures(name)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| LogError::Identifier {
            name: name.to_string(),
        })
}

// ── Parse accounting ──────────────────────────────────────────────────────────

/// One skipped log row, with the reason it could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRow {
    /// File (or archive member) the row came from.
    pub file: String,
    /// 1-based line number within that file.
    pub line: u64,
    pub reason: String,
}

/// Row-level accounting for one participant's parse.
///
/// Malformed rows are recovered locally (skipped and recorded here) and
/// never abort the parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Number of log files (or archive members) read.
    pub files_read: usize,
    /// Number of data rows encountered, valid or not.
    pub rows_read: usize,
    /// Rows that were skipped, with file/line/reason.
    pub malformed: Vec<MalformedRow>,
}

impl ParseReport {
    pub fn malformed_count(&self) -> usize {
        self.malformed.len()
    }
}

// ── Crate-internal loading ────────────────────────────────────────────────────

/// The outcome of loading one participant's raw files.
#[derive(Debug, Clone)]
pub(crate) struct ParsedLog {
    pub events: Vec<EventRecord>,
    pub report: ParseReport,
}

/// Parse all per-day CSV files directly inside `folder`.
pub(crate) fn parse_folder(folder: &Path) -> Result<ParsedLog> {
    let files = find_csv_files(folder);
    if files.is_empty() {
        return Err(LogError::NoLogFiles(folder.to_path_buf()));
    }

    let mut events: Vec<EventRecord> = Vec::new();
    let mut report = ParseReport::default();
    let mut seen: HashSet<String> = HashSet::new();

    for path in &files {
        let file = File::open(path).map_err(|source| LogError::FileRead {
            path: path.clone(),
            source,
        })?;
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        parse_csv_stream(
            std::io::BufReader::new(file),
            &label,
            &mut events,
            &mut report,
            &mut seen,
        )?;
        report.files_read += 1;
    }

    finish_log(folder, events, report)
}

/// Parse the CSV members of a participant ZIP export.
///
/// With `extract_folder`, the archive is first extracted to a sibling
/// folder named after the archive stem and then loaded from disk; an
/// existing non-empty folder is loaded as-is unless `overwrite_unzipped`
/// is set, in which case its contents are replaced. Extraction failure is
/// fatal and surfaced as [`LogError::Extraction`].
pub(crate) fn parse_zip(
    path: &Path,
    extract_folder: bool,
    overwrite_unzipped: bool,
) -> Result<ParsedLog> {
    let file = File::open(path).map_err(|source| LogError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(file)?;

    if extract_folder {
        let dest = extract_archive(&mut archive, path, overwrite_unzipped)?;
        return parse_folder(&dest);
    }

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| is_log_member(name))
        .map(String::from)
        .collect();
    names.sort();
    if names.is_empty() {
        return Err(LogError::NoLogFiles(path.to_path_buf()));
    }

    let mut events: Vec<EventRecord> = Vec::new();
    let mut report = ParseReport::default();
    let mut seen: HashSet<String> = HashSet::new();

    for name in &names {
        let member = archive.by_name(name)?;
        parse_csv_stream(member, name, &mut events, &mut report, &mut seen)?;
        report.files_read += 1;
    }

    finish_log(path, events, report)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// A ZIP member is a log file when it is a CSV and no path component is
/// hidden (macOS exports ship `__MACOSX/` shadow entries).
fn is_log_member(name: &str) -> bool {
    name.ends_with(".csv")
        && !name
            .split('/')
            .any(|part| part.starts_with('.') || part.starts_with("__"))
}

/// Extract `archive` next to `zip_path`, honoring the overwrite flag.
fn extract_archive<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    zip_path: &Path,
    overwrite: bool,
) -> Result<PathBuf> {
    let dest = zip_path.with_extension("");

    let occupied = std::fs::read_dir(&dest)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);
    if occupied {
        if !overwrite {
            warn!(
                "Folder {} already contains log files which will be loaded; \
                 request overwrite to replace them",
                dest.display()
            );
            return Ok(dest);
        }
        std::fs::remove_dir_all(&dest).map_err(|source| LogError::Extraction {
            path: zip_path.to_path_buf(),
            source,
        })?;
    }

    std::fs::create_dir_all(&dest).map_err(|source| LogError::Extraction {
        path: zip_path.to_path_buf(),
        source,
    })?;
    archive
        .extract(&dest)
        .map_err(|err| LogError::Extraction {
            path: zip_path.to_path_buf(),
            source: std::io::Error::other(err),
        })?;

    debug!("extracted {} to {}", zip_path.display(), dest.display());
    Ok(dest)
}

/// Parse one CSV stream, appending valid rows to `events`.
///
/// The stream must carry a header row with at least `timestamp` and
/// `action` columns; every other column lands in the record's extras map.
/// `#`-prefixed metadata lines are skipped. Rows with missing required
/// fields or unparseable timestamps are counted in `report.malformed` and
/// skipped, never fatal. Exact duplicates across streams are collapsed via
/// the shared `seen` set.
fn parse_csv_stream<R: Read>(
    reader: R,
    source: &str,
    events: &mut Vec<EventRecord>,
    report: &mut ParseReport,
    seen: &mut HashSet<String>,
) -> Result<()> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let ts_col = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("timestamp"));
    let action_col = headers.iter().position(|h| h.eq_ignore_ascii_case("action"));
    let (Some(ts_col), Some(action_col)) = (ts_col, action_col) else {
        warn!("{}: no timestamp/action columns, skipping file", source);
        report.malformed.push(MalformedRow {
            file: source.to_string(),
            line: 1,
            reason: "missing timestamp or action column".to_string(),
        });
        return Ok(());
    };

    for (idx, record) in rdr.records().enumerate() {
        // Fallback line number when the reader lost track (header is line 1).
        let fallback_line = (idx + 2) as u64;
        report.rows_read += 1;

        let record = match record {
            Ok(r) => r,
            Err(err) => {
                let line = err.position().map(|p| p.line()).unwrap_or(fallback_line);
                report.malformed.push(MalformedRow {
                    file: source.to_string(),
                    line,
                    reason: err.to_string(),
                });
                continue;
            }
        };
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(fallback_line);

        let raw_ts = record.get(ts_col).unwrap_or("");
        if raw_ts.is_empty() {
            report.malformed.push(MalformedRow {
                file: source.to_string(),
                line,
                reason: "missing timestamp".to_string(),
            });
            continue;
        }
        let Some(timestamp) = parse_log_timestamp(raw_ts) else {
            report.malformed.push(MalformedRow {
                file: source.to_string(),
                line,
                reason: format!("unparseable timestamp \"{}\"", raw_ts),
            });
            continue;
        };

        let raw_action = record.get(action_col).unwrap_or("");
        if raw_action.is_empty() {
            report.malformed.push(MalformedRow {
                file: source.to_string(),
                line,
                reason: "missing action".to_string(),
            });
            continue;
        }
        let action = ActionKind::parse(raw_action);

        let mut extras: BTreeMap<String, ExtraValue> = BTreeMap::new();
        for (col, name) in headers.iter().enumerate() {
            if col == ts_col || col == action_col {
                continue;
            }
            let Some(value) = record.get(col) else { continue };
            if value.is_empty() {
                continue;
            }
            // Old app versions wrote the alarm_ring saliva id under a legacy key.
            let key = if name == "extra_saliva_id" {
                "saliva_id"
            } else {
                name
            };
            extras.insert(key.to_string(), ExtraValue::coerce(value));
        }

        let event = EventRecord {
            timestamp,
            action,
            extras,
        };
        if seen.insert(event.dedup_key()) {
            events.push(event);
        } else {
            debug!("{}: duplicate record at line {} collapsed", source, line);
        }
    }

    Ok(())
}

/// Shared tail of both loaders: require at least one valid row, then sort.
fn finish_log(path: &Path, mut events: Vec<EventRecord>, report: ParseReport) -> Result<ParsedLog> {
    if events.is_empty() {
        return Err(LogError::EmptyLog {
            path: path.to_path_buf(),
        });
    }

    // Stable sort: same-timestamp events keep their file order.
    events.sort_by_key(|e| e.timestamp);

    debug!(
        "parsed {} events from {} ({} files, {} malformed rows)",
        events.len(),
        path.display(),
        report.files_read,
        report.malformed.len(),
    );
    Ok(ParsedLog { events, report })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn write_zip(path: &Path, members: &[(&str, &[&str])]) {
        let file = File::create(path).unwrap();
        let mut zw = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, lines) in members {
            zw.start_file(*name, options).unwrap();
            for line in *lines {
                writeln!(zw, "{}", line).unwrap();
            }
        }
        zw.finish().unwrap();
    }

    const HEADER: &str = "timestamp,action,saliva_id,barcode_value";

    fn scan_row(ts: &str, saliva_id: u32, barcode: &str) -> String {
        format!("{},barcode_scanned,{},{}", ts, saliva_id, barcode)
    }

    // ── find_csv_files ────────────────────────────────────────────────────────

    #[test]
    fn test_find_csv_files_sorted() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "carwatch_2.csv", &[HEADER]);
        write_csv(dir.path(), "carwatch_1.csv", &[HEADER]);
        write_csv(dir.path(), "notes.txt", &["hello"]);

        let files = find_csv_files(dir.path());
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["carwatch_1.csv", "carwatch_2.csv"]);
    }

    #[test]
    fn test_find_csv_files_skips_hidden() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), ".hidden.csv", &[HEADER]);
        write_csv(dir.path(), "__shadow.csv", &[HEADER]);
        write_csv(dir.path(), "day1.csv", &[HEADER]);

        let files = find_csv_files(dir.path());
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_find_csv_files_not_recursive() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("nested");
        std::fs::create_dir_all(&sub).unwrap();
        write_csv(&sub, "deep.csv", &[HEADER]);

        assert!(find_csv_files(dir.path()).is_empty());
    }

    #[test]
    fn test_find_csv_files_nonexistent_folder() {
        assert!(find_csv_files(Path::new("/tmp/does-not-exist-carwatch-xyz")).is_empty());
    }

    // ── subject_id_from_name ──────────────────────────────────────────────────

    #[test]
    fn test_subject_id_from_name_ok() {
        assert_eq!(subject_id_from_name("logs_AB12C").unwrap(), "AB12C");
    }

    #[test]
    fn test_subject_id_from_name_rejects_other_prefix() {
        assert!(matches!(
            subject_id_from_name("notes_AB12C"),
            Err(LogError::Identifier { .. })
        ));
    }

    #[test]
    fn test_subject_id_from_name_rejects_non_alphanumeric() {
        assert!(subject_id_from_name("logs_AB-12").is_err());
        assert!(subject_id_from_name("logs_").is_err());
    }

    // ── parse_folder ──────────────────────────────────────────────────────────

    #[test]
    fn test_parse_folder_basic() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            "day1.csv",
            &[
                HEADER,
                &scan_row("2019-12-05T07:05:00", 0, "0690001"),
                &scan_row("2019-12-05T07:20:00", 1, "0690002"),
            ],
        );

        let parsed = parse_folder(dir.path()).unwrap();
        assert_eq!(parsed.events.len(), 2);
        assert_eq!(parsed.report.files_read, 1);
        assert_eq!(parsed.report.rows_read, 2);
        assert!(parsed.report.malformed.is_empty());
    }

    #[test]
    fn test_parse_folder_extras_typed() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            "day1.csv",
            &[HEADER, &scan_row("2019-12-05T07:05:00", 3, "0690001")],
        );

        let parsed = parse_folder(dir.path()).unwrap();
        let event = &parsed.events[0];
        assert_eq!(event.action, ActionKind::BarcodeScanned);
        assert_eq!(event.extra("saliva_id"), Some(&ExtraValue::Int(3)));
        // Leading zero keeps the barcode textual.
        assert_eq!(
            event.extra("barcode_value"),
            Some(&ExtraValue::Text("0690001".to_string()))
        );
    }

    #[test]
    fn test_parse_folder_sorted_across_files() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            "day2.csv",
            &[HEADER, &scan_row("2019-12-06T07:05:00", 0, "0690006")],
        );
        write_csv(
            dir.path(),
            "day1.csv",
            &[HEADER, &scan_row("2019-12-05T07:05:00", 0, "0690001")],
        );

        let parsed = parse_folder(dir.path()).unwrap();
        assert!(parsed.events[0].timestamp < parsed.events[1].timestamp);
    }

    #[test]
    fn test_parse_folder_malformed_rows_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            "day1.csv",
            &[
                HEADER,
                "not-a-timestamp,barcode_scanned,0,0690001",
                ",barcode_scanned,0,0690001",
                "2019-12-05T07:05:00,,0,0690001",
                &scan_row("2019-12-05T07:20:00", 1, "0690002"),
            ],
        );

        let parsed = parse_folder(dir.path()).unwrap();
        assert_eq!(parsed.events.len(), 1);
        assert_eq!(parsed.report.rows_read, 4);
        assert_eq!(parsed.report.malformed_count(), 3);
    }

    #[test]
    fn test_parse_folder_header_only_is_empty_log() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "day1.csv", &[HEADER]);

        assert!(matches!(
            parse_folder(dir.path()),
            Err(LogError::EmptyLog { .. })
        ));
    }

    #[test]
    fn test_parse_folder_all_rows_malformed_is_empty_log() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "day1.csv", &[HEADER, "garbage,,,"]);

        assert!(matches!(
            parse_folder(dir.path()),
            Err(LogError::EmptyLog { .. })
        ));
    }

    #[test]
    fn test_parse_folder_no_files() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            parse_folder(dir.path()),
            Err(LogError::NoLogFiles(_))
        ));
    }

    #[test]
    fn test_parse_folder_missing_required_column_skips_file() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "day1.csv", &["time,note", "x,y"]);
        write_csv(
            dir.path(),
            "day2.csv",
            &[HEADER, &scan_row("2019-12-05T07:05:00", 0, "0690001")],
        );

        let parsed = parse_folder(dir.path()).unwrap();
        assert_eq!(parsed.events.len(), 1);
        assert_eq!(parsed.report.malformed_count(), 1);
    }

    #[test]
    fn test_parse_folder_comment_lines_skipped() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            "day1.csv",
            &[
                "# exported by CARWatch app 1.1.0",
                HEADER,
                &scan_row("2019-12-05T07:05:00", 0, "0690001"),
            ],
        );

        let parsed = parse_folder(dir.path()).unwrap();
        assert_eq!(parsed.events.len(), 1);
    }

    #[test]
    fn test_parse_folder_deduplicates_overlapping_exports() {
        let dir = TempDir::new().unwrap();
        let rows = [
            HEADER,
            &scan_row("2019-12-05T07:05:00", 0, "0690001"),
            &scan_row("2019-12-05T07:20:00", 1, "0690002"),
        ];
        write_csv(dir.path(), "day1.csv", &rows);
        write_csv(dir.path(), "day1_again.csv", &rows);

        let parsed = parse_folder(dir.path()).unwrap();
        assert_eq!(parsed.events.len(), 2);
    }

    #[test]
    fn test_parse_folder_idempotent() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            "day1.csv",
            &[
                HEADER,
                &scan_row("2019-12-05T07:20:00", 1, "0690002"),
                &scan_row("2019-12-05T07:05:00", 0, "0690001"),
            ],
        );

        let first = parse_folder(dir.path()).unwrap();
        let second = parse_folder(dir.path()).unwrap();
        assert_eq!(first.events, second.events);
    }

    #[test]
    fn test_parse_folder_legacy_saliva_key_renamed() {
        let dir = TempDir::new().unwrap();
        write_csv(
            dir.path(),
            "day1.csv",
            &[
                "timestamp,action,extra_saliva_id",
                "2019-12-05T07:00:00,alarm_ring,2",
            ],
        );

        let parsed = parse_folder(dir.path()).unwrap();
        let event = &parsed.events[0];
        assert_eq!(event.extra("saliva_id"), Some(&ExtraValue::Int(2)));
        assert!(event.extra("extra_saliva_id").is_none());
    }

    // ── parse_zip ─────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_zip_basic() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("logs_AB12C.zip");
        write_zip(
            &zip_path,
            &[
                (
                    "day1.csv",
                    &[HEADER, &scan_row("2019-12-05T07:05:00", 0, "0690001")][..],
                ),
                (
                    "day2.csv",
                    &[HEADER, &scan_row("2019-12-06T07:05:00", 0, "0690006")][..],
                ),
            ],
        );

        let parsed = parse_zip(&zip_path, false, false).unwrap();
        assert_eq!(parsed.events.len(), 2);
        assert_eq!(parsed.report.files_read, 2);
    }

    #[test]
    fn test_parse_zip_skips_shadow_members() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("logs_AB12C.zip");
        write_zip(
            &zip_path,
            &[
                (
                    "day1.csv",
                    &[HEADER, &scan_row("2019-12-05T07:05:00", 0, "0690001")][..],
                ),
                ("__MACOSX/day1.csv", &["junk"][..]),
                (".DS_Store.csv", &["junk"][..]),
            ],
        );

        let parsed = parse_zip(&zip_path, false, false).unwrap();
        assert_eq!(parsed.report.files_read, 1);
        assert_eq!(parsed.events.len(), 1);
    }

    #[test]
    fn test_parse_zip_corrupt_archive_fails() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("logs_AB12C.zip");
        std::fs::write(&zip_path, b"this is not a zip archive").unwrap();

        assert!(parse_zip(&zip_path, false, false).is_err());
    }

    #[test]
    fn test_parse_zip_extracts_to_sibling_folder() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("logs_AB12C.zip");
        write_zip(
            &zip_path,
            &[(
                "day1.csv",
                &[HEADER, &scan_row("2019-12-05T07:05:00", 0, "0690001")][..],
            )],
        );

        let parsed = parse_zip(&zip_path, true, false).unwrap();
        assert_eq!(parsed.events.len(), 1);

        let extracted = dir.path().join("logs_AB12C");
        assert!(extracted.join("day1.csv").is_file());
    }

    #[test]
    fn test_parse_zip_existing_folder_loaded_without_overwrite() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("logs_AB12C.zip");
        write_zip(
            &zip_path,
            &[(
                "day1.csv",
                &[HEADER, &scan_row("2019-12-05T07:05:00", 0, "0690001")][..],
            )],
        );

        // Pre-existing folder with different content wins unless overwrite.
        let folder = dir.path().join("logs_AB12C");
        std::fs::create_dir_all(&folder).unwrap();
        write_csv(
            &folder,
            "other.csv",
            &[HEADER, &scan_row("2020-01-01T08:00:00", 0, "0690009")][..],
        );

        let parsed = parse_zip(&zip_path, true, false).unwrap();
        assert_eq!(parsed.events.len(), 1);
        assert_eq!(
            parsed.events[0].timestamp,
            parse_log_timestamp("2020-01-01T08:00:00").unwrap()
        );
    }

    #[test]
    fn test_parse_zip_overwrite_replaces_folder() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("logs_AB12C.zip");
        write_zip(
            &zip_path,
            &[(
                "day1.csv",
                &[HEADER, &scan_row("2019-12-05T07:05:00", 0, "0690001")][..],
            )],
        );

        let folder = dir.path().join("logs_AB12C");
        std::fs::create_dir_all(&folder).unwrap();
        write_csv(
            &folder,
            "stale.csv",
            &[HEADER, &scan_row("2020-01-01T08:00:00", 0, "0690009")][..],
        );

        let parsed = parse_zip(&zip_path, true, true).unwrap();
        assert_eq!(parsed.events.len(), 1);
        assert_eq!(
            parsed.events[0].timestamp,
            parse_log_timestamp("2019-12-05T07:05:00").unwrap()
        );
        assert!(!folder.join("stale.csv").exists());
    }

    #[test]
    fn test_parse_zip_no_csv_members() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("logs_AB12C.zip");
        write_zip(&zip_path, &[("readme.txt", &["hello"][..])]);

        assert!(matches!(
            parse_zip(&zip_path, false, false),
            Err(LogError::NoLogFiles(_))
        ));
    }
}
