use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the CARWatch log-processing crates.
#[derive(Error, Debug)]
pub enum LogError {
    /// A participant identifier could not be derived from a file or folder name.
    #[error("Cannot derive participant id from \"{name}\"")]
    Identifier { name: String },

    /// Parsing finished without a single valid log row.
    #[error("No valid log rows found in {path}")]
    EmptyLog { path: PathBuf },

    /// The given folder or archive contains no log files at all.
    #[error("No log files found in {0}")]
    NoLogFiles(PathBuf),

    /// The event sequence cannot be split into at least one sampling day.
    #[error("Cannot identify any sampling day")]
    Segmentation,

    /// Extracting a ZIP archive to disk failed.
    #[error("Failed to extract archive {path}: {source}")]
    Extraction {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A metadata field name is not one of the recognised attributes.
    #[error("Unknown metadata field: {0}")]
    UnknownField(String),

    /// A subject id was not found in the study mapping.
    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),

    /// Two participant logs in one study folder resolved to the same subject id.
    #[error("Duplicate subject id: {0}")]
    DuplicateSubject(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A ZIP archive could not be opened or read.
    #[error("Failed to read archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A CSV stream could not be read at all (per-row problems are not errors).
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the carwatch crates.
pub type Result<T> = std::result::Result<T, LogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_identifier() {
        let err = LogError::Identifier {
            name: "notes_AB12C".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot derive participant id from \"notes_AB12C\""
        );
    }

    #[test]
    fn test_error_display_empty_log() {
        let err = LogError::EmptyLog {
            path: PathBuf::from("/study/logs_AB12C"),
        };
        let msg = err.to_string();
        assert!(msg.contains("No valid log rows"));
        assert!(msg.contains("/study/logs_AB12C"));
    }

    #[test]
    fn test_error_display_no_log_files() {
        let err = LogError::NoLogFiles(PathBuf::from("/empty/dir"));
        assert_eq!(err.to_string(), "No log files found in /empty/dir");
    }

    #[test]
    fn test_error_display_segmentation() {
        let err = LogError::Segmentation;
        assert_eq!(err.to_string(), "Cannot identify any sampling day");
    }

    #[test]
    fn test_error_display_extraction() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = LogError::Extraction {
            path: PathBuf::from("/study/logs_AB12C.zip"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to extract archive"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_error_display_unknown_field() {
        let err = LogError::UnknownField("shoe_size".to_string());
        assert_eq!(err.to_string(), "Unknown metadata field: shoe_size");
    }

    #[test]
    fn test_error_display_participant_not_found() {
        let err = LogError::ParticipantNotFound("XY89Z".to_string());
        assert_eq!(err.to_string(), "Participant not found: XY89Z");
    }

    #[test]
    fn test_error_display_config() {
        let err = LogError::Config("cutoff_hour must be 0..=23".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: cutoff_hour must be 0..=23"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: LogError = io_err.into();
        assert!(err.to_string().contains("no such file"));
    }
}
