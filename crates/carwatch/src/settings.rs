use std::path::PathBuf;

use carwatch_core::study::StudyConfig;
use clap::Parser;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Post-process CARWatch app logs into sampling-time tables
#[derive(Parser, Debug, Clone)]
#[command(
    name = "carwatch",
    about = "Post-process CARWatch app logs into sampling-time tables",
    version
)]
pub struct Settings {
    /// Study folder containing one logs_<ID>.zip archive or logs_<ID>
    /// sub-folder per participant
    pub study_folder: PathBuf,

    /// Output CSV path for the sampling-times table
    #[arg(long, default_value = "sampling_times.csv")]
    pub out: PathBuf,

    /// Write the times table in wide format (one row per participant)
    #[arg(long)]
    pub wide: bool,

    /// Also write the full event log to this CSV path
    #[arg(long)]
    pub events_out: Option<PathBuf>,

    /// Number of scheduled morning samples per day
    #[arg(long, default_value = "5")]
    pub num_samples: usize,

    /// The protocol has no evening sample
    #[arg(long)]
    pub no_evening: bool,

    /// Number morning samples from 0 instead of 1
    #[arg(long)]
    pub zero_based_sample_ids: bool,

    /// Hour of day (0-23) at which a new sampling day begins
    #[arg(long, default_value = "18", value_parser = clap::value_parser!(u32).range(0..=23))]
    pub cutoff_hour: u32,

    /// Extract ZIP archives to a sibling folder before reading
    #[arg(long)]
    pub extract: bool,

    /// Replace previously extracted log folders
    #[arg(long)]
    pub overwrite_unzipped: bool,

    /// Print a frequency table for a metadata field
    #[arg(long, value_parser = ["app_version", "os_version", "phone_model", "phone_manufacturer"])]
    pub metadata_stats: Option<String>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,
}

impl Settings {
    /// The sampling-protocol configuration selected by the CLI flags.
    pub fn study_config(&self) -> StudyConfig {
        StudyConfig {
            num_samples: self.num_samples,
            has_evening_sample: !self.no_evening,
            cutoff_hour: self.cutoff_hour,
            sample_index_one_based: !self.zero_based_sample_ids,
        }
    }
}
