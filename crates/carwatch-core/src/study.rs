use serde::{Deserialize, Serialize};

use crate::error::{LogError, Result};

// ── StudyConfig ───────────────────────────────────────────────────────────────

/// Sampling-protocol parameters consumed by the log-processing core.
///
/// The defaults describe the classic CAR protocol: five morning samples,
/// one evening salivette, and a day boundary at 18:00, the time of day
/// when the probability of sleeping is the lowest, so evening events are
/// attributed to the following morning's sampling day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Number of scheduled morning saliva samples per day.
    pub num_samples: usize,
    /// Whether the protocol includes an evening sample.
    pub has_evening_sample: bool,
    /// Hour of day (0-23) at which a new sampling day begins.
    pub cutoff_hour: u32,
    /// Whether morning sample indices start at 1 (`sample_1`) or 0
    /// (`sample_0`) in derived tables.
    pub sample_index_one_based: bool,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            num_samples: 5,
            has_evening_sample: true,
            cutoff_hour: 18,
            sample_index_one_based: true,
        }
    }
}

impl StudyConfig {
    /// Check the configuration for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        if self.num_samples == 0 {
            return Err(LogError::Config(
                "num_samples must be at least 1".to_string(),
            ));
        }
        if self.cutoff_hour > 23 {
            return Err(LogError::Config(format!(
                "cutoff_hour must be 0..=23, got {}",
                self.cutoff_hour
            )));
        }
        Ok(())
    }
}
