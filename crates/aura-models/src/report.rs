//! Exportable session report.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::quality::QualityLevel;

/// Summary of one reviewer's pass over one video's trajectories.
///
/// Offered to the reviewer as a downloadable JSON artifact. The report may be
/// exported before the session completes, in which case it simply reflects
/// whatever has been rated so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub video_filename: String,
    pub total_trajectories: usize,
    /// Trajectories rated so far in this session.
    pub rated_count: usize,
    /// Mean of the session's accepted ratings, 0 when nothing is rated.
    pub average_rating: f64,
    pub quality_level: QualityLevel,
    /// Set once the session completes; absent on partial exports.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionReport {
    /// Deterministic artifact name for a given video and calendar date.
    pub fn file_name(video_filename: &str, date: NaiveDate) -> String {
        format!(
            "trajectory_report_{}_{}.json",
            video_filename,
            date.format("%Y-%m-%d")
        )
    }
}
