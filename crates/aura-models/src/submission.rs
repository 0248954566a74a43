//! Rating submission wire contract.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::rating::Rating;

/// Request body for `POST /api/rate-trajectory` on the analysis service.
///
/// Field names match the analysis service's wire format.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RateTrajectoryRequest {
    /// Video the trajectory belongs to.
    #[validate(length(min = 1, message = "video_filename must not be empty"))]
    pub video_filename: String,
    /// Zero-based index of the trajectory within the video's analysis.
    pub trajectory_id: usize,
    /// Star rating chosen by the reviewer.
    pub rating: Rating,
    /// Free-form reviewer comment, may be empty.
    #[serde(default)]
    pub comment: String,
    /// Smoothing factor the trajectory was previewed with.
    #[validate(range(min = 0.0, max = 1.0, message = "smoothness_factor must be in [0, 1]"))]
    pub smoothness_factor: f64,
}

/// Success flag used by every analysis-service response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    Error,
}

impl ResponseStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseStatus::Success)
    }
}

/// Response body for a rating submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTrajectoryResponse {
    pub status: ResponseStatus,
    #[serde(default)]
    pub message: Option<String>,
}
