//! Preview regeneration wire contract.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::submission::ResponseStatus;

/// Request body for `POST /api/regenerate-gif` on the analysis service.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegeneratePreviewRequest {
    #[validate(length(min = 1, message = "video_filename must not be empty"))]
    pub video_filename: String,
    pub trajectory_id: usize,
    /// Smoothing factor to render the trajectory path with.
    #[validate(range(min = 0.0, max = 1.0, message = "smoothness_factor must be in [0, 1]"))]
    pub smoothness_factor: f64,
}

/// Response carrying the path of the freshly rendered preview asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegeneratePreviewResponse {
    pub status: ResponseStatus,
    /// Path of the rendered animation, relative to the analysis service.
    #[serde(default)]
    pub gif_path: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
