//! Trait seam between the review workflow and the analysis service.

use async_trait::async_trait;

use aura_models::{
    LearningRecommendations, RateTrajectoryRequest, RegeneratePreviewRequest, VideoStatistics,
};

use crate::error::AnalysisResult;

/// Operations the review workflow needs from the analysis service.
///
/// Implemented over HTTP by [`crate::AnalysisClient`]; tests substitute
/// in-memory implementations.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Persist a trajectory rating. `Ok(())` means the service accepted it.
    async fn submit_rating(&self, request: &RateTrajectoryRequest) -> AnalysisResult<()>;

    /// Render a fresh preview for a trajectory, returning the asset path.
    async fn regenerate_preview(
        &self,
        request: &RegeneratePreviewRequest,
    ) -> AnalysisResult<String>;

    /// Fetch aggregate rating statistics for a video.
    async fn fetch_statistics(&self, video_filename: &str) -> AnalysisResult<VideoStatistics>;

    /// Fetch tuning advice derived from the ratings accumulated so far.
    async fn fetch_recommendations(&self) -> AnalysisResult<LearningRecommendations>;
}
