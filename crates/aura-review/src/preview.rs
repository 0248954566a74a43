//! Trajectory preview regeneration.

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use aura_analysis_client::AnalysisBackend;
use aura_models::RegeneratePreviewRequest;

use crate::error::ReviewResult;
use crate::session::ReviewSession;

/// A rendered trajectory preview.
///
/// The logical asset path can stay the same across re-renders, so the
/// displayed URI carries a version qualifier that defeats caching and forces
/// the fresh rendering to be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewAsset {
    path: String,
    version: i64,
}

impl PreviewAsset {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: Utc::now().timestamp_millis(),
        }
    }

    /// Logical path of the rendered asset.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// URI to display, with the cache-defeating qualifier appended.
    pub fn display_uri(&self) -> String {
        format!("{}?v={}", self.path, self.version)
    }
}

impl ReviewSession {
    /// Rendering request for the current trajectory's preview, using the
    /// stored smoothing factor. `None` when no trajectory is on display.
    ///
    /// Like [`ReviewSession::prepare_submission`] this lets a driver release
    /// its session lock for the duration of the rendering call and attach the
    /// result afterwards with [`ReviewSession::apply_preview`].
    pub fn preview_request(&self) -> Option<RegeneratePreviewRequest> {
        let trajectory_id = self.current_index()?;
        Some(RegeneratePreviewRequest {
            video_filename: self.video_filename().to_string(),
            trajectory_id,
            smoothness_factor: self.smoothing_factor(),
        })
    }

    /// Attach a freshly rendered preview for `trajectory_id`.
    ///
    /// Dropped (`None`) when the reviewer has navigated away in the meantime:
    /// the rendering belongs to the trajectory the request was issued for,
    /// not to whichever one is on display now.
    pub fn apply_preview(
        &mut self,
        trajectory_id: usize,
        path: impl Into<String>,
    ) -> Option<&PreviewAsset> {
        if self.current_index() != Some(trajectory_id) {
            return None;
        }
        self.replace_preview(PreviewAsset::new(path));
        self.preview()
    }

    /// Request a fresh rendering of the current trajectory's preview.
    ///
    /// No-op (`Ok(None)`) when the session has no current trajectory. Never
    /// touches the rated set or the pending rating, so it can be called any
    /// number of times, also after a rating has been chosen.
    pub async fn regenerate<B: AnalysisBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> ReviewResult<Option<&PreviewAsset>> {
        let Some(request) = self.preview_request() else {
            return Ok(None);
        };

        debug!(
            video = %request.video_filename,
            trajectory = request.trajectory_id,
            smoothing = request.smoothness_factor,
            "regenerating trajectory preview"
        );

        let path = backend.regenerate_preview(&request).await?;
        Ok(self.apply_preview(request.trajectory_id, path))
    }
}
