//! Rating submission.

use tracing::warn;

use aura_analysis_client::AnalysisBackend;
use aura_models::{RateTrajectoryRequest, Rating};

use crate::error::{ReviewError, ReviewResult};
use crate::session::{ProgressUpdate, ReviewSession};

/// Result of an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// The trajectory the rating was recorded against. Captured when the
    /// request went out, so it is correct even for a late response.
    pub trajectory_id: usize,
    pub rating: Rating,
    pub progress: ProgressUpdate,
    /// Whether the driver should advance to the next trajectory after its
    /// short delay. False once the session just completed.
    pub auto_advance: bool,
}

/// Snapshot of everything a submission needs, taken before the network call.
///
/// Lets a driver release whatever lock guards the session while the analysis
/// service works, then record the acceptance afterwards with
/// [`ReviewSession::record_accepted`]. The session id tells a late response
/// that its session has been replaced in the meantime.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub session_id: u64,
    pub request: RateTrajectoryRequest,
}

impl ReviewSession {
    /// Validate the submission preconditions and capture the request payload.
    ///
    /// A rating must be pending and a trajectory must be on display; both are
    /// checked before any network interaction. The trajectory index is
    /// captured by value, so a response arriving after navigation still lands
    /// on the trajectory it was issued for.
    pub fn prepare_submission(&self) -> ReviewResult<PendingSubmission> {
        let Some(rating) = self.pending_rating() else {
            return Err(ReviewError::validation(
                "Please choose a rating before submitting",
            ));
        };
        let Some(trajectory_id) = self.current_index() else {
            return Err(ReviewError::validation(
                "No trajectory is currently on display",
            ));
        };

        Ok(PendingSubmission {
            session_id: self.session_id(),
            request: RateTrajectoryRequest {
                video_filename: self.video_filename().to_string(),
                trajectory_id,
                rating,
                comment: self.comment().to_string(),
                smoothness_factor: self.smoothing_factor(),
            },
        })
    }

    /// Submit the pending rating for the current trajectory.
    ///
    /// On acceptance the captured index joins the rated set and progress is
    /// recomputed. On any failure the session is untouched, the pending
    /// rating survives, and the reviewer can retry.
    pub async fn submit<B: AnalysisBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> ReviewResult<SubmitOutcome> {
        let pending = self.prepare_submission()?;
        let trajectory_id = pending.request.trajectory_id;
        let rating = pending.request.rating;

        if let Err(e) = backend.submit_rating(&pending.request).await {
            warn!(
                video = %pending.request.video_filename,
                trajectory = trajectory_id,
                error = %e,
                "rating submission failed"
            );
            return Err(e.into());
        }

        let progress = self.record_accepted(trajectory_id, rating)?;

        Ok(SubmitOutcome {
            trajectory_id,
            rating,
            progress,
            auto_advance: !progress.completed_now,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use aura_analysis_client::{AnalysisBackend, AnalysisError, AnalysisResult};
    use aura_models::{LearningRecommendations, RegeneratePreviewRequest, VideoStatistics};

    use super::*;
    use crate::session::Direction;

    /// In-memory backend that counts calls and can be told to reject.
    #[derive(Default)]
    struct FakeBackend {
        reject: AtomicBool,
        submit_calls: AtomicUsize,
        regenerate_calls: AtomicUsize,
    }

    impl FakeBackend {
        fn rejecting() -> Self {
            let backend = Self::default();
            backend.reject.store(true, Ordering::SeqCst);
            backend
        }

        fn accept_again(&self) {
            self.reject.store(false, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl AnalysisBackend for FakeBackend {
        async fn submit_rating(&self, _request: &RateTrajectoryRequest) -> AnalysisResult<()> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            if self.reject.load(Ordering::SeqCst) {
                Err(AnalysisError::Rejected("rating was not saved".to_string()))
            } else {
                Ok(())
            }
        }

        async fn regenerate_preview(
            &self,
            request: &RegeneratePreviewRequest,
        ) -> AnalysisResult<String> {
            self.regenerate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!(
                "static/trajectory_gifs/traj_{}.gif",
                request.trajectory_id
            ))
        }

        async fn fetch_statistics(&self, _video: &str) -> AnalysisResult<VideoStatistics> {
            Ok(VideoStatistics {
                total_rated: 1,
                average_rating: 5.0,
                ..Default::default()
            })
        }

        async fn fetch_recommendations(&self) -> AnalysisResult<LearningRecommendations> {
            Ok(LearningRecommendations::default())
        }
    }

    fn rating(value: u8) -> Rating {
        Rating::new(value).unwrap()
    }

    fn session(total: usize) -> ReviewSession {
        ReviewSession::new("mall.mp4", total, 0).unwrap()
    }

    #[tokio::test]
    async fn test_submit_without_rating_never_touches_network() {
        let backend = FakeBackend::default();
        let mut s = session(3);

        let err = s.submit(&backend).await.unwrap_err();
        assert!(matches!(err, ReviewError::Validation(_)));
        assert_eq!(backend.submit_calls.load(Ordering::SeqCst), 0);
        assert_eq!(s.rated_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_on_empty_session_is_a_validation_error() {
        let backend = FakeBackend::default();
        let mut s = session(0);

        let err = s.submit(&backend).await.unwrap_err();
        assert!(matches!(err, ReviewError::Validation(_)));
        assert_eq!(backend.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_accepted_submission_records_and_advances() {
        let backend = FakeBackend::default();
        let mut s = session(3);
        s.select(rating(5));
        s.set_comment("clean path");

        let outcome = s.submit(&backend).await.unwrap();
        assert_eq!(outcome.trajectory_id, 0);
        assert_eq!(outcome.progress.percent, 33);
        assert!(outcome.auto_advance);
        assert!(s.is_rated(0));
    }

    #[tokio::test]
    async fn test_rejected_submission_leaves_state_for_retry() {
        let backend = FakeBackend::rejecting();
        let mut s = session(3);
        s.arrive(1).unwrap();
        s.select(rating(4));

        let err = s.submit(&backend).await.unwrap_err();
        assert!(matches!(err, ReviewError::Analysis(_)));
        assert!(!s.is_rated(1));
        // The chosen rating survives so the reviewer need not reselect.
        assert_eq!(s.pending_rating(), Some(rating(4)));

        // Retry with the same rating succeeds and records exactly once.
        backend.accept_again();
        let outcome = s.submit(&backend).await.unwrap();
        assert_eq!(outcome.trajectory_id, 1);
        assert!(s.is_rated(1));
        assert_eq!(s.rated_count(), 1);
        assert_eq!(backend.submit_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_final_submission_completes_without_auto_advance() {
        let backend = FakeBackend::default();
        let mut s = session(1);
        s.select(rating(4));

        let outcome = s.submit(&backend).await.unwrap();
        assert_eq!(outcome.progress.percent, 100);
        assert!(outcome.progress.completed_now);
        assert!(!outcome.auto_advance);
    }

    #[tokio::test]
    async fn test_regenerate_leaves_rating_state_alone() {
        let backend = FakeBackend::default();
        let mut s = session(3);
        s.select(rating(2));
        s.set_smoothing(0.4).unwrap();

        let first = s.regenerate(&backend).await.unwrap().unwrap().clone();
        assert_eq!(first.path(), "static/trajectory_gifs/traj_0.gif");

        // Changed smoothing, regenerated again: only the preview changes.
        s.set_smoothing(0.8).unwrap();
        let second = s.regenerate(&backend).await.unwrap().unwrap().clone();
        assert_eq!(second.path(), first.path());
        assert_eq!(backend.regenerate_calls.load(Ordering::SeqCst), 2);

        assert_eq!(s.pending_rating(), Some(rating(2)));
        assert_eq!(s.rated_count(), 0);
    }

    #[tokio::test]
    async fn test_regenerate_on_empty_session_is_noop() {
        let backend = FakeBackend::default();
        let mut s = session(0);
        assert!(s.regenerate(&backend).await.unwrap().is_none());
        assert_eq!(backend.regenerate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_statistics_are_advisory_only() {
        let backend = FakeBackend::default();
        let s = session(3);
        let stats = s.load_statistics(&backend).await.unwrap();
        assert_eq!(stats.total_rated, 1);
        // Server figures never drive completion.
        assert_eq!(s.progress_percent(), 0);
    }

    #[tokio::test]
    async fn test_full_session_walkthrough() {
        let backend = FakeBackend::default();
        let mut s = session(3);

        for (index, value) in [(0usize, 5u8), (1, 3), (2, 4)] {
            s.arrive(index).unwrap();
            s.select(rating(value));
            let outcome = s.submit(&backend).await.unwrap();
            assert_eq!(outcome.trajectory_id, index);
        }

        assert_eq!(s.progress_percent(), 100);
        let summary = s.completion().unwrap();
        assert_eq!(summary.average_rating, 4.0);
        assert_eq!(summary.quality_level.as_str(), "good");

        // Navigating after completion still works but changes nothing else.
        assert_eq!(s.step(Direction::Next), crate::session::NavOutcome::AtLast);
    }
}
