//! Review session state and transitions.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use aura_analysis_client::AnalysisBackend;
use aura_models::{QualityLevel, Rating, SessionReport, VideoStatistics};

use crate::error::{ReviewError, ReviewResult};
use crate::preview::PreviewAsset;

/// Smoothing factor a session starts with.
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.1;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Where the reviewer is in the session lifecycle.
///
/// One-way: a completed session never returns to in-progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    InProgress,
    Completed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::InProgress => "in_progress",
            SessionState::Completed => "completed",
        }
    }
}

/// Step direction through the trajectory list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    /// Parse the -1 / +1 convention used on the wire.
    pub fn from_delta(delta: i8) -> Option<Self> {
        match delta {
            -1 => Some(Direction::Previous),
            1 => Some(Direction::Next),
            _ => None,
        }
    }
}

/// Result of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Moved to the given trajectory index.
    Moved(usize),
    /// Already at the first trajectory; nothing changed.
    AtFirst,
    /// Already at the last trajectory; nothing changed.
    AtLast,
}

impl NavOutcome {
    /// Informational notice for boundary attempts. Not an error.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            NavOutcome::Moved(_) => None,
            NavOutcome::AtFirst => Some("This is the first trajectory"),
            NavOutcome::AtLast => Some("This is the last trajectory"),
        }
    }
}

/// One accepted submission, in the order the reviewer made them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AcceptedRating {
    pub trajectory_id: usize,
    pub rating: Rating,
}

/// Progress figures after a rated-set mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Rounded completion percentage, 0-100.
    pub percent: u8,
    /// True exactly once, on the recomputation that crossed 100%.
    pub completed_now: bool,
}

/// Summary fixed at the moment the session completes.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionSummary {
    pub average_rating: f64,
    pub quality_level: QualityLevel,
    pub completed_at: DateTime<Utc>,
}

/// One reviewer's pass over one video's trajectories.
///
/// Created when the rating view is opened with `(video, trajectory, total)`
/// supplied by the hosting page, discarded when the reviewer navigates away.
#[derive(Debug)]
pub struct ReviewSession {
    /// Process-unique instance identity, see [`ReviewSession::session_id`].
    session_id: u64,
    video_filename: String,
    total_trajectories: usize,
    /// Absent only when the video has no trajectories at all.
    current_index: Option<usize>,
    pending_rating: Option<Rating>,
    hover_rating: Option<Rating>,
    comment: String,
    smoothing_factor: f64,
    /// Indices with an accepted submission. Grows monotonically.
    rated: BTreeSet<usize>,
    /// Every accepted `(index, rating)` pair, in submission order.
    accepted: Vec<AcceptedRating>,
    state: SessionState,
    completion: Option<CompletionSummary>,
    preview: Option<PreviewAsset>,
}

impl ReviewSession {
    /// Start a session for `video_filename` at `start_index`.
    ///
    /// A zero-trajectory video is accepted: the session pins progress to 0
    /// and can never submit or complete.
    pub fn new(
        video_filename: impl Into<String>,
        total_trajectories: usize,
        start_index: usize,
    ) -> ReviewResult<Self> {
        let video_filename = video_filename.into();
        if video_filename.is_empty() {
            return Err(ReviewError::validation("video filename must not be empty"));
        }
        if total_trajectories > 0 && start_index >= total_trajectories {
            return Err(ReviewError::validation(format!(
                "trajectory {} out of range, video has {} trajectories",
                start_index, total_trajectories
            )));
        }

        info!(
            video = %video_filename,
            total = total_trajectories,
            start = start_index,
            "starting review session"
        );

        Ok(Self {
            session_id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            video_filename,
            total_trajectories,
            current_index: (total_trajectories > 0).then_some(start_index),
            pending_rating: None,
            hover_rating: None,
            comment: String::new(),
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            rated: BTreeSet::new(),
            accepted: Vec::new(),
            state: SessionState::InProgress,
            completion: None,
            preview: None,
        })
    }

    // --- accessors ---

    /// Identity of this session instance.
    ///
    /// Re-initializing a video's session yields a fresh id, so a delayed
    /// effect scheduled against the old instance can tell its target is gone.
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn video_filename(&self) -> &str {
        &self.video_filename
    }

    pub fn total_trajectories(&self) -> usize {
        self.total_trajectories
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn pending_rating(&self) -> Option<Rating> {
        self.pending_rating
    }

    pub fn hover_rating(&self) -> Option<Rating> {
        self.hover_rating
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn smoothing_factor(&self) -> f64 {
        self.smoothing_factor
    }

    pub fn rated_count(&self) -> usize {
        self.rated.len()
    }

    pub fn is_rated(&self, index: usize) -> bool {
        self.rated.contains(&index)
    }

    pub fn accepted(&self) -> &[AcceptedRating] {
        &self.accepted
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn completion(&self) -> Option<&CompletionSummary> {
        self.completion.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewAsset> {
        self.preview.as_ref()
    }

    pub(crate) fn replace_preview(&mut self, asset: PreviewAsset) {
        self.preview = Some(asset);
    }

    pub fn can_go_previous(&self) -> bool {
        matches!(self.current_index, Some(i) if i > 0)
    }

    pub fn can_go_next(&self) -> bool {
        matches!(self.current_index, Some(i) if i + 1 < self.total_trajectories)
    }

    /// Submission is possible once a rating has been chosen.
    pub fn can_submit(&self) -> bool {
        self.pending_rating.is_some() && self.current_index.is_some()
    }

    // --- navigation ---

    /// Move one trajectory in `direction`.
    ///
    /// Boundary attempts are no-ops that carry an informational notice.
    /// Arriving at a new trajectory re-runs the arrival reset: the pending
    /// rating, hover state and comment are cleared.
    pub fn step(&mut self, direction: Direction) -> NavOutcome {
        let Some(current) = self.current_index else {
            // Nothing to navigate in an empty session.
            return match direction {
                Direction::Previous => NavOutcome::AtFirst,
                Direction::Next => NavOutcome::AtLast,
            };
        };

        match direction {
            Direction::Previous => {
                if current == 0 {
                    return NavOutcome::AtFirst;
                }
                self.set_current_trajectory(current - 1);
                NavOutcome::Moved(current - 1)
            }
            Direction::Next => {
                if current + 1 >= self.total_trajectories {
                    return NavOutcome::AtLast;
                }
                self.set_current_trajectory(current + 1);
                NavOutcome::Moved(current + 1)
            }
        }
    }

    /// Jump to a specific trajectory (the "set current trajectory" reset the
    /// hosting page issues on arrival).
    pub fn arrive(&mut self, index: usize) -> ReviewResult<()> {
        if self.total_trajectories == 0 {
            return Err(ReviewError::validation("video has no trajectories"));
        }
        if index >= self.total_trajectories {
            return Err(ReviewError::validation(format!(
                "trajectory {} out of range, video has {} trajectories",
                index, self.total_trajectories
            )));
        }
        self.set_current_trajectory(index);
        Ok(())
    }

    fn set_current_trajectory(&mut self, index: usize) {
        debug!(video = %self.video_filename, index, "moving to trajectory");
        self.current_index = Some(index);
        self.pending_rating = None;
        self.hover_rating = None;
        self.comment.clear();
        self.preview = None;
    }

    // --- rating selection ---

    /// Choose the rating for the current trajectory. Enables submission.
    pub fn select(&mut self, rating: Rating) {
        self.pending_rating = Some(rating);
        self.hover_rating = None;
    }

    /// Preview a candidate rating without committing it. Cosmetic only.
    pub fn hover(&mut self, rating: Rating) {
        self.hover_rating = Some(rating);
    }

    pub fn clear_hover(&mut self) {
        self.hover_rating = None;
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// Update the stored smoothing factor. Does not trigger regeneration;
    /// that takes an explicit [`ReviewSession::regenerate`] call.
    pub fn set_smoothing(&mut self, value: f64) -> ReviewResult<()> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ReviewError::validation(format!(
                "smoothing factor must be in [0, 1], got {}",
                value
            )));
        }
        self.smoothing_factor = value;
        Ok(())
    }

    // --- progress / completion ---

    /// Record an accepted submission against the trajectory index it was
    /// issued for.
    ///
    /// The index is the one captured when the request went out, so a response
    /// arriving after the reviewer has navigated on still lands on the right
    /// trajectory. An index past the trajectory list is rejected; accepting
    /// it would let the rated set outgrow the total.
    pub fn record_accepted(
        &mut self,
        trajectory_id: usize,
        rating: Rating,
    ) -> ReviewResult<ProgressUpdate> {
        if trajectory_id >= self.total_trajectories {
            return Err(ReviewError::validation(format!(
                "trajectory {} out of range, video has {} trajectories",
                trajectory_id, self.total_trajectories
            )));
        }
        self.rated.insert(trajectory_id);
        self.accepted.push(AcceptedRating {
            trajectory_id,
            rating,
        });
        info!(
            video = %self.video_filename,
            trajectory = trajectory_id,
            %rating,
            rated = self.rated.len(),
            "rating accepted"
        );
        Ok(self.recompute_progress())
    }

    /// Completion percentage from the local rated set alone.
    pub fn progress_percent(&self) -> u8 {
        if self.total_trajectories == 0 {
            return 0;
        }
        let ratio = self.rated.len() as f64 / self.total_trajectories as f64;
        (ratio * 100.0).round() as u8
    }

    /// Recompute progress and handle the completion crossing.
    ///
    /// The transition into [`SessionState::Completed`] fires exactly once;
    /// recomputing an already-completed session reports `completed_now =
    /// false`.
    pub fn recompute_progress(&mut self) -> ProgressUpdate {
        let percent = self.progress_percent();
        let crossing = percent >= 100
            && self.total_trajectories > 0
            && self.state == SessionState::InProgress;

        if crossing {
            let average_rating = self.average_rating();
            let summary = CompletionSummary {
                average_rating,
                quality_level: QualityLevel::from_average(average_rating),
                completed_at: Utc::now(),
            };
            info!(
                video = %self.video_filename,
                average = summary.average_rating,
                quality = %summary.quality_level,
                "review session completed"
            );
            self.state = SessionState::Completed;
            self.completion = Some(summary);
        }

        ProgressUpdate {
            percent,
            completed_now: crossing,
        }
    }

    /// Mean of the session's accepted ratings.
    ///
    /// When a trajectory was re-rated, the latest value counts.
    pub fn average_rating(&self) -> f64 {
        let mut latest: BTreeMap<usize, Rating> = BTreeMap::new();
        for entry in &self.accepted {
            latest.insert(entry.trajectory_id, entry.rating);
        }
        if latest.is_empty() {
            return 0.0;
        }
        let sum: u32 = latest.values().map(|r| u32::from(r.value())).sum();
        f64::from(sum) / latest.len() as f64
    }

    /// Advisory server-side statistics for this video.
    ///
    /// Display data only; the completion invariant is decided purely from
    /// the local rated set.
    pub async fn load_statistics<B: AnalysisBackend + ?Sized>(
        &self,
        backend: &B,
    ) -> ReviewResult<VideoStatistics> {
        Ok(backend.fetch_statistics(&self.video_filename).await?)
    }

    // --- export ---

    /// Build the session report from whatever data exists right now.
    ///
    /// Callable at any time, also before completion; never mutates state.
    pub fn export_report(&self) -> SessionReport {
        let average_rating = self.average_rating();
        SessionReport {
            video_filename: self.video_filename.clone(),
            total_trajectories: self.total_trajectories,
            rated_count: self.rated.len(),
            average_rating,
            quality_level: QualityLevel::from_average(average_rating),
            completed_at: self.completion.as_ref().map(|c| c.completed_at),
        }
    }

    /// Deterministic artifact name for today's report.
    pub fn report_file_name(&self) -> String {
        SessionReport::file_name(&self.video_filename, Utc::now().date_naive())
    }

    /// Write the report as pretty JSON into `dir`, returning the file path.
    pub fn write_report(&self, dir: &Path) -> ReviewResult<PathBuf> {
        let path = dir.join(self.report_file_name());
        let json = serde_json::to_string_pretty(&self.export_report())?;
        std::fs::write(&path, json)?;
        info!(path = %path.display(), "session report exported");
        Ok(path)
    }
}
