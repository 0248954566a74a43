//! Review session handlers.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use aura_analysis_client::AnalysisBackend;
use aura_models::{LearningRecommendations, QualityLevel, Rating, SessionReport, VideoStatistics};
use aura_review::{Direction, PreviewAsset, ReviewSession};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Page arrival payload: the hosting page supplies the video identity, the
/// trajectory count from the analysis, and the trajectory being viewed.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub video_filename: String,
    pub total_trajectories: usize,
    #[serde(default)]
    pub trajectory_id: usize,
}

/// Snapshot of the session the rating view renders from.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub video_filename: String,
    pub total_trajectories: usize,
    pub trajectory_id: Option<usize>,
    pub pending_rating: Option<Rating>,
    pub comment: String,
    pub smoothness_factor: f64,
    pub rated_count: usize,
    pub progress_percent: u8,
    pub state: &'static str,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub can_submit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionView>,
}

#[derive(Debug, Serialize)]
pub struct CompletionView {
    pub average_rating: f64,
    pub quality_level: QualityLevel,
    pub completed_at: DateTime<Utc>,
}

impl SessionView {
    fn from_session(session: &ReviewSession) -> Self {
        Self {
            video_filename: session.video_filename().to_string(),
            total_trajectories: session.total_trajectories(),
            trajectory_id: session.current_index(),
            pending_rating: session.pending_rating(),
            comment: session.comment().to_string(),
            smoothness_factor: session.smoothing_factor(),
            rated_count: session.rated_count(),
            progress_percent: session.progress_percent(),
            state: session.state().as_str(),
            can_go_previous: session.can_go_previous(),
            can_go_next: session.can_go_next(),
            can_submit: session.can_submit(),
            preview_uri: session.preview().map(|p| p.display_uri()),
            completion: session.completion().map(|c| CompletionView {
                average_rating: c.average_rating,
                quality_level: c.quality_level,
                completed_at: c.completed_at,
            }),
        }
    }
}

fn session_not_found(video: &str) -> ApiError {
    ApiError::not_found(format!("No active review session for video {}", video))
}

/// Create (or re-initialize) the review session for a video.
///
/// Re-arrival replaces any previous session for the same video, mirroring a
/// page reload.
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> ApiResult<Json<SessionView>> {
    let session = ReviewSession::new(
        request.video_filename.clone(),
        request.total_trajectories,
        request.trajectory_id,
    )?;

    let view = SessionView::from_session(&session);
    state
        .sessions
        .write()
        .await
        .insert(request.video_filename, session);

    Ok(Json(view))
}

/// Current session snapshot.
pub async fn get_session(
    State(state): State<AppState>,
    Path(video): Path<String>,
) -> ApiResult<Json<SessionView>> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&video).ok_or_else(|| session_not_found(&video))?;
    Ok(Json(SessionView::from_session(session)))
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    /// -1 for previous, 1 for next.
    pub direction: i8,
}

#[derive(Debug, Serialize)]
pub struct NavigateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
    #[serde(flatten)]
    pub view: SessionView,
}

/// Move to the previous or next trajectory.
///
/// Boundary attempts are not errors: the response carries an informational
/// notice and the view is unchanged.
pub async fn navigate(
    State(state): State<AppState>,
    Path(video): Path<String>,
    Json(request): Json<NavigateRequest>,
) -> ApiResult<Json<NavigateResponse>> {
    let direction = Direction::from_delta(request.direction)
        .ok_or_else(|| ApiError::bad_request("direction must be -1 or 1"))?;

    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&video)
        .ok_or_else(|| session_not_found(&video))?;

    let outcome = session.step(direction);
    debug!(video = %video, ?outcome, "navigation");

    Ok(Json(NavigateResponse {
        notice: outcome.notice(),
        view: SessionView::from_session(session),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub rating: Rating,
}

/// Choose the rating for the current trajectory.
pub async fn select_rating(
    State(state): State<AppState>,
    Path(video): Path<String>,
    Json(request): Json<SelectRequest>,
) -> ApiResult<Json<SessionView>> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&video)
        .ok_or_else(|| session_not_found(&video))?;

    session.select(request.rating);
    Ok(Json(SessionView::from_session(session)))
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub comment: String,
}

/// Update the comment accompanying the pending rating.
pub async fn set_comment(
    State(state): State<AppState>,
    Path(video): Path<String>,
    Json(request): Json<CommentRequest>,
) -> ApiResult<Json<SessionView>> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&video)
        .ok_or_else(|| session_not_found(&video))?;

    session.set_comment(request.comment);
    Ok(Json(SessionView::from_session(session)))
}

#[derive(Debug, Deserialize)]
pub struct SmoothingRequest {
    pub smoothness_factor: f64,
}

/// Store a new smoothing factor. Takes effect on the next regeneration.
pub async fn set_smoothing(
    State(state): State<AppState>,
    Path(video): Path<String>,
    Json(request): Json<SmoothingRequest>,
) -> ApiResult<Json<SessionView>> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&video)
        .ok_or_else(|| session_not_found(&video))?;

    session.set_smoothing(request.smoothness_factor)?;
    Ok(Json(SessionView::from_session(session)))
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub recorded_trajectory: usize,
    pub completed_now: bool,
    #[serde(flatten)]
    pub view: SessionView,
}

/// Submit the pending rating.
///
/// The session lock is released for the duration of the upstream call, so a
/// slow analysis service never stalls other sessions. On acceptance a delayed
/// auto-advance to the next trajectory is scheduled; at the last trajectory
/// the session completes instead.
pub async fn submit_rating(
    State(state): State<AppState>,
    Path(video): Path<String>,
) -> ApiResult<Json<SubmitResponse>> {
    let pending = {
        let sessions = state.sessions.read().await;
        let session = sessions.get(&video).ok_or_else(|| session_not_found(&video))?;
        session.prepare_submission()?
    };

    if let Err(e) = state.analysis.submit_rating(&pending.request).await {
        warn!(
            video = %video,
            trajectory = pending.request.trajectory_id,
            error = %e,
            "rating submission failed"
        );
        return Err(e.into());
    }

    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&video)
        .ok_or_else(|| session_not_found(&video))?;
    if session.session_id() != pending.session_id {
        // The session was re-initialized while the request was in flight; the
        // acceptance belongs to the discarded instance.
        return Err(ApiError::bad_request(
            "Review session was reset during submission",
        ));
    }

    let progress = session.record_accepted(pending.request.trajectory_id, pending.request.rating)?;
    let view = SessionView::from_session(session);
    let session_id = session.session_id();
    drop(sessions);

    if !progress.completed_now {
        schedule_auto_advance(state, video, session_id);
    }

    Ok(Json(SubmitResponse {
        recorded_trajectory: pending.request.trajectory_id,
        completed_now: progress.completed_now,
        view,
    }))
}

/// Advance to the next trajectory after the configured delay.
///
/// The session id pins the advance to the instance that scheduled it: a
/// session that disappeared or was re-initialized in the meantime is left
/// alone. A boundary step is already a no-op on its own.
fn schedule_auto_advance(state: AppState, video: String, session_id: u64) {
    let delay = state.config.auto_advance_delay;
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let mut sessions = state.sessions.write().await;
        if let Some(session) = sessions.get_mut(&video) {
            if session.session_id() != session_id {
                debug!(video = %video, "skipping auto-advance for a re-initialized session");
                return;
            }
            let outcome = session.step(Direction::Next);
            info!(video = %video, ?outcome, "auto-advance");
        }
    });
}

#[derive(Debug, Serialize)]
pub struct RegenerateResponse {
    pub preview_uri: String,
}

/// Re-render the current trajectory's preview with the stored smoothing
/// factor.
///
/// The session lock is dropped while the analysis service renders. A
/// rendering that comes back after the reviewer navigated on (or reloaded the
/// page) is returned but not attached to the session.
pub async fn regenerate_preview(
    State(state): State<AppState>,
    Path(video): Path<String>,
) -> ApiResult<Json<RegenerateResponse>> {
    let (session_id, request) = {
        let sessions = state.sessions.read().await;
        let session = sessions.get(&video).ok_or_else(|| session_not_found(&video))?;
        let request = session
            .preview_request()
            .ok_or_else(|| ApiError::bad_request("No trajectory is currently on display"))?;
        (session.session_id(), request)
    };

    debug!(
        video = %video,
        trajectory = request.trajectory_id,
        smoothing = request.smoothness_factor,
        "regenerating trajectory preview"
    );
    let path = state.analysis.regenerate_preview(&request).await?;

    let mut sessions = state.sessions.write().await;
    let applied = match sessions.get_mut(&video) {
        Some(session) if session.session_id() == session_id => session
            .apply_preview(request.trajectory_id, path.clone())
            .map(|asset| asset.display_uri()),
        _ => None,
    };
    drop(sessions);

    let preview_uri = applied.unwrap_or_else(|| PreviewAsset::new(path).display_uri());
    Ok(Json(RegenerateResponse { preview_uri }))
}

/// Advisory server-side statistics for the video under review.
pub async fn get_statistics(
    State(state): State<AppState>,
    Path(video): Path<String>,
) -> ApiResult<Json<VideoStatistics>> {
    {
        let sessions = state.sessions.read().await;
        if !sessions.contains_key(&video) {
            return Err(session_not_found(&video));
        }
    }

    let stats = state.analysis.fetch_statistics(&video).await?;
    Ok(Json(stats))
}

/// Advisory tuning recommendations aggregated across all rated videos.
pub async fn get_recommendations(
    State(state): State<AppState>,
) -> ApiResult<Json<LearningRecommendations>> {
    let recommendations = state.analysis.fetch_recommendations().await?;
    Ok(Json(recommendations))
}

/// Download the session report.
///
/// Available at any time; before completion it reflects whatever has been
/// rated so far.
pub async fn export_report(
    State(state): State<AppState>,
    Path(video): Path<String>,
) -> ApiResult<Response> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&video).ok_or_else(|| session_not_found(&video))?;

    let report: SessionReport = session.export_report();
    let file_name = session.report_file_name();

    Ok((
        [(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )],
        Json(report),
    )
        .into_response())
}
