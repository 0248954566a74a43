//! Trajectory rating session core.
//!
//! A [`ReviewSession`] tracks one reviewer's pass over one video's
//! trajectories: the current position in the ordered trajectory list, the
//! rating pending for it, the set of already-rated trajectories, live
//! progress, and the one-way transition into the completed state with its
//! exportable report.
//!
//! Everything here is plain state manipulation; the only suspension points
//! are the calls made through [`aura_analysis_client::AnalysisBackend`]
//! (submitting a rating, regenerating a preview, fetching statistics).

pub mod error;
pub mod preview;
pub mod session;
pub mod submit;

pub use error::{ReviewError, ReviewResult};
pub use preview::PreviewAsset;
pub use session::{
    AcceptedRating, CompletionSummary, Direction, NavOutcome, ProgressUpdate, ReviewSession,
    SessionState, DEFAULT_SMOOTHING_FACTOR,
};
pub use submit::{PendingSubmission, SubmitOutcome};
