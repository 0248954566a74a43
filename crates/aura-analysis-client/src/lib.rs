//! Client for the video analysis service.
//!
//! The analysis service owns person detection, trajectory extraction and
//! preview rendering. This crate talks to its rating-workflow endpoints:
//! submitting trajectory ratings, regenerating previews under a revised
//! smoothing factor and fetching per-video rating statistics along with
//! cross-video learning recommendations.

pub mod backend;
pub mod client;
pub mod error;

pub use backend::AnalysisBackend;
pub use client::{AnalysisClient, AnalysisClientConfig};
pub use error::{AnalysisError, AnalysisResult};
