//! Shared data models for the Aura trajectory review service.
//!
//! This crate provides Serde-serializable types for:
//! - Trajectory ratings and quality levels
//! - Rating submission and preview regeneration wire contracts
//! - Per-video rating statistics and cross-video learning recommendations
//! - The exportable session report

pub mod preview;
pub mod quality;
pub mod rating;
pub mod recommendations;
pub mod report;
pub mod statistics;
pub mod submission;

// Re-export common types
pub use preview::{RegeneratePreviewRequest, RegeneratePreviewResponse};
pub use quality::QualityLevel;
pub use recommendations::{CommonIssue, LearningRecommendations};
pub use rating::{Rating, RatingError};
pub use report::SessionReport;
pub use statistics::VideoStatistics;
pub use submission::{RateTrajectoryRequest, RateTrajectoryResponse, ResponseStatus};
