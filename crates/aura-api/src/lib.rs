//! Axum HTTP surface for the trajectory review workflow.
//!
//! Hosts the reviewer-facing session endpoints: session creation on page
//! arrival, navigation, rating selection and submission, preview
//! regeneration, advisory statistics and the downloadable session report.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
