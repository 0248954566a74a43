//! Application state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use aura_analysis_client::AnalysisClient;
use aura_review::ReviewSession;

use crate::config::ApiConfig;

/// Active review sessions, one per video under review.
///
/// All session mutation happens behind this lock, so reviewer actions stay
/// strictly serialized per session.
pub type SessionMap = Arc<RwLock<HashMap<String, ReviewSession>>>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub analysis: Arc<AnalysisClient>,
    pub sessions: SessionMap,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let analysis = AnalysisClient::from_env()?;
        Ok(Self::with_client(config, analysis))
    }

    /// Create state around an existing analysis client.
    pub fn with_client(config: ApiConfig, analysis: AnalysisClient) -> Self {
        Self {
            config,
            analysis: Arc::new(analysis),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
