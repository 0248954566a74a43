//! Analysis service HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use aura_models::{
    LearningRecommendations, RateTrajectoryRequest, RateTrajectoryResponse,
    RegeneratePreviewRequest, RegeneratePreviewResponse, VideoStatistics,
};

use crate::backend::AnalysisBackend;
use crate::error::{AnalysisError, AnalysisResult};

/// Configuration for the analysis client.
#[derive(Debug, Clone)]
pub struct AnalysisClientConfig {
    /// Base URL of the analysis service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries
    pub max_retries: u32,
}

impl Default for AnalysisClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(60), // preview rendering can be slow
            max_retries: 2,
        }
    }
}

impl AnalysisClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("ANALYSIS_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            timeout: Duration::from_secs(
                std::env::var("ANALYSIS_SERVICE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            max_retries: std::env::var("ANALYSIS_SERVICE_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        }
    }
}

/// Envelope wrapping the statistics payload on the wire.
#[derive(Debug, Deserialize)]
struct StatisticsEnvelope {
    status: aura_models::ResponseStatus,
    #[serde(default)]
    statistics: Option<VideoStatistics>,
    #[serde(default)]
    message: Option<String>,
}

/// Envelope wrapping the learning recommendations payload on the wire.
#[derive(Debug, Deserialize)]
struct RecommendationsEnvelope {
    status: aura_models::ResponseStatus,
    #[serde(default)]
    recommendations: Option<LearningRecommendations>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the analysis service.
pub struct AnalysisClient {
    http: Client,
    config: AnalysisClientConfig,
}

impl AnalysisClient {
    /// Create a new analysis client.
    pub fn new(config: AnalysisClientConfig) -> AnalysisResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AnalysisError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> AnalysisResult<Self> {
        Self::new(AnalysisClientConfig::from_env())
    }

    /// Check if the analysis service is reachable.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!("Analysis service health check failed: {}", response.status());
                false
            }
            Err(e) => {
                warn!("Analysis service health check error: {}", e);
                false
            }
        }
    }

    async fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> AnalysisResult<reqwest::Response> {
        let url = format!("{}{}", self.config.base_url, path);
        debug!("Sending request to {}", url);

        let response = self
            .with_retry(|| async {
                self.http
                    .post(&url)
                    .json(body)
                    .send()
                    .await
                    .map_err(AnalysisError::Network)
            })
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::RequestFailed(format!(
                "Analysis service returned {}: {}",
                status, body
            )));
        }

        Ok(response)
    }

    async fn get_json(&self, url: &str) -> AnalysisResult<reqwest::Response> {
        debug!("Sending request to {}", url);

        let response = self
            .with_retry(|| async {
                self.http.get(url).send().await.map_err(AnalysisError::Network)
            })
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::RequestFailed(format!(
                "Analysis service returned {}: {}",
                status, body
            )));
        }

        Ok(response)
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> AnalysisResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = AnalysisResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Analysis request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(AnalysisError::RequestFailed("Unknown error".to_string())))
    }
}

#[async_trait]
impl AnalysisBackend for AnalysisClient {
    async fn submit_rating(&self, request: &RateTrajectoryRequest) -> AnalysisResult<()> {
        let response = self.post_json("/api/rate-trajectory", request).await?;
        let body: RateTrajectoryResponse = response.json().await?;

        if body.status.is_success() {
            Ok(())
        } else {
            Err(AnalysisError::Rejected(
                body.message
                    .unwrap_or_else(|| "rating was not saved".to_string()),
            ))
        }
    }

    async fn regenerate_preview(
        &self,
        request: &RegeneratePreviewRequest,
    ) -> AnalysisResult<String> {
        let response = self.post_json("/api/regenerate-gif", request).await?;
        let body: RegeneratePreviewResponse = response.json().await?;

        if !body.status.is_success() {
            return Err(AnalysisError::Rejected(
                body.message
                    .unwrap_or_else(|| "preview rendering failed".to_string()),
            ));
        }

        body.gif_path.ok_or_else(|| {
            AnalysisError::InvalidResponse("success response without gif_path".to_string())
        })
    }

    async fn fetch_statistics(&self, video_filename: &str) -> AnalysisResult<VideoStatistics> {
        let url = format!(
            "{}/api/video-statistics/{}",
            self.config.base_url, video_filename
        );

        let response = self.get_json(&url).await?;
        let envelope: StatisticsEnvelope = response.json().await?;
        if !envelope.status.is_success() {
            return Err(AnalysisError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "statistics unavailable".to_string()),
            ));
        }

        envelope.statistics.ok_or_else(|| {
            AnalysisError::InvalidResponse("success response without statistics".to_string())
        })
    }

    async fn fetch_recommendations(&self) -> AnalysisResult<LearningRecommendations> {
        let url = format!("{}/api/learning-recommendations", self.config.base_url);

        let response = self.get_json(&url).await?;
        let envelope: RecommendationsEnvelope = response.json().await?;
        if !envelope.status.is_success() {
            return Err(AnalysisError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "recommendations unavailable".to_string()),
            ));
        }

        envelope.recommendations.ok_or_else(|| {
            AnalysisError::InvalidResponse("success response without recommendations".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use aura_models::Rating;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> AnalysisClient {
        AnalysisClient::new(AnalysisClientConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
            max_retries: 0,
        })
        .unwrap()
    }

    fn rate_request() -> RateTrajectoryRequest {
        RateTrajectoryRequest {
            video_filename: "mall.mp4".to_string(),
            trajectory_id: 1,
            rating: Rating::new(5).unwrap(),
            comment: "clean path".to_string(),
            smoothness_factor: 0.1,
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = AnalysisClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_submit_rating_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/rate-trajectory"))
            .and(body_partial_json(serde_json::json!({
                "video_filename": "mall.mp4",
                "trajectory_id": 1,
                "rating": 5,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "message": "saved"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.submit_rating(&rate_request()).await.unwrap();
    }

    #[tokio::test]
    async fn test_submit_rating_rejected_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/rate-trajectory"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error",
                "message": "rating out of range"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.submit_rating(&rate_request()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_submit_rating_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/rate-trajectory"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.submit_rating(&rate_request()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn test_regenerate_preview_returns_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/regenerate-gif"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "gif_path": "static/trajectory_gifs/traj_1.gif"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let path = client
            .regenerate_preview(&RegeneratePreviewRequest {
                video_filename: "mall.mp4".to_string(),
                trajectory_id: 1,
                smoothness_factor: 0.3,
            })
            .await
            .unwrap();
        assert_eq!(path, "static/trajectory_gifs/traj_1.gif");
    }

    #[tokio::test]
    async fn test_fetch_statistics_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/video-statistics/mall.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "statistics": {
                    "total_rated": 2,
                    "average_rating": 4.5,
                    "min_rating": 4,
                    "max_rating": 5,
                    "rating_distribution": {"4": 1, "5": 1}
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let stats = client.fetch_statistics("mall.mp4").await.unwrap();
        assert_eq!(stats.total_rated, 2);
        assert_eq!(stats.average_rating, 4.5);
        assert_eq!(stats.max_rating, Some(5));
    }

    #[tokio::test]
    async fn test_fetch_recommendations_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/learning-recommendations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "recommendations": {
                    "common_issues": [
                        {"type": "low_smoothness", "frequency": 3}
                    ],
                    "suggested_improvements": [
                        "Increase the smoothing factor for jittery trajectories"
                    ]
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let recs = client.fetch_recommendations().await.unwrap();
        assert_eq!(recs.common_issues.len(), 1);
        assert_eq!(recs.common_issues[0].issue_type, "low_smoothness");
        assert_eq!(recs.suggested_improvements.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_recommendations_error_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/learning-recommendations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error",
                "message": "not enough ratings yet"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.fetch_recommendations().await.unwrap_err();
        assert!(matches!(err, AnalysisError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.health_check().await);
    }
}
