//! Per-video rating statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Aggregate rating figures the analysis service keeps per video.
///
/// Advisory display data only: completion of a review session is decided
/// locally, so these numbers may lag or include ratings from earlier
/// sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoStatistics {
    /// Number of trajectories with a stored rating.
    pub total_rated: u32,
    /// Mean stored rating, 0 when nothing is rated.
    pub average_rating: f64,
    /// Lowest stored rating, if any.
    #[serde(default)]
    pub min_rating: Option<u8>,
    /// Highest stored rating, if any.
    #[serde(default)]
    pub max_rating: Option<u8>,
    /// Count of stored ratings per star value.
    #[serde(default)]
    pub rating_distribution: BTreeMap<u8, u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_minimal_payload() {
        let stats: VideoStatistics =
            serde_json::from_str(r#"{"total_rated": 3, "average_rating": 4.33}"#).unwrap();
        assert_eq!(stats.total_rated, 3);
        assert!(stats.min_rating.is_none());
        assert!(stats.rating_distribution.is_empty());
    }

    #[test]
    fn test_parses_distribution() {
        let stats: VideoStatistics = serde_json::from_str(
            r#"{
                "total_rated": 4,
                "average_rating": 3.5,
                "min_rating": 2,
                "max_rating": 5,
                "rating_distribution": {"2": 1, "3": 1, "4": 1, "5": 1}
            }"#,
        )
        .unwrap();
        assert_eq!(stats.rating_distribution.get(&5), Some(&1));
        assert_eq!(stats.max_rating, Some(5));
    }
}
