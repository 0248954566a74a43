//! Tuning advice derived from accumulated ratings.

use serde::{Deserialize, Serialize};

/// One recurring problem the analysis service has observed across low-rated
/// trajectories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonIssue {
    /// Issue category, e.g. `"low_smoothness"` or `"tracking_instability"`.
    #[serde(rename = "type")]
    pub issue_type: String,
    /// How many rated trajectories showed it.
    pub frequency: u32,
}

/// Parameter-tuning advice the analysis service derives from the ratings
/// collected so far, across all videos.
///
/// Advisory display data, like [`crate::VideoStatistics`]: it never feeds
/// back into a session's progress or completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningRecommendations {
    #[serde(default)]
    pub common_issues: Vec<CommonIssue>,
    #[serde(default)]
    pub suggested_improvements: Vec<String>,
}
