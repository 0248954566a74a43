//! Quality level derived from an average rating.

use serde::{Deserialize, Serialize};

/// Overall tracking quality label for a reviewed video.
///
/// Derived from the average of all star ratings a reviewer gave during a
/// session using fixed thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityLevel {
    #[serde(rename = "excellent")]
    Excellent,
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "satisfactory")]
    Satisfactory,
    // The two lowest labels contain a space on the wire and in reports.
    #[serde(rename = "needs improvement")]
    NeedsImprovement,
    #[serde(rename = "low quality")]
    LowQuality,
}

impl QualityLevel {
    /// Derive the quality label from an average star rating.
    ///
    /// Thresholds: >= 4.5 excellent, >= 4.0 good, >= 3.0 satisfactory,
    /// >= 2.0 needs improvement, below that low quality.
    pub fn from_average(average: f64) -> Self {
        if average >= 4.5 {
            QualityLevel::Excellent
        } else if average >= 4.0 {
            QualityLevel::Good
        } else if average >= 3.0 {
            QualityLevel::Satisfactory
        } else if average >= 2.0 {
            QualityLevel::NeedsImprovement
        } else {
            QualityLevel::LowQuality
        }
    }

    /// Human-readable label shown to the reviewer and written to reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLevel::Excellent => "excellent",
            QualityLevel::Good => "good",
            QualityLevel::Satisfactory => "satisfactory",
            QualityLevel::NeedsImprovement => "needs improvement",
            QualityLevel::LowQuality => "low quality",
        }
    }
}

impl std::fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
