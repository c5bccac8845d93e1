use crate::error::LensError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Analysis model a stream is started with.
///
/// Process-wide UI state. It is sent when a stream starts and is not part of
/// a stream's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelType {
    #[default]
    #[serde(rename = "objectDetection")]
    ObjectDetection,
    #[serde(rename = "segmentation")]
    Segmentation,
    #[serde(rename = "pose")]
    Pose,
}

impl ModelType {
    pub const ALL: [ModelType; 3] = [
        ModelType::ObjectDetection,
        ModelType::Segmentation,
        ModelType::Pose,
    ];

    /// Name used on the wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ModelType::ObjectDetection => "objectDetection",
            ModelType::Segmentation => "segmentation",
            ModelType::Pose => "pose",
        }
    }

    /// Short human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            ModelType::ObjectDetection => "Detection",
            ModelType::Segmentation => "Segmentation",
            ModelType::Pose => "Pose",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for ModelType {
    type Err = LensError;

    /// Accepts wire names plus the CLI-friendly `detection`/`object-detection`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "objectdetection" | "object-detection" | "detection" => Ok(ModelType::ObjectDetection),
            "segmentation" => Ok(ModelType::Segmentation),
            "pose" => Ok(ModelType::Pose),
            other => Err(LensError::config(format!("unknown model type '{other}'"))),
        }
    }
}

/// Detection totals reported by `GET /api/detection-stats/summary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSummary {
    pub total_detections: u64,
    pub object_detections: u64,
    pub segmentations: u64,
    pub pose_estimations: u64,
}

impl DetectionSummary {
    /// Count for one model.
    pub fn for_model(&self, model: ModelType) -> u64 {
        match model {
            ModelType::ObjectDetection => self.object_detections,
            ModelType::Segmentation => self.segmentations,
            ModelType::Pose => self.pose_estimations,
        }
    }
}

/// Model filter for the detection statistics endpoints: `all` or one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelFilter {
    #[default]
    All,
    Model(ModelType),
}

impl ModelFilter {
    /// Query parameter value.
    pub fn query_value(&self) -> &'static str {
        match self {
            ModelFilter::All => "all",
            ModelFilter::Model(model) => model.wire_name(),
        }
    }
}

impl From<ModelType> for ModelFilter {
    fn from(model: ModelType) -> Self {
        ModelFilter::Model(model)
    }
}

impl fmt::Display for ModelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_value())
    }
}

impl FromStr for ModelFilter {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(ModelFilter::All)
        } else {
            s.parse().map(ModelFilter::Model)
        }
    }
}

/// Detections in one hour of the current day (`GET /api/detection-stats/daily`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyCount {
    #[serde(deserialize_with = "bucket_start")]
    pub timestamp: NaiveDateTime,
    pub count: u64,
}

/// Detections on one day of the last week (`GET /api/detection-stats/weekly`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    #[serde(deserialize_with = "bucket_start")]
    pub date: NaiveDateTime,
    pub count: u64,
}

/// Parses a bucket start sent as a naive timestamp, an RFC 3339 timestamp
/// (normalized to UTC) or a bare date.
fn bucket_start<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Ok(naive);
    }
    if let Ok(aware) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(aware.naive_utc());
    }
    raw.parse::<NaiveDate>()
        .map(|date| date.and_time(chrono::NaiveTime::MIN))
        .map_err(|_| serde::de::Error::custom(format!("invalid bucket timestamp '{raw}'")))
}
