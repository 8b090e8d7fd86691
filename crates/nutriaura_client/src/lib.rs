//! `AnalysisClient` trait, the wellness domain types it exchanges, and a
//! reqwest-based implementation for the Gemini `generateContent` endpoint.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod config;
pub mod extract;
pub mod http_client;
pub mod prompt;
pub mod retry;
pub mod utils;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("analysis service returned status {status}: {body}")]
    Service { status: u16, body: String },
    #[error("malformed analysis response: {0}")]
    MalformedResponse(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Map a non-success HTTP status to an error variant.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            400 | 422 => AnalysisError::InvalidInput(body),
            401 | 403 => AnalysisError::Auth(body),
            429 => AnalysisError::RateLimited(body),
            _ => AnalysisError::Service { status, body },
        }
    }

    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AnalysisError::Http(e) => e.is_timeout() || e.is_connect(),
            AnalysisError::RateLimited(_) => true,
            AnalysisError::Service { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum DietQuality {
    #[serde(rename = "Very Healthy")]
    VeryHealthy,
    #[serde(rename = "Mostly Healthy")]
    MostlyHealthy,
    Average,
    Unhealthy,
}

impl DietQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            DietQuality::VeryHealthy => "Very Healthy",
            DietQuality::MostlyHealthy => "Mostly Healthy",
            DietQuality::Average => "Average",
            DietQuality::Unhealthy => "Unhealthy",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    #[serde(rename = "Very Active")]
    VeryActive,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::Light => "Light",
            ActivityLevel::Moderate => "Moderate",
            ActivityLevel::VeryActive => "Very Active",
        }
    }
}

/// Lifestyle questionnaire answers submitted alongside the selfie.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswers {
    pub sleep_hours: f32,
    pub stress_level: u8,
    pub energy_level: u8,
    pub diet_quality: DietQuality,
    pub hydration: String,
    pub activity_level: ActivityLevel,
}

impl Default for QuizAnswers {
    fn default() -> Self {
        Self {
            sleep_hours: 7.0,
            stress_level: 3,
            energy_level: 3,
            diet_quality: DietQuality::Average,
            hydration: "Some water".into(),
            activity_level: ActivityLevel::Moderate,
        }
    }
}

impl QuizAnswers {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.sleep_hours.is_finite() || !(0.0..=24.0).contains(&self.sleep_hours) {
            return Err(AnalysisError::InvalidInput(format!(
                "sleep hours out of range: {}",
                self.sleep_hours
            )));
        }
        if !(1..=5).contains(&self.stress_level) {
            return Err(AnalysisError::InvalidInput(format!(
                "stress level must be 1-5, got {}",
                self.stress_level
            )));
        }
        if !(1..=5).contains(&self.energy_level) {
            return Err(AnalysisError::InvalidInput(format!(
                "energy level must be 1-5, got {}",
                self.energy_level
            )));
        }
        if self.hydration.trim().is_empty() {
            return Err(AnalysisError::InvalidInput("hydration answer is empty".into()));
        }
        Ok(())
    }
}

/// A still image from the camera or a file upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedImage {
    pub media_type: String,
    pub data: Vec<u8>,
}

impl CapturedImage {
    pub fn new(media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            data,
        }
    }

    /// Decode a `data:<media type>;base64,<payload>` URL as produced by a
    /// canvas snapshot or a file reader.
    pub fn from_data_url(url: &str) -> Result<Self, AnalysisError> {
        utils::decode_data_url(url)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ScoreKind {
    Nutrition,
    Sleep,
    Stress,
    Hydration,
}

impl ScoreKind {
    pub const ALL: [ScoreKind; 4] = [
        ScoreKind::Nutrition,
        ScoreKind::Sleep,
        ScoreKind::Stress,
        ScoreKind::Hydration,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ScoreKind::Nutrition => "Nutrition",
            ScoreKind::Sleep => "Sleep",
            ScoreKind::Stress => "Stress",
            ScoreKind::Hydration => "Hydration",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct AnalysisScores {
    #[serde(deserialize_with = "deserialize_score")]
    #[schemars(range(min = 0, max = 100))]
    pub nutrition: u8,
    #[serde(deserialize_with = "deserialize_score")]
    #[schemars(range(min = 0, max = 100))]
    pub sleep: u8,
    /// Higher means better managed stress.
    #[serde(deserialize_with = "deserialize_score")]
    #[schemars(range(min = 0, max = 100))]
    pub stress: u8,
    #[serde(deserialize_with = "deserialize_score")]
    #[schemars(range(min = 0, max = 100))]
    pub hydration: u8,
}

impl AnalysisScores {
    pub fn get(&self, kind: ScoreKind) -> u8 {
        match kind {
            ScoreKind::Nutrition => self.nutrition,
            ScoreKind::Sleep => self.sleep,
            ScoreKind::Stress => self.stress,
            ScoreKind::Hydration => self.hydration,
        }
    }
}

/// Accepts any JSON number or numeric string, rounded and clamped into 0..=100.
fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = serde_json::Value::deserialize(deserializer)?;
    let raw = match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(v) if v.is_finite() => Ok(v.round().clamp(0.0, 100.0) as u8),
        _ => Err(D::Error::custom(format!(
            "expected a numeric score, got {value}"
        ))),
    }
}

/// Scores must arrive as a JSON object; serde would otherwise accept a
/// positional array for the struct.
fn deserialize_scores<'de, D>(deserializer: D) -> Result<AnalysisScores, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = serde_json::Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Err(D::Error::custom(format!(
            "scores must be an object, got {value}"
        )));
    }
    AnalysisScores::deserialize(value).map_err(D::Error::custom)
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FindingIcon {
    Nutrition,
    Sleep,
    Stress,
    Hydration,
    #[schemars(skip)]
    Pizza,
    #[serde(other)]
    #[schemars(skip)]
    Unknown,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct KeyFinding {
    pub title: String,
    pub description: String,
    pub icon: FindingIcon,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub items: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroundingSource {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub title: String,
}

/// A citation attached to a grounded answer; passed through for display.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroundingChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<GroundingSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps: Option<GroundingSource>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(deserialize_with = "deserialize_scores")]
    #[schemars(with = "AnalysisScores")]
    pub scores: AnalysisScores,
    #[serde(default)]
    pub key_findings: Vec<KeyFinding>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(skip)]
    pub grounding_attribution: Option<Vec<GroundingChunk>>,
}

#[async_trait]
pub trait AnalysisClient: Send + Sync + 'static {
    /// Submit a selfie and questionnaire answers for a wellness analysis.
    ///
    /// `location`, when present, lets the service ground its recommendations
    /// in nearby places.
    async fn analyze(
        &self,
        image: &CapturedImage,
        answers: &QuizAnswers,
        location: Option<GeoLocation>,
    ) -> Result<AnalysisResult, AnalysisError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scores_are_rounded_and_clamped() {
        let payload = json!({"nutrition": 72.6, "sleep": -4, "stress": 140, "hydration": "55"});
        let scores: AnalysisScores = serde_json::from_value(payload).expect("scores");
        assert_eq!(scores.nutrition, 73);
        assert_eq!(scores.sleep, 0);
        assert_eq!(scores.stress, 100);
        assert_eq!(scores.hydration, 55);
    }

    #[test]
    fn non_numeric_score_errors() {
        let payload = json!({"nutrition": {"x": 1}, "sleep": 1, "stress": 1, "hydration": 1});
        let res: Result<AnalysisScores, _> = serde_json::from_value(payload);
        assert!(res.is_err());
    }

    #[test]
    fn unknown_finding_icon_maps_to_unknown() {
        let payload = json!({"title": "t", "description": "d", "icon": "sparkles"});
        let finding: KeyFinding = serde_json::from_value(payload).expect("finding");
        assert_eq!(finding.icon, FindingIcon::Unknown);
    }

    #[test]
    fn quiz_answers_use_display_strings() {
        let answers = QuizAnswers {
            diet_quality: DietQuality::VeryHealthy,
            activity_level: ActivityLevel::VeryActive,
            ..QuizAnswers::default()
        };
        let value = serde_json::to_value(&answers).expect("serialize");
        assert_eq!(value["dietQuality"], "Very Healthy");
        assert_eq!(value["activityLevel"], "Very Active");
        assert_eq!(value["sleepHours"], 7.0);
    }

    #[test]
    fn quiz_answers_validation() {
        assert!(QuizAnswers::default().validate().is_ok());
        let bad = QuizAnswers {
            stress_level: 0,
            ..QuizAnswers::default()
        };
        assert!(matches!(bad.validate(), Err(AnalysisError::InvalidInput(_))));
        let blank = QuizAnswers {
            hydration: "  ".into(),
            ..QuizAnswers::default()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn status_mapping_and_transience() {
        assert!(matches!(
            AnalysisError::from_status(401, String::new()),
            AnalysisError::Auth(_)
        ));
        assert!(AnalysisError::from_status(503, String::new()).is_transient());
        assert!(AnalysisError::from_status(429, String::new()).is_transient());
        assert!(!AnalysisError::from_status(400, String::new()).is_transient());
        assert!(!AnalysisError::MalformedResponse("x".into()).is_transient());
    }
}
