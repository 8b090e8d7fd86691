#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use nutriaura_app::geolocation::{LocationError, LocationProvider};
use nutriaura_client::{
    ActivityLevel, AnalysisClient, AnalysisError, AnalysisResult, AnalysisScores, CapturedImage,
    DietQuality, GeoLocation, QuizAnswers,
};

pub fn scores(nutrition: u8, sleep: u8, stress: u8, hydration: u8) -> AnalysisScores {
    AnalysisScores {
        nutrition,
        sleep,
        stress,
        hydration,
    }
}

pub fn result_with(scores: AnalysisScores) -> AnalysisResult {
    AnalysisResult {
        scores,
        key_findings: vec![],
        recommendations: vec![],
        grounding_attribution: None,
    }
}

pub fn selfie() -> CapturedImage {
    CapturedImage::new("image/jpeg", vec![0xff, 0xd8, 0xff, 0xe0])
}

pub fn tired_answers() -> QuizAnswers {
    QuizAnswers {
        sleep_hours: 5.0,
        stress_level: 5,
        energy_level: 2,
        diet_quality: DietQuality::Unhealthy,
        hydration: "Little".into(),
        activity_level: ActivityLevel::Sedentary,
    }
}

/// Returns `results[n]` for the n-th call, failing once they run out.
pub struct ScriptedClient {
    results: Vec<AnalysisResult>,
    calls: AtomicUsize,
    locations: Mutex<Vec<Option<GeoLocation>>>,
}

impl ScriptedClient {
    pub fn new(results: Vec<AnalysisResult>) -> Self {
        Self {
            results,
            calls: AtomicUsize::new(0),
            locations: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Location passed to each call, in call order.
    pub fn locations(&self) -> Vec<Option<GeoLocation>> {
        self.locations.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisClient for ScriptedClient {
    async fn analyze(
        &self,
        _image: &CapturedImage,
        _answers: &QuizAnswers,
        location: Option<GeoLocation>,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.locations.lock().unwrap().push(location);
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.results.get(n).cloned().ok_or_else(|| AnalysisError::Service {
            status: 503,
            body: "script exhausted".into(),
        })
    }
}

pub struct DeniedLocation;

#[async_trait]
impl LocationProvider for DeniedLocation {
    async fn current_location(&self) -> Result<GeoLocation, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

/// Never answers.
pub struct StalledLocation;

#[async_trait]
impl LocationProvider for StalledLocation {
    async fn current_location(&self) -> Result<GeoLocation, LocationError> {
        std::future::pending().await
    }
}
