//! Shared test utilities and mock collaborators used by unit tests.
//!
//! Keep this module `#[cfg(test)]`-only.
#![cfg(test)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use nutriaura_client::{
    AnalysisClient, AnalysisError, AnalysisResult, AnalysisScores, CapturedImage, FindingIcon,
    GeoLocation, KeyFinding, QuizAnswers, Recommendation,
};

use crate::geolocation::{LocationError, LocationProvider};
use crate::store::{KeyValueStore, StoreError};

/// Scores 40/30/25/35 with one finding and one recommendation.
pub fn sample_result() -> AnalysisResult {
    AnalysisResult {
        scores: AnalysisScores {
            nutrition: 40,
            sleep: 30,
            stress: 25,
            hydration: 35,
        },
        key_findings: vec![KeyFinding {
            title: "Tired eyes".into(),
            description: "Signs of short sleep.".into(),
            icon: FindingIcon::Sleep,
        }],
        recommendations: vec![Recommendation {
            title: "Wind down".into(),
            description: "Build an evening routine.".into(),
            items: vec!["No screens after 22:00".into()],
        }],
        grounding_attribution: None,
    }
}

pub fn sample_image() -> CapturedImage {
    CapturedImage::new("image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0])
}

pub fn tired_answers() -> QuizAnswers {
    QuizAnswers {
        sleep_hours: 5.0,
        stress_level: 5,
        energy_level: 2,
        diet_quality: nutriaura_client::DietQuality::Unhealthy,
        hydration: "Little".into(),
        activity_level: nutriaura_client::ActivityLevel::Sedentary,
    }
}

enum Behaviour {
    /// Results handed out in order; the last one repeats.
    Succeed(Mutex<VecDeque<AnalysisResult>>),
    Fail(fn() -> AnalysisError),
}

/// Scriptable [`AnalysisClient`] that counts its calls.
pub struct MockAnalysisClient {
    behaviour: Behaviour,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_location: Mutex<Option<GeoLocation>>,
}

impl MockAnalysisClient {
    fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            delay: None,
            calls: AtomicUsize::new(0),
            last_location: Mutex::new(None),
        }
    }

    pub fn succeeding(result: AnalysisResult) -> Self {
        Self::sequence(vec![result])
    }

    pub fn sequence(results: Vec<AnalysisResult>) -> Self {
        Self::with_behaviour(Behaviour::Succeed(Mutex::new(results.into())))
    }

    pub fn failing(make: fn() -> AnalysisError) -> Self {
        Self::with_behaviour(Behaviour::Fail(make))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_location(&self) -> Option<GeoLocation> {
        *self.last_location.lock().unwrap()
    }
}

#[async_trait]
impl AnalysisClient for MockAnalysisClient {
    async fn analyze(
        &self,
        _image: &CapturedImage,
        _answers: &QuizAnswers,
        location: Option<GeoLocation>,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_location.lock().unwrap() = location;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.behaviour {
            Behaviour::Succeed(queue) => {
                let mut queue = queue.lock().unwrap();
                let next = if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                };
                Ok(next.expect("mock has at least one result"))
            }
            Behaviour::Fail(make) => Err(make()),
        }
    }
}

/// A backend whose every operation fails.
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }
}

/// In-memory backend whose first `failures` reads fail.
pub struct FlakyStore {
    inner: crate::store::MemoryStore,
    failures: AtomicUsize,
}

impl FlakyStore {
    pub fn new(failures: usize) -> Self {
        Self {
            inner: crate::store::MemoryStore::new(),
            failures: AtomicUsize::new(failures),
        }
    }

    pub fn seed(&self, key: &str, value: &str) {
        self.inner.set(key, value).expect("memory set");
    }

    pub fn fail_next_reads(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    /// Backend contents, bypassing the failure budget.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.get(key).expect("memory get")
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Unavailable("transient read error".into()));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value)
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
