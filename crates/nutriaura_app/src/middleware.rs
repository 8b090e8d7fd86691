//! Middleware layer for cross-cutting concerns.
//!
//! Wraps an [`AnalysisClient`] with debug logging, timing and metrics so the
//! orchestrator stays free of instrumentation.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use nutriaura_client::{
    AnalysisClient, AnalysisError, AnalysisResult, CapturedImage, GeoLocation, QuizAnswers,
};
use tracing::debug;

/// Middleware wrapper for an [`AnalysisClient`] that records every call.
#[derive(Clone)]
pub struct LoggingMiddleware<C: AnalysisClient> {
    inner: Arc<C>,
}

fn outcome_label(result: &Result<AnalysisResult, AnalysisError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(AnalysisError::MalformedResponse(_)) => "malformed",
        Err(AnalysisError::Auth(_)) | Err(AnalysisError::Config(_)) => "auth",
        Err(AnalysisError::InvalidInput(_)) => "invalid_input",
        Err(AnalysisError::RateLimited(_)) => "rate_limited",
        Err(_) => "error",
    }
}

impl<C: AnalysisClient> LoggingMiddleware<C> {
    pub fn new(client: C) -> Self {
        Self {
            inner: Arc::new(client),
        }
    }

    /// Execute a fallible operation with logging.
    async fn with_logging<F, Fut>(
        &self,
        operation: F,
        name: &str,
    ) -> Result<AnalysisResult, AnalysisError>
    where
        F: FnOnce(Arc<C>) -> Fut,
        Fut: std::future::Future<Output = Result<AnalysisResult, AnalysisError>>,
    {
        let start = Instant::now();
        debug!("Starting operation: {}", name);
        counter!("nutriaura_analysis_requests_total").increment(1);

        let result = operation(self.inner.clone()).await;

        let duration = start.elapsed();
        histogram!("nutriaura_analysis_duration_seconds").record(duration.as_secs_f64());
        counter!("nutriaura_analysis_outcomes_total", "outcome" => outcome_label(&result))
            .increment(1);
        match &result {
            Ok(_) => {
                debug!(
                    "Operation completed successfully: {} in {:?}",
                    name, duration
                );
            }
            Err(e) => {
                debug!(
                    "Operation failed: {} in {:?} - error: {}",
                    name, duration, e
                );
            }
        }

        result
    }
}

#[async_trait::async_trait]
impl<C: AnalysisClient> AnalysisClient for LoggingMiddleware<C> {
    async fn analyze(
        &self,
        image: &CapturedImage,
        answers: &QuizAnswers,
        location: Option<GeoLocation>,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.with_logging(
            |client| async move { client.analyze(image, answers, location).await },
            "analyze",
        )
        .await
    }
}
