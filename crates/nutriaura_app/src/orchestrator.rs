//! The analysis pipeline: locate, submit, report.
//!
//! The session claims an [`AnalysisTicket`] when the Analyzing screen is
//! entered. [`AnalysisOrchestrator::execute`] does the I/O for that ticket and
//! never touches session state, so the host may keep handling navigation
//! while it runs. Navigation away flips the ticket's cancel channel.

use std::sync::Arc;
use std::time::Duration;

use nutriaura_client::{AnalysisClient, AnalysisError, AnalysisResult, CapturedImage, QuizAnswers};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::geolocation::{LocationProvider, NoLocation, resolve_location};

pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the service needs for one analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub image: CapturedImage,
    pub answers: QuizAnswers,
}

/// A claimed analysis job, bound to one visit of the Analyzing screen.
#[derive(Debug)]
pub struct AnalysisTicket {
    entry: u64,
    submission: Submission,
    cancel: watch::Receiver<bool>,
}

impl AnalysisTicket {
    pub(crate) fn new(entry: u64, submission: Submission, cancel: watch::Receiver<bool>) -> Self {
        Self {
            entry,
            submission,
            cancel,
        }
    }

    pub fn entry(&self) -> u64 {
        self.entry
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }
}

#[derive(Debug)]
pub enum PipelineResult {
    Success(AnalysisResult),
    Failure(AnalysisError),
    Cancelled,
}

/// Text shown on the Error screen for a failed analysis.
pub fn user_message(error: &AnalysisError) -> String {
    match error {
        AnalysisError::MalformedResponse(_) => {
            "The AI returned a response we couldn't read. Please try again.".to_string()
        }
        AnalysisError::Auth(_) | AnalysisError::Config(_) => {
            "The analysis service rejected our credentials. Check the API key and try again."
                .to_string()
        }
        _ => "Failed to get analysis from AI. Please try again.".to_string(),
    }
}

#[derive(Clone)]
pub struct AnalysisOrchestrator {
    client: Arc<dyn AnalysisClient>,
    locator: Arc<dyn LocationProvider>,
    location_timeout: Duration,
}

impl AnalysisOrchestrator {
    pub fn new(client: Arc<dyn AnalysisClient>) -> Self {
        Self {
            client,
            locator: Arc::new(NoLocation),
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
        }
    }

    pub fn with_locator(mut self, locator: Arc<dyn LocationProvider>) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_location_timeout(mut self, timeout: Duration) -> Self {
        self.location_timeout = timeout;
        self
    }

    async fn run(&self, submission: &Submission) -> Result<AnalysisResult, AnalysisError> {
        let location = resolve_location(self.locator.as_ref(), self.location_timeout).await;
        debug!(grounded = location.is_some(), "submitting analysis");
        self.client
            .analyze(&submission.image, &submission.answers, location)
            .await
    }

    /// Run the job for `ticket`, stopping early if it is cancelled.
    pub async fn execute(&self, ticket: &AnalysisTicket) -> PipelineResult {
        if ticket.is_cancelled() {
            return PipelineResult::Cancelled;
        }
        let mut cancel = ticket.cancel.clone();
        let cancelled = async move {
            let closed = cancel.wait_for(|flag| *flag).await.is_err();
            if closed {
                // session gone; let the request finish and be discarded
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => {
                info!(entry = ticket.entry, "analysis cancelled");
                PipelineResult::Cancelled
            }
            outcome = self.run(&ticket.submission) => match outcome {
                Ok(result) => PipelineResult::Success(result),
                Err(e) => PipelineResult::Failure(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geolocation::FixedLocation;
    use crate::test_utils::{MockAnalysisClient, sample_image, sample_result};
    use nutriaura_client::GeoLocation;

    fn ticket(entry: u64) -> (watch::Sender<bool>, AnalysisTicket) {
        let (tx, rx) = watch::channel(false);
        let submission = Submission {
            image: sample_image(),
            answers: QuizAnswers::default(),
        };
        (tx, AnalysisTicket::new(entry, submission, rx))
    }

    #[tokio::test]
    async fn success_passes_result_through() {
        let client = Arc::new(MockAnalysisClient::succeeding(sample_result()));
        let orchestrator = AnalysisOrchestrator::new(client.clone());
        let (_tx, ticket) = ticket(3);
        match orchestrator.execute(&ticket).await {
            PipelineResult::Success(result) => assert_eq!(result, sample_result()),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(client.calls(), 1);
        assert_eq!(client.last_location(), None);
    }

    #[tokio::test]
    async fn location_is_forwarded() {
        let client = Arc::new(MockAnalysisClient::succeeding(sample_result()));
        let here = GeoLocation {
            latitude: 40.4,
            longitude: -3.7,
        };
        let orchestrator =
            AnalysisOrchestrator::new(client.clone()).with_locator(Arc::new(FixedLocation(here)));
        let (_tx, ticket) = ticket(1);
        orchestrator.execute(&ticket).await;
        assert_eq!(client.last_location(), Some(here));
    }

    #[tokio::test]
    async fn failure_is_reported() {
        let client = Arc::new(MockAnalysisClient::failing(|| AnalysisError::Service {
            status: 503,
            body: "down".into(),
        }));
        let orchestrator = AnalysisOrchestrator::new(client);
        let (_tx, ticket) = ticket(1);
        assert!(matches!(
            orchestrator.execute(&ticket).await,
            PipelineResult::Failure(AnalysisError::Service { status: 503, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_the_wait() {
        let client = Arc::new(
            MockAnalysisClient::succeeding(sample_result()).with_delay(Duration::from_secs(30)),
        );
        let orchestrator = AnalysisOrchestrator::new(client);
        let (tx, ticket) = ticket(1);
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            tx.send(true).ok();
            tx
        });
        assert!(matches!(
            orchestrator.execute(&ticket).await,
            PipelineResult::Cancelled
        ));
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn already_cancelled_ticket_makes_no_call() {
        let client = Arc::new(MockAnalysisClient::succeeding(sample_result()));
        let orchestrator = AnalysisOrchestrator::new(client.clone());
        let (tx, ticket) = ticket(1);
        tx.send(true).unwrap();
        assert!(matches!(
            orchestrator.execute(&ticket).await,
            PipelineResult::Cancelled
        ));
        assert_eq!(client.calls(), 0);
    }

    #[test]
    fn messages_are_human_readable() {
        let malformed = user_message(&AnalysisError::MalformedResponse("x".into()));
        assert!(malformed.contains("couldn't read"));
        let generic = user_message(&AnalysisError::RateLimited("x".into()));
        assert_eq!(generic, "Failed to get analysis from AI. Please try again.");
    }
}
