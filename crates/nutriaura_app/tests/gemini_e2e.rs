mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{selfie, tired_answers};
use nutriaura_app::geolocation::FixedLocation;
use nutriaura_app::middleware::LoggingMiddleware;
use nutriaura_app::{AnalysisOrchestrator, AnalysisOutcome, Screen, Storage, WellnessApp};
use nutriaura_client::http_client::ReqwestAnalysisClient;
use nutriaura_client::retry::RetryPolicy;
use nutriaura_client::GeoLocation;
use secrecy::SecretString;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn app_against(server: &MockServer, location: Option<GeoLocation>) -> WellnessApp {
    let client = ReqwestAnalysisClient::new(
        &server.uri(),
        "gemini-2.5-flash",
        SecretString::new("e2e-key".into()),
    )
    .expect("client")
    .with_retry(RetryPolicy::none());
    let mut orchestrator = AnalysisOrchestrator::new(Arc::new(LoggingMiddleware::new(client)))
        .with_location_timeout(Duration::from_secs(1));
    if let Some(here) = location {
        orchestrator = orchestrator.with_locator(Arc::new(FixedLocation(here)));
    }
    WellnessApp::new(Storage::in_memory(), orchestrator)
}

fn walk(app: &mut WellnessApp) {
    app.start().unwrap();
    app.capture_photo(selfie()).unwrap();
    app.confirm_photo().unwrap();
    app.submit_quiz(tired_answers()).unwrap();
}

fn envelope(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
    })
}

const RESULT: &str = r#"{"scores":{"nutrition":40,"sleep":30,"stress":25,"hydration":35},
"keyFindings":[{"title":"Fatigue","description":"Puffy eyes.","icon":"sleep"}],
"recommendations":[{"title":"Rest","description":"Sleep more.","items":["Bed by 23:00"]}]}"#;

#[tokio::test]
async fn json_mode_analysis_reaches_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "e2e-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(RESULT)))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = app_against(&server, None);
    walk(&mut app);
    let outcome = app.analyze().await.unwrap();
    assert!(matches!(outcome, AnalysisOutcome::Completed(_)));
    assert_eq!(app.stack(), vec![Screen::Results]);
    let shown = app.displayed_result().expect("result");
    assert_eq!(shown.scores.stress, 25);
    assert_eq!(app.goal_suggestions()[0].text, "Practice 5 minutes of mindfulness daily.");
}

#[tokio::test]
async fn grounded_analysis_sends_location() {
    let server = MockServer::start().await;
    let fenced = format!("Here is your report.\n```json\n{RESULT}\n```\nStay well!");
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_partial_json(serde_json::json!({
            "toolConfig": {"retrievalConfig": {"latLng": {"latitude": 51.5, "longitude": -0.12}}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&fenced)))
        .expect(1)
        .mount(&server)
        .await;

    let here = GeoLocation {
        latitude: 51.5,
        longitude: -0.12,
    };
    let mut app = app_against(&server, Some(here));
    walk(&mut app);
    assert!(matches!(
        app.analyze().await.unwrap(),
        AnalysisOutcome::Completed(_)
    ));
    assert_eq!(app.history().points().len(), 1);
}

#[tokio::test]
async fn unreadable_model_text_routes_to_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope("I cannot analyse this photo.")),
        )
        .mount(&server)
        .await;

    let mut app = app_against(&server, None);
    walk(&mut app);
    let outcome = app.analyze().await.unwrap();
    assert_eq!(
        outcome,
        AnalysisOutcome::Failed(
            "The AI returned a response we couldn't read. Please try again.".into()
        )
    );
    assert_eq!(app.stack(), vec![Screen::Error]);
    assert!(app.history().points().is_empty());
}

#[tokio::test]
async fn server_error_routes_to_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let mut app = app_against(&server, None);
    walk(&mut app);
    assert!(matches!(
        app.analyze().await.unwrap(),
        AnalysisOutcome::Failed(_)
    ));
    assert_eq!(app.profile().ap, 0);
}
