//! HTTP client implementation for the Gemini `generateContent` endpoint.
//!
//! This module provides a reqwest-based implementation of the [`AnalysisClient`](crate::AnalysisClient) trait.

use crate::config::Config;
use crate::extract::parse_analysis;
use crate::prompt::build_prompt;
use crate::retry::RetryPolicy;
use crate::utils::encode_image;
use crate::{
    AnalysisClient, AnalysisError, AnalysisResult, CapturedImage, GeoLocation, GroundingChunk,
    QuizAnswers,
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

/// Client for the Gemini API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestAnalysisClient {
    base_url: String,
    model: String,
    api_key: SecretString,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl ReqwestAnalysisClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The API root (e.g., "https://generativelanguage.googleapis.com")
    /// * `model` - Model name used in the request path
    /// * `api_key` - Key sent in the `x-goog-api-key` header
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: SecretString,
    ) -> Result<Self, AnalysisError> {
        Self::with_timeout(base_url, model, api_key, Duration::from_secs(60))
    }

    pub fn with_timeout(
        base_url: &str,
        model: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            retry: RetryPolicy::default(),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AnalysisError> {
        Self::with_timeout(
            &config.base_url,
            config.model.clone(),
            config.api_key.clone(),
            config.timeout,
        )
    }

    /// Replace the retry policy used for transient failures.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Build an authenticated POST request.
    fn post_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("x-goog-api-key", self.api_key.expose_secret())
    }

    /// Send one request and decode the response envelope.
    async fn send_once(
        &self,
        url: &str,
        body: &Value,
    ) -> Result<GenerateContentResponse, AnalysisError> {
        let resp = self.post_request(url).json(body).send().await?;
        let status = resp.status();
        metrics::counter!(
            "nutriaura_client_http_responses_total",
            "status" => status.as_u16().to_string()
        )
        .increment(1);
        if !status.is_success() {
            return Err(self.error_from_response(resp).await);
        }
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            AnalysisError::MalformedResponse(format!("invalid response envelope: {e}"))
        })
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> AnalysisError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();
        tracing::debug!(status, body = %body_snippet, "analysis request failed");
        AnalysisError::from_status(status, body_snippet)
    }
}

/// JSON schema the model must follow in JSON response mode.
pub fn response_schema() -> Result<Value, AnalysisError> {
    let mut schema = serde_json::to_value(schemars::schema_for!(AnalysisResult))?;
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    Ok(schema)
}

/// Build the `generateContent` body.
///
/// With a location the request enables Maps/Search grounding, which rules out
/// the JSON response mode; the prompt then asks for an embedded block instead.
pub fn build_request_body(
    image: &CapturedImage,
    answers: &QuizAnswers,
    location: Option<GeoLocation>,
) -> Result<Value, AnalysisError> {
    let grounded = location.is_some();
    let mut body = json!({
        "contents": [{
            "role": "user",
            "parts": [
                {"inlineData": {"mimeType": image.media_type, "data": encode_image(image)}},
                {"text": build_prompt(answers, location, grounded)},
            ],
        }],
    });

    match location {
        Some(loc) => {
            body["tools"] = json!([{"googleMaps": {}}, {"googleSearch": {}}]);
            body["toolConfig"] = json!({
                "retrievalConfig": {
                    "latLng": {"latitude": loc.latitude, "longitude": loc.longitude},
                },
            });
        }
        None => {
            body["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseJsonSchema": response_schema()?,
            });
        }
    }
    Ok(body)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Turn a decoded envelope into an [`AnalysisResult`], attaching grounding
/// chunks unmodified.
fn interpret_response(payload: GenerateContentResponse) -> Result<AnalysisResult, AnalysisError> {
    let Some(candidate) = payload.candidates.into_iter().next() else {
        let reason = payload
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".into());
        return Err(AnalysisError::MalformedResponse(format!(
            "model returned no answer ({reason})"
        )));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|p| !p.thought)
        .filter_map(|p| p.text)
        .collect();
    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "empty".into());
        return Err(AnalysisError::MalformedResponse(format!(
            "model returned no text ({reason})"
        )));
    }

    let mut result = parse_analysis(&text)?;
    let chunks = candidate
        .grounding_metadata
        .map(|m| m.grounding_chunks)
        .unwrap_or_default();
    if !chunks.is_empty() {
        result.grounding_attribution = Some(chunks);
    }
    Ok(result)
}

#[async_trait]
impl AnalysisClient for ReqwestAnalysisClient {
    async fn analyze(
        &self,
        image: &CapturedImage,
        answers: &QuizAnswers,
        location: Option<GeoLocation>,
    ) -> Result<AnalysisResult, AnalysisError> {
        if image.is_empty() {
            return Err(AnalysisError::InvalidInput("image is empty".into()));
        }
        answers.validate()?;

        let url = self.endpoint();
        let body = build_request_body(image, answers, location)?;
        tracing::debug!(
            model = %self.model,
            grounded = location.is_some(),
            image_bytes = image.data.len(),
            "sending analysis request"
        );

        let payload = self
            .retry
            .retry_if(|| self.send_once(&url, &body), AnalysisError::is_transient)
            .await?;
        interpret_response(payload)
    }
}
