//! Recognizer seam and its HTTP client.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One turn handed to the recognizer.
#[derive(Debug, Clone, Serialize)]
pub struct RecognizeTurn {
    /// Conversation session identifier.
    pub session_id: String,
    /// Raw user utterance.
    pub text: String,
}

/// One entity occurrence in the utterance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntityMatch {
    /// Matched text.
    pub text: String,
    /// Character span in the utterance, when the service reports one.
    #[serde(default)]
    pub span: Option<[usize; 2]>,
}

/// Recognizer output: intent confidences plus entity occurrences.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecognizerResult {
    /// Intent name to confidence score.
    #[serde(default)]
    pub intents: HashMap<String, f64>,
    /// Entity name to occurrences, first occurrence wins per field.
    #[serde(default)]
    pub entities: HashMap<String, Vec<EntityMatch>>,
}

/// The hosted NLU service, behind a narrow seam so tests can stub it.
#[async_trait]
pub trait SlotRecognizer: Send + Sync {
    /// Run one recognition query for one turn.
    async fn recognize(&self, turn: &RecognizeTurn) -> Result<RecognizerResult>;
}

/// HTTP client for the hosted recognizer endpoint.
pub struct NluClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl NluClient {
    /// Build the client; an unusable HTTP stack is a construction-time
    /// failure, raised before any session is served.
    pub fn new(endpoint: String, api_key: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build recognizer http client")?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl SlotRecognizer for NluClient {
    async fn recognize(&self, turn: &RecognizeTurn) -> Result<RecognizerResult> {
        let mut request = self.client.post(&self.endpoint).json(turn);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }
        let response = request
            .send()
            .await
            .context("recognizer request failed")?;
        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read recognizer response body")?;
        if !status.is_success() {
            anyhow::bail!("recognizer API error {status}: {body}");
        }
        serde_json::from_str(&body)
            .map_err(|error| anyhow::anyhow!("recognizer response parse error: {error}; body: {body}"))
    }
}
