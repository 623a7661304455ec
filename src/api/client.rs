use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use thiserror::Error;

use crate::core::{CalculationError, FailureKind, TaxCalculator, TaxRequest, TaxResponse};

pub const API_URL: &str = "https://listentotaxman.com/ws/tax/index.js.php";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to marshal request: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to execute request: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("failed to read response: {0}")]
    Body(#[source] reqwest::Error),
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl From<ClientError> for CalculationError {
    fn from(err: ClientError) -> Self {
        let kind = match &err {
            ClientError::Encode(_) => FailureKind::Encode,
            ClientError::Transport(_) | ClientError::Body(_) => FailureKind::Transport,
            ClientError::Status { status, .. } => FailureKind::Status(*status),
            ClientError::Decode(_) => FailureKind::Decode,
        };
        CalculationError::new(kind, err.to_string())
    }
}

#[derive(Serialize)]
struct Payload<'a> {
    response: &'static str,
    time: &'static str,
    #[serde(flatten)]
    request: &'a TaxRequest,
}

#[derive(Debug, Clone)]
pub struct HttpTaxClient {
    http: reqwest::Client,
    url: String,
}

impl Default for HttpTaxClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTaxClient {
    pub fn new() -> Self {
        Self::with_url(API_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn post(&self, request: &TaxRequest) -> Result<TaxResponse, ClientError> {
        let body = serde_json::to_vec(&Payload {
            response: "json",
            time: "1",
            request,
        })
        .map_err(ClientError::Encode)?;

        tracing::debug!(url = %self.url, year = %request.year, "posting tax request");
        let response = self
            .http
            .post(&self.url)
            // The service reads a JSON body but expects a form content type.
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = response.status();
        let text = response.text().await.map_err(ClientError::Body)?;
        tracing::debug!(status = status.as_u16(), bytes = text.len(), "tax response received");

        if status != reqwest::StatusCode::OK {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(ClientError::Decode)
    }
}

impl TaxCalculator for HttpTaxClient {
    async fn calculate(&self, request: &TaxRequest) -> Result<TaxResponse, CalculationError> {
        Ok(self.post(request).await?)
    }
}
