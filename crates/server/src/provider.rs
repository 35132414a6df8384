use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode, Url};
use serde_json::Value;
use shared::{domain::PredictionId, protocol::CreatePredictionRequest};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with something other than the expected status.
    /// `body` is the raw response text.
    #[error("Replicate API error: {body}")]
    Rejected { status: u16, body: String },
    #[error("provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Upstream image-generation service. Responses are passed back as raw JSON
/// so the proxy can forward them unmodified.
#[async_trait]
pub trait PredictionProvider: Send + Sync {
    async fn create_prediction(
        &self,
        request: &CreatePredictionRequest,
    ) -> Result<Value, ProviderError>;

    async fn get_prediction(&self, id: &PredictionId) -> Result<Value, ProviderError>;
}

pub struct ReplicateProvider {
    http: Client,
    api_url: Url,
    api_token: String,
}

impl ReplicateProvider {
    pub fn new(
        api_url: &str,
        api_token: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_client(http, api_url, api_token)
    }

    pub fn with_client(
        http: Client,
        api_url: &str,
        api_token: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let api_url = Url::parse(api_url)?;
        if api_url.cannot_be_a_base() {
            bail!("provider API url '{api_url}' cannot carry a path");
        }
        Ok(Self {
            http,
            api_url,
            api_token: api_token.into(),
        })
    }

    /// `{api_url}/predictions[/{id}]`. Each segment is percent-encoded, so an
    /// id can never reach another path or add a query.
    fn predictions_url(&self, id: Option<&PredictionId>) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("predictions");
            if let Some(id) = id {
                segments.push(&id.0);
            }
        }
        url
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.api_token)
    }
}

#[async_trait]
impl PredictionProvider for ReplicateProvider {
    async fn create_prediction(
        &self,
        request: &CreatePredictionRequest,
    ) -> Result<Value, ProviderError> {
        let response = self
            .http
            .post(self.predictions_url(None))
            .header(header::AUTHORIZATION, self.auth_header())
            .json(request)
            .send()
            .await?;
        read_json(response, StatusCode::CREATED).await
    }

    async fn get_prediction(&self, id: &PredictionId) -> Result<Value, ProviderError> {
        let response = self
            .http
            .get(self.predictions_url(Some(id)))
            .header(header::AUTHORIZATION, self.auth_header())
            .send()
            .await?;
        read_json(response, StatusCode::OK).await
    }
}

async fn read_json(
    response: reqwest::Response,
    expected: StatusCode,
) -> Result<Value, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if status != expected {
        return Err(ProviderError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
#[path = "tests/provider_tests.rs"]
mod tests;
